use crate::actions::ModelAction;

/// A resolved move: which entity goes to which position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reorder {
    pub id: i64,
    pub new_index: usize,
}

impl Reorder {
    pub fn into_layer_action(self) -> ModelAction {
        ModelAction::UpdateLayerOrder {
            model_layer_id: self.id,
            new_index: self.new_index,
        }
    }

    pub fn into_activator_action(self) -> ModelAction {
        ModelAction::UpdateActivatorOrder {
            model_activator_id: self.id,
            new_index: self.new_index,
        }
    }
}

/// Resolves a drag from `old_index` to `new_index` into the moved entity.
///
/// # Arguments
/// * `items` - The list as currently displayed.
/// * `old_index` - Where the entity was picked up.
/// * `new_index` - Where it was dropped.
/// * `id_of` - Extracts the server id of an item.
///
/// # Returns
/// `None` when the move is a no-op or either index is out of range.
pub fn resolve<T, F>(items: &[T], old_index: usize, new_index: usize, id_of: F) -> Option<Reorder>
where
    F: Fn(&T) -> i64,
{
    if old_index == new_index || new_index >= items.len() {
        return None;
    }

    items.get(old_index).map(|item| Reorder {
        id: id_of(item),
        new_index,
    })
}

/// Moves the element at `old` to `new`, shifting the ones in between.
///
/// # Returns
/// Whether the list changed.
pub fn splice<T>(items: &mut Vec<T>, old: usize, new: usize) -> bool {
    if old == new || old >= items.len() || new >= items.len() {
        return false;
    }

    let item = items.remove(old);
    items.insert(new, item);
    true
}

/// Index reached by moving `delta` steps from `index` in a list of `len`.
///
/// # Returns
/// `None` if the move would leave the list or not move at all.
pub fn step(index: usize, len: usize, delta: isize) -> Option<usize> {
    let target = index.checked_add_signed(delta)?;
    (target < len && target != index).then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_uses_the_old_position() {
        let ids = [10, 20, 30];
        let moved = resolve(&ids, 0, 2, |id| *id).unwrap();
        assert_eq!(moved, Reorder { id: 10, new_index: 2 });
        assert_eq!(
            moved.into_activator_action(),
            ModelAction::UpdateActivatorOrder {
                model_activator_id: 10,
                new_index: 2
            }
        );
    }

    #[test]
    fn resolve_ignores_noops_and_out_of_range() {
        let ids = [10, 20, 30];
        assert_eq!(resolve(&ids, 1, 1, |id| *id), None);
        assert_eq!(resolve(&ids, 5, 1, |id| *id), None);
        assert_eq!(resolve(&ids, 1, 3, |id| *id), None);
    }

    #[test]
    fn splice_only_changes_order() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(splice(&mut items, 3, 1));
        assert_eq!(items, ['a', 'd', 'b', 'c']);

        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, ['a', 'b', 'c', 'd']);

        assert!(splice(&mut items, 0, 3));
        assert_eq!(items, ['d', 'b', 'c', 'a']);
        assert!(!splice(&mut items, 0, 4));
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn step_clamps_at_the_ends() {
        assert_eq!(step(0, 3, -1), None);
        assert_eq!(step(2, 3, 1), None);
        assert_eq!(step(1, 3, 1), Some(2));
        assert_eq!(step(1, 3, -1), Some(0));
        assert_eq!(step(0, 1, 0), None);
    }
}
