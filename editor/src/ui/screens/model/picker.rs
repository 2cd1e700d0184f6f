use crossterm::event::KeyCode;
use model_api::{catalog::ActivatorChoice, Catalog, LayerType, ModelAction};

/// Documentation anchor of a layer type, suffixed with its id.
pub const DOCS_URL: &str = "https://pytorch.org/docs/1.4.0/nn.html#";

/// What a key press meant to a picker.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerInput {
    None,
    Close,
    Pick(ModelAction),
    Docs(String),
}

/// Picks a layer type from the catalog, with its own filter.
#[derive(Debug, Default)]
pub struct LayerPicker {
    pub filter: String,
    pub selected: usize,
    /// An add request is in flight, the picker closes once it succeeds.
    pub pending: bool,
}

impl LayerPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a LayerType> {
        catalog.filter_layer_types(&self.filter)
    }

    pub fn handle_key(&mut self, key: KeyCode, catalog: &Catalog) -> PickerInput {
        let visible = self.visible(catalog);

        match key {
            KeyCode::Esc => return PickerInput::Close,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < visible.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter if !self.pending => {
                if let Some(t) = visible.get(self.selected) {
                    return PickerInput::Pick(ModelAction::AddLayer {
                        layer_type_id: t.layer_type_id.clone(),
                    });
                }
            }
            KeyCode::F(1) => {
                if let Some(t) = visible.get(self.selected) {
                    return PickerInput::Docs(format!("{DOCS_URL}{}", t.layer_type_id));
                }
            }
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.selected = 0;
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.selected = 0;
            }
            _ => {}
        }

        PickerInput::None
    }
}

/// Picks an activator target: a model layer or a catalog function.
#[derive(Debug)]
pub struct ActivatorPicker {
    pub choices: Vec<ActivatorChoice>,
    pub selected: usize,
    pub pending: bool,
}

impl ActivatorPicker {
    pub fn new(choices: Vec<ActivatorChoice>) -> Self {
        Self {
            choices,
            selected: 0,
            pending: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> PickerInput {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => return PickerInput::Close,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.choices.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter if !self.pending => {
                if let Some(choice) = self.choices.get(self.selected) {
                    return PickerInput::Pick(ModelAction::AddActivator {
                        activator_target_id: choice.target_id,
                    });
                }
            }
            _ => {}
        }

        PickerInput::None
    }
}

#[cfg(test)]
mod tests {
    use model_api::catalog::ChoiceKind;

    use super::*;

    fn catalog() -> Catalog {
        let layer = |id: &str| LayerType {
            layer_type_id: id.to_string(),
            description: None,
            layer_name: String::new(),
            parameters: Vec::new(),
        };

        Catalog {
            layer_types: vec![
                layer("torch.nn.Conv2d"),
                layer("torch.nn.Linear"),
                layer("torch.nn.Dropout"),
            ],
            functions: Vec::new(),
        }
    }

    #[test]
    fn layer_picker_filters_then_picks() {
        let catalog = catalog();
        let mut picker = LayerPicker::new();

        for c in "LIN".chars() {
            picker.handle_key(KeyCode::Char(c), &catalog);
        }
        assert_eq!(picker.visible(&catalog).len(), 1);

        assert_eq!(
            picker.handle_key(KeyCode::F(1), &catalog),
            PickerInput::Docs("https://pytorch.org/docs/1.4.0/nn.html#torch.nn.Linear".into())
        );
        assert_eq!(
            picker.handle_key(KeyCode::Enter, &catalog),
            PickerInput::Pick(ModelAction::AddLayer {
                layer_type_id: "torch.nn.Linear".into()
            })
        );

        picker.pending = true;
        assert_eq!(picker.handle_key(KeyCode::Enter, &catalog), PickerInput::None);
    }

    #[test]
    fn activator_picker_selection_is_clamped() {
        let choice = |id: i64| ActivatorChoice {
            target_id: id,
            label: format!("#{id}"),
            description: String::new(),
            kind: ChoiceKind::Function,
        };
        let mut picker = ActivatorPicker::new(vec![choice(1), choice(2)]);

        picker.handle_key(KeyCode::Down);
        picker.handle_key(KeyCode::Down);
        assert_eq!(picker.selected, 1);

        assert_eq!(
            picker.handle_key(KeyCode::Enter),
            PickerInput::Pick(ModelAction::AddActivator {
                activator_target_id: 2
            })
        );
        assert_eq!(picker.handle_key(KeyCode::Esc), PickerInput::Close);
    }
}
