use crossterm::event::KeyCode;
use model_api::{
    Model, ModelAction, ModelActivator, ModelLayer, Parameter, ParameterData, ParameterValue,
};

/// The entity whose parameters are being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Layer(i64),
    Activator(i64),
}

#[derive(Debug, Clone)]
pub struct ParamRow {
    pub param: Parameter,
    /// The value as the server last reported it.
    pub saved: String,
    pub draft: String,
}

/// What a key press meant to the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamInput {
    None,
    Close,
    Commit(ModelAction),
}

/// Edits the parameters of one layer or activator.
#[derive(Debug)]
pub struct ParamEditor {
    pub owner: Owner,
    pub title: String,
    pub rows: Vec<ParamRow>,
    pub selected: usize,
    pub editing: bool,
}

impl ParamEditor {
    pub fn for_layer(layer: &ModelLayer) -> Self {
        Self::new(
            Owner::Layer(layer.activator_target_id),
            format!(" {} · {} ", layer.label(), layer.layer_type.layer_type_id),
            &layer.layer_type.parameters,
            &layer.parameter_data,
        )
    }

    pub fn for_activator(activator: &ModelActivator) -> Self {
        Self::new(
            Owner::Activator(activator.model_activator_id),
            format!(
                " {} #{} ",
                activator.value.label(),
                activator.model_activator_id
            ),
            activator.value.parameters(),
            &activator.parameter_data,
        )
    }

    fn new(owner: Owner, title: String, params: &[Parameter], data: &ParameterData) -> Self {
        let rows = params
            .iter()
            .map(|p| {
                let value = p.resolve(data).to_string();
                ParamRow {
                    param: p.clone(),
                    saved: value.clone(),
                    draft: value,
                }
            })
            .collect();

        Self {
            owner,
            title,
            rows,
            selected: 0,
            editing: false,
        }
    }

    /// Refreshes the saved values from a new server copy.
    ///
    /// A draft being typed is kept.
    ///
    /// # Returns
    /// `false` if the owner no longer exists.
    pub fn sync(&mut self, model: &Model) -> bool {
        let data = match self.owner {
            Owner::Layer(id) => model.layer(id).map(|l| &l.parameter_data),
            Owner::Activator(id) => model.activator(id).map(|a| &a.parameter_data),
        };
        let Some(data) = data else {
            return false;
        };

        for (i, row) in self.rows.iter_mut().enumerate() {
            row.saved = row.param.resolve(data).to_string();
            if !(self.editing && i == self.selected) {
                row.draft = row.saved.clone();
            }
        }

        true
    }

    pub fn handle_key(&mut self, key: KeyCode) -> ParamInput {
        if self.editing {
            return self.handle_edit_key(key);
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => return ParamInput::Close,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.rows.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let Some(row) = self.rows.get_mut(self.selected) else {
                    return ParamInput::None;
                };

                if row.param.is_boolean() {
                    row.draft = if row.draft == "true" { "false" } else { "true" }.to_string();
                    return self.commit();
                }
                if key == KeyCode::Enter {
                    self.editing = true;
                }
            }
            _ => {}
        }

        ParamInput::None
    }

    fn handle_edit_key(&mut self, key: KeyCode) -> ParamInput {
        let Some(row) = self.rows.get_mut(self.selected) else {
            self.editing = false;
            return ParamInput::None;
        };

        match key {
            KeyCode::Char(c) => row.draft.push(c),
            KeyCode::Backspace => {
                row.draft.pop();
            }
            KeyCode::Esc => {
                row.draft = row.saved.clone();
                self.editing = false;
            }
            KeyCode::Enter => {
                self.editing = false;
                return self.commit();
            }
            _ => {}
        }

        ParamInput::None
    }

    /// Builds the update for the selected row, if its value changed.
    fn commit(&self) -> ParamInput {
        let Some(row) = self.rows.get(self.selected) else {
            return ParamInput::None;
        };
        if row.draft == row.saved {
            return ParamInput::None;
        }

        let parameter_name = row.param.name.clone();
        let action = match self.owner {
            Owner::Layer(id) => ModelAction::UpdateLayerParameter {
                model_layer_id: id,
                parameter_name,
                new_value: ParameterValue::Text(row.draft.clone()),
            },
            Owner::Activator(id) => ModelAction::UpdateActivatorParameter {
                model_activator_id: id,
                parameter_name,
                new_value: typed(row),
            },
        };

        ParamInput::Commit(action)
    }
}

/// Activator values keep their json type on the wire.
///
/// A draft that is not a finite number is sent as text.
fn typed(row: &ParamRow) -> ParameterValue {
    if row.param.is_boolean() {
        return ParameterValue::Bool(row.draft == "true");
    }

    match row.param.kind.as_str() {
        "number" | "float" | "int" => ParameterValue::number(&row.draft)
            .unwrap_or_else(|| ParameterValue::Text(row.draft.clone())),
        _ => ParameterValue::Text(row.draft.clone()),
    }
}

#[cfg(test)]
mod tests {
    use model_api::Value;

    use super::*;

    fn param(name: &str, kind: &str, default: &str) -> Parameter {
        Parameter {
            name: name.into(),
            kind: kind.into(),
            default_value: default.into(),
            description: None,
            required: false,
        }
    }

    fn editor(owner: Owner) -> ParamEditor {
        let data = ParameterData::from([("negative_slope".to_string(), Value::text("0.01"))]);
        ParamEditor::new(
            owner,
            "test".into(),
            &[
                param("negative_slope", "number", ""),
                param("inplace", "boolean", "false"),
            ],
            &data,
        )
    }

    #[test]
    fn unchanged_values_are_not_sent() {
        let mut editor = editor(Owner::Activator(3));

        assert_eq!(editor.handle_key(KeyCode::Enter), ParamInput::None);
        assert!(editor.editing);
        editor.handle_key(KeyCode::Backspace);
        editor.handle_key(KeyCode::Char('1'));
        assert_eq!(editor.handle_key(KeyCode::Enter), ParamInput::None);
        assert!(!editor.editing);
    }

    #[test]
    fn edited_numbers_keep_their_type() {
        let mut editor = editor(Owner::Activator(3));

        editor.handle_key(KeyCode::Enter);
        editor.handle_key(KeyCode::Char('5'));

        assert_eq!(
            editor.handle_key(KeyCode::Enter),
            ParamInput::Commit(ModelAction::UpdateActivatorParameter {
                model_activator_id: 3,
                parameter_name: "negative_slope".into(),
                new_value: ParameterValue::number("0.015").unwrap(),
            })
        );
    }

    #[test]
    fn integer_drafts_stay_integers() {
        let data = ParameterData::new();
        let mut editor = ParamEditor::new(
            Owner::Activator(3),
            "test".into(),
            &[param("dim", "int", "1")],
            &data,
        );

        editor.handle_key(KeyCode::Enter);
        editor.handle_key(KeyCode::Backspace);
        editor.handle_key(KeyCode::Char('3'));

        let ParamInput::Commit(ModelAction::UpdateActivatorParameter { new_value, .. }) =
            editor.handle_key(KeyCode::Enter)
        else {
            panic!("expected a commit");
        };
        assert_eq!(serde_json::to_value(&new_value).unwrap(), serde_json::json!(3));
    }

    #[test]
    fn non_finite_drafts_are_sent_as_text() {
        let data = ParameterData::new();
        let mut editor = ParamEditor::new(
            Owner::Activator(3),
            "test".into(),
            &[param("negative_slope", "float", "")],
            &data,
        );

        editor.handle_key(KeyCode::Enter);
        for c in "inf".chars() {
            editor.handle_key(KeyCode::Char(c));
        }

        assert_eq!(
            editor.handle_key(KeyCode::Enter),
            ParamInput::Commit(ModelAction::UpdateActivatorParameter {
                model_activator_id: 3,
                parameter_name: "negative_slope".into(),
                new_value: ParameterValue::Text("inf".into()),
            })
        );
    }

    #[test]
    fn booleans_toggle_immediately() {
        let mut layer = editor(Owner::Layer(4));
        layer.handle_key(KeyCode::Down);

        assert_eq!(
            layer.handle_key(KeyCode::Char(' ')),
            ParamInput::Commit(ModelAction::UpdateLayerParameter {
                model_layer_id: 4,
                parameter_name: "inplace".into(),
                new_value: ParameterValue::Text("true".into()),
            })
        );

        let mut activator = editor(Owner::Activator(3));
        activator.handle_key(KeyCode::Down);
        assert_eq!(
            activator.handle_key(KeyCode::Enter),
            ParamInput::Commit(ModelAction::UpdateActivatorParameter {
                model_activator_id: 3,
                parameter_name: "inplace".into(),
                new_value: ParameterValue::Bool(true),
            })
        );
    }

    #[test]
    fn escape_discards_the_draft() {
        let mut editor = editor(Owner::Layer(4));

        editor.handle_key(KeyCode::Enter);
        editor.handle_key(KeyCode::Char('9'));
        editor.handle_key(KeyCode::Esc);

        assert_eq!(editor.rows[0].draft, "0.01");
        assert_eq!(editor.handle_key(KeyCode::Esc), ParamInput::Close);
    }
}
