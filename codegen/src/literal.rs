use std::collections::BTreeMap;

use model_api::{Parameter, ParameterData};

/// Renders the effective value of `param` as python source.
///
/// # Arguments
/// * `param` - The declared parameter.
/// * `data` - The stored values of the owning layer or activator.
/// * `attrs` - Layer attribute names, for values referencing a layer.
///
/// # Returns
/// `None` when the parameter has no value and no default.
pub fn render(
    param: &Parameter,
    data: &ParameterData,
    attrs: &BTreeMap<i64, String>,
) -> Option<String> {
    let referenced = data
        .get(&param.name)
        .filter(|v| !v.value.is_empty())
        .and_then(|v| v.value_id)
        .and_then(|id| attrs.get(&id));
    if let Some(attr) = referenced {
        return Some(format!("self.{attr}"));
    }

    let value = param.resolve(data).trim();
    if value.is_empty() {
        return None;
    }

    Some(python_token(value).to_string())
}

fn python_token(value: &str) -> &str {
    match value {
        "true" => "True",
        "false" => "False",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use model_api::Value;

    use super::*;

    fn param(name: &str, default: &str) -> Parameter {
        Parameter {
            name: name.to_string(),
            kind: String::new(),
            default_value: default.to_string(),
            description: None,
            required: false,
        }
    }

    #[test]
    fn booleans_become_python_literals() {
        let data = ParameterData::from([("bias".to_string(), Value::text("false"))]);
        let attrs = BTreeMap::new();

        assert_eq!(render(&param("bias", "true"), &data, &attrs).as_deref(), Some("False"));
        assert_eq!(render(&param("inplace", "true"), &data, &attrs).as_deref(), Some("True"));
    }

    #[test]
    fn empty_values_are_skipped() {
        let data = ParameterData::new();
        assert_eq!(render(&param("in_features", ""), &data, &BTreeMap::new()), None);
    }

    #[test]
    fn references_point_at_layer_attributes() {
        let data = ParameterData::from([(
            "module".to_string(),
            Value {
                value_id: Some(4),
                value: "fc1".to_string(),
            },
        )]);
        let attrs = BTreeMap::from([(4, "fc1".to_string())]);

        assert_eq!(
            render(&param("module", ""), &data, &attrs).as_deref(),
            Some("self.fc1")
        );
    }
}
