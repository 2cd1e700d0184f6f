//! Renders a model document as the PyTorch module it describes.

mod literal;
mod names;

use std::{collections::BTreeMap, fmt::Write};

use model_api::{ActivatorTarget, Model, ModelActivator, ModelLayer};

pub use names::identifier;

const INDENT: &str = "    ";

/// Renders `model` as python source.
///
/// The output only depends on the model, rendering the same document twice
/// yields the same text.
///
/// # Arguments
/// * `model` - The model to render.
///
/// # Returns
/// The source of a `torch.nn.Module` subclass.
pub fn render(model: &Model) -> String {
    let class = names::identifier(&model.name, "Model");
    let attrs = names::layer_attributes(model);

    let mut out = String::new();
    out.push_str("import torch\n");
    out.push_str("import torch.nn.functional as F\n\n\n");
    line(&mut out, 0, &format!("class {class}(torch.nn.Module):"));

    line(&mut out, 1, "def __init__(self):");
    line(&mut out, 2, &format!("super({class}, self).__init__()"));
    if model.layers.is_empty() {
        line(&mut out, 2, "# TODO: add layers");
    }
    for layer in &model.layers {
        line(&mut out, 2, &layer_line(layer, &attrs));
    }

    out.push('\n');
    line(&mut out, 1, "def forward(self, inputs):");
    if model.activators.is_empty() {
        line(&mut out, 2, "# TODO: add activators");
    }
    for activator in &model.activators {
        line(&mut out, 2, &activator_line(activator, &attrs));
    }
    line(&mut out, 2, "return inputs");

    out
}

fn layer_line(layer: &ModelLayer, attrs: &BTreeMap<i64, String>) -> String {
    let args = arguments(&layer.layer_type.parameters, &layer.parameter_data, attrs);
    let attr = attrs
        .get(&layer.activator_target_id)
        .map(String::as_str)
        .unwrap_or("layer");

    format!(
        "self.{attr} = {}({})",
        layer.layer_type.layer_type_id,
        args.join(", ")
    )
}

fn activator_line(activator: &ModelActivator, attrs: &BTreeMap<i64, String>) -> String {
    match &activator.value {
        ActivatorTarget::Function(func) => {
            let mut args = vec!["inputs".to_string()];
            args.extend(arguments(&func.parameters, &activator.parameter_data, attrs));
            format!("inputs = {}({})", func.name, args.join(", "))
        }
        ActivatorTarget::Layer(layer) => match attrs.get(&layer.activator_target_id) {
            Some(attr) => format!("inputs = self.{attr}(inputs)"),
            None => format!("# missing layer: {}", layer.label()),
        },
    }
}

fn arguments(
    params: &[model_api::Parameter],
    data: &model_api::ParameterData,
    attrs: &BTreeMap<i64, String>,
) -> Vec<String> {
    params
        .iter()
        .filter_map(|p| literal::render(p, data, attrs).map(|v| format!("{}={v}", p.name)))
        .collect()
}

fn line(out: &mut String, depth: usize, text: &str) {
    // Writing into a String can't fail.
    let _ = writeln!(out, "{}{text}", INDENT.repeat(depth));
}

#[cfg(test)]
mod tests {
    use model_api::Model;

    use super::*;

    fn empty(name: &str) -> Model {
        Model {
            model_id: "m".into(),
            name: name.into(),
            user: None,
            created_at: String::new(),
            updated_at: String::new(),
            layers: Vec::new(),
            activators: Vec::new(),
        }
    }

    #[test]
    fn empty_model_renders_placeholders() {
        let expected = "\
import torch
import torch.nn.functional as F


class Empty(torch.nn.Module):
    def __init__(self):
        super(Empty, self).__init__()
        # TODO: add layers

    def forward(self, inputs):
        # TODO: add activators
        return inputs
";
        assert_eq!(render(&empty("Empty")), expected);
    }

    #[test]
    fn unusable_model_name_falls_back() {
        assert!(render(&empty("")).contains("class Model(torch.nn.Module):"));
        assert!(render(&empty("my net")).contains("super(my_net, self)"));
    }
}
