use std::collections::{BTreeMap, BTreeSet};

use model_api::Model;

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Turns arbitrary text into a python identifier.
///
/// # Arguments
/// * `raw` - The text to convert.
/// * `fallback` - Used when nothing usable is left.
pub fn identifier(raw: &str, fallback: &str) -> String {
    let mut out: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if out.chars().all(|c| c == '_') {
        out = fallback.to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if KEYWORDS.contains(&out.as_str()) {
        out.push('_');
    }

    out
}

/// Attribute names of the model layers, keyed by activator target id.
///
/// Layers keep their own name, later duplicates get the layer id appended.
pub fn layer_attributes(model: &Model) -> BTreeMap<i64, String> {
    let mut taken = BTreeSet::new();
    let mut attrs = BTreeMap::new();

    for layer in &model.layers {
        let base = identifier(&layer.name, "layer");
        let mut attr = base.clone();
        let mut suffix = layer.activator_target_id.to_string();
        while taken.contains(&attr) {
            attr = format!("{base}_{suffix}");
            suffix.push('_');
        }

        taken.insert(attr.clone());
        attrs.insert(layer.activator_target_id, attr);
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_valid_python() {
        assert_eq!(identifier("conv 1", "x"), "conv_1");
        assert_eq!(identifier("1st", "x"), "_1st");
        assert_eq!(identifier("  ", "layer"), "layer");
        assert_eq!(identifier("class", "x"), "class_");
        assert_eq!(identifier("größe", "x"), "gr__e");
    }
}
