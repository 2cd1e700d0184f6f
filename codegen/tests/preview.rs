use model_api::Model;
use serde_json::{Value, json};

fn layer(id: i64, name: &str, data: Value) -> Value {
    json!({
        "activatorTargetId": id,
        "displayName": name,
        "name": name,
        "layerType": {
            "layerTypeId": "torch.nn.Linear",
            "parameters": [
                { "name": "in_features", "type": "number", "defaultValue": null },
                { "name": "out_features", "type": "number", "defaultValue": null },
                { "name": "bias", "type": "boolean", "defaultValue": "true" }
            ]
        },
        "parameterData": data
    })
}

fn sample() -> Model {
    serde_json::from_value(json!({
        "modelId": "m-1",
        "name": "Classifier",
        "layers": [
            layer(4, "fc", json!({ "in_features": { "value": "784" }, "out_features": { "value": 10 } })),
            layer(5, "fc", json!({ "bias": { "value": "false" } })),
        ],
        "activators": [
            {
                "modelActivatorId": 1,
                "value": {
                    "type": "model_layer",
                    "activatorTargetId": 4,
                    "name": "fc",
                    "layerType": { "layerTypeId": "torch.nn.Linear" }
                }
            },
            {
                "modelActivatorId": 2,
                "value": {
                    "type": "function",
                    "activatorTargetId": 1,
                    "name": "F.relu",
                    "parameters": [{ "name": "inplace", "type": "boolean", "defaultValue": "false" }]
                },
                "parameterData": { "inplace": { "value": true } }
            },
            {
                "modelActivatorId": 3,
                "value": {
                    "type": "model_layer",
                    "activatorTargetId": 99,
                    "displayName": "gone",
                    "layerType": { "layerTypeId": "torch.nn.Linear" }
                }
            }
        ]
    }))
    .unwrap()
}

#[test]
fn renders_layers_and_activators_in_order() {
    let expected = "\
import torch
import torch.nn.functional as F


class Classifier(torch.nn.Module):
    def __init__(self):
        super(Classifier, self).__init__()
        self.fc = torch.nn.Linear(in_features=784, out_features=10, bias=True)
        self.fc_5 = torch.nn.Linear(bias=False)

    def forward(self, inputs):
        inputs = self.fc(inputs)
        inputs = F.relu(inputs, inplace=True)
        # missing layer: gone
        return inputs
";

    assert_eq!(codegen::render(&sample()), expected);
}

#[test]
fn rendering_is_deterministic() {
    let model = sample();
    assert_eq!(codegen::render(&model), codegen::render(&model.clone()));
}
