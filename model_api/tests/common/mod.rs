#![allow(dead_code)]

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use model_api::{ApiError, ApiRequest, ApiResponse, Method, Result, Transport};
use serde_json::{Value, json};

/// A transport answering from a script and recording every request.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: Value) -> Self {
        self.replies.lock().unwrap().push_back(ApiResponse {
            status,
            body: body.to_string().into_bytes(),
        });
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<(Method, String)> {
        self.requests()
            .iter()
            .map(|r| (r.method, r.path()))
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::InvalidInput(format!("no scripted reply for {}", request.path())))
    }
}

pub fn linear_layer(id: i64, display_name: &str) -> Value {
    json!({
        "activatorTargetId": id,
        "displayName": display_name,
        "name": display_name,
        "type": "model_layer",
        "layerType": {
            "layerTypeId": "torch.nn.Linear",
            "layerName": "Linear",
            "parameters": [
                { "name": "in_features", "type": "number", "defaultValue": null, "required": true },
                { "name": "out_features", "type": "number", "defaultValue": null, "required": true },
                { "name": "bias", "type": "boolean", "defaultValue": "true" }
            ]
        },
        "parameterData": {}
    })
}

pub fn relu(id: i64) -> Value {
    json!({
        "type": "function",
        "activatorTargetId": id,
        "name": "F.relu",
        "displayName": "ReLU",
        "description": "Applies the rectified linear unit function element-wise",
        "parameters": [{ "name": "inplace", "type": "boolean", "defaultValue": "false" }]
    })
}

/// A model document with `layers` and one relu activator per entry of `activator_ids`.
pub fn model_doc(name: &str, layers: Vec<Value>, activator_ids: &[i64]) -> Value {
    let activators: Vec<Value> = activator_ids
        .iter()
        .map(|id| json!({ "modelActivatorId": id, "value": relu(1), "parameterData": {} }))
        .collect();

    json!({
        "modelId": "m-1",
        "name": name,
        "createdAt": "2020-01-02 10:00:00.000000",
        "updatedAt": "2020-01-02 10:00:00.000000",
        "layers": layers,
        "activators": activators
    })
}
