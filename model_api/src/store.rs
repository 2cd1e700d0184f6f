use std::collections::VecDeque;

use crate::{
    actions::{self, ModelAction},
    client::{ApiClient, Transport},
    data::Model,
    error::Result,
    reorder,
};

/// The maximum amount of notices kept before the oldest are dropped.
pub const MAX_NOTICES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the user produced by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Holds the model being edited.
///
/// The server is the only source of truth: every successful action
/// replaces the whole model with the server's answer, a failed one leaves
/// the last server copy in place and queues an error notice.
#[derive(Debug, Clone)]
pub struct ModelStore {
    model: Model,
    /// The last server copy while a local preview is shown.
    confirmed: Option<Model>,
    notices: VecDeque<Notice>,
}

impl ModelStore {
    /// Creates a new `ModelStore`.
    ///
    /// # Arguments
    /// * `model` - The model as last fetched from the server.
    pub fn new(model: Model) -> Self {
        Self {
            model,
            confirmed: None,
            notices: VecDeque::new(),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_id(&self) -> &str {
        &self.model.model_id
    }

    /// Dispatches `action` and reconciles the local model with the result.
    ///
    /// # Arguments
    /// * `client` - The api client.
    /// * `action` - The mutation to apply.
    ///
    /// # Returns
    /// `true` if the server accepted the action.
    pub async fn update<T: Transport>(&mut self, client: &ApiClient<T>, action: &ModelAction) -> bool {
        let result = actions::dispatch(client, &self.model.model_id, action).await;
        self.reconcile(action, result)
    }

    /// Applies the outcome of a dispatch that ran elsewhere.
    ///
    /// Responses are applied in arrival order, the last one wins.
    ///
    /// # Arguments
    /// * `action` - The action the result belongs to.
    /// * `result` - The dispatch outcome.
    ///
    /// # Returns
    /// `true` if the model was replaced.
    pub fn reconcile(&mut self, action: &ModelAction, result: Result<Model>) -> bool {
        match result {
            Ok(model) => {
                log::debug!(action = action.kind(); "model replaced by server copy");
                self.model = model;
                self.confirmed = None;
                true
            }
            Err(e) => {
                log::warn!(action = action.kind(); "{} failed: {e}", action.describe());
                if let Some(confirmed) = self.confirmed.take() {
                    self.model = confirmed;
                }
                self.notify(
                    NoticeLevel::Error,
                    format!("Could not {}: {}", action.describe(), e.user_message()),
                );
                false
            }
        }
    }

    /// Queues a notice, dropping the oldest past `MAX_NOTICES`.
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push_back(Notice {
            level,
            message: message.into(),
        });

        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }

    /// Takes every queued notice, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Moves an activator locally before the server confirms the order.
    ///
    /// The next reconcile overwrites this preview either way: with the
    /// server's answer, or with the last server copy on failure.
    pub fn preview_activator_move(&mut self, old: usize, new: usize) -> bool {
        self.snapshot();
        reorder::splice(&mut self.model.activators, old, new)
    }

    /// Moves a layer locally before the server confirms the order.
    pub fn preview_layer_move(&mut self, old: usize, new: usize) -> bool {
        self.snapshot();
        reorder::splice(&mut self.model.layers, old, new)
    }

    fn snapshot(&mut self) {
        if self.confirmed.is_none() {
            self.confirmed = Some(self.model.clone());
        }
    }
}
