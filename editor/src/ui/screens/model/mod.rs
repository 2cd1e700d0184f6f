pub mod draw;
pub mod params;
pub mod picker;

use std::collections::BTreeSet;

use crossterm::event::KeyCode;
use model_api::{
    catalog::{self, filter_model_layers},
    models, reorder, Catalog, ModelAction, ModelActivator, ModelLayer, ModelStore, Subject, User,
};

use crate::{
    state::remote::Reply,
    ui::form::{Field, Form, FormInput},
};

use self::{
    params::{ParamEditor, ParamInput},
    picker::{ActivatorPicker, LayerPicker, PickerInput},
};

use super::{home, Action, Ctx, Screen};

/// The list holding the keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Layers,
    Activators,
}

/// A popup on top of the model page.
pub enum Overlay {
    LayerPicker(LayerPicker),
    ActivatorPicker(ActivatorPicker),
    Params(ParamEditor),
    Rename(Form),
}

pub struct ModelState {
    user: User,
    model_id: String,
    /// `None` until the model arrived.
    store: Option<ModelStore>,
    catalog: Catalog,
    focus: Pane,
    /// Index into the filtered layer list.
    layer_cursor: usize,
    activator_cursor: usize,
    layer_filter: String,
    filtering: bool,
    show_preview: bool,
    preview_scroll: u16,
    /// Entities with a request in flight.
    busy: BTreeSet<Subject>,
    overlay: Option<Overlay>,
}

impl ModelState {
    pub fn new(user: User, model_id: String) -> Self {
        Self {
            user,
            model_id,
            store: None,
            catalog: Catalog::default(),
            focus: Pane::Layers,
            layer_cursor: 0,
            activator_cursor: 0,
            layer_filter: String::new(),
            filtering: false,
            show_preview: true,
            preview_scroll: 0,
            busy: BTreeSet::new(),
            overlay: None,
        }
    }

    /// Model indices of the layers passing the filter.
    fn visible_layers(&self) -> Vec<usize> {
        match &self.store {
            Some(store) => filter_model_layers(store.model(), &self.layer_filter),
            None => Vec::new(),
        }
    }

    fn selected_layer(&self) -> Option<&ModelLayer> {
        let index = *self.visible_layers().get(self.layer_cursor)?;
        self.store.as_ref()?.model().layers.get(index)
    }

    fn selected_activator(&self) -> Option<&ModelActivator> {
        self.store
            .as_ref()?
            .model()
            .activators
            .get(self.activator_cursor)
    }

    fn is_busy(&self, subject: Subject, ctx: &mut Ctx) -> bool {
        let busy = self.busy.contains(&subject);
        if busy {
            ctx.notices.info("Still updating, please wait");
        }
        busy
    }

    /// Marks the action's subject busy and sends it.
    ///
    /// # Returns
    /// `false` if the subject already had a request in flight.
    fn send(&mut self, action: ModelAction, ctx: &mut Ctx) -> bool {
        let subject = action.subject();
        if self.is_busy(subject, ctx) {
            return false;
        }

        self.busy.insert(subject);
        ctx.notices.log(format!("{}...", action.describe()));
        ctx.remote.update(&self.model_id, action);
        true
    }

    fn clamp_cursors(&mut self) {
        let layers = self.visible_layers().len();
        let activators = self
            .store
            .as_ref()
            .map_or(0, |s| s.model().activators.len());

        self.layer_cursor = self.layer_cursor.min(layers.saturating_sub(1));
        self.activator_cursor = self.activator_cursor.min(activators.saturating_sub(1));
    }

    /// Follows a moved entity, points the cursor at its current position.
    fn follow(&mut self, action: &ModelAction) {
        let Some(store) = &self.store else {
            return;
        };
        let model = store.model();

        match action {
            ModelAction::UpdateLayerOrder { model_layer_id, .. } => {
                if let Some(index) = model.layer_index(*model_layer_id) {
                    let visible = self.visible_layers();
                    if let Some(pos) = visible.iter().position(|i| *i == index) {
                        self.layer_cursor = pos;
                    }
                }
            }
            ModelAction::UpdateActivatorOrder {
                model_activator_id, ..
            } => {
                if let Some(index) = model.activator_index(*model_activator_id) {
                    self.activator_cursor = index;
                }
            }
            _ => {}
        }
    }

    fn after_update(&mut self, action: &ModelAction, ok: bool, error: Option<String>) {
        self.follow(action);
        self.clamp_cursors();

        let Some(overlay) = self.overlay.take() else {
            return;
        };

        self.overlay = match (overlay, action) {
            (Overlay::LayerPicker(_), ModelAction::AddLayer { .. }) if ok => None,
            (Overlay::LayerPicker(mut picker), ModelAction::AddLayer { .. }) => {
                picker.pending = false;
                Some(Overlay::LayerPicker(picker))
            }
            (Overlay::ActivatorPicker(_), ModelAction::AddActivator { .. }) if ok => None,
            (Overlay::ActivatorPicker(mut picker), ModelAction::AddActivator { .. }) => {
                picker.pending = false;
                Some(Overlay::ActivatorPicker(picker))
            }
            (Overlay::Rename(_), ModelAction::RenameModel { .. }) if ok => None,
            (Overlay::Rename(mut form), ModelAction::RenameModel { .. }) => {
                if let Some(message) = error {
                    form.set_error("name", message);
                }
                Some(Overlay::Rename(form))
            }
            (Overlay::Params(mut editor), _) => {
                let model = self.store.as_ref().map(ModelStore::model);
                model
                    .is_some_and(|m| editor.sync(m))
                    .then_some(Overlay::Params(editor))
            }
            (overlay, _) => Some(overlay),
        };
    }
}

/// Opens the model page and starts loading the model and catalog.
pub fn enter(ctx: &mut Ctx, user: User, model_id: String) -> Screen {
    ctx.remote.open(model_id.clone());
    Screen::Model(Box::new(ModelState::new(user, model_id)))
}

pub fn handle_key(state: &mut ModelState, key: KeyCode, ctx: &mut Ctx) -> Action {
    if state.store.is_none() {
        return match key {
            KeyCode::Esc | KeyCode::Char('q') => back(state, ctx),
            _ => Action::None,
        };
    }

    if let Some(overlay) = state.overlay.take() {
        state.overlay = handle_overlay(state, overlay, key, ctx);
        return Action::None;
    }

    if state.filtering {
        handle_filter(state, key);
        return Action::None;
    }

    match key {
        KeyCode::Tab | KeyCode::BackTab => {
            state.focus = match state.focus {
                Pane::Layers => Pane::Activators,
                Pane::Activators => Pane::Layers,
            };
            Action::None
        }
        KeyCode::Char('c') => {
            state.show_preview = !state.show_preview;
            Action::None
        }
        KeyCode::PageDown => {
            state.preview_scroll = state.preview_scroll.saturating_add(5);
            Action::None
        }
        KeyCode::PageUp => {
            state.preview_scroll = state.preview_scroll.saturating_sub(5);
            Action::None
        }
        KeyCode::Char('r') => {
            let name = state
                .store
                .as_ref()
                .map(|s| s.model().name.clone())
                .unwrap_or_default();
            state.overlay = Some(Overlay::Rename(Form::new(vec![
                Field::text("name", "Model name").with_value(name),
            ])));
            Action::None
        }
        KeyCode::Esc | KeyCode::Char('q') => back(state, ctx),
        _ => {
            match state.focus {
                Pane::Layers => layers_key(state, key, ctx),
                Pane::Activators => activators_key(state, key, ctx),
            }
            Action::None
        }
    }
}

fn back(state: &ModelState, ctx: &mut Ctx) -> Action {
    Action::Transition(home::enter(ctx, state.user.clone()))
}

fn handle_filter(state: &mut ModelState, key: KeyCode) {
    match key {
        KeyCode::Char(c) => state.layer_filter.push(c),
        KeyCode::Backspace => {
            state.layer_filter.pop();
        }
        KeyCode::Enter => state.filtering = false,
        KeyCode::Esc => {
            state.layer_filter.clear();
            state.filtering = false;
        }
        _ => return,
    }
    state.layer_cursor = 0;
}

fn layers_key(state: &mut ModelState, key: KeyCode, ctx: &mut Ctx) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => {
            state.layer_cursor = state.layer_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.layer_cursor + 1 < state.visible_layers().len() {
                state.layer_cursor += 1;
            }
        }
        KeyCode::Char('/') => state.filtering = true,
        KeyCode::Char('a') => state.overlay = Some(Overlay::LayerPicker(LayerPicker::new())),
        KeyCode::Char('d') => {
            if let Some(id) = state.selected_layer().map(|l| l.activator_target_id) {
                state.send(ModelAction::DeleteLayer { model_layer_id: id }, ctx);
            }
        }
        KeyCode::Enter => {
            if let Some(editor) = state.selected_layer().map(ParamEditor::for_layer) {
                state.overlay = Some(Overlay::Params(editor));
            }
        }
        KeyCode::Char('J') => move_layer(state, 1, ctx),
        KeyCode::Char('K') => move_layer(state, -1, ctx),
        _ => {}
    }
}

/// Moves the selected layer, splicing the local list before the server answers.
fn move_layer(state: &mut ModelState, delta: isize, ctx: &mut Ctx) {
    if !state.layer_filter.is_empty() {
        ctx.notices.info("Clear the filter to reorder layers");
        return;
    }
    let Some(store) = &state.store else {
        return;
    };

    let layers = &store.model().layers;
    let old = state.layer_cursor;
    let Some(new) = reorder::step(old, layers.len(), delta) else {
        return;
    };
    let Some(moved) = reorder::resolve(layers, old, new, |l| l.activator_target_id) else {
        return;
    };

    let action = moved.into_layer_action();
    if state.is_busy(action.subject(), ctx) {
        return;
    }

    if let Some(store) = state.store.as_mut() {
        store.preview_layer_move(old, new);
    }
    state.layer_cursor = new;
    state.send(action, ctx);
}

fn activators_key(state: &mut ModelState, key: KeyCode, ctx: &mut Ctx) {
    match key {
        KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
            state.activator_cursor = state.activator_cursor.saturating_sub(1);
        }
        KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
            let len = state
                .store
                .as_ref()
                .map_or(0, |s| s.model().activators.len());
            if state.activator_cursor + 1 < len {
                state.activator_cursor += 1;
            }
        }
        KeyCode::Char('a') => {
            if let Some(store) = &state.store {
                let choices = catalog::activator_choices(store.model(), &state.catalog);
                state.overlay = Some(Overlay::ActivatorPicker(ActivatorPicker::new(choices)));
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = state.selected_activator().map(|a| a.model_activator_id) {
                state.send(
                    ModelAction::DeleteActivator {
                        model_activator_id: id,
                    },
                    ctx,
                );
            }
        }
        KeyCode::Enter => {
            let editor = state
                .selected_activator()
                .map(|a| (!a.value.parameters().is_empty()).then(|| ParamEditor::for_activator(a)));
            match editor {
                Some(Some(editor)) => state.overlay = Some(Overlay::Params(editor)),
                Some(None) => ctx.notices.info("This activator has no parameters"),
                None => {}
            }
        }
        KeyCode::Char('L') => move_activator(state, 1, ctx),
        KeyCode::Char('H') => move_activator(state, -1, ctx),
        _ => {}
    }
}

/// Moves the selected activator, splicing the local list before the server answers.
fn move_activator(state: &mut ModelState, delta: isize, ctx: &mut Ctx) {
    let Some(store) = &state.store else {
        return;
    };

    let activators = &store.model().activators;
    let old = state.activator_cursor;
    let Some(new) = reorder::step(old, activators.len(), delta) else {
        return;
    };
    let Some(moved) = reorder::resolve(activators, old, new, |a| a.model_activator_id) else {
        return;
    };

    let action = moved.into_activator_action();
    if state.is_busy(action.subject(), ctx) {
        return;
    }

    if let Some(store) = state.store.as_mut() {
        store.preview_activator_move(old, new);
    }
    state.activator_cursor = new;
    state.send(action, ctx);
}

fn handle_overlay(
    state: &mut ModelState,
    overlay: Overlay,
    key: KeyCode,
    ctx: &mut Ctx,
) -> Option<Overlay> {
    match overlay {
        Overlay::LayerPicker(mut picker) => match picker.handle_key(key, &state.catalog) {
            PickerInput::Close => None,
            PickerInput::Pick(action) => {
                picker.pending = state.send(action, ctx);
                Some(Overlay::LayerPicker(picker))
            }
            PickerInput::Docs(url) => {
                if let Err(e) = open::that(&url) {
                    ctx.notices.error(format!("Could not open {url}: {e}"));
                }
                Some(Overlay::LayerPicker(picker))
            }
            PickerInput::None => Some(Overlay::LayerPicker(picker)),
        },
        Overlay::ActivatorPicker(mut picker) => match picker.handle_key(key) {
            PickerInput::Close => None,
            PickerInput::Pick(action) => {
                picker.pending = state.send(action, ctx);
                Some(Overlay::ActivatorPicker(picker))
            }
            PickerInput::Docs(_) | PickerInput::None => Some(Overlay::ActivatorPicker(picker)),
        },
        Overlay::Params(mut editor) => match editor.handle_key(key) {
            ParamInput::Close => None,
            ParamInput::Commit(action) => {
                state.send(action, ctx);
                Some(Overlay::Params(editor))
            }
            ParamInput::None => Some(Overlay::Params(editor)),
        },
        Overlay::Rename(mut form) => match form.handle_key(key) {
            FormInput::Cancel => None,
            FormInput::Submit => {
                let name = form.value("name").trim().to_string();
                let unchanged = state
                    .store
                    .as_ref()
                    .is_some_and(|s| s.model().name == name);
                match models::validate_name(&name) {
                    Err(message) => {
                        form.set_error("name", message);
                        Some(Overlay::Rename(form))
                    }
                    Ok(()) if unchanged => None,
                    Ok(()) => {
                        state.send(ModelAction::RenameModel { name }, ctx);
                        Some(Overlay::Rename(form))
                    }
                }
            }
            FormInput::None => Some(Overlay::Rename(form)),
        },
    }
}

pub fn on_reply(state: &mut ModelState, reply: Reply, ctx: &mut Ctx) -> Action {
    match reply {
        Reply::Opened(Ok((model, catalog))) => {
            ctx.notices.log(format!("Opened {}", model.name));
            state.store = Some(ModelStore::new(model));
            state.catalog = catalog;
            state.clamp_cursors();
            Action::None
        }
        Reply::Opened(Err(e)) => {
            ctx.notices
                .error(format!("Could not open model: {}", e.user_message()));
            back(state, ctx)
        }
        Reply::Updated {
            model_id,
            action,
            result,
        } if model_id == state.model_id => {
            let Some(store) = state.store.as_mut() else {
                return Action::None;
            };

            state.busy.remove(&action.subject());
            let error = result.as_ref().err().map(|e| e.user_message());
            let ok = store.reconcile(&action, result);
            for notice in store.drain_notices() {
                ctx.notices.push(notice);
            }
            if ok {
                ctx.notices.log(format!("{} done", action.describe()));
            }

            state.after_update(&action, ok, error);
            Action::None
        }
        other => super::stale(&other),
    }
}

#[cfg(test)]
mod tests {
    use model_api::{ApiError, ErrorBody, Model};
    use serde_json::json;

    use crate::{
        config::EditorConfig,
        state::{model::Notices, remote::Remote},
    };

    use super::*;

    fn layer(id: i64, name: &str) -> serde_json::Value {
        json!({
            "activatorTargetId": id,
            "displayName": name,
            "name": name,
            "layerType": { "layerTypeId": "torch.nn.Linear", "parameters": [] },
            "parameterData": {}
        })
    }

    fn model(name: &str, layer_ids: &[i64]) -> Model {
        let layers: Vec<_> = layer_ids.iter().map(|id| layer(*id, &format!("fc{id}"))).collect();
        serde_json::from_value(json!({
            "modelId": "m-1",
            "name": name,
            "layers": layers,
            "activators": []
        }))
        .unwrap()
    }

    fn opened(name: &str, layer_ids: &[i64]) -> ModelState {
        let user = User {
            user_id: "u1".into(),
            email: "ann@example.com".into(),
            name: "ann".into(),
            roles: Vec::new(),
        };
        let mut state = ModelState::new(user, "m-1".into());
        state.store = Some(ModelStore::new(model(name, layer_ids)));
        state
    }

    fn config() -> EditorConfig {
        EditorConfig {
            api_url: "http://127.0.0.1:5000/api".into(),
            email: None,
            log_path: "editor.log".into(),
        }
    }

    fn conflict(message: &str) -> ApiError {
        ApiError::Status {
            status: 409,
            body: ErrorBody {
                message: Some(message.into()),
                field: Some("name".into()),
            },
        }
    }

    fn layer_ids(state: &ModelState) -> Vec<i64> {
        let store = state.store.as_ref().unwrap();
        store.model().layers.iter().map(|l| l.activator_target_id).collect()
    }

    #[test]
    fn failed_rename_clears_busy_and_flags_the_field() {
        let remote = Remote::new("http://127.0.0.1:5000/api").unwrap();
        let config = config();
        let mut notices = Notices::new();
        let mut ctx = Ctx {
            remote: &remote,
            notices: &mut notices,
            config: &config,
        };

        let mut state = opened("Net", &[4]);
        state.overlay = Some(Overlay::Rename(Form::new(vec![
            Field::text("name", "Model name").with_value("Taken"),
        ])));
        state.busy.insert(Subject::Model);

        let reply = Reply::Updated {
            model_id: "m-1".into(),
            action: ModelAction::RenameModel {
                name: "Taken".into(),
            },
            result: Err(conflict("name already in use")),
        };
        on_reply(&mut state, reply, &mut ctx);

        assert!(state.busy.is_empty());
        assert_eq!(state.store.as_ref().unwrap().model().name, "Net");
        let Some(Overlay::Rename(form)) = &state.overlay else {
            panic!("rename form should stay open");
        };
        assert_eq!(form.fields[0].error.as_deref(), Some("name already in use"));
        assert_eq!(notices.logs().last().unwrap().level, "ERROR");
    }

    #[test]
    fn successful_update_clears_busy_and_closes_rename() {
        let remote = Remote::new("http://127.0.0.1:5000/api").unwrap();
        let config = config();
        let mut notices = Notices::new();
        let mut ctx = Ctx {
            remote: &remote,
            notices: &mut notices,
            config: &config,
        };

        let mut state = opened("Net", &[4]);
        state.overlay = Some(Overlay::Rename(Form::new(vec![Field::text("name", "Model name")])));
        state.busy.insert(Subject::Model);

        let reply = Reply::Updated {
            model_id: "m-1".into(),
            action: ModelAction::RenameModel {
                name: "Renamed".into(),
            },
            result: Ok(model("Renamed", &[4])),
        };
        on_reply(&mut state, reply, &mut ctx);

        assert!(state.busy.is_empty());
        assert!(state.overlay.is_none());
        assert_eq!(state.store.as_ref().unwrap().model().name, "Renamed");
    }

    #[test]
    fn failed_layer_move_restores_order_and_cursor() {
        let remote = Remote::new("http://127.0.0.1:5000/api").unwrap();
        let config = config();
        let mut notices = Notices::new();
        let mut ctx = Ctx {
            remote: &remote,
            notices: &mut notices,
            config: &config,
        };

        let mut state = opened("Net", &[4, 5, 6]);
        state.busy.insert(Subject::Layer(4));
        state.store.as_mut().unwrap().preview_layer_move(0, 1);
        state.layer_cursor = 1;
        assert_eq!(layer_ids(&state), [5, 4, 6]);

        let reply = Reply::Updated {
            model_id: "m-1".into(),
            action: ModelAction::UpdateLayerOrder {
                model_layer_id: 4,
                new_index: 1,
            },
            result: Err(conflict("order changed")),
        };
        on_reply(&mut state, reply, &mut ctx);

        assert!(state.busy.is_empty());
        assert_eq!(layer_ids(&state), [4, 5, 6]);
        assert_eq!(state.layer_cursor, 0);
    }

    #[test]
    fn replies_for_other_models_are_ignored() {
        let remote = Remote::new("http://127.0.0.1:5000/api").unwrap();
        let config = config();
        let mut notices = Notices::new();
        let mut ctx = Ctx {
            remote: &remote,
            notices: &mut notices,
            config: &config,
        };

        let mut state = opened("Net", &[4]);
        state.busy.insert(Subject::Model);

        let reply = Reply::Updated {
            model_id: "m-2".into(),
            action: ModelAction::RenameModel { name: "x".into() },
            result: Ok(model("x", &[])),
        };
        on_reply(&mut state, reply, &mut ctx);

        assert!(state.busy.contains(&Subject::Model));
        assert_eq!(state.store.as_ref().unwrap().model().name, "Net");
    }
}
