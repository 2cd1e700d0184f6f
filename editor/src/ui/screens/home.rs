use crossterm::event::KeyCode;
use model_api::{models, Model, User};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Duration,
    OffsetDateTime, PrimitiveDateTime,
};

use crate::{
    state::remote::Reply,
    ui::{
        form::{self, Field, Form, FormInput},
        layout::centered_rect,
        theme::Theme,
        widgets,
    },
};

use super::{login, model, Action, Ctx, Screen};

pub struct HomeState {
    user: User,
    models: Vec<Model>,
    selected: usize,
    loading: bool,
    /// The name prompt of a model being created.
    prompt: Option<Form>,
    creating: bool,
}

impl HomeState {
    pub fn new(user: User) -> Self {
        Self {
            user,
            models: Vec::new(),
            selected: 0,
            loading: true,
            prompt: None,
            creating: false,
        }
    }
}

/// Opens the model list and starts loading it.
pub fn enter(ctx: &mut Ctx, user: User) -> Screen {
    ctx.remote.list_models();
    Screen::Home(HomeState::new(user))
}

pub fn handle_key(state: &mut HomeState, key: KeyCode, ctx: &mut Ctx) -> Action {
    if let Some(prompt) = &mut state.prompt {
        match prompt.handle_key(key) {
            FormInput::Cancel => state.prompt = None,
            FormInput::Submit if !state.creating => {
                let name = prompt.value("name").trim().to_string();
                match models::validate_name(&name) {
                    Ok(()) => {
                        state.creating = true;
                        ctx.remote.create_model(name);
                    }
                    Err(message) => {
                        prompt.set_error("name", message);
                    }
                }
            }
            _ => {}
        }
        return Action::None;
    }

    match key {
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected = state.selected.saturating_sub(1);
            Action::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.selected + 1 < state.models.len() {
                state.selected += 1;
            }
            Action::None
        }
        KeyCode::Enter => match state.models.get(state.selected) {
            Some(m) => Action::Transition(model::enter(
                ctx,
                state.user.clone(),
                m.model_id.clone(),
            )),
            None => Action::None,
        },
        KeyCode::Char('n') => {
            state.prompt = Some(Form::new(vec![Field::text("name", "Model name")]));
            Action::None
        }
        KeyCode::Char('r') => {
            state.loading = true;
            ctx.remote.list_models();
            Action::None
        }
        KeyCode::Char('x') => {
            ctx.remote.logout();
            Action::None
        }
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => Action::None,
    }
}

pub fn on_reply(state: &mut HomeState, reply: Reply, ctx: &mut Ctx) -> Action {
    match reply {
        Reply::Models(result) => {
            state.loading = false;
            match result {
                Ok(models) => {
                    state.models = models;
                    state.selected = state.selected.min(state.models.len().saturating_sub(1));
                }
                Err(e) => ctx
                    .notices
                    .error(format!("Could not load models: {}", e.user_message())),
            }
            Action::None
        }
        Reply::Created(result) => {
            state.creating = false;
            match result {
                Ok(model_id) => {
                    state.prompt = None;
                    ctx.notices.info("Model created");
                    Action::Transition(model::enter(ctx, state.user.clone(), model_id))
                }
                Err(e) => {
                    let shown = state.prompt.as_mut().is_some_and(|prompt| {
                        prompt.apply_error(&e) || prompt.set_error("name", e.user_message())
                    });
                    if !shown {
                        ctx.notices.error(e.user_message());
                    }
                    Action::None
                }
            }
        }
        Reply::LoggedOut(result) => {
            // The session is dropped locally whatever the server said.
            if let Err(e) = result {
                log::warn!("logout failed: {e}");
            }
            ctx.notices.info("Signed out");
            Action::Transition(Screen::Login(login::LoginState::new(
                ctx.config.email.as_deref(),
            )))
        }
        other => super::stale(&other),
    }
}

/// Describes how long ago `raw` was, e.g. `5 minutes ago`.
///
/// Accepts RFC 3339 and the server's `YYYY-MM-DD HH:MM:SS[.ffffff]` form,
/// which is read as UTC. Unparseable input is returned as is.
pub fn relative(raw: &str, now: OffsetDateTime) -> String {
    let Some(at) = parse_timestamp(raw) else {
        return raw.to_string();
    };

    let elapsed = now - at;
    if elapsed < Duration::MINUTE {
        "just now".to_string()
    } else if elapsed < Duration::HOUR {
        format!("{} ago", plural(elapsed.whole_minutes(), "minute"))
    } else if elapsed < Duration::DAY {
        format!("{} ago", plural(elapsed.whole_hours(), "hour"))
    } else if elapsed < Duration::days(30) {
        format!("{} ago", plural(elapsed.whole_days(), "day"))
    } else {
        at.date().to_string()
    }
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let normalized = raw.trim().replacen(' ', "T", 1);
    if let Ok(at) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Some(at);
    }

    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    PrimitiveDateTime::parse(&normalized, naive)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

pub fn draw(f: &mut Frame, area: Rect, state: &HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let count = state.models.len();
    let header = Line::from(vec![
        Span::styled(
            format!(" {count} model{}", if count == 1 { "" } else { "s" }),
            Theme::title(),
        ),
        Span::styled(format!("   signed in as {}", state.user.name), Theme::dim()),
        Span::styled(
            if state.loading { "   loading..." } else { "" },
            Theme::busy(),
        ),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    let now = OffsetDateTime::now_utc();
    let rows = state.models.iter().map(|m| {
        Row::new(vec![
            Cell::from(m.name.clone()),
            Cell::from(format!("{}", m.layers.len())),
            Cell::from(format!("{}", m.activators.len())),
            Cell::from(relative(&m.updated_at, now)),
            Cell::from(relative(&m.created_at, now)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(18),
            Constraint::Length(18),
        ],
    )
    .header(Row::new(vec!["name", "layers", "activators", "edited", "created"]).style(Theme::dim()))
    .highlight_style(Theme::highlight_bg())
    .highlight_symbol("▶ ")
    .block(widgets::panel(" Models ".into(), state.prompt.is_none()));

    let mut table_state = TableState::default().with_selected(Some(state.selected));
    f.render_stateful_widget(table, chunks[1], &mut table_state);

    f.render_widget(
        widgets::hints(&[
            ("enter", "open"),
            ("n", "new"),
            ("r", "refresh"),
            ("x", "sign out"),
            ("q", "quit"),
        ]),
        chunks[2],
    );

    if let Some(prompt) = &state.prompt {
        let popup = centered_rect(50, 30, area);
        f.render_widget(Clear, popup);
        let block = widgets::panel(" New model ".into(), true);
        let inner = block.inner(popup);
        f.render_widget(block, popup);
        form::draw(f, inner, prompt, state.creating);
    }
}
