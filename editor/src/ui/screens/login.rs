use crossterm::event::KeyCode;
use model_api::auth::{AuthEvent, AuthState};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
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

use super::{home, register, Action, Ctx, Screen};

const LOGO: &str = r#"
 ┌─┐┌─┐┬─┐┌─┐┬ ┬
 │ ┬├┬┘├─┤├─┘├─┤   model editor
 └─┘┴└─┴ ┴┴  ┴ ┴
"#;

pub struct LoginState {
    auth: AuthState,
    form: Form,
    submitting: bool,
}

impl LoginState {
    pub fn new(email: Option<&str>) -> Self {
        let form = Form::new(vec![
            Field::text("email", "Email").with_value(email.unwrap_or_default()),
            Field::secret("password", "Password"),
        ])
        .focus_first_empty();

        Self {
            auth: AuthState::NotAuthenticated { error: None },
            form,
            submitting: false,
        }
    }
}

/// Opens the login screen, first checking for a still valid session.
pub fn enter(ctx: &mut Ctx) -> Screen {
    let mut state = LoginState::new(ctx.config.email.as_deref());
    state.auth = state.auth.reduce(AuthEvent::LoadingUser);
    ctx.remote.current_user();

    Screen::Login(state)
}

pub fn handle_key(state: &mut LoginState, key: KeyCode, ctx: &mut Ctx) -> Action {
    if state.auth == AuthState::Loading {
        return match key {
            KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
            _ => Action::None,
        };
    }

    if key == KeyCode::F(2) {
        return Action::Transition(Screen::Register(register::RegisterState::new()));
    }

    match state.form.handle_key(key) {
        FormInput::Cancel => Action::Quit,
        FormInput::Submit if !state.submitting => {
            state.form.clear_errors();
            if state.form.require_all() {
                state.submitting = true;
                ctx.remote.login(
                    state.form.value("email").trim().to_string(),
                    state.form.value("password").to_string(),
                );
            }
            Action::None
        }
        _ => Action::None,
    }
}

pub fn on_reply(state: &mut LoginState, reply: Reply, ctx: &mut Ctx) -> Action {
    match reply {
        Reply::CurrentUser(result) | Reply::LoggedIn(result) => {
            state.submitting = false;
            match result {
                Ok(user) => {
                    ctx.notices.info(format!("Signed in as {}", user.name));
                    Action::Transition(home::enter(ctx, user))
                }
                Err(e) => {
                    // A rejected session lookup just means the user has to log in.
                    let checking = state.auth == AuthState::Loading;
                    if e.status().is_none() {
                        ctx.notices.error(e.user_message());
                    } else if !checking && !state.form.apply_error(&e) {
                        state.form.set_error("password", e.user_message());
                    }
                    state.auth = state.auth.clone().reduce(AuthEvent::NotAuthenticated(
                        Some(e.user_message()),
                    ));
                    Action::None
                }
            }
        }
        other => super::stale(&other),
    }
}

pub fn draw(f: &mut Frame, area: Rect, state: &LoginState) {
    let outer = centered_rect(50, 80, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(9),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(outer);

    let logo: Vec<Line> = LOGO
        .lines()
        .map(|l| Line::from(Span::styled(l, Theme::title())))
        .collect();
    f.render_widget(Paragraph::new(logo).alignment(Alignment::Center), chunks[0]);

    let status = match (&state.auth, state.submitting) {
        (AuthState::Loading, _) => Span::styled("checking session...", Theme::busy()),
        (_, true) => Span::styled("signing in...", Theme::busy()),
        _ => Span::styled("Sign in", Theme::title()),
    };
    f.render_widget(
        Paragraph::new(status).alignment(Alignment::Center),
        chunks[1],
    );

    let disabled = state.auth == AuthState::Loading || state.submitting;
    form::draw(f, chunks[2], &state.form, disabled);

    f.render_widget(
        widgets::hints(&[
            ("enter", "next / sign in"),
            ("tab", "switch field"),
            ("F2", "register"),
            ("esc", "quit"),
        ]),
        chunks[4],
    );
}
