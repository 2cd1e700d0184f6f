use crossterm::event::KeyCode;
use model_api::auth::Registration;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::Span,
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

use super::{login, Action, Ctx, Screen};

pub struct RegisterState {
    form: Form,
    submitting: bool,
}

impl RegisterState {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                Field::text("name", "Name"),
                Field::text("email", "Email"),
                Field::secret("password", "Password"),
                Field::secret("repeatPassword", "Repeat password"),
            ]),
            submitting: false,
        }
    }

    fn registration(&self) -> Registration {
        Registration {
            name: self.form.value("name").trim().to_string(),
            email: self.form.value("email").trim().to_string(),
            password: self.form.value("password").to_string(),
            repeat_password: self.form.value("repeatPassword").to_string(),
        }
    }
}

/// The server reports name clashes under `username`.
fn field_key(server_field: &str) -> &str {
    match server_field {
        "username" => "name",
        other => other,
    }
}

pub fn handle_key(state: &mut RegisterState, key: KeyCode, ctx: &mut Ctx) -> Action {
    if key == KeyCode::F(2) {
        return Action::Transition(Screen::Login(login::LoginState::new(None)));
    }

    match state.form.handle_key(key) {
        FormInput::Cancel => Action::Transition(Screen::Login(login::LoginState::new(None))),
        FormInput::Submit if !state.submitting => {
            state.form.clear_errors();
            if !state.form.require_all() {
                return Action::None;
            }

            let registration = state.registration();
            if registration.password != registration.repeat_password {
                state
                    .form
                    .set_error("repeatPassword", "passwords do not match");
                return Action::None;
            }

            state.submitting = true;
            ctx.remote.register(registration);
            Action::None
        }
        _ => Action::None,
    }
}

pub fn on_reply(state: &mut RegisterState, reply: Reply, ctx: &mut Ctx) -> Action {
    match reply {
        Reply::Registered(Ok(())) => {
            let email = state.form.value("email").trim().to_string();
            ctx.notices.info("Account created, please sign in");
            Action::Transition(Screen::Login(login::LoginState::new(Some(&email))))
        }
        Reply::Registered(Err(e)) => {
            state.submitting = false;
            let shown = e
                .field_error()
                .map(|(field, message)| (field_key(field).to_string(), message.to_string()))
                .is_some_and(|(key, message)| state.form.set_error(&key, message));
            if !shown {
                ctx.notices.error(format!("Registration failed: {}", e.user_message()));
            }
            Action::None
        }
        other => super::stale(&other),
    }
}

pub fn draw(f: &mut Frame, area: Rect, state: &RegisterState) {
    let outer = centered_rect(50, 90, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(17),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(outer);

    let title = if state.submitting {
        Span::styled("creating account...", Theme::busy())
    } else {
        Span::styled("Create an account", Theme::title())
    };
    f.render_widget(Paragraph::new(title).alignment(Alignment::Center), chunks[0]);

    form::draw(f, chunks[1], &state.form, state.submitting);

    f.render_widget(
        widgets::hints(&[
            ("enter", "next / register"),
            ("tab", "switch field"),
            ("esc", "back to sign in"),
        ]),
        chunks[3],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_errors_map_to_the_name_field() {
        assert_eq!(field_key("username"), "name");
        assert_eq!(field_key("repeatPassword"), "repeatPassword");
    }
}
