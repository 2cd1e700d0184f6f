use crossterm::event::KeyCode;
use model_api::ApiError;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{theme::Theme, widgets};

/// One text input of a [`Form`].
#[derive(Debug, Clone)]
pub struct Field {
    /// Matches the field name the server uses in validation errors.
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub secret: bool,
    pub error: Option<String>,
}

impl Field {
    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            value: String::new(),
            secret: false,
            error: None,
        }
    }

    pub fn secret(key: &'static str, label: &'static str) -> Self {
        Self {
            secret: true,
            ..Self::text(key, label)
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// What a key press meant to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    None,
    Submit,
    Cancel,
}

/// A vertical list of text fields with per-field error messages.
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    /// Moves the focus to the first empty field.
    pub fn focus_first_empty(mut self) -> Self {
        self.focus = self
            .fields
            .iter()
            .position(|f| f.value.is_empty())
            .unwrap_or(0);
        self
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    /// Attaches an error to the field named `key`.
    ///
    /// # Returns
    /// `false` if no field has that key.
    pub fn set_error(&mut self, key: &str, message: impl Into<String>) -> bool {
        match self.fields.iter().position(|f| f.key == key) {
            Some(i) => {
                self.fields[i].error = Some(message.into());
                self.focus = i;
                true
            }
            None => false,
        }
    }

    /// Shows a server validation error on its field.
    ///
    /// # Returns
    /// `false` if the error names no field of this form.
    pub fn apply_error(&mut self, err: &ApiError) -> bool {
        match err.field_error() {
            Some((field, message)) => self.set_error(field, message),
            None => false,
        }
    }

    pub fn clear_errors(&mut self) {
        for field in &mut self.fields {
            field.error = None;
        }
    }

    /// Requires every field to be filled in.
    ///
    /// # Returns
    /// `true` if nothing is missing.
    pub fn require_all(&mut self) -> bool {
        let missing: Vec<_> = self
            .fields
            .iter()
            .filter(|f| f.value.trim().is_empty())
            .map(|f| (f.key, format!("{} is required", f.label.to_lowercase())))
            .collect();

        for (key, message) in missing.iter().rev() {
            self.set_error(key, message.as_str());
        }

        missing.is_empty()
    }

    pub fn handle_key(&mut self, key: KeyCode) -> FormInput {
        match key {
            KeyCode::Esc => FormInput::Cancel,
            KeyCode::Enter if self.focus + 1 < self.fields.len() => {
                self.focus += 1;
                FormInput::None
            }
            KeyCode::Enter => FormInput::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.fields.len().max(1);
                FormInput::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                let len = self.fields.len().max(1);
                self.focus = (self.focus + len - 1) % len;
                FormInput::None
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.push(c);
                    field.error = None;
                }
                FormInput::None
            }
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.pop();
                    field.error = None;
                }
                FormInput::None
            }
            _ => FormInput::None,
        }
    }
}

/// Draws the form fields stacked inside `area`.
pub fn draw(f: &mut Frame, area: Rect, form: &Form, disabled: bool) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            form.fields
                .iter()
                .map(|_| Constraint::Length(4))
                .chain(std::iter::once(Constraint::Min(0)))
                .collect::<Vec<_>>(),
        )
        .split(area);

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus && !disabled;
        let input_area = Rect {
            height: 3,
            ..rows[i]
        };
        let error_area = Rect {
            y: rows[i].y + 3,
            height: 1,
            ..rows[i]
        };

        let block = widgets::panel(format!(" {} ", field.label), focused);
        let inner = block.inner(input_area);
        f.render_widget(block, input_area);

        let shown = if field.secret {
            "•".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let mut spans = vec![Span::styled(shown, Theme::text())];
        if focused {
            spans.push(Span::styled("█", Theme::key()));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), inner);

        if let Some(error) = &field.error {
            f.render_widget(
                Paragraph::new(Span::styled(format!(" ✖ {error}"), Theme::error())),
                error_area,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use model_api::ErrorBody;

    use super::*;

    fn login_form() -> Form {
        Form::new(vec![
            Field::text("email", "Email"),
            Field::secret("password", "Password"),
        ])
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut form = login_form();
        for c in "ann".chars() {
            form.handle_key(KeyCode::Char(c));
        }
        assert_eq!(form.handle_key(KeyCode::Enter), FormInput::None);
        form.handle_key(KeyCode::Char('x'));
        form.handle_key(KeyCode::Backspace);
        form.handle_key(KeyCode::Char('p'));

        assert_eq!(form.value("email"), "ann");
        assert_eq!(form.value("password"), "p");
        assert_eq!(form.handle_key(KeyCode::Enter), FormInput::Submit);
    }

    #[test]
    fn server_field_errors_land_on_their_field() {
        let mut form = login_form();
        let err = ApiError::Status {
            status: 401,
            body: ErrorBody {
                message: Some("Email or password incorrect".into()),
                field: Some("password".into()),
            },
        };

        assert!(form.apply_error(&err));
        assert_eq!(form.focus, 1);
        assert_eq!(
            form.fields[1].error.as_deref(),
            Some("Email or password incorrect")
        );
        assert!(!form.set_error("username", "taken"));
    }

    #[test]
    fn require_all_focuses_the_first_missing_field() {
        let mut form = Form::new(vec![
            Field::text("email", "Email").with_value("ann@example.com"),
            Field::secret("password", "Password"),
            Field::secret("repeatPassword", "Repeat password"),
        ]);

        assert!(!form.require_all());
        assert_eq!(form.focus, 1);
        assert_eq!(form.fields[2].error.as_deref(), Some("repeat password is required"));
        assert!(form.fields[0].error.is_none());
    }
}
