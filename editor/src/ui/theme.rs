use ratatui::style::{Color, Modifier, Style};

/// Blueprint theme.
///
/// Base aesthetic:
/// - pale blue foreground
/// - deep navy background
/// - warm accents for selection and errors
pub struct Theme;

impl Theme {
    // Core palette
    pub const BG: Color = Color::Rgb(10, 14, 28);
    pub const FG: Color = Color::Rgb(200, 220, 255);
    pub const FG_DIM: Color = Color::Rgb(120, 150, 200);
    pub const FG_MUTED: Color = Color::Rgb(70, 80, 105);

    // Accents
    pub const ACCENT_CYAN: Color = Color::Rgb(80, 220, 255);
    pub const ACCENT_AMBER: Color = Color::Rgb(255, 190, 60);
    pub const ACCENT_GREEN: Color = Color::Rgb(110, 230, 140);
    pub const ACCENT_RED: Color = Color::Rgb(255, 90, 90);

    /// Default full-screen style.
    pub fn base() -> Style {
        Style::default().fg(Self::FG).bg(Self::BG)
    }

    /// Panel borders.
    pub fn border() -> Style {
        Style::default().fg(Self::FG_DIM).bg(Self::BG)
    }

    /// Border of the pane holding the focus.
    pub fn border_focused() -> Style {
        Style::default()
            .fg(Self::ACCENT_CYAN)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Style::default().fg(Self::FG).add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::FG)
    }

    /// Secondary text.
    pub fn dim() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    /// Disabled text and placeholders.
    pub fn muted() -> Style {
        Style::default().fg(Self::FG_MUTED)
    }

    /// Selected row.
    pub fn highlight_bg() -> Style {
        Style::default()
            .bg(Color::Rgb(28, 40, 72))
            .add_modifier(Modifier::BOLD)
    }

    pub fn ok() -> Style {
        Style::default()
            .fg(Self::ACCENT_GREEN)
            .add_modifier(Modifier::BOLD)
    }

    /// In-flight requests.
    pub fn busy() -> Style {
        Style::default()
            .fg(Self::ACCENT_AMBER)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Self::ACCENT_RED)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key() -> Style {
        Style::default()
            .fg(Self::ACCENT_CYAN)
            .add_modifier(Modifier::BOLD)
    }

    /// Python keywords in the code preview.
    pub fn code_keyword() -> Style {
        Style::default()
            .fg(Self::ACCENT_AMBER)
            .add_modifier(Modifier::BOLD)
    }

    pub fn code_comment() -> Style {
        Style::default()
            .fg(Self::FG_MUTED)
            .add_modifier(Modifier::ITALIC)
    }
}
