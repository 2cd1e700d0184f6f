use ratatui::{widgets::Block, Frame};

use crate::state::model::Notices;

use super::{layout, screens::Screen, theme::Theme, widgets};

/// Draws the entire UI.
pub fn draw(f: &mut Frame, screen: &Screen, notices: &Notices) {
    let area = f.size();
    f.render_widget(Block::default().style(Theme::base()), area);

    let (body, status) = layout::frame(area);
    screen.draw(f, body, notices);

    if let Some(toast) = notices.toast() {
        f.render_widget(widgets::toast(toast), status);
    }
}
