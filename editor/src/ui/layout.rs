use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Splits the screen into (body, status line).
pub fn frame(area: Rect) -> (Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    (rows[0], rows[1])
}

/// Computes the model page regions.
///
/// # Returns
/// (header, body, logs_opt, hints)
pub fn vertical(area: Rect, show_logs: bool) -> (Rect, Rect, Option<Rect>, Rect) {
    let constraints = if show_logs {
        vec![
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(1),
        ]
    } else {
        vec![Constraint::Length(3), Constraint::Min(10), Constraint::Length(1)]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let header = chunks[0];
    let body = chunks[1];
    let (logs, hints) = if show_logs {
        (Some(chunks[2]), chunks[3])
    } else {
        (None, chunks[2])
    };

    (header, body, logs, hints)
}

/// Splits the model page body into (layers, activators, preview_opt).
pub fn body(area: Rect, show_preview: bool) -> (Rect, Rect, Option<Rect>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    if !show_preview {
        return (cols[0], cols[1], None);
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(6)])
        .split(cols[1]);

    (cols[0], rows[0], Some(rows[1]))
}

/// A rect of the given percentages centered inside `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}
