use model_api::NoticeLevel;
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::state::model::{Notices, Toast};

use super::theme::Theme;

/// A bordered panel, highlighted when it holds the focus.
pub fn panel(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Theme::border_focused()
    } else {
        Theme::border()
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
        .title_style(Theme::title())
}

pub fn logs(notices: &Notices) -> Paragraph<'_> {
    let tail = notices.logs().iter().rev().take(5).rev();

    let lines = tail
        .map(|l| {
            let style = if l.level == "ERROR" {
                Theme::error()
            } else {
                Theme::dim()
            };
            Line::from(vec![
                Span::styled(format!("[{}] ", l.level), style),
                Span::styled(l.message.as_str(), Theme::text()),
            ])
        })
        .collect::<Vec<_>>();

    Paragraph::new(lines)
        .block(panel(" Events ".into(), false))
        .wrap(Wrap { trim: true })
}

/// A single line of `key  action` pairs.
pub fn hints<'a>(hints: &[(&'a str, &'a str)]) -> Paragraph<'a> {
    let spans = hints
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(*key, Theme::key()),
                Span::styled(format!(" {action}    "), Theme::muted()),
            ]
        })
        .collect::<Vec<_>>();

    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}

pub fn toast(toast: &Toast) -> Paragraph<'_> {
    let (icon, style) = match toast.level {
        NoticeLevel::Info => (" ✔ ", Theme::ok()),
        NoticeLevel::Error => (" ✖ ", Theme::error()),
    };

    Paragraph::new(Line::from(vec![
        Span::styled(icon, style),
        Span::styled(toast.message.as_str(), style),
    ]))
}

/// Highlights generated python source line by line.
pub fn code(source: &str) -> Vec<Line<'_>> {
    source.lines().map(code_line).collect()
}

fn code_line(line: &str) -> Line<'_> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];

    if trimmed.starts_with('#') {
        return Line::from(vec![
            Span::raw(indent),
            Span::styled(trimmed, Theme::code_comment()),
        ]);
    }

    let keyword = ["import ", "class ", "def ", "return ", "super("]
        .iter()
        .find(|k| trimmed.starts_with(**k));

    match keyword {
        Some(k) => {
            let (kw, rest) = trimmed.split_at(k.len());
            Line::from(vec![
                Span::raw(indent),
                Span::styled(kw, Theme::code_keyword()),
                Span::styled(rest, Theme::text()),
            ])
        }
        None => Line::from(Span::styled(line, Theme::text())),
    }
}
