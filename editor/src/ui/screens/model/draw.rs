use model_api::{catalog, Model, Subject};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::{
    state::model::Notices,
    ui::{form, layout, theme::Theme, widgets},
};

use super::{
    params::ParamEditor,
    picker::{ActivatorPicker, LayerPicker},
    ModelState, Overlay, Pane,
};

pub fn draw(f: &mut Frame, area: Rect, state: &ModelState, notices: &Notices) {
    let (header, body, logs, hints) = layout::vertical(area, true);

    let Some(store) = &state.store else {
        draw_header(f, header, state, None);
        f.render_widget(
            Paragraph::new(Span::styled("Loading model...", Theme::busy()))
                .block(widgets::panel(" Model ".into(), false)),
            body,
        );
        f.render_widget(widgets::hints(&[("esc", "back")]), hints);
        return;
    };
    let model = store.model();

    draw_header(f, header, state, Some(model));

    let (layers_area, activators_area, preview_area) = layout::body(body, state.show_preview);
    draw_layers(f, layers_area, state, model);
    draw_activators(f, activators_area, state, model);

    if let Some(preview) = preview_area {
        let source = codegen::render(model);
        f.render_widget(
            Paragraph::new(widgets::code(&source))
                .block(widgets::panel(" Preview ".into(), false))
                .scroll((state.preview_scroll, 0)),
            preview,
        );
    }

    if let Some(logs) = logs {
        f.render_widget(widgets::logs(notices), logs);
    }
    f.render_widget(widgets::hints(hint_keys(state)), hints);

    match &state.overlay {
        Some(Overlay::LayerPicker(picker)) => draw_layer_picker(f, area, state, picker),
        Some(Overlay::ActivatorPicker(picker)) => draw_activator_picker(f, area, picker),
        Some(Overlay::Params(editor)) => draw_params(f, area, state, editor),
        Some(Overlay::Rename(form)) => {
            let popup = layout::centered_rect(50, 30, area);
            f.render_widget(Clear, popup);
            let block = widgets::panel(" Rename ".into(), true);
            let inner = block.inner(popup);
            f.render_widget(block, popup);
            form::draw(f, inner, form, state.busy.contains(&Subject::Model));
        }
        None => {}
    }
}

fn draw_header(f: &mut Frame, area: Rect, state: &ModelState, model: Option<&Model>) {
    let name = model.map_or(state.model_id.as_str(), |m| m.name.as_str());

    let mut spans = vec![
        Span::styled(format!(" {name} "), Theme::title()),
        Span::styled(format!("  {}", state.user.name), Theme::dim()),
    ];
    if !state.busy.is_empty() {
        spans.push(Span::styled(
            format!("   {} pending", state.busy.len()),
            Theme::busy(),
        ));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).block(widgets::panel(" Model ".into(), false)),
        area,
    );
}

fn draw_layers(f: &mut Frame, area: Rect, state: &ModelState, model: &Model) {
    let items = state
        .visible_layers()
        .into_iter()
        .filter_map(|i| model.layers.get(i))
        .map(|l| {
            let busy = state.busy.contains(&Subject::Layer(l.activator_target_id));
            let mut spans = vec![
                Span::styled(l.label().to_string(), Theme::text()),
                Span::styled(format!("  {}", l.layer_type.layer_type_id), Theme::dim()),
            ];
            if busy {
                spans.push(Span::styled("  …", Theme::busy()));
            }
            ListItem::new(Line::from(spans))
        })
        .collect::<Vec<_>>();

    let title = if state.filtering || !state.layer_filter.is_empty() {
        format!(" Layers /{} ", state.layer_filter)
    } else {
        format!(" Layers ({}) ", model.layers.len())
    };

    let empty = items.is_empty();
    let list = List::new(items)
        .block(widgets::panel(title, state.focus == Pane::Layers))
        .highlight_style(Theme::highlight_bg())
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default().with_selected((!empty).then_some(state.layer_cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_activators(f: &mut Frame, area: Rect, state: &ModelState, model: &Model) {
    let focused = state.focus == Pane::Activators;
    let mut spans = vec![Span::styled("DATA", Theme::key())];

    for (i, a) in model.activators.iter().enumerate() {
        spans.push(Span::styled(" → ", Theme::muted()));

        let style = if state.busy.contains(&Subject::Activator(a.model_activator_id)) {
            Theme::busy()
        } else if !catalog::target_exists(model, &a.value) {
            Theme::error()
        } else if focused && i == state.activator_cursor {
            Theme::highlight_bg()
        } else {
            Theme::text()
        };
        spans.push(Span::styled(
            format!("[{} #{}]", a.value.label(), a.model_activator_id),
            style,
        ));
    }
    spans.push(Span::styled(" → +", Theme::muted()));

    f.render_widget(
        Paragraph::new(Line::from(spans))
            .block(widgets::panel(
                format!(" Activators ({}) ", model.activators.len()),
                focused,
            ))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_layer_picker(f: &mut Frame, area: Rect, state: &ModelState, picker: &LayerPicker) {
    let popup = layout::centered_rect(60, 60, area);
    f.render_widget(Clear, popup);

    let visible = picker.visible(&state.catalog);
    let items = visible
        .iter()
        .map(|t| {
            ListItem::new(Line::from(vec![
                Span::styled(t.layer_type_id.clone(), Theme::text()),
                Span::styled(
                    format!("  {}", t.description.as_deref().unwrap_or("")),
                    Theme::dim(),
                ),
            ]))
        })
        .collect::<Vec<_>>();

    let title = if picker.pending {
        " Adding layer... ".to_string()
    } else {
        format!(" Add layer /{} ", picker.filter)
    };
    let list = List::new(items)
        .block(widgets::panel(title, true))
        .highlight_style(Theme::highlight_bg())
        .highlight_symbol("▶ ");

    let mut list_state =
        ListState::default().with_selected((!visible.is_empty()).then_some(picker.selected));
    f.render_stateful_widget(list, popup, &mut list_state);
}

fn draw_activator_picker(f: &mut Frame, area: Rect, picker: &ActivatorPicker) {
    let popup = layout::centered_rect(60, 60, area);
    f.render_widget(Clear, popup);

    let items = picker
        .choices
        .iter()
        .map(|c| {
            let kind = match c.kind {
                catalog::ChoiceKind::Layer => "layer",
                catalog::ChoiceKind::Function => "fn",
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{kind:<6}"), Theme::muted()),
                Span::styled(c.label.clone(), Theme::text()),
                Span::styled(format!("  {}", c.description), Theme::dim()),
            ]))
        })
        .collect::<Vec<_>>();

    let title = if picker.pending {
        " Adding activator... "
    } else {
        " Add activator "
    };
    let list = List::new(items)
        .block(widgets::panel(title.into(), true))
        .highlight_style(Theme::highlight_bg())
        .highlight_symbol("▶ ");

    let mut list_state =
        ListState::default().with_selected((!picker.choices.is_empty()).then_some(picker.selected));
    f.render_stateful_widget(list, popup, &mut list_state);
}

fn draw_params(f: &mut Frame, area: Rect, state: &ModelState, editor: &ParamEditor) {
    let popup = layout::centered_rect(60, 50, area);
    f.render_widget(Clear, popup);

    let lines = if editor.rows.is_empty() {
        vec![Line::from(Span::styled("No parameters", Theme::muted()))]
    } else {
        editor
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let selected = i == editor.selected;
                let mut spans = vec![
                    Span::styled(if selected { "▶ " } else { "  " }, Theme::key()),
                    Span::styled(format!("{:<20}", row.param.name), Theme::dim()),
                ];

                let value_style = if selected && editor.editing {
                    Theme::highlight_bg()
                } else if row.draft != row.saved {
                    Theme::busy()
                } else {
                    Theme::text()
                };
                spans.push(Span::styled(row.draft.clone(), value_style));
                if selected && editor.editing {
                    spans.push(Span::styled("█", Theme::key()));
                }
                if row.draft.is_empty() && !row.param.default_value.is_empty() {
                    spans.push(Span::styled(
                        format!("  default {}", row.param.default_value),
                        Theme::muted(),
                    ));
                }
                Line::from(spans)
            })
            .collect()
    };

    let title = if state.busy.is_empty() {
        editor.title.clone()
    } else {
        format!("{}(saving) ", editor.title)
    };
    f.render_widget(
        Paragraph::new(lines).block(widgets::panel(title, true)),
        popup,
    );
}

fn hint_keys(state: &ModelState) -> &'static [(&'static str, &'static str)] {
    if state.filtering {
        return &[("type", "filter"), ("enter", "keep"), ("esc", "clear")];
    }

    match (&state.overlay, state.focus) {
        (Some(Overlay::LayerPicker(_)), _) => {
            &[("type", "filter"), ("enter", "add"), ("F1", "docs"), ("esc", "close")]
        }
        (Some(Overlay::ActivatorPicker(_)), _) => &[("↑↓", "select"), ("enter", "add"), ("esc", "close")],
        (Some(Overlay::Params(editor)), _) if editor.editing => {
            &[("enter", "save"), ("esc", "discard")]
        }
        (Some(Overlay::Params(_)), _) => &[("↑↓", "select"), ("enter", "edit"), ("space", "toggle"), ("esc", "close")],
        (Some(Overlay::Rename(_)), _) => &[("enter", "save"), ("esc", "cancel")],
        (None, Pane::Layers) => &[
            ("a", "add"),
            ("d", "delete"),
            ("enter", "params"),
            ("J/K", "move"),
            ("/", "filter"),
            ("tab", "activators"),
            ("c", "code"),
            ("r", "rename"),
            ("q", "back"),
        ],
        (None, Pane::Activators) => &[
            ("a", "add"),
            ("d", "delete"),
            ("enter", "params"),
            ("H/L", "move"),
            ("tab", "layers"),
            ("c", "code"),
            ("r", "rename"),
            ("q", "back"),
        ],
    }
}
