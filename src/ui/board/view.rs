use std::time::Instant;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::controller::NotificationKind;
use crate::store::Store;
use crate::view::{Filter, SortKey, TaskView};

use super::app::{AppState, DeleteConfirmState};
use super::form::{FormFieldId, TaskForm};

const ID_WIDTH: usize = 4;
const PRIORITY_WIDTH: usize = 6;
const HELP_KEY_WIDTH: usize = 12;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_DETAIL: Color = Color::Rgb(180, 156, 92);

pub fn render<S: Store>(frame: &mut Frame, app: &AppState<S>) {
    let now = Instant::now();
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_tabs(frame, app, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[1]);
    render_list(frame, app, main[0]);
    render_detail(frame, app, main[1]);

    render_footer(frame, app, chunks[2], now);

    if let Some(index) = app.sort_picker {
        render_sort_modal(frame, area, index);
    }
    if let Some(state) = app.delete_confirm.as_ref() {
        if app.delete_prompt_visible(now) {
            render_delete_confirm_modal(frame, area, state);
        }
    }
}

fn render_tabs<S: Store>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let summary = app.board().summary;
    let mut spans = Vec::new();
    for (idx, filter) in Filter::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(COLOR_MUTED_DARK)));
        }
        let (label, count, color) = match filter {
            Filter::All => ("All", summary.total, COLOR_INFO),
            Filter::Active => ("Active", summary.active, COLOR_ACCENT),
            Filter::Completed => ("Completed", summary.completed, COLOR_SUCCESS),
        };
        let text = format!("{} {label} ({count})", idx + 1);
        let style = if app.filter() == filter {
            Style::default()
                .fg(color)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        spans.push(Span::styled(text, style));
    }
    spans.push(Span::styled(
        format!("    sort: {}", app.sort().label()),
        Style::default().fg(COLOR_WARNING),
    ));

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_list<S: Store>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    let tasks = &app.board().tasks;

    if tasks.is_empty() {
        let empty = match app.filter() {
            Filter::All => "No tasks yet. Press n to add one.",
            Filter::Active => "No active tasks",
            Filter::Completed => "No completed tasks",
        };
        lines.push(Line::from(Span::styled(
            empty,
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let list_height = area.height.saturating_sub(2) as usize;
        let (start, end) = list_window(tasks.len(), app.selected, list_height);
        for (pos, task) in tasks.iter().enumerate().take(end).skip(start) {
            lines.push(render_list_row(
                task,
                pos == app.selected,
                app.is_marked_for_delete(task.id),
                content_width,
            ));
        }
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Tasks ({})", tasks.len()))
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_detail<S: Store>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let (title, content) = if let Some(form) = app.form.as_ref() {
        ("New Task", build_form_lines(form, content_width))
    } else if app.show_help {
        ("Help", build_help_lines(content_width))
    } else {
        ("Details", build_detail_lines(app.selected_task()))
    };
    let widget = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_footer<S: Store>(frame: &mut Frame, app: &AppState<S>, area: Rect, now: Instant) {
    let hint_span = Span::styled(app.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = match app.current_notification(now) {
        Some(notification) => Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(
                notification.message.clone(),
                notification_style(notification.kind),
            ),
        ]),
        None => Line::from(hint_span),
    };
    let counts_line = Line::from(Span::styled(
        app.board().summary.to_string(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_sort_modal(frame: &mut Frame, area: Rect, selected: usize) {
    let content_width = 26u16.min(area.width.saturating_sub(6));
    let height = (SortKey::ALL.len() as u16 + 4).min(area.height.saturating_sub(4));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, sort) in SortKey::ALL.iter().enumerate() {
        let mut span = Span::styled(
            sort.label(),
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        );
        if idx == selected {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(span));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter apply  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Sort by"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_delete_confirm_modal(frame: &mut Frame, area: Rect, state: &DeleteConfirmState) {
    let content_width = area.width.saturating_sub(8).min(64);
    let height = 8u16.min(area.height.saturating_sub(6).max(7));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let title_width = (content_width as usize).saturating_sub(10);
    let lines = vec![
        Line::from(Span::styled(
            "Are you sure you want to delete this task?",
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(COLOR_MUTED_DARK)),
            Span::styled(state.task_id.to_string(), id_style()),
        ]),
        Line::from(vec![
            Span::styled("Title: ", Style::default().fg(COLOR_MUTED_DARK)),
            Span::styled(
                truncate_text(&state.title, title_width),
                Style::default().fg(COLOR_TEXT),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "y/enter confirm  n/esc cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Delete Task"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn build_form_lines(form: &TaskForm, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, field) in form.fields().iter().enumerate() {
        let active = idx == form.active_index();
        let marker = if active { "> " } else { "  " };
        let label = if field.required {
            format!("{}{} *", marker, field.label)
        } else {
            format!("{}{}", marker, field.label)
        };
        let label_style = if active {
            Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        lines.push(Line::from(Span::styled(label, label_style)));

        let value = if field.id == FormFieldId::Priority && field.value.is_empty() {
            "<choose with \u{2190}/\u{2192}>".to_string()
        } else if active {
            format!("{}_", field.value)
        } else {
            field.value.clone()
        };
        let value_style = match field.id {
            FormFieldId::Priority if !field.value.is_empty() => {
                Style::default().fg(priority_color(&field.value))
            }
            _ if field.error.is_some() => Style::default().fg(COLOR_ERROR),
            _ => Style::default().fg(COLOR_TEXT),
        };
        lines.push(Line::from(Span::styled(
            format!("  {}", truncate_text(&value, width.saturating_sub(2))),
            value_style,
        )));

        if let Some(error) = field.error.as_ref() {
            lines.push(Line::from(Span::styled(
                format!("  {error}"),
                Style::default().fg(COLOR_ERROR),
            )));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn build_detail_lines(task: Option<&TaskView>) -> Vec<Line<'static>> {
    let Some(task) = task else {
        return vec![Line::from(Span::styled(
            "No task selected",
            Style::default().fg(COLOR_MUTED),
        ))];
    };

    let title_style = if task.completed {
        Style::default()
            .fg(COLOR_MUTED)
            .add_modifier(Modifier::BOLD | Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD)
    };
    let mut lines = vec![
        Line::from(Span::styled(task.title.clone(), title_style)),
        Line::from(""),
        Line::from(vec![
            label_span("ID:        "),
            Span::styled(task.id.to_string(), id_style()),
        ]),
        Line::from(vec![
            label_span("Status:    "),
            if task.completed {
                Span::styled("completed", Style::default().fg(COLOR_SUCCESS))
            } else {
                Span::styled("active", Style::default().fg(COLOR_INFO))
            },
        ]),
        Line::from(vec![
            label_span("Priority:  "),
            Span::styled(
                task.priority_label.clone(),
                Style::default()
                    .fg(priority_color(&task.priority_label))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            label_span("Due:       "),
            Span::styled(task.due_label.clone(), Style::default().fg(COLOR_TEXT)),
        ]),
        Line::from(vec![
            label_span("Created:   "),
            Span::styled(task.age_label.clone(), Style::default().fg(COLOR_TEXT)),
        ]),
    ];

    if let Some(description) = task.description.as_ref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Description",
            Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
        )));
        for text in description.lines() {
            lines.push(Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(COLOR_TEXT),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("space: {}", task.toggle_hint),
        Style::default().fg(COLOR_MUTED_DARK),
    )));
    lines
}

fn build_help_lines(width: usize) -> Vec<Line<'static>> {
    vec![
        help_header("Commands"),
        help_line("j/k", "move selection", width),
        help_line("g/G", "first or last task", width),
        help_line("n", "new task", width),
        help_line("space/enter", "toggle completed", width),
        help_line("d", "delete task", width),
        help_line("1/2/3", "all, active, completed", width),
        help_line("s", "choose sort order", width),
        help_line("r", "reload tasks", width),
        help_line("q/esc", "quit", width),
        help_line("?", "hide help", width),
    ]
}

fn help_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(truncate_text(desc, desc_width), Style::default().fg(COLOR_MUTED)),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_list_row(task: &TaskView, selected: bool, marked: bool, width: usize) -> Line<'static> {
    let check = if task.completed { "[x] " } else { "[ ] " };
    let id_text = pad_text(&task.id.to_string(), ID_WIDTH);
    let priority_text = pad_text(&task.priority_label, PRIORITY_WIDTH);
    let due_text = format!("  {}", task.due_label);
    let fixed = check.len() + ID_WIDTH + PRIORITY_WIDTH + due_text.len() + 2;
    let title_text = truncate_text(&task.title, width.saturating_sub(fixed));

    let mut title_style = Style::default().fg(COLOR_TEXT);
    if task.completed {
        title_style = Style::default()
            .fg(COLOR_MUTED_DARK)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if marked {
        title_style = Style::default()
            .fg(COLOR_ERROR)
            .add_modifier(Modifier::CROSSED_OUT);
    }

    let mut spans = vec![
        Span::styled(
            check,
            Style::default().fg(if task.completed {
                COLOR_SUCCESS
            } else {
                COLOR_MUTED
            }),
        ),
        Span::styled(format!("{id_text} "), id_style()),
        Span::styled(
            format!("{priority_text} "),
            Style::default().fg(priority_color(&task.priority_label)),
        ),
        Span::styled(title_text, title_style),
        Span::styled(due_text, Style::default().fg(COLOR_MUTED_DARK)),
    ];
    if selected {
        for span in &mut spans {
            span.style = span.style.bg(COLOR_BG_MUTED).add_modifier(Modifier::BOLD);
        }
    }
    Line::from(spans)
}

fn list_window(total: usize, selected: usize, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn notification_style(kind: NotificationKind) -> Style {
    match kind {
        NotificationKind::Success => Style::default().fg(COLOR_SUCCESS),
        NotificationKind::Info => Style::default().fg(COLOR_INFO),
        NotificationKind::Warning => Style::default().fg(COLOR_WARNING),
        NotificationKind::Error => Style::default()
            .fg(COLOR_ERROR)
            .add_modifier(Modifier::BOLD),
    }
}

fn priority_color(priority: &str) -> Color {
    match priority.trim() {
        "high" => Color::Rgb(255, 87, 87),
        "medium" => COLOR_WARNING,
        "low" => COLOR_ACCENT,
        _ => COLOR_INFO,
    }
}

fn pad_text(value: &str, width: usize) -> String {
    let text = truncate_text(value, width);
    format!("{text:width$}")
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

fn label_span(label: &str) -> Span<'static> {
    Span::styled(label.to_string(), Style::default().fg(COLOR_MUTED_DARK))
}

fn id_style() -> Style {
    Style::default()
        .fg(COLOR_MUTED)
        .add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_window_keeps_selection_visible() {
        assert_eq!(list_window(0, 0, 5), (0, 0));
        assert_eq!(list_window(3, 2, 5), (0, 3));
        assert_eq!(list_window(10, 9, 4), (6, 10));
        assert_eq!(list_window(10, 5, 4), (3, 7));
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_text("Buy milk", 20), "Buy milk");
        assert_eq!(truncate_text("Buy milk and bread", 10), "Buy mil...");
        assert_eq!(truncate_text("abc", 0), "");
    }
}
