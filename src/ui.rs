use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use crate::app::{App, InputMode};
use crate::chat::{paragraphs, ChatView, Entry, Role};
use crate::config::QuickAction;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str, base: Style) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            // Consume the second *
            chars.next();

            // Push any accumulated plain text
            if !current_text.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut current_text), base));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next(); // consume second *
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(bold_text, base.add_modifier(Modifier::BOLD)));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    // Push any remaining text
    if !current_text.is_empty() {
        spans.push(Span::styled(current_text, base));
    }

    Line::from(spans)
}

fn role_label(role: Role) -> Line<'static> {
    match role {
        Role::User => Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Role::Assistant => Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    }
}

/// Lines for the whole conversation, placeholder included.
pub fn thread_lines(entries: &[Entry], animation_frame: u8) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for entry in entries {
        match entry {
            Entry::Message(msg) => {
                lines.push(role_label(msg.role));
                let base = if msg.is_error {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                };
                for p in paragraphs(&msg.text) {
                    match msg.role {
                        Role::User => lines.push(Line::from(Span::styled(p.to_string(), base))),
                        Role::Assistant => lines.push(parse_markdown_line(p, base)),
                    }
                }
                lines.push(Line::default());
            }
            Entry::Placeholder { .. } => {
                lines.push(role_label(Role::Assistant));
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((animation_frame as usize % 3) + 1);
                lines.push(Line::from(Span::styled(
                    format!("Thinking{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }

    lines
}

fn thread_text(lines: Vec<Line<'static>>) -> Text<'static> {
    if lines.is_empty() {
        Text::from(Span::styled(
            "Ask a question, or press Esc then a number for a quick action...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(lines)
    }
}

fn thread_paragraph(text: Text<'static>) -> Paragraph<'static> {
    Paragraph::new(text).wrap(Wrap { trim: false })
}

/// Rows the thread takes at `width` columns, counted by the same word
/// wrapping that draws it.
fn thread_rows(text: &Text<'static>, width: u16) -> u16 {
    let rows = thread_paragraph(text.clone()).line_count(width);
    rows.min(u16::MAX as usize) as u16
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, quick actions, input, footer
    let quick_height = if app.quick_actions.is_empty() { 0 } else { 1 };
    let [header_area, chat_area, quick_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(quick_height),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    // Store chat area for mouse hit-testing and scroll calculations (inner size minus borders)
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let view = app.client.view();

    render_header(&view, frame, header_area);

    let text = thread_text(thread_lines(view.entries, app.animation_frame));
    let total = thread_rows(&text, app.chat_width);
    let max_scroll = total.saturating_sub(app.chat_height);
    if app.follow_tail || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.follow_tail = true;
    }
    render_chat(frame, chat_area, text, app.chat_scroll, max_scroll);

    if quick_height > 0 {
        render_quick_actions(&app.quick_actions, &view, frame, quick_area);
    }
    render_input(&view, app.input_mode, app.input_cursor, frame, input_area);
    render_footer(app.input_mode, frame, footer_area);
}

fn render_header(view: &ChatView, frame: &mut Frame, area: Rect) {
    let indicator_color = if view.loading {
        Color::Yellow
    } else if view.connected {
        Color::Green
    } else {
        Color::Red
    };

    let title = Line::from(vec![
        Span::styled(" Analyst Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("● ", Style::default().fg(indicator_color)),
        Span::styled(view.status_text.to_string(), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(
            format!("model: {}", view.model_label),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(
    frame: &mut Frame,
    area: Rect,
    text: Text<'static>,
    scroll: u16,
    max_scroll: u16,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let chat = thread_paragraph(text).block(block).scroll((scroll, 0));
    frame.render_widget(chat, area);

    if max_scroll > 0 {
        let mut state = ScrollbarState::new(max_scroll as usize).position(scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }
}

fn render_quick_actions(actions: &[QuickAction], view: &ChatView, frame: &mut Frame, area: Rect) {
    let available = view.connected && !view.loading;
    let key_style = if available {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let label_style = if available {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let spans: Vec<Span> = actions
        .iter()
        .take(9)
        .enumerate()
        .flat_map(|(i, action)| {
            [
                Span::styled(format!(" {} ", i + 1), key_style),
                Span::styled(format!(" {} ", action.label), label_style),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(view: &ChatView, mode: InputMode, cursor: usize, frame: &mut Frame, area: Rect) {
    let (border_color, title) = if !view.input_enabled {
        (Color::DarkGray, " Waiting for response... ")
    } else if !view.connected {
        (Color::Red, " Ask (disconnected) ")
    } else if mode == InputMode::Editing {
        (Color::Yellow, " Ask ")
    } else {
        (Color::DarkGray, " Ask (i to edit) ")
    };

    let send_hint = Span::styled(
        " Enter send ",
        if view.send_enabled {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        },
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_bottom(Line::from(send_hint).right_aligned());

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 || cursor < inner_width {
        0
    } else {
        cursor - inner_width + 1
    };

    // Newlines are shown as a visible marker so the box stays one row.
    let visible_text: String = view
        .input
        .chars()
        .map(|c| if c == '\n' { '↵' } else { c })
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let text_style = if view.input_enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(visible_text).style(text_style).block(block);
    frame.render_widget(input, area);

    // Show cursor when editing
    if mode == InputMode::Editing && view.input_enabled {
        let cursor_x = (cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(mode: InputMode, frame: &mut Frame, area: Rect) {
    let mode_style = match mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    let hints: &[(&str, &str)] = match mode {
        InputMode::Normal => &[
            (" i ", " edit "),
            (" 1-9 ", " quick action "),
            (" j/k ", " scroll "),
            (" G ", " bottom "),
            (" q ", " quit "),
        ],
        InputMode::Editing => &[
            (" Enter ", " send "),
            (" PgUp/PgDn ", " scroll "),
            (" Esc ", " normal "),
            (" Ctrl+C ", " quit "),
        ],
    };
    for (key, label) in hints {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(*label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
