use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::app::{ChatApp, ChatMessage, ChatStatus, Role};

const INPUT_MAX_ROWS: u16 = 6;

pub fn draw(f: &mut Frame<'_>, app: &ChatApp) {
    let size = f.area();
    let input_rows = (app.input_buffer.split('\n').count() as u16).clamp(1, INPUT_MAX_ROWS);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(input_rows + 3),
        ])
        .split(size);

    draw_header(f, chunks[0], app);
    draw_messages(f, chunks[1], app);
    draw_input(f, chunks[2], app);
}

fn draw_header(f: &mut Frame<'_>, area: Rect, app: &ChatApp) {
    let status_style = match app.status {
        ChatStatus::Idle => Style::default().fg(Color::Green),
        ChatStatus::Waiting => Style::default().fg(Color::Yellow),
        ChatStatus::Done(_) => Style::default().fg(Color::Cyan),
        ChatStatus::Failed(_) => Style::default().fg(Color::Red),
    };
    let mut parts = vec![
        Span::styled("TriageAgency", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  Status: "),
        Span::styled(app.status_label(), status_style),
        Span::raw("  Queries: "),
        Span::styled(app.queries.to_string(), Style::default().fg(Color::Gray)),
        Span::raw("  Up: "),
        Span::styled(
            format_duration(app.start.elapsed().as_secs()),
            Style::default().fg(Color::Gray),
        ),
    ];
    if !app.follow {
        parts.push(Span::styled("  [scroll]", Style::default().fg(Color::Yellow)));
    }

    let header = Paragraph::new(Line::from(parts)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_messages(f: &mut Frame<'_>, area: Rect, app: &ChatApp) {
    let block = Block::default().borders(Borders::ALL).title("Chat");
    let inner = block.inner(area);
    let lines = build_message_lines(app.messages.iter());

    let rows = wrapped_rows(&lines, inner.width);
    let max_offset = rows.saturating_sub(inner.height as usize);
    app.max_scroll.set(max_offset);
    let offset = if app.follow {
        max_offset
    } else {
        app.scroll.min(max_offset)
    };

    let widget = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset.min(u16::MAX as usize) as u16, 0));
    f.render_widget(widget, area);
}

fn draw_input(f: &mut Frame<'_>, area: Rect, app: &ChatApp) {
    let title = if app.is_busy() {
        let secs = app.busy_for().map(|d| d.as_secs()).unwrap_or(0);
        format!("Message  {} waiting for reply ({})", spinner(app), format_duration(secs))
    } else {
        "Message".to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);

    // two columns of lead, one row of hint
    let text_width = inner.width.saturating_sub(2) as usize;
    let text_rows = (inner.height.saturating_sub(1) as usize).max(1);
    let (row, col) = cursor_pos(&app.input_buffer, app.input_cursor);
    let first_col = viewport_start(col, text_width);
    let first_row = viewport_start(row, text_rows);

    let mut lines: Vec<Line> = app
        .input_buffer
        .split('\n')
        .enumerate()
        .skip(first_row)
        .take(text_rows)
        .map(|(i, raw)| {
            let lead = if i == 0 { "> " } else { "  " };
            let visible: String = raw.chars().skip(first_col).take(text_width).collect();
            Line::from(vec![
                Span::styled(lead, Style::default().fg(Color::Cyan)),
                Span::raw(visible),
            ])
        })
        .collect();
    lines.push(Line::from(Span::styled(
        "Enter: send  Shift+Enter: newline  Up/Down/PgUp/PgDn: scroll  End: follow  Esc: quit",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let x = inner
        .x
        .saturating_add(2)
        .saturating_add(to_u16(col - first_col))
        .min(inner.right().saturating_sub(1));
    let y = inner
        .y
        .saturating_add(to_u16(row - first_row))
        .min(inner.bottom().saturating_sub(1));
    f.set_cursor_position((x, y));
}

/// First visible index so that `pos` falls inside a window of `len` cells.
fn viewport_start(pos: usize, len: usize) -> usize {
    pos.saturating_sub(len.saturating_sub(1))
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn build_message_lines<'a>(messages: impl Iterator<Item = &'a ChatMessage>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for msg in messages {
        let (label, color) = match msg.role {
            Role::User => ("you", Color::Cyan),
            Role::Assistant => ("triage", Color::Magenta),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        let body = msg.content.strip_suffix('\n').unwrap_or(&msg.content);
        if body.is_empty() && msg.role == Role::Assistant {
            lines.push(Line::from(Span::styled(
                "...",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            for raw in body.split('\n') {
                lines.push(Line::from(markdown_spans(raw)));
            }
        }
        lines.push(Line::default());
    }
    lines
}

/// Inline `**bold**` and `` `code` `` only; unmatched markers render literally.
pub fn markdown_spans(line: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let bold = rest.find("**");
        let code = rest.find('`');
        let (start, marker, style) = match (bold, code) {
            (Some(b), Some(c)) if c < b => (c, "`", code_style()),
            (Some(b), _) => (b, "**", Style::default().add_modifier(Modifier::BOLD)),
            (None, Some(c)) => (c, "`", code_style()),
            (None, None) => break,
        };
        let after = &rest[start + marker.len()..];
        let Some(end) = after.find(marker) else {
            break;
        };
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        spans.push(Span::styled(after[..end].to_string(), style));
        rest = &after[end + marker.len()..];
    }
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }
    spans
}

fn code_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn wrapped_rows(lines: &[Line<'_>], width: u16) -> usize {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum()
}

fn cursor_pos(input: &str, cursor: usize) -> (usize, usize) {
    let before = &input[..cursor.min(input.len())];
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map_or(0, |l| l.chars().count());
    (row, col)
}

fn spinner(app: &ChatApp) -> char {
    let frames = ['|', '/', '-', '\\'];
    let elapsed = app.busy_for().map(|d| d.as_millis() as usize).unwrap_or(0);
    frames[(elapsed / 120) % frames.len()]
}

fn format_duration(secs: u64) -> String {
    let m = secs / 60;
    let s = secs % 60;
    format!("{m:02}:{s:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contents(spans: &[Span<'_>]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn bold_and_code_markers_are_stripped() {
        let spans = markdown_spans("❌ **Error**: triage binary not found at `/opt/gleam`.");
        assert_eq!(
            contents(&spans),
            vec!["❌ ", "Error", ": triage binary not found at ", "/opt/gleam", "."]
        );
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(spans[3].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn unmatched_marker_stays_literal() {
        assert_eq!(contents(&markdown_spans("2 ** 3")), vec!["2 ** 3"]);
        assert_eq!(contents(&markdown_spans("plain")), vec!["plain"]);
    }

    #[test]
    fn cursor_position_counts_rows_and_chars() {
        assert_eq!(cursor_pos("ab\n🤖c", 8), (1, 2));
        assert_eq!(cursor_pos("", 0), (0, 0));
    }

    #[test]
    fn viewport_follows_the_cursor() {
        assert_eq!(viewport_start(5, 30), 0);
        assert_eq!(viewport_start(100, 30), 71);
        assert_eq!(viewport_start(70_000, 0), 70_000);
    }

    #[test]
    fn long_draft_keeps_cursor_and_tail_inside_the_input_box() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;
        use triage_core::api::TuiConfig;

        let mut app = ChatApp::new(TuiConfig::default());
        app.input_buffer = format!("{}Z", "x".repeat(199));
        app.input_cursor = app.input_buffer.len();

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < 39, "cursor column {} outside the box", cursor.x);
        assert!(cursor.y < 9, "cursor row {} outside the box", cursor.y);

        let buffer = terminal.backend().buffer();
        let row: String = (0..40).map(|x| buffer[(x, cursor.y)].symbol()).collect();
        assert!(row.contains("xZ"), "{row:?}");
    }

    #[test]
    fn wrapped_rows_account_for_width() {
        let lines = vec![Line::from("x".repeat(25)), Line::default()];
        assert_eq!(wrapped_rows(&lines, 10), 4);
    }
}
