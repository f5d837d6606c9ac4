//! Screen layout and rendering.
//!
//! Four stacked boxes: `Active Tasks`, `Active Processes`, `Log` and a
//! three-row `Command Input`. The two list boxes grow with their content;
//! the log takes what is left.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use kidra_core::console::Console;
use kidra_core::scheduler::CommandBuffer;

use crate::console::{LogLine, TerminalConsole};
use crate::input::InputLine;
use crate::theme::{self, Theme};


/// Everything one frame needs, borrowed so the draw closure does not
/// conflict with the terminal borrow.
pub struct Screen<'a> {
    pub tasks: Vec<String>,
    pub console: &'a TerminalConsole,
    pub input: &'a InputLine,
    /// Lines scrolled back from the bottom of the log.
    pub scroll: usize,
    pub theme: &'a Theme,
}


/// Height of a bordered list box holding `rows` lines.
pub fn box_height(rows: usize) -> u16 {
    u16::try_from(rows.max(1) + 2).unwrap_or(u16::MAX)
}


/// Active command first, then the queue in order.
pub fn task_lines<C: Console>(buffer: &CommandBuffer<C>) -> Vec<String> {
    let active = buffer.active_command().map(|text| format!("> {}", text));
    active
        .into_iter()
        .chain(buffer.pending().iter().map(|command| format!("  {}", command)))
        .collect()
}


/// Range of log lines to show in `height` rows, `scroll` lines up from the
/// bottom. Scrolling stops at the top.
pub fn log_window(total: usize, height: usize, scroll: usize) -> (usize, usize) {
    let max_scroll = total.saturating_sub(height);
    let end = total - scroll.min(max_scroll);
    (end.saturating_sub(height), end)
}


pub fn render(frame: &mut Frame, screen: &Screen) {
    let [tasks, processes, log, input] = Layout::vertical([
        Constraint::Length(box_height(screen.tasks.len())),
        Constraint::Length(box_height(screen.console.process_count())),
        Constraint::Min(3),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    render_list(frame, tasks, "Active Tasks", screen.tasks.iter().map(String::as_str), screen.theme);
    render_list(frame, processes, "Active Processes", screen.console.process_labels(), screen.theme);
    render_log(frame, log, screen);
    render_input(frame, input, screen);
}


fn titled<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::bordered()
        .title(Span::styled(format!(" {} ", title), theme.title))
        .border_style(theme.border)
}


fn render_list<'a>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: impl Iterator<Item = &'a str>,
    theme: &Theme,
) {
    let mut lines: Vec<Line> = rows.map(|row| Line::raw(row.to_string())).collect();
    if lines.is_empty() {
        lines.push(Line::styled("(none)", theme.empty));
    }
    frame.render_widget(Paragraph::new(lines).block(titled(title, theme)), area);
}


fn log_line<'a>(line: &'a LogLine, theme: &Theme) -> Line<'a> {
    let style = theme.line_style(line.kind);
    let mut spans = Vec::with_capacity(3);
    if let Some(tag) = theme::prefix(line.kind) {
        spans.push(Span::styled(tag, style.add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(line.text.as_str(), style));
    Line::from(spans)
}


fn render_log(frame: &mut Frame, area: Rect, screen: &Screen) {
    let height = usize::from(area.height.saturating_sub(2));
    let total = screen.console.line_count();
    let (start, end) = log_window(total, height, screen.scroll);
    let lines: Vec<Line> = screen
        .console
        .lines()
        .skip(start)
        .take(end - start)
        .map(|line| log_line(line, screen.theme))
        .collect();

    let title = if end < total { "Log (scrolled)" } else { "Log" };
    frame.render_widget(Paragraph::new(lines).block(titled(title, screen.theme)), area);
}


fn render_input(frame: &mut Frame, area: Rect, screen: &Screen) {
    let width = usize::from(area.width.saturating_sub(2));
    let (text, column) = screen.input.visible(width);
    frame.render_widget(Paragraph::new(text).block(titled("Command Input", screen.theme)), area);

    let column = u16::try_from(column).unwrap_or(u16::MAX);
    frame.set_cursor_position((area.x + 1 + column, area.y + 1));
}
