//! Colors and prefixes for log lines and box borders.

use ratatui::style::{Color, Modifier, Style};

use kidra_core::console::LogKind;

use crate::console::LineKind;


#[derive(Debug, Clone)]
pub struct Theme {
    pub border: Style,
    pub title: Style,
    pub prompt: Style,
    pub command: Style,
    pub plain: Style,
    pub info: Style,
    pub warn: Style,
    pub error: Style,
    pub chat: Style,
    pub empty: Style,
}


impl Theme {
    pub fn dark() -> Self {
        Theme {
            border: Style::default().fg(Color::Blue),
            title: Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
            prompt: Style::default().fg(Color::Gray).add_modifier(Modifier::SLOW_BLINK),
            command: Style::default().fg(Color::Gray),
            plain: Style::default(),
            info: Style::default().fg(Color::Green),
            warn: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),
            chat: Style::default().fg(Color::White),
            empty: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn line_style(&self, kind: LineKind) -> Style {
        match kind {
            LineKind::Prompt => self.prompt,
            LineKind::Command => self.command,
            LineKind::Message(LogKind::Plain) => self.plain,
            LineKind::Message(LogKind::Info) => self.info,
            LineKind::Message(LogKind::Warn) => self.warn,
            LineKind::Message(LogKind::Error) => self.error,
            LineKind::Message(LogKind::Chat) => self.chat,
        }
    }
}


impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}


/// Bold tag shown before the text of a line, if any.
pub fn prefix(kind: LineKind) -> Option<&'static str> {
    match kind {
        LineKind::Prompt | LineKind::Command => Some(">"),
        LineKind::Message(LogKind::Info) => Some("[INFO]"),
        LineKind::Message(LogKind::Warn) => Some("[WARN]"),
        LineKind::Message(LogKind::Error) => Some("[ERROR]"),
        LineKind::Message(LogKind::Plain | LogKind::Chat) => None,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_have_prefixes() {
        assert_eq!(prefix(LineKind::Message(LogKind::Warn)), Some("[WARN]"));
        assert_eq!(prefix(LineKind::Message(LogKind::Chat)), None);
        assert_eq!(prefix(LineKind::Command), Some(">"));
    }

    #[test]
    fn severities_are_colored_apart() {
        let theme = Theme::dark();
        let info = theme.line_style(LineKind::Message(LogKind::Info));
        let error = theme.line_style(LineKind::Message(LogKind::Error));
        assert_ne!(info, error);
        assert_eq!(theme.line_style(LineKind::Message(LogKind::Plain)), Style::default());
    }
}
