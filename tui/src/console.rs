//! TerminalConsole — the scheduler's console, rendered by the TUI.
//!
//! The log keeps a bare `>` prompt as its last line while the queue is idle.
//! Messages logged in that state are inserted above the prompt. When a
//! command starts, the prompt line becomes the echoed command; when the
//! queue drains, a fresh prompt is appended.

use std::collections::VecDeque;

use kidra_core::console::{Console, LogKind, ProcessHandle};


/// What a log line represents, for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Prompt,
    Command,
    Message(LogKind),
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LineKind,
    pub text: String,
}


impl LogLine {
    fn prompt() -> Self {
        LogLine {
            kind: LineKind::Prompt,
            text: String::new(),
        }
    }
}


#[derive(Debug)]
pub struct TerminalConsole {
    lines: VecDeque<LogLine>,
    max_lines: usize,
    /// The last line is a bare prompt.
    cmd_ready: bool,
    processes: Vec<(ProcessHandle, String)>,
    next_handle: u64,
}


impl TerminalConsole {
    pub fn new(max_lines: usize) -> Self {
        let mut lines = VecDeque::new();
        lines.push_back(LogLine::prompt());
        TerminalConsole {
            lines,
            // Room for one message above the prompt.
            max_lines: max_lines.max(2),
            cmd_ready: true,
            processes: Vec::new(),
            next_handle: 0,
        }
    }

    pub fn lines(&self) -> impl ExactSizeIterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Labels of the processes shown, in the order they were added.
    pub fn process_labels(&self) -> impl Iterator<Item = &str> {
        self.processes.iter().map(|(_, label)| label.as_str())
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn is_ready(&self) -> bool {
        self.cmd_ready
    }

    fn push(&mut self, line: LogLine) {
        if self.cmd_ready {
            let at = self.lines.len().saturating_sub(1);
            self.lines.insert(at, line);
        } else {
            self.lines.push_back(line);
        }
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}


impl Console for TerminalConsole {
    fn log_with(&mut self, kind: LogKind, message: &str) {
        self.push(LogLine {
            kind: LineKind::Message(kind),
            text: message.to_string(),
        });
    }

    fn enter_command(&mut self, text: &str) {
        let line = LogLine {
            kind: LineKind::Command,
            text: text.to_string(),
        };
        if self.cmd_ready {
            match self.lines.back_mut() {
                Some(last) => *last = line,
                None => self.lines.push_back(line),
            }
            self.cmd_ready = false;
        } else {
            self.push(line);
        }
    }

    fn finish_command(&mut self) {
        if self.cmd_ready {
            return;
        }
        self.push(LogLine::prompt());
        self.cmd_ready = true;
    }

    fn add_process(&mut self, label: &str) -> ProcessHandle {
        let handle = ProcessHandle(self.next_handle);
        self.next_handle += 1;
        self.processes.push((handle, label.to_string()));
        handle
    }

    fn remove_process(&mut self, handle: ProcessHandle) {
        self.processes.retain(|(h, _)| *h != handle);
    }
}
