//! Console — the display capability the scheduler reports to.
//!
//! The scheduler never writes to stdout or a terminal directly. It receives a
//! `Console` at construction and reports command echoes, log lines and
//! background process changes through it. The TUI and the headless runner
//! provide real implementations; [`RecordingConsole`] records calls for tests.

use serde::{Deserialize, Serialize};


/// Presentation hint for a log line. Not part of the scheduler's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Plain,
    Info,
    Warn,
    Error,
    Chat,
}


/// Opaque handle to a process entry shown by the console.
///
/// Handles stay valid until removed, regardless of other removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessHandle(pub u64);


pub trait Console {
    /// Append a log line of the given kind.
    fn log_with(&mut self, kind: LogKind, message: &str);

    /// Append a plain log line.
    fn log(&mut self, message: &str) {
        self.log_with(LogKind::Plain, message);
    }

    /// Echo a command that is about to run.
    fn enter_command(&mut self, text: &str);

    /// Signal that the command queue has drained.
    fn finish_command(&mut self);

    /// Show a running background process; returns its handle.
    fn add_process(&mut self, label: &str) -> ProcessHandle;

    /// Remove a process entry previously added.
    fn remove_process(&mut self, handle: ProcessHandle);
}


// ---------------------------------------------------------------------------
// RecordingConsole
// ---------------------------------------------------------------------------

/// One call made against a [`RecordingConsole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Log { kind: LogKind, message: String },
    EnterCommand(String),
    FinishCommand,
    AddProcess { handle: ProcessHandle, label: String },
    RemoveProcess(ProcessHandle),
}


/// A test-double that records every console call in order and tracks the
/// set of processes currently shown.
#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub events: Vec<ConsoleEvent>,
    pub processes: Vec<(ProcessHandle, String)>,
    next_handle: u64,
}


impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages of all log calls, in order, regardless of kind.
    pub fn messages(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ConsoleEvent::Log { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether any log line equals `message` exactly.
    pub fn has_message(&self, message: &str) -> bool {
        self.messages().iter().any(|m| m == message)
    }

    /// Texts passed to `enter_command`, in order.
    pub fn entered(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ConsoleEvent::EnterCommand(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Labels of the processes currently shown.
    pub fn process_labels(&self) -> Vec<String> {
        self.processes.iter().map(|(_, label)| label.clone()).collect()
    }

    /// How many times `remove_process` was called for `handle`.
    pub fn removals_of(&self, handle: ProcessHandle) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ConsoleEvent::RemoveProcess(h) if *h == handle))
            .count()
    }
}


impl Console for RecordingConsole {
    fn log_with(&mut self, kind: LogKind, message: &str) {
        self.events.push(ConsoleEvent::Log {
            kind,
            message: message.to_string(),
        });
    }

    fn enter_command(&mut self, text: &str) {
        self.events.push(ConsoleEvent::EnterCommand(text.to_string()));
    }

    fn finish_command(&mut self) {
        self.events.push(ConsoleEvent::FinishCommand);
    }

    fn add_process(&mut self, label: &str) -> ProcessHandle {
        let handle = ProcessHandle(self.next_handle);
        self.next_handle += 1;
        self.processes.push((handle, label.to_string()));
        self.events.push(ConsoleEvent::AddProcess {
            handle,
            label: label.to_string(),
        });
        handle
    }

    fn remove_process(&mut self, handle: ProcessHandle) {
        self.processes.retain(|(h, _)| *h != handle);
        self.events.push(ConsoleEvent::RemoveProcess(handle));
    }
}
