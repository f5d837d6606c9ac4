//! Headless runner — stdin in, console lines out.
//!
//! A reader thread forwards stdin lines over an mpsc channel; the main
//! thread owns the session and steps it on a fixed interval, so scheduler
//! state is only ever touched from one thread. The run ends when the agent
//! quits, or when stdin is closed and nothing is left to do.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use serde::Serialize;

use kidra_core::console::{Console, LogKind, ProcessHandle};
use kidra_core::session::{Session, SessionState};
use kidra_core::settings::Settings;


// ---------------------------------------------------------------------------
// LineConsole
// ---------------------------------------------------------------------------

/// One output record in `--json` mode.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    Log { kind: LogKind, message: &'a str },
    Command { text: &'a str },
    Idle,
    ProcessAdded { handle: u64, label: &'a str },
    ProcessRemoved { handle: u64, label: &'a str },
}


/// Console that prints one line per event, as text or JSON.
pub struct LineConsole<W: Write> {
    out: W,
    json: bool,
    /// Suppresses repeated idle signals between commands.
    idle: bool,
    processes: Vec<(ProcessHandle, String)>,
    next_handle: u64,
}


impl<W: Write> LineConsole<W> {
    pub fn new(out: W, json: bool) -> Self {
        LineConsole {
            out,
            json,
            idle: true,
            processes: Vec::new(),
            next_handle: 0,
        }
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, record: Record<'_>) {
        let line = if self.json {
            match serde_json::to_string(&record) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "cannot encode output record");
                    return;
                }
            }
        } else {
            match text_line(&record) {
                Some(line) => line,
                None => return,
            }
        };
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "cannot write output");
        }
    }
}


fn text_line(record: &Record<'_>) -> Option<String> {
    let line = match record {
        Record::Log { kind, message } => match kind {
            LogKind::Info => format!("[INFO] {}", message),
            LogKind::Warn => format!("[WARN] {}", message),
            LogKind::Error => format!("[ERROR] {}", message),
            LogKind::Plain | LogKind::Chat => message.to_string(),
        },
        Record::Command { text } => format!("> {}", text),
        Record::Idle | Record::ProcessAdded { .. } | Record::ProcessRemoved { .. } => return None,
    };
    Some(line)
}


impl<W: Write> Console for LineConsole<W> {
    fn log_with(&mut self, kind: LogKind, message: &str) {
        self.emit(Record::Log { kind, message });
    }

    fn enter_command(&mut self, text: &str) {
        self.idle = false;
        self.emit(Record::Command { text });
    }

    fn finish_command(&mut self) {
        if !self.idle {
            self.idle = true;
            self.emit(Record::Idle);
        }
    }

    fn add_process(&mut self, label: &str) -> ProcessHandle {
        let handle = ProcessHandle(self.next_handle);
        self.next_handle += 1;
        self.processes.push((handle, label.to_string()));
        self.emit(Record::ProcessAdded { handle: handle.0, label });
        handle
    }

    fn remove_process(&mut self, handle: ProcessHandle) {
        let Some(index) = self.processes.iter().position(|(h, _)| *h == handle) else {
            return;
        };
        let (_, label) = self.processes.remove(index);
        self.emit(Record::ProcessRemoved { handle: handle.0, label: &label });
    }
}


// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub fn run(settings: &Settings, script: &[String], json: bool) -> Result<()> {
    let console = LineConsole::new(io::stdout(), json);
    let mut session = Session::from_settings(settings, console);
    for line in script {
        session.submit(line);
    }

    let input = spawn_stdin_reader().context("cannot start stdin reader")?;
    let steps = drive(&mut session, &input, Duration::from_millis(settings.tick_interval_ms));
    tracing::info!(steps, "headless run finished");
    Ok(())
}


fn spawn_stdin_reader() -> io::Result<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new().name("stdin-reader".into()).spawn(move || {
        forward_lines(io::stdin().lock(), &tx);
        tracing::debug!("stdin closed");
    })?;
    Ok(rx)
}


/// Send each line of `reader` to `tx` until EOF, a read error, or the
/// receiver going away. Lines that are not UTF-8 are skipped.
fn forward_lines<R: BufRead>(mut reader: R, tx: &Sender<String>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim_end_matches(['\n', '\r']),
            Err(e) => {
                tracing::warn!(error = %e, "skipping input line that is not UTF-8");
                continue;
            }
        };
        if tx.send(line.to_string()).is_err() {
            break;
        }
    }
}


/// Step `session` every `tick` until it ends, or until `input` is closed and
/// the scheduler is idle. Returns the number of steps taken.
pub fn drive<C: Console>(session: &mut Session<C>, input: &Receiver<String>, tick: Duration) -> u64 {
    let started = Instant::now();
    let mut input_open = true;
    let mut steps = 0;

    loop {
        while input_open {
            match input.try_recv() {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        session.submit(line);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => input_open = false,
            }
        }

        let now_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        steps += 1;
        if session.step(now_ms) == SessionState::Ended {
            break;
        }
        if !input_open && session.buffer().is_idle() {
            tracing::debug!("input closed and scheduler idle");
            break;
        }
        thread::sleep(tick);
    }
    steps
}
