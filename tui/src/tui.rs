//! TUI runner — terminal setup, key handling and the clock.
//!
//! The [`Tui`] owns the ratatui terminal and the input line. [`Tui::run`]
//! draws a frame, waits for a key until the next tick is due, and steps the
//! session on schedule. It returns once the session has ended, which happens
//! after `quit` or Ctrl-C makes the agent disconnect.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;

use kidra_core::session::{Session, SessionState};

use crate::console::TerminalConsole;
use crate::input::InputLine;
use crate::theme::Theme;
use crate::view::{self, Screen};


/// Log lines moved per PageUp/PageDown.
const SCROLL_PAGE: usize = 10;


/// What a key press asks the runner to do, beyond editing the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Submit(String),
    Quit,
    ScrollUp,
    ScrollDown,
}


/// Apply `key` to the input line and report any action for the runner.
pub fn handle_key(input: &mut InputLine, key: KeyEvent) -> Option<UiAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return Some(UiAction::Quit),
        KeyCode::Char('u') if ctrl => input.kill_to_start(),
        KeyCode::Char('a') if ctrl => input.home(),
        KeyCode::Char('e') if ctrl => input.end(),
        KeyCode::Char(ch) if !ctrl => input.insert(ch),
        KeyCode::Enter => return input.submit().map(UiAction::Submit),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Up => input.recall_older(),
        KeyCode::Down => input.recall_newer(),
        KeyCode::PageUp => return Some(UiAction::ScrollUp),
        KeyCode::PageDown => return Some(UiAction::ScrollDown),
        _ => {}
    }
    None
}


fn enter_screen() -> Result<Terminal<CrosstermBackend<io::Stdout>>, io::Error> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}


/// Run `undo` if `result` is an error, then pass `result` through.
fn undo_on_error<T>(result: Result<T, io::Error>, undo: impl FnOnce()) -> Result<T, io::Error> {
    if result.is_err() {
        undo();
    }
    result
}


pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    input: InputLine,
    theme: Theme,
    tick: Duration,
    scroll: usize,
}


impl Tui {
    /// Enter raw mode and the alternate screen. On failure the terminal is
    /// put back the way it was.
    pub fn new(tick: Duration) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        let terminal = undo_on_error(enter_screen(), || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        })?;

        Ok(Tui {
            terminal,
            input: InputLine::new(),
            theme: Theme::default(),
            tick: tick.max(Duration::from_millis(1)),
            scroll: 0,
        })
    }

    /// Drive `session` until it ends.
    pub fn run(&mut self, session: &mut Session<TerminalConsole>) -> Result<(), io::Error> {
        let started = Instant::now();
        let mut next_tick = started;

        loop {
            self.draw(session)?;

            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    self.on_key(session, key);
                }
            }

            if Instant::now() >= next_tick {
                let now_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                if session.step(now_ms) == SessionState::Ended {
                    tracing::info!("session ended");
                    break;
                }
                next_tick += self.tick;
            }
        }

        self.restore()
    }

    fn on_key(&mut self, session: &mut Session<TerminalConsole>, key: KeyEvent) {
        match handle_key(&mut self.input, key) {
            Some(UiAction::Submit(line)) => {
                tracing::debug!(%line, "submitted");
                self.scroll = 0;
                session.submit(&line);
            }
            Some(UiAction::Quit) => session.quit(),
            Some(UiAction::ScrollUp) => self.scroll = self.scroll.saturating_add(SCROLL_PAGE),
            Some(UiAction::ScrollDown) => self.scroll = self.scroll.saturating_sub(SCROLL_PAGE),
            None => {}
        }
    }

    fn draw(&mut self, session: &Session<TerminalConsole>) -> Result<(), io::Error> {
        // Clamp so PageDown responds immediately after over-scrolling.
        self.scroll = self.scroll.min(session.console().line_count());
        let screen = Screen {
            tasks: view::task_lines(session.buffer()),
            console: session.console(),
            input: &self.input,
            scroll: self.scroll,
            theme: &self.theme,
        };
        self.terminal.draw(|frame| view::render(frame, &screen))?;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), io::Error> {
        terminal::disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}


impl Drop for Tui {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}
