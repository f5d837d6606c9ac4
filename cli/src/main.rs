//! Kidra CLI — entry point for the kidra terminal.
//!
//! # Usage
//!
//! ```text
//! kidra                              # terminal UI
//! kidra --headless < commands.txt    # read commands from stdin
//! kidra --headless --json            # JSON output, one object per line
//! kidra --script setup.txt           # queue a file of commands first
//! kidra --print-settings             # show the effective settings
//! ```

mod headless;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

use kidra_core::session::Session;
use kidra_core::settings::{self, Settings};
use kidra_tui::console::TerminalConsole;
use kidra_tui::tui::Tui;


#[derive(Parser, Debug)]
#[command(name = "kidra", version, about = "Line-command terminal for a game agent")]
struct Args {
    /// Settings file (default: $KIDRA_CONFIG_DIR/settings.yaml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Milliseconds between scheduler ticks
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Read commands from stdin instead of running the terminal UI
    #[arg(long)]
    headless: bool,

    /// Print headless output as JSON lines
    #[arg(long, requires = "headless")]
    json: bool,

    /// Queue every non-blank line of FILE before starting
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Print the effective settings as YAML and exit
    #[arg(long)]
    print_settings: bool,
}


fn main() -> Result<()> {
    let args = Args::parse();
    let settings = resolve_settings(&args)?;

    if args.print_settings {
        print!("{}", settings::to_yaml(&settings)?);
        return Ok(());
    }

    let script = match &args.script {
        Some(path) => read_script(path)?,
        None => Vec::new(),
    };

    if args.headless {
        init_stderr_logging(&settings);
        headless::run(&settings, &script, args.json)
    } else {
        let _guard = init_file_logging(&settings)?;
        run_tui(&settings, &script)
    }
}


fn resolve_settings(args: &Args) -> Result<Settings> {
    let path = settings::settings_path(args.config.as_deref());
    let mut settings = settings::load(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;

    if let Some(tick_ms) = args.tick_ms {
        if tick_ms == 0 {
            bail!("--tick-ms must be at least 1");
        }
        settings.tick_interval_ms = tick_ms;
    }
    Ok(settings)
}


fn read_script(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}


fn run_tui(settings: &Settings, script: &[String]) -> Result<()> {
    let mut session = Session::from_settings(settings, TerminalConsole::new(settings.max_log_lines));
    for line in script {
        session.submit(line);
    }

    let mut tui = Tui::new(Duration::from_millis(settings.tick_interval_ms))
        .context("failed to start terminal UI")?;
    tui.run(&mut session).context("terminal UI failed")?;
    Ok(())
}


// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn env_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}


fn init_stderr_logging(settings: &Settings) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(env_filter(settings));
    tracing_subscriber::registry().with(layer).init();
}


/// The terminal owns the screen, so TUI mode logs to a file.
fn init_file_logging(settings: &Settings) -> Result<WorkerGuard> {
    let path = settings
        .log_file
        .clone()
        .unwrap_or_else(|| settings::config_dir().join("kidra.log"));
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let (writer, guard) = non_blocking(file);
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false)
        .with_filter(env_filter(settings));
    tracing_subscriber::registry().with(layer).init();
    Ok(guard)
}
