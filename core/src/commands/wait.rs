//! `wait <seconds>` — complete after a wall-clock delay.

use crate::error::{parse_float, ArgError};
use crate::execution::{Context, Execution, Pid};
use crate::handler::CommandHandler;


pub struct WaitCommand;


impl CommandHandler for WaitCommand {
    fn name(&self) -> &'static str {
        "wait"
    }

    fn summary(&self) -> &'static str {
        "Block the queue for a number of seconds"
    }

    fn usage(&self) -> &'static [&'static str] {
        &["Usage: wait <seconds>"]
    }

    fn execute(&self, args: &[String], pid: Pid, ctx: &mut Context<'_>) -> Option<Box<dyn Execution>> {
        match parse_seconds(args) {
            Ok(seconds) => Some(Box::new(WaitExecution::new(pid, seconds))),
            Err(ArgError::Usage) => self.print_usage(ctx),
            Err(err) => {
                ctx.console.log(&err.to_string());
                None
            }
        }
    }
}


fn parse_seconds(args: &[String]) -> Result<f64, ArgError> {
    match args {
        [token] => parse_float(token),
        _ => Err(ArgError::Usage),
    }
}


/// Runs until a deadline fixed at `begin`. Negative durations finish
/// immediately.
pub struct WaitExecution {
    pid: Pid,
    duration_ms: u64,
    deadline_ms: u64,
}


impl WaitExecution {
    pub fn new(pid: Pid, seconds: f64) -> Self {
        // Float to int casts saturate: negatives become 0, infinity u64::MAX.
        let duration_ms = (seconds * 1000.0).round() as u64;
        WaitExecution {
            pid,
            duration_ms,
            deadline_ms: 0,
        }
    }

    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }
}


impl Execution for WaitExecution {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn begin(&mut self, ctx: &mut Context<'_>) {
        self.deadline_ms = ctx.now_ms.saturating_add(self.duration_ms);
    }

    fn cancel(&mut self, _ctx: &mut Context<'_>) {
        self.deadline_ms = 0;
    }

    fn is_running(&mut self, ctx: &mut Context<'_>) -> bool {
        ctx.now_ms < self.deadline_ms
    }
}
