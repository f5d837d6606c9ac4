//! `kill <pid>` — cancel a running process.
//!
//! Mostly useful as `async kill <pid>`, since a queued `kill` only runs once
//! the foreground slot is free. The scheduler performs the cancellation and
//! reaps the execution on its next tick.

use crate::error::{parse_int, ArgError};
use crate::execution::{Context, Execution, Pid};
use crate::handler::CommandHandler;


pub struct KillCommand;


impl CommandHandler for KillCommand {
    fn name(&self) -> &'static str {
        "kill"
    }

    fn summary(&self) -> &'static str {
        "Cancel a running process by PID"
    }

    fn usage(&self) -> &'static [&'static str] {
        &["Usage: kill <pid>"]
    }

    fn execute(&self, args: &[String], _pid: Pid, ctx: &mut Context<'_>) -> Option<Box<dyn Execution>> {
        let target = match args {
            [token] => parse_int(token),
            _ => Err(ArgError::Usage),
        };
        match target {
            Ok(value) => match u64::try_from(value) {
                Ok(pid) => ctx.kill(Pid(pid)),
                Err(_) => ctx.console.log(&format!("No such process. PID: {}", value)),
            },
            Err(ArgError::Usage) => return self.print_usage(ctx),
            Err(err) => ctx.console.log(&err.to_string()),
        }
        None
    }
}


#[cfg(test)]
mod tests {
    use crate::execution::{Harness, Pid, Request};

    #[test]
    fn requests_kill() {
        let mut h = Harness::new();
        assert!(h.run("kill", "3", 9).is_none());
        assert_eq!(h.requests, vec![Request::Kill(Pid(3))]);
    }

    #[test]
    fn negative_pid_never_exists() {
        let mut h = Harness::new();
        h.run("kill", "-1", 0);
        assert!(h.requests.is_empty());
        assert_eq!(h.console.messages(), vec!["No such process. PID: -1"]);
    }

    #[test]
    fn bad_input() {
        let mut h = Harness::new();
        h.run("kill", "x", 0);
        h.run("kill", "", 0);
        assert!(h.requests.is_empty());
        assert_eq!(
            h.console.messages(),
            vec!["Error: 'x' is not a number!", "Usage: kill <pid>"]
        );
    }
}
