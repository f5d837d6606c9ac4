//! `async <command> [..args]` — run another command in the background.
//!
//! The handler re-joins its argument tail into a command line and hands it
//! to the scheduler's background dispatch. It finishes immediately itself;
//! the forwarded command is what keeps running.

use crate::execution::{Context, Execution, Pid};
use crate::handler::CommandHandler;


pub struct AsyncCommand;


impl CommandHandler for AsyncCommand {
    fn name(&self) -> &'static str {
        "async"
    }

    fn summary(&self) -> &'static str {
        "Run a command in the background without blocking the queue"
    }

    fn usage(&self) -> &'static [&'static str] {
        &["Usage: async <command> [..args]"]
    }

    fn execute(&self, args: &[String], _pid: Pid, ctx: &mut Context<'_>) -> Option<Box<dyn Execution>> {
        if args.is_empty() {
            return self.print_usage(ctx);
        }
        ctx.spawn_background(args.join(" "));
        None
    }
}


#[cfg(test)]
mod tests {
    use crate::execution::{Harness, Request};

    #[test]
    fn forwards_tail() {
        let mut h = Harness::new();
        assert!(h.run("async", "goto y 70", 0).is_none());
        assert_eq!(h.requests, vec![Request::Background("goto y 70".into())]);
        assert!(h.console.events.is_empty());
    }

    #[test]
    fn no_args_prints_usage() {
        let mut h = Harness::new();
        assert!(h.run("async", "", 0).is_none());
        assert!(h.requests.is_empty());
        assert_eq!(h.console.messages(), vec!["Usage: async <command> [..args]"]);
    }
}
