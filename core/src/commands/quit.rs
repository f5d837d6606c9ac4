//! `quit` — disconnect the agent. The host ends the session once the
//! agent reports it has ended.

use crate::execution::{Context, Execution, Pid};
use crate::handler::CommandHandler;


pub struct QuitCommand;


impl CommandHandler for QuitCommand {
    fn name(&self) -> &'static str {
        "quit"
    }

    fn summary(&self) -> &'static str {
        "Disconnect the agent and exit"
    }

    fn usage(&self) -> &'static [&'static str] {
        &["Usage: quit"]
    }

    fn execute(&self, args: &[String], _pid: Pid, ctx: &mut Context<'_>) -> Option<Box<dyn Execution>> {
        if !args.is_empty() {
            return self.print_usage(ctx);
        }
        ctx.agent.quit();
        None
    }
}


#[cfg(test)]
mod tests {
    use crate::execution::Harness;

    #[test]
    fn quits_agent() {
        let mut h = Harness::new();
        assert!(h.run("quit", "", 0).is_none());
        assert!(h.agent.quit_called);
    }

    #[test]
    fn args_print_usage() {
        let mut h = Harness::new();
        assert!(h.run("quit", "now", 0).is_none());
        assert!(!h.agent.quit_called);
        assert_eq!(h.console.messages(), vec!["Usage: quit"]);
    }
}
