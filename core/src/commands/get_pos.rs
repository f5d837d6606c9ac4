//! `get_pos` — print the agent's block position.

use crate::execution::{Context, Execution, Pid};
use crate::handler::CommandHandler;


pub struct GetPosCommand;


impl CommandHandler for GetPosCommand {
    fn name(&self) -> &'static str {
        "get_pos"
    }

    fn summary(&self) -> &'static str {
        "Print the agent's current block position"
    }

    fn usage(&self) -> &'static [&'static str] {
        &["Usage: get_pos"]
    }

    fn execute(&self, args: &[String], _pid: Pid, ctx: &mut Context<'_>) -> Option<Box<dyn Execution>> {
        if !args.is_empty() {
            return self.print_usage(ctx);
        }
        let (x, y, z) = ctx.agent.position().block();
        ctx.console.log(&format!("Pos: {}, {}, {}", x, y, z));
        None
    }
}
