//! `say <message>` — broadcast one chat message.

use crate::execution::{Context, Execution, Pid};
use crate::handler::CommandHandler;


pub struct SayCommand;


impl CommandHandler for SayCommand {
    fn name(&self) -> &'static str {
        "say"
    }

    fn summary(&self) -> &'static str {
        "Broadcast a chat message (quote it to include spaces)"
    }

    fn usage(&self) -> &'static [&'static str] {
        &["Usage: say <message>"]
    }

    fn execute(&self, args: &[String], _pid: Pid, ctx: &mut Context<'_>) -> Option<Box<dyn Execution>> {
        match args {
            [message] => {
                ctx.agent.chat(message);
                None
            }
            _ => self.print_usage(ctx),
        }
    }
}
