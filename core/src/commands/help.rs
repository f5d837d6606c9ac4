//! `help [command]` — list commands or show one command's usage.

use crate::execution::{Context, Execution, Pid};
use crate::handler::CommandHandler;


pub struct HelpCommand;


impl CommandHandler for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn summary(&self) -> &'static str {
        "List commands, or show usage for one"
    }

    fn usage(&self) -> &'static [&'static str] {
        &["Usage: help [command]"]
    }

    fn execute(&self, args: &[String], _pid: Pid, ctx: &mut Context<'_>) -> Option<Box<dyn Execution>> {
        let handlers = ctx.handlers;
        match args {
            [] => {
                let width = handlers.iter().map(|h| h.name().len()).max().unwrap_or(0);
                ctx.console.log("Commands:");
                for handler in handlers.iter() {
                    let line = format!("  {:<width$}  {}", handler.name(), handler.summary());
                    ctx.console.log(&line);
                }
                ctx.console.log("Prefix any command with 'async' to run it in the background.");
                None
            }
            [name] => match handlers.get(name) {
                Some(handler) => handler.print_usage(ctx),
                None => {
                    ctx.console.log(&format!("Unknown command: {}", name.to_lowercase()));
                    None
                }
            },
            _ => self.print_usage(ctx),
        }
    }
}
