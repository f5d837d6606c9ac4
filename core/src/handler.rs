//! Command handlers and the registry that maps names to them.
//!
//! A handler validates its own arguments. On bad input it prints its usage
//! (or a number error) to the console and returns no execution, so the
//! scheduler carries on as if the command had completed instantly.

use crate::commands;
use crate::execution::{Context, Execution, Pid};


pub trait CommandHandler {
    /// Lower-case command name.
    fn name(&self) -> &'static str;

    /// One-line description for `help`.
    fn summary(&self) -> &'static str;

    /// Usage block, one entry per console line.
    fn usage(&self) -> &'static [&'static str];

    /// Run the command. `None` means it already finished.
    fn execute(&self, args: &[String], pid: Pid, ctx: &mut Context<'_>) -> Option<Box<dyn Execution>>;

    /// Print the usage block and finish without an execution.
    fn print_usage(&self, ctx: &mut Context<'_>) -> Option<Box<dyn Execution>> {
        for line in self.usage() {
            ctx.console.log(line);
        }
        None
    }
}


/// Ordered set of handlers with case-insensitive lookup.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn CommandHandler>>,
}


impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in command.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for handler in commands::builtin() {
            registry.register(handler);
        }
        registry
    }

    /// Add a handler. If the name is taken the first registration wins and
    /// this returns false.
    pub fn register(&mut self, handler: Box<dyn CommandHandler>) -> bool {
        if self.get(handler.name()).is_some() {
            tracing::warn!(name = handler.name(), "duplicate command handler ignored");
            return false;
        }
        self.handlers.push(handler);
        true
    }

    pub fn get(&self, name: &str) -> Option<&dyn CommandHandler> {
        self.handlers
            .iter()
            .find(|h| h.name().eq_ignore_ascii_case(name))
            .map(|h| h.as_ref())
    }

    /// Handlers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn CommandHandler> {
        self.handlers.iter().map(|h| h.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
