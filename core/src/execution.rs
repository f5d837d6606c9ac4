//! Execution — one running command instance.
//!
//! A handler either finishes its work synchronously (and returns nothing) or
//! returns a boxed [`Execution`]. From that moment the scheduler owns it: it
//! calls `begin` once, polls `is_running` once per tick, may call `cancel`,
//! and calls `cleanup` exactly once right before discarding it.
//!
//! No method may block. Long-running work keeps its state in the execution
//! and is re-polled on the next tick.

use std::fmt;

use crate::agent::Agent;
use crate::console::Console;
use crate::handler::HandlerRegistry;


/// Process id. Allocated by the scheduler in dispatch order, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub u64);


impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


pub trait Execution {
    fn pid(&self) -> Pid;

    /// Start the work. Called once, right after the handler returns.
    fn begin(&mut self, ctx: &mut Context<'_>);

    /// Request termination. The next `is_running` must return false.
    fn cancel(&mut self, ctx: &mut Context<'_>);

    /// Poll for completion.
    fn is_running(&mut self, ctx: &mut Context<'_>) -> bool;

    /// Release anything registered with the agent runtime. Called exactly
    /// once by the scheduler before the execution is dropped.
    fn cleanup(&mut self, _ctx: &mut Context<'_>) {}
}


/// A request from a handler to the scheduler, applied once the handler
/// returns and before the scheduler call that ran it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Dispatch a command line in the background.
    Background(String),
    /// Cancel the execution with this pid.
    Kill(Pid),
}


/// What a handler or execution may touch while it runs.
pub struct Context<'a> {
    pub agent: &'a mut dyn Agent,
    pub console: &'a mut dyn Console,
    /// Read-only view of the registered handlers.
    pub handlers: &'a HandlerRegistry,
    /// Host clock, in milliseconds.
    pub now_ms: u64,
    requests: &'a mut Vec<Request>,
}


impl<'a> Context<'a> {
    pub fn new(
        agent: &'a mut dyn Agent,
        console: &'a mut dyn Console,
        handlers: &'a HandlerRegistry,
        requests: &'a mut Vec<Request>,
        now_ms: u64,
    ) -> Self {
        Context {
            agent,
            console,
            handlers,
            now_ms,
            requests,
        }
    }

    /// Ask the scheduler to run `line` as a background command.
    pub fn spawn_background(&mut self, line: impl Into<String>) {
        self.requests.push(Request::Background(line.into()));
    }

    /// Ask the scheduler to cancel the execution with `pid`.
    pub fn kill(&mut self, pid: Pid) {
        self.requests.push(Request::Kill(pid));
    }
}


// ---------------------------------------------------------------------------
// Test harness
// ---------------------------------------------------------------------------

/// Owns everything a [`Context`] borrows, for handler and execution tests.
#[cfg(test)]
pub(crate) struct Harness {
    pub agent: crate::agent::mock::MockAgent,
    pub console: crate::console::RecordingConsole,
    pub handlers: HandlerRegistry,
    pub requests: Vec<Request>,
    pub now_ms: u64,
}


#[cfg(test)]
impl Harness {
    pub fn new() -> Self {
        Harness {
            agent: crate::agent::mock::MockAgent::new(),
            console: crate::console::RecordingConsole::new(),
            handlers: HandlerRegistry::with_defaults(),
            requests: Vec::new(),
            now_ms: 0,
        }
    }

    pub fn ctx(&mut self) -> Context<'_> {
        Context::new(
            &mut self.agent,
            &mut self.console,
            &self.handlers,
            &mut self.requests,
            self.now_ms,
        )
    }

    /// Run the registered handler for `name` with whitespace-split args.
    pub fn run(&mut self, name: &str, args: &str, pid: u64) -> Option<Box<dyn Execution>> {
        let args: Vec<String> = args.split_whitespace().map(String::from).collect();
        let handler = self.handlers.get(name)?;
        let mut ctx = Context::new(
            &mut self.agent,
            &mut self.console,
            &self.handlers,
            &mut self.requests,
            self.now_ms,
        );
        handler.execute(&args, Pid(pid), &mut ctx)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_displays_bare_number() {
        assert_eq!(Pid(42).to_string(), "42");
    }

    #[test]
    fn pids_order_by_allocation() {
        assert!(Pid(1) < Pid(2));
    }

    #[test]
    fn context_collects_requests() {
        let mut h = Harness::new();
        {
            let mut ctx = h.ctx();
            ctx.spawn_background("wait 1");
            ctx.kill(Pid(3));
        }
        assert_eq!(
            h.requests,
            vec![Request::Background("wait 1".into()), Request::Kill(Pid(3))]
        );
    }
}
