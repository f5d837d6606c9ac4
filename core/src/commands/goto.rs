//! `goto` — navigate with the agent's pathfinder.
//!
//! ```text
//! goto pos <x> <y> <z> <range>
//! goto xz <x> <z> <range>
//! goto y <y>
//! ```
//!
//! A [`GotoExecution`] learns about progress only through runtime
//! notifications. Its callbacks write to a shared [`NavState`] and nothing
//! else; the execution reports failures the next time it is polled.
//!
//! Failure policy: while the execution still believes it is in control, any
//! change of the active goal, a forced path stop, or a terminal path status
//! is this execution's failure. Its own `cancel` is the only way to end it
//! without a failure.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::agent::{AgentEvent, EventKind, Goal, PathStatus, SubscriptionId};
use crate::console::LogKind;
use crate::error::{parse_int, ArgError};
use crate::execution::{Context, Execution, Pid};
use crate::handler::CommandHandler;


pub struct GotoCommand;


impl CommandHandler for GotoCommand {
    fn name(&self) -> &'static str {
        "goto"
    }

    fn summary(&self) -> &'static str {
        "Navigate near a point, a column, or to a height"
    }

    fn usage(&self) -> &'static [&'static str] {
        &[
            "Usage: goto pos <x> <y> <z> <range>",
            "     : goto xz <x> <z> <range>",
            "     : goto y <y>",
        ]
    }

    fn execute(&self, args: &[String], pid: Pid, ctx: &mut Context<'_>) -> Option<Box<dyn Execution>> {
        match parse_goal(args) {
            Ok(goal) => Some(Box::new(GotoExecution::new(pid, goal))),
            Err(ArgError::Usage) => self.print_usage(ctx),
            Err(err) => {
                ctx.console.log(&err.to_string());
                None
            }
        }
    }
}


/// Parse `pos|xz|y` and its integers. The argument count is checked before
/// any number, and numbers are checked left to right.
pub fn parse_goal(args: &[String]) -> Result<Goal, ArgError> {
    let (mode, rest) = args.split_first().ok_or(ArgError::Usage)?;
    let ints = |expected: usize| -> Result<Vec<i64>, ArgError> {
        if rest.len() != expected {
            return Err(ArgError::Usage);
        }
        rest.iter().map(|t| parse_int(t)).collect()
    };

    match mode.to_lowercase().as_str() {
        "pos" => {
            let v = ints(4)?;
            Ok(Goal::Near { x: v[0], y: v[1], z: v[2], range: v[3] })
        }
        "xz" => {
            let v = ints(3)?;
            Ok(Goal::NearXz { x: v[0], z: v[1], range: v[2] })
        }
        "y" => {
            let v = ints(1)?;
            Ok(Goal::Y { y: v[0] })
        }
        _ => Err(ArgError::Usage),
    }
}


// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Why a navigation ended without reaching its goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavFailure {
    GoalChanged,
    PathStopped,
    NoPath,
    Timeout,
}


impl fmt::Display for NavFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            NavFailure::GoalChanged => "goal changed",
            NavFailure::PathStopped => "path stopped",
            NavFailure::NoPath => "no path",
            NavFailure::Timeout => "path computation timed out",
        };
        f.write_str(reason)
    }
}


/// Flags shared between a [`GotoExecution`] and its callbacks.
#[derive(Debug, Default)]
pub struct NavState {
    running: Cell<bool>,
    failure: Cell<Option<NavFailure>>,
}


impl NavState {
    fn fail(&self, failure: NavFailure) {
        // Notifications arriving after completion or cancellation are ignored.
        if self.running.get() {
            self.running.set(false);
            self.failure.set(Some(failure));
        }
    }
}


pub struct GotoExecution {
    pid: Pid,
    goal: Goal,
    state: Rc<NavState>,
    subscriptions: Vec<SubscriptionId>,
    released: bool,
}


impl GotoExecution {
    pub fn new(pid: Pid, goal: Goal) -> Self {
        GotoExecution {
            pid,
            goal,
            state: Rc::new(NavState::default()),
            subscriptions: Vec::new(),
            released: false,
        }
    }

    fn subscribe(&mut self, ctx: &mut Context<'_>, kind: EventKind, on_event: fn(&NavState, &AgentEvent)) {
        let state = Rc::clone(&self.state);
        let id = ctx.agent.subscribe(kind, Box::new(move |event: &AgentEvent| on_event(&state, event)));
        self.subscriptions.push(id);
    }
}


impl Execution for GotoExecution {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn begin(&mut self, ctx: &mut Context<'_>) {
        // The goal is set before subscribing so this execution does not see
        // its own GoalUpdated notification.
        ctx.agent.set_goal(self.goal, false);
        self.state.running.set(true);

        self.subscribe(ctx, EventKind::GoalReached, |state, _| state.running.set(false));
        self.subscribe(ctx, EventKind::GoalUpdated, |state, _| state.fail(NavFailure::GoalChanged));
        self.subscribe(ctx, EventKind::PathStopped, |state, _| state.fail(NavFailure::PathStopped));
        self.subscribe(ctx, EventKind::PathUpdate, |state, event| {
            if let AgentEvent::PathUpdate { status } = event {
                match status {
                    PathStatus::NoPath => state.fail(NavFailure::NoPath),
                    PathStatus::Timeout => state.fail(NavFailure::Timeout),
                    PathStatus::Success | PathStatus::Partial => {}
                }
            }
        });
        tracing::debug!(pid = %self.pid, goal = %self.goal, "goto started");
    }

    fn cancel(&mut self, ctx: &mut Context<'_>) {
        // Only drop the runtime goal if it is still ours.
        if self.state.running.replace(false) {
            ctx.agent.clear_goal();
        }
    }

    fn is_running(&mut self, ctx: &mut Context<'_>) -> bool {
        if let Some(failure) = self.state.failure.take() {
            ctx.console.log_with(
                LogKind::Error,
                &format!("Goto failed. PID: {} ({})", self.pid, failure),
            );
        }
        self.state.running.get()
    }

    fn cleanup(&mut self, ctx: &mut Context<'_>) {
        if self.released {
            return;
        }
        self.released = true;
        for id in self.subscriptions.drain(..) {
            ctx.agent.unsubscribe(id);
        }
        tracing::debug!(pid = %self.pid, "goto subscriptions released");
    }
}


impl Drop for GotoExecution {
    fn drop(&mut self) {
        if !self.subscriptions.is_empty() {
            tracing::warn!(pid = %self.pid, "goto dropped with live subscriptions");
        }
    }
}
