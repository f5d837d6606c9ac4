//! Agent runtime abstraction.
//!
//! The scheduler itself never touches the agent. Individual command handlers
//! and executions do, through the [`Agent`] trait: chatting, reading the
//! position, setting navigation goals, quitting, and subscribing to the
//! runtime's asynchronous notifications.
//!
//! Implementations:
//! - [`mock::MockAgent`] — records calls, lets tests emit events by hand
//! - [`sim::SimAgent`] — a deterministic simulated agent driven per tick

pub mod events;
pub mod goal;
pub mod mock;
pub mod sim;

use serde::{Deserialize, Serialize};

pub use events::{EventBus, EventCallback, SubscriptionId};
pub use goal::Goal;


/// A point in the world. Block coordinates are the floored components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}


impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Position { x, y, z }
    }

    /// The block this position lies in.
    pub fn block(&self) -> (i64, i64, i64) {
        (
            self.x.floor() as i64,
            self.y.floor() as i64,
            self.z.floor() as i64,
        )
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}


/// Outcome reported by the runtime's path computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStatus {
    Success,
    Partial,
    Timeout,
    NoPath,
}


/// An asynchronous notification from the agent runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// The active navigation goal was reached.
    GoalReached,
    /// The active goal was replaced or cleared.
    GoalUpdated,
    /// Path following was forcibly stopped.
    PathStopped,
    /// A path computation finished with the given status.
    PathUpdate { status: PathStatus },
}


/// Payload-free discriminant of [`AgentEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    GoalReached,
    GoalUpdated,
    PathStopped,
    PathUpdate,
}


impl AgentEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AgentEvent::GoalReached => EventKind::GoalReached,
            AgentEvent::GoalUpdated => EventKind::GoalUpdated,
            AgentEvent::PathStopped => EventKind::PathStopped,
            AgentEvent::PathUpdate { .. } => EventKind::PathUpdate,
        }
    }
}


/// The primitives command handlers may use on the running agent.
pub trait Agent {
    /// Name the agent chats under.
    fn username(&self) -> &str;

    /// Broadcast a chat message.
    fn chat(&mut self, message: &str);

    /// Current position.
    fn position(&self) -> Position;

    /// Start navigating toward `goal`. Emits `GoalUpdated` synchronously to
    /// the subscribers registered at the time of the call.
    fn set_goal(&mut self, goal: Goal, dynamic: bool);

    /// Drop the current goal, if any. Emits `GoalUpdated` like `set_goal`.
    fn clear_goal(&mut self);

    /// Whether the agent is currently following a path.
    fn is_moving(&self) -> bool;

    /// Disconnect and end the session.
    fn quit(&mut self);

    /// Register a callback for one event kind.
    fn subscribe(&mut self, kind: EventKind, callback: EventCallback) -> SubscriptionId;

    /// Remove a subscription. Returns false if it was not registered.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}
