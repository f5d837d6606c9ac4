//! Mock agent for testing.
//!
//! Records every primitive called on it and lets tests deliver runtime
//! notifications by hand, making handler and execution tests deterministic.

use super::{Agent, AgentEvent, EventBus, EventCallback, EventKind, Goal, Position, SubscriptionId};


/// A goal change observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum GoalChange {
    Set { goal: Goal, dynamic: bool },
    Cleared,
}


#[derive(Debug)]
pub struct MockAgent {
    /// Chat messages sent, in order.
    pub chats: Vec<String>,
    /// Goal changes requested, in order.
    pub goal_changes: Vec<GoalChange>,
    pub position: Position,
    pub moving: bool,
    pub quit_called: bool,
    goal: Option<Goal>,
    bus: EventBus,
}


impl MockAgent {
    pub fn new() -> Self {
        MockAgent {
            chats: Vec::new(),
            goal_changes: Vec::new(),
            position: Position::default(),
            moving: false,
            quit_called: false,
            goal: None,
            bus: EventBus::new(),
        }
    }

    /// Deliver an event to subscribers. Returns how many callbacks ran.
    pub fn emit(&mut self, event: AgentEvent) -> usize {
        self.bus.emit(&event)
    }

    /// The goal most recently set and not cleared.
    pub fn goal(&self) -> Option<Goal> {
        self.goal
    }

    pub fn subscription_count(&self) -> usize {
        self.bus.len()
    }

    pub fn subscriptions_for(&self, kind: EventKind) -> usize {
        self.bus.count_for(kind)
    }
}


impl Default for MockAgent {
    fn default() -> Self {
        Self::new()
    }
}


impl Agent for MockAgent {
    fn username(&self) -> &str {
        "mock"
    }

    fn chat(&mut self, message: &str) {
        self.chats.push(message.to_string());
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_goal(&mut self, goal: Goal, dynamic: bool) {
        self.goal = Some(goal);
        self.moving = true;
        self.goal_changes.push(GoalChange::Set { goal, dynamic });
        self.bus.emit(&AgentEvent::GoalUpdated);
    }

    fn clear_goal(&mut self) {
        self.goal = None;
        self.moving = false;
        self.goal_changes.push(GoalChange::Cleared);
        self.bus.emit(&AgentEvent::GoalUpdated);
    }

    fn is_moving(&self) -> bool {
        self.moving
    }

    fn quit(&mut self) {
        self.quit_called = true;
    }

    fn subscribe(&mut self, kind: EventKind, callback: EventCallback) -> SubscriptionId {
        self.bus.subscribe(kind, callback)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }
}
