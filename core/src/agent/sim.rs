//! Simulated agent.
//!
//! Stands in for a connected game client. The host calls [`SimAgent::step`]
//! once per tick, before the scheduler runs; notifications produced by a
//! step are delivered synchronously to subscribers, which is the same point
//! in the tick where a real runtime would deliver them.
//!
//! Path computation is modelled coarsely: a goal whose height lies outside
//! the world has no path, and a goal too far away times out.

use std::collections::VecDeque;

use super::{Agent, AgentEvent, EventBus, EventCallback, EventKind, Goal, PathStatus, Position, SubscriptionId};
use crate::settings::AgentSettings;


#[derive(Debug)]
pub struct SimAgent {
    settings: AgentSettings,
    position: Position,
    goal: Option<Goal>,
    /// Set when a new goal still awaits its path computation result.
    path_pending: bool,
    chat_outbox: VecDeque<String>,
    ended: bool,
    bus: EventBus,
}


impl SimAgent {
    pub fn new(settings: AgentSettings) -> Self {
        SimAgent {
            position: settings.spawn,
            settings,
            goal: None,
            path_pending: false,
            chat_outbox: VecDeque::new(),
            ended: false,
            bus: EventBus::new(),
        }
    }

    /// Advance the simulation one tick.
    pub fn step(&mut self) {
        if self.ended {
            return;
        }
        let Some(goal) = self.goal else {
            return;
        };

        if self.path_pending {
            self.path_pending = false;
            let status = self.compute_path(&goal);
            tracing::debug!(%goal, ?status, "path computed");
            if matches!(status, PathStatus::NoPath | PathStatus::Timeout) {
                self.goal = None;
            }
            self.bus.emit(&AgentEvent::PathUpdate { status });
            return;
        }

        if goal.is_satisfied(&self.position) {
            self.goal = None;
            self.bus.emit(&AgentEvent::GoalReached);
            return;
        }

        let target = goal.target(&self.position);
        let distance = self.position.distance_to(&target);
        let travel = self.settings.speed.min(distance);
        if distance > 0.0 {
            let f = travel / distance;
            self.position.x += (target.x - self.position.x) * f;
            self.position.y += (target.y - self.position.y) * f;
            self.position.z += (target.z - self.position.z) * f;
        }
    }

    fn compute_path(&self, goal: &Goal) -> PathStatus {
        if let Some(y) = goal.height() {
            if y < self.settings.min_y || y > self.settings.max_y {
                return PathStatus::NoPath;
            }
        }
        let target = goal.target(&self.position);
        if self.position.distance_to(&target) > self.settings.max_path_distance {
            return PathStatus::Timeout;
        }
        PathStatus::Success
    }

    /// Simulate an external interruption: drop the goal and emit `PathStopped`.
    pub fn interrupt(&mut self) {
        if self.goal.take().is_some() {
            self.path_pending = false;
            self.bus.emit(&AgentEvent::PathStopped);
        }
    }

    /// Chat messages sent since the last call, oldest first.
    pub fn drain_chat(&mut self) -> Vec<String> {
        self.chat_outbox.drain(..).collect()
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn goal(&self) -> Option<Goal> {
        self.goal
    }

    pub fn subscription_count(&self) -> usize {
        self.bus.len()
    }
}


impl Agent for SimAgent {
    fn username(&self) -> &str {
        &self.settings.username
    }

    fn chat(&mut self, message: &str) {
        self.chat_outbox.push_back(message.to_string());
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_goal(&mut self, goal: Goal, _dynamic: bool) {
        self.goal = Some(goal);
        self.path_pending = true;
        self.bus.emit(&AgentEvent::GoalUpdated);
    }

    fn clear_goal(&mut self) {
        self.goal = None;
        self.path_pending = false;
        self.bus.emit(&AgentEvent::GoalUpdated);
    }

    fn is_moving(&self) -> bool {
        self.goal.is_some() && !self.path_pending
    }

    fn quit(&mut self) {
        tracing::info!(username = %self.settings.username, "agent quit");
        self.goal = None;
        self.ended = true;
    }

    fn subscribe(&mut self, kind: EventKind, callback: EventCallback) -> SubscriptionId {
        self.bus.subscribe(kind, callback)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn agent() -> SimAgent {
        SimAgent::new(AgentSettings {
            speed: 1.0,
            max_path_distance: 100.0,
            ..AgentSettings::default()
        })
    }

    fn record(agent: &mut SimAgent) -> Rc<RefCell<Vec<AgentEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            EventKind::GoalReached,
            EventKind::GoalUpdated,
            EventKind::PathStopped,
            EventKind::PathUpdate,
        ] {
            let seen = Rc::clone(&seen);
            agent.subscribe(kind, Box::new(move |e: &AgentEvent| seen.borrow_mut().push(e.clone())));
        }
        seen
    }

    #[test]
    fn walks_to_goal_and_reports_reached() {
        let mut agent = agent();
        let seen = record(&mut agent);
        agent.set_goal(Goal::NearXz { x: 3, z: 0, range: 0 }, false);

        for _ in 0..10 {
            agent.step();
        }

        let events = seen.borrow();
        assert_eq!(events[0], AgentEvent::GoalUpdated);
        assert_eq!(events[1], AgentEvent::PathUpdate { status: PathStatus::Success });
        assert_eq!(events.last(), Some(&AgentEvent::GoalReached));
        assert_eq!(events.iter().filter(|e| **e == AgentEvent::GoalReached).count(), 1);
        assert!(agent.goal().is_none());
        assert_eq!(agent.position().block(), (3, 64, 0));
    }

    #[test]
    fn height_outside_world_has_no_path() {
        let mut agent = agent();
        let seen = record(&mut agent);
        agent.set_goal(Goal::Y { y: 1000 }, false);
        agent.step();

        assert_eq!(
            seen.borrow().last(),
            Some(&AgentEvent::PathUpdate { status: PathStatus::NoPath })
        );
        assert!(agent.goal().is_none());
    }

    #[test]
    fn distant_goal_times_out() {
        let mut agent = agent();
        let seen = record(&mut agent);
        agent.set_goal(Goal::NearXz { x: 5000, z: 0, range: 1 }, false);
        agent.step();

        assert_eq!(
            seen.borrow().last(),
            Some(&AgentEvent::PathUpdate { status: PathStatus::Timeout })
        );
    }

    #[test]
    fn interrupt_emits_path_stopped() {
        let mut agent = agent();
        let seen = record(&mut agent);
        agent.set_goal(Goal::Y { y: 80 }, false);
        agent.step();
        agent.interrupt();

        assert_eq!(seen.borrow().last(), Some(&AgentEvent::PathStopped));
        assert!(!agent.is_moving());
    }

    #[test]
    fn chat_is_queued_for_host() {
        let mut agent = agent();
        agent.chat("one");
        agent.chat("two");
        assert_eq!(agent.drain_chat(), vec!["one", "two"]);
        assert!(agent.drain_chat().is_empty());
    }

    #[test]
    fn quit_ends_and_freezes() {
        let mut agent = agent();
        agent.set_goal(Goal::Y { y: 80 }, false);
        agent.quit();
        let before = agent.position();
        agent.step();
        assert!(agent.has_ended());
        assert_eq!(agent.position(), before);
    }
}
