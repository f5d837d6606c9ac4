//! Session — one agent driven by one command buffer.
//!
//! The host owns the clock. Each [`Session::step`] advances the simulated
//! agent, echoes whatever it said in chat, and ticks the scheduler. Once the
//! agent has quit, the session shuts the buffer down and reports
//! [`SessionState::Ended`] from then on.

use crate::agent::sim::SimAgent;
use crate::agent::Agent;
use crate::console::{Console, LogKind};
use crate::scheduler::CommandBuffer;
use crate::settings::Settings;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Ended,
}


pub struct Session<C: Console> {
    agent: SimAgent,
    buffer: CommandBuffer<C>,
    state: SessionState,
}


impl<C: Console> Session<C> {
    pub fn new(agent: SimAgent, buffer: CommandBuffer<C>) -> Self {
        Session {
            agent,
            buffer,
            state: SessionState::Running,
        }
    }

    /// Session with a fresh simulated agent and the built-in commands.
    pub fn from_settings(settings: &Settings, console: C) -> Self {
        Self::new(SimAgent::new(settings.agent.clone()), CommandBuffer::new(console))
    }

    /// Queue an operator line for the foreground.
    pub fn submit(&mut self, line: &str) {
        if self.state == SessionState::Ended {
            tracing::debug!(line, "input after session end ignored");
            return;
        }
        self.buffer.enqueue(line);
    }

    /// Advance one clock step.
    pub fn step(&mut self, now_ms: u64) -> SessionState {
        if self.state == SessionState::Ended {
            return self.state;
        }

        self.agent.step();
        self.buffer.tick(&mut self.agent, now_ms);
        self.echo_chat();

        if self.agent.has_ended() {
            self.buffer.shutdown(&mut self.agent, now_ms);
            self.echo_chat();
            self.state = SessionState::Ended;
        }
        self.state
    }

    /// Ask the agent to quit. The next step ends the session.
    pub fn quit(&mut self) {
        self.agent.quit();
    }

    fn echo_chat(&mut self) {
        let chats = self.agent.drain_chat();
        if chats.is_empty() {
            return;
        }
        let username = self.agent.username().to_string();
        for message in chats {
            self.buffer
                .console_mut()
                .log_with(LogKind::Chat, &format!("<{}> {}", username, message));
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn agent(&self) -> &SimAgent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut SimAgent {
        &mut self.agent
    }

    pub fn buffer(&self) -> &CommandBuffer<C> {
        &self.buffer
    }

    pub fn console(&self) -> &C {
        self.buffer.console()
    }

    pub fn console_mut(&mut self) -> &mut C {
        self.buffer.console_mut()
    }
}
