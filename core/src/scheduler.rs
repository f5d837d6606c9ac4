//! CommandBuffer — the cooperative command scheduler.
//!
//! Lines submitted with [`CommandBuffer::enqueue`] run one at a time in
//! FIFO order through a single foreground slot. Lines handed to
//! [`CommandBuffer::dispatch_background`] start immediately and run
//! alongside the queue. Nothing here blocks: the host calls
//! [`CommandBuffer::tick`] once per clock step and every execution is polled
//! from inside that call.
//!
//! The buffer is the only writer of its queue and execution sets. Handlers
//! and executions that need to start or stop other work leave a
//! [`Request`] on their [`Context`]; the buffer applies it as soon as the
//! call that produced it returns.

use std::collections::VecDeque;
use std::mem;

use crate::agent::Agent;
use crate::command::{parse_command, Command};
use crate::console::{Console, LogKind, ProcessHandle};
use crate::execution::{Context, Execution, Pid, Request};
use crate::handler::HandlerRegistry;


/// The execution holding the foreground slot, with the text it was queued as.
struct Foreground {
    exec: Box<dyn Execution>,
    text: String,
}


/// A running background execution and its console entry.
struct BackgroundProcess {
    exec: Box<dyn Execution>,
    handle: ProcessHandle,
    label: String,
}


pub struct CommandBuffer<C: Console> {
    console: C,
    handlers: HandlerRegistry,
    pending: VecDeque<Command>,
    foreground: Option<Foreground>,
    background: Vec<BackgroundProcess>,
    next_pid: u64,
}


impl<C: Console> CommandBuffer<C> {
    /// Buffer with every built-in command registered.
    pub fn new(console: C) -> Self {
        Self::with_handlers(console, HandlerRegistry::with_defaults())
    }

    pub fn with_handlers(console: C, handlers: HandlerRegistry) -> Self {
        CommandBuffer {
            console,
            handlers,
            pending: VecDeque::new(),
            foreground: None,
            background: Vec::new(),
            next_pid: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Tokenize `line` and append it to the queue. Nothing runs until the
    /// next tick.
    pub fn enqueue(&mut self, line: &str) {
        let command = parse_command(line);
        tracing::debug!(command = %command, depth = self.pending.len() + 1, "queued");
        self.pending.push_back(command);
    }

    /// Run `line` in the background right away, outside the queue.
    pub fn dispatch_background(&mut self, line: &str, agent: &mut dyn Agent, now_ms: u64) {
        let mut requests = Vec::new();
        self.start_background(line, agent, now_ms, &mut requests);
        self.apply_requests(agent, now_ms, requests);
    }

    /// Advance one clock step: reap finished background work, then either
    /// start the next queued command or poll the foreground one.
    pub fn tick(&mut self, agent: &mut dyn Agent, now_ms: u64) {
        let mut requests = Vec::new();
        self.reap_background(agent, now_ms, &mut requests);

        if self.foreground.is_none() {
            self.start_next(agent, now_ms, &mut requests);
        } else {
            self.poll_foreground(agent, now_ms, &mut requests);
        }

        self.apply_requests(agent, now_ms, requests);
    }

    /// Cancel and release every execution and drop the queue. Returns how
    /// many executions were cancelled.
    pub fn shutdown(&mut self, agent: &mut dyn Agent, now_ms: u64) -> usize {
        let mut requests = Vec::new();
        let mut cancelled = 0;

        if let Some(mut foreground) = self.foreground.take() {
            let mut ctx = Context::new(&mut *agent, &mut self.console, &self.handlers, &mut requests, now_ms);
            foreground.exec.cancel(&mut ctx);
            foreground.exec.cleanup(&mut ctx);
            cancelled += 1;
        }

        for mut process in mem::take(&mut self.background) {
            let mut ctx = Context::new(&mut *agent, &mut self.console, &self.handlers, &mut requests, now_ms);
            process.exec.cancel(&mut ctx);
            process.exec.cleanup(&mut ctx);
            self.console.remove_process(process.handle);
            cancelled += 1;
        }

        let dropped = self.pending.len();
        self.pending.clear();
        if !requests.is_empty() {
            tracing::debug!(count = requests.len(), "requests discarded at shutdown");
        }

        self.console.log_with(
            LogKind::Info,
            &format!("Shutting down. Cancelled {} running process(es).", cancelled),
        );
        tracing::info!(cancelled, dropped, "command buffer shut down");
        cancelled
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Commands waiting for the foreground slot, head first.
    pub fn pending(&self) -> &VecDeque<Command> {
        &self.pending
    }

    /// Text of the command holding the foreground slot.
    pub fn active_command(&self) -> Option<&str> {
        self.foreground.as_ref().map(|f| f.text.as_str())
    }

    pub fn background_count(&self) -> usize {
        self.background.len()
    }

    /// Display labels of the background processes, oldest first.
    pub fn background_labels(&self) -> impl Iterator<Item = &str> {
        self.background.iter().map(|p| p.label.as_str())
    }

    /// Nothing queued and nothing running.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.foreground.is_none() && self.background.is_empty()
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn allocate_pid(next_pid: &mut u64) -> Pid {
        let pid = Pid(*next_pid);
        *next_pid += 1;
        pid
    }

    fn unknown_command(&mut self, name: &str) {
        self.console.log_with(LogKind::Warn, &format!("Unknown command: {}", name));
    }

    fn start_background(
        &mut self,
        line: &str,
        agent: &mut dyn Agent,
        now_ms: u64,
        requests: &mut Vec<Request>,
    ) {
        let command = parse_command(line);
        let handler = match self.handlers.get(command.name()) {
            Some(handler) => handler,
            None => return self.unknown_command(command.name()),
        };
        let pid = Self::allocate_pid(&mut self.next_pid);

        let mut ctx = Context::new(agent, &mut self.console, &self.handlers, requests, now_ms);
        let mut exec = match handler.execute(command.args(), pid, &mut ctx) {
            Some(exec) => exec,
            None => return,
        };
        exec.begin(&mut ctx);

        let label = format!("PID {} : {}", pid, command);
        self.console.log_with(LogKind::Info, &format!("Started async process. PID: {}", pid));
        let handle = self.console.add_process(&label);
        tracing::debug!(%pid, command = %command, "background started");
        self.background.push(BackgroundProcess { exec, handle, label });
    }

    fn reap_background(&mut self, agent: &mut dyn Agent, now_ms: u64, requests: &mut Vec<Request>) {
        let mut index = 0;
        while index < self.background.len() {
            let mut ctx = Context::new(&mut *agent, &mut self.console, &self.handlers, &mut *requests, now_ms);
            if self.background[index].exec.is_running(&mut ctx) {
                index += 1;
                continue;
            }
            let mut process = self.background.remove(index);
            process.exec.cleanup(&mut ctx);

            let pid = process.exec.pid();
            self.console.remove_process(process.handle);
            self.console.log_with(LogKind::Info, &format!("Finished async process. PID: {}", pid));
            tracing::debug!(%pid, "background finished");
        }
    }

    fn start_next(&mut self, agent: &mut dyn Agent, now_ms: u64, requests: &mut Vec<Request>) {
        let command = match self.pending.pop_front() {
            Some(command) => command,
            None => return self.console.finish_command(),
        };
        let text = command.to_string();
        self.console.enter_command(&text);

        let handler = match self.handlers.get(command.name()) {
            Some(handler) => handler,
            None => return self.unknown_command(command.name()),
        };
        let pid = Self::allocate_pid(&mut self.next_pid);

        let mut ctx = Context::new(agent, &mut self.console, &self.handlers, requests, now_ms);
        if let Some(mut exec) = handler.execute(command.args(), pid, &mut ctx) {
            exec.begin(&mut ctx);
            tracing::debug!(%pid, command = %text, "foreground started");
            self.foreground = Some(Foreground { exec, text });
        }
    }

    fn poll_foreground(&mut self, agent: &mut dyn Agent, now_ms: u64, requests: &mut Vec<Request>) {
        let mut ctx = Context::new(agent, &mut self.console, &self.handlers, requests, now_ms);
        let finished = match self.foreground.as_mut() {
            Some(foreground) => !foreground.exec.is_running(&mut ctx),
            None => false,
        };
        if !finished {
            return;
        }
        if let Some(mut foreground) = self.foreground.take() {
            foreground.exec.cleanup(&mut ctx);
            tracing::debug!(pid = %foreground.exec.pid(), "foreground finished");
        }
    }

    /// Apply requests until none are left. Background dispatches may queue
    /// further requests of their own.
    fn apply_requests(&mut self, agent: &mut dyn Agent, now_ms: u64, mut requests: Vec<Request>) {
        while !requests.is_empty() {
            for request in mem::take(&mut requests) {
                match request {
                    Request::Background(line) => self.start_background(&line, &mut *agent, now_ms, &mut requests),
                    Request::Kill(pid) => self.cancel_pid(pid, &mut *agent, now_ms, &mut requests),
                }
            }
        }
    }

    /// Cancel the execution with `pid`. It stays in place until the next
    /// tick reaps it.
    fn cancel_pid(&mut self, pid: Pid, agent: &mut dyn Agent, now_ms: u64, requests: &mut Vec<Request>) {
        let exec = match self.foreground.as_mut().filter(|f| f.exec.pid() == pid) {
            Some(foreground) => &mut foreground.exec,
            None => match self.background.iter_mut().find(|p| p.exec.pid() == pid) {
                Some(process) => &mut process.exec,
                None => {
                    self.console.log_with(LogKind::Warn, &format!("No such process. PID: {}", pid));
                    return;
                }
            },
        };

        let mut ctx = Context::new(agent, &mut self.console, &self.handlers, requests, now_ms);
        exec.cancel(&mut ctx);
        self.console.log_with(LogKind::Info, &format!("Cancelled process. PID: {}", pid));
        tracing::debug!(%pid, "cancelled");
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::agent::mock::{GoalChange, MockAgent};
    use crate::agent::AgentEvent;
    use crate::console::{ConsoleEvent, RecordingConsole};
    use crate::handler::CommandHandler;

    // --- probe command ---

    /// `probe <polls>`: an execution that stays running for `polls` polls
    /// and records its lifecycle into a shared journal.
    struct ProbeCommand {
        journal: Rc<RefCell<Vec<String>>>,
    }

    struct ProbeExecution {
        pid: Pid,
        polls_left: u32,
        journal: Rc<RefCell<Vec<String>>>,
    }

    impl CommandHandler for ProbeCommand {
        fn name(&self) -> &'static str {
            "probe"
        }
        fn summary(&self) -> &'static str {
            "test probe"
        }
        fn usage(&self) -> &'static [&'static str] {
            &["Usage: probe <polls>"]
        }
        fn execute(&self, args: &[String], pid: Pid, _ctx: &mut Context<'_>) -> Option<Box<dyn Execution>> {
            let polls_left = args.first()?.parse().ok()?;
            Some(Box::new(ProbeExecution {
                pid,
                polls_left,
                journal: Rc::clone(&self.journal),
            }))
        }
    }

    impl Execution for ProbeExecution {
        fn pid(&self) -> Pid {
            self.pid
        }
        fn begin(&mut self, _ctx: &mut Context<'_>) {
            self.journal.borrow_mut().push(format!("begin {}", self.pid));
        }
        fn cancel(&mut self, _ctx: &mut Context<'_>) {
            self.polls_left = 0;
            self.journal.borrow_mut().push(format!("cancel {}", self.pid));
        }
        fn is_running(&mut self, _ctx: &mut Context<'_>) -> bool {
            if self.polls_left == 0 {
                return false;
            }
            self.polls_left -= 1;
            true
        }
        fn cleanup(&mut self, _ctx: &mut Context<'_>) {
            self.journal.borrow_mut().push(format!("cleanup {}", self.pid));
        }
    }

    type Buffer = CommandBuffer<RecordingConsole>;

    fn buffer() -> Buffer {
        CommandBuffer::new(RecordingConsole::new())
    }

    fn probed() -> (Buffer, Rc<RefCell<Vec<String>>>) {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut handlers = HandlerRegistry::with_defaults();
        handlers.register(Box::new(ProbeCommand {
            journal: Rc::clone(&journal),
        }));
        (CommandBuffer::with_handlers(RecordingConsole::new(), handlers), journal)
    }

    fn journal_of(journal: &Rc<RefCell<Vec<String>>>) -> Vec<String> {
        journal.borrow().clone()
    }

    // --- foreground queue ---

    #[test]
    fn enqueue_runs_nothing_until_tick() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("say hi");
        assert_eq!(buf.pending().len(), 1);
        assert!(agent.chats.is_empty());
        assert!(buf.console().events.is_empty());

        buf.tick(&mut agent, 0);
        assert_eq!(agent.chats, vec!["hi"]);
        assert!(buf.pending().is_empty());
    }

    #[test]
    fn foreground_runs_in_fifo_order_one_at_a_time() {
        let (mut buf, journal) = probed();
        let mut agent = MockAgent::new();
        buf.enqueue("probe 2");
        buf.enqueue("probe 0");
        buf.enqueue("probe 1");

        for step in 0..20 {
            buf.tick(&mut agent, step);
        }

        assert_eq!(
            journal_of(&journal),
            vec!["begin 0", "cleanup 0", "begin 1", "cleanup 1", "begin 2", "cleanup 2"]
        );
        assert_eq!(buf.console().entered(), vec!["probe 2", "probe 0", "probe 1"]);
        assert!(buf.is_idle());
    }

    #[test]
    fn finished_foreground_frees_slot_on_following_tick() {
        let (mut buf, journal) = probed();
        let mut agent = MockAgent::new();
        buf.enqueue("probe 1");
        buf.enqueue("say next");

        buf.tick(&mut agent, 0); // begin
        assert_eq!(buf.active_command(), Some("probe 1"));
        buf.tick(&mut agent, 1); // still running
        buf.tick(&mut agent, 2); // finished, slot cleared
        assert_eq!(buf.active_command(), None);
        assert!(agent.chats.is_empty());
        buf.tick(&mut agent, 3);
        assert_eq!(agent.chats, vec!["next"]);
        assert_eq!(journal_of(&journal), vec!["begin 0", "cleanup 0"]);
    }

    #[test]
    fn synchronous_commands_advance_one_per_tick() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("say a");
        buf.enqueue("say b");

        buf.tick(&mut agent, 0);
        assert_eq!(agent.chats, vec!["a"]);
        buf.tick(&mut agent, 1);
        assert_eq!(agent.chats, vec!["a", "b"]);
        buf.tick(&mut agent, 2);
        assert_eq!(buf.console().events.last(), Some(&ConsoleEvent::FinishCommand));
    }

    #[test]
    fn empty_queue_signals_finish_each_tick() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.tick(&mut agent, 0);
        buf.tick(&mut agent, 1);
        assert_eq!(
            buf.console().events,
            vec![ConsoleEvent::FinishCommand, ConsoleEvent::FinishCommand]
        );
    }

    #[test]
    fn command_is_echoed_lowercased() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("  SAY   Hello  ");
        buf.tick(&mut agent, 0);
        assert_eq!(buf.console().entered(), vec!["say Hello"]);
        assert_eq!(agent.chats, vec!["Hello"]);
    }

    #[test]
    fn unknown_command_is_logged_and_queue_advances() {
        let (mut buf, journal) = probed();
        let mut agent = MockAgent::new();
        buf.enqueue("Fly away");
        buf.enqueue("probe 0");

        buf.tick(&mut agent, 0);
        assert_eq!(buf.console().entered(), vec!["fly away"]);
        assert!(buf.console().has_message("Unknown command: fly"));
        assert_eq!(buf.active_command(), None);

        buf.tick(&mut agent, 1);
        // No pid was spent on the unknown command.
        assert_eq!(journal_of(&journal), vec!["begin 0"]);
    }

    #[test]
    fn blank_line_is_an_unknown_command() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("   ");
        buf.tick(&mut agent, 0);
        assert_eq!(buf.console().entered(), vec![""]);
        assert!(buf.console().has_message("Unknown command: "));
    }

    #[test]
    fn goto_with_bad_number_leaves_slot_free() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("goto y abc");
        buf.enqueue("say next");

        buf.tick(&mut agent, 0);
        assert_eq!(buf.console().messages(), vec!["Error: 'abc' is not a number!"]);
        assert_eq!(buf.active_command(), None);
        assert!(agent.goal_changes.is_empty());

        buf.tick(&mut agent, 1);
        assert_eq!(agent.chats, vec!["next"]);
    }

    #[test]
    fn goto_missing_range_prints_usage_block() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("goto pos 1 2 3");
        buf.tick(&mut agent, 0);
        assert_eq!(
            buf.console().messages(),
            vec![
                "Usage: goto pos <x> <y> <z> <range>",
                "     : goto xz <x> <z> <range>",
                "     : goto y <y>",
            ]
        );
        assert_eq!(buf.active_command(), None);
    }

    #[test]
    fn wait_holds_the_queue_until_deadline() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("wait 2");
        buf.enqueue("say done");

        buf.tick(&mut agent, 1_000);
        buf.tick(&mut agent, 2_999);
        assert_eq!(buf.active_command(), Some("wait 2"));
        buf.tick(&mut agent, 3_000);
        assert_eq!(buf.active_command(), None);
        buf.tick(&mut agent, 3_050);
        assert_eq!(agent.chats, vec!["done"]);
    }

    #[test]
    fn goto_foreground_releases_subscriptions() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("goto y 70");
        buf.tick(&mut agent, 0);
        assert_eq!(agent.subscription_count(), 4);

        agent.emit(AgentEvent::GoalReached);
        buf.tick(&mut agent, 1);
        assert_eq!(buf.active_command(), None);
        assert_eq!(agent.subscription_count(), 0);
    }

    // --- background ---

    #[test]
    fn background_dispatch_starts_immediately() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.dispatch_background("wait 1", &mut agent, 0);

        assert_eq!(buf.background_count(), 1);
        assert_eq!(buf.background_labels().collect::<Vec<_>>(), vec!["PID 0 : wait 1"]);
        assert_eq!(buf.console().process_labels(), vec!["PID 0 : wait 1"]);
        assert_eq!(buf.console().messages(), vec!["Started async process. PID: 0"]);
        assert!(buf.pending().is_empty());
    }

    #[test]
    fn background_is_reaped_once_after_finishing() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.dispatch_background("wait 1", &mut agent, 0);
        let handle = buf.console().processes[0].0;

        buf.tick(&mut agent, 999);
        assert_eq!(buf.background_count(), 1);
        buf.tick(&mut agent, 1_000);
        assert_eq!(buf.background_count(), 0);
        assert!(buf.console().has_message("Finished async process. PID: 0"));
        buf.tick(&mut agent, 2_000);

        assert_eq!(buf.console().removals_of(handle), 1);
        assert!(buf.console().process_labels().is_empty());
    }

    #[test]
    fn background_does_not_block_queue() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.dispatch_background("wait 10", &mut agent, 0);
        buf.enqueue("say a");
        buf.enqueue("say b");

        buf.tick(&mut agent, 1);
        buf.tick(&mut agent, 2);
        assert_eq!(agent.chats, vec!["a", "b"]);
        assert_eq!(buf.background_count(), 1);
    }

    #[test]
    fn unknown_background_command() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.dispatch_background("teleport 1 2", &mut agent, 0);
        assert_eq!(buf.background_count(), 0);
        assert_eq!(buf.console().messages(), vec!["Unknown command: teleport"]);
    }

    #[test]
    fn async_synchronous_command_never_shows_as_running() {
        let (mut buf, journal) = probed();
        let mut agent = MockAgent::new();
        buf.enqueue(r#"async say "hi there""#);
        buf.enqueue("probe 0");

        buf.tick(&mut agent, 0);
        assert_eq!(agent.chats, vec![r#""hi there""#]);
        assert_eq!(buf.active_command(), None);
        assert_eq!(buf.background_count(), 0);
        assert!(buf.console().process_labels().is_empty());
        assert!(!buf.console().messages().iter().any(|m| m.starts_with("Started")));

        // `async` took pid 0 and `say` pid 1.
        buf.tick(&mut agent, 1);
        assert_eq!(journal_of(&journal), vec!["begin 2"]);
    }

    #[test]
    fn async_from_queue_runs_in_background() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("async wait 5");
        buf.enqueue("say after");

        buf.tick(&mut agent, 0);
        assert_eq!(buf.background_labels().collect::<Vec<_>>(), vec!["PID 1 : wait 5"]);
        buf.tick(&mut agent, 1);
        assert_eq!(agent.chats, vec!["after"]);
    }

    #[test]
    fn nested_async_dispatches_once() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.dispatch_background("async async wait 1", &mut agent, 0);
        assert_eq!(buf.background_labels().collect::<Vec<_>>(), vec!["PID 2 : wait 1"]);
    }

    #[test]
    fn pids_increase_across_foreground_and_background() {
        let (mut buf, journal) = probed();
        let mut agent = MockAgent::new();
        buf.enqueue("probe 5");
        buf.enqueue("probe 0");

        buf.tick(&mut agent, 0);
        buf.dispatch_background("probe 1", &mut agent, 0);
        buf.dispatch_background("async probe 1", &mut agent, 0);
        for step in 1..10 {
            buf.tick(&mut agent, step);
        }

        let begins: Vec<String> = journal_of(&journal)
            .into_iter()
            .filter(|e| e.starts_with("begin"))
            .collect();
        assert_eq!(begins, vec!["begin 0", "begin 1", "begin 3", "begin 4"]);
    }

    // --- kill ---

    #[test]
    fn kill_cancels_background_process() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.dispatch_background("wait 10", &mut agent, 0);
        buf.dispatch_background("kill 0", &mut agent, 0);

        assert!(buf.console().has_message("Cancelled process. PID: 0"));
        assert_eq!(buf.background_count(), 1);
        buf.tick(&mut agent, 1);
        assert_eq!(buf.background_count(), 0);
        assert!(buf.console().has_message("Finished async process. PID: 0"));
    }

    #[test]
    fn async_kill_cancels_foreground() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("wait 10");
        buf.enqueue("async kill 0");
        buf.enqueue("say after");

        buf.tick(&mut agent, 0);
        buf.dispatch_background("kill 0", &mut agent, 1);
        buf.tick(&mut agent, 2);
        assert_eq!(buf.active_command(), None);
        buf.tick(&mut agent, 3); // async kill 0: no such process any more
        buf.tick(&mut agent, 4);
        assert_eq!(agent.chats, vec!["after"]);
        assert!(buf.console().has_message("Cancelled process. PID: 0"));
        assert!(buf.console().has_message("No such process. PID: 0"));
    }

    #[test]
    fn kill_unknown_pid() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.dispatch_background("kill 7", &mut agent, 0);
        assert_eq!(buf.console().messages(), vec!["No such process. PID: 7"]);
    }

    #[test]
    fn kill_goto_clears_goal_and_releases() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.dispatch_background("goto xz 10 10 2", &mut agent, 0);
        buf.dispatch_background("kill 0", &mut agent, 0);
        assert_eq!(agent.goal_changes.last(), Some(&GoalChange::Cleared));

        buf.tick(&mut agent, 1);
        assert_eq!(agent.subscription_count(), 0);
        // A cancelled goto does not report a failure.
        assert!(!buf.console().messages().iter().any(|m| m.starts_with("Goto failed")));
    }

    // --- event-driven completion ---

    #[test]
    fn goto_failure_is_attributed_and_reaped() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.dispatch_background("goto y 70", &mut agent, 0);

        agent.emit(AgentEvent::PathStopped);
        assert_eq!(buf.background_count(), 1);
        buf.tick(&mut agent, 1);

        assert_eq!(buf.background_count(), 0);
        assert_eq!(agent.subscription_count(), 0);
        let messages = buf.console().messages();
        assert_eq!(
            messages[1..].to_vec(),
            vec!["Goto failed. PID: 0 (path stopped)", "Finished async process. PID: 0"]
        );
    }

    #[test]
    fn second_goto_fails_the_first() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.dispatch_background("goto y 70", &mut agent, 0);
        buf.dispatch_background("goto y 10", &mut agent, 0);

        buf.tick(&mut agent, 1);
        assert!(buf.console().has_message("Goto failed. PID: 0 (goal changed)"));
        assert_eq!(buf.background_labels().collect::<Vec<_>>(), vec!["PID 1 : goto y 10"]);
        assert_eq!(agent.subscription_count(), 4);
    }

    // --- shutdown ---

    #[test]
    fn shutdown_cancels_and_releases_everything() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        buf.enqueue("wait 10");
        buf.enqueue("say never");
        buf.tick(&mut agent, 0);
        buf.dispatch_background("goto y 70", &mut agent, 0);
        buf.dispatch_background("wait 10", &mut agent, 0);

        assert_eq!(buf.shutdown(&mut agent, 1), 3);
        assert!(buf.is_idle());
        assert_eq!(agent.subscription_count(), 0);
        assert_eq!(agent.goal(), None);
        assert!(buf.console().process_labels().is_empty());
        assert!(buf.console().has_message("Shutting down. Cancelled 3 running process(es)."));

        buf.tick(&mut agent, 2);
        assert!(agent.chats.is_empty());
    }

    #[test]
    fn shutdown_when_idle() {
        let mut buf = buffer();
        let mut agent = MockAgent::new();
        assert_eq!(buf.shutdown(&mut agent, 0), 0);
        assert!(buf.is_idle());
    }
}
