//! Kidra core — a line-command scheduler for a game agent.
//!
//! Operator lines are tokenized into commands, looked up in a handler
//! registry, and run either one at a time through a FIFO foreground queue or
//! immediately in the background. Long-running commands are executions the
//! scheduler polls once per tick; nothing here blocks or spawns threads.
//!
//! # Modules
//!
//! - [`agent`] — Agent runtime trait, event bus, navigation goals, mock and simulated agents
//! - [`command`] — Tokenizer and parsed command
//! - [`commands`] — Built-in command handlers and their executions
//! - [`console`] — Display capability the scheduler reports to
//! - [`error`] — Settings and argument errors
//! - [`execution`] — Execution contract and the handler context
//! - [`handler`] — Handler trait and registry
//! - [`scheduler`] — The command buffer
//! - [`session`] — Agent plus buffer, stepped by the host clock
//! - [`settings`] — YAML configuration

pub mod agent;
pub mod command;
pub mod commands;
pub mod console;
pub mod error;
pub mod execution;
pub mod handler;
pub mod scheduler;
pub mod session;
pub mod settings;
