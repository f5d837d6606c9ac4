//! Kidra terminal UI.
//!
//! A ratatui front end for a [`kidra_core::session::Session`]: the queue and
//! background processes in two list boxes, the scheduler's log below them,
//! and a command input line at the bottom.
//!
//! # Modules
//!
//! - [`console`] — `Console` implementation backing the log and process boxes
//! - [`input`] — Command line editing and history
//! - [`theme`] — Styles per log line kind
//! - [`tui`] — Terminal setup, key handling, clocked main loop
//! - [`view`] — Layout and rendering

pub mod console;
pub mod input;
pub mod theme;
pub mod tui;
pub mod view;
