//! Interline – an interactive console front end for an embedded
//! asynchronous interpreter
//!
//! This crate implements the driver that sits between a line-oriented
//! terminal widget and a push-based interpreter session:
//! - Multi-line commands split into physical lines and classified
//!   incrementally (syntax error / incomplete / complete)
//! - Serialized command execution behind a FIFO gate, with cancellable,
//!   resumable prompt state
//! - Asynchronous result awaiting through an explicit single-unwrap adapter
//! - Length-bounded output rendering and windowed, line-numbered context
//!   reports for failures inside multi-line pastes
//!
//! The terminal widget and the interpreter itself are capability traits;
//! see [`terminal::Terminal`] and [`evaluator::Evaluator`].

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Console core modules implementing the interpreter driver
pub mod console;

/// Evaluator capability boundary: verdicts, values, pending results
pub mod evaluator;

/// Terminal capability boundary
pub mod terminal;

// Re-export key types for convenience
pub use console::{Console, ConsoleConfig, Driver};

/// Current version of the interline crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
