//! Evaluator capability boundary
//!
//! The embedded interpreter is opaque to the driver: it is anything that
//! implements [`Evaluator`]. One pushed line yields a [`Verdict`]; a
//! completed statement yields a [`PendingResult`], which is exactly one
//! layer of asynchronicity around a [`Value`] and owns one interpreter-side
//! resource that must be released exactly once.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

pub mod loopback;

/// Sink receiving interpreter stdout/stderr text.
pub type OutputSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Sender half of the out-of-band fatal-error channel.
pub type FatalSink = UnboundedSender<FatalError>;

/// Outcome of awaiting one evaluation.
pub type EvalOutcome = Result<Value, EvalFailure>;

/// A stateful, push-based interpreter session.
///
/// Implementations own the multi-line statement buffer: the driver pushes
/// physical lines one at a time and branches purely on the returned
/// [`Verdict`].
pub trait Evaluator: Send {
    /// Push one physical line into the parser and classify the result.
    fn push(&mut self, line: &str) -> Verdict;

    /// Ordered candidate completions for the text before the cursor.
    fn complete(&self, partial: &str) -> Vec<String>;

    /// Discard any buffered continuation lines.
    fn clear_buffer(&mut self);

    /// Route interpreter stdout to the given sink.
    fn set_stdout(&mut self, sink: OutputSink);

    /// Route interpreter stderr to the given sink.
    fn set_stderr(&mut self, sink: OutputSink);

    /// Register the out-of-band channel for fatal, session-ending failures.
    fn set_fatal_sink(&mut self, sink: FatalSink);
}

/// Classification of one pushed source line.
#[derive(Debug)]
pub enum Verdict {
    /// The line could not be parsed; carries the formatted diagnostic.
    SyntaxError(String),
    /// More input is required to finish the current statement.
    Incomplete,
    /// The line completed a statement; evaluation is underway.
    Complete(PendingResult),
}

/// A value surfaced across the interpreter boundary.
#[derive(Debug)]
pub enum Value {
    /// The interpreter's no-result marker; produces no output line.
    None,
    /// A plain value carrying its interpreter-rendered representation.
    Plain(String),
    /// A foreign-owned value that must be released after rendering.
    Foreign(ForeignValue),
}

/// A foreign-owned value: its representation plus the release hook for the
/// interpreter-side resource backing it.
pub struct ForeignValue {
    repr: String,
    guard: ReleaseGuard,
}

impl ForeignValue {
    /// Wrap a rendered representation together with its release hook.
    pub fn new(repr: impl Into<String>, guard: ReleaseGuard) -> Self {
        Self {
            repr: repr.into(),
            guard,
        }
    }

    /// The interpreter-rendered representation.
    pub fn repr(&self) -> &str {
        &self.repr
    }

    /// Release the backing resource now. Dropping releases it as well.
    pub fn release(mut self) {
        self.guard.release();
    }
}

impl fmt::Debug for ForeignValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignValue")
            .field("repr", &self.repr)
            .finish_non_exhaustive()
    }
}

/// Failure surfaced by one evaluation.
///
/// The classification is structural: the interpreter's own error protocol is
/// a distinct variant, never inferred from a type name or message text.
#[derive(Debug, Error)]
pub enum EvalFailure {
    /// The interpreter's error protocol fired: the evaluated code failed.
    #[error("{diagnostic}")]
    Interpreter {
        /// Formatted diagnostic produced by the interpreter.
        diagnostic: String,
    },

    /// Anything else: a bug in the driver or one of its collaborators.
    /// Deliberately not recovered; the driver rethrows it.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Fatal, session-ending failure delivered out of band.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FatalError {
    /// Broad classification of the failure.
    pub kind: FatalKind,
    /// Human-readable description.
    pub message: String,
}

/// Classification of a fatal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalKind {
    /// The interpreter deliberately exited.
    Exit,
    /// The interpreter crashed.
    Crash,
}

/// Release hook guarding one interpreter-side resource.
///
/// The hook fires exactly once: either through an explicit [`release`]
/// call or at drop, whichever comes first.
///
/// [`release`]: ReleaseGuard::release
pub struct ReleaseGuard {
    hook: Option<Box<dyn FnOnce() + Send>>,
}

impl ReleaseGuard {
    /// Guard a resource with the given release hook.
    pub fn new(hook: impl FnOnce() + Send + 'static) -> Self {
        Self {
            hook: Some(Box::new(hook)),
        }
    }

    /// Guard for a handle with no backing resource.
    pub fn noop() -> Self {
        Self { hook: None }
    }

    /// Release the resource now instead of at drop. Idempotent.
    pub fn release(&mut self) {
        if let Some(hook) = self.hook.take() {
            hook();
        }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ReleaseGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseGuard")
            .field("armed", &self.hook.is_some())
            .finish()
    }
}

/// Exactly one layer of asynchronicity around an interpreter value.
///
/// Awaiting the handle resolves the outer layer only; whatever the resolved
/// [`Value`] contains is never awaited transitively. The driver performs the
/// await through [`Sealed`](crate::console::sealed::Sealed), which also
/// surrenders the release guard to the caller.
pub struct PendingResult {
    pub(crate) future: BoxFuture<'static, EvalOutcome>,
    pub(crate) guard: ReleaseGuard,
}

impl PendingResult {
    /// Wrap an in-flight evaluation and the guard for its resource.
    pub fn new(future: BoxFuture<'static, EvalOutcome>, guard: ReleaseGuard) -> Self {
        Self { future, guard }
    }

    /// Handle whose outcome is already available.
    pub fn ready(outcome: EvalOutcome) -> Self {
        Self::new(Box::pin(async move { outcome }), ReleaseGuard::noop())
    }
}

impl fmt::Debug for PendingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResult")
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}
