//! Shared test doubles for the integration suite.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use interline::evaluator::{
    EvalOutcome, Evaluator, FatalSink, OutputSink, PendingResult, ReleaseGuard, Verdict,
};
use interline::terminal::{EchoOptions, Terminal};
use parking_lot::Mutex;

/// Terminal interaction recorded by [`RecordingTerminal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Echo(String, bool),
    Error(String),
    Pause,
    Resume,
    Prompt(String),
    Insert(String),
    SetCommand(String),
    Enter,
}

/// Terminal that records every call for later assertions.
#[derive(Default)]
pub struct RecordingTerminal {
    events: Mutex<Vec<Event>>,
    before_cursor: Mutex<String>,
}

impl RecordingTerminal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn echoes(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Echo(text, _) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Error(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn pause_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, Event::Pause))
            .count()
    }

    pub fn set_before_cursor(&self, text: &str) {
        *self.before_cursor.lock() = text.to_string();
    }

    fn record(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl Terminal for RecordingTerminal {
    fn echo(&self, text: &str, opts: EchoOptions) {
        self.record(Event::Echo(text.to_string(), opts.newline));
    }

    fn error(&self, text: &str) {
        self.record(Event::Error(text.to_string()));
    }

    fn pause(&self) {
        self.record(Event::Pause);
    }

    fn resume(&self) {
        self.record(Event::Resume);
    }

    fn set_prompt(&self, prompt: &str) {
        self.record(Event::Prompt(prompt.to_string()));
    }

    fn insert(&self, text: &str) {
        self.record(Event::Insert(text.to_string()));
    }

    fn before_cursor(&self) -> String {
        self.before_cursor.lock().clone()
    }

    fn set_command(&self, text: &str) {
        self.record(Event::SetCommand(text.to_string()));
    }

    fn enter(&self) {
        self.record(Event::Enter);
    }
}

/// Evaluator driven by a queue of pre-programmed verdicts. Once the queue
/// runs dry, every push completes with no result.
pub struct ScriptedEvaluator {
    verdicts: VecDeque<Verdict>,
    pushes: Arc<Mutex<Vec<String>>>,
    cleared: Arc<AtomicUsize>,
}

impl ScriptedEvaluator {
    pub fn new(verdicts: Vec<Verdict>) -> Self {
        Self {
            verdicts: verdicts.into(),
            pushes: Arc::new(Mutex::new(Vec::new())),
            cleared: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared log of every pushed line, in order.
    pub fn pushes(&self) -> Arc<Mutex<Vec<String>>> {
        self.pushes.clone()
    }

    /// Shared count of buffer-clear calls.
    pub fn cleared(&self) -> Arc<AtomicUsize> {
        self.cleared.clone()
    }
}

impl Evaluator for ScriptedEvaluator {
    fn push(&mut self, line: &str) -> Verdict {
        self.pushes.lock().push(line.to_string());
        self.verdicts
            .pop_front()
            .unwrap_or_else(|| Verdict::Complete(PendingResult::ready(Ok(interline::evaluator::Value::None))))
    }

    fn complete(&self, _partial: &str) -> Vec<String> {
        Vec::new()
    }

    fn clear_buffer(&mut self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }

    fn set_stdout(&mut self, _sink: OutputSink) {}

    fn set_stderr(&mut self, _sink: OutputSink) {}

    fn set_fatal_sink(&mut self, _sink: FatalSink) {}
}

/// Complete verdict whose release guard bumps `releases` when it fires.
pub fn counted(outcome: EvalOutcome, releases: &Arc<AtomicUsize>) -> Verdict {
    let releases = releases.clone();
    Verdict::Complete(PendingResult::new(
        Box::pin(async move { outcome }),
        ReleaseGuard::new(move || {
            releases.fetch_add(1, Ordering::SeqCst);
        }),
    ))
}

/// Complete verdict that resolves after a delay.
pub fn slow(outcome: EvalOutcome, delay_ms: u64) -> Verdict {
    Verdict::Complete(PendingResult::new(
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            outcome
        }),
        ReleaseGuard::noop(),
    ))
}
