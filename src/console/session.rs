//! Session lifecycle
//!
//! Construction wires the evaluator's output sinks and fatal channel to the
//! terminal; restart discards the whole session and builds a fresh one —
//! there is no partial teardown.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::ConsoleConfig;
use super::driver::Driver;
use super::format;
use super::gate::ExecGate;
use super::render::{NoopRenderHook, RenderHook};
use crate::evaluator::{Evaluator, FatalError, FatalKind};
use crate::terminal::{EchoOptions, Terminal};

/// One console session: evaluator, terminal, prompt state, and the gate.
///
/// The evaluator is exclusively owned here and mutated only by the driver
/// and the interrupt path; its mutex is never held across an await.
pub struct Session {
    pub(crate) config: ConsoleConfig,
    pub(crate) terminal: Arc<dyn Terminal>,
    pub(crate) evaluator: Mutex<Box<dyn Evaluator>>,
    pub(crate) gate: ExecGate,
    pub(crate) prompt: Mutex<String>,
    pub(crate) render_hook: Arc<dyn RenderHook>,
}

impl Session {
    /// Session configuration.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// The terminal this session writes to.
    pub fn terminal(&self) -> &Arc<dyn Terminal> {
        &self.terminal
    }

    /// The prompt currently in effect.
    pub fn prompt(&self) -> String {
        self.prompt.lock().clone()
    }

    pub(crate) fn set_prompt(&self, prompt: &str) {
        *self.prompt.lock() = prompt.to_string();
        self.terminal.set_prompt(prompt);
    }
}

/// Owner of the current session; supports wholesale restart.
pub struct Console {
    session: Arc<Session>,
}

impl Console {
    /// Start a new session: wire the evaluator's sinks, register the fatal
    /// channel, echo the greeting, and set the primary prompt.
    ///
    /// Must be called from within a tokio runtime (the fatal handler runs
    /// as a background task).
    pub fn start(
        config: ConsoleConfig,
        terminal: Arc<dyn Terminal>,
        evaluator: Box<dyn Evaluator>,
    ) -> Self {
        Self::start_with_hook(config, terminal, evaluator, Arc::new(NoopRenderHook))
    }

    /// Start a new session with a custom render hook.
    pub fn start_with_hook(
        config: ConsoleConfig,
        terminal: Arc<dyn Terminal>,
        evaluator: Box<dyn Evaluator>,
        render_hook: Arc<dyn RenderHook>,
    ) -> Self {
        Self {
            session: start_session(config, terminal, evaluator, render_hook),
        }
    }

    /// Driver handle bound to the current session.
    pub fn driver(&self) -> Driver {
        Driver::new(self.session.clone())
    }

    /// Borrow the live session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Discard the current session wholesale and construct a fresh one with
    /// a new terminal and a new evaluator. Drivers handed out before the
    /// restart keep pointing at the dead session.
    pub fn restart(&mut self, terminal: Arc<dyn Terminal>, evaluator: Box<dyn Evaluator>) {
        tracing::info!("restarting console session");
        let config = self.session.config.clone();
        let render_hook = self.session.render_hook.clone();
        self.session = start_session(config, terminal, evaluator, render_hook);
    }
}

fn start_session(
    config: ConsoleConfig,
    terminal: Arc<dyn Terminal>,
    mut evaluator: Box<dyn Evaluator>,
    render_hook: Arc<dyn RenderHook>,
) -> Arc<Session> {
    let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();
    evaluator.set_fatal_sink(fatal_tx);

    // Interpreter stdout carries its own newlines; stderr text is trimmed
    // like every other reported error.
    let stdout_terminal = terminal.clone();
    evaluator.set_stdout(Arc::new(move |text: &str| {
        stdout_terminal.echo(&format::escape_markup(text), EchoOptions { newline: false });
    }));
    let stderr_terminal = terminal.clone();
    evaluator.set_stderr(Arc::new(move |text: &str| {
        stderr_terminal.error(text.trim_end());
    }));

    let session = Arc::new(Session {
        prompt: Mutex::new(config.ps1.clone()),
        evaluator: Mutex::new(evaluator),
        gate: ExecGate::new(),
        render_hook,
        terminal,
        config,
    });

    if let Some(greeting) = &session.config.greeting {
        session.terminal.echo(greeting, EchoOptions::default());
    }
    session.terminal.set_prompt(&session.config.ps1);

    spawn_fatal_handler(
        session.terminal.clone(),
        session.gate.clone(),
        session.config.clone(),
        fatal_rx,
    );

    session
}

/// Background task reacting to the evaluator's fatal channel. After the
/// report the session is permanently unusable; only a full restart
/// recovers.
fn spawn_fatal_handler(
    terminal: Arc<dyn Terminal>,
    gate: ExecGate,
    config: ConsoleConfig,
    mut fatal_rx: mpsc::UnboundedReceiver<FatalError>,
) {
    tokio::spawn(async move {
        let Some(failure) = fatal_rx.recv().await else {
            return;
        };
        tracing::error!(kind = ?failure.kind, "interpreter reported a fatal error");

        match failure.kind {
            FatalKind::Exit => {
                terminal.error(&failure.to_string());
                terminal.error("The interpreter exited and can no longer be used.");
            }
            FatalKind::Crash => {
                terminal.error(
                    "The interpreter has suffered a fatal error. \
                     Please report this to the maintainers.",
                );
                terminal.error("The cause of the fatal error was:");
                terminal.error(&failure.to_string());
                terminal.error("Check the logs for more details.");
            }
        }

        // Wait out any in-flight command, then pause twice: a resume racing
        // the first pause must not leave input enabled.
        gate.ready().await;
        terminal.pause();
        tokio::time::sleep(config.fatal_pause_delay()).await;
        terminal.pause();
    });
}
