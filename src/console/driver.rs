//! The interpreter driver
//!
//! `Driver::interpret` is the line-submission callback bound to the
//! terminal. One call processes one command: acquire the gate, split the
//! command into physical lines, classify each line, await completed
//! statements through the single-unwrap adapter, and render results and
//! failures. A syntax error is reported and the remaining lines still run;
//! an interpreter-level failure aborts the rest of the command; anything
//! else propagates out as [`ConsoleError::Internal`].

use std::path::Path;
use std::sync::Arc;

use super::error::ConsoleError;
use super::format;
use super::sealed::Sealed;
use super::session::Session;
use crate::evaluator::{EvalFailure, PendingResult, Value, Verdict};
use crate::terminal::EchoOptions;

/// Handle driving one console session.
#[derive(Clone)]
pub struct Driver {
    session: Arc<Session>,
}

/// Per-command processing options.
#[derive(Debug, Clone, Copy, Default)]
struct CommandOptions {
    /// Echo each physical line, prefixed with the prompt in effect, before
    /// pushing it to the evaluator.
    echo_source: bool,
}

impl Driver {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Process one submitted command.
    pub async fn interpret(&self, command: &str) -> Result<(), ConsoleError> {
        self.run(command, CommandOptions::default()).await
    }

    /// Fetch a source file and submit its contents as a single command.
    ///
    /// Line endings are normalized to `\n` and one blank line is prepended,
    /// keeping downstream error-context line numbers in step with the
    /// file's own numbering.
    pub async fn run_file(
        &self,
        path: impl AsRef<Path>,
        echo_source: bool,
    ) -> Result<(), ConsoleError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConsoleError::Load {
                path: path.to_path_buf(),
                source,
            })?;
        self.run_source(&text, echo_source).await
    }

    /// Submit a block of source text as a single command.
    pub async fn run_source(&self, source: &str, echo_source: bool) -> Result<(), ConsoleError> {
        let mut text = source.replace("\r\n", "\n");
        text.insert(0, '\n');
        self.run(&text, CommandOptions { echo_source }).await
    }

    /// Cancel signal: discard buffered continuation input and reset the
    /// prompt.
    ///
    /// Deliberately ignores the gate so it stays responsive while a command
    /// is mid-flight; the evaluator's buffer only holds state between
    /// physical-line pushes, never during an in-progress await.
    pub fn interrupt(&self) {
        let session = &self.session;
        session.evaluator.lock().clear_buffer();
        session.terminal.enter();
        session
            .terminal
            .echo("KeyboardInterrupt", EchoOptions::default());
        session.terminal.set_command("");
        session.set_prompt(&session.config.ps1);
    }

    /// Tab-key behaviour: a literal tab when the text before the cursor is
    /// blank, candidate completions otherwise.
    pub fn complete_tab(&self) -> Option<Vec<String>> {
        let before = self.session.terminal.before_cursor();
        if before.trim().is_empty() {
            self.session.terminal.insert("\t");
            return None;
        }
        Some(self.session.evaluator.lock().complete(&before))
    }

    async fn run(&self, command: &str, options: CommandOptions) -> Result<(), ConsoleError> {
        let guard = self.session.gate.acquire().await;
        self.session.terminal.pause();

        let outcome = self.process(command, options).await;

        self.session.terminal.resume();
        tokio::time::sleep(self.session.config.settle_delay()).await;
        drop(guard);
        outcome
    }

    async fn process(&self, command: &str, options: CommandOptions) -> Result<(), ConsoleError> {
        let session = &self.session;
        let lines: Vec<&str> = command.split('\n').collect();
        let multiline = lines.len() > 1;
        tracing::debug!(lines = lines.len(), "processing command");

        for (index, raw) in lines.iter().enumerate() {
            let number = index + 1;
            // Pasted text smuggles in non-breaking spaces.
            let line = raw.replace('\u{a0}', " ");
            if options.echo_source {
                let prompt = session.prompt();
                session
                    .terminal
                    .echo(&format!("{prompt}{line}"), EchoOptions::default());
            }

            let verdict = session.evaluator.lock().push(&line);
            match verdict {
                Verdict::SyntaxError(diagnostic) => {
                    session.set_prompt(&session.config.ps1);
                    session.terminal.error(diagnostic.trim_end());
                }
                Verdict::Incomplete => {
                    session.set_prompt(&session.config.ps2);
                }
                Verdict::Complete(pending) => {
                    session.set_prompt(&session.config.ps1);
                    if !self.evaluate(pending, &line, &lines, number, multiline).await? {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Await one completed statement and render its outcome.
    ///
    /// Returns `false` when an interpreter-level failure aborts the rest of
    /// the command.
    async fn evaluate(
        &self,
        pending: PendingResult,
        line: &str,
        lines: &[&str],
        number: usize,
        multiline: bool,
    ) -> Result<bool, ConsoleError> {
        let session = &self.session;
        let config = &session.config;

        let triggered = config
            .render_trigger
            .as_deref()
            .is_some_and(|trigger| line.contains(trigger));
        if triggered {
            session.render_hook.before_eval();
        }

        // The one and only unwrap of the evaluation's asynchronicity.
        let (outcome, mut guard) = Sealed::new(pending).open().await;

        if triggered {
            session.render_hook.after_eval();
        }

        let proceed = match outcome {
            Ok(value) => {
                self.render(value);
                Ok(true)
            }
            Err(EvalFailure::Interpreter { diagnostic }) => {
                let mut message = String::new();
                if multiline {
                    message.push_str(&format::context_report(lines, number, config.context_lines));
                }
                message.push_str(diagnostic.trim_end());
                session.terminal.error(&message);
                Ok(false)
            }
            Err(EvalFailure::Internal(cause)) => Err(ConsoleError::Internal(cause)),
        };

        guard.release();
        proceed
    }

    fn render(&self, value: Value) {
        let session = &self.session;
        let config = &session.config;
        match value {
            Value::None => {}
            Value::Plain(repr) => {
                let short =
                    format::shorten_repr(&repr, config.repr_limit, &config.truncation_separator);
                session
                    .terminal
                    .echo(&format::escape_markup(&short), EchoOptions::default());
            }
            Value::Foreign(foreign) => {
                let short = format::shorten_repr(
                    foreign.repr(),
                    config.repr_limit,
                    &config.truncation_separator,
                );
                session
                    .terminal
                    .echo(&format::escape_markup(&short), EchoOptions::default());
                foreign.release();
            }
        }
    }
}
