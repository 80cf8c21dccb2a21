//! Terminal capability boundary
//!
//! The driver never talks to a concrete widget: it is handed something that
//! implements [`Terminal`]. Rendering, input editing, and history are the
//! widget's problem; the driver only echoes text, reports errors, gates
//! input with pause/resume, and keeps the prompt in step with the parser
//! state. The driver itself is bound to the widget as its line-submission
//! callback, and [`Driver::complete_tab`](crate::console::Driver::complete_tab)
//! as its tab-completion callback.

pub mod stdio;

pub use stdio::StdioTerminal;

/// Options controlling how echoed text is written.
#[derive(Debug, Clone, Copy)]
pub struct EchoOptions {
    /// Terminate the echoed text with a newline.
    pub newline: bool,
}

impl Default for EchoOptions {
    fn default() -> Self {
        Self { newline: true }
    }
}

/// A line-oriented terminal widget, as seen by the driver.
///
/// `pause` is not reference-counted and may be called repeatedly;
/// implementations must treat it as idempotent.
pub trait Terminal: Send + Sync {
    /// Write text to the output pane.
    fn echo(&self, text: &str, opts: EchoOptions);

    /// Write text to the dedicated, visually distinguished error sink.
    fn error(&self, text: &str);

    /// Stop accepting input submissions.
    fn pause(&self);

    /// Accept input submissions again.
    fn resume(&self);

    /// Replace the prompt shown before the input line.
    fn set_prompt(&self, prompt: &str);

    /// Insert text at the cursor.
    fn insert(&self, text: &str);

    /// The input line content before the cursor.
    fn before_cursor(&self) -> String;

    /// Replace the current input line wholesale.
    fn set_command(&self, text: &str);

    /// Force a newline, as if the user pressed enter.
    fn enter(&self);
}
