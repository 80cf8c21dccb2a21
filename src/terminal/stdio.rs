//! Minimal stdio-backed terminal
//!
//! Just enough widget for the CLI binary: echoes to stdout, errors to
//! stderr, and keeps the prompt and a single input line in memory so the
//! interrupt and completion paths have something to operate on. A real
//! deployment would wire the driver to an actual terminal widget instead.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{EchoOptions, Terminal};

/// Terminal implementation over process stdout/stderr.
pub struct StdioTerminal {
    paused: AtomicBool,
    prompt: Mutex<String>,
    command: Mutex<String>,
    cursor_blink: bool,
}

impl StdioTerminal {
    /// Create a terminal; `cursor_blink` mirrors the widget's blinking
    /// cursor flag (purely cosmetic, unused for plain stdio).
    pub fn new(cursor_blink: bool) -> Self {
        Self {
            paused: AtomicBool::new(false),
            prompt: Mutex::new(String::new()),
            command: Mutex::new(String::new()),
            cursor_blink,
        }
    }

    /// Whether input is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Whether the cursor should blink.
    pub fn cursor_blink(&self) -> bool {
        self.cursor_blink
    }

    /// Print the current prompt without a trailing newline.
    pub fn show_prompt(&self) {
        print!("{}", self.prompt.lock());
        let _ = io::stdout().flush();
    }
}

impl Terminal for StdioTerminal {
    fn echo(&self, text: &str, opts: EchoOptions) {
        if opts.newline {
            println!("{text}");
        } else {
            print!("{text}");
            let _ = io::stdout().flush();
        }
    }

    fn error(&self, text: &str) {
        eprintln!("{text}");
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    fn set_prompt(&self, prompt: &str) {
        *self.prompt.lock() = prompt.to_string();
    }

    fn insert(&self, text: &str) {
        self.command.lock().push_str(text);
    }

    fn before_cursor(&self) -> String {
        self.command.lock().clone()
    }

    fn set_command(&self, text: &str) {
        *self.command.lock() = text.to_string();
    }

    fn enter(&self) {
        println!();
    }
}
