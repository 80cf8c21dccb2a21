//! Console core: configuration, serializer gate, driver loop, and session
//! lifecycle for the interactive interpreter front end.
//!
//! The entry point is [`Console::start`], which wires an [`Evaluator`] to a
//! [`Terminal`] and hands out [`Driver`] handles. One `Driver::interpret`
//! call processes one submitted command end to end.
//!
//! [`Evaluator`]: crate::evaluator::Evaluator
//! [`Terminal`]: crate::terminal::Terminal

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Submodules
pub mod driver;
pub mod error;
pub mod format;
pub mod gate;
pub mod render;
pub mod sealed;
pub mod session;

pub use driver::Driver;
pub use error::ConsoleError;
pub use session::{Console, Session};

/// Configuration for a console session.
///
/// The presentation fields (prompts, truncation separator, context window)
/// are constants of the original terminal UI; they are configuration here
/// rather than structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Primary prompt.
    pub ps1: String,

    /// Continuation prompt shown while a statement is incomplete.
    pub ps2: String,

    /// Greeting echoed when the session starts.
    pub greeting: Option<String>,

    /// Maximum rendered-representation length before truncation.
    pub repr_limit: usize,

    /// Separator inserted where a long representation is cut.
    pub truncation_separator: String,

    /// Context lines shown on each side of a failing line.
    pub context_lines: usize,

    /// Delay after releasing the gate, letting the UI settle (milliseconds).
    pub settle_delay_ms: u64,

    /// Delay between the fatal handler's two pause calls (milliseconds).
    pub fatal_pause_delay_ms: u64,

    /// Substring of a line that triggers the render hook around evaluation.
    pub render_trigger: Option<String>,

    /// Whether the prompt cursor blinks.
    pub cursor_blink: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            ps1: ">>> ".to_string(),
            ps2: "... ".to_string(),
            greeting: Some("Welcome to the interline terminal".to_string()),
            repr_limit: 1000,
            truncation_separator: "\n<long output truncated>\n".to_string(),
            context_lines: 3,
            settle_delay_ms: 10,
            fatal_pause_delay_ms: 15,
            render_trigger: Some("plt.show()".to_string()),
            cursor_blink: true,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConsoleError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConsoleError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text)
            .map_err(|err| ConsoleError::Config(format!("{}: {err}", path.display())))
    }

    pub(crate) fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub(crate) fn fatal_pause_delay(&self) -> Duration {
        Duration::from_millis(self.fatal_pause_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_presentation_constants() {
        let config = ConsoleConfig::default();
        assert_eq!(config.ps1, ">>> ");
        assert_eq!(config.ps2, "... ");
        assert_eq!(config.context_lines, 3);
        assert_eq!(config.truncation_separator, "\n<long output truncated>\n");
    }

    #[test]
    fn test_load_from_json() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        let json = serde_json::to_string(&ConsoleConfig {
            ps1: "py> ".to_string(),
            cursor_blink: false,
            ..ConsoleConfig::default()
        })
        .expect("serialize config");
        file.write_all(json.as_bytes()).expect("write temp config");

        let config = ConsoleConfig::load(file.path()).expect("load config");
        assert_eq!(config.ps1, "py> ");
        assert!(!config.cursor_blink);
    }

    #[test]
    fn test_load_missing_file_is_load_error() {
        let err = ConsoleConfig::load("/nonexistent/interline.json").unwrap_err();
        assert!(matches!(err, ConsoleError::Load { .. }));
    }
}
