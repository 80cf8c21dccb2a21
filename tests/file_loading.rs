//! Loading source files as single commands: line-ending normalization, the
//! leading blank line, source echoing, and load failures.

mod support;

use std::io::Write;
use std::sync::Arc;

use interline::console::{Console, ConsoleConfig, ConsoleError};
use interline::evaluator::loopback::LoopbackEvaluator;
use support::RecordingTerminal;
use tempfile::NamedTempFile;

fn quiet_config() -> ConsoleConfig {
    ConsoleConfig {
        greeting: None,
        settle_delay_ms: 0,
        ..ConsoleConfig::default()
    }
}

fn loopback_console() -> (Console, Arc<RecordingTerminal>) {
    let terminal = RecordingTerminal::new();
    let console = Console::start(
        quiet_config(),
        terminal.clone(),
        Box::new(LoopbackEvaluator::new()),
    );
    (console, terminal)
}

fn script(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create script file");
    file.write_all(contents.as_bytes()).expect("write script");
    file
}

#[tokio::test]
async fn test_run_file_normalizes_line_endings() {
    let (console, terminal) = loopback_console();
    let file = script("x = 20\r\nx + 1");

    console
        .driver()
        .run_file(file.path(), false)
        .await
        .expect("run file");

    assert_eq!(terminal.echoes(), vec!["21"]);
}

#[tokio::test]
async fn test_run_file_error_context_counts_the_leading_blank() {
    let (console, terminal) = loopback_console();
    let file = script("a = 1\nraise boom\nb = 2");

    console
        .driver()
        .run_file(file.path(), false)
        .await
        .expect("run file");

    let errors = terminal.errors();
    let report = &errors[0];
    // One blank line is prepended, so file line 2 is physical line 3.
    assert!(report.starts_with("Error occurred at line 3:"));
    assert!(report.contains("3: raise boom    <-- Error here!\n"));
}

#[tokio::test]
async fn test_run_file_echoes_source_with_prompts() {
    let (console, terminal) = loopback_console();
    let file = script("x = 1\nx");

    console
        .driver()
        .run_file(file.path(), true)
        .await
        .expect("run file");

    assert_eq!(
        terminal.echoes(),
        vec![">>> ", ">>> x = 1", ">>> x", "1"]
    );
}

#[tokio::test]
async fn test_run_file_silently_when_echo_disabled() {
    let (console, terminal) = loopback_console();
    let file = script("x = 1\nx");

    console
        .driver()
        .run_file(file.path(), false)
        .await
        .expect("run file");

    assert_eq!(terminal.echoes(), vec!["1"]);
}

#[tokio::test]
async fn test_run_file_missing_path_is_load_error() {
    let (console, _terminal) = loopback_console();

    let err = console
        .driver()
        .run_file("/nonexistent/script.ln", false)
        .await
        .unwrap_err();

    assert!(matches!(err, ConsoleError::Load { .. }));
}
