//! Interline CLI - line-oriented console driving the built-in loopback
//! evaluator.
//!
//! Reads one submission per line from stdin; Ctrl-C is routed to the
//! interrupt controller instead of killing the process.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use interline::console::{Console, ConsoleConfig};
use interline::evaluator::loopback::LoopbackEvaluator;
use interline::terminal::StdioTerminal;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "interline")]
#[command(about = "Interactive console for an embedded interpreter", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable the prompt's blinking cursor
    #[arg(long)]
    no_blink: bool,

    /// Suppress the greeting banner
    #[arg(long)]
    quiet: bool,

    /// Script to run (and echo) before entering the interactive loop
    script: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if cli.no_blink {
        config.cursor_blink = false;
    }
    if cli.quiet {
        config.greeting = None;
    }

    let terminal = Arc::new(StdioTerminal::new(config.cursor_blink));
    let console = Console::start(
        config,
        terminal.clone(),
        Box::new(LoopbackEvaluator::new()),
    );
    let driver = console.driver();

    if let Some(script) = &cli.script {
        driver.run_file(script, true).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        terminal.show_prompt();
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => driver.interpret(&line).await?,
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                driver.interrupt();
            }
        }
    }

    Ok(())
}
