mod commands;
mod eval;
mod palette;

use std::env;

use rustyline::{DefaultEditor, error::ReadlineError};
use sqlscalar::Config;
use tracing_subscriber::EnvFilter;

use commands::handle_command;
use palette::{GREEN, OVERLAY, RED, RESET};

const PROMPT: &str = "scalar > ";
const HISTORY: &str = "history.scalar";

/// Logs go to stderr, filtered by `RUST_LOG` (`warn` when unset).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .init();
}

fn main() -> rustyline::Result<()> {
    init_tracing();

    let config = match env::args().nth(1) {
        Some(path) => match Config::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{RED}{path}: {err}{RESET}");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let mut rsl = DefaultEditor::new()?;
    if rsl.load_history(HISTORY).is_err() {
        println!("No previous history")
    };

    println!("scalar-shell | SQL values, one line at a time.");
    println!("Type /help for guidance, /quit to leave.");

    loop {
        let line = match rsl.readline(PROMPT) {
            Ok(line) => line,
            Err(err) => {
                match err {
                    ReadlineError::Interrupted => println!("CTRL-C"),
                    ReadlineError::Eof => println!("CTRL-D"),
                    other => println!("Error: {other:#?}"),
                }

                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rsl.add_history_entry(line)?;

        if line.starts_with('/') {
            if handle_command(line, &config) {
                break;
            }
            continue;
        }

        match eval::evaluate(line, &config) {
            Ok(eval::Outcome::Text(text)) => println!("{OVERLAY}{text}{RESET}"),
            Ok(outcome) => println!("{GREEN}{outcome}{RESET}"),
            Err(err) => println!("{RED}Error: {err}{RESET}"),
        }
    }

    rsl.save_history(HISTORY)?;
    Ok(())
}
