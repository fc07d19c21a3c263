use aircalc::keypad::build_layout;
use aircalc::{AirCalculator, Config, InputEvent, evaluate};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Gesture keypad calculator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an arithmetic expression
    Eval {
        /// Expression such as "2+3*4"
        expression: String,
    },
    /// Print the keypad layout for a display size as JSON
    Layout {
        #[arg(long, default_value_t = 640)]
        width: u32,
        #[arg(long, default_value_t = 480)]
        height: u32,
    },
    /// Replay recorded input events (JSON lines) and print one overlay per event
    Replay {
        /// Event file, or "-" for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,

        /// Print the status lines instead of JSON
        #[arg(long)]
        text: bool,
    },
}

fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Eval { expression } => match evaluate(&expression) {
            Ok(value) => {
                println!("{}", value);
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Layout { width, height } => {
            let layout = build_layout(width, height, &config.layout);
            println!("{}", serde_json::to_string_pretty(&layout)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Replay { input, text } => {
            replay(&config, &input, text)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so stdout stays machine readable.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn replay(config: &Config, input: &Path, text: bool) -> Result<()> {
    let reader: Box<dyn BufRead> = if input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(input)
            .with_context(|| format!("Failed to open event file: {}", input.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut calc = AirCalculator::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read event")?;
        if line.trim().is_empty() {
            continue;
        }

        let event: InputEvent = serde_json::from_str(&line)
            .with_context(|| format!("Invalid event on line {}", index + 1))?;
        let overlay = calc.handle(&event);

        if text {
            writeln!(
                out,
                "{} | {}",
                overlay.expression_line(),
                overlay.result_line()
            )?;
        } else {
            serde_json::to_writer(&mut out, &overlay)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
