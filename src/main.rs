use anyhow::{Context, Result};
use calckit::calculator::{self, copy_to_clipboard, symbols};
use calckit::notify::TracingNotifier;
use calckit::{
    Config, History, HistoryEntry, Notification, Notifier, Storage, convert_unit, format_grouped,
    format_number,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CALCKIT_LOG";

/// Calculator utilities: evaluate expressions, convert units, format numbers
#[derive(Parser, Debug)]
#[command(name = "calckit", version, about)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an arithmetic expression
    Eval {
        #[arg(allow_hyphen_values = true)]
        expression: String,
        /// Fractional digits in the result
        #[arg(short, long)]
        precision: Option<usize>,
        /// Show thousands separators
        #[arg(short, long)]
        grouped: bool,
        /// Copy the result to the clipboard
        #[arg(short, long)]
        copy: bool,
        /// Do not record this calculation in the history
        #[arg(long)]
        no_history: bool,
    },
    /// Convert a value between units of the same category
    Convert {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        from: String,
        to: String,
        #[arg(short, long)]
        precision: Option<usize>,
    },
    /// Format a number the way results are displayed
    Format {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        #[arg(short, long)]
        precision: Option<usize>,
        #[arg(short, long)]
        grouped: bool,
    },
    /// Show or clear the calculation history
    History {
        #[arg(long)]
        clear: bool,
    },
    /// List the constants and functions usable in expressions
    Symbols,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_history(config: &Config) -> Option<History> {
    let path = config.storage_path()?;
    debug!(path = %path.display(), "Using storage file");
    Some(History::new(Storage::new(path), config.history_limit))
}

fn render(value: f64, precision: usize, grouped: bool) -> String {
    if grouped {
        format_grouped(value, precision)
    } else {
        format_number(value, precision)
    }
}

fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().context("Failed to load configuration")?,
    };
    let mut notifier = TracingNotifier;

    match cli.command {
        Command::Eval {
            expression,
            precision,
            grouped,
            copy,
            no_history,
        } => {
            let precision = precision.unwrap_or(config.precision);
            let result = calculator::evaluate(&expression);

            if !no_history
                && let Some(history) = open_history(&config)
                && !history.record(HistoryEntry::from_result(&expression, &result, precision))
            {
                warn!(expression = %expression, "Calculation was not saved to history");
            }

            let Some(value) = result.value() else {
                let notification = Notification::from_result(&result, precision);
                eprintln!("{}", notification.message);
                notifier.notify(config.toast(notification));
                return Ok(ExitCode::FAILURE);
            };

            let text = render(value, precision, grouped || config.grouped);
            println!("{text}");

            if copy {
                match copy_to_clipboard(&format_number(value, precision)) {
                    Ok(()) => {
                        notifier.notify(config.toast(Notification::success("Copied to clipboard")))
                    }
                    Err(e) => notifier.notify(config.toast(Notification::error(e.to_string()))),
                }
            }
        }
        Command::Convert {
            value,
            from,
            to,
            precision,
        } => match convert_unit(value, &from, &to) {
            Ok(converted) => {
                let precision = precision.unwrap_or(config.precision);
                println!("{} {}", render(converted, precision, config.grouped), to);
            }
            Err(e) => {
                eprintln!("{e}");
                notifier.notify(config.toast(Notification::error(e.to_string())));
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Format {
            value,
            precision,
            grouped,
        } => {
            let precision = precision.unwrap_or(config.precision);
            println!("{}", render(value, precision, grouped || config.grouped));
        }
        Command::History { clear } => {
            let Some(history) = open_history(&config) else {
                anyhow::bail!("No data directory available for history");
            };
            if clear {
                if !history.clear() {
                    anyhow::bail!("Failed to clear history");
                }
                notifier.notify(config.toast(Notification::success("History cleared")));
            } else {
                for entry in history.entries() {
                    println!("{} = {}", entry.expression, entry.display);
                }
            }
        }
        Command::Symbols => {
            println!("Constants: {}", symbols::constant_names().join(", "));
            println!("Functions: {}", symbols::function_names().join(", "));
        }
    }

    Ok(ExitCode::SUCCESS)
}
