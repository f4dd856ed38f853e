mod debug_report;

use scorekeeper::{Context, Options, replay_verbose_with};
use std::io::{self, IsTerminal, Read};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SCOREKEEPER_LOG";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    init_logging();

    let ctx = Context::default();
    let res = replay_verbose_with(&config.input, &ctx, &config.options);

    if config.json {
        match serde_json::to_string_pretty(&res) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("error: failed to encode result: {err}");
                std::process::exit(1);
            }
        }
    } else {
        debug_report::print_run(config.source.as_deref().unwrap_or("<stdin>"), &res, config.color);
    }

    if !res.failures.is_empty() {
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

struct CliConfig {
    input: String,
    /// File path, `None` for stdin.
    source: Option<String>,
    options: Options,
    json: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut source: Option<Option<String>> = None;
    let mut options = Options::default();
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("scorekeeper {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--relaxed-order" => options.enforce_batting_order = false,
            "--checkpoint-subs" => options.checkpoint_substitutions = true,
            "--stop-on-error" => options.stop_on_error = true,
            "--game" | "-g" => {
                let value = args.next().ok_or_else(|| "error: --game expects a value".to_string())?;
                options.only_game = Some(value);
            }
            "-" => set_source(&mut source, None)?,
            _ if arg.starts_with("--game=") => {
                options.only_game = Some(arg.trim_start_matches("--game=").to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => set_source(&mut source, Some(arg))?,
        }
    }

    let path = source.flatten();
    let input = match path.as_deref() {
        Some(path) => std::fs::read_to_string(path).map_err(|err| format!("error: failed to read {path}: {err}"))?,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, source: path, options, json, color })
}

/// `Some(None)` records an explicit `-` for stdin.
fn set_source(source: &mut Option<Option<String>>, value: Option<String>) -> Result<(), String> {
    if source.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *source = Some(value);
    Ok(())
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "scorekeeper {version}

Replays play-by-play event files and reports game state and scoring credits.

Usage:
  scorekeeper [OPTIONS] [FILE]

  Reads FILE, or stdin when FILE is omitted or `-`.

Options:
  -g, --game <id>            Replay only the game with this id.
  --json                     Print the full result as JSON.
  --relaxed-order            Accept batters out of order, recording a mismatch.
  --checkpoint-subs          Also snapshot the state after each substitution.
  --stop-on-error            Stop at the first failed game.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}            Log filter, e.g. `scorekeeper=debug`. Default: warn.

Exit codes:
  0  Every game replayed.
  1  At least one game failed.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV,
    )
}
