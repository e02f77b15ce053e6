//! helperbin - run helper programs shipped next to the invoking tool

mod bootstrap;
mod settings;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::{info, warn};

use helperbin_core::port::time_provider::SystemTimeProvider;
use helperbin_core::{InvocationOutcome, InvokeOptions, LaunchError};
use helperbin_infra_system::TokioProcessRunner;

use crate::bootstrap::Bootstrap;
use crate::settings::HelperbinConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code reported when the child left no code (killed by a signal)
const SIGNALED_EXIT_CODE: u8 = 1;

/// Exit code after Ctrl+C, following the shell convention (128 + SIGINT)
const INTERRUPTED_EXIT_CODE: u8 = 130;

#[derive(Parser)]
#[command(name = "helperbin")]
#[command(about = "Run helper programs from a fixed bin directory", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Helper directory (overrides config and install layout)
    #[arg(long, global = true, env = "HELPERBIN_BIN_DIR")]
    bin_dir: Option<PathBuf>,

    /// Extra config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (when RUST_LOG is unset)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered helpers
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved path of a helper
    Path {
        /// Helper name
        name: String,

        /// Resolve against the shared project's bin directory
        #[arg(long)]
        shared: bool,
    },

    /// Run a helper, forwarding arguments verbatim
    Run {
        /// Helper name
        name: String,

        /// Resolve against the shared project's bin directory
        #[arg(long)]
        shared: bool,

        /// Capture output instead of inheriting the terminal
        #[arg(long)]
        capture: bool,

        /// Return the exit status instead of failing on non-zero
        #[arg(long)]
        no_check: bool,

        /// Working directory for the helper
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Extra environment variable (KEY=VALUE), repeatable
        #[arg(long = "env", value_parser = parse_key_val)]
        env: Vec<(String, String)>,

        /// Terminate the helper after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Print the outcome as JSON (implies --capture and --no-check)
        #[arg(long)]
        json: bool,

        /// Arguments passed to the helper
        #[arg(last = true)]
        args: Vec<String>,
    },
}

#[derive(Serialize, Tabled)]
struct HelperRow {
    name: String,
    path: String,
    present: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' in '{s}'"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn exit_byte(code: Option<i32>) -> u8 {
    match code {
        Some(code) => (code & 0xff) as u8,
        None => SIGNALED_EXIT_CODE,
    }
}

fn exit_code(code: Option<i32>) -> ExitCode {
    ExitCode::from(exit_byte(code))
}

/// Option set for `run`; `--json` reports failures as an outcome, not an error
fn run_options(
    capture: bool,
    no_check: bool,
    json: bool,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
    timeout_secs: Option<u64>,
) -> InvokeOptions {
    let mut options = InvokeOptions::new();
    if capture || json {
        options = options.capture();
    }
    if no_check || json {
        options = options.unchecked();
    }
    if let Some(dir) = cwd {
        options = options.cwd(dir);
    }
    for (key, value) in env {
        options = options.env(key, value);
    }
    if let Some(secs) = timeout_secs {
        options = options.timeout(Duration::from_secs(secs));
    }
    options
}

fn print_outcome(outcome: &InvocationOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    if let Some(stdout) = &outcome.stdout {
        print!("{stdout}");
    }
    if let Some(stderr) = &outcome.stderr {
        eprint!("{stderr}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1. Initialize logging
    logging::init(logging::LogFormat::from_env(), cli.verbose)?;
    info!("helperbin v{} starting...", VERSION);

    // 2. Load configuration
    let config = HelperbinConfig::load(cli.config.as_deref())?;

    // 3. Bootstrap layout + registry (once, read-only afterwards)
    let boot = Bootstrap::init(&config, cli.bin_dir.as_deref())?;

    match cli.command {
        Commands::List { json } => {
            let rows: Vec<HelperRow> = boot
                .registry
                .iter()
                .map(|(name, helper)| {
                    let path = helper.resolve();
                    HelperRow {
                        name: name.to_string(),
                        present: path.is_file(),
                        path: path.display().to_string(),
                    }
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!(
                    "{} {}",
                    "Helpers in".cyan().bold(),
                    boot.helper_dir.display()
                );
                println!();
                println!("{}", Table::new(rows));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Path { name, shared } => {
            let helper = boot.helper(&name, shared)?;
            println!("{}", helper.resolve().display());
            Ok(ExitCode::SUCCESS)
        }

        Commands::Run {
            name,
            shared,
            capture,
            no_check,
            cwd,
            env,
            timeout_secs,
            json,
            args,
        } => {
            let helper = boot.helper(&name, shared)?;

            let options = run_options(capture, no_check, json, cwd, env, timeout_secs);

            let runner = TokioProcessRunner::new(Arc::new(SystemTimeProvider));

            // Dropping the invocation on Ctrl+C kills the child (kill_on_drop)
            let result = tokio::select! {
                result = helper.invoke(&runner, args, &options) => result,
                _ = tokio::signal::ctrl_c() => {
                    warn!(helper = %name, "Interrupted, terminating helper");
                    return Ok(ExitCode::from(INTERRUPTED_EXIT_CODE));
                }
            };

            match result {
                Ok(outcome) => {
                    print_outcome(&outcome, json)?;
                    Ok(exit_code(outcome.exit_code))
                }
                Err(err @ LaunchError::NonZeroExit { .. }) => {
                    if let LaunchError::NonZeroExit { stdout, stderr, .. } = &err {
                        if let Some(stdout) = stdout {
                            print!("{stdout}");
                        }
                        if let Some(stderr) = stderr {
                            eprint!("{stderr}");
                        }
                    }
                    eprintln!("{} {}", "✗".red(), err);
                    Ok(exit_code(err.exit_code()))
                }
                Err(err) => Err(err).with_context(|| format!("Failed to run helper '{name}'")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use helperbin_core::OutputMode;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args_after_double_dash() {
        let cli = Cli::try_parse_from([
            "helperbin", "run", "fonts", "--capture", "--env", "A=1", "--", "--name", "a b",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                name,
                capture,
                env,
                args,
                ..
            } => {
                assert_eq!(name, "fonts");
                assert!(capture);
                assert_eq!(env, vec![("A".to_string(), "1".to_string())]);
                assert_eq!(args, vec!["--name".to_string(), "a b".to_string()]);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("K=v=w"),
            Ok(("K".to_string(), "v=w".to_string()))
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=v").is_err());
    }

    #[test]
    fn test_json_run_reports_failure_as_outcome() {
        let options = run_options(false, false, true, None, vec![], None);

        assert_eq!(options.output, OutputMode::Capture);
        assert!(!options.check);
    }

    #[test]
    fn test_plain_run_options() {
        let options = run_options(
            false,
            false,
            false,
            Some(PathBuf::from("/work")),
            vec![("A".to_string(), "1".to_string())],
            Some(5),
        );

        assert_eq!(options.output, OutputMode::Inherit);
        assert!(options.check);
        assert_eq!(options.cwd, Some(PathBuf::from("/work")));
        assert_eq!(options.env.get("A").map(String::as_str), Some("1"));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_byte(Some(0)), 0);
        assert_eq!(exit_byte(Some(2)), 2);
        assert_eq!(exit_byte(Some(257)), 1);
        assert_eq!(exit_byte(None), SIGNALED_EXIT_CODE);
    }
}
