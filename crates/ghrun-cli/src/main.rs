//! ghrun: view GitHub Actions workflow runs from the terminal.

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod client;
mod commands;
mod config;
mod error;
mod factory;
mod iostreams;
mod prompt;
mod render;

use commands::runs::{ViewArgs, ViewOptions};
use config::{Config, GlobalArgs};
use error::{CommandError, CommandResult};
use factory::DefaultFactory;
use iostreams::IoStreams;

const VIEW_USAGE: &str = "Usage: ghrun run view [<run-id>] [flags]";

#[derive(Parser)]
#[command(name = "ghrun")]
#[command(about = "View GitHub Actions workflow runs", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with workflow runs
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
}

#[derive(Subcommand)]
enum RunCommands {
    /// View a summary of a workflow run
    #[command(after_help = "\
Examples:
  # Interactively select a run to view
  $ ghrun run view

  # View a specific run
  $ ghrun run view 0451

  # Exit non-zero if a run failed
  $ ghrun run view 0451 -e && echo \"job pending or passed\"")]
    View(ViewArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GHRUN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli, io: &mut IoStreams) -> CommandResult {
    match cli.command {
        Commands::Run { command } => match command {
            RunCommands::View(args) => {
                let opts = ViewOptions::resolve(args, io.is_interactive())?;
                let factory = load_factory(&cli.global)?;
                commands::runs::view(opts, &factory, io).await
            }
        },
    }
}

fn load_factory(args: &GlobalArgs) -> CommandResult<DefaultFactory> {
    let config = Config::load(args).context("failed to load configuration")?;
    Ok(DefaultFactory::new(config))
}

/// Print `result` to `stderr` as the user should see it and pick the exit code.
fn report(result: CommandResult, stderr: &mut dyn Write) -> u8 {
    // Write errors on stderr are ignored.
    let _ = match result {
        Ok(()) => return 0,
        Err(CommandError::Silent) => return 1,
        Err(CommandError::Usage(message)) => {
            writeln!(stderr, "{}\n\n{}", message, VIEW_USAGE)
        }
        Err(CommandError::Other(e)) => writeln!(stderr, "error: {:#}", e),
    };
    1
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let mut io = IoStreams::system(cli.global.no_color);

    let result = dispatch(cli, &mut io).await;
    ExitCode::from(report(result, &mut std::io::stderr()))
}
