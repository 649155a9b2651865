//! kvatrack - CLI entry point

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands};
use commands::extract::ExtractArgs;

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            file,
            output,
            cutoff,
            line_lengths,
            pairs,
            order,
            yes,
            non_interactive,
            config,
        } => commands::extract::handle(ExtractArgs {
            file,
            output,
            cutoff,
            line_lengths,
            pairs,
            order,
            yes,
            non_interactive,
            config,
        }),
        Commands::Inspect { file, json } => commands::inspect::handle(&file, json),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { config } => commands::config::handle_show(config.as_deref()),
            ConfigCommands::Path => commands::config::handle_path(),
        },
    }
}
