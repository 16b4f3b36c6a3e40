//! impeller-build CLI - native build and packaging pipeline for ImpellerSharp

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use impeller_build::core::errors::NativeError;
use impeller_build::util::diagnostic::emit;
use impeller_build::util::GlobalContext;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        if let Some(native) = e.downcast_ref::<NativeError>() {
            emit(&native.to_diagnostic(), color);
            std::process::exit(native.exit_code());
        }
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging (RUST_LOG wins unless --verbose)
    let filter = if cli.verbose {
        EnvFilter::new("impeller_build=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("impeller_build=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let ctx = GlobalContext::new(cli.repo_root)?;

    match cli.command {
        Commands::Engine(args) => commands::engine::execute(args, &ctx),
        Commands::Runtime(args) => commands::runtime::execute(args, &ctx),
        Commands::Stage(args) => commands::stage::execute(args, &ctx),
        Commands::Package(args) => commands::package::execute(args, &ctx),
        Commands::Coverage(args) => commands::coverage::execute(args, &ctx),
        Commands::Smoke(args) => commands::smoke::execute(args, &ctx),
        Commands::Doctor(args) => commands::doctor::execute(args, &ctx, cli.verbose),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
