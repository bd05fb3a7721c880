//
//  teamcity-client
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use teamcity_client::cli::{Cli, Commands};
use teamcity_client::exit_codes;
use teamcity_client::SafeError;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    let result = run(cli).await;

    // Handle result and exit
    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<SafeError>()
                .map(|safe| exit_codes::for_error_code(safe.code))
                .unwrap_or(exit_codes::ERROR);
            std::process::exit(code);
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("TC_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build(cmd) => cmd.run(&cli.global).await,
        Commands::Artifact(cmd) => cmd.run(&cli.global).await,
        Commands::Agent(cmd) => cmd.run(&cli.global).await,
        Commands::Change(cmd) => cmd.run(&cli.global).await,
        Commands::Project(cmd) => cmd.run(&cli.global).await,
        Commands::Mute(cmd) => cmd.run(&cli.global).await,
        Commands::Call(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("tc version {}", teamcity_client::VERSION);
            Ok(())
        }
    }
}
