//! Find which GitLab projects contain a given branch.

use clap::Parser as _;
use std::env;
use std::io::{self, IsTerminal as _};
use std::process::ExitCode;
use tokio::{select, signal};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::{Config, Overrides};
use crate::gitlab::Connection;
use crate::render::Renderer;
use crate::scanner::Scanner;

mod cli;
mod config;
mod error;
mod gitlab;
mod render;
mod scanner;

/// Exit code used with `--strict` when the project listing was interrupted
const EXIT_PARTIAL_LISTING: u8 = 2;
/// Exit code used when the scan is interrupted by Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

/// Lists the projects then looks for `branch` in each of them
#[instrument(skip(connection, renderer))]
async fn run<R: Renderer>(
    connection: &Connection,
    branch: &str,
    strict: bool,
    renderer: R,
) -> ExitCode {
    let mut scanner = Scanner::new(connection, renderer);

    let listing = match scanner.list_projects().await {
        Ok(listing) => listing,
        Err(err) => {
            error!("Failed to get all projects: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref interruption) = listing.interrupted {
        if strict {
            error!(
                "the listing stopped at page {} ({}), not scanning a partial list",
                interruption.page, interruption.reason
            );
            return ExitCode::from(EXIT_PARTIAL_LISTING);
        }
        warn!(
            "the listing stopped at page {}, only {} projects will be checked",
            interruption.page,
            listing.items.len()
        );
    }

    match scanner.find_branch(branch, &listing.items).await {
        Ok(matches) => {
            info!("'{branch}' found in {} projects", matches.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Failed to check all projects: {err}");
            ExitCode::FAILURE
        }
    }
}

#[expect(
    clippy::integer_division_remainder_used,
    reason = "Because clippy is not happy with the tokio::select macro #1"
)]
#[expect(
    clippy::redundant_pub_crate,
    reason = "Because clippy is not happy with the tokio::select macro #2"
)]
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = cli.output_format(io::stdout().is_terminal());

    // Loaded before the subscriber so that RUST_LOG can be set in the .env file
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match dotenv {
        Ok(path) => debug!("loaded {}", path.display()),
        Err(err) => debug!("no .env file loaded: {err}"),
    }

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        },
    };

    let mut overrides = Overrides::from_env();
    if cli.branch.is_some() {
        overrides.target_branch = cli.branch;
    }

    let config = match Config::load(&config_dir, overrides) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Wrong Gitlab configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!("{config:?}");

    let connection = match Connection::new(&config) {
        Ok(connection) => connection,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let renderer = render::boxed(output, io::stdout());

    // Dropping the scan restores the terminal
    select! {
        exit_code = run(&connection, &config.target_branch, cli.strict, renderer) => exit_code,
        res = signal::ctrl_c() => match res {
            Ok(()) => {
                warn!("Interrupted! exiting.");
                ExitCode::from(EXIT_INTERRUPTED)
            }
            Err(err) => {
                error!("{err}");
                ExitCode::FAILURE
            }
        }
    }
}
