mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use fleetwatch_core::config::CheckConfig;
use fleetwatch_core::{run_fleet_check, CheckError};

use crate::cli::Cli;

const EXIT_FATAL: u8 = 3;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let interrupted = matches!(err.downcast_ref::<CheckError>(), Some(CheckError::Interrupted));
            eprintln!("error: {err:#}");
            ExitCode::from(if interrupted { EXIT_INTERRUPTED } else { EXIT_FATAL })
        }
    }
}

async fn run(cli: &Cli) -> Result<u8> {
    let config = CheckConfig::resolve(cli.settings()).context("invalid configuration")?;
    debug!(
        cluster = %config.cluster,
        region = %config.region,
        services = config.services.len(),
        "configuration resolved"
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping");
            on_interrupt.cancel();
        }
    });

    let report = run_fleet_check(&config, &cancel).await?;
    let rendered = report.render(config.output).context("failed to render report")?;
    println!("{rendered}");

    Ok(u8::try_from(report.exit_code()).unwrap_or(EXIT_FATAL))
}

/// Install the stderr subscriber; stdout is reserved for the report.
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("fleetwatch_core=debug,fleetwatch=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}
