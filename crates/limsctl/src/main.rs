mod cli;
mod config;
mod console;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use limsctl_client::SimulatedInstrument;
use limsctl_core::{Dispatcher, Session};

use crate::cli::Cli;
use crate::error::CliError;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = config::load_config(cli.global.config.as_deref())?;
    let profile = config::resolve_profile(&config, &cli.global)?;

    // The vendor automation binding lives out of tree; the bundled
    // simulator stands in behind the same `Endpoint` seam.
    let session = Session::new(Box::new(SimulatedInstrument::new()));
    let chooser = console::PromptChooser::new(profile.export_dir.clone());
    let mut dispatcher = Dispatcher::new(session, Box::new(chooser));

    console::run(&mut dispatcher, &profile)
}
