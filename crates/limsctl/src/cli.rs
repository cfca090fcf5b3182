//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Interactive console for driving a laboratory instrument through its
/// remote automation interface.
#[derive(Debug, Parser)]
#[command(name = "limsctl", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(Debug, clap::Args)]
pub struct GlobalOpts {
    /// Profile name from the config file.
    #[arg(short, long, env = "LIMSCTL_PROFILE")]
    pub profile: Option<String>,

    /// Instrument server hostname (overrides the profile).
    #[arg(long, env = "LIMSCTL_HOSTNAME")]
    pub hostname: Option<String>,

    /// Username offered at login (overrides the profile).
    #[arg(short, long)]
    pub username: Option<String>,

    /// Alternate config file path.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
