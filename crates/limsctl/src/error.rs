//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes for the binary.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Could not load configuration from {path}")]
    #[diagnostic(
        code(limsctl::config),
        help("Check the TOML syntax in {path}, or unset LIMSCTL_* overrides.")
    )]
    Config {
        path: String,
        #[source]
        source: figment::Error,
    },

    #[error("Unknown profile '{profile}'")]
    #[diagnostic(
        code(limsctl::unknown_profile),
        help("Add a [profiles.{profile}] section to the config file, or drop --profile.")
    )]
    UnknownProfile { profile: String },

    #[error("Console I/O failed")]
    #[diagnostic(code(limsctl::io))]
    Io(#[from] std::io::Error),

    #[error("Prompt failed")]
    #[diagnostic(code(limsctl::prompt))]
    Prompt(#[source] dialoguer::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::UnknownProfile { .. } => exit_code::CONFIG,
            Self::Io(_) | Self::Prompt(_) => exit_code::GENERAL,
        }
    }
}
