//! CLI-owned configuration: TOML profiles resolved through figment.
//!
//! The core never sees these types -- it receives explicit request
//! values at the moment a command is issued.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cli::GlobalOpts;
use crate::error::CliError;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when --profile is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Connection defaults for one instrument server.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    pub hostname: Option<String>,
    pub username: Option<String>,
    /// Seed directory for export destination prompts.
    pub export_dir: Option<PathBuf>,
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "limsctl", "limsctl")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("limsctl.toml"))
}

/// Load the configuration from file + environment.
pub fn load_config(override_path: Option<&Path>) -> Result<Config, CliError> {
    let path = override_path.map_or_else(config_path, Path::to_path_buf);

    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("LIMSCTL_").split("__"))
        .extract()
        .map_err(|source| CliError::Config {
            path: path.display().to_string(),
            source,
        })
}

/// Pick the active profile: `--profile`, then `default_profile`, then
/// an implicit empty profile. CLI flags win over profile values.
pub fn resolve_profile(config: &Config, global: &GlobalOpts) -> Result<Profile, CliError> {
    let mut profile = match &global.profile {
        Some(name) => config
            .profiles
            .get(name)
            .cloned()
            .ok_or_else(|| CliError::UnknownProfile {
                profile: name.clone(),
            })?,
        None => config
            .default_profile
            .as_ref()
            .and_then(|name| config.profiles.get(name).cloned())
            .unwrap_or_default(),
    };

    if global.hostname.is_some() {
        profile.hostname = global.hostname.clone();
    }
    if global.username.is_some() {
        profile.username = global.username.clone();
    }
    Ok(profile)
}
