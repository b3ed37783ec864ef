//! CLI configuration from the environment.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration: where the backend lives and where operator state
/// (token, selection, cached lists) persists between invocations.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    /// Token from the environment, overriding any stored one.
    pub admin_token: Option<String>,
    pub state_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_url =
            env::var("BROADCAST_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        let admin_token = env::var("BROADCAST_ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
        let state_path = match env::var("BROADCAST_STATE_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_state_path().context("could not determine a config directory")?,
        };
        Ok(Self {
            api_url,
            admin_token,
            state_path,
        })
    }
}

fn default_state_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("broadcast-admin").join("state.json"))
}
