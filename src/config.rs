use std::collections::HashMap;
use std::path::PathBuf;

const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

const VARS: [&str; 5] = [
    "DEBTBOT_TOKEN",
    "TELEGRAM_BOT_TOKEN",
    "DEBTBOT_DB",
    "DEBTBOT_POLL_TIMEOUT",
    "DEBTBOT_REPO_URL",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("no bot token: set DEBTBOT_TOKEN (or TELEGRAM_BOT_TOKEN)")]
    MissingToken,
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("could not determine a data directory; set DEBTBOT_DB")]
    NoDataDir,
}

/// Process settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) token: Option<String>,
    pub(crate) db_path: Option<PathBuf>,
    pub(crate) poll_timeout_secs: u64,
    pub(crate) repo_url: Option<String>,
}

impl Config {
    /// Only the variables in [`VARS`] are read, so unrelated non-UTF-8
    /// entries in the environment are never touched. A non-UTF-8 value in
    /// one of ours counts as unset.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        let vars = VARS
            .iter()
            .filter_map(|&name| Some((name.to_string(), std::env::var(name).ok()?)))
            .collect();
        Self::from_vars(&vars)
    }

    pub(crate) fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let poll_timeout_secs = match get("DEBTBOT_POLL_TIMEOUT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "DEBTBOT_POLL_TIMEOUT",
                value: raw.clone(),
            })?,
            None => DEFAULT_POLL_TIMEOUT_SECS,
        };

        Ok(Self {
            token: get("DEBTBOT_TOKEN").or_else(|| get("TELEGRAM_BOT_TOKEN")),
            db_path: get("DEBTBOT_DB").map(PathBuf::from),
            poll_timeout_secs,
            repo_url: get("DEBTBOT_REPO_URL"),
        })
    }

    pub(crate) fn require_token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or(ConfigError::MissingToken)
    }

    /// The configured database path, or `debtbot.db` in the platform data
    /// directory.
    pub(crate) fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        let proj_dirs = directories::ProjectDirs::from("com", "debtbot", "debtbot")
            .ok_or(ConfigError::NoDataDir)?;
        Ok(proj_dirs.data_dir().join("debtbot.db"))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
