//! Configuration schema and loading.
//!
//! Tokens can be given inline in the config file or through environment
//! variables. All fields accept both `snake_case` and `camelCase` keys.
//! Unknown fields are ignored.
//!
//! The discovery order is:
//! 1. An explicit path (the CLI's `--config`).
//! 2. The `SLAMY_CONFIG` environment variable.
//! 3. `~/.slamy/config.json`
//! 4. If none is found, defaults (every token read from the environment).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credential::Credential;
use crate::error::{Result, SlackError};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SLAMY_CONFIG";

/// Default environment variable for the bot (elevated) token.
pub const DEFAULT_BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";

/// Default environment variable for the user (standard) token.
pub const DEFAULT_USER_TOKEN_ENV: &str = "SLACK_USER_TOKEN";

/// Default environment variable for the Socket Mode app-level token.
pub const DEFAULT_APP_TOKEN_ENV: &str = "SLACK_APP_TOKEN";

/// Base URL for the Slack Web API.
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Root configuration for slamy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bot token (`xoxb-...`), bound to the elevated scope.
    #[serde(default, alias = "botToken")]
    pub bot_token: Credential,

    /// Environment variable holding the bot token when `bot_token` is empty.
    #[serde(default = "default_bot_token_env", alias = "botTokenEnv")]
    pub bot_token_env: String,

    /// User token (`xoxp-...`), bound to the standard scope.
    #[serde(default, alias = "userToken")]
    pub user_token: Credential,

    /// Environment variable holding the user token when `user_token` is empty.
    #[serde(default = "default_user_token_env", alias = "userTokenEnv")]
    pub user_token_env: String,

    /// App-level token (`xapp-...`), only needed for event subscription.
    #[serde(default, alias = "appToken")]
    pub app_token: Credential,

    /// Environment variable holding the app token when `app_token` is empty.
    #[serde(default = "default_app_token_env", alias = "appTokenEnv")]
    pub app_token_env: String,

    /// Slack Web API base URL.
    #[serde(default = "default_api_base_url", alias = "apiBaseUrl")]
    pub api_base_url: String,
}

fn default_bot_token_env() -> String {
    DEFAULT_BOT_TOKEN_ENV.into()
}
fn default_user_token_env() -> String {
    DEFAULT_USER_TOKEN_ENV.into()
}
fn default_app_token_env() -> String {
    DEFAULT_APP_TOKEN_ENV.into()
}
fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: Credential::default(),
            bot_token_env: default_bot_token_env(),
            user_token: Credential::default(),
            user_token_env: default_user_token_env(),
            app_token: Credential::default(),
            app_token_env: default_app_token_env(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl Config {
    /// Fill empty token fields from the environment.
    ///
    /// `lookup` returns the value of an environment variable; the CLI passes
    /// `std::env::var`, tests pass a map. Inline tokens always win.
    pub fn resolve_tokens<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fill_from_env(&mut self.bot_token, &self.bot_token_env, &lookup);
        fill_from_env(&mut self.user_token, &self.user_token_env, &lookup);
        fill_from_env(&mut self.app_token, &self.app_token_env, &lookup);
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SlackError::Configuration(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            SlackError::Configuration(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Load configuration following the discovery order and resolve tokens
    /// from the process environment.
    pub fn load(path_override: Option<&Path>) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let mut config = if let Some(path) = path_override {
            if !path.exists() {
                return Err(SlackError::Configuration(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Self::from_file(path)?
        } else {
            match discover_config_path(&env, home_dir()) {
                Some(path) if path.exists() => {
                    debug!(path = %path.display(), "loading config file");
                    Self::from_file(&path)?
                }
                Some(path) => {
                    debug!(path = %path.display(), "config path does not exist, using defaults");
                    Self::default()
                }
                None => Self::default(),
            }
        };

        config.resolve_tokens(env);
        Ok(config)
    }
}

fn fill_from_env<F>(slot: &mut Credential, var: &str, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if !slot.is_empty() || var.is_empty() {
        return;
    }
    if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
        debug!(env = %var, "token taken from environment");
        *slot = Credential::new(value);
    }
}

/// Discover the config file path.
///
/// Returns the `SLAMY_CONFIG` path when set, else `~/.slamy/config.json`
/// when a home directory is known. Existence is checked by the caller.
pub fn discover_config_path<F>(lookup: &F, home: Option<PathBuf>) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    home.map(|h| h.join(".slamy").join("config.json"))
}

#[cfg(feature = "native")]
fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

#[cfg(not(feature = "native"))]
fn home_dir() -> Option<PathBuf> {
    None
}
