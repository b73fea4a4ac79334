//! CLI command implementations for `slamy`.
//!
//! Each command group lives in its own module:
//!
//! - [`messages`] -- post, reply, update, delete
//! - [`reactions`] -- add and remove emoji reactions
//! - [`files`] -- file upload
//! - [`channels`] -- channel listing, unread detection, history, threads
//! - [`users`] -- member listing and profiles
//! - [`search`] -- message search
//! - [`auth`] -- credential check
//! - [`events`] -- Socket Mode event stream
//! - [`mcp`] -- MCP tool server on stdio

pub mod auth;
pub mod channels;
pub mod events;
pub mod files;
pub mod mcp;
pub mod messages;
pub mod reactions;
pub mod search;
pub mod users;

use std::path::Path;

use anyhow::Context as _;
use tracing::debug;

use slamy_slack::SlackClient;
use slamy_types::config::Config;

use crate::output::OutputFormat;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
}

impl Context {
    /// Load configuration and pick the output format.
    pub fn load(config_override: Option<&Path>, format: OutputFormat) -> anyhow::Result<Self> {
        let config = Config::load(config_override)?;
        debug!(
            bot_token = !config.bot_token.is_empty(),
            user_token = !config.user_token.is_empty(),
            app_token = !config.app_token.is_empty(),
            "configuration loaded"
        );
        Ok(Self { config, format })
    }

    /// Build a Slack client from the loaded configuration.
    pub fn client(&self) -> anyhow::Result<SlackClient> {
        SlackClient::new(&self.config)
            .context("set SLACK_BOT_TOKEN or SLACK_USER_TOKEN, or add tokens to the config file")
    }
}
