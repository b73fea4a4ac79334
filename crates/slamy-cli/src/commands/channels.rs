//! `slamy channels` -- list channels and read their messages.
//!
//! # Examples
//!
//! ```text
//! slamy channels list --limit 50
//! slamy channels unread
//! slamy channels history C0123 --limit 10
//! slamy channels replies C0123 1700000000.000100
//! ```

use clap::Subcommand;

use slamy_slack::client::{
    DEFAULT_CHANNEL_LIMIT, DEFAULT_HISTORY_LIMIT, DEFAULT_REPLIES_LIMIT,
};

use crate::output::emit;

use super::Context;

/// Subcommands for `slamy channels`.
#[derive(Debug, Subcommand)]
pub enum ChannelsCmd {
    /// List channels you are a member of.
    List {
        /// Maximum number of channels (0 for all).
        #[arg(long, default_value_t = DEFAULT_CHANNEL_LIMIT)]
        limit: usize,
        /// Include archived channels.
        #[arg(long)]
        include_archived: bool,
    },

    /// List channels with unread messages.
    Unread {
        /// Maximum number of channels to check (0 for all).
        #[arg(long, default_value_t = DEFAULT_CHANNEL_LIMIT)]
        limit: usize,
    },

    /// Show recent messages of a channel.
    History {
        /// Channel ID.
        channel: String,
        /// Maximum number of messages.
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },

    /// Show the messages of a thread.
    Replies {
        /// Channel ID.
        channel: String,
        /// Timestamp of the thread's parent message.
        thread_ts: String,
        /// Maximum number of messages.
        #[arg(long, default_value_t = DEFAULT_REPLIES_LIMIT)]
        limit: usize,
    },
}

/// Run a `slamy channels` subcommand.
pub async fn run(cmd: ChannelsCmd, ctx: &Context) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match cmd {
        ChannelsCmd::List {
            limit,
            include_archived,
        } => {
            let channels = client.list_channels(limit, include_archived).await?;
            emit(ctx.format, channels.as_slice())
        }
        ChannelsCmd::Unread { limit } => {
            let unread = client.list_unread_channels(limit).await?;
            emit(ctx.format, unread.as_slice())
        }
        ChannelsCmd::History { channel, limit } => {
            let messages = client.channel_history(&channel, limit).await?;
            emit(ctx.format, messages.as_slice())
        }
        ChannelsCmd::Replies {
            channel,
            thread_ts,
            limit,
        } => {
            let messages = client.thread_replies(&channel, &thread_ts, limit).await?;
            emit(ctx.format, messages.as_slice())
        }
    }
}
