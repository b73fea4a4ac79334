//! `slamy messages` -- post, reply, update and delete messages.
//!
//! # Examples
//!
//! ```text
//! slamy messages post C0123 --text "deploy finished"
//! slamy messages reply C0123 1700000000.000100 --text "rolled back"
//! slamy messages update C0123 1700000000.000100 --text "fixed typo"
//! slamy messages delete C0123 1700000000.000100
//! ```

use clap::Subcommand;
use serde::Serialize;

use slamy_types::SlackError;

use crate::output::{Render, emit};

use super::Context;

/// Subcommands for `slamy messages`.
#[derive(Debug, Subcommand)]
pub enum MessagesCmd {
    /// Post a message (long text continues in a thread).
    Post {
        /// Channel ID.
        channel: String,
        /// Message text.
        #[arg(long)]
        text: String,
    },

    /// Reply in a thread.
    Reply {
        /// Channel ID.
        channel: String,
        /// Timestamp of the thread's parent message.
        thread_ts: String,
        /// Reply text.
        #[arg(long)]
        text: String,
    },

    /// Replace the text of a message (at most 4000 characters).
    Update {
        /// Channel ID.
        channel: String,
        /// Timestamp of the message.
        ts: String,
        /// New text.
        #[arg(long)]
        text: String,
    },

    /// Delete a message.
    Delete {
        /// Channel ID.
        channel: String,
        /// Timestamp of the message.
        ts: String,
    },
}

#[derive(Serialize)]
struct Reply {
    channel: String,
    ts: String,
    thread_ts: String,
}

impl Render for Reply {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        vec![vec![self.channel.clone(), self.ts.clone(), self.thread_ts.clone()]]
    }

    fn prose(&self) -> String {
        format!(
            "Reply posted to {} thread {} (ts: {})",
            self.channel, self.thread_ts, self.ts
        )
    }
}

#[derive(Serialize)]
struct Updated {
    channel: String,
    ts: String,
}

impl Render for Updated {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        vec![vec![self.channel.clone(), self.ts.clone()]]
    }

    fn prose(&self) -> String {
        format!("Message updated in {} (ts: {})", self.channel, self.ts)
    }
}

#[derive(Serialize)]
struct Deleted {
    channel: String,
    ts: String,
    deleted: bool,
}

impl Render for Deleted {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        vec![vec![self.channel.clone(), self.ts.clone(), "deleted".into()]]
    }

    fn prose(&self) -> String {
        format!("Message deleted from {} (ts: {})", self.channel, self.ts)
    }
}

fn require_text(text: &str) -> Result<(), SlackError> {
    if text.trim().is_empty() {
        return Err(SlackError::Validation("message text is empty".into()));
    }
    Ok(())
}

/// Run a `slamy messages` subcommand.
pub async fn run(cmd: MessagesCmd, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        MessagesCmd::Post { channel, text } => {
            require_text(&text)?;
            let posted = ctx.client()?.post_message(&channel, &text).await?;
            emit(ctx.format, &posted)
        }
        MessagesCmd::Reply {
            channel,
            thread_ts,
            text,
        } => {
            require_text(&text)?;
            let posted = ctx
                .client()?
                .reply_to_thread(&channel, &thread_ts, &text)
                .await?;
            emit(
                ctx.format,
                &Reply {
                    channel: posted.channel,
                    ts: posted.ts,
                    thread_ts,
                },
            )
        }
        MessagesCmd::Update { channel, ts, text } => {
            require_text(&text)?;
            let updated = ctx.client()?.update_message(&channel, &ts, &text).await?;
            emit(
                ctx.format,
                &Updated {
                    channel: updated.channel,
                    ts: updated.ts,
                },
            )
        }
        MessagesCmd::Delete { channel, ts } => {
            ctx.client()?.delete_message(&channel, &ts).await?;
            emit(
                ctx.format,
                &Deleted {
                    channel,
                    ts,
                    deleted: true,
                },
            )
        }
    }
}
