//! `slamy reactions` -- add and remove emoji reactions.

use clap::Subcommand;
use serde::Serialize;

use crate::output::{Render, emit};

use super::Context;

/// Subcommands for `slamy reactions`.
#[derive(Debug, Subcommand)]
pub enum ReactionsCmd {
    /// Add a reaction to a message.
    Add {
        /// Channel ID.
        channel: String,
        /// Timestamp of the message.
        ts: String,
        /// Emoji name without colons (e.g. `thumbsup`).
        name: String,
    },

    /// Remove a reaction from a message.
    Remove {
        /// Channel ID.
        channel: String,
        /// Timestamp of the message.
        ts: String,
        /// Emoji name without colons.
        name: String,
    },
}

#[derive(Serialize)]
struct ReactionResult {
    channel: String,
    ts: String,
    reaction: String,
    removed: bool,
}

impl Render for ReactionResult {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        let mut row = vec![self.channel.clone(), self.ts.clone(), self.reaction.clone()];
        if self.removed {
            row.push("removed".into());
        }
        vec![row]
    }

    fn prose(&self) -> String {
        let (verb, prep) = if self.removed {
            ("removed", "from")
        } else {
            ("added", "to")
        };
        format!(
            "Reaction :{}: {verb} {prep} {} at {}",
            self.reaction, self.channel, self.ts
        )
    }
}

/// Run a `slamy reactions` subcommand.
pub async fn run(cmd: ReactionsCmd, ctx: &Context) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let result = match cmd {
        ReactionsCmd::Add { channel, ts, name } => {
            let name = strip_colons(&name);
            client.add_reaction(&channel, &ts, &name).await?;
            ReactionResult {
                channel,
                ts,
                reaction: name,
                removed: false,
            }
        }
        ReactionsCmd::Remove { channel, ts, name } => {
            let name = strip_colons(&name);
            client.remove_reaction(&channel, &ts, &name).await?;
            ReactionResult {
                channel,
                ts,
                reaction: name,
                removed: true,
            }
        }
    };
    emit(ctx.format, &result)
}

/// Accept `:eyes:` as well as `eyes`.
pub(crate) fn strip_colons(name: &str) -> String {
    name.trim().trim_matches(':').to_owned()
}
