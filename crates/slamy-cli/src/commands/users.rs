//! `slamy users` -- workspace members.

use clap::Subcommand;

use crate::output::emit;

use super::Context;

/// Subcommands for `slamy users`.
#[derive(Debug, Subcommand)]
pub enum UsersCmd {
    /// List workspace members.
    List {
        /// Include bot users.
        #[arg(long)]
        include_bots: bool,
        /// Include deactivated accounts.
        #[arg(long)]
        include_deactivated: bool,
    },

    /// Show one user's profile.
    Info {
        /// User ID (e.g. `U0123ABCD`).
        user: String,
    },
}

/// Run a `slamy users` subcommand.
pub async fn run(cmd: UsersCmd, ctx: &Context) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match cmd {
        UsersCmd::List {
            include_bots,
            include_deactivated,
        } => {
            let users = client.list_users(include_deactivated, include_bots).await?;
            emit(ctx.format, users.as_slice())
        }
        UsersCmd::Info { user } => {
            let profile = client.user_profile(&user).await?;
            emit(ctx.format, &profile)
        }
    }
}
