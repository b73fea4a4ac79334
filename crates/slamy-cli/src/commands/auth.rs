//! `slamy auth` -- check credentials.

use clap::Subcommand;

use crate::output::emit;

use super::Context;

/// Subcommands for `slamy auth`.
#[derive(Debug, Subcommand)]
pub enum AuthCmd {
    /// Show who the read token authenticates as.
    Test,
}

/// Run a `slamy auth` subcommand.
pub async fn run(cmd: AuthCmd, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        AuthCmd::Test => {
            let info = ctx.client()?.auth_test().await?;
            emit(ctx.format, &info)
        }
    }
}
