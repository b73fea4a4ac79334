//! `slamy events` -- stream Socket Mode events.
//!
//! Prints each received event as one JSON line on stdout until Ctrl-C.
//! Requires an app-level token (`SLACK_APP_TOKEN`).

use std::io::Write;

use clap::Subcommand;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use slamy_slack::EventSubscriber;
use slamy_slack::events::SlackEvent;

use super::Context;

/// Event types streamed when no `--kind` is given.
pub const DEFAULT_KINDS: [&str; 2] = ["message", "app_mention"];

/// Subcommands for `slamy events`.
#[derive(Debug, Subcommand)]
pub enum EventsCmd {
    /// Print events as JSON lines until interrupted.
    Listen {
        /// Event type to subscribe to (repeatable).
        #[arg(long = "kind")]
        kinds: Vec<String>,
    },
}

fn print_event(event: &SlackEvent) {
    match serde_json::to_string(event) {
        Ok(line) => {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{line}");
            let _ = stdout.flush();
        }
        Err(e) => warn!(error = %e, "failed to encode event"),
    }
}

/// Resolve the kinds to subscribe to.
fn kinds_or_default(kinds: Vec<String>) -> Vec<String> {
    if kinds.is_empty() {
        DEFAULT_KINDS.iter().map(|k| (*k).to_owned()).collect()
    } else {
        kinds
    }
}

/// Run a `slamy events` subcommand.
pub async fn run(cmd: EventsCmd, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        EventsCmd::Listen { kinds } => {
            let mut subscriber = EventSubscriber::new(&ctx.config)?;
            for kind in kinds_or_default(kinds) {
                subscriber.subscribe(kind, print_event);
            }

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("interrupt received, shutting down");
                        on_signal.cancel();
                    }
                    Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
                }
            });

            subscriber.run(cancel).await?;
            Ok(())
        }
    }
}
