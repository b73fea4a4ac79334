//! `slamy` -- Slack from the command line.
//!
//! Provides the following subcommands:
//!
//! - `slamy messages` -- Post, reply to, update and delete messages.
//! - `slamy reactions` -- Add and remove emoji reactions.
//! - `slamy files` -- Upload files.
//! - `slamy channels` -- List channels, find unread ones, read history.
//! - `slamy users` -- List members and show profiles.
//! - `slamy search` -- Search messages.
//! - `slamy auth` -- Check credentials.
//! - `slamy events` -- Stream Socket Mode events.
//! - `slamy mcp` -- Serve the Slack tools over MCP on stdio.
//!
//! Tokens come from the config file or from `SLACK_BOT_TOKEN`,
//! `SLACK_USER_TOKEN` and `SLACK_APP_TOKEN`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::Context;
use commands::auth::AuthCmd;
use commands::channels::ChannelsCmd;
use commands::events::EventsCmd;
use commands::files::FilesCmd;
use commands::messages::MessagesCmd;
use commands::reactions::ReactionsCmd;
use commands::search::SearchArgs;
use commands::users::UsersCmd;
use output::OutputFormat;

/// Slack from the command line.
#[derive(Parser)]
#[command(name = "slamy", about = "Slack from the command line", version)]
struct Cli {
    /// Output JSON.
    #[arg(long, global = true, conflicts_with = "plain")]
    json: bool,

    /// Output tab-separated values.
    #[arg(long, global = true)]
    plain: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Post, reply to, update and delete messages.
    Messages {
        #[command(subcommand)]
        action: MessagesCmd,
    },

    /// Add and remove emoji reactions.
    Reactions {
        #[command(subcommand)]
        action: ReactionsCmd,
    },

    /// Upload files.
    Files {
        #[command(subcommand)]
        action: FilesCmd,
    },

    /// List channels and read their messages.
    Channels {
        #[command(subcommand)]
        action: ChannelsCmd,
    },

    /// List members and show profiles.
    Users {
        #[command(subcommand)]
        action: UsersCmd,
    },

    /// Search messages (requires a user token).
    Search(SearchArgs),

    /// Check credentials.
    Auth {
        #[command(subcommand)]
        action: AuthCmd,
    },

    /// Stream Socket Mode events (requires an app-level token).
    Events {
        #[command(subcommand)]
        action: EventsCmd,
    },

    /// Serve the Slack tools to MCP clients over stdio.
    Mcp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::from_flags(cli.json, cli.plain);
    let ctx = Context::load(cli.config.as_deref(), format)?;

    match cli.command {
        Commands::Messages { action } => commands::messages::run(action, &ctx).await?,
        Commands::Reactions { action } => commands::reactions::run(action, &ctx).await?,
        Commands::Files { action } => commands::files::run(action, &ctx).await?,
        Commands::Channels { action } => commands::channels::run(action, &ctx).await?,
        Commands::Users { action } => commands::users::run(action, &ctx).await?,
        Commands::Search(args) => commands::search::run(args, &ctx).await?,
        Commands::Auth { action } => commands::auth::run(action, &ctx).await?,
        Commands::Events { action } => commands::events::run(action, &ctx).await?,
        Commands::Mcp => commands::mcp::run(&ctx).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_without_error() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_has_all_subcommands() {
        let cmd = Cli::command();
        let names: Vec<&str> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        for expected in [
            "messages", "reactions", "files", "channels", "users", "search", "auth", "events",
            "mcp",
        ] {
            assert!(names.contains(&expected), "missing subcommand {expected}");
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["slamy", "auth", "test", "--json", "--verbose"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
    }

    #[test]
    fn mcp_takes_no_arguments() {
        let cli = Cli::try_parse_from(["slamy", "mcp"]).unwrap();
        assert!(matches!(cli.command, Commands::Mcp));
        assert!(Cli::try_parse_from(["slamy", "mcp", "extra"]).is_err());
    }

    #[test]
    fn json_and_plain_conflict() {
        assert!(Cli::try_parse_from(["slamy", "--json", "--plain", "auth", "test"]).is_err());
    }

    #[test]
    fn messages_post_requires_text() {
        assert!(Cli::try_parse_from(["slamy", "messages", "post", "C1"]).is_err());
        let cli =
            Cli::try_parse_from(["slamy", "messages", "post", "C1", "--text", "hello"]).unwrap();
        match cli.command {
            Commands::Messages {
                action: MessagesCmd::Post { channel, text },
            } => {
                assert_eq!(channel, "C1");
                assert_eq!(text, "hello");
            }
            _ => panic!("expected messages post"),
        }
    }

    #[test]
    fn messages_reply_positional_thread() {
        let cli = Cli::try_parse_from([
            "slamy", "messages", "reply", "C1", "1700000000.000100", "--text", "ack",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Messages {
                action: MessagesCmd::Reply { ref thread_ts, .. }
            } if thread_ts == "1700000000.000100"
        ));
    }

    #[test]
    fn reactions_add_parses() {
        let cli = Cli::try_parse_from(["slamy", "reactions", "add", "C1", "1.0", "eyes"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Reactions {
                action: ReactionsCmd::Add { .. }
            }
        ));
    }

    #[test]
    fn channels_list_defaults() {
        let cli = Cli::try_parse_from(["slamy", "channels", "list"]).unwrap();
        match cli.command {
            Commands::Channels {
                action:
                    ChannelsCmd::List {
                        limit,
                        include_archived,
                    },
            } => {
                assert_eq!(limit, 100);
                assert!(!include_archived);
            }
            _ => panic!("expected channels list"),
        }
    }

    #[test]
    fn channels_history_limit() {
        let cli =
            Cli::try_parse_from(["slamy", "channels", "history", "C1", "--limit", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Channels {
                action: ChannelsCmd::History { limit: 5, .. }
            }
        ));
    }

    #[test]
    fn files_upload_options() {
        let cli = Cli::try_parse_from([
            "slamy",
            "files",
            "upload",
            "C1",
            "./report.pdf",
            "--thread-ts",
            "1.0",
            "--title",
            "Q3",
        ])
        .unwrap();
        match cli.command {
            Commands::Files {
                action:
                    FilesCmd::Upload {
                        path,
                        thread_ts,
                        title,
                        filename,
                        ..
                    },
            } => {
                assert_eq!(path, PathBuf::from("./report.pdf"));
                assert_eq!(thread_ts.as_deref(), Some("1.0"));
                assert_eq!(title.as_deref(), Some("Q3"));
                assert!(filename.is_none());
            }
            _ => panic!("expected files upload"),
        }
    }

    #[test]
    fn search_rejects_unknown_sort() {
        assert!(Cli::try_parse_from(["slamy", "search", "q", "--sort", "random"]).is_err());
        assert!(Cli::try_parse_from(["slamy", "search", "q", "--sort", "score"]).is_ok());
    }

    #[test]
    fn events_listen_repeatable_kind() {
        let cli = Cli::try_parse_from([
            "slamy", "events", "listen", "--kind", "message", "--kind", "reaction_added",
        ])
        .unwrap();
        match cli.command {
            Commands::Events {
                action: EventsCmd::Listen { kinds },
            } => assert_eq!(kinds, ["message", "reaction_added"]),
            _ => panic!("expected events listen"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["slamy", "users", "list", "--config", "/tmp/slamy.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/slamy.json")));
    }
}
