//! `slamy files` -- upload files.

use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;

use slamy_slack::{UploadOptions, UploadSource};

use crate::output::{Render, emit};

use super::Context;

/// Subcommands for `slamy files`.
#[derive(Debug, Subcommand)]
pub enum FilesCmd {
    /// Upload a file to a channel.
    Upload {
        /// Channel ID.
        channel: String,
        /// Path of the file to upload.
        path: PathBuf,
        /// Post the file in this thread.
        #[arg(long)]
        thread_ts: Option<String>,
        /// Display title (defaults to the filename).
        #[arg(long)]
        title: Option<String>,
        /// Filename shown in Slack (defaults to the path's file name).
        #[arg(long)]
        filename: Option<String>,
    },
}

#[derive(Serialize)]
struct Uploaded {
    channel: String,
    file: String,
    uploaded: bool,
}

impl Render for Uploaded {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        vec![vec![self.channel.clone(), self.file.clone(), "uploaded".into()]]
    }

    fn prose(&self) -> String {
        format!("File uploaded to {}: {}", self.channel, self.file)
    }
}

/// Run a `slamy files` subcommand.
pub async fn run(cmd: FilesCmd, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        FilesCmd::Upload {
            channel,
            path,
            thread_ts,
            title,
            filename,
        } => {
            let file = path.display().to_string();
            let options = UploadOptions {
                thread_ts,
                title,
                filename,
            };
            ctx.client()?
                .upload_file(&channel, UploadSource::Path(path), options)
                .await?;
            emit(
                ctx.format,
                &Uploaded {
                    channel,
                    file,
                    uploaded: true,
                },
            )
        }
    }
}
