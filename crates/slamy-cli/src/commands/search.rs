//! `slamy search` -- search messages.
//!
//! Search needs a user token; bot tokens are rejected by Slack with
//! `not_allowed_token_type`.

use clap::{Args, ValueEnum};

use slamy_slack::SearchOptions;

use crate::output::emit;

use super::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortField {
    Timestamp,
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortDir {
    Desc,
    Asc,
}

/// Arguments for `slamy search`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search query (Slack search syntax, e.g. `in:#ops from:@alice`).
    pub query: String,

    /// Results per page.
    #[arg(long, default_value = "20")]
    pub count: u32,

    /// Page number (1-based).
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Sort field.
    #[arg(long, value_enum, default_value = "timestamp")]
    pub sort: SortField,

    /// Sort direction.
    #[arg(long, value_enum, default_value = "desc")]
    pub sort_dir: SortDir,
}

impl SearchArgs {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            sort: match self.sort {
                SortField::Timestamp => "timestamp",
                SortField::Score => "score",
            }
            .into(),
            sort_dir: match self.sort_dir {
                SortDir::Desc => "desc",
                SortDir::Asc => "asc",
            }
            .into(),
            count: self.count,
            page: self.page,
        }
    }
}

/// Run `slamy search`.
pub async fn run(args: SearchArgs, ctx: &Context) -> anyhow::Result<()> {
    let result = ctx
        .client()?
        .search_messages(&args.query, &args.options())
        .await?;
    emit(ctx.format, &result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_match_client_defaults() {
        let args = SearchArgs {
            query: "q".into(),
            count: 20,
            page: 1,
            sort: SortField::Timestamp,
            sort_dir: SortDir::Desc,
        };
        assert_eq!(args.options(), SearchOptions::default());
    }

    #[test]
    fn score_ascending() {
        let args = SearchArgs {
            query: "q".into(),
            count: 5,
            page: 3,
            sort: SortField::Score,
            sort_dir: SortDir::Asc,
        };
        let options = args.options();
        assert_eq!(options.sort, "score");
        assert_eq!(options.sort_dir, "asc");
        assert_eq!(options.page, 3);
    }
}
