//! Output rendering for `slamy`.
//!
//! Every command result implements [`Render`] and is printed in one of
//! three formats:
//!
//! - `--json`: pretty-printed JSON of the serialized value
//! - `--plain`: one tab-separated line per row, newlines in text escaped
//! - default: human-readable prose, lists rendered as tables

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use slamy_types::model::{
    AuthInfo, ChannelInfo, Message, PostedMessage, SearchResult, UnreadChannel, User, UserProfile,
};

/// Output format selected by the global flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Plain,
    Prose,
}

impl OutputFormat {
    /// Pick the format from the `--json` / `--plain` flags.
    pub fn from_flags(json: bool, plain: bool) -> Self {
        if json {
            Self::Json
        } else if plain {
            Self::Plain
        } else {
            Self::Prose
        }
    }
}

/// A command result that can be printed.
pub trait Render: Serialize {
    /// Rows for `--plain` output.
    fn plain_rows(&self) -> Vec<Vec<String>>;

    /// Human-readable rendering.
    fn prose(&self) -> String;
}

/// Render `value` in `format`.
pub fn render<T: Render + ?Sized>(format: OutputFormat, value: &T) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Plain => value
            .plain_rows()
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Prose => value.prose(),
    })
}

/// Render `value` and print it to stdout.
pub fn emit<T: Render + ?Sized>(format: OutputFormat, value: &T) -> anyhow::Result<()> {
    let out = render(format, value)?;
    if !out.is_empty() {
        println!("{out}");
    }
    Ok(())
}

/// Format a Slack timestamp as `YYYY-MM-DD HH:MM` (UTC).
///
/// Returns the input unchanged when it does not parse.
pub fn format_ts(ts: &str) -> String {
    let secs = ts.split('.').next().unwrap_or_default();
    match secs.parse::<i64>() {
        Ok(secs) if secs > 0 => chrono::DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| ts.to_owned()),
        _ => ts.to_owned(),
    }
}

/// Escape newlines and tabs so a value fits on one TSV line.
pub fn escape_plain(text: &str) -> String {
    text.replace('\n', "\\n").replace('\t', "\\t")
}

/// Cut `text` to `max` characters, appending `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_owned()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

pub(crate) fn table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "" }
}

// ── Result records ───────────────────────────────────────────────────────

impl Render for PostedMessage {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        vec![vec![self.channel.clone(), self.ts.clone()]]
    }

    fn prose(&self) -> String {
        format!("Message posted to {} (ts: {})", self.channel, self.ts)
    }
}

impl Render for AuthInfo {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.user_id.clone(),
            self.user.clone(),
            self.team_id.clone(),
            self.team.clone(),
        ]]
    }

    fn prose(&self) -> String {
        format!(
            "Authenticated as: {} ({})\nTeam: {} ({})\nURL: {}",
            self.user, self.user_id, self.team, self.team_id, self.url
        )
    }
}

impl Render for [ChannelInfo] {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|c| {
                vec![
                    c.id.clone(),
                    c.name.clone(),
                    c.num_members.to_string(),
                    if c.is_private { "private".into() } else { String::new() },
                    escape_plain(&c.topic),
                ]
            })
            .collect()
    }

    fn prose(&self) -> String {
        if self.is_empty() {
            return "No channels found.".into();
        }
        let mut table = table(["CHANNEL", "ID", "MEMBERS", "PRIVATE", "TOPIC"]);
        for c in self {
            table.add_row([
                format!("#{}", c.name),
                c.id.clone(),
                c.num_members.to_string(),
                yes_no(c.is_private).to_owned(),
                truncate(&c.topic, 60),
            ]);
        }
        format!("{table}\n  {} channel(s)", self.len())
    }
}

impl Render for [UnreadChannel] {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|u| {
                vec![
                    u.channel.id.clone(),
                    u.channel.name.clone(),
                    u.channel.num_members.to_string(),
                    if u.channel.is_private { "private".into() } else { String::new() },
                    u.unread_count.to_string(),
                ]
            })
            .collect()
    }

    fn prose(&self) -> String {
        if self.is_empty() {
            return "No unread channels.".into();
        }
        let mut table = table(["CHANNEL", "ID", "PRIVATE", "UNREAD"]);
        for u in self {
            table.add_row([
                format!("#{}", u.channel.name),
                u.channel.id.clone(),
                yes_no(u.channel.is_private).to_owned(),
                u.unread_count.to_string(),
            ]);
        }
        table.to_string()
    }
}

impl Render for [Message] {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|m| vec![m.ts.clone(), m.user.clone(), escape_plain(&m.text)])
            .collect()
    }

    fn prose(&self) -> String {
        if self.is_empty() {
            return "No messages.".into();
        }
        self.iter()
            .map(|m| {
                let thread = match m.reply_count {
                    Some(n) if n > 0 => format!(" [{n} replies]"),
                    _ => String::new(),
                };
                format!("[{}] {}: {}{thread}", format_ts(&m.ts), m.user, m.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Render for [User] {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|u| {
                vec![
                    u.id.clone(),
                    u.name.clone(),
                    u.real_name.clone(),
                    u.display_name.clone(),
                    u.email.clone().unwrap_or_default(),
                ]
            })
            .collect()
    }

    fn prose(&self) -> String {
        if self.is_empty() {
            return "No users found.".into();
        }
        let mut table = table(["ID", "NAME", "DISPLAY NAME", "EMAIL"]);
        for u in self {
            let display = if u.display_name.is_empty() {
                &u.real_name
            } else {
                &u.display_name
            };
            table.add_row([
                u.id.clone(),
                format!("@{}", u.name),
                display.clone(),
                u.email.clone().unwrap_or_default(),
            ]);
        }
        format!("{table}\n  {} user(s)", self.len())
    }
}

impl Render for UserProfile {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.id.clone(),
            self.name.clone(),
            self.real_name.clone(),
            self.display_name.clone(),
            self.email.clone(),
            self.title.clone(),
        ]]
    }

    fn prose(&self) -> String {
        let display = if self.display_name.is_empty() {
            &self.real_name
        } else {
            &self.display_name
        };
        let mut lines = vec![
            format!("User: {display} (@{})", self.name),
            format!("ID: {}", self.id),
        ];
        if !self.title.is_empty() {
            lines.push(format!("Title: {}", self.title));
        }
        if !self.email.is_empty() {
            lines.push(format!("Email: {}", self.email));
        }
        if !self.status_text.is_empty() {
            lines.push(format!("Status: {} {}", self.status_emoji, self.status_text));
        }
        lines.push(format!("Timezone: {}", self.tz));
        lines.join("\n")
    }
}

impl Render for SearchResult {
    fn plain_rows(&self) -> Vec<Vec<String>> {
        self.matches
            .iter()
            .map(|m| {
                vec![
                    m.ts.clone(),
                    m.channel_id.clone(),
                    m.channel.clone(),
                    m.user.clone(),
                    escape_plain(&m.text),
                    m.permalink.clone(),
                ]
            })
            .collect()
    }

    fn prose(&self) -> String {
        let summary = format!("Found {} results (page {})", self.total, self.page);
        if self.matches.is_empty() {
            return summary;
        }
        let mut table = table(["TIME", "CHANNEL", "USER", "TEXT"]);
        for m in &self.matches {
            table.add_row([
                format_ts(&m.ts),
                format!("#{}", m.channel),
                m.user.clone(),
                truncate(&m.text, 200),
            ]);
        }
        format!("{summary}\n{table}")
    }
}
