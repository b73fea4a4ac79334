//! `slamy mcp` -- serve Slack tools over MCP on stdio.
//!
//! Reads newline-delimited JSON-RPC requests from stdin and writes
//! responses to stdout. Nine tools are exposed, each backed by one
//! [`SlackClient`] operation:
//!
//! ```text
//! slack_list_channels        channels list
//! slack_get_channel_history  channels history
//! slack_get_thread_replies   channels replies
//! slack_post_message         messages post
//! slack_reply_to_thread      messages reply
//! slack_add_reaction         reactions add
//! slack_get_users            users list
//! slack_get_user_profile     users info
//! slack_search_messages      search
//! ```
//!
//! A failing tool (bad arguments, missing tokens, a Slack error) produces a
//! tool result with `isError: true`. The server keeps running; only I/O
//! errors on stdio end it.

use anyhow::{Context as _, anyhow};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use slamy_slack::SlackClient;
use slamy_slack::client::{
    DEFAULT_CHANNEL_LIMIT, DEFAULT_HISTORY_LIMIT, DEFAULT_REPLIES_LIMIT, SearchOptions,
};
use slamy_types::model::Message;

use super::Context;
use super::reactions::strip_colons;
use crate::output::format_ts;

// ── Constants ───────────────────────────────────────────────────────────

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "slamy";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON-RPC error codes.
const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const NOT_INITIALIZED: i32 = -32002;

/// Run the MCP server until stdin closes.
pub async fn run(ctx: &Context) -> anyhow::Result<()> {
    // Missing tokens surface per call, so clients can still list tools.
    let client = ctx.client().map_err(|e| format!("{e:#}"));
    if let Err(reason) = &client {
        debug!(%reason, "no Slack client, tool calls will fail");
    }

    let mut server = McpServer::new(client);
    info!(tools = tool_definitions().len(), "MCP server ready, reading from stdin");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    server.run(stdin, tokio::io::stdout()).await?;

    info!("stdin closed, MCP server shutting down");
    Ok(())
}

// ── Tool schema ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
struct ToolDefinition {
    name: &'static str,
    description: &'static str,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
    annotations: ToolAnnotations,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolAnnotations {
    read_only_hint: bool,
    destructive_hint: bool,
}

const READ_ONLY: ToolAnnotations = ToolAnnotations {
    read_only_hint: true,
    destructive_hint: false,
};

const WRITE: ToolAnnotations = ToolAnnotations {
    read_only_hint: false,
    destructive_hint: false,
};

fn tool(
    name: &'static str,
    description: &'static str,
    properties: Value,
    required: &[&str],
    annotations: ToolAnnotations,
) -> ToolDefinition {
    ToolDefinition {
        name,
        description,
        input_schema: json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }),
        annotations,
    }
}

fn tool_definitions() -> Vec<ToolDefinition> {
    let channel_id = json!({ "type": "string", "description": "The channel ID" });
    let thread_ts = json!({ "type": "string", "description": "Timestamp of the parent message" });

    vec![
        tool(
            "slack_list_channels",
            "List Slack channels in the workspace",
            json!({
                "limit": { "type": "number", "description": "Maximum number of channels (default 100)" },
                "include_archived": { "type": "boolean", "description": "Include archived channels" },
            }),
            &[],
            READ_ONLY,
        ),
        tool(
            "slack_get_channel_history",
            "Get message history from a Slack channel",
            json!({
                "channel_id": channel_id,
                "limit": { "type": "number", "description": "Maximum number of messages (default 20)" },
            }),
            &["channel_id"],
            READ_ONLY,
        ),
        tool(
            "slack_get_thread_replies",
            "Get replies in a message thread",
            json!({
                "channel_id": channel_id,
                "thread_ts": thread_ts,
                "limit": { "type": "number", "description": "Maximum number of replies (default 50)" },
            }),
            &["channel_id", "thread_ts"],
            READ_ONLY,
        ),
        tool(
            "slack_post_message",
            "Post a message to a Slack channel (long text continues in a thread)",
            json!({
                "channel_id": channel_id,
                "text": { "type": "string", "description": "Message text" },
            }),
            &["channel_id", "text"],
            WRITE,
        ),
        tool(
            "slack_reply_to_thread",
            "Reply to a message thread",
            json!({
                "channel_id": channel_id,
                "thread_ts": thread_ts,
                "text": { "type": "string", "description": "Reply text" },
            }),
            &["channel_id", "thread_ts", "text"],
            WRITE,
        ),
        tool(
            "slack_add_reaction",
            "Add a reaction emoji to a message",
            json!({
                "channel_id": channel_id,
                "timestamp": { "type": "string", "description": "Message timestamp" },
                "reaction": { "type": "string", "description": "Emoji name without colons" },
            }),
            &["channel_id", "timestamp", "reaction"],
            WRITE,
        ),
        tool(
            "slack_get_users",
            "List users in the Slack workspace",
            json!({
                "include_bots": { "type": "boolean", "description": "Include bot users" },
            }),
            &[],
            READ_ONLY,
        ),
        tool(
            "slack_get_user_profile",
            "Get a user's profile information",
            json!({
                "user_id": { "type": "string", "description": "The user ID" },
            }),
            &["user_id"],
            READ_ONLY,
        ),
        tool(
            "slack_search_messages",
            "Search messages in Slack (best with a user token)",
            json!({
                "query": { "type": "string", "description": "Search query. Supports Slack search modifiers like in:#channel, from:@user" },
                "count": { "type": "number", "description": "Number of results per page (default 20)" },
                "page": { "type": "number", "description": "Page number (default 1)" },
            }),
            &["query"],
            READ_ONLY,
        ),
    ]
}

// ── Tool results ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct CallToolResult {
    content: Vec<ContentBlock>,
    #[serde(rename = "isError")]
    is_error: bool,
}

impl CallToolResult {
    fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: true,
        }
    }
}

// ── Argument helpers ────────────────────────────────────────────────────

fn require_str<'a>(args: &'a Value, key: &str) -> anyhow::Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("required argument \"{key}\" not found"))
}

/// Numbers arrive as JSON numbers, sometimes as floats.
fn opt_u64(args: &Value, key: &str, default: u64) -> u64 {
    match args.get(key) {
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(default),
        None => default,
    }
}

fn opt_bool(args: &Value, key: &str) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Messages with a human-readable `time` next to the raw `ts`.
fn with_time(messages: Vec<Message>) -> anyhow::Result<Value> {
    let out = messages
        .into_iter()
        .map(|m| {
            let time = format_ts(&m.ts);
            let mut value = serde_json::to_value(m)?;
            if let Value::Object(map) = &mut value {
                map.insert("time".into(), Value::String(time));
            }
            Ok(value)
        })
        .collect::<serde_json::Result<Vec<_>>>()?;
    Ok(Value::Array(out))
}

// ── McpServer ───────────────────────────────────────────────────────────

/// Newline-delimited JSON-RPC server exposing the Slack tools.
///
/// Handles `initialize`, `notifications/initialized`, `tools/list` and
/// `tools/call`. Requests other than `initialize` that arrive before the
/// handshake get a `-32002` error.
struct McpServer {
    client: Result<SlackClient, String>,
    initialized: bool,
}

impl McpServer {
    fn new(client: Result<SlackClient, String>) -> Self {
        Self {
            client,
            initialized: false,
        }
    }

    async fn run<R, W>(&mut self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let msg: Value = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(_) => {
                    let resp = make_error_response(Value::Null, PARSE_ERROR, "Parse error");
                    write_response(&mut writer, &resp).await?;
                    continue;
                }
            };

            let method = msg.get("method").and_then(Value::as_str).unwrap_or("");
            let params = msg.get("params").cloned().unwrap_or_else(|| json!({}));
            // Notifications have no id and never get a response.
            let Some(id) = msg.get("id").cloned() else {
                if method == "notifications/initialized" {
                    self.initialized = true;
                }
                continue;
            };

            let resp = match method {
                "initialize" => {
                    self.initialized = true;
                    make_success_response(
                        id,
                        json!({
                            "protocolVersion": PROTOCOL_VERSION,
                            "capabilities": { "tools": { "listChanged": false } },
                            "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
                        }),
                    )
                }
                _ if !self.initialized => {
                    make_error_response(id, NOT_INITIALIZED, "Server not initialized")
                }
                "ping" => make_success_response(id, json!({})),
                "tools/list" => make_success_response(id, json!({ "tools": tool_definitions() })),
                "tools/call" => {
                    let name = params.get("name").and_then(Value::as_str).unwrap_or("");
                    let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
                    let result = self.call_tool(name, &args).await;
                    make_success_response(id, serde_json::to_value(&result).unwrap_or(Value::Null))
                }
                _ => make_error_response(
                    id,
                    METHOD_NOT_FOUND,
                    &format!("Method not found: {method}"),
                ),
            };
            write_response(&mut writer, &resp).await?;
        }

        Ok(())
    }

    async fn call_tool(&self, name: &str, args: &Value) -> CallToolResult {
        debug!(tool = name, "tool call");
        let client = match &self.client {
            Ok(client) => client,
            Err(reason) => return CallToolResult::error(reason.clone()),
        };

        let outcome = match name {
            "slack_list_channels" => list_channels(client, args).await,
            "slack_get_channel_history" => channel_history(client, args).await,
            "slack_get_thread_replies" => thread_replies(client, args).await,
            "slack_post_message" => post_message(client, args).await,
            "slack_reply_to_thread" => reply_to_thread(client, args).await,
            "slack_add_reaction" => add_reaction(client, args).await,
            "slack_get_users" => list_users(client, args).await,
            "slack_get_user_profile" => user_profile(client, args).await,
            "slack_search_messages" => search_messages(client, args).await,
            other => Err(anyhow!("unknown tool: {other}")),
        };

        match outcome.and_then(|v| serde_json::to_string_pretty(&v).map_err(Into::into)) {
            Ok(text) => CallToolResult::text(text),
            Err(e) => {
                debug!(tool = name, error = %format!("{e:#}"), "tool call failed");
                CallToolResult::error(format!("{e:#}"))
            }
        }
    }
}

// ── Tool handlers ───────────────────────────────────────────────────────

async fn list_channels(client: &SlackClient, args: &Value) -> anyhow::Result<Value> {
    let limit = opt_u64(args, "limit", DEFAULT_CHANNEL_LIMIT as u64) as usize;
    let channels = client
        .list_channels(limit, opt_bool(args, "include_archived"))
        .await
        .context("failed to list channels")?;
    Ok(serde_json::to_value(channels)?)
}

async fn channel_history(client: &SlackClient, args: &Value) -> anyhow::Result<Value> {
    let channel = require_str(args, "channel_id")?;
    let limit = opt_u64(args, "limit", DEFAULT_HISTORY_LIMIT as u64) as usize;
    let messages = client
        .channel_history(channel, limit)
        .await
        .context("failed to get history")?;
    with_time(messages)
}

async fn thread_replies(client: &SlackClient, args: &Value) -> anyhow::Result<Value> {
    let channel = require_str(args, "channel_id")?;
    let thread_ts = require_str(args, "thread_ts")?;
    let limit = opt_u64(args, "limit", DEFAULT_REPLIES_LIMIT as u64) as usize;
    let messages = client
        .thread_replies(channel, thread_ts, limit)
        .await
        .context("failed to get replies")?;
    with_time(messages)
}

async fn post_message(client: &SlackClient, args: &Value) -> anyhow::Result<Value> {
    let channel = require_str(args, "channel_id")?;
    let text = require_str(args, "text")?;
    let posted = client
        .post_message(channel, text)
        .await
        .context("failed to post message")?;
    Ok(json!({ "channel": posted.channel, "ts": posted.ts }))
}

async fn reply_to_thread(client: &SlackClient, args: &Value) -> anyhow::Result<Value> {
    let channel = require_str(args, "channel_id")?;
    let thread_ts = require_str(args, "thread_ts")?;
    let text = require_str(args, "text")?;
    let posted = client
        .reply_to_thread(channel, thread_ts, text)
        .await
        .context("failed to reply")?;
    Ok(json!({ "channel": posted.channel, "ts": posted.ts, "thread_ts": thread_ts }))
}

async fn add_reaction(client: &SlackClient, args: &Value) -> anyhow::Result<Value> {
    let channel = require_str(args, "channel_id")?;
    let ts = require_str(args, "timestamp")?;
    let reaction = strip_colons(require_str(args, "reaction")?);
    client
        .add_reaction(channel, ts, &reaction)
        .await
        .context("failed to add reaction")?;
    Ok(json!({ "channel": channel, "ts": ts, "reaction": reaction }))
}

async fn list_users(client: &SlackClient, args: &Value) -> anyhow::Result<Value> {
    let users = client
        .list_users(false, opt_bool(args, "include_bots"))
        .await
        .context("failed to list users")?;
    Ok(serde_json::to_value(users)?)
}

async fn user_profile(client: &SlackClient, args: &Value) -> anyhow::Result<Value> {
    let user = require_str(args, "user_id")?;
    let profile = client
        .user_profile(user)
        .await
        .context("failed to get user profile")?;
    Ok(serde_json::to_value(profile)?)
}

async fn search_messages(client: &SlackClient, args: &Value) -> anyhow::Result<Value> {
    let query = require_str(args, "query")?;
    let defaults = SearchOptions::default();
    let options = SearchOptions {
        count: opt_u64(args, "count", defaults.count.into()) as u32,
        page: opt_u64(args, "page", defaults.page.into()) as u32,
        ..defaults
    };
    let result = client
        .search_messages(query, &options)
        .await
        .context("search failed")?;
    Ok(serde_json::to_value(result)?)
}

// ── JSON-RPC framing ────────────────────────────────────────────────────

fn make_success_response(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn make_error_response(id: Value, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Value,
) -> std::io::Result<()> {
    let mut line = serde_json::to_string(response).map_err(std::io::Error::other)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}
