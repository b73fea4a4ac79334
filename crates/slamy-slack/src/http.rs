//! Slack Web API binding over HTTP.
//!
//! [`HttpSlackApi`] implements [`SlackApi`] with `reqwest`. Writes send
//! JSON bodies, reads send form-encoded parameters, and every request
//! carries the resolved credential as a bearer token.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use slamy_types::config::{Config, DEFAULT_API_BASE_URL};
use slamy_types::{Credential, Result, SlackError};

use crate::api::{
    ConversationInfoArgs, DeleteMessageArgs, HistoryArgs, PostMessageArgs, ReactionArgs,
    RepliesArgs, SearchArgs, SlackApi, UpdateMessageArgs, UploadFileArgs, UsersConversationsArgs,
    UsersInfoArgs, UsersListArgs,
};
use crate::types::{
    AuthTestResponse, ChatPostMessageResponse, ConnectionsOpenResponse, ConversationInfoResponse,
    ConversationsPage, Empty, HistoryResponse, SearchResponse, SlackResponse, UploadUrlResponse,
    UsersInfoResponse, UsersPage,
};

/// Error label for the raw byte POST between the two upload API calls.
const FILE_UPLOAD: &str = "file upload";

/// HTTP client for the Slack Web API.
///
/// The underlying [`reqwest::Client`] is shared across calls; cloning an
/// `HttpSlackApi` is cheap.
#[derive(Debug, Clone)]
pub struct HttpSlackApi {
    http: Client,
    base_url: String,
}

impl Default for HttpSlackApi {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpSlackApi {
    /// Create a client for the public Slack API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_BASE_URL)
    }

    /// Create a client pointing at a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Create a client using the configured base URL.
    pub fn from_config(config: &Config) -> Self {
        if config.api_base_url.trim().is_empty() {
            Self::new()
        } else {
            Self::with_base_url(config.api_base_url.trim())
        }
    }

    /// Return the base URL used for API requests.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Call `apps.connections.open` to obtain a Socket Mode WebSocket URL.
    ///
    /// Requires the app-level token (`xapp-...`).
    pub async fn apps_connections_open(&self, app_token: &Credential) -> Result<String> {
        const METHOD: &str = "apps.connections.open";
        debug!("calling {METHOD}");

        let resp = self
            .http
            .post(self.url(METHOD))
            .header("Authorization", format!("Bearer {}", app_token.expose()))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send()
            .await
            .map_err(|e| SlackError::upstream(METHOD, e.to_string()))?;

        let body: ConnectionsOpenResponse = read_body(METHOD, resp).await?;
        body.url
            .ok_or_else(|| SlackError::upstream(METHOD, "response contained no URL"))
    }

    /// POST a JSON body (write methods).
    async fn call_json<A, T>(&self, method: &str, token: &Credential, args: &A) -> Result<T>
    where
        A: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        debug!(method, "calling Slack API");
        let resp = self
            .http
            .post(self.url(method))
            .header("Authorization", format!("Bearer {}", token.expose()))
            .header("Content-Type", "application/json; charset=utf-8")
            .json(args)
            .send()
            .await
            .map_err(|e| SlackError::upstream(method, e.to_string()))?;
        read_body(method, resp).await
    }

    /// POST raw file bytes to the URL handed out by
    /// `files.getUploadURLExternal`.
    async fn send_file_contents(&self, upload_url: &str, content: Vec<u8>) -> Result<()> {
        let resp = self
            .http
            .post(upload_url)
            .body(content)
            .send()
            .await
            .map_err(|e| SlackError::upstream(FILE_UPLOAD, e.to_string()))?;
        if !resp.status().is_success() {
            return Err(SlackError::upstream(
                FILE_UPLOAD,
                format!("upload rejected with HTTP {}", resp.status()),
            ));
        }
        Ok(())
    }

    /// POST form-encoded parameters (read methods).
    async fn call_form<A, T>(&self, method: &str, token: &Credential, args: &A) -> Result<T>
    where
        A: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        debug!(method, "calling Slack API");
        let resp = self
            .http
            .post(self.url(method))
            .header("Authorization", format!("Bearer {}", token.expose()))
            .form(args)
            .send()
            .await
            .map_err(|e| SlackError::upstream(method, e.to_string()))?;
        read_body(method, resp).await
    }
}

/// Decode a Slack response and turn `ok: false` into an upstream error.
async fn read_body<T>(method: &str, resp: reqwest::Response) -> Result<T>
where
    T: DeserializeOwned + Send,
{
    let status = resp.status();
    let body: SlackResponse<T> = resp.json().await.map_err(|e| {
        SlackError::upstream(method, format!("invalid response (HTTP {status}): {e}"))
    })?;
    check(method, body)
}

fn check<T>(method: &str, body: SlackResponse<T>) -> Result<T> {
    if body.ok {
        Ok(body.data)
    } else {
        let message = body.error.unwrap_or_else(|| "unknown error".into());
        debug!(method, error = %message, "Slack API returned an error");
        Err(SlackError::upstream(method, message))
    }
}

#[derive(Serialize)]
struct UploadUrlArgs<'a> {
    filename: &'a str,
    length: usize,
}

#[derive(Serialize)]
struct CompletedFile<'a> {
    id: &'a str,
    title: &'a str,
}

#[derive(Serialize)]
struct CompleteUploadArgs<'a> {
    /// JSON-encoded list of [`CompletedFile`].
    files: String,
    channel_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

#[async_trait]
impl SlackApi for HttpSlackApi {
    async fn auth_test(&self, token: &Credential) -> Result<AuthTestResponse> {
        self.call_form("auth.test", token, &[] as &[(&str, &str)]).await
    }

    async fn post_message(
        &self,
        token: &Credential,
        args: &PostMessageArgs,
    ) -> Result<ChatPostMessageResponse> {
        debug!(channel = %args.channel, thread = ?args.thread_ts, "posting message");
        self.call_json("chat.postMessage", token, args).await
    }

    async fn update_message(&self, token: &Credential, args: &UpdateMessageArgs) -> Result<()> {
        debug!(channel = %args.channel, ts = %args.ts, "updating message");
        self.call_json::<_, Empty>("chat.update", token, args).await?;
        Ok(())
    }

    async fn delete_message(&self, token: &Credential, args: &DeleteMessageArgs) -> Result<()> {
        self.call_json::<_, Empty>("chat.delete", token, args).await?;
        Ok(())
    }

    async fn add_reaction(&self, token: &Credential, args: &ReactionArgs) -> Result<()> {
        self.call_json::<_, Empty>("reactions.add", token, args).await?;
        Ok(())
    }

    async fn remove_reaction(&self, token: &Credential, args: &ReactionArgs) -> Result<()> {
        self.call_json::<_, Empty>("reactions.remove", token, args).await?;
        Ok(())
    }

    async fn upload_file(&self, token: &Credential, args: &UploadFileArgs) -> Result<()> {
        const GET_URL: &str = "files.getUploadURLExternal";
        const COMPLETE: &str = "files.completeUploadExternal";

        let ticket: UploadUrlResponse = self
            .call_form(
                GET_URL,
                token,
                &UploadUrlArgs {
                    filename: &args.filename,
                    length: args.content.len(),
                },
            )
            .await?;
        let (Some(upload_url), Some(file_id)) = (ticket.upload_url, ticket.file_id) else {
            return Err(SlackError::upstream(GET_URL, "response missing upload_url or file_id"));
        };

        debug!(file_id = %file_id, bytes = args.content.len(), "uploading file contents");
        self.send_file_contents(&upload_url, args.content.clone()).await?;

        let files = serde_json::to_string(&[CompletedFile {
            id: &file_id,
            title: &args.title,
        }])
        .map_err(|e| SlackError::upstream(COMPLETE, e.to_string()))?;
        let complete = CompleteUploadArgs {
            files,
            channel_id: &args.channel_id,
            thread_ts: args.thread_ts.as_deref(),
        };
        self.call_form::<_, Empty>(COMPLETE, token, &complete).await?;
        Ok(())
    }

    async fn users_conversations(
        &self,
        token: &Credential,
        args: &UsersConversationsArgs,
    ) -> Result<ConversationsPage> {
        self.call_form("users.conversations", token, args).await
    }

    async fn conversation_info(
        &self,
        token: &Credential,
        args: &ConversationInfoArgs,
    ) -> Result<ConversationInfoResponse> {
        self.call_form("conversations.info", token, args).await
    }

    async fn conversation_history(
        &self,
        token: &Credential,
        args: &HistoryArgs,
    ) -> Result<HistoryResponse> {
        self.call_form("conversations.history", token, args).await
    }

    async fn conversation_replies(
        &self,
        token: &Credential,
        args: &RepliesArgs,
    ) -> Result<HistoryResponse> {
        self.call_form("conversations.replies", token, args).await
    }

    async fn users_list(&self, token: &Credential, args: &UsersListArgs) -> Result<UsersPage> {
        self.call_form("users.list", token, args).await
    }

    async fn users_info(
        &self,
        token: &Credential,
        args: &UsersInfoArgs,
    ) -> Result<UsersInfoResponse> {
        self.call_form("users.info", token, args).await
    }

    async fn search_messages(
        &self,
        token: &Credential,
        args: &SearchArgs,
    ) -> Result<SearchResponse> {
        self.call_form("search.messages", token, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url() {
        let api = HttpSlackApi::new();
        assert_eq!(api.base_url(), "https://slack.com/api");
    }

    #[test]
    fn custom_base_url_strips_trailing_slash() {
        let api = HttpSlackApi::with_base_url("http://localhost:9999/");
        assert_eq!(api.base_url(), "http://localhost:9999");
        assert_eq!(api.url("chat.postMessage"), "http://localhost:9999/chat.postMessage");
    }

    #[test]
    fn from_config_blank_url_uses_default() {
        let config = Config {
            api_base_url: "  ".into(),
            ..Config::default()
        };
        assert_eq!(HttpSlackApi::from_config(&config).base_url(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn check_maps_error_code_verbatim() {
        let body: SlackResponse<Empty> =
            serde_json::from_str(r#"{"ok": false, "error": "not_in_channel"}"#).unwrap();
        let err = check("chat.postMessage", body).unwrap_err();
        assert_eq!(err.to_string(), "chat.postMessage failed: not_in_channel");
    }

    #[test]
    fn check_without_error_field() {
        let body: SlackResponse<Empty> = serde_json::from_str(r#"{"ok": false}"#).unwrap();
        let err = check("auth.test", body).unwrap_err();
        assert!(err.to_string().contains("unknown error"));
    }

    #[test]
    fn check_passes_data_through() {
        let body: SlackResponse<ChatPostMessageResponse> =
            serde_json::from_str(r#"{"ok": true, "ts": "1.2"}"#).unwrap();
        assert_eq!(check("chat.postMessage", body).unwrap().ts.as_deref(), Some("1.2"));
    }

    #[test]
    fn complete_upload_args_encode_files_as_json_string() {
        let files = serde_json::to_string(&[CompletedFile {
            id: "F1",
            title: "report",
        }])
        .unwrap();
        let args = CompleteUploadArgs {
            files,
            channel_id: "C1",
            thread_ts: None,
        };
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json["files"], r#"[{"id":"F1","title":"report"}]"#);
        assert!(json.get("thread_ts").is_none());
    }

    fn local_api() -> HttpSlackApi {
        HttpSlackApi {
            http: Client::builder().no_proxy().build().unwrap(),
            base_url: DEFAULT_API_BASE_URL.into(),
        }
    }

    /// Serve one connection: read the request up to its `payload` body,
    /// then answer with `status_line`.
    async fn one_shot_server(status_line: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.ends_with(b"payload") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response =
                format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/upload/F1")
    }

    #[tokio::test]
    async fn rejected_file_contents_name_the_upload_step() {
        let url = one_shot_server("HTTP/1.1 500 Internal Server Error").await;
        let err = local_api()
            .send_file_contents(&url, b"payload".to_vec())
            .await
            .unwrap_err();

        match err {
            SlackError::Upstream { method, message } => {
                assert_eq!(method, "file upload");
                assert!(message.contains("500"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn accepted_file_contents() {
        let url = one_shot_server("HTTP/1.1 200 OK").await;
        local_api()
            .send_file_contents(&url, b"payload".to_vec())
            .await
            .unwrap();
    }
}
