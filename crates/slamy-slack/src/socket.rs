//! Socket Mode event subscription.
//!
//! [`EventSubscriber`] keeps a dispatch table from event type to handlers.
//! [`EventSubscriber::run`] opens a Socket Mode connection with the
//! app-level token, acknowledges every envelope, and invokes the handlers
//! registered for the event's type in registration order. Connection
//! failures are retried after [`RECONNECT_DELAY_SECS`] until the
//! cancellation token fires.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use slamy_types::config::Config;
use slamy_types::{Credential, Result, SlackError, TokenKind};

use crate::events::{ControlFrame, SlackAcknowledge, SlackEnvelope, SlackEvent};
use crate::http::HttpSlackApi;

/// Delay before retrying after a WebSocket connection failure.
pub const RECONNECT_DELAY_SECS: u64 = 5;

/// A callback invoked for each matching event.
pub type EventHandler = Arc<dyn Fn(&SlackEvent) + Send + Sync>;

/// What the connection loop should do after a frame.
#[derive(Debug)]
pub enum FrameOutcome {
    /// Send this acknowledgement back.
    Acknowledge(SlackAcknowledge),
    /// Slack asked us to reconnect.
    Reconnect,
    /// Nothing to do.
    Ignore,
}

/// Receives Slack events over Socket Mode and fans them out to handlers.
pub struct EventSubscriber {
    api: HttpSlackApi,
    app_token: Credential,
    handlers: HashMap<String, Vec<EventHandler>>,
}

impl fmt::Debug for EventSubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("EventSubscriber")
            .field("api", &self.api)
            .field("app_token", &self.app_token)
            .field("kinds", &kinds)
            .finish()
    }
}

impl EventSubscriber {
    /// Create a subscriber from configuration.
    ///
    /// Fails with [`SlackError::Configuration`] when no app-level token is
    /// configured.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_api(HttpSlackApi::from_config(config), config.app_token.clone())
    }

    /// Create a subscriber over a specific HTTP client.
    pub fn with_api(api: HttpSlackApi, app_token: Credential) -> Result<Self> {
        if app_token.is_empty() {
            return Err(SlackError::Configuration(
                "an app-level token (xapp-...) is required to receive events".into(),
            ));
        }
        if matches!(app_token.kind(), TokenKind::Bot | TokenKind::User) {
            warn!(
                kind = %app_token.kind(),
                "Socket Mode needs an app-level token (xapp-...), connecting will likely fail"
            );
        }
        Ok(Self {
            api,
            app_token,
            handlers: HashMap::new(),
        })
    }

    /// Register `handler` for events whose `type` equals `kind`.
    pub fn subscribe<F>(&mut self, kind: impl Into<String>, handler: F)
    where
        F: Fn(&SlackEvent) + Send + Sync + 'static,
    {
        self.handlers
            .entry(kind.into())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: &str) -> usize {
        self.handlers.get(kind).map_or(0, Vec::len)
    }

    /// Invoke the handlers for `event`. Returns how many ran.
    pub fn dispatch(&self, event: &SlackEvent) -> usize {
        let Some(handlers) = self.handlers.get(&event.event_type) else {
            debug!(event_type = %event.event_type, "no handler for event");
            return 0;
        };
        for handler in handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Process one text frame received from the socket.
    pub fn handle_frame(&self, text: &str) -> FrameOutcome {
        if let Ok(envelope) = serde_json::from_str::<SlackEnvelope>(text) {
            if let Some(event) = envelope.event() {
                self.dispatch(event);
            } else {
                debug!(
                    envelope_type = %envelope.envelope_type,
                    "envelope carries no event"
                );
            }
            return FrameOutcome::Acknowledge(SlackAcknowledge::for_envelope(&envelope));
        }

        match serde_json::from_str::<ControlFrame>(text) {
            Ok(ControlFrame::Hello { num_connections }) => {
                debug!(?num_connections, "Socket Mode hello");
                FrameOutcome::Ignore
            }
            Ok(ControlFrame::Disconnect { reason }) => {
                info!(?reason, "Slack requested reconnect");
                FrameOutcome::Reconnect
            }
            Err(_) => {
                debug!(raw = %text, "received unrecognized frame");
                FrameOutcome::Ignore
            }
        }
    }

    /// Receive events until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        info!(kinds = self.handlers.len(), "starting Socket Mode subscriber");

        loop {
            let ws_url = match self.api.apps_connections_open(&self.app_token).await {
                Ok(url) => url,
                Err(e) => {
                    error!(error = %e, "failed to obtain Slack WebSocket URL");
                    if wait_or_cancel(&cancel).await {
                        break;
                    }
                    continue;
                }
            };

            let ws_stream = match tokio_tungstenite::connect_async(&ws_url).await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    error!(error = %e, "failed to connect Slack WebSocket");
                    if wait_or_cancel(&cancel).await {
                        break;
                    }
                    continue;
                }
            };

            info!("Slack WebSocket connected");
            let (mut ws_write, mut ws_read) = ws_stream.split();
            let mut refresh = false;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        let _ = ws_write.close().await;
                        info!("Socket Mode subscriber stopped");
                        return Ok(());
                    }
                    msg = ws_read.next() => match msg {
                        Some(Ok(WsMessage::Text(text))) => match self.handle_frame(&text) {
                            FrameOutcome::Acknowledge(ack) => {
                                match serde_json::to_string(&ack) {
                                    Ok(json) => {
                                        if let Err(e) = ws_write.send(WsMessage::Text(json)).await {
                                            warn!(error = %e, "failed to send acknowledge");
                                        }
                                    }
                                    Err(e) => warn!(error = %e, "failed to encode acknowledge"),
                                }
                            }
                            FrameOutcome::Reconnect => {
                                refresh = true;
                                break;
                            }
                            FrameOutcome::Ignore => {}
                        },
                        Some(Ok(WsMessage::Ping(data))) => {
                            let _ = ws_write.send(WsMessage::Pong(data)).await;
                        }
                        Some(Ok(WsMessage::Close(_))) => {
                            info!("Slack WebSocket closed by server");
                            break;
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Slack WebSocket error");
                            break;
                        }
                        None => {
                            info!("Slack WebSocket stream ended");
                            break;
                        }
                        _ => {}
                    }
                }
            }

            if refresh {
                let _ = ws_write.close().await;
                continue;
            }
            if wait_or_cancel(&cancel).await {
                break;
            }
            info!("reconnecting Slack WebSocket");
        }

        info!("Socket Mode subscriber stopped");
        Ok(())
    }
}

/// Sleep for the reconnect delay. Returns `true` if cancelled meanwhile.
async fn wait_or_cancel(cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECS)) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn subscriber() -> EventSubscriber {
        EventSubscriber::with_api(
            HttpSlackApi::with_base_url("http://localhost:1"),
            Credential::new("xapp-test"),
        )
        .unwrap()
    }

    fn event(kind: &str, text: &str) -> SlackEvent {
        SlackEvent {
            event_type: kind.into(),
            subtype: None,
            channel: Some("C1".into()),
            user: Some("U1".into()),
            text: Some(text.into()),
            ts: Some("1.000001".into()),
            thread_ts: None,
            bot_id: None,
            channel_type: None,
        }
    }

    #[test]
    fn requires_app_token() {
        let err = EventSubscriber::with_api(HttpSlackApi::new(), Credential::default()).unwrap_err();
        assert!(matches!(err, SlackError::Configuration(_)));
    }

    #[test]
    fn new_reads_app_token_from_config() {
        let config = Config {
            app_token: Credential::new("xapp-1"),
            ..Config::default()
        };
        assert!(EventSubscriber::new(&config).is_ok());
        assert!(EventSubscriber::new(&Config::default()).is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let debug = format!("{:?}", subscriber());
        assert!(!debug.contains("xapp-test"));
        assert!(debug.contains("xapp-[REDACTED]"));
    }

    #[test]
    fn bot_token_for_events_is_accepted_with_warning() {
        let sub = EventSubscriber::with_api(HttpSlackApi::new(), Credential::new("xoxb-1"));
        assert!(sub.is_ok());
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut sub = subscriber();
        for tag in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            sub.subscribe("message", move |e: &SlackEvent| {
                seen.lock()
                    .unwrap()
                    .push(format!("{tag}:{}", e.text.as_deref().unwrap_or("")));
            });
        }

        assert_eq!(sub.dispatch(&event("message", "hi")), 3);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:hi", "second:hi", "third:hi"]
        );
    }

    #[test]
    fn dispatch_filters_by_kind() {
        let mentions = Arc::new(Mutex::new(0usize));
        let mut sub = subscriber();
        {
            let mentions = Arc::clone(&mentions);
            sub.subscribe("app_mention", move |_| *mentions.lock().unwrap() += 1);
        }

        assert_eq!(sub.dispatch(&event("message", "plain")), 0);
        assert_eq!(sub.dispatch(&event("app_mention", "<@U0> hey")), 1);
        assert_eq!(*mentions.lock().unwrap(), 1);
        assert_eq!(sub.handler_count("app_mention"), 1);
        assert_eq!(sub.handler_count("message"), 0);
    }

    #[test]
    fn envelope_frame_is_acknowledged_and_dispatched() {
        let texts = Arc::new(Mutex::new(Vec::new()));
        let mut sub = subscriber();
        {
            let texts = Arc::clone(&texts);
            sub.subscribe("message", move |e| {
                texts.lock().unwrap().push(e.text.clone().unwrap_or_default());
            });
        }

        let frame = r#"{
            "type": "events_api",
            "envelope_id": "env-42",
            "payload": {"type": "event_callback",
                        "event": {"type": "message", "channel": "C1", "text": "deploy done"}}
        }"#;
        match sub.handle_frame(frame) {
            FrameOutcome::Acknowledge(ack) => assert_eq!(ack.envelope_id, "env-42"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(*texts.lock().unwrap(), vec!["deploy done"]);
    }

    #[test]
    fn non_event_envelope_is_still_acknowledged() {
        let sub = subscriber();
        let frame = r#"{"type": "interactive", "envelope_id": "env-7", "payload": {}}"#;
        assert!(matches!(sub.handle_frame(frame), FrameOutcome::Acknowledge(_)));
    }

    #[test]
    fn control_frames() {
        let sub = subscriber();
        assert!(matches!(
            sub.handle_frame(r#"{"type": "hello", "num_connections": 1}"#),
            FrameOutcome::Ignore
        ));
        assert!(matches!(
            sub.handle_frame(r#"{"type": "disconnect", "reason": "refresh_requested"}"#),
            FrameOutcome::Reconnect
        ));
        assert!(matches!(sub.handle_frame("not json"), FrameOutcome::Ignore));
    }

    #[tokio::test]
    async fn run_returns_when_cancelled() {
        let sub = subscriber();
        let cancel = CancellationToken::new();
        cancel.cancel();
        sub.run(cancel).await.unwrap();
    }
}
