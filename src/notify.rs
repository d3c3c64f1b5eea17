//! Delivering reports to the chat channel

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::chunk::chunk;
use crate::config::DeliveryConfig;
use crate::error::{Error, Result};

/// Somewhere pre-formatted text messages can be sent
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send one message; callers keep it within the platform's size limit
    async fn send(&self, text: &str) -> Result<()>;
}

/// Send `text`, split into chunks if it exceeds `max_length` characters.
///
/// Stops at the first failed chunk.
pub async fn deliver(sink: &dyn MessageSink, text: &str, max_length: usize) -> Result<usize> {
    if text.chars().count() <= max_length {
        sink.send(text).await?;
        return Ok(1);
    }

    let chunks = chunk(text, max_length);
    debug!("Delivering report in {} chunks", chunks.len());
    for piece in &chunks {
        sink.send(piece).await?;
    }
    Ok(chunks.len())
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts messages to a chat webhook as `{"content": "..."}`
pub struct WebhookSink {
    http_client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()?;
        Ok(Self {
            http_client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MessageSink for WebhookSink {
    async fn send(&self, text: &str) -> Result<()> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&WebhookMessage { content: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::other(format!(
                "Webhook returned HTTP {}",
                status.as_u16()
            )));
        }
        Ok(())
    }
}

/// Prints messages to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[async_trait]
impl MessageSink for StdoutSink {
    async fn send(&self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }
}

/// The configured sink: the webhook if one is set, stdout otherwise
pub fn sink_from_config(config: &DeliveryConfig) -> Result<Box<dyn MessageSink>> {
    match config.webhook_url.as_deref() {
        Some(url) if !url.trim().is_empty() => Ok(Box::new(WebhookSink::new(url)?)),
        _ => Ok(Box::new(StdoutSink)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Collects everything sent to it
    #[derive(Default)]
    pub struct RecordingSink {
        pub messages: Mutex<Vec<String>>,
        pub fail: bool,
    }

    impl RecordingSink {
        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn send(&self, text: &str) -> Result<()> {
            if self.fail {
                return Err(Error::other("sink offline"));
            }
            self.messages.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_short_message_sent_whole() {
        let sink = RecordingSink::default();
        let sent = deliver(&sink, "1. A by B - Played 1 times\n", 2000).await.unwrap();
        assert_eq!(sent, 1);
        assert_eq!(sink.messages(), vec!["1. A by B - Played 1 times\n"]);
    }

    #[tokio::test]
    async fn test_long_message_is_chunked() {
        let sink = RecordingSink::default();
        let text = "1. Some Song by Some Artist - Played 12 times\n".repeat(100);

        let sent = deliver(&sink, &text, 2000).await.unwrap();
        let messages = sink.messages();
        assert_eq!(sent, messages.len());
        assert!(sent > 1);
        assert!(messages.iter().all(|m| m.chars().count() <= 2000));
        assert_eq!(messages.concat(), text);
    }

    #[tokio::test]
    async fn test_failed_send_is_reported() {
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        assert!(deliver(&sink, "hello", 2000).await.is_err());
    }

    #[test]
    fn test_sink_from_config_without_webhook() {
        assert!(sink_from_config(&DeliveryConfig::default()).is_ok());
    }
}
