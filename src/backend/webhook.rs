//! HTTP client for webhook chat backends
//!
//! Backends accept a single-turn chat request and answer with a stream of
//! concatenated JSON values (one object per emitted payload, no framing
//! beyond JSON self-delimiting). The client decodes values incrementally as
//! response bytes arrive rather than buffering the full body.

use std::time::Duration;

use async_stream::try_stream;
use bytes::{Buf, BytesMut};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Payload kind carrying assistant output. Anything else (session markers,
/// tool traces) is dropped during decoding.
const ITEM_KIND: &str = "item";

/// Stream of decoded backend items produced by one chat call.
pub type WebhookItemStream = BoxStream<'static, Result<WebhookChatItem>>;

/// Request body understood by webhook chat endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookChatRequest {
    pub action: String,
    pub session_id: String,
    pub chat_input: String,
}

impl WebhookChatRequest {
    /// Build a `sendMessage` request for one user turn.
    pub fn send_message(session_id: impl Into<String>, chat_input: impl Into<String>) -> Self {
        Self {
            action: "sendMessage".to_string(),
            session_id: session_id.into(),
            chat_input: chat_input.into(),
        }
    }
}

/// One JSON value from a webhook response stream.
///
/// Unknown fields are ignored and missing ones default to empty, mirroring
/// how loosely the backends fill these in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookChatItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Client for forwarding chat turns to webhook backends.
#[derive(Debug, Clone)]
pub struct WebhookChatClient {
    http: reqwest::Client,
}

impl WebhookChatClient {
    /// Create a client with the given total request timeout.
    ///
    /// The timeout covers the whole exchange including the streamed body, so
    /// a backend that stalls mid-response still terminates the request.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }

    /// POST a chat turn and stream back the decoded payload items.
    ///
    /// A non-2xx status is reported as a backend error before any item is
    /// produced. After that, items are yielded as they decode; transport or
    /// decode failures terminate the stream with an error.
    pub async fn send_chat(
        &self,
        url: &str,
        request: &WebhookChatRequest,
    ) -> Result<WebhookItemStream> {
        let response = self.http.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!(
                "webhook returned {}: {}",
                status,
                body.trim()
            )));
        }

        let mut body = response.bytes_stream();
        let items = try_stream! {
            let mut buf = BytesMut::new();
            while let Some(chunk) = body.next().await {
                buf.extend_from_slice(&chunk?);
                for item in drain_items(&mut buf)? {
                    if let Some(item) = resolve_item(item) {
                        yield item;
                    }
                }
            }
            // Anything left now is a value the backend never finished.
            if !buf.iter().all(u8::is_ascii_whitespace) {
                let tail: WebhookChatItem = serde_json::from_slice(&buf)?;
                if let Some(item) = resolve_item(tail) {
                    yield item;
                }
            }
        };
        Ok(items.boxed())
    }
}

/// Decode every complete JSON value at the front of `buf`, leaving any
/// partial trailing value in place for the next chunk to complete.
fn drain_items(
    buf: &mut BytesMut,
) -> std::result::Result<Vec<WebhookChatItem>, serde_json::Error> {
    let mut items = Vec::new();
    let mut consumed = 0;
    {
        let mut values = serde_json::Deserializer::from_slice(&buf[..])
            .into_iter::<WebhookChatItem>();
        loop {
            match values.next() {
                Some(Ok(item)) => {
                    consumed = values.byte_offset();
                    items.push(item);
                }
                Some(Err(err)) if err.is_eof() => break,
                Some(Err(err)) => return Err(err),
                None => break,
            }
        }
    }
    buf.advance(consumed);
    Ok(items)
}

/// Keep `item` if it carries assistant output, unwrapping one level of
/// nesting for backends that serialize the payload as a JSON string inside
/// `content`. Non-JSON content passes through untouched.
fn resolve_item(item: WebhookChatItem) -> Option<WebhookChatItem> {
    if item.kind != ITEM_KIND {
        return None;
    }
    match serde_json::from_str::<WebhookChatItem>(&item.content) {
        Ok(inner) => Some(inner),
        Err(_) => Some(item),
    }
}
