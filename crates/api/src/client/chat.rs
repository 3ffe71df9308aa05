//! Direct messaging client methods

use super::error::ClientError;
use super::request::ApiRequest;
use super::{ApiClient, error_from_response, segment};
use crate::types::{ChatMessage, Conversation, OutgoingMessage};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::header;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt::Display;
use tracing::debug;

impl ApiClient {
    pub async fn send_message(&self, message: &OutgoingMessage) -> Result<ChatMessage, ClientError> {
        self.execute(ApiRequest::post("/chat/messages").json(message)?)
            .await
    }

    /// Message history with one user
    pub async fn conversation(&self, user_id: impl Display) -> Result<Vec<ChatMessage>, ClientError> {
        self.execute(ApiRequest::get(format!("/chat/with/{}", segment(user_id))))
            .await
    }

    /// Everyone the logged-in user has chatted with
    pub async fn conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        self.execute(ApiRequest::get("/chat/conversations")).await
    }

    /// Mark messages from a user as read
    pub async fn mark_conversation_read(&self, user_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::patch(format!(
            "/chat/with/{}/read",
            segment(user_id)
        )))
        .await
    }

    /// Live feed of incoming messages from the server-sent event endpoint
    ///
    /// Connecting follows the same authorization rules as any other call.
    /// Events whose payload is not a message are skipped.
    pub async fn message_stream(
        &self,
    ) -> Result<BoxStream<'static, Result<ChatMessage, ClientError>>, ClientError> {
        let request = ApiRequest::get("/chat/stream");
        let response = self
            .send_authorized(&request, |builder| {
                builder.header(header::ACCEPT, "text/event-stream")
            })
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(decode_messages(response.bytes_stream()))
    }
}

/// Incremental parser for `text/event-stream` bodies
///
/// Only `data:` fields are kept; multi-line data is joined with `\n`.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Consume a chunk and return the payloads of every event it completed
    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(|c| c == '\n' || c == '\r');

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data
                    .push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
        }
        events
    }
}

fn decode_messages<S, B>(bytes: S) -> BoxStream<'static, Result<ChatMessage, ClientError>>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = (Box::pin(bytes), SseDecoder::default(), VecDeque::<String>::new());
    stream::unfold(state, |(mut bytes, mut decoder, mut pending)| async move {
        loop {
            if let Some(data) = pending.pop_front() {
                match serde_json::from_str::<ChatMessage>(&data) {
                    Ok(message) => return Some((Ok(message), (bytes, decoder, pending))),
                    Err(e) => {
                        debug!("Skipping non-message event: {e}");
                        continue;
                    }
                }
            }

            match bytes.next().await {
                Some(Ok(chunk)) => pending.extend(decoder.feed(chunk.as_ref())),
                Some(Err(e)) => {
                    return Some((Err(ClientError::from(e)), (bytes, decoder, pending)));
                }
                None => return None,
            }
        }
    })
    .boxed()
}
