//! AI drafting: turn a prompt into streamed draft text.
//!
//! The model boundary is [`DraftModel`]: prompt in, chunk stream out.
//! [`DraftEngine`] sits above it and tracks a generation counter per
//! (standup, entry, direction) slot. Starting a generation bumps the slot's
//! counter; a generation whose token is no longer current reports itself
//! superseded and its text is never committed. Partial output reaches the
//! caller only through the chunk callback — a draft field is populated
//! solely from a completed generation, and a stream error commits nothing.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Direction;

/// Errors from draft generation.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model stream ended without content")]
    Empty,
}

/// One draftable slot: a standup entry's section in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub standup_id: Uuid,
    pub entry_id: Uuid,
    pub direction: Direction,
}

/// How a generation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
    /// The stream completed; the text may be committed as the draft.
    Completed(String),

    /// A newer generation for the same slot started first; discard.
    Superseded,
}

/// A drafting model: prompt in, chunk stream out.
///
/// The stream yields incremental text pieces and ends on completion; an
/// `Err` item terminates it.
#[async_trait]
pub trait DraftModel: Send + Sync {
    async fn draft(
        &self,
        prompt: &str,
    ) -> Result<BoxStream<'static, Result<String, DraftError>>, DraftError>;
}

/// Runs generations against a model, guarding each slot against stale
/// writes with a generation counter.
pub struct DraftEngine<M> {
    model: M,
    generations: Mutex<HashMap<DraftKey, u64>>,
}

impl<M: DraftModel> DraftEngine<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            generations: Mutex::new(HashMap::new()),
        }
    }

    /// Streams one draft for a slot.
    ///
    /// Each chunk is passed to `on_chunk` as it arrives. The accumulated
    /// text is returned only when the stream completes and this generation
    /// is still the slot's newest; otherwise the outcome is
    /// [`DraftOutcome::Superseded`] and the text must not be stored.
    pub async fn generate(
        &self,
        key: DraftKey,
        prompt: &str,
        mut on_chunk: impl FnMut(&str) + Send,
    ) -> Result<DraftOutcome, DraftError> {
        let token = self.bump(key);
        let mut stream = self.model.draft(prompt).await?;

        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if self.current(key) != token {
                return Ok(DraftOutcome::Superseded);
            }
            on_chunk(&chunk);
            text.push_str(&chunk);
        }

        if self.current(key) != token {
            return Ok(DraftOutcome::Superseded);
        }
        if text.is_empty() {
            return Err(DraftError::Empty);
        }
        Ok(DraftOutcome::Completed(text))
    }

    fn bump(&self, key: DraftKey) -> u64 {
        let mut generations = self.generations.lock();
        let counter = generations.entry(key).or_insert(0);
        *counter += 1;
        *counter
    }

    fn current(&self, key: DraftKey) -> u64 {
        self.generations.lock().get(&key).copied().unwrap_or(0)
    }
}

// ── OpenAI-compatible model ──

/// An OpenAI-compatible `chat/completions` endpoint, streamed over SSE.
pub struct OpenAiModel {
    client: reqwest::Client,
    host: String,
    model: String,
    api_key: String,
}

impl OpenAiModel {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl DraftModel for OpenAiModel {
    async fn draft(
        &self,
        prompt: &str,
    ) -> Result<BoxStream<'static, Result<String, DraftError>>, DraftError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
        };

        let response = self
            .client
            .post(format!(
                "{}/v1/chat/completions",
                self.host.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DraftError::Api { status, body });
        }

        Ok(sse_chunks(response.bytes_stream()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Extracts the text delta from one SSE `data:` payload, if it has one.
fn delta_text(data: &str) -> Option<String> {
    serde_json::from_str::<ChunkPayload>(data)
        .ok()
        .and_then(|p| p.choices.into_iter().next())
        .and_then(|c| c.delta.content)
        .filter(|s| !s.is_empty())
}

/// Converts a raw SSE byte stream into text deltas.
///
/// Lines are buffered across chunk boundaries; `data: [DONE]` ends the
/// stream, and a transport error terminates it after one `Err` item.
fn sse_chunks<S, B>(bytes: S) -> BoxStream<'static, Result<String, DraftError>>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = SseState {
        buffer: String::new(),
        pending: VecDeque::new(),
        done: false,
    };

    futures::stream::unfold((bytes.boxed(), state), |(mut inner, mut state)| async move {
        loop {
            if let Some(text) = state.pending.pop_front() {
                return Some((Ok(text), (inner, state)));
            }
            if state.done {
                return None;
            }
            match inner.next().await {
                None => {
                    state.done = true;
                    // Flush a final line the server didn't terminate.
                    if !state.buffer.is_empty() {
                        state.buffer.push('\n');
                        state.drain_lines();
                    }
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(DraftError::Http(e)), (inner, state)));
                }
                Some(Ok(chunk)) => {
                    state.buffer.push_str(&String::from_utf8_lossy(chunk.as_ref()));
                    state.drain_lines();
                }
            }
        }
    })
    .boxed()
}

struct SseState {
    buffer: String,
    pending: VecDeque<String>,
    done: bool,
}

impl SseState {
    /// Consumes complete lines from the buffer into pending deltas.
    fn drain_lines(&mut self) {
        while let Some(position) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=position).collect();
            let line = line.trim_end();
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim_start();
            if data == "[DONE]" {
                self.done = true;
                self.buffer.clear();
                break;
            }
            if let Some(text) = delta_text(data) {
                self.pending.push_back(text);
            }
        }
    }
}
