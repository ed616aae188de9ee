//! Server-sent event decoding for the streaming REST source.
//!
//! The store streams `text/event-stream` frames. Each frame carries an event
//! name and a JSON payload of the form `{"path": "/...", "data": ...}` where
//! `path` is relative to the subscribed location.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::SourceError;

/// One dispatched event-stream frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub event: String,
    pub data: String,
}

/// Incremental decoder for `text/event-stream` bodies.
///
/// Bytes can be fed in arbitrary chunks; lines split across chunks (including
/// inside multi-byte characters) are reassembled before decoding.
#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the body, returning every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn process_line(&mut self, line: &str) -> Option<Frame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            // Comment
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<Frame> {
        let event = self.event.take();
        if event.is_none() && self.data.is_empty() {
            return None;
        }
        Some(Frame {
            event: event.unwrap_or_else(|| "message".to_string()),
            data: std::mem::take(&mut self.data).join("\n"),
        })
    }
}

/// A decoded store event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Replace the node at `path`.
    Put { path: String, data: Value },
    /// Merge `data` into the node at `path`.
    Patch { path: String, data: Map<String, Value> },
    /// Heartbeat; no change.
    KeepAlive,
    /// The store stopped the stream, usually because access was revoked.
    Cancel(String),
    /// The credentials expired or were revoked.
    AuthRevoked,
    /// An event name this client does not handle.
    Unknown(String),
}

#[derive(Deserialize)]
struct Delta {
    path: String,
    data: Value,
}

impl StreamEvent {
    /// Decode a frame.
    pub fn from_frame(frame: &Frame) -> Result<Self, SourceError> {
        match frame.event.as_str() {
            "put" => {
                let delta: Delta = serde_json::from_str(&frame.data)?;
                Ok(StreamEvent::Put {
                    path: delta.path,
                    data: delta.data,
                })
            }
            "patch" => {
                let delta: Delta = serde_json::from_str(&frame.data)?;
                match delta.data {
                    Value::Object(data) => Ok(StreamEvent::Patch {
                        path: delta.path,
                        data,
                    }),
                    other => Err(SourceError::Parse(format!(
                        "patch data must be an object, got {}",
                        other
                    ))),
                }
            }
            "keep-alive" => Ok(StreamEvent::KeepAlive),
            "cancel" => Ok(StreamEvent::Cancel(frame.data.trim().trim_matches('"').to_string())),
            "auth_revoked" => Ok(StreamEvent::AuthRevoked),
            other => Ok(StreamEvent::Unknown(other.to_string())),
        }
    }
}
