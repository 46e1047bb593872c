//! Debug adapter protocol events consumed by the console

use serde::Deserialize;
use serde_json::Value;

use crate::types::{GroupMarker, DEFAULT_CATEGORY};

/// An `output` event body, reduced to what classification needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub output: String,
    pub category: String,
    pub group: Option<GroupMarker>,
}

impl OutputEvent {
    pub fn new(output: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            category: category.into(),
            group: None,
        }
    }

    pub fn with_group(mut self, group: GroupMarker) -> Self {
        self.group = Some(group);
        self
    }
}

/// Events the console reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Output(OutputEvent),
    /// The adapter finished initializing a new debug session
    SessionStarted,
    /// The debuggee terminated or exited
    SessionEnded,
}

/// Envelope shared by every protocol message
#[derive(Debug, Deserialize)]
struct RawProtocolMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    body: Value,
}

#[derive(Debug, Deserialize)]
struct RawOutputBody {
    #[serde(default)]
    output: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    group: Option<String>,
}

fn parse_group(group: Option<&str>) -> Option<GroupMarker> {
    match group? {
        "start" => Some(GroupMarker::Start),
        "startCollapsed" => Some(GroupMarker::StartCollapsed),
        "end" => Some(GroupMarker::End),
        other => {
            tracing::debug!("ignoring unknown output group {other:?}");
            None
        }
    }
}

/// Parse one JSON protocol message.
///
/// Returns `None` for malformed JSON and for messages the console ignores
/// (requests, responses, and events other than output/session lifecycle).
pub fn parse_protocol_message(json: &str) -> Option<InboundEvent> {
    let raw: RawProtocolMessage = serde_json::from_str(json).ok()?;
    if raw.kind != "event" {
        return None;
    }

    match raw.event.as_deref()? {
        "output" => {
            let body: RawOutputBody = serde_json::from_value(raw.body).ok()?;
            let category = body
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
            Some(InboundEvent::Output(OutputEvent {
                output: body.output,
                category,
                group: parse_group(body.group.as_deref()),
            }))
        }
        "initialized" => Some(InboundEvent::SessionStarted),
        "terminated" | "exited" => Some(InboundEvent::SessionEnded),
        other => {
            tracing::trace!("ignoring protocol event {other}");
            None
        }
    }
}
