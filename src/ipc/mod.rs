//! IPC protocol types for communication with the host page.
//!
//! Events use `{"event": "<name>", "data": {...}}` format (core -> host).
//! Commands use `{"command": "<name>", ...}` format (host -> core).

pub mod bridge;

use serde::{Deserialize, Serialize};

use crate::session::events::TransportEvent;
use crate::session::state::AiState;
use crate::tools::nearby::Position;

// ---------------------------------------------------------------------------
// Events: core -> host (stdout)
// ---------------------------------------------------------------------------

/// Turn detection settings requested for the realtime session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnDetection {
    #[serde(rename = "type")]
    pub kind: String,
    pub eagerness: String,
}

impl Default for TurnDetection {
    fn default() -> Self {
        Self {
            kind: "semantic_vad".to_string(),
            eagerness: "medium".to_string(),
        }
    }
}

/// All events emitted to the host via stdout as JSON lines.
///
/// Serialized as `{"event": "<variant>", "data": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum AssistantEvent {
    Starting {},
    Ready {},
    SessionStarted {},
    SessionStopped {},
    /// Agent definition the host should open the realtime session with.
    SessionConfig {
        agent_name: String,
        instructions: String,
        tools: Vec<serde_json::Value>,
        turn_detection: TurnDetection,
    },
    /// A user-role text turn to inject into the conversation.
    SendMessage {
        id: String,
        role: String,
        text: String,
    },
    /// Cut off any agent audio in progress.
    Interrupt {},
    /// Disconnect the realtime session.
    Close {},
    StateChange {
        state: AiState,
        title: String,
        text: String,
    },
    /// Conversation history, newest first.
    History { items: Vec<serde_json::Value> },
    ToolResult { call_id: String, output: String },
    Setting { text: String },
    Error { message: String },
    Pong {},
    Stopping {},
}

/// Outbound seam: where session output goes.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AssistantEvent);
}

// ---------------------------------------------------------------------------
// Commands: host -> core (stdin)
// ---------------------------------------------------------------------------

/// All commands received from the host via stdin as JSON lines.
///
/// Deserialized from `{"command": "<variant>", ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command")]
#[serde(rename_all = "snake_case")]
pub enum HostCommand {
    Start {},
    Stop {},
    /// The host could not open or keep the realtime session.
    SessionFailed { message: String },
    /// A realtime session event relayed by the host.
    Transport { event: TransportEvent },
    ToolCall {
        call_id: String,
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
        #[serde(default)]
        position: Option<Position>,
        #[serde(default)]
        position_error: Option<String>,
    },
    GetSetting {},
    SetSetting { text: String },
    Ping {},
    Shutdown {},
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{AssistantEvent, EventSink};

    /// Collects emitted events for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<AssistantEvent>>,
    }

    impl RecordingSink {
        pub fn take(&self) -> Vec<AssistantEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: AssistantEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
