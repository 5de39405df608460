//! Transport events relayed by the host, and the table mapping each one
//! to a presence state and a suggestion-scheduler action.

use serde::{Deserialize, Serialize};

use super::state::AiState;
use super::state::AiState::{Idle, Listening, Speaking, Thinking};
use self::SuggestionAction::{Cancel, Keep, Request};

/// Events from the realtime session, tagged by their wire name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransportEvent {
    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted,
    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped,
    #[serde(rename = "input_audio_buffer.cleared")]
    InputCleared,
    #[serde(rename = "output_audio_buffer.started")]
    OutputStarted,
    #[serde(rename = "output_audio_buffer.done")]
    OutputDone,
    #[serde(rename = "output_audio_buffer.stopped")]
    OutputStopped,
    #[serde(rename = "output_audio_buffer.cleared")]
    OutputCleared,
    #[serde(rename = "history_added")]
    HistoryAdded,
    #[serde(rename = "history_updated")]
    HistoryUpdated {
        #[serde(default)]
        history: Vec<serde_json::Value>,
    },
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        message: String,
    },
}

/// Payload-free discriminant of [`TransportEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SpeechStarted,
    SpeechStopped,
    InputCleared,
    OutputStarted,
    OutputDone,
    OutputStopped,
    OutputCleared,
    HistoryAdded,
    HistoryUpdated,
    Error,
}

impl TransportEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SpeechStarted => EventKind::SpeechStarted,
            Self::SpeechStopped => EventKind::SpeechStopped,
            Self::InputCleared => EventKind::InputCleared,
            Self::OutputStarted => EventKind::OutputStarted,
            Self::OutputDone => EventKind::OutputDone,
            Self::OutputStopped => EventKind::OutputStopped,
            Self::OutputCleared => EventKind::OutputCleared,
            Self::HistoryAdded => EventKind::HistoryAdded,
            Self::HistoryUpdated { .. } => EventKind::HistoryUpdated,
            Self::Error { .. } => EventKind::Error,
        }
    }
}

/// What an event does to the pending silence suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionAction {
    /// Leave the scheduler alone.
    Keep,
    /// Activity: retire any pending suggestion.
    Cancel,
    /// Agent finished talking: (re)start the silence countdown.
    Request,
}

/// One row of the event table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaction {
    pub kind: EventKind,
    pub state: Option<AiState>,
    pub suggestion: SuggestionAction,
}

const fn row(kind: EventKind, state: Option<AiState>, suggestion: SuggestionAction) -> Reaction {
    Reaction {
        kind,
        state,
        suggestion,
    }
}

pub static EVENT_TABLE: &[Reaction] = &[
    row(EventKind::SpeechStarted, Some(Listening), Cancel),
    row(EventKind::SpeechStopped, Some(Thinking), Cancel),
    row(EventKind::InputCleared, None, Cancel),
    row(EventKind::OutputStarted, Some(Speaking), Cancel),
    row(EventKind::OutputDone, Some(Idle), Keep),
    row(EventKind::OutputStopped, Some(Idle), Request),
    row(EventKind::OutputCleared, None, Cancel),
    row(EventKind::HistoryAdded, None, Cancel),
    row(EventKind::HistoryUpdated, None, Keep),
    row(EventKind::Error, Some(Idle), Keep),
];

/// Look up the table row for `kind`. A kind without a row has no effect.
pub fn reaction_for(kind: EventKind) -> Reaction {
    EVENT_TABLE
        .iter()
        .find(|r| r.kind == kind)
        .copied()
        .unwrap_or(row(kind, None, Keep))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [EventKind; 10] = [
        EventKind::SpeechStarted,
        EventKind::SpeechStopped,
        EventKind::InputCleared,
        EventKind::OutputStarted,
        EventKind::OutputDone,
        EventKind::OutputStopped,
        EventKind::OutputCleared,
        EventKind::HistoryAdded,
        EventKind::HistoryUpdated,
        EventKind::Error,
    ];

    #[test]
    fn test_every_kind_has_exactly_one_row() {
        for kind in ALL_KINDS {
            let rows = EVENT_TABLE.iter().filter(|r| r.kind == kind).count();
            assert_eq!(rows, 1, "{:?} should have one row", kind);
        }
        assert_eq!(EVENT_TABLE.len(), ALL_KINDS.len());
    }

    #[test]
    fn test_lookup_returns_row_for_requested_kind() {
        for kind in ALL_KINDS {
            let r = reaction_for(kind);
            assert_eq!(r.kind, kind);
            let expected = EVENT_TABLE.iter().find(|row| row.kind == kind).copied();
            assert_eq!(Some(r), expected);
        }
    }

    #[test]
    fn test_only_output_stopped_requests() {
        for r in EVENT_TABLE {
            let requests = r.suggestion == SuggestionAction::Request;
            assert_eq!(requests, r.kind == EventKind::OutputStopped);
        }
    }

    #[test]
    fn test_activity_signals_cancel() {
        for kind in [
            EventKind::SpeechStarted,
            EventKind::SpeechStopped,
            EventKind::OutputStarted,
            EventKind::InputCleared,
            EventKind::OutputCleared,
            EventKind::HistoryAdded,
        ] {
            assert_eq!(reaction_for(kind).suggestion, SuggestionAction::Cancel);
        }
    }

    #[test]
    fn test_parse_wire_names() {
        let ev: TransportEvent =
            serde_json::from_str(r#"{"type":"input_audio_buffer.speech_started"}"#).unwrap();
        assert_eq!(ev, TransportEvent::SpeechStarted);

        let ev: TransportEvent =
            serde_json::from_str(r#"{"type":"output_audio_buffer.stopped","response_id":"r1"}"#)
                .unwrap();
        assert_eq!(ev.kind(), EventKind::OutputStopped);

        let ev: TransportEvent =
            serde_json::from_str(r#"{"type":"history_updated","history":[{"role":"user"}]}"#)
                .unwrap();
        match ev {
            TransportEvent::HistoryUpdated { history } => assert_eq!(history.len(), 1),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_rejected() {
        let res = serde_json::from_str::<TransportEvent>(r#"{"type":"response.created"}"#);
        assert!(res.is_err());
    }
}
