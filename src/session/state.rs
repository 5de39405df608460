//! Atomic AI presence state.
//!
//! Tracks what the remote agent is doing (idle, listening, thinking,
//! speaking) using an `AtomicU8`, shared between the session controller
//! and the nudge action running on a timer task.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

/// Presence states shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AiState {
    /// Connected and waiting, or no session.
    Idle = 0,
    /// A human is speaking.
    Listening = 1,
    /// The agent is preparing a response.
    Thinking = 2,
    /// The agent's audio is playing.
    Speaking = 3,
}

impl AiState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Listening,
            2 => Self::Thinking,
            3 => Self::Speaking,
            _ => Self::Idle,
        }
    }

    /// Status headline for this state.
    pub fn title(self) -> &'static str {
        match self {
            Self::Idle => "準備完了",
            Self::Listening => "🎧 聞いています...",
            Self::Thinking => "💭 考えています...",
            Self::Speaking => "🗣️ 話しています...",
        }
    }

    /// Status subtitle for this state.
    pub fn description(self) -> &'static str {
        match self {
            Self::Idle => "スタートボタンを押して会話を始めてください",
            Self::Listening => "あなたの声を聞いています",
            Self::Thinking => "回答を準備しています",
            Self::Speaking => "AIが回答しています",
        }
    }
}

impl std::fmt::Display for AiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Listening => write!(f, "listening"),
            Self::Thinking => write!(f, "thinking"),
            Self::Speaking => write!(f, "speaking"),
        }
    }
}

/// Thread-safe presence state, shareable via `Arc`.
#[derive(Debug)]
pub struct AiStateMachine {
    state: AtomicU8,
}

impl AiStateMachine {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(AiState::Idle as u8),
        }
    }

    /// Current state.
    pub fn current(&self) -> AiState {
        AiState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move to `next`. Returns `true` if the state actually changed.
    pub fn set(&self, next: AiState) -> bool {
        self.state.swap(next as u8, Ordering::AcqRel) != next as u8
    }
}

impl Default for AiStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let sm = AiStateMachine::new();
        assert_eq!(sm.current(), AiState::Idle);
    }

    #[test]
    fn test_set_reports_changes_only() {
        let sm = AiStateMachine::new();
        assert!(!sm.set(AiState::Idle));
        assert!(sm.set(AiState::Listening));
        assert!(!sm.set(AiState::Listening));
        assert!(sm.set(AiState::Speaking));
        assert_eq!(sm.current(), AiState::Speaking);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&AiState::Thinking).unwrap(), "\"thinking\"");
        assert_eq!(AiState::Listening.to_string(), "listening");
        assert_eq!(AiState::from_u8(42), AiState::Idle);
    }

    #[test]
    fn test_every_state_has_status_text() {
        for state in [
            AiState::Idle,
            AiState::Listening,
            AiState::Thinking,
            AiState::Speaking,
        ] {
            assert!(!state.title().is_empty());
            assert!(!state.description().is_empty());
        }
    }
}
