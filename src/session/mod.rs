//! Conversation session controller.
//!
//! Turns relayed transport events into presence-state updates and
//! silence-nudge scheduling, and emits the outbound actions (session
//! config, injected user turns, interrupt/close) for the host to perform.
//! Each session owns its own scheduler.

pub mod events;
pub mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, info, warn};

use crate::config::AssistantConfig;
use crate::ipc::{AssistantEvent, EventSink, TurnDetection};
use crate::prompt::build_instructions;
use crate::scheduler::SuggestionScheduler;
use crate::tools::tool_definitions;
use events::{reaction_for, SuggestionAction, TransportEvent};
use state::{AiState, AiStateMachine};

pub struct Session {
    agent_name: String,
    intro_prompt: String,
    nudge_delay: Duration,
    tools: Vec<serde_json::Value>,
    sink: Arc<dyn EventSink>,
    state: Arc<AiStateMachine>,
    scheduler: SuggestionScheduler,
    active: AtomicBool,
}

impl Session {
    pub fn new(config: &AssistantConfig, sink: Arc<dyn EventSink>) -> Self {
        let state = Arc::new(AiStateMachine::new());

        let scheduler = {
            let sink = Arc::clone(&sink);
            let state = Arc::clone(&state);
            let prompt: Arc<str> = Arc::from(config.nudge_prompt());
            SuggestionScheduler::new(move || {
                let sink = Arc::clone(&sink);
                let state = Arc::clone(&state);
                let prompt = Arc::clone(&prompt);
                async move {
                    info!("Conversation went quiet, nudging the agent");
                    publish_state(sink.as_ref(), &state, AiState::Thinking);
                    send_user_message(sink.as_ref(), &prompt);
                }
            })
        };

        Self {
            agent_name: config.agent_name().to_string(),
            intro_prompt: config.intro_prompt().to_string(),
            nudge_delay: config.nudge_delay(),
            tools: tool_definitions(config),
            sink,
            state,
            scheduler,
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn current_state(&self) -> AiState {
        self.state.current()
    }

    /// Whether a silence nudge is pending.
    pub fn nudge_pending(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// Start a session using the local clock.
    pub fn start(&self, setting: &str) -> bool {
        self.start_at(setting, &Local::now())
    }

    /// Start a session. Returns `false` if one is already active.
    pub fn start_at<Tz: TimeZone>(&self, setting: &str, now: &DateTime<Tz>) -> bool {
        if self.active.swap(true, Ordering::AcqRel) {
            warn!("Start requested while a session is already active");
            self.sink.emit(AssistantEvent::Error {
                message: "session already active".to_string(),
            });
            return false;
        }

        let instructions = build_instructions(now, setting);
        info!(
            agent = %self.agent_name,
            setting_len = setting.len(),
            "Starting conversation session"
        );

        self.sink.emit(AssistantEvent::SessionConfig {
            agent_name: self.agent_name.clone(),
            instructions,
            tools: self.tools.clone(),
            turn_detection: TurnDetection::default(),
        });
        self.sink.emit(AssistantEvent::SessionStarted {});

        // Open by asking everyone to introduce themselves
        publish_state(self.sink.as_ref(), &self.state, AiState::Thinking);
        send_user_message(self.sink.as_ref(), &self.intro_prompt);
        true
    }

    /// Apply one transport event.
    pub fn handle(&self, event: TransportEvent) {
        if !self.is_active() {
            debug!(?event, "Ignoring transport event without an active session");
            return;
        }

        let reaction = reaction_for(event.kind());
        debug!(kind = ?reaction.kind, "Transport event");

        match event {
            TransportEvent::HistoryUpdated { mut history } => {
                history.reverse();
                self.sink.emit(AssistantEvent::History { items: history });
            }
            TransportEvent::Error { message } => {
                warn!(%message, "Session error");
                self.sink.emit(AssistantEvent::Error { message });
            }
            _ => {}
        }

        if let Some(next) = reaction.state {
            publish_state(self.sink.as_ref(), &self.state, next);
        }

        match reaction.suggestion {
            SuggestionAction::Keep => {}
            SuggestionAction::Cancel => self.scheduler.cancel(),
            SuggestionAction::Request => self.scheduler.request(self.nudge_delay),
        }
    }

    /// Surface a failure (e.g. the host could not connect) and go idle.
    pub fn fail(&self, message: &str) {
        warn!(%message, "Session failed");
        self.scheduler.cancel();
        self.active.store(false, Ordering::Release);
        self.sink.emit(AssistantEvent::Error {
            message: message.to_string(),
        });
        publish_state(self.sink.as_ref(), &self.state, AiState::Idle);
    }

    /// Stop the session. No-op when none is active.
    pub fn stop(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            debug!("Stop requested without an active session");
            return;
        }

        self.scheduler.cancel();
        self.sink.emit(AssistantEvent::Interrupt {});
        self.sink.emit(AssistantEvent::Close {});
        publish_state(self.sink.as_ref(), &self.state, AiState::Idle);
        self.sink.emit(AssistantEvent::SessionStopped {});
        info!("Conversation session stopped");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.scheduler.cancel();
    }
}

/// Move to `next` and publish it if it changed.
fn publish_state(sink: &dyn EventSink, state: &AiStateMachine, next: AiState) {
    if state.set(next) {
        debug!(state = %next, "AI state changed");
        sink.emit(AssistantEvent::StateChange {
            state: next,
            title: next.title().to_string(),
            text: next.description().to_string(),
        });
    }
}

fn send_user_message(sink: &dyn EventSink, text: &str) {
    let id = format!("msg-{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
    sink.emit(AssistantEvent::SendMessage {
        id,
        role: "user".to_string(),
        text: text.to_string(),
    });
}
