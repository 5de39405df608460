//! voice-nudge: headless core of a realtime voice conversation assistant.
//!
//! The host page owns the realtime connection and relays its events here
//! over JSON-line IPC. This crate keeps the AI presence state, nudges the
//! agent after a stretch of silence, persists the conversation setting and
//! answers the nearby-places tool.

pub mod config;
pub mod ipc;
pub mod logging;
pub mod prompt;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod tools;
