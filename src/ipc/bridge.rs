//! IPC bridge: stdin reader and stdout event emitter.
//!
//! A blocking stdin reader thread sends deserialized commands through an
//! mpsc channel; events go out as JSON lines on stdout.

use std::io::{self, BufRead, Write};

use tokio::sync::mpsc;
use tracing::{debug, error};

use super::{AssistantEvent, EventSink, HostCommand};

/// Emit an `AssistantEvent` as a JSON line on stdout and flush.
pub fn emit_event(event: &AssistantEvent) {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            error!("Failed to serialize event: {}", e);
            return;
        }
    };
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // Ignore write/flush errors; the pipe may be closed.
    let _ = writeln!(handle, "{}", json);
    let _ = handle.flush();
}

/// Convenience helper for emitting error events.
pub fn emit_error(message: &str) {
    emit_event(&AssistantEvent::Error {
        message: message.to_string(),
    });
}

/// Sink writing to the process's stdout.
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&self, event: AssistantEvent) {
        emit_event(&event);
    }
}

/// Normalize incoming JSON: if it has a `"type"` field but no `"command"`
/// field, rename `"type"` to `"command"` so serde can deserialize it.
fn normalize_command_json(input: &str) -> String {
    if let Ok(mut obj) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(input)
    {
        if !obj.contains_key("command") {
            if let Some(type_val) = obj.remove("type") {
                obj.insert("command".to_string(), type_val);
                if let Ok(json) = serde_json::to_string(&obj) {
                    return json;
                }
            }
        }
    }
    input.to_string()
}

/// Parse one stdin line. Blank lines yield `Ok(None)`.
pub fn parse_command_line(line: &str) -> Result<Option<HostCommand>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&normalize_command_json(trimmed)).map(Some)
}

/// Spawn a blocking thread that reads JSON lines from stdin, deserializes
/// them into `HostCommand`, and forwards them through the returned channel.
///
/// The thread exits when stdin is closed (host gone) or on unrecoverable
/// read error.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<HostCommand> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = io::stdin();
        let reader = stdin.lock();
        for line in reader.lines() {
            match line {
                Ok(text) => match parse_command_line(&text) {
                    Ok(Some(cmd)) => {
                        debug!(?cmd, "Received command from host");
                        if tx.send(cmd).is_err() {
                            break; // Receiver dropped, main task is gone.
                        }
                    }
                    Ok(None) => continue,
                    Err(e) => {
                        error!("Invalid JSON command: {} (input: {})", e, text.trim());
                        emit_error(&format!("Invalid JSON command: {}", e));
                    }
                },
                Err(e) => {
                    error!("stdin read error: {}", e);
                    break;
                }
            }
        }
        debug!("stdin reader thread exiting");
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_skipped() {
        assert!(parse_command_line("   ").unwrap().is_none());
    }

    #[test]
    fn test_type_field_normalized() {
        let cmd = parse_command_line(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(cmd, Some(HostCommand::Ping {})));
    }

    #[test]
    fn test_command_field_wins_over_type() {
        let cmd = parse_command_line(
            r#"{"command":"transport","event":{"type":"history_added"}}"#,
        )
        .unwrap();
        assert!(matches!(cmd, Some(HostCommand::Transport { .. })));
    }

    #[test]
    fn test_invalid_line_is_error() {
        assert!(parse_command_line("{oops").is_err());
        assert!(parse_command_line(r#"{"command":"teleport"}"#).is_err());
    }

    #[test]
    fn test_set_setting() {
        match parse_command_line(r#"{"command":"set_setting","text":"友人3人"}"#).unwrap() {
            Some(HostCommand::SetSetting { text }) => assert_eq!(text, "友人3人"),
            other => panic!("wrong variant: {:?}", other),
        }
    }
}
