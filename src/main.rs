//! voice-nudge: conversation assistant core.
//!
//! Communicates with the host page via JSON-line IPC on stdin/stdout.
//! This is the entry point that wires the subsystems and runs the main
//! command loop.

use std::sync::Arc;

use tracing::{error, info, warn};

use voice_nudge::config::{paths, read_assistant_config};
use voice_nudge::ipc::bridge::{emit_event, spawn_stdin_reader, StdoutSink};
use voice_nudge::ipc::{AssistantEvent, HostCommand};
use voice_nudge::session::Session;
use voice_nudge::settings::{SettingsStore, CONVERSATION_SETTING_KEY};
use voice_nudge::tools::nearby::PositionError;
use voice_nudge::tools::ToolRegistry;

struct App {
    session: Session,
    settings: SettingsStore,
    tools: Arc<ToolRegistry>,
}

#[tokio::main]
async fn main() {
    let data_dir = paths::get_data_dir();
    let config = read_assistant_config(&data_dir);

    let log_dir = paths::get_log_dir();
    let log_dir = config.log_to_file().then_some(log_dir.as_path());
    if let Err(e) = voice_nudge::logging::init(log_dir) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    // Emit starting event immediately so the host knows we're alive.
    emit_event(&AssistantEvent::Starting {});
    info!(data_dir = %data_dir.display(), ?config, "Configuration loaded");

    let mut cmd_rx = spawn_stdin_reader();

    let app = App {
        session: Session::new(&config, Arc::new(StdoutSink)),
        settings: SettingsStore::new(&data_dir),
        tools: Arc::new(ToolRegistry::new(&config)),
    };

    emit_event(&AssistantEvent::Ready {});
    info!("Assistant core ready");

    // Main loop: process commands from the host
    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(command) => {
                        if !handle_command(&app, command) {
                            break;
                        }
                    }
                    None => {
                        // stdin closed: host gone
                        info!("stdin closed, shutting down");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    app.session.stop();
    info!("Assistant core shutting down");
}

/// Handle a single command from the host.
/// Returns `false` if the main loop should exit.
fn handle_command(app: &App, cmd: HostCommand) -> bool {
    match cmd {
        HostCommand::Ping {} => {
            emit_event(&AssistantEvent::Pong {});
        }

        HostCommand::Shutdown {} => {
            emit_event(&AssistantEvent::Stopping {});
            return false;
        }

        HostCommand::Start {} => {
            let setting = app.settings.conversation_setting();
            app.session.start(&setting);
        }

        HostCommand::Stop {} => {
            app.session.stop();
        }

        HostCommand::SessionFailed { message } => {
            app.session.fail(&message);
        }

        HostCommand::Transport { event } => {
            app.session.handle(event);
        }

        HostCommand::GetSetting {} => {
            emit_event(&AssistantEvent::Setting {
                text: app.settings.conversation_setting(),
            });
        }

        HostCommand::SetSetting { text } => {
            if let Err(e) = app.settings.set(CONVERSATION_SETTING_KEY, &text) {
                error!("Failed to save setting: {:#}", e);
                emit_event(&AssistantEvent::Error {
                    message: format!("Failed to save setting: {}", e),
                });
            }
        }

        HostCommand::ToolCall {
            call_id,
            name,
            arguments,
            position,
            position_error,
        } => {
            let position = match (position, position_error) {
                (Some(p), _) => Ok(p),
                (None, Some(code)) => Err(PositionError::from_code(&code)),
                (None, None) => {
                    warn!(%call_id, "Tool call without position");
                    Err(PositionError::PositionUnavailable)
                }
            };
            info!(%call_id, tool = %name, "Tool call");

            let tools = Arc::clone(&app.tools);
            tokio::spawn(async move {
                let output = tools.call(&name, &arguments, position).await;
                emit_event(&AssistantEvent::ToolResult { call_id, output });
            });
        }
    }

    true
}
