//! Tools exposed to the remote agent.
//!
//! The host advertises the schemas from [`tool_definitions`] in the session
//! config and relays the agent's calls back as `tool_call` commands.

pub mod nearby;

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::config::AssistantConfig;
use nearby::{NearbyPlaces, Position, PositionError};

pub const NEARBY_PLACES_TOOL: &str = "get_nearby_places";

/// Tool definitions handed to the agent at session start.
pub fn tool_definitions(config: &AssistantConfig) -> Vec<serde_json::Value> {
    let mut tools = vec![json!({
        "type": "function",
        "name": NEARBY_PLACES_TOOL,
        "description": "現在地周辺の最寄り施設を取得します。",
        "parameters": {
            "type": "object",
            "properties": {
                "radius": {
                    "type": "number",
                    "default": 1000,
                    "description": "検索半径(メートル)"
                }
            }
        }
    })];

    if let Some(url) = &config.web_search_url {
        tools.push(json!({
            "type": "mcp",
            "server_label": "web_search",
            "server_url": url,
            "require_approval": "never"
        }));
    }

    tools
}

#[derive(Debug, Default, Deserialize)]
struct NearbyArgs {
    #[serde(default)]
    radius: Option<f64>,
}

/// Dispatches agent tool calls by name.
pub struct ToolRegistry {
    nearby: NearbyPlaces,
}

impl ToolRegistry {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            nearby: NearbyPlaces::new(&config.nearby_places()),
        }
    }

    /// Execute `name` and return the text result for the agent.
    pub async fn call(
        &self,
        name: &str,
        arguments: &serde_json::Value,
        position: Result<Position, PositionError>,
    ) -> String {
        match name {
            NEARBY_PLACES_TOOL => {
                let args = parse_args(arguments);
                self.nearby.run(args.radius, position).await
            }
            other => {
                warn!(tool = %other, "Unknown tool requested");
                format!("エラーが発生しました: unknown tool {}", other)
            }
        }
    }
}

/// Arguments may arrive as an object or as a JSON-encoded string.
fn parse_args(arguments: &serde_json::Value) -> NearbyArgs {
    let parsed = match arguments {
        serde_json::Value::String(s) => serde_json::from_str(s),
        serde_json::Value::Null => return NearbyArgs::default(),
        other => serde_json::from_value(other.clone()),
    };
    parsed.unwrap_or_else(|e| {
        warn!("Ignoring malformed tool arguments: {}", e);
        NearbyArgs::default()
    })
}
