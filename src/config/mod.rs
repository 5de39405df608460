//! Configuration reading and data directory paths.

pub mod paths;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::prompt::{DEFAULT_INTRO_PROMPT, DEFAULT_NUDGE_PROMPT};

/// Silence before the agent is nudged, when not configured.
pub const DEFAULT_NUDGE_DELAY_SECS: u64 = 10;

/// Search radius for the nearby-places tool, when the agent omits one.
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 1000.0;

/// assistant_config.json shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub nudge_delay_secs: Option<u64>,
    #[serde(default)]
    pub nudge_prompt: Option<String>,
    #[serde(default)]
    pub intro_prompt: Option<String>,
    #[serde(default)]
    pub log_to_file: Option<bool>,
    #[serde(default)]
    pub nearby_places: Option<NearbyPlacesConfig>,
    /// Hosted MCP search server handed to the agent, if any.
    #[serde(default)]
    pub web_search_url: Option<String>,
}

/// Nested nearby-places tool settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyPlacesConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub default_radius: Option<f64>,
}

impl AssistantConfig {
    pub fn agent_name(&self) -> &str {
        self.agent_name.as_deref().unwrap_or("Assistant")
    }

    pub fn nudge_delay(&self) -> Duration {
        Duration::from_secs(self.nudge_delay_secs.unwrap_or(DEFAULT_NUDGE_DELAY_SECS))
    }

    pub fn nudge_prompt(&self) -> &str {
        self.nudge_prompt.as_deref().unwrap_or(DEFAULT_NUDGE_PROMPT)
    }

    pub fn intro_prompt(&self) -> &str {
        self.intro_prompt.as_deref().unwrap_or(DEFAULT_INTRO_PROMPT)
    }

    pub fn log_to_file(&self) -> bool {
        self.log_to_file.unwrap_or(true)
    }

    pub fn nearby_places(&self) -> NearbyPlacesConfig {
        self.nearby_places.clone().unwrap_or_default()
    }
}

/// Read assistant_config.json from `data_dir`.
pub fn read_assistant_config(data_dir: &Path) -> AssistantConfig {
    read_json_file(&data_dir.join("assistant_config.json")).unwrap_or_default()
}

/// Generic helper: read a JSON file and deserialize it.
pub(crate) fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(val) => Some(val),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to read {}: {}", path.display(), e);
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AssistantConfig::default();
        assert_eq!(cfg.agent_name(), "Assistant");
        assert_eq!(cfg.nudge_delay(), Duration::from_secs(10));
        assert_eq!(cfg.nudge_prompt(), DEFAULT_NUDGE_PROMPT);
        assert_eq!(cfg.intro_prompt(), DEFAULT_INTRO_PROMPT);
        assert!(cfg.log_to_file());
        assert!(cfg.nearby_places().api_url.is_none());
    }

    #[test]
    fn test_parse_camel_case() {
        let json = r#"{
            "agentName": "Host",
            "nudgeDelaySecs": 30,
            "nearbyPlaces": { "apiUrl": "https://example.test/exec", "defaultRadius": 500 }
        }"#;
        let cfg: AssistantConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.agent_name(), "Host");
        assert_eq!(cfg.nudge_delay(), Duration::from_secs(30));
        let np = cfg.nearby_places();
        assert_eq!(np.api_url.as_deref(), Some("https://example.test/exec"));
        assert_eq!(np.default_radius, Some(500.0));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = std::env::temp_dir().join("voice_nudge_test_config_missing");
        let cfg = read_assistant_config(&dir);
        assert_eq!(cfg.nudge_delay(), Duration::from_secs(DEFAULT_NUDGE_DELAY_SECS));
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let dir = std::env::temp_dir().join("voice_nudge_test_config_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("assistant_config.json"), "{ not json").unwrap();
        let cfg = read_assistant_config(&dir);
        assert_eq!(cfg.agent_name(), "Assistant");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_reads_file() {
        let dir = std::env::temp_dir().join("voice_nudge_test_config_reads");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("assistant_config.json"), r#"{"nudgeDelaySecs": 6}"#).unwrap();
        let cfg = read_assistant_config(&dir);
        assert_eq!(cfg.nudge_delay(), Duration::from_secs(6));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
