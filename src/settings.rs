//! File-backed key/value store for user settings.
//!
//! Holds the free-text conversation setting between runs. Stored in
//! `<data_dir>/settings.json` as a flat JSON object of strings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing::{debug, warn};

/// Key for the user's description of the conversation.
pub const CONVERSATION_SETTING_KEY: &str = "userInput.setting";

pub struct SettingsStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("settings.json"),
            write_lock: Mutex::new(()),
        }
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    /// Store `value` under `key`, replacing the previous value.
    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut all = self.read_all();
        all.insert(key.to_string(), value.to_string());
        self.write_all(&all)?;
        debug!(key, len = value.len(), "Setting saved");
        Ok(())
    }

    /// The conversation setting, or an empty string.
    pub fn conversation_setting(&self) -> String {
        self.get(CONVERSATION_SETTING_KEY).unwrap_or_default()
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring unreadable {}: {}", self.path.display(), e);
                BTreeMap::new()
            }),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {}", self.path.display(), e);
                }
                BTreeMap::new()
            }
        }
    }

    /// Atomic write: temp file in the same directory, then rename.
    fn write_all(&self, data: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        let tmp = dir.join(format!(".settings.{}.tmp", std::process::id()));
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = SettingsStore::new(&fresh_dir("voice_nudge_test_settings_missing"));
        assert_eq!(store.get(CONVERSATION_SETTING_KEY), None);
        assert_eq!(store.conversation_setting(), "");
    }

    #[test]
    fn test_set_then_get() {
        let dir = fresh_dir("voice_nudge_test_settings_roundtrip");
        let store = SettingsStore::new(&dir);
        store.set(CONVERSATION_SETTING_KEY, "3人で旅行の計画").unwrap();
        store.set("other", "x").unwrap();
        store.set(CONVERSATION_SETTING_KEY, "4人で旅行の計画").unwrap();

        // A second store over the same directory sees the persisted values
        let reopened = SettingsStore::new(&dir);
        assert_eq!(reopened.conversation_setting(), "4人で旅行の計画");
        assert_eq!(reopened.get("other").as_deref(), Some("x"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_write() {
        let dir = fresh_dir("voice_nudge_test_settings_corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("settings.json"), "[1, 2").unwrap();

        let store = SettingsStore::new(&dir);
        assert_eq!(store.get(CONVERSATION_SETTING_KEY), None);
        store.set(CONVERSATION_SETTING_KEY, "ok").unwrap();
        assert_eq!(store.conversation_setting(), "ok");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
