//! Handoff settings.
//!
//! Precedence, lowest to highest: compiled [`HandoffSettings::default()`],
//! then `~/.baton/settings.json` merged over it, then `BATON_*` environment
//! variables. The file merge is recursive for nested objects and wholesale
//! for everything else, so a partial settings file only touches the keys it
//! names; a `null` never erases a default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Settings load error.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file unreadable.
    #[error("settings file unreadable: {0}")]
    Io(#[from] std::io::Error),
    /// Settings file or merged value is not valid.
    #[error("settings parse failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings of the handoff subsystem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandoffSettings {
    /// Model used for summary generation and session queries.
    pub summary_model: Option<String>,
    /// Whether to append the handoff hint to the system prompt.
    pub inject_hint: bool,
    /// Suppress info-level notifications.
    pub quiet_notifications: bool,
}

impl Default for HandoffSettings {
    fn default() -> Self {
        Self {
            summary_model: None,
            inject_hint: true,
            quiet_notifications: false,
        }
    }
}

/// Resolve the path to the settings file (`~/.baton/settings.json`).
#[must_use]
pub fn settings_path() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_else(|| "/tmp".into());
    Path::new(&home).join(".baton").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<HandoffSettings, SettingsError> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<HandoffSettings, SettingsError> {
    let mut merged = serde_json::to_value(HandoffSettings::default())?;

    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(?path, "loading handoff settings from file");
            let user: Value = serde_json::from_str(&content)?;
            merged = deep_merge(merged, user);
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "settings file not found, using defaults");
        }
        Err(err) => return Err(err.into()),
    }

    let mut settings: HandoffSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Merge `overlay` over `base`, recursively.
///
/// Nested objects merge key by key; any other overlay value replaces the
/// base wholesale. A `null` overlay is ignored at every level, so a partial
/// settings file cannot erase a default.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    use serde_json::map::Entry;

    match overlay {
        Value::Null => base,
        Value::Object(overlay_map) => {
            let Value::Object(mut merged) = base else {
                // Shape mismatch: the object wins over the scalar it shadows.
                return Value::Object(overlay_map);
            };
            for (key, value) in overlay_map {
                if value.is_null() {
                    continue;
                }
                match merged.entry(key) {
                    Entry::Occupied(mut slot) => {
                        let folded = deep_merge(slot.get_mut().take(), value);
                        let _ = slot.insert(folded);
                    }
                    Entry::Vacant(slot) => {
                        let _ = slot.insert(value);
                    }
                }
            }
            Value::Object(merged)
        }
        leaf => leaf,
    }
}

fn apply_env_overrides(settings: &mut HandoffSettings) {
    if let Ok(model) = std::env::var("BATON_SUMMARY_MODEL") {
        if !model.is_empty() {
            settings.summary_model = Some(model);
        }
    }
    if let Ok(value) = std::env::var("BATON_INJECT_HINT") {
        settings.inject_hint = value != "0" && value.to_lowercase() != "false";
    }
    if let Ok(value) = std::env::var("BATON_QUIET") {
        settings.quiet_notifications = value == "1" || value.to_lowercase() == "true";
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_inject_hint() {
        let settings = HandoffSettings::default();
        assert!(settings.inject_hint);
        assert!(!settings.quiet_notifications);
        assert!(settings.summary_model.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(settings, HandoffSettings::default());
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"summaryModel": "claude-sonnet-4-5", "quietNotifications": true}"#,
        )
        .unwrap();
        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.summary_model.as_deref(), Some("claude-sonnet-4-5"));
        assert!(settings.quiet_notifications);
        assert!(settings.inject_hint); // untouched default
    }

    #[test]
    fn invalid_json_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    // -- deep_merge --

    #[test]
    fn merge_overrides_per_key() {
        let merged = deep_merge(
            json!({"a": 1, "b": {"c": 2, "d": 3}}),
            json!({"b": {"c": 9}}),
        );
        assert_eq!(merged, json!({"a": 1, "b": {"c": 9, "d": 3}}));
    }

    #[test]
    fn merge_replaces_arrays_and_primitives() {
        let merged = deep_merge(json!({"a": [1, 2], "b": "x"}), json!({"a": [3], "b": "y"}));
        assert_eq!(merged, json!({"a": [3], "b": "y"}));
    }

    #[test]
    fn merge_skips_nulls() {
        let merged = deep_merge(json!({"a": 1}), json!({"a": null, "b": 2}));
        assert_eq!(merged, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn merge_of_null_overlay_keeps_base() {
        let merged = deep_merge(json!({"a": 1}), Value::Null);
        assert_eq!(merged, json!({"a": 1}));
    }

    #[test]
    fn merge_object_over_scalar_replaces_it() {
        let merged = deep_merge(json!({"a": 1}), json!({"a": {"b": 2}}));
        assert_eq!(merged, json!({"a": {"b": 2}}));
    }
}
