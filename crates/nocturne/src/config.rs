//! Engine configuration.
//!
//! [`Config`] carries the knobs that are not per-domain settings: where the
//! settings live, which element class is the settings panel, and how the
//! classifier and stylesheet behave. It deserializes from any serde format
//! and can be overridden from environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `NOCTURNE_STORAGE_KEY` | `storage_key` |
//! | `NOCTURNE_PANEL_CLASS` | `panel_class` |
//! | `NOCTURNE_VEIL` | `veil_while_classifying` |
//! | `NOCTURNE_CHECK_FOREGROUND` | `check_foreground` |
//! | `NOCTURNE_CONTRAST` | `contrast` |
//!
//! Environment access goes through [`EnvReader`] so tests can supply a
//! [`MockEnv`] instead of mutating the process environment.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_STORAGE_KEY;

/// Default class of the settings panel container.
pub const DEFAULT_PANEL_CLASS: &str = "nocturne-settings-panel";

/// Default contrast factor applied together with the inversion.
pub const DEFAULT_CONTRAST: f32 = 0.8;

/// Abstraction over environment variables.
pub trait EnvReader: Send + Sync {
    /// Get an environment variable value.
    fn var(&self, name: &str) -> Option<String>;
}

/// Real environment variable reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealEnv;

impl EnvReader for RealEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Mock environment variable reader for testing.
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: HashMap<String, String>,
}

impl MockEnv {
    /// Create an empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvReader for MockEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key the settings object is stored under.
    pub storage_key: String,
    /// Class of the settings panel, exempted from the inversion.
    pub panel_class: String,
    /// Hide the page while waiting to classify it.
    pub veil_while_classifying: bool,
    /// Require light text as well as a dark background to call a page dark.
    pub check_foreground: bool,
    /// CSS `contrast()` factor applied with the inversion.
    pub contrast: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            panel_class: DEFAULT_PANEL_CLASS.to_string(),
            veil_while_classifying: true,
            check_foreground: true,
            contrast: DEFAULT_CONTRAST,
        }
    }
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::new().with_env(&RealEnv)
    }

    /// Applies overrides from `env`. Unparseable values are ignored.
    pub fn with_env(mut self, env: &dyn EnvReader) -> Self {
        if let Some(key) = non_empty(env.var("NOCTURNE_STORAGE_KEY")) {
            self.storage_key = key;
        }
        if let Some(class) = non_empty(env.var("NOCTURNE_PANEL_CLASS")) {
            self.panel_class = class;
        }
        if let Some(veil) = env.var("NOCTURNE_VEIL").and_then(|v| parse_flag(&v)) {
            self.veil_while_classifying = veil;
        }
        if let Some(check) = env
            .var("NOCTURNE_CHECK_FOREGROUND")
            .and_then(|v| parse_flag(&v))
        {
            self.check_foreground = check;
        }
        if let Some(contrast) = env
            .var("NOCTURNE_CONTRAST")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|c| c.is_finite() && *c >= 0.0)
        {
            self.contrast = contrast;
        }
        self
    }

    /// Sets the storage key.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets the settings panel class.
    pub fn panel_class(mut self, class: impl Into<String>) -> Self {
        self.panel_class = class.into();
        self
    }

    /// Enables or disables the transitional veil.
    pub fn veil_while_classifying(mut self, enabled: bool) -> Self {
        self.veil_while_classifying = enabled;
        self
    }

    /// Chooses the two-sample (`true`) or background-only classifier.
    pub fn check_foreground(mut self, enabled: bool) -> Self {
        self.check_foreground = enabled;
        self
    }

    /// Sets the contrast factor.
    pub fn contrast(mut self, contrast: f32) -> Self {
        self.contrast = contrast;
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.panel_class, DEFAULT_PANEL_CLASS);
        assert!(config.veil_while_classifying);
        assert!(config.check_foreground);
        assert_eq!(config.contrast, 0.8);
    }

    #[test]
    fn test_env_overrides() {
        let env = MockEnv::new()
            .with_var("NOCTURNE_STORAGE_KEY", "dark.settings")
            .with_var("NOCTURNE_PANEL_CLASS", "my-panel")
            .with_var("NOCTURNE_VEIL", "off")
            .with_var("NOCTURNE_CHECK_FOREGROUND", "0")
            .with_var("NOCTURNE_CONTRAST", "0.9");

        let config = Config::new().with_env(&env);
        assert_eq!(config.storage_key, "dark.settings");
        assert_eq!(config.panel_class, "my-panel");
        assert!(!config.veil_while_classifying);
        assert!(!config.check_foreground);
        assert_eq!(config.contrast, 0.9);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let env = MockEnv::new()
            .with_var("NOCTURNE_PANEL_CLASS", "   ")
            .with_var("NOCTURNE_VEIL", "maybe")
            .with_var("NOCTURNE_CONTRAST", "-1");

        assert_eq!(Config::new().with_env(&env), Config::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"panel_class": "prefs"}"#).unwrap();
        assert_eq!(config.panel_class, "prefs");
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_builder() {
        let config = Config::new()
            .storage_key("k")
            .panel_class("p")
            .veil_while_classifying(false)
            .check_foreground(false)
            .contrast(1.0);
        assert_eq!(config.storage_key, "k");
        assert_eq!(config.panel_class, "p");
        assert!(!config.veil_while_classifying);
        assert!(!config.check_foreground);
        assert_eq!(config.contrast, 1.0);
    }
}
