//! Per-domain rules and the activation window.
//!
//! [`Settings`] is a plain value: it is loaded once per page from a
//! [`SettingsStore`](crate::store::SettingsStore), threaded through the pure
//! decision functions, and written back wholesale after an edit.
//!
//! Rules keep their insertion order. When several patterns match a domain the
//! first one added wins, which is also the order they are persisted in.
//!
//! # Persisted shape
//!
//! ```json
//! {
//!   "github.com":      { "enabled": true,  "legacy": false },
//!   "*.wikipedia.org": { "enabled": true,  "legacy": true  },
//!   "docs.rs":         { "enabled": false, "legacy": false },
//!   "timeRange":       { "start": "22:00", "end": "06:00" }
//! }
//! ```
//!
//! # Example
//!
//! ```rust
//! use nocturne::{DomainRule, Settings, TimeRange};
//!
//! let mut settings = Settings::new();
//! settings.upsert_domain_rule("*.example.com", DomainRule::enabled()).unwrap();
//! settings.upsert_domain_rule("shop.example.com", DomainRule::disabled()).unwrap();
//! settings.set_time_range(TimeRange::new("22:00", "06:00"));
//!
//! // the glob was added first, so it wins
//! assert_eq!(
//!     settings.lookup_domain_rule("shop.example.com"),
//!     Some(DomainRule::enabled())
//! );
//! ```

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::pattern::DomainPattern;
use crate::schedule::TimeRange;

/// Reserved key holding the time range in the persisted object.
pub const TIME_RANGE_KEY: &str = "timeRange";

/// What to do on domains matching a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DomainRule {
    /// Dark mode is forced on (`true`) or off (`false`).
    pub enabled: bool,
    /// Invert only after the page has fully loaded.
    #[serde(default)]
    pub legacy: bool,
}

impl DomainRule {
    /// Force immediate inversion.
    pub fn enabled() -> Self {
        DomainRule {
            enabled: true,
            legacy: false,
        }
    }

    /// Force inversion after full page load.
    pub fn legacy() -> Self {
        DomainRule {
            enabled: true,
            legacy: true,
        }
    }

    /// Never invert.
    pub fn disabled() -> Self {
        DomainRule {
            enabled: false,
            legacy: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RuleEntry {
    pattern: DomainPattern,
    rule: DomainRule,
}

/// Ordered domain rules plus an optional time range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    rules: Vec<RuleEntry>,
    time_range: Option<TimeRange>,
}

impl Settings {
    /// Creates empty settings: no rules, no time restriction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the persisted JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encodes the persisted JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns the first rule whose pattern matches `domain`.
    pub fn lookup_domain_rule(&self, domain: &str) -> Option<DomainRule> {
        self.find_rule(domain).map(|(_, rule)| rule)
    }

    /// Like [`lookup_domain_rule`](Self::lookup_domain_rule), also returning
    /// the pattern that matched.
    pub fn find_rule(&self, domain: &str) -> Option<(&DomainPattern, DomainRule)> {
        self.rules
            .iter()
            .find(|entry| entry.pattern.matches(domain))
            .map(|entry| (&entry.pattern, entry.rule))
    }

    /// The configured activation window, if any.
    pub fn time_range(&self) -> Option<&TimeRange> {
        self.time_range.as_ref()
    }

    /// Adds a rule, or replaces the rule stored under the same pattern text.
    ///
    /// A replaced rule keeps its position in the match order.
    pub fn upsert_domain_rule(&mut self, pattern: &str, rule: DomainRule) -> Result<()> {
        let pattern = DomainPattern::compile(pattern)?;
        match self.rules.iter_mut().find(|entry| entry.pattern == pattern) {
            Some(entry) => entry.rule = rule,
            None => self.rules.push(RuleEntry { pattern, rule }),
        }
        Ok(())
    }

    /// Removes the rule stored under exactly this pattern text, returning it.
    pub fn remove_domain_rule(&mut self, pattern: &str) -> Option<DomainRule> {
        let index = self
            .rules
            .iter()
            .position(|entry| entry.pattern.as_str() == pattern)?;
        Some(self.rules.remove(index).rule)
    }

    /// Sets the activation window.
    pub fn set_time_range(&mut self, range: TimeRange) {
        self.time_range = Some(range);
    }

    /// Removes the activation window; dark mode may activate at any time.
    pub fn clear_time_range(&mut self) -> Option<TimeRange> {
        self.time_range.take()
    }

    /// Iterates `(pattern, rule)` pairs in match order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, DomainRule)> + '_ {
        self.rules
            .iter()
            .map(|entry| (entry.pattern.as_str(), entry.rule))
    }

    /// Number of domain rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when there are neither rules nor a time range.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.time_range.is_none()
    }
}

impl Serialize for Settings {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = self.rules.len() + usize::from(self.time_range.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for entry in &self.rules {
            map.serialize_entry(entry.pattern.as_str(), &entry.rule)?;
        }
        if let Some(range) = &self.time_range {
            map.serialize_entry(TIME_RANGE_KEY, range)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(SettingsVisitor)
    }
}

struct SettingsVisitor;

impl<'de> Visitor<'de> for SettingsVisitor {
    type Value = Settings;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of domain patterns to rules")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Settings, A::Error> {
        let mut settings = Settings::new();
        while let Some(key) = access.next_key::<String>()? {
            if key == TIME_RANGE_KEY {
                settings.time_range = access.next_value::<Option<TimeRange>>()?;
            } else {
                let rule: DomainRule = access.next_value()?;
                settings
                    .upsert_domain_rule(&key, rule)
                    .map_err(<A::Error as de::Error>::custom)?;
            }
        }
        Ok(settings)
    }
}
