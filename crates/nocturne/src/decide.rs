//! The activation decision for a single page load.
//!
//! ```text
//! time range set and now outside it ........ Skip
//! no rule matches the domain ............... ClassifyThenInvert
//! rule { enabled: false } .................. Skip
//! rule { enabled: true, legacy: true } ..... DeferredInvert
//! rule { enabled: true, legacy: false } .... ImmediateInvert
//! ```
//!
//! Only `ClassifyThenInvert` and `DeferredInvert` consult the luminance
//! classifier; a forced domain (`ImmediateInvert`) is inverted regardless of
//! how dark the page already is.

use crate::schedule::ClockTime;
use crate::settings::Settings;

/// What to do with a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Leave the page alone.
    Skip,
    /// No rule: wait for the page, invert unless it is already dark.
    ClassifyThenInvert,
    /// Forced domain: invert as soon as the head exists, no classification.
    ImmediateInvert,
    /// Legacy domain: after full load, invert unless already dark.
    DeferredInvert,
}

impl Decision {
    /// Returns `true` if the page may end up inverted.
    pub fn may_invert(self) -> bool {
        !matches!(self, Decision::Skip)
    }

    /// Returns `true` if the luminance classifier runs before inverting.
    pub fn classifies(self) -> bool {
        matches!(
            self,
            Decision::ClassifyThenInvert | Decision::DeferredInvert
        )
    }

    /// Returns `true` if the decision waits for the full page load.
    pub fn waits_for_load(self) -> bool {
        self.classifies()
    }

    /// Short name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Skip => "skip",
            Decision::ClassifyThenInvert => "classify",
            Decision::ImmediateInvert => "immediate",
            Decision::DeferredInvert => "deferred",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides what to do for `domain` at `now`.
pub fn decide(domain: &str, now: ClockTime, settings: &Settings) -> Decision {
    if let Some(range) = settings.time_range() {
        if !range.contains(now) {
            tracing::debug!(domain, %now, start = %range.start, end = %range.end, "outside time range");
            return Decision::Skip;
        }
    }

    match settings.find_rule(domain) {
        None => Decision::ClassifyThenInvert,
        Some((pattern, rule)) => {
            let decision = match (rule.enabled, rule.legacy) {
                (false, _) => Decision::Skip,
                (true, true) => Decision::DeferredInvert,
                (true, false) => Decision::ImmediateInvert,
            };
            tracing::debug!(domain, %pattern, %decision, "domain rule matched");
            decision
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::TimeRange;
    use crate::settings::DomainRule;

    fn at(text: &str) -> ClockTime {
        ClockTime::parse(text).unwrap()
    }

    fn settings_with(pattern: &str, rule: DomainRule) -> Settings {
        let mut settings = Settings::new();
        settings.upsert_domain_rule(pattern, rule).unwrap();
        settings
    }

    #[test]
    fn test_no_rule_classifies() {
        let decision = decide("example.com", at("12:00"), &Settings::new());
        assert_eq!(decision, Decision::ClassifyThenInvert);
        assert!(decision.classifies());
        assert!(decision.waits_for_load());
    }

    #[test]
    fn test_enabled_rule_is_immediate() {
        let settings = settings_with("example.com", DomainRule::enabled());
        let decision = decide("example.com", at("12:00"), &settings);
        assert_eq!(decision, Decision::ImmediateInvert);
        assert!(!decision.classifies());
    }

    #[test]
    fn test_legacy_rule_is_deferred() {
        let settings = settings_with("example.com", DomainRule::legacy());
        assert_eq!(
            decide("example.com", at("12:00"), &settings),
            Decision::DeferredInvert
        );
    }

    #[test]
    fn test_disabled_rule_skips() {
        // legacy is irrelevant once disabled
        let settings = settings_with(
            "example.com",
            DomainRule {
                enabled: false,
                legacy: true,
            },
        );
        let decision = decide("example.com", at("12:00"), &settings);
        assert_eq!(decision, Decision::Skip);
        assert!(!decision.may_invert());
    }

    #[test]
    fn test_outside_time_range_skips_every_rule() {
        for rule in [
            None,
            Some(DomainRule::enabled()),
            Some(DomainRule::legacy()),
            Some(DomainRule::disabled()),
        ] {
            let mut settings = Settings::new();
            if let Some(rule) = rule {
                settings.upsert_domain_rule("example.com", rule).unwrap();
            }
            settings.set_time_range(TimeRange::new("22:00", "06:00"));
            assert_eq!(
                decide("example.com", at("12:00"), &settings),
                Decision::Skip
            );
        }
    }

    #[test]
    fn test_inside_wrapping_range_uses_rule() {
        let mut settings = settings_with("example.com", DomainRule::enabled());
        settings.set_time_range(TimeRange::new("22:00", "06:00"));
        assert_eq!(
            decide("example.com", at("23:30"), &settings),
            Decision::ImmediateInvert
        );
    }

    #[test]
    fn test_malformed_range_does_not_block() {
        let mut settings = Settings::new();
        settings.set_time_range(TimeRange::new("xx:yy", "06:00"));
        assert_eq!(
            decide("example.com", at("12:00"), &settings),
            Decision::ClassifyThenInvert
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Decision::DeferredInvert.to_string(), "deferred");
    }
}
