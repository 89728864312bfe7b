//! # Nocturne - Per-Domain Dark Mode Activation
//!
//! `nocturne` decides, for each page load, whether and how to turn a web
//! page dark with a CSS inversion filter, and then does it.
//!
//! ## Core Concepts
//!
//! - [`Settings`]: ordered per-domain [`DomainRule`]s plus an optional
//!   daily [`TimeRange`]
//! - [`decide()`]: pure decision function producing a [`Decision`]
//! - [`color`]: luminance classifier that recognizes pages that are already dark
//! - [`StyleApplicator`]: idempotent injection of the inversion stylesheet
//! - [`Activation`]: runs a decision against a [`Page`], awaiting its
//!   readiness signals
//! - [`SettingsStore`]: the only side-effecting boundary, over a
//!   [`KeyValueBackend`](store::KeyValueBackend)
//!
//! ## Decisions
//!
//! | Situation | Decision |
//! |-----------|----------|
//! | outside the configured time range | [`Decision::Skip`] |
//! | no rule matches the domain | [`Decision::ClassifyThenInvert`] |
//! | matching rule is disabled | [`Decision::Skip`] |
//! | matching rule is enabled | [`Decision::ImmediateInvert`] |
//! | matching rule is enabled and legacy | [`Decision::DeferredInvert`] |
//!
//! ## Quick Start
//!
//! ```rust
//! use nocturne::{decide, ClockTime, Decision, DomainRule, Settings, TimeRange};
//!
//! let mut settings = Settings::new();
//! settings.upsert_domain_rule("github.com", DomainRule::enabled()).unwrap();
//! settings.upsert_domain_rule("*.legacy-intranet.local", DomainRule::legacy()).unwrap();
//! settings.set_time_range(TimeRange::new("19:00", "07:00"));
//!
//! let night = ClockTime::from_hm(23, 30).unwrap();
//! let noon = ClockTime::from_hm(12, 0).unwrap();
//!
//! assert_eq!(decide("github.com", night, &settings), Decision::ImmediateInvert);
//! assert_eq!(decide("wiki.legacy-intranet.local", night, &settings), Decision::DeferredInvert);
//! assert_eq!(decide("example.org", night, &settings), Decision::ClassifyThenInvert);
//! assert_eq!(decide("github.com", noon, &settings), Decision::Skip);
//! ```
//!
//! ## Degradation
//!
//! Nothing in the activation path returns an error. Unreadable colors count
//! as "not dark", corrupt stored settings load as empty, and a malformed
//! time range never blocks activation. Errors ([`NocturneError`]) only
//! surface from explicit edits and saves.

pub mod activate;
pub mod color;
pub mod config;
pub mod decide;
mod error;
pub mod host;
pub mod pattern;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod style;

pub use activate::{activate, Activation, Outcome};
pub use color::{brightness, is_already_dark, Rgb};
pub use config::Config;
pub use decide::{decide, Decision};
pub use error::{NocturneError, Result};
pub use host::{ColorProperty, Page, Readiness};
pub use pattern::DomainPattern;
pub use schedule::{ClockTime, TimeRange};
pub use settings::{DomainRule, Settings, TIME_RANGE_KEY};
pub use store::{FileBackend, KeyValueBackend, MemoryBackend, SettingsStore};
pub use style::{StyleApplicator, Stylesheet};
