//! Drives one page load from decision to final style.
//!
//! [`Activation`] ties the pieces together: it computes the [`Decision`],
//! waits on the page's lifecycle signals where the decision requires it,
//! runs the luminance classifier and settles the page through the
//! [`StyleApplicator`].
//!
//! ```text
//! Skip ................ lift any veil, inject nothing
//! ImmediateInvert ..... head ready → invert
//! ClassifyThenInvert .. head ready → veil → load complete → classify → lift veil → invert unless dark
//! DeferredInvert ...... load complete → classify → invert unless dark
//! ```
//!
//! The veil is always lifted before (or together with) the terminal style,
//! on every path, so the page cannot be left hidden.
//!
//! # Example
//!
//! ```rust,ignore
//! use nocturne::{Activation, ClockTime, Config, Settings};
//!
//! let outcome = Activation::new(&page, Config::default())
//!     .run("example.com", ClockTime::now(), &settings)
//!     .await;
//! ```

use crate::color::is_already_dark;
use crate::config::Config;
use crate::decide::{decide, Decision};
use crate::host::{ColorProperty, Page};
use crate::schedule::ClockTime;
use crate::settings::Settings;
use crate::store::{KeyValueBackend, SettingsStore};
use crate::style::{StyleApplicator, Stylesheet};

/// What an activation did to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Nothing injected: disabled domain or outside the time range.
    Skipped,
    /// Classified as already dark; nothing injected.
    AlreadyDark,
    /// Inversion applied.
    ///
    /// `deferred` is set when a legacy rule held the inversion back until
    /// full load. A page with no rule also waits for load before it is
    /// classified, but reports `deferred: false`.
    Inverted { deferred: bool },
}

impl Outcome {
    /// Returns `true` if the page ended up inverted.
    pub fn is_inverted(self) -> bool {
        matches!(self, Outcome::Inverted { .. })
    }
}

/// Runs the dark-mode activation for one page.
pub struct Activation<'a, P: Page + ?Sized> {
    page: &'a P,
    config: Config,
}

impl<'a, P: Page + ?Sized> Activation<'a, P> {
    /// Creates an activation for `page`.
    pub fn new(page: &'a P, config: Config) -> Self {
        Activation { page, config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// An applicator for this page using the configured stylesheet.
    pub fn applicator(&self) -> StyleApplicator<'a, P> {
        StyleApplicator::new(self.page, Stylesheet::from_config(&self.config))
    }

    /// Decides for `domain` at `now` and carries the decision out.
    pub async fn run(&self, domain: &str, now: ClockTime, settings: &Settings) -> Outcome {
        let decision = decide(domain, now, settings);
        tracing::debug!(domain, %decision, "activation decided");
        self.execute(decision).await
    }

    /// Loads settings from `store` and runs at the current local time.
    pub async fn run_with_store<B: KeyValueBackend>(
        &self,
        domain: &str,
        store: &SettingsStore<B>,
    ) -> Outcome {
        let settings = store.load();
        self.run(domain, ClockTime::now(), &settings).await
    }

    /// Carries out an already computed decision.
    pub async fn execute(&self, decision: Decision) -> Outcome {
        let styles = self.applicator();

        let outcome = match decision {
            Decision::Skip => {
                styles.reveal();
                Outcome::Skipped
            }
            Decision::ImmediateInvert => {
                self.page.head_ready().await;
                styles.finish(true);
                Outcome::Inverted { deferred: false }
            }
            Decision::ClassifyThenInvert => {
                self.page.head_ready().await;
                if self.config.veil_while_classifying {
                    styles.veil();
                }
                self.page.load_complete().await;
                self.settle(&styles, false)
            }
            Decision::DeferredInvert => {
                self.page.load_complete().await;
                self.settle(&styles, true)
            }
        };

        tracing::debug!(%decision, ?outcome, "activation finished");
        outcome
    }

    /// Reports whether the page currently renders light-on-dark.
    pub fn page_is_dark(&self) -> bool {
        let background = self
            .page
            .body_color(ColorProperty::Background)
            .unwrap_or_default();
        let foreground = if self.config.check_foreground {
            Some(
                self.page
                    .body_color(ColorProperty::Foreground)
                    .unwrap_or_default(),
            )
        } else {
            None
        };
        is_already_dark(&background, foreground.as_deref())
    }

    fn settle(&self, styles: &StyleApplicator<'a, P>, deferred: bool) -> Outcome {
        if self.page_is_dark() {
            styles.finish(false);
            tracing::info!("page already dark, leaving it alone");
            Outcome::AlreadyDark
        } else {
            styles.finish(true);
            Outcome::Inverted { deferred }
        }
    }
}

/// Runs a full activation with the given settings.
pub async fn activate<P: Page + ?Sized>(
    page: &P,
    domain: &str,
    now: ClockTime,
    settings: &Settings,
    config: Config,
) -> Outcome {
    Activation::new(page, config).run(domain, now, settings).await
}
