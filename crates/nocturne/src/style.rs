//! Inversion stylesheet and its application to a page.
//!
//! Dark mode is a single filter on the root element:
//!
//! ```css
//! html { filter: invert(1) hue-rotate(180deg) contrast(0.8); }
//! ```
//!
//! Inverting the root also inverts photos and video, so media elements get
//! a counter-filter that flips them back. The settings panel gets the same
//! counter-filter, and media inside the panel are reset, so the panel always
//! renders with its own colors whether or not the page is inverted.
//!
//! Each stylesheet lives in one `<style>` node with a fixed id, which is what
//! makes [`StyleApplicator`] idempotent: applying twice finds the node
//! already present and leaves it alone.

use std::fmt::Write as _;

use crate::config::Config;
use crate::host::Page;

/// Id of the style node carrying the inversion.
pub const INVERSION_STYLE_ID: &str = "nocturne-inversion";

/// Id of the style node hiding the page while a decision is pending.
pub const VEIL_STYLE_ID: &str = "nocturne-veil";

/// Elements that are flipped back after the root inversion.
pub const MEDIA_SELECTORS: &[&str] = &["img", "video", "picture", "canvas", "iframe", "embed"];

const COUNTER_FILTER: &str = "invert(1) hue-rotate(180deg)";

/// CSS for the transitional veil.
pub const VEIL_CSS: &str = "html { visibility: hidden !important; }\n";

/// Builds the inversion CSS.
#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    panel_class: String,
    contrast: f32,
}

impl Stylesheet {
    /// Creates a stylesheet exempting `panel_class`, with the given contrast.
    pub fn new(panel_class: impl Into<String>, contrast: f32) -> Self {
        Stylesheet {
            panel_class: panel_class.into(),
            contrast,
        }
    }

    /// Creates a stylesheet from the engine configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.panel_class.clone(), config.contrast)
    }

    /// The class exempted from the inversion.
    pub fn panel_class(&self) -> &str {
        &self.panel_class
    }

    /// Renders the inversion CSS.
    pub fn inversion_css(&self) -> String {
        let mut css = String::new();

        let _ = write!(css, "html {{ filter: {}", COUNTER_FILTER);
        if (self.contrast - 1.0).abs() > f32::EPSILON {
            let _ = write!(css, " contrast({})", self.contrast);
        }
        css.push_str("; }\n");

        let _ = writeln!(
            css,
            "{} {{ filter: {}; }}",
            MEDIA_SELECTORS.join(", "),
            COUNTER_FILTER
        );

        let class = self.panel_class.trim();
        if !class.is_empty() {
            let _ = writeln!(css, ".{} {{ filter: {} !important; }}", class, COUNTER_FILTER);
            let nested = MEDIA_SELECTORS
                .iter()
                .map(|tag| format!(".{} {}", class, tag))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(css, "{} {{ filter: none !important; }}", nested);
        }

        css
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Adds and removes the inversion and veil styles on a page.
pub struct StyleApplicator<'a, P: Page + ?Sized> {
    page: &'a P,
    stylesheet: Stylesheet,
}

impl<'a, P: Page + ?Sized> StyleApplicator<'a, P> {
    /// Creates an applicator for `page`.
    pub fn new(page: &'a P, stylesheet: Stylesheet) -> Self {
        StyleApplicator { page, stylesheet }
    }

    /// The stylesheet this applicator injects.
    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    /// Injects the inversion unless it is already present.
    ///
    /// Returns `true` if a style node was added.
    pub fn apply_inversion(&self) -> bool {
        if self.page.has_style(INVERSION_STYLE_ID) {
            return false;
        }
        self.page
            .insert_style(INVERSION_STYLE_ID, &self.stylesheet.inversion_css());
        tracing::info!("dark mode inversion applied");
        true
    }

    /// Removes the inversion. Returns `true` if it was present.
    pub fn remove_inversion(&self) -> bool {
        let removed = self.page.remove_style(INVERSION_STYLE_ID);
        if removed {
            tracing::info!("dark mode inversion removed");
        }
        removed
    }

    /// Hides the page until [`reveal`](Self::reveal). Returns `true` if added.
    pub fn veil(&self) -> bool {
        if self.page.has_style(VEIL_STYLE_ID) {
            return false;
        }
        self.page.insert_style(VEIL_STYLE_ID, VEIL_CSS);
        true
    }

    /// Removes the veil. Returns `true` if it was present.
    pub fn reveal(&self) -> bool {
        self.page.remove_style(VEIL_STYLE_ID)
    }

    /// Settles the page: lifts the veil, then applies the inversion if asked.
    pub fn finish(&self, invert: bool) {
        self.reveal();
        if invert {
            self.apply_inversion();
        }
    }

    /// Returns `true` if the inversion is present.
    pub fn is_inverted(&self) -> bool {
        self.page.has_style(INVERSION_STYLE_ID)
    }

    /// Returns `true` if the veil is present.
    pub fn is_veiled(&self) -> bool {
        self.page.has_style(VEIL_STYLE_ID)
    }
}
