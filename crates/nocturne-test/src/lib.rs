//! In-process page harness for nocturne.
//!
//! [`FakePage`] implements [`nocturne::Page`] over plain in-memory state: a
//! list of injected style nodes, the body's computed colors, and two
//! [`Readiness`] latches for "head exists" and "page loaded". Tests control
//! when each latch fires and inspect the style nodes in between, which is
//! how the veil ordering is checked.
//!
//! ```rust
//! use std::task::Poll;
//! use nocturne::{activate, ClockTime, Config, Outcome, Settings};
//! use nocturne_test::{poll_once, FakePage};
//!
//! let page = FakePage::new().with_body("rgb(255, 255, 255)", "rgb(0, 0, 0)");
//! let settings = Settings::new();
//! let now = ClockTime::from_hm(21, 0).unwrap();
//!
//! let mut run = Box::pin(activate(&page, "example.com", now, &settings, Config::default()));
//! assert!(poll_once(run.as_mut()).is_pending());
//!
//! page.finish_loading();
//! assert_eq!(poll_once(run.as_mut()), Poll::Ready(Outcome::Inverted { deferred: false }));
//! assert!(page.is_inverted());
//! ```

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::task::noop_waker_ref;
use nocturne::host::{ColorProperty, Page, Readiness};
use nocturne::style::{INVERSION_STYLE_ID, VEIL_STYLE_ID};

/// A style mutation recorded by [`FakePage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleEvent {
    Inserted(String),
    Removed(String),
}

#[derive(Debug, Default)]
struct PageState {
    styles: Vec<(String, String)>,
    events: Vec<StyleEvent>,
    background: Option<String>,
    foreground: Option<String>,
}

/// An in-memory page.
#[derive(Debug, Default)]
pub struct FakePage {
    state: RefCell<PageState>,
    head: Readiness,
    load: Readiness,
}

impl FakePage {
    /// A page still navigating: no head, not loaded, no body colors.
    pub fn new() -> Self {
        Self::default()
    }

    /// A page that is already fully loaded.
    pub fn loaded() -> Self {
        let page = Self::new();
        page.finish_loading();
        page
    }

    /// Sets the body's computed background and text colors.
    pub fn with_body(self, background: impl Into<String>, foreground: impl Into<String>) -> Self {
        self.set_body(Some(background.into()), Some(foreground.into()));
        self
    }

    /// Sets only the body's computed background color.
    pub fn with_background(self, background: impl Into<String>) -> Self {
        self.set_body(Some(background.into()), None);
        self
    }

    /// Replaces the body's computed colors.
    pub fn set_body(&self, background: Option<String>, foreground: Option<String>) {
        let mut state = self.state.borrow_mut();
        state.background = background;
        state.foreground = foreground;
    }

    /// Fires the "head exists" signal.
    pub fn attach_head(&self) {
        self.head.signal();
    }

    /// Fires both the head and the load-complete signals.
    pub fn finish_loading(&self) {
        self.head.signal();
        self.load.signal();
    }

    /// Ids of the current style nodes, in insertion order.
    pub fn style_ids(&self) -> Vec<String> {
        self.state
            .borrow()
            .styles
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of style nodes carrying `id`.
    pub fn style_count(&self, id: &str) -> usize {
        self.state
            .borrow()
            .styles
            .iter()
            .filter(|(existing, _)| existing == id)
            .count()
    }

    /// Content of the first style node carrying `id`.
    pub fn style_css(&self, id: &str) -> Option<String> {
        self.state
            .borrow()
            .styles
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, css)| css.clone())
    }

    /// Every style insertion and removal so far.
    pub fn events(&self) -> Vec<StyleEvent> {
        self.state.borrow().events.clone()
    }

    /// Returns `true` if the inversion style is present.
    pub fn is_inverted(&self) -> bool {
        self.has_style(INVERSION_STYLE_ID)
    }

    /// Returns `true` if the veil style is present.
    pub fn is_veiled(&self) -> bool {
        self.has_style(VEIL_STYLE_ID)
    }
}

impl Page for FakePage {
    fn body_color(&self, property: ColorProperty) -> Option<String> {
        let state = self.state.borrow();
        match property {
            ColorProperty::Background => state.background.clone(),
            ColorProperty::Foreground => state.foreground.clone(),
        }
    }

    fn has_style(&self, id: &str) -> bool {
        self.style_count(id) > 0
    }

    fn insert_style(&self, id: &str, css: &str) {
        assert!(
            self.head.is_signalled(),
            "style '{}' inserted before the head exists",
            id
        );
        let mut state = self.state.borrow_mut();
        state.styles.push((id.to_string(), css.to_string()));
        state.events.push(StyleEvent::Inserted(id.to_string()));
    }

    fn remove_style(&self, id: &str) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.styles.len();
        state.styles.retain(|(existing, _)| existing != id);
        let removed = state.styles.len() != before;
        if removed {
            state.events.push(StyleEvent::Removed(id.to_string()));
        }
        removed
    }

    fn head_ready(&self) -> LocalBoxFuture<'_, ()> {
        self.head.wait()
    }

    fn load_complete(&self) -> LocalBoxFuture<'_, ()> {
        self.load.wait()
    }
}

/// Polls a future once with a no-op waker.
///
/// Lets a test advance an activation step by step, firing page signals
/// between polls.
pub fn poll_once<F: Future + ?Sized>(future: Pin<&mut F>) -> Poll<F::Output> {
    let mut cx = Context::from_waker(noop_waker_ref());
    future.poll(&mut cx)
}

/// Installs a `tracing` subscriber writing to the test output.
///
/// Filtered by `RUST_LOG`; calling it more than once is harmless.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
