//! Host page abstraction.
//!
//! The engine never touches a DOM directly. Everything it needs from the
//! page is behind [`Page`]: reading the body's computed colors, adding and
//! removing `<style>` nodes by id, and two lifecycle signals. A browser
//! binding implements it over the real document; tests use the harness in
//! `nocturne-test`.
//!
//! The lifecycle signals are futures. A host typically backs them with a
//! [`Readiness`] latch that its mutation observer (head inserted) or `load`
//! event listener resolves.

use std::sync::{Arc, Mutex};

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture, Shared};

/// Which computed color of the document body to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorProperty {
    /// `background-color`
    Background,
    /// `color`
    Foreground,
}

impl ColorProperty {
    /// The CSS property name.
    pub fn css_name(self) -> &'static str {
        match self {
            ColorProperty::Background => "background-color",
            ColorProperty::Foreground => "color",
        }
    }
}

/// The page the engine runs against.
///
/// Methods take `&self`; hosts are single-threaded and use interior
/// mutability the way DOM handles do.
pub trait Page {
    /// Computed color of the body, as the host's style reader returns it
    /// (e.g. `rgb(255, 255, 255)`). `None` when the body does not exist yet.
    fn body_color(&self, property: ColorProperty) -> Option<String>;

    /// Returns `true` if a style node with this id is in the document head.
    fn has_style(&self, id: &str) -> bool;

    /// Appends a style node with this id and content to the head.
    ///
    /// Only called after [`head_ready`](Self::head_ready) resolved.
    fn insert_style(&self, id: &str, css: &str);

    /// Removes the style node with this id, returning whether one existed.
    fn remove_style(&self, id: &str) -> bool;

    /// Resolves once the document head exists and can receive styles.
    fn head_ready(&self) -> LocalBoxFuture<'_, ()>;

    /// Resolves once the page has fully loaded.
    fn load_complete(&self) -> LocalBoxFuture<'_, ()>;
}

/// A one-shot readiness latch.
///
/// Clones share state: signalling any clone resolves every pending and
/// future [`wait`](Self::wait). Signalling twice is a no-op.
#[derive(Clone)]
pub struct Readiness {
    trigger: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    ready: Shared<oneshot::Receiver<()>>,
}

impl Readiness {
    /// Creates an unsignalled latch.
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Readiness {
            trigger: Arc::new(Mutex::new(Some(tx))),
            ready: rx.shared(),
        }
    }

    /// Creates a latch that is already signalled.
    pub fn signalled() -> Self {
        let readiness = Self::new();
        readiness.signal();
        readiness
    }

    /// Marks the condition as reached.
    pub fn signal(&self) {
        let sender = self
            .trigger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(sender) = sender {
            let _ = sender.send(());
        }
    }

    /// Returns `true` once [`signal`](Self::signal) has been called.
    pub fn is_signalled(&self) -> bool {
        self.trigger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none()
    }

    /// Waits for the signal.
    ///
    /// If every handle is dropped without signalling, the wait never
    /// resolves.
    pub fn wait(&self) -> LocalBoxFuture<'static, ()> {
        self.ready
            .clone()
            .then(|result| match result {
                Ok(()) => future::ready(()).left_future(),
                Err(_) => future::pending::<()>().right_future(),
            })
            .boxed_local()
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Readiness")
            .field("signalled", &self.is_signalled())
            .finish()
    }
}
