//! Cooperative shutdown signalling
//!
//! A [`ShutdownSignal`] is shared between the Ctrl+C handler and the
//! orchestrator loop. The loop polls it between units and races its pacing
//! sleeps against the async waiter: on request it stops issuing new
//! fetches, finishes (or fails) the in-flight write normally, and surfaces
//! an interrupted outcome with accurate partial counts. Already-written
//! files stay on disk.

use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared handle to a shutdown signal.
pub type SharedShutdown = Arc<ShutdownSignal>;

static GLOBAL_SHUTDOWN: OnceCell<SharedShutdown> = OnceCell::new();

/// Register a global shutdown handle for subsystems to discover lazily.
pub fn set_global_shutdown(handle: SharedShutdown) {
    let _ = GLOBAL_SHUTDOWN.set(handle);
}

/// The registered global shutdown handle, if any.
pub fn get_global_shutdown() -> Option<SharedShutdown> {
    GLOBAL_SHUTDOWN.get().cloned()
}

/// One-shot shutdown flag with async notification.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// New signal wrapped in [`Arc`] for sharing across tasks.
    pub fn shared() -> SharedShutdown {
        Arc::new(Self::new())
    }

    /// Request shutdown; waiters are notified exactly once.
    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Wait until shutdown is requested; returns immediately if it already
    /// was.
    pub async fn wait_requested(&self) {
        if self.is_requested() {
            return;
        }
        self.notify.notified().await;
    }
}
