//! Graceful shutdown coordination
//!
//! A single global notifier that the Ctrl-C handler (or any component)
//! trips; background loops and the webserver all watch it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::sync::Notify;

use crate::logger::{self, LogTag};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

static SHUTDOWN_NOTIFY: Lazy<Arc<Notify>> = Lazy::new(|| Arc::new(Notify::new()));

/// Install the Ctrl-C handler
///
/// Call once during startup; a second Ctrl-C aborts immediately.
pub fn install_ctrlc_handler() {
    let result = ctrlc::set_handler(|| {
        if is_shutdown_requested() {
            eprintln!("Forced exit");
            std::process::exit(130);
        }
        logger::info(LogTag::System, "Shutdown requested (Ctrl-C)");
        request_shutdown();
    });

    if let Err(e) = result {
        logger::warning(
            LogTag::System,
            &format!("Failed to install Ctrl-C handler: {}", e),
        );
    }
}

/// Trip the shutdown notifier
pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
    SHUTDOWN_NOTIFY.notify_waiters();
    crate::webserver::shutdown();
}

/// Whether shutdown has been requested
pub fn is_shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

/// Wait until shutdown is requested
pub async fn wait_for_shutdown() {
    if is_shutdown_requested() {
        return;
    }
    SHUTDOWN_NOTIFY.notified().await;
}
