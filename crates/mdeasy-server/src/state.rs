//! Application state shared across handlers.

use std::future::Future;
use std::sync::Arc;

use mdeasy_core::{DocumentTree, LinkRewriter, NotificationBus, VersionCounter};
use tokio::sync::watch;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Documents under the configured root.
    tree: Arc<DocumentTree>,
    /// Link rewriter for rendered documents.
    rewriter: Arc<LinkRewriter>,
    /// Generation counter and change notification.
    bus: NotificationBus,
    /// Set once the server starts shutting down.
    closing: Arc<watch::Sender<bool>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ServerConfig, tree: DocumentTree, counter: Arc<VersionCounter>) -> Self {
        let rewriter = LinkRewriter::new(config.base_url.clone()).with_extension(tree.extension());
        Self {
            config: Arc::new(config),
            tree: Arc::new(tree),
            rewriter: Arc::new(rewriter),
            bus: NotificationBus::new(counter),
            closing: Arc::new(watch::Sender::new(false)),
        }
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get a handle to the document tree.
    pub fn tree(&self) -> &Arc<DocumentTree> {
        &self.tree
    }

    /// Get a reference to the link rewriter.
    pub fn rewriter(&self) -> &LinkRewriter {
        &self.rewriter
    }

    /// Get a reference to the notification bus.
    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    /// Ask long-lived streams to finish so graceful shutdown can complete.
    pub fn shutdown(&self) {
        self.closing.send_replace(true);
    }

    /// Resolves once [`shutdown`](Self::shutdown) has been called.
    pub fn closed(&self) -> impl Future<Output = ()> + Send + 'static + use<> {
        let mut closing = self.closing.subscribe();
        async move {
            // An error means the sender is gone, which also means shutdown.
            let _ = closing.wait_for(|closing| *closing).await;
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("generation", &self.bus.current())
            .finish_non_exhaustive()
    }
}
