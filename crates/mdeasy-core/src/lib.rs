//! mdeasy-core: the state and transforms behind the MD-Easy document server
//!
//! This crate provides:
//! - A monotonically increasing generation counter for the document set
//! - A broadcast notification bus that wakes every waiting observer on change
//! - Link rewriting for rendered HTML so navigation stays inside the viewer
//! - A constant-time credential gate for the refresh hook
//! - Traversal-safe document paths, a document tree provider and a Markdown renderer
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mdeasy_core::{NotificationBus, VersionCounter};
//!
//! let bus = NotificationBus::new(Arc::new(VersionCounter::new()));
//! let mut waiter = bus.subscribe();
//!
//! // Writer side
//! bus.publish();
//!
//! // Observer side
//! let outcome = waiter.next(Duration::from_secs(30)).await;
//! ```

pub mod guard;
pub mod html;
pub mod links;
pub mod notify;
pub mod path;
pub mod render;
pub mod tree;
pub mod version;

pub use guard::{Credential, REFRESH_KEY_HEADER, Unauthorized, authorize};
pub use links::{DEFAULT_EXTENSION, LinkRewriter};
pub use notify::{HEARTBEAT_INTERVAL_SECS, NotificationBus, Outcome, Waiter};
pub use path::{DocPath, PathError};
pub use render::render_markdown;
pub use tree::{DocumentTree, TreeError, TreeResult};
pub use version::{Generation, VersionCounter};
