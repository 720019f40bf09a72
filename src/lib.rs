//! # Folio Backend
//!
//! Backend for a small personal site: a file-backed project store with a
//! gated admin CRUD API, two public form relays, and static frontend
//! serving.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use folio::{ProjectDraft, ProjectStore};
//!
//! // Open (or start) the projects file
//! let store = ProjectStore::open("./projects.json")?;
//!
//! // Add a project — the store assigns the id and persists before returning
//! let record = store.add(ProjectDraft {
//!     title: "Personal site".into(),
//!     description: "This site".into(),
//!     image: "/assets/site.png".into(),
//!     github: "https://github.com/folio/site".into(),
//! })?;
//!
//! // Read it back
//! assert_eq!(store.list().projects.last().unwrap().id, record.id);
//! ```
//!
//! ## Key Concepts
//!
//! ### Project store
//!
//! The **store** is the single owner of the project collection and its
//! durable JSON mirror. Mutations are serialized, persisted before they
//! are acknowledged, and rolled back in memory when the durable write
//! fails — the caller never observes state that disk does not hold.
//!
//! ### Request gate
//!
//! Mutating routes sit behind the **gate**: an IP allowlist and an HTTP
//! Basic credential challenge, independently toggleable. The store never
//! makes authorization decisions.
//!
//! ### Notification relay
//!
//! The newsletter and contact forms format an email and hand it to the
//! **relay** (SMTP in production). The relay shares no state with the
//! store.
//!
//! ## Thread Safety
//!
//! [`ProjectStore`] is `Send + Sync` and is shared across request
//! handlers using `Arc`. Reads run concurrently; mutations are mutually
//! exclusive.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// Module declarations
// ============================================================================

mod config;
mod error;

pub mod gate;
pub mod http;
pub mod persist;
pub mod relay;
pub mod store;

// Domain modules
mod project;

// ============================================================================
// Public API re-exports
// ============================================================================

// Main store interface
pub use store::ProjectStore;

// Configuration
pub use config::{Config, MailConfig};

// Error handling
pub use error::{
    BackendError, GateDenied, NotFoundError, PersistenceError, RelayError, Result,
    ValidationError,
};

// Core types
pub use project::{ProjectCollection, ProjectDraft, ProjectId, ProjectRecord};

// Collaborators
pub use gate::{Credentials, RequestContext, RequestGate};
pub use relay::{EmailMessage, NotificationRelay};

/// Convenient imports for common usage.
///
/// ```rust
/// use folio::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{BackendError, Result};
    pub use crate::project::{ProjectCollection, ProjectDraft, ProjectId, ProjectRecord};
    pub use crate::store::ProjectStore;
}
