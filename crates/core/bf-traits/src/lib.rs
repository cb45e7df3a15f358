//! Core traits for bucketflow.
//!
//! This crate defines the seams between the adapters and their collaborators:
//! - [`ObjectStore`] / [`StoreFactory`] - The object-store client surface
//! - [`MessageSink`] - Where emitted messages go (Emits)
//! - [`StatusReporter`] - Lifecycle status and error reporting (ReportsStatus)
//! - [`Triggerable`] - Anything that reacts to an inbound message
//! - [`ContextStore`] - Flow- and global-scoped variables

pub mod context;
pub mod sink;
pub mod status;
pub mod store;

pub use context::*;
pub use sink::*;
pub use status::*;
pub use store::*;
