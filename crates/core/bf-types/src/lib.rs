//! Core types for bucketflow.
//!
//! This crate defines the data model shared by the resolver, the object-store
//! adapters, the bucket poller and the request handlers:
//!
//! - [`ParameterSource`] - Where a configuration value is read from
//! - [`Message`] - The flow event passed between adapters
//! - [`ObjectEntry`] - One entry of a bucket listing
//! - [`ChangeEvent`] - An add/delete detected by the poller
//! - [`StoreConnectionConfig`] - Connection settings before resolution

pub mod connection;
pub mod event;
pub mod message;
pub mod object;
pub mod parameter;
pub mod status;

pub use connection::{Credentials, ResolvedConnection, StoreConnectionConfig};
pub use event::{ChangeEvent, ChangeKind};
pub use message::{Message, Payload};
pub use object::{ObjectEntry, base_name};
pub use parameter::{BucketPrecedence, ParameterSource};
pub use status::NodeStatus;
