//! bf-resolver - configuration value resolution for bucketflow.
//!
//! Adapters never read their settings once at startup: every value is
//! described by a [`ParameterSource`](bf_types::ParameterSource) and resolved
//! against the triggering message on each invocation.
//!
//! - [`resolve`] - One value from a literal, message path, flow/global variable or env var
//! - [`resolve_bucket`] - Bucket name with an explicit configured/message precedence
//! - [`resolve_connection`] - Region, endpoint and credential selection
//! - [`MemoryContextStore`] - In-memory flow/global variable store

mod connection;
mod memory;
mod path;
mod resolve;

pub use connection::resolve_connection;
pub use memory::MemoryContextStore;
pub use path::{PathSegment, parse_path};
pub use resolve::{EvaluationContext, ParameterResolver, resolve, resolve_bucket};
