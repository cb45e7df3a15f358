//! S3 object-store adapter.
//!
//! This crate implements the [`ObjectStore`](bf_traits::ObjectStore) surface on
//! top of the AWS SDK:
//! - Client construction from a resolved connection (region, endpoint,
//!   path-style addressing, plain-HTTP endpoints, static or ambient credentials)
//! - Marker-based listing, streaming downloads, uploads and pre-signed URLs

mod client;
mod store;

pub use client::{create_s3_client, effective_endpoint};
pub use store::{S3Store, S3StoreFactory};
