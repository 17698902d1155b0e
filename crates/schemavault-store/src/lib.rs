//! Object storage for changelog artifacts.
//!
//! [`ObjectStoreGateway`] moves artifacts between the local scratch directory
//! and a bucket, placing every key under a configured prefix. The bucket
//! itself sits behind the [`ObjectStoreClient`] trait: [`S3ObjectStore`] talks
//! to S3 (or an S3-compatible endpoint), [`MemoryObjectStore`] keeps objects in
//! process for tests and local runs.
//!
//! Transfers are whole-object. An interrupted upload or download is a failure
//! of the call; there is no resumption.

mod client;
mod error;
mod gateway;
mod s3;

pub use client::{MemoryObjectStore, ObjectStoreClient};
pub use error::StoreError;
pub use gateway::{join_key, ObjectStoreGateway};
pub use s3::{S3ObjectStore, StoreSettings};
