//! Error types for the object store layer.

use std::path::PathBuf;

/// Errors that can occur while moving artifacts to or from the bucket.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Region or bucket is missing, so no client was built.
    #[error("S3 not configured: set AWS_REGION and S3_BUCKET_NAME")]
    NotConfigured,

    /// The bucket request failed.
    #[error("object store request for {key} failed: {message}")]
    Transport { key: String, message: String },

    /// Reading or writing the local side of a transfer failed.
    #[error("local artifact i/o failed for {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
