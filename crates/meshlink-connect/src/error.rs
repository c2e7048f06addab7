//! Error types for the meshlink-connect crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("gRPC status error: {0}")]
    Status(#[from] tonic::Status),

    #[error("Invalid session metadata: {0}")]
    InvalidMetadata(#[from] tonic::metadata::errors::InvalidMetadataValue),

    #[error("Connection to {endpoint} failed: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },
}

impl ConnectError {
    /// The gRPC status behind this error, if it came back from a call
    pub fn status(&self) -> Option<&tonic::Status> {
        match self {
            ConnectError::Status(status) => Some(status),
            _ => None,
        }
    }

    /// Whether the remote side does not implement the called RPC
    pub fn is_unimplemented(&self) -> bool {
        self.status()
            .map(|s| s.code() == tonic::Code::Unimplemented)
            .unwrap_or(false)
    }
}
