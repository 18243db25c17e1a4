use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ErrorKind {
    InvalidInput,
    PayloadTooLarge,
    ServerRejected,
    Unreachable,
    Timeout,
    Unknown,
}

/// Raw ways a submission can go wrong on the network side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// A response arrived with a non-success status.
    Status { status: u16, detail: Option<String> },
    /// The request left but nothing came back.
    NoResponse(String),
    /// The deadline elapsed first.
    TimedOut,
    Other(String),
}

/// A classified failure; `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_results(detail: Option<&str>) -> Self {
        match detail {
            Some(detail) => Self::new(ErrorKind::Unknown, format!("No results found: {}", detail)),
            None => Self::new(ErrorKind::Unknown, "No results found"),
        }
    }
}

/// Maps a transport failure onto one user-facing kind and message.
///
/// Status codes are inspected before the no-response and timeout branches.
pub fn classify(failure: &TransportFailure) -> Failure {
    match failure {
        TransportFailure::Status { status: 413, .. } => Failure::new(
            ErrorKind::PayloadTooLarge,
            "File too large. Please upload an image smaller than 16MB",
        ),
        TransportFailure::Status { status: 400, .. } => Failure::new(
            ErrorKind::InvalidInput,
            "Invalid file type. Please upload JPG, PNG, or JPEG",
        ),
        TransportFailure::Status {
            detail: Some(detail),
            ..
        } => Failure::new(ErrorKind::ServerRejected, format!("Server error: {}", detail)),
        TransportFailure::Status { status, detail: None } => {
            Failure::new(ErrorKind::ServerRejected, format!("Server error: {}", status))
        }
        TransportFailure::NoResponse(_) => Failure::new(
            ErrorKind::Unreachable,
            "No response from server. Please check if the backend is running.",
        ),
        TransportFailure::TimedOut => {
            Failure::new(ErrorKind::Timeout, "Request timed out. Please try again.")
        }
        TransportFailure::Other(description) => Failure::new(
            ErrorKind::Unknown,
            format!("Analysis failed: {}", description),
        ),
    }
}
