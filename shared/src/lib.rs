//! Leaf image detection pipeline: validation, preview, submission, normalization
//! and error classification, independent of the host platform.

pub mod api;
pub mod classify;
pub mod config;
pub mod model;
pub mod normalize;
pub mod preview;
mod report;
pub mod session;
pub mod submission;
pub mod validate;

pub use classify::{ErrorKind, Failure, TransportFailure};
pub use config::ClientConfig;
pub use model::{Category, DetectionResult, TopPrediction, UploadCandidate};
pub use preview::{PreviewEncoder, PreviewHandle};
pub use session::{DetectionSession, SessionError};
pub use submission::{HttpReply, SubmissionController, SubmissionState, SubmitError, Timer, Transport};
pub use validate::{FileValidator, RejectReason, ValidatedFile, ValidationOutcome};
