use crate::classify::{ErrorKind, Failure};
use crate::config::{MIB, UploadPolicy};
use crate::model::UploadCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("Please upload a valid image (JPG, PNG, or WebP)")]
    UnsupportedType,
    #[error("File size should be less than {}MB", .max_bytes.div_ceil(MIB))]
    TooLarge { max_bytes: u64 },
}

impl RejectReason {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RejectReason::UnsupportedType => ErrorKind::InvalidInput,
            RejectReason::TooLarge { .. } => ErrorKind::PayloadTooLarge,
        }
    }
}

impl From<RejectReason> for Failure {
    fn from(reason: RejectReason) -> Self {
        Failure::new(reason.kind(), reason.to_string())
    }
}

/// A candidate that passed validation. Only [`FileValidator`] creates these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFile(UploadCandidate);

impl ValidatedFile {
    pub fn candidate(&self) -> &UploadCandidate {
        &self.0
    }

    pub fn into_inner(self) -> UploadCandidate {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted(ValidatedFile),
    Rejected(RejectReason),
}

impl ValidationOutcome {
    pub fn into_result(self) -> Result<ValidatedFile, RejectReason> {
        match self {
            ValidationOutcome::Accepted(file) => Ok(file),
            ValidationOutcome::Rejected(reason) => Err(reason),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileValidator {
    policy: UploadPolicy,
}

impl FileValidator {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    pub fn max_bytes(&self) -> u64 {
        self.policy.max_bytes
    }

    /// Checks declared metadata only. The size ceiling is checked first, so an
    /// oversize file is reported as such whatever its type.
    pub fn check(&self, mime_type: &str, size: u64) -> Result<(), RejectReason> {
        if size > self.policy.max_bytes {
            return Err(RejectReason::TooLarge {
                max_bytes: self.policy.max_bytes,
            });
        }
        let mime_type = mime_type.trim();
        if !self
            .policy
            .allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
        {
            return Err(RejectReason::UnsupportedType);
        }
        Ok(())
    }

    pub fn validate(&self, candidate: UploadCandidate) -> ValidationOutcome {
        match self.check(candidate.mime_type(), candidate.size()) {
            Ok(()) => ValidationOutcome::Accepted(ValidatedFile(candidate)),
            Err(reason) => {
                log::info!("Rejected {}: {}", candidate.file_name(), reason);
                ValidationOutcome::Rejected(reason)
            }
        }
    }
}
