use std::cell::RefCell;
use std::rc::Rc;

use crate::classify::{ErrorKind, Failure};
use crate::config::ClientConfig;
use crate::model::{DetectionResult, UploadCandidate};
use crate::preview::{PreviewEncoder, PreviewHandle, PreviewSlot, PreviewTask};
use crate::submission::{SubmissionController, SubmissionState, SubmitError, Timer, Transport};
use crate::validate::{FileValidator, RejectReason, ValidatedFile, ValidationOutcome};

pub const NO_FILE_MESSAGE: &str = "Please select an image first";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("A submission is already in progress")]
    Busy,
    #[error("Please select an image first")]
    NoFile,
    #[error(transparent)]
    Rejected(#[from] RejectReason),
    #[error(transparent)]
    Failed(Failure),
}

impl From<SubmitError> for SessionError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Busy => SessionError::Busy,
            SubmitError::Failed(failure) => SessionError::Failed(failure),
        }
    }
}

/// Everything behind the upload form: the current candidate, its preview and
/// the submission state.
///
/// While a submission is in flight, selecting, dropping and resetting are refused.
pub struct DetectionSession<T, C, E> {
    validator: FileValidator,
    controller: SubmissionController<T, C>,
    preview: Rc<PreviewSlot>,
    encoder: Rc<E>,
    candidate: RefCell<Option<ValidatedFile>>,
}

impl<T: Transport, C: Timer, E: PreviewEncoder> DetectionSession<T, C, E> {
    pub fn new(config: ClientConfig, transport: T, timer: C, encoder: E) -> Self {
        Self {
            validator: FileValidator::new(config.upload),
            controller: SubmissionController::new(transport, timer, config.submission),
            preview: Rc::new(PreviewSlot::default()),
            encoder: Rc::new(encoder),
            candidate: RefCell::new(None),
        }
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    pub fn state(&self) -> SubmissionState {
        self.controller.state()
    }

    pub fn preview(&self) -> Option<PreviewHandle> {
        self.preview.current()
    }

    pub fn candidate(&self) -> Option<UploadCandidate> {
        self.candidate
            .borrow()
            .as_ref()
            .map(|file| file.candidate().clone())
    }

    /// Submission is possible with an accepted candidate and nothing in flight.
    pub fn can_submit(&self) -> bool {
        self.candidate.borrow().is_some() && !self.controller.is_busy()
    }

    pub fn subscribe(&self, observer: impl Fn(&SubmissionState) + 'static) {
        self.controller.subscribe(observer);
    }

    /// Validates a picked file. On acceptance the previous candidate and preview
    /// are replaced and the returned task produces the new preview; on rejection
    /// the previous candidate stays in place. A result on display is only
    /// replaced once a new file is accepted.
    pub fn select_file(&self, candidate: UploadCandidate) -> Result<PreviewTask<E>, SessionError> {
        if self.controller.is_busy() {
            log::warn!("Ignoring {} while a submission is in flight", candidate.file_name());
            return Err(SessionError::Busy);
        }

        match self.validator.validate(candidate) {
            ValidationOutcome::Accepted(file) => {
                self.controller.set_state(SubmissionState::Validating);
                let task = PreviewTask::new(
                    self.preview.clone(),
                    self.encoder.clone(),
                    file.candidate().clone(),
                );
                self.candidate.replace(Some(file));
                self.controller.set_state(SubmissionState::Idle);
                Ok(task)
            }
            ValidationOutcome::Rejected(reason) => {
                if !matches!(self.controller.state(), SubmissionState::Succeeded(_)) {
                    self.controller
                        .set_state(SubmissionState::Failed(Failure::from(reason)));
                }
                Err(SessionError::Rejected(reason))
            }
        }
    }

    pub fn drop_file(&self, candidate: UploadCandidate) -> Result<PreviewTask<E>, SessionError> {
        log::debug!("File dropped: {}", candidate.file_name());
        self.select_file(candidate)
    }

    pub async fn trigger_submit(&self) -> Result<DetectionResult, SessionError> {
        if self.controller.is_busy() {
            return Err(SessionError::Busy);
        }
        let Some(file) = self.candidate.borrow().clone() else {
            self.controller.set_state(SubmissionState::Failed(Failure::new(
                ErrorKind::InvalidInput,
                NO_FILE_MESSAGE,
            )));
            return Err(SessionError::NoFile);
        };

        let result = self.controller.submit(&file).await?;
        self.candidate.replace(None);
        self.preview.clear();
        Ok(result)
    }

    pub fn reset(&self) -> Result<(), SessionError> {
        if self.controller.is_busy() {
            log::warn!("Reset refused while a submission is in flight");
            return Err(SessionError::Busy);
        }
        self.candidate.replace(None);
        self.preview.clear();
        self.controller.set_state(SubmissionState::Idle);
        Ok(())
    }
}
