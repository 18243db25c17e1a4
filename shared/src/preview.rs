use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_more::Display;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use crate::model::UploadCandidate;

/// Displayable encoding of a candidate (a data URL or an object URL).
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    #[error("Failed to encode preview: {0}")]
    Encode(String),
}

pub trait PreviewEncoder {
    fn encode(
        &self,
        candidate: &UploadCandidate,
    ) -> impl Future<Output = Result<PreviewHandle, PreviewError>>;
}

/// Encodes the payload in memory as a `data:` URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlEncoder;

impl PreviewEncoder for DataUrlEncoder {
    async fn encode(&self, candidate: &UploadCandidate) -> Result<PreviewHandle, PreviewError> {
        if candidate.bytes().is_empty() {
            return Err(PreviewError::Encode(format!(
                "{} is empty",
                candidate.file_name()
            )));
        }
        Ok(PreviewHandle(format!(
            "data:{};base64,{}",
            candidate.mime_type(),
            STANDARD.encode(candidate.bytes())
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTicket {
    generation: u64,
}

/// Holds at most one preview. Every new candidate bumps the generation, so an
/// encode started for an older candidate can no longer land.
#[derive(Debug, Default)]
pub struct PreviewSlot {
    generation: Cell<u64>,
    current: RefCell<Option<PreviewHandle>>,
}

impl PreviewSlot {
    pub fn begin(&self) -> PreviewTicket {
        self.clear();
        PreviewTicket {
            generation: self.generation.get(),
        }
    }

    pub fn clear(&self) {
        self.generation.set(self.generation.get() + 1);
        self.current.replace(None);
    }

    /// Stores the outcome of an encode. Returns whether a preview was applied.
    pub fn complete(
        &self,
        ticket: PreviewTicket,
        outcome: Result<PreviewHandle, PreviewError>,
    ) -> bool {
        if ticket.generation != self.generation.get() {
            log::debug!(
                "Discarding stale preview (generation {} superseded by {})",
                ticket.generation,
                self.generation.get()
            );
            return false;
        }
        match outcome {
            Ok(handle) => {
                self.current.replace(Some(handle));
                true
            }
            Err(e) => {
                log::warn!("{}", e);
                false
            }
        }
    }

    pub fn current(&self) -> Option<PreviewHandle> {
        self.current.borrow().clone()
    }
}

/// An encode job handed back to the caller so it can run off the critical path.
pub struct PreviewTask<E> {
    ticket: PreviewTicket,
    slot: Rc<PreviewSlot>,
    encoder: Rc<E>,
    candidate: UploadCandidate,
}

impl<E: PreviewEncoder> PreviewTask<E> {
    pub(crate) fn new(
        slot: Rc<PreviewSlot>,
        encoder: Rc<E>,
        candidate: UploadCandidate,
    ) -> Self {
        let ticket = slot.begin();
        Self {
            ticket,
            slot,
            encoder,
            candidate,
        }
    }

    pub async fn run(self) -> bool {
        let outcome = self.encoder.encode(&self.candidate).await;
        self.slot.complete(self.ticket, outcome)
    }
}
