//! Request lifecycle: one in-flight submission, a cosmetic progress ticker and a
//! deadline, all raced on the caller's task.

use futures::future::{self, Either};
use std::cell::RefCell;
use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use crate::api::{ErrorBody, PredictResponse};
use crate::classify::{Failure, TransportFailure, classify};
use crate::config::SubmissionPolicy;
use crate::model::DetectionResult;
use crate::normalize::normalize;
use crate::validate::ValidatedFile;

/// Status and body of whatever the service answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one multipart upload. Dropping the returned future must abandon the request.
pub trait Transport {
    fn send(&self, file: &ValidatedFile)
    -> impl Future<Output = Result<HttpReply, TransportFailure>>;
}

pub trait Timer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting { progress: u8 },
    Succeeded(DetectionResult),
    Failed(Failure),
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting { .. })
    }

    /// Displayed progress; zero outside of `Submitting`.
    pub fn progress(&self) -> u8 {
        match self {
            SubmissionState::Submitting { progress } => *progress,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    Busy,
    #[error(transparent)]
    Failed(#[from] Failure),
}

type Observer = Box<dyn Fn(&SubmissionState)>;

pub struct SubmissionController<T, C> {
    transport: T,
    timer: C,
    policy: SubmissionPolicy,
    state: RefCell<SubmissionState>,
    observers: RefCell<Vec<Observer>>,
}

impl<T: Transport, C: Timer> SubmissionController<T, C> {
    pub fn new(transport: T, timer: C, policy: SubmissionPolicy) -> Self {
        Self {
            transport,
            timer,
            policy,
            state: RefCell::new(SubmissionState::Idle),
            observers: RefCell::new(Vec::new()),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_submitting()
    }

    pub fn policy(&self) -> &SubmissionPolicy {
        &self.policy
    }

    /// Registers a callback invoked after every state change.
    pub fn subscribe(&self, observer: impl Fn(&SubmissionState) + 'static) {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    pub(crate) fn set_state(&self, next: SubmissionState) {
        log::debug!("Submission state -> {:?}", next);
        self.state.replace(next.clone());
        for observer in self.observers.borrow().iter() {
            observer(&next);
        }
    }

    pub async fn submit(&self, file: &ValidatedFile) -> Result<DetectionResult, SubmitError> {
        if self.is_busy() {
            log::warn!(
                "Ignoring submission of {}: another one is in flight",
                file.candidate().file_name()
            );
            return Err(SubmitError::Busy);
        }

        log::info!(
            "Submitting {} ({} bytes) to {}",
            file.candidate().file_name(),
            file.candidate().size(),
            self.policy.endpoint()
        );
        self.set_state(SubmissionState::Submitting {
            progress: self.policy.initial_progress,
        });

        match self.exchange(file).await {
            Ok(reply) => self.settle(reply).await,
            Err(failure) => Err(self.fail(classify(&failure))),
        }
    }

    /// Races the request against the deadline while the ticker runs. Whatever
    /// settles the request drops the ticker with it.
    async fn exchange(&self, file: &ValidatedFile) -> Result<HttpReply, TransportFailure> {
        let request = async {
            let send = pin!(self.transport.send(file));
            let deadline = pin!(self.timer.sleep(self.policy.timeout()));
            match future::select(send, deadline).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => Err(TransportFailure::TimedOut),
            }
        };
        let request = pin!(request);
        let ticker = pin!(self.tick_progress());

        match future::select(request, ticker).await {
            Either::Left((result, _)) => result,
            Either::Right(((), request)) => request.await,
        }
    }

    async fn tick_progress(&self) {
        let cap = self.policy.progress_cap;
        loop {
            self.timer.sleep(self.policy.tick_interval()).await;
            let current = match &*self.state.borrow() {
                SubmissionState::Submitting { progress } => *progress,
                _ => return,
            };
            if current >= cap {
                return;
            }
            let next = current.saturating_add(self.policy.tick_step).min(cap);
            self.set_state(SubmissionState::Submitting { progress: next });
        }
    }

    async fn settle(&self, reply: HttpReply) -> Result<DetectionResult, SubmitError> {
        if !reply.is_success() {
            let failure = TransportFailure::Status {
                status: reply.status,
                detail: ErrorBody::detail(&reply.body),
            };
            return Err(self.fail(classify(&failure)));
        }

        let response: PredictResponse = match serde_json::from_str(&reply.body) {
            Ok(response) => response,
            Err(e) => {
                let failure = TransportFailure::Other(format!("malformed response ({})", e));
                return Err(self.fail(classify(&failure)));
            }
        };
        let result = normalize(&response).map_err(|failure| self.fail(failure))?;

        self.set_state(SubmissionState::Submitting { progress: 100 });
        self.timer.sleep(self.policy.settle_delay()).await;

        log::info!(
            "Detected {} ({}, {}%)",
            result.class_name,
            result.category,
            result.confidence_percent
        );
        self.set_state(SubmissionState::Succeeded(result.clone()));
        Ok(result)
    }

    fn fail(&self, failure: Failure) -> SubmitError {
        log::warn!("Submission failed ({}): {}", failure.kind, failure.message);
        self.set_state(SubmissionState::Failed(failure.clone()));
        SubmitError::Failed(failure)
    }
}
