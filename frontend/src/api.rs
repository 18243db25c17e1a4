use gloo_file::Blob;
use gloo_net::http::Request;
use shared::config::SubmissionPolicy;
use shared::preview::PreviewError;
use shared::{
    HttpReply, PreviewEncoder, PreviewHandle, Timer, Transport, TransportFailure, UploadCandidate,
    ValidatedFile,
};
use std::time::Duration;
use wasm_bindgen::JsValue;
use web_sys::{AbortController, AbortSignal, FormData};

/// Posts the candidate as multipart form data with `fetch`.
pub struct GlooTransport {
    endpoint: String,
    field_name: String,
}

impl GlooTransport {
    pub fn new(policy: &SubmissionPolicy) -> Self {
        Self {
            endpoint: policy.endpoint(),
            field_name: policy.field_name.clone(),
        }
    }

    fn form(&self, file: &ValidatedFile) -> Result<FormData, TransportFailure> {
        let candidate = file.candidate();
        let blob = Blob::new_with_options(&candidate.bytes()[..], Some(candidate.mime_type()));
        let form_data = FormData::new().map_err(js_failure)?;
        form_data
            .append_with_blob_and_filename(&self.field_name, blob.as_ref(), candidate.file_name())
            .map_err(js_failure)?;
        Ok(form_data)
    }
}

/// Aborts the underlying fetch when the request future is dropped, which is
/// how a timed-out request is abandoned.
struct AbortOnDrop(AbortController);

impl AbortOnDrop {
    fn new() -> Result<Self, TransportFailure> {
        AbortController::new().map(Self).map_err(js_failure)
    }

    fn signal(&self) -> AbortSignal {
        self.0.signal()
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl Transport for GlooTransport {
    async fn send(&self, file: &ValidatedFile) -> Result<HttpReply, TransportFailure> {
        let form_data = self.form(file)?;
        let abort = AbortOnDrop::new()?;
        let signal = abort.signal();

        let request = Request::post(&self.endpoint)
            .abort_signal(Some(&signal))
            .body(form_data)
            .map_err(|e| TransportFailure::Other(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| TransportFailure::NoResponse(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportFailure::NoResponse(e.to_string()))?;

        log::debug!("{} answered {} ({} bytes)", self.endpoint, status, body.len());
        Ok(HttpReply { status, body })
    }
}

fn js_failure(value: JsValue) -> TransportFailure {
    TransportFailure::Other(format!("{:?}", value))
}

pub struct GlooTimer;

impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await
    }
}

/// Builds the preview with a `FileReader`, off the main submission path.
pub struct BrowserPreviewEncoder;

impl PreviewEncoder for BrowserPreviewEncoder {
    async fn encode(&self, candidate: &UploadCandidate) -> Result<PreviewHandle, PreviewError> {
        let blob = Blob::new_with_options(&candidate.bytes()[..], Some(candidate.mime_type()));
        gloo_file::futures::read_as_data_url(&blob)
            .await
            .map(PreviewHandle::new)
            .map_err(|e| PreviewError::Encode(e.to_string()))
    }
}
