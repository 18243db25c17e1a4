use reqwest::Client as HttpClient;
use reqwest::multipart::{Form, Part};
use shared::api::HealthResponse;
use shared::config::SubmissionPolicy;
use shared::{HttpReply, Timer, Transport, TransportFailure, ValidatedFile};
use std::time::Duration;

/// Multipart upload over reqwest. Dropping the send future drops the request.
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: HttpClient,
    endpoint: String,
    field_name: String,
}

impl ReqwestTransport {
    pub fn new(policy: &SubmissionPolicy) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder()
            .user_agent(concat!("leafscan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http_client,
            endpoint: policy.endpoint(),
            field_name: policy.field_name.clone(),
        })
    }

    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    fn form(&self, file: &ValidatedFile) -> Result<Form, reqwest::Error> {
        let candidate = file.candidate();
        let part = Part::bytes(candidate.bytes().to_vec())
            .file_name(candidate.file_name().to_string())
            .mime_str(candidate.mime_type())?;
        Ok(Form::new().part(self.field_name.clone(), part))
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, file: &ValidatedFile) -> Result<HttpReply, TransportFailure> {
        let form = self.form(file).map_err(map_error)?;
        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(map_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_error)?;
        log::debug!("{} answered {} ({} bytes)", self.endpoint, status, body.len());
        Ok(HttpReply { status, body })
    }
}

fn map_error(e: reqwest::Error) -> TransportFailure {
    if e.is_timeout() {
        TransportFailure::TimedOut
    } else if e.is_connect() || e.is_request() {
        TransportFailure::NoResponse(e.to_string())
    } else {
        TransportFailure::Other(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

/// Asks the service whether its model is loaded.
pub async fn fetch_health(
    http_client: &HttpClient,
    url: &str,
) -> Result<HealthResponse, reqwest::Error> {
    http_client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<HealthResponse>()
        .await
}
