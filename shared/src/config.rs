use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MIB: u64 = 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one MIME type must be allowed")]
    EmptyAllowList,
    #[error("upload size ceiling must be greater than zero")]
    ZeroSizeCeiling,
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    #[error("progress ticker needs a non-zero step and interval")]
    IdleTicker,
    #[error("progress cap must be below 100, got {0}")]
    CapTooHigh(u8),
    #[error("initial progress {initial} exceeds the cap {cap}")]
    InitialAboveCap { initial: u8, cap: u8 },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub upload: UploadPolicy,
    pub submission: SubmissionPolicy,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.upload.validate()?;
        self.submission.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    pub allowed_mime_types: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: ["image/jpeg", "image/jpg", "image/png", "image/webp"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_bytes: 10 * MIB,
        }
    }
}

impl UploadPolicy {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_mime_types.is_empty() {
            return Err(ConfigError::EmptyAllowList);
        }
        if self.max_bytes == 0 {
            return Err(ConfigError::ZeroSizeCeiling);
        }
        Ok(())
    }
}

/// Request target plus the timing of the synthetic progress bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionPolicy {
    pub base_url: String,
    pub predict_path: String,
    pub field_name: String,
    pub timeout_ms: u64,
    pub initial_progress: u8,
    pub tick_interval_ms: u64,
    pub tick_step: u8,
    pub progress_cap: u8,
    pub settle_delay_ms: u64,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            predict_path: "/predict".to_string(),
            field_name: "file".to_string(),
            timeout_ms: 30_000,
            initial_progress: 10,
            tick_interval_ms: 200,
            tick_step: 10,
            progress_cap: 90,
            settle_delay_ms: 500,
        }
    }
}

impl SubmissionPolicy {
    pub fn endpoint(&self) -> String {
        join_url(&self.base_url, &self.predict_path)
    }

    pub fn health_endpoint(&self) -> String {
        join_url(&self.base_url, "/health")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.tick_step == 0 || self.tick_interval_ms == 0 {
            return Err(ConfigError::IdleTicker);
        }
        if self.progress_cap >= 100 {
            return Err(ConfigError::CapTooHigh(self.progress_cap));
        }
        if self.initial_progress > self.progress_cap {
            return Err(ConfigError::InitialAboveCap {
                initial: self.initial_progress,
                cap: self.progress_cap,
            });
        }
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
