use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// A file picked or dropped by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    bytes: Bytes,
    mime_type: String,
    size: u64,
    file_name: String,
}

impl UploadCandidate {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            size: bytes.len() as u64,
            bytes,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Category {
    #[strum(serialize = "Disease")]
    Disease,
    #[strum(serialize = "Nutrient Deficiency")]
    NutrientDeficiency,
    #[strum(serialize = "Healthy")]
    Healthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPrediction {
    pub class_name: String,
    pub confidence_percent: u8,
    pub category: Category,
}

/// Canonical result of one successful detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub class_name: String,
    pub category: Category,
    pub confidence_percent: u8,
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
    pub nutrients: Vec<String>,
    pub top_predictions: Vec<TopPrediction>,
}
