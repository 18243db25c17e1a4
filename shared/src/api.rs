//! Wire shapes exchanged with the remote inference service.
//!
//! Every field the service may leave out is an `Option`; the normalizer decides
//! what an absent field means.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: Option<bool>,
    pub prediction: Option<RawPrediction>,
    pub recommendations: Option<Recommendations>,
    pub top_predictions: Option<Vec<RawPrediction>>,
    pub error: Option<String>,
    /// Legacy payloads list deficiency names here instead of under `recommendations`.
    pub nutrient_deficiencies: Option<Vec<String>>,
}

/// Primary prediction, also the shape of each `top_predictions` entry.
///
/// A prediction keyed by `class` comes from the legacy endpoint: its confidences
/// are percentages and its treatment and prevention lists are carried inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub disease: Option<String>,
    #[serde(rename = "class")]
    pub legacy_class: Option<String>,
    pub nutrient_deficiency: Option<String>,
    pub confidence: Option<f64>,
    pub symptoms: Option<Vec<String>>,
    pub is_healthy: Option<bool>,
    pub treatment: Option<Vec<String>>,
    pub prevention: Option<Vec<String>>,
}

impl RawPrediction {
    pub fn is_legacy(&self) -> bool {
        self.legacy_class.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub remedies: Option<Vec<String>>,
    pub prevention: Option<Vec<String>>,
    pub nutrients: Option<Vec<String>>,
}

/// Body the service sends alongside an error status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

impl ErrorBody {
    /// Extracts a non-empty `error` string from a response body, if it has one.
    pub fn detail(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub model_loaded: bool,
    pub classes: Option<usize>,
}
