//! Turns the loosely shaped service payload into a [`DetectionResult`].

use crate::api::{PredictResponse, RawPrediction, Recommendations};
use crate::classify::Failure;
use crate::model::{Category, DetectionResult, TopPrediction};

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const HEALTHY_LABEL: &str = "Healthy";
pub const DEFICIENCY_MARKER: &str = "Deficiency";

/// How the service expresses confidences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceScale {
    /// `0.0..=1.0`
    Fraction,
    /// `0.0..=100.0`, used by the legacy payload.
    Percent,
}

impl ConfidenceScale {
    pub fn of(prediction: &RawPrediction) -> Self {
        if prediction.is_legacy() {
            ConfidenceScale::Percent
        } else {
            ConfidenceScale::Fraction
        }
    }
}

/// Normalizes a full response. A response flagged unsuccessful, or one without a
/// prediction object, is a failure rather than a result.
pub fn normalize(response: &PredictResponse) -> Result<DetectionResult, Failure> {
    if response.success == Some(false) {
        return Err(Failure::no_results(response.error.as_deref()));
    }
    let Some(prediction) = &response.prediction else {
        return Err(Failure::no_results(response.error.as_deref()));
    };
    let mut result = normalize_prediction(
        prediction,
        response.recommendations.as_ref(),
        response.top_predictions.as_deref().unwrap_or_default(),
    );
    if result.nutrients.is_empty() {
        result.nutrients = response.nutrient_deficiencies.clone().unwrap_or_default();
    }
    Ok(result)
}

/// Recommendations win over lists carried inline on the prediction. The scale of
/// the primary prediction applies to the top predictions too.
pub fn normalize_prediction(
    prediction: &RawPrediction,
    recommendations: Option<&Recommendations>,
    top_predictions: &[RawPrediction],
) -> DetectionResult {
    let scale = ConfidenceScale::of(prediction);
    let class_name = resolve_label(prediction);
    let category = derive_category(prediction, class_name);
    DetectionResult {
        class_name: class_name.to_string(),
        category,
        confidence_percent: confidence_percent(prediction.confidence, scale),
        symptoms: prediction.symptoms.clone().unwrap_or_default(),
        treatment: recommendations
            .and_then(|r| r.remedies.clone())
            .or_else(|| prediction.treatment.clone())
            .unwrap_or_default(),
        prevention: recommendations
            .and_then(|r| r.prevention.clone())
            .or_else(|| prediction.prevention.clone())
            .unwrap_or_default(),
        nutrients: recommendations
            .and_then(|r| r.nutrients.clone())
            .unwrap_or_default(),
        top_predictions: top_predictions
            .iter()
            .map(|raw| top_prediction(raw, scale))
            .collect(),
    }
}

fn top_prediction(raw: &RawPrediction, scale: ConfidenceScale) -> TopPrediction {
    let class_name = resolve_label(raw);
    TopPrediction {
        class_name: class_name.to_string(),
        confidence_percent: confidence_percent(raw.confidence, scale),
        category: category_from_label(class_name),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Disease label first, then the legacy `class` label, then the deficiency label,
/// then [`UNKNOWN_LABEL`].
pub fn resolve_label(prediction: &RawPrediction) -> &str {
    non_empty(&prediction.disease)
        .or_else(|| non_empty(&prediction.legacy_class))
        .or_else(|| non_empty(&prediction.nutrient_deficiency))
        .unwrap_or(UNKNOWN_LABEL)
}

/// The explicit `is_healthy` flag decides when present; otherwise a deficiency
/// field, and failing that the label text.
pub fn derive_category(prediction: &RawPrediction, label: &str) -> Category {
    let has_deficiency = non_empty(&prediction.nutrient_deficiency).is_some();
    match prediction.is_healthy {
        Some(true) => Category::Healthy,
        Some(false) if has_deficiency => Category::NutrientDeficiency,
        Some(false) => Category::Disease,
        None if has_deficiency => Category::NutrientDeficiency,
        None => category_from_label(label),
    }
}

pub fn category_from_label(label: &str) -> Category {
    if label == HEALTHY_LABEL {
        Category::Healthy
    } else if label.contains(DEFICIENCY_MARKER) {
        Category::NutrientDeficiency
    } else {
        Category::Disease
    }
}

/// Rounds a confidence to a whole percentage in `0..=100`.
pub fn confidence_percent(confidence: Option<f64>, scale: ConfidenceScale) -> u8 {
    let factor = match scale {
        ConfidenceScale::Fraction => 100.0,
        ConfidenceScale::Percent => 1.0,
    };
    match confidence {
        Some(c) if c.is_finite() => (c * factor).round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> PredictResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn rounds_confidence() {
        let fraction = ConfidenceScale::Fraction;
        assert_eq!(confidence_percent(Some(0.8734), fraction), 87);
        assert_eq!(confidence_percent(Some(0.875), fraction), 88);
        assert_eq!(confidence_percent(Some(1.7), fraction), 100);
        assert_eq!(confidence_percent(Some(-0.2), fraction), 0);
        assert_eq!(confidence_percent(Some(f64::NAN), fraction), 0);
        assert_eq!(confidence_percent(None, fraction), 0);

        let percent = ConfidenceScale::Percent;
        assert_eq!(confidence_percent(Some(87.34), percent), 87);
        assert_eq!(confidence_percent(Some(0.6), percent), 1);
        assert_eq!(confidence_percent(Some(130.0), percent), 100);
    }

    #[test]
    fn legacy_payload() {
        let result = normalize(&parse(
            r#"{"success": true,
                "prediction": {"class": "Anthracnose", "confidence": 87.34, "category": "Disease",
                    "symptoms": ["Dark sunken spots"],
                    "treatment": ["Copper fungicide"], "prevention": ["Prune"]},
                "top_predictions": [
                    {"disease": "Anthracnose", "confidence": 87.34},
                    {"disease": "Healthy", "confidence": 5.1}
                ],
                "nutrient_deficiencies": ["Calcium"]}"#,
        ))
        .unwrap();
        assert_eq!(result.class_name, "Anthracnose");
        assert_eq!(result.category, Category::Disease);
        assert_eq!(result.confidence_percent, 87);
        assert_eq!(result.symptoms, vec!["Dark sunken spots"]);
        assert_eq!(result.treatment, vec!["Copper fungicide"]);
        assert_eq!(result.prevention, vec!["Prune"]);
        assert_eq!(result.nutrients, vec!["Calcium"]);

        let top: Vec<_> = result
            .top_predictions
            .iter()
            .map(|p| (p.class_name.as_str(), p.confidence_percent, p.category))
            .collect();
        assert_eq!(
            top,
            [
                ("Anthracnose", 87, Category::Disease),
                ("Healthy", 5, Category::Healthy)
            ]
        );
    }

    #[test]
    fn legacy_healthy_class() {
        let result = normalize(&parse(
            r#"{"success": true, "prediction": {"class": "Healthy", "confidence": 99.2}}"#,
        ))
        .unwrap();
        assert_eq!(result.category, Category::Healthy);
        assert_eq!(result.confidence_percent, 99);
    }

    #[test]
    fn recommendations_win_over_inline_lists() {
        let result = normalize(&parse(
            r#"{"prediction": {"disease": "Gall Midge", "confidence": 0.5,
                "treatment": ["inline"], "prevention": ["inline"]},
                "recommendations": {"remedies": ["Systemic insecticide"]}}"#,
        ))
        .unwrap();
        assert_eq!(result.treatment, vec!["Systemic insecticide"]);
        assert_eq!(result.prevention, vec!["inline"]);
    }

    #[test]
    fn healthy_flag_without_label() {
        let result = normalize(&parse(
            r#"{"success": true, "prediction": {"is_healthy": true, "confidence": 0.95}}"#,
        ))
        .unwrap();
        assert_eq!(result.category, Category::Healthy);
        assert_eq!(result.class_name, "Unknown");
        assert_eq!(result.confidence_percent, 95);
        assert!(result.symptoms.is_empty());
        assert!(result.treatment.is_empty());
        assert!(result.prevention.is_empty());
        assert!(result.nutrients.is_empty());
        assert!(result.top_predictions.is_empty());
    }

    #[test]
    fn disease_prediction() {
        let result = normalize(&parse(
            r#"{"success": true, "prediction":
                {"disease": "Anthracnose", "confidence": 0.9123, "is_healthy": false}}"#,
        ))
        .unwrap();
        assert_eq!(result.category, Category::Disease);
        assert_eq!(result.class_name, "Anthracnose");
        assert_eq!(result.confidence_percent, 91);
    }

    #[test]
    fn deficiency_prediction() {
        let result = normalize(&parse(
            r#"{"success": true, "prediction": {"nutrient_deficiency": "Nitrogen Deficiency",
                "confidence": 0.77, "is_healthy": false}}"#,
        ))
        .unwrap();
        assert_eq!(result.category, Category::NutrientDeficiency);
        assert_eq!(result.class_name, "Nitrogen Deficiency");
        assert_eq!(result.confidence_percent, 77);
    }

    #[test]
    fn empty_disease_falls_through_to_deficiency() {
        let prediction = RawPrediction {
            disease: Some("  ".into()),
            nutrient_deficiency: Some("Iron Deficiency".into()),
            ..Default::default()
        };
        assert_eq!(resolve_label(&prediction), "Iron Deficiency");
    }

    #[test]
    fn label_heuristic_without_flag() {
        let healthy = RawPrediction {
            disease: Some("Healthy".into()),
            ..Default::default()
        };
        assert_eq!(derive_category(&healthy, resolve_label(&healthy)), Category::Healthy);

        let deficiency = RawPrediction {
            disease: Some("Potassium Deficiency".into()),
            ..Default::default()
        };
        assert_eq!(
            derive_category(&deficiency, resolve_label(&deficiency)),
            Category::NutrientDeficiency
        );

        let unknown = RawPrediction::default();
        assert_eq!(derive_category(&unknown, resolve_label(&unknown)), Category::Disease);
    }

    #[test]
    fn flag_and_label_agree_on_service_payload() {
        let prediction = RawPrediction {
            disease: Some("Healthy".into()),
            is_healthy: Some(true),
            ..Default::default()
        };
        let label = resolve_label(&prediction);
        assert_eq!(derive_category(&prediction, label), category_from_label(label));
    }

    #[test]
    fn recommendations_map_to_lists() {
        let result = normalize(&parse(
            r#"{"prediction": {"disease": "Sooty Mould", "confidence": 0.6,
                "symptoms": ["Black sooty coating"]},
                "recommendations": {"remedies": ["Wash leaves with soap water"],
                "prevention": null, "nutrients": ["Potassium"]}}"#,
        ))
        .unwrap();
        assert_eq!(result.symptoms, vec!["Black sooty coating"]);
        assert_eq!(result.treatment, vec!["Wash leaves with soap water"]);
        assert!(result.prevention.is_empty());
        assert_eq!(result.nutrients, vec!["Potassium"]);
    }

    #[test]
    fn top_predictions_keep_input_order() {
        let result = normalize(&parse(
            r#"{"prediction": {"disease": "Die Back", "confidence": 0.4},
                "top_predictions": [
                    {"disease": "Gall Midge", "confidence": 0.1},
                    {"disease": "Die Back", "confidence": 0.4},
                    {"nutrient_deficiency": "Iron Deficiency", "confidence": 0.3},
                    {"confidence": 0.2}
                ]}"#,
        ))
        .unwrap();
        let names: Vec<_> = result
            .top_predictions
            .iter()
            .map(|p| p.class_name.as_str())
            .collect();
        assert_eq!(names, ["Gall Midge", "Die Back", "Iron Deficiency", "Unknown"]);
        assert_eq!(result.top_predictions[0].confidence_percent, 10);
        assert_eq!(
            result.top_predictions[2].category,
            Category::NutrientDeficiency
        );
    }

    #[test]
    fn unsuccessful_or_empty_payload_is_failure() {
        let failure = normalize(&parse(r#"{"success": false, "error": "bad image"}"#)).unwrap_err();
        assert_eq!(failure.kind, crate::classify::ErrorKind::Unknown);
        assert_eq!(failure.message, "No results found: bad image");

        let failure = normalize(&parse(r#"{"success": true}"#)).unwrap_err();
        assert_eq!(failure.message, "No results found");

        let failure = normalize(&parse(
            r#"{"success": false, "prediction": {"disease": "Healthy", "confidence": 1.0}}"#,
        ))
        .unwrap_err();
        assert_eq!(failure.kind, crate::classify::ErrorKind::Unknown);
    }
}
