use crate::model::DetectionResult;

impl DetectionResult {
    /// Plain-text summary in the format used when copying results.
    pub fn to_report(&self) -> String {
        let mut report = format!(
            "Mango Leaf Analysis Results:\n\
             Condition: {}\n\
             Confidence: {}%\n\
             Category: {}\n\n\
             Symptoms: {}\n\n\
             Recommended Treatment: {}\n\n\
             Prevention Tips: {}",
            self.class_name,
            self.confidence_percent,
            self.category,
            self.symptoms.join(", "),
            self.treatment.join("; "),
            self.prevention.join("; "),
        );
        if !self.nutrients.is_empty() {
            report.push_str("\n\nNutrients: ");
            report.push_str(&self.nutrients.join(", "));
        }
        report
    }
}
