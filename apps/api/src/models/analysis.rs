use serde::{Deserialize, Serialize};

/// Structured match report produced by the model for one résumé / job pair.
/// Field names are camelCase on the wire so the browser client can render them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub match_score: f64,
    pub overall_verdict: String,
    pub ats_analysis: AtsAnalysis,
    pub feedback_on_strengths: Vec<StrengthFeedback>,
    pub critical_improvement_areas: Vec<ImprovementArea>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsAnalysis {
    #[serde(default)]
    pub keywords_found: Vec<String>,
    #[serde(default)]
    pub keywords_missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthFeedback {
    pub skill: String,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementArea {
    pub area: String,
    pub feedback: String,
}

impl AnalysisResult {
    /// Checks the constraints serde cannot express. Returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if !self.match_score.is_finite() || !(0.0..=100.0).contains(&self.match_score) {
            return Err(format!(
                "matchScore must be within 0..=100, got {}",
                self.match_score
            ));
        }
        Ok(())
    }
}
