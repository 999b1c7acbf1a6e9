use serde::{Deserialize, Serialize};

/// How critical a missing skill is for the target role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Importance {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub importance: Importance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedBullet {
    pub original: String,
    pub optimized: String,
    pub explanation: String,
}

/// Result of one resume analysis. The shape is enforced by the response
/// schema sent to the generative provider; field names are camelCase on
/// the wire and in the persisted `result_json` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 0 – 100
    pub match_score: f64,
    pub match_reasoning: String,
    pub missing_skills: Vec<SkillGap>,
    pub optimized_bullets: Vec<OptimizedBullet>,
    pub suggested_additions: Vec<String>,
    pub cover_letter: String,
}

/// Coarse grading of a match score used by clients to color the gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Strong
        } else if score >= 50.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}
