// Prompt and response schema for resume analysis.

use serde_json::{json, Value};

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Prefix for a resume supplied as plain text.
pub const RESUME_TEXT_PREFIX: &str = "RESUME TEXT:\n";

/// Analysis prompt template. Replace `{job_description}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert Senior Technical Recruiter and ATS (Applicant Tracking System) Optimization specialist.

TASK:
Analyze the provided resume against the specific job description below.

JOB DESCRIPTION:
{job_description}

OBJECTIVES:
1. MATCH SCORE: Calculate a percentage (0-100) based on how well the candidate's experience, skills, and education align with the JD requirements.
2. MATCH REASONING: Provide a 2-3 sentence executive summary of the alignment.
3. DEFICIT MAPPING: Identify missing hard skills, certifications, or experience levels that are critical for this role. Rank them by High/Medium/Low importance.
4. KEYWORD OPTIMIZATION: Generate 4-6 high-impact resume bullet points that use strong action verbs and quantify achievements while incorporating keywords from the JD.
5. GROWTH AREAS: Suggest specific sections or certifications to add to the resume.
6. COVER LETTER: Write a highly personalized, compelling 3-paragraph cover letter that bridges the gap between the candidate's current experience and the job's needs.
"#;

/// Builds the instruction part of the analysis request.
pub fn build_analysis_prompt(job_description: &str) -> String {
    format!(
        "{}\n{}",
        ANALYSIS_PROMPT_TEMPLATE.replace("{job_description}", job_description),
        JSON_ONLY_INSTRUCTION
    )
}

/// Response schema enforced by the provider. Mirrors `AnalysisResult`.
pub fn analysis_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "matchScore": { "type": "NUMBER" },
            "matchReasoning": { "type": "STRING" },
            "missingSkills": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "skill": { "type": "STRING" },
                        "importance": { "type": "STRING", "enum": ["High", "Medium", "Low"] }
                    },
                    "required": ["skill", "importance"]
                }
            },
            "optimizedBullets": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "original": { "type": "STRING" },
                        "optimized": { "type": "STRING" },
                        "explanation": { "type": "STRING" }
                    },
                    "required": ["original", "optimized", "explanation"]
                }
            },
            "suggestedAdditions": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "coverLetter": { "type": "STRING" }
        },
        "required": [
            "matchScore",
            "matchReasoning",
            "missingSkills",
            "optimizedBullets",
            "suggestedAdditions",
            "coverLetter"
        ]
    })
}
