use serde::{Deserialize, Serialize};

/// A resume file carried inline to the generative provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    /// Standard-alphabet base64 of the raw file bytes.
    pub data: String,
    pub mime_type: String,
    pub name: String,
}

/// Where the resume content comes from. Exactly one source per analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeSource {
    Text(String),
    File(FileData),
}

/// Everything one analysis call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeInput {
    pub resume: ResumeSource,
    pub job_description: String,
}
