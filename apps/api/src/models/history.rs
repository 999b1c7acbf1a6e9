use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;

/// A row of the `optimizations` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OptimizationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub score: f64,
    pub result_json: Value,
    pub created_at: DateTime<Utc>,
}

/// Values for a new `optimizations` row.
#[derive(Debug, Clone)]
pub struct NewOptimization {
    pub user_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub score: f64,
    pub result: AnalysisResult,
}

/// Display projection of an `OptimizationRow`. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationHistory {
    pub id: Uuid,
    pub job_title: String,
    pub company: String,
    pub date: String,
    pub score: f64,
}
