//! Record store port: the `profiles` and `optimizations` tables owned by the
//! identity/persistence provider, reached directly over Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::{NewOptimization, OptimizationRow};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upserts the profile row, stamping `last_login`.
    async fn touch_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), AppError>;

    /// Creates the profile row for a fresh sign-up. Existing rows are left alone.
    async fn insert_profile(&self, user_id: Uuid, email: Option<&str>) -> Result<(), AppError>;

    async fn insert_optimization(&self, row: NewOptimization)
        -> Result<OptimizationRow, AppError>;

    /// All optimizations of a user, newest first.
    async fn list_optimizations(&self, user_id: Uuid) -> Result<Vec<OptimizationRow>, AppError>;

    async fn get_optimization(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<OptimizationRow>, AppError>;
}

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn touch_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, last_login)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET last_login = EXCLUDED.last_login
            "#,
        )
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_profile(&self, user_id: Uuid, email: Option<&str>) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO profiles (id, email) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(user_id)
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_optimization(
        &self,
        row: NewOptimization,
    ) -> Result<OptimizationRow, AppError> {
        let result_json = serde_json::to_value(&row.result).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to serialize AnalysisResult: {e}"))
        })?;

        let inserted = sqlx::query_as::<_, OptimizationRow>(
            r#"
            INSERT INTO optimizations (id, user_id, job_title, company, score, result_json)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.user_id)
        .bind(&row.job_title)
        .bind(&row.company)
        .bind(row.score)
        .bind(result_json)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn list_optimizations(&self, user_id: Uuid) -> Result<Vec<OptimizationRow>, AppError> {
        let rows = sqlx::query_as::<_, OptimizationRow>(
            "SELECT * FROM optimizations WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_optimization(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<OptimizationRow>, AppError> {
        let row = sqlx::query_as::<_, OptimizationRow>(
            "SELECT * FROM optimizations WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
