//! In-memory stand-ins for the external providers, used by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::auth::events::AuthEvents;
use crate::auth::provider::IdentityProvider;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::analysis::{AnalysisResult, Importance, OptimizedBullet, SkillGap};
use crate::models::history::{NewOptimization, OptimizationRow};
use crate::models::resume::ResumeInput;
use crate::models::user::{AuthSession, AuthUser, SignUpOutcome};
use crate::records::RecordStore;
use crate::state::AppState;
use crate::workspace::registry::SessionRegistry;

pub const TEST_EMAIL: &str = "jane@example.com";
pub const TEST_PASSWORD: &str = "correct-horse";

pub fn sample_user() -> AuthUser {
    AuthUser {
        id: Uuid::from_u128(0x5eed),
        email: Some(TEST_EMAIL.to_string()),
    }
}

pub fn sample_result(score: f64) -> AnalysisResult {
    AnalysisResult {
        match_score: score,
        match_reasoning: "Strong systems background; light on cloud tooling.".to_string(),
        missing_skills: vec![SkillGap {
            skill: "Kubernetes".to_string(),
            importance: Importance::High,
        }],
        optimized_bullets: vec![OptimizedBullet {
            original: "Worked on the API".to_string(),
            optimized: "Shipped 14 REST endpoints serving 2M requests/day".to_string(),
            explanation: "Quantified scope and impact".to_string(),
        }],
        suggested_additions: vec!["CKA certification".to_string()],
        cover_letter: "Dear Hiring Manager,\n\nI am excited to apply.".to_string(),
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/elevate_test".to_string(),
        db_max_connections: 2,
        supabase_url: "http://localhost:54321".to_string(),
        supabase_anon_key: "anon".to_string(),
        gemini_api_key: "test-key".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        max_upload_bytes: 1024 * 1024,
    }
}

/// Accepts `TEST_EMAIL` / `TEST_PASSWORD`; every sign-in mints a new token.
#[derive(Default)]
pub struct FakeIdentity {
    tokens: Mutex<HashMap<String, AuthUser>>,
    /// When set, sign-up returns a live session (auto-confirm).
    pub auto_confirm: bool,
}

impl FakeIdentity {
    /// Sign-up hands back a live session, as with email confirmation off.
    pub fn auto_confirming() -> Self {
        Self {
            auto_confirm: true,
            ..Self::default()
        }
    }

    fn issue(&self, user: AuthUser) -> AuthSession {
        let token = format!("token-{}", Uuid::new_v4());
        self.tokens
            .lock()
            .unwrap()
            .insert(token.clone(), user.clone());
        AuthSession {
            access_token: token,
            refresh_token: Some("refresh".to_string()),
            expires_in: Some(3600),
            user,
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        if email == TEST_EMAIL && password == TEST_PASSWORD {
            Ok(self.issue(sample_user()))
        } else {
            Err(AppError::Auth("Invalid login credentials".to_string()))
        }
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<SignUpOutcome, AppError> {
        if email == TEST_EMAIL {
            return Err(AppError::Auth("User already registered".to_string()));
        }
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        let session = self.auto_confirm.then(|| self.issue(user.clone()));
        Ok(SignUpOutcome { user, session })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        self.tokens.lock().unwrap().remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AppError> {
        self.tokens
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[derive(Default)]
pub struct InMemoryRecordStore {
    pub profiles: Mutex<HashMap<Uuid, (Option<String>, Option<DateTime<Utc>>)>>,
    pub optimizations: Mutex<Vec<OptimizationRow>>,
    /// Makes every optimization read fail.
    pub fail_reads: bool,
}

impl InMemoryRecordStore {
    /// Seeds a row `minutes_ago` in the past.
    pub fn seed(&self, user_id: Uuid, job_title: &str, score: f64, minutes_ago: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.optimizations.lock().unwrap().push(OptimizationRow {
            id,
            user_id,
            job_title: job_title.to_string(),
            company: "Target Application".to_string(),
            score,
            result_json: serde_json::to_value(sample_result(score)).unwrap(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        });
        id
    }

    pub fn rows_for(&self, user_id: Uuid) -> Vec<OptimizationRow> {
        self.optimizations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn touch_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        self.profiles.lock().unwrap().entry(user_id).or_default().1 = Some(at);
        Ok(())
    }

    async fn insert_profile(&self, user_id: Uuid, email: Option<&str>) -> Result<(), AppError> {
        self.profiles
            .lock()
            .unwrap()
            .entry(user_id)
            .or_insert((email.map(str::to_string), None));
        Ok(())
    }

    async fn insert_optimization(
        &self,
        row: NewOptimization,
    ) -> Result<OptimizationRow, AppError> {
        let inserted = OptimizationRow {
            id: Uuid::new_v4(),
            user_id: row.user_id,
            job_title: row.job_title,
            company: row.company,
            score: row.score,
            result_json: serde_json::to_value(&row.result).unwrap(),
            created_at: Utc::now(),
        };
        self.optimizations.lock().unwrap().push(inserted.clone());
        Ok(inserted)
    }

    async fn list_optimizations(&self, user_id: Uuid) -> Result<Vec<OptimizationRow>, AppError> {
        if self.fail_reads {
            return Err(AppError::Internal(anyhow::anyhow!("store offline")));
        }
        let mut rows = self.rows_for(user_id);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_optimization(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<OptimizationRow>, AppError> {
        Ok(self.rows_for(user_id).into_iter().find(|r| r.id == id))
    }
}

/// Returns a fixed result, or fails with the given error message.
pub struct StubAnalyzer {
    pub outcome: Result<AnalysisResult, String>,
    pub calls: Mutex<Vec<ResumeInput>>,
    /// Never answers, like a provider call that hangs.
    pub hang: bool,
}

impl StubAnalyzer {
    pub fn succeeding(score: f64) -> Self {
        Self {
            outcome: Ok(sample_result(score)),
            calls: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::succeeding(0.0)
        }
    }
}

#[async_trait]
impl ResumeAnalyzer for StubAnalyzer {
    async fn analyze(&self, input: &ResumeInput) -> Result<AnalysisResult, AppError> {
        self.calls.lock().unwrap().push(input.clone());
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.outcome.clone().map_err(AppError::Optimization)
    }
}

pub struct TestHarness {
    pub state: AppState,
    pub records: Arc<InMemoryRecordStore>,
    pub analyzer: Arc<StubAnalyzer>,
}

pub fn harness(records: InMemoryRecordStore, analyzer: StubAnalyzer) -> TestHarness {
    harness_with_identity(FakeIdentity::default(), records, analyzer)
}

pub fn harness_with_identity(
    identity: FakeIdentity,
    records: InMemoryRecordStore,
    analyzer: StubAnalyzer,
) -> TestHarness {
    let records = Arc::new(records);
    let analyzer = Arc::new(analyzer);
    let state = AppState {
        identity: Arc::new(identity),
        records: records.clone(),
        analyzer: analyzer.clone(),
        sessions: SessionRegistry::new(),
        auth_events: AuthEvents::new(),
        config: test_config(),
    };
    TestHarness {
        state,
        records,
        analyzer,
    }
}
