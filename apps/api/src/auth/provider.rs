//! Identity provider port and its Supabase (GoTrue REST) implementation.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::user::{AuthSession, AuthUser, SignUpOutcome};

/// Credential check and session lifecycle, delegated to an external provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AppError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;

    /// Resolves an access token to its user. Rejected tokens yield `Unauthorized`.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AppError>;
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Talks to the provider's `/auth/v1` REST surface.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, anon_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Identity(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: format!("{}/auth/v1", base_url.trim_end_matches('/')),
            anon_key,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("apikey", &self.anon_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = provider_error_message(&body).unwrap_or_else(|| status.to_string());
        if status.is_client_error() {
            debug!("Identity provider rejected request ({status}): {message}");
            Err(AppError::Auth(message))
        } else {
            warn!("Identity provider returned {status}: {message}");
            Err(AppError::Identity(message))
        }
    }

    async fn json(response: Response) -> Result<Value, AppError> {
        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Identity(format!("malformed provider response: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let request = self
            .request(reqwest::Method::POST, "/token?grant_type=password")
            .json(&Credentials { email, password });
        let body = Self::json(self.send(request).await?).await?;
        serde_json::from_value(body)
            .map_err(|e| AppError::Identity(format!("malformed session: {e}")))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AppError> {
        let request = self
            .request(reqwest::Method::POST, "/signup")
            .json(&Credentials { email, password });
        let body = Self::json(self.send(request).await?).await?;
        parse_sign_up(body)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let request = self
            .request(reqwest::Method::POST, "/logout")
            .bearer_auth(access_token);
        self.send(request).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AppError> {
        let request = self
            .request(reqwest::Method::GET, "/user")
            .bearer_auth(access_token);
        let response = match self.send(request).await {
            Ok(r) => r,
            Err(AppError::Auth(_)) => return Err(AppError::Unauthorized),
            Err(e) => return Err(e),
        };
        let body = Self::json(response).await?;
        serde_json::from_value(body).map_err(|e| AppError::Identity(format!("malformed user: {e}")))
    }
}

/// Sign-up answers with a full session when email confirmation is off,
/// otherwise with the bare user object.
fn parse_sign_up(body: Value) -> Result<SignUpOutcome, AppError> {
    let malformed = |e: serde_json::Error| AppError::Identity(format!("malformed sign-up: {e}"));

    if body.get("access_token").is_some() {
        let session: AuthSession = serde_json::from_value(body).map_err(malformed)?;
        return Ok(SignUpOutcome {
            user: session.user.clone(),
            session: Some(session),
        });
    }

    let user_value = match body.get("user") {
        Some(user) => user.clone(),
        None => body,
    };
    let user: AuthUser = serde_json::from_value(user_value).map_err(malformed)?;
    Ok(SignUpOutcome {
        user,
        session: None,
    })
}

/// Pulls the human-readable message out of a provider error body.
fn provider_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
