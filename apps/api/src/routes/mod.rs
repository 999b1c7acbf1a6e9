pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::auth::handlers as auth;
use crate::history::handlers as history;
use crate::state::AppState;
use crate::workspace::handlers as workspace;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Session / auth
        .route("/api/v1/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/v1/auth/sign-up", post(auth::handle_sign_up))
        .route("/api/v1/auth/sign-out", post(auth::handle_sign_out))
        .route("/api/v1/auth/session", get(auth::handle_get_session))
        // Workspace (view state + draft)
        .route("/api/v1/workspace", get(workspace::handle_get_workspace))
        .route("/api/v1/workspace/view", post(workspace::handle_navigate))
        .route(
            "/api/v1/workspace/resume-text",
            put(workspace::handle_set_resume_text),
        )
        .route(
            "/api/v1/workspace/resume-file",
            post(workspace::handle_upload_resume),
        )
        .route(
            "/api/v1/workspace/job-description",
            put(workspace::handle_set_job_description),
        )
        .route(
            "/api/v1/workspace/cover-letter",
            get(workspace::handle_download_cover_letter),
        )
        // Analysis
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        // History
        .route("/api/v1/history", get(history::handle_list_history))
        .route(
            "/api/v1/history/:id",
            get(history::handle_open_history_entry),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use std::time::Duration;
    use uuid::Uuid;

    use crate::auth::provider::IdentityProvider;
    use crate::testing::{
        harness, sample_user, InMemoryRecordStore, StubAnalyzer, TEST_EMAIL, TEST_PASSWORD,
    };
    use crate::workspace::registry::REVALIDATE_AFTER;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn sign_in_token(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/sign-in",
                None,
                json!({"email": TEST_EMAIL, "password": TEST_PASSWORD}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(InMemoryRecordStore::default(), StubAnalyzer::succeeding(80.0));
        let response = build_router(h.state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_workspace_requires_session() {
        let h = harness(InMemoryRecordStore::default(), StubAnalyzer::succeeding(80.0));
        let response = build_router(h.state)
            .oneshot(get_request("/api/v1/workspace", "unknown"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_full_round_trip_over_http() {
        let h = harness(InMemoryRecordStore::default(), StubAnalyzer::succeeding(91.0));
        let app = build_router(h.state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/sign-in",
                None,
                json!({"email": TEST_EMAIL, "password": TEST_PASSWORD}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let session = body_json(response).await;
        assert_eq!(session["workspace"]["view"], "dashboard");
        let token = session["access_token"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/analyze",
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "Missing assets. Please upload a resume and paste the job description."
        );

        for (uri, text) in [
            ("/api/v1/workspace/resume-text", "Jane Doe, Rust engineer"),
            ("/api/v1/workspace/job-description", "Staff Engineer\nAcme"),
        ] {
            let response = app
                .clone()
                .oneshot(json_request("PUT", uri, Some(&token), json!({"text": text})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/analyze",
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["view"], "results");
        assert_eq!(snapshot["result"]["matchScore"], 91.0);
        assert_eq!(snapshot["result"]["score_band"], "strong");
        assert_eq!(snapshot["history"][0]["jobTitle"], "Staff Engineer");
        assert_eq!(snapshot["stats"]["average_score"], 91);

        let response = app
            .clone()
            .oneshot(get_request("/api/v1/workspace/cover-letter", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Cover_Letter_Draft.txt\""
        );

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/sign-out",
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["view"], "login");

        let response = app
            .oneshot(get_request("/api/v1/workspace", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_multipart_upload_plain_text() {
        let h = harness(InMemoryRecordStore::default(), StubAnalyzer::succeeding(80.0));
        let app = build_router(h.state);
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/sign-in",
                None,
                json!({"email": TEST_EMAIL, "password": TEST_PASSWORD}),
            ))
            .await
            .unwrap();
        let token = body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"resume.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             Jane Doe\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/workspace/resume-file")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["resume"]["kind"], "text");
        assert_eq!(snapshot["resume"]["chars"], 8);
    }

    #[tokio::test]
    async fn test_reopen_stored_result() {
        let records = InMemoryRecordStore::default();
        let id = records.seed(sample_user().id, "Platform Engineer", 72.0, 5);
        let h = harness(records, StubAnalyzer::succeeding(80.0));
        let app = build_router(h.state);
        let token = sign_in_token(&app).await;

        let response = app
            .oneshot(get_request(&format!("/api/v1/history/{id}"), &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["view"], "results");
        assert_eq!(snapshot["result"]["matchScore"], 72.0);
        assert_eq!(snapshot["result"]["score_band"], "moderate");
    }

    #[tokio::test]
    async fn test_reopen_is_scoped_to_the_caller() {
        let records = InMemoryRecordStore::default();
        let foreign = records.seed(Uuid::new_v4(), "Someone else's role", 90.0, 5);
        let h = harness(records, StubAnalyzer::succeeding(80.0));
        let app = build_router(h.state);
        let token = sign_in_token(&app).await;

        for id in [foreign, Uuid::new_v4()] {
            let response = app
                .clone()
                .oneshot(get_request(&format!("/api/v1/history/{id}"), &token))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
        }

        let response = app
            .oneshot(get_request("/api/v1/workspace", &token))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["view"], "dashboard");
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoked_token_is_rejected_after_revalidation() {
        let h = harness(InMemoryRecordStore::default(), StubAnalyzer::succeeding(80.0));
        let identity = h.state.identity.clone();
        let sessions = h.state.sessions.clone();
        let app = build_router(h.state);
        let revoked = sign_in_token(&app).await;
        let kept = sign_in_token(&app).await;

        identity.sign_out(&revoked).await.unwrap();
        tokio::time::advance(REVALIDATE_AFTER).await;

        let response = app
            .clone()
            .oneshot(get_request("/api/v1/workspace", &revoked))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(get_request("/api/v1/workspace", &kept))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_token_is_rejected() {
        let h = harness(InMemoryRecordStore::default(), StubAnalyzer::succeeding(80.0));
        let sessions = h.state.sessions.clone();
        let app = build_router(h.state);
        let token = sign_in_token(&app).await;

        // the fake provider issues one-hour tokens
        tokio::time::advance(Duration::from_secs(3600)).await;

        let response = app
            .oneshot(get_request("/api/v1/workspace", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(sessions.len().await, 0);
    }
}
