pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/messages",
            post(handlers::handle_submit),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(handlers::handle_reset_session),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::screening::questions::StaticQuestionBank;
    use crate::screening::store::SessionStore;

    fn app() -> (Router, SessionStore) {
        let sessions = SessionStore::new();
        let state = AppState {
            sessions: sessions.clone(),
            question_source: Arc::new(StaticQuestionBank),
        };
        (build_router(state), sessions)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    async fn say(app: &Router, id: &str, text: &str) -> Value {
        let uri = format!("/api/v1/sessions/{id}/messages");
        let (status, body) = send(app, "POST", &uri, Some(json!({ "text": text }))).await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_returns_greeting() {
        let (app, _) = app();
        let (status, body) = send(&app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["state"], "greeting");
        assert_eq!(body["progress"]["current_step"], 1);
        assert_eq!(body["progress"]["total_steps"], 10);
        assert!(body["reply"].as_str().unwrap().contains("full name"));
    }

    #[tokio::test]
    async fn test_full_screening_over_http() {
        let (app, _) = app();
        let id = create(&app).await;

        for text in [
            "Jane Doe",
            "jane@example.com",
            "123-456-7890",
            "5 years",
            "Backend Engineer",
            "Austin, TX",
        ] {
            assert_eq!(say(&app, &id, text).await["kind"], "advanced");
        }

        let body = say(
            &app,
            &id,
            "Python, Docker, AWS, PostgreSQL, Communication, Teamwork",
        )
        .await;
        assert_eq!(body["state"], "asking_questions");
        assert_eq!(body["progress"]["current_step"], 9);

        let (_, detail) = send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        let question_count = detail["technical_questions"].as_array().unwrap().len();
        assert_eq!(detail["profile"]["phone"], "(123) 456-7890");
        assert_eq!(detail["profile"]["classified_skills"]["tools"], json!(["docker", "aws"]));

        let mut last = Value::Null;
        for i in 0..question_count {
            last = say(&app, &id, &format!("Answer {i}")).await;
        }
        assert_eq!(last["kind"], "completed");
        assert_eq!(last["state"], "completed");

        let (_, detail) = send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(
            detail["profile"]["technical_answers"].as_array().unwrap().len(),
            question_count
        );
        assert!(detail["summary"].as_str().unwrap().contains("- Name: Jane Doe"));
    }

    #[tokio::test]
    async fn test_invalid_answer_is_a_reprompt_not_an_error() {
        let (app, _) = app();
        let id = create(&app).await;
        say(&app, &id, "Jane Doe").await;
        let body = say(&app, &id, "jane at example").await;
        assert_eq!(body["kind"], "reprompt");
        assert_eq!(body["state"], "collecting_email");
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let (app, _) = app();
        let id = create(&app).await;
        let uri = format!("/api/v1/sessions/{id}/messages");
        let (status, body) = send(&app, "POST", &uri, Some(json!({ "text": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (app, _) = app();
        let uri = format!("/api/v1/sessions/{}/messages", Uuid::new_v4());
        let (status, body) = send(&app, "POST", &uri, Some(json!({ "text": "hi" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_reset_starts_over() {
        let (app, _) = app();
        let id = create(&app).await;
        say(&app, &id, "Jane Doe").await;

        let (status, body) = send(&app, "POST", &format!("/api/v1/sessions/{id}/reset"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], id.as_str());
        assert_eq!(body["state"], "greeting");

        let (_, detail) = send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(detail["profile"]["name"], Value::Null);
        assert_eq!(detail["chat_log"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (app, sessions) = app();
        let id = create(&app).await;
        let (status, _) = send(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(sessions.len().await, 0);

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
