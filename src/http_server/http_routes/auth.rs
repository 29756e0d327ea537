use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::database::{NewUser, User};
use crate::http_server::error::{ApiError, ApiResult};
use crate::http_server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn signup(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<Json<User>> {
    let user = app_state
        .auth()
        .signup(NewUser {
            email: request.email,
            password: request.password,
            username: request.username,
        })
        .await?;

    Ok(Json(user))
}

pub async fn login(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<User>> {
    // Missing credentials count as a failed login
    let (Some(email), Some(password)) = (request.email, request.password) else {
        log::info!("Login failed, email or password missing");
        return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
    };

    let user = app_state.auth().login(&email, &password).await?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_utils::{json_request, read_body, read_json, test_db, test_router};

    #[tokio::test]
    async fn test_signup_and_login() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(db, dir.path());

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/signup",
                json!({ "email": "a@example.com", "password": "secret", "username": "a" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = read_json(response).await;
        assert!(created.get("password").is_none());

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/auth/login",
                json!({ "email": "a@example.com", "password": "secret" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_400() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(db, dir.path());
        let body = json!({ "email": "a@example.com", "password": "secret" });

        app.clone()
            .oneshot(json_request(Method::POST, "/api/auth/signup", body.clone()))
            .await
            .unwrap();
        let response = app
            .oneshot(json_request(Method::POST, "/api/auth/signup", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_body(response).await, b"Email already in use".to_vec());
    }

    #[tokio::test]
    async fn test_login_failures_share_one_response() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(db, dir.path());
        app.clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/signup",
                json!({ "email": "a@example.com", "password": "secret" }),
            ))
            .await
            .unwrap();

        let mut bodies = Vec::new();
        for (email, password) in [("a@example.com", "SECRET"), ("b@example.com", "secret")] {
            let response = app
                .clone()
                .oneshot(json_request(
                    Method::POST,
                    "/api/auth/login",
                    json!({ "email": email, "password": password }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            bodies.push(read_body(response).await);
        }

        assert_eq!(bodies[0], bodies[1]);
        assert_eq!(bodies[0], b"Invalid email or password".to_vec());
    }

    #[tokio::test]
    async fn test_login_with_missing_fields_is_401() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(db, dir.path());

        for body in [
            json!({ "email": "a@example.com" }),
            json!({ "password": "secret" }),
            json!({}),
        ] {
            let response = app
                .clone()
                .oneshot(json_request(Method::POST, "/api/auth/login", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(read_body(response).await, b"Invalid email or password".to_vec());
        }
    }
}
