use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::database::User;
use crate::entities::user_movie_list::MovieListKind;
use crate::http_server::error::{ApiError, ApiResult};
use crate::http_server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
}

pub async fn get_user(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<User>> {
    app_state
        .users()
        .get_user(user_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn update_user(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<User>> {
    app_state
        .users()
        .update_profile(user_id, update.username)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Stores the multipart field `file` as the user's profile picture
pub async fn upload_profile_picture(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<&'static str> {
    let users = app_state.users();
    if users.get_user(user_id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        log::warn!("Failed to read multipart upload for user {}: {}", user_id, e);
        ApiError::UploadFailed
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let bytes = field.bytes().await.map_err(|e| {
            log::warn!("Failed to read profile picture for user {}: {}", user_id, e);
            ApiError::UploadFailed
        })?;

        if !users.set_profile_picture(user_id, bytes.to_vec()).await? {
            return Err(ApiError::NotFound);
        }
        return Ok("Profile picture uploaded successfully");
    }

    Err(ApiError::BadRequest("Missing multipart field 'file'".to_string()))
}

pub async fn get_profile_picture(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<Response> {
    let bytes = app_state
        .users()
        .get_profile_picture(user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

async fn add_to_list(
    app_state: &AppState,
    user_id: i64,
    list: MovieListKind,
    movie_id: i64,
) -> ApiResult<Json<User>> {
    app_state
        .users()
        .add_to_list(user_id, list, movie_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn remove_from_list(
    app_state: &AppState,
    user_id: i64,
    list: MovieListKind,
    movie_id: i64,
) -> ApiResult<Json<User>> {
    app_state
        .users()
        .remove_from_list(user_id, list, movie_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn add_to_my_list(
    State(app_state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(i64, i64)>,
) -> ApiResult<Json<User>> {
    add_to_list(&app_state, user_id, MovieListKind::MyList, movie_id).await
}

pub async fn remove_from_my_list(
    State(app_state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(i64, i64)>,
) -> ApiResult<Json<User>> {
    remove_from_list(&app_state, user_id, MovieListKind::MyList, movie_id).await
}

pub async fn add_liked_movie(
    State(app_state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(i64, i64)>,
) -> ApiResult<Json<User>> {
    add_to_list(&app_state, user_id, MovieListKind::Liked, movie_id).await
}

pub async fn remove_liked_movie(
    State(app_state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(i64, i64)>,
) -> ApiResult<Json<User>> {
    remove_from_list(&app_state, user_id, MovieListKind::Liked, movie_id).await
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::database::NewUser;
    use crate::test_utils::{
        empty_request, json_request, read_body, read_json, test_db, test_router,
    };

    async fn setup() -> (axum::Router, User, tempfile::TempDir) {
        let db = test_db().await;
        let user = db
            .insert_user(&NewUser {
                email: "viewer@example.com".to_string(),
                password: "hunter2".to_string(),
                username: Some("viewer".to_string()),
            })
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        (test_router(db, dir.path()), user, dir)
    }

    fn multipart_request(uri: &str, field: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--BOUNDARY\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"me.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
            field
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n--BOUNDARY--\r\n");

        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=BOUNDARY",
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_profile_never_exposes_password() {
        let (app, user, _dir) = setup().await;

        let response = app
            .oneshot(empty_request(Method::GET, &format!("/api/users/{}", user.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["email"], "viewer@example.com");
        assert_eq!(body["myList"], json!([]));
        assert_eq!(body["likedMovies"], json!([]));
        assert!(body.get("password").is_none());
        assert!(body.get("profilePicture").is_none());
    }

    #[tokio::test]
    async fn test_update_changes_username_only() {
        let (app, user, _dir) = setup().await;

        let response = app
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/users/{}", user.id),
                json!({ "username": "renamed", "email": "other@example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["username"], "renamed");
        assert_eq!(body["email"], "viewer@example.com");
    }

    #[tokio::test]
    async fn test_list_add_is_idempotent() {
        let (app, user, _dir) = setup().await;
        let uri = format!("/api/users/{}/mylist/42", user.id);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(empty_request(Method::POST, &uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(empty_request(
                Method::POST,
                &format!("/api/users/{}/liked/7", user.id),
            ))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["myList"], json!([42]));
        assert_eq!(body["likedMovies"], json!([7]));

        let response = app
            .clone()
            .oneshot(empty_request(
                Method::DELETE,
                &format!("/api/users/{}/liked/99", user.id),
            ))
            .await
            .unwrap();
        assert_eq!(read_json(response).await["likedMovies"], json!([7]));

        let response = app
            .oneshot(empty_request(Method::DELETE, &uri))
            .await
            .unwrap();
        assert_eq!(read_json(response).await["myList"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_user_is_404() {
        let (app, _user, _dir) = setup().await;

        for (method, uri) in [
            (Method::GET, "/api/users/999"),
            (Method::GET, "/api/users/999/picture"),
            (Method::POST, "/api/users/999/mylist/1"),
            (Method::DELETE, "/api/users/999/liked/1"),
        ] {
            let response = app
                .clone()
                .oneshot(empty_request(method, uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_picture_upload_and_download() {
        let (app, user, _dir) = setup().await;
        let uri = format!("/api/users/{}/picture", user.id);

        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(multipart_request(&uri, "file", &[0xff, 0xd8, 0xff]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(read_body(response).await, vec![0xff, 0xd8, 0xff]);

        let response = app
            .oneshot(multipart_request(&uri, "avatar", b"nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_truncated_upload_is_500() {
        let (app, user, _dir) = setup().await;
        let uri = format!("/api/users/{}/picture", user.id);

        // Stream ends inside the part, before the closing boundary
        let request = Request::builder()
            .method(Method::POST)
            .uri(&uri)
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=BOUNDARY",
            )
            .body(Body::from(
                "--BOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"me.jpg\"\r\n\r\npartial",
            ))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_body(response).await, b"Error uploading file".to_vec());

        let response = app
            .oneshot(empty_request(Method::GET, &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
