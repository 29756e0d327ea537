use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database as SeaDatabase};

use crate::config::Config;
use crate::database::{Database, MovieDraft};
use crate::http_server::{app, state::AppState};

pub async fn test_db() -> Arc<Database> {
    // Every pooled connection would open its own in-memory database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = SeaDatabase::connect(opt).await.unwrap();

    // Enable foreign keys
    conn.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .unwrap();

    migration::Migrator::up(&conn, None)
        .await
        .unwrap_or_else(|e| panic!("Failed to migrate test database: {}", e));

    Arc::new(Database { conn })
}

/// Minimal draft for a new movie with the given title and genres
pub fn movie_draft(title: &str, genres: &[&str]) -> MovieDraft {
    MovieDraft {
        title: title.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        ..MovieDraft::default()
    }
}

pub fn test_router(db: Arc<Database>, images_path: &Path) -> Router {
    app::router(Arc::new(AppState {
        db,
        config: Config::default(),
        images_path: images_path.to_path_buf(),
    }))
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn read_body(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&read_body(response).await).unwrap()
}
