use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::{TypedHeader, headers::Range};
use axum_range::{KnownSize, Ranged};
use chrono::NaiveDate;
use color_eyre::eyre::Context;
use serde::Deserialize;
use tokio::fs::File;

use crate::database::{Movie, MovieDraft};
use crate::http_server::error::{ApiError, ApiResult};
use crate::http_server::state::AppState;
use crate::services::movie::VideoSource;

/// A genre given either as a bare name or as `{"name": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GenreInput {
    Name(String),
    Object { name: String },
}

impl GenreInput {
    fn into_name(self) -> String {
        match self {
            GenreInput::Name(name) | GenreInput::Object { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieInput {
    pub id: Option<i64>,
    pub title: String,
    pub file_name: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub maturity_rating: Option<String>,
    pub release_year: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub duration: Option<String>,
    pub match_score: Option<i32>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenreInput>,
}

pub async fn list_movies(State(app_state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(app_state.movies().list_movies().await?))
}

pub async fn list_movies_by_genre(
    State(app_state): State<Arc<AppState>>,
    Path(genre): Path<String>,
) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(app_state.movies().list_movies_by_genre(&genre).await?))
}

pub async fn get_movie(
    State(app_state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
) -> ApiResult<Json<Movie>> {
    app_state
        .movies()
        .get_movie(movie_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Insert a movie, or overwrite the one with the given id. Stored image bytes are kept.
pub async fn save_movie(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<MovieInput>,
) -> ApiResult<Json<Movie>> {
    let movies = app_state.movies();

    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    if movies.title_taken(&title, input.id).await? {
        return Err(ApiError::BadRequest(format!(
            "A movie titled '{}' already exists",
            title
        )));
    }

    let existing = match input.id {
        Some(id) => movies.get_movie(id).await?,
        None => None,
    };
    let (thumbnail, stored_video_url) = existing
        .map(|movie| (movie.thumbnail, movie.video_url))
        .unwrap_or_default();

    let draft = MovieDraft {
        id: input.id,
        title,
        file_name: input.file_name,
        description: input.description,
        rating: input.rating,
        maturity_rating: input.maturity_rating,
        release_year: input.release_year,
        release_date: input.release_date,
        duration: input.duration,
        match_score: input.match_score,
        poster_url: input.poster_url,
        backdrop_url: input.backdrop_url,
        thumbnail_url: input.thumbnail_url,
        thumbnail,
        video_url: input.video_url.or(stored_video_url),
        genres: input.genres.into_iter().map(GenreInput::into_name).collect(),
    };

    Ok(Json(movies.save_movie(&draft).await?))
}

/// Ids may be numbers or numeric strings; anything else is skipped
fn parse_movie_ids(values: &[serde_json::Value]) -> Vec<i64> {
    values
        .iter()
        .filter_map(|value| match value {
            serde_json::Value::Number(number) => number.as_i64(),
            serde_json::Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
        .collect()
}

pub async fn get_movies_batch(
    State(app_state): State<Arc<AppState>>,
    Json(ids): Json<Vec<serde_json::Value>>,
) -> ApiResult<Json<Vec<Movie>>> {
    let ids = parse_movie_ids(&ids);
    Ok(Json(app_state.movies().get_movies_by_ids(&ids).await?))
}

pub async fn movie_thumbnail(
    State(app_state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
) -> ApiResult<Response> {
    let bytes = app_state
        .movies()
        .get_thumbnail(movie_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

pub async fn movie_video(
    State(app_state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
    range: Option<TypedHeader<Range>>,
) -> ApiResult<Response> {
    match app_state.movies().get_video_source(movie_id).await? {
        Some(VideoSource::Remote(url)) => {
            Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
        }
        Some(VideoSource::Local(path)) => {
            let file = File::open(&path)
                .await
                .wrap_err_with(|| format!("Failed to open video file: {}", path.display()))?;
            let body = KnownSize::file(file)
                .await
                .wrap_err("Failed to get video file size")?;

            let range = range.map(|TypedHeader(range)| range);
            Ok((
                [(header::CONTENT_TYPE, "video/mp4")],
                Ranged::new(range, body),
            )
                .into_response())
        }
        None => Err(ApiError::NotFound),
    }
}
