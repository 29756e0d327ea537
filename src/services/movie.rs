use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::Result;

use crate::database::{Database, Movie, MovieDraft};

/// Where a movie's video can be fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Absolute URL the client should be redirected to
    Remote(String),
    /// File on this machine
    Local(PathBuf),
}

pub struct MovieService {
    db: Arc<Database>,
}

impl MovieService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list_movies(&self) -> Result<Vec<Movie>> {
        self.db.list_movies().await
    }

    pub async fn list_movies_by_genre(&self, genre: &str) -> Result<Vec<Movie>> {
        self.db.list_movies_by_genre(genre).await
    }

    pub async fn get_movie(&self, id: i64) -> Result<Option<Movie>> {
        self.db.get_movie(id).await
    }

    /// Whether another movie already uses this title
    pub async fn title_taken(&self, title: &str, except_id: Option<i64>) -> Result<bool> {
        Ok(self
            .db
            .get_movie_by_title(title)
            .await?
            .is_some_and(|movie| Some(movie.id) != except_id))
    }

    pub async fn save_movie(&self, draft: &MovieDraft) -> Result<Movie> {
        self.db.save_movie(draft).await
    }

    /// Movies whose id is in `ids`, in catalog order. Unknown ids are skipped.
    pub async fn get_movies_by_ids(&self, ids: &[i64]) -> Result<Vec<Movie>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .db
            .list_movies()
            .await?
            .into_iter()
            .filter(|movie| ids.contains(&movie.id))
            .collect())
    }

    /// Stored image bytes, `None` when the movie or its thumbnail is missing
    pub async fn get_thumbnail(&self, id: i64) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get_movie(id).await?.and_then(|movie| movie.thumbnail))
    }

    pub async fn get_video_source(&self, id: i64) -> Result<Option<VideoSource>> {
        let Some(url) = self.db.get_movie(id).await?.and_then(|movie| movie.video_url) else {
            return Ok(None);
        };

        if url.starts_with("http") {
            return Ok(Some(VideoSource::Remote(url)));
        }

        let path = PathBuf::from(&url);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(VideoSource::Local(path))),
            _ => {
                log::debug!("Video file for movie {} not found: {}", id, url);
                Ok(None)
            }
        }
    }
}
