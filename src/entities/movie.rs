use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue::Set};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub title: String,
    /// Name of the file in the images directory this movie was indexed from
    pub file_name: Option<String>,
    pub description: Option<String>,
    /// Score out of ten, e.g. 8.7
    pub rating: Option<f64>,
    /// Audience rating label, e.g. "U/A 13+"
    pub maturity_rating: Option<String>,
    pub release_year: Option<i32>,
    pub release_date: Option<chrono::NaiveDate>,
    /// Human readable running time, e.g. "2h 15m"
    pub duration: Option<String>,
    pub match_score: Option<i32>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub thumbnail: Option<Vec<u8>>,
    /// Either a remote `http(s)://` URL or a path on the local filesystem
    pub video_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    #[sea_orm(has_many, via = "movie_genre")]
    pub genres: HasMany<super::genre::Entity>,
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            created_at: Set(now),
            updated_at: Set(now),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, sea_orm::DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(chrono::Utc::now().timestamp());
        }
        Ok(self)
    }
}
