use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use color_eyre::{Result, eyre::Context};
use migration::MigratorTrait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue, ColumnTrait, ConnectOptions,
    ConnectionTrait, Database as SeaDatabase, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;

use crate::entities;
use crate::entities::user_movie_list::MovieListKind;

pub struct Database {
    pub conn: DatabaseConnection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// A movie row together with its genres.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
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
    #[serde(skip)]
    pub thumbnail: Option<Vec<u8>>,
    #[serde(skip)]
    pub video_url: Option<String>,
    pub genres: Vec<Genre>,
}

/// Writable form of a movie. `id: None` inserts a new row, genres are given by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieDraft {
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
    pub thumbnail: Option<Vec<u8>>,
    pub video_url: Option<String>,
    pub genres: Vec<String>,
}

impl From<Movie> for MovieDraft {
    fn from(movie: Movie) -> Self {
        MovieDraft {
            id: Some(movie.id),
            title: movie.title,
            file_name: movie.file_name,
            description: movie.description,
            rating: movie.rating,
            maturity_rating: movie.maturity_rating,
            release_year: movie.release_year,
            release_date: movie.release_date,
            duration: movie.duration,
            match_score: movie.match_score,
            poster_url: movie.poster_url,
            backdrop_url: movie.backdrop_url,
            thumbnail_url: movie.thumbnail_url,
            thumbnail: movie.thumbnail,
            video_url: movie.video_url,
            genres: movie.genres.into_iter().map(|g| g.name).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub username: Option<String>,
    #[serde(skip)]
    pub profile_picture: Option<Vec<u8>>,
    pub my_list: Vec<i64>,
    pub liked_movies: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

impl From<entities::genre::Model> for Genre {
    fn from(model: entities::genre::Model) -> Self {
        Genre {
            id: model.id,
            name: model.name,
        }
    }
}

fn movie_from_parts(model: entities::movie::Model, genres: Vec<Genre>) -> Movie {
    Movie {
        id: model.id,
        title: model.title,
        file_name: model.file_name,
        description: model.description,
        rating: model.rating,
        maturity_rating: model.maturity_rating,
        release_year: model.release_year,
        release_date: model.release_date,
        duration: model.duration,
        match_score: model.match_score,
        poster_url: model.poster_url,
        backdrop_url: model.backdrop_url,
        thumbnail_url: model.thumbnail_url,
        thumbnail: model.thumbnail,
        video_url: model.video_url,
        genres,
    }
}

fn apply_draft(active: &mut entities::movie::ActiveModel, draft: &MovieDraft) {
    active.title = ActiveValue::Set(draft.title.clone());
    active.file_name = ActiveValue::Set(draft.file_name.clone());
    active.description = ActiveValue::Set(draft.description.clone());
    active.rating = ActiveValue::Set(draft.rating);
    active.maturity_rating = ActiveValue::Set(draft.maturity_rating.clone());
    active.release_year = ActiveValue::Set(draft.release_year);
    active.release_date = ActiveValue::Set(draft.release_date);
    active.duration = ActiveValue::Set(draft.duration.clone());
    active.match_score = ActiveValue::Set(draft.match_score);
    active.poster_url = ActiveValue::Set(draft.poster_url.clone());
    active.backdrop_url = ActiveValue::Set(draft.backdrop_url.clone());
    active.thumbnail_url = ActiveValue::Set(draft.thumbnail_url.clone());
    active.thumbnail = ActiveValue::Set(draft.thumbnail.clone());
    active.video_url = ActiveValue::Set(draft.video_url.clone());
}

/// Find a genre by exact name, creating it when missing.
async fn find_or_create_genre<C: ConnectionTrait>(conn: &C, name: &str) -> Result<Genre> {
    let existing = entities::genre::Entity::find()
        .filter(entities::genre::Column::Name.eq(name))
        .order_by_asc(entities::genre::Column::Id)
        .one(conn)
        .await
        .context("Failed to query genre by name")?;

    if let Some(genre) = existing {
        return Ok(genre.into());
    }

    log::debug!("Creating genre: '{}'", name);
    let genre = entities::genre::ActiveModel {
        name: ActiveValue::Set(name.to_string()),
        ..entities::genre::ActiveModel::new()
    }
    .insert(conn)
    .await
    .context(format!("Failed to insert genre '{}'", name))?;

    Ok(genre.into())
}

impl Database {
    /// Open or create a database at the given path
    pub async fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening database at: {}", path.display());

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create database directory: {}",
                parent.display()
            ))?;
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());

        let mut opt = ConnectOptions::new(url);
        opt.max_connections(16)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .sqlx_logging(false);

        let conn = SeaDatabase::connect(opt)
            .await
            .context(format!("Failed to open database: {}", path.display()))?;

        log::debug!("Running database migrations");
        migration::Migrator::up(&conn, None)
            .await
            .context("Failed to run database migrations")?;

        log::info!("Database ready at: {}", path.display());
        Ok(Database { conn })
    }

    // ========== Genre Methods ==========

    pub async fn find_or_create_genre(&self, name: &str) -> Result<Genre> {
        find_or_create_genre(&self.conn, name).await
    }

    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        let genres = entities::genre::Entity::find()
            .order_by_asc(entities::genre::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list genres")?;

        Ok(genres.into_iter().map(Genre::from).collect())
    }

    // ========== Movie Methods ==========

    /// Attach genres (sorted by name) to movie rows, preserving the order of `models`
    async fn hydrate_movies(&self, models: Vec<entities::movie::Model>) -> Result<Vec<Movie>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let movie_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let links = entities::movie_genre::Entity::find()
            .filter(entities::movie_genre::Column::MovieId.is_in(movie_ids))
            .all(&self.conn)
            .await
            .context("Failed to query movie genres")?;

        let genre_ids: HashSet<i64> = links.iter().map(|link| link.genre_id).collect();
        let genres: HashMap<i64, Genre> = if genre_ids.is_empty() {
            HashMap::new()
        } else {
            entities::genre::Entity::find()
                .filter(entities::genre::Column::Id.is_in(genre_ids))
                .all(&self.conn)
                .await
                .context("Failed to query genres")?
                .into_iter()
                .map(|g| (g.id, Genre::from(g)))
                .collect()
        };

        let mut genres_by_movie: HashMap<i64, Vec<Genre>> = HashMap::new();
        for link in links {
            if let Some(genre) = genres.get(&link.genre_id) {
                genres_by_movie
                    .entry(link.movie_id)
                    .or_default()
                    .push(genre.clone());
            }
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let mut genres = genres_by_movie.remove(&model.id).unwrap_or_default();
                genres.sort_by(|a, b| a.name.cmp(&b.name));
                movie_from_parts(model, genres)
            })
            .collect())
    }

    pub async fn list_movies(&self) -> Result<Vec<Movie>> {
        let models = entities::movie::Entity::find()
            .order_by_asc(entities::movie::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list movies")?;

        self.hydrate_movies(models).await
    }

    pub async fn count_movies(&self) -> Result<u64> {
        entities::movie::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count movies")
    }

    pub async fn get_movie(&self, id: i64) -> Result<Option<Movie>> {
        let model = entities::movie::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to get movie")?;

        Ok(self.hydrate_movies(model.into_iter().collect()).await?.pop())
    }

    pub async fn get_movie_by_title(&self, title: &str) -> Result<Option<Movie>> {
        let model = entities::movie::Entity::find()
            .filter(entities::movie::Column::Title.eq(title))
            .one(&self.conn)
            .await
            .context("Failed to query movie by title")?;

        Ok(self.hydrate_movies(model.into_iter().collect()).await?.pop())
    }

    pub async fn get_movie_by_file_name(&self, file_name: &str) -> Result<Option<Movie>> {
        let model = entities::movie::Entity::find()
            .filter(entities::movie::Column::FileName.eq(file_name))
            .order_by_asc(entities::movie::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query movie by file name")?;

        Ok(self.hydrate_movies(model.into_iter().collect()).await?.pop())
    }

    /// Movies tagged with a genre of exactly this name
    pub async fn list_movies_by_genre(&self, genre_name: &str) -> Result<Vec<Movie>> {
        let genre_ids: Vec<i64> = entities::genre::Entity::find()
            .filter(entities::genre::Column::Name.eq(genre_name))
            .all(&self.conn)
            .await
            .context("Failed to query genres by name")?
            .into_iter()
            .map(|g| g.id)
            .collect();

        if genre_ids.is_empty() {
            return Ok(Vec::new());
        }

        let movie_ids: HashSet<i64> = entities::movie_genre::Entity::find()
            .filter(entities::movie_genre::Column::GenreId.is_in(genre_ids))
            .all(&self.conn)
            .await
            .context("Failed to query movie genres")?
            .into_iter()
            .map(|link| link.movie_id)
            .collect();

        if movie_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = entities::movie::Entity::find()
            .filter(entities::movie::Column::Id.is_in(movie_ids))
            .order_by_asc(entities::movie::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to fetch movies by genre")?;

        self.hydrate_movies(models).await
    }

    /// Insert or update a movie and replace its genre set.
    ///
    /// A draft whose id does not exist is inserted with a freshly assigned id.
    pub async fn save_movie(&self, draft: &MovieDraft) -> Result<Movie> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin movie transaction")?;

        let existing = match draft.id {
            Some(id) => entities::movie::Entity::find_by_id(id)
                .one(&txn)
                .await
                .context("Failed to find movie")?,
            None => None,
        };

        let saved = match existing {
            Some(model) => {
                let mut active: entities::movie::ActiveModel = model.into();
                apply_draft(&mut active, draft);
                active
                    .update(&txn)
                    .await
                    .context(format!("Failed to update movie '{}'", draft.title))?
            }
            None => {
                let mut active = entities::movie::ActiveModel::new();
                apply_draft(&mut active, draft);
                active
                    .insert(&txn)
                    .await
                    .context(format!("Failed to insert movie '{}'", draft.title))?
            }
        };

        entities::movie_genre::Entity::delete_many()
            .filter(entities::movie_genre::Column::MovieId.eq(saved.id))
            .exec(&txn)
            .await
            .context("Failed to clear movie genres")?;

        let mut linked = HashSet::new();
        for name in &draft.genres {
            let genre = find_or_create_genre(&txn, name).await?;
            if !linked.insert(genre.id) {
                continue;
            }
            entities::movie_genre::ActiveModel {
                movie_id: ActiveValue::Set(saved.id),
                genre_id: ActiveValue::Set(genre.id),
            }
            .insert(&txn)
            .await
            .context("Failed to link movie genre")?;
        }

        txn.commit()
            .await
            .context("Failed to commit movie transaction")?;

        log::debug!("Movie saved: '{}' (ID: {})", saved.title, saved.id);

        self.get_movie(saved.id)
            .await?
            .ok_or_else(|| color_eyre::eyre::eyre!("Movie {} vanished after save", saved.id))
    }

    // ========== User Methods ==========

    async fn get_movie_lists(&self, user_id: i64) -> Result<(Vec<i64>, Vec<i64>)> {
        let entries = entities::user_movie_list::Entity::find()
            .filter(entities::user_movie_list::Column::UserId.eq(user_id))
            .order_by_asc(entities::user_movie_list::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query user movie lists")?;

        let mut my_list = Vec::new();
        let mut liked_movies = Vec::new();
        for entry in entries {
            match entry.list {
                MovieListKind::MyList => my_list.push(entry.movie_id),
                MovieListKind::Liked => liked_movies.push(entry.movie_id),
            }
        }

        Ok((my_list, liked_movies))
    }

    async fn hydrate_user(&self, model: entities::user::Model) -> Result<User> {
        let (my_list, liked_movies) = self.get_movie_lists(model.id).await?;
        Ok(User {
            id: model.id,
            email: model.email,
            password: model.password,
            username: model.username,
            profile_picture: model.profile_picture,
            my_list,
            liked_movies,
        })
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let model = entities::user::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to get user")?;

        match model {
            Some(model) => Ok(Some(self.hydrate_user(model).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let model = entities::user::Entity::find()
            .filter(entities::user::Column::Email.eq(email))
            .order_by_asc(entities::user::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        match model {
            Some(model) => Ok(Some(self.hydrate_user(model).await?)),
            None => Ok(None),
        }
    }

    pub async fn insert_user(&self, new_user: &NewUser) -> Result<User> {
        let model = entities::user::ActiveModel {
            email: ActiveValue::Set(new_user.email.clone()),
            password: ActiveValue::Set(new_user.password.clone()),
            username: ActiveValue::Set(new_user.username.clone()),
            ..entities::user::ActiveModel::new()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert user")?;

        log::info!("User created: '{}' (ID: {})", model.email, model.id);
        self.hydrate_user(model).await
    }

    /// Returns `None` when the user does not exist
    pub async fn update_username(
        &self,
        id: i64,
        username: Option<String>,
    ) -> Result<Option<User>> {
        let Some(model) = entities::user::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to find user")?
        else {
            return Ok(None);
        };

        let mut active: entities::user::ActiveModel = model.into();
        active.username = ActiveValue::Set(username);
        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update username")?;

        Ok(Some(self.hydrate_user(model).await?))
    }

    /// Returns `false` when the user does not exist
    pub async fn set_profile_picture(&self, id: i64, picture: Vec<u8>) -> Result<bool> {
        let Some(model) = entities::user::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to find user")?
        else {
            return Ok(false);
        };

        let mut active: entities::user::ActiveModel = model.into();
        active.profile_picture = ActiveValue::Set(Some(picture));
        active
            .update(&self.conn)
            .await
            .context("Failed to store profile picture")?;

        Ok(true)
    }

    /// Append a movie id to one of the user's lists. Returns `false` if it was already there.
    pub async fn add_to_movie_list(
        &self,
        user_id: i64,
        list: MovieListKind,
        movie_id: i64,
    ) -> Result<bool> {
        let existing = entities::user_movie_list::Entity::find()
            .filter(entities::user_movie_list::Column::UserId.eq(user_id))
            .filter(entities::user_movie_list::Column::List.eq(list))
            .filter(entities::user_movie_list::Column::MovieId.eq(movie_id))
            .one(&self.conn)
            .await
            .context("Failed to check user movie list")?;

        if existing.is_some() {
            return Ok(false);
        }

        entities::user_movie_list::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            list: ActiveValue::Set(list),
            movie_id: ActiveValue::Set(movie_id),
            ..entities::user_movie_list::ActiveModel::new()
        }
        .insert(&self.conn)
        .await
        .context("Failed to add movie to user list")?;

        Ok(true)
    }

    /// Remove a movie id from one of the user's lists. Returns `false` if it was not there.
    pub async fn remove_from_movie_list(
        &self,
        user_id: i64,
        list: MovieListKind,
        movie_id: i64,
    ) -> Result<bool> {
        let result = entities::user_movie_list::Entity::delete_many()
            .filter(entities::user_movie_list::Column::UserId.eq(user_id))
            .filter(entities::user_movie_list::Column::List.eq(list))
            .filter(entities::user_movie_list::Column::MovieId.eq(movie_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove movie from user list")?;

        Ok(result.rows_affected > 0)
    }
}
