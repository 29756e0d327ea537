use std::sync::Arc;

use color_eyre::Result;

use crate::database::{Database, User};
use crate::entities::user_movie_list::MovieListKind;

pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.db.get_user(id).await
    }

    /// Only the username is editable. `None` when the user does not exist.
    pub async fn update_profile(&self, id: i64, username: Option<String>) -> Result<Option<User>> {
        self.db.update_username(id, username).await
    }

    pub async fn set_profile_picture(&self, id: i64, picture: Vec<u8>) -> Result<bool> {
        let stored = self.db.set_profile_picture(id, picture).await?;
        if stored {
            log::info!("Profile picture updated for user {}", id);
        }
        Ok(stored)
    }

    pub async fn get_profile_picture(&self, id: i64) -> Result<Option<Vec<u8>>> {
        Ok(self
            .db
            .get_user(id)
            .await?
            .and_then(|user| user.profile_picture))
    }

    /// Add a movie id to a list; adding one that is already present is a no-op.
    /// Returns the updated user, `None` when the user does not exist.
    pub async fn add_to_list(
        &self,
        user_id: i64,
        list: MovieListKind,
        movie_id: i64,
    ) -> Result<Option<User>> {
        if self.db.get_user(user_id).await?.is_none() {
            return Ok(None);
        }
        if !self.db.add_to_movie_list(user_id, list, movie_id).await? {
            log::debug!("Movie {} already in {:?} of user {}", movie_id, list, user_id);
        }
        self.db.get_user(user_id).await
    }

    /// Remove a movie id from a list; removing one that is absent is a no-op.
    pub async fn remove_from_list(
        &self,
        user_id: i64,
        list: MovieListKind,
        movie_id: i64,
    ) -> Result<Option<User>> {
        if self.db.get_user(user_id).await?.is_none() {
            return Ok(None);
        }
        self.db
            .remove_from_movie_list(user_id, list, movie_id)
            .await?;
        self.db.get_user(user_id).await
    }
}
