use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::database::Database;
use crate::services::{auth::AuthService, movie::MovieService, user::UserService};

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    /// Directory served under the images mount
    pub images_path: PathBuf,
}

impl AppState {
    pub fn movies(&self) -> MovieService {
        MovieService::new(self.db.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.clone())
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.db.clone())
    }
}
