use std::sync::Arc;

use thiserror::Error;

use crate::database::{Database, NewUser, User};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already in use")]
    EmailInUse,
    #[error("No user registered with this email")]
    UnknownEmail,
    #[error("Password does not match")]
    PasswordMismatch,
    #[error("Storage error: {0}")]
    Storage(color_eyre::Report),
}

impl From<color_eyre::Report> for AuthError {
    fn from(report: color_eyre::Report) -> Self {
        AuthError::Storage(report)
    }
}

pub struct AuthService {
    db: Arc<Database>,
}

impl AuthService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn signup(&self, new_user: NewUser) -> Result<User, AuthError> {
        if self.db.get_user_by_email(&new_user.email).await?.is_some() {
            log::info!("Signup rejected, email already in use: {}", new_user.email);
            return Err(AuthError::EmailInUse);
        }

        Ok(self.db.insert_user(&new_user).await?)
    }

    /// Passwords are stored and compared as plain text
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.db.get_user_by_email(email).await? else {
            log::info!("Login failed, unknown email: {}", email);
            return Err(AuthError::UnknownEmail);
        };

        if user.password != password {
            log::info!("Login failed, wrong password for: {}", email);
            return Err(AuthError::PasswordMismatch);
        }

        log::info!("User logged in: {} (ID: {})", user.email, user.id);
        Ok(user)
    }
}
