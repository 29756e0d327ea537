pub mod auth;
pub mod library_sync;
pub mod movie;
pub mod placeholders;
pub mod seed;
pub mod user;
