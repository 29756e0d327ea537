pub mod genre;
pub mod movie;
pub mod movie_genre;
pub mod user;
pub mod user_movie_list;
