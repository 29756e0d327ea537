use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    database::Database,
    http_server::{
        http_routes::{auth, movies, users},
        state::AppState,
    },
};

pub struct HttpServerConfig {
    pub port: u16,
    pub database: Arc<Database>,
    pub config: Config,
    pub images_path: PathBuf,
}

/// CORS for the static images: only the configured dev origins may load them
fn image_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

pub fn router(app_state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/movies",
            get(movies::list_movies).post(movies::save_movie),
        )
        .route("/api/movies/batch", post(movies::get_movies_batch))
        .route("/api/movies/genre/{genre}", get(movies::list_movies_by_genre))
        .route("/api/movies/{id}", get(movies::get_movie))
        .route("/api/movies/{id}/thumbnail", get(movies::movie_thumbnail))
        .route("/api/movies/{id}/video", get(movies::movie_video))
        .route(
            "/api/users/{id}",
            get(users::get_user).put(users::update_user),
        )
        .route(
            "/api/users/{id}/picture",
            get(users::get_profile_picture).post(users::upload_profile_picture),
        )
        .route(
            "/api/users/{id}/mylist/{movie_id}",
            post(users::add_to_my_list).delete(users::remove_from_my_list),
        )
        .route(
            "/api/users/{id}/liked/{movie_id}",
            post(users::add_liked_movie).delete(users::remove_liked_movie),
        )
        .layer(CorsLayer::permissive());

    let images = ServiceBuilder::new()
        .layer(image_cors_layer(&app_state.config.cors_dev_origins))
        .service(ServeDir::new(&app_state.images_path));

    let mount = app_state.config.images_mount();
    let app = if mount.is_empty() {
        api.fallback_service(images)
    } else {
        api.nest_service(&mount, images)
    };

    app.layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn start(server_config: HttpServerConfig) -> color_eyre::Result<()> {
    let HttpServerConfig {
        port,
        database,
        config,
        images_path,
    } = server_config;

    log::info!(
        "Serving images from {} at '{}'",
        images_path.display(),
        config.images_mount()
    );
    let app = router(Arc::new(AppState {
        db: database,
        config,
        images_path,
    }));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", port))?;
    log::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}
