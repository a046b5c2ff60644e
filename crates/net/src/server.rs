use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::{self, HeaderValue};
use axum::routing::{get, patch};
use axum::Router;
use profile_database::basic_db::{DatabaseError, InnerDatabase, SafeDatabase};
use profile_service::{AppConfig, AvatarPipeline, Config, ObjectStore, S3ObjectStore, UserRepository};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::JwtVerifier;
use crate::profile::*;
use crate::router::*;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to open database: {0}")]
    Database(#[from] DatabaseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct AppState<T: SafeDatabase> {
    pub users: UserRepository<T>,
    pub avatars: Arc<AvatarPipeline<T>>,
    pub auth: JwtVerifier,
}

impl<T: SafeDatabase> AppState<T> {
    pub fn new(database: T, store: Arc<dyn ObjectStore>, auth: JwtVerifier) -> Self {
        let users = UserRepository::new(database);
        let avatars = Arc::new(AvatarPipeline::new(users.clone(), store));
        Self { users, avatars, auth }
    }
}

impl<T: SafeDatabase> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            avatars: Arc::clone(&self.avatars),
            auth: self.auth.clone(),
        }
    }
}

impl<T: SafeDatabase> FromRef<AppState<T>> for JwtVerifier {
    fn from_ref(state: &AppState<T>) -> Self {
        state.auth.clone()
    }
}


pub async fn build_server(config: Config) -> Result<(), ServerError> {
    std::fs::create_dir_all(&config.app.database_path)?;
    let database = InnerDatabase::new(&config.app.database_path)?;
    let store = S3ObjectStore::from_config(&config.storage).await;
    let shared_state = AppState::new(
        database,
        Arc::new(store),
        JwtVerifier::new(&config.app.jwt_secret),
    );

    let app = build_app(shared_state, &config.app);

    let address = config.app.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(%address, bucket = %config.storage.bucket_name, "Profile service listening");

    axum::serve(listener, app).await?;
    Ok(())
}


pub fn build_app<T: SafeDatabase>(state: AppState<T>, config: &AppConfig) -> Router {
    let components = collect_components::<T>();

    main_router(components, state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}


fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            http::Method::GET,
            http::Method::PATCH,
            http::Method::OPTIONS
        ])
        .allow_headers(Any)
        .allow_credentials(false)
}


fn collect_components<T: SafeDatabase>() -> Vec<Component<AppState<T>>> {
    vec![
        route_builder("/health", get(health)),
        // editUser
        route_builder("/editUser/me", get(me::<T>)),
        route_builder("/editUser/updateName", patch(update_name::<T>)),
        route_builder("/editUser/upload", patch(upload_avatar::<T>)),
    ]
}
