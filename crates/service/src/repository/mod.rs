pub mod image;
pub mod user;

use profile_database::DatabaseError;

pub use self::image::ImageRepository;
pub use self::user::UserRepository;

pub const USERS_TABLE: &str = "users";
pub const IMAGES_TABLE: &str = "images";
pub const IMAGE_PATHS_TABLE: &str = "image_paths";

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),
}
