pub mod avatar;
pub mod config;
pub mod normalizer;
pub mod parser;
pub mod repository;
pub mod storage;

pub use avatar::{AvatarError, AvatarPipeline, AvatarUpload, InboundFile};
pub use config::{AppConfig, Config, ConfigError, StorageConfig};
pub use normalizer::{ImageError, ImageNormalizer};
pub use repository::{ImageRepository, RepositoryError, UserRepository};
pub use storage::{ObjectStore, S3ObjectStore, StorageError};
