//! Avatar upload pipeline: normalize -> upload -> persist.
//!
//! Steps run strictly in order and the first failure aborts the rest. An image
//! that cannot be decoded never reaches object storage or the database. When
//! the database write fails after a successful upload, the fresh object is
//! deleted again so the bucket does not accumulate unreferenced avatars.

use std::sync::Arc;

use profile_database::SafeDatabase;
use tracing::{debug, info, warn};

use crate::normalizer::{ImageError, ImageNormalizer, AVATAR_CONTENT_TYPE};
use crate::parser::profile::UserProfile;
use crate::repository::{RepositoryError, UserRepository};
use crate::storage::{avatar_object_key, ObjectStore, StorageError};

/// Raw upload as received from the transport, untouched.
#[derive(Debug, Clone)]
pub struct InboundFile {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub key: String,
    pub url: String,
    pub user: UserProfile,
}

pub struct AvatarPipeline<D: SafeDatabase> {
    users: UserRepository<D>,
    store: Arc<dyn ObjectStore>,
    normalizer: ImageNormalizer,
}

impl<D: SafeDatabase> AvatarPipeline<D> {
    pub fn new(users: UserRepository<D>, store: Arc<dyn ObjectStore>) -> Self {
        Self::with_normalizer(users, store, ImageNormalizer::default())
    }

    pub fn with_normalizer(
        users: UserRepository<D>,
        store: Arc<dyn ObjectStore>,
        normalizer: ImageNormalizer,
    ) -> Self {
        Self { users, store, normalizer }
    }

    pub async fn run(&self, email: &str, file: InboundFile) -> Result<AvatarUpload, AvatarError> {
        debug!(
            email,
            declared_type = file.content_type.as_deref().unwrap_or("unknown"),
            file_name = file.file_name.as_deref().unwrap_or(""),
            size = file.bytes.len(),
            "Avatar upload received"
        );

        let normalized = self.normalizer.normalize_async(file.bytes).await?;

        // derived once: the same key goes into the put and into the URL
        let key = avatar_object_key();
        self.store
            .put_object(&key, normalized.data, AVATAR_CONTENT_TYPE)
            .await?;
        let url = self.store.public_url(&key);

        let user = match self.users.update_avatar(email, &url) {
            Ok(user) => user,
            Err(err) => {
                self.discard(&key).await;
                return Err(err.into());
            }
        };

        info!(email, key = %key, "Avatar updated");
        Ok(AvatarUpload { key, url, user })
    }

    async fn discard(&self, key: &str) {
        if let Err(err) = self.store.delete_object(key).await {
            warn!(key, error = %err, "Failed to remove orphaned avatar object");
        }
    }
}
