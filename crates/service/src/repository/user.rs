use profile_database::SafeDatabase;

use super::{RepositoryError, USERS_TABLE};
use crate::parser::profile::UserProfile;

/// Users keyed by email. Updates are read-modify-write inside one write
/// transaction, so concurrent writers serialize and the last commit wins.
#[derive(Clone)]
pub struct UserRepository<D: SafeDatabase> {
    db: D,
}

impl<D: SafeDatabase> UserRepository<D> {
    pub fn new(db: D) -> Self {
        Self { db }
    }

    pub fn create(&self, user: &UserProfile) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(user)?;
        if !self.db.insert_unique(&[(USERS_TABLE, user.email.as_str(), json.as_str())])? {
            return Err(RepositoryError::Conflict(format!("user {}", user.email)));
        }
        Ok(())
    }

    pub fn find_by_email(&self, email: &str) -> Result<UserProfile, RepositoryError> {
        let data = self
            .db
            .read(email, USERS_TABLE)?
            .ok_or_else(|| not_found(email))?;

        Ok(serde_json::from_slice(&data)?)
    }

    pub fn update_name(&self, email: &str, name: &str) -> Result<UserProfile, RepositoryError> {
        self.update_with(email, |user| user.name = name.to_string())
    }

    pub fn update_avatar(&self, email: &str, avatar: &str) -> Result<UserProfile, RepositoryError> {
        self.update_with(email, |user| user.avatar = Some(avatar.to_string()))
    }

    fn update_with<F>(&self, email: &str, apply: F) -> Result<UserProfile, RepositoryError>
    where
        F: FnOnce(&mut UserProfile),
    {
        let updated = self.db.modify(email, USERS_TABLE, |current| -> Result<Vec<u8>, RepositoryError> {
            let mut user: UserProfile = serde_json::from_slice(current)?;
            apply(&mut user);
            Ok(serde_json::to_vec(&user)?)
        })?;

        match updated {
            Some(data) => Ok(serde_json::from_slice(&data)?),
            None => Err(not_found(email)),
        }
    }
}

fn not_found(email: &str) -> RepositoryError {
    RepositoryError::NotFound(format!("user {}", email))
}
