use profile_database::SafeDatabase;

use super::{RepositoryError, IMAGES_TABLE, IMAGE_PATHS_TABLE};
use crate::parser::image::ImageRecord;

/// Image records keyed by filename, with a `path -> filename` index that
/// enforces path uniqueness.
#[derive(Clone)]
pub struct ImageRepository<D: SafeDatabase> {
    db: D,
}

impl<D: SafeDatabase> ImageRepository<D> {
    pub fn new(db: D) -> Self {
        Self { db }
    }

    pub fn create(&self, path: &str, filename: &str) -> Result<ImageRecord, RepositoryError> {
        let record = ImageRecord::new(path, filename);
        let json = serde_json::to_string(&record)?;

        let written = self.db.insert_unique(&[
            (IMAGES_TABLE, filename, json.as_str()),
            (IMAGE_PATHS_TABLE, path, filename),
        ])?;
        if !written {
            return Err(RepositoryError::Conflict(format!(
                "image with path {} or filename {}",
                path, filename
            )));
        }

        Ok(record)
    }

    pub fn find_by_filename(&self, filename: &str) -> Result<ImageRecord, RepositoryError> {
        let data = self
            .db
            .read(filename, IMAGES_TABLE)?
            .ok_or_else(|| RepositoryError::NotFound(format!("image {}", filename)))?;

        Ok(serde_json::from_slice(&data)?)
    }

    pub fn find_by_path(&self, path: &str) -> Result<ImageRecord, RepositoryError> {
        let filename = self
            .db
            .read(path, IMAGE_PATHS_TABLE)?
            .ok_or_else(|| RepositoryError::NotFound(format!("image at {}", path)))?;

        self.find_by_filename(&String::from_utf8_lossy(&filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_database::InnerDatabase;
    use tempfile::tempdir;

    #[test]
    fn test_create_and_lookup() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempdir()?;
        let images = ImageRepository::new(InnerDatabase::new(temp_dir.path().join("test_db"))?);

        let created = images.create("uploads/2024", "cat.jpeg")?;

        assert_eq!(images.find_by_filename("cat.jpeg")?, created);
        assert_eq!(images.find_by_path("uploads/2024")?, created);
        assert_eq!(created.created_at, created.updated_at);
        Ok(())
    }

    #[test]
    fn test_path_and_filename_unique_independently() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempdir()?;
        let images = ImageRepository::new(InnerDatabase::new(temp_dir.path().join("test_db"))?);
        images.create("uploads/a", "a.jpeg")?;

        assert!(matches!(
            images.create("uploads/a", "b.jpeg"),
            Err(RepositoryError::Conflict(_))
        ));
        assert!(matches!(
            images.create("uploads/b", "a.jpeg"),
            Err(RepositoryError::Conflict(_))
        ));

        // rejected inserts leave no half-written index entries
        assert!(images.find_by_filename("b.jpeg").is_err());
        assert!(images.find_by_path("uploads/b").is_err());
        Ok(())
    }
}
