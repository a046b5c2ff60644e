use libmdbx::{Database, DatabaseOptions, TableFlags, WriteFlags, WriteMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("mdbx error: {0}")]
    Mdbx(#[from] libmdbx::Error),

    #[error("database lock poisoned")]
    Poisoned,
}

#[derive(Clone)]
pub struct InnerDatabase {
    db: Arc<Mutex<Database<WriteMap>>>,
}

/// Key-value access used by the repositories. Every method runs in its own
/// transaction; writes are serialized by the database lock.
pub trait SafeDatabase: Clone + Send + Sync + 'static {

    fn new<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> where Self: Sized;

    fn read(&self, key: &str, table: &str) -> Result<Option<Vec<u8>>, DatabaseError>;

    /// Writes every `(table, key, value)` entry in one transaction, or nothing
    /// at all when any key is already present in its table. Returns whether
    /// the entries were written.
    fn insert_unique(&self, entries: &[(&str, &str, &str)]) -> Result<bool, DatabaseError>;

    /// Read-modify-write of a single key inside one write transaction.
    /// Returns `Ok(None)` without touching the table when the key is absent.
    fn modify<F, E>(&self, key: &str, table: &str, f: F) -> Result<Option<Vec<u8>>, E>
    where
        F: FnOnce(&[u8]) -> Result<Vec<u8>, E>,
        E: From<DatabaseError>;
}

impl InnerDatabase {
    fn lock(&self) -> Result<MutexGuard<'_, Database<WriteMap>>, DatabaseError> {
        self.db.lock().map_err(|_| DatabaseError::Poisoned)
    }
}


impl SafeDatabase for InnerDatabase {

    fn new<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let mut options = DatabaseOptions::default();
        options.max_tables = Some(16);
        let db = Database::<WriteMap>::open_with_options(path, options)?;

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }


    fn read(&self, key: &str, table: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
        let db = self.lock()?;
        let transaction = db.begin_ro_txn()?;

        if let Ok(table) = transaction.open_table(Some(table)) {
            let result = transaction.get(&table, key.as_bytes())?;
            return Ok(result);
        }

        Ok(None)
    }

    fn insert_unique(&self, entries: &[(&str, &str, &str)]) -> Result<bool, DatabaseError> {
        let db = self.lock()?;
        let transaction = db.begin_rw_txn()?;

        for (table, key, _) in entries {
            let table = transaction.create_table(Some(*table), TableFlags::default())?;
            let existing: Option<Vec<u8>> = transaction.get(&table, key.as_bytes())?;
            if existing.is_some() {
                // dropping the transaction aborts it
                return Ok(false);
            }
        }

        for (table, key, value) in entries {
            let table = transaction.create_table(Some(*table), TableFlags::default())?;
            transaction.put(&table, key, value, WriteFlags::default())?;
        }

        transaction.commit()?;
        Ok(true)
    }

    fn modify<F, E>(&self, key: &str, table: &str, f: F) -> Result<Option<Vec<u8>>, E>
    where
        F: FnOnce(&[u8]) -> Result<Vec<u8>, E>,
        E: From<DatabaseError>,
    {
        let db = self.lock()?;
        let transaction = db.begin_rw_txn().map_err(DatabaseError::from)?;
        let table = transaction
            .create_table(Some(table), TableFlags::default())
            .map_err(DatabaseError::from)?;

        let current: Option<Vec<u8>> = transaction
            .get(&table, key.as_bytes())
            .map_err(DatabaseError::from)?;
        let Some(current) = current else {
            return Ok(None);
        };

        let updated = f(&current)?;
        transaction
            .put(&table, key, &updated, WriteFlags::default())
            .map_err(DatabaseError::from)?;
        transaction.commit().map_err(DatabaseError::from)?;

        Ok(Some(updated))
    }
}


// NOTE: values are always copied out of the transaction (`Vec<u8>`). Handing
// out borrowed `Cow<[u8]>` past the transaction lifetime would dangle, since
// libmdbx maps pages directly.
