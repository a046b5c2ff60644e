pub mod basic_db;

pub use basic_db::{DatabaseError, InnerDatabase, SafeDatabase};
