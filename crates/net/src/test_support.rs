//! Shared fixtures for handler and router tests.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use jsonwebtoken::{encode, EncodingKey, Header};
use profile_database::{InnerDatabase, SafeDatabase};
use profile_service::parser::profile::UserProfile;
use profile_service::storage::public_object_url;
use profile_service::{AppConfig, ObjectStore, StorageError};
use tempfile::{tempdir, TempDir};

use crate::auth::{Claims, JwtVerifier};
use crate::server::{build_app, AppState};

pub const TEST_SECRET: &str = "test-secret";

pub fn token_for(email: &str) -> String {
    let claims = Claims {
        email: email.to_string(),
        exp: 4_102_444_800, // 2100-01-01
        sub: None,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_bytes())).unwrap()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([10, 120, 200]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub fn create_multipart_body(fields: Vec<(&str, &str)>, file_field: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    let boundary = "test_boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((name, filename, data)) = file_field {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            name, filename
        ).as_bytes());
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    (format!("multipart/form-data; boundary={}", boundary), body)
}


#[derive(Default)]
pub struct RecordingStore {
    puts: Mutex<Vec<String>>,
    fail_puts: bool,
}

impl RecordingStore {
    pub fn put_keys(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_object(&self, key: &str, _body: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        if self.fail_puts {
            return Err(StorageError::Upload {
                key: key.to_string(),
                message: "service unavailable".to_string(),
            });
        }
        self.puts.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn delete_object(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url("mybucket", "us-east-1", key)
    }
}


pub struct TestApp {
    pub state: AppState<InnerDatabase>,
    pub store: Arc<RecordingStore>,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(RecordingStore::default())
    }

    pub fn failing_storage() -> Self {
        Self::with_store(RecordingStore {
            fail_puts: true,
            ..Default::default()
        })
    }

    fn with_store(store: RecordingStore) -> Self {
        let dir = tempdir().unwrap();
        let db = InnerDatabase::new(dir.path().join("test_db")).unwrap();
        let store = Arc::new(store);
        let state = AppState::new(db, store.clone(), JwtVerifier::new(TEST_SECRET));
        state.users.create(&UserProfile::new("ada@example.com", "Ada")).unwrap();

        Self { state, store, _dir: dir }
    }

    pub fn router(&self) -> Router {
        self.router_with_origins(&["*"])
    }

    pub fn router_with_origins(&self, origins: &[&str]) -> Router {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_path: String::new(),
            jwt_secret: TEST_SECRET.to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origins: origins.iter().map(|origin| origin.to_string()).collect(),
        };
        build_app(self.state.clone(), &config)
    }
}
