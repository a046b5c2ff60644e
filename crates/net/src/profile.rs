use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;
use profile_database::SafeDatabase;
use profile_service::parser::profile::{UpdateNameDto, UserProfile};
use profile_service::{AvatarError, ImageError, InboundFile, RepositoryError};
use validator::ValidationErrors;

use crate::auth::AuthUser;
use crate::server::AppState;

const FILE_FIELD: &str = "file";

// `{ "message": "success", "data": ... }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: &'static str,
    pub data: T,
}

fn success<T>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { message: "success", data })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedData {
    pub updated_data: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_data: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct AvatarData {
    pub avatar: String,
}


#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("Multipart error: {0}")]
    MultipartError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProfileError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProfileError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ProfileError::MultipartError(_)
            | ProfileError::ValidationError(_)
            | ProfileError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ProfileError::NotFound(_) => StatusCode::NOT_FOUND,
            ProfileError::Conflict(_) => StatusCode::CONFLICT,
            ProfileError::StorageError(_) => StatusCode::BAD_GATEWAY,
            ProfileError::DatabaseError(_) | ProfileError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = json!({
            "message": self.to_string(),
            "statusCode": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ProfileError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => ProfileError::NotFound(what),
            RepositoryError::Conflict(what) => ProfileError::Conflict(what),
            other => ProfileError::DatabaseError(other.to_string()),
        }
    }
}

impl From<AvatarError> for ProfileError {
    fn from(err: AvatarError) -> Self {
        match err {
            AvatarError::Image(ImageError::Decode(e)) => ProfileError::InvalidImage(e.to_string()),
            AvatarError::Image(other) => ProfileError::Internal(other.to_string()),
            AvatarError::Storage(e) => ProfileError::StorageError(e.to_string()),
            AvatarError::Repository(e) => e.into(),
        }
    }
}

impl From<ValidationErrors> for ProfileError {
    fn from(err: ValidationErrors) -> Self {
        ProfileError::ValidationError(err.to_string())
    }
}


pub async fn update_name<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    user: AuthUser,
    payload: Result<Json<UpdateNameDto>, JsonRejection>,
) -> Result<Json<Envelope<UpdatedData>>, ProfileError> {
    let Json(dto) = payload.map_err(|e| ProfileError::ValidationError(e.body_text()))?;
    let name = dto.into_name()?;
    let updated_data = state.users.update_name(&user.email, &name)?;

    Ok(success(UpdatedData { updated_data }))
}


pub async fn me<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    user: AuthUser,
) -> Result<Json<Envelope<UserData>>, ProfileError> {
    let user_data = state.users.find_by_email(&user.email)?;

    Ok(success(UserData { user_data }))
}


pub async fn upload_avatar<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<Envelope<AvatarData>>, ProfileError> {
    let mut upload = None;

    // only the first `file` part counts; anything else in the form is ignored
    while let Some(field) = multipart.next_field().await.map_err(|e| ProfileError::MultipartError(e.to_string()))? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(|ct| ct.to_string());
        let file_name = field.file_name().map(|name| name.to_string());
        let data = field.bytes().await.map_err(|e| ProfileError::MultipartError(e.to_string()))?;

        upload = Some(InboundFile {
            bytes: data.to_vec(),
            content_type,
            file_name,
        });
        break;
    }

    let file = upload.ok_or_else(|| ProfileError::MultipartError("file field is required".to_string()))?;
    let result = state.avatars.run(&user.email, file).await?;

    Ok(success(AvatarData { avatar: result.url }))
}

pub async fn health() -> &'static str {
    "ok"
}
