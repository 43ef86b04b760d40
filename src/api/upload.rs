use axum::extract::{Multipart, Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::auth::models::Role;
use crate::error::AppError;
use crate::state::AppState;
use crate::storage::client::StorageClient;

/// Largest multipart body accepted by `POST /uploads`.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Object key prefix for uploaded files.
const KEY_PREFIX: &str = "uploads/";

/// Multipart fields that may carry files.
pub const UPLOAD_FIELDS: &[&str] = &[
    "images",
    "videos",
    "audios",
    "documents",
    "featuredImage",
    "logoImg",
];

/// Accepted extensions and the MIME types each may arrive with.
const ALLOWED_TYPES: &[(&str, &[&str])] = &[
    ("jpeg", &["image/jpeg"]),
    ("jpg", &["image/jpeg"]),
    ("png", &["image/png"]),
    ("gif", &["image/gif"]),
    ("mp4", &["video/mp4"]),
    ("avi", &["video/x-msvideo", "video/avi"]),
    ("mpeg", &["video/mpeg", "audio/mpeg"]),
    ("mp3", &["audio/mpeg", "audio/mp3"]),
    ("wav", &["audio/wav", "audio/x-wav", "audio/wave"]),
    ("pdf", &["application/pdf"]),
    ("doc", &["application/msword"]),
    (
        "docx",
        &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"],
    ),
];

/// A file read from the multipart body.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// One stored file in the upload response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub field: String,
    pub url: String,
    pub name: String,
    pub file_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub files: Vec<UploadedFile>,
}

/// Lowercased extension of `file_name`, if any.
fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Check that the field is known and the file's extension and MIME type are
/// both allowed and agree with each other. Returns the extension.
pub fn check_file(file: &IncomingFile) -> Result<String, AppError> {
    if !UPLOAD_FIELDS.contains(&file.field.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unexpected upload field '{}'",
            file.field
        )));
    }

    let ext = extension(&file.file_name).ok_or_else(|| {
        AppError::BadRequest(format!("File '{}' has no extension", file.file_name))
    })?;
    let mime = file.content_type.to_ascii_lowercase();

    let allowed = ALLOWED_TYPES
        .iter()
        .find(|(allowed_ext, _)| *allowed_ext == ext)
        .is_some_and(|(_, mimes)| mimes.contains(&mime.as_str()));
    if !allowed {
        return Err(AppError::BadRequest(format!(
            "File type not allowed: '{}' ({})",
            file.file_name, file.content_type
        )));
    }
    Ok(ext)
}

/// Content type served for a stored object, from its extension.
pub fn content_type_for(key: &str) -> &'static str {
    extension(key)
        .and_then(|ext| {
            ALLOWED_TYPES
                .iter()
                .find(|(allowed_ext, _)| *allowed_ext == ext)
                .and_then(|(_, mimes)| mimes.first().copied())
        })
        .unwrap_or("application/octet-stream")
}

/// Validate every file, then store them under unique keys.
///
/// Nothing is written when any file is rejected.
pub async fn process_upload(
    storage: &dyn StorageClient,
    public_base_url: &str,
    files: Vec<IncomingFile>,
) -> Result<UploadResponse, AppError> {
    if files.is_empty() {
        return Err(AppError::BadRequest("No files in request".into()));
    }

    let extensions = files
        .iter()
        .map(check_file)
        .collect::<Result<Vec<_>, _>>()?;

    let base = public_base_url.trim_end_matches('/');
    let mut stored = Vec::with_capacity(files.len());
    for (file, ext) in files.into_iter().zip(extensions) {
        let name = format!(
            "{}-{}-{}.{}",
            file.field,
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4(),
            ext
        );
        let key = format!("{KEY_PREFIX}{name}");

        storage
            .put_object(&key, file.data, &file.content_type)
            .await?;
        tracing::info!(key = %key, field = %file.field, "stored upload");

        stored.push(UploadedFile {
            field: file.field,
            url: format!("{base}/{name}"),
            name: file.file_name,
            file_type: file.content_type,
        });
    }

    Ok(UploadResponse { files: stored })
}

/// Axum handler for `POST /api/v1/uploads`.
pub async fn upload_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    auth.require(Role::Editor)?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let field_name = field.name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;

        files.push(IncomingFile {
            field: field_name,
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    process_upload(
        state.storage.as_ref(),
        &state.config.storage.public_base_url,
        files,
    )
    .await
    .map(Json)
}

/// Whether `name` is a bare object name directly under the upload prefix.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains("..")
}

/// Storage key behind a URL handed out by `process_upload`, or `None` when the
/// URL points somewhere else.
pub fn storage_key_for_url(public_base_url: &str, url: &str) -> Option<String> {
    let base = public_base_url.trim_end_matches('/');
    let name = url.strip_prefix(base)?.strip_prefix('/')?;
    is_plain_name(name).then(|| format!("{KEY_PREFIX}{name}"))
}

/// Axum handler for `GET /api/v1/uploads/{name}`.
pub async fn serve_upload_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    if !is_plain_name(&name) {
        return Err(AppError::NotFound("File not found".into()));
    }

    let data = state
        .storage
        .get_object(&format!("{KEY_PREFIX}{name}"))
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;

    Ok(([(CONTENT_TYPE, content_type_for(&name))], data).into_response())
}
