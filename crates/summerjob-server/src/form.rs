//! Multipart form decoding.
//!
//! Submissions carry their scalar fields as one JSON document in the
//! `jsonData` part and images in a named file part. Images are written to a
//! fresh staging directory; the caller decides where they end up.

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::BytesMut;
use serde_json::{Map, Value};
use summerjob_core::messages;
use summerjob_service::{StagedFile, Staging};
use summerjob_store::{generate_file_name, staging_key, FileStore, StoreError};
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the part holding the embedded JSON document.
pub const JSON_FIELD: &str = "jsonData";

/// Per-file upload limit.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

const STAGING_ID_LEN: usize = 16;

/// Attachment constraints of one endpoint.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    /// Form field carrying the images.
    pub field: &'static str,
    /// Stem of the staged file names.
    pub base_name: String,
    pub max_files: usize,
    pub max_file_size: usize,
}

impl UploadLimits {
    pub fn new(field: &'static str, base_name: impl Into<String>, max_files: usize) -> Self {
        Self {
            field,
            base_name: base_name.into(),
            max_files,
            max_file_size: MAX_FILE_SIZE,
        }
    }

    pub fn max_total_size(&self) -> usize {
        self.max_file_size.saturating_mul(self.max_files)
    }

    /// `<base>-<index>.<ext>` when several files are allowed, else `<base>.<ext>`.
    fn file_name(&self, index: usize, extension: &str) -> String {
        if self.max_files > 1 {
            format!("{}-{index}.{extension}", self.base_name)
        } else {
            format!("{}.{extension}", self.base_name)
        }
    }
}

#[derive(Debug)]
pub struct DecodedForm {
    /// Parsed `jsonData`, an empty object when the part is absent.
    pub json: Value,
    pub staging: Staging,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{} {max}", messages::MAX_COUNT_IMAGE)]
    TooManyFiles { field: String, max: usize },

    #[error("{}", messages::MAX_CAPACITY_IMAGE)]
    FileTooLarge { field: String },

    #[error("{}", messages::UNSUPPORTED_TYPE_IMAGE)]
    UnsupportedType { field: String },

    #[error("invalid jsonData: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("malformed multipart body: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error("failed to stage upload: {0}")]
    Store(#[from] StoreError),
}

impl FormError {
    fn multipart(e: MultipartError) -> Self {
        FormError::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FormError::Multipart { status, .. } => *status,
            FormError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Form field the error belongs to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            FormError::TooManyFiles { field, .. }
            | FormError::FileTooLarge { field }
            | FormError::UnsupportedType { field } => Some(field),
            FormError::InvalidJson(_) => Some(JSON_FIELD),
            _ => None,
        }
    }
}

/// File extension for a declared media type, `unknown` when unrecognised.
pub fn extension_for_mime(content_type: &str) -> String {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let preferred = match essence.as_str() {
        "image/jpeg" => Some("jpeg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    };
    preferred
        .or_else(|| {
            mime_guess::get_mime_extensions_str(&essence).and_then(|exts| exts.first().copied())
        })
        .unwrap_or("unknown")
        .to_string()
}

fn is_image(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Decode a multipart submission, staging its images.
///
/// On any failure the staging directory is removed before returning.
pub async fn decode_form(
    mut multipart: Multipart,
    store: &dyn FileStore,
    limits: &UploadLimits,
) -> Result<DecodedForm, FormError> {
    let dir = staging_key(&generate_file_name(STAGING_ID_LEN));
    let mut files = Vec::new();
    match read_parts(&mut multipart, store, limits, &dir, &mut files).await {
        Ok(json) => Ok(DecodedForm {
            json,
            staging: Staging {
                dir: Some(dir),
                files,
            },
        }),
        Err(e) => {
            if let Err(err) = store.delete_dir(&dir).await {
                warn!(dir = %dir, error = %err, "failed to remove staging directory");
            }
            Err(e)
        }
    }
}

async fn read_parts(
    multipart: &mut Multipart,
    store: &dyn FileStore,
    limits: &UploadLimits,
    dir: &str,
    files: &mut Vec<StagedFile>,
) -> Result<Value, FormError> {
    let mut json = None;
    let mut total = 0usize;

    while let Some(mut field) = multipart.next_field().await.map_err(FormError::multipart)? {
        let name = field.name().unwrap_or_default().to_string();

        let file_name = field.file_name().map(str::to_owned);
        let Some(file_name) = file_name else {
            if name == JSON_FIELD {
                let text = field.text().await.map_err(FormError::multipart)?;
                let parsed = serde_json::from_str(&text).map_err(|e| {
                    warn!(error = %e, "jsonData is not valid JSON");
                    FormError::InvalidJson(e)
                })?;
                json = Some(parsed);
            } else {
                debug!(field = %name, "ignoring form field");
            }
            continue;
        };
        // Browsers send an empty part for a file input left blank.
        if file_name.is_empty() {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_image(&content_type) {
            return Err(FormError::UnsupportedType { field: name });
        }
        if name != limits.field {
            debug!(field = %name, "ignoring file outside the upload field");
            continue;
        }
        if files.len() >= limits.max_files {
            return Err(FormError::TooManyFiles {
                field: name,
                max: limits.max_files,
            });
        }

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(FormError::multipart)? {
            total += chunk.len();
            data.extend_from_slice(&chunk);
            if data.len() > limits.max_file_size || total > limits.max_total_size() {
                return Err(FormError::FileTooLarge { field: name });
            }
        }

        let extension = extension_for_mime(&content_type);
        let key = format!("{dir}/{}", limits.file_name(files.len(), &extension));
        store.put(&key, data.freeze()).await?;
        files.push(StagedFile { key, extension });
    }

    Ok(json.unwrap_or_else(|| Value::Object(Map::new())))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use summerjob_store::{LocalStore, StoreConfig};

    use super::*;

    pub(crate) const BOUNDARY: &str = "summerjob-test-boundary";

    /// One part of a hand-built multipart body.
    pub(crate) enum Part<'a> {
        Text(&'a str, &'a str),
        File {
            field: &'a str,
            file_name: &'a str,
            content_type: &'a str,
            data: &'a [u8],
        },
    }

    pub(crate) fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File {
                    field,
                    file_name,
                    content_type,
                    data,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    pub(crate) fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    async fn multipart(parts: &[Part<'_>]) -> Multipart {
        let request = Request::builder()
            .method("POST")
            .header("Content-Type", content_type())
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn store() -> (tempfile::TempDir, Arc<LocalStore>) {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(&StoreConfig {
            upload_dir: None,
            root: Some(tmp.path().to_path_buf()),
        });
        (tmp, Arc::new(store))
    }

    fn png<'a>(file_name: &'a str, data: &'a [u8]) -> Part<'a> {
        Part::File {
            field: "photoFiles",
            file_name,
            content_type: "image/png",
            data,
        }
    }

    fn staging_entries(root: &std::path::Path) -> usize {
        std::fs::read_dir(root.join(".staging"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[test]
    fn extension_from_media_type() {
        assert_eq!(extension_for_mime("image/jpeg"), "jpeg");
        assert_eq!(extension_for_mime("image/png; charset=binary"), "png");
        assert_eq!(extension_for_mime("image/svg+xml"), "svg");
        assert_eq!(extension_for_mime("image/x-made-up"), "unknown");
    }

    #[test]
    fn file_names_depend_on_max_files() {
        let many = UploadLimits::new("photoFiles", "job1", 10);
        assert_eq!(many.file_name(0, "png"), "job1-0.png");
        assert_eq!(many.file_name(3, "jpeg"), "job1-3.jpeg");
        let one = UploadLimits::new("photoFile", "abc", 1);
        assert_eq!(one.file_name(0, "png"), "abc.png");
    }

    #[tokio::test]
    async fn decodes_json_and_stages_files() {
        let (tmp, store) = store();
        let form = multipart(&[
            Part::Text("jsonData", r#"{"name":"New"}"#),
            png("a.png", b"one"),
            png("b.png", b"two"),
        ])
        .await;

        let limits = UploadLimits::new("photoFiles", "job1", 10);
        let decoded = decode_form(form, store.as_ref(), &limits).await.unwrap();
        assert_eq!(decoded.json["name"], "New");
        assert_eq!(decoded.staging.files.len(), 2);
        assert_eq!(decoded.staging.files[1].file_name(), "job1-1.png");
        assert_eq!(decoded.staging.files[1].extension, "png");
        let staged = tmp.path().join(&decoded.staging.files[0].key);
        assert_eq!(std::fs::read(staged).unwrap(), b"one");
    }

    #[tokio::test]
    async fn missing_json_is_empty_object() {
        let (_tmp, store) = store();
        let form = multipart(&[]).await;
        let limits = UploadLimits::new("photoFiles", "job1", 10);
        let decoded = decode_form(form, store.as_ref(), &limits).await.unwrap();
        assert_eq!(decoded.json, Value::Object(Map::new()));
        assert!(decoded.staging.files.is_empty());
    }

    #[tokio::test]
    async fn blank_file_input_is_skipped() {
        let (_tmp, store) = store();
        let form = multipart(&[Part::File {
            field: "photoFiles",
            file_name: "",
            content_type: "application/octet-stream",
            data: b"",
        }])
        .await;
        let limits = UploadLimits::new("photoFiles", "job1", 10);
        let decoded = decode_form(form, store.as_ref(), &limits).await.unwrap();
        assert!(decoded.staging.files.is_empty());
    }

    #[tokio::test]
    async fn invalid_json_is_rejected() {
        let (tmp, store) = store();
        let form = multipart(&[png("a.png", b"one"), Part::Text("jsonData", "{not json")]).await;
        let limits = UploadLimits::new("photoFiles", "job1", 10);
        let err = decode_form(form, store.as_ref(), &limits).await.unwrap_err();
        assert!(matches!(err, FormError::InvalidJson(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(staging_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn non_image_fails_whole_form() {
        let (tmp, store) = store();
        let form = multipart(&[
            png("a.png", b"one"),
            Part::File {
                field: "photoFiles",
                file_name: "notes.txt",
                content_type: "text/plain",
                data: b"hello",
            },
        ])
        .await;
        let limits = UploadLimits::new("photoFiles", "job1", 10);
        let err = decode_form(form, store.as_ref(), &limits).await.unwrap_err();
        assert!(matches!(err, FormError::UnsupportedType { .. }));
        assert_eq!(err.field(), Some("photoFiles"));
        assert_eq!(staging_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn too_many_files_fails() {
        let (tmp, store) = store();
        let form = multipart(&[png("a.png", b"1"), png("b.png", b"2"), png("c.png", b"3")]).await;
        let limits = UploadLimits::new("photoFiles", "job1", 2);
        let err = decode_form(form, store.as_ref(), &limits).await.unwrap_err();
        match err {
            FormError::TooManyFiles { max, .. } => assert_eq!(max, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(staging_entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn no_room_left_rejects_any_file() {
        let (_tmp, store) = store();
        let form = multipart(&[png("a.png", b"1")]).await;
        let limits = UploadLimits::new("photoFiles", "job1", 0);
        let err = decode_form(form, store.as_ref(), &limits).await.unwrap_err();
        assert!(matches!(err, FormError::TooManyFiles { max: 0, .. }));
    }

    #[tokio::test]
    async fn oversized_file_fails() {
        let (tmp, store) = store();
        let form = multipart(&[png("a.png", &[0u8; 64])]).await;
        let mut limits = UploadLimits::new("photoFiles", "job1", 10);
        limits.max_file_size = 16;
        let err = decode_form(form, store.as_ref(), &limits).await.unwrap_err();
        assert!(matches!(err, FormError::FileTooLarge { .. }));
        assert_eq!(staging_entries(tmp.path()), 0);
    }
}
