use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::Multipart;
use thiserror::Error;
use tokio::fs;
use tracing::info;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// User-facing wording for the extension allow-list rejection.
pub const INVALID_TYPE_NOTICE: &str =
    "Invalid file type. Only JPG, JPEG, PNG, and GIF files are allowed.";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file type not allowed: {0}")]
    InvalidExtension(String),
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload missing after write: {0}")]
    Missing(String),
}

/// What the upload is for; becomes part of the stored filename so a user's
/// uploads for different purposes never collide with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPurpose {
    Profile,
    Banner,
    Direct,
    Issue,
    Product,
}

impl UploadPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadPurpose::Profile => "profile",
            UploadPurpose::Banner => "banner",
            UploadPurpose::Direct => "direct",
            UploadPurpose::Issue => "issue",
            UploadPurpose::Product => "product",
        }
    }
}

pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Strip path components and unsafe characters from a client-supplied
/// filename. Spaces become underscores; anything outside ASCII
/// alphanumerics, `.`, `-`, `_` is dropped; leading dots are trimmed so the
/// result can never climb out of the upload directory or hide itself.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                Some(c)
            } else if c == ' ' {
                Some('_')
            } else {
                None
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// On-disk storage for uploaded images.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub async fn new(dir: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Upload directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate, name, and persist one upload. The stored name is
    /// `{username}_{purpose}_{unix_timestamp}_{sanitized original}` — two
    /// same-second uploads of the same file by the same user for the same
    /// purpose can still collide, which is an accepted limitation. The
    /// write is verified before the name is handed back for recording.
    pub async fn store(
        &self,
        username: &str,
        purpose: UploadPurpose,
        client_name: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        if !allowed_file(client_name) {
            return Err(UploadError::InvalidExtension(client_name.to_string()));
        }

        let stored = format!(
            "{}_{}_{}_{}",
            sanitize_filename(username),
            purpose.as_str(),
            chrono::Local::now().timestamp(),
            sanitize_filename(client_name),
        );
        let path = self.dir.join(&stored);

        fs::write(&path, bytes).await?;
        if !fs::try_exists(&path).await? {
            return Err(UploadError::Missing(stored));
        }

        info!("Stored upload {}", stored);
        Ok(stored)
    }
}

pub struct FormFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// A parsed multipart form: text fields plus at most one file per
/// designated field name. A part with an empty filename counts as "no file
/// provided", not an error.
#[derive(Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, FormFile>,
}

impl FormData {
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn file(&self, name: &str) -> Option<&FormFile> {
        self.files.get(name)
    }
}

pub async fn read_form(mut multipart: Multipart) -> anyhow::Result<FormData> {
    let mut form = FormData::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(filename) if !filename.is_empty() => {
                let bytes = field.bytes().await?;
                form.files.entry(name).or_insert(FormFile { filename, bytes });
            }
            Some(_) => {
                // File input submitted empty: no file provided.
            }
            None => {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert!(allowed_file("photo.png"));
        assert!(allowed_file("photo.JPG"));
        assert!(allowed_file("photo.JpEg"));
        assert!(allowed_file("banner.gif"));
        assert!(!allowed_file("report.pdf"));
        assert!(!allowed_file("script.exe"));
        assert!(!allowed_file("noextension"));
    }

    #[test]
    fn sanitize_strips_paths_and_unsafe_characters() {
        assert_eq!(sanitize_filename("photo.png"), "photo.png");
        assert_eq!(sanitize_filename("my photo.png"), "my_photo.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("फोटो.png"), "png");
        assert_eq!(sanitize_filename("///"), "file");
    }

    #[tokio::test]
    async fn store_writes_and_names_uploads() {
        let dir = std::env::temp_dir().join(format!("gramsetu-uploads-{}", std::process::id()));
        let store = UploadStore::new(dir.clone()).await.unwrap();

        let name = store
            .store("asha", UploadPurpose::Profile, "new photo.png", b"pngbytes")
            .await
            .unwrap();
        assert!(name.starts_with("asha_profile_"));
        assert!(name.ends_with("_new_photo.png"));
        assert_eq!(std::fs::read(dir.join(&name)).unwrap(), b"pngbytes");
    }

    #[tokio::test]
    async fn store_rejects_disallowed_extension() {
        let dir = std::env::temp_dir().join(format!("gramsetu-uploads-{}", std::process::id()));
        let store = UploadStore::new(dir).await.unwrap();

        let result = store
            .store("asha", UploadPurpose::Issue, "malware.exe", b"nope")
            .await;
        assert!(matches!(result, Err(UploadError::InvalidExtension(_))));
    }
}
