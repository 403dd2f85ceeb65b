//! Disk storage for evidence files.
//!
//! Files live under `{root}/{organization}/{project}/{interview}/{uuid}.{ext}`
//! so deleting a parent record can drop its whole directory. Stored paths are
//! relative to the root and never contain `..` or absolute components.

use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::errors::AppError;

/// Longest file name kept when sanitizing user-supplied names.
const MAX_FILENAME_LEN: usize = 200;

/// Longest extension preserved when a name has to be truncated.
const MAX_EXTENSION_LEN: usize = 16;

/// Result of persisting a file to disk.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub relative_path: String,
    pub size_bytes: i64,
    pub sha256: String,
}

/// Directory chain that owns a stored file.
#[derive(Debug, Clone, Copy)]
pub struct StorageScope {
    pub organization_id: Uuid,
    pub project_id: Uuid,
    pub interview_id: Uuid,
}

impl StorageScope {
    fn relative_dir(&self) -> PathBuf {
        PathBuf::from(self.organization_id.to_string())
            .join(self.project_id.to_string())
            .join(self.interview_id.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    allowed_extensions: Vec<String>,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>, allowed_extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            allowed_extensions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage root if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Whether the storage root exists and is a writable directory.
    pub async fn is_ready(&self) -> bool {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(_) => false,
        }
    }

    /// Lower-case extension of `filename` if it is on the allow-list.
    pub fn check_extension(&self, filename: &str) -> Result<String, AppError> {
        let ext = extension_of(filename).ok_or_else(|| {
            AppError::Validation(format!("File '{filename}' has no extension"))
        })?;
        if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
            return Err(AppError::Validation(format!(
                "File type '.{ext}' is not allowed"
            )));
        }
        Ok(ext)
    }

    /// Write `bytes` under the scope directory and return its relative path and digest.
    pub async fn store(
        &self,
        scope: StorageScope,
        filename: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        let ext = self.check_extension(filename)?;

        let relative = scope
            .relative_dir()
            .join(format!("{}.{ext}", Uuid::new_v4()));
        let absolute = self.root.join(&relative);
        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&absolute)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        let relative_path = relative.to_string_lossy().replace('\\', "/");
        tracing::debug!(path = %relative_path, size = bytes.len(), "Stored file");

        Ok(StoredFile {
            relative_path,
            size_bytes: bytes.len() as i64,
            sha256: sha256_hex(bytes),
        })
    }

    /// Read a stored file.
    pub async fn read(&self, relative_path: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(relative_path)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("Stored file is missing".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative_path: &str) -> Result<(), AppError> {
        let path = self.resolve(relative_path)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %relative_path, "Stored file already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored file, logging instead of failing.
    pub async fn remove_quietly(&self, relative_path: &str) {
        if let Err(e) = self.remove(relative_path).await {
            tracing::warn!(path = %relative_path, error = %e, "Failed to remove stored file");
        }
    }

    /// Remove every file under a chain of parent ids, e.g. `[org]` or `[org, project]`.
    pub async fn remove_tree(&self, ids: &[Uuid]) {
        if ids.is_empty() {
            return;
        }
        let dir = ids
            .iter()
            .fold(self.root.clone(), |acc, id| acc.join(id.to_string()));
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => tracing::info!(dir = %dir.display(), "Removed stored files"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Failed to remove stored files")
            }
        }
    }

    /// Join a relative path onto the root, refusing anything that could escape it.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, AppError> {
        let rel = Path::new(relative_path);
        let safe = !relative_path.is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::Internal(format!(
                "Refusing unsafe storage path '{relative_path}'"
            )));
        }
        Ok(self.root.join(rel))
    }
}

/// Lower-case extension without the dot.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty())
}

/// Reduce a client-supplied file name to a safe display name.
///
/// Directory parts are dropped, control and reserved characters become `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let mut cleaned: String = base
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    cleaned = cleaned.trim().trim_start_matches('.').to_string();
    if cleaned.chars().count() > MAX_FILENAME_LEN {
        let ext = extension_of(&cleaned).filter(|e| e.chars().count() <= MAX_EXTENSION_LEN);
        let ext_len = ext.as_ref().map_or(0, |e| e.chars().count() + 1);
        let keep = MAX_FILENAME_LEN.saturating_sub(ext_len);
        let stem: String = cleaned.chars().take(keep).collect();
        cleaned = match ext {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        };
    }
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Hex-encoded SHA-256 of the content.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(root: &Path) -> FileStorage {
        FileStorage::new(root, vec!["pdf".to_string(), "txt".to_string()])
    }

    fn scope() -> StorageScope {
        StorageScope {
            organization_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            interview_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn sanitize_strips_directories_and_reserved_chars() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\notes.txt"), "notes.txt");
        assert_eq!(sanitize_filename("what?.pdf"), "what_.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("   "), "upload");
    }

    #[test]
    fn sanitize_truncates_but_keeps_extension() {
        let long = format!("{}.pdf", "a".repeat(500));
        let cleaned = sanitize_filename(&long);
        assert_eq!(cleaned.chars().count(), MAX_FILENAME_LEN);
        assert!(cleaned.ends_with(".pdf"));
    }

    #[test]
    fn sanitize_truncates_names_with_oversized_extension() {
        let long = format!("a.{}", "x".repeat(250));
        let cleaned = sanitize_filename(&long);
        assert_eq!(cleaned.chars().count(), MAX_FILENAME_LEN);
        assert!(cleaned.starts_with("a.xxx"));

        let long = format!("{}.{}", "b".repeat(300), "y".repeat(199));
        assert_eq!(sanitize_filename(&long).chars().count(), MAX_FILENAME_LEN);
    }

    #[test]
    fn extension_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(dir.path());
        assert_eq!(store.check_extension("Report.PDF").unwrap(), "pdf");
        assert!(store.check_extension("tool.exe").is_err());
        assert!(store.check_extension("README").is_err());
    }

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn store_read_remove_round() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(dir.path());
        let scope = scope();

        let stored = store.store(scope, "notes.txt", b"interview notes").await.unwrap();
        assert!(stored
            .relative_path
            .starts_with(&scope.organization_id.to_string()));
        assert!(stored.relative_path.ends_with(".txt"));
        assert_eq!(stored.size_bytes, 15);

        let bytes = store.read(&stored.relative_path).await.unwrap();
        assert_eq!(bytes, b"interview notes");

        tokio_test::assert_ok!(store.remove(&stored.relative_path).await);
        assert!(store.read(&stored.relative_path).await.unwrap_err().is_not_found());
        // Second removal is a no-op.
        tokio_test::assert_ok!(store.remove(&stored.relative_path).await);
    }

    #[tokio::test]
    async fn store_rejects_empty_and_disallowed() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(dir.path());
        assert!(matches!(
            store.store(scope(), "empty.txt", b"").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            store.store(scope(), "run.sh", b"#!/bin/sh").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn remove_tree_drops_whole_interview_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(dir.path());
        let scope = scope();
        let a = store.store(scope, "a.txt", b"a").await.unwrap();
        let b = store.store(scope, "b.pdf", b"b").await.unwrap();

        store
            .remove_tree(&[scope.organization_id, scope.project_id])
            .await;

        assert!(store.read(&a.relative_path).await.is_err());
        assert!(store.read(&b.relative_path).await.is_err());
        assert!(dir.path().join(scope.organization_id.to_string()).exists());
    }

    #[tokio::test]
    async fn traversal_paths_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(dir.path());
        assert!(matches!(
            store.read("../outside.txt").await,
            Err(AppError::Internal(_))
        ));
        assert!(matches!(
            store.read("/etc/passwd").await,
            Err(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn readiness_reflects_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(&dir.path().join("nested/uploads"));
        assert!(!store.is_ready().await);
        store.ensure_root().await.unwrap();
        assert!(store.is_ready().await);
    }
}
