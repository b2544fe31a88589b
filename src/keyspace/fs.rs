//! File access collaborator.
//!
//! Every file system touch of the engine goes through [`FileAccess`], so
//! traversal and lookup can run against the real disk ([`TokioFs`]) or an
//! in-memory tree in tests.

use std::future::Future;
use std::io;
use std::path::Path;

/// Non-blocking file access.
pub trait FileAccess: Send + Sync + 'static {
    /// Whether `path` exists. Errors count as "does not exist".
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;

    /// Read a file as UTF-8 text.
    fn read_text(&self, path: &Path) -> impl Future<Output = io::Result<String>> + Send;

    /// File names (not paths) of the entries in a directory.
    fn list_dir(&self, path: &Path) -> impl Future<Output = io::Result<Vec<String>>> + Send;
}

/// [`FileAccess`] over the real file system via `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl FileAccess for TokioFs {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read_text(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await.is_ok_and(|t| t.is_file()) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }
}
