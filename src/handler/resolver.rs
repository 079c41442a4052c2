//! Directory-backed asset resolver
//!
//! Resolves logical paths below a static base directory. Text assets are
//! returned as UTF-8 strings, everything else base64 encoded.

use crate::handler::static_files::{AssetResolver, ResolveError, StaticFileMetadata};
use crate::http::mime;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    /// Canonical base directory
    basedir: PathBuf,
}

impl DirectoryResolver {
    /// Create a resolver for `basedir`, which must exist
    pub fn new(basedir: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let basedir = basedir.as_ref();
        let canonical = basedir.canonicalize().map_err(|source| ResolveError::BaseDir {
            path: basedir.display().to_string(),
            source,
        })?;

        if !canonical.is_dir() {
            return Err(ResolveError::BaseDir {
                path: basedir.display().to_string(),
                source: std::io::Error::new(ErrorKind::NotADirectory, "not a directory"),
            });
        }

        Ok(Self { basedir: canonical })
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ResolveError {
    ResolveError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn encode(content: Vec<u8>, content_type: &str) -> StaticFileMetadata {
    if !mime::is_text(content_type) {
        return StaticFileMetadata::found(STANDARD.encode(content), content_type, true);
    }
    match String::from_utf8(content) {
        Ok(text) => StaticFileMetadata::found(text, content_type, false),
        // mislabelled binary content
        Err(e) => StaticFileMetadata::found(STANDARD.encode(e.into_bytes()), content_type, true),
    }
}

#[async_trait]
impl AssetResolver for DirectoryResolver {
    async fn resolve(&self, logical_path: &str) -> Result<StaticFileMetadata, ResolveError> {
        let relative = logical_path.trim_start_matches('/');
        if relative.is_empty() {
            return Ok(StaticFileMetadata::not_found());
        }

        let file_path = self.basedir.join(relative);

        // File not found is common (404), no need to log at warning level
        let canonical = match fs::canonicalize(&file_path).await {
            Ok(p) => p,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Ok(StaticFileMetadata::not_found());
            }
            Err(e) => return Err(io_error(&file_path, e)),
        };

        if !canonical.starts_with(&self.basedir) {
            tracing::warn!(
                logical_path,
                resolved = %canonical.display(),
                "Path traversal attempt blocked"
            );
            return Ok(StaticFileMetadata::not_found());
        }

        let metadata = fs::metadata(&canonical)
            .await
            .map_err(|e| io_error(&canonical, e))?;
        if !metadata.is_file() {
            return Ok(StaticFileMetadata::not_found());
        }

        let content = fs::read(&canonical)
            .await
            .map_err(|e| io_error(&canonical, e))?;
        let content_type = mime::content_type_for_path(&canonical);

        Ok(encode(content, content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::CONTENT_TYPE;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hello world").unwrap();
        std::fs::write(dir.path().join("image.jpg"), [0xff_u8, 0xd8, 0xff, 0xe0]).unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/site.css"), "body{}").unwrap();
        std::fs::write(dir.path().join("data.json"), r#"{"a":1}"#).unwrap();
        std::fs::write(dir.path().join("data.xml"), "<a/>").unwrap();
        std::fs::write(dir.path().join("spreadsheet.xls"), [0xd0_u8, 0xcf, 0x11, 0xe0]).unwrap();
        dir
    }

    #[test]
    fn test_missing_basedir() {
        let err = DirectoryResolver::new("/definitely/not/here").unwrap_err();
        assert!(matches!(err, ResolveError::BaseDir { .. }));
    }

    #[test]
    fn test_basedir_must_be_directory() {
        let dir = fixture();
        let err = DirectoryResolver::new(dir.path().join("hello.txt")).unwrap_err();
        assert!(matches!(err, ResolveError::BaseDir { .. }));
    }

    #[tokio::test]
    async fn test_text_file() {
        let dir = fixture();
        let resolver = DirectoryResolver::new(dir.path()).unwrap();
        let file = resolver.resolve("/hello.txt").await.unwrap();
        assert_eq!(file.status_code, 200);
        assert_eq!(file.body, "hello world");
        assert!(!file.is_base64_encoded);
        assert_eq!(file.headers[CONTENT_TYPE], "text/plain");
    }

    #[tokio::test]
    async fn test_nested_file() {
        let dir = fixture();
        let resolver = DirectoryResolver::new(dir.path()).unwrap();
        let file = resolver.resolve("css/site.css").await.unwrap();
        assert_eq!(file.body, "body{}");
        assert_eq!(file.content_type(), Some("text/css"));
    }

    #[tokio::test]
    async fn test_binary_file_is_base64() {
        let dir = fixture();
        let resolver = DirectoryResolver::new(dir.path()).unwrap();
        let file = resolver.resolve("image.jpg").await.unwrap();
        assert!(file.is_base64_encoded);
        assert_eq!(file.body, "/9j/4A==");
        assert_eq!(file.content_type(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_json_file_is_text() {
        let dir = fixture();
        let resolver = DirectoryResolver::new(dir.path()).unwrap();
        let file = resolver.resolve("data.json").await.unwrap();
        assert!(!file.is_base64_encoded);
        assert_eq!(file.body, r#"{"a":1}"#);
        assert_eq!(file.content_type(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_xml_file_is_base64() {
        let dir = fixture();
        let resolver = DirectoryResolver::new(dir.path()).unwrap();
        let file = resolver.resolve("data.xml").await.unwrap();
        assert!(file.is_base64_encoded);
        assert_eq!(file.body, STANDARD.encode("<a/>"));
        assert_eq!(file.content_type(), Some("application/xml"));
    }

    #[tokio::test]
    async fn test_spreadsheet_is_base64() {
        let dir = fixture();
        let resolver = DirectoryResolver::new(dir.path()).unwrap();
        let file = resolver.resolve("spreadsheet.xls").await.unwrap();
        assert!(file.is_base64_encoded);
        assert_eq!(file.body, "0M8R4A==");
        assert_eq!(file.content_type(), Some("application/vnd.ms-excel"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let dir = fixture();
        let resolver = DirectoryResolver::new(dir.path()).unwrap();
        assert!(resolver.resolve("nope.txt").await.unwrap().is_not_found());
        assert!(resolver.resolve("hello.txt/child").await.unwrap().is_not_found());
        assert!(resolver.resolve("/").await.unwrap().is_not_found());
        assert!(resolver.resolve("css").await.unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_traversal_blocked() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let public = outer.path().join("public");
        std::fs::create_dir(&public).unwrap();

        let resolver = DirectoryResolver::new(&public).unwrap();
        let file = resolver.resolve("../secret.txt").await.unwrap();
        assert!(file.is_not_found());
    }
}
