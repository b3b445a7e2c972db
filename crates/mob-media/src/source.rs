//! Where image bytes come from.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// An image the user picked for upload.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Display name, used in logs and errors.
    fn name(&self) -> &str;

    /// MIME type declared by the uploader, if any.
    fn content_type(&self) -> Option<&str> {
        None
    }

    /// Read the full contents.
    async fn read(&self) -> io::Result<Vec<u8>>;
}

/// An upload already held in memory, as delivered by a form or picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[async_trait]
impl ImageSource for UploadedFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    async fn read(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// An image on the local filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ImageSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uploaded_file_reads_its_bytes() {
        let upload = UploadedFile::new("photo.png", vec![1, 2, 3]).with_content_type("image/png");
        assert_eq!(upload.name(), "photo.png");
        assert_eq!(upload.content_type(), Some("image/png"));
        assert_eq!(upload.read().await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn file_source_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.bin");
        std::fs::write(&path, b"bytes").unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.path(), path);
        assert_eq!(source.read().await.unwrap(), b"bytes");
        assert!(source.content_type().is_none());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("nope.jpg"));
        let err = source.read().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
