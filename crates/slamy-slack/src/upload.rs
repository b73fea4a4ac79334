//! File upload sources.

use std::path::PathBuf;

use slamy_types::{Result, SlackError};

/// Filename used when neither the source nor the caller supplies one.
pub const DEFAULT_FILENAME: &str = "file";

/// Where the bytes of an upload come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Read from disk at upload time.
    Path(PathBuf),
    /// In-memory contents.
    Bytes(Vec<u8>),
}

/// Optional metadata for an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Post the file as a reply in this thread.
    pub thread_ts: Option<String>,
    /// Display title; defaults to the filename.
    pub title: Option<String>,
    /// Overrides the filename derived from the source.
    pub filename: Option<String>,
}

/// Contents and names of an upload, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedUpload {
    pub filename: String,
    pub title: String,
    pub content: Vec<u8>,
}

impl UploadSource {
    /// The filename implied by the source, if any.
    fn implied_filename(&self) -> Option<String> {
        match self {
            UploadSource::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            UploadSource::Bytes(_) => None,
        }
    }

    /// Read the contents and settle filename and title.
    pub(crate) async fn resolve(self, options: &UploadOptions) -> Result<ResolvedUpload> {
        let filename = options
            .filename
            .clone()
            .filter(|f| !f.is_empty())
            .or_else(|| self.implied_filename())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_owned());
        let title = options
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| filename.clone());

        let content = match self {
            UploadSource::Path(path) => tokio::fs::read(&path)
                .await
                .map_err(|source| SlackError::Upload { path, source })?,
            UploadSource::Bytes(bytes) => bytes,
        };

        Ok(ResolvedUpload {
            filename,
            title,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn path_source_uses_basename() {
        let mut file = tempfile::Builder::new()
            .prefix("report")
            .suffix(".csv")
            .tempfile()
            .unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();

        let resolved = UploadSource::Path(file.path().to_path_buf())
            .resolve(&UploadOptions::default())
            .await
            .unwrap();

        let expected = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(resolved.filename, expected);
        assert_eq!(resolved.title, expected);
        assert_eq!(resolved.content, b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn bytes_source_uses_placeholder() {
        let resolved = UploadSource::Bytes(b"xyz".to_vec())
            .resolve(&UploadOptions::default())
            .await
            .unwrap();
        assert_eq!(resolved.filename, "file");
        assert_eq!(resolved.title, "file");
    }

    #[tokio::test]
    async fn explicit_names_win() {
        let options = UploadOptions {
            thread_ts: None,
            title: Some("Q3 numbers".into()),
            filename: Some("q3.csv".into()),
        };
        let resolved = UploadSource::Bytes(Vec::new())
            .resolve(&options)
            .await
            .unwrap();
        assert_eq!(resolved.filename, "q3.csv");
        assert_eq!(resolved.title, "Q3 numbers");
    }

    #[tokio::test]
    async fn missing_path_is_upload_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.bin");
        let err = UploadSource::Path(path.clone())
            .resolve(&UploadOptions::default())
            .await
            .unwrap_err();
        match err {
            SlackError::Upload { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
