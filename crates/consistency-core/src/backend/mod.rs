//! Analysis backend trait and implementations.

pub mod http;
pub mod mock;

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::ConsistencyError;

pub use http::HttpBackend;

/// Optional AI-provider parameters forwarded verbatim to the backend.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AiProviderOverrides {
    pub base_url: String,
    pub model: String,
    /// Only sent when non-empty.
    pub api_key: Option<String>,
}

impl AiProviderOverrides {
    /// Build overrides from free-text input. Values are trimmed and a blank
    /// API key is dropped.
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim().to_string(),
            model: model.trim().to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from),
        }
    }

    /// Text fields of the multipart upload, in wire order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("base_url", self.base_url.clone()),
            ("model", self.model.clone()),
        ];
        if let Some(ref key) = self.api_key
            && !key.is_empty()
        {
            fields.push(("api_key", key.clone()));
        }
        fields
    }
}

impl std::fmt::Debug for AiProviderOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiProviderOverrides")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// A paper chosen for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ConsistencyError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file_name, bytes })
    }

    /// MIME type guessed from the file extension.
    pub fn mime_type(&self) -> &'static str {
        let ext = Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => "application/pdf",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "doc" => "application/msword",
            "tex" => "application/x-tex",
            "txt" | "md" => "text/plain",
            _ => "application/octet-stream",
        }
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Raw HTTP outcome of an analyze request. The body is left unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The remote analysis service.
///
/// Errors are transport-level failures rendered as strings; HTTP error
/// statuses from `analyze` come back as a [`BackendResponse`].
pub trait AnalysisBackend: Send + Sync {
    /// Base URL, used in diagnostics.
    fn base_url(&self) -> &str;

    /// Liveness check. Any non-2xx status is an error.
    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

    /// Upload a paper for analysis.
    fn analyze<'a>(
        &'a self,
        file: &'a UploadFile,
        ai: &'a AiProviderOverrides,
    ) -> Pin<Box<dyn Future<Output = Result<BackendResponse, String>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_key_is_omitted() {
        let ai = AiProviderOverrides::new(" https://llm.example/v4 ", "glm-4.6v", Some("   "));
        assert_eq!(ai.api_key, None);
        let names: Vec<&str> = ai.form_fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["base_url", "model"]);
        assert_eq!(ai.base_url, "https://llm.example/v4");
    }

    #[test]
    fn api_key_is_sent_when_present() {
        let ai = AiProviderOverrides::new("", "", Some(" key-123 "));
        let fields = ai.form_fields();
        assert_eq!(fields[0], ("base_url", String::new()));
        assert_eq!(fields[2], ("api_key", "key-123".to_string()));
    }

    #[test]
    fn debug_masks_api_key() {
        let ai = AiProviderOverrides::new("", "", Some("secret"));
        let dbg = format!("{:?}", ai);
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("***"));
    }

    #[test]
    fn mime_type_by_extension() {
        assert_eq!(UploadFile::new("a.PDF", vec![]).mime_type(), "application/pdf");
        assert_eq!(UploadFile::new("paper.tex", vec![]).mime_type(), "application/x-tex");
        assert_eq!(
            UploadFile::new("noext", vec![]).mime_type(),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn from_path_reads_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.txt");
        std::fs::write(&path, b"Some text.").unwrap();
        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.file_name, "paper.txt");
        assert_eq!(file.bytes, b"Some text.");
    }

    #[tokio::test]
    async fn from_path_missing_file_is_io_error() {
        let err = UploadFile::from_path(Path::new("/nonexistent/paper.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsistencyError::Io(_)));
    }
}
