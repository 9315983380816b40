use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::multipart::{Form, Part};

use super::{AiProviderOverrides, AnalysisBackend, BackendResponse, UploadFile};

/// `reqwest`-backed client for the analysis service.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, request_timeout: Duration) -> Self {
        Self::with_client(base_url, reqwest::Client::new(), request_timeout)
    }

    pub fn with_client(base_url: &str, client: reqwest::Client, request_timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client,
            request_timeout,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl AnalysisBackend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.endpoint("/health");
            tracing::debug!(%url, "probing backend");
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| e.to_string())?;

            let status = resp.status();
            if !status.is_success() {
                return Err(format!("HTTP {}", status));
            }
            Ok(())
        })
    }

    fn analyze<'a>(
        &'a self,
        file: &'a UploadFile,
        ai: &'a AiProviderOverrides,
    ) -> Pin<Box<dyn Future<Output = Result<BackendResponse, String>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.endpoint("/api/analyze");
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(file.mime_type())
                .map_err(|e| e.to_string())?;

            let mut form = Form::new().part("file", part);
            for (name, value) in ai.form_fields() {
                form = form.text(name, value);
            }

            tracing::debug!(%url, file = %file.file_name, bytes = file.bytes.len(), ?ai, "uploading paper");
            let resp = self
                .client
                .post(&url)
                .multipart(form)
                .timeout(self.request_timeout)
                .send()
                .await
                .map_err(|e| e.to_string())?;

            let status = resp.status().as_u16();
            let body = resp.bytes().await.map_err(|e| e.to_string())?.to_vec();
            Ok(BackendResponse { status, body })
        })
    }
}
