//! Attachment relay: fetch a source-hosted image and re-upload it to the
//! GroupMe image service.

use tracing::info;

use crate::config::GroupMeConfig;
use crate::{AppError, Result};

/// Re-uploads source-platform attachments to the destination image service.
///
/// One GET, one multipart POST, no retry. The caller decides fallback
/// behavior on failure (typically an annotation on the relayed text).
#[derive(Debug, Clone)]
pub struct ImageRelay {
    http: reqwest::Client,
    image_base: String,
    access_token: String,
}

impl ImageRelay {
    /// Create a relay for the configured image service.
    #[must_use]
    pub fn new(config: &GroupMeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            image_base: config.image_base.clone(),
            access_token: config.access_token.clone(),
        }
    }

    /// Fetch `source_url` and upload the bytes, returning the
    /// destination-hosted URL.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigurationMissing` when no upload credential
    /// is configured (expected and recoverable), `AppError::FetchFailed`
    /// for a non-success source status (the upload endpoint is not
    /// called), `AppError::UploadFailed` for a non-success upload status,
    /// `AppError::ParseFailed` for a malformed upload response, and
    /// `AppError::TransportFailed` for network-level faults.
    pub async fn relay(&self, source_url: &str) -> Result<String> {
        if self.access_token.is_empty() {
            return Err(AppError::ConfigurationMissing(
                "GROUPME_ACCESS_TOKEN required for image relay".into(),
            ));
        }

        let response = self.http.get(source_url).send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(AppError::FetchFailed(status));
        }
        let bytes = response.bytes().await?;
        let byte_count = bytes.len();

        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")
            .map_err(|err| AppError::ParseFailed(format!("invalid mime: {err}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let upload = self
            .http
            .post(format!("{}/pictures", self.image_base))
            .header("X-Access-Token", &self.access_token)
            .multipart(form)
            .send()
            .await?;

        let upload_status = upload.status().as_u16();
        if !upload.status().is_success() {
            return Err(AppError::UploadFailed(upload_status));
        }

        let body: serde_json::Value = upload
            .json()
            .await
            .map_err(|err| AppError::ParseFailed(format!("invalid upload response: {err}")))?;
        let url = body
            .pointer("/payload/url")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| AppError::ParseFailed("missing payload.url".into()))?
            .to_owned();

        info!(bytes = byte_count, url = %url, "image relayed");
        Ok(url)
    }
}
