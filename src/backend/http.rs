use crate::backend::wire::{
    ErrorBody, HealthResponse, HistoryEntryDto, HistoryPageResponse, TranslateResponse,
};
use crate::backend::{HistoryBackend, TranslateBackend};
use crate::history::{EntryId, HistoryEntry, HistoryStats, Page};
use crate::translation::{ImageFile, TranslationResult};
use crate::utils::{Result, ServerConfig, SignboardError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// reqwest-backed client for the translation service.
///
/// The inner client keeps a cookie store, so the backend's session cookie is
/// sent on every request after the first response sets it.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    target_language: String,
}

impl HttpBackend {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SignboardError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            target_language: config.target_language.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/history/{id}` for exactly one entry. The backend only routes
    /// numeric ids there; anything else (`clear` included) is refused before
    /// a request is built.
    fn entry_url(&self, id: &EntryId) -> Result<Url> {
        let raw = id.as_str();
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SignboardError::ValidationError(format!(
                "{:?} is not a translation id",
                raw
            )));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SignboardError::ConfigError(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                SignboardError::ConfigError(format!("{} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "history", raw]);
        Ok(url)
    }

    pub async fn health(&self) -> Result<String> {
        let response = self.client.get(self.url("/api/health")).send().await?;
        let health: HealthResponse = read_json(response, "Health check failed").await?;
        Ok(health.message.unwrap_or(health.status))
    }
}

/// Maps a non-success status to `BackendError`, taking the body's `error`
/// field when there is one.
async fn check_status(response: Response, fallback: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    warn!(status = status.as_u16(), message = %message, "Backend returned an error");
    Err(SignboardError::BackendError {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
    let response = check_status(response, fallback).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| SignboardError::MalformedResponse(e.to_string()))
}

#[async_trait]
impl TranslateBackend for HttpBackend {
    async fn translate(&self, image: &ImageFile) -> Result<TranslationResult> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.media_type())
            .map_err(|e| SignboardError::ValidationError(e.to_string()))?;
        let form = Form::new()
            .part("image", part)
            .text("target_language", self.target_language.clone());

        info!(
            file = image.file_name(),
            size = image.len(),
            target_language = %self.target_language,
            "Submitting image for translation"
        );

        let response = self
            .client
            .post(self.url("/api/translate"))
            .multipart(form)
            .send()
            .await?;

        let payload: TranslateResponse = read_json(response, "Translation failed").await?;
        let result = payload.into_result()?;

        info!(
            texts = result.len(),
            processing_time = result.processing_time_seconds(),
            "Translation received"
        );
        Ok(result)
    }
}

#[async_trait]
impl HistoryBackend for HttpBackend {
    async fn list_page(&self, page: u32, per_page: u32) -> Result<(Page, u32)> {
        debug!(page, per_page, "Fetching history page");
        let response = self
            .client
            .get(self.url("/api/history"))
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;

        let payload: HistoryPageResponse = read_json(response, "Failed to fetch history").await?;
        payload.into_page(page)
    }

    async fn fetch_stats(&self) -> Result<HistoryStats> {
        let response = self.client.get(self.url("/api/stats")).send().await?;
        read_json(response, "Failed to fetch stats").await
    }

    async fn fetch_entry(&self, id: &EntryId) -> Result<HistoryEntry> {
        let response = self
            .client
            .get(self.entry_url(id)?)
            .send()
            .await?;
        let dto: HistoryEntryDto = read_json(response, "Failed to fetch translation").await?;
        dto.into_entry()
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<()> {
        let response = self
            .client
            .delete(self.entry_url(id)?)
            .send()
            .await?;
        check_status(response, "Failed to delete translation").await?;
        info!(id = %id, "Deleted translation");
        Ok(())
    }

    async fn clear_history(&self) -> Result<()> {
        let response = self
            .client
            .delete(self.url("/api/history/clear"))
            .send()
            .await?;
        check_status(response, "Failed to clear history").await?;
        info!("Cleared translation history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(&ServerConfig {
            base_url: base_url.to_string(),
            ..ServerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn entry_url_appends_numeric_id_under_base_path() {
        let url = backend("http://localhost:5000/signs/")
            .entry_url(&EntryId::new("42"))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/signs/api/history/42");
    }

    #[test]
    fn entry_url_refuses_ids_that_address_other_resources() {
        let backend = backend("http://localhost:5000");
        for id in ["clear", "5?x=1", "5/../clear", "", "-1"] {
            let err = backend.entry_url(&EntryId::new(id)).unwrap_err();
            assert!(
                matches!(err, SignboardError::ValidationError(_)),
                "{:?} was accepted",
                id
            );
        }
    }
}
