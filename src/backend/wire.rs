//! JSON shapes exchanged with the translation backend.
//!
//! Response DTOs are deliberately loose (`Option` everywhere the backend may
//! omit a field) and converted into domain types through `into_*` methods,
//! which is where contract violations become `MalformedResponse`.

use crate::history::{EntryId, HistoryEntry, Page};
use crate::translation::{TextBlock, TranslationResult};
use crate::utils::{Result, SignboardError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    pub original_texts: Option<Vec<String>>,
    pub translated_texts: Option<Vec<String>>,
    #[serde(default)]
    pub processed_image: Option<String>,
    #[serde(default)]
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub translation_id: Option<EntryId>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub text_blocks: Option<Vec<TextBlock>>,
}

impl TranslateResponse {
    pub fn into_result(self) -> Result<TranslationResult> {
        let (original, translated) = match (self.original_texts, self.translated_texts) {
            (Some(o), Some(t)) => (o, t),
            (None, _) => return Err(missing("original_texts")),
            (_, None) => return Err(missing("translated_texts")),
        };

        let processed_image = match self.processed_image.as_deref() {
            Some(encoded) if !encoded.is_empty() => Some(STANDARD.decode(encoded).map_err(|e| {
                SignboardError::MalformedResponse(format!("processed_image is not base64: {}", e))
            })?),
            _ => None,
        };

        let mut result = TranslationResult::new(
            original,
            translated,
            processed_image,
            self.processing_time.unwrap_or_default(),
        )?;
        result.translation_id = self.translation_id;
        result.message = self.message;
        result.text_blocks = self.text_blocks.unwrap_or_default();
        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryEntryDto {
    pub id: EntryId,
    pub original_filename: String,
    #[serde(default)]
    pub image_size: u64,
    #[serde(default)]
    pub image_dimensions: Option<String>,
    #[serde(default)]
    pub processing_time: Option<f64>,
    pub created_at: String,
    pub original_texts: Option<Vec<String>>,
    pub translated_texts: Option<Vec<String>>,
    #[serde(default)]
    pub detected_language: Option<String>,
}

impl HistoryEntryDto {
    pub fn into_entry(self) -> Result<HistoryEntry> {
        let original = self.original_texts.ok_or_else(|| missing("original_texts"))?;
        let translated = self
            .translated_texts
            .ok_or_else(|| missing("translated_texts"))?;
        let created_at = parse_timestamp(&self.created_at)?;

        let mut entry = HistoryEntry::new(
            self.id,
            self.original_filename,
            self.image_size,
            self.image_dimensions,
            self.processing_time.unwrap_or_default(),
            created_at,
            original,
            translated,
        )?;
        entry.detected_language = self.detected_language;
        Ok(entry)
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryPageResponse {
    pub translations: Vec<HistoryEntryDto>,
    pub pages: u32,
    #[serde(default)]
    pub total: Option<u64>,
}

impl HistoryPageResponse {
    /// `requested` is the page the request targeted; `pages` is what the
    /// backend reports now and may be smaller if the corpus shrank.
    pub fn into_page(self, requested: u32) -> Result<(Page, u32)> {
        let entries = self
            .translations
            .into_iter()
            .map(HistoryEntryDto::into_entry)
            .collect::<Result<Vec<_>>>()?;
        let reported_pages = self.pages;
        let mut page = Page::new(entries, requested, reported_pages);
        page.total_entries = self.total;
        Ok((page, reported_pages))
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Accepts RFC 3339 and the backend's naive UTC ISO format
/// (`2024-03-09T14:05:07.123456`).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| SignboardError::MalformedResponse(format!("bad timestamp {:?}: {}", raw, e)))
}

fn missing(field: &str) -> SignboardError {
    SignboardError::MalformedResponse(format!("response is missing {}", field))
}
