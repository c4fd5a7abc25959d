use crate::translation::result::{ensure_paired, TextPair};
use crate::utils::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned identifier. Opaque to the client; the backend may send it
/// as a JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct EntryId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for EntryId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => EntryId(n.to_string()),
            RawId::Text(s) => EntryId(s),
        }
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A persisted translation. Never edited in place by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub original_filename: String,
    pub image_size_bytes: u64,
    pub image_dimensions: Option<String>,
    pub processing_time_seconds: f64,
    pub created_at: DateTime<Utc>,
    pub detected_language: Option<String>,
    original_texts: Vec<String>,
    translated_texts: Vec<String>,
}

impl HistoryEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntryId,
        original_filename: String,
        image_size_bytes: u64,
        image_dimensions: Option<String>,
        processing_time_seconds: f64,
        created_at: DateTime<Utc>,
        original_texts: Vec<String>,
        translated_texts: Vec<String>,
    ) -> Result<Self> {
        ensure_paired(&original_texts, &translated_texts)?;
        Ok(Self {
            id,
            original_filename,
            image_size_bytes,
            image_dimensions,
            processing_time_seconds,
            created_at,
            detected_language: None,
            original_texts,
            translated_texts,
        })
    }

    pub fn original_texts(&self) -> &[String] {
        &self.original_texts
    }

    pub fn translated_texts(&self) -> &[String] {
        &self.translated_texts
    }

    pub fn pairs(&self) -> impl Iterator<Item = TextPair<'_>> {
        self.original_texts
            .iter()
            .zip(self.translated_texts.iter())
            .map(|(original, translated)| TextPair {
                original,
                translated,
            })
    }

    pub fn text_count(&self) -> usize {
        self.original_texts.len()
    }
}

/// Corpus-wide aggregates, fetched separately from any page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_translations: u64,
    #[serde(rename = "average_processing_time")]
    pub average_processing_time_seconds: f64,
    #[serde(default, rename = "total_processing_time")]
    pub total_processing_time_seconds: f64,
    #[serde(default)]
    pub total_texts_translated: u64,
    #[serde(default)]
    pub languages_detected: Vec<String>,
    #[serde(default)]
    pub first_translation: Option<String>,
    #[serde(default)]
    pub latest_translation: Option<String>,
}

/// One slice of the history list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub entries: Vec<HistoryEntry>,
    current_page: u32,
    total_pages: u32,
    pub total_entries: Option<u64>,
}

impl Page {
    /// `total_pages` of zero (an empty corpus) is reported as one page.
    pub fn new(entries: Vec<HistoryEntry>, current_page: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            entries,
            current_page: current_page.clamp(1, total_pages),
            total_pages,
            total_entries: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 1, 1)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages)
    }

    pub fn find(&self, id: &EntryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_numbers_and_strings() {
        let from_number: EntryId = serde_json::from_str("42").unwrap();
        let from_text: EntryId = serde_json::from_str("\"a1b2\"").unwrap();
        assert_eq!(from_number.as_str(), "42");
        assert_eq!(from_text.as_str(), "a1b2");
    }

    #[test]
    fn page_never_exceeds_its_page_count() {
        let page = Page::new(Vec::new(), 9, 3);
        assert_eq!(page.current_page(), 3);
        assert_eq!(page.clamp(0), 1);
        assert_eq!(page.clamp(8), 3);

        let empty = Page::new(Vec::new(), 1, 0);
        assert_eq!(empty.total_pages(), 1);
    }

    #[test]
    fn stats_tolerate_minimal_payload() {
        let stats: HistoryStats = serde_json::from_str(
            r#"{"total_translations": 4, "average_processing_time": 1.75}"#,
        )
        .unwrap();
        assert_eq!(stats.total_translations, 4);
        assert_eq!(stats.average_processing_time_seconds, 1.75);
        assert!(stats.languages_detected.is_empty());
    }
}
