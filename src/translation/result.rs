use crate::history::EntryId;
use crate::utils::{Result, SignboardError};
use serde::{Deserialize, Serialize};

/// One OCR hit with its position on the processed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPair<'a> {
    pub original: &'a str,
    pub translated: &'a str,
}

impl TextPair<'_> {
    /// The source text was already in the target language.
    pub fn is_unchanged(&self) -> bool {
        self.original == self.translated
    }
}

/// Index-aligned OCR output and its translation.
///
/// Constructed only through [`TranslationResult::new`], so the two text
/// sequences always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    original_texts: Vec<String>,
    translated_texts: Vec<String>,
    processed_image: Option<Vec<u8>>,
    processing_time_seconds: f64,
    pub translation_id: Option<EntryId>,
    pub message: Option<String>,
    pub text_blocks: Vec<TextBlock>,
}

impl TranslationResult {
    pub fn new(
        original_texts: Vec<String>,
        translated_texts: Vec<String>,
        processed_image: Option<Vec<u8>>,
        processing_time_seconds: f64,
    ) -> Result<Self> {
        ensure_paired(&original_texts, &translated_texts)?;
        Ok(Self {
            original_texts,
            translated_texts,
            processed_image,
            processing_time_seconds,
            translation_id: None,
            message: None,
            text_blocks: Vec::new(),
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

    pub fn len(&self) -> usize {
        self.original_texts.len()
    }

    /// No text was detected in the image.
    pub fn is_empty(&self) -> bool {
        self.original_texts.is_empty()
    }

    /// Decoded PNG bytes of the annotated image, if the backend produced one.
    pub fn processed_image(&self) -> Option<&[u8]> {
        self.processed_image.as_deref()
    }

    pub fn processing_time_seconds(&self) -> f64 {
        self.processing_time_seconds
    }
}

/// Pairing contract shared by translation results and history entries.
pub(crate) fn ensure_paired(original: &[String], translated: &[String]) -> Result<()> {
    if original.len() != translated.len() {
        return Err(SignboardError::MalformedResponse(format!(
            "{} original texts but {} translations",
            original.len(),
            translated.len()
        )));
    }
    Ok(())
}
