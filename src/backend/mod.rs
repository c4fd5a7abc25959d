//! The HTTP seam between the state machines and the translation service.
//!
//! Both state machines talk to these traits only; [`HttpBackend`] is the
//! production implementation and tests substitute mocks.

pub mod http;
pub mod wire;

pub use http::HttpBackend;

use crate::history::{EntryId, HistoryEntry, HistoryStats, Page};
use crate::translation::{ImageFile, TranslationResult};
use crate::utils::Result;
use async_trait::async_trait;

/// Upload side: one image in, one validated result out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslateBackend: Send + Sync {
    /// Errors are `TransportError`, `BackendError` or `MalformedResponse`.
    async fn translate(&self, image: &ImageFile) -> Result<TranslationResult>;
}

/// Read and delete access to persisted translations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Returns the page together with the page count the backend reported,
    /// which may be smaller than `page` if the history shrank.
    async fn list_page(&self, page: u32, per_page: u32) -> Result<(Page, u32)>;

    async fn fetch_stats(&self) -> Result<HistoryStats>;

    async fn fetch_entry(&self, id: &EntryId) -> Result<HistoryEntry>;

    async fn delete_entry(&self, id: &EntryId) -> Result<()>;

    async fn clear_history(&self) -> Result<()>;
}
