pub mod backend;
pub mod history;
pub mod translation;
pub mod utils;

pub use backend::{HistoryBackend, HttpBackend, TranslateBackend};
pub use history::{
    AutoConfirm, Confirm, ConfirmPrompt, Decline, DeleteOutcome, EntryId, HistoryBrowser,
    HistoryEntry, HistoryStats, LoadState, Page, TerminalPrompt,
};
pub use translation::{
    ImageFile, SessionPhase, TextPair, TranslationResult, TranslationSession,
};
pub use utils::{format_date, format_day, format_size, AppConfig, Result, SignboardError};
