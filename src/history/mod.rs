pub mod browser;
pub mod confirm;
pub mod entry;

pub use browser::{
    ClearTicket, DeleteOutcome, DeleteTicket, HistoryBrowser, ListTicket, LoadState, StatsTicket,
};
pub use confirm::{AutoConfirm, Confirm, ConfirmPrompt, Decline, TerminalPrompt};
pub use entry::{EntryId, HistoryEntry, HistoryStats, Page};
