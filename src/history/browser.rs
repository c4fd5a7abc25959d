use crate::backend::HistoryBackend;
use crate::history::confirm::{Confirm, ConfirmPrompt};
use crate::history::{EntryId, HistoryEntry, HistoryStats, Page};
use crate::utils::{Result, SignboardError};
use tracing::{debug, info, warn};

/// Progress of one kind of fetch (list or stats).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(SignboardError),
}

impl LoadState {
    pub fn error(&self) -> Option<&SignboardError> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Identifies one list fetch. Results for any ticket but the latest are
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListTicket {
    page: u32,
    generation: u64,
}

impl ListTicket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsTicket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTicket {
    id: EntryId,
}

impl DeleteTicket {
    pub fn id(&self) -> &EntryId {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearTicket {
    _private: (),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    Failed,
}

/// Paginated view over past translations, with corpus stats and a detail
/// selection.
///
/// Every user action is a pair of transitions: `begin_*` records intent and
/// returns a ticket, `apply_*`/`complete_*` folds the backend's answer in.
/// The async methods (`open`, `change_page`, ...) run both halves against a
/// [`HistoryBackend`]; callers that issue overlapping requests can drive the
/// halves themselves.
#[derive(Debug)]
pub struct HistoryBrowser {
    per_page: u32,
    page: Page,
    target_page: u32,
    list_state: LoadState,
    list_generation: u64,
    stats: Option<HistoryStats>,
    stats_state: LoadState,
    stats_generation: u64,
    selected: Option<HistoryEntry>,
    action_error: Option<SignboardError>,
}

impl HistoryBrowser {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
            page: Page::empty(),
            target_page: 1,
            list_state: LoadState::Idle,
            list_generation: 0,
            stats: None,
            stats_state: LoadState::Idle,
            stats_generation: 0,
            selected: None,
            action_error: None,
        }
    }

    /// The page currently displayed.
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.page.entries
    }

    pub fn current_page(&self) -> u32 {
        self.page.current_page()
    }

    pub fn total_pages(&self) -> u32 {
        self.page.total_pages()
    }

    /// The page the latest list fetch targets; equals `current_page` once
    /// that fetch has landed.
    pub fn target_page(&self) -> u32 {
        self.target_page
    }

    pub fn list_state(&self) -> &LoadState {
        &self.list_state
    }

    pub fn stats(&self) -> Option<&HistoryStats> {
        self.stats.as_ref()
    }

    pub fn stats_state(&self) -> &LoadState {
        &self.stats_state
    }

    pub fn selected(&self) -> Option<&HistoryEntry> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.list_state == LoadState::Loading
    }

    /// Last failed delete or clear.
    pub fn action_error(&self) -> Option<&SignboardError> {
        self.action_error.as_ref()
    }

    /// The error to show: a failed delete/clear first, then a failed list load.
    pub fn error(&self) -> Option<&SignboardError> {
        self.action_error
            .as_ref()
            .or_else(|| self.list_state.error())
    }

    // --- transitions -----------------------------------------------------

    pub fn begin_open(&mut self) -> (ListTicket, StatsTicket) {
        let page = self.target_page;
        (self.begin_list_load(page), self.begin_stats_load())
    }

    /// Explicit refresh also dismisses the last delete/clear error.
    pub fn begin_refresh(&mut self) -> (ListTicket, StatsTicket) {
        self.action_error = None;
        self.begin_open()
    }

    /// Clamps `page` into `[1, total_pages]`. Returns `None` when that is
    /// already the targeted page. Stats are not reloaded.
    pub fn begin_change_page(&mut self, page: u32) -> Option<ListTicket> {
        let page = self.page.clamp(page);
        if page == self.target_page {
            return None;
        }
        Some(self.begin_list_load(page))
    }

    fn begin_list_load(&mut self, page: u32) -> ListTicket {
        self.list_generation += 1;
        self.target_page = page;
        self.list_state = LoadState::Loading;
        ListTicket {
            page,
            generation: self.list_generation,
        }
    }

    pub fn begin_stats_load(&mut self) -> StatsTicket {
        self.stats_generation += 1;
        self.stats_state = LoadState::Loading;
        StatsTicket {
            generation: self.stats_generation,
        }
    }

    /// Folds a list response in. Returns a follow-up ticket when the backend
    /// reports fewer pages than the one requested.
    pub fn apply_list(
        &mut self,
        ticket: ListTicket,
        result: Result<(Page, u32)>,
    ) -> Option<ListTicket> {
        if ticket.generation != self.list_generation {
            debug!(page = ticket.page, "Discarding stale history page");
            return None;
        }

        match result {
            Ok((page, reported_pages)) => {
                let last = reported_pages.max(1);
                if ticket.page > last {
                    info!(
                        requested = ticket.page,
                        pages = last,
                        "History shrank, loading last page instead"
                    );
                    return Some(self.begin_list_load(last));
                }
                debug!(
                    page = page.current_page(),
                    entries = page.entries.len(),
                    "History page loaded"
                );
                self.target_page = page.current_page();
                self.page = page;
                self.list_state = LoadState::Loaded;
            }
            Err(err) => {
                warn!(page = ticket.page, error = %err, "History page failed to load");
                self.target_page = self.page.current_page();
                self.list_state = LoadState::Failed(err.into_load_error());
            }
        }
        None
    }

    pub fn apply_stats(&mut self, ticket: StatsTicket, result: Result<HistoryStats>) {
        if ticket.generation != self.stats_generation {
            debug!("Discarding stale stats");
            return;
        }

        match result {
            Ok(stats) => {
                self.stats = Some(stats);
                self.stats_state = LoadState::Loaded;
            }
            Err(err) => {
                warn!(error = %err, "Stats failed to load");
                self.stats_state = LoadState::Failed(err.into_load_error());
            }
        }
    }

    /// Client-side only. Returns `false` if `id` is not on the displayed page.
    pub fn select(&mut self, id: &EntryId) -> bool {
        match self.page.find(id) {
            Some(entry) => {
                self.selected = Some(entry.clone());
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn begin_delete(&mut self, id: &EntryId, confirm: &dyn Confirm) -> Option<DeleteTicket> {
        let prompt = ConfirmPrompt::DeleteOne {
            filename: self.page.find(id).map(|e| e.original_filename.clone()),
        };
        if !confirm.confirm(&prompt) {
            debug!(id = %id, "Delete cancelled");
            return None;
        }
        self.action_error = None;
        Some(DeleteTicket { id: id.clone() })
    }

    /// On success returns the reload tickets for list and stats.
    pub fn complete_delete(
        &mut self,
        ticket: DeleteTicket,
        result: Result<()>,
    ) -> Option<(ListTicket, StatsTicket)> {
        match result {
            Ok(()) => {
                if self.selected.as_ref().map(|e| &e.id) == Some(&ticket.id) {
                    self.selected = None;
                }
                Some(self.begin_open())
            }
            Err(err) => {
                warn!(id = %ticket.id, error = %err, "Delete failed");
                self.action_error = Some(err.into_delete_error());
                None
            }
        }
    }

    pub fn begin_clear(&mut self, confirm: &dyn Confirm) -> Option<ClearTicket> {
        if !confirm.confirm(&ConfirmPrompt::DeleteAll) {
            debug!("Clear cancelled");
            return None;
        }
        self.action_error = None;
        Some(ClearTicket { _private: () })
    }

    /// On success empties the list, stats and selection immediately and
    /// returns a stats ticket to confirm the now-empty corpus.
    pub fn complete_clear(&mut self, _ticket: ClearTicket, result: Result<()>) -> Option<StatsTicket> {
        match result {
            Ok(()) => {
                // In-flight list fetches predate the clear.
                self.list_generation += 1;
                self.page = Page::empty();
                self.target_page = 1;
                self.list_state = LoadState::Loaded;
                self.stats = None;
                self.selected = None;
                Some(self.begin_stats_load())
            }
            Err(err) => {
                warn!(error = %err, "Clear failed");
                self.action_error = Some(err.into_clear_error());
                None
            }
        }
    }

    // --- drivers ---------------------------------------------------------

    pub async fn open(&mut self, backend: &dyn HistoryBackend) {
        let (list, stats) = self.begin_open();
        self.run_loads(backend, Some(list), Some(stats)).await;
    }

    pub async fn refresh(&mut self, backend: &dyn HistoryBackend) {
        let (list, stats) = self.begin_refresh();
        self.run_loads(backend, Some(list), Some(stats)).await;
    }

    pub async fn change_page(&mut self, backend: &dyn HistoryBackend, page: u32) {
        if let Some(ticket) = self.begin_change_page(page) {
            self.run_loads(backend, Some(ticket), None).await;
        }
    }

    pub async fn delete_one(
        &mut self,
        backend: &dyn HistoryBackend,
        id: &EntryId,
        confirm: &dyn Confirm,
    ) -> DeleteOutcome {
        let Some(ticket) = self.begin_delete(id, confirm) else {
            return DeleteOutcome::Cancelled;
        };
        let result = backend.delete_entry(ticket.id()).await;
        match self.complete_delete(ticket, result) {
            Some((list, stats)) => {
                self.run_loads(backend, Some(list), Some(stats)).await;
                DeleteOutcome::Deleted
            }
            None => DeleteOutcome::Failed,
        }
    }

    pub async fn delete_all(
        &mut self,
        backend: &dyn HistoryBackend,
        confirm: &dyn Confirm,
    ) -> DeleteOutcome {
        let Some(ticket) = self.begin_clear(confirm) else {
            return DeleteOutcome::Cancelled;
        };
        let result = backend.clear_history().await;
        match self.complete_clear(ticket, result) {
            Some(stats) => {
                self.run_loads(backend, None, Some(stats)).await;
                DeleteOutcome::Deleted
            }
            None => DeleteOutcome::Failed,
        }
    }

    async fn run_loads(
        &mut self,
        backend: &dyn HistoryBackend,
        list: Option<ListTicket>,
        stats: Option<StatsTicket>,
    ) {
        let per_page = self.per_page;
        let list_fut = async move {
            match list {
                Some(ticket) => Some((ticket, backend.list_page(ticket.page, per_page).await)),
                None => None,
            }
        };
        let stats_fut = async move {
            match stats {
                Some(ticket) => Some((ticket, backend.fetch_stats().await)),
                None => None,
            }
        };
        let (list_result, stats_result) = tokio::join!(list_fut, stats_fut);

        if let Some((ticket, result)) = stats_result {
            self.apply_stats(ticket, result);
        }

        let mut next = list_result.and_then(|(ticket, result)| self.apply_list(ticket, result));
        while let Some(ticket) = next {
            let result = backend.list_page(ticket.page, per_page).await;
            next = self.apply_list(ticket, result);
        }
    }
}
