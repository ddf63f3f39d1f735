//! Per-dropdown paging state machine.
//!
//! ```text
//! Closed ─open─▶ Loading(First) ─▶ Idle{has_more} ─scroll─▶ Loading(Next) ─▶ Idle{..}
//!   ▲                                   │
//!   └──────────────── close ────────────┘
//! ```
//!
//! Requests are issued as [`PageRequest`] values and completed with
//! [`LazyOptionProvider::complete`]. Every request carries the generation it
//! was issued under; a search reset or close bumps the generation, so a
//! response that arrives for a superseded query is discarded instead of
//! being merged into the new result set.

use std::time::{Duration, Instant};

use crate::debounce::Debouncer;
use crate::error::LookupError;
use crate::option::{LookupOption, OptionPage, OptionQuery};
use crate::source::OptionSource;

/// Tunables for one provider instance.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupSettings {
    /// Quiet period before a search term triggers a refetch.
    pub debounce: Duration,
    /// Distance from the bottom of the list (px) that triggers the next page.
    pub scroll_threshold_px: f64,
    /// Rows requested per page.
    pub page_limit: usize,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            scroll_threshold_px: 10.0,
            page_limit: 20,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multiple,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PageKind {
    First,
    Next,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProviderState {
    Closed,
    Loading(PageKind),
    Idle { has_more: bool },
}

/// A page fetch the caller must run and hand back to [`LazyOptionProvider::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    generation: u64,
    kind: PageKind,
    query: OptionQuery,
}

impl PageRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn query(&self) -> &OptionQuery {
        &self.query
    }
}

/// Scroll position of the option list.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    pub fn distance_to_bottom(&self) -> f64 {
        self.scroll_height - (self.scroll_top + self.client_height)
    }
}

/// Result of picking an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Single-select: the control closed with this value.
    Single(LookupOption),
    /// Multi-select: the current value set after toggling.
    Multiple(Vec<LookupOption>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied { received: usize, has_more: bool },
    /// The request was superseded and its response dropped.
    Stale,
}

#[derive(Debug)]
pub struct LazyOptionProvider {
    settings: LookupSettings,
    mode: SelectionMode,
    state: ProviderState,
    options: Vec<LookupOption>,
    selected: Vec<LookupOption>,
    search_term: String,
    search: Debouncer<String>,
    next_offset: usize,
    generation: u64,
    in_flight: bool,
    last_error: Option<LookupError>,
}

impl LazyOptionProvider {
    pub fn new(settings: LookupSettings, mode: SelectionMode) -> Self {
        let search = Debouncer::new(settings.debounce);
        Self {
            settings,
            mode,
            state: ProviderState::Closed,
            options: Vec::new(),
            selected: Vec::new(),
            search_term: String::new(),
            search,
            next_offset: 0,
            generation: 0,
            in_flight: false,
            last_error: None,
        }
    }

    /// Seed the current value set (e.g. from a saved record).
    pub fn with_selected(mut self, selected: Vec<LookupOption>) -> Self {
        self.selected = selected;
        self
    }

    pub fn state(&self) -> ProviderState {
        self.state
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn options(&self) -> &[LookupOption] {
        &self.options
    }

    pub fn selected(&self) -> &[LookupOption] {
        &self.selected
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn has_more(&self) -> bool {
        matches!(self.state, ProviderState::Idle { has_more: true })
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&LookupError> {
        self.last_error.as_ref()
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, ProviderState::Closed)
    }

    /// Open the control and request the first page.
    ///
    /// Returns `None` if the control is already open.
    pub fn open(&mut self) -> Option<PageRequest> {
        if self.is_open() {
            return None;
        }
        Some(self.restart())
    }

    /// Record a keystroke in the search box; the refetch happens on [`poll_search`].
    ///
    /// [`poll_search`]: Self::poll_search
    pub fn set_search_term(&mut self, term: impl Into<String>, now: Instant) {
        self.search.schedule(term.into(), now);
    }

    /// Fire the debounced search once its quiet period has elapsed.
    pub fn poll_search(&mut self, now: Instant) -> Option<PageRequest> {
        let term = self.search.poll(now)?;
        if !self.is_open() {
            return None;
        }
        tracing::debug!(term = %term, "lookup search reset");
        self.search_term = term;
        Some(self.restart())
    }

    /// Request the next page when the list is scrolled near its bottom.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<PageRequest> {
        if metrics.distance_to_bottom() > self.settings.scroll_threshold_px {
            return None;
        }
        if self.in_flight || !self.has_more() {
            return None;
        }
        Some(self.issue(PageKind::Next))
    }

    /// Apply the outcome of a request.
    pub fn complete(
        &mut self,
        request: PageRequest,
        result: Result<OptionPage, LookupError>,
    ) -> Result<Completion, LookupError> {
        if request.generation != self.generation || !self.is_open() {
            tracing::debug!(
                request_generation = request.generation,
                current_generation = self.generation,
                "discarding stale lookup page"
            );
            return Ok(Completion::Stale);
        }

        self.in_flight = false;

        match result {
            Ok(page) => {
                let has_more = page.more_available(&request.query);
                let received = page.options.len();
                self.next_offset = request.query.offset + received;
                match request.kind {
                    PageKind::First => self.options = page.options,
                    PageKind::Next => self.options.extend(page.options),
                }
                self.state = ProviderState::Idle { has_more };
                self.last_error = None;
                Ok(Completion::Applied { received, has_more })
            }
            Err(err) => {
                // Keep what was already loaded; a failed first page leaves nothing to page through.
                let has_more = request.kind == PageKind::Next;
                self.state = ProviderState::Idle { has_more };
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Run `request` against `source` and apply the result.
    pub async fn load<S>(
        &mut self,
        source: &S,
        request: PageRequest,
    ) -> Result<Completion, LookupError>
    where
        S: OptionSource + ?Sized,
    {
        tracing::debug!(
            offset = request.query.offset,
            limit = request.query.limit,
            term = %request.query.search_term,
            "fetching lookup page"
        );
        let result = source.fetch_options(request.query.clone()).await;
        self.complete(request, result)
    }

    /// Close the control, dropping accumulated options and any pending search.
    pub fn close(&mut self) {
        self.state = ProviderState::Closed;
        self.options.clear();
        self.search_term.clear();
        self.search.cancel();
        self.next_offset = 0;
        self.in_flight = false;
        self.last_error = None;
        self.generation += 1;
    }

    /// Pick an option.
    pub fn select(&mut self, option: LookupOption) -> Selection {
        match self.mode {
            SelectionMode::Single => {
                self.selected = vec![option.clone()];
                self.close();
                Selection::Single(option)
            }
            SelectionMode::Multiple => {
                if let Some(pos) = self.selected.iter().position(|o| o.value == option.value) {
                    self.selected.remove(pos);
                } else {
                    self.selected.push(option);
                }
                Selection::Multiple(self.selected.clone())
            }
        }
    }

    fn restart(&mut self) -> PageRequest {
        self.generation += 1;
        self.options.clear();
        self.next_offset = 0;
        self.last_error = None;
        self.issue(PageKind::First)
    }

    fn issue(&mut self, kind: PageKind) -> PageRequest {
        let offset = match kind {
            PageKind::First => 0,
            PageKind::Next => self.next_offset,
        };
        self.state = ProviderState::Loading(kind);
        self.in_flight = true;
        PageRequest {
            generation: self.generation,
            kind,
            query: OptionQuery {
                search_term: self.search_term.clone(),
                offset,
                limit: self.settings.page_limit,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns `pages[i]` rows for the i-th call and records every query.
    struct PagedStub {
        pages: Vec<usize>,
        calls: Mutex<Vec<OptionQuery>>,
    }

    impl PagedStub {
        fn new(pages: Vec<usize>) -> Self {
            Self {
                pages,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<OptionQuery> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OptionSource for PagedStub {
        async fn fetch_options(&self, query: OptionQuery) -> Result<OptionPage, LookupError> {
            let mut calls = self.calls.lock().unwrap();
            let n = self.pages.get(calls.len()).copied().unwrap_or(0);
            let rows = (0..n)
                .map(|i| {
                    let idx = query.offset + i;
                    LookupOption::new(format!("W{idx}"), format!("Wagon {idx}"))
                })
                .collect();
            calls.push(query);
            Ok(OptionPage::new(rows))
        }
    }

    fn settings(limit: usize) -> LookupSettings {
        LookupSettings {
            page_limit: limit,
            ..LookupSettings::default()
        }
    }

    fn at_bottom() -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: 195.0,
            client_height: 100.0,
            scroll_height: 300.0,
        }
    }

    #[tokio::test]
    async fn full_page_implies_more_and_short_page_exhausts() {
        let source = PagedStub::new(vec![5, 3]);
        let mut provider = LazyOptionProvider::new(settings(5), SelectionMode::Single);

        let first = provider.open().unwrap();
        assert_eq!(provider.state(), ProviderState::Loading(PageKind::First));
        provider.load(&source, first).await.unwrap();
        assert!(provider.has_more());
        assert_eq!(provider.options().len(), 5);

        let next = provider.on_scroll(at_bottom()).unwrap();
        assert_eq!(next.query().offset, 5);
        provider.load(&source, next).await.unwrap();
        assert!(!provider.has_more());
        assert_eq!(provider.state(), ProviderState::Idle { has_more: false });
        assert_eq!(provider.options().len(), 8);

        assert!(provider.on_scroll(at_bottom()).is_none());
        assert_eq!(source.calls().len(), 2);
    }

    #[test]
    fn scroll_is_gated_by_distance_and_in_flight_request() {
        let mut provider = LazyOptionProvider::new(settings(2), SelectionMode::Single);
        let first = provider.open().unwrap();
        let page = OptionPage::new(vec![LookupOption::new("A", "a"), LookupOption::new("B", "b")]);
        provider.complete(first, Ok(page)).unwrap();

        let far = ScrollMetrics {
            scroll_top: 0.0,
            client_height: 100.0,
            scroll_height: 300.0,
        };
        assert!(provider.on_scroll(far).is_none());

        let next = provider.on_scroll(at_bottom());
        assert!(next.is_some());
        assert!(provider.is_loading());
        assert!(provider.on_scroll(at_bottom()).is_none());
    }

    #[test]
    fn debounced_search_resets_and_discards_stale_pages() {
        let start = Instant::now();
        let mut provider = LazyOptionProvider::new(settings(2), SelectionMode::Single);
        let first = provider.open().unwrap();

        provider.set_search_term("ham", start);
        assert!(provider.poll_search(start + Duration::from_millis(100)).is_none());
        let searched = provider.poll_search(start + Duration::from_millis(300)).unwrap();
        assert_eq!(searched.query().search_term, "ham");
        assert_eq!(searched.query().offset, 0);

        // The unfiltered first page arrives late and must not leak into the results.
        let late = OptionPage::new(vec![LookupOption::new("X", "x"), LookupOption::new("Y", "y")]);
        assert_eq!(provider.complete(first, Ok(late)).unwrap(), Completion::Stale);
        assert!(provider.options().is_empty());

        let fresh = OptionPage::new(vec![LookupOption::new("HAM", "Hamburg")]);
        provider.complete(searched, Ok(fresh)).unwrap();
        assert_eq!(provider.options(), &[LookupOption::new("HAM", "Hamburg")]);
        assert!(!provider.has_more());
    }

    #[test]
    fn response_after_close_is_stale() {
        let mut provider = LazyOptionProvider::new(settings(2), SelectionMode::Single);
        let first = provider.open().unwrap();
        provider.close();
        let page = OptionPage::new(vec![LookupOption::new("A", "a")]);
        assert_eq!(provider.complete(first, Ok(page)).unwrap(), Completion::Stale);
        assert_eq!(provider.state(), ProviderState::Closed);
        assert!(provider.options().is_empty());
    }

    #[test]
    fn explicit_has_more_overrides_page_length() {
        let mut provider = LazyOptionProvider::new(settings(10), SelectionMode::Single);
        let first = provider.open().unwrap();
        let page = OptionPage::new(vec![LookupOption::new("A", "a")]).with_has_more(true);
        provider.complete(first, Ok(page)).unwrap();
        assert!(provider.has_more());
    }

    #[test]
    fn failed_next_page_keeps_loaded_options() {
        let mut provider = LazyOptionProvider::new(settings(1), SelectionMode::Single);
        let first = provider.open().unwrap();
        provider
            .complete(first, Ok(OptionPage::new(vec![LookupOption::new("A", "a")])))
            .unwrap();

        let next = provider.on_scroll(at_bottom()).unwrap();
        let err = provider
            .complete(next, Err(LookupError::source("timeout")))
            .unwrap_err();
        assert_eq!(err, LookupError::source("timeout"));
        assert_eq!(provider.options().len(), 1);
        assert!(provider.has_more());
        assert!(provider.last_error().is_some());
    }

    #[test]
    fn single_select_closes_and_multi_select_toggles() {
        let mut single = LazyOptionProvider::new(settings(5), SelectionMode::Single);
        single.open();
        let picked = single.select(LookupOption::new("KG", "Kilogram"));
        assert_eq!(picked, Selection::Single(LookupOption::new("KG", "Kilogram")));
        assert_eq!(single.state(), ProviderState::Closed);

        let mut multi = LazyOptionProvider::new(settings(5), SelectionMode::Multiple);
        multi.open();
        multi.select(LookupOption::new("A", "a"));
        let after = multi.select(LookupOption::new("B", "b"));
        assert_eq!(after, Selection::Multiple(vec![LookupOption::new("A", "a"), LookupOption::new("B", "b")]));
        let after = multi.select(LookupOption::new("A", "a"));
        assert_eq!(after, Selection::Multiple(vec![LookupOption::new("B", "b")]));
        assert!(multi.is_open());
    }
}
