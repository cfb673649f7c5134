use crate::api::{ApiError, BookQuery, BookSource};
use crate::data::{Book, BookPage};

/// Where the session currently stands. Errors are carried alongside the
/// phase rather than as a phase of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingInitial,
    LoadingMore,
    Ready,
}

impl Phase {
    pub fn is_loading(self) -> bool {
        matches!(self, Phase::LoadingInitial | Phase::LoadingMore)
    }
}

/// Ticket for an issued fetch. Completions are matched against the
/// session's latest sequence number; anything older is discarded, so a
/// slow first page cannot clobber a newer topic or search.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFetch {
    sequence: u64,
    pub query: BookQuery,
}

/// Accumulates pages for one topic/search combination.
///
/// The transition methods (`begin_*`, `complete`) are side-effect free so
/// the state machine can be exercised without a network; `refresh` and
/// `load_more` drive them against the session's [`BookSource`]. The
/// session never watches topic or search itself; callers change them and
/// then call `refresh`.
pub struct BrowseSession<S> {
    source: S,
    topic: String,
    search: String,
    books: Vec<Book>,
    next: Option<String>,
    phase: Phase,
    error: Option<String>,
    sequence: u64,
}

impl<S> BrowseSession<S> {
    pub fn new(source: S, topic: impl Into<String>) -> BrowseSession<S> {
        BrowseSession {
            source,
            topic: topic.into(),
            search: String::new(),
            books: Vec::new(),
            next: None,
            phase: Phase::Idle,
            error: None,
            sequence: 0,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Callers must follow up with `refresh`.
    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    /// Callers must follow up with `refresh`.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Books in page-concatenation order. Duplicate ids from overlapping
    /// upstream pages are kept as-is.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    /// Whether a `load_more` call would actually issue a fetch.
    pub fn may_load_more(&self) -> bool {
        self.next.is_some() && !self.phase.is_loading()
    }

    /// Drop accumulated state and issue a first-page ticket.
    pub fn begin_refresh(&mut self) -> PendingFetch {
        self.sequence += 1;
        self.books.clear();
        self.next = None;
        self.error = None;
        self.phase = Phase::LoadingInitial;
        PendingFetch {
            sequence: self.sequence,
            query: self.first_page_query(),
        }
    }

    /// Issue a next-page ticket, or `None` when there is no next-page
    /// locator or a fetch is already in flight (dropped, not queued).
    pub fn begin_load_more(&mut self) -> Option<PendingFetch> {
        if self.phase.is_loading() {
            log::debug!("load_more dropped: fetch already in flight");
            return None;
        }
        let page = self.next.clone()?;
        self.sequence += 1;
        self.phase = Phase::LoadingMore;
        Some(PendingFetch {
            sequence: self.sequence,
            query: BookQuery {
                page: Some(page),
                ..self.first_page_query()
            },
        })
    }

    /// Apply a fetch outcome. Stale completions (a newer ticket has been
    /// issued since) are discarded without touching any state.
    pub fn complete(&mut self, pending: PendingFetch, result: Result<BookPage, ApiError>) {
        if pending.sequence != self.sequence {
            log::debug!("discarding stale response #{}", pending.sequence);
            return;
        }
        match result {
            Ok(page) => {
                if self.phase == Phase::LoadingInitial {
                    self.books = page.results;
                } else {
                    self.books.extend(page.results);
                }
                self.next = page.next;
                self.error = None;
            }
            Err(err) => {
                self.error = Some(err.to_string());
            }
        }
        self.phase = Phase::Ready;
    }

    fn first_page_query(&self) -> BookQuery {
        BookQuery {
            topic: self.topic.clone(),
            search: (!self.search.is_empty()).then(|| self.search.clone()),
            page: None,
        }
    }
}

impl<S: BookSource> BrowseSession<S> {
    /// Replace the list with a fresh first page for the current topic and
    /// search text. On failure the list stays empty and the error message
    /// is stored.
    pub async fn refresh(&mut self) {
        let pending = self.begin_refresh();
        let result = self.source.fetch_page(&pending.query).await;
        self.complete(pending, result);
    }

    /// Append the next page. No-op without a next-page locator or while a
    /// fetch is in flight. On failure the accumulated list is kept and the
    /// error message is stored.
    pub async fn load_more(&mut self) {
        let Some(pending) = self.begin_load_more() else {
            return;
        };
        let result = self.source.fetch_page(&pending.query).await;
        self.complete(pending, result);
    }
}
