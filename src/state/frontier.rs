use std::collections::{HashSet, VecDeque};

/// Per-run crawl bookkeeping: what to visit next, what was already fetched,
/// and how much of the page budget is left.
///
/// A fresh `Frontier` is built for every run; nothing is ever reset in place.
/// Pending URLs are served first-in first-out.
#[derive(Debug, Clone)]
pub struct Frontier {
    /// URLs that were fetched (or attempted) during this run
    visited: HashSet<String>,

    /// URLs waiting to be fetched, in discovery order
    pending: VecDeque<String>,

    /// Membership index for `pending`
    pending_set: HashSet<String>,

    /// Number of fetch attempts so far
    fetched: u32,

    /// Current listing page number, starting at 1
    listing_page: u32,

    /// Maximum number of fetch attempts for this run
    max_pages: u32,
}

impl Frontier {
    /// Creates an empty frontier with the given page budget
    pub fn new(max_pages: u32) -> Self {
        Self {
            visited: HashSet::new(),
            pending: VecDeque::new(),
            pending_set: HashSet::new(),
            fetched: 0,
            listing_page: 1,
            max_pages,
        }
    }

    /// Adds a URL to the pending queue
    ///
    /// Returns false if the URL was already visited or is already pending.
    pub fn enqueue(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.visited.contains(&url) || self.pending_set.contains(&url) {
            return false;
        }
        self.pending_set.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Removes and returns the next pending URL
    pub fn take(&mut self) -> Option<String> {
        let url = self.pending.pop_front()?;
        self.pending_set.remove(&url);
        Some(url)
    }

    /// Records a fetch attempt for `url`
    ///
    /// Returns false (and does not count the attempt) if the URL was already
    /// visited.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if !self.visited.insert(url.to_string()) {
            return false;
        }
        self.fetched += 1;
        true
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// True when nothing is pending or the page budget is spent
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty() || self.budget_spent()
    }

    /// True when the number of fetch attempts reached the budget
    pub fn budget_spent(&self) -> bool {
        self.fetched >= self.max_pages
    }

    /// Moves to the next listing page and returns its number
    pub fn advance_listing_page(&mut self) -> u32 {
        self.listing_page += 1;
        self.listing_page
    }

    /// Returns true if `page` is still within the page budget
    pub fn within_budget(&self, page: u32) -> bool {
        page <= self.max_pages
    }

    pub fn fetched(&self) -> u32 {
        self.fetched
    }

    pub fn listing_page(&self) -> u32 {
        self.listing_page
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }
}
