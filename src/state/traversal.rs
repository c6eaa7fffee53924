//! Traversal state: the worklist, the processed set and the found set
//!
//! The worklist is FIFO and never holds a duplicate or an already processed
//! sitemap. The processed and found sets only ever grow during a run.

use std::collections::{HashSet, VecDeque};

/// In-memory traversal state
///
/// `queued` mirrors the membership of `worklist` so duplicate checks stay
/// constant-time. It is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalState {
    worklist: VecDeque<String>,
    queued: HashSet<String>,
    processed: HashSet<String>,
    found: HashSet<String>,
}

impl TraversalState {
    /// Creates an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh state whose worklist holds only the root sitemap
    pub fn seeded(root_url: &str) -> Self {
        let mut state = Self::new();
        state.enqueue(root_url);
        state
    }

    /// Rebuilds a state from its persisted parts
    ///
    /// Worklist entries that repeat or that are already processed are dropped
    /// so the loaded state satisfies the same invariants as a live one.
    pub fn from_parts<W, P, F>(worklist: W, processed: P, found: F) -> Self
    where
        W: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
        F: IntoIterator<Item = String>,
    {
        let mut state = Self {
            processed: processed.into_iter().collect(),
            found: found.into_iter().collect(),
            ..Self::default()
        };

        for url in worklist {
            if !state.enqueue(&url) {
                tracing::debug!("Dropping duplicate or processed worklist entry: {}", url);
            }
        }

        state
    }

    /// Appends a sitemap to the tail of the worklist
    ///
    /// Returns false (and does nothing) if the sitemap is already queued or
    /// already processed.
    pub fn enqueue(&mut self, url: &str) -> bool {
        if self.processed.contains(url) || self.queued.contains(url) {
            return false;
        }

        self.queued.insert(url.to_string());
        self.worklist.push_back(url.to_string());
        true
    }

    /// Returns the sitemap at the head of the worklist without removing it
    pub fn front(&self) -> Option<&str> {
        self.worklist.front().map(String::as_str)
    }

    /// Removes and returns the sitemap at the head of the worklist
    pub fn pop_front(&mut self) -> Option<String> {
        let url = self.worklist.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    /// Records a sitemap as successfully fetched and classified
    pub fn mark_processed(&mut self, url: &str) -> bool {
        self.processed.insert(url.to_string())
    }

    pub fn is_processed(&self, url: &str) -> bool {
        self.processed.contains(url)
    }

    /// Adds a page URL to the found set, returning true if it was new
    pub fn record_found(&mut self, url: &str) -> bool {
        if self.found.contains(url) {
            return false;
        }
        self.found.insert(url.to_string())
    }

    pub fn found_count(&self) -> usize {
        self.found.len()
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn pending_count(&self) -> usize {
        self.worklist.len()
    }

    pub fn is_worklist_empty(&self) -> bool {
        self.worklist.is_empty()
    }

    /// Worklist entries in queue order
    pub fn worklist(&self) -> impl Iterator<Item = &str> {
        self.worklist.iter().map(String::as_str)
    }

    /// Processed sitemaps in lexicographic order
    pub fn sorted_processed(&self) -> Vec<&str> {
        sorted(&self.processed)
    }

    /// Found URLs in lexicographic order
    pub fn sorted_found(&self) -> Vec<&str> {
        sorted(&self.found)
    }
}

fn sorted(set: &HashSet<String>) -> Vec<&str> {
    let mut items: Vec<&str> = set.iter().map(String::as_str).collect();
    items.sort_unstable();
    items
}
