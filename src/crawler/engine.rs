//! Traversal engine - main sitemap walk orchestration
//!
//! This module contains the main loop that coordinates a run:
//! - Loading a checkpoint or seeding a fresh worklist
//! - Fetching and classifying one sitemap at a time, in queue order
//! - Enqueueing child sitemaps and collecting page URLs
//! - Enforcing the URL limit
//! - Handling stop signals and checkpointing
//! - Writing the final output

use crate::crawler::fetcher::{Fetch, FetchError, FetchErrorKind};
use crate::crawler::parser::SitemapDocument;
use crate::crawler::shutdown::{next_stop_signal, StopSignal};
use crate::output::{write_url_list, RunStatistics};
use crate::state::{EngineStatus, StopReason, TraversalState};
use crate::storage::{CheckpointError, CheckpointStore};
use crate::SitemapError;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;

/// Settings for a single run
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Root sitemap (or sitemap index) URL
    pub root_url: String,

    /// Where the found URLs are written at the end of the run
    pub output_path: PathBuf,

    /// Cap on the number of distinct URLs collected
    pub limit: Option<NonZeroUsize>,

    /// Start from the checkpoint instead of the root URL
    pub resume: bool,

    /// Save the checkpoint after every N worklist items (0 disables)
    pub checkpoint_every: u32,

    /// Delete the checkpoint when the worklist is exhausted
    pub remove_checkpoint_on_completion: bool,
}

impl EngineOptions {
    pub fn new(root_url: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            root_url: root_url.into(),
            output_path: output_path.into(),
            limit: None,
            resume: false,
            checkpoint_every: 1,
            remove_checkpoint_on_completion: false,
        }
    }
}

/// Whether the loop may keep going after a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    LimitReached,
}

/// Breadth-first sitemap traversal engine
///
/// The engine exclusively owns the traversal state for the duration of a run.
/// `run` is meant to be called once per engine.
pub struct Engine<F> {
    options: EngineOptions,
    fetcher: F,
    store: CheckpointStore,
    state: TraversalState,
    status: EngineStatus,
    stop_rx: Option<UnboundedReceiver<StopSignal>>,
    failures: usize,
    items_since_checkpoint: u32,
}

impl<F: Fetch> Engine<F> {
    /// Creates a new engine
    ///
    /// # Arguments
    ///
    /// * `options` - Run settings
    /// * `fetcher` - Source of sitemap documents
    /// * `store` - Checkpoint location
    pub fn new(options: EngineOptions, fetcher: F, store: CheckpointStore) -> Self {
        Self {
            options,
            fetcher,
            store,
            state: TraversalState::new(),
            status: EngineStatus::Idle,
            stop_rx: None,
            failures: 0,
            items_since_checkpoint: 0,
        }
    }

    /// Attaches the channel stop signals arrive on
    pub fn with_stop_signals(mut self, stop_rx: UnboundedReceiver<StopSignal>) -> Self {
        self.stop_rx = Some(stop_rx);
        self
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs the traversal
    ///
    /// The loop stops when the worklist is empty, the limit is reached, or a
    /// stop signal arrives. The first two fall through to finalization (save
    /// the checkpoint, write the output). A signal while running saves the
    /// checkpoint and returns [`StopReason::Interrupted`] without writing the
    /// output; a signal while idle or during finalization returns
    /// [`StopReason::Aborted`] without saving anything.
    ///
    /// Fetch, parse, checkpoint, and output failures are logged and never
    /// returned; only a failure to run the finalization worker is.
    pub async fn run(&mut self) -> Result<RunStatistics, SitemapError> {
        let start = Instant::now();

        if let Some(signal) = self.pending_stop_signal() {
            let reason = self.on_stop_signal(signal);
            return Ok(self.statistics(reason, start));
        }

        self.state = self.initial_state();
        self.failures = 0;
        self.items_since_checkpoint = 0;
        self.set_status(EngineStatus::Running);
        tracing::info!("Starting sitemap processing...");

        let reason = loop {
            if let Some(signal) = self.pending_stop_signal() {
                let reason = self.on_stop_signal(signal);
                return Ok(self.statistics(reason, start));
            }

            if self.limit_reached() {
                tracing::info!("URL limit ({}) reached. Stopping.", self.limit_display());
                break StopReason::LimitReached;
            }

            let Some(url) = self.state.front().map(str::to_string) else {
                tracing::info!("Sitemap queue is empty, processing complete");
                break StopReason::Exhausted;
            };

            if self.state.is_processed(&url) {
                self.state.pop_front();
                tracing::info!("Skipping already processed sitemap: {}", url);
                continue;
            }

            tracing::info!("Processing sitemap: {}", url);

            // The URL stays at the head of the worklist until the fetch
            // settles, so an interrupt saves the state as of the last item.
            let fetched = tokio::select! {
                biased;
                Some(signal) = next_stop_signal(&mut self.stop_rx) => {
                    let reason = self.on_stop_signal(signal);
                    return Ok(self.statistics(reason, start));
                }
                result = self.fetcher.fetch(&url) => result,
            };

            self.state.pop_front();
            let flow = self.apply(&url, fetched);
            self.after_item();

            if flow == Flow::LimitReached {
                break StopReason::LimitReached;
            }
        };

        self.set_status(EngineStatus::Stopping);
        tracing::info!(
            "Finished processing in {:.2} seconds.",
            start.elapsed().as_secs_f64()
        );

        let finalize = self.spawn_finalize(reason)?;
        tokio::select! {
            biased;
            Some(signal) = next_stop_signal(&mut self.stop_rx) => {
                let reason = self.on_stop_signal(signal);
                return Ok(self.statistics(reason, start));
            }
            done = finalize => done?,
        }

        self.set_status(EngineStatus::Terminated);
        Ok(self.statistics(reason, start))
    }

    /// Builds the starting state for the run
    ///
    /// Any checkpoint load failure falls back to a fresh state seeded with the
    /// root URL.
    fn initial_state(&self) -> TraversalState {
        let root = self.options.root_url.as_str();

        if !self.options.resume {
            tracing::info!("Resume flag not set, starting fresh.");
            return TraversalState::seeded(root);
        }

        let path = self.store.path().display();
        match self.store.load() {
            Ok(mut state) => {
                tracing::info!("Resumed state from {}:", path);
                tracing::info!("  Queue size: {}", state.pending_count());
                tracing::info!("  Processed sitemaps: {}", state.processed_count());
                tracing::info!("  Found URLs: {}", state.found_count());

                if state.is_worklist_empty() && !state.is_processed(root) {
                    tracing::info!("State file queue empty, initializing with root sitemap URL.");
                    state.enqueue(root);
                }

                state
            }
            Err(CheckpointError::NotFound(_)) => {
                tracing::info!("State file not found at {}, starting fresh.", path);
                TraversalState::seeded(root)
            }
            Err(e) => {
                tracing::info!("Error loading state from {}: {}", path, e);
                tracing::info!("Starting fresh.");
                TraversalState::seeded(root)
            }
        }
    }

    /// Applies one fetch result to the state
    fn apply(&mut self, url: &str, fetched: Result<SitemapDocument, FetchError>) -> Flow {
        let document = match fetched {
            Ok(document) => document,
            Err(e) => {
                self.failures += 1;
                match e.kind() {
                    FetchErrorKind::Transport => {
                        tracing::warn!("Failed to fetch {}: {}. Skipping.", url, e)
                    }
                    FetchErrorKind::Parse => {
                        tracing::warn!("Failed to parse {}: {}. Skipping.", url, e)
                    }
                }
                return Flow::Continue;
            }
        };

        self.state.mark_processed(url);

        if document.is_index() {
            self.enqueue_children(document.locations());
            Flow::Continue
        } else {
            self.collect_urls(document.locations())
        }
    }

    /// Appends child sitemaps that are neither processed nor already queued
    fn enqueue_children(&mut self, locations: &[String]) {
        tracing::info!("  Sitemap index detected. Extracting sub-sitemaps...");

        let added = locations
            .iter()
            .filter(|loc| self.state.enqueue(loc))
            .count();

        tracing::info!("  Added {} new sitemaps to the queue.", added);
    }

    /// Collects page URLs in document order, stopping at the limit
    fn collect_urls(&mut self, locations: &[String]) -> Flow {
        tracing::info!("  Regular sitemap detected. Extracting URLs...");

        let mut added = 0;
        let mut flow = Flow::Continue;

        for loc in locations {
            if self.limit_reached() {
                tracing::info!(
                    "  URL limit ({}) reached during URL extraction.",
                    self.limit_display()
                );
                flow = Flow::LimitReached;
                break;
            }

            if self.state.record_found(loc) {
                added += 1;
            }
        }

        tracing::info!("  Found {} new URLs.", added);
        flow
    }

    fn limit_reached(&self) -> bool {
        self.options
            .limit
            .is_some_and(|limit| self.state.found_count() >= limit.get())
    }

    fn limit_display(&self) -> usize {
        self.options.limit.map_or(0, NonZeroUsize::get)
    }

    /// Periodic checkpointing between worklist items
    fn after_item(&mut self) {
        let every = self.options.checkpoint_every;
        if every == 0 {
            return;
        }

        self.items_since_checkpoint += 1;
        if self.items_since_checkpoint >= every {
            self.items_since_checkpoint = 0;
            self.save_checkpoint();
        }
    }

    /// Saves the checkpoint, logging (not returning) any failure
    fn save_checkpoint(&self) -> bool {
        match self.store.save(&self.state) {
            Ok(()) => {
                tracing::debug!("Saved state to {}", self.store.path().display());
                true
            }
            Err(e) => {
                tracing::error!(
                    "Error saving state file {}: {}",
                    self.store.path().display(),
                    e
                );
                false
            }
        }
    }

    /// Decides what a stop signal means in the current lifecycle state
    ///
    /// Only a running engine snapshots its state; an idle or stopping one is
    /// abandoned on the spot.
    fn on_stop_signal(&mut self, signal: StopSignal) -> StopReason {
        if self.status.is_running() {
            self.interrupt(signal);
            StopReason::Interrupted
        } else {
            tracing::info!(
                "Signal {} received while {}. Exiting immediately.",
                signal,
                self.status
            );
            StopReason::Aborted
        }
    }

    /// Fast-path stop: snapshot the state and leave the output untouched
    fn interrupt(&mut self, signal: StopSignal) {
        tracing::info!("Signal {} received. Saving state...", signal);
        self.set_status(EngineStatus::Stopping);

        if self.save_checkpoint() {
            tracing::info!("Saved state to {}", self.store.path().display());
        }
    }

    fn pending_stop_signal(&mut self) -> Option<StopSignal> {
        self.stop_rx.as_mut().and_then(|rx| rx.try_recv().ok())
    }

    /// Starts the final save and output write on a detached thread
    ///
    /// The returned receiver resolves once both are done. A detached thread
    /// is used rather than the runtime's blocking pool: an abandoned
    /// finalization (for instance a write stuck on a full disk or a pipe)
    /// must not hold up runtime shutdown.
    fn spawn_finalize(&self, reason: StopReason) -> Result<oneshot::Receiver<()>, SitemapError> {
        let store = self.store.clone();
        let state = self.state.clone();
        let output = self.options.output_path.clone();
        let remove_checkpoint = self.options.remove_checkpoint_on_completion
            && reason == StopReason::Exhausted
            && state.is_worklist_empty();

        let (done_tx, done_rx) = oneshot::channel();
        std::thread::Builder::new()
            .name("sitemap-finalize".to_string())
            .spawn(move || {
                persist_and_write(&store, &state, &output, remove_checkpoint);
                // The engine may have stopped waiting
                let _ = done_tx.send(());
            })?;

        Ok(done_rx)
    }

    fn set_status(&mut self, next: EngineStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal engine transition {} -> {}",
            self.status,
            next
        );
        tracing::trace!("Engine {} -> {}", self.status, next);
        self.status = next;
    }

    fn statistics(&self, reason: StopReason, start: Instant) -> RunStatistics {
        RunStatistics::from_state(reason, &self.state, self.failures, start.elapsed())
    }
}

/// Persists the final checkpoint and writes the output file
///
/// A checkpoint failure does not prevent the output from being written.
fn persist_and_write(
    store: &CheckpointStore,
    state: &TraversalState,
    output: &Path,
    remove_checkpoint: bool,
) {
    let state_path = store.path().display();

    if remove_checkpoint {
        match store.remove() {
            Ok(true) => tracing::info!("Removed state file: {}", state_path),
            Ok(false) => {}
            Err(e) => tracing::error!("Error removing state file {}: {}", state_path, e),
        }
    } else {
        match store.save(state) {
            Ok(()) => tracing::info!("Saved state to {}", state_path),
            Err(e) => tracing::error!("Error saving state file {}: {}", state_path, e),
        }
    }

    match write_url_list(output, state.sorted_found()) {
        Ok(count) => tracing::info!("Wrote {} URLs to {}", count, output.display()),
        Err(e) => tracing::error!(
            "Error writing to output file {}: {}",
            output.display(),
            e
        ),
    }
}
