//! Review controller: puts proposed file contents under review and applies
//! the user's accept/reject decisions to the live document.
//!
//! While a document is under review its buffer holds the *preview*: original
//! and proposed lines interleaved in diff order, with removed lines marked by
//! a deletion highlight and added lines by an insertion highlight. Each
//! decision edits the buffer first and only then updates the pending change
//! store, so a failed host edit leaves the review exactly as it was.
//!
//! Operations on one document are serialized; different documents proceed
//! independently. A document closing mid-operation is not an error: the
//! pending operation finds its entry gone and does nothing.

pub mod decision;
pub mod events;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{OwnedMutexGuard, broadcast};
use tracing::{debug, info, warn};

use crate::diff::{DiffOptions, ReviewPlan};
use crate::editor::split_lines;
use crate::host::buffers::lock;
use crate::host::{CloseHandler, DecorationHost, DocumentHost, HostError, Subscription};
use crate::models::{CodeLens, Decision, DecorationKind, DocumentId, LineRange, TextEdit};
use crate::store::{FileChangeSet, PendingChangeStore, ResolveOutcome};

pub use decision::{HunkResolution, batch_edits, resolution};
pub use events::{ReviewEvent, ReviewEventKind};

const EVENT_CAPACITY: usize = 64;

/// Behavior switches for [`ReviewController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOptions {
    pub diff: DiffOptions,
    /// Save the document (or close an untitled one that was rejected) once
    /// its last hunk is resolved.
    pub save_on_resolve: bool,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            diff: DiffOptions::default(),
            save_on_resolve: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("failed to {operation} {target}")]
    Host {
        operation: &'static str,
        target: String,
        #[source]
        source: HostError,
    },
}

/// Result of [`ReviewController::open_review`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OpenOutcome {
    /// The preview was written and `hunks` changes await a decision.
    Reviewing { doc: DocumentId, hunks: usize },
    /// The proposal matches the document; nothing is under review.
    Unchanged { doc: DocumentId },
}

impl OpenOutcome {
    pub fn doc(&self) -> &DocumentId {
        match self {
            OpenOutcome::Reviewing { doc, .. } | OpenOutcome::Unchanged { doc } => doc,
        }
    }
}

/// Result of an accept/reject request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The hunk was resolved; `remaining` hunks are still pending.
    Applied { remaining: usize },
    /// The document's last pending hunk was resolved.
    Completed,
    /// Nothing to do. Raised by UI races, never an error.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The document is not under review (never was, or already resolved or closed).
    NoReview,
    /// The hunk index does not name a pending hunk.
    StaleIndex { index: usize, len: usize },
    /// No pending hunk covers the line.
    NoHunkAtLine(usize),
}

struct Inner {
    documents: Arc<dyn DocumentHost>,
    decorations: Arc<dyn DecorationHost>,
    options: ReviewOptions,
    store: Mutex<PendingChangeStore>,
    /// One close subscription per document under review.
    subscriptions: Mutex<HashMap<DocumentId, Subscription>>,
    op_locks: Mutex<HashMap<DocumentId, Arc<tokio::sync::Mutex<()>>>>,
    events: broadcast::Sender<ReviewEvent>,
}

/// Drives reviews against a document host and a decoration host.
///
/// Cheap to clone; clones share the same pending changes.
#[derive(Clone)]
pub struct ReviewController {
    inner: Arc<Inner>,
}

impl ReviewController {
    pub fn new(
        documents: Arc<dyn DocumentHost>,
        decorations: Arc<dyn DecorationHost>,
        options: ReviewOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                documents,
                decorations,
                options,
                store: Mutex::new(PendingChangeStore::new()),
                subscriptions: Mutex::new(HashMap::new()),
                op_locks: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    pub fn options(&self) -> &ReviewOptions {
        &self.inner.options
    }

    /// Stream of review lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<ReviewEvent> {
        self.inner.events.subscribe()
    }

    /// Put `proposed` under review as the new content of `path`.
    ///
    /// A document already under review is diffed against its stored original,
    /// and the new proposal replaces the old one.
    pub async fn open_review(
        &self,
        path: &Path,
        proposed: &str,
    ) -> Result<OpenOutcome, ReviewError> {
        let outcome = self.open_locked(path, proposed).await;
        if let Ok(outcome) = &outcome {
            self.inner.prune_lock(outcome.doc());
        }
        outcome
    }

    async fn open_locked(&self, path: &Path, proposed: &str) -> Result<OpenOutcome, ReviewError> {
        let inner = &self.inner;
        let doc = inner
            .documents
            .open(path)
            .await
            .map_err(|source| inner.host_failure("open", path.display(), source))?;
        let _guard = inner.op_lock(&doc).await;

        let current = inner
            .documents
            .text(&doc)
            .map_err(|source| inner.host_failure("read", &doc, source))?;
        let previous = lock(&inner.store)
            .get(&doc)
            .map(|entry| entry.original_content.clone());
        let original = previous.clone().unwrap_or_else(|| current.clone());
        let plan = ReviewPlan::build(&original, proposed, &inner.options.diff);

        if plan.is_unchanged() {
            if previous.is_some() {
                // The new proposal withdraws every pending change.
                inner
                    .replace_buffer(&doc, &current, split_lines(&original))
                    .await?;
                inner.discard(&doc);
                inner.emit(ReviewEventKind::Rejected, &doc);
            }
            debug!(doc = %doc, "proposal matches the document, nothing to review");
            return Ok(OpenOutcome::Unchanged { doc });
        }

        inner.replace_buffer(&doc, &current, plan.preview).await?;
        let hunks = plan.hunks.len();
        lock(&inner.store).register(doc.clone(), original, plan.modified, plan.hunks);
        self.watch_close(&doc);
        inner.render(&doc);
        inner.emit(ReviewEventKind::Added, &doc);
        info!(doc = %doc, hunks, eol = %plan.eol, "review opened");

        Ok(OpenOutcome::Reviewing { doc, hunks })
    }

    pub async fn accept_hunk(
        &self,
        doc: &DocumentId,
        index: usize,
    ) -> Result<Resolution, ReviewError> {
        self.resolve_hunk(doc, index, Decision::Accept).await
    }

    pub async fn reject_hunk(
        &self,
        doc: &DocumentId,
        index: usize,
    ) -> Result<Resolution, ReviewError> {
        self.resolve_hunk(doc, index, Decision::Reject).await
    }

    /// Resolve the hunk at `index` of the current numbering.
    pub async fn resolve_hunk(
        &self,
        doc: &DocumentId,
        index: usize,
        decision: Decision,
    ) -> Result<Resolution, ReviewError> {
        let result = {
            let _guard = self.inner.op_lock(doc).await;
            self.inner.resolve_locked(doc, index, decision).await
        };
        self.inner.prune_lock(doc);
        result
    }

    pub async fn accept_at(&self, doc: &DocumentId, line: usize) -> Result<Resolution, ReviewError> {
        self.resolve_at(doc, line, Decision::Accept).await
    }

    pub async fn reject_at(&self, doc: &DocumentId, line: usize) -> Result<Resolution, ReviewError> {
        self.resolve_at(doc, line, Decision::Reject).await
    }

    /// Resolve whichever hunk covers preview `line`.
    pub async fn resolve_at(
        &self,
        doc: &DocumentId,
        line: usize,
        decision: Decision,
    ) -> Result<Resolution, ReviewError> {
        let result = {
            let _guard = self.inner.op_lock(doc).await;
            let found = lock(&self.inner.store)
                .get(doc)
                .map(|entry| entry.hunk_at_line(line));
            match found {
                None => Ok(Resolution::Skipped(SkipReason::NoReview)),
                Some(None) => {
                    debug!(doc = %doc, line, "no pending hunk at line");
                    Ok(Resolution::Skipped(SkipReason::NoHunkAtLine(line)))
                }
                Some(Some(index)) => self.inner.resolve_locked(doc, index, decision).await,
            }
        };
        self.inner.prune_lock(doc);
        result
    }

    pub async fn accept_all(&self, doc: &DocumentId) -> Result<Resolution, ReviewError> {
        self.resolve_all(doc, Decision::Accept).await
    }

    pub async fn reject_all(&self, doc: &DocumentId) -> Result<Resolution, ReviewError> {
        self.resolve_all(doc, Decision::Reject).await
    }

    /// Resolve every pending hunk of `doc` in one batch.
    pub async fn resolve_all(
        &self,
        doc: &DocumentId,
        decision: Decision,
    ) -> Result<Resolution, ReviewError> {
        let result = {
            let _guard = self.inner.op_lock(doc).await;
            self.inner.resolve_all_locked(doc, decision).await
        };
        self.inner.prune_lock(doc);
        result
    }

    pub async fn accept_file(&self, path: &Path) -> Result<Resolution, ReviewError> {
        self.resolve_file(path, Decision::Accept).await
    }

    pub async fn reject_file(&self, path: &Path) -> Result<Resolution, ReviewError> {
        self.resolve_file(path, Decision::Reject).await
    }

    /// Resolve every pending hunk of the document reviewing `path`.
    pub async fn resolve_file(
        &self,
        path: &Path,
        decision: Decision,
    ) -> Result<Resolution, ReviewError> {
        let doc = lock(&self.inner.store)
            .ids()
            .into_iter()
            .find(|doc| doc.path() == path);
        match doc {
            Some(doc) => self.resolve_all(&doc, decision).await,
            None => {
                debug!(path = %path.display(), "no review for path");
                Ok(Resolution::Skipped(SkipReason::NoReview))
            }
        }
    }

    pub async fn accept_all_files(&self) -> Result<usize, ReviewError> {
        self.resolve_all_files(Decision::Accept).await
    }

    pub async fn reject_all_files(&self) -> Result<usize, ReviewError> {
        self.resolve_all_files(Decision::Reject).await
    }

    /// Resolve every document under review, in the order reviews were opened.
    ///
    /// Returns how many documents completed. Stops at the first host failure.
    pub async fn resolve_all_files(&self, decision: Decision) -> Result<usize, ReviewError> {
        let docs = lock(&self.inner.store).ids();
        let mut completed = 0;
        for doc in docs {
            if self.resolve_all(&doc, decision).await? == Resolution::Completed {
                completed += 1;
            }
        }
        Ok(completed)
    }

    /// Save `doc` through the document host.
    ///
    /// Completion saves on its own when `save_on_resolve` is set; this is the
    /// retry path after that save failed.
    pub async fn save(&self, doc: &DocumentId) -> Result<(), ReviewError> {
        self.inner
            .documents
            .save(doc)
            .await
            .map_err(|source| self.inner.host_failure("save", doc, source))
    }

    /// Snapshot of the pending changes for `doc`.
    pub fn change_set(&self, doc: &DocumentId) -> Option<FileChangeSet> {
        lock(&self.inner.store).get(doc).cloned()
    }

    /// Documents under review, in the order reviews were opened.
    pub fn pending_documents(&self) -> Vec<DocumentId> {
        lock(&self.inner.store).ids()
    }

    pub fn is_reviewing(&self, doc: &DocumentId) -> bool {
        lock(&self.inner.store).contains(doc)
    }

    pub fn code_lenses(&self, doc: &DocumentId) -> Vec<CodeLens> {
        lock(&self.inner.store)
            .get(doc)
            .map(FileChangeSet::code_lenses)
            .unwrap_or_default()
    }

    /// Repaint `doc`'s highlights and the has-changes flag, e.g. when it
    /// becomes the active editor.
    pub fn redraw(&self, doc: &DocumentId) {
        self.inner.render(doc);
    }

    /// Drop every subscription and pending change.
    ///
    /// Buffers are left as they are.
    pub fn shutdown(&self) {
        let inner = &self.inner;
        let docs = lock(&inner.store).ids();
        lock(&inner.store).clear();
        let subscriptions: Vec<Subscription> = lock(&inner.subscriptions)
            .drain()
            .map(|(_, subscription)| subscription)
            .collect();
        drop(subscriptions);
        lock(&inner.op_locks).clear();
        for doc in &docs {
            inner.render(doc);
        }
        info!(documents = docs.len(), "review controller shut down");
    }

    fn watch_close(&self, doc: &DocumentId) {
        if lock(&self.inner.subscriptions).contains_key(doc) {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        let handler: CloseHandler = Arc::new(move |closed: &DocumentId| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_closed(closed);
            }
        });
        let subscription = self.inner.documents.on_did_close(doc, handler);
        lock(&self.inner.subscriptions).insert(doc.clone(), subscription);
    }
}

impl Inner {
    async fn op_lock(&self, doc: &DocumentId) -> OwnedMutexGuard<()> {
        let mutex = Arc::clone(lock(&self.op_locks).entry(doc.clone()).or_default());
        mutex.lock_owned().await
    }

    async fn resolve_locked(
        &self,
        doc: &DocumentId,
        index: usize,
        decision: Decision,
    ) -> Result<Resolution, ReviewError> {
        let hunk = {
            let store = lock(&self.store);
            let Some(entry) = store.get(doc) else {
                debug!(doc = %doc, index, %decision, "document is not under review");
                return Ok(Resolution::Skipped(SkipReason::NoReview));
            };
            match entry.hunks.get(index) {
                Some(hunk) => hunk.clone(),
                None => {
                    let len = entry.hunks.len();
                    debug!(doc = %doc, index, len, %decision, "stale hunk index");
                    return Ok(Resolution::Skipped(SkipReason::StaleIndex { index, len }));
                }
            }
        };

        let HunkResolution { edit, line_delta } = resolution(&hunk, decision);
        if let Some(edit) = edit {
            if let Err(source) = self.documents.apply_edit(doc, edit).await {
                return self.edit_failure(doc, source);
            }
        }

        let outcome = lock(&self.store).resolve(doc, index, line_delta);
        match outcome {
            ResolveOutcome::Missing => {
                debug!(doc = %doc, "document closed while resolving a hunk");
                Ok(Resolution::Skipped(SkipReason::NoReview))
            }
            ResolveOutcome::StaleIndex { index, len } => {
                Ok(Resolution::Skipped(SkipReason::StaleIndex { index, len }))
            }
            ResolveOutcome::Remaining(remaining) => {
                debug!(doc = %doc, index, %decision, remaining, "hunk resolved");
                self.render(doc);
                Ok(Resolution::Applied { remaining })
            }
            ResolveOutcome::Emptied => self.complete(doc, decision).await,
        }
    }

    async fn resolve_all_locked(
        &self,
        doc: &DocumentId,
        decision: Decision,
    ) -> Result<Resolution, ReviewError> {
        let hunks = lock(&self.store).get(doc).map(|entry| entry.hunks.clone());
        let Some(hunks) = hunks else {
            debug!(doc = %doc, %decision, "document is not under review");
            return Ok(Resolution::Skipped(SkipReason::NoReview));
        };

        let edits = batch_edits(&hunks, decision);
        if !edits.is_empty() {
            if let Err(source) = self.documents.apply_edits(doc, edits).await {
                return self.edit_failure(doc, source);
            }
        }

        if lock(&self.store).remove(doc).is_none() {
            debug!(doc = %doc, "document closed while resolving all hunks");
            return Ok(Resolution::Skipped(SkipReason::NoReview));
        }
        self.complete(doc, decision).await
    }

    /// Bookkeeping once a document has no pending hunks left.
    ///
    /// The entry is already gone when the save runs. A failed save is
    /// returned as an error and the decided text stays in the buffer;
    /// retry it with [`ReviewController::save`].
    async fn complete(
        &self,
        doc: &DocumentId,
        decision: Decision,
    ) -> Result<Resolution, ReviewError> {
        self.unwatch(doc);
        self.render(doc);
        self.emit(decision.into(), doc);
        info!(doc = %doc, %decision, "review completed");

        if !self.options.save_on_resolve {
            return Ok(Resolution::Completed);
        }
        let (operation, result) = if decision == Decision::Reject && doc.is_untitled() {
            ("close", self.documents.close(doc).await)
        } else {
            ("save", self.documents.save(doc).await)
        };
        match result {
            Ok(()) => Ok(Resolution::Completed),
            Err(HostError::NotFound(_)) => {
                debug!(doc = %doc, operation, "document closed before it could be written");
                Ok(Resolution::Skipped(SkipReason::NoReview))
            }
            Err(source) => Err(self.host_failure(operation, doc, source)),
        }
    }

    /// A host edit failed. If the document closed under the operation, the
    /// decision is dropped like any other close; otherwise it is an error.
    fn edit_failure(
        &self,
        doc: &DocumentId,
        source: HostError,
    ) -> Result<Resolution, ReviewError> {
        let closed = matches!(source, HostError::NotFound(_)) || !lock(&self.store).contains(doc);
        if !closed {
            return Err(self.host_failure("edit", doc, source));
        }
        debug!(doc = %doc, error = %source, "document closed while resolving");
        self.handle_closed(doc);
        Ok(Resolution::Skipped(SkipReason::NoReview))
    }

    fn handle_closed(&self, doc: &DocumentId) {
        let removed = lock(&self.store).remove(doc);
        let subscription = lock(&self.subscriptions).remove(doc);
        drop(subscription);
        if removed.is_some() {
            debug!(doc = %doc, "document closed during review, pending changes discarded");
            // The has-changes flag belongs to the active editor; leave it to `redraw`.
            self.paint(doc);
            self.emit(ReviewEventKind::Rejected, doc);
        }
        self.prune_lock(doc);
    }

    /// Forget `doc`'s operation lock once it has no review and nobody holds it.
    fn prune_lock(&self, doc: &DocumentId) {
        if lock(&self.store).contains(doc) {
            return;
        }
        let mut locks = lock(&self.op_locks);
        if locks.get(doc).is_some_and(|mutex| Arc::strong_count(mutex) == 1) {
            locks.remove(doc);
        }
    }

    fn discard(&self, doc: &DocumentId) {
        lock(&self.store).remove(doc);
        self.unwatch(doc);
        self.render(doc);
    }

    fn unwatch(&self, doc: &DocumentId) {
        let subscription = lock(&self.subscriptions).remove(doc);
        drop(subscription);
    }

    async fn replace_buffer(
        &self,
        doc: &DocumentId,
        current: &str,
        lines: Vec<String>,
    ) -> Result<(), ReviewError> {
        let whole = LineRange::new(0, split_lines(current).len());
        self.documents
            .apply_edit(doc, TextEdit::replace(whole, lines))
            .await
            .map_err(|source| self.host_failure("edit", doc, source))
    }

    fn render(&self, doc: &DocumentId) {
        let has_changes = self.paint(doc);
        self.decorations.set_has_changes(has_changes);
    }

    /// Repaint `doc`'s highlights and code lenses. Returns whether any
    /// highlight remains.
    fn paint(&self, doc: &DocumentId) -> bool {
        let (deletions, insertions) = {
            let store = lock(&self.store);
            match store.get(doc) {
                Some(entry) => (
                    entry.decoration_ranges(DecorationKind::Deletion),
                    entry.decoration_ranges(DecorationKind::Insertion),
                ),
                None => (Vec::new(), Vec::new()),
            }
        };
        let has_changes = !deletions.is_empty() || !insertions.is_empty();
        self.decorations
            .set_decorations(doc, DecorationKind::Deletion, &deletions);
        self.decorations
            .set_decorations(doc, DecorationKind::Insertion, &insertions);
        self.decorations.refresh_code_lenses();
        has_changes
    }

    fn emit(&self, kind: ReviewEventKind, doc: &DocumentId) {
        // No receivers is fine.
        let _ = self.events.send(ReviewEvent::new(kind, doc.clone()));
    }

    fn host_failure(
        &self,
        operation: &'static str,
        subject: impl std::fmt::Display,
        source: HostError,
    ) -> ReviewError {
        warn!(subject = %subject, operation, error = %source, "host operation failed");
        ReviewError::Host {
            operation,
            target: subject.to_string(),
            source,
        }
    }
}
