//! In-memory host: documents and "disk" live in process memory.
//!
//! Useful for embedding the engine in tests or in hosts that manage their
//! own persistence. Failure switches let callers exercise the error paths
//! of the review controller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::buffers::{lock, Buffers};
use super::{CloseHandler, DecorationHost, DocumentHost, HostError, Subscription};
use crate::models::{DecorationKind, DocumentId, LineRange, TextEdit};

/// Document host backed entirely by memory.
#[derive(Default)]
pub struct MemoryHost {
    buffers: Buffers,
    disk: Mutex<HashMap<PathBuf, String>>,
    saves: AtomicUsize,
    fail_edits: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file on the simulated disk.
    pub fn with_file(self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        lock(&self.disk).insert(path.into(), text.into());
        self
    }

    /// Text last saved for `path`.
    pub fn disk_text(&self, path: &Path) -> Option<String> {
        lock(&self.disk).get(path).cloned()
    }

    pub fn is_open(&self, doc: &DocumentId) -> bool {
        self.buffers.is_open(doc)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Live close subscriptions.
    pub fn close_handler_count(&self) -> usize {
        self.buffers.handler_count()
    }

    /// Make every following edit fail until switched off.
    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    /// Make every following save fail until switched off.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Simulate the user closing a document without going through
    /// [`DocumentHost::close`] bookkeeping (no error if already closed).
    pub fn user_closed(&self, doc: &DocumentId) {
        self.buffers.close(doc);
    }

    fn check_edits(&self) -> Result<(), HostError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(HostError::Rejected("edits are disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentHost for MemoryHost {
    async fn open(&self, path: &Path) -> Result<DocumentId, HostError> {
        let stored = lock(&self.disk).get(path).cloned();
        let (doc, text) = match stored {
            Some(text) => (DocumentId::file(path), text),
            None => (DocumentId::untitled(path), String::new()),
        };
        self.buffers.open_with(&doc, &text);
        Ok(doc)
    }

    fn text(&self, doc: &DocumentId) -> Result<String, HostError> {
        self.buffers.text(doc)
    }

    async fn apply_edit(&self, doc: &DocumentId, edit: TextEdit) -> Result<(), HostError> {
        self.check_edits()?;
        self.buffers.apply(doc, std::slice::from_ref(&edit))
    }

    async fn apply_edits(&self, doc: &DocumentId, edits: Vec<TextEdit>) -> Result<(), HostError> {
        self.check_edits()?;
        self.buffers.apply(doc, &edits)
    }

    async fn save(&self, doc: &DocumentId) -> Result<(), HostError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(HostError::Io {
                path: doc.path(),
                source: std::io::Error::other("disk full"),
            });
        }
        let text = self.buffers.text(doc)?;
        lock(&self.disk).insert(doc.path(), text);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self, doc: &DocumentId) -> Result<(), HostError> {
        if self.buffers.close(doc) {
            Ok(())
        } else {
            Err(HostError::NotFound(doc.clone()))
        }
    }

    fn on_did_close(&self, doc: &DocumentId, handler: CloseHandler) -> Subscription {
        self.buffers.subscribe(doc, handler)
    }
}

/// Decoration host that remembers the last ranges painted per document.
#[derive(Default)]
pub struct RecordingDecorations {
    ranges: Mutex<HashMap<(DocumentId, DecorationKind), Vec<LineRange>>>,
    has_changes: AtomicBool,
    lens_refreshes: AtomicUsize,
}

impl RecordingDecorations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self, doc: &DocumentId, kind: DecorationKind) -> Vec<LineRange> {
        lock(&self.ranges)
            .get(&(doc.clone(), kind))
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes.load(Ordering::SeqCst)
    }

    pub fn lens_refreshes(&self) -> usize {
        self.lens_refreshes.load(Ordering::SeqCst)
    }
}

impl DecorationHost for RecordingDecorations {
    fn set_decorations(&self, doc: &DocumentId, kind: DecorationKind, ranges: &[LineRange]) {
        lock(&self.ranges).insert((doc.clone(), kind), ranges.to_vec());
    }

    fn set_has_changes(&self, has_changes: bool) {
        self.has_changes.store(has_changes, Ordering::SeqCst);
    }

    fn refresh_code_lenses(&self) {
        self.lens_refreshes.fetch_add(1, Ordering::SeqCst);
    }
}
