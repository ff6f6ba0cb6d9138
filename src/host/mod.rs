//! Collaborator contracts: the editor host that owns documents and renders
//! decorations.
//!
//! The review engine never touches files or UI directly. It reads and edits
//! document text through [`DocumentHost`] and paints line highlights through
//! [`DecorationHost`]. [`MemoryHost`] keeps documents in memory (tests and
//! embedding); [`FsHost`] backs them with files on disk (the CLI).

pub mod buffers;
pub mod fs;
pub mod memory;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::editor::LineEditError;
use crate::models::{DecorationKind, DocumentId, LineRange, TextEdit};

pub use fs::FsHost;
pub use memory::{MemoryHost, RecordingDecorations};

/// Errors reported by a document host.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("document is not open: {0}")]
    NotFound(DocumentId),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("edit rejected: {0}")]
    Edit(#[from] LineEditError),

    #[error("host rejected the operation: {0}")]
    Rejected(String),
}

/// Callback run when a document closes.
pub type CloseHandler = Arc<dyn Fn(&DocumentId) + Send + Sync>;

/// Disposable registration handle.
///
/// Dropping it (or calling [`Subscription::dispose`]) unregisters whatever it
/// was returned for.
#[must_use = "dropping a Subscription unregisters it immediately"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + Send + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A handle with nothing to unregister.
    pub fn empty() -> Self {
        Self { dispose: None }
    }

    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

/// Document access provided by the editor host.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Open (or focus) the document for `path`.
    ///
    /// Paths that do not exist open as empty `untitled:` documents.
    async fn open(&self, path: &Path) -> Result<DocumentId, HostError>;

    /// Current text of an open document.
    fn text(&self, doc: &DocumentId) -> Result<String, HostError>;

    /// Replace a line range.
    async fn apply_edit(&self, doc: &DocumentId, edit: TextEdit) -> Result<(), HostError>;

    /// Apply several edits as one batch.
    ///
    /// Edits must be ordered bottom-up so each one leaves the positions of
    /// the ones after it untouched.
    async fn apply_edits(&self, doc: &DocumentId, edits: Vec<TextEdit>) -> Result<(), HostError> {
        for edit in edits {
            self.apply_edit(doc, edit).await?;
        }
        Ok(())
    }

    async fn save(&self, doc: &DocumentId) -> Result<(), HostError>;

    async fn close(&self, doc: &DocumentId) -> Result<(), HostError>;

    /// Run `handler` when `doc` closes, until the subscription is dropped.
    fn on_did_close(&self, doc: &DocumentId, handler: CloseHandler) -> Subscription;
}

/// Rendering surface for review markers. Fire-and-forget.
pub trait DecorationHost: Send + Sync {
    /// Replace all highlights of `kind` on `doc`.
    fn set_decorations(&self, doc: &DocumentId, kind: DecorationKind, ranges: &[LineRange]);

    /// Toggle the host's "document has pending changes" flag.
    fn set_has_changes(&self, _has_changes: bool) {}

    /// Ask the host to re-query code lenses.
    fn refresh_code_lenses(&self) {}
}

/// Decoration host for headless use; draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDecorations;

impl DecorationHost for NoDecorations {
    fn set_decorations(&self, _doc: &DocumentId, _kind: DecorationKind, _ranges: &[LineRange]) {}
}
