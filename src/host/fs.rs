//! Filesystem host: documents are loaded from and saved to real files.

use std::path::Path;

use async_trait::async_trait;

use super::buffers::Buffers;
use super::{CloseHandler, DocumentHost, HostError, Subscription};
use crate::models::{DocumentId, TextEdit};

/// Document host backed by the local filesystem.
///
/// Open documents are edited in memory; `save` writes the buffer back,
/// creating the file (and missing parent directories) for untitled documents.
#[derive(Default)]
pub struct FsHost {
    buffers: Buffers,
}

impl FsHost {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentHost for FsHost {
    async fn open(&self, path: &Path) -> Result<DocumentId, HostError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => {
                let doc = DocumentId::file(path);
                self.buffers.open_with(&doc, &text);
                Ok(doc)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let doc = DocumentId::untitled(path);
                self.buffers.open_with(&doc, "");
                Ok(doc)
            }
            Err(e) => Err(HostError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn text(&self, doc: &DocumentId) -> Result<String, HostError> {
        self.buffers.text(doc)
    }

    async fn apply_edit(&self, doc: &DocumentId, edit: TextEdit) -> Result<(), HostError> {
        self.buffers.apply(doc, std::slice::from_ref(&edit))
    }

    async fn apply_edits(&self, doc: &DocumentId, edits: Vec<TextEdit>) -> Result<(), HostError> {
        self.buffers.apply(doc, &edits)
    }

    async fn save(&self, doc: &DocumentId) -> Result<(), HostError> {
        let text = self.buffers.text(doc)?;
        let path = doc.path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HostError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| HostError::Io { path, source: e })
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
