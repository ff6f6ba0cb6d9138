//! Open-document table and close-handler registry shared by the bundled hosts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{CloseHandler, HostError, Subscription};
use crate::editor::LineEditor;
use crate::models::{DocumentId, TextEdit};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct HandlerRegistry {
    next_id: u64,
    handlers: HashMap<u64, (DocumentId, CloseHandler)>,
}

/// Line buffers of open documents plus their close subscriptions.
#[derive(Default)]
pub struct Buffers {
    documents: Mutex<HashMap<DocumentId, LineEditor>>,
    handlers: Arc<Mutex<HandlerRegistry>>,
}

impl Buffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, doc: &DocumentId) -> bool {
        lock(&self.documents).contains_key(doc)
    }

    /// Open `doc` with `text` unless it is already open.
    pub fn open_with(&self, doc: &DocumentId, text: &str) {
        lock(&self.documents)
            .entry(doc.clone())
            .or_insert_with(|| LineEditor::detect(text));
    }

    pub fn text(&self, doc: &DocumentId) -> Result<String, HostError> {
        lock(&self.documents)
            .get(doc)
            .map(LineEditor::current)
            .ok_or_else(|| HostError::NotFound(doc.clone()))
    }

    /// Apply edits in order; on any failure the buffer is left untouched.
    pub fn apply(&self, doc: &DocumentId, edits: &[TextEdit]) -> Result<(), HostError> {
        let mut documents = lock(&self.documents);
        let editor = documents
            .get_mut(doc)
            .ok_or_else(|| HostError::NotFound(doc.clone()))?;
        let mut scratch = editor.clone();
        for edit in edits {
            scratch.apply(edit)?;
        }
        *editor = scratch;
        Ok(())
    }

    /// Drop the buffer and run the close handlers registered for `doc`.
    pub fn close(&self, doc: &DocumentId) -> bool {
        let was_open = lock(&self.documents).remove(doc).is_some();
        if was_open {
            self.notify_closed(doc);
        }
        was_open
    }

    pub fn subscribe(&self, doc: &DocumentId, handler: CloseHandler) -> Subscription {
        let id = {
            let mut registry = lock(&self.handlers);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.handlers.insert(id, (doc.clone(), handler));
            id
        };
        let registry = Arc::downgrade(&self.handlers);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).handlers.remove(&id);
            }
        })
    }

    /// Number of live close subscriptions.
    pub fn handler_count(&self) -> usize {
        lock(&self.handlers).handlers.len()
    }

    fn notify_closed(&self, doc: &DocumentId) {
        // Handlers may dispose their own subscription, so call them unlocked.
        let handlers: Vec<CloseHandler> = lock(&self.handlers)
            .handlers
            .values()
            .filter(|(target, _)| target == doc)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineRange;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn doc() -> DocumentId {
        DocumentId::from_uri("file:///a.txt")
    }

    #[test]
    fn failed_batch_leaves_buffer_untouched() {
        let buffers = Buffers::new();
        buffers.open_with(&doc(), "a\nb\nc");
        let edits = vec![
            TextEdit::delete(LineRange::new(2, 1)),
            TextEdit::delete(LineRange::new(5, 1)),
        ];
        assert!(buffers.apply(&doc(), &edits).is_err());
        assert_eq!(buffers.text(&doc()).unwrap(), "a\nb\nc");
    }

    #[test]
    fn close_runs_only_matching_handlers() {
        let buffers = Buffers::new();
        buffers.open_with(&doc(), "x");
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let _mine = buffers.subscribe(
            &doc(),
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let counter = Arc::clone(&hits);
        let _other = buffers.subscribe(
            &DocumentId::from_uri("file:///b.txt"),
            Arc::new(move |_| {
                counter.fetch_add(10, Ordering::SeqCst);
            }),
        );

        assert!(buffers.close(&doc()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!buffers.close(&doc()));
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let buffers = Buffers::new();
        let sub = buffers.subscribe(&doc(), Arc::new(|_| {}));
        assert_eq!(buffers.handler_count(), 1);
        drop(sub);
        assert_eq!(buffers.handler_count(), 0);
    }

    #[test]
    fn reopening_keeps_live_buffer() {
        let buffers = Buffers::new();
        buffers.open_with(&doc(), "first");
        buffers.open_with(&doc(), "second");
        assert_eq!(buffers.text(&doc()).unwrap(), "first");
    }
}
