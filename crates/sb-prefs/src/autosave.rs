//! Debounced document autosave.
//!
//! Rapid successive edits coalesce into a single local write: each change
//! marks the autosave dirty, and the flush only fires once the debounce
//! window after the last change has passed. Write failures degrade with a
//! warning — autosave never interrupts editing.

use crate::local::{LocalSlots, PersistedDocument};
use sb_core::document::CanvasDocument;
use std::time::{Duration, Instant};

/// Delay after the last document change before the write fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

pub struct DocumentAutosave {
    slots: LocalSlots,
    debounce: Duration,
    last_change: Option<Instant>,
    dirty: bool,
}

impl DocumentAutosave {
    pub fn new(slots: LocalSlots) -> Self {
        Self::with_debounce(slots, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(slots: LocalSlots, debounce: Duration) -> Self {
        Self {
            slots,
            debounce,
            last_change: None,
            dirty: false,
        }
    }

    /// Record that the document changed. Restarts the debounce window.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.last_change = Some(Instant::now());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the document slots if the debounce window has elapsed since
    /// the last change. Returns whether a write happened.
    pub fn flush_if_due(&mut self, doc: &CanvasDocument) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_change {
            Some(at) if at.elapsed() >= self.debounce => self.flush_now(doc),
            _ => false,
        }
    }

    /// Write immediately, regardless of the debounce window (canvas
    /// teardown, explicit save).
    pub fn flush_now(&mut self, doc: &CanvasDocument) -> bool {
        let persisted = PersistedDocument {
            nodes: doc.nodes.clone(),
            edges: doc.edges.clone(),
        };
        let doc_ok = self.slots.save_document(&persisted);
        let arrows_ok = self.slots.save_arrows(&doc.arrows);
        if doc_ok && arrows_ok {
            self.dirty = false;
            self.last_change = None;
            true
        } else {
            log::warn!("autosave failed; document remains dirty");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_core::id::ElementId;
    use sb_core::model::{Node, NodePayload, Point, TextData};
    use tempfile::TempDir;

    fn doc_with_one_note() -> CanvasDocument {
        let mut doc = CanvasDocument::new();
        doc.add_node(Node::new(
            ElementId::intern("note"),
            Point::default(),
            NodePayload::Text(TextData {
                text: "draft".into(),
            }),
        ));
        doc
    }

    #[test]
    fn clean_autosave_never_writes() {
        let tmp = TempDir::new().unwrap();
        let mut autosave = DocumentAutosave::new(LocalSlots::new(tmp.path()));
        assert!(!autosave.flush_if_due(&CanvasDocument::new()));
    }

    #[test]
    fn flush_waits_for_debounce_window() {
        let tmp = TempDir::new().unwrap();
        let slots = LocalSlots::new(tmp.path());
        let mut autosave =
            DocumentAutosave::with_debounce(slots.clone(), Duration::from_millis(30));
        let doc = doc_with_one_note();

        autosave.mark_dirty();
        assert!(!autosave.flush_if_due(&doc), "still inside the window");
        assert!(autosave.is_dirty());

        std::thread::sleep(Duration::from_millis(40));
        assert!(autosave.flush_if_due(&doc));
        assert!(!autosave.is_dirty());

        let saved = slots.load_document().unwrap();
        assert_eq!(saved.nodes.len(), 1);
        assert_eq!(slots.load_arrows().unwrap().len(), 0);
    }

    #[test]
    fn rapid_edits_coalesce_into_one_write() {
        let tmp = TempDir::new().unwrap();
        let mut autosave = DocumentAutosave::with_debounce(
            LocalSlots::new(tmp.path()),
            Duration::from_millis(30),
        );
        let doc = doc_with_one_note();

        for _ in 0..5 {
            autosave.mark_dirty();
            assert!(!autosave.flush_if_due(&doc), "each edit restarts the window");
            std::thread::sleep(Duration::from_millis(5));
        }
        std::thread::sleep(Duration::from_millis(40));
        assert!(autosave.flush_if_due(&doc));
        assert!(!autosave.flush_if_due(&doc), "nothing left to write");
    }

    #[test]
    fn flush_now_ignores_debounce() {
        let tmp = TempDir::new().unwrap();
        let slots = LocalSlots::new(tmp.path());
        let mut autosave = DocumentAutosave::new(slots.clone());
        autosave.mark_dirty();
        assert!(autosave.flush_now(&doc_with_one_note()));
        assert!(slots.load_document().is_some());
    }
}
