//! Local durable slot store.
//!
//! One JSON file per named slot under a base directory: the toolbar
//! position, the `{nodes, edges}` document, and the arrow list each get
//! their own slot. Reads validate through serde — a corrupt or
//! hand-edited slot is treated as absent, never as an error. Writes
//! report success as a boolean; a failed write (missing permissions,
//! full disk) degrades to in-memory-only operation with a warning.

use sb_core::model::{Arrow, Edge, Node};
use sb_editor::dock::DockPosition;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Slot holding the toolbar dock position.
pub const TOOLBAR_POSITION_SLOT: &str = "toolbar_position";

/// Slot holding the serialized `{nodes, edges}` document.
pub const DOCUMENT_SLOT: &str = "canvas_document";

/// Slot holding the arrow connector list.
pub const ARROWS_SLOT: &str = "arrows";

/// The `{nodes, edges}` shape written to the document slot.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PersistedDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// File-backed named slots.
#[derive(Debug, Clone)]
pub struct LocalSlots {
    dir: PathBuf,
}

impl LocalSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }

    /// Serialize a value into a slot. Returns false on any failure.
    pub fn write_slot<T: Serialize>(&self, slot: &str, value: &T) -> bool {
        let write = || -> crate::error::Result<()> {
            fs::create_dir_all(&self.dir)?;
            let json = serde_json::to_string_pretty(value)?;
            fs::write(self.slot_path(slot), json)?;
            Ok(())
        };
        match write() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("failed to write slot {slot:?}: {e}; keeping in-memory state");
                false
            }
        }
    }

    /// Read and validate a slot. Absent, unreadable, or corrupt slots all
    /// come back as None.
    pub fn read_slot<T: DeserializeOwned>(&self, slot: &str) -> Option<T> {
        let path = self.slot_path(slot);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("failed to read slot {slot:?}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("slot {slot:?} holds invalid data, treating as absent: {e}");
                None
            }
        }
    }

    pub fn clear_slot(&self, slot: &str) {
        if let Err(e) = fs::remove_file(self.slot_path(slot))
            && e.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!("failed to clear slot {slot:?}: {e}");
        }
    }

    // ─── Typed helpers ───────────────────────────────────────────────────

    pub fn save_toolbar_position(&self, position: DockPosition) -> bool {
        self.write_slot(TOOLBAR_POSITION_SLOT, &position)
    }

    /// Load the stored toolbar position. Values outside the four known
    /// variants fail serde validation and read as absent.
    pub fn load_toolbar_position(&self) -> Option<DockPosition> {
        self.read_slot(TOOLBAR_POSITION_SLOT)
    }

    pub fn save_document(&self, doc: &PersistedDocument) -> bool {
        self.write_slot(DOCUMENT_SLOT, doc)
    }

    pub fn load_document(&self) -> Option<PersistedDocument> {
        self.read_slot(DOCUMENT_SLOT)
    }

    pub fn save_arrows(&self, arrows: &[Arrow]) -> bool {
        self.write_slot(ARROWS_SLOT, &arrows)
    }

    pub fn load_arrows(&self) -> Option<Vec<Arrow>> {
        self.read_slot(ARROWS_SLOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sb_core::id::ElementId;
    use sb_core::model::{NodePayload, Point, TextData};
    use tempfile::TempDir;

    #[test]
    fn toolbar_position_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let slots = LocalSlots::new(tmp.path());

        for position in DockPosition::ALL {
            assert!(slots.save_toolbar_position(position));
            assert_eq!(slots.load_toolbar_position(), Some(position));
        }
    }

    #[test]
    fn missing_slot_reads_as_absent() {
        let tmp = TempDir::new().unwrap();
        let slots = LocalSlots::new(tmp.path());
        assert_eq!(slots.load_toolbar_position(), None);
    }

    #[test]
    fn corrupt_slot_reads_as_absent() {
        let tmp = TempDir::new().unwrap();
        let slots = LocalSlots::new(tmp.path());

        std::fs::write(tmp.path().join("toolbar_position.json"), "\"sideways\"").unwrap();
        assert_eq!(slots.load_toolbar_position(), None);

        std::fs::write(tmp.path().join("toolbar_position.json"), "{not json").unwrap();
        assert_eq!(slots.load_toolbar_position(), None);
    }

    #[test]
    fn clear_slot_removes_value() {
        let tmp = TempDir::new().unwrap();
        let slots = LocalSlots::new(tmp.path());
        slots.save_toolbar_position(DockPosition::Left);
        slots.clear_slot(TOOLBAR_POSITION_SLOT);
        assert_eq!(slots.load_toolbar_position(), None);
        // Clearing twice is harmless.
        slots.clear_slot(TOOLBAR_POSITION_SLOT);
    }

    #[test]
    fn document_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let slots = LocalSlots::new(tmp.path());

        let mut doc = PersistedDocument::default();
        doc.nodes.push(Node::new(
            ElementId::intern("n1"),
            Point::new(3.0, 4.0),
            NodePayload::Text(TextData { text: "hi".into() }),
        ));

        assert!(slots.save_document(&doc));
        assert_eq!(slots.load_document(), Some(doc));
    }

    #[test]
    fn unwritable_dir_reports_failure() {
        // A file where the directory should be makes create_dir_all fail.
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocked");
        std::fs::write(&blocker, b"file").unwrap();

        let slots = LocalSlots::new(&blocker);
        assert!(!slots.save_toolbar_position(DockPosition::Top));
    }
}
