//! Linear undo/redo history over whole-state snapshots.
//!
//! Unlike an inverse-command stack, every entry is a full deep copy of the
//! entity store, so undo and redo simply hand back the snapshot at the new
//! index. Recording a snapshot equal to the current one is a no-op, which
//! keeps incidental refreshes out of the log.
//!
//! Boundary operations (undo at the start, redo at the end) return `None`
//! and never fail.

use sparkify_core::id::EntityId;
use sparkify_core::model::{CanvasConfig, ImageHandle, ImageLayer, Point, TextLayer};

/// Immutable copy of everything undo can restore.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub texts: Vec<TextLayer>,
    pub character_position: Point,
    pub character_size: (f32, f32),
    pub character_image: Option<ImageHandle>,
    pub images: Vec<ImageLayer>,
    pub selection: Option<EntityId>,
    /// Carries the background image reference.
    pub canvas: CanvasConfig,
    pub selected_template: Option<String>,
    pub selected_character: Option<String>,
}

pub struct History {
    entries: Vec<HistorySnapshot>,
    index: usize,
    /// Maximum number of entries kept.
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// Append `snapshot` after the current index, discarding any redo tail.
    /// Returns `false` when it equals the current entry.
    pub fn record(&mut self, snapshot: HistorySnapshot) -> bool {
        if self.current() == Some(&snapshot) {
            return false;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.max_depth {
            self.entries.remove(0);
        }
        self.index = self.entries.len() - 1;
        log::debug!("history: recorded entry {} of {}", self.index + 1, self.entries.len());
        true
    }

    /// Step back one entry and return it for the caller to apply.
    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        log::debug!("history: undo to entry {}", self.index + 1);
        self.entries.get(self.index)
    }

    /// Step forward one entry and return it for the caller to apply.
    pub fn redo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        log::debug!("history: redo to entry {}", self.index + 1);
        self.entries.get(self.index)
    }

    /// Drop everything and seed the log with `blank` as the only entry.
    pub fn reset(&mut self, blank: HistorySnapshot) {
        self.entries.clear();
        self.entries.push(blank);
        self.index = 0;
    }

    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.index < self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snap(tag: f32) -> HistorySnapshot {
        HistorySnapshot {
            texts: Vec::new(),
            character_position: Point::new(tag, 0.0),
            character_size: (150.0, 150.0),
            character_image: None,
            images: Vec::new(),
            selection: None,
            canvas: CanvasConfig::default(),
            selected_template: None,
            selected_character: None,
        }
    }

    #[test]
    fn empty_history_is_inert() {
        let mut h = History::new(10);
        assert!(h.is_empty());
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
    }

    #[test]
    fn record_keeps_index_at_end() {
        let mut h = History::new(10);
        for i in 0..5 {
            h.record(snap(i as f32));
            assert_eq!(h.index(), h.len() - 1);
        }
        assert_eq!(h.len(), 5);
    }

    #[test]
    fn equal_snapshot_is_not_recorded() {
        let mut h = History::new(10);
        h.record(snap(1.0));
        assert!(!h.record(snap(1.0)));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn undo_then_redo_returns_to_last() {
        let mut h = History::new(10);
        h.record(snap(0.0));
        h.record(snap(1.0));
        h.record(snap(2.0));

        assert_eq!(h.undo(), Some(&snap(1.0)));
        assert_eq!(h.redo(), Some(&snap(2.0)));
        assert_eq!(h.index(), 2);
    }

    #[test]
    fn boundaries_are_noops() {
        let mut h = History::new(10);
        h.reset(snap(0.0));
        assert!(h.undo().is_none());
        assert_eq!(h.index(), 0);

        h.record(snap(1.0));
        assert!(h.redo().is_none());
        assert_eq!(h.index(), 1);
    }

    #[test]
    fn new_record_truncates_redo_tail() {
        let mut h = History::new(10);
        h.record(snap(0.0));
        h.record(snap(1.0));
        h.record(snap(2.0));
        h.undo();

        h.record(snap(9.0));
        assert_eq!(h.len(), 3);
        assert_eq!(h.index(), 2);
        assert!(!h.can_redo());
        h.undo();
        assert_eq!(h.current(), Some(&snap(1.0)));
    }

    #[test]
    fn reset_seeds_single_entry() {
        let mut h = History::new(10);
        h.record(snap(1.0));
        h.record(snap(2.0));
        h.reset(snap(0.0));
        assert_eq!(h.len(), 1);
        assert_eq!(h.index(), 0);
        assert_eq!(h.current(), Some(&snap(0.0)));
    }

    #[test]
    fn max_depth_drops_oldest() {
        let mut h = History::new(3);
        for i in 0..5 {
            h.record(snap(i as f32));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.index(), 2);
        let mut undo_count = 0;
        while h.undo().is_some() {
            undo_count += 1;
        }
        assert_eq!(undo_count, 2);
        assert_eq!(h.current(), Some(&snap(2.0)));
    }
}
