//! Inline text editing as an explicit state machine.
//!
//! ```text
//!   Idle ──begin(id)──▶ Editing{id, draft}
//!   Editing ──commit (Enter / blur)──▶ Idle   yields (id, draft)
//!   Editing ──cancel (Escape)────────▶ Idle   draft discarded
//! ```

use sparkify_core::id::EntityId;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing {
        id: EntityId,
        draft: String,
        original: String,
    },
}

/// What a key press means while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Commit,
    Cancel,
    /// Let the input element handle it (typing, Shift+Enter newline).
    PassThrough,
}

impl EditKey {
    pub fn classify(key: &str, shift: bool) -> Self {
        match key {
            "Enter" if !shift => EditKey::Commit,
            "Escape" => EditKey::Cancel,
            _ => EditKey::PassThrough,
        }
    }
}

#[derive(Debug, Default)]
pub struct TextEditSession {
    state: EditState,
}

impl TextEditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// Id being edited, if any.
    pub fn editing(&self) -> Option<EntityId> {
        match &self.state {
            EditState::Editing { id, .. } => Some(*id),
            EditState::Idle => None,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Idle => None,
        }
    }

    /// Start editing `id`. A running edit is committed first and returned.
    pub fn begin(&mut self, id: EntityId, current: &str) -> Option<(EntityId, String)> {
        let previous = self.commit();
        self.state = EditState::Editing {
            id,
            draft: current.to_string(),
            original: current.to_string(),
        };
        previous
    }

    /// Replace the draft. Ignored when idle.
    pub fn input(&mut self, text: &str) {
        if let EditState::Editing { draft, .. } = &mut self.state {
            *draft = text.to_string();
        }
    }

    /// Finish editing and hand back the draft. Returns `None` when idle.
    pub fn commit(&mut self) -> Option<(EntityId, String)> {
        match std::mem::take(&mut self.state) {
            EditState::Editing { id, draft, .. } => Some((id, draft)),
            EditState::Idle => None,
        }
    }

    /// Abandon the draft. Returns the id and its untouched content.
    pub fn cancel(&mut self) -> Option<(EntityId, String)> {
        match std::mem::take(&mut self.state) {
            EditState::Editing { id, original, .. } => Some((id, original)),
            EditState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commit_yields_draft() {
        let id = EntityId::intern("edit_commit");
        let mut session = TextEditSession::new();
        assert_eq!(session.begin(id, "old"), None);
        session.input("new");
        assert_eq!(session.draft(), Some("new"));
        assert_eq!(session.commit(), Some((id, "new".to_string())));
        assert_eq!(session.state(), &EditState::Idle);
    }

    #[test]
    fn cancel_restores_original() {
        let id = EntityId::intern("edit_cancel");
        let mut session = TextEditSession::new();
        session.begin(id, "old");
        session.input("typo");
        assert_eq!(session.cancel(), Some((id, "old".to_string())));
        assert_eq!(session.editing(), None);
    }

    #[test]
    fn idle_transitions_are_noops() {
        let mut session = TextEditSession::new();
        session.input("ignored");
        assert_eq!(session.commit(), None);
        assert_eq!(session.cancel(), None);
    }

    #[test]
    fn begin_commits_running_edit() {
        let a = EntityId::intern("edit_a");
        let b = EntityId::intern("edit_b");
        let mut session = TextEditSession::new();
        session.begin(a, "a");
        session.input("a2");
        assert_eq!(session.begin(b, "b"), Some((a, "a2".to_string())));
        assert_eq!(session.editing(), Some(b));
    }

    #[test]
    fn key_classification() {
        assert_eq!(EditKey::classify("Enter", false), EditKey::Commit);
        assert_eq!(EditKey::classify("Enter", true), EditKey::PassThrough);
        assert_eq!(EditKey::classify("Escape", false), EditKey::Cancel);
        assert_eq!(EditKey::classify("a", false), EditKey::PassThrough);
    }
}
