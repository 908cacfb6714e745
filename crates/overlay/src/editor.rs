//! Comment editor state
//!
//! A transient editor surface for creating or editing a comment. The state
//! machine here is headless: the host renders the input, feeds key events
//! in, and acts on the returned `EditorAction`. Submission requires
//! non-empty trimmed text; an empty submit leaves the editor open and the
//! comment list unchanged.

use pagepin_core::ElementId;

/// What the editor is for.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorMode {
    /// Creating a new comment at a placement point, optionally targeting a
    /// specific element for anchoring.
    Create {
        x: f32,
        y: f32,
        target: Option<ElementId>,
    },
    /// Editing an existing comment's text.
    Edit { comment_id: String },
}

/// Keyboard input relevant to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    /// Enter, with the shift and ctrl/cmd modifier states.
    Enter { shift: bool, modifier: bool },
    Escape,
}

/// What the host should do after a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Attempt to submit the draft.
    Submit,
    /// Discard the editor without changes.
    Discard,
    /// Keep editing.
    None,
}

/// State of the open editor surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    mode: EditorMode,
    draft: String,
    focused: bool,
}

impl EditorState {
    /// Open an empty editor for comment creation.
    pub fn create_at(x: f32, y: f32, target: Option<ElementId>) -> Self {
        Self {
            mode: EditorMode::Create { x, y, target },
            draft: String::new(),
            focused: false,
        }
    }

    /// Open the editor pre-filled with an existing comment's text.
    pub fn edit(comment_id: &str, text: &str) -> Self {
        Self {
            mode: EditorMode::Edit { comment_id: comment_id.to_string() },
            draft: text.to_string(),
            focused: false,
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Whether the input has received its deferred focus yet.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// The draft qualifies for submission.
    pub fn can_submit(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    /// Map a key event to an action. Enter without Shift submits, as does
    /// Ctrl/Cmd+Enter regardless of Shift; Shift+Enter alone is a newline
    /// and stays in the editor.
    pub fn key(&self, key: EditorKey) -> EditorAction {
        match key {
            EditorKey::Enter { shift: false, .. } => EditorAction::Submit,
            EditorKey::Enter { modifier: true, .. } => EditorAction::Submit,
            EditorKey::Enter { .. } => EditorAction::None,
            EditorKey::Escape => EditorAction::Discard,
        }
    }
}
