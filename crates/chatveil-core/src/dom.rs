//! The slice of the page the engine is allowed to see.
//!
//! Nothing in this crate touches a real DOM. The wasm shell implements these
//! traits over `web-sys` elements; tests implement them over plain structs.

use serde::{Deserialize, Serialize};

/// Whether a message container is currently collapsed.
///
/// This is the single source of truth for a container: the hidden marker
/// class and the toggle button label are both rendered from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityState {
    #[default]
    Shown,
    Hidden,
}

impl VisibilityState {
    pub fn flipped(self) -> Self {
        match self {
            VisibilityState::Shown => VisibilityState::Hidden,
            VisibilityState::Hidden => VisibilityState::Shown,
        }
    }

    pub fn is_hidden(self) -> bool {
        self == VisibilityState::Hidden
    }
}

/// One chat turn as rendered by the host page.
///
/// Implementations are cheap handles (the shell wraps an `Element`), so they
/// are passed by reference and cloned freely.
pub trait MessageContainer {
    /// Value of the author-role marker on the nested message node.
    fn author_role(&self) -> Option<String>;

    /// True if any descendant carries an author-role marker, whatever its value.
    fn has_role_descendant(&self) -> bool;

    /// Identifier attribute on the container itself.
    fn container_message_id(&self) -> Option<String>;

    /// Identifier attribute on the nested message node.
    fn inner_message_id(&self) -> Option<String>;

    /// The container's generic element `id`.
    fn element_id(&self) -> Option<String>;

    /// Text of the nested message node, `None` when there is no such node.
    fn inner_text(&self) -> Option<String>;

    /// Text of the whole container.
    fn text(&self) -> String;

    fn visibility(&self) -> VisibilityState;

    fn set_visibility(&self, state: VisibilityState);

    /// Whether a toggle control is already attached.
    fn has_toggle(&self) -> bool;

    /// Identity of the underlying node, used to deduplicate containers reached
    /// through several role nodes.
    fn same_node(&self, other: &Self) -> bool;
}

/// The page as a whole.
pub trait ChatDocument {
    type Container: MessageContainer + Clone;

    /// Containers of every `user`/`assistant` message node, in document order.
    /// May contain the same container more than once.
    fn message_containers(&self) -> Vec<Self::Container>;

    /// Every turn container on the page, role-bearing or not.
    fn turn_containers(&self) -> Vec<Self::Container>;

    fn set_action_bars_hidden(&self, hidden: bool);
}

/// Drops repeated handles to the same node, keeping first-seen order.
pub fn dedup_containers<C: MessageContainer>(containers: Vec<C>) -> Vec<C> {
    let mut unique: Vec<C> = Vec::with_capacity(containers.len());
    for container in containers {
        if !unique.iter().any(|seen| seen.same_node(&container)) {
            unique.push(container);
        }
    }
    unique
}
