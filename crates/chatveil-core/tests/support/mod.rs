//! In-memory page used by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chatveil_core::{ChatDocument, MessageContainer, VisibilityState};

#[derive(Debug, Default)]
struct Node {
    roles: Vec<String>,
    turn_id: Option<String>,
    message_id: Option<String>,
    element_id: Option<String>,
    inner_text: Option<String>,
    text: String,
    state: VisibilityState,
    toggle_attached: bool,
    // Every call counts, changed or not: on a real page each one is a
    // mutation the observer sees.
    visibility_writes: usize,
}

/// A turn container. Clones share the same node.
#[derive(Debug, Clone, Default)]
pub struct FakeContainer {
    node: Rc<RefCell<Node>>,
}

impl FakeContainer {
    pub fn message(role: &str, text: &str) -> Self {
        let container = Self::default();
        {
            let mut node = container.node.borrow_mut();
            node.roles = vec![role.to_string()];
            node.inner_text = Some(text.to_string());
            node.text = text.to_string();
        }
        container
    }

    /// A turn with no role-bearing descendant (page chrome, separators).
    pub fn decoration(text: &str) -> Self {
        let container = Self::default();
        container.node.borrow_mut().text = text.to_string();
        container
    }

    pub fn with_turn_id(self, id: &str) -> Self {
        self.node.borrow_mut().turn_id = Some(id.to_string());
        self
    }

    pub fn with_message_id(self, id: &str) -> Self {
        self.node.borrow_mut().message_id = Some(id.to_string());
        self
    }

    pub fn with_element_id(self, id: &str) -> Self {
        self.node.borrow_mut().element_id = Some(id.to_string());
        self
    }

    pub fn with_extra_role(self, role: &str) -> Self {
        self.node.borrow_mut().roles.push(role.to_string());
        self
    }

    pub fn without_inner_node(self) -> Self {
        self.node.borrow_mut().inner_text = None;
        self
    }

    pub fn set_text(&self, text: &str) {
        let mut node = self.node.borrow_mut();
        node.inner_text = Some(text.to_string());
        node.text = text.to_string();
    }

    /// A fresh render of the same message: same attributes and text, default
    /// state, no toggle.
    pub fn rerendered(&self) -> Self {
        let node = self.node.borrow();
        Self {
            node: Rc::new(RefCell::new(Node {
                roles: node.roles.clone(),
                turn_id: node.turn_id.clone(),
                message_id: node.message_id.clone(),
                element_id: node.element_id.clone(),
                inner_text: node.inner_text.clone(),
                text: node.text.clone(),
                state: VisibilityState::Shown,
                toggle_attached: false,
                visibility_writes: 0,
            })),
        }
    }

    pub fn attach_toggle(&self) {
        self.node.borrow_mut().toggle_attached = true;
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility().is_hidden()
    }

    pub fn visibility_writes(&self) -> usize {
        self.node.borrow().visibility_writes
    }
}

impl MessageContainer for FakeContainer {
    fn author_role(&self) -> Option<String> {
        self.node.borrow().roles.first().cloned()
    }

    fn has_role_descendant(&self) -> bool {
        !self.node.borrow().roles.is_empty()
    }

    fn container_message_id(&self) -> Option<String> {
        self.node.borrow().turn_id.clone()
    }

    fn inner_message_id(&self) -> Option<String> {
        self.node.borrow().message_id.clone()
    }

    fn element_id(&self) -> Option<String> {
        self.node.borrow().element_id.clone()
    }

    fn inner_text(&self) -> Option<String> {
        self.node.borrow().inner_text.clone()
    }

    fn text(&self) -> String {
        self.node.borrow().text.clone()
    }

    fn visibility(&self) -> VisibilityState {
        self.node.borrow().state
    }

    fn set_visibility(&self, state: VisibilityState) {
        let mut node = self.node.borrow_mut();
        node.state = state;
        node.visibility_writes += 1;
    }

    fn has_toggle(&self) -> bool {
        self.node.borrow().toggle_attached
    }

    fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

/// The page. Clones share the same turn list.
#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    turns: Rc<RefCell<Vec<FakeContainer>>>,
    action_bars_hidden: Rc<Cell<bool>>,
}

impl FakeDocument {
    pub fn with_turns(turns: Vec<FakeContainer>) -> Self {
        let document = Self::default();
        *document.turns.borrow_mut() = turns;
        document
    }

    pub fn push(&self, turn: FakeContainer) {
        self.turns.borrow_mut().push(turn);
    }

    pub fn replace(&self, index: usize, turn: FakeContainer) {
        self.turns.borrow_mut()[index] = turn;
    }

    pub fn turn(&self, index: usize) -> FakeContainer {
        self.turns.borrow()[index].clone()
    }

    pub fn turns(&self) -> Vec<FakeContainer> {
        self.turns.borrow().clone()
    }

    pub fn hidden_count(&self) -> usize {
        self.turns.borrow().iter().filter(|t| t.is_hidden()).count()
    }

    pub fn visibility_writes(&self) -> usize {
        self.turns
            .borrow()
            .iter()
            .map(FakeContainer::visibility_writes)
            .sum()
    }

    pub fn action_bars_hidden(&self) -> bool {
        self.action_bars_hidden.get()
    }
}

impl ChatDocument for FakeDocument {
    type Container = FakeContainer;

    // One entry per managed role node, like a selector query would return.
    fn message_containers(&self) -> Vec<FakeContainer> {
        let mut found = Vec::new();
        for turn in self.turns.borrow().iter() {
            let roles = turn.node.borrow().roles.clone();
            for role in roles {
                if role == "user" || role == "assistant" {
                    found.push(turn.clone());
                }
            }
        }
        found
    }

    fn turn_containers(&self) -> Vec<FakeContainer> {
        self.turns()
    }

    fn set_action_bars_hidden(&self, hidden: bool) {
        self.action_bars_hidden.set(hidden);
    }
}
