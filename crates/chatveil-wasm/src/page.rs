//! `web-sys` implementations of the engine's page traits.

use std::rc::Rc;

use chatveil_core::{ChatDocument, MessageContainer, VeilConfig, VisibilityState};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node};

#[derive(Clone)]
pub struct DomContainer {
    element: Element,
    config: Rc<VeilConfig>,
}

impl DomContainer {
    pub fn new(element: Element, config: Rc<VeilConfig>) -> Self {
        Self { element, config }
    }

    /// Where the toggle goes: the turn's header if it has one.
    pub fn toggle_anchor(&self) -> Element {
        self.element
            .query_selector("header")
            .ok()
            .flatten()
            .unwrap_or_else(|| self.element.clone())
    }

    pub fn toggle_selector(&self) -> String {
        format!("[{}=\"true\"]", self.config.toggle_marker_attribute)
    }

    // The container itself when it is the role node (no turn wrapper found).
    fn role_node(&self) -> Option<Element> {
        let attribute = &self.config.role_attribute;
        if self.element.has_attribute(attribute) {
            return Some(self.element.clone());
        }
        self.element
            .query_selector(&format!("[{attribute}]"))
            .ok()
            .flatten()
    }

    fn toggle(&self) -> Option<Element> {
        self.element
            .query_selector(&self.toggle_selector())
            .ok()
            .flatten()
    }

    // Our own button label must not leak into the text digest.
    fn text_without_toggles(&self, element: &Element) -> String {
        let has_toggle = element
            .query_selector(&self.toggle_selector())
            .ok()
            .flatten()
            .is_some();
        if !has_toggle {
            return element.text_content().unwrap_or_default();
        }
        let Ok(copy) = element.clone_node_with_deep(true) else {
            return element.text_content().unwrap_or_default();
        };
        let Ok(copy) = copy.dyn_into::<Element>() else {
            return String::new();
        };
        if let Ok(toggles) = copy.query_selector_all(&self.toggle_selector()) {
            for i in 0..toggles.length() {
                if let Some(toggle) = toggles.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    toggle.remove();
                }
            }
        }
        copy.text_content().unwrap_or_default()
    }
}

impl MessageContainer for DomContainer {
    fn author_role(&self) -> Option<String> {
        self.role_node()?.get_attribute(&self.config.role_attribute)
    }

    fn has_role_descendant(&self) -> bool {
        self.role_node().is_some()
    }

    fn container_message_id(&self) -> Option<String> {
        self.element
            .get_attribute(&self.config.container_id_attribute)
    }

    fn inner_message_id(&self) -> Option<String> {
        self.role_node()?
            .get_attribute(&self.config.message_id_attribute)
    }

    fn element_id(&self) -> Option<String> {
        Some(self.element.id()).filter(|id| !id.is_empty())
    }

    fn inner_text(&self) -> Option<String> {
        let node = self.role_node()?;
        Some(self.text_without_toggles(&node))
    }

    fn text(&self) -> String {
        self.text_without_toggles(&self.element)
    }

    fn visibility(&self) -> VisibilityState {
        if self.element.class_list().contains(&self.config.hidden_class) {
            VisibilityState::Hidden
        } else {
            VisibilityState::Shown
        }
    }

    // Writes only what differs. Any write under `body` is itself a mutation,
    // so an unconditional write here would retrigger the observer forever.
    fn set_visibility(&self, state: VisibilityState) {
        if self.visibility() != state {
            let classes = self.element.class_list();
            let result = match state {
                VisibilityState::Hidden => classes.add_1(&self.config.hidden_class),
                VisibilityState::Shown => classes.remove_1(&self.config.hidden_class),
            };
            if result.is_err() {
                tracing::warn!(?state, "failed to update hidden class");
            }
        }
        let Some(toggle) = self.toggle() else {
            return;
        };
        let label = self.config.toggle_label(state.is_hidden());
        if toggle.text_content().as_deref() != Some(label) {
            toggle.set_text_content(Some(label));
        }
    }

    fn has_toggle(&self) -> bool {
        self.toggle().is_some()
    }

    fn same_node(&self, other: &Self) -> bool {
        let other: &Node = other.element.as_ref();
        self.element.is_same_node(Some(other))
    }
}

pub struct DomDocument {
    document: Document,
    config: Rc<VeilConfig>,
}

impl DomDocument {
    pub fn new(document: Document, config: Rc<VeilConfig>) -> Self {
        Self { document, config }
    }

    fn query_elements(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            tracing::warn!(selector, "invalid selector");
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    // Turn wrapper, else enclosing article, else the message node itself.
    fn container_for(&self, message_node: Element) -> Element {
        let closest = |selector: &str| {
            if selector.trim().is_empty() {
                return None;
            }
            message_node.closest(selector).ok().flatten()
        };
        let wrapper = closest(&self.config.turn_selector)
            .or_else(|| closest(&self.config.fallback_turn_selector));
        wrapper.unwrap_or(message_node)
    }

    fn wrap(&self, element: Element) -> DomContainer {
        DomContainer::new(element, self.config.clone())
    }
}

impl ChatDocument for DomDocument {
    type Container = DomContainer;

    fn message_containers(&self) -> Vec<DomContainer> {
        self.query_elements(&self.config.message_node_selector())
            .into_iter()
            .map(|node| self.wrap(self.container_for(node)))
            .collect()
    }

    fn turn_containers(&self) -> Vec<DomContainer> {
        self.query_elements(&self.config.any_turn_selector())
            .into_iter()
            .map(|element| self.wrap(element))
            .collect()
    }

    fn set_action_bars_hidden(&self, hidden: bool) {
        let Some(root) = self.document.document_element() else {
            return;
        };
        if root
            .class_list()
            .toggle_with_force(&self.config.action_bar_class, hidden)
            .is_err()
        {
            tracing::warn!(hidden, "failed to update action bar class");
        }
    }
}
