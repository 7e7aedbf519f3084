use crate::action_bar::ActionBarFlag;
use crate::config::VeilConfig;
use crate::dom::{dedup_containers, ChatDocument, MessageContainer, VisibilityState};
use crate::store::VisibilityStore;
use crate::storage::KeyValueStorage;

/// Result of one pass over the page.
#[derive(Debug, Clone)]
pub struct ScanReport<C> {
    /// Distinct message containers seen.
    pub containers: usize,
    /// Containers hidden because their key was stored.
    pub reconciled: usize,
    /// Containers that still need a toggle control attached.
    pub needs_toggle: Vec<C>,
}

/// Application root: owns the hidden-message store, the action-bar flag and
/// the page handle. Every consumer (mutation callback, toggle buttons, control
/// panel) goes through one instance.
#[derive(Debug)]
pub struct Controller<S, D> {
    config: VeilConfig,
    store: VisibilityStore<S>,
    action_bar: ActionBarFlag,
    document: D,
}

impl<S: KeyValueStorage, D: ChatDocument> Controller<S, D> {
    pub fn new(config: VeilConfig, storage: S, document: D) -> Self {
        let action_bar = ActionBarFlag::load(&storage, &config.action_bar_key);
        let store = VisibilityStore::load(storage, config.hidden_messages_key.clone());
        tracing::info!(
            hidden = store.len(),
            action_bars_hidden = action_bar.hidden(),
            "chatveil state loaded"
        );
        Self {
            config,
            store,
            action_bar,
            document,
        }
    }

    /// Applies persisted state to whatever is already rendered.
    pub fn init(&mut self) -> ScanReport<D::Container> {
        self.action_bar.apply(&self.document);
        self.scan()
    }

    /// Re-applies stored hidden state to every message on the page.
    pub fn scan(&mut self) -> ScanReport<D::Container> {
        let containers = dedup_containers(self.document.message_containers());
        let reconciled = self.store.reconcile(&containers);
        let total = containers.len();
        let needs_toggle: Vec<_> = containers
            .into_iter()
            .filter(|container| !container.has_toggle())
            .collect();
        tracing::debug!(
            containers = total,
            reconciled,
            new_toggles = needs_toggle.len(),
            "scan"
        );
        ScanReport {
            containers: total,
            reconciled,
            needs_toggle,
        }
    }

    pub fn toggle_message(&mut self, container: &D::Container) -> VisibilityState {
        self.store.toggle(container)
    }

    pub fn hide_message(&mut self, container: &D::Container) {
        self.store.hide(container);
    }

    pub fn show_message(&mut self, container: &D::Container) {
        self.store.show(container);
    }

    pub fn hide_all(&mut self) -> usize {
        let containers = dedup_containers(self.document.turn_containers());
        let hidden = self.store.hide_all(&containers);
        tracing::info!(hidden, "hide all");
        hidden
    }

    pub fn show_all(&mut self) {
        let containers = dedup_containers(self.document.turn_containers());
        self.store.show_all(&containers);
        tracing::info!(shown = containers.len(), "show all");
    }

    pub fn toggle_action_bars(&mut self) -> bool {
        let hidden = self.action_bar.toggle(
            self.store.storage(),
            &self.config.action_bar_key,
            &self.document,
        );
        tracing::info!(hidden, "action bars toggled");
        hidden
    }

    pub fn action_bar_label(&self) -> &'static str {
        self.action_bar.label()
    }

    pub fn action_bars_hidden(&self) -> bool {
        self.action_bar.hidden()
    }

    pub fn store(&self) -> &VisibilityStore<S> {
        &self.store
    }

    pub fn config(&self) -> &VeilConfig {
        &self.config
    }
}
