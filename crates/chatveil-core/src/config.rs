use serde::{Deserialize, Serialize};

/// Everything that ties the engine to a particular chat page.
///
/// Missing fields take their defaults, so a loader can override a single
/// selector without restating the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VeilConfig {
    pub hidden_messages_key: String,
    pub action_bar_key: String,

    pub hidden_class: String,
    pub action_bar_class: String,

    pub role_attribute: String,
    pub message_roles: Vec<String>,
    pub container_id_attribute: String,
    pub message_id_attribute: String,
    pub turn_selector: String,
    pub fallback_turn_selector: String,

    pub toggle_class: String,
    pub toggle_marker_attribute: String,
    pub controls_id: String,
    pub action_bar_toggle_id: String,
    pub controls_label: String,
    pub hide_all_label: String,
    pub show_all_label: String,
    pub hide_label: String,
    pub show_label: String,

    pub log_filter: String,
}

impl Default for VeilConfig {
    fn default() -> Self {
        Self {
            hidden_messages_key: "chatveil.hidden-messages".into(),
            action_bar_key: "chatveil.hide-action-bars".into(),
            hidden_class: "chatveil-hidden".into(),
            action_bar_class: "chatveil-hide-actions".into(),
            role_attribute: "data-message-author-role".into(),
            message_roles: vec!["user".into(), "assistant".into()],
            container_id_attribute: "data-turn-id".into(),
            message_id_attribute: "data-message-id".into(),
            turn_selector: "[data-testid^=\"conversation-turn\"]".into(),
            fallback_turn_selector: "article".into(),
            toggle_class: "chatveil-toggle".into(),
            toggle_marker_attribute: "data-chatveil-toggle".into(),
            controls_id: "chatveil-controls".into(),
            action_bar_toggle_id: "chatveil-actions-toggle".into(),
            controls_label: "Chat controls".into(),
            hide_all_label: "Hide all Q/A".into(),
            show_all_label: "Show all Q/A".into(),
            hide_label: "Hide".into(),
            show_label: "Show".into(),
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("config field `{0}` must not be empty")]
    EmptyField(&'static str),
}

impl VeilConfig {
    /// `None` or a blank string gives the defaults.
    pub fn from_json(raw: Option<&str>) -> Result<Self, ConfigError> {
        let config = match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => serde_json::from_str(raw)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("hidden_messages_key", &self.hidden_messages_key),
            ("action_bar_key", &self.action_bar_key),
            ("hidden_class", &self.hidden_class),
            ("action_bar_class", &self.action_bar_class),
            ("role_attribute", &self.role_attribute),
            ("turn_selector", &self.turn_selector),
            ("toggle_marker_attribute", &self.toggle_marker_attribute),
            ("controls_id", &self.controls_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField(name));
            }
        }
        Ok(())
    }

    /// Selector matching every message node whose role we manage.
    pub fn message_node_selector(&self) -> String {
        self.message_roles
            .iter()
            .map(|role| format!("[{}=\"{}\"]", self.role_attribute, role))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Selector matching every turn container, preferred or fallback.
    pub fn any_turn_selector(&self) -> String {
        if self.fallback_turn_selector.trim().is_empty() {
            return self.turn_selector.clone();
        }
        format!("{}, {}", self.turn_selector, self.fallback_turn_selector)
    }

    pub fn toggle_label(&self, hidden: bool) -> &str {
        if hidden {
            &self.show_label
        } else {
            &self.hide_label
        }
    }
}
