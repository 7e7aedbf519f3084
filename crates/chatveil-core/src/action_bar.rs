use crate::dom::ChatDocument;
use crate::storage::KeyValueStorage;

const HIDDEN_VALUE: &str = "1";
const SHOWN_VALUE: &str = "0";

/// Page-wide "hide action bars" switch, persisted as `"1"` / `"0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionBarFlag {
    hidden: bool,
}

impl ActionBarFlag {
    /// Anything but a stored `"1"` means the bars are shown.
    pub fn load<S: KeyValueStorage + ?Sized>(storage: &S, storage_key: &str) -> Self {
        let hidden = match storage.get_item(storage_key) {
            Ok(value) => value.as_deref() == Some(HIDDEN_VALUE),
            Err(e) => {
                tracing::warn!(%e, key = storage_key, "failed to read action bar flag");
                false
            }
        };
        Self { hidden }
    }

    pub fn hidden(self) -> bool {
        self.hidden
    }

    pub fn apply<D: ChatDocument + ?Sized>(self, document: &D) {
        document.set_action_bars_hidden(self.hidden);
    }

    pub fn toggle<S, D>(&mut self, storage: &S, storage_key: &str, document: &D) -> bool
    where
        S: KeyValueStorage + ?Sized,
        D: ChatDocument + ?Sized,
    {
        self.hidden = !self.hidden;
        let value = if self.hidden { HIDDEN_VALUE } else { SHOWN_VALUE };
        if let Err(e) = storage.set_item(storage_key, value) {
            tracing::warn!(%e, key = storage_key, "failed to persist action bar flag");
        }
        self.apply(document);
        self.hidden
    }

    /// Label for the control that flips the flag.
    pub fn label(self) -> &'static str {
        if self.hidden {
            "Show action bars"
        } else {
            "Hide action bars"
        }
    }
}
