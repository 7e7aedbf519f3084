use chatveil_core::{MutationListener, MutationSource};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MutationObserver, MutationObserverInit, Node};

use crate::error::js_error_text;

/// Child-list changes anywhere under `target`.
pub struct DomMutationSource {
    target: Node,
}

impl DomMutationSource {
    pub fn new(target: Node) -> Self {
        Self { target }
    }
}

impl MutationSource for DomMutationSource {
    fn subscribe(&self, mut listener: MutationListener) {
        let callback = Closure::wrap(Box::new(move |_records: js_sys::Array, _observer: MutationObserver| {
            listener();
        }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(e) => {
                tracing::error!(error = %js_error_text(&e), "failed to create mutation observer");
                return;
            }
        };

        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        if let Err(e) = observer.observe_with_options(&self.target, &options) {
            tracing::error!(error = %js_error_text(&e), "failed to start observing mutations");
            return;
        }

        // Observes for the rest of the page's life.
        callback.forget();
    }
}
