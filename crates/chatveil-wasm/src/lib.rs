//! Browser content script: per-message hide/show toggles and a floating
//! control panel for chat pages, backed by `chatveil-core`.
//!
//! The page-facing pieces only build for `wasm32`; on other targets this crate
//! is its error type, boot bookkeeping and log-level parsing.

mod error;
mod lifecycle;
mod logging;

#[cfg(target_arch = "wasm32")]
mod controls;
#[cfg(target_arch = "wasm32")]
mod local_storage;
#[cfg(target_arch = "wasm32")]
mod mutations;
#[cfg(target_arch = "wasm32")]
mod page;

pub use error::ShellError;
pub use lifecycle::{resolve_config, BootGate, BootPhase};
pub use logging::level_from_filter;

#[cfg(target_arch = "wasm32")]
mod shell {
    use std::cell::RefCell;
    use std::rc::Rc;

    use chatveil_core::{observe, Controller, MessageKey, VeilConfig};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::controls::{self, SharedApp};
    use crate::error::ShellError;
    use crate::lifecycle::{resolve_config, BootGate};
    use crate::local_storage::LocalStorage;
    use crate::logging::init_logging;
    use crate::mutations::DomMutationSource;
    use crate::page::DomDocument;

    thread_local! {
        static BOOT: BootGate = const { BootGate::new() };
        static APP: RefCell<Option<SharedApp>> = const { RefCell::new(None) };
    }

    /// Runs when the module is instantiated. The loader then calls
    /// `start_with_config`.
    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
    }

    /// Mounts the content script. `config_json` overrides any subset of the
    /// defaults; `null` or invalid config means the defaults. Later calls are
    /// ignored, including ones made while the first is waiting for
    /// `DOMContentLoaded`.
    #[wasm_bindgen]
    pub fn start_with_config(config_json: Option<String>) {
        let (config, config_error) = resolve_config(config_json.as_deref());
        init_logging(&config.log_filter);
        if let Some(e) = config_error {
            tracing::error!(%e, "invalid chatveil config, using defaults");
        }

        if !BOOT.with(BootGate::try_claim) {
            let phase = BOOT.with(BootGate::phase);
            tracing::warn!(?phase, "chatveil already started");
            return;
        }
        if let Err(e) = run_when_ready(config) {
            BOOT.with(BootGate::failed);
            tracing::error!(%e, "chatveil failed to start");
        }
    }

    /// Currently hidden keys as a JSON array, for debugging from devtools.
    #[wasm_bindgen]
    pub fn hidden_keys_json() -> String {
        APP.with(|slot| {
            let keys: Vec<String> = slot
                .borrow()
                .as_ref()
                .map(|app| {
                    app.borrow()
                        .store()
                        .keys()
                        .map(MessageKey::to_string)
                        .collect()
                })
                .unwrap_or_default();
            serde_json::to_string(&keys).unwrap_or_else(|_| "[]".to_string())
        })
    }

    fn run_when_ready(config: VeilConfig) -> Result<(), ShellError> {
        let window = web_sys::window().ok_or(ShellError::NoWindow)?;
        let document = window.document().ok_or(ShellError::NoDocument)?;
        let state = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))?;
        if state.as_string().as_deref() != Some("loading") {
            return mount(config);
        }

        let pending = RefCell::new(Some(config));
        let on_ready = Closure::wrap(Box::new(move || {
            let Some(config) = pending.borrow_mut().take() else {
                return;
            };
            if let Err(e) = mount(config) {
                BOOT.with(BootGate::failed);
                tracing::error!(%e, "chatveil failed to start");
            }
        }) as Box<dyn FnMut()>);
        document.add_event_listener_with_callback(
            "DOMContentLoaded",
            on_ready.as_ref().unchecked_ref(),
        )?;
        on_ready.forget();
        Ok(())
    }

    fn mount(config: VeilConfig) -> Result<(), ShellError> {
        let window = web_sys::window().ok_or(ShellError::NoWindow)?;
        let document = window.document().ok_or(ShellError::NoDocument)?;
        let body = document.body().ok_or(ShellError::NoBody)?;

        let storage = LocalStorage::open(&window);
        let page = DomDocument::new(document.clone(), Rc::new(config.clone()));
        let app: SharedApp = Rc::new(RefCell::new(Controller::new(config, storage, page)));

        controls::inject_panel(&app, &document)?;
        let report = app.borrow_mut().init();
        tracing::info!(
            messages = report.containers,
            restored = report.reconciled,
            "chatveil mounted"
        );
        controls::attach_toggles(&app, &document, report.needs_toggle);

        let source = DomMutationSource::new(body.into());
        let app_for_scan = app.clone();
        let document_for_scan = document.clone();
        observe(&source, app.clone(), move |report| {
            controls::attach_toggles(&app_for_scan, &document_for_scan, report.needs_toggle);
        });

        APP.with(|slot| *slot.borrow_mut() = Some(app));
        BOOT.with(BootGate::mounted);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use shell::{hidden_keys_json, start, start_with_config};
