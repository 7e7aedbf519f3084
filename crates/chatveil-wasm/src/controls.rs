//! Buttons the content script adds to the page.

use std::cell::RefCell;
use std::rc::Rc;

use chatveil_core::{Controller, MessageContainer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event};

use crate::error::ShellError;
use crate::local_storage::LocalStorage;
use crate::page::{DomContainer, DomDocument};

pub type App = Controller<LocalStorage, DomDocument>;
pub type SharedApp = Rc<RefCell<App>>;

fn on_click(target: &Element, mut handler: impl FnMut(&Event) + 'static) -> Result<(), ShellError> {
    let callback = Closure::wrap(Box::new(move |event: Event| handler(&event)) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

fn button(document: &Document, label: &str) -> Result<Element, ShellError> {
    let button = document.create_element("button")?;
    button.set_attribute("type", "button")?;
    button.set_text_content(Some(label));
    Ok(button)
}

/// Runs `f` against the controller unless another callback holds it.
fn with_app(app: &SharedApp, action: &'static str, f: impl FnOnce(&mut App)) {
    match app.try_borrow_mut() {
        Ok(mut app) => f(&mut app),
        Err(_) => tracing::warn!(action, "controller busy, ignoring click"),
    }
}

pub fn attach_toggles(app: &SharedApp, document: &Document, containers: Vec<DomContainer>) {
    for container in containers {
        if let Err(e) = attach_toggle(app, document, container) {
            tracing::warn!(%e, "failed to attach toggle");
        }
    }
}

fn attach_toggle(
    app: &SharedApp,
    document: &Document,
    container: DomContainer,
) -> Result<(), ShellError> {
    if container.has_toggle() {
        return Ok(());
    }
    let (label, class, marker) = {
        let app = app.borrow();
        let config = app.config();
        (
            config
                .toggle_label(container.visibility().is_hidden())
                .to_string(),
            config.toggle_class.clone(),
            config.toggle_marker_attribute.clone(),
        )
    };

    let toggle = button(document, &label)?;
    toggle.set_class_name(&class);
    toggle.set_attribute(&marker, "true")?;

    let anchor = container.toggle_anchor();
    let app = app.clone();
    on_click(&toggle, move |event| {
        event.stop_propagation();
        with_app(&app, "toggle", |app| {
            let state = app.toggle_message(&container);
            tracing::debug!(?state, "message toggled");
        });
    })?;
    anchor.append_child(&toggle)?;
    Ok(())
}

/// Floating panel with the page-wide actions. Added once per document.
pub fn inject_panel(app: &SharedApp, document: &Document) -> Result<(), ShellError> {
    let config = app.borrow().config().clone();
    if document.get_element_by_id(&config.controls_id).is_some() {
        return Ok(());
    }
    let body = document.body().ok_or(ShellError::NoBody)?;

    let panel = document.create_element("div")?;
    panel.set_id(&config.controls_id);

    let summary = document.create_element("div")?;
    summary.set_class_name("chatveil-summary");
    summary.set_text_content(Some(&config.controls_label));

    let hide_all = button(document, &config.hide_all_label)?;
    let app_for_hide = app.clone();
    on_click(&hide_all, move |_| {
        with_app(&app_for_hide, "hide_all", |app| {
            app.hide_all();
        });
    })?;

    let show_all = button(document, &config.show_all_label)?;
    let app_for_show = app.clone();
    on_click(&show_all, move |_| {
        with_app(&app_for_show, "show_all", App::show_all);
    })?;

    let action_bars = button(document, app.borrow().action_bar_label())?;
    action_bars.set_id(&config.action_bar_toggle_id);
    let app_for_bars = app.clone();
    let bars_button = action_bars.clone();
    on_click(&action_bars, move |_| {
        with_app(&app_for_bars, "toggle_action_bars", |app| {
            app.toggle_action_bars();
            bars_button.set_text_content(Some(app.action_bar_label()));
        });
    })?;

    panel.append_child(&summary)?;
    panel.append_child(&hide_all)?;
    panel.append_child(&show_all)?;
    panel.append_child(&action_bars)?;
    body.append_child(&panel)?;
    Ok(())
}
