use wasm_bindgen::JsValue;

/// Failures while wiring the content script into the page. Logged, never
/// thrown back to the page.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("window is unavailable")]
    NoWindow,
    #[error("document is unavailable")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("dom call failed: {0}")]
    Js(String),
}

impl From<JsValue> for ShellError {
    fn from(value: JsValue) -> Self {
        ShellError::Js(js_error_text(&value))
    }
}

/// Best-effort text for a thrown JS value.
pub fn js_error_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
