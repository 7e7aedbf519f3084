//! Stable keys for chat messages.
//!
//! A key has to survive the host page re-rendering a turn and the user
//! reloading the tab, so it is built only from attributes the page itself
//! assigns. When the page gives us nothing stable we fall back to a short
//! digest of the message text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::MessageContainer;

pub const UNKNOWN_ROLE: &str = "unknown";

/// Number of UTF-16 code units of normalized text that feed the fallback digest.
pub const FALLBACK_TEXT_LIMIT: usize = 160;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `"<role>:<discriminant>"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageKey(String);

impl MessageKey {
    pub fn new(role: &str, discriminant: &str) -> Self {
        Self(format!("{role}:{discriminant}"))
    }

    /// Accepts any string that has a role part before the first `:`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (role, _) = raw.split_once(':')?;
        if role.is_empty() {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn role(&self) -> &str {
        self.0.split_once(':').map(|(role, _)| role).unwrap_or(&self.0)
    }

    pub fn discriminant(&self) -> &str {
        self.0.split_once(':').map(|(_, rest)| rest).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn resolve<C: MessageContainer + ?Sized>(container: &C) -> MessageKey {
    let role = non_empty(container.author_role()).unwrap_or_else(|| UNKNOWN_ROLE.to_string());

    let stable_id = non_empty(container.container_message_id())
        .or_else(|| non_empty(container.inner_message_id()))
        .or_else(|| non_empty(container.element_id()));
    if let Some(id) = stable_id {
        return MessageKey::new(&role, &id);
    }

    let text = container
        .inner_text()
        .unwrap_or_else(|| container.text());
    MessageKey::new(&role, &text_digest(&normalize_text(&text)))
}

/// Collapses whitespace runs to one space and trims both ends.
pub fn normalize_text(text: &str) -> String {
    text.split(is_markup_whitespace)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Base-36 digest of the leading [`FALLBACK_TEXT_LIMIT`] code units of `normalized`.
pub fn text_digest(normalized: &str) -> String {
    let hash = rolling_hash(normalized.encode_utf16().take(FALLBACK_TEXT_LIMIT));
    to_base36(i64::from(hash).unsigned_abs())
}

/// `h = h * 31 + unit`, computed as `(h << 5) - h + unit` and wrapped to 32 bits
/// after every step.
pub fn rolling_hash(units: impl IntoIterator<Item = u16>) -> i32 {
    units.into_iter().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

// Unicode whitespace plus the BOM, which page text sometimes carries.
fn is_markup_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
