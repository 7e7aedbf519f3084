//! Hide and show individual chat messages, and remember which ones stay hidden
//! across re-renders and reloads.
//!
//! This crate is the page-independent half of the chatveil content script. It
//! sees the page only through the traits in [`dom`], [`storage`] and
//! [`observer`]; `chatveil-wasm` implements them over the real DOM.

pub mod action_bar;
pub mod config;
pub mod controller;
pub mod dom;
pub mod identity;
pub mod observer;
pub mod storage;
pub mod store;

pub use action_bar::ActionBarFlag;
pub use config::{ConfigError, VeilConfig};
pub use controller::{Controller, ScanReport};
pub use dom::{ChatDocument, MessageContainer, VisibilityState};
pub use identity::{resolve, MessageKey};
pub use observer::{observe, ChangeFeed, MutationListener, MutationSource};
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};
pub use store::VisibilityStore;
