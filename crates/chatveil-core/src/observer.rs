//! "The page changed" notifications.
//!
//! The browser shell backs [`MutationSource`] with a `MutationObserver`. The
//! engine only needs to know that a batch of changes happened, not what
//! changed, because every batch triggers a full re-scan.

use std::cell::RefCell;
use std::rc::Rc;

use crate::controller::{Controller, ScanReport};
use crate::dom::ChatDocument;
use crate::storage::KeyValueStorage;

pub type MutationListener = Box<dyn FnMut()>;

pub trait MutationSource {
    /// Registers `listener` to run once per batch of changes for as long as
    /// the source lives.
    fn subscribe(&self, listener: MutationListener);
}

/// In-process source: listeners run synchronously on [`ChangeFeed::notify`].
#[derive(Default)]
pub struct ChangeFeed {
    listeners: RefCell<Vec<MutationListener>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers one batch to every listener.
    pub fn notify(&self) {
        // Listeners may subscribe more listeners; those start with the next batch.
        let mut current = std::mem::take(&mut *self.listeners.borrow_mut());
        for listener in current.iter_mut() {
            listener();
        }
        let mut slot = self.listeners.borrow_mut();
        current.append(&mut slot);
        *slot = current;
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl MutationSource for ChangeFeed {
    fn subscribe(&self, listener: MutationListener) {
        self.listeners.borrow_mut().push(listener);
    }
}

/// Re-scans `controller` on every batch from `source` and hands the result to
/// `on_scan` (the shell attaches toggles there).
///
/// A batch that arrives while the controller is borrowed elsewhere is skipped;
/// the next batch re-scans everything anyway.
pub fn observe<M, S, D, F>(source: &M, controller: Rc<RefCell<Controller<S, D>>>, mut on_scan: F)
where
    M: MutationSource + ?Sized,
    S: KeyValueStorage + 'static,
    D: ChatDocument + 'static,
    F: FnMut(ScanReport<D::Container>) + 'static,
{
    source.subscribe(Box::new(move || {
        let report = match controller.try_borrow_mut() {
            Ok(mut controller) => controller.scan(),
            Err(_) => {
                tracing::warn!("controller busy, skipping mutation batch");
                return;
            }
        };
        on_scan(report);
    }));
}
