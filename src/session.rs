//! Request tracking: supersession and cooperative cancellation.
//!
//! Only the latest request's result is shown. Starting a request raises the
//! cancel flag of the one before it; the expander polls that flag between
//! neighbor lookups and stops growing the tree once it is set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// One in-flight request.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    id: Uuid,
    cancel: Arc<AtomicBool>,
}

impl RequestHandle {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Flag handed to the expander.
    pub fn cancel_flag(&self) -> &AtomicBool {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// Tracks the latest request.
#[derive(Debug, Default)]
pub struct RequestTracker {
    current: Mutex<Option<RequestHandle>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding (and cancelling) the previous one.
    pub fn begin(&self) -> RequestHandle {
        let handle = RequestHandle::new();
        let mut current = self.lock();
        if let Some(previous) = current.replace(handle.clone()) {
            previous.cancel();
        }
        handle
    }

    pub fn is_current(&self, handle: &RequestHandle) -> bool {
        self.lock().as_ref().map_or(false, |c| c.id == handle.id)
    }

    /// End `handle`. Returns false when a newer request replaced it, in
    /// which case its result should be discarded.
    pub fn finish(&self, handle: &RequestHandle) -> bool {
        let mut current = self.lock();
        match current.as_ref() {
            Some(c) if c.id == handle.id => {
                *current = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel whatever is in flight.
    pub fn cancel_all(&self) {
        if let Some(c) = self.lock().take() {
            c.cancel();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<RequestHandle>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
