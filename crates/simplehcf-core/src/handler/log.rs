//! Shared append-only logs used by the observing handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::request::HttpRequest;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered record of requests observed by a handler.
///
/// Cloning yields another handle onto the same log, so one log can be
/// shared between several handlers and the code inspecting it.
#[derive(Debug, Clone, Default)]
pub struct TrafficLog {
    entries: Arc<Mutex<Vec<HttpRequest>>>,
}

impl TrafficLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a copy of `req`.
    pub fn record(&self, req: &HttpRequest) {
        lock(&self.entries).push(req.clone());
    }

    /// Snapshot of every recorded request, oldest first.
    pub fn entries(&self) -> Vec<HttpRequest> {
        lock(&self.entries).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

/// Ordered record of which stages a request passed through.
#[derive(Debug, Clone, Default)]
pub struct VisitLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl VisitLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, stage: &str) {
        lock(&self.entries).push(stage.to_owned());
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}
