use std::{collections::HashSet, hash::Hash};

use parking_lot::Mutex;
use tokio::sync::SemaphorePermit;
use tracing::trace;

/// Proof of admission: one running-set entry plus the permit backing it.
///
/// Dropping it removes the entry first and only then returns the permit.
pub(super) struct Admission<'a, I>
where
    I: Eq + Hash,
{
    id: I,
    running: &'a Mutex<HashSet<I>>,
    _permit: SemaphorePermit<'a>,
}

impl<'a, I> Admission<'a, I>
where
    I: Eq + Hash,
{
    pub(super) fn new(id: I, running: &'a Mutex<HashSet<I>>, permit: SemaphorePermit<'a>) -> Self {
        Self {
            id,
            running,
            _permit: permit,
        }
    }

    pub(super) fn id(&self) -> &I {
        &self.id
    }
}

impl<I> Drop for Admission<'_, I>
where
    I: Eq + Hash,
{
    fn drop(&mut self) {
        let mut running = self.running.lock();
        running.remove(&self.id);
        trace!(target: "shellq.queue", running = running.len(), "released");
    }
}
