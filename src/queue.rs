use std::collections::VecDeque;

/// One pending cast: a trigger key resolved to the skill it should activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastRequest {
    pub trigger_key: u32,
    pub skill_id: u16,
    pub requested_at: u64,
}

/// Ordered list of casts awaiting execution, at most one entry per skill.
///
/// Single-threaded by design; the sequencer owns the queue for its whole
/// lifetime and no synchronization is involved.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: VecDeque<CastRequest>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request, or refresh the timestamp of an already queued cast
    /// for the same skill in place. Queue order never changes on a refresh.
    pub fn push(&mut self, request: CastRequest) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|entry| entry.skill_id == request.skill_id)
        {
            existing.requested_at = request.requested_at;
            return;
        }
        self.entries.push_back(request);
    }

    /// Remove and return the oldest pending cast.
    pub fn pop(&mut self) -> Option<CastRequest> {
        self.entries.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
