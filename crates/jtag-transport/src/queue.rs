// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use jtag_core::{Envelope, RouteError};
use tokio::sync::{Mutex, Notify};

/// A connection's bounded outbound mailbox. When full, the incoming
/// envelope's priority decides who loses: the oldest entry whose priority
/// is no higher than the incoming one is evicted (FIFO within a priority
/// class — see DESIGN.md Open Question 3). If every queued entry outranks
/// the incoming envelope, the push fails with [`RouteError::QueueFull`]
/// rather than evicting something more important.
pub struct OutboundQueue {
    inner: Mutex<VecDeque<Envelope>>,
    capacity: usize,
    notify: Notify,
    len_hint: AtomicUsize,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            notify: Notify::new(),
            len_hint: AtomicUsize::new(0),
        }
    }

    pub async fn push(&self, envelope: Envelope) -> Result<(), RouteError> {
        let mut guard = self.inner.lock().await;
        if guard.len() >= self.capacity {
            match lowest_priority_at_most(&guard, envelope.priority) {
                Some(index) => {
                    guard.remove(index);
                }
                None => return Err(RouteError::QueueFull),
            }
        } else {
            self.len_hint.fetch_add(1, Ordering::Relaxed);
        }
        guard.push_back(envelope);
        drop(guard);
        self.notify.notify_one();
        Ok(())
    }

    /// Waits for and removes the next envelope, oldest first.
    pub async fn pop(&self) -> Envelope {
        loop {
            {
                let mut guard = self.inner.lock().await;
                if let Some(envelope) = guard.pop_front() {
                    self.len_hint.fetch_sub(1, Ordering::Relaxed);
                    return envelope;
                }
            }
            self.notify.notified().await;
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Lock-free approximation of `len`, used for connection-selection
    /// heuristics (smallest-queue-depth tiebreak) where exactness isn't
    /// worth an async lock.
    pub fn len_hint(&self) -> usize {
        self.len_hint.load(Ordering::Relaxed)
    }
}

fn lowest_priority_at_most(queue: &VecDeque<Envelope>, incoming: jtag_core::Priority) -> Option<usize> {
    queue
        .iter()
        .enumerate()
        .filter(|(_, envelope)| envelope.priority <= incoming)
        .min_by_key(|(index, envelope)| (envelope.priority, *index))
        .map(|(index, _)| index)
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
