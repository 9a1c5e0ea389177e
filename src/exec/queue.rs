//! # Priority job queue with a stable FIFO tie-break.
//!
//! Ordering key: job priority **descending**, ties broken by insertion
//! sequence (stable FIFO). The key is explicit — a `(priority, seq)`
//! comparison, never numeric subtraction, which is neither stable nor
//! overflow-safe.
//!
//! ## Rules
//! - Unbounded: `offer` never blocks on capacity.
//! - Single consumer: the worker is the only caller of `pop`.
//! - `close()` rejects further submissions; `pop` keeps returning queued
//!   jobs until the heap is empty, then yields `None`.

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{Mutex, Notify};

use crate::tasks::Job;

/// Heap entry: the ordering key plus the payload.
struct Entry {
    priority: i32,
    seq: u64,
    job: Job,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Max-heap: higher priority pops first; among equals the earlier
        // insertion (smaller seq) must compare greater.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Unbounded priority queue shared between the scheduler and the worker.
pub(crate) struct JobQueue {
    heap: Mutex<BinaryHeap<Entry>>,
    notify: Notify,
    closed: AtomicBool,
    seq: AtomicU64,
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
            seq: AtomicU64::new(0),
        }
    }

    /// Enqueues a job; returns `false` once the queue is closed.
    pub async fn offer(&self, job: Job) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        {
            let mut heap = self.heap.lock().await;
            heap.push(Entry {
                priority: job.priority(),
                seq,
                job,
            });
        }
        self.notify.notify_one();
        true
    }

    /// Dequeues the highest-priority job, waiting if the queue is empty.
    ///
    /// Returns `None` once the queue is closed **and** drained.
    pub async fn pop(&self) -> Option<Job> {
        loop {
            {
                let mut heap = self.heap.lock().await;
                if let Some(entry) = heap.pop() {
                    return Some(entry.job);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return None;
            }
            self.notify.notified().await;
        }
    }

    /// Rejects further submissions and wakes the consumer so it can drain
    /// the remainder and exit.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.heap.lock().await.len()
    }
}
