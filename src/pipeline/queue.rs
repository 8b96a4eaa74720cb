//! Bounded inter-task queues.
//!
//! - [`BoundedQueue`]: fixed-capacity FIFO over a crossbeam bounded channel.
//!   A full queue drops the offered item (drop-newest), either immediately or
//!   after a bounded wait.
//! - [`LatestSlot`]: single-slot hand-off where an unread value is replaced by
//!   the newer one.
//!
//! Both are created once before any task starts and shared by reference; the
//! capacity never changes afterwards.

use std::time::Duration;

use crossbeam::channel::{Receiver, SendTimeoutError, Sender, TryRecvError, TrySendError, bounded};
use crossbeam_queue::ArrayQueue;
use log::debug;

use crate::config::SCORE_QUEUE_LEN;

pub struct BoundedQueue<T> {
    name: &'static str,
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> BoundedQueue<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { name, tx, rx }
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Non-blocking enqueue. Returns `false` and drops `item` when full.
    pub fn try_send(&self, item: T) -> bool {
        match self.tx.try_send(item) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("[{}] full ({}), dropping newest", self.name, self.len());
                false
            }
            // The queue owns both ends; disconnection cannot happen while `self` lives.
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Waits up to `timeout` for space. Returns `false` and drops `item` on timeout.
    pub fn send_with_timeout(&self, item: T, timeout: Duration) -> bool {
        match self.tx.send_timeout(item, timeout) {
            Ok(()) => true,
            Err(SendTimeoutError::Timeout(_)) => {
                debug!("[{}] send timed out after {:?}, dropping", self.name, timeout);
                false
            }
            Err(SendTimeoutError::Disconnected(_)) => false,
        }
    }

    /// Non-blocking dequeue of the oldest item.
    pub fn try_receive(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Capacity-1 latest-value queue.
pub struct LatestSlot<T> {
    slot: ArrayQueue<T>,
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: ArrayQueue::new(SCORE_QUEUE_LEN),
        }
    }

    /// Never blocks. Returns `true` if an unread value was overwritten.
    pub fn publish(&self, value: T) -> bool {
        self.slot.force_push(value).is_some()
    }

    pub fn try_receive(&self) -> Option<T> {
        self.slot.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_empty()
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
