use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Fixed-capacity FIFO channel with suspending backpressure. A full queue
/// parks producers instead of dropping or growing; a slow consumer stalls
/// new submissions rather than exhausting memory. Safe for concurrent
/// producers and consumers.
pub struct BoundedWorkQueue<T> {
    state: Mutex<QueueState<T>>,
    capacity: usize,
    /// Signalled when an item is pushed.
    ready: Notify,
    /// Signalled when a slot frees up.
    space: Notify,
}

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> BoundedWorkQueue<T> {
    /// Capacity is clamped to at least one slot.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            }),
            capacity: capacity.max(1),
            ready: Notify::new(),
            space: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Stop accepting new items. Items already queued remain dequeueable;
    /// parked producers and consumers are woken to observe the closure.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_waiters();
        self.space.notify_waiters();
    }

    /// Append an item, suspending while the queue is full. Fails with
    /// `QueueError::Closed` once the queue has been shut down.
    pub async fn enqueue(&self, item: T) -> Result<(), QueueError> {
        loop {
            {
                let mut state = self.lock();
                if state.closed {
                    return Err(QueueError::Closed);
                }
                if state.items.len() < self.capacity {
                    state.items.push_back(item);
                    let has_space = state.items.len() < self.capacity;
                    drop(state);
                    self.ready.notify_one();
                    if has_space {
                        // chain wakeups so no parked producer is stranded
                        self.space.notify_one();
                    }
                    return Ok(());
                }
            }
            self.space.notified().await;
        }
    }

    /// Remove the oldest item, suspending until one is available. Fails
    /// with `QueueError::Cancelled` when the token fires (an
    /// already-cancelled token never consumes an item) and with
    /// `QueueError::Closed` once the queue is closed and drained.
    pub async fn dequeue(&self, cancel: &CancellationToken) -> Result<T, QueueError> {
        loop {
            if cancel.is_cancelled() {
                return Err(QueueError::Cancelled);
            }
            {
                let mut state = self.lock();
                if let Some(item) = state.items.pop_front() {
                    let has_more = !state.items.is_empty();
                    drop(state);
                    self.space.notify_one();
                    if has_more {
                        self.ready.notify_one();
                    }
                    return Ok(item);
                }
                if state.closed {
                    return Err(QueueError::Closed);
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(QueueError::Cancelled),
                _ = self.ready.notified() => {}
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        // a poisoning panic happened outside any critical invariant;
        // the queue state itself is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("queue is closed")]
    Closed,
    #[error("operation cancelled")]
    Cancelled,
}
