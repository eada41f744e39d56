//! Bounded, lock-minimising MPMC channel used between the router and
//! each partition worker (§4.1, §5).
//!
//! The teacher's own queue (`memory::low_latency_mpmc_ring::
//! LowLatencyMpmcRing<T>`) hand-rolled a CAS-based ring sized to a
//! power of two so its index arithmetic could use a bit mask instead
//! of a modulo. That constraint has no equivalent requirement here —
//! `ChannelCapacity` is a caller-specified bound that must be honored
//! exactly, not rounded up (§4.1, §5's resource-limit formula) — so
//! this wraps `crossbeam::channel::bounded` instead: the same
//! non-blocking-producer/FIFO-consumer contract, backed by a
//! general-purpose lock-free MPMC channel rather than a bespoke one.

use crossbeam::channel::{self, Receiver, Sender, TryRecvError, TrySendError};

/// A bounded multi-producer, multi-consumer queue of exactly
/// `capacity` slots.
pub struct PartitionQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    capacity: usize,
}

impl<T> PartitionQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = channel::bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Non-blocking enqueue. Returns the item back if the queue is
    /// momentarily full — the router turns that into a `Backpressure`
    /// rejection rather than retrying itself (§4.1).
    #[inline(always)]
    pub fn try_enqueue(&self, item: T) -> Result<(), T> {
        self.sender.try_send(item).map_err(|err| match err {
            TrySendError::Full(item) => item,
            TrySendError::Disconnected(item) => item,
        })
    }

    #[inline(always)]
    pub fn try_dequeue(&self) -> Option<T> {
        match self.receiver.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.sender.is_full()
    }

    /// Current number of enqueued-but-not-yet-dequeued items.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
