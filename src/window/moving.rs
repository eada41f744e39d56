//! Fixed-capacity ring used for the per-symbol moving average.
//!
//! Adapted from `memory::ring_buffer::RingBuffer` in the teacher repo,
//! but unsynchronized — a `MovingWindow` is owned by exactly one
//! `PartitionWorker` and never touched from another thread, so none of
//! the teacher's atomics or SIMD store machinery apply here. The
//! teacher's ring also rounded its capacity up to a power of two so its
//! index arithmetic could use a bit mask; that constraint existed only
//! to support the lock-free index math this module already dropped, so
//! capacity is kept exactly as configured (§3/§4.3: `MovingAverage` is
//! the mean of the last `min(UpdateCount, W)` prices — silently
//! enlarging `W` would violate that).

use crate::core::price::Price;

pub struct MovingWindow {
    slots: Box<[Price]>,
    capacity: usize,
    len: usize,
    write_idx: usize,
    /// Running sum of the slots currently populated, kept at higher
    /// precision than a single `Price` so it never overflows across a
    /// long-running symbol's lifetime (§4.3).
    running_sum: i128,
}

impl MovingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![Price::from_raw(0); capacity].into_boxed_slice(),
            capacity,
            len: 0,
            write_idx: 0,
            running_sum: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Pushes `price`, evicting the oldest entry once the window is
    /// full. Returns the evicted price, if any.
    pub fn push(&mut self, price: Price) -> Option<Price> {
        let evicted = if self.len == self.capacity {
            let evicted = self.slots[self.write_idx];
            self.running_sum -= evicted.raw() as i128;
            Some(evicted)
        } else {
            self.len += 1;
            None
        };

        self.slots[self.write_idx] = price;
        self.running_sum += price.raw() as i128;
        self.write_idx = (self.write_idx + 1) % self.capacity;

        evicted
    }

    /// Arithmetic mean of the currently populated slots. Rounding is
    /// applied here, on read, never on the running sum.
    pub fn mean(&self) -> Price {
        if self.len == 0 {
            return Price::from_raw(0);
        }
        Price::from_raw((self.running_sum / self.len as i128) as i64)
    }
}
