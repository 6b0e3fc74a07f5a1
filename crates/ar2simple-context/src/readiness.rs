//! Idle/claimed bitmask tracker with blocking readiness queries.
//!
//! Each worker slot has two bits: *idle* (the worker finished its last task
//! or never had one) and *claimed* (already handed to the caller by a
//! readiness query and not yet dispatched to). A readiness query returns
//! slots that are idle and unclaimed, and claims them so the next query
//! does not return them again. Dispatching to a slot clears both bits; the
//! worker sets idle again when its task completes and posts the idle
//! semaphore.
//!
//! # Ordering
//!
//! A worker sets its idle bit under the lock, releases the lock, and only
//! then posts. A waiter drains stale permits *before* scanning under the
//! lock. A post that lands after the drain either corresponds to a bit the
//! scan already saw (one spurious wakeup) or to a bit set after the scan
//! (the wakeup the waiter needs). No completion can be missed.

use std::sync::{Mutex, MutexGuard};

use ar2simple_core::PoolError;
use smallvec::SmallVec;

use crate::semaphore::Semaphore;

const WORD_BITS: usize = u64::BITS as usize;

/// Slot indices returned by a readiness query.
pub type ReadyThreads = SmallVec<[usize; 16]>;

fn locate(index: usize) -> (usize, u64) {
    (index / WORD_BITS, 1u64 << (index % WORD_BITS))
}

struct Bitmasks {
    idle: Vec<u64>,
    claimed: Vec<u64>,
    // Every valid slot bit set; the trailing word is partial.
    full: Vec<u64>,
}

impl Bitmasks {
    fn new(slots: usize) -> Self {
        let words = slots.div_ceil(WORD_BITS);
        let full: Vec<u64> = (0..words)
            .map(|w| {
                let bits = (slots - w * WORD_BITS).min(WORD_BITS);
                if bits == WORD_BITS {
                    u64::MAX
                } else {
                    (1u64 << bits) - 1
                }
            })
            .collect();
        Self {
            idle: full.clone(),
            claimed: vec![0; words],
            full,
        }
    }

    /// Claim up to `max` idle, unclaimed slots in ascending index order.
    fn claim_idle(&mut self, max: usize, out: &mut ReadyThreads) {
        for (w, (idle, claimed)) in self.idle.iter().zip(self.claimed.iter_mut()).enumerate() {
            if out.len() == max {
                return;
            }
            let mut avail = *idle & !*claimed;
            while avail != 0 && out.len() < max {
                let bit = avail.trailing_zeros() as usize;
                avail &= avail - 1;
                *claimed |= 1u64 << bit;
                out.push(w * WORD_BITS + bit);
            }
        }
    }

    fn all_claimed(&self) -> bool {
        self.claimed == self.full
    }

    fn reset_claims(&mut self) {
        self.claimed.fill(0);
    }

    fn set_busy(&mut self, index: usize) {
        let (w, bit) = locate(index);
        self.idle[w] &= !bit;
        self.claimed[w] &= !bit;
    }

    fn set_idle(&mut self, index: usize) {
        let (w, bit) = locate(index);
        self.idle[w] |= bit;
    }

    fn is_idle(&self, index: usize) -> bool {
        let (w, bit) = locate(index);
        self.idle[w] & bit != 0
    }

    fn idle_count(&self) -> usize {
        self.idle.iter().map(|w| w.count_ones() as usize).sum()
    }
}

/// Tracks which worker slots are idle and which have been handed out.
///
/// Indices passed to [`mark_busy`](Self::mark_busy),
/// [`mark_idle`](Self::mark_idle), and [`is_idle`](Self::is_idle) must be
/// below [`slots`](Self::slots); the worker pool checks this before calling.
pub struct ReadinessTracker {
    slots: usize,
    masks: Mutex<Bitmasks>,
    idle_signal: Semaphore,
}

impl ReadinessTracker {
    /// A tracker for `slots` workers, all initially idle and unclaimed.
    pub fn new(slots: usize) -> Self {
        Self {
            slots,
            masks: Mutex::new(Bitmasks::new(slots)),
            idle_signal: Semaphore::new(),
        }
    }

    /// Number of tracked slots.
    pub fn slots(&self) -> usize {
        self.slots
    }

    fn masks(&self) -> Result<MutexGuard<'_, Bitmasks>, PoolError> {
        self.masks.lock().map_err(|_| PoolError::LockPoisoned)
    }

    /// Record that `index` is about to receive a task.
    pub fn mark_busy(&self, index: usize) -> Result<(), PoolError> {
        self.masks()?.set_busy(index);
        Ok(())
    }

    /// Record that `index` finished its task and wake one waiter.
    pub fn mark_idle(&self, index: usize) -> Result<(), PoolError> {
        self.masks()?.set_idle(index);
        self.idle_signal.post()
    }

    /// Whether `index` is idle. A poisoned lock reads as not idle.
    pub fn is_idle(&self, index: usize) -> bool {
        self.masks().map(|m| m.is_idle(index)).unwrap_or(false)
    }

    /// Number of idle slots. A poisoned lock reads as zero.
    pub fn idle_count(&self) -> usize {
        self.masks().map(|m| m.idle_count()).unwrap_or(0)
    }

    /// Block until at least one slot is idle and unclaimed, then claim and
    /// return up to `max_count` of them in ascending order.
    ///
    /// Returns an empty list without blocking when `max_count` is zero or
    /// there are no slots.
    pub fn wait_ready(&self, max_count: usize) -> Result<ReadyThreads, PoolError> {
        let mut ready = ReadyThreads::new();
        if max_count == 0 || self.slots == 0 {
            return Ok(ready);
        }
        loop {
            self.idle_signal.drain();
            self.masks()?.claim_idle(max_count, &mut ready);
            if !ready.is_empty() {
                return Ok(ready);
            }
            self.idle_signal.wait()?;
        }
    }

    /// Block until every slot is idle, then reset all claims.
    pub fn wait_all(&self) -> Result<(), PoolError> {
        let mut scratch = ReadyThreads::new();
        loop {
            self.idle_signal.drain();
            {
                let mut masks = self.masks()?;
                scratch.clear();
                masks.claim_idle(self.slots, &mut scratch);
                if masks.all_claimed() {
                    masks.reset_claims();
                    return Ok(());
                }
            }
            self.idle_signal.wait()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn ready(tracker: &ReadinessTracker, max: usize) -> Vec<usize> {
        tracker.wait_ready(max).unwrap().into_vec()
    }

    #[test]
    fn claims_in_ascending_order_without_repeats() {
        let t = ReadinessTracker::new(5);
        assert_eq!(ready(&t, 3), vec![0, 1, 2]);
        assert_eq!(ready(&t, 10), vec![3, 4]);
    }

    #[test]
    fn dispatch_then_completion_makes_slot_ready_again() {
        let t = ReadinessTracker::new(3);
        assert_eq!(ready(&t, 3), vec![0, 1, 2]);
        t.mark_busy(1).unwrap();
        assert!(!t.is_idle(1));
        t.mark_idle(1).unwrap();
        assert_eq!(ready(&t, 3), vec![1]);
    }

    #[test]
    fn spans_multiple_words() {
        let t = ReadinessTracker::new(70);
        let all = ready(&t, 100);
        assert_eq!(all, (0..70).collect::<Vec<_>>());
        t.mark_busy(65).unwrap();
        t.mark_idle(65).unwrap();
        assert_eq!(ready(&t, 100), vec![65]);
    }

    #[test]
    fn zero_request_or_zero_slots_is_empty() {
        let t = ReadinessTracker::new(4);
        assert!(t.wait_ready(0).unwrap().is_empty());
        let empty = ReadinessTracker::new(0);
        assert!(empty.wait_ready(8).unwrap().is_empty());
        empty.wait_all().unwrap();
    }

    #[test]
    fn wait_all_resets_claims() {
        let t = ReadinessTracker::new(4);
        assert_eq!(ready(&t, 2), vec![0, 1]);
        t.wait_all().unwrap();
        assert_eq!(ready(&t, 2), vec![0, 1]);
    }

    #[test]
    fn wait_ready_blocks_until_a_slot_completes() {
        let t = Arc::new(ReadinessTracker::new(4));
        for i in 0..4 {
            t.mark_busy(i).unwrap();
        }
        let worker = Arc::clone(&t);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            worker.mark_idle(2).unwrap();
        });
        assert_eq!(ready(&t, 4), vec![2]);
        handle.join().unwrap();
    }

    #[test]
    fn wait_all_blocks_until_every_slot_completes() {
        let t = Arc::new(ReadinessTracker::new(3));
        for i in 0..3 {
            t.mark_busy(i).unwrap();
        }
        let worker = Arc::clone(&t);
        let handle = thread::spawn(move || {
            for i in (0..3).rev() {
                thread::sleep(Duration::from_millis(10));
                worker.mark_idle(i).unwrap();
            }
        });
        t.wait_all().unwrap();
        assert_eq!(t.idle_count(), 3);
        handle.join().unwrap();
    }
}
