//! Counting semaphore over an unbounded channel.
//!
//! Each `post` leaves one permit in the channel; `wait` consumes one,
//! blocking while none are available. The semaphore owns both ends, so the
//! channel cannot disconnect while it is alive.

use ar2simple_core::PoolError;
use crossbeam_channel::{unbounded, Receiver, Sender};

pub(crate) struct Semaphore {
    permits: Sender<()>,
    waiters: Receiver<()>,
}

impl Semaphore {
    pub(crate) fn new() -> Self {
        let (permits, waiters) = unbounded();
        Self { permits, waiters }
    }

    pub(crate) fn post(&self) -> Result<(), PoolError> {
        self.permits.send(()).map_err(|_| PoolError::SignalClosed)
    }

    pub(crate) fn wait(&self) -> Result<(), PoolError> {
        self.waiters.recv().map_err(|_| PoolError::SignalClosed)
    }

    /// Discard every pending permit; returns how many were dropped.
    pub(crate) fn drain(&self) -> usize {
        self.waiters.try_iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn post_then_wait_does_not_block() {
        let s = Semaphore::new();
        s.post().unwrap();
        s.post().unwrap();
        s.wait().unwrap();
        assert_eq!(s.drain(), 1);
        assert_eq!(s.drain(), 0);
    }

    #[test]
    fn wait_blocks_until_post() {
        let s = Arc::new(Semaphore::new());
        let poster = Arc::clone(&s);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            poster.post().unwrap();
        });
        s.wait().unwrap();
        handle.join().unwrap();
    }
}
