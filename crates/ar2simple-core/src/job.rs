//! The unit of work handed to a worker slot.

use std::fmt;

/// One lane's work: a self-contained function moved onto a worker thread.
///
/// The engine guarantees that a job is safe to run concurrently with every
/// other job dispatched in the same pass; it shares nothing mutable with
/// them beyond read-only inputs.
pub struct Job(Box<dyn FnOnce() + Send + 'static>);

impl Job {
    /// Wrap a closure as a job.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self(Box::new(f))
    }

    /// Run the job on the current thread, consuming it.
    pub fn run(self) {
        (self.0)()
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Job(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn run_invokes_closure_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let job = Job::new(move || {
            h.fetch_add(1, Ordering::Relaxed);
        });
        job.run();
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn job_can_cross_threads() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let job = Job::new(move || {
            h.fetch_add(2, Ordering::Relaxed);
        });
        std::thread::spawn(move || job.run()).join().unwrap();
        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }
}
