use ar2simple_alloc::SecureBuf;
use ar2simple_context::{ContextError, ExecutionContext, ReadyThreads};
use ar2simple_core::Job;

/// One callback observed by a [`RecordingContext`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Init { desired: usize, created: usize },
    Ready { max: usize, got: usize },
    Run { index: usize },
    Join,
    Destroy,
    Allocate { bytes: usize },
    Deallocate { bytes: usize },
}

/// Wraps an [`ExecutionContext`] and records every call made through it.
pub struct RecordingContext<C> {
    inner: C,
    calls: Vec<Call>,
}

impl<C: ExecutionContext> RecordingContext<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Bytes allocated and not yet deallocated.
    pub fn outstanding_bytes(&self) -> isize {
        self.calls.iter().fold(0, |acc, call| match call {
            Call::Allocate { bytes } => acc + *bytes as isize,
            Call::Deallocate { bytes } => acc - *bytes as isize,
            _ => acc,
        })
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl<C: ExecutionContext> ExecutionContext for RecordingContext<C> {
    fn init_thread_pool(&mut self, desired: usize) -> Result<usize, ContextError> {
        let created = self.inner.init_thread_pool(desired)?;
        self.calls.push(Call::Init { desired, created });
        Ok(created)
    }

    fn get_ready_threads(&mut self, max: usize) -> Result<ReadyThreads, ContextError> {
        let ready = self.inner.get_ready_threads(max)?;
        self.calls.push(Call::Ready {
            max,
            got: ready.len(),
        });
        Ok(ready)
    }

    fn run_thread(&mut self, index: usize, job: Job) -> Result<(), ContextError> {
        self.calls.push(Call::Run { index });
        self.inner.run_thread(index, job)
    }

    fn join_thread_pool(&mut self) -> Result<(), ContextError> {
        self.calls.push(Call::Join);
        self.inner.join_thread_pool()
    }

    fn destroy_thread_pool(&mut self) -> Result<(), ContextError> {
        self.calls.push(Call::Destroy);
        self.inner.destroy_thread_pool()
    }

    fn allocate(
        &mut self,
        count: usize,
        element_size: usize,
        alignment: usize,
    ) -> Result<SecureBuf, ContextError> {
        let buf = self.inner.allocate(count, element_size, alignment)?;
        self.calls.push(Call::Allocate { bytes: buf.len() });
        Ok(buf)
    }

    fn deallocate(&mut self, buf: SecureBuf) {
        self.calls.push(Call::Deallocate { bytes: buf.len() });
        self.inner.deallocate(buf);
    }
}
