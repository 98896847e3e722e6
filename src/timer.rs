/// One-shot timers, as provided by the host event loop.
///
/// [`Scheduler::cancel`] stops the task and releases it along with
/// everything it captured. Callers keep the handle until the task has run
/// or been cancelled.
pub trait Scheduler {
    type Handle;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;

    fn cancel(&self, handle: Self::Handle);
}
