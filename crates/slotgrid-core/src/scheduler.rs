#![forbid(unsafe_code)]

//! Execution-context submission primitives supplied by the host.
//!
//! Two logical contexts exist:
//!
//! - **Foreground**: single-threaded; the only context allowed to mutate or
//!   show containers.
//! - **Background**: multi-threaded; used for potentially slow population.

/// A unit of work handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Host scheduling seam.
pub trait Scheduler: Send + Sync {
    /// Whether the calling thread is the foreground context.
    fn is_foreground(&self) -> bool;

    /// Queue a task on the foreground context.
    ///
    /// Tasks run in submission order. Submitting from the foreground itself
    /// still defers the task.
    fn run_foreground(&self, task: Task);

    /// Run a task on the background context.
    fn run_background(&self, task: Task);

    /// Run on the foreground: inline when already there, queued otherwise.
    fn run_foreground_now(&self, task: Task) {
        if self.is_foreground() {
            task();
        } else {
            self.run_foreground(task);
        }
    }
}
