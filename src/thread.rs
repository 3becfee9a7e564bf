use std::sync::Arc;
use std::thread::{self, ThreadId};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::viewport::{Viewport, ViewportStack};
use crate::window::GlWindow;

pub type Task<T> = Box<dyn FnOnce(&mut T) + Send + 'static>;

// `None` once the queue has shut down. Submitters hold the read lock across
// `send`, so nothing can slip in after `shutdown` drains the channel.
type SharedSender<T> = Arc<RwLock<Option<Sender<Task<T>>>>>;

/// Work deferred onto the thread that owns some non-`Send` target.
/// Tasks run in submission order whenever the owner drains the queue.
pub struct TaskQueue<T> {
    owner: ThreadId,
    sender: SharedSender<T>,
    receiver: Receiver<Task<T>>,
}

/// Cloneable, `Send` side of a `TaskQueue`.
pub struct TaskHandle<T> {
    owner: ThreadId,
    sender: SharedSender<T>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        TaskHandle {
            owner: self.owner,
            sender: self.sender.clone(),
        }
    }
}

impl<T> TaskHandle<T> {
    pub fn submit<F>(&self, task: F) -> Result<()>
        where F: FnOnce(&mut T) + Send + 'static {
        match self.sender.read().as_ref() {
            Some(sender) => sender.send(Box::new(task)).map_err(|_| Error::ThreadShutdown),
            None => Err(Error::ThreadShutdown),
        }
    }

    /// Submits a task whose result is delivered through the returned receiver.
    /// If the queue shuts down before the task runs, the receiver disconnects.
    pub fn query<R, F>(&self, query: F) -> Result<Receiver<R>>
        where R: Send + 'static,
              F: FnOnce(&mut T) -> R + Send + 'static {
        let (tx, rx) = bounded(1);
        self.submit(move |target| {
            // The caller may have stopped waiting
            let _ = tx.send(query(target));
        })?;
        Ok(rx)
    }

    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    pub fn is_shutdown(&self) -> bool {
        self.sender.read().is_none()
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    /// The calling thread becomes the owner.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        TaskQueue {
            owner: thread::current().id(),
            sender: Arc::new(RwLock::new(Some(sender))),
            receiver,
        }
    }

    pub fn handle(&self) -> TaskHandle<T> {
        TaskHandle {
            owner: self.owner,
            sender: self.sender.clone(),
        }
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Removes every queued task. Tasks submitted while these run wait for the next drain.
    pub fn take_pending(&self) -> Vec<Task<T>> {
        self.receiver.try_iter().collect()
    }

    pub fn run_pending(&self, target: &mut T) -> usize {
        let tasks = self.take_pending();
        let count = tasks.len();
        for task in tasks {
            task(target);
        }
        count
    }

    /// Closes the channel and drops anything still queued. Submitting
    /// afterwards fails with `Error::ThreadShutdown`.
    pub fn shutdown(&self) {
        self.sender.write().take();
        let dropped = self.take_pending().len();
        if dropped > 0 {
            debug!(target: "glwindow", "Dropped {} pending tasks on shutdown", dropped);
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.sender.read().is_none()
    }
}

/// The thread owning a window's GL context, with the viewport state bound to that context.
pub struct GlThread {
    tasks: TaskQueue<GlWindow>,
    viewports: ViewportStack,
}

pub type GlThreadHandle = TaskHandle<GlWindow>;

impl Default for GlThread {
    fn default() -> Self {
        GlThread::new()
    }
}

impl GlThread {
    pub fn new() -> Self {
        GlThread {
            tasks: TaskQueue::new(),
            viewports: ViewportStack::default(),
        }
    }

    pub fn handle(&self) -> GlThreadHandle {
        self.tasks.handle()
    }

    pub fn tasks(&self) -> &TaskQueue<GlWindow> {
        &self.tasks
    }

    pub fn viewports(&self) -> &ViewportStack {
        &self.viewports
    }

    pub(crate) fn viewports_mut(&mut self) -> &mut ViewportStack {
        &mut self.viewports
    }

    pub fn current_viewport(&self) -> Viewport {
        self.viewports.current()
    }

    pub fn is_viewport_stack_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    // Callers make the owning context current first.
    pub(crate) fn push_viewport(&mut self, viewport: Viewport) {
        self.viewports.push(viewport);
        viewport.apply();
    }

    pub(crate) fn pop_viewport(&mut self) -> Option<Viewport> {
        let popped = self.viewports.current();
        let previous = self.viewports.pop()?;
        previous.apply();
        Some(popped)
    }

    pub fn shutdown(&self) {
        self.tasks.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossbeam_channel::RecvTimeoutError;

    use super::*;

    #[test]
    fn tasks_run_in_order_on_drain() {
        let queue: TaskQueue<Vec<u32>> = TaskQueue::new();
        let handle = queue.handle();
        handle.submit(|v| v.push(1)).unwrap();
        handle.submit(|v| v.push(2)).unwrap();
        assert_eq!(queue.pending(), 2);

        let mut target = Vec::new();
        assert_eq!(queue.run_pending(&mut target), 2);
        assert_eq!(target, vec![1, 2]);
        assert_eq!(queue.run_pending(&mut target), 0);
    }

    #[test]
    fn submissions_from_another_thread() {
        let queue: TaskQueue<Vec<u32>> = TaskQueue::new();
        let handle = queue.handle();
        assert!(handle.is_owner_thread());

        let worker = std::thread::spawn(move || {
            assert!(!handle.is_owner_thread());
            let answer = handle.query(|v: &mut Vec<u32>| v.len()).unwrap();
            handle.submit(|v| v.push(7)).unwrap();
            answer
        });
        let answer = worker.join().unwrap();

        let mut target = vec![1, 2, 3];
        queue.run_pending(&mut target);
        assert_eq!(answer.recv_timeout(Duration::from_secs(1)).unwrap(), 3);
        assert_eq!(target, vec![1, 2, 3, 7]);
    }

    #[test]
    fn shutdown_rejects_new_tasks() {
        let queue: TaskQueue<Vec<u32>> = TaskQueue::new();
        let handle = queue.handle();
        handle.submit(|v| v.push(1)).unwrap();
        queue.shutdown();

        assert!(queue.is_shutdown());
        assert!(handle.is_shutdown());
        assert!(matches!(handle.submit(|v| v.push(2)), Err(Error::ThreadShutdown)));

        let mut target = Vec::new();
        assert_eq!(queue.run_pending(&mut target), 0);
        assert!(target.is_empty());
    }

    #[test]
    fn dropped_query_does_not_poison_queue() {
        let queue: TaskQueue<u32> = TaskQueue::new();
        let handle = queue.handle();
        drop(handle.query(|n| *n * 2).unwrap());
        handle.submit(|n| *n += 1).unwrap();

        let mut target = 20;
        assert_eq!(queue.run_pending(&mut target), 2);
        assert_eq!(target, 21);
    }

    #[test]
    fn late_submissions_fail_instead_of_hanging() {
        let queue: TaskQueue<u32> = TaskQueue::new();
        let handle = queue.handle();

        let submitter = std::thread::spawn(move || {
            let mut answers = Vec::new();
            while let Ok(answer) = handle.query(|n| *n) {
                answers.push(answer);
                std::thread::sleep(Duration::from_micros(100));
            }
            answers
        });
        std::thread::sleep(Duration::from_millis(20));
        queue.shutdown();
        let answers = submitter.join().unwrap();

        // Nothing ever ran, so every accepted query was dropped and must disconnect
        for answer in answers {
            assert!(matches!(answer.recv_timeout(Duration::from_secs(1)), Err(RecvTimeoutError::Disconnected)));
        }
        assert_eq!(queue.pending(), 0);
    }
}
