use std::sync::Arc;

use crate::events::WindowCallback;
use crate::listeners::{ListenerId, Listeners};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Created,
    Initialized,
    Destroyed,
}

/// Lifecycle state of a window and the hooks run when it is torn down.
pub struct Lifecycle {
    stage: Stage,
    cleanup_tasks: Listeners<dyn FnMut()>,
    on_close: Option<WindowCallback>,
    context_lost_listeners: Listeners<dyn FnMut()>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Lifecycle {
            stage: Stage::Created,
            cleanup_tasks: Listeners::default(),
            on_close: None,
            context_lost_listeners: Listeners::default(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_valid(&self) -> bool {
        self.stage == Stage::Initialized
    }

    pub fn mark_initialized(&mut self) {
        if self.stage == Stage::Created {
            self.stage = Stage::Initialized;
        }
    }

    pub fn append_cleanup(&mut self, task: Box<dyn FnMut()>) -> ListenerId {
        self.cleanup_tasks.add(task)
    }

    pub fn remove_cleanup(&mut self, id: ListenerId) -> bool {
        self.cleanup_tasks.remove(id)
    }

    pub fn clear_cleanup(&mut self) {
        self.cleanup_tasks.clear();
    }

    pub fn cleanup_len(&self) -> usize {
        self.cleanup_tasks.len()
    }

    pub fn set_on_close(&mut self, callback: Option<WindowCallback>) {
        self.on_close = callback;
    }

    pub fn add_context_lost_listener(&mut self, listener: Box<dyn FnMut()>) -> ListenerId {
        self.context_lost_listeners.add(listener)
    }

    pub fn remove_context_lost_listener(&mut self, id: ListenerId) -> bool {
        self.context_lost_listeners.remove(id)
    }

    /// Runs the teardown sequence of an initialized window: cleanup tasks
    /// (then forgotten), `close_workers`, the on-close callback, `destroy`,
    /// the context-lost listeners and finally `release`. Returns false without
    /// doing anything if the window is not initialized.
    pub fn teardown<W, D, R>(&mut self, close_workers: W, destroy: D, release: R) -> bool
        where W: FnOnce(),
              D: FnOnce(),
              R: FnOnce() {
        if self.stage != Stage::Initialized {
            return false;
        }

        self.cleanup_tasks.for_each_mut(|task| task());
        self.cleanup_tasks.clear();

        close_workers();

        if let Some(on_close) = self.on_close.as_mut() {
            on_close();
        }

        destroy();
        self.stage = Stage::Destroyed;

        self.context_lost_listeners.for_each_mut(|listener| listener());
        release();
        true
    }
}

/// Tracks whether a context handed out to another thread is still held.
/// The owner keeps the `Lease`; the borrower keeps the `LeaseToken`.
#[derive(Debug, Default)]
pub struct Lease(Arc<()>);

#[derive(Debug)]
pub struct LeaseToken(#[allow(dead_code)] Arc<()>);

impl Lease {
    pub fn new() -> Self {
        Lease::default()
    }

    pub fn token(&self) -> LeaseToken {
        LeaseToken(self.0.clone())
    }

    pub fn outstanding(&self) -> usize {
        Arc::strong_count(&self.0) - 1
    }

    pub fn is_released(&self) -> bool {
        self.outstanding() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::registry::{self, WindowId, WindowSummary};
    use crate::thread::TaskQueue;

    use super::*;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn push(log: &Log, entry: &'static str) -> impl FnMut() {
        let log = log.clone();
        move || log.borrow_mut().push(entry)
    }

    #[test]
    fn teardown_runs_hooks_in_order() {
        let log: Log = Rc::default();
        let mut lifecycle = Lifecycle::new();
        lifecycle.mark_initialized();

        lifecycle.append_cleanup(Box::new(push(&log, "cleanup 1")));
        lifecycle.append_cleanup(Box::new(push(&log, "cleanup 2")));
        lifecycle.set_on_close(Some(Box::new(push(&log, "on close"))));
        lifecycle.add_context_lost_listener(Box::new(push(&log, "context lost")));

        let mut close_workers = push(&log, "workers");
        let mut destroy = push(&log, "destroy");
        let mut release = push(&log, "release");
        assert!(lifecycle.teardown(|| close_workers(), || destroy(), || release()));

        assert_eq!(*log.borrow(), vec!["cleanup 1", "cleanup 2", "workers", "on close", "destroy", "context lost", "release"]);
        assert_eq!(lifecycle.cleanup_len(), 0);
        assert_eq!(lifecycle.stage(), Stage::Destroyed);
        assert!(!lifecycle.is_valid());
    }

    #[test]
    fn teardown_happens_once() {
        let log: Log = Rc::default();
        let mut lifecycle = Lifecycle::new();
        lifecycle.set_on_close(Some(Box::new(push(&log, "on close"))));

        assert!(!lifecycle.teardown(|| {}, || {}, || {}));
        assert!(log.borrow().is_empty());

        lifecycle.mark_initialized();
        assert!(lifecycle.is_valid());
        assert!(lifecycle.teardown(|| {}, || {}, || {}));
        assert!(!lifecycle.teardown(|| {}, || {}, || {}));
        assert_eq!(*log.borrow(), vec!["on close"]);

        lifecycle.mark_initialized();
        assert_eq!(lifecycle.stage(), Stage::Destroyed);
    }

    #[test]
    fn removed_hooks_do_not_run() {
        let log: Log = Rc::default();
        let mut lifecycle = Lifecycle::new();
        lifecycle.mark_initialized();

        let cleanup = lifecycle.append_cleanup(Box::new(push(&log, "cleanup")));
        let lost = lifecycle.add_context_lost_listener(Box::new(push(&log, "context lost")));
        assert!(lifecycle.remove_cleanup(cleanup));
        assert!(lifecycle.remove_context_lost_listener(lost));
        assert!(!lifecycle.remove_cleanup(cleanup));

        lifecycle.teardown(|| {}, || {}, || {});
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn release_deregisters_and_shuts_down_thread() {
        let id = WindowId::next();
        registry::register(WindowSummary { id, title: "teardown".to_string(), width: 1, height: 1, is_worker: false });
        let tasks: TaskQueue<()> = TaskQueue::new();
        let handle = tasks.handle();

        let mut lifecycle = Lifecycle::new();
        lifecycle.mark_initialized();
        let destroyed = Rc::new(RefCell::new(false));
        let seen_by_release = destroyed.clone();
        lifecycle.teardown(|| {}, || *destroyed.borrow_mut() = true, || {
            assert!(*seen_by_release.borrow());
            registry::unregister(id);
            tasks.shutdown();
        });

        assert!(!registry::is_registered(id));
        assert!(handle.is_shutdown());
    }

    #[test]
    fn lease_counts_outstanding_tokens() {
        let lease = Lease::new();
        assert!(lease.is_released());

        let first = lease.token();
        let second = lease.token();
        assert_eq!(lease.outstanding(), 2);

        drop(first);
        assert_eq!(lease.outstanding(), 1);
        let moved = std::thread::spawn(move || drop(second));
        moved.join().unwrap();
        assert!(lease.is_released());
    }
}
