use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

lazy_static! {
    static ref ACTIVE_WINDOWS: Mutex<BTreeMap<WindowId, WindowSummary>> = Mutex::new(BTreeMap::new());
}

/// Identifies a window for the lifetime of the process. Passed to every listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    pub fn next() -> Self {
        WindowId(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSummary {
    pub id: WindowId,
    pub title: String,
    pub width: i32,
    pub height: i32,
    pub is_worker: bool,
}

pub fn register(summary: WindowSummary) {
    debug!(target: "glwindow", "Registered window {} ({})", summary.id, summary.title);
    ACTIVE_WINDOWS.lock().insert(summary.id, summary);
}

pub fn unregister(id: WindowId) -> bool {
    let removed = ACTIVE_WINDOWS.lock().remove(&id).is_some();
    if removed {
        debug!(target: "glwindow", "Unregistered window {}", id);
    }
    removed
}

pub fn is_registered(id: WindowId) -> bool {
    ACTIVE_WINDOWS.lock().contains_key(&id)
}

/// Every window that has been initialized and not yet destroyed, ordered by id.
pub fn active_windows() -> Vec<WindowSummary> {
    ACTIVE_WINDOWS.lock().values().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(title: &str) -> WindowSummary {
        WindowSummary {
            id: WindowId::next(),
            title: title.to_string(),
            width: 640,
            height: 480,
            is_worker: false,
        }
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = WindowId::next();
        let b = WindowId::next();
        assert!(b > a);
    }

    #[test]
    fn register_and_unregister() {
        let main = summary("main");
        let id = main.id;
        register(main);
        assert!(is_registered(id));
        assert!(active_windows().iter().any(|w| w.id == id && w.title == "main"));

        assert!(unregister(id));
        assert!(!unregister(id));
        assert!(!is_registered(id));
    }
}
