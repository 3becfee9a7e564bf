use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_LISTENER_ID: AtomicUsize = AtomicUsize::new(1);

/// Handle returned when registering a listener, used to remove it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(usize);

impl ListenerId {
    fn next() -> Self {
        ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Listeners notified in registration order.
pub struct Listeners<L: ?Sized> {
    entries: Vec<(ListenerId, Box<L>)>,
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Listeners { entries: Vec::new() }
    }
}

impl<L: ?Sized> Listeners<L> {
    pub fn add(&mut self, listener: Box<L>) -> ListenerId {
        let id = ListenerId::next();
        self.entries.push((id, listener));
        id
    }

    pub fn add_all<I: IntoIterator<Item = Box<L>>>(&mut self, listeners: I) -> Vec<ListenerId> {
        listeners.into_iter().map(|l| self.add(l)).collect()
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<ListenerId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn for_each_mut<F: FnMut(&mut L)>(&mut self, mut f: F) {
        for (_, listener) in self.entries.iter_mut() {
            f(&mut **listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Callback = dyn FnMut(&mut Vec<u32>);

    #[test]
    fn notified_in_registration_order() {
        let mut listeners: Listeners<Callback> = Listeners::default();
        listeners.add(Box::new(|out: &mut Vec<u32>| out.push(1)));
        listeners.add(Box::new(|out: &mut Vec<u32>| out.push(2)));
        listeners.add(Box::new(|out: &mut Vec<u32>| out.push(3)));

        let mut out = Vec::new();
        listeners.for_each_mut(|l| l(&mut out));
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn remove_by_id() {
        let mut listeners: Listeners<Callback> = Listeners::default();
        let first = listeners.add(Box::new(|out: &mut Vec<u32>| out.push(1)));
        let second = listeners.add(Box::new(|out: &mut Vec<u32>| out.push(2)));
        assert_ne!(first, second);

        assert!(listeners.remove(first));
        assert!(!listeners.remove(first));
        assert_eq!(listeners.ids(), vec![second]);

        let mut out = Vec::new();
        listeners.for_each_mut(|l| l(&mut out));
        assert_eq!(out, vec![2]);

        listeners.clear();
        assert!(listeners.is_empty());
    }

    #[test]
    fn add_all_returns_every_id() {
        let mut listeners: Listeners<Callback> = Listeners::default();
        let boxed: Vec<Box<Callback>> = vec![
            Box::new(|out: &mut Vec<u32>| out.push(1)),
            Box::new(|out: &mut Vec<u32>| out.push(2)),
        ];
        let ids = listeners.add_all(boxed);
        assert_eq!(ids.len(), 2);
        assert_eq!(listeners.len(), 2);
    }
}
