//! Data source: listener registry and in-order broadcast.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::fault::{contain, DisplayFault};

/// Opaque registration handle. Ids grow monotonically, so ordering by id is
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Receives every message pushed after registration.
pub trait Listener {
    type Message;

    fn recv(&mut self, message: &Rc<Self::Message>) -> Result<(), DisplayFault>;
}

/// Outcome of one [`DataSource::push`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    pub delivered: Vec<ListenerId>,
    pub faults: Vec<(ListenerId, DisplayFault)>,
}

impl PushReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    #[must_use]
    pub fn first_fault(&self) -> Option<&DisplayFault> {
        self.faults.first().map(|(_, fault)| fault)
    }
}

/// Owns its listeners; callers keep only the [`ListenerId`].
#[derive(Debug)]
pub struct DataSource<L> {
    listeners: BTreeMap<ListenerId, L>,
    next_id: u64,
    pushed: u64,
}

impl<L> Default for DataSource<L> {
    fn default() -> Self {
        Self {
            listeners: BTreeMap::new(),
            next_id: 0,
            pushed: 0,
        }
    }
}

impl<L: Listener> DataSource<L> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. It sees only messages pushed from now on.
    pub fn register(&mut self, listener: L) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    /// Remove and return a listener. Unknown ids are a no-op.
    pub fn unregister(&mut self, id: ListenerId) -> Option<L> {
        self.listeners.remove(&id)
    }

    /// Deliver `message` to every listener in registration order.
    ///
    /// A failing listener is recorded in the report; delivery to the others
    /// continues.
    pub fn push(&mut self, message: impl Into<Rc<L::Message>>) -> PushReport {
        let message = message.into();
        self.pushed += 1;
        let mut report = PushReport::default();
        for (&id, listener) in &mut self.listeners {
            let outcome = contain(|| Ok(listener.recv(&message)));
            match outcome {
                Ok(Ok(())) => report.delivered.push(id),
                Ok(Err(fault)) => report.faults.push((id, fault)),
                Err(reason) => report.faults.push((
                    id,
                    DisplayFault::Listener {
                        listener: id,
                        reason,
                    },
                )),
            }
        }
        report
    }

    #[must_use]
    pub fn get(&self, id: ListenerId) -> Option<&L> {
        self.listeners.get(&id)
    }

    pub fn get_mut(&mut self, id: ListenerId) -> Option<&mut L> {
        self.listeners.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Registered ids in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<ListenerId> {
        self.listeners.keys().copied().collect()
    }

    /// Total number of pushes since creation.
    #[must_use]
    pub fn pushed(&self) -> u64 {
        self.pushed
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Records messages into a shared log tagged with its own name.
    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        fail_on: Option<u32>,
        panic_on: Option<u32>,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                name,
                log: Rc::clone(log),
                fail_on: None,
                panic_on: None,
            }
        }
    }

    impl Listener for Recorder {
        type Message = u32;

        fn recv(&mut self, message: &Rc<u32>) -> Result<(), DisplayFault> {
            if self.panic_on == Some(**message) {
                panic!("recorder {} exploded", self.name);
            }
            if self.fail_on == Some(**message) {
                return Err(DisplayFault::Summary(format!("{} rejects {message}", self.name)));
            }
            self.log.borrow_mut().push(format!("{}:{message}", self.name));
            Ok(())
        }
    }

    fn entries(log: &Rc<RefCell<Vec<String>>>) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn push_delivers_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut source = DataSource::new();
        let a = source.register(Recorder::new("a", &log));
        let b = source.register(Recorder::new("b", &log));
        let report = source.push(1u32);
        assert_eq!(report.delivered, vec![a, b]);
        assert!(report.is_clean());
        assert_eq!(entries(&log), vec!["a:1", "b:1"]);
    }

    #[test]
    fn late_listener_sees_only_later_messages() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut source = DataSource::new();
        source.register(Recorder::new("a", &log));
        source.push(1u32);
        source.register(Recorder::new("b", &log));
        source.push(2u32);
        assert_eq!(entries(&log), vec!["a:1", "a:2", "b:2"]);
        assert_eq!(source.pushed(), 2);
    }

    #[test]
    fn unregister_is_idempotent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut source = DataSource::new();
        let a = source.register(Recorder::new("a", &log));
        assert!(source.unregister(a).is_some());
        assert!(source.unregister(a).is_none());
        assert!(source.is_empty());
        source.push(1u32);
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn failing_listener_does_not_stop_delivery() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut source = DataSource::new();
        let mut failing = Recorder::new("a", &log);
        failing.fail_on = Some(2);
        let a = source.register(failing);
        let b = source.register(Recorder::new("b", &log));
        let report = source.push(2u32);
        assert_eq!(report.delivered, vec![b]);
        assert_eq!(report.faults.len(), 1);
        assert_eq!(report.faults[0].0, a);
        assert_eq!(entries(&log), vec!["b:2"]);
    }

    #[test]
    fn panicking_listener_becomes_listener_fault() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut source = DataSource::new();
        let mut exploding = Recorder::new("a", &log);
        exploding.panic_on = Some(3);
        let a = source.register(exploding);
        source.register(Recorder::new("b", &log));
        let report = source.push(3u32);
        let Some(DisplayFault::Listener { listener, reason }) = report.first_fault() else {
            panic!("expected listener fault: {report:?}");
        };
        assert_eq!(*listener, a);
        assert!(reason.contains("recorder a exploded"), "{reason}");
        assert_eq!(entries(&log), vec!["b:3"]);
        // The panicking listener stays registered and keeps receiving.
        source.push(4u32);
        assert_eq!(entries(&log), vec!["b:3", "a:4", "b:4"]);
    }

    #[test]
    fn ids_are_never_reused() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut source = DataSource::new();
        let a = source.register(Recorder::new("a", &log));
        source.unregister(a);
        let b = source.register(Recorder::new("b", &log));
        assert_ne!(a, b);
        assert_eq!(source.ids(), vec![b]);
        assert_eq!(b.to_string(), "listener-1");
    }
}
