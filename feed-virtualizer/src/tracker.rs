use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::key::{ItemKey, KeyMap};
use crate::{IntersectionEntry, ObserverOptions, ViewportObserver};

/// Per-item intersection callback.
pub type IntersectionCallback<K> = Box<dyn FnMut(&IntersectionEntry<K>)>;

struct Registration<N, K> {
    node: N,
    on_change: IntersectionCallback<K>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Connection {
    /// Never connected; registrations wait in the backlog.
    Pending,
    Connected,
    Disconnected,
}

/// A single intersection observer shared by every item of one list.
///
/// Maps item ids to their observed nodes and fans reported entries out to per-item callbacks.
/// Each item only ever touches its own registration.
pub struct ViewportIntersectionTracker<K, O: ViewportObserver> {
    observer: O,
    connection: Connection,
    options: Option<ObserverOptions>,
    registrations: KeyMap<K, Registration<O::Node, K>>,
    backlog: Vec<(K, Registration<O::Node, K>)>,
}

impl<K: ItemKey, O: ViewportObserver> ViewportIntersectionTracker<K, O> {
    pub fn new(observer: O) -> Self {
        Self {
            observer,
            connection: Connection::Pending,
            options: None,
            registrations: KeyMap::new(),
            backlog: Vec::new(),
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn options(&self) -> Option<&ObserverOptions> {
        self.options.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection == Connection::Connected
    }

    /// Number of live registrations (backlog excluded).
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    pub fn is_observing(&self, id: &K) -> bool {
        self.registrations.contains_key(id)
    }

    /// (Re)creates the observer with `options`.
    ///
    /// When already connected, the old observer is torn down and every live registration is
    /// observed again. Registrations queued before the first connect are flushed.
    pub fn connect(&mut self, options: ObserverOptions) {
        if self.connection == Connection::Connected {
            vdebug!("tracker reconnect");
            self.observer.disconnect();
        }
        self.observer.connect(&options);
        self.options = Some(options);
        self.connection = Connection::Connected;

        for reg in self.registrations.values() {
            self.observer.observe(&reg.node);
        }
        for (id, reg) in core::mem::take(&mut self.backlog) {
            self.insert(id, reg);
        }
        vdebug!(observed = self.registrations.len(), "tracker connected");
    }

    pub fn observe(
        &mut self,
        id: K,
        node: O::Node,
        on_change: impl FnMut(&IntersectionEntry<K>) + 'static,
    ) {
        let reg = Registration {
            node,
            on_change: Box::new(on_change),
        };
        match self.connection {
            Connection::Connected => self.insert(id, reg),
            Connection::Pending => {
                self.backlog.retain(|(queued, _)| *queued != id);
                self.backlog.push((id, reg));
            }
            Connection::Disconnected => {
                vwarn!("ViewportIntersectionTracker: observe called after disconnect; ignored");
            }
        }
    }

    fn insert(&mut self, id: K, reg: Registration<O::Node, K>) {
        // Unobserve first: the new node may be the very same element.
        if let Some(prev) = self.registrations.remove(&id) {
            self.observer.unobserve(&prev.node);
        }
        self.observer.observe(&reg.node);
        self.registrations.insert(id, reg);
    }

    /// Stops tracking `id`. Unknown ids (never registered, already removed) are ignored.
    pub fn unobserve(&mut self, id: &K, node: &O::Node) {
        if let Some(pos) = self.backlog.iter().position(|(queued, _)| queued == id) {
            self.backlog.remove(pos);
            return;
        }
        if self.registrations.remove(id).is_none() {
            return;
        }
        // Detached nodes are fine here: the platform simply stops reporting them.
        if self.connection == Connection::Connected {
            self.observer.unobserve(node);
        }
    }

    pub fn disconnect(&mut self) {
        if self.connection != Connection::Connected {
            self.backlog.clear();
            self.connection = Connection::Disconnected;
            return;
        }
        self.registrations.clear();
        self.backlog.clear();
        self.observer.disconnect();
        self.connection = Connection::Disconnected;
        vdebug!("tracker disconnected");
    }

    /// Dispatches one batch of observer entries to the registered callbacks.
    ///
    /// Entries for ids that are not registered are dropped.
    pub fn deliver(&mut self, entries: impl IntoIterator<Item = IntersectionEntry<K>>) {
        if self.connection != Connection::Connected {
            return;
        }
        for entry in entries {
            if let Some(reg) = self.registrations.get_mut(&entry.id) {
                (reg.on_change)(&entry);
            }
        }
    }

    /// Layout height of the node registered for `id`, if the observer can query it.
    pub fn measure(&self, id: &K) -> Option<f64> {
        let reg = self.registrations.get(id)?;
        self.observer.measure_height(&reg.node)
    }
}

impl<K, O> core::fmt::Debug for ViewportIntersectionTracker<K, O>
where
    O: ViewportObserver + core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewportIntersectionTracker")
            .field("observer", &self.observer)
            .field("connection", &self.connection)
            .field("options", &self.options)
            .field("registrations", &self.registrations.len())
            .field("backlog", &self.backlog.len())
            .finish()
    }
}
