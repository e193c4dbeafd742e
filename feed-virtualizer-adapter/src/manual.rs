use alloc::vec::Vec;

use feed_virtualizer::{IdleHandle, IdleScheduler, ObserverOptions, ViewportObserver};

/// An in-memory [`ViewportObserver`].
///
/// It only records what is observed; entries are produced elsewhere (for example by
/// [`crate::SimulatedViewport::intersections`]) and fed to the list by the caller.
#[derive(Clone, Debug)]
pub struct ManualObserver<N> {
    options: Option<ObserverOptions>,
    observed: Vec<N>,
    heights: Vec<(N, f64)>,
    connect_count: usize,
}

impl<N> Default for ManualObserver<N> {
    fn default() -> Self {
        Self {
            options: None,
            observed: Vec::new(),
            heights: Vec::new(),
            connect_count: 0,
        }
    }
}

impl<N: Clone + PartialEq> ManualObserver<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options of the current connection.
    pub fn options(&self) -> Option<&ObserverOptions> {
        self.options.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.options.is_some()
    }

    pub fn connect_count(&self) -> usize {
        self.connect_count
    }

    pub fn observed(&self) -> &[N] {
        &self.observed
    }

    pub fn is_observing(&self, node: &N) -> bool {
        self.observed.contains(node)
    }

    /// Sets the layout height returned by `measure_height` for `node`.
    pub fn set_height(&mut self, node: N, height: f64) {
        match self.heights.iter_mut().find(|(n, _)| *n == node) {
            Some((_, h)) => *h = height,
            None => self.heights.push((node, height)),
        }
    }

    pub fn clear_height(&mut self, node: &N) {
        self.heights.retain(|(n, _)| n != node);
    }
}

impl<N: Clone + PartialEq> ViewportObserver for ManualObserver<N> {
    type Node = N;

    fn connect(&mut self, options: &ObserverOptions) {
        self.options = Some(*options);
        self.observed.clear();
        self.connect_count += 1;
    }

    fn observe(&mut self, node: &N) {
        if !self.observed.contains(node) {
            self.observed.push(node.clone());
        }
    }

    fn unobserve(&mut self, node: &N) {
        self.observed.retain(|n| n != node);
    }

    fn disconnect(&mut self) {
        self.options = None;
        self.observed.clear();
    }

    fn measure_height(&self, node: &N) -> Option<f64> {
        self.heights
            .iter()
            .find(|(n, _)| n == node)
            .map(|(_, h)| *h)
    }
}

/// An [`IdleScheduler`] whose idle periods are granted by the caller.
///
/// The list requests at most one callback at a time; [`Self::take_request`] hands it out so the
/// caller can run `run_idle_tasks` with whatever deadline it likes.
#[derive(Clone, Debug, Default)]
pub struct ManualIdleScheduler {
    unsupported: bool,
    next_id: u64,
    outstanding: Option<IdleHandle>,
    request_count: usize,
    cancel_count: usize,
}

impl ManualIdleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scheduler that refuses every request, as on runtimes without idle callbacks.
    pub fn without_idle_callbacks() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    pub fn is_requested(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Consumes the outstanding request, if any.
    pub fn take_request(&mut self) -> Option<IdleHandle> {
        self.outstanding.take()
    }

    pub fn request_count(&self) -> usize {
        self.request_count
    }

    pub fn cancel_count(&self) -> usize {
        self.cancel_count
    }
}

impl IdleScheduler for ManualIdleScheduler {
    fn request_idle(&mut self) -> Option<IdleHandle> {
        if self.unsupported {
            return None;
        }
        self.next_id += 1;
        let handle = IdleHandle(self.next_id);
        self.outstanding = Some(handle);
        self.request_count += 1;
        Some(handle)
    }

    fn cancel_idle(&mut self, handle: IdleHandle) {
        if self.outstanding == Some(handle) {
            self.outstanding = None;
        }
        self.cancel_count += 1;
    }
}
