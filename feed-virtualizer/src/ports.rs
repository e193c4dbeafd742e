//! Platform capabilities the list is driven through.
//!
//! Browsers provide these as `IntersectionObserver`, `requestIdleCallback` and the scrolling
//! element; tests provide deterministic fakes.

/// Where the observer's root is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObserverRoot {
    /// The top-level viewport (the list is bound to the document).
    Viewport,
    /// The list's own scroll container.
    ScrollContainer,
}

/// Root margin, as `"{vertical_percent}% {horizontal_px}px"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootMargin {
    /// Vertical growth of the root box, in percent of the root height.
    pub vertical_percent: u32,
    pub horizontal_px: u32,
}

impl RootMargin {
    pub const fn new(vertical_percent: u32, horizontal_px: u32) -> Self {
        Self {
            vertical_percent,
            horizontal_px,
        }
    }

    /// The vertical margin in pixels for a root of `root_height` pixels.
    pub fn vertical_px(&self, root_height: u64) -> u64 {
        root_height.saturating_mul(self.vertical_percent as u64) / 100
    }
}

impl core::fmt::Display for RootMargin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}% {}px", self.vertical_percent, self.horizontal_px)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObserverOptions {
    pub root: ObserverRoot,
    /// `None` keeps the platform default (no margin).
    pub root_margin: Option<RootMargin>,
}

/// An intersection-observation facility.
///
/// Implementations report changes asynchronously; the adapter resolves each reported target to
/// its item id and feeds the batch to [`crate::VirtualizedList::on_intersections`].
pub trait ViewportObserver {
    type Node: Clone;

    fn connect(&mut self, options: &ObserverOptions);
    fn observe(&mut self, node: &Self::Node);
    fn unobserve(&mut self, node: &Self::Node);
    fn disconnect(&mut self);

    /// Current layout height of `node`, if the platform can query it.
    ///
    /// Returning `None` makes the list fall back to the height carried by the last
    /// intersection entry.
    fn measure_height(&self, _node: &Self::Node) -> Option<f64> {
        None
    }
}

/// Opaque handle of a requested idle callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdleHandle(pub u64);

/// An idle-time callback facility (`requestIdleCallback`).
///
/// When the requested callback fires, the adapter calls
/// [`crate::VirtualizedList::run_idle_tasks`] with the deadline it received.
pub trait IdleScheduler {
    /// Requests one idle callback. `None` means the runtime has no idle callbacks; the list then
    /// runs its queued tasks from `tick` after `idle_fallback_delay_ms`.
    fn request_idle(&mut self) -> Option<IdleHandle>;
    fn cancel_idle(&mut self, handle: IdleHandle);
}

/// Time budget of one idle period.
pub trait IdleDeadline {
    fn time_remaining_ms(&self) -> f64;
}

/// A deadline that never runs out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unbounded;

impl IdleDeadline for Unbounded {
    fn time_remaining_ms(&self) -> f64 {
        f64::INFINITY
    }
}

impl IdleDeadline for f64 {
    fn time_remaining_ms(&self) -> f64 {
        *self
    }
}

/// The element that scrolls: either the list's own container or the document.
pub trait ScrollHost {
    fn scroll_top(&self) -> u64;
    fn scroll_height(&self) -> u64;
    fn client_height(&self) -> u64;
    fn set_scroll_top(&mut self, top: u64);
}
