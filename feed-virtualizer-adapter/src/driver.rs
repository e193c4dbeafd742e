use alloc::vec::Vec;

use feed_virtualizer::{ItemKey, ListOptions, ListProps, ListView, ScrollHost, VirtualizedList};

use crate::{ManualIdleScheduler, ManualObserver, SimulatedViewport};

/// A [`VirtualizedList`] wired to the in-memory ports of this crate. Item ids double as nodes.
pub type ManualList<K> =
    VirtualizedList<K, SimulatedViewport<K>, ManualObserver<K>, ManualIdleScheduler>;

/// A framework-neutral frame loop around a [`ManualList`].
///
/// It plays the part of the UI layer: it attaches a node for every row, lays rows out in a
/// [`SimulatedViewport`], turns layout into intersection entries and grants idle periods. Use it
/// for headless tests and demos; a real adapter does the same with its own widgets.
///
/// - `set_items` when the data changes (update, layout, commit)
/// - `scroll_to` / `scroll_by` / `wheel` / `mouse_move` on input
/// - `frame(now_ms)` once per frame
#[derive(Debug)]
pub struct FeedDriver<K: ItemKey + 'static> {
    list: ManualList<K>,
    idle_budget_ms: f64,
}

impl<K: ItemKey + 'static> FeedDriver<K> {
    pub fn new(options: ListOptions<K>, viewport: SimulatedViewport<K>) -> Self {
        Self::from_list(VirtualizedList::new(
            options,
            viewport,
            ManualObserver::new(),
            ManualIdleScheduler::new(),
        ))
    }

    pub fn from_list(list: ManualList<K>) -> Self {
        Self {
            list,
            idle_budget_ms: f64::INFINITY,
        }
    }

    /// Time granted to each idle period run by `frame`.
    pub fn with_idle_budget_ms(mut self, budget_ms: f64) -> Self {
        self.idle_budget_ms = budget_ms;
        self
    }

    pub fn list(&self) -> &ManualList<K> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ManualList<K> {
        &mut self.list
    }

    pub fn into_list(self) -> ManualList<K> {
        self.list
    }

    pub fn viewport(&self) -> &SimulatedViewport<K> {
        self.list.host()
    }

    pub fn viewport_mut(&mut self) -> &mut SimulatedViewport<K> {
        self.list.host_mut()
    }

    /// Applies new items, lays them out and restores the scroll snapshot, in the order a UI
    /// commit would.
    pub fn set_items(&mut self, ids: impl IntoIterator<Item = K>, props: ListProps, now_ms: u64) {
        self.list.update(ids, props);
        self.attach_new_nodes();
        let before = self.list.host().scroll_top();
        self.sync_layout();
        self.list.commit();
        self.after_scroll_change(before, now_ms);
    }

    fn attach_new_nodes(&mut self) {
        let fresh: Vec<K> = self
            .list
            .ids()
            .iter()
            .filter(|id| self.list.item(id).is_some_and(|item| item.node().is_none()))
            .cloned()
            .collect();
        for id in fresh {
            self.list.attach_node(&id, id.clone());
        }
    }

    /// Mounts the list. Rows detached by an earlier `unmount` are attached again.
    pub fn mount(&mut self, now_ms: u64) {
        self.sync_layout();
        self.list.host_mut().reset_reports();
        self.list.mount(now_ms);
        self.attach_new_nodes();
        self.deliver_intersections(now_ms);
    }

    pub fn unmount(&mut self) {
        self.list.unmount();
    }

    pub fn scroll_to(&mut self, top: u64, now_ms: u64) {
        let before = self.list.host().scroll_top();
        self.list.host_mut().scroll_to(top);
        self.after_scroll_change(before, now_ms);
    }

    pub fn scroll_by(&mut self, delta: i64, now_ms: u64) {
        let before = self.list.host().scroll_top();
        self.list.host_mut().scroll_by(delta);
        self.after_scroll_change(before, now_ms);
    }

    /// A wheel gesture: the wheel event, then the scroll it causes.
    pub fn wheel(&mut self, delta: i64, now_ms: u64) {
        self.list.on_wheel(now_ms);
        self.scroll_by(delta, now_ms);
    }

    pub fn mouse_move(&mut self, now_ms: u64) {
        self.list.on_mouse_move(now_ms);
    }

    /// Runs one frame: timers, observer delivery, one idle period and layout. Returns the view
    /// as laid out at the end of the frame.
    pub fn frame(&mut self, now_ms: u64) -> ListView<K> {
        let before = self.list.host().scroll_top();
        self.list.tick(now_ms);
        self.after_scroll_change(before, now_ms);

        self.sync_layout();
        self.deliver_intersections(now_ms);
        self.sync_layout();

        if self.list.scheduler_mut().take_request().is_some() {
            let budget = self.idle_budget_ms;
            self.list.run_idle_tasks(&budget, now_ms);
        }
        self.sync_layout()
    }

    /// Runs frames `frame_ms` apart until no idle work is pending (at most `max_frames`).
    /// Returns the time of the last frame.
    pub fn settle(&mut self, mut now_ms: u64, frame_ms: u64, max_frames: usize) -> u64 {
        for _ in 0..max_frames {
            self.frame(now_ms);
            if self.list.pending_idle_tasks() == 0 {
                break;
            }
            now_ms += frame_ms;
        }
        now_ms
    }

    // A browser fires a scroll event for every scroll top change, ours included.
    fn after_scroll_change(&mut self, before: u64, now_ms: u64) {
        if self.list.host().scroll_top() != before {
            self.list.on_scroll(now_ms);
        }
    }

    fn sync_layout(&mut self) -> ListView<K> {
        let view = self.list.render();
        self.list.host_mut().layout(&view);
        let heights: Vec<(K, u64)> = self
            .list
            .host()
            .rows()
            .iter()
            .map(|row| (row.id.clone(), row.height))
            .collect();
        let observer = self.list.observer_mut();
        for (id, height) in heights {
            observer.set_height(id, height as f64);
        }
        view
    }

    fn deliver_intersections(&mut self, now_ms: u64) {
        let tracker = self.list.tracker();
        if !tracker.is_connected() {
            return;
        }
        let margin = tracker.options().and_then(|options| options.root_margin);
        let entries = self.list.host_mut().intersections(margin);
        if entries.is_empty() {
            return;
        }
        adebug!(count = entries.len(), "delivering intersection entries");
        self.list.on_intersections(entries, now_ms);
    }
}
