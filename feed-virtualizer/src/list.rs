use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::key::{ItemKey, KeyMap};
use crate::snapshot::items_inserted_at_head;
use crate::{
    IdleDeadline, IdleScheduler, IdleTask, IdleTaskQueue, IntersectionEntry, ItemPhase, ListBody,
    ListOptions, ListProps, ListView, LoadMoreView, ObserverOptions, ObserverRoot, RowRender,
    ScrollContext, ScrollHost, ScrollPosition, ScrollSnapshot, Throttle, Unbounded, ViewCache,
    ViewportIntersectionTracker, ViewportObserver, VirtualizedListItem,
};

type Inbox<K> = Rc<RefCell<VecDeque<IntersectionEntry<K>>>>;

/// A headless virtualized feed.
///
/// The list owns one [`ViewportIntersectionTracker`] shared by all of its items, the per-item
/// virtualization state (id → [`VirtualizedListItem`]), and the scroll heuristics of a feed:
///
/// - "load more" when the bottom edge gets close, "scrolled to top" near the top edge;
/// - scroll-position preservation when items are inserted above the viewport
///   (`update` captures a [`ScrollSnapshot`], `commit` restores it);
/// - snapping back to the top when the mouse goes idle over a list that was at the top when
///   the mouse started moving, unless the user scrolled by hand meanwhile.
///
/// It holds no UI objects. Your adapter drives it:
/// - `update(ids, props)` before committing new content, `commit()` after it;
/// - `attach_node` / `detach_node` when row wrappers are created / destroyed;
/// - `on_intersections` with observer batches, `run_idle_tasks` from idle callbacks;
/// - `on_scroll` / `on_wheel` / `on_mouse_move` on input, and `tick(now_ms)` every frame;
/// - `render()` to get the rows to draw.
///
/// Call `unmount` before dropping a mounted list so the idle request and the observer are
/// released.
pub struct VirtualizedList<K, H, O, S>
where
    O: ViewportObserver,
{
    options: ListOptions<K>,
    props: ListProps,
    host: H,
    tracker: ViewportIntersectionTracker<K, O>,
    scheduler: S,
    idle: IdleTaskQueue<IdleTask<K>>,
    inbox: Inbox<K>,
    order: Vec<K>,
    items: KeyMap<K, VirtualizedListItem<K, O::Node>>,
    cache: ViewCache<K>,

    scroll_throttle: Throttle,
    wheel_throttle: Throttle,
    mouse_move_throttle: Throttle,
    mouse_idle_at_ms: Option<u64>,
    mouse_moved_recently: bool,
    last_scroll_was_synthetic: bool,
    scroll_to_top_on_mouse_idle: bool,
    load_more_armed: bool,
    pending_snapshot: Option<ScrollSnapshot>,

    cached_media_width: u32,
    fullscreen: bool,
    mounted: bool,
}

impl<K, H, O, S> VirtualizedList<K, H, O, S>
where
    K: ItemKey + 'static,
    H: ScrollHost,
    O: ViewportObserver,
    S: IdleScheduler,
{
    pub fn new(options: ListOptions<K>, host: H, observer: O, scheduler: S) -> Self {
        let tuning = options.tuning;
        vdebug!(
            track_scroll = options.track_scroll,
            bind_to_document = options.bind_to_document,
            "VirtualizedList::new"
        );
        Self {
            props: ListProps::default(),
            host,
            tracker: ViewportIntersectionTracker::new(observer),
            scheduler,
            idle: IdleTaskQueue::new(tuning.idle_fallback_delay_ms),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            order: Vec::new(),
            items: KeyMap::new(),
            cache: ViewCache::new(),
            scroll_throttle: Throttle::new(tuning.scroll_throttle_ms),
            wheel_throttle: Throttle::new(tuning.wheel_throttle_ms),
            mouse_move_throttle: Throttle::new(tuning.mouse_idle_delay_ms / 2),
            mouse_idle_at_ms: None,
            mouse_moved_recently: false,
            last_scroll_was_synthetic: false,
            scroll_to_top_on_mouse_idle: false,
            load_more_armed: true,
            pending_snapshot: None,
            cached_media_width: tuning.default_media_width,
            fullscreen: false,
            mounted: false,
            options,
        }
    }

    /// Starts from a cache carried over from a previous list (e.g. the same view visited
    /// earlier).
    pub fn with_view_cache(mut self, cache: ViewCache<K>) -> Self {
        self.cache = cache;
        self.refresh_cached_heights();
        self
    }

    pub fn view_cache(&self) -> &ViewCache<K> {
        &self.cache
    }

    /// Hands the cache over, e.g. to the list that replaces this one.
    pub fn take_view_cache(&mut self) -> ViewCache<K> {
        let cache = core::mem::take(&mut self.cache);
        self.refresh_cached_heights();
        cache
    }

    pub fn options(&self) -> &ListOptions<K> {
        &self.options
    }

    pub fn set_options(&mut self, options: ListOptions<K>) {
        let context_changed = options.context != self.options.context
            || options.track_scroll != self.options.track_scroll;
        let tuning = options.tuning;
        self.options = options;
        self.scroll_throttle.set_wait_ms(tuning.scroll_throttle_ms);
        self.wheel_throttle.set_wait_ms(tuning.wheel_throttle_ms);
        self.mouse_move_throttle
            .set_wait_ms(tuning.mouse_idle_delay_ms / 2);
        self.idle.set_fallback_delay_ms(tuning.idle_fallback_delay_ms);
        if context_changed {
            self.refresh_cached_heights();
        }
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut ListOptions<K>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_scroll_context(&mut self, context: ScrollContext) {
        if self.options.context == context {
            return;
        }
        self.options.context = context;
        self.refresh_cached_heights();
    }

    fn refresh_cached_heights(&mut self) {
        let key = self.options.save_height_key();
        for item in self.items.values_mut() {
            let cached = key
                .as_deref()
                .and_then(|key| self.cache.height(key, item.id()));
            item.set_cached_height(cached);
        }
    }

    pub fn props(&self) -> &ListProps {
        &self.props
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn tracker(&self) -> &ViewportIntersectionTracker<K, O> {
        &self.tracker
    }

    /// The platform observer, e.g. to feed it layout heights.
    pub fn observer_mut(&mut self) -> &mut O {
        self.tracker.observer_mut()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Item ids in render order.
    pub fn ids(&self) -> &[K] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn item(&self, id: &K) -> Option<&VirtualizedListItem<K, O::Node>> {
        self.items.get(id)
    }

    pub fn phase(&self, id: &K) -> Option<ItemPhase> {
        self.items.get(id).map(|item| item.phase())
    }

    pub fn pending_idle_tasks(&self) -> usize {
        self.idle.len()
    }

    pub fn mouse_moved_recently(&self) -> bool {
        self.mouse_moved_recently
    }

    /// Whether the list will snap back to the top when the mouse goes idle.
    pub fn snap_to_top_armed(&self) -> bool {
        self.scroll_to_top_on_mouse_idle
    }

    pub fn has_pending_snapshot(&self) -> bool {
        self.pending_snapshot.is_some()
    }

    fn observer_options(&self) -> ObserverOptions {
        if self.options.bind_to_document {
            ObserverOptions {
                root: ObserverRoot::Viewport,
                root_margin: None,
            }
        } else {
            ObserverOptions {
                root: ObserverRoot::ScrollContainer,
                root_margin: Some(self.options.tuning.root_margin),
            }
        }
    }

    /// Connects the observer, restores the remembered scroll position and evaluates the initial
    /// scroll position once.
    pub fn mount(&mut self, now_ms: u64) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        let options = self.observer_options();
        self.tracker.connect(options);

        if let Some(key) = self.options.save_height_key() {
            if let Some(top) = self.cache.scroll_top(&key) {
                vdebug!(top, "restoring scroll position");
                self.set_scroll_top(top);
            }
        }
        vdebug!(items = self.order.len(), "VirtualizedList::mount");
        self.on_scroll(now_ms);
    }

    /// Releases every timer, idle request and observation.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        if let Some(key) = self.options.save_height_key() {
            self.cache.save_scroll_top(&key, self.host.scroll_top());
        }
        self.mouse_idle_at_ms = None;
        self.scroll_throttle.cancel();
        self.wheel_throttle.cancel();
        self.mouse_move_throttle.cancel();
        self.idle.cancel(&mut self.scheduler);

        for item in self.items.values_mut() {
            if let Some(node) = item.detach() {
                self.tracker.unobserve(item.id(), &node);
            }
        }
        self.tracker.disconnect();
        self.inbox.borrow_mut().clear();
        self.pending_snapshot = None;
        self.mounted = false;
        vdebug!("VirtualizedList::unmount");
    }

    /// Applies a new item sequence and props. Call right before the new content is committed to
    /// the host; call [`Self::commit`] right after.
    ///
    /// Duplicate ids are ignored after their first occurrence.
    pub fn update(&mut self, ids: impl IntoIterator<Item = K>, props: ListProps) {
        let mut seen: KeyMap<K, ()> = KeyMap::new();
        let mut next = Vec::new();
        for id in ids {
            if seen.insert(id.clone(), ()).is_some() {
                vwarn!(index = next.len(), "VirtualizedList::update: duplicate item id ignored");
                continue;
            }
            next.push(id);
        }

        let inserted = items_inserted_at_head(&self.order, &next);
        let pending_changed = (self.props.num_pending > 0) != (props.num_pending > 0);
        if self.mounted
            && (pending_changed
                || (inserted
                    && (self.host.scroll_top() > 0
                        || self.mouse_moved_recently
                        || props.prevent_scroll)))
        {
            let snapshot = ScrollSnapshot::capture(&self.host);
            vdebug!(
                distance_from_bottom = snapshot.distance_from_bottom,
                "captured scroll snapshot"
            );
            self.pending_snapshot = Some(snapshot);
        }

        // Items arriving at the head leave the bottom where it was: stay latched.
        let tail_changed = next.len() != self.order.len() && !inserted;
        if (self.props.is_loading && !props.is_loading) || tail_changed {
            self.load_more_armed = true;
        }

        let removed: Vec<K> = self
            .order
            .iter()
            .filter(|id| !seen.contains_key(*id))
            .cloned()
            .collect();
        for id in &removed {
            self.remove_item(id);
        }

        let len = next.len();
        let key = self.options.save_height_key();
        for (index, id) in next.iter().enumerate() {
            if let Some(item) = self.items.get_mut(id) {
                item.set_position(index, len);
                continue;
            }
            let cached = key.as_deref().and_then(|key| self.cache.height(key, id));
            self.items.insert(
                id.clone(),
                VirtualizedListItem::new(id.clone(), index, len, cached),
            );
        }
        vtrace!(len, removed = removed.len(), inserted, "VirtualizedList::update");

        self.order = next;
        self.props = props;
    }

    fn remove_item(&mut self, id: &K) {
        if let Some(mut item) = self.items.remove(id) {
            if let Some(node) = item.detach() {
                self.tracker.unobserve(id, &node);
            }
        }
        self.idle.retain(|task| task.id() != id);
    }

    /// Restores the scroll snapshot captured by the last `update`, if any.
    pub fn commit(&mut self) {
        let Some(snapshot) = self.pending_snapshot.take() else {
            return;
        };
        let top = snapshot.restored_scroll_top(self.host.scroll_height());
        vdebug!(top, "restoring scroll snapshot");
        self.set_scroll_top(top);
    }

    /// Registers the wrapper node of `id` with the shared observer.
    pub fn attach_node(&mut self, id: &K, node: O::Node) {
        let Some(item) = self.items.get_mut(id) else {
            vwarn!("VirtualizedList::attach_node: unknown item id");
            return;
        };
        item.attach(node.clone());
        let inbox = Rc::clone(&self.inbox);
        self.tracker.observe(id.clone(), node, move |entry| {
            inbox.borrow_mut().push_back(entry.clone());
        });
    }

    /// Stops observing the wrapper node of `id`. Safe to call for unknown or detached items.
    pub fn detach_node(&mut self, id: &K) {
        let Some(node) = self.items.get_mut(id).and_then(|item| item.detach()) else {
            return;
        };
        self.tracker.unobserve(id, &node);
    }

    /// Feeds one batch of observer entries. Delivery order across items is not significant.
    pub fn on_intersections(
        &mut self,
        entries: impl IntoIterator<Item = IntersectionEntry<K>>,
        now_ms: u64,
    ) {
        self.tracker.deliver(entries);
        while let Some(entry) = self.next_inbox_entry() {
            self.apply_intersection(entry, now_ms);
        }
    }

    fn next_inbox_entry(&self) -> Option<IntersectionEntry<K>> {
        self.inbox.borrow_mut().pop_front()
    }

    fn apply_intersection(&mut self, entry: IntersectionEntry<K>, now_ms: u64) {
        let Some(item) = self.items.get_mut(&entry.id) else {
            return;
        };
        let outcome = item.apply_intersection(&entry);
        vtrace!(
            index = item.index(),
            is_intersecting = entry.is_intersecting,
            "intersection changed"
        );
        let id = entry.id;
        self.idle.push_unique(
            IdleTask::MeasureHeight(id.clone()),
            &mut self.scheduler,
            now_ms,
        );
        if outcome.confirm_hide {
            self.idle.push_unique(
                IdleTask::HideIfNotIntersecting(id),
                &mut self.scheduler,
                now_ms,
            );
        }
    }

    /// Runs queued idle tasks while `deadline` has time left. Call from the idle callback
    /// requested through the scheduler.
    pub fn run_idle_tasks(&mut self, deadline: &impl IdleDeadline, now_ms: u64) {
        self.idle.begin_run();
        while let Some(task) = self.idle.next_task(deadline) {
            self.run_idle_task(task);
        }
        self.idle.end_run(&mut self.scheduler, now_ms);
    }

    fn run_idle_task(&mut self, task: IdleTask<K>) {
        match task {
            IdleTask::MeasureHeight(id) => self.measure_item(&id),
            IdleTask::HideIfNotIntersecting(id) => {
                if let Some(item) = self.items.get_mut(&id) {
                    if item.confirm_hidden() {
                        vtrace!(index = item.index(), "item unrendered");
                    }
                }
            }
        }
    }

    fn measure_item(&mut self, id: &K) {
        let layout_height = self.tracker.measure(id);
        let Some(item) = self.items.get_mut(id) else {
            return;
        };
        let Some(height) = item.measure(layout_height) else {
            vtrace!(index = item.index(), "height measurement discarded");
            return;
        };
        let Some(key) = self.options.save_height_key() else {
            return;
        };
        item.set_cached_height(Some(height));
        self.cache.set_height(&key, id.clone(), height);
        if let Some(cb) = &self.options.on_height_change {
            cb(&key, id, height);
        }
    }

    fn set_scroll_top(&mut self, top: u64) {
        if self.host.scroll_top() != top {
            self.last_scroll_was_synthetic = true;
            self.host.set_scroll_top(top);
        }
    }

    /// Scroll event from the host (throttled).
    pub fn on_scroll(&mut self, now_ms: u64) {
        if self.scroll_throttle.call(now_ms) {
            self.handle_scroll();
        }
    }

    fn handle_scroll(&mut self) {
        if !self.mounted {
            return;
        }
        let top = self.host.scroll_top();
        let remaining = self
            .host
            .scroll_height()
            .saturating_sub(top)
            .saturating_sub(self.host.client_height());
        let tuning = self.options.tuning;
        vtrace!(top, remaining, "handle_scroll");

        if remaining < tuning.load_more_threshold as u64 {
            if top > 0 && self.load_more_armed && self.props.has_more && !self.props.is_loading {
                if let Some(cb) = &self.options.on_load_more {
                    self.load_more_armed = false;
                    vdebug!(remaining, "load more");
                    cb();
                }
            }
        } else {
            self.load_more_armed = true;
        }

        match (&self.options.on_scroll_to_top, &self.options.on_scroll) {
            (Some(cb), _) if top < tuning.scroll_to_top_threshold as u64 => cb(),
            (_, Some(cb)) => cb(),
            _ => {}
        }

        if !self.last_scroll_was_synthetic {
            // A scroll we did not cause ourselves is intentional: keep the user where they are.
            self.scroll_to_top_on_mouse_idle = false;
        }
        self.last_scroll_was_synthetic = false;
    }

    /// Wheel event from the host (throttled). Cancels the pending snap-back.
    pub fn on_wheel(&mut self, now_ms: u64) {
        if self.wheel_throttle.call(now_ms) {
            self.scroll_to_top_on_mouse_idle = false;
        }
    }

    /// Mouse move over the list (throttled).
    pub fn on_mouse_move(&mut self, now_ms: u64) {
        if self.mouse_move_throttle.call(now_ms) {
            self.handle_mouse_move(now_ms);
        }
    }

    fn handle_mouse_move(&mut self, now_ms: u64) {
        self.restart_mouse_idle_timer(now_ms);
        if !self.mouse_moved_recently && self.host.scroll_top() == 0 {
            self.scroll_to_top_on_mouse_idle = true;
        }
        self.mouse_moved_recently = true;
    }

    fn restart_mouse_idle_timer(&mut self, now_ms: u64) {
        let delay = self.options.tuning.mouse_idle_delay_ms;
        self.mouse_idle_at_ms = Some(now_ms.saturating_add(delay));
    }

    fn handle_mouse_idle(&mut self) {
        self.mouse_idle_at_ms = None;
        if self.scroll_to_top_on_mouse_idle && !self.props.prevent_scroll {
            vdebug!("mouse idle, snapping back to top");
            self.set_scroll_top(0);
        }
        self.mouse_moved_recently = false;
        self.scroll_to_top_on_mouse_idle = false;
    }

    /// Advances time: trailing throttle edges, the mouse-idle timer and the idle fallback.
    pub fn tick(&mut self, now_ms: u64) {
        if self.scroll_throttle.poll(now_ms) {
            self.handle_scroll();
        }
        if self.wheel_throttle.poll(now_ms) {
            self.scroll_to_top_on_mouse_idle = false;
        }
        if self.mouse_move_throttle.poll(now_ms) {
            self.handle_mouse_move(now_ms);
        }
        if matches!(self.mouse_idle_at_ms, Some(at) if now_ms >= at) {
            self.handle_mouse_idle();
        }
        if self.idle.fallback_due(now_ms) {
            self.run_idle_tasks(&Unbounded, now_ms);
        }
    }

    /// The "load more" button was activated.
    pub fn load_more_clicked(&mut self) {
        if let Some(cb) = &self.options.on_load_more {
            cb();
        }
    }

    /// The "new items" banner was activated.
    ///
    /// The banner's items are about to be inserted; this keeps the list from snapping to the
    /// top while the height changes under the mouse.
    pub fn load_pending_clicked(&mut self, now_ms: u64) {
        if let Some(cb) = &self.options.on_load_pending {
            cb();
        }
        self.scroll_to_top_on_mouse_idle = false;
        self.last_scroll_was_synthetic = false;
        self.restart_mouse_idle_timer(now_ms);
        self.mouse_moved_recently = true;
    }

    /// Scroll metrics for items that are about to change their own height; `None` when the list
    /// is at the top and idle (there is nothing to preserve).
    pub fn scroll_position(&self) -> Option<ScrollPosition> {
        if !self.mounted {
            return None;
        }
        let top = self.host.scroll_top();
        if top > 0 || self.mouse_moved_recently {
            Some(ScrollPosition {
                height: self.host.scroll_height(),
                top,
            })
        } else {
            None
        }
    }

    /// Puts the content captured in `snapshot` back under the viewport after an item resized.
    pub fn update_scroll_bottom(&mut self, snapshot: ScrollSnapshot) {
        let top = snapshot.restored_scroll_top(self.host.scroll_height());
        self.set_scroll_top(top);
    }

    pub fn cached_media_width(&self) -> u32 {
        self.cached_media_width
    }

    /// Shares a media width measured by one item with all others. Zero is ignored.
    pub fn cache_media_width(&mut self, width: u32) {
        if width != 0 && width != self.cached_media_width {
            self.cached_media_width = width;
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    /// Computes what to draw. Rows come out in input order.
    pub fn render(&mut self) -> ListView<K> {
        let props = self.props;
        let fallback = self.options.tuning.placeholder_height;

        let body = if props.show_loading {
            ListBody::Loading
        } else if props.is_loading
            || !self.order.is_empty()
            || props.num_pending > 0
            || props.has_more
            || !props.has_empty_message
        {
            let mut rows = Vec::with_capacity(self.order.len());
            for id in &self.order {
                if let Some(item) = self.items.get_mut(id) {
                    let (view, needs_update) = item.render(fallback);
                    rows.push(RowRender { view, needs_update });
                }
            }
            ListBody::Feed {
                rows,
                pending: (props.num_pending > 0).then_some(props.num_pending),
                load_more: (props.has_more && self.options.on_load_more.is_some()).then_some(
                    LoadMoreView {
                        visible: !props.is_loading,
                    },
                ),
                show_append: props.has_append && !props.has_more,
            }
        } else {
            ListBody::Empty
        };

        let show_prepend = match body {
            ListBody::Empty => props.has_prepend && props.always_prepend,
            _ => props.has_prepend,
        };
        ListView {
            body,
            show_prepend,
            fullscreen: self.fullscreen,
        }
    }
}

impl<K, H, O, S> core::fmt::Debug for VirtualizedList<K, H, O, S>
where
    O: ViewportObserver,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualizedList")
            .field("options", &self.options)
            .field("props", &self.props)
            .field("items", &self.order.len())
            .field("pending_idle_tasks", &self.idle.len())
            .field("mouse_moved_recently", &self.mouse_moved_recently)
            .field("scroll_to_top_on_mouse_idle", &self.scroll_to_top_on_mouse_idle)
            .field("pending_snapshot", &self.pending_snapshot)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}
