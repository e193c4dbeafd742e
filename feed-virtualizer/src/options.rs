use alloc::sync::Arc;

use crate::{RootMargin, ScrollContext};

/// A list-level notification (load more, scrolled to top, ...).
pub type ListCallback = Arc<dyn Fn() + Send + Sync>;

/// Receives `(context_key, item_id, height)` for every valid height measurement.
pub type HeightCallback<K> = Arc<dyn Fn(&str, &K, u32) + Send + Sync>;

/// Tuning constants.
///
/// None of these values are load-bearing for correctness; they only shape how early content is
/// mounted and how eagerly callbacks fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ListTuning {
    /// Remaining scroll distance (px) below which "load more" fires.
    pub load_more_threshold: u32,
    /// Scroll top (px) below which the list counts as scrolled to the top.
    pub scroll_to_top_threshold: u32,
    pub scroll_throttle_ms: u64,
    pub wheel_throttle_ms: u64,
    /// Mouse inactivity after which a pending snap-back runs. Mouse moves are throttled at
    /// half this delay.
    pub mouse_idle_delay_ms: u64,
    /// Pre-mount margin around the scroll container.
    pub root_margin: RootMargin,
    /// Placeholder height (px) for unrendered items that were never measured.
    pub placeholder_height: u32,
    /// Delay before queued idle tasks run on platforms without idle callbacks.
    pub idle_fallback_delay_ms: u64,
    pub default_media_width: u32,
}

impl Default for ListTuning {
    fn default() -> Self {
        Self {
            load_more_threshold: 400,
            scroll_to_top_threshold: 100,
            scroll_throttle_ms: 150,
            wheel_throttle_ms: 150,
            mouse_idle_delay_ms: 300,
            root_margin: RootMargin::new(300, 0),
            placeholder_height: 150,
            idle_fallback_delay_ms: 50,
            default_media_width: 250,
        }
    }
}

/// Per-update list state supplied alongside the item ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ListProps {
    pub has_more: bool,
    pub is_loading: bool,
    /// Replace the feed with a loading indicator.
    pub show_loading: bool,
    /// Items waiting behind the "new items" banner.
    pub num_pending: usize,
    /// Hold the scroll position (e.g. while a menu anchored in the list is open).
    pub prevent_scroll: bool,
    /// Show the prepend content even in the empty state.
    pub always_prepend: bool,
    pub has_prepend: bool,
    pub has_append: bool,
    pub has_empty_message: bool,
}

impl ListProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_has_more(mut self, has_more: bool) -> Self {
        self.has_more = has_more;
        self
    }

    pub fn with_is_loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    pub fn with_show_loading(mut self, show_loading: bool) -> Self {
        self.show_loading = show_loading;
        self
    }

    pub fn with_num_pending(mut self, num_pending: usize) -> Self {
        self.num_pending = num_pending;
        self
    }

    pub fn with_prevent_scroll(mut self, prevent_scroll: bool) -> Self {
        self.prevent_scroll = prevent_scroll;
        self
    }

    pub fn with_prepend(mut self, has_prepend: bool, always_prepend: bool) -> Self {
        self.has_prepend = has_prepend;
        self.always_prepend = always_prepend;
        self
    }

    pub fn with_append(mut self, has_append: bool) -> Self {
        self.has_append = has_append;
        self
    }

    pub fn with_empty_message(mut self, has_empty_message: bool) -> Self {
        self.has_empty_message = has_empty_message;
        self
    }
}

/// Configuration for [`crate::VirtualizedList`].
///
/// Callbacks are stored in `Arc`s so options stay cheap to clone.
pub struct ListOptions<K> {
    pub context: ScrollContext,
    /// Scroll the document instead of the list's own container.
    pub bind_to_document: bool,
    /// Remember heights and scroll position for `context`.
    pub track_scroll: bool,
    pub tuning: ListTuning,

    pub on_load_more: Option<ListCallback>,
    pub on_load_pending: Option<ListCallback>,
    pub on_scroll_to_top: Option<ListCallback>,
    pub on_scroll: Option<ListCallback>,
    pub on_height_change: Option<HeightCallback<K>>,
}

impl<K> Clone for ListOptions<K> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            bind_to_document: self.bind_to_document,
            track_scroll: self.track_scroll,
            tuning: self.tuning,
            on_load_more: self.on_load_more.clone(),
            on_load_pending: self.on_load_pending.clone(),
            on_scroll_to_top: self.on_scroll_to_top.clone(),
            on_scroll: self.on_scroll.clone(),
            on_height_change: self.on_height_change.clone(),
        }
    }
}

impl<K> ListOptions<K> {
    pub fn new(context: ScrollContext) -> Self {
        Self {
            context,
            bind_to_document: false,
            track_scroll: true,
            tuning: ListTuning::default(),
            on_load_more: None,
            on_load_pending: None,
            on_scroll_to_top: None,
            on_scroll: None,
            on_height_change: None,
        }
    }

    /// The height-cache key, when scroll tracking is on.
    pub fn save_height_key(&self) -> Option<alloc::string::String> {
        self.track_scroll.then(|| self.context.cache_key())
    }

    pub fn with_bind_to_document(mut self, bind_to_document: bool) -> Self {
        self.bind_to_document = bind_to_document;
        self
    }

    pub fn with_track_scroll(mut self, track_scroll: bool) -> Self {
        self.track_scroll = track_scroll;
        self
    }

    pub fn with_tuning(mut self, tuning: ListTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_on_load_more(mut self, f: Option<impl Fn() + Send + Sync + 'static>) -> Self {
        self.on_load_more = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_load_pending(mut self, f: Option<impl Fn() + Send + Sync + 'static>) -> Self {
        self.on_load_pending = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_scroll_to_top(mut self, f: Option<impl Fn() + Send + Sync + 'static>) -> Self {
        self.on_scroll_to_top = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_scroll(mut self, f: Option<impl Fn() + Send + Sync + 'static>) -> Self {
        self.on_scroll = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_height_change(
        mut self,
        f: Option<impl Fn(&str, &K, u32) + Send + Sync + 'static>,
    ) -> Self {
        self.on_height_change = f.map(|f| Arc::new(f) as _);
        self
    }
}

impl<K> core::fmt::Debug for ListOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListOptions")
            .field("context", &self.context)
            .field("bind_to_document", &self.bind_to_document)
            .field("track_scroll", &self.track_scroll)
            .field("tuning", &self.tuning)
            .field("on_load_more", &self.on_load_more.is_some())
            .field("on_load_pending", &self.on_load_pending.is_some())
            .field("on_scroll_to_top", &self.on_scroll_to_top.is_some())
            .field("on_scroll", &self.on_scroll.is_some())
            .field("on_height_change", &self.on_height_change.is_some())
            .finish_non_exhaustive()
    }
}
