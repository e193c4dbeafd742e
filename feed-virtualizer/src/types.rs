use alloc::vec::Vec;

/// Last intersection state reported for an item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntersectionState {
    /// Never observed.
    #[default]
    Unknown,
    Intersecting,
    NotIntersecting,
}

impl IntersectionState {
    pub fn from_intersecting(is_intersecting: bool) -> Self {
        if is_intersecting {
            Self::Intersecting
        } else {
            Self::NotIntersecting
        }
    }

    pub fn is_intersecting(self) -> bool {
        self == Self::Intersecting
    }
}

/// Whether an item's real content is mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderState {
    Rendered,
    /// Content replaced by an empty placeholder of the cached/measured height.
    Unrendered,
}

/// The per-item virtualization state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemPhase {
    Rendered,
    /// Still rendered, but no longer intersecting; a hide confirmation is queued for idle time.
    PendingHide,
    Unrendered,
}

/// One intersection change, already resolved to the item id by the adapter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntersectionEntry<K> {
    pub id: K,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
    /// Height of the target's bounding rect when the change was observed.
    pub bounding_height: f64,
}

impl<K> IntersectionEntry<K> {
    pub fn new(id: K, is_intersecting: bool, bounding_height: f64) -> Self {
        Self {
            id,
            is_intersecting,
            intersection_ratio: if is_intersecting { 1.0 } else { 0.0 },
            bounding_height,
        }
    }
}

/// What the rendering layer needs to draw one row wrapper.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowView<K> {
    pub id: K,
    pub index: usize,
    pub list_length: usize,
    pub state: RenderState,
    /// Fixed placeholder height; only set while `Unrendered`.
    pub placeholder_height: Option<u32>,
    /// Placeholders take keyboard focus in place of their content.
    pub focusable: bool,
}

impl<K> RowView<K> {
    /// 1-based position in the feed, as exposed to assistive technology.
    pub fn position_in_set(&self) -> usize {
        self.index.saturating_add(1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowRender<K> {
    pub view: RowView<K>,
    /// `false` when the row can skip re-rendering this pass.
    pub needs_update: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadMoreView {
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListBody<K> {
    /// Prepend content followed by a loading indicator.
    Loading,
    Feed {
        rows: Vec<RowRender<K>>,
        /// Count shown on the "new items" banner.
        pending: Option<usize>,
        load_more: Option<LoadMoreView>,
        show_append: bool,
    },
    /// Empty-state message.
    Empty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListView<K> {
    pub body: ListBody<K>,
    pub show_prepend: bool,
    pub fullscreen: bool,
}

impl<K> ListView<K> {
    pub fn rows(&self) -> &[RowRender<K>] {
        match &self.body {
            ListBody::Feed { rows, .. } => rows,
            _ => &[],
        }
    }
}
