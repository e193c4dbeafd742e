use alloc::vec::Vec;

use feed_virtualizer::{
    IntersectionEntry, ItemKey, ListBody, ListView, RenderState, RootMargin, ScrollHost,
};

use crate::key::KeyMap;

/// One laid-out row.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowBox<K> {
    pub id: K,
    pub top: u64,
    pub height: u64,
    pub state: RenderState,
}

/// A deterministic scroll container.
///
/// Rows are stacked top to bottom: rendered rows take their content height, unrendered rows
/// their placeholder height. Content heights are whatever the caller says they are (unknown ids
/// use `default_height`).
#[derive(Clone, Debug)]
pub struct SimulatedViewport<K> {
    scroll_top: u64,
    client_height: u64,
    scroll_height: u64,
    prepend_height: u64,
    banner_height: u64,
    default_height: u32,
    content_heights: KeyMap<K, u32>,
    rows: Vec<RowBox<K>>,
    reported: KeyMap<K, bool>,
}

impl<K: ItemKey> SimulatedViewport<K> {
    pub fn new(client_height: u64) -> Self {
        Self {
            scroll_top: 0,
            client_height,
            scroll_height: 0,
            prepend_height: 0,
            banner_height: 0,
            default_height: 100,
            content_heights: KeyMap::new(),
            rows: Vec::new(),
            reported: KeyMap::new(),
        }
    }

    /// Content height for rows without an explicit one.
    pub fn with_default_height(mut self, height: u32) -> Self {
        self.default_height = height;
        self
    }

    /// Height of the prepend area, laid out above the rows when shown.
    pub fn with_prepend_height(mut self, height: u64) -> Self {
        self.prepend_height = height;
        self
    }

    /// Height of the "new items" banner, laid out above the rows when shown.
    pub fn with_banner_height(mut self, height: u64) -> Self {
        self.banner_height = height;
        self
    }

    pub fn set_client_height(&mut self, height: u64) {
        self.client_height = height;
        self.clamp_scroll_top();
    }

    pub fn set_content_height(&mut self, id: K, height: u32) {
        self.content_heights.insert(id, height);
    }

    pub fn content_height(&self, id: &K) -> u32 {
        self.content_heights
            .get(id)
            .copied()
            .unwrap_or(self.default_height)
    }

    pub fn rows(&self) -> &[RowBox<K>] {
        &self.rows
    }

    pub fn row(&self, id: &K) -> Option<&RowBox<K>> {
        self.rows.iter().find(|row| row.id == *id)
    }

    /// Distance from the viewport top to the row top; negative when the row starts above it.
    pub fn offset_in_viewport(&self, id: &K) -> Option<i64> {
        self.row(id)
            .map(|row| row.top as i64 - self.scroll_top as i64)
    }

    pub fn max_scroll_top(&self) -> u64 {
        self.scroll_height.saturating_sub(self.client_height)
    }

    /// Scrolls like a user would. The top is clamped to the scrollable range.
    pub fn scroll_to(&mut self, top: u64) {
        self.scroll_top = top.min(self.max_scroll_top());
    }

    pub fn scroll_by(&mut self, delta: i64) {
        let top = (self.scroll_top as i64).saturating_add(delta).max(0) as u64;
        self.scroll_to(top);
    }

    fn clamp_scroll_top(&mut self) {
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    /// Lays out `view` and updates the scroll height. A scroll top past the new end is
    /// clamped, as a browser would.
    pub fn layout(&mut self, view: &ListView<K>) {
        let mut y = 0u64;
        if view.show_prepend {
            y += self.prepend_height;
        }
        if let ListBody::Feed {
            pending: Some(_), ..
        } = &view.body
        {
            y += self.banner_height;
        }

        self.rows.clear();
        for row in view.rows() {
            let height = match row.view.placeholder_height {
                Some(h) => h as u64,
                None => self.content_height(&row.view.id) as u64,
            };
            self.rows.push(RowBox {
                id: row.view.id.clone(),
                top: y,
                height,
                state: row.view.state,
            });
            y += height;
        }

        let rows = &self.rows;
        self.reported
            .retain(|id, _| rows.iter().any(|row| row.id == *id));
        self.scroll_height = y;
        self.clamp_scroll_top();
    }

    /// Rows whose intersection with the (margin-grown) viewport changed since the last call,
    /// as an intersection observer would report them. Rows seen for the first time are always
    /// reported.
    pub fn intersections(&mut self, margin: Option<RootMargin>) -> Vec<IntersectionEntry<K>> {
        let grow = margin.map_or(0, |m| m.vertical_px(self.client_height)) as i64;
        let lo = self.scroll_top as i64 - grow;
        let hi = (self.scroll_top + self.client_height) as i64 + grow;

        let mut entries = Vec::new();
        for row in &self.rows {
            let top = row.top as i64;
            let bottom = top + row.height as i64;
            let intersecting = top < hi && bottom > lo;
            if self.reported.get(&row.id) == Some(&intersecting) {
                continue;
            }
            self.reported.insert(row.id.clone(), intersecting);
            entries.push(IntersectionEntry::new(
                row.id.clone(),
                intersecting,
                row.height as f64,
            ));
        }
        entries
    }

    /// Forgets every reported state, so the next `intersections` reports all rows again (as a
    /// freshly connected observer would).
    pub fn reset_reports(&mut self) {
        self.reported.clear();
    }
}

impl<K> ScrollHost for SimulatedViewport<K> {
    fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    fn scroll_height(&self) -> u64 {
        self.scroll_height
    }

    fn client_height(&self) -> u64 {
        self.client_height
    }

    fn set_scroll_top(&mut self, top: u64) {
        self.scroll_top = top.min(self.scroll_height.saturating_sub(self.client_height));
    }
}
