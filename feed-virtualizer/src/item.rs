use crate::{IntersectionEntry, IntersectionState, ItemPhase, RenderState, RowView};

/// Virtualization state of one list item.
///
/// The item decides whether its content is mounted (`Rendered`) or replaced by a fixed-height
/// placeholder (`Unrendered`):
///
/// - it starts `Unrendered` when a cached height is known, `Rendered` otherwise (rendered once
///   to be measured);
/// - leaving the viewport queues an idle-time hide confirmation (`PendingHide`) instead of
///   unrendering immediately, so short scroll bounces do not flicker;
/// - re-entering the viewport renders it again right away.
#[derive(Clone, Debug)]
pub struct VirtualizedListItem<K, N> {
    id: K,
    index: usize,
    list_length: usize,
    node: Option<N>,
    intersection: IntersectionState,
    hidden: bool,
    hide_pending: bool,
    entry_height: Option<f64>,
    measured_height: Option<u32>,
    cached_height: Option<u32>,
    last_view: Option<RowView<K>>,
}

/// Idle work requested by an intersection change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct IntersectionOutcome {
    pub(crate) confirm_hide: bool,
}

impl<K: Clone + PartialEq, N> VirtualizedListItem<K, N> {
    pub fn new(id: K, index: usize, list_length: usize, cached_height: Option<u32>) -> Self {
        Self {
            id,
            index,
            list_length,
            node: None,
            intersection: IntersectionState::Unknown,
            hidden: false,
            hide_pending: false,
            entry_height: None,
            measured_height: None,
            cached_height,
            last_view: None,
        }
    }

    pub fn id(&self) -> &K {
        &self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn list_length(&self) -> usize {
        self.list_length
    }

    pub fn node(&self) -> Option<&N> {
        self.node.as_ref()
    }

    pub fn intersection(&self) -> IntersectionState {
        self.intersection
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn measured_height(&self) -> Option<u32> {
        self.measured_height
    }

    pub fn cached_height(&self) -> Option<u32> {
        self.cached_height
    }

    pub(crate) fn set_position(&mut self, index: usize, list_length: usize) {
        self.index = index;
        self.list_length = list_length;
    }

    pub(crate) fn set_cached_height(&mut self, cached_height: Option<u32>) {
        self.cached_height = cached_height;
    }

    pub(crate) fn attach(&mut self, node: N) -> Option<N> {
        self.node.replace(node)
    }

    pub(crate) fn detach(&mut self) -> Option<N> {
        self.node.take()
    }

    /// `Unrendered` while not intersecting and either hidden, or never observed with a cached
    /// height to stand in for the content.
    pub fn render_state(&self) -> RenderState {
        let stand_in =
            self.intersection == IntersectionState::Unknown && self.cached_height.is_some();
        let unrendered = !self.intersection.is_intersecting() && (self.hidden || stand_in);
        if unrendered {
            RenderState::Unrendered
        } else {
            RenderState::Rendered
        }
    }

    pub fn phase(&self) -> ItemPhase {
        match self.render_state() {
            RenderState::Unrendered => ItemPhase::Unrendered,
            RenderState::Rendered
                if self.hide_pending
                    && self.intersection == IntersectionState::NotIntersecting =>
            {
                ItemPhase::PendingHide
            }
            RenderState::Rendered => ItemPhase::Rendered,
        }
    }

    /// Height of the placeholder used while unrendered.
    pub fn placeholder_height(&self, fallback: u32) -> u32 {
        self.measured_height
            .or(self.cached_height)
            .unwrap_or(fallback)
    }

    pub(crate) fn apply_intersection(
        &mut self,
        entry: &IntersectionEntry<K>,
    ) -> IntersectionOutcome {
        let prev = self.intersection;
        let was_unrendered = self.render_state() == RenderState::Unrendered;
        self.intersection = IntersectionState::from_intersecting(entry.is_intersecting);
        self.entry_height = Some(entry.bounding_height);
        if entry.is_intersecting {
            self.hidden = false;
        } else if was_unrendered {
            self.hidden = true;
        }

        let confirm_hide = prev != IntersectionState::NotIntersecting
            && !entry.is_intersecting
            && !was_unrendered;
        if confirm_hide {
            self.hide_pending = true;
        }
        IntersectionOutcome { confirm_hide }
    }

    /// Idle-time hide confirmation. Returns `true` when the item became hidden.
    pub(crate) fn confirm_hidden(&mut self) -> bool {
        self.hide_pending = false;
        let was_hidden = self.hidden;
        self.hidden = !self.intersection.is_intersecting();
        self.hidden && !was_hidden
    }

    /// Records a height measurement. `layout_height` is a fresh layout query, when the platform
    /// offers one; otherwise the last intersection entry's height is used.
    ///
    /// Zero, negative and non-finite heights are discarded (the element is likely hidden by an
    /// ancestor) and the last known height is kept.
    pub(crate) fn measure(&mut self, layout_height: Option<f64>) -> Option<u32> {
        let raw = layout_height.or(self.entry_height)?;
        let height = sanitize_height(raw)?;
        self.measured_height = Some(height);
        Some(height)
    }

    pub fn view(&self, fallback_height: u32) -> RowView<K> {
        let state = self.render_state();
        let unrendered = state == RenderState::Unrendered;
        RowView {
            id: self.id.clone(),
            index: self.index,
            list_length: self.list_length,
            state,
            placeholder_height: unrendered.then(|| self.placeholder_height(fallback_height)),
            focusable: unrendered,
        }
    }

    /// Whether a row last drawn as `prev` must be drawn again.
    ///
    /// Rendered rows always update (their content may have changed). Unrendered rows only
    /// update when something their placeholder shows has changed.
    pub fn should_update(&self, prev: &RowView<K>, fallback_height: u32) -> bool {
        let next = self.view(fallback_height);
        if prev.state != next.state {
            return true;
        }
        match next.state {
            RenderState::Rendered => true,
            RenderState::Unrendered => {
                prev.id != next.id
                    || prev.index != next.index
                    || prev.list_length != next.list_length
                    || prev.placeholder_height != next.placeholder_height
            }
        }
    }

    /// Computes the row view and whether it needs drawing, remembering it for the next pass.
    pub(crate) fn render(&mut self, fallback_height: u32) -> (RowView<K>, bool) {
        let view = self.view(fallback_height);
        let needs_update = match &self.last_view {
            Some(prev) => self.should_update(prev, fallback_height),
            None => true,
        };
        self.last_view = Some(view.clone());
        (view, needs_update)
    }
}

fn sanitize_height(raw: f64) -> Option<u32> {
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }
    let rounded = raw + 0.5;
    if rounded >= u32::MAX as f64 {
        Some(u32::MAX)
    } else {
        Some(rounded as u32)
    }
}
