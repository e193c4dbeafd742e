use crate::ScrollHost;

/// Distance from the scroll top to the bottom of the content, captured right before new
/// content is committed.
///
/// Restoring `scroll_top = scroll_height - distance_from_bottom` afterwards keeps whatever was
/// under the viewport in place when items were inserted above it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSnapshot {
    pub distance_from_bottom: u64,
}

impl ScrollSnapshot {
    pub fn capture(host: &impl ScrollHost) -> Self {
        Self {
            distance_from_bottom: host.scroll_height().saturating_sub(host.scroll_top()),
        }
    }

    /// The scroll top that puts the captured content back under the viewport.
    pub fn restored_scroll_top(&self, scroll_height: u64) -> u64 {
        scroll_height.saturating_sub(self.distance_from_bottom)
    }
}

/// Scroll metrics handed to items that resize themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollPosition {
    pub height: u64,
    pub top: u64,
}

impl ScrollPosition {
    pub fn snapshot(&self) -> ScrollSnapshot {
        ScrollSnapshot {
            distance_from_bottom: self.height.saturating_sub(self.top),
        }
    }
}

/// Whether `next` inserted items at the head of a non-empty `prev`.
pub(crate) fn items_inserted_at_head<K: PartialEq>(prev: &[K], next: &[K]) -> bool {
    match (prev.first(), next.first()) {
        (Some(prev_first), Some(next_first)) => {
            prev.len() < next.len() && prev_first != next_first
        }
        _ => false,
    }
}
