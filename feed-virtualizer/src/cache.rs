use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::key::{ItemKey, KeyMap};

/// Identifies the navigable view a list is rendered in.
///
/// Heights and scroll positions are remembered per context, so returning to a previous view
/// (same location, same list) restores its layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollContext {
    pub scroll_key: String,
    /// Key of the navigation entry (history location) showing the list.
    pub location_key: Option<String>,
}

impl ScrollContext {
    pub fn new(scroll_key: impl Into<String>) -> Self {
        Self {
            scroll_key: scroll_key.into(),
            location_key: None,
        }
    }

    pub fn with_location_key(mut self, location_key: impl Into<String>) -> Self {
        self.location_key = Some(location_key.into());
        self
    }

    /// The cache key: `"{location}:{scroll_key}"`.
    pub fn cache_key(&self) -> String {
        let location = self.location_key.as_deref().unwrap_or("default");
        format!("{location}:{}", self.scroll_key)
    }
}

/// One exported height measurement.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightRecord<K> {
    pub context: String,
    pub id: K,
    pub height: u32,
}

/// Heights and scroll positions remembered per context key.
///
/// Heights are layout hints only: entries are overwritten by newer measurements but never
/// evicted on their own.
#[derive(Clone, Debug)]
pub struct ViewCache<K> {
    heights: KeyMap<String, KeyMap<K, u32>>,
    scroll_tops: KeyMap<String, u64>,
}

impl<K> Default for ViewCache<K> {
    fn default() -> Self {
        Self {
            heights: KeyMap::new(),
            scroll_tops: KeyMap::new(),
        }
    }
}

impl<K: ItemKey> ViewCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height(&self, context: &str, id: &K) -> Option<u32> {
        self.heights.get(context)?.get(id).copied()
    }

    pub fn set_height(&mut self, context: &str, id: K, height: u32) {
        match self.heights.get_mut(context) {
            Some(per_item) => {
                per_item.insert(id, height);
            }
            None => {
                let mut per_item = KeyMap::new();
                per_item.insert(id, height);
                self.heights.insert(String::from(context), per_item);
            }
        }
    }

    pub fn scroll_top(&self, context: &str) -> Option<u64> {
        self.scroll_tops.get(context).copied()
    }

    pub fn save_scroll_top(&mut self, context: &str, top: u64) {
        self.scroll_tops.insert(String::from(context), top);
    }

    /// Number of cached heights across all contexts.
    pub fn len(&self) -> usize {
        self.heights.values().map(|per_item| per_item.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn context_len(&self, context: &str) -> usize {
        self.heights.get(context).map_or(0, |per_item| per_item.len())
    }

    /// Forgets everything remembered for `context`.
    pub fn clear_context(&mut self, context: &str) {
        self.heights.remove(context);
        self.scroll_tops.remove(context);
    }

    /// Exports the cached heights (useful for persistence).
    pub fn export_heights(&self) -> Vec<HeightRecord<K>> {
        let mut out = Vec::with_capacity(self.len());
        for (context, per_item) in self.heights.iter() {
            for (id, &height) in per_item.iter() {
                out.push(HeightRecord {
                    context: context.clone(),
                    id: id.clone(),
                    height,
                });
            }
        }
        out
    }

    /// Merges previously exported heights; later records win.
    pub fn import_heights(&mut self, records: impl IntoIterator<Item = HeightRecord<K>>) {
        let mut n = 0usize;
        for record in records {
            self.set_height(&record.context, record.id, record.height);
            n = n.saturating_add(1);
        }
        vdebug!(records = n, "import_heights");
    }
}
