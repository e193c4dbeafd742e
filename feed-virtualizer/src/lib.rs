//! A headless, intersection-driven virtualized feed list.
//!
//! For deterministic and browser-backed port implementations, see the
//! `feed-virtualizer-adapter` crate.
//!
//! The crate keeps long, keyed feeds cheap to render: items far away from the viewport are
//! swapped for fixed-height placeholders, measured heights are cached per navigable context,
//! and the scroll position is preserved when new items arrive above the viewport.
//!
//! It is UI-agnostic. A TUI/GUI/DOM layer is expected to provide:
//! - an intersection observer ([`ViewportObserver`]) and the entries it reports
//! - an idle-time scheduler ([`IdleScheduler`])
//! - the scrollable host metrics ([`ScrollHost`])
//! - timestamps (`now_ms`) for scroll, wheel, mouse and tick events
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod cache;
mod idle;
mod item;
mod key;
mod list;
mod options;
mod ports;
mod snapshot;
mod throttle;
mod tracker;
mod types;


pub use cache::{HeightRecord, ScrollContext, ViewCache};
pub use idle::{IdleTask, IdleTaskQueue};
pub use item::VirtualizedListItem;
pub use list::VirtualizedList;
pub use options::{HeightCallback, ListCallback, ListOptions, ListProps, ListTuning};
pub use ports::{
    IdleDeadline, IdleHandle, IdleScheduler, ObserverOptions, ObserverRoot, RootMargin,
    ScrollHost, Unbounded, ViewportObserver,
};
pub use snapshot::{ScrollPosition, ScrollSnapshot};
pub use throttle::Throttle;
pub use tracker::{IntersectionCallback, ViewportIntersectionTracker};
pub use types::{
    IntersectionEntry, IntersectionState, ItemPhase, ListBody, ListView, LoadMoreView,
    RenderState, RowRender, RowView,
};

pub use key::ItemKey;
