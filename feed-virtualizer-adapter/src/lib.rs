//! Port implementations and a frame driver for the `feed-virtualizer` crate.
//!
//! `feed-virtualizer` is UI-agnostic and only talks to the platform through its ports. This crate
//! provides:
//!
//! - deterministic, in-memory ports ([`ManualObserver`], [`ManualIdleScheduler`],
//!   [`SimulatedViewport`]) for tests, demos and non-browser hosts
//! - [`FeedDriver`], a frame loop that wires them to a list the way a UI layer would
//! - on `wasm32`, browser-backed ports in [`web`] (`IntersectionObserver`,
//!   `requestIdleCallback` and the scrolling element)
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod driver;
mod key;
mod manual;
mod viewport;

#[cfg(all(target_arch = "wasm32", feature = "std"))]
pub mod web;

#[cfg(test)]
mod tests;

pub use driver::{FeedDriver, ManualList};
pub use manual::{ManualIdleScheduler, ManualObserver};
pub use viewport::{RowBox, SimulatedViewport};
