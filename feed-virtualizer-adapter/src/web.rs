//! Browser-backed ports.
//!
//! Rows are identified by a `data-id` attribute on their wrapper element, parsed back into the
//! item id with `FromStr`.

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use feed_virtualizer::{
    IdleDeadline, IdleHandle, IdleScheduler, IntersectionEntry, ObserverOptions, ObserverRoot,
    ScrollHost, ViewportObserver,
};
use js_sys::{Array, Object};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    Window,
};

/// Attribute holding the item id on every row wrapper.
pub const ID_ATTRIBUTE: &str = "data-id";

type EntryBuffer<K> = Rc<RefCell<Vec<IntersectionEntry<K>>>>;

/// A [`ViewportObserver`] on top of `IntersectionObserver`.
///
/// Reported entries are buffered; drain them with [`Self::take_entries`] (e.g. once per
/// animation frame) and pass them to `VirtualizedList::on_intersections`.
pub struct WebViewportObserver<K> {
    scroll_root: Option<Element>,
    observer: Option<IntersectionObserver>,
    callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
    entries: EntryBuffer<K>,
}

impl<K: FromStr + 'static> WebViewportObserver<K> {
    /// `scroll_root` is the list's scroll container, used when the list is not bound to the
    /// document.
    pub fn new(scroll_root: Option<Element>) -> Self {
        let entries: EntryBuffer<K> = Rc::new(RefCell::new(Vec::new()));
        let buffer = Rc::clone(&entries);
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::wrap(Box::new(
            move |batch: Array, _observer: IntersectionObserver| {
                let mut buffer = buffer.borrow_mut();
                for value in batch.iter() {
                    let Ok(entry) = value.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let Some(id) = entry
                        .target()
                        .get_attribute(ID_ATTRIBUTE)
                        .and_then(|raw| raw.parse::<K>().ok())
                    else {
                        awarn!("intersection entry without a parseable row id");
                        continue;
                    };
                    let mut parsed = IntersectionEntry::new(
                        id,
                        entry.is_intersecting(),
                        entry.bounding_client_rect().height(),
                    );
                    parsed.intersection_ratio = entry.intersection_ratio();
                    buffer.push(parsed);
                }
            },
        )
            as Box<dyn FnMut(Array, IntersectionObserver)>);

        Self {
            scroll_root,
            observer: None,
            callback,
            entries,
        }
    }

    pub fn take_entries(&self) -> Vec<IntersectionEntry<K>> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }
}

impl<K> ViewportObserver for WebViewportObserver<K> {
    type Node = Element;

    fn connect(&mut self, options: &ObserverOptions) {
        let init = IntersectionObserverInit::new();
        if let Some(margin) = options.root_margin {
            init.set_root_margin(&margin.to_string());
        }
        if options.root == ObserverRoot::ScrollContainer {
            init.set_root(
                self.scroll_root
                    .as_ref()
                    .map(|root| root.unchecked_ref::<Object>()),
            );
        }
        match IntersectionObserver::new_with_options(self.callback.as_ref().unchecked_ref(), &init)
        {
            Ok(observer) => self.observer = Some(observer),
            Err(_) => {
                awarn!("IntersectionObserver unavailable; rows stay rendered");
                self.observer = None;
            }
        }
    }

    fn observe(&mut self, node: &Element) {
        if let Some(observer) = &self.observer {
            observer.observe(node);
        }
    }

    fn unobserve(&mut self, node: &Element) {
        if let Some(observer) = &self.observer {
            observer.unobserve(node);
        }
    }

    fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.entries.borrow_mut().clear();
    }

    fn measure_height(&self, node: &Element) -> Option<f64> {
        Some(node.get_bounding_client_rect().height())
    }
}

/// The deadline handed to a `requestIdleCallback` callback.
pub struct WebIdleDeadline(pub web_sys::IdleDeadline);

impl IdleDeadline for WebIdleDeadline {
    fn time_remaining_ms(&self) -> f64 {
        self.0.time_remaining()
    }
}

/// An [`IdleScheduler`] on top of `requestIdleCallback`.
///
/// The list usually lives in an `Rc<RefCell<_>>`; `on_idle` borrows it and calls
/// `run_idle_tasks` with the deadline. Where `requestIdleCallback` is missing, requests return
/// `None` and the list falls back to running tasks from `tick`.
pub struct WebIdleScheduler {
    window: Option<Window>,
    callback: Closure<dyn FnMut(web_sys::IdleDeadline)>,
}

impl WebIdleScheduler {
    pub fn new(mut on_idle: impl FnMut(WebIdleDeadline) + 'static) -> Self {
        let callback = Closure::<dyn FnMut(web_sys::IdleDeadline)>::wrap(Box::new(
            move |deadline: web_sys::IdleDeadline| on_idle(WebIdleDeadline(deadline)),
        )
            as Box<dyn FnMut(web_sys::IdleDeadline)>);
        Self {
            window: web_sys::window(),
            callback,
        }
    }
}

impl IdleScheduler for WebIdleScheduler {
    fn request_idle(&mut self) -> Option<IdleHandle> {
        let window = self.window.as_ref()?;
        match window.request_idle_callback(self.callback.as_ref().unchecked_ref()) {
            Ok(id) => Some(IdleHandle(id as u64)),
            Err(_) => {
                awarn!("requestIdleCallback unavailable; using the tick fallback");
                None
            }
        }
    }

    fn cancel_idle(&mut self, handle: IdleHandle) {
        if let Some(window) = &self.window {
            window.cancel_idle_callback(handle.0 as u32);
        }
    }
}

/// The element that scrolls the list.
pub enum WebScrollHost {
    Element(Element),
    /// The document's scrolling element (lists bound to the document).
    Document(Document),
}

impl WebScrollHost {
    fn element(&self) -> Option<Element> {
        match self {
            Self::Element(element) => Some(element.clone()),
            Self::Document(document) => document
                .scrolling_element()
                .or_else(|| document.document_element()),
        }
    }
}

impl ScrollHost for WebScrollHost {
    fn scroll_top(&self) -> u64 {
        self.element()
            .map_or(0, |element| element.scroll_top().max(0) as u64)
    }

    fn scroll_height(&self) -> u64 {
        self.element()
            .map_or(0, |element| element.scroll_height().max(0) as u64)
    }

    fn client_height(&self) -> u64 {
        self.element()
            .map_or(0, |element| element.client_height().max(0) as u64)
    }

    fn set_scroll_top(&mut self, top: u64) {
        if let Some(element) = self.element() {
            element.set_scroll_top(top.min(i32::MAX as u64) as i32);
        }
    }
}
