use crate::*;

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use feed_virtualizer::{
    IdleScheduler, ItemPhase, ListBody, ListOptions, ListProps, ObserverOptions, ObserverRoot,
    RenderState, RootMargin, ScrollContext, ScrollHost, VirtualizedList, ViewportObserver,
};

fn options() -> ListOptions<u32> {
    ListOptions::new(ScrollContext::new("home"))
}

fn driver(
    options: ListOptions<u32>,
    client_height: u64,
    ids: core::ops::Range<u32>,
) -> FeedDriver<u32> {
    let mut d = FeedDriver::new(options, SimulatedViewport::new(client_height));
    d.set_items(ids, ListProps::new(), 0);
    d.mount(0);
    d
}

#[test]
fn manual_observer_tracks_observed_nodes() {
    let mut o: ManualObserver<u32> = ManualObserver::new();
    let options = ObserverOptions {
        root: ObserverRoot::ScrollContainer,
        root_margin: Some(RootMargin::new(300, 0)),
    };
    o.connect(&options);
    o.observe(&1);
    o.observe(&1);
    o.observe(&2);
    assert_eq!(o.observed(), &[1, 2]);
    assert_eq!(o.options(), Some(&options));

    o.unobserve(&1);
    assert!(!o.is_observing(&1));

    assert_eq!(o.measure_height(&2), None);
    o.set_height(2, 42.0);
    o.set_height(2, 48.0);
    assert_eq!(o.measure_height(&2), Some(48.0));
    o.clear_height(&2);
    assert_eq!(o.measure_height(&2), None);

    o.disconnect();
    assert!(!o.is_connected());
    assert!(o.observed().is_empty());
    assert_eq!(o.connect_count(), 1);
}

#[test]
fn manual_scheduler_hands_out_one_request() {
    let mut s = ManualIdleScheduler::new();
    let first = s.request_idle();
    assert!(s.is_requested());
    assert_eq!(s.take_request(), first);
    assert!(!s.is_requested());

    let second = s.request_idle().expect("supported");
    s.cancel_idle(second);
    assert!(!s.is_requested());
    assert_eq!(s.request_count(), 2);
    assert_eq!(s.cancel_count(), 1);

    let mut none = ManualIdleScheduler::without_idle_callbacks();
    assert_eq!(none.request_idle(), None);
}

#[test]
fn viewport_reports_intersection_changes_only() {
    let mut list: ManualList<u32> = VirtualizedList::new(
        options(),
        SimulatedViewport::new(100),
        ManualObserver::new(),
        ManualIdleScheduler::new(),
    );
    list.update(0..3, ListProps::new());
    let view = list.render();
    let vp = list.host_mut();
    vp.layout(&view);
    assert_eq!(vp.scroll_height(), 300);
    assert_eq!(vp.row(&2).map(|r| r.top), Some(200));

    let first: Vec<(u32, bool)> = vp
        .intersections(None)
        .iter()
        .map(|e| (e.id, e.is_intersecting))
        .collect();
    assert_eq!(first, vec![(0, true), (1, false), (2, false)]);
    assert!(vp.intersections(None).is_empty());

    vp.scroll_to(150);
    let moved: Vec<(u32, bool)> = vp
        .intersections(None)
        .iter()
        .map(|e| (e.id, e.is_intersecting))
        .collect();
    assert_eq!(moved, vec![(0, false), (1, true), (2, true)]);

    // A 300% margin reaches every row again.
    let grown = vp.intersections(Some(RootMargin::new(300, 0)));
    assert_eq!(grown.len(), 1);
    assert_eq!(grown[0].id, 0);
    assert!(grown[0].is_intersecting);
}

#[test]
fn viewport_clamps_scroll_top_when_content_shrinks() {
    let mut list: ManualList<u32> = VirtualizedList::new(
        options(),
        SimulatedViewport::new(100),
        ManualObserver::new(),
        ManualIdleScheduler::new(),
    );
    list.update(0..5, ListProps::new());
    let view = list.render();
    list.host_mut().layout(&view);
    list.host_mut().scroll_to(1_000);
    assert_eq!(list.host().scroll_top(), 400);

    list.update(0..2, ListProps::new());
    let view = list.render();
    list.host_mut().layout(&view);
    assert_eq!(list.host().scroll_top(), 100);
    assert_eq!(list.host().offset_in_viewport(&1), Some(0));
}

#[test]
fn driver_unrenders_rows_beyond_the_margin() {
    let mut d = FeedDriver::new(options(), SimulatedViewport::new(600).with_default_height(120));
    d.set_items(0..50, ListProps::new(), 0);
    d.mount(0);
    d.frame(16);

    // 600px viewport + 1800px margin below: rows 0..=19 start above 2400px.
    assert_eq!(d.list().phase(&19), Some(ItemPhase::Rendered));
    assert_eq!(d.list().phase(&20), Some(ItemPhase::Unrendered));
    assert_eq!(d.viewport().row(&20).map(|r| r.height), Some(120));
    assert_eq!(d.viewport().scroll_height(), 6_000);
    assert_eq!(
        d.list().view_cache().height("default:home", &49),
        Some(120)
    );

    d.scroll_to(3_000, 200);
    d.frame(216);
    assert_eq!(d.list().phase(&5), Some(ItemPhase::Unrendered));
    assert_eq!(d.list().phase(&30), Some(ItemPhase::Rendered));
    assert_eq!(d.viewport().scroll_height(), 6_000);
}

#[test]
fn driver_preserves_position_across_prepend() {
    let mut d = driver(options(), 300, 0..10);
    d.frame(16);
    d.scroll_to(250, 200);
    assert_eq!(d.viewport().offset_in_viewport(&3), Some(50));

    d.set_items([100, 101].into_iter().chain(0..10), ListProps::new(), 400);
    assert_eq!(d.viewport().offset_in_viewport(&3), Some(50));
    assert_eq!(d.viewport().scroll_top(), 450);
}

#[test]
fn driver_snaps_back_after_prepend_under_a_resting_mouse() {
    let mut d = driver(options(), 300, 0..5);
    d.mouse_move(10);
    assert!(d.list().snap_to_top_armed());

    d.set_items([100, 101].into_iter().chain(0..5), ListProps::new(), 20);
    assert_eq!(d.viewport().scroll_top(), 200);

    d.frame(400);
    assert_eq!(d.viewport().scroll_top(), 0);
    assert!(!d.list().mouse_moved_recently());
}

#[test]
fn driver_wheel_keeps_position_after_prepend() {
    let mut d = driver(options(), 300, 0..5);
    d.mouse_move(10);
    d.set_items([100, 101].into_iter().chain(0..5), ListProps::new(), 20);
    d.wheel(10, 30);
    assert!(!d.list().snap_to_top_armed());

    d.frame(400);
    assert_eq!(d.viewport().scroll_top(), 210);
}

#[test]
fn driver_loads_more_near_the_bottom() {
    let loads = Arc::new(AtomicUsize::new(0));
    let opts = options().with_on_load_more(Some({
        let loads = Arc::clone(&loads);
        move || {
            loads.fetch_add(1, Ordering::SeqCst);
        }
    }));
    let mut d = FeedDriver::new(opts, SimulatedViewport::new(300));
    d.set_items(0..10, ListProps::new().with_has_more(true), 0);
    d.mount(0);
    assert_eq!(loads.load(Ordering::SeqCst), 0);

    d.scroll_to(400, 200);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    d.scroll_to(450, 400);
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    match d.frame(416).body {
        ListBody::Feed { load_more, .. } => assert!(load_more.is_some_and(|l| l.visible)),
        other => panic!("expected a feed body, got {other:?}"),
    }
}

#[test]
fn driver_stays_latched_when_items_arrive_at_the_head() {
    let loads = Arc::new(AtomicUsize::new(0));
    let opts = options().with_on_load_more(Some({
        let loads = Arc::clone(&loads);
        move || {
            loads.fetch_add(1, Ordering::SeqCst);
        }
    }));
    let props = ListProps::new().with_has_more(true);
    let mut d = FeedDriver::new(opts, SimulatedViewport::new(300));
    d.set_items(0..10, props, 0);
    d.mount(0);

    d.scroll_to(450, 200);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    let y_before = d.viewport().offset_in_viewport(&4);

    // A newer item lands above the viewport; the restore keeps the reader inside the zone.
    d.set_items([100].into_iter().chain(0..10), props, 400);
    assert_eq!(d.viewport().scroll_top(), 550);
    assert_eq!(d.viewport().offset_in_viewport(&4), y_before);
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    // Older items appended at the tail re-arm the trigger.
    d.set_items([100].into_iter().chain(0..12), props, 600);
    d.scroll_to(1_000, 800);
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn driver_reattaching_a_row_keeps_it_observed() {
    let mut d = driver(options(), 600, 1..4);
    d.list_mut().attach_node(&1, 1);
    assert!(d.list().tracker().is_observing(&1));
    assert!(d.list().tracker().observer().is_observing(&1));
}

#[test]
fn driver_restores_heights_and_position_in_a_new_list() {
    let mut first = driver(options(), 300, 0..10);
    first.frame(16);
    first.scroll_to(500, 200);
    first.unmount();
    let cache = first.list_mut().take_view_cache();

    let list = VirtualizedList::new(
        options(),
        SimulatedViewport::new(300),
        ManualObserver::new(),
        ManualIdleScheduler::new(),
    )
    .with_view_cache(cache);
    let mut second = FeedDriver::from_list(list);
    second.set_items(0..10, ListProps::new(), 0);
    assert_eq!(second.list().phase(&0), Some(ItemPhase::Unrendered));
    assert_eq!(second.viewport().scroll_height(), 1_000);

    second.mount(0);
    assert_eq!(second.viewport().scroll_top(), 500);

    let view = second.frame(16);
    assert!(
        view.rows()
            .iter()
            .all(|row| row.view.state == RenderState::Rendered)
    );
}

#[test]
fn driver_falls_back_to_ticks_without_idle_callbacks() {
    let list = VirtualizedList::new(
        options(),
        SimulatedViewport::new(300),
        ManualObserver::new(),
        ManualIdleScheduler::without_idle_callbacks(),
    );
    let mut d = FeedDriver::from_list(list);
    d.set_items(0..3, ListProps::new(), 0);
    d.mount(0);

    d.frame(20);
    assert_eq!(d.list().item(&0).and_then(|i| i.measured_height()), None);
    d.frame(60);
    assert_eq!(d.list().item(&0).and_then(|i| i.measured_height()), Some(100));
}

#[test]
fn driver_settles_and_unmount_releases_everything() {
    let mut d = driver(options(), 300, 0..20);
    let end = d.settle(16, 16, 8);
    assert_eq!(end, 16);
    assert_eq!(d.list().pending_idle_tasks(), 0);

    d.scroll_to(1_000, 200);
    d.frame(216);
    d.unmount();
    assert!(!d.list().tracker().is_connected());
    assert!(d.list().tracker().observer().observed().is_empty());
    assert!(!d.list().scheduler().is_requested());

    // Mounting again re-observes every row and reports them afresh.
    d.mount(1_000);
    assert_eq!(d.list().tracker().observer().observed().len(), 20);
    assert_eq!(d.list().tracker().observer().connect_count(), 2);
}
