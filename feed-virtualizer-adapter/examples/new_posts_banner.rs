use feed_virtualizer::{ListBody, ListOptions, ListProps, ScrollContext, ScrollHost};
use feed_virtualizer_adapter::{FeedDriver, SimulatedViewport};

fn main() {
    // Example: new posts wait behind a banner, then get inserted without moving the reader.
    let options = ListOptions::new(ScrollContext::new("home"))
        .with_on_load_pending(Some(|| println!("  -> load pending requested")));
    let viewport = SimulatedViewport::new(400).with_banner_height(40);
    let mut feed = FeedDriver::new(options, viewport);

    let mut ids: Vec<u64> = (100..130).rev().collect();
    feed.set_items(ids.iter().copied(), ListProps::new(), 0);
    feed.mount(0);
    let now = feed.settle(16, 16, 10);

    feed.scroll_to(900, now + 200);
    let anchor = ids[12];
    println!(
        "reading post {anchor} at y={:?}",
        feed.viewport().offset_in_viewport(&anchor)
    );

    // Three posts arrive; they are held back behind the banner.
    feed.set_items(ids.iter().copied(), ListProps::new().with_num_pending(3), now + 400);
    if let ListBody::Feed { pending, .. } = feed.frame(now + 416).body {
        println!("banner shows {pending:?} new posts");
    }
    println!(
        "post {anchor} at y={:?} with the banner",
        feed.viewport().offset_in_viewport(&anchor)
    );

    // The reader clicks the banner: the posts are inserted at the head.
    feed.list_mut().load_pending_clicked(now + 600);
    let mut newer: Vec<u64> = (130..133).rev().collect();
    newer.extend(&ids);
    ids = newer;
    feed.set_items(ids.iter().copied(), ListProps::new(), now + 600);
    println!(
        "post {anchor} at y={:?} after inserting, scroll_top={}",
        feed.viewport().offset_in_viewport(&anchor),
        feed.viewport().scroll_top()
    );
}
