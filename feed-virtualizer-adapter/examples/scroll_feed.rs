use feed_virtualizer::{ListOptions, ListProps, RenderState, ScrollContext, ScrollHost};
use feed_virtualizer_adapter::{FeedDriver, SimulatedViewport};

fn main() {
    // Example: scroll through a long feed and watch far-away rows turn into placeholders.
    let options = ListOptions::new(ScrollContext::new("home")).with_on_load_more(Some(|| {
        println!("  -> load more requested");
    }));
    let viewport = SimulatedViewport::new(600).with_default_height(120);
    let mut feed = FeedDriver::new(options, viewport);

    feed.set_items(0u64..200, ListProps::new().with_has_more(true), 0);
    feed.mount(0);
    let mut now = feed.settle(16, 16, 10);

    for top in [0u64, 6_000, 12_000, 23_000] {
        now += 200;
        feed.scroll_to(top, now);
        let view = feed.frame(now);
        let rendered = view
            .rows()
            .iter()
            .filter(|row| row.view.state == RenderState::Rendered)
            .count();
        println!(
            "scroll_top={:>5} rendered={rendered:>3}/{} scroll_height={}",
            feed.viewport().scroll_top(),
            view.rows().len(),
            feed.viewport().scroll_height(),
        );
    }

    feed.unmount();
}
