use feed_virtualizer::{ScrollContext, ViewCache};

fn main() {
    // Example: measured heights are remembered per navigable context.
    let home = ScrollContext::new("home").with_location_key("k1");
    let thread = ScrollContext::new("thread").with_location_key("k2");

    let mut cache: ViewCache<u64> = ViewCache::new();
    cache.set_height(&home.cache_key(), 101, 240);
    cache.set_height(&home.cache_key(), 102, 96);
    cache.set_height(&thread.cache_key(), 101, 180);
    cache.save_scroll_top(&home.cache_key(), 1_200);

    println!(
        "home: post 101={:?} scroll_top={:?}",
        cache.height(&home.cache_key(), &101),
        cache.scroll_top(&home.cache_key())
    );
    println!("thread: post 101={:?}", cache.height(&thread.cache_key(), &101));

    // Heights can be carried over to another session (e.g. serialized with the `serde` feature).
    let records = cache.export_heights();
    let mut restored: ViewCache<u64> = ViewCache::new();
    restored.import_heights(records);
    println!(
        "restored {} heights, {} for home",
        restored.len(),
        restored.context_len(&home.cache_key())
    );

    restored.clear_context(&thread.cache_key());
    println!("after clearing thread: {} heights", restored.len());
}
