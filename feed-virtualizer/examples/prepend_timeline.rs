// Example: new posts arrive above the viewport and the visible post stays put.
use feed_virtualizer::{
    IdleHandle, IdleScheduler, ListOptions, ListProps, ObserverOptions, ScrollContext, ScrollHost,
    VirtualizedList, ViewportObserver,
};

// Every post is 100px tall; the host lays rows out itself.
const ROW: u64 = 100;

struct Host {
    top: u64,
    height: u64,
    client: u64,
}

impl ScrollHost for Host {
    fn scroll_top(&self) -> u64 {
        self.top
    }
    fn scroll_height(&self) -> u64 {
        self.height
    }
    fn client_height(&self) -> u64 {
        self.client
    }
    fn set_scroll_top(&mut self, top: u64) {
        self.top = top.min(self.height.saturating_sub(self.client));
    }
}

// Nothing is observed in this example, so every row stays rendered.
struct NoObserver;

impl ViewportObserver for NoObserver {
    type Node = u64;
    fn connect(&mut self, _options: &ObserverOptions) {}
    fn observe(&mut self, _node: &u64) {}
    fn unobserve(&mut self, _node: &u64) {}
    fn disconnect(&mut self) {}
}

struct NoIdle;

impl IdleScheduler for NoIdle {
    fn request_idle(&mut self) -> Option<IdleHandle> {
        None
    }
    fn cancel_idle(&mut self, _handle: IdleHandle) {}
}

fn main() {
    let host = Host {
        top: 0,
        height: 0,
        client: 300,
    };
    let options = ListOptions::new(ScrollContext::new("home"));
    let mut list = VirtualizedList::new(options, host, NoObserver, NoIdle);

    let older: Vec<u64> = (10..20).rev().collect();
    list.update(older.iter().copied(), ListProps::new());
    list.host_mut().height = list.len() as u64 * ROW;
    list.mount(0);

    list.host_mut().top = 250;
    list.on_scroll(200);
    let anchor_top = |list: &VirtualizedList<u64, Host, NoObserver, NoIdle>| {
        let index = list.ids().iter().position(|id| *id == 17).unwrap_or(0) as u64;
        (index * ROW) as i64 - list.host().scroll_top() as i64
    };
    println!("before: scroll_top={} post 17 at y={}", list.host().top, anchor_top(&list));

    // Two newer posts arrive at the head. Capture, commit the new layout, restore.
    let newer: Vec<u64> = (20..22).rev().chain(older).collect();
    list.update(newer, ListProps::new());
    list.host_mut().height = list.len() as u64 * ROW;
    list.commit();

    println!("after:  scroll_top={} post 17 at y={}", list.host().top, anchor_top(&list));
    list.unmount();
}
