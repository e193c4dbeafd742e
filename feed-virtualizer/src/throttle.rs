/// A leading + trailing edge throttle driven by caller timestamps.
///
/// `call(now_ms)` returns `true` when the throttled function should run right away (leading
/// edge). Calls inside the window are coalesced into one trailing invocation, which
/// `poll(now_ms)` reports once the window has elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throttle {
    wait_ms: u64,
    last_invoke_ms: Option<u64>,
    trailing: bool,
}

impl Throttle {
    pub fn new(wait_ms: u64) -> Self {
        Self {
            wait_ms,
            last_invoke_ms: None,
            trailing: false,
        }
    }

    pub fn wait_ms(&self) -> u64 {
        self.wait_ms
    }

    pub fn set_wait_ms(&mut self, wait_ms: u64) {
        self.wait_ms = wait_ms;
    }

    fn window_elapsed(&self, now_ms: u64) -> bool {
        match self.last_invoke_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.wait_ms,
        }
    }

    pub fn call(&mut self, now_ms: u64) -> bool {
        if self.window_elapsed(now_ms) {
            self.last_invoke_ms = Some(now_ms);
            self.trailing = false;
            return true;
        }
        self.trailing = true;
        false
    }

    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !self.trailing || !self.window_elapsed(now_ms) {
            return false;
        }
        self.trailing = false;
        self.last_invoke_ms = Some(now_ms);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.trailing
    }

    /// Drops any pending trailing invocation and forgets the current window.
    pub fn cancel(&mut self) {
        self.trailing = false;
        self.last_invoke_ms = None;
    }
}
