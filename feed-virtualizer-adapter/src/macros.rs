#[cfg(feature = "tracing")]
macro_rules! adebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "feed_virtualizer_adapter", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! adebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
#[cfg_attr(not(all(target_arch = "wasm32", feature = "std")), allow(unused_macros))]
macro_rules! awarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "feed_virtualizer_adapter", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
#[cfg_attr(not(all(target_arch = "wasm32", feature = "std")), allow(unused_macros))]
macro_rules! awarn {
    ($($tt:tt)*) => {};
}
