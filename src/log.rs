//! Logging functionality, dependent on whether the `tracing` feature is
//! enabled. Without it all log statements become no-ops.

#[cfg(feature = "tracing")]
pub(crate) use tracing::debug;
#[cfg(feature = "tracing")]
pub(crate) use tracing::trace;
#[cfg(feature = "tracing")]
pub(crate) use tracing::warn;

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($args:tt)*) => {{
        if false {
            let _ = format_args!($($args)*);
        }
    }};
}
#[cfg(not(feature = "tracing"))]
pub(crate) use debug;

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($args:tt)*) => {
        $crate::log::debug!($($args)*)
    };
}
#[cfg(not(feature = "tracing"))]
pub(crate) use trace;

#[cfg(not(feature = "tracing"))]
macro_rules! warn {
    ($($args:tt)*) => {
        $crate::log::debug!($($args)*)
    };
}
#[cfg(not(feature = "tracing"))]
pub(crate) use warn;
