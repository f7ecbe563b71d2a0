#![forbid(unsafe_code)]

//! Logging shim shared by the render and runtime crates.
//!
//! Call sites write `slotgrid_core::debug!(...)` and friends. With the
//! `tracing` feature these are the `tracing` macros; without it they expand
//! to nothing and spans become [`NoopSpan`].
//!
//! | macro | emitted for |
//! |-------|-------------|
//! | `debug_span!` | `panel_render` around every render pass, `slot_diff` around diff computation |
//! | `debug!` | writes applied by a pass, passes skipped because a panel is unbound |
//! | `trace!` | diff sizes, clicks on slots no item claims |
//! | `warn!` | populate hooks rejecting a pass |
//!
//! Lifecycle and container recreation events are logged by the runtime
//! crate directly through `tracing`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// Discards its arguments.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Discards its arguments.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Discards its arguments.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// Evaluates to a [`NoopSpan`](crate::logging::NoopSpan).
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Stand-in for a render pass span when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Returns a guard that does nothing on drop.
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned by [`NoopSpan::enter`].
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;
