#![forbid(unsafe_code)]

//! Core: slot geometry, host collaborator traits, events, and errors.

pub mod content;
pub mod error;
pub mod event;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod scheduler;

pub use content::SlotContent;
pub use error::{GridError, Rejection};
pub use geometry::{Dimensions, GRID_COLUMNS, GRID_ROWS, MAX_SLOTS, SlotRect};
pub use host::{Container, ContainerId, ContainerKind, Host, Listener, ListenerId, Viewer, ViewerId};
pub use scheduler::{Scheduler, Task};

// Without the feature the no-op macros are exported at the root directly.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};
