#![forbid(unsafe_code)]

//! slotgrid public facade crate.
//!
//! Re-exports the common types of the internal crates and offers a prelude
//! for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use slotgrid_core::event::{
    ClickArea, ClickEvent, ClickKind, CloseEvent, DragEvent, Modifiers, MouseButton,
};
pub use slotgrid_core::{
    Container, ContainerId, ContainerKind, Dimensions, GRID_COLUMNS, GRID_ROWS, GridError, Host,
    Listener, ListenerId, MAX_SLOTS, Rejection, Scheduler, SlotContent, SlotRect, Task, Viewer,
    ViewerId,
};

// --- Render re-exports -----------------------------------------------------

pub use slotgrid_render::{
    Binding, Button, Click, FlatFrame, Icon, Item, MenuLink, Panel, PanelBehavior, PanelId,
    RenderOutcome, SlotChange, SlotDiff, Slots, from_fn,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use slotgrid_runtime::{
    Lifecycle, Menu, MenuBuilder, MenuConfig, MenuError, OpenOutcome, Opening,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for slotgrid apps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Layout failure while building panels.
    Grid(GridError),
    /// Menu construction or lifecycle failure.
    #[cfg(feature = "runtime")]
    Menu(MenuError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Menu(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Menu(err) => Some(err),
        }
    }
}

impl From<GridError> for Error {
    fn from(err: GridError) -> Self {
        Self::Grid(err)
    }
}

#[cfg(feature = "runtime")]
impl From<MenuError> for Error {
    fn from(err: MenuError) -> Self {
        Self::Menu(err)
    }
}

/// Standard result type for slotgrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ClickEvent, Container, ContainerKind, Error, GridError, Host, Icon, Item, Panel,
        PanelBehavior, Rejection, RenderOutcome, Result, SlotContent, Slots, Viewer,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{Menu, MenuConfig, OpenOutcome};

    pub use crate::{core, render};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use slotgrid_core as core;
pub use slotgrid_render as render;
#[cfg(feature = "runtime")]
pub use slotgrid_runtime as runtime;
