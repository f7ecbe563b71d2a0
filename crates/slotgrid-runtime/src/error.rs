#![forbid(unsafe_code)]

//! Menu errors.

use std::fmt;

use slotgrid_core::GridError;

use crate::menu::Lifecycle;

/// Errors from building or opening a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuError {
    /// The configured container kind does not map onto the grid.
    Grid(GridError),
    /// `open` was called on a menu that already left `Constructed` or is
    /// currently opening.
    AlreadyOpened { state: Lifecycle },
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(err) => write!(f, "menu layout error: {err}"),
            Self::AlreadyOpened { state } => {
                write!(f, "menu cannot be opened again (state: {state})")
            }
        }
    }
}

impl std::error::Error for MenuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(err) => Some(err),
            Self::AlreadyOpened { .. } => None,
        }
    }
}

impl From<GridError> for MenuError {
    fn from(err: GridError) -> Self {
        Self::Grid(err)
    }
}
