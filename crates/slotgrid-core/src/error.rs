#![forbid(unsafe_code)]

//! Grid errors and the population rejection signal.

use std::fmt;

/// Failures raised synchronously by panel construction and slot assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// Panel width outside `1..=9` or height outside `1..=6`.
    InvalidDimensions { width: u16, height: u16 },
    /// Slot position outside the panel's rectangle.
    OutOfBounds {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
    /// The panel already belongs to another parent or is a menu root.
    AlreadyAttached,
    /// Attaching would make a panel its own ancestor.
    CyclicAttachment,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => write!(
                f,
                "invalid panel dimensions {width}x{height}: width must be 1..=9 and height 1..=6"
            ),
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(
                f,
                "slot ({x}, {y}) is outside a panel of {width}x{height}"
            ),
            Self::AlreadyAttached => write!(f, "panel is already attached elsewhere"),
            Self::CyclicAttachment => write!(f, "panel cannot be nested inside itself"),
        }
    }
}

impl std::error::Error for GridError {}

/// Deliberate abort of a render pass raised by population logic.
///
/// Carries a user-facing reason. The render pipeline converts it into a menu
/// close and delivers the reason to the viewer; it never reaches the caller
/// of `open` or `update` as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    reason: String,
}

impl Rejection {
    /// Reject the current render with a reason shown to the viewer.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The user-facing reason.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "population rejected: {}", self.reason)
    }
}

impl std::error::Error for Rejection {}

/// Layout mistakes inside a populate hook abort the render like a rejection.
impl From<GridError> for Rejection {
    fn from(err: GridError) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_dimensions() {
        let err = GridError::InvalidDimensions {
            width: 10,
            height: 2,
        };
        assert!(err.to_string().contains("10x2"));
    }

    #[test]
    fn rejection_keeps_reason_verbatim() {
        let rejection = Rejection::new("no items");
        assert_eq!(rejection.reason(), "no items");
        assert_eq!(rejection.to_string(), "population rejected: no items");
    }

    #[test]
    fn grid_errors_convert_to_rejections() {
        let rejection: Rejection = GridError::AlreadyAttached.into();
        assert_eq!(rejection.reason(), "panel is already attached elsewhere");
    }
}
