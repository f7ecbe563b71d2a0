#![forbid(unsafe_code)]

//! Slot grid geometry.
//!
//! Every container a menu renders into is addressed as a 9-column grid with
//! at most 6 rows. Absolute slot indices are row-major:
//! `slot = y * GRID_COLUMNS + x`.

use crate::error::GridError;

/// Columns in the absolute slot grid.
pub const GRID_COLUMNS: u16 = 9;

/// Maximum rows in the absolute slot grid.
pub const GRID_ROWS: u16 = 6;

/// Maximum number of addressable slots (`GRID_COLUMNS * GRID_ROWS`).
pub const MAX_SLOTS: usize = GRID_COLUMNS as usize * GRID_ROWS as usize;

/// Convert an absolute grid position to a slot index.
#[inline]
pub const fn slot_index(x: u16, y: u16) -> usize {
    y as usize * GRID_COLUMNS as usize + x as usize
}

/// Convert a slot index back to an absolute `(x, y)` grid position.
#[inline]
pub const fn slot_position(slot: usize) -> (u16, u16) {
    (
        (slot % GRID_COLUMNS as usize) as u16,
        (slot / GRID_COLUMNS as usize) as u16,
    )
}

/// Validated panel dimensions.
///
/// Width is always in `1..=9`, height in `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u16,
    height: u16,
}

impl Dimensions {
    /// Validate and build dimensions.
    pub fn new(width: u16, height: u16) -> Result<Self, GridError> {
        if !(1..=GRID_COLUMNS).contains(&width) || !(1..=GRID_ROWS).contains(&height) {
            return Err(GridError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in slots.
    #[inline]
    pub const fn width(self) -> u16 {
        self.width
    }

    /// Height in slots.
    #[inline]
    pub const fn height(self) -> u16 {
        self.height
    }

    /// Number of local cells (`width * height`).
    #[inline]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check whether a local position lies inside these dimensions.
    #[inline]
    pub const fn contains(self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Check a local position, reporting `OutOfBounds` when outside.
    pub fn check(self, x: u16, y: u16) -> Result<(), GridError> {
        if self.contains(x, y) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Split a linear local slot into `(x, y)` using this panel's width.
    #[inline]
    pub const fn linear(self, slot: u16) -> (u16, u16) {
        (slot % self.width, slot / self.width)
    }

    /// Position this panel's rectangle at the given absolute origin.
    #[inline]
    pub const fn at(self, x: u16, y: u16) -> SlotRect {
        SlotRect::new(x, y, self.width, self.height)
    }
}

/// A rectangle in absolute grid coordinates.
///
/// Unlike [`Dimensions`], a `SlotRect` may extend past the grid; use
/// [`SlotRect::clamp_to_grid`] before addressing slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotRect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in slots.
    pub width: u16,
    /// Height in slots.
    pub height: u16,
}

impl SlotRect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full 9×6 grid.
    #[inline]
    pub const fn grid() -> Self {
        Self::new(0, 0, GRID_COLUMNS, GRID_ROWS)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[inline]
    pub fn intersection_opt(&self, other: &SlotRect) -> Option<SlotRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(SlotRect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Clip to the absolute 9×6 grid. Empty when fully outside.
    #[inline]
    pub fn clamp_to_grid(&self) -> SlotRect {
        self.intersection_opt(&SlotRect::grid()).unwrap_or_default()
    }

    /// Absolute slot indices covered by the grid-clamped rectangle, row-major.
    pub fn slots(&self) -> impl Iterator<Item = usize> {
        let clamped = self.clamp_to_grid();
        (clamped.y..clamped.bottom())
            .flat_map(move |y| (clamped.x..clamped.right()).map(move |x| slot_index(x, y)))
    }
}
