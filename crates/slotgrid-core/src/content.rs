#![forbid(unsafe_code)]

//! Slot content: what occupies a single cell of a container.

use std::fmt;

/// A value stored in one container slot.
///
/// The host supplies the concrete type (an item stack, a glyph, ...). The
/// engine only needs equality for diffing, an empty sentinel, and the owned
/// marker used to sweep menu icons out of a viewer's personal inventory.
///
/// # Contract
///
/// - `Self::empty().is_empty()` is always true.
/// - The owned marker survives `clone()`.
/// - `mark_owned` on an empty value returns it unchanged.
/// - `a.clone().mark_owned() == a.mark_owned()` (tagging is deterministic),
///   so a tagged write compares equal to the next tagged render.
pub trait SlotContent: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The empty-slot sentinel.
    fn empty() -> Self;

    /// Whether this value represents an empty slot.
    fn is_empty(&self) -> bool;

    /// Return a copy carrying the "placed by a menu" marker.
    fn mark_owned(self) -> Self;

    /// Whether the value carries the marker.
    fn is_owned(&self) -> bool;
}
