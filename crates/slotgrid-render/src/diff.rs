#![forbid(unsafe_code)]

//! Diff computation between a container and a flattened frame.
//!
//! `SlotDiff` computes the minimal set of slot writes that bring a container
//! in line with a [`FlatFrame`], restricted to the region a render pass owns.
//!
//! # Algorithm
//!
//! Row-major scan over the region, clamped to the grid:
//! 1. Skip slots beyond `container.size()`
//! 2. Take the desired content, tagged with `mark_owned` when non-empty
//! 3. Compare with the container's current content
//! 4. Record the slot if different
//!
//! Tagging happens before the comparison. Content already written by an
//! earlier pass carries the tag, so rendering an unchanged tree twice yields
//! an empty second diff.
//!
//! # Usage
//!
//! ```ignore
//! let diff = SlotDiff::compute(&*container, &frame, SlotRect::grid());
//! diff.apply(&*container);
//! ```

use smallvec::SmallVec;

use slotgrid_core::{Container, SlotContent, SlotRect};

/// One pending slot write.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotChange<C> {
    /// Absolute container slot.
    pub slot: usize,
    /// Content to write, already tagged.
    pub content: C,
}

/// The set of writes between a container and a frame.
#[derive(Debug, Clone)]
pub struct SlotDiff<C> {
    changes: SmallVec<[SlotChange<C>; 8]>,
}

impl<C: SlotContent> Default for SlotDiff<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: SlotContent> SlotDiff<C> {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self {
            changes: SmallVec::new(),
        }
    }

    /// Compute the writes needed inside `region`.
    pub fn compute<K>(container: &K, frame: &crate::frame::FlatFrame<C>, region: SlotRect) -> Self
    where
        K: Container<Content = C>,
    {
        let _span = slotgrid_core::debug_span!(
            "slot_diff",
            x = region.x,
            y = region.y,
            width = region.width,
            height = region.height
        );
        let _guard = _span.enter();

        let size = container.size();
        let mut changes = SmallVec::new();
        for slot in region.slots() {
            if slot >= size {
                continue;
            }
            let mut desired = frame.content(slot);
            if !desired.is_empty() {
                desired = desired.mark_owned();
            }
            if container.get(slot) != desired {
                changes.push(SlotChange {
                    slot,
                    content: desired,
                });
            }
        }

        slotgrid_core::trace!(changes = changes.len(), "slot diff computed");
        Self { changes }
    }

    /// Write every change into the container.
    pub fn apply<K>(&self, container: &K)
    where
        K: Container<Content = C>,
    {
        for change in &self.changes {
            container.set(change.slot, change.content.clone());
        }
    }

    /// Number of pending writes.
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether nothing needs writing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Pending writes in slot order.
    #[inline]
    pub fn changes(&self) -> &[SlotChange<C>] {
        &self.changes
    }

    /// Changed slot indices in order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.changes.iter().map(|change| change.slot)
    }

    /// Drop all pending writes, keeping the allocation.
    pub fn clear(&mut self) {
        self.changes.clear();
    }
}
