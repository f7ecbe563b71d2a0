#![forbid(unsafe_code)]

//! Flattened frames: the desired content of every absolute slot.
//!
//! A [`FlatFrame`] is what a render pass produces before diffing. Slots that
//! no item claims stay `None` and diff as the empty sentinel.

use slotgrid_core::{MAX_SLOTS, SlotContent};

/// Desired content per absolute slot, `MAX_SLOTS` wide.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatFrame<C> {
    slots: Vec<Option<C>>,
}

impl<C: SlotContent> Default for FlatFrame<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: SlotContent> FlatFrame<C> {
    /// Create a frame with every slot unclaimed.
    pub fn new() -> Self {
        Self {
            slots: vec![None; MAX_SLOTS],
        }
    }

    /// Claim `slot`. Later writes win, so a child overrides its parent.
    ///
    /// Slots outside the grid are ignored.
    #[inline]
    pub fn set(&mut self, slot: usize, content: C) {
        if let Some(cell) = self.slots.get_mut(slot) {
            *cell = Some(content);
        }
    }

    /// Claimed content at `slot`.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&C> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Desired content at `slot`, the empty sentinel when unclaimed.
    pub fn content(&self, slot: usize) -> C {
        self.get(slot).cloned().unwrap_or_else(C::empty)
    }

    /// Number of claimed slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|cell| cell.is_some()).count()
    }

    /// Whether no slot is claimed.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Claimed slots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &C)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, cell)| cell.as_ref().map(|content| (slot, content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotgrid_harness::Stack;

    #[test]
    fn new_frame_is_unclaimed() {
        let frame = FlatFrame::<Stack>::new();
        assert!(frame.is_empty());
        assert_eq!(frame.len(), 0);
        assert_eq!(frame.content(0), Stack::empty());
    }

    #[test]
    fn later_writes_win() {
        let mut frame = FlatFrame::new();
        frame.set(4, Stack::new("parent"));
        frame.set(4, Stack::new("child"));
        assert_eq!(frame.get(4), Some(&Stack::new("child")));
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn out_of_grid_writes_are_ignored() {
        let mut frame = FlatFrame::new();
        frame.set(MAX_SLOTS, Stack::new("lost"));
        assert!(frame.is_empty());
        assert_eq!(frame.get(MAX_SLOTS), None);
    }

    #[test]
    fn iter_is_ascending() {
        let mut frame = FlatFrame::new();
        frame.set(30, Stack::new("b"));
        frame.set(2, Stack::new("a"));
        let slots: Vec<usize> = frame.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![2, 30]);
    }
}
