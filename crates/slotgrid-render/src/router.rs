#![forbid(unsafe_code)]

//! Click routing.
//!
//! Each flatten pass records, per panel, which absolute slots its own items
//! landed on. A click is resolved depth-first: a panel's own index is checked
//! before its children, children in `(row, col)` order. The first match is
//! the only handler that fires.

use std::sync::Arc;

use slotgrid_core::Host;
use slotgrid_core::event::ClickEvent;

use crate::item::{Click, PlacedItem};
use crate::panel::{Panel, PanelNode};

impl<H: Host> Panel<H> {
    /// Deliver a click on an absolute slot to the item rendered there.
    ///
    /// Returns `false` when no item of this subtree claims the slot. The
    /// item's callback runs with no panel lock held.
    pub fn dispatch_click(&self, viewer: &H::Viewer, event: &mut ClickEvent) -> bool {
        let Some(item) = resolve(self.node(), event.slot) else {
            slotgrid_core::trace!(slot = event.slot, "click on unclaimed slot");
            return false;
        };
        let Some(panel) = item.parent() else {
            return false;
        };
        let mut click = Click::new(event, viewer, panel);
        item.click(&mut click);
        true
    }

    /// Absolute slots this panel's own items occupied in the last flatten.
    pub fn routed_slots(&self) -> Vec<usize> {
        let mut slots: Vec<usize> = self
            .node()
            .lock_state()
            .click_handlers
            .keys()
            .copied()
            .collect();
        slots.sort_unstable();
        slots
    }
}

fn resolve<H: Host>(node: &Arc<PanelNode<H>>, slot: usize) -> Option<PlacedItem<H>> {
    let children: Vec<Panel<H>> = {
        let state = node.lock_state();
        if let Some(item) = state.click_handlers.get(&slot) {
            return Some(item.clone());
        }
        state.children.values().cloned().collect()
    };
    children
        .iter()
        .find_map(|child| resolve(child.node(), slot))
}
