#![forbid(unsafe_code)]

//! Host event handling for an open menu.
//!
//! One [`MenuListener`] is registered per open menu. Events for any other
//! container are ignored.
//!
//! | event | area | result |
//! |---|---|---|
//! | click with shift | any | cancelled |
//! | click | top | cancelled, routed to the panel tree |
//! | click | bottom | bottom-click hook if enabled, else cancelled |
//! | drag | any | cancelled, unless bottom interaction is enabled and no dragged slot is in the top area |
//! | close | | `Open → Closed` |

use std::sync::Weak;

use slotgrid_core::event::{ClickArea, ClickEvent, CloseEvent, DragEvent};
use slotgrid_core::{Container, Host, Listener};

use crate::menu::{Lifecycle, MenuShared};

/// Adapter from host events to a menu. Holds the menu weakly.
pub(crate) struct MenuListener<H: Host> {
    menu: Weak<MenuShared<H>>,
}

impl<H: Host> MenuListener<H> {
    pub(crate) fn new(menu: Weak<MenuShared<H>>) -> Self {
        Self { menu }
    }
}

impl<H: Host> Listener<H> for MenuListener<H> {
    fn on_click(&self, viewer: &H::Viewer, event: &mut ClickEvent) {
        let Some(menu) = self.menu.upgrade() else {
            return;
        };
        let view = menu.lock_state().container.id();
        if event.view != view {
            return;
        }
        if event.is_shift_click() {
            event.cancel();
            return;
        }
        match event.area {
            ClickArea::Top => {
                event.cancel();
                if !menu.root.dispatch_click(viewer, event) {
                    tracing::trace!(slot = event.slot, "click without handler");
                }
            }
            ClickArea::Bottom => {
                if !menu.config.bottom_interaction {
                    event.cancel();
                } else if let Some(hook) = &menu.hooks.on_bottom_click {
                    hook(viewer, event);
                }
            }
            ClickArea::Outside => {}
        }
    }

    fn on_drag(&self, _viewer: &H::Viewer, event: &mut DragEvent) {
        let Some(menu) = self.menu.upgrade() else {
            return;
        };
        let (view, size) = {
            let state = menu.lock_state();
            (state.container.id(), state.container.size())
        };
        if event.view != view {
            return;
        }
        if !menu.config.bottom_interaction || event.touches_top(size) {
            event.cancel();
        }
    }

    fn on_close(&self, viewer: &H::Viewer, event: &CloseEvent) {
        let Some(menu) = self.menu.upgrade() else {
            return;
        };
        let tracked = {
            let state = menu.lock_state();
            state.lifecycle == Lifecycle::Open && state.container.id() == event.container
        };
        if tracked {
            menu.handle_close(viewer);
        }
    }
}
