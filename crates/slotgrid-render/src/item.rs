#![forbid(unsafe_code)]

//! Slot items and the click context handed to their callbacks.

use std::fmt;
use std::sync::{Arc, Weak};

use slotgrid_core::event::ClickEvent;
use slotgrid_core::Host;

use crate::panel::{Panel, PanelNode};
use crate::pipeline::RenderOutcome;

/// Something that occupies a slot: produces content and reacts to clicks.
pub trait Item<H: Host>: Send + Sync + 'static {
    /// Content to show, computed at flatten time.
    fn content(&self) -> H::Content;

    /// React to a click on this item's slot. The default does nothing.
    fn on_click(&self, _click: &mut Click<'_, H>) {}
}

/// A static icon with no click behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct Icon<C> {
    content: C,
}

impl<C> Icon<C> {
    /// Wrap content as an icon.
    pub fn new(content: C) -> Self {
        Self { content }
    }
}

impl<H: Host> Item<H> for Icon<H::Content> {
    fn content(&self) -> H::Content {
        self.content.clone()
    }
}

type ClickFn<H> = dyn Fn(&mut Click<'_, H>) + Send + Sync;

/// An icon with a click callback.
pub struct Button<H: Host> {
    content: H::Content,
    on_click: Box<ClickFn<H>>,
}

impl<H: Host> Button<H> {
    /// Create a button.
    pub fn new<F>(content: H::Content, on_click: F) -> Self
    where
        F: Fn(&mut Click<'_, H>) + Send + Sync + 'static,
    {
        Self {
            content,
            on_click: Box::new(on_click),
        }
    }
}

impl<H: Host> Item<H> for Button<H> {
    fn content(&self) -> H::Content {
        self.content.clone()
    }

    fn on_click(&self, click: &mut Click<'_, H>) {
        (self.on_click)(click);
    }
}

impl<H: Host> fmt::Debug for Button<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

/// An item stored in a panel, with a back-link to that panel.
pub(crate) struct PlacedItem<H: Host> {
    item: Arc<dyn Item<H>>,
    parent: Weak<PanelNode<H>>,
}

impl<H: Host> PlacedItem<H> {
    pub(crate) fn new(item: Arc<dyn Item<H>>, parent: Weak<PanelNode<H>>) -> Self {
        Self { item, parent }
    }

    #[inline]
    pub(crate) fn content(&self) -> H::Content {
        self.item.content()
    }

    /// The panel this item was placed in, if it is still alive.
    pub(crate) fn parent(&self) -> Option<Panel<H>> {
        self.parent.upgrade().map(Panel::from_node)
    }

    pub(crate) fn click(&self, click: &mut Click<'_, H>) {
        self.item.on_click(click);
    }
}

impl<H: Host> Clone for PlacedItem<H> {
    fn clone(&self) -> Self {
        Self {
            item: Arc::clone(&self.item),
            parent: Weak::clone(&self.parent),
        }
    }
}

/// Context passed to a click callback.
///
/// No panel lock is held while a callback runs, so callbacks may freely
/// re-render, reassign slots, or close the menu.
pub struct Click<'a, H: Host> {
    event: &'a mut ClickEvent,
    viewer: &'a H::Viewer,
    panel: Panel<H>,
}

impl<'a, H: Host> Click<'a, H> {
    pub(crate) fn new(event: &'a mut ClickEvent, viewer: &'a H::Viewer, panel: Panel<H>) -> Self {
        Self {
            event,
            viewer,
            panel,
        }
    }

    /// The host event.
    #[inline]
    pub fn event(&self) -> &ClickEvent {
        &*self.event
    }

    /// Mutable access to the host event.
    #[inline]
    pub fn event_mut(&mut self) -> &mut ClickEvent {
        &mut *self.event
    }

    /// Who clicked.
    #[inline]
    pub fn viewer(&self) -> &H::Viewer {
        self.viewer
    }

    /// Absolute container slot that was clicked.
    #[inline]
    pub fn slot(&self) -> usize {
        self.event.slot
    }

    /// The panel owning the clicked item.
    #[inline]
    pub fn panel(&self) -> &Panel<H> {
        &self.panel
    }

    /// Re-render the owning panel's subtree.
    pub fn update(&self) -> RenderOutcome {
        self.panel.update(self.viewer)
    }

    /// Re-render the whole menu.
    pub fn update_menu(&self) -> RenderOutcome {
        self.panel.update_menu(self.viewer)
    }

    /// Close the menu for the clicking viewer.
    pub fn close(&self) {
        self.panel.close(self.viewer);
    }

    /// Close the menu for the clicking viewer and tell them why.
    pub fn close_with(&self, message: &str) {
        self.panel.close_with(self.viewer, message);
    }
}
