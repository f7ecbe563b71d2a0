#![forbid(unsafe_code)]

//! Upward links from a panel tree to its container and owning menu.

use std::fmt;
use std::sync::{Arc, Weak};

use slotgrid_core::{Host, Rejection};

use crate::panel::Panel;
use crate::pipeline::RenderOutcome;

/// Operations a panel may request from the menu that owns its tree.
///
/// Implemented by the runtime's menu. Panels only ever hold a `Weak` to it.
pub trait MenuLink<H: Host>: Send + Sync {
    /// Abort the current render and close the menu for `viewer` with a reason.
    fn reject(&self, viewer: &H::Viewer, rejection: Rejection);

    /// Re-render the whole tree from the root.
    fn update_menu(&self, viewer: &H::Viewer) -> RenderOutcome;

    /// Change the title, recreating the container when it differs.
    fn set_title(&self, title: &str);

    /// Close the menu's view for `viewer`, optionally with a message.
    fn close(&self, viewer: &H::Viewer, message: Option<&str>);
}

/// The container and menu a panel renders into.
///
/// Shared by every node of one tree and re-propagated whenever the menu
/// recreates its container.
pub struct Binding<H: Host> {
    /// The single host container of the tree.
    pub container: Arc<H::Container>,
    /// Back-reference to the owning menu.
    pub menu: Weak<dyn MenuLink<H>>,
}

impl<H: Host> Binding<H> {
    /// Bind to a container with a menu back-reference.
    pub fn new(container: Arc<H::Container>, menu: Weak<dyn MenuLink<H>>) -> Self {
        Self { container, menu }
    }

    /// Upgrade the menu back-reference.
    #[inline]
    pub fn menu(&self) -> Option<Arc<dyn MenuLink<H>>> {
        self.menu.upgrade()
    }
}

impl<H: Host> Clone for Binding<H> {
    fn clone(&self) -> Self {
        Self {
            container: Arc::clone(&self.container),
            menu: Weak::clone(&self.menu),
        }
    }
}

impl<H: Host> fmt::Debug for Binding<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use slotgrid_core::Container;
        f.debug_struct("Binding")
            .field("container", &self.container.id())
            .field("menu_alive", &(self.menu.strong_count() > 0))
            .finish()
    }
}

impl<H: Host> Panel<H> {
    /// Re-render the whole menu this panel belongs to.
    pub fn update_menu(&self, viewer: &H::Viewer) -> RenderOutcome {
        match self.binding().and_then(|binding| binding.menu()) {
            Some(menu) => menu.update_menu(viewer),
            None => RenderOutcome::Detached,
        }
    }

    /// Change the owning menu's title. No-op when detached.
    pub fn set_title(&self, title: &str) {
        if let Some(menu) = self.binding().and_then(|binding| binding.menu()) {
            menu.set_title(title);
        }
    }

    /// Close the owning menu's view for `viewer`.
    pub fn close(&self, viewer: &H::Viewer) {
        if let Some(menu) = self.binding().and_then(|binding| binding.menu()) {
            menu.close(viewer, None);
        }
    }

    /// Close the owning menu's view for `viewer` and tell them why.
    pub fn close_with(&self, viewer: &H::Viewer, message: &str) {
        if let Some(menu) = self.binding().and_then(|binding| binding.menu()) {
            menu.close(viewer, Some(message));
        }
    }
}
