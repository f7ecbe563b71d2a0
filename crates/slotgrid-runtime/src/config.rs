#![forbid(unsafe_code)]

//! Menu configuration.

use slotgrid_core::ContainerKind;

/// Configuration for a [`Menu`](crate::Menu).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuConfig {
    /// Container shape the menu is built on.
    pub kind: ContainerKind,
    /// Initial title.
    pub title: String,
    /// Route clicks in the viewer's own inventory to the bottom-click hook
    /// instead of cancelling them.
    pub bottom_interaction: bool,
    /// Remove menu-owned items from the viewer's inventory on close.
    pub sweep_on_close: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            kind: ContainerKind::Chest { rows: 3 },
            title: String::new(),
            bottom_interaction: false,
            sweep_on_close: true,
        }
    }
}

impl MenuConfig {
    /// Create config for a chest of `rows` full rows.
    pub fn chest(rows: u16) -> Self {
        Self {
            kind: ContainerKind::Chest { rows },
            ..Default::default()
        }
    }

    /// Create config for a host-specific container type.
    pub fn typed(name: impl Into<String>, slots: u16) -> Self {
        Self {
            kind: ContainerKind::Typed {
                name: name.into(),
                slots,
            },
            ..Default::default()
        }
    }

    /// Set the initial title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the container kind.
    #[must_use]
    pub fn with_kind(mut self, kind: ContainerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Enable or disable bottom-inventory interaction.
    #[must_use]
    pub fn with_bottom_interaction(mut self, enabled: bool) -> Self {
        self.bottom_interaction = enabled;
        self
    }

    /// Enable or disable the owned-item sweep on close.
    #[must_use]
    pub fn with_sweep_on_close(mut self, enabled: bool) -> Self {
        self.sweep_on_close = enabled;
        self
    }
}
