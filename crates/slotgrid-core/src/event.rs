#![forbid(unsafe_code)]

//! Canonical host event types.
//!
//! The host event bus translates its native click, drag, and close
//! notifications into these types before handing them to a
//! [`Listener`](crate::host::Listener).
//!
//! # Design Notes
//!
//! - Slot indices are 0-indexed within the clicked inventory
//! - `Modifiers` use bitflags for easy combination
//! - Cancellation is a flag the host reads back after dispatch; a cancelled
//!   event suppresses the host's default container semantics

use bitflags::bitflags;

use crate::host::ContainerId;

bitflags! {
    /// Modifier keys held during a click.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key (quick-move).
        const SHIFT = 0b0001;
        /// Control key (drop whole stack).
        const CTRL  = 0b0010;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Left mouse button.
    #[default]
    Left,

    /// Right mouse button.
    Right,

    /// Middle mouse button.
    Middle,
}

/// The gesture behind a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClickKind {
    /// A plain press.
    #[default]
    Single,

    /// Second press in quick succession.
    Double,

    /// Hotbar number key pressed while hovering a slot.
    NumberKey(u8),

    /// Drop key pressed while hovering a slot.
    Drop,
}

/// Which part of the viewer's view received the click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickArea {
    /// The menu's container (top of the view).
    Top,

    /// The viewer's personal inventory (bottom of the view).
    Bottom,

    /// Outside any inventory.
    Outside,
}

/// A click delivered for a viewer's open view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    /// Container shown at the top of the view.
    pub view: ContainerId,

    /// Clicked area.
    pub area: ClickArea,

    /// Slot index within the clicked area.
    pub slot: usize,

    /// Button used.
    pub button: MouseButton,

    /// Gesture.
    pub kind: ClickKind,

    /// Modifier keys held during the click.
    pub modifiers: Modifiers,

    cancelled: bool,
}

impl ClickEvent {
    /// Create a plain left click.
    #[must_use]
    pub const fn new(view: ContainerId, area: ClickArea, slot: usize) -> Self {
        Self {
            view,
            area,
            slot,
            button: MouseButton::Left,
            kind: ClickKind::Single,
            modifiers: Modifiers::NONE,
            cancelled: false,
        }
    }

    /// Set the button used.
    #[must_use]
    pub const fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Set the gesture.
    #[must_use]
    pub const fn with_kind(mut self, kind: ClickKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the modifier keys.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether this is a shift (quick-move) click.
    #[inline]
    pub const fn is_shift_click(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Suppress the host's default handling.
    #[inline]
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Set or clear the cancellation flag.
    #[inline]
    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    /// Whether the host must skip its default handling.
    #[inline]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// A drag spanning one or more raw view slots.
///
/// Raw slots number the whole view: indices below the top container's size
/// belong to the container, the rest to the viewer's personal inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEvent {
    /// Container shown at the top of the view.
    pub view: ContainerId,

    /// Raw view slots touched by the drag.
    pub raw_slots: Vec<usize>,

    cancelled: bool,
}

impl DragEvent {
    /// Create a drag over the given raw slots.
    pub fn new(view: ContainerId, raw_slots: impl Into<Vec<usize>>) -> Self {
        Self {
            view,
            raw_slots: raw_slots.into(),
            cancelled: false,
        }
    }

    /// Whether any touched raw slot lies inside a top container of `size` slots.
    pub fn touches_top(&self, size: usize) -> bool {
        self.raw_slots.iter().any(|&slot| slot < size)
    }

    /// Suppress the host's default handling.
    #[inline]
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Whether the host must skip its default handling.
    #[inline]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// A viewer stopped looking at a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseEvent {
    /// The container that was closed.
    pub container: ContainerId,
}

impl CloseEvent {
    /// Create a close notification.
    #[must_use]
    pub const fn new(container: ContainerId) -> Self {
        Self { container }
    }
}
