#![forbid(unsafe_code)]

//! Host collaborator traits.
//!
//! The engine never owns the host's container primitive or event bus. It
//! talks to them through the traits in this module:
//!
//! - [`Container`]: an addressable grid of up to 54 slots
//! - [`Viewer`]: someone looking at a container, with a personal inventory
//! - [`Listener`]: the engine-side sink for host events
//! - [`Host`]: container factory, view management, and event registration

use std::fmt;
use std::sync::Arc;

use crate::content::SlotContent;
use crate::event::{ClickEvent, CloseEvent, DragEvent};
use crate::geometry::{GRID_COLUMNS, GRID_ROWS, MAX_SLOTS};
use crate::scheduler::Scheduler;

/// Stable identity of a host container instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId(u64);

impl ContainerId {
    /// Create an ID from a raw value.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Stable identity of a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewerId(u64);

impl ViewerId {
    /// Create an ID from a raw value.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Handle returned by [`Host::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Create an ID from a raw value.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// The shape of container a menu is built on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A generic chest with `rows` full rows of 9 slots (1..=6).
    Chest { rows: u16 },
    /// A host-specific container type with a fixed slot count.
    Typed { name: String, slots: u16 },
}

impl ContainerKind {
    /// Number of slots the host allocates.
    pub fn slot_count(&self) -> usize {
        match self {
            Self::Chest { rows } => *rows as usize * GRID_COLUMNS as usize,
            Self::Typed { slots, .. } => (*slots as usize).min(MAX_SLOTS),
        }
    }

    /// Grid rows needed to address every slot, at least one.
    pub fn rows(&self) -> u16 {
        match self {
            Self::Chest { rows } => *rows,
            Self::Typed { .. } => {
                let rows = self.slot_count().div_ceil(GRID_COLUMNS as usize) as u16;
                rows.clamp(1, GRID_ROWS)
            }
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chest { rows } => write!(f, "chest({rows} rows)"),
            Self::Typed { name, slots } => write!(f, "{name}({slots} slots)"),
        }
    }
}

/// A host container instance.
///
/// Uses interior mutability: one `Arc<Container>` is shared by every panel
/// of a menu tree.
pub trait Container: Send + Sync + 'static {
    /// Slot content type.
    type Content: SlotContent;
    /// Viewer type.
    type Viewer: Viewer<Content = Self::Content>;

    /// Identity of this instance.
    fn id(&self) -> ContainerId;

    /// Number of addressable slots.
    fn size(&self) -> usize;

    /// Content at `slot`, or the empty sentinel.
    fn get(&self, slot: usize) -> Self::Content;

    /// Replace the content at `slot`.
    fn set(&self, slot: usize, content: Self::Content);

    /// Everyone currently looking at this container.
    fn viewers(&self) -> Vec<Self::Viewer>;
}

/// Someone who can look at a container.
pub trait Viewer: Clone + Send + Sync + 'static {
    /// Slot content type of the personal inventory.
    type Content: SlotContent;

    /// Identity.
    fn id(&self) -> ViewerId;

    /// Whether the viewer is still connected.
    fn is_online(&self) -> bool;

    /// Deliver a user-facing message.
    fn send_message(&self, message: &str);

    /// Size of the personal inventory.
    fn inventory_size(&self) -> usize;

    /// Content of a personal inventory slot.
    fn inventory_item(&self, slot: usize) -> Self::Content;

    /// Empty a personal inventory slot.
    fn clear_inventory_item(&self, slot: usize);
}

/// Engine-side sink for host events.
///
/// Registered through [`Host::register`]. Implementations flip the
/// cancellation flags on the events they consume.
pub trait Listener<H: Host>: Send + Sync {
    /// A click in any view.
    fn on_click(&self, viewer: &H::Viewer, event: &mut ClickEvent);

    /// A drag in any view.
    fn on_drag(&self, viewer: &H::Viewer, event: &mut DragEvent);

    /// A viewer closed a container.
    fn on_close(&self, viewer: &H::Viewer, event: &CloseEvent);
}

/// The host application.
pub trait Host: Scheduler + Sized + Send + Sync + 'static {
    /// Slot content type.
    type Content: SlotContent;
    /// Viewer type.
    type Viewer: Viewer<Content = Self::Content>;
    /// Container type.
    type Container: Container<Content = Self::Content, Viewer = Self::Viewer>;

    /// Allocate a new container.
    fn create_container(&self, kind: &ContainerKind, title: &str) -> Arc<Self::Container>;

    /// Show `container` to `viewer`, replacing whatever they were looking at.
    fn show(&self, viewer: &Self::Viewer, container: &Arc<Self::Container>);

    /// Close whatever `viewer` is looking at.
    fn close_view(&self, viewer: &Self::Viewer);

    /// Start delivering events to `listener`.
    fn register(&self, listener: Arc<dyn Listener<Self>>) -> ListenerId;

    /// Stop delivering events to a registered listener.
    fn unregister(&self, id: ListenerId);
}
