#![forbid(unsafe_code)]

//! Render kernel: panel trees, flattening, slot diffs, and click routing.
//!
//! A menu's content is a tree of [`Panel`]s. A render pass over any panel
//! populates its subtree, flattens it into absolute slots, diffs the result
//! against the bound container, and writes only what changed.

pub mod diff;
pub mod frame;
pub mod item;
pub mod link;
pub mod panel;
pub mod pipeline;
pub mod router;

pub use diff::{SlotChange, SlotDiff};
pub use frame::FlatFrame;
pub use item::{Button, Click, Icon, Item};
pub use link::{Binding, MenuLink};
pub use panel::{Panel, PanelBehavior, PanelId, Slots, from_fn};
pub use pipeline::RenderOutcome;
