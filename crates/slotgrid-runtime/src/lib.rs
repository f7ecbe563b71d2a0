#![forbid(unsafe_code)]

//! Menu runtime: lifecycle, configuration, and host event handling.
//!
//! A [`Menu`] binds a root [`Panel`](slotgrid_render::Panel) to one host
//! container. It is the only component that talks to the host's event bus
//! and scheduler.
//!
//! # Example
//!
//! ```ignore
//! let menu = Menu::new(host.clone(), MenuConfig::chest(1).with_title("Pick"), |slots, _| {
//!     slots.set_border(Stack::new("pane"));
//!     Ok(())
//! })?;
//! let opening = menu.open(&viewer)?;
//! ```

pub mod config;
pub mod error;
mod listener;
pub mod menu;
pub mod rendezvous;

pub use config::MenuConfig;
pub use error::MenuError;
pub use menu::{Lifecycle, Menu, MenuBuilder};
pub use rendezvous::{OpenOutcome, Opening};
