//! Box layout engine.
//!
//! - [`BoxLayout`]: packs items along one axis in any of four directions
//! - [`LayoutItem`]: a widget, a spacer or a nested layout
//! - [`LayoutHost`]: the widget queries a layout needs
//!
//! A layout is attached to a widget with [`WidgetTree::attach_layout`]. The
//! owning widget then drives it: resizes and layout requests mark it dirty,
//! and the next `Show`, `Paint` or resize runs a pass.
//!
//! [`WidgetTree::attach_layout`]: crate::WidgetTree::attach_layout

mod box_layout;
mod host;
mod item;

pub use box_layout::{BoxLayout, Direction, HBoxLayout, VBoxLayout};
pub use host::LayoutHost;
pub use item::{Alignment, ItemExtra, LayoutItem, SpacerItem, WidgetItem};
