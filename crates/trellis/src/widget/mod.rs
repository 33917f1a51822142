//! Widgets: the arena, the router and the per-widget substrate.
//!
//! A widget is a node in a [`WidgetTree`] plus a [`WidgetHandler`] that
//! gives it behavior. The tree owns all state; handlers receive a
//! [`WidgetCx`] to reach it while an event is delivered.
//!
//! # Routing
//!
//! Events enter through [`WidgetTree::handle`]. Every widget tracks three
//! of its direct children:
//!
//! - the focused child, which receives keyboard input
//! - the hovered child, which receives pointer input
//! - the dragging child (or the widget itself) during a drag gesture
//!
//! On a root these are the window's focus, hover and drag holders.

mod attrs;
mod filter;
mod handler;
mod node;
mod router;
mod timers;
mod tree;


pub use attrs::{FocusPolicy, WidgetAttrs};
pub use filter::{EventFilter, FilterId};
pub use handler::{FixedHint, WidgetCx, WidgetHandler};
pub use timers::Timer;
pub use tree::WidgetTree;

slotmap::new_key_type! {
    /// Generation-checked handle to a widget in a [`WidgetTree`].
    pub struct WidgetId;
}
