//! Errors from tree-building calls.
//!
//! Only structural misuse is an error. Routing and layout never fail: an
//! event for a stale widget is logged and dropped, an out-of-range layout
//! index yields `None`.

use thiserror::Error;

use crate::widget::WidgetId;

/// Structural misuse of the widget tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// The id names a widget that was destroyed (or never existed here).
    #[error("widget {0:?} does not exist")]
    StaleWidget(WidgetId),

    /// The widget must be detached before it can be added elsewhere.
    #[error("widget {child:?} already has parent {parent:?}")]
    AlreadyParented { child: WidgetId, parent: WidgetId },

    /// Reparenting would make a widget its own ancestor.
    #[error("widget {child:?} cannot be placed under its descendant {parent:?}")]
    WouldCycle { child: WidgetId, parent: WidgetId },

    /// A layout operation targeted a widget that owns no layout.
    #[error("widget {0:?} has no layout")]
    NoLayout(WidgetId),
}

/// Result alias for tree-building calls.
pub type WidgetResult<T> = std::result::Result<T, WidgetError>;

static_assertions::assert_impl_all!(WidgetError: Send, Sync, std::error::Error);
