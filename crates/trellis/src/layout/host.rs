//! What a layout needs from the widgets it arranges.
//!
//! [`BoxLayout`](super::BoxLayout) does not own widgets; it reaches them
//! through a [`LayoutHost`]. The widget tree implements it for real widgets,
//! and tests implement it over a plain map.

use crate::geometry::{Rect, Size, SizePolicyPair};
use crate::widget::WidgetId;

/// Widget queries and geometry updates used while laying out.
///
/// Implementations treat unknown ids as hidden, zero-sized widgets and
/// ignore updates to them.
pub trait LayoutHost {
    /// The widget's own preferred size.
    fn widget_size_hint(&self, id: WidgetId) -> Size;

    /// The widget's current parent-relative rect.
    fn widget_rect(&self, id: WidgetId) -> Rect;

    fn widget_visible(&self, id: WidgetId) -> bool;

    fn widget_size_policy(&self, id: WidgetId) -> SizePolicyPair;

    /// Move and resize a managed widget.
    fn set_widget_rect(&mut self, id: WidgetId, rect: Rect);

    /// Make the owner of a layout at least `minimum` large, then resize it
    /// to `size`.
    fn grow_widget(&mut self, id: WidgetId, minimum: Size, size: Size);
}
