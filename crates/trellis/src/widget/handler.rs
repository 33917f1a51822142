//! Widget behavior hooks.

use std::any::Any;

use crate::backend::Painter;
use crate::event::Event;
use crate::geometry::{Rect, Size};
use crate::style::Style;
use crate::widget::{WidgetId, WidgetTree};

/// Access to the tree from inside a hook, plus the id of the widget the hook
/// belongs to.
///
/// While a hook runs, its handler is detached from the widget. Events routed
/// back to the same widget from inside the hook still update its state and
/// reach its children, but skip its own hooks.
pub struct WidgetCx<'a> {
    tree: &'a mut WidgetTree,
    id: WidgetId,
}

impl<'a> WidgetCx<'a> {
    pub(crate) fn new(tree: &'a mut WidgetTree, id: WidgetId) -> Self {
        Self { tree, id }
    }

    /// The widget this hook runs for.
    #[inline]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The whole tree.
    #[inline]
    pub fn tree(&mut self) -> &mut WidgetTree {
        self.tree
    }

    /// The widget's parent-relative rect.
    pub fn rect(&self) -> Rect {
        self.tree.rect(self.id).unwrap_or_default()
    }

    /// The widget's size as a local rect at the origin.
    pub fn local_rect(&self) -> Rect {
        Rect::from_size(self.rect().size())
    }

    /// Schedule a repaint of the widget's window.
    pub fn repaint(&mut self) {
        self.tree.repaint(self.id);
    }

    /// Destroy the widget on the next loop turn.
    pub fn defer_delete(&mut self) {
        self.tree.defer_delete(self.id);
    }
}

/// The behavior of one widget.
///
/// Every hook has a no-op default, so a handler implements only what it
/// reacts to. A hook returns `true` when it consumed the event.
///
/// # Example
///
/// ```
/// use trellis::{Event, Size, Style, WidgetCx, WidgetHandler};
///
/// struct Button {
///     clicks: u32,
/// }
///
/// impl WidgetHandler for Button {
///     fn size_hint(&self, style: &Style) -> Size {
///         Size::new(style.button_width, style.button_height)
///     }
///
///     fn mouse_release(&mut self, _cx: &mut WidgetCx<'_>, _event: &mut Event) -> bool {
///         self.clicks += 1;
///         true
///     }
/// }
/// ```
#[allow(unused_variables)]
pub trait WidgetHandler: Any {
    /// Preferred size for layouts. An empty size means "no preference".
    fn size_hint(&self, style: &Style) -> Size {
        Size::ZERO
    }

    /// Draw the widget. The painter is already translated to the widget's
    /// origin; children are painted afterwards.
    fn paint_event(&mut self, cx: &mut WidgetCx<'_>, painter: &mut dyn Painter, event: &mut Event) -> bool {
        false
    }

    fn resize_event(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn move_event(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn key_press(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn key_release(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn text_input(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn mouse_press(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn mouse_release(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn mouse_enter(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn mouse_leave(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn mouse_motion(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn mouse_wheel(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    /// Return `true` to take ownership of the drag gesture.
    fn drag_begin(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn drag_motion(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn drag_end(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn focus_gained(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn focus_lost(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    /// Call [`Event::ignore`] to veto the close.
    fn close_event(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    fn timer_event(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }

    /// Child list, child geometry, palette, style, font or DPI changed.
    fn change_event(&mut self, cx: &mut WidgetCx<'_>, event: &mut Event) -> bool {
        false
    }
}

/// A handler with no behavior, for plain containers.
impl WidgetHandler for () {}

/// A handler that only reports a fixed size hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHint(pub Size);

impl WidgetHandler for FixedHint {
    fn size_hint(&self, _style: &Style) -> Size {
        self.0
    }
}
