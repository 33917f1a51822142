//! Arena node for one widget.

use std::sync::Arc;

use trellis_core::TimerId;

use crate::backend::NativeWindow;
use crate::geometry::{Point, Rect, Size, SizePolicyPair};
use crate::layout::BoxLayout;
use crate::style::{Font, Palette, Style};
use crate::widget::attrs::{FocusPolicy, WidgetAttrs};
use crate::widget::filter::FilterChain;
use crate::widget::handler::WidgetHandler;
use crate::widget::WidgetId;

/// Pointer and keyboard routing state of one widget.
///
/// The three slots name direct children of this widget. On a root they are
/// the window's focus, hover and drag holders; on an inner widget they route
/// further down its own subtree.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct InputState {
    /// A button is held over this widget.
    pub(crate) pressed: bool,
    /// The pointer is inside this widget.
    pub(crate) entered: bool,
    /// This widget holds focus in its parent.
    pub(crate) focused: bool,
    /// The drag gesture of the current press was refused.
    pub(crate) drag_reject: bool,

    pub(crate) focused_widget: Option<WidgetId>,
    pub(crate) hover_widget: Option<WidgetId>,
    pub(crate) dragging_widget: Option<WidgetId>,

    /// Last pointer position seen in this widget's coordinates.
    pub(crate) pointer: Option<Point>,
}

impl InputState {
    /// Forget `child` in every slot.
    pub(crate) fn forget(&mut self, child: WidgetId) {
        if self.focused_widget == Some(child) {
            self.focused_widget = None;
        }
        if self.hover_widget == Some(child) {
            self.hover_widget = None;
        }
        if self.dragging_widget == Some(child) {
            self.dragging_widget = None;
        }
    }
}

pub(crate) struct WidgetNode {
    pub(crate) parent: Option<WidgetId>,
    /// Front is topmost for hit testing; painting walks back to front.
    pub(crate) children: Vec<WidgetId>,
    pub(crate) rect: Rect,
    pub(crate) visible: bool,
    pub(crate) minimum_size: Size,
    pub(crate) maximum_size: Size,
    pub(crate) focus_policy: FocusPolicy,
    pub(crate) size_policy: SizePolicyPair,
    pub(crate) attrs: WidgetAttrs,
    pub(crate) input: InputState,
    pub(crate) filters: FilterChain,
    pub(crate) timers: Vec<TimerId>,
    /// Taken out while one of its hooks runs.
    pub(crate) handler: Option<Box<dyn WidgetHandler>>,
    /// Taken out while a pass runs.
    pub(crate) layout: Option<Box<BoxLayout>>,
    pub(crate) window: Option<NativeWindow>,
    pub(crate) style: Arc<Style>,
    pub(crate) palette: Arc<Palette>,
    pub(crate) font: Font,
}

impl WidgetNode {
    pub(crate) fn new(
        parent: Option<WidgetId>,
        handler: Box<dyn WidgetHandler>,
        style: Arc<Style>,
        palette: Arc<Palette>,
        font: Font,
    ) -> Self {
        Self {
            parent,
            children: Vec::new(),
            rect: Rect::ZERO,
            // A root has no native window until it is first shown.
            visible: true,
            minimum_size: Size::ZERO,
            maximum_size: Size::MAX,
            focus_policy: FocusPolicy::NONE,
            size_policy: SizePolicyPair::default(),
            attrs: WidgetAttrs::default(),
            input: InputState::default(),
            filters: FilterChain::default(),
            timers: Vec::new(),
            handler: Some(handler),
            layout: None,
            window: None,
            style,
            palette,
            font,
        }
    }

    #[inline]
    pub(crate) fn is_window(&self) -> bool {
        self.parent.is_none() || self.window.is_some()
    }
}
