//! Event routing through the widget tree.
//!
//! [`WidgetTree::handle`] is the single entry point. An event addressed to a
//! widget first updates a window's geometry, then passes the widget's layout
//! hook and its filters, and is finally routed by type:
//!
//! - pointer events go to the child under the pointer (the hover slot),
//!   translated into its coordinates
//! - keyboard events go to the focused child, else the hovered one
//! - drag events go to the child that owns the gesture (the drag slot)
//!
//! Whatever no child consumes falls back to the widget's own hook. Each
//! widget keeps the three slots for its direct children, so routing descends
//! one level per widget.

use trellis_core::logging::{span_names, targets};
use trellis_core::PerfSpan;

use crate::backend::Painter;
use crate::event::{DragPhase, Event, EventKind, EventType};
use crate::geometry::{Point, Rect};
use crate::style::Brush;
use crate::widget::attrs::{FocusPolicy, WidgetAttrs};
use crate::widget::handler::{WidgetCx, WidgetHandler};
use crate::widget::node::InputState;
use crate::widget::{WidgetId, WidgetTree};

impl WidgetTree {
    /// Deliver `event` to widget `id`.
    ///
    /// Returns `true` if the event was consumed. An id naming a destroyed
    /// widget is logged and the event is dropped.
    pub fn handle(&mut self, id: WidgetId, event: &mut Event) -> bool {
        self.event_loop.affinity().debug_assert_same_thread();

        if !self.contains(id) {
            tracing::debug!(
                target: targets::ROUTER,
                ?id,
                event = ?event.type_(),
                "event for stale widget dropped"
            );
            return false;
        }
        tracing::trace!(target: targets::ROUTER, ?id, event = ?event.type_(), "handle");

        self.apply_window_geometry(id, event);
        self.run_layout_hook(id, event);
        if self.run_filters(id, event) {
            tracing::trace!(target: targets::ROUTER, ?id, "event filtered");
            return true;
        }
        self.route(id, event)
    }

    /// A window takes its geometry from the backend's `Resized` and `Moved`
    /// events. This happens before the layout sees the event, so a layout
    /// that grows its window is not undone by the event that triggered it.
    fn apply_window_geometry(&mut self, id: WidgetId, event: &Event) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.is_window() {
            return;
        }
        match event.kind() {
            EventKind::Resized(resize) => {
                node.rect.w = resize.new_size.w;
                node.rect.h = resize.new_size.h;
                if let Some(painter) = node.window.as_mut().and_then(|w| w.painter.as_mut()) {
                    painter.notify_resize(resize.new_size.w, resize.new_size.h);
                }
            }
            EventKind::Moved(moved) => {
                node.rect.x = moved.x;
                node.rect.y = moved.y;
            }
            _ => {}
        }
    }

    fn run_layout_hook(&mut self, id: WidgetId, event: &Event) {
        // A layout that is already running is detached, which also keeps the
        // resizes it makes from re-entering it.
        let Some(mut layout) = self.nodes.get_mut(id).and_then(|n| n.layout.take()) else {
            return;
        };
        layout.run_hook(self, event);
        self.restore_layout(id, layout);
    }

    fn run_filters(&mut self, id: WidgetId, event: &mut Event) -> bool {
        let mut filters = match self.nodes.get_mut(id) {
            Some(node) if !node.filters.is_empty() => node.filters.detach(),
            _ => return false,
        };

        let mut consumed = false;
        {
            let mut cx = WidgetCx::new(self, id);
            for (_, filter) in filters.iter_mut().rev() {
                if filter(&mut cx, event) {
                    consumed = true;
                    break;
                }
            }
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.filters.reattach(filters);
        }
        consumed
    }

    /// Run one of the widget's own hooks with its handler detached.
    fn call_hook<F>(&mut self, id: WidgetId, hook: F) -> bool
    where
        F: FnOnce(&mut dyn WidgetHandler, &mut WidgetCx<'_>) -> bool,
    {
        let Some(mut handler) = self.nodes.get_mut(id).and_then(|n| n.handler.take()) else {
            tracing::trace!(target: targets::ROUTER, ?id, "handler busy, hook skipped");
            return false;
        };
        let consumed = {
            let mut cx = WidgetCx::new(self, id);
            hook(handler.as_mut(), &mut cx)
        };
        if let Some(node) = self.nodes.get_mut(id) {
            node.handler = Some(handler);
        }
        consumed
    }

    /// Forward a parent-space event to `child` in child coordinates. The
    /// accepted flag is copied back.
    pub(crate) fn forward(&mut self, child: WidgetId, event: &mut Event) -> bool {
        let Some(origin) = self.rect(child).map(|r| r.origin()) else {
            return false;
        };
        let mut local = event.translated(-origin.x, -origin.y);
        let consumed = self.handle(child, &mut local);
        event.set_accepted(local.is_accepted());
        consumed
    }

    /// [`forward`](Self::forward) for an event built on the spot.
    pub(crate) fn send_to_child(&mut self, child: WidgetId, mut event: Event) -> bool {
        self.forward(child, &mut event)
    }

    fn input(&self, id: WidgetId) -> InputState {
        self.nodes.get(id).map(|n| n.input).unwrap_or_default()
    }

    fn input_mut(&mut self, id: WidgetId) -> Option<&mut InputState> {
        self.nodes.get_mut(id).map(|n| &mut n.input)
    }

    fn route(&mut self, id: WidgetId, event: &mut Event) -> bool {
        match event.type_() {
            EventType::Paint => self.route_paint(id, event),
            EventType::Show | EventType::Hide => {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.visible = event.type_() == EventType::Show;
                }
                false
            }
            EventType::Resized => self.call_hook(id, |h, cx| h.resize_event(cx, event)),
            EventType::Moved => self.call_hook(id, |h, cx| h.move_event(cx, event)),
            EventType::KeyPress | EventType::KeyRelease => self.route_key(id, event),
            EventType::TextInput => {
                let input = self.input(id);
                if let Some(focused) = input.focused_widget {
                    if self.handle(focused, event) {
                        return true;
                    }
                }
                if let Some(hover) = input.hover_widget {
                    if self.handle(hover, event) {
                        return true;
                    }
                }
                self.call_hook(id, |h, cx| h.text_input(cx, event))
            }
            EventType::MousePress => self.route_mouse_press(id, event),
            EventType::MouseRelease => self.route_mouse_release(id, event),
            EventType::MouseEnter => {
                let pos = event.position();
                if let Some(input) = self.input_mut(id) {
                    input.entered = true;
                    input.pointer = pos;
                }
                if let Some(hover) = self.input(id).hover_widget {
                    self.forward(hover, event);
                }
                self.call_hook(id, |h, cx| h.mouse_enter(cx, event))
            }
            EventType::MouseLeave => {
                let hover = self.input(id).hover_widget;
                if let Some(input) = self.input_mut(id) {
                    input.entered = false;
                    input.pointer = None;
                    input.hover_widget = None;
                }
                if let Some(hover) = hover {
                    self.forward(hover, event);
                }
                self.call_hook(id, |h, cx| h.mouse_leave(cx, event))
            }
            EventType::MouseMotion => self.route_mouse_motion(id, event),
            EventType::MouseWheel => {
                if let Some(hover) = self.input(id).hover_widget {
                    if self.forward(hover, event) {
                        return true;
                    }
                }
                self.call_hook(id, |h, cx| h.mouse_wheel(cx, event))
            }
            EventType::DragBegin => self.route_drag_begin(id, event),
            EventType::DragMotion => {
                let dragging = self.input(id).dragging_widget;
                if let Some(target) = dragging.filter(|&d| d != id) {
                    if self.forward(target, event) {
                        return true;
                    }
                }
                self.call_hook(id, |h, cx| h.drag_motion(cx, event))
            }
            EventType::DragEnd => {
                let dragging = self.input(id).dragging_widget;
                if let Some(target) = dragging.filter(|&d| d != id) {
                    let consumed = self.forward(target, event);
                    if let Some(input) = self.input_mut(id) {
                        input.dragging_widget = None;
                    }
                    if consumed {
                        return true;
                    }
                }
                self.call_hook(id, |h, cx| h.drag_end(cx, event))
            }
            EventType::FocusGained => {
                if let Some(input) = self.input_mut(id) {
                    input.focused = true;
                }
                self.call_hook(id, |h, cx| h.focus_gained(cx, event))
            }
            EventType::FocusLost => {
                let mut consumed = false;
                if let Some(focused) = self.input(id).focused_widget {
                    consumed = self.handle(focused, event);
                    if let Some(input) = self.input_mut(id) {
                        input.focused_widget = None;
                    }
                }
                if let Some(input) = self.input_mut(id) {
                    input.focused = false;
                }
                self.call_hook(id, |h, cx| h.focus_lost(cx, event)) || consumed
            }
            EventType::Close => {
                let consumed = self.call_hook(id, |h, cx| h.close_event(cx, event));
                if event.is_accepted() && self.attrs(id).has(WidgetAttrs::DELETE_ON_CLOSE) {
                    tracing::debug!(target: targets::TREE, ?id, "delete on close scheduled");
                    self.defer_delete(id);
                }
                consumed
            }
            EventType::Timer => self.call_hook(id, |h, cx| h.timer_event(cx, event)),
            EventType::DpiChanged => {
                if let (Some(dpi), Some(native)) = (event.dpi().copied(), self.native_window(id)) {
                    if let Some(painter) = native.painter.as_mut() {
                        painter.notify_dpi_changed(dpi.x, dpi.y);
                    }
                }
                self.route_change(id, event)
            }
            EventType::ChildAdded
            | EventType::ChildRemoved
            | EventType::ChildRectangleChanged
            | EventType::PaletteChanged
            | EventType::StyleChanged
            | EventType::FontChanged => self.route_change(id, event),
            EventType::LayoutRequest => false,
        }
    }

    fn route_change(&mut self, id: WidgetId, event: &mut Event) -> bool {
        self.repaint(id);
        self.call_hook(id, |h, cx| h.change_event(cx, event))
    }

    fn route_key(&mut self, id: WidgetId, event: &mut Event) -> bool {
        let input = self.input(id);
        if let Some(target) = input.focused_widget.or(input.hover_widget) {
            if self.handle(target, event) {
                return true;
            }
        }
        if event.type_() == EventType::KeyPress {
            self.call_hook(id, |h, cx| h.key_press(cx, event))
        } else {
            self.call_hook(id, |h, cx| h.key_release(cx, event))
        }
    }

    fn route_mouse_press(&mut self, id: WidgetId, event: &mut Event) -> bool {
        let pos = event.position().unwrap_or_default();
        if let Some(input) = self.input_mut(id) {
            input.pressed = true;
            input.pointer = Some(pos);
        }

        // Clicking outside the focused child takes its focus away.
        if let Some(focused) = self.input(id).focused_widget {
            let inside = self.rect(focused).is_some_and(|r| r.contains(pos));
            if !inside {
                tracing::trace!(target: targets::ROUTER, ?focused, "focus out");
                self.send(focused, EventKind::FocusLost);
                if let Some(input) = self.input_mut(id) {
                    input.focused_widget = None;
                }
            }
        }

        if let Some(hover) = self.input(id).hover_widget {
            if self.focus_policy(hover).has(FocusPolicy::MOUSE) && self.input(id).focused_widget.is_none() {
                tracing::trace!(target: targets::ROUTER, ?hover, "focus on");
                if let Some(input) = self.input_mut(id) {
                    input.focused_widget = Some(hover);
                }
                self.send(hover, EventKind::FocusGained);
            }
            let consumed = self.forward(hover, event);
            self.sync_focus_chain(id, hover);
            if consumed {
                return true;
            }
        }
        self.call_hook(id, |h, cx| h.mouse_press(cx, event))
    }

    fn route_mouse_release(&mut self, id: WidgetId, event: &mut Event) -> bool {
        let pos = event.position().unwrap_or_default();
        let dragging = self.input(id).dragging_widget;
        if let Some(input) = self.input_mut(id) {
            input.drag_reject = false;
            input.pressed = false;
            input.pointer = Some(pos);
        }

        if dragging.is_some() && self.is_root(id) {
            tracing::trace!(target: targets::ROUTER, ?dragging, "drag end");
            self.handle(id, &mut Event::drag(DragPhase::End, pos, Point::ZERO));
            if let Some(input) = self.input_mut(id) {
                input.dragging_widget = None;
            }
            self.capture_mouse(id, false);
        }

        if let Some(hover) = self.input(id).hover_widget {
            if self.forward(hover, event) {
                return true;
            }
        }
        self.call_hook(id, |h, cx| h.mouse_release(cx, event))
    }

    fn route_mouse_motion(&mut self, id: WidgetId, event: &mut Event) -> bool {
        let Some(motion) = event.motion().copied() else {
            return false;
        };
        let pos = motion.position;
        if let Some(input) = self.input_mut(id) {
            input.pointer = Some(pos);
        }

        #[cfg(debug_assertions)]
        if self.attrs(id).has(WidgetAttrs::DEBUG) {
            self.repaint(id);
        }

        // Only a root turns press + motion into a drag gesture.
        let input = self.input(id);
        if input.pressed && !input.drag_reject && self.is_root(id) {
            if input.dragging_widget.is_none() {
                let accepted = self.handle(id, &mut Event::drag(DragPhase::Begin, pos, motion.delta));
                if self.input(id).dragging_widget.is_none() && !accepted {
                    tracing::trace!(target: targets::ROUTER, ?id, "drag rejected");
                    if let Some(input) = self.input_mut(id) {
                        input.drag_reject = true;
                    }
                } else {
                    tracing::trace!(
                        target: targets::ROUTER,
                        dragging = ?self.input(id).dragging_widget,
                        "drag begin"
                    );
                    self.capture_mouse(id, true);
                }
            }

            match self.input(id).dragging_widget {
                Some(target) if target != id => {
                    self.send_to_child(target, Event::drag(DragPhase::Motion, pos, motion.delta));
                }
                Some(_) => {
                    self.handle(id, &mut Event::drag(DragPhase::Motion, pos, motion.delta));
                }
                None => {}
            }
        }

        match self.input(id).hover_widget {
            None => {
                if let Some(hit) = self.child_at(id, pos) {
                    if let Some(input) = self.input_mut(id) {
                        input.hover_widget = Some(hit);
                    }
                    self.send_to_child(hit, Event::mouse_enter(pos).with_timestamp(event.timestamp()));
                }
            }
            Some(hover) => {
                let consumed = self.forward(hover, event);

                let inside = self.rect(hover).is_some_and(|r| r.contains(pos));
                if !inside || self.child_at(id, pos) != Some(hover) {
                    if self.input(id).hover_widget == Some(hover) {
                        self.clear_hover(id);
                    }
                    self.send_to_child(hover, Event::mouse_leave(pos).with_timestamp(event.timestamp()));
                }

                if consumed {
                    return true;
                }
            }
        }
        self.call_hook(id, |h, cx| h.mouse_motion(cx, event))
    }

    fn route_drag_begin(&mut self, id: WidgetId, event: &mut Event) -> bool {
        let pos = event.position().unwrap_or_default();
        if let Some(child) = self.child_at(id, pos) {
            if let Some(input) = self.input_mut(id) {
                input.dragging_widget = Some(child);
            }
            if self.forward(child, event) {
                return true;
            }
        }
        if self.call_hook(id, |h, cx| h.drag_begin(cx, event)) {
            if let Some(input) = self.input_mut(id) {
                input.dragging_widget = Some(id);
            }
            return true;
        }
        false
    }

    /// Paint a widget and its children.
    ///
    /// A window paints with its own painter; any other widget borrows the
    /// painter its parent lent out for the pass and works in its own origin.
    fn route_paint(&mut self, id: WidgetId, event: &mut Event) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let owns_window = node.window.is_some();
        let rect = node.rect;
        let attrs = node.attrs;
        let palette = node.palette.clone();
        let has_parent = node.parent.is_some();

        let painter = if owns_window {
            node.window.as_mut().and_then(|w| w.painter.take())
        } else {
            self.painting.take()
        };
        let Some(mut painter) = painter else {
            tracing::trace!(target: targets::ROUTER, ?id, "no painter available, paint skipped");
            return false;
        };
        let _perf = owns_window.then(|| PerfSpan::new(span_names::PAINT));

        if owns_window {
            let brush = if attrs.has(WidgetAttrs::BACKGROUND_TRANSPARENT) {
                Brush::TRANSPARENT
            } else {
                palette.window.clone()
            };
            painter.begin();
            painter.clear(&brush);
        } else {
            painter.save();
            painter.translate(rect.x, rect.y);
        }
        if has_parent && attrs.has(WidgetAttrs::PAINT_BACKGROUND) {
            painter.fill_rect(Rect::from_size(rect.size()), &palette.window);
        }

        let consumed = self.call_hook(id, |h, cx| h.paint_event(cx, painter.as_mut(), event));

        if attrs.has(WidgetAttrs::PAINT_CHILDREN) {
            let Some(returned) = self.paint_children(id, painter, event) else {
                tracing::debug!(target: targets::ROUTER, ?id, "painter lost during child pass");
                return consumed;
            };
            painter = returned;
        }

        #[cfg(debug_assertions)]
        if self.root(id).is_some_and(|root| self.attrs(root).has(WidgetAttrs::DEBUG)) {
            painter.draw_rect(Rect::from_size(rect.size()), &palette.debug_outline);
        }

        if owns_window {
            painter.end();
            match self.native_window(id) {
                Some(native) => native.painter = Some(painter),
                None => tracing::debug!(target: targets::ROUTER, ?id, "window dropped during paint"),
            }
        } else {
            painter.restore();
            self.painting = Some(painter);
        }
        consumed
    }

    /// Paint children bottom to top: the list front is topmost, so it goes last.
    fn paint_children(
        &mut self,
        id: WidgetId,
        painter: Box<dyn Painter>,
        event: &Event,
    ) -> Option<Box<dyn Painter>> {
        let children: Vec<WidgetId> = self.children(id).iter().rev().copied().collect();
        self.painting = Some(painter);
        for child in children {
            let paintable = self
                .nodes
                .get(child)
                .is_some_and(|n| n.visible && !n.rect.is_empty());
            if !paintable {
                continue;
            }
            let mut child_event = event.clone();
            self.handle(child, &mut child_event);
        }
        self.painting.take()
    }
}
