//! The widget arena and its structural operations.
//!
//! [`WidgetTree`] owns every widget of one UI thread, the event loop that
//! delivers their timers and deferred calls, and the defaults new roots
//! inherit. Widgets are addressed by generation-checked [`WidgetId`]s, so an
//! id that outlives its widget is detected instead of dangling.
//!
//! Event routing lives in the router module; timers and deferred calls in the
//! timers module. This file covers hierarchy, geometry, visibility, focus and
//! layout attachment.

use std::collections::HashMap;
use std::sync::Arc;

use slotmap::SlotMap;
use trellis_core::logging::targets;
use trellis_core::{EventLoop, EventLoopConfig, Signal, TimerId};

use crate::backend::{AbstractWindow, NativeWindow, Painter, WindowFactory, WindowQuery, WindowValue};
use crate::error::{WidgetError, WidgetResult};
use crate::event::{Event, EventKind, WidgetEvent};
use crate::geometry::{Point, Rect, Size, SizePolicyPair};
use crate::layout::{Alignment, BoxLayout, LayoutHost};
use crate::style::{Font, Palette, Style};
use crate::widget::attrs::{FocusPolicy, WidgetAttrs};
use crate::widget::handler::WidgetHandler;
use crate::widget::node::WidgetNode;
use crate::widget::timers::TimerTarget;
use crate::widget::WidgetId;

/// Owner of all widgets on one UI thread.
///
/// Every root (a widget without a parent) keeps its own focus, hover and drag
/// state, so several independent windows can live in one tree.
///
/// # Example
///
/// ```
/// use trellis::{BoxLayout, FixedHint, Size, WidgetTree};
///
/// let mut tree = WidgetTree::new();
/// let root = tree.create(None, ()).unwrap();
/// let button = tree.create(Some(root), FixedHint(Size::new(50, 20))).unwrap();
///
/// let mut layout = BoxLayout::horizontal();
/// layout.add_widget(button, 0, Default::default());
/// tree.attach_layout(root, layout).unwrap();
///
/// tree.resize(root, 200, 100);
/// assert_eq!(tree.rect(button).map(|r| r.w), Some(200));
/// ```
pub struct WidgetTree {
    pub(crate) nodes: SlotMap<WidgetId, WidgetNode>,
    pub(crate) event_loop: EventLoop<WidgetTree>,
    pub(crate) timer_targets: HashMap<TimerId, TimerTarget>,
    /// Painter lent to a child while its parent's paint pass runs.
    pub(crate) painting: Option<Box<dyn Painter>>,
    style: Arc<Style>,
    palette: Arc<Palette>,
    font: Font,
    window_factory: Option<Box<dyn WindowFactory>>,
    destroyed: Arc<Signal<WidgetId>>,
    pub(crate) next_filter_id: u64,
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetTree {
    /// Create an empty tree with the default event loop configuration.
    pub fn new() -> Self {
        Self::with_config(EventLoopConfig::default())
    }

    /// Create an empty tree whose event loop uses `config`.
    pub fn with_config(config: EventLoopConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            event_loop: EventLoop::with_config(config),
            timer_targets: HashMap::new(),
            painting: None,
            style: Arc::new(Style::default()),
            palette: Arc::new(Palette::default()),
            font: Font::default(),
            window_factory: None,
            destroyed: Arc::new(Signal::new()),
            next_filter_id: 1,
        }
    }

    /// Install the backend that creates native windows for roots.
    pub fn set_window_factory(&mut self, factory: impl WindowFactory + 'static) {
        self.window_factory = Some(Box::new(factory));
    }

    /// Style, palette and font given to new roots.
    pub fn set_defaults(&mut self, style: Arc<Style>, palette: Arc<Palette>, font: Font) {
        self.style = style;
        self.palette = palette;
        self.font = font;
    }

    /// Emitted with the id of every widget as it is destroyed.
    pub fn destroyed(&self) -> &Arc<Signal<WidgetId>> {
        &self.destroyed
    }

    /// Number of live widgets.
    pub fn widget_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a widget. With a parent, it becomes the parent's topmost child
    /// and inherits its style, palette and font.
    pub fn create(
        &mut self,
        parent: Option<WidgetId>,
        handler: impl WidgetHandler,
    ) -> WidgetResult<WidgetId> {
        self.create_boxed(parent, Box::new(handler))
    }

    /// [`create`](Self::create) for an already boxed handler.
    pub fn create_boxed(
        &mut self,
        parent: Option<WidgetId>,
        handler: Box<dyn WidgetHandler>,
    ) -> WidgetResult<WidgetId> {
        let (style, palette, font) = match parent {
            Some(p) => {
                let node = self.nodes.get(p).ok_or(WidgetError::StaleWidget(p))?;
                (node.style.clone(), node.palette.clone(), node.font.clone())
            }
            None => (self.style.clone(), self.palette.clone(), self.font.clone()),
        };

        let id = self
            .nodes
            .insert(WidgetNode::new(None, handler, style, palette, font));
        tracing::trace!(target: targets::TREE, ?id, ?parent, "widget created");

        if let Some(p) = parent {
            self.add_child(p, id)?;
        }
        Ok(id)
    }

    /// Destroy a widget and its whole subtree.
    ///
    /// The parent is notified with `ChildRemoved` first; the subtree is then
    /// torn down without further notifications. Timers owned by any widget
    /// of the subtree are stopped.
    pub fn destroy(&mut self, id: WidgetId) -> WidgetResult<()> {
        let parent = self.nodes.get(id).ok_or(WidgetError::StaleWidget(id))?.parent;
        if let Some(parent) = parent {
            self.detach(parent, id);
            self.send(parent, EventKind::ChildRemoved(WidgetEvent { target: id }));
        }
        self.destroy_subtree(id);
        Ok(())
    }

    fn destroy_subtree(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        for child in node.children.clone() {
            self.destroy_subtree(child);
        }

        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        for timer in node.timers {
            self.timer_targets.remove(&timer);
            let _ = self.event_loop.timers_mut().stop(timer);
        }
        if let Some(mut native) = node.window {
            native.window.show(false);
        }
        tracing::debug!(target: targets::TREE, ?id, "widget destroyed");
        self.destroyed.emit(id);
    }

    /// Whether `id` names a live widget.
    #[inline]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children in z-order, topmost first.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn has_child(&self, id: WidgetId, child: WidgetId) -> bool {
        self.children(id).contains(&child)
    }

    /// The top of the widget's tree.
    pub fn root(&self, id: WidgetId) -> Option<WidgetId> {
        let mut current = id;
        loop {
            match self.nodes.get(current)?.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }

    /// The root, if it is a window.
    pub fn window(&self, id: WidgetId) -> Option<WidgetId> {
        self.root(id).filter(|&root| self.is_window(root))
    }

    pub fn is_root(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.parent.is_none())
    }

    /// A widget is a window when it has no parent or owns a native window.
    pub fn is_window(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(WidgetNode::is_window)
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.nodes.get(c).and_then(|n| n.parent);
        }
        false
    }

    /// Put a parentless widget on top of `parent`'s children.
    ///
    /// A native window the child owned is dropped: only roots keep one.
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> WidgetResult<()> {
        if !self.contains(parent) {
            return Err(WidgetError::StaleWidget(parent));
        }
        let node = self.nodes.get(child).ok_or(WidgetError::StaleWidget(child))?;
        if let Some(current) = node.parent {
            return Err(WidgetError::AlreadyParented { child, parent: current });
        }
        if self.is_ancestor(child, parent) {
            return Err(WidgetError::WouldCycle { child, parent });
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
            if let Some(mut native) = node.window.take() {
                native.window.show(false);
            }
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.insert(0, child);
        }
        tracing::trace!(target: targets::TREE, ?parent, ?child, "child added");
        self.send(parent, EventKind::ChildAdded(WidgetEvent { target: child }));
        Ok(())
    }

    /// Detach `child` from `parent`, leaving it a root. Does nothing if it is
    /// not a direct child.
    pub fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> WidgetResult<()> {
        if !self.contains(parent) {
            return Err(WidgetError::StaleWidget(parent));
        }
        if !self.has_child(parent, child) {
            return Ok(());
        }
        self.detach(parent, child);
        self.send(parent, EventKind::ChildRemoved(WidgetEvent { target: child }));
        Ok(())
    }

    fn detach(&mut self, parent: WidgetId, child: WidgetId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&c| c != child);
            node.input.forget(child);
            if let Some(layout) = node.layout.as_mut() {
                layout.remove_widget(child);
            }
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
            node.input.focused = false;
        }
    }

    /// Move a widget under another parent, or make it a root with `None`.
    pub fn set_parent(&mut self, id: WidgetId, parent: Option<WidgetId>) -> WidgetResult<()> {
        let current = self.nodes.get(id).ok_or(WidgetError::StaleWidget(id))?.parent;
        if current == parent {
            return Ok(());
        }
        if let Some(p) = parent {
            if !self.contains(p) {
                return Err(WidgetError::StaleWidget(p));
            }
            if self.is_ancestor(id, p) {
                return Err(WidgetError::WouldCycle { child: id, parent: p });
            }
        }
        if let Some(old) = current {
            self.remove_child(old, id)?;
        }
        if let Some(p) = parent {
            self.add_child(p, id)?;
        }
        Ok(())
    }

    /// Move the widget to the front of its siblings.
    pub fn raise(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if let Some(native) = node.window.as_mut() {
            native.window.raise();
        }
        let Some(parent) = node.parent else {
            return;
        };
        if let Some(siblings) = self.nodes.get_mut(parent).map(|n| &mut n.children) {
            siblings.retain(|&c| c != id);
            siblings.insert(0, id);
        }
        self.repaint(id);
    }

    /// Move the widget behind its siblings.
    pub fn lower(&mut self, id: WidgetId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(siblings) = self.nodes.get_mut(parent).map(|n| &mut n.children) {
            siblings.retain(|&c| c != id);
            siblings.push(id);
        }
        self.repaint(id);
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    pub fn visible(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.visible)
    }

    /// Show or hide a widget.
    ///
    /// A root gets its native window the first time it is shown. Hiding a
    /// focused widget takes the focus away from it.
    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        if !self.contains(id) {
            tracing::debug!(target: targets::TREE, ?id, "set_visible on stale widget");
            return;
        }

        if self.is_root(id) {
            if visible && self.native_window(id).is_none() {
                self.window_init(id);
            }
            if let Some(native) = self.native_window(id) {
                native.window.show(visible);
            }
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.visible = visible;
        }
        self.send(id, if visible { EventKind::Show } else { EventKind::Hide });

        let holds_focus = self.has_focus(id)
            || self.parent(id).is_some_and(|p| self.focused_child(p) == Some(id));
        if !visible && holds_focus {
            if let Some(parent) = self.parent(id) {
                self.send(id, EventKind::FocusLost);
                if let Some(node) = self.nodes.get_mut(parent) {
                    if node.input.focused_widget == Some(id) {
                        node.input.focused_widget = None;
                    }
                }
            }
        }
        self.request_layout(id);
    }

    pub fn show(&mut self, id: WidgetId) {
        self.set_visible(id, true);
    }

    pub fn hide(&mut self, id: WidgetId) {
        self.set_visible(id, false);
    }

    /// Create the native window of a root.
    ///
    /// The window takes the widget's size, else its adjusted size, else the
    /// style's default window size.
    pub fn window_init(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.window.is_some() {
            return;
        }
        let fallback = Size::new(node.style.window_width, node.style.window_height);
        let mut size = node.rect.size();
        if size.w <= 0 || size.h <= 0 {
            size = self.adjusted_size(id);
        }
        if size.w <= 0 || size.h <= 0 {
            size = fallback;
        }

        let Some(factory) = self.window_factory.as_mut() else {
            tracing::debug!(target: targets::TREE, ?id, "no window factory installed");
            return;
        };
        let Some((window, painter)) = factory.create_window(size) else {
            tracing::warn!(target: targets::TREE, ?id, ?size, "backend failed to create a window");
            return;
        };

        if let Some(node) = self.nodes.get_mut(id) {
            node.rect.w = size.w;
            node.rect.h = size.h;
            node.window = Some(NativeWindow::new(window, painter));
        }
        tracing::debug!(target: targets::TREE, ?id, ?size, "native window created");
    }

    pub(crate) fn native_window(&mut self, id: WidgetId) -> Option<&mut NativeWindow> {
        self.nodes.get_mut(id).and_then(|n| n.window.as_mut())
    }

    /// Attach a native window created elsewhere to a root.
    pub fn set_native_window(
        &mut self,
        id: WidgetId,
        window: Box<dyn AbstractWindow>,
        painter: Box<dyn Painter>,
    ) -> WidgetResult<()> {
        let node = self.nodes.get_mut(id).ok_or(WidgetError::StaleWidget(id))?;
        if let Some(parent) = node.parent {
            return Err(WidgetError::AlreadyParented { child: id, parent });
        }
        node.window = Some(NativeWindow::new(window, painter));
        Ok(())
    }

    pub fn set_window_title(&mut self, id: WidgetId, title: &str) {
        if !self.is_window(id) {
            return;
        }
        self.window_init(id);
        if let Some(native) = self.native_window(id) {
            native.window.set_title(title);
        }
    }

    /// Ask the widget to close.
    ///
    /// A window with a native window defers to the backend, which answers
    /// with a `Close` event. Any other widget is sent an accepted `Close` and
    /// hidden unless a handler ignored it.
    pub fn close(&mut self, id: WidgetId) {
        if let Some(native) = self.native_window(id) {
            native.window.close();
            return;
        }
        let mut event = Event::close();
        event.accept();
        self.handle(id, &mut event);
        if event.is_accepted() && self.contains(id) {
            self.set_visible(id, false);
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Parent-relative geometry.
    pub fn rect(&self, id: WidgetId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.rect)
    }

    pub fn size(&self, id: WidgetId) -> Size {
        self.rect(id).map_or(Size::ZERO, |r| r.size())
    }

    /// Resize, clamped to the minimum and maximum sizes.
    pub fn resize(&mut self, id: WidgetId, w: i32, h: i32) {
        let Some(node) = self.nodes.get_mut(id) else {
            tracing::debug!(target: targets::TREE, ?id, "resize on stale widget");
            return;
        };
        let new_size = Size::new(w, h).clamped(node.minimum_size, node.maximum_size);
        let old_size = node.rect.size();
        node.rect.w = new_size.w;
        node.rect.h = new_size.h;
        if let Some(native) = node.window.as_mut() {
            native.window.resize(new_size.w, new_size.h);
        }

        self.handle(id, &mut Event::resized(old_size, new_size));
        self.rectangle_update(id);
        self.repaint(id);
    }

    /// Move within the parent (or on screen, for a window).
    pub fn move_to(&mut self, id: WidgetId, x: i32, y: i32) {
        let Some(node) = self.nodes.get_mut(id) else {
            tracing::debug!(target: targets::TREE, ?id, "move on stale widget");
            return;
        };
        node.rect.x = x;
        node.rect.y = y;
        if let Some(native) = node.window.as_mut() {
            native.window.move_to(x, y);
        }

        self.handle(id, &mut Event::moved(x, y));
        self.rectangle_update(id);
        self.repaint(id);
    }

    /// [`resize`](Self::resize) then [`move_to`](Self::move_to).
    pub fn set_rect(&mut self, id: WidgetId, rect: Rect) {
        self.resize(id, rect.w, rect.h);
        self.move_to(id, rect.x, rect.y);
    }

    /// Re-check the parent's hover slot after the widget's geometry changed
    /// and tell the parent about the change.
    pub fn rectangle_update(&mut self, id: WidgetId) {
        let Some(parent) = self.parent(id) else {
            return;
        };

        if let Some(pos) = self.pointer_position(parent) {
            let hover = self.nodes.get(parent).and_then(|n| n.input.hover_widget);
            let still_inside = hover.is_some_and(|h| self.rect(h).is_some_and(|r| r.contains(pos)));
            if !still_inside {
                if let Some(h) = hover {
                    tracing::trace!(target: targets::ROUTER, ?h, "pointer left after geometry change");
                    self.clear_hover(parent);
                    self.send_to_child(h, Event::mouse_leave(pos));
                }
                if let Some(hit) = self.child_at(parent, pos) {
                    tracing::trace!(target: targets::ROUTER, ?hit, "pointer entered after geometry change");
                    if let Some(node) = self.nodes.get_mut(parent) {
                        node.input.hover_widget = Some(hit);
                    }
                    self.send_to_child(hit, Event::mouse_enter(pos));
                }
            }
        }

        self.send(parent, EventKind::ChildRectangleChanged(WidgetEvent { target: id }));
    }

    /// The last pointer position `id` saw, or the window's pointer mapped
    /// into `id`.
    fn pointer_position(&self, id: WidgetId) -> Option<Point> {
        let node = self.nodes.get(id)?;
        if node.input.pointer.is_some() {
            return node.input.pointer;
        }
        let root = self.root(id)?;
        let native = self.nodes.get(root)?.window.as_ref()?;
        match native.window.query_value(WindowQuery::MousePosition) {
            Some(WindowValue::MousePosition(p)) => Some(self.map_from_root(id, p)),
            _ => None,
        }
    }

    pub fn minimum_size(&self, id: WidgetId) -> Size {
        self.nodes.get(id).map_or(Size::ZERO, |n| n.minimum_size)
    }

    pub fn maximum_size(&self, id: WidgetId) -> Size {
        self.nodes.get(id).map_or(Size::MAX, |n| n.maximum_size)
    }

    pub fn set_minimum_size(&mut self, id: WidgetId, size: Size) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.minimum_size = size;
            if let Some(native) = node.window.as_mut() {
                native.window.set_value(WindowValue::MinimumSize(size));
            }
        }
    }

    pub fn set_maximum_size(&mut self, id: WidgetId, size: Size) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.maximum_size = size;
            if let Some(native) = node.window.as_mut() {
                native.window.set_value(WindowValue::MaximumSize(size));
            }
        }
    }

    /// Resize and pin the size policy to fixed on both axes.
    pub fn set_fixed_size(&mut self, id: WidgetId, w: i32, h: i32) {
        self.resize(id, w, h);
        let stretch = self.size_policy(id);
        self.set_size_policy(
            id,
            SizePolicyPair::fixed().with_stretch(stretch.horizontal_stretch, stretch.vertical_stretch),
        );
    }

    pub fn size_policy(&self, id: WidgetId) -> SizePolicyPair {
        self.nodes.get(id).map(|n| n.size_policy).unwrap_or_default()
    }

    pub fn set_size_policy(&mut self, id: WidgetId, policy: SizePolicyPair) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.size_policy = policy;
            self.request_layout(id);
        }
    }

    /// The first visible child, in z-order, whose rect contains `pos`.
    pub fn child_at(&self, id: WidgetId, pos: Point) -> Option<WidgetId> {
        self.children(id).iter().copied().find(|&c| {
            self.nodes
                .get(c)
                .is_some_and(|n| n.visible && n.rect.contains(pos))
        })
    }

    /// Preferred size: the handler's hint, else the attached layout's hint.
    pub fn size_hint(&mut self, id: WidgetId) -> Size {
        let hint = self.widget_size_hint(id);
        if !hint.is_empty() {
            return hint;
        }
        let Some(mut layout) = self.nodes.get_mut(id).and_then(|n| n.layout.take()) else {
            return hint;
        };
        let hint = layout.size_hint(&*self);
        self.restore_layout(id, layout);
        hint
    }

    /// The size a window would take: the size hint, else the union of the
    /// children's rects.
    fn adjusted_size(&mut self, id: WidgetId) -> Size {
        let hint = self.size_hint(id);
        if hint.is_valid() && !hint.is_empty() {
            return hint;
        }
        self.children(id)
            .iter()
            .filter_map(|&c| self.rect(c))
            .fold(Rect::ZERO, |acc, r| acc.united(&r))
            .size()
    }

    /// Resize the widget to its adjusted size and return it.
    pub fn adjust_size(&mut self, id: WidgetId) -> Size {
        let size = self.adjusted_size(id);
        if !size.is_empty() {
            self.resize(id, size.w, size.h);
        }
        size
    }

    /// Map a point in `id`'s coordinates to its root's coordinates.
    pub fn map_to_root(&self, id: WidgetId, pos: Point) -> Point {
        let mut out = pos;
        let mut current = id;
        while let Some(node) = self.nodes.get(current) {
            let Some(parent) = node.parent else {
                break;
            };
            out = out.offset(node.rect.x, node.rect.y);
            current = parent;
        }
        out
    }

    /// Map a point in the root's coordinates into `id`'s coordinates.
    pub fn map_from_root(&self, id: WidgetId, pos: Point) -> Point {
        let origin = self.map_to_root(id, Point::ZERO);
        pos.offset(-origin.x, -origin.y)
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focus_policy(&self, id: WidgetId) -> FocusPolicy {
        self.nodes.get(id).map_or(FocusPolicy::NONE, |n| n.focus_policy)
    }

    /// Change how the widget accepts focus. A widget that holds focus loses it.
    pub fn set_focus_policy(&mut self, id: WidgetId, policy: FocusPolicy) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.focus_policy = policy;
        let Some(parent) = node.parent else {
            return;
        };
        if self.focused_child(parent) == Some(id) {
            self.send(id, EventKind::FocusLost);
            if let Some(node) = self.nodes.get_mut(parent) {
                node.input.focused_widget = None;
            }
        }
    }

    pub fn has_focus(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.input.focused)
    }

    /// Give the widget keyboard focus.
    ///
    /// Every ancestor's focus slot is pointed down the path to the widget, so
    /// a widget focused on another branch loses focus first.
    pub fn take_focus(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.focus_policy.is_none() || node.parent.is_none() || node.input.focused {
            return;
        }

        let mut path = Vec::new();
        let mut child = id;
        while let Some(parent) = self.parent(child) {
            path.push((parent, child));
            child = parent;
        }
        for (parent, child) in path.into_iter().rev() {
            let previous = self.focused_child(parent);
            if previous == Some(child) {
                continue;
            }
            if let Some(prev) = previous {
                self.send(prev, EventKind::FocusLost);
            }
            if let Some(node) = self.nodes.get_mut(parent) {
                node.input.focused_widget = Some(child);
            }
        }

        // Focus held further down moves up to the widget.
        if let Some(inner) = self.focused_child(id) {
            self.send(inner, EventKind::FocusLost);
            if let Some(node) = self.nodes.get_mut(id) {
                node.input.focused_widget = None;
            }
        }
        tracing::trace!(target: targets::ROUTER, ?id, "focus taken");
        self.send(id, EventKind::FocusGained);
    }

    /// Keep `id`'s focus slot on the branch that holds focus after `child`
    /// handled input: link it when focus appeared below `child`, unlink it
    /// when focus left.
    pub(crate) fn sync_focus_chain(&mut self, id: WidgetId, child: WidgetId) {
        let holds = self.has_focus(child) || self.focused_child(child).is_some();
        let slot = self.focused_child(id);
        let update = match slot {
            None if holds => Some(Some(child)),
            Some(current) if current == child && !holds => Some(None),
            _ => None,
        };
        if let (Some(update), Some(node)) = (update, self.nodes.get_mut(id)) {
            node.input.focused_widget = update;
        }
    }

    /// The child holding keyboard focus within `id`.
    pub fn focused_child(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|n| n.input.focused_widget)
    }

    /// The child under the pointer within `id`.
    pub fn hover_child(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|n| n.input.hover_widget)
    }

    /// The widget owning the drag gesture within `id`. May be `id` itself.
    pub fn dragging_child(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|n| n.input.dragging_widget)
    }

    pub(crate) fn clear_hover(&mut self, id: WidgetId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.input.hover_widget = None;
        }
    }

    // =========================================================================
    // Attributes and appearance
    // =========================================================================

    pub fn attrs(&self, id: WidgetId) -> WidgetAttrs {
        self.nodes.get(id).map_or(WidgetAttrs::NONE, |n| n.attrs)
    }

    pub fn set_attribute(&mut self, id: WidgetId, attr: WidgetAttrs, on: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.attrs.set(attr, on);
        }
    }

    pub fn style(&self, id: WidgetId) -> Option<&Arc<Style>> {
        self.nodes.get(id).map(|n| &n.style)
    }

    pub fn palette(&self, id: WidgetId) -> Option<&Arc<Palette>> {
        self.nodes.get(id).map(|n| &n.palette)
    }

    pub fn font(&self, id: WidgetId) -> Option<&Font> {
        self.nodes.get(id).map(|n| &n.font)
    }

    pub fn set_style(&mut self, id: WidgetId, style: Arc<Style>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.style = style;
            self.send(id, EventKind::StyleChanged);
        }
    }

    /// Replace the palette of the widget and its whole subtree.
    pub fn set_palette(&mut self, id: WidgetId, palette: Arc<Palette>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.palette = palette.clone();
        self.send(id, EventKind::PaletteChanged);
        for child in self.children(id).to_vec() {
            self.set_palette(child, palette.clone());
        }
        self.repaint(id);
    }

    pub fn set_font(&mut self, id: WidgetId, font: Font) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.font = font;
            self.send(id, EventKind::FontChanged);
        }
    }

    // =========================================================================
    // Painting, layout requests and the window
    // =========================================================================

    /// Ask the native window of the widget's root to repaint.
    pub fn repaint(&mut self, id: WidgetId) {
        let Some(root) = self.root(id) else {
            return;
        };
        if let Some(native) = self.native_window(root) {
            native.window.repaint();
        }
    }

    /// Paint the widget's root right away.
    pub fn repaint_now(&mut self, id: WidgetId) {
        let Some(root) = self.root(id) else {
            return;
        };
        if self.native_window(root).is_some() {
            self.handle(root, &mut Event::paint());
        }
    }

    /// Tell the parent that this widget's geometry needs may have changed.
    pub fn request_layout(&mut self, id: WidgetId) {
        if let Some(parent) = self.parent(id) {
            self.send(parent, EventKind::LayoutRequest);
        }
    }

    /// Grab or release the pointer on the window owning the subtree.
    pub fn capture_mouse(&mut self, id: WidgetId, capture: bool) {
        let Some(root) = self.root(id) else {
            return;
        };
        self.window_init(root);
        if let Some(native) = self.native_window(root) {
            native.window.capture_mouse(capture);
        }
    }

    /// Route a freshly built event and discard it.
    pub(crate) fn send(&mut self, id: WidgetId, kind: EventKind) -> bool {
        self.handle(id, &mut Event::new(kind))
    }

    // =========================================================================
    // Layout attachment
    // =========================================================================

    /// Let `owner` drive `layout`.
    ///
    /// Every widget the layout manages, nested layouts included, is moved
    /// under `owner`. The first pass runs on the next show, paint or resize.
    pub fn attach_layout(&mut self, owner: WidgetId, mut layout: BoxLayout) -> WidgetResult<()> {
        if !self.contains(owner) {
            return Err(WidgetError::StaleWidget(owner));
        }
        let widgets = layout.widgets();
        if let Some(&stale) = widgets.iter().find(|&&w| !self.contains(w)) {
            return Err(WidgetError::StaleWidget(stale));
        }
        for &w in &widgets {
            if self.parent(w) != Some(owner) {
                self.set_parent(w, Some(owner))?;
            }
        }

        layout.set_owner(Some(owner));
        if let Some(node) = self.nodes.get_mut(owner) {
            if node.layout.is_some() {
                tracing::debug!(target: targets::LAYOUT, ?owner, "replacing attached layout");
            }
            node.layout = Some(Box::new(layout));
        }
        Ok(())
    }

    /// Detach the layout of `owner`. Its widgets stay where they are.
    pub fn take_layout(&mut self, owner: WidgetId) -> Option<BoxLayout> {
        let mut layout = self.nodes.get_mut(owner)?.layout.take()?;
        layout.set_owner(None);
        Some(*layout)
    }

    pub fn layout(&self, owner: WidgetId) -> Option<&BoxLayout> {
        self.nodes.get(owner).and_then(|n| n.layout.as_deref())
    }

    pub fn layout_mut(&mut self, owner: WidgetId) -> Option<&mut BoxLayout> {
        self.nodes.get_mut(owner).and_then(|n| n.layout.as_deref_mut())
    }

    /// Reparent `child` under `owner` and append it to `owner`'s layout.
    pub fn layout_add_widget(
        &mut self,
        owner: WidgetId,
        child: WidgetId,
        stretch: i32,
        alignment: Alignment,
    ) -> WidgetResult<()> {
        if self.layout(owner).is_none() {
            return Err(WidgetError::NoLayout(owner));
        }
        if self.parent(child) != Some(owner) {
            self.set_parent(child, Some(owner))?;
        }
        if let Some(layout) = self.layout_mut(owner) {
            layout.add_widget(child, stretch, alignment);
        }
        Ok(())
    }

    /// Append a nested layout to `owner`'s layout, reparenting its widgets.
    pub fn layout_add_layout(
        &mut self,
        owner: WidgetId,
        nested: BoxLayout,
        stretch: i32,
    ) -> WidgetResult<()> {
        if self.layout(owner).is_none() {
            return Err(WidgetError::NoLayout(owner));
        }
        for w in nested.widgets() {
            if !self.contains(w) {
                return Err(WidgetError::StaleWidget(w));
            }
            if self.parent(w) != Some(owner) {
                self.set_parent(w, Some(owner))?;
            }
        }
        if let Some(layout) = self.layout_mut(owner) {
            layout.add_layout(nested, stretch);
        }
        Ok(())
    }

    /// Run a pass of `owner`'s layout now if it is dirty.
    pub fn run_layout(&mut self, owner: WidgetId) {
        let Some(mut layout) = self.nodes.get_mut(owner).and_then(|n| n.layout.take()) else {
            return;
        };
        layout.run_layout(self, None);
        self.restore_layout(owner, layout);
    }

    pub(crate) fn restore_layout(&mut self, owner: WidgetId, layout: Box<BoxLayout>) {
        if let Some(node) = self.nodes.get_mut(owner) {
            if node.layout.is_none() {
                node.layout = Some(layout);
            }
        }
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    /// The widget's handler, if it is a `T` and not currently running.
    pub fn handler<T: WidgetHandler>(&self, id: WidgetId) -> Option<&T> {
        let handler: &dyn WidgetHandler = self.nodes.get(id)?.handler.as_deref()?;
        (handler as &dyn std::any::Any).downcast_ref::<T>()
    }

    /// Mutable access to the widget's handler, if it is a `T`.
    pub fn handler_mut<T: WidgetHandler>(&mut self, id: WidgetId) -> Option<&mut T> {
        let handler: &mut dyn WidgetHandler = self.nodes.get_mut(id)?.handler.as_deref_mut()?;
        (handler as &mut dyn std::any::Any).downcast_mut::<T>()
    }
}

impl LayoutHost for WidgetTree {
    fn widget_size_hint(&self, id: WidgetId) -> Size {
        self.nodes
            .get(id)
            .and_then(|n| n.handler.as_ref().map(|h| h.size_hint(&n.style)))
            .unwrap_or(Size::ZERO)
    }

    fn widget_rect(&self, id: WidgetId) -> Rect {
        self.rect(id).unwrap_or_default()
    }

    fn widget_visible(&self, id: WidgetId) -> bool {
        self.visible(id)
    }

    fn widget_size_policy(&self, id: WidgetId) -> SizePolicyPair {
        self.size_policy(id)
    }

    fn set_widget_rect(&mut self, id: WidgetId, rect: Rect) {
        self.set_rect(id, rect);
    }

    fn grow_widget(&mut self, id: WidgetId, minimum: Size, size: Size) {
        self.set_minimum_size(id, minimum);
        self.resize(id, size.w, size.h);
    }
}
