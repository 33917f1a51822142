//! Interfaces the widget tree drives but does not implement.
//!
//! A platform backend supplies an [`AbstractWindow`] for every top-level
//! widget and a [`Painter`] that draws into it. The tree only calls these
//! traits; rasterization, text shaping and OS integration live behind them.

use crate::geometry::{Point, Rect, Size};
use crate::style::Brush;

/// Drawing surface of one native window.
///
/// The router brackets every window paint with `begin`/`end` and uses
/// `save`/`translate`/`restore` to move into each child's coordinate space.
pub trait Painter {
    fn begin(&mut self);
    fn end(&mut self);

    /// Fill the whole surface.
    fn clear(&mut self, brush: &Brush);

    /// The window's client area changed size.
    fn notify_resize(&mut self, w: i32, h: i32);

    /// The window moved to a screen with a different DPI.
    fn notify_dpi_changed(&mut self, x: f32, y: f32);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: i32, dy: i32);

    /// Outline `rect` in the current coordinate space.
    fn draw_rect(&mut self, rect: Rect, brush: &Brush);

    /// Fill `rect` in the current coordinate space.
    fn fill_rect(&mut self, rect: Rect, brush: &Brush);
}

/// A value pushed to or read from a native window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowValue {
    MinimumSize(Size),
    MaximumSize(Size),
    Opacity(f32),
    Dpi { x: f32, y: f32 },
    MousePosition(Point),
}

/// A key for [`AbstractWindow::query_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowQuery {
    Dpi,
    MousePosition,
}

/// A native top-level window.
pub trait AbstractWindow {
    fn resize(&mut self, w: i32, h: i32);
    fn move_to(&mut self, x: i32, y: i32);
    fn show(&mut self, visible: bool);
    fn raise(&mut self);

    /// Ask the window to close. The backend answers with a `Close` event.
    fn close(&mut self);

    fn capture_mouse(&mut self, capture: bool);

    /// Schedule a paint. The backend answers with a `Paint` event.
    fn repaint(&mut self);

    fn set_title(&mut self, title: &str);

    /// Push a value. Returns false if the backend does not support it.
    fn set_value(&mut self, value: WindowValue) -> bool;

    fn query_value(&self, query: WindowQuery) -> Option<WindowValue>;
}

/// Creates native windows for top-level widgets as they are first shown.
pub trait WindowFactory {
    /// A window of `size` and its painter, or `None` if the backend failed.
    fn create_window(&mut self, size: Size) -> Option<(Box<dyn AbstractWindow>, Box<dyn Painter>)>;
}

/// The native window owned by a top-level widget.
pub(crate) struct NativeWindow {
    pub(crate) window: Box<dyn AbstractWindow>,
    /// Taken out while a paint pass is running.
    pub(crate) painter: Option<Box<dyn Painter>>,
}

impl NativeWindow {
    pub(crate) fn new(window: Box<dyn AbstractWindow>, painter: Box<dyn Painter>) -> Self {
        Self {
            window,
            painter: Some(painter),
        }
    }
}
