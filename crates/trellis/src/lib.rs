//! Trellis - a retained-mode widget tree with event routing and box layout.
//!
//! The crate covers the part of a GUI toolkit that decides *who* gets an
//! event and *where* each widget goes. Rendering, text and OS windows are
//! left to a backend implementing [`Painter`] and [`AbstractWindow`].
//!
//! - [`WidgetTree`]: arena of widgets addressed by [`WidgetId`]
//! - [`WidgetHandler`]: per-widget behavior, every hook optional
//! - [`Event`]: tagged event value routed by [`WidgetTree::handle`]
//! - [`BoxLayout`]: stretch-weighted row/column layout
//! - [`Timer`] and deferred calls, built on [`trellis_core`]
//!
//! # Example
//!
//! ```
//! use trellis::{BoxLayout, Direction, Event, FixedHint, Point, Size, WidgetTree};
//!
//! let mut tree = WidgetTree::new();
//! let window = tree.create(None, ()).unwrap();
//! let ok = tree.create(Some(window), FixedHint(Size::new(50, 20))).unwrap();
//! let cancel = tree.create(Some(window), FixedHint(Size::new(50, 20))).unwrap();
//!
//! let mut row = BoxLayout::new(Direction::LeftToRight);
//! row.set_spacing(10);
//! row.add_widget(ok, 0, Default::default());
//! row.add_widget(cancel, 0, Default::default());
//! tree.attach_layout(window, row).unwrap();
//! tree.resize(window, 200, 100);
//!
//! assert_eq!(tree.rect(cancel).map(|r| r.x), Some(105));
//!
//! // Pointer input reaches the child under the pointer.
//! tree.handle(window, &mut Event::mouse_motion(Point::new(150, 10), Point::ZERO));
//! assert_eq!(tree.hover_child(window), Some(cancel));
//! ```

pub mod backend;
pub mod error;
pub mod event;
pub mod geometry;
pub mod layout;
pub mod style;
pub mod widget;

pub use backend::{AbstractWindow, Painter, WindowFactory, WindowQuery, WindowValue};
pub use error::{WidgetError, WidgetResult};
pub use event::{
    DpiEvent, DragEvent, DragPhase, Event, EventKind, EventType, Key, KeyEvent, Modifiers,
    MotionEvent, MouseButton, MouseEvent, MoveEvent, ResizeEvent, TextInputEvent, TimerEvent,
    Timestamp, WheelEvent, WidgetEvent, timestamp_now,
};
pub use geometry::{Margin, Point, Rect, Size, SizePolicy, SizePolicyPair};
pub use layout::{
    Alignment, BoxLayout, Direction, HBoxLayout, ItemExtra, LayoutHost, LayoutItem, SpacerItem,
    VBoxLayout, WidgetItem,
};
pub use style::{Brush, Color, Font, Palette, Style};
pub use widget::{
    EventFilter, FilterId, FixedHint, FocusPolicy, Timer, WidgetAttrs, WidgetCx, WidgetHandler,
    WidgetId, WidgetTree,
};

pub use trellis_core::{
    ConnectionGuard, ConnectionId, EventLoopBuilder, EventLoopConfig, Signal, TaskGroup, TaskId,
    TaskSender, TimerId, TimerKind,
};
