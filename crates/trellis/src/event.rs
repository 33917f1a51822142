//! The event value delivered through the widget tree.
//!
//! An [`Event`] is a tagged variant: its [`EventKind`] carries the payload and
//! fixes the event's [`EventType`] for its whole life. Only the accepted flag
//! changes while the event travels through handlers.
//!
//! Events are created by the producer (a platform backend or the router's own
//! synthesis), passed by `&mut` through [`WidgetTree::handle`], and dropped
//! when the producer's scope ends.
//!
//! [`WidgetTree::handle`]: crate::WidgetTree::handle

use std::sync::OnceLock;
use std::time::Instant;

use trellis_core::TimerId;

use crate::geometry::{Point, Size};
use crate::widget::WidgetId;

/// Milliseconds since the first call in this process.
pub type Timestamp = u64;

/// The current event timestamp.
pub fn timestamp_now() -> Timestamp {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = *EPOCH.get_or_init(Instant::now);
    u64::try_from(epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Modifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held.
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        control: true,
        ..Self::NONE
    };

    /// Alt modifier only.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Meta modifier only.
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Returns true if no modifiers are held.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            shift: self.shift || rhs.shift,
            control: self.control || rhs.control,
            alt: self.alt || rhs.alt,
            meta: self.meta || rhs.meta,
        }
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
    Other(u8),
}

/// A platform-neutral key code.
///
/// Printable keys use their Unicode scalar value; the named constants below
/// live in the private-use plane so they never collide with a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(pub u32);

impl Key {
    pub const UNKNOWN: Key = Key(0);
    pub const BACKSPACE: Key = Key(0x08);
    pub const TAB: Key = Key(0x09);
    pub const ENTER: Key = Key(0x0d);
    pub const ESCAPE: Key = Key(0x1b);
    pub const SPACE: Key = Key(0x20);
    pub const DELETE: Key = Key(0x7f);
    pub const LEFT: Key = Key(0xf_0001);
    pub const RIGHT: Key = Key(0xf_0002);
    pub const UP: Key = Key(0xf_0003);
    pub const DOWN: Key = Key(0xf_0004);
    pub const HOME: Key = Key(0xf_0005);
    pub const END: Key = Key(0xf_0006);

    /// The key that produces `c`.
    pub const fn from_char(c: char) -> Key {
        Key(c as u32)
    }
}

/// Mouse button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub button: MouseButton,
    pub position: Point,
    pub modifiers: Modifiers,
    /// 1 for a single click, 2 for a double click.
    pub clicks: u8,
}

/// Pointer motion, also used for enter and leave notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionEvent {
    pub position: Point,
    /// Movement since the previous motion event.
    pub delta: Point,
}

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

/// Size change, carrying both sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub old_size: Size,
    pub new_size: Size,
}

/// Position change, carrying the new origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveEvent {
    pub x: i32,
    pub y: i32,
}

/// Scroll wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelEvent {
    /// Scroll amount on each axis.
    pub delta: Point,
    pub position: Point,
    pub modifiers: Modifiers,
}

/// Which part of a drag gesture an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragPhase {
    Begin,
    Motion,
    End,
}

/// A drag gesture step synthesized from press + motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEvent {
    pub phase: DragPhase,
    pub position: Point,
    pub delta: Point,
}

/// A fired timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub timer_id: TimerId,
}

/// A notification naming another widget (child added or removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetEvent {
    pub target: WidgetId,
}

/// Committed text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInputEvent {
    pub text: String,
}

/// New window DPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DpiEvent {
    pub x: f32,
    pub y: f32,
}

/// The payload of an event. The variant decides the event type.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Paint,
    Resized(ResizeEvent),
    Moved(MoveEvent),
    Show,
    Hide,
    FocusGained,
    FocusLost,
    MouseEnter(MotionEvent),
    MouseLeave(MotionEvent),
    MouseMotion(MotionEvent),
    MousePress(MouseEvent),
    MouseRelease(MouseEvent),
    MouseWheel(WheelEvent),
    KeyPress(KeyEvent),
    KeyRelease(KeyEvent),
    TextInput(TextInputEvent),
    Close,
    ChildAdded(WidgetEvent),
    ChildRemoved(WidgetEvent),
    ChildRectangleChanged(WidgetEvent),
    PaletteChanged,
    StyleChanged,
    FontChanged,
    LayoutRequest,
    DpiChanged(DpiEvent),
    Drag(DragEvent),
    Timer(TimerEvent),
}

/// Field-less event type, for matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Paint,
    Resized,
    Moved,
    Show,
    Hide,
    FocusGained,
    FocusLost,
    MouseEnter,
    MouseLeave,
    MouseMotion,
    MousePress,
    MouseRelease,
    MouseWheel,
    KeyPress,
    KeyRelease,
    TextInput,
    Close,
    ChildAdded,
    ChildRemoved,
    ChildRectangleChanged,
    PaletteChanged,
    StyleChanged,
    FontChanged,
    LayoutRequest,
    DpiChanged,
    DragBegin,
    DragMotion,
    DragEnd,
    Timer,
}

impl EventType {
    /// Pointer events: enter, leave, motion, press, release, wheel.
    pub fn is_mouse_event(self) -> bool {
        matches!(
            self,
            Self::MouseEnter
                | Self::MouseLeave
                | Self::MouseMotion
                | Self::MousePress
                | Self::MouseRelease
                | Self::MouseWheel
        )
    }

    /// Keyboard events, text input included.
    pub fn is_key_event(self) -> bool {
        matches!(self, Self::KeyPress | Self::KeyRelease | Self::TextInput)
    }

    /// Drag gesture steps.
    pub fn is_drag_event(self) -> bool {
        matches!(self, Self::DragBegin | Self::DragMotion | Self::DragEnd)
    }

    /// Geometry, visibility, focus, lifecycle and appearance notifications.
    pub fn is_widget_event(self) -> bool {
        matches!(
            self,
            Self::Paint
                | Self::Resized
                | Self::Moved
                | Self::Show
                | Self::Hide
                | Self::FocusGained
                | Self::FocusLost
                | Self::Close
                | Self::ChildAdded
                | Self::ChildRemoved
                | Self::ChildRectangleChanged
                | Self::PaletteChanged
                | Self::StyleChanged
                | Self::FontChanged
                | Self::LayoutRequest
                | Self::DpiChanged
        )
    }
}

/// One occurrence delivered to a widget.
///
/// `accepted` starts out `true`. For [`EventType::Close`] a handler clears it
/// with [`ignore`](Self::ignore) to veto the close.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: EventKind,
    accepted: bool,
    timestamp: Timestamp,
}

impl Event {
    /// Wrap a payload, stamped with the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            accepted: true,
            timestamp: timestamp_now(),
        }
    }

    pub fn paint() -> Self {
        Self::new(EventKind::Paint)
    }

    pub fn resized(old_size: Size, new_size: Size) -> Self {
        Self::new(EventKind::Resized(ResizeEvent { old_size, new_size }))
    }

    pub fn moved(x: i32, y: i32) -> Self {
        Self::new(EventKind::Moved(MoveEvent { x, y }))
    }

    pub fn mouse_press(position: Point, button: MouseButton) -> Self {
        Self::new(EventKind::MousePress(MouseEvent {
            button,
            position,
            modifiers: Modifiers::NONE,
            clicks: 1,
        }))
    }

    pub fn mouse_release(position: Point, button: MouseButton) -> Self {
        Self::new(EventKind::MouseRelease(MouseEvent {
            button,
            position,
            modifiers: Modifiers::NONE,
            clicks: 1,
        }))
    }

    pub fn mouse_motion(position: Point, delta: Point) -> Self {
        Self::new(EventKind::MouseMotion(MotionEvent { position, delta }))
    }

    pub fn mouse_enter(position: Point) -> Self {
        Self::new(EventKind::MouseEnter(MotionEvent {
            position,
            delta: Point::ZERO,
        }))
    }

    pub fn mouse_leave(position: Point) -> Self {
        Self::new(EventKind::MouseLeave(MotionEvent {
            position,
            delta: Point::ZERO,
        }))
    }

    pub fn wheel(position: Point, delta: Point) -> Self {
        Self::new(EventKind::MouseWheel(WheelEvent {
            delta,
            position,
            modifiers: Modifiers::NONE,
        }))
    }

    pub fn key_press(key: Key, modifiers: Modifiers) -> Self {
        Self::new(EventKind::KeyPress(KeyEvent { key, modifiers }))
    }

    pub fn key_release(key: Key, modifiers: Modifiers) -> Self {
        Self::new(EventKind::KeyRelease(KeyEvent { key, modifiers }))
    }

    pub fn text_input(text: impl Into<String>) -> Self {
        Self::new(EventKind::TextInput(TextInputEvent { text: text.into() }))
    }

    pub fn drag(phase: DragPhase, position: Point, delta: Point) -> Self {
        Self::new(EventKind::Drag(DragEvent {
            phase,
            position,
            delta,
        }))
    }

    pub fn timer(timer_id: TimerId) -> Self {
        Self::new(EventKind::Timer(TimerEvent { timer_id }))
    }

    pub fn close() -> Self {
        Self::new(EventKind::Close)
    }

    /// Replace the timestamp, for events synthesized from another one.
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The payload.
    #[inline]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// The event type.
    pub fn type_(&self) -> EventType {
        match &self.kind {
            EventKind::Paint => EventType::Paint,
            EventKind::Resized(_) => EventType::Resized,
            EventKind::Moved(_) => EventType::Moved,
            EventKind::Show => EventType::Show,
            EventKind::Hide => EventType::Hide,
            EventKind::FocusGained => EventType::FocusGained,
            EventKind::FocusLost => EventType::FocusLost,
            EventKind::MouseEnter(_) => EventType::MouseEnter,
            EventKind::MouseLeave(_) => EventType::MouseLeave,
            EventKind::MouseMotion(_) => EventType::MouseMotion,
            EventKind::MousePress(_) => EventType::MousePress,
            EventKind::MouseRelease(_) => EventType::MouseRelease,
            EventKind::MouseWheel(_) => EventType::MouseWheel,
            EventKind::KeyPress(_) => EventType::KeyPress,
            EventKind::KeyRelease(_) => EventType::KeyRelease,
            EventKind::TextInput(_) => EventType::TextInput,
            EventKind::Close => EventType::Close,
            EventKind::ChildAdded(_) => EventType::ChildAdded,
            EventKind::ChildRemoved(_) => EventType::ChildRemoved,
            EventKind::ChildRectangleChanged(_) => EventType::ChildRectangleChanged,
            EventKind::PaletteChanged => EventType::PaletteChanged,
            EventKind::StyleChanged => EventType::StyleChanged,
            EventKind::FontChanged => EventType::FontChanged,
            EventKind::LayoutRequest => EventType::LayoutRequest,
            EventKind::DpiChanged(_) => EventType::DpiChanged,
            EventKind::Drag(d) => match d.phase {
                DragPhase::Begin => EventType::DragBegin,
                DragPhase::Motion => EventType::DragMotion,
                DragPhase::End => EventType::DragEnd,
            },
            EventKind::Timer(_) => EventType::Timer,
        }
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[inline]
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    #[inline]
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    #[inline]
    pub fn ignore(&mut self) {
        self.accepted = false;
    }

    #[inline]
    pub fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    /// The pointer position, for events that carry one.
    pub fn position(&self) -> Option<Point> {
        match &self.kind {
            EventKind::MousePress(m) | EventKind::MouseRelease(m) => Some(m.position),
            EventKind::MouseEnter(m) | EventKind::MouseLeave(m) | EventKind::MouseMotion(m) => {
                Some(m.position)
            }
            EventKind::MouseWheel(w) => Some(w.position),
            EventKind::Drag(d) => Some(d.position),
            _ => None,
        }
    }

    /// A copy with every positional payload shifted by `(dx, dy)`.
    ///
    /// Mapping a parent-space event into a child is `translated(-child.x, -child.y)`.
    pub fn translated(&self, dx: i32, dy: i32) -> Event {
        let mut out = self.clone();
        match &mut out.kind {
            EventKind::MousePress(m) | EventKind::MouseRelease(m) => {
                m.position = m.position.offset(dx, dy)
            }
            EventKind::MouseEnter(m) | EventKind::MouseLeave(m) | EventKind::MouseMotion(m) => {
                m.position = m.position.offset(dx, dy)
            }
            EventKind::MouseWheel(w) => w.position = w.position.offset(dx, dy),
            EventKind::Drag(d) => d.position = d.position.offset(dx, dy),
            _ => {}
        }
        out
    }

    pub fn mouse(&self) -> Option<&MouseEvent> {
        match &self.kind {
            EventKind::MousePress(m) | EventKind::MouseRelease(m) => Some(m),
            _ => None,
        }
    }

    pub fn motion(&self) -> Option<&MotionEvent> {
        match &self.kind {
            EventKind::MouseEnter(m) | EventKind::MouseLeave(m) | EventKind::MouseMotion(m) => {
                Some(m)
            }
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&KeyEvent> {
        match &self.kind {
            EventKind::KeyPress(k) | EventKind::KeyRelease(k) => Some(k),
            _ => None,
        }
    }

    pub fn resize(&self) -> Option<&ResizeEvent> {
        match &self.kind {
            EventKind::Resized(r) => Some(r),
            _ => None,
        }
    }

    pub fn move_(&self) -> Option<&MoveEvent> {
        match &self.kind {
            EventKind::Moved(m) => Some(m),
            _ => None,
        }
    }

    pub fn wheel_event(&self) -> Option<&WheelEvent> {
        match &self.kind {
            EventKind::MouseWheel(w) => Some(w),
            _ => None,
        }
    }

    pub fn drag_event(&self) -> Option<&DragEvent> {
        match &self.kind {
            EventKind::Drag(d) => Some(d),
            _ => None,
        }
    }

    pub fn timer_event(&self) -> Option<&TimerEvent> {
        match &self.kind {
            EventKind::Timer(t) => Some(t),
            _ => None,
        }
    }

    /// The widget named by a child notification.
    pub fn widget(&self) -> Option<WidgetId> {
        match &self.kind {
            EventKind::ChildAdded(w)
            | EventKind::ChildRemoved(w)
            | EventKind::ChildRectangleChanged(w) => Some(w.target),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            EventKind::TextInput(t) => Some(&t.text),
            _ => None,
        }
    }

    pub fn dpi(&self) -> Option<&DpiEvent> {
        match &self.kind {
            EventKind::DpiChanged(d) => Some(d),
            _ => None,
        }
    }
}
