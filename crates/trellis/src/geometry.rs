//! Integer geometry and size policies.
//!
//! All widget geometry is in logical pixels. A widget's [`Rect`] is relative
//! to its parent; a window's rect origin is its position on screen.

use std::ops::{Add, Sub};

/// A point in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This point shifted by `(dx, dy)`.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.offset(rhs.x, rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.offset(-rhs.x, -rhs.y)
    }
}

/// A width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    /// A zero size.
    pub const ZERO: Self = Self { w: 0, h: 0 };

    /// The largest representable size, used as the default maximum size.
    pub const MAX: Self = Self {
        w: i32::MAX,
        h: i32::MAX,
    };

    #[inline]
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// A size with no area.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// A size usable as a hint: both dimensions strictly positive.
    #[inline]
    pub const fn is_valid(self) -> bool {
        !self.is_empty()
    }

    /// Width and height swapped.
    #[inline]
    pub const fn transposed(self) -> Self {
        Self {
            w: self.h,
            h: self.w,
        }
    }

    /// Clamp each dimension into `[min, max]`.
    pub fn clamped(self, min: Size, max: Size) -> Self {
        Self {
            w: self.w.max(min.w).min(max.w.max(min.w)),
            h: self.h.max(min.h).min(max.h.max(min.h)),
        }
    }
}

/// Per-edge spacing around a rectangle's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Margin {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margin {
    pub const ZERO: Self = Self::uniform(0);

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same value on every edge.
    pub const fn uniform(v: i32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Total horizontal margin.
    #[inline]
    pub const fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    /// Total vertical margin.
    #[inline]
    pub const fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// An axis-aligned rectangle with an integer origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A rect at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.w, size.h)
    }

    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// A rect with no area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Whether `p` lies inside. The right and bottom edges are exclusive.
    #[inline]
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    /// The smallest rect containing both.
    pub fn united(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// This rect moved by `(dx, dy)`.
    #[inline]
    pub const fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Shrink by `margin` (content area of a container).
    pub const fn apply_margin(&self, margin: Margin) -> Rect {
        Rect::new(
            self.x + margin.left,
            self.y + margin.top,
            self.w - margin.horizontal(),
            self.h - margin.vertical(),
        )
    }

    /// Grow by `margin` (container area around some content).
    pub const fn unapply_margin(&self, margin: Margin) -> Rect {
        Rect::new(
            self.x - margin.left,
            self.y - margin.top,
            self.w + margin.horizontal(),
            self.h + margin.vertical(),
        )
    }
}

/// How a widget's size along one axis responds to a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizePolicy {
    /// The widget keeps its current size; layouts use that size as its hint.
    Fixed,

    /// The size hint is preferred but the widget can grow and shrink.
    #[default]
    Preferred,

    /// The widget wants as much space as it can get.
    Expanding,
}

impl SizePolicy {
    /// Returns true if the policy allows the widget to grow.
    #[inline]
    pub fn can_grow(self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

/// Combined horizontal and vertical size policies with stretch factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SizePolicyPair {
    /// Horizontal size policy.
    pub horizontal: SizePolicy,

    /// Vertical size policy.
    pub vertical: SizePolicy,

    /// Stretch used by a horizontal layout when the item has none of its own.
    pub horizontal_stretch: u8,

    /// Stretch used by a vertical layout when the item has none of its own.
    pub vertical_stretch: u8,
}

impl SizePolicyPair {
    pub const fn new(horizontal: SizePolicy, vertical: SizePolicy) -> Self {
        Self {
            horizontal,
            vertical,
            horizontal_stretch: 0,
            vertical_stretch: 0,
        }
    }

    /// Both axes fixed.
    pub const fn fixed() -> Self {
        Self::new(SizePolicy::Fixed, SizePolicy::Fixed)
    }

    /// Set both stretch factors.
    pub const fn with_stretch(mut self, horizontal: u8, vertical: u8) -> Self {
        self.horizontal_stretch = horizontal;
        self.vertical_stretch = vertical;
        self
    }

    /// Both axes are [`SizePolicy::Fixed`].
    pub fn is_fixed(&self) -> bool {
        self.horizontal == SizePolicy::Fixed && self.vertical == SizePolicy::Fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = Rect::new(10, 10, 20, 5);
        assert!(r.contains(Point::new(10, 10)));
        assert!(r.contains(Point::new(29, 14)));
        assert!(!r.contains(Point::new(30, 14)));
        assert!(!r.contains(Point::new(10, 15)));
    }

    #[test]
    fn test_rect_united() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 5, 10, 30);
        assert_eq!(a.united(&b), Rect::new(0, 0, 30, 35));
    }

    #[test]
    fn test_margin_apply_unapply() {
        let m = Margin::new(1, 2, 3, 4);
        let r = Rect::new(0, 0, 100, 50);
        let inner = r.apply_margin(m);
        assert_eq!(inner, Rect::new(1, 2, 96, 44));
        assert_eq!(inner.unapply_margin(m), r);
    }

    #[test]
    fn test_size_clamped() {
        let min = Size::new(10, 10);
        let max = Size::new(50, 40);
        assert_eq!(Size::new(5, 100).clamped(min, max), Size::new(10, 40));
        assert_eq!(Size::new(30, 20).clamped(min, Size::MAX), Size::new(30, 20));
    }

    #[test]
    fn test_size_policy_pair() {
        assert!(SizePolicyPair::fixed().is_fixed());
        let p = SizePolicyPair::default().with_stretch(2, 0);
        assert!(!p.is_fixed());
        assert_eq!(p.horizontal_stretch, 2);
        assert!(p.horizontal.can_grow());
    }
}
