//! Per-widget flag sets.

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Behavior switches on a widget.
///
/// ```
/// use trellis::WidgetAttrs;
///
/// let attrs = WidgetAttrs::DEFAULT | WidgetAttrs::DELETE_ON_CLOSE;
/// assert!(attrs.has(WidgetAttrs::PAINT_CHILDREN));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetAttrs(u8);

impl WidgetAttrs {
    pub const NONE: WidgetAttrs = WidgetAttrs(0);

    /// Destroy the widget on the next loop turn once a `Close` is accepted.
    pub const DELETE_ON_CLOSE: WidgetAttrs = WidgetAttrs(1 << 0);

    /// Outline widget rects while painting (debug builds only).
    pub const DEBUG: WidgetAttrs = WidgetAttrs(1 << 1);

    /// Clear the window with a transparent brush instead of the palette's.
    pub const BACKGROUND_TRANSPARENT: WidgetAttrs = WidgetAttrs(1 << 2);

    /// Paint children after the widget itself.
    pub const PAINT_CHILDREN: WidgetAttrs = WidgetAttrs(1 << 3);

    /// Fill the background with the palette's window brush before painting.
    pub const PAINT_BACKGROUND: WidgetAttrs = WidgetAttrs(1 << 4);

    pub const DEFAULT: WidgetAttrs = Self::PAINT_CHILDREN;

    /// Check if every bit of `flag` is set.
    pub fn has(&self, flag: WidgetAttrs) -> bool {
        (self.0 & flag.0) == flag.0
    }

    /// Set or clear `flag`.
    pub fn set(&mut self, flag: WidgetAttrs, on: bool) {
        if on {
            self.0 |= flag.0;
        } else {
            self.0 &= !flag.0;
        }
    }
}

impl Default for WidgetAttrs {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for WidgetAttrs {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        WidgetAttrs(self.0 | rhs.0)
    }
}

impl BitOrAssign for WidgetAttrs {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for WidgetAttrs {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        WidgetAttrs(self.0 & rhs.0)
    }
}

impl Not for WidgetAttrs {
    type Output = Self;

    fn not(self) -> Self {
        WidgetAttrs(!self.0)
    }
}

/// How a widget may acquire keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FocusPolicy(u8);

impl FocusPolicy {
    /// Never focused.
    pub const NONE: FocusPolicy = FocusPolicy(0);

    /// Focused by a mouse press while nothing else holds focus.
    pub const MOUSE: FocusPolicy = FocusPolicy(1 << 0);

    /// Focused by keyboard navigation or [`WidgetTree::take_focus`].
    ///
    /// [`WidgetTree::take_focus`]: crate::WidgetTree::take_focus
    pub const KEYBOARD: FocusPolicy = FocusPolicy(1 << 1);

    /// Focused by the wheel.
    pub const WHEEL: FocusPolicy = FocusPolicy(1 << 2);

    pub const STRONG: FocusPolicy = FocusPolicy(Self::MOUSE.0 | Self::KEYBOARD.0);

    /// Check if every bit of `policy` is set.
    pub fn has(&self, policy: FocusPolicy) -> bool {
        policy.0 != 0 && (self.0 & policy.0) == policy.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FocusPolicy {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        FocusPolicy(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrs_set_and_clear() {
        let mut attrs = WidgetAttrs::default();
        assert!(attrs.has(WidgetAttrs::PAINT_CHILDREN));
        assert!(!attrs.has(WidgetAttrs::DEBUG));

        attrs.set(WidgetAttrs::DEBUG, true);
        assert!(attrs.has(WidgetAttrs::DEBUG | WidgetAttrs::PAINT_CHILDREN));

        attrs.set(WidgetAttrs::PAINT_CHILDREN, false);
        assert!(!attrs.has(WidgetAttrs::PAINT_CHILDREN));
        assert_eq!(attrs & WidgetAttrs::DEBUG, WidgetAttrs::DEBUG);
    }

    #[test]
    fn test_focus_policy() {
        assert!(FocusPolicy::STRONG.has(FocusPolicy::MOUSE));
        assert!(!FocusPolicy::KEYBOARD.has(FocusPolicy::MOUSE));
        assert!(!FocusPolicy::NONE.has(FocusPolicy::NONE));
        assert!(FocusPolicy::default().is_none());
    }
}
