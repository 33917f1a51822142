//! Items a box layout arranges.
//!
//! A layout manages an ordered list of items, each one of:
//! - a widget, referenced by [`WidgetId`]
//! - a spacer (fixed spacing or a stretch)
//! - a nested [`BoxLayout`]

use std::ops::BitOr;

use crate::geometry::{Rect, Size};
use crate::layout::LayoutHost;
use crate::layout::box_layout::BoxLayout;
use crate::widget::WidgetId;

/// How an item is snapped inside the cell a layout gives it.
///
/// An empty alignment fills the cell. Left/Right/Center shrink the width to
/// the item's hint; Top/Bottom/Middle do the same for the height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment(u8);

impl Alignment {
    pub const NONE: Alignment = Alignment(0);
    pub const LEFT: Alignment = Alignment(1 << 0);
    pub const RIGHT: Alignment = Alignment(1 << 1);
    pub const CENTER: Alignment = Alignment(1 << 2);
    pub const TOP: Alignment = Alignment(1 << 3);
    pub const BOTTOM: Alignment = Alignment(1 << 4);
    pub const MIDDLE: Alignment = Alignment(1 << 5);

    /// Check if every bit of `flag` is set.
    pub fn has(&self, flag: Alignment) -> bool {
        flag.0 != 0 && (self.0 & flag.0) == flag.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Snap `cell` according to this alignment and the item's `preferred` size.
    pub fn apply(&self, cell: Rect, preferred: Size) -> Rect {
        let mut rect = cell;

        if self.has(Self::LEFT) {
            rect.w = preferred.w;
        } else if self.has(Self::RIGHT) {
            rect.x = cell.x + cell.w - preferred.w;
            rect.w = preferred.w;
        } else if self.has(Self::CENTER) {
            rect.x = cell.x + cell.w / 2 - preferred.w / 2;
            rect.w = preferred.w;
        }

        if self.has(Self::TOP) {
            rect.h = preferred.h;
        } else if self.has(Self::BOTTOM) {
            rect.y = cell.y + cell.h - preferred.h;
            rect.h = preferred.h;
        } else if self.has(Self::MIDDLE) {
            rect.y = cell.y + cell.h / 2 - preferred.h / 2;
            rect.h = preferred.h;
        }

        rect
    }
}

impl BitOr for Alignment {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Alignment(self.0 | rhs.0)
    }
}

/// Empty space in a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpacerItem {
    size: Size,
    alignment: Alignment,
}

impl SpacerItem {
    pub fn new(w: i32, h: i32) -> Self {
        Self {
            size: Size::new(w, h),
            alignment: Alignment::NONE,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, w: i32, h: i32) {
        self.size = Size::new(w, h);
    }
}

/// A widget managed by a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetItem {
    pub id: WidgetId,
    pub alignment: Alignment,
}

/// One entry of a layout.
#[derive(Debug)]
pub enum LayoutItem {
    Widget(WidgetItem),
    Spacer(SpacerItem),
    Layout(Box<BoxLayout>),
}

impl LayoutItem {
    /// A widget item with no alignment.
    pub fn widget_item(id: WidgetId) -> Self {
        LayoutItem::Widget(WidgetItem {
            id,
            alignment: Alignment::NONE,
        })
    }

    /// The preferred size.
    ///
    /// A widget whose size policy is fixed on both axes reports its current
    /// size; any other widget reports its handler's hint.
    pub fn size_hint(&mut self, host: &dyn LayoutHost) -> Size {
        match self {
            LayoutItem::Widget(item) => {
                if host.widget_size_policy(item.id).is_fixed() {
                    host.widget_rect(item.id).size()
                } else {
                    host.widget_size_hint(item.id)
                }
            }
            LayoutItem::Spacer(spacer) => spacer.size,
            LayoutItem::Layout(layout) => layout.size_hint(host),
        }
    }

    /// Give the item its final rect. Spacers ignore it.
    pub fn set_rect(&mut self, host: &mut dyn LayoutHost, rect: Rect) {
        match self {
            LayoutItem::Widget(item) => host.set_widget_rect(item.id, rect),
            LayoutItem::Spacer(_) => {}
            LayoutItem::Layout(layout) => layout.set_rect(host, rect),
        }
    }

    pub fn alignment(&self) -> Alignment {
        match self {
            LayoutItem::Widget(item) => item.alignment,
            LayoutItem::Spacer(spacer) => spacer.alignment,
            LayoutItem::Layout(layout) => layout.alignment(),
        }
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        match self {
            LayoutItem::Widget(item) => item.alignment = alignment,
            LayoutItem::Spacer(spacer) => spacer.alignment = alignment,
            LayoutItem::Layout(layout) => layout.set_alignment(alignment),
        }
    }

    /// The managed widget, for widget items.
    pub fn widget(&self) -> Option<WidgetId> {
        match self {
            LayoutItem::Widget(item) => Some(item.id),
            _ => None,
        }
    }

    pub fn spacer_item(&self) -> Option<&SpacerItem> {
        match self {
            LayoutItem::Spacer(spacer) => Some(spacer),
            _ => None,
        }
    }

    pub fn spacer_item_mut(&mut self) -> Option<&mut SpacerItem> {
        match self {
            LayoutItem::Spacer(spacer) => Some(spacer),
            _ => None,
        }
    }

    pub fn layout(&self) -> Option<&BoxLayout> {
        match self {
            LayoutItem::Layout(layout) => Some(layout),
            _ => None,
        }
    }

    pub fn layout_mut(&mut self) -> Option<&mut BoxLayout> {
        match self {
            LayoutItem::Layout(layout) => Some(layout),
            _ => None,
        }
    }

    /// Hidden widgets take no space. Spacers and nested layouts always count.
    pub(crate) fn is_skipped(&self, host: &dyn LayoutHost) -> bool {
        match self {
            LayoutItem::Widget(item) => !host.widget_visible(item.id),
            _ => false,
        }
    }
}

impl From<SpacerItem> for LayoutItem {
    fn from(spacer: SpacerItem) -> Self {
        LayoutItem::Spacer(spacer)
    }
}

impl From<BoxLayout> for LayoutItem {
    fn from(layout: BoxLayout) -> Self {
        LayoutItem::Layout(Box::new(layout))
    }
}

/// Per-item bookkeeping kept by the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemExtra {
    /// Weight for absorbing extra space. Zero defers to the widget's policy.
    pub stretch: i32,
    /// Size computed by the last pass.
    pub alloc_size: Size,
}

impl ItemExtra {
    pub fn with_stretch(stretch: i32) -> Self {
        Self {
            stretch: stretch.max(0),
            alloc_size: Size::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_horizontal_snaps() {
        let cell = Rect::new(10, 0, 100, 40);
        let pref = Size::new(20, 10);

        assert_eq!(Alignment::LEFT.apply(cell, pref), Rect::new(10, 0, 20, 40));
        assert_eq!(Alignment::RIGHT.apply(cell, pref), Rect::new(90, 0, 20, 40));
        assert_eq!(Alignment::CENTER.apply(cell, pref), Rect::new(50, 0, 20, 40));
    }

    #[test]
    fn test_alignment_vertical_snaps() {
        let cell = Rect::new(0, 0, 30, 100);
        let pref = Size::new(10, 20);

        assert_eq!(Alignment::TOP.apply(cell, pref), Rect::new(0, 0, 30, 20));
        assert_eq!(Alignment::BOTTOM.apply(cell, pref), Rect::new(0, 80, 30, 20));
        assert_eq!(Alignment::MIDDLE.apply(cell, pref), Rect::new(0, 40, 30, 20));
    }

    #[test]
    fn test_alignment_combined() {
        let a = Alignment::RIGHT | Alignment::BOTTOM;
        assert!(a.has(Alignment::RIGHT) && a.has(Alignment::BOTTOM));
        assert_eq!(
            a.apply(Rect::new(0, 0, 50, 50), Size::new(10, 10)),
            Rect::new(40, 40, 10, 10)
        );
        assert!(Alignment::default().is_empty());
    }

    #[test]
    fn test_item_extra_clamps_negative_stretch() {
        assert_eq!(ItemExtra::with_stretch(-3).stretch, 0);
        assert_eq!(ItemExtra::with_stretch(2).stretch, 2);
    }
}
