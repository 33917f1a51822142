//! Box layout for arranging items in a row or column.
//!
//! A `BoxLayout` packs its items along one axis. Each pass runs in three
//! steps over the visible items:
//!
//! 1. **Measure**: every item's size hint becomes its tentative allocation,
//!    and the space left over on the main axis is computed.
//! 2. **Distribute**: leftover space goes to stretched items in proportion
//!    to their stretch, or evenly to every item when none is stretched. Both
//!    use integer division, so up to `divisor - 1` pixels stay unassigned.
//! 3. **Place**: a cursor walks the main axis from the container's origin.
//!    Each item fills the cross axis unless its alignment snaps it to its
//!    hint.
//!
//! Reversed directions walk the same item list backwards, so toggling the
//! direction flips placement without reordering items.
//!
//! # Example
//!
//! ```
//! use trellis::{BoxLayout, Direction};
//!
//! let mut layout = BoxLayout::new(Direction::LeftToRight);
//! layout.set_spacing(4);
//! layout.add_spacing(10);
//! layout.add_stretch(1);
//! assert_eq!(layout.count_items(), 2);
//! ```

use trellis_core::PerfSpan;
use trellis_core::logging::{span_names, targets};

use crate::event::{Event, EventType};
use crate::geometry::{Margin, Rect, Size};
use crate::layout::LayoutHost;
use crate::layout::item::{Alignment, ItemExtra, LayoutItem, SpacerItem, WidgetItem};
use crate::style::Style;
use crate::widget::WidgetId;

/// Packing direction of a [`BoxLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl Direction {
    /// Whether the main axis is horizontal.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LeftToRight | Direction::RightToLeft)
    }

    /// Whether items are walked from the last one to the first.
    #[inline]
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::RightToLeft | Direction::BottomToTop)
    }
}

/// A layout that arranges items horizontally or vertically.
#[derive(Debug)]
pub struct BoxLayout {
    items: Vec<(LayoutItem, ItemExtra)>,
    direction: Direction,
    margin: Margin,
    spacing: i32,
    alignment: Alignment,
    /// Container rect. Local to the owner for a top-level layout.
    rect: Rect,
    /// Widget whose geometry drives this layout, if it is a top-level one.
    owner: Option<WidgetId>,
    dirty: bool,
    size_dirty: bool,
    cached_size: Size,
    /// Spacers added through `add_spacing`.
    n_spacing_item: usize,
}

/// A left-to-right [`BoxLayout`].
pub type HBoxLayout = BoxLayout;

/// A top-to-bottom [`BoxLayout`].
pub type VBoxLayout = BoxLayout;

impl BoxLayout {
    /// Create an empty layout with zero margin and spacing.
    pub fn new(direction: Direction) -> Self {
        Self {
            items: Vec::new(),
            direction,
            margin: Margin::ZERO,
            spacing: 0,
            alignment: Alignment::NONE,
            rect: Rect::ZERO,
            owner: None,
            dirty: true,
            size_dirty: true,
            cached_size: Size::ZERO,
            n_spacing_item: 0,
        }
    }

    /// A left-to-right layout.
    pub fn horizontal() -> Self {
        Self::new(Direction::LeftToRight)
    }

    /// A top-to-bottom layout.
    pub fn vertical() -> Self {
        Self::new(Direction::TopToBottom)
    }

    /// A layout whose margin and spacing come from `style`.
    pub fn with_style(direction: Direction, style: &Style) -> Self {
        let mut layout = Self::new(direction);
        layout.margin = style.margins();
        layout.spacing = style.spacing;
        layout
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Change the packing direction.
    ///
    /// When the main axis changes, spacers swap width and height so a fixed
    /// spacing stays a spacing along the new axis.
    pub fn set_direction(&mut self, direction: Direction) {
        let axis_changed = direction.is_horizontal() != self.direction.is_horizontal();
        self.direction = direction;
        self.mark_dirty();

        if axis_changed && self.n_spacing_item > 0 {
            for (item, _) in &mut self.items {
                if let Some(spacer) = item.spacer_item_mut() {
                    let size = spacer.size().transposed();
                    spacer.set_size(size.w, size.h);
                }
            }
        }
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn set_margin(&mut self, margin: Margin) {
        self.margin = margin;
        self.mark_dirty();
    }

    pub fn spacing(&self) -> i32 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: i32) {
        self.spacing = spacing;
        self.mark_dirty();
    }

    /// Alignment of this layout inside a parent layout's cell.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
        self.mark_dirty();
    }

    /// The widget this layout is attached to, if any.
    pub fn owner(&self) -> Option<WidgetId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<WidgetId>) {
        self.owner = owner;
        self.mark_dirty();
    }

    /// Append an item with no stretch.
    pub fn add_item(&mut self, item: impl Into<LayoutItem>) {
        self.mark_dirty();
        self.items.push((item.into(), ItemExtra::default()));
    }

    /// Append a widget.
    ///
    /// The widget should be a child of the widget that owns the top of this
    /// layout tree; [`WidgetTree::layout_add_widget`] reparents it for you.
    ///
    /// [`WidgetTree::layout_add_widget`]: crate::WidgetTree::layout_add_widget
    pub fn add_widget(&mut self, id: WidgetId, stretch: i32, alignment: Alignment) {
        self.mark_dirty();
        self.items.push((
            LayoutItem::Widget(WidgetItem { id, alignment }),
            ItemExtra::with_stretch(stretch),
        ));
    }

    /// Append a nested layout.
    pub fn add_layout(&mut self, mut layout: BoxLayout, stretch: i32) {
        layout.owner = None;
        layout.mark_dirty();
        self.mark_dirty();
        self.items.push((
            LayoutItem::Layout(Box::new(layout)),
            ItemExtra::with_stretch(stretch),
        ));
    }

    /// Append an empty spacer that absorbs extra space with `stretch`.
    pub fn add_stretch(&mut self, stretch: i32) {
        self.mark_dirty();
        self.items.push((
            SpacerItem::new(0, 0).into(),
            ItemExtra::with_stretch(stretch),
        ));
    }

    /// Append a fixed gap of `spacing` pixels along the main axis.
    pub fn add_spacing(&mut self, spacing: i32) {
        let spacer = if self.direction.is_horizontal() {
            SpacerItem::new(spacing, 0)
        } else {
            SpacerItem::new(0, spacing)
        };
        self.add_item(spacer);
        self.n_spacing_item += 1;
    }

    /// Position of the item managing `id`.
    pub fn item_index(&self, id: WidgetId) -> Option<usize> {
        self.items.iter().position(|(item, _)| item.widget() == Some(id))
    }

    pub fn count_items(&self) -> usize {
        self.items.len()
    }

    /// The item at `idx`, or `None` when out of range.
    pub fn item_at(&self, idx: usize) -> Option<&LayoutItem> {
        self.items.get(idx).map(|(item, _)| item)
    }

    /// Mutable access to the item at `idx`. Marks the layout dirty.
    pub fn item_at_mut(&mut self, idx: usize) -> Option<&mut LayoutItem> {
        self.mark_dirty();
        self.items.get_mut(idx).map(|(item, _)| item)
    }

    /// Stretch and last allocation of the item at `idx`.
    pub fn item_extra(&self, idx: usize) -> Option<ItemExtra> {
        self.items.get(idx).map(|(_, extra)| *extra)
    }

    /// Remove and return the item at `idx`, or `None` when out of range.
    pub fn take_item(&mut self, idx: usize) -> Option<LayoutItem> {
        if idx >= self.items.len() {
            return None;
        }
        let (item, _) = self.items.remove(idx);
        self.mark_dirty();
        if item.spacer_item().is_some() {
            self.n_spacing_item = self.n_spacing_item.saturating_sub(1);
        }
        Some(item)
    }

    /// Remove every item managing `id`, nested layouts included.
    pub fn remove_widget(&mut self, id: WidgetId) -> bool {
        let before = self.items.len();
        self.items.retain(|(item, _)| item.widget() != Some(id));
        let mut removed = self.items.len() != before;

        for (item, _) in &mut self.items {
            if let Some(layout) = item.layout_mut() {
                removed |= layout.remove_widget(id);
            }
        }
        if removed {
            self.mark_dirty();
        }
        removed
    }

    /// Every managed widget, nested layouts included, in item order.
    pub fn widgets(&self) -> Vec<WidgetId> {
        let mut out = Vec::new();
        self.collect_widgets(&mut out);
        out
    }

    fn collect_widgets(&self, out: &mut Vec<WidgetId>) {
        for (item, _) in &self.items {
            match item {
                LayoutItem::Widget(w) => out.push(w.id),
                LayoutItem::Layout(layout) => layout.collect_widgets(out),
                LayoutItem::Spacer(_) => {}
            }
        }
    }

    /// Invalidate both the placement and the cached size hint.
    pub fn mark_dirty(&mut self) {
        self.size_dirty = true;
        self.dirty = true;
    }

    /// Whether the next pass will recompute placement.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The container rect of the last pass.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// React to an event delivered to the owning widget.
    ///
    /// Never consumes the event.
    pub fn run_hook(&mut self, host: &mut dyn LayoutHost, event: &Event) {
        match event.type_() {
            EventType::Moved | EventType::Resized => {
                if let Some(owner) = self.owner {
                    self.rect = Rect::from_size(host.widget_rect(owner).size());
                }
                self.mark_dirty();
                self.run_layout(host, None);
            }
            EventType::LayoutRequest => self.mark_dirty(),
            EventType::Show | EventType::Paint => self.run_layout(host, None),
            _ => {}
        }
    }

    /// Place this layout inside a parent layout's cell.
    pub fn set_rect(&mut self, host: &mut dyn LayoutHost, rect: Rect) {
        if let Some(owner) = self.owner {
            host.set_widget_rect(owner, rect);
            self.rect = Rect::from_size(rect.size());
        } else {
            self.rect = rect;
        }
        self.mark_dirty();
        let dst = self.rect;
        self.run_layout(host, Some(dst));
    }

    /// Preferred size: the sum of visible hints along the main axis plus
    /// spacing, the largest hint across, plus margins. Cached until the
    /// layout is marked dirty.
    pub fn size_hint(&mut self, host: &dyn LayoutHost) -> Size {
        if self.size_dirty {
            let horizontal = self.direction.is_horizontal();
            let mut result = Size::ZERO;
            let mut visible = 0;

            for (item, _) in &mut self.items {
                if item.is_skipped(host) {
                    continue;
                }
                let hint = item.size_hint(host);
                visible += 1;
                if horizontal {
                    result.w += hint.w;
                    result.h = result.h.max(hint.h);
                } else {
                    result.h += hint.h;
                    result.w = result.w.max(hint.w);
                }
            }

            if visible > 0 {
                let gaps = self.spacing * (visible - 1);
                if horizontal {
                    result.w += gaps;
                } else {
                    result.h += gaps;
                }
            }

            self.cached_size = Rect::from_size(result).unapply_margin(self.margin).size();
            self.size_dirty = false;
        }
        tracing::trace!(target: targets::LAYOUT, size = ?self.cached_size, "box layout size hint");
        self.cached_size
    }

    /// Lay out the items.
    ///
    /// With `dst` the layout packs into that rect (nested use). Without it
    /// the layout is the top of a layout tree: it packs into its owner and
    /// first grows the owner if it is smaller than the size hint.
    ///
    /// Does nothing when the layout is clean or empty.
    #[tracing::instrument(skip(self, host), target = "trellis::layout", level = "trace")]
    pub fn run_layout(&mut self, host: &mut dyn LayoutHost, dst: Option<Rect>) {
        if self.items.is_empty() || !self.dirty {
            return;
        }

        let container = match dst {
            Some(rect) => rect,
            None => {
                let _perf = PerfSpan::new(span_names::LAYOUT);
                self.top_level_rect(host)
            }
        };
        let r = container.apply_margin(self.margin);
        let horizontal = self.direction.is_horizontal();
        let main = |s: Size| if horizontal { s.w } else { s.h };

        let mut order: Vec<usize> = (0..self.items.len())
            .filter(|&i| !self.items[i].0.is_skipped(&*host))
            .collect();
        if self.direction.is_reversed() {
            order.reverse();
        }
        if order.is_empty() {
            self.dirty = false;
            return;
        }
        let visible = order.len() as i32;

        // Measure
        let mut space = main(r.size()) - self.spacing * (visible - 1);
        let mut stretch_sum = 0;
        for &i in &order {
            let hint = self.items[i].0.size_hint(&*host);
            self.items[i].1.alloc_size = hint;
            space -= main(hint);
            stretch_sum += self.stretch_of(i, &*host);
        }

        // Distribute
        if space != 0 {
            if stretch_sum > 0 {
                let part = space / stretch_sum;
                for &i in &order {
                    let stretch = self.stretch_of(i, &*host);
                    if stretch > 0 {
                        grow_main(&mut self.items[i].1.alloc_size, horizontal, part * stretch);
                    }
                }
            } else {
                let part = space / visible;
                for &i in &order {
                    grow_main(&mut self.items[i].1.alloc_size, horizontal, part);
                }
            }
        }

        // Place
        let mut x = r.x;
        let mut y = r.y;
        for &i in &order {
            let size = self.items[i].1.alloc_size;
            let mut cell = if horizontal {
                Rect::new(x, y, size.w, r.h)
            } else {
                Rect::new(x, y, r.w, size.h)
            };

            let alignment = self.items[i].0.alignment();
            if !alignment.is_empty() {
                let preferred = self.items[i].0.size_hint(&*host);
                cell = alignment.apply(cell, preferred);
            }
            self.items[i].0.set_rect(host, cell);

            if horizontal {
                x += size.w + self.spacing;
            } else {
                y += size.h + self.spacing;
            }
        }

        tracing::debug!(
            target: targets::LAYOUT,
            items = visible,
            space,
            stretch_sum,
            "box layout pass complete"
        );
        self.dirty = false;
    }

    /// The container for a pass with no explicit destination, growing the
    /// owner when it cannot fit the hint.
    fn top_level_rect(&mut self, host: &mut dyn LayoutHost) -> Rect {
        let hint = self.size_hint(&*host);
        let mut r = match self.owner {
            Some(owner) => Rect::from_size(host.widget_rect(owner).size()),
            None => self.rect,
        };

        if r.w < hint.w || r.h < hint.h {
            let size = Size::new(r.w.max(hint.w), r.h.max(hint.h));
            tracing::debug!(
                target: targets::LAYOUT,
                current = ?r.size(),
                needed = ?hint,
                "growing layout owner"
            );
            if let Some(owner) = self.owner {
                host.grow_widget(owner, hint, size);
            }
            r.w = size.w;
            r.h = size.h;
        }
        self.rect = r;
        r
    }

    /// An explicit stretch wins; otherwise a widget's policy stretch along
    /// the main axis.
    fn stretch_of(&self, idx: usize, host: &dyn LayoutHost) -> i32 {
        let (item, extra) = &self.items[idx];
        if extra.stretch > 0 {
            return extra.stretch;
        }
        match item.widget() {
            Some(id) => {
                let policy = host.widget_size_policy(id);
                i32::from(if self.direction.is_horizontal() {
                    policy.horizontal_stretch
                } else {
                    policy.vertical_stretch
                })
            }
            None => 0,
        }
    }
}

impl Default for BoxLayout {
    fn default() -> Self {
        Self::horizontal()
    }
}

fn grow_main(size: &mut Size, horizontal: bool, by: i32) {
    if horizontal {
        size.w += by;
    } else {
        size.h += by;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use slotmap::SlotMap;

    use super::*;
    use crate::geometry::SizePolicyPair;

    struct MockWidget {
        hint: Size,
        rect: Rect,
        visible: bool,
        policy: SizePolicyPair,
    }

    #[derive(Default)]
    struct MockHost {
        widgets: HashMap<WidgetId, MockWidget>,
        set_calls: usize,
        grown: Option<(Size, Size)>,
    }

    impl MockHost {
        fn add(&mut self, id: WidgetId, hint: Size) {
            self.widgets.insert(
                id,
                MockWidget {
                    hint,
                    rect: Rect::ZERO,
                    visible: true,
                    policy: SizePolicyPair::default(),
                },
            );
        }

        fn rect(&self, id: WidgetId) -> Rect {
            self.widgets[&id].rect
        }

        fn widget_mut(&mut self, id: WidgetId) -> &mut MockWidget {
            self.widgets.get_mut(&id).unwrap()
        }
    }

    impl LayoutHost for MockHost {
        fn widget_size_hint(&self, id: WidgetId) -> Size {
            self.widgets.get(&id).map_or(Size::ZERO, |w| w.hint)
        }

        fn widget_rect(&self, id: WidgetId) -> Rect {
            self.widgets.get(&id).map_or(Rect::ZERO, |w| w.rect)
        }

        fn widget_visible(&self, id: WidgetId) -> bool {
            self.widgets.get(&id).is_some_and(|w| w.visible)
        }

        fn widget_size_policy(&self, id: WidgetId) -> SizePolicyPair {
            self.widgets.get(&id).map_or_else(SizePolicyPair::default, |w| w.policy)
        }

        fn set_widget_rect(&mut self, id: WidgetId, rect: Rect) {
            self.set_calls += 1;
            if let Some(w) = self.widgets.get_mut(&id) {
                w.rect = rect;
            }
        }

        fn grow_widget(&mut self, id: WidgetId, minimum: Size, size: Size) {
            self.grown = Some((minimum, size));
            if let Some(w) = self.widgets.get_mut(&id) {
                w.rect.w = size.w;
                w.rect.h = size.h;
            }
        }
    }

    // Helper to create test WidgetIds using SlotMap
    fn create_test_ids(count: usize) -> Vec<WidgetId> {
        let mut map: SlotMap<WidgetId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    /// An owner of `size` plus `n` children with the given hint.
    fn setup(size: Size, n: usize, hint: Size) -> (MockHost, WidgetId, Vec<WidgetId>) {
        let ids = create_test_ids(n + 1);
        let mut host = MockHost::default();
        let owner = ids[0];
        host.add(owner, Size::ZERO);
        host.widget_mut(owner).rect = Rect::from_size(size);
        for &id in &ids[1..] {
            host.add(id, hint);
        }
        (host, owner, ids[1..].to_vec())
    }

    #[test]
    fn test_box_layout_creation() {
        let hbox = BoxLayout::horizontal();
        assert_eq!(hbox.direction(), Direction::LeftToRight);
        assert_eq!(hbox.count_items(), 0);
        assert_eq!(hbox.margin(), Margin::ZERO);
        assert_eq!(hbox.spacing(), 0);

        let vbox = BoxLayout::vertical();
        assert!(!vbox.direction().is_horizontal());

        let styled = BoxLayout::with_style(Direction::TopToBottom, &Style::default());
        assert_eq!(styled.spacing(), Style::default().spacing);
    }

    #[test]
    fn test_even_distribution_with_top_alignment() {
        let (mut host, owner, ids) = setup(Size::new(200, 100), 2, Size::new(50, 20));
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        layout.set_spacing(10);
        for &id in &ids {
            layout.add_widget(id, 0, Alignment::TOP);
        }

        layout.run_layout(&mut host, None);

        assert_eq!(host.rect(ids[0]), Rect::new(0, 0, 95, 20));
        assert_eq!(host.rect(ids[1]), Rect::new(105, 0, 95, 20));
        assert!(!layout.is_dirty());
    }

    #[test]
    fn test_items_fill_cross_axis_without_alignment() {
        let (mut host, owner, ids) = setup(Size::new(100, 60), 2, Size::new(10, 10));
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        layout.set_margin(Margin::uniform(5));
        for &id in &ids {
            layout.add_widget(id, 0, Alignment::NONE);
        }

        layout.run_layout(&mut host, None);

        // 90 wide after margins, 70 left over, 35 each.
        assert_eq!(host.rect(ids[0]), Rect::new(5, 5, 45, 50));
        assert_eq!(host.rect(ids[1]), Rect::new(50, 5, 45, 50));
    }

    #[test]
    fn test_stretch_distribution_truncates() {
        let (mut host, owner, ids) = setup(Size::new(100, 10), 3, Size::new(10, 10));
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        for &id in &ids {
            layout.add_widget(id, 1, Alignment::NONE);
        }

        layout.run_layout(&mut host, None);

        // 70 spare over a stretch sum of 3: 23 each, one pixel lost.
        let widths: Vec<i32> = ids.iter().map(|&id| host.rect(id).w).collect();
        assert_eq!(widths, vec![33, 33, 33]);
        assert_eq!(widths.iter().sum::<i32>(), 30 + (70 / 3) * 3);
    }

    #[test]
    fn test_only_stretched_items_grow() {
        let (mut host, owner, ids) = setup(Size::new(100, 10), 2, Size::new(10, 10));
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        layout.add_widget(ids[0], 0, Alignment::NONE);
        layout.add_widget(ids[1], 2, Alignment::NONE);

        layout.run_layout(&mut host, None);

        assert_eq!(host.rect(ids[0]), Rect::new(0, 0, 10, 10));
        assert_eq!(host.rect(ids[1]), Rect::new(10, 0, 90, 10));
    }

    #[test]
    fn test_policy_stretch_used_when_item_has_none() {
        let (mut host, owner, ids) = setup(Size::new(100, 10), 2, Size::new(10, 10));
        host.widget_mut(ids[1]).policy = SizePolicyPair::default().with_stretch(1, 0);
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        layout.add_widget(ids[0], 0, Alignment::NONE);
        layout.add_widget(ids[1], 0, Alignment::NONE);

        layout.run_layout(&mut host, None);

        assert_eq!(host.rect(ids[0]).w, 10);
        assert_eq!(host.rect(ids[1]).w, 90);
    }

    #[test]
    fn test_hidden_items_take_no_space() {
        let (mut host, owner, ids) = setup(Size::new(100, 10), 3, Size::new(10, 10));
        host.widget_mut(ids[0]).visible = false;
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        layout.set_spacing(10);
        for &id in &ids {
            layout.add_widget(id, 1, Alignment::NONE);
        }

        layout.run_layout(&mut host, None);

        // Two visible items share 100 - 10 spacing.
        assert_eq!(host.rect(ids[0]), Rect::ZERO);
        assert_eq!(host.rect(ids[1]), Rect::new(0, 0, 45, 10));
        assert_eq!(host.rect(ids[2]), Rect::new(55, 0, 45, 10));
    }

    #[test]
    fn test_direction_toggle_reverses_placement() {
        let (mut host, owner, ids) = setup(Size::new(30, 10), 3, Size::new(10, 10));
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        for &id in &ids {
            layout.add_widget(id, 0, Alignment::NONE);
        }

        layout.run_layout(&mut host, None);
        assert_eq!(host.rect(ids[0]).x, 0);
        assert_eq!(host.rect(ids[2]).x, 20);

        layout.set_direction(Direction::RightToLeft);
        layout.run_layout(&mut host, None);

        assert_eq!(host.rect(ids[2]).x, 0);
        assert_eq!(host.rect(ids[1]).x, 10);
        assert_eq!(host.rect(ids[0]).x, 20);
        assert_eq!(layout.item_at(0).and_then(LayoutItem::widget), Some(ids[0]));
    }

    #[test]
    fn test_bottom_to_top_places_first_item_last() {
        let (mut host, owner, ids) = setup(Size::new(10, 20), 2, Size::new(10, 10));
        let mut layout = BoxLayout::new(Direction::BottomToTop);
        layout.set_owner(Some(owner));
        for &id in &ids {
            layout.add_widget(id, 0, Alignment::NONE);
        }

        layout.run_layout(&mut host, None);

        assert_eq!(host.rect(ids[1]), Rect::new(0, 0, 10, 10));
        assert_eq!(host.rect(ids[0]), Rect::new(0, 10, 10, 10));
    }

    #[test]
    fn test_second_run_is_noop() {
        let (mut host, owner, ids) = setup(Size::new(100, 10), 2, Size::new(10, 10));
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        for &id in &ids {
            layout.add_widget(id, 0, Alignment::NONE);
        }

        layout.run_layout(&mut host, None);
        let calls = host.set_calls;
        let first: Vec<Rect> = ids.iter().map(|&id| host.rect(id)).collect();

        layout.run_layout(&mut host, None);
        assert_eq!(host.set_calls, calls);
        let second: Vec<Rect> = ids.iter().map(|&id| host.rect(id)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_owner_grows_to_hint() {
        let (mut host, owner, ids) = setup(Size::new(20, 50), 2, Size::new(30, 10));
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        layout.set_spacing(5);
        for &id in &ids {
            layout.add_widget(id, 0, Alignment::NONE);
        }

        layout.run_layout(&mut host, None);

        assert_eq!(host.grown, Some((Size::new(65, 10), Size::new(65, 50))));
        assert_eq!(host.rect(owner).size(), Size::new(65, 50));
        assert_eq!(host.rect(ids[1]), Rect::new(35, 0, 30, 50));
    }

    #[test]
    fn test_size_hint_is_memoized() {
        let (mut host, _owner, ids) = setup(Size::ZERO, 2, Size::new(10, 20));
        let mut layout = BoxLayout::horizontal();
        layout.set_spacing(4);
        layout.set_margin(Margin::new(1, 2, 3, 4));
        for &id in &ids {
            layout.add_widget(id, 0, Alignment::NONE);
        }

        assert_eq!(layout.size_hint(&host), Size::new(10 + 10 + 4 + 4, 20 + 6));

        host.widget_mut(ids[0]).hint = Size::new(100, 100);
        assert_eq!(layout.size_hint(&host), Size::new(28, 26));

        layout.mark_dirty();
        assert_eq!(layout.size_hint(&host), Size::new(118, 106));
    }

    #[test]
    fn test_fixed_policy_uses_current_size() {
        let (mut host, owner, ids) = setup(Size::new(100, 10), 1, Size::new(10, 10));
        host.widget_mut(ids[0]).policy = SizePolicyPair::fixed();
        host.widget_mut(ids[0]).rect = Rect::new(0, 0, 40, 10);
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        layout.add_widget(ids[0], 0, Alignment::LEFT);

        assert_eq!(layout.size_hint(&host), Size::new(40, 10));
        layout.run_layout(&mut host, None);
        assert_eq!(host.rect(ids[0]).w, 40);
    }

    #[test]
    fn test_spacing_swaps_with_axis() {
        let mut layout = BoxLayout::horizontal();
        layout.add_spacing(12);
        layout.add_stretch(1);
        assert_eq!(layout.item_at(0).and_then(LayoutItem::spacer_item).map(SpacerItem::size), Some(Size::new(12, 0)));

        layout.set_direction(Direction::RightToLeft);
        assert_eq!(layout.item_at(0).and_then(LayoutItem::spacer_item).map(SpacerItem::size), Some(Size::new(12, 0)));

        layout.set_direction(Direction::TopToBottom);
        assert_eq!(layout.item_at(0).and_then(LayoutItem::spacer_item).map(SpacerItem::size), Some(Size::new(0, 12)));

        layout.set_direction(Direction::LeftToRight);
        assert_eq!(layout.item_at(0).and_then(LayoutItem::spacer_item).map(SpacerItem::size), Some(Size::new(12, 0)));
    }

    #[test]
    fn test_spacers_take_space_but_no_rect() {
        let (mut host, owner, ids) = setup(Size::new(100, 10), 2, Size::new(10, 10));
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        layout.add_widget(ids[0], 0, Alignment::NONE);
        layout.add_stretch(1);
        layout.add_widget(ids[1], 0, Alignment::NONE);

        layout.run_layout(&mut host, None);

        assert_eq!(host.rect(ids[0]), Rect::new(0, 0, 10, 10));
        assert_eq!(host.rect(ids[1]), Rect::new(90, 0, 10, 10));
        assert_eq!(layout.item_extra(1).map(|e| e.alloc_size.w), Some(80));
    }

    #[test]
    fn test_nested_layout_packs_into_cell() {
        let (mut host, owner, ids) = setup(Size::new(100, 100), 3, Size::new(20, 20));
        let mut inner = BoxLayout::vertical();
        inner.add_widget(ids[1], 0, Alignment::NONE);
        inner.add_widget(ids[2], 0, Alignment::NONE);

        let mut outer = BoxLayout::horizontal();
        outer.set_owner(Some(owner));
        outer.add_widget(ids[0], 0, Alignment::NONE);
        outer.add_layout(inner, 1);

        assert_eq!(outer.size_hint(&host), Size::new(40, 40));
        outer.run_layout(&mut host, None);

        assert_eq!(host.rect(ids[0]), Rect::new(0, 0, 20, 100));
        assert_eq!(host.rect(ids[1]), Rect::new(20, 0, 80, 50));
        assert_eq!(host.rect(ids[2]), Rect::new(20, 50, 80, 50));
        assert_eq!(outer.widgets(), ids);
    }

    #[test]
    fn test_nested_layout_of_hidden_widgets_keeps_its_cell() {
        let (mut host, owner, ids) = setup(Size::new(100, 20), 3, Size::new(20, 20));
        host.widget_mut(ids[1]).visible = false;
        let mut inner = BoxLayout::vertical();
        inner.add_widget(ids[1], 0, Alignment::NONE);

        let mut outer = BoxLayout::horizontal();
        outer.set_owner(Some(owner));
        outer.set_spacing(10);
        outer.add_widget(ids[0], 0, Alignment::NONE);
        outer.add_layout(inner, 0);
        outer.add_widget(ids[2], 0, Alignment::NONE);

        // Three cells share 40 spare pixels and two gaps of spacing.
        assert_eq!(outer.size_hint(&host), Size::new(60, 20));
        outer.run_layout(&mut host, None);

        assert_eq!(host.rect(ids[0]), Rect::new(0, 0, 33, 20));
        assert_eq!(host.rect(ids[2]), Rect::new(66, 0, 33, 20));
        assert_eq!(host.rect(ids[1]), Rect::ZERO);
    }

    #[test]
    fn test_take_item_and_out_of_range() {
        let ids = create_test_ids(2);
        let mut layout = BoxLayout::horizontal();
        layout.add_widget(ids[0], 0, Alignment::NONE);
        layout.add_spacing(4);
        layout.add_widget(ids[1], 0, Alignment::NONE);

        assert!(layout.item_at(3).is_none());
        assert!(layout.take_item(3).is_none());
        assert_eq!(layout.item_index(ids[1]), Some(2));

        let spacer = layout.take_item(1);
        assert!(spacer.is_some_and(|s| s.spacer_item().is_some()));
        assert_eq!(layout.item_index(ids[1]), Some(1));

        assert!(layout.remove_widget(ids[0]));
        assert!(!layout.remove_widget(ids[0]));
        assert_eq!(layout.count_items(), 1);
    }

    #[test]
    fn test_run_hook() {
        let (mut host, owner, ids) = setup(Size::new(100, 10), 1, Size::new(10, 10));
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        layout.add_widget(ids[0], 0, Alignment::NONE);

        layout.run_hook(&mut host, &Event::paint());
        assert_eq!(host.rect(ids[0]).w, 100);
        assert!(!layout.is_dirty());

        layout.run_hook(&mut host, &Event::new(crate::event::EventKind::LayoutRequest));
        assert!(layout.is_dirty());

        host.widget_mut(owner).rect = Rect::new(5, 5, 60, 10);
        layout.run_hook(&mut host, &Event::resized(Size::new(100, 10), Size::new(60, 10)));
        assert_eq!(host.rect(ids[0]), Rect::new(0, 0, 60, 10));
        assert_eq!(layout.rect(), Rect::new(0, 0, 60, 10));
    }

    #[test]
    fn test_empty_layout_run_is_noop() {
        let (mut host, owner, _) = setup(Size::new(10, 10), 0, Size::ZERO);
        let mut layout = BoxLayout::horizontal();
        layout.set_owner(Some(owner));
        layout.run_layout(&mut host, None);
        assert!(layout.is_dirty());
        assert_eq!(host.set_calls, 0);
    }
}
