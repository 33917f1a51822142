//! Box layouts driven through a widget tree.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use trellis::{
    Alignment, BoxLayout, Direction, Event, FixedHint, Rect, Size, SizePolicyPair, Style,
    WidgetCx, WidgetHandler, WidgetId, WidgetTree,
};

/// A fixed hint that counts how often it is resized.
struct Counted {
    hint: Size,
    resizes: Arc<AtomicUsize>,
}

impl WidgetHandler for Counted {
    fn size_hint(&self, _style: &Style) -> Size {
        self.hint
    }

    fn resize_event(&mut self, _cx: &mut WidgetCx<'_>, _event: &mut Event) -> bool {
        self.resizes.fetch_add(1, Ordering::SeqCst);
        false
    }
}

fn setup() -> (WidgetTree, WidgetId) {
    let mut tree = WidgetTree::new();
    let root = tree.create(None, ()).unwrap();
    (tree, root)
}

fn button(tree: &mut WidgetTree, root: WidgetId, w: i32, h: i32) -> WidgetId {
    tree.create(Some(root), FixedHint(Size::new(w, h))).unwrap()
}

#[test]
fn test_single_button_fills_window() {
    let (mut tree, root) = setup();
    let ok = button(&mut tree, root, 50, 20);
    let mut layout = BoxLayout::horizontal();
    layout.add_widget(ok, 0, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();

    tree.resize(root, 200, 100);

    assert_eq!(tree.rect(ok), Some(Rect::new(0, 0, 200, 100)));
    assert_eq!(tree.size(root), Size::new(200, 100));
}

#[test]
fn test_two_buttons_share_spare_space() {
    let (mut tree, root) = setup();
    let b1 = button(&mut tree, root, 50, 20);
    let b2 = button(&mut tree, root, 50, 20);
    let mut layout = BoxLayout::horizontal();
    layout.set_spacing(10);
    layout.add_widget(b1, 0, Alignment::NONE);
    layout.add_widget(b2, 0, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();

    tree.resize(root, 200, 100);

    // 200 - 50 - 50 - 10 leaves 90, split evenly.
    let r1 = tree.rect(b1).unwrap();
    let r2 = tree.rect(b2).unwrap();
    assert_eq!(r1, Rect::new(0, 0, 95, 100));
    assert_eq!(r2.x, r1.x + r1.w + 10);
    assert_eq!(r2.w, 95);

    // Snapped to the hint on the cross axis, the buttons keep their height.
    let layout = tree.layout_mut(root).unwrap();
    for idx in 0..layout.count_items() {
        layout.item_at_mut(idx).unwrap().set_alignment(Alignment::TOP);
    }
    tree.run_layout(root);
    assert_eq!(tree.rect(b1), Some(Rect::new(0, 0, 95, 20)));
}

#[test]
fn test_stretch_remainder_is_dropped() {
    let (mut tree, root) = setup();
    let a = button(&mut tree, root, 10, 20);
    let b = button(&mut tree, root, 10, 20);
    let mut layout = BoxLayout::vertical();
    layout.add_widget(a, 1, Alignment::NONE);
    layout.add_widget(b, 2, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();

    tree.resize(root, 30, 90);

    // 50 spare pixels over a stretch sum of 3: 16 per unit, 2 left over.
    assert_eq!(tree.rect(a), Some(Rect::new(0, 0, 30, 36)));
    assert_eq!(tree.rect(b), Some(Rect::new(0, 36, 30, 52)));
}

#[test]
fn test_clean_layout_does_not_touch_widgets() {
    let (mut tree, root) = setup();
    let resizes = Arc::new(AtomicUsize::new(0));
    let child = tree
        .create(
            Some(root),
            Counted {
                hint: Size::new(10, 10),
                resizes: resizes.clone(),
            },
        )
        .unwrap();
    let mut layout = BoxLayout::horizontal();
    layout.add_widget(child, 0, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();
    tree.resize(root, 100, 40);
    let after_first = resizes.load(Ordering::SeqCst);
    assert!(after_first > 0);

    tree.handle(root, &mut Event::paint());
    tree.run_layout(root);
    tree.show(root);
    assert_eq!(resizes.load(Ordering::SeqCst), after_first);
    assert_eq!(tree.rect(child), Some(Rect::new(0, 0, 100, 40)));
}

#[test]
fn test_direction_round_trip_restores_placement() {
    let (mut tree, root) = setup();
    let a = button(&mut tree, root, 10, 10);
    let b = button(&mut tree, root, 30, 10);
    let mut layout = BoxLayout::horizontal();
    layout.add_widget(a, 0, Alignment::NONE);
    layout.add_spacing(6);
    layout.add_widget(b, 0, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();
    tree.resize(root, 100, 20);
    let before = (tree.rect(a), tree.rect(b));

    tree.layout_mut(root).unwrap().set_direction(Direction::RightToLeft);
    tree.run_layout(root);
    let reversed = (tree.rect(a), tree.rect(b));
    assert_ne!(reversed, before);
    assert!(reversed.0.unwrap().x > reversed.1.unwrap().x);

    tree.layout_mut(root).unwrap().set_direction(Direction::LeftToRight);
    tree.run_layout(root);
    assert_eq!((tree.rect(a), tree.rect(b)), before);
}

#[test]
fn test_right_to_left_flips_placement_not_order() {
    let (mut tree, root) = setup();
    let a = button(&mut tree, root, 10, 10);
    let b = button(&mut tree, root, 10, 10);
    let c = button(&mut tree, root, 10, 10);
    let mut layout = BoxLayout::horizontal();
    for id in [a, b, c] {
        layout.add_widget(id, 0, Alignment::NONE);
    }
    tree.attach_layout(root, layout).unwrap();
    tree.resize(root, 30, 10);
    assert_eq!(tree.rect(a).map(|r| r.x), Some(0));

    tree.layout_mut(root).unwrap().set_direction(Direction::RightToLeft);
    tree.run_layout(root);

    assert_eq!(tree.rect(c).map(|r| r.x), Some(0));
    assert_eq!(tree.rect(b).map(|r| r.x), Some(10));
    assert_eq!(tree.rect(a).map(|r| r.x), Some(20));
    let first = tree.layout(root).and_then(|l| l.item_at(0)).and_then(|i| i.widget());
    assert_eq!(first, Some(a));
}

#[test]
fn test_axis_change_keeps_spacing_on_main_axis() {
    let (mut tree, root) = setup();
    let a = button(&mut tree, root, 10, 10);
    let b = button(&mut tree, root, 10, 10);
    let mut layout = BoxLayout::horizontal();
    layout.add_widget(a, 1, Alignment::NONE);
    layout.add_spacing(20);
    layout.add_widget(b, 1, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();

    tree.layout_mut(root).unwrap().set_direction(Direction::TopToBottom);
    tree.resize(root, 40, 100);

    // Spare: 100 - 10 - 20 - 10 = 60, split over two stretch units.
    assert_eq!(tree.rect(a), Some(Rect::new(0, 0, 40, 40)));
    assert_eq!(tree.rect(b), Some(Rect::new(0, 60, 40, 40)));
}

#[test]
fn test_style_margin_and_spacing() {
    let (mut tree, root) = setup();
    let a = button(&mut tree, root, 10, 10);
    let b = button(&mut tree, root, 10, 10);
    let mut layout = BoxLayout::with_style(Direction::TopToBottom, &Style::default());
    layout.add_widget(a, 0, Alignment::NONE);
    layout.add_widget(b, 0, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();

    tree.resize(root, 100, 100);

    assert_eq!(tree.rect(a), Some(Rect::new(2, 2, 96, 47)));
    assert_eq!(tree.rect(b), Some(Rect::new(2, 51, 96, 47)));
}

#[test]
fn test_aligned_widget_keeps_its_hint() {
    let (mut tree, root) = setup();
    let icon = button(&mut tree, root, 20, 10);
    let mut layout = BoxLayout::horizontal();
    layout.add_widget(icon, 0, Alignment::CENTER | Alignment::MIDDLE);
    tree.attach_layout(root, layout).unwrap();

    tree.resize(root, 100, 50);

    assert_eq!(tree.rect(icon), Some(Rect::new(40, 20, 20, 10)));
}

#[test]
fn test_policy_stretch_grows_only_that_widget() {
    let (mut tree, root) = setup();
    let a = button(&mut tree, root, 10, 10);
    let b = button(&mut tree, root, 10, 10);
    tree.set_size_policy(a, SizePolicyPair::default().with_stretch(1, 0));
    let mut layout = BoxLayout::horizontal();
    layout.add_widget(a, 0, Alignment::NONE);
    layout.add_widget(b, 0, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();

    tree.resize(root, 100, 10);

    assert_eq!(tree.rect(a).map(|r| r.w), Some(90));
    assert_eq!(tree.rect(b), Some(Rect::new(90, 0, 10, 10)));
}

#[test]
fn test_nested_layout_fills_its_cell() {
    let (mut tree, root) = setup();
    let left = button(&mut tree, root, 30, 10);
    let other = tree.create(None, ()).unwrap();
    let top = button(&mut tree, other, 10, 10);
    let bottom = button(&mut tree, other, 10, 10);

    let mut column = BoxLayout::vertical();
    column.add_widget(top, 0, Alignment::NONE);
    column.add_widget(bottom, 0, Alignment::NONE);
    let mut row = BoxLayout::horizontal();
    row.add_widget(left, 0, Alignment::NONE);
    row.add_layout(column, 0);
    tree.attach_layout(root, row).unwrap();

    // Nested widgets move under the owner of the layout tree.
    assert_eq!(tree.parent(top), Some(root));
    assert_eq!(tree.parent(bottom), Some(root));

    tree.resize(root, 100, 40);

    assert_eq!(tree.rect(left), Some(Rect::new(0, 0, 60, 40)));
    assert_eq!(tree.rect(top), Some(Rect::new(60, 0, 40, 20)));
    assert_eq!(tree.rect(bottom), Some(Rect::new(60, 20, 40, 20)));
}

#[test]
fn test_destroyed_widget_leaves_layout() {
    let (mut tree, root) = setup();
    let a = button(&mut tree, root, 10, 10);
    let b = button(&mut tree, root, 10, 10);
    let mut layout = BoxLayout::horizontal();
    layout.add_widget(a, 0, Alignment::NONE);
    layout.add_widget(b, 0, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();
    tree.resize(root, 100, 10);

    tree.destroy(b).unwrap();
    assert_eq!(tree.layout(root).map(BoxLayout::count_items), Some(1));

    tree.run_layout(root);
    assert_eq!(tree.rect(a), Some(Rect::new(0, 0, 100, 10)));
}

#[test]
fn test_size_hint_comes_from_layout() {
    let (mut tree, root) = setup();
    let a = button(&mut tree, root, 40, 10);
    let b = button(&mut tree, root, 20, 30);
    let mut layout = BoxLayout::horizontal();
    layout.set_spacing(5);
    layout.add_widget(a, 0, Alignment::NONE);
    layout.add_widget(b, 0, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();

    assert_eq!(tree.size_hint(root), Size::new(65, 30));
    assert_eq!(tree.adjust_size(root), Size::new(65, 30));
    assert_eq!(tree.size(root), Size::new(65, 30));
}

#[test]
fn test_take_layout_detaches_it() {
    let (mut tree, root) = setup();
    let a = button(&mut tree, root, 10, 10);
    let mut layout = BoxLayout::horizontal();
    layout.add_widget(a, 0, Alignment::NONE);
    tree.attach_layout(root, layout).unwrap();
    assert_eq!(tree.layout(root).and_then(BoxLayout::owner), Some(root));

    let taken = tree.take_layout(root).unwrap();
    assert_eq!(taken.owner(), None);
    assert!(tree.layout(root).is_none());

    tree.resize(root, 100, 100);
    assert_eq!(tree.rect(a), Some(Rect::ZERO));
}
