//! Shared, immutable visual configuration.
//!
//! [`Style`], [`Palette`] and [`Font`] are held behind `Arc`. A widget that
//! needs different values swaps in a new handle; nothing mutates a style in
//! place. `with` builds a modified copy:
//!
//! ```
//! use std::sync::Arc;
//! use trellis::Style;
//!
//! let base = Arc::new(Style::default());
//! let roomy = base.with(|s| s.spacing = 12);
//! assert_eq!(roomy.spacing, 12);
//! assert_eq!(base.spacing, Style::default().spacing);
//! ```

use std::sync::Arc;

use crate::geometry::Margin;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// What a painter fills with.
#[derive(Debug, Clone, PartialEq)]
pub enum Brush {
    Solid(Color),
}

impl Brush {
    pub const TRANSPARENT: Self = Self::Solid(Color::TRANSPARENT);
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}

/// Role-based brushes consulted while painting.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Window background.
    pub window: Brush,
    /// Foreground text.
    pub text: Brush,
    /// Button face.
    pub button: Brush,
    /// Selection highlight.
    pub highlight: Brush,
    /// Outline drawn around widgets when debugging layouts.
    pub debug_outline: Brush,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            window: Color::rgb(0xef, 0xef, 0xef).into(),
            text: Color::BLACK.into(),
            button: Color::rgb(0xe1, 0xe1, 0xe1).into(),
            highlight: Color::rgb(0x30, 0x8c, 0xc6).into(),
            debug_outline: Color::RED.into(),
        }
    }
}

impl Palette {
    /// A modified copy.
    pub fn with(self: &Arc<Self>, f: impl FnOnce(&mut Palette)) -> Arc<Palette> {
        let mut palette = Palette::clone(self);
        f(&mut palette);
        Arc::new(palette)
    }
}

/// Geometry constants shared by widgets and layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Fallback window width when nothing else sizes a new window.
    pub window_width: i32,
    /// Fallback window height when nothing else sizes a new window.
    pub window_height: i32,
    pub button_width: i32,
    pub button_height: i32,
    /// Margin used by layouts created with [`BoxLayout::with_style`].
    ///
    /// [`BoxLayout::with_style`]: crate::BoxLayout::with_style
    pub margin: i32,
    /// Spacing used by layouts created with [`BoxLayout::with_style`].
    ///
    /// [`BoxLayout::with_style`]: crate::BoxLayout::with_style
    pub spacing: i32,
    pub icon_size: i32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            window_width: 640,
            window_height: 480,
            button_width: 88,
            button_height: 32,
            margin: 2,
            spacing: 2,
            icon_size: 20,
        }
    }
}

impl Style {
    /// A modified copy.
    pub fn with(self: &Arc<Self>, f: impl FnOnce(&mut Style)) -> Arc<Style> {
        let mut style = Style::clone(self);
        f(&mut style);
        Arc::new(style)
    }

    /// `margin` on every edge.
    pub fn margins(&self) -> Margin {
        Margin::uniform(self.margin)
    }
}

/// A font description. Shaping and measurement belong to the text backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: Arc<str>,
    pub point_size: f32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: Arc::from("sans-serif"),
            point_size: 12.0,
        }
    }
}

impl Font {
    pub fn new(family: &str, point_size: f32) -> Self {
        Self {
            family: Arc::from(family),
            point_size,
        }
    }
}

static_assertions::assert_impl_all!(Arc<Style>: Send, Sync);
static_assertions::assert_impl_all!(Arc<Palette>: Send, Sync);
