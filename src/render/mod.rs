//! What the controller draws with.
//!
//! The controller only knows about a [`RenderTarget`] (a surface it can clear,
//! flip to fullscreen and present) and a [`Renderer`] able to draw a
//! [`Slide`] on that target. Both are handed to the controller when it is
//! built.

pub mod frame;
#[cfg(feature = "cterm")]
pub mod terminal;

use crate::error::RenderError;
use crate::slideshow::{Color, Slide};

/// A surface owned by the controller.
pub trait RenderTarget {
    /// Fill the whole surface with `color`.
    fn clear(&mut self, color: Color) -> Result<(), RenderError>;
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), RenderError>;
    /// Show what was drawn since the last `clear`.
    fn present(&mut self) -> Result<(), RenderError>;
}

/// Draw one slide on a target.
pub trait Renderer<T: RenderTarget> {
    fn render(&mut self, slide: &Slide, target: &mut T)
        -> Result<(), RenderError>;
}

/// Fit `(w, h)` inside `(max_w, max_h)` keeping the aspect ratio, zooming in
/// or out as needed. Never returns a zero sized box for non-empty inputs.
#[must_use]
pub fn fit_inside(w: u32, h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if w == 0 || h == 0 || max_w == 0 || max_h == 0 {
        return (0, 0);
    }
    let zoom = f64::min(
        f64::from(max_w) / f64::from(w),
        f64::from(max_h) / f64::from(h),
    );
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = |v: u32, max: u32| {
        ((f64::from(v) * zoom).round() as u32).clamp(1, max)
    };
    (scaled(w, max_w), scaled(h, max_h))
}
