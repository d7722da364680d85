//! Draw slides into an off-screen RGBA frame.
//!
//! The frame lives with the controller. Once a slide has been drawn the
//! frame is handed to a [`FrameSink`], which is whatever actually puts it on
//! screen.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use ab_glyph::{point, Font, FontVec, PxScale, PxScaleFont, ScaleFont};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::{debug, info};

use super::{fit_inside, RenderTarget, Renderer};
use crate::error::{Error, RenderError, Result};
use crate::slideshow::{Color, Slide};

/// Fonts tried, in order, when none is given on the command line.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
    "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The line height can take up to this share of the frame height...
const LINE_HEIGHT_RATIO: f32 = 0.8;
/// ...and the line up to this share of its width.
const LINE_WIDTH_RATIO: f32 = 0.9;
/// Below this size (in pixels) the text is considered unreadable.
const MIN_TEXT_PX: f32 = 4.0;

/// Load the font at `path`, or the first usable system font.
pub fn load_font(path: Option<&Path>) -> Result<FontVec> {
    if let Some(path) = path {
        return read_font(path);
    }
    for candidate in FONT_CANDIDATES.iter().map(Path::new) {
        if !candidate.is_file() {
            continue;
        }
        match read_font(candidate) {
            Ok(font) => return Ok(font),
            Err(e) => debug!("Skipping font candidate: {}", e),
        }
    }
    Err(Error::FontUnavailable)
}

fn read_font(path: &Path) -> Result<FontVec> {
    let font_error = |reason: String| Error::Font {
        path: PathBuf::from(path),
        reason,
    };
    let bytes = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
    let font =
        FontVec::try_from_vec(bytes).map_err(|e| font_error(e.to_string()))?;
    info!("Using font {}", path.display());
    Ok(font)
}

/// The size of the area frames are shown in.
/// Written by the platform, read by the controller when it clears a frame.
#[derive(Debug)]
pub struct Viewport {
    width: AtomicU32,
    height: AtomicU32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Viewport {
            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
        }
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (
            self.width.load(Ordering::Relaxed),
            self.height.load(Ordering::Relaxed),
        )
    }

    pub fn set(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::Relaxed);
        self.height.store(height, Ordering::Relaxed);
    }
}

/// Where finished frames go.
pub trait FrameSink {
    fn show(&mut self, frame: &RgbaImage) -> std::result::Result<(), RenderError>;
    /// Switch fullscreen on or off. Once this returns, the viewport holds
    /// the new size.
    fn set_fullscreen(
        &mut self,
        fullscreen: bool,
    ) -> std::result::Result<(), RenderError>;
}

/// An RGBA frame, resized to the viewport on every clear.
pub struct FrameTarget<S> {
    frame: RgbaImage,
    viewport: Arc<Viewport>,
    sink: S,
}

impl<S: FrameSink> FrameTarget<S> {
    #[must_use]
    pub fn new(viewport: Arc<Viewport>, sink: S) -> Self {
        FrameTarget {
            frame: RgbaImage::new(0, 0),
            viewport,
            sink,
        }
    }

    #[must_use]
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut RgbaImage {
        &mut self.frame
    }
}

impl<S: FrameSink> RenderTarget for FrameTarget<S> {
    fn clear(&mut self, color: Color) -> std::result::Result<(), RenderError> {
        let (w, h) = self.viewport.size();
        if self.frame.dimensions() == (w, h) {
            let color: Rgba<u8> = color.into();
            self.frame.pixels_mut().for_each(|p| *p = color);
        } else {
            debug!("New frame size: {}x{}", w, h);
            self.frame = RgbaImage::from_pixel(w, h, color.into());
        }
        Ok(())
    }

    fn set_fullscreen(
        &mut self,
        fullscreen: bool,
    ) -> std::result::Result<(), RenderError> {
        self.sink.set_fullscreen(fullscreen)
    }

    fn present(&mut self) -> std::result::Result<(), RenderError> {
        self.sink.show(&self.frame)
    }
}

/// Draws text as big as it fits, and pictures zoomed to fit, both centred.
pub struct FrameRenderer {
    font: FontVec,
    text_color: Color,
}

impl FrameRenderer {
    #[must_use]
    pub fn new(font: FontVec) -> Self {
        FrameRenderer {
            font,
            text_color: Color::BLACK,
        }
    }
}

impl<S: FrameSink> Renderer<FrameTarget<S>> for FrameRenderer {
    fn render(
        &mut self,
        slide: &Slide,
        target: &mut FrameTarget<S>,
    ) -> std::result::Result<(), RenderError> {
        match slide {
            Slide::Text(text) => {
                draw_text(&self.font, text, self.text_color, target.frame_mut())
            }
            Slide::Image(img) => {
                draw_image(img.pixels(), target.frame_mut());
                Ok(())
            }
        }
    }
}

fn line_width<F: Font>(font: &PxScaleFont<&F>, text: &str) -> f32 {
    let mut width = 0.0;
    let mut prev = None;
    for c in text.chars() {
        let id = font.glyph_id(c);
        if let Some(prev) = prev {
            width += font.kern(prev, id);
        }
        width += font.h_advance(id);
        prev = Some(id);
    }
    width
}

/// The biggest scale at which `text` fits a `width`x`height` frame.
#[allow(clippy::cast_precision_loss)]
fn fit_text<F: Font>(
    font: &F,
    text: &str,
    width: u32,
    height: u32,
) -> Option<PxScale> {
    let mut size = height as f32 * LINE_HEIGHT_RATIO;
    let line = line_width(&font.as_scaled(PxScale::from(size)), text);
    let max_width = width as f32 * LINE_WIDTH_RATIO;
    if line > max_width {
        size *= max_width / line;
    }
    (size >= MIN_TEXT_PX).then(|| PxScale::from(size))
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn draw_text<F: Font>(
    font: &F,
    text: &str,
    color: Color,
    frame: &mut RgbaImage,
) -> std::result::Result<(), RenderError> {
    let (width, height) = frame.dimensions();
    let scale = fit_text(font, text, width, height).ok_or_else(|| {
        RenderError::TextTooLarge {
            text: text.to_owned(),
            width,
            height,
        }
    })?;
    let scaled = font.as_scaled(scale);
    let x_start = (width as f32 - line_width(&scaled, text)) / 2.0;
    let baseline = (height as f32 - scaled.height()) / 2.0 + scaled.ascent();

    let mut caret = point(x_start, baseline);
    let mut prev = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            caret.x += scaled.kern(prev, id);
        }
        prev = Some(id);
        let glyph = id.with_scale_and_position(scale, caret);
        caret.x += scaled.h_advance(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            // Whitespace, or a glyph the font does not have.
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|x, y, coverage| {
            let px = bounds.min.x as i64 + i64::from(x);
            let py = bounds.min.y as i64 + i64::from(y);
            if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height)
            {
                return;
            }
            blend(frame.get_pixel_mut(px as u32, py as u32), color, coverage);
        });
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(dst: &mut Rgba<u8>, color: Color, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * f32::from(color.a) / 255.0;
    for (d, s) in dst.0.iter_mut().zip([color.r, color.g, color.b]) {
        *d = (f32::from(*d) * (1.0 - alpha) + f32::from(s) * alpha).round()
            as u8;
    }
}

/// Zoom `pixels` to fit the frame, keeping its aspect ratio, and paste it in
/// the middle.
pub fn draw_image(pixels: &RgbaImage, frame: &mut RgbaImage) {
    let (fw, fh) = frame.dimensions();
    let (w, h) = fit_inside(pixels.width(), pixels.height(), fw, fh);
    if w == 0 || h == 0 {
        return;
    }
    let zoomed = if (w, h) == pixels.dimensions() {
        pixels.clone()
    } else {
        imageops::resize(pixels, w, h, FilterType::Triangle)
    };
    let x = i64::from((fw - w) / 2);
    let y = i64::from((fh - h) / 2);
    imageops::overlay(frame, &zoomed, x, y);
}

#[cfg(test)]
mod test {
    use std::io::Write;
    use std::sync::Mutex;

    use super::*;

    /// Load and a file and check its existence.
    macro_rules! load_exists {
        ($f:expr) => {{
            let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            d.push($f);
            assert!(d.exists());
            d
        }};
    }

    fn fixture_font() -> FontVec {
        let path = load_exists!("resources/DejaVuSansMono.ttf");
        load_font(Some(&path)).expect("the fixture font loads")
    }

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[derive(Default)]
    struct Recorder {
        frames: Arc<Mutex<Vec<RgbaImage>>>,
        fullscreen: Option<bool>,
    }

    impl FrameSink for Recorder {
        fn show(
            &mut self,
            frame: &RgbaImage,
        ) -> std::result::Result<(), RenderError> {
            self.frames.lock().unwrap().push(frame.clone());
            Ok(())
        }

        fn set_fullscreen(
            &mut self,
            fullscreen: bool,
        ) -> std::result::Result<(), RenderError> {
            self.fullscreen = Some(fullscreen);
            Ok(())
        }
    }

    #[test]
    fn test_clear_follows_viewport() {
        let viewport = Arc::new(Viewport::new(4, 3));
        let mut target = FrameTarget::new(viewport.clone(), Recorder::default());
        target.clear(Color::WHITE).unwrap();
        assert_eq!(target.frame().dimensions(), (4, 3));
        assert!(target.frame().pixels().all(|p| *p == WHITE));

        viewport.set(8, 2);
        target.clear(Color::BLACK).unwrap();
        assert_eq!(target.frame().dimensions(), (8, 2));
        assert!(target.frame().pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn test_present_and_fullscreen_go_to_sink() {
        let recorder = Recorder::default();
        let frames = recorder.frames.clone();
        let mut target = FrameTarget::new(Arc::new(Viewport::new(2, 2)), recorder);
        target.clear(Color::WHITE).unwrap();
        target.present().unwrap();
        target.set_fullscreen(true).unwrap();
        assert_eq!(frames.lock().unwrap().len(), 1);
        assert_eq!(target.sink.fullscreen, Some(true));
    }

    #[test]
    fn test_image_is_zoomed_and_centred() {
        let img = RgbaImage::from_pixel(2, 1, RED);
        let mut frame = RgbaImage::from_pixel(100, 100, WHITE);
        draw_image(&img, &mut frame);
        // 2x1 becomes 100x50, starting at y = 25.
        assert_eq!(*frame.get_pixel(50, 50), RED);
        assert_eq!(*frame.get_pixel(0, 25), RED);
        assert_eq!(*frame.get_pixel(99, 74), RED);
        assert_eq!(*frame.get_pixel(50, 10), WHITE);
        assert_eq!(*frame.get_pixel(50, 90), WHITE);
    }

    #[test]
    fn test_image_on_empty_frame() {
        let img = RgbaImage::from_pixel(2, 2, RED);
        let mut frame = RgbaImage::new(0, 0);
        draw_image(&img, &mut frame);
        assert_eq!(frame.dimensions(), (0, 0));
    }

    #[test]
    fn test_blend() {
        let mut px = WHITE;
        blend(&mut px, Color::BLACK, 1.0);
        assert_eq!(px, Rgba([0, 0, 0, 255]));
        let mut px = WHITE;
        blend(&mut px, Color::BLACK, 0.0);
        assert_eq!(px, WHITE);
    }

    #[test]
    fn test_bad_font() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a font").unwrap();
        assert!(matches!(
            load_font(Some(file.path())),
            Err(Error::Font { .. })
        ));
        assert!(matches!(
            load_font(Some(Path::new("/non/existing/font.ttf"))),
            Err(Error::Font { .. })
        ));
    }

    #[test]
    fn test_text_is_drawn_centred() {
        let font = fixture_font();
        let mut frame = RgbaImage::from_pixel(200, 100, WHITE);
        draw_text(&font, "Hello", Color::BLACK, &mut frame).unwrap();
        let dark: Vec<(u32, u32)> = frame
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] < 128)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!dark.is_empty());
        // Some ink on both halves: the line is centred.
        assert!(dark.iter().any(|(x, _)| *x < 100));
        assert!(dark.iter().any(|(x, _)| *x >= 100));
        // Nothing in the side margins, give or take antialiasing.
        assert!(dark.iter().all(|(x, _)| *x >= 5 && *x <= 195));
    }

    #[test]
    fn test_text_too_large() {
        let font = fixture_font();
        let mut frame = RgbaImage::from_pixel(3, 3, WHITE);
        assert!(matches!(
            draw_text(&font, "way too long", Color::BLACK, &mut frame),
            Err(RenderError::TextTooLarge { .. })
        ));
    }
}
