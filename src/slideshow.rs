//! The slideshow definition.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use crate::error::{Error, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
    pub const BLACK: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };
}

impl From<Color> for image::Rgba<u8> {
    fn from(c: Color) -> Self {
        image::Rgba([c.r, c.g, c.b, c.a])
    }
}

/// A decoded picture, shared between the slide set and whoever draws it.
#[derive(Clone, PartialEq)]
pub struct SlideImage {
    path: PathBuf,
    pixels: Arc<RgbaImage>,
}

impl SlideImage {
    #[must_use]
    pub fn new(path: PathBuf, pixels: RgbaImage) -> Self {
        SlideImage {
            path,
            pixels: Arc::new(pixels),
        }
    }

    /// Where the picture was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

// The pixel buffer is far too large to be useful in logs.
impl fmt::Debug for SlideImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.pixels.dimensions();
        f.debug_struct("SlideImage")
            .field("path", &self.path)
            .field("size", &format_args!("{w}x{h}"))
            .finish()
    }
}

/// The representation of a single slide: either a line of text, or a picture.
#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    Text(String),
    Image(SlideImage),
}

impl Slide {
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Slide::Text(text) => Some(text),
            Slide::Image(_) => None,
        }
    }

    #[must_use]
    pub fn image(&self) -> Option<&SlideImage> {
        match self {
            Slide::Text(_) => None,
            Slide::Image(img) => Some(img),
        }
    }
}

/// The whole, ordered, set of slides to present.
/// It can't be empty, and can't be changed once built.
#[derive(Debug, Clone)]
pub struct SlideSet {
    slides: Vec<Slide>,
}

impl SlideSet {
    /// Build the set, refusing an empty one.
    pub fn new(slides: Vec<Slide>) -> Result<SlideSet> {
        if slides.is_empty() {
            return Err(Error::EmptySlideSet);
        }
        Ok(SlideSet { slides })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false, kept for clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }
}

/// The slide set plus the slide being shown.
///
/// All the index arithmetic lives here and is clamped, so the index is
/// always valid: `0 <= index < len`.
#[derive(Debug)]
pub struct SlideStore {
    slides: SlideSet,
    idx: usize,
}

impl SlideStore {
    #[must_use]
    pub fn new(slides: SlideSet) -> Self {
        SlideStore { slides, idx: 0 }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.idx
    }

    #[must_use]
    pub fn slides(&self) -> &SlideSet {
        &self.slides
    }

    /// The slide at the current index.
    #[must_use]
    pub fn current(&self) -> &Slide {
        // idx is kept in bounds and the set is never empty.
        &self.slides.slides[self.idx]
    }

    pub fn first(&mut self) {
        self.idx = 0;
    }

    pub fn last(&mut self) {
        self.idx = self.slides.len() - 1;
    }

    pub fn next(&mut self) {
        if self.idx < self.slides.len() - 1 {
            self.idx += 1;
        }
    }

    pub fn prev(&mut self) {
        self.idx = self.idx.saturating_sub(1);
    }
}
