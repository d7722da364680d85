//! Draw slides in a terminal.
//!
//! Text goes on the middle row. Pictures are drawn with "upper half block"
//! cells, so each cell shows two pixels: the foreground colour is the top
//! one, the background colour the bottom one. Fullscreen is the terminal's
//! alternate screen.

use std::io::Write;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::{error, trace};
use unicode_width::UnicodeWidthStr;

use super::{fit_inside, RenderTarget, Renderer};
use crate::error::RenderError;
use crate::slideshow::{Color, Slide};

const UPPER_HALF_BLOCK: char = '\u{2580}';

impl From<Color> for crossterm::style::Color {
    fn from(c: Color) -> Self {
        crossterm::style::Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

/// A terminal, seen as a grid of `cols`x`rows` cells.
pub struct TerminalTarget<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
    /// Set when the size must not follow the real terminal.
    fixed_size: bool,
    fullscreen: bool,
    background: Color,
}

impl<W: Write> TerminalTarget<W> {
    pub fn new(out: W) -> Self {
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        TerminalTarget {
            out,
            cols,
            rows,
            fixed_size: false,
            fullscreen: false,
            background: Color::WHITE,
        }
    }

    /// Pin the grid size instead of asking the terminal.
    #[must_use]
    pub fn with_size(mut self, cols: u16, rows: u16) -> Self {
        self.cols = cols;
        self.rows = rows;
        self.fixed_size = true;
        self
    }

    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// The colour the grid was last cleared with.
    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> RenderTarget for TerminalTarget<W> {
    fn clear(&mut self, color: Color) -> Result<(), RenderError> {
        if !self.fixed_size {
            match terminal::size() {
                Ok((cols, rows)) => (self.cols, self.rows) = (cols, rows),
                Err(e) => trace!("Keeping the old terminal size: {}", e),
            }
        }
        self.background = color;
        queue!(
            self.out,
            Hide,
            SetBackgroundColor(color.into()),
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), RenderError> {
        if fullscreen {
            queue!(self.out, EnterAlternateScreen)?;
        } else {
            queue!(self.out, LeaveAlternateScreen)?;
        }
        self.fullscreen = fullscreen;
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for TerminalTarget<W> {
    fn drop(&mut self) {
        let res = if self.fullscreen {
            execute!(self.out, ResetColor, Show, LeaveAlternateScreen)
        } else {
            execute!(self.out, ResetColor, Show)
        };
        if let Err(e) = res {
            error!("Unable to restore the terminal: {}", e);
        }
    }
}

/// Black text centred on the middle row, pictures zoomed to fit.
pub struct TerminalRenderer {
    text_color: Color,
}

impl TerminalRenderer {
    #[must_use]
    pub fn new() -> Self {
        TerminalRenderer {
            text_color: Color::BLACK,
        }
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Renderer<TerminalTarget<W>> for TerminalRenderer {
    fn render(
        &mut self,
        slide: &Slide,
        target: &mut TerminalTarget<W>,
    ) -> Result<(), RenderError> {
        let (cols, rows) = target.size();
        let background = target.background();
        match slide {
            Slide::Text(text) => {
                // Columns, not chars: wide glyphs take two cells.
                let width = text.width();
                if width > usize::from(cols) || rows == 0 {
                    return Err(RenderError::TextTooLarge {
                        text: text.clone(),
                        width: u32::from(cols),
                        height: u32::from(rows),
                    });
                }
                #[allow(clippy::cast_possible_truncation)]
                let x = (cols - width as u16) / 2;
                queue!(
                    target.writer(),
                    MoveTo(x, rows / 2),
                    SetForegroundColor(self.text_color.into()),
                    SetBackgroundColor(background.into()),
                    Print(text)
                )?;
                Ok(())
            }
            Slide::Image(img) => draw_image(
                target.writer(),
                img.pixels(),
                (cols, rows),
                background,
            ),
        }
    }
}

/// Flatten a pixel over the background.
fn over(px: image::Rgba<u8>, background: Color) -> Color {
    let [r, g, b, a] = px.0;
    let mix = |c: u8, bg: u8| {
        let (c, bg, a) = (u32::from(c), u32::from(bg), u32::from(a));
        #[allow(clippy::cast_possible_truncation)]
        let v = ((c * a + bg * (255 - a)) / 255) as u8;
        v
    };
    Color {
        r: mix(r, background.r),
        g: mix(g, background.g),
        b: mix(b, background.b),
        a: 255,
    }
}

fn draw_image<W: Write>(
    out: &mut W,
    pixels: &RgbaImage,
    (cols, rows): (u16, u16),
    background: Color,
) -> Result<(), RenderError> {
    let (w, h) = fit_inside(
        pixels.width(),
        pixels.height(),
        u32::from(cols),
        u32::from(rows) * 2,
    );
    if w == 0 || h == 0 {
        return Ok(());
    }
    let zoomed = imageops::resize(pixels, w, h, FilterType::Triangle);
    let cell_rows = h.div_ceil(2);
    // Both fit in the grid, so they fit in a u16.
    #[allow(clippy::cast_possible_truncation)]
    let (x0, y0) = (
        ((u32::from(cols) - w) / 2) as u16,
        ((u32::from(rows) - cell_rows) / 2) as u16,
    );
    for cell_row in 0..cell_rows {
        #[allow(clippy::cast_possible_truncation)]
        let y = y0 + cell_row as u16;
        queue!(out, MoveTo(x0, y))?;
        for x in 0..w {
            let top = over(*zoomed.get_pixel(x, cell_row * 2), background);
            let bottom = if cell_row * 2 + 1 < h {
                over(*zoomed.get_pixel(x, cell_row * 2 + 1), background)
            } else {
                background
            };
            queue!(
                out,
                SetForegroundColor(top.into()),
                SetBackgroundColor(bottom.into()),
                Print(UPPER_HALF_BLOCK)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;
    use crate::slideshow::SlideImage;

    fn target() -> TerminalTarget<Vec<u8>> {
        TerminalTarget::new(Vec::new()).with_size(20, 5)
    }

    fn output(target: &mut TerminalTarget<Vec<u8>>) -> String {
        String::from_utf8_lossy(target.writer()).into_owned()
    }

    #[test]
    fn test_text_slide() {
        let mut target = target();
        target.clear(Color::WHITE).unwrap();
        TerminalRenderer::new()
            .render(&Slide::Text("hello".into()), &mut target)
            .unwrap();
        target.present().unwrap();
        let out = output(&mut target);
        assert!(out.contains("hello"));
        // Column 7, row 2, but crossterm counts from 1.
        assert!(out.contains("\x1b[3;8H"));
    }

    #[test]
    fn test_text_too_wide() {
        let mut target = target();
        let res = TerminalRenderer::new().render(
            &Slide::Text("this line is far too wide".into()),
            &mut target,
        );
        assert!(matches!(res, Err(RenderError::TextTooLarge { .. })));
    }

    #[test]
    fn test_wide_text_is_measured_in_columns() {
        // 11 chars, 22 columns.
        let mut target = target();
        let res = TerminalRenderer::new()
            .render(&Slide::Text("日本語日本語日本語日本".into()), &mut target);
        assert!(matches!(res, Err(RenderError::TextTooLarge { .. })));

        // 5 chars, 10 columns: starts on column 5.
        let mut target = self::target();
        target.clear(Color::WHITE).unwrap();
        TerminalRenderer::new()
            .render(&Slide::Text("日本語日本".into()), &mut target)
            .unwrap();
        assert!(output(&mut target).contains("\x1b[3;6H"));
    }

    #[test]
    fn test_image_slide() {
        let mut target = target();
        target.clear(Color::WHITE).unwrap();
        let img = SlideImage::new(
            PathBuf::from("red.png"),
            RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255])),
        );
        TerminalRenderer::new()
            .render(&Slide::Image(img), &mut target)
            .unwrap();
        let out = output(&mut target);
        assert!(out.contains(UPPER_HALF_BLOCK));
        assert!(out.contains("38;2;255;0;0"));
    }

    #[test]
    fn test_fullscreen_is_alternate_screen() {
        let mut target = target();
        target.set_fullscreen(true).unwrap();
        assert!(output(&mut target).contains("\x1b[?1049h"));
        target.set_fullscreen(false).unwrap();
        assert!(output(&mut target).contains("\x1b[?1049l"));
    }

    #[test]
    fn test_transparent_pixel_shows_background() {
        let c = over(image::Rgba([0, 0, 0, 0]), Color::WHITE);
        assert_eq!(c, Color::WHITE);
        let c = over(image::Rgba([10, 20, 30, 255]), Color::WHITE);
        assert_eq!((c.r, c.g, c.b), (10, 20, 30));
    }
}
