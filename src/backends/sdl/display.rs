//! Putting the controller's frames on the SDL window.
//!
//! SDL must only be driven from the thread that initialised it, and that
//! thread spends its life waiting for events. So the controller never calls
//! SDL: it sends its requests over a channel through a [`DisplayLink`] and
//! wakes the event loop up, which then hands them to the [`Display`].

use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;

use image::RgbaImage;
use sdl2::pixels::{Color as SdlColor, PixelFormatEnum};
use sdl2::rect::Rect;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{FullscreenType, Window, WindowContext};
use tracing::{debug, error, warn};

use crate::error::RenderError;
use crate::render::fit_inside;
use crate::render::frame::{FrameSink, Viewport};
use crate::slideshow::Color;

/// SDL's name for "R, G, B, A bytes in memory order".
#[cfg(target_endian = "little")]
const RGBA_BYTES: PixelFormatEnum = PixelFormatEnum::ABGR8888;
#[cfg(target_endian = "big")]
const RGBA_BYTES: PixelFormatEnum = PixelFormatEnum::RGBA8888;

impl From<Color> for SdlColor {
    fn from(c: Color) -> Self {
        SdlColor::RGBA(c.r, c.g, c.b, c.a)
    }
}

/// The custom SDL event pushed to wake the event loop.
pub struct FrameReady;

/// What the controller asks of the window.
pub enum DisplayRequest {
    Show(RgbaImage),
    /// Answered on `done` once the window has switched.
    Fullscreen {
        on: bool,
        done: Sender<Result<(), String>>,
    },
}

/// Called after each request so the SDL thread looks at the channel.
pub type Waker = Box<dyn Fn() -> Result<(), String> + Send>;

/// The controller's end of the display.
pub struct DisplayLink {
    requests: Sender<DisplayRequest>,
    wake: Waker,
}

impl DisplayLink {
    /// `wake` must make the event loop look at the request channel.
    pub fn new(requests: Sender<DisplayRequest>, wake: Waker) -> Self {
        DisplayLink { requests, wake }
    }

    fn send(&self, request: DisplayRequest) -> Result<(), RenderError> {
        self.requests
            .send(request)
            .map_err(|_| RenderError::DisplayClosed)?;
        (self.wake)().map_err(RenderError::Display)
    }
}

impl FrameSink for DisplayLink {
    fn show(&mut self, frame: &RgbaImage) -> Result<(), RenderError> {
        self.send(DisplayRequest::Show(frame.clone()))
    }

    fn set_fullscreen(&mut self, on: bool) -> Result<(), RenderError> {
        let (done, answer) = channel();
        self.send(DisplayRequest::Fullscreen { on, done })?;
        answer
            .recv()
            .map_err(|_| RenderError::DisplayClosed)?
            .map_err(RenderError::Display)
    }
}

/// The window's end of the display. Lives on the SDL thread.
pub struct Display {
    canvas: Canvas<Window>,
    creator: TextureCreator<WindowContext>,
    /// The last frame, kept to repaint the window when it is exposed.
    texture: Option<(Texture, (u32, u32))>,
    viewport: Arc<Viewport>,
}

impl Display {
    pub fn new(canvas: Canvas<Window>, viewport: Arc<Viewport>) -> Self {
        let creator = canvas.texture_creator();
        let mut display = Display {
            canvas,
            creator,
            texture: None,
            viewport,
        };
        display.sync_viewport();
        if let Err(e) = display.repaint() {
            warn!("Unable to paint the empty window: {}", e);
        }
        display
    }

    /// Publish the drawable size of the window.
    pub fn sync_viewport(&mut self) {
        match self.canvas.output_size() {
            Ok((w, h)) => {
                debug!("Viewport is now {}x{}", w, h);
                self.viewport.set(w, h);
            }
            Err(e) => error!("Unable to read the window size: {}", e),
        }
    }

    pub fn handle(&mut self, request: DisplayRequest) {
        match request {
            DisplayRequest::Show(frame) => {
                if let Err(e) = self.show(&frame) {
                    error!("Unable to show the frame: {}", e);
                }
            }
            DisplayRequest::Fullscreen { on, done } => {
                let res = self.set_fullscreen(on);
                if done.send(res).is_err() {
                    warn!("Nobody is waiting for the fullscreen switch");
                }
            }
        }
    }

    fn set_fullscreen(&mut self, on: bool) -> Result<(), String> {
        let mode = if on {
            FullscreenType::Desktop
        } else {
            FullscreenType::Off
        };
        self.canvas.window_mut().set_fullscreen(mode)?;
        self.sync_viewport();
        Ok(())
    }

    fn show(&mut self, frame: &RgbaImage) -> Result<(), String> {
        let size = frame.dimensions();
        if size.0 == 0 || size.1 == 0 {
            self.drop_texture();
            return self.repaint();
        }
        if self.texture.as_ref().map(|(_, s)| *s) != Some(size) {
            self.drop_texture();
            let texture = self
                .creator
                .create_texture_streaming(RGBA_BYTES, size.0, size.1)
                .map_err(|e| e.to_string())?;
            self.texture = Some((texture, size));
        }
        if let Some((texture, _)) = self.texture.as_mut() {
            texture
                .update(None, frame.as_raw(), size.0 as usize * 4)
                .map_err(|e| e.to_string())?;
        }
        self.repaint()
    }

    /// Draw the last frame again. Until the controller draws one at the new
    /// size, an old frame is letterboxed instead of stretched.
    pub fn repaint(&mut self) -> Result<(), String> {
        self.canvas.set_draw_color(SdlColor::from(Color::WHITE));
        self.canvas.clear();
        if let Some((texture, size)) = &self.texture {
            let window = self.canvas.output_size()?;
            if let Some(dst) = letterbox(*size, window) {
                self.canvas.copy(texture, None, dst)?;
            }
        }
        self.canvas.present();
        Ok(())
    }

    fn drop_texture(&mut self) {
        if let Some((texture, _)) = self.texture.take() {
            // Safety: the renderer that created it is still alive, and the
            // texture is not referenced anywhere else.
            unsafe { texture.destroy() };
        }
    }
}

/// Where a `frame` sized picture goes in a `window` sized canvas: as large
/// as fits, same aspect ratio, centred.
fn letterbox(frame: (u32, u32), window: (u32, u32)) -> Option<Rect> {
    let (w, h) = fit_inside(frame.0, frame.1, window.0, window.1);
    if w == 0 || h == 0 {
        return None;
    }
    let x = i32::try_from((window.0 - w) / 2).ok()?;
    let y = i32::try_from((window.1 - h) / 2).ok()?;
    Some(Rect::new(x, y, w, h))
}

impl Drop for Display {
    fn drop(&mut self) {
        self.drop_texture();
    }
}
