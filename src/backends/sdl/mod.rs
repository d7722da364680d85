//! The provided SDL2 backend.
//!
//! Everything SDL lives on the calling (main) thread: the window, its
//! canvas and the event pump. The controller draws into an off-screen frame
//! on its own thread, and the frames are flipped to the window by
//! [`display::Display`] whenever the event loop is woken up.

use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

use sdl2::event::{Event, WindowEvent};
use sdl2::render::Canvas;
use sdl2::video::Window;
use tracing::{error, info, trace, warn};

use self::display::{Display, DisplayLink, DisplayRequest, FrameReady};
use super::{Options, SlidyBackend};
use crate::command::Command;
use crate::controller;
use crate::error::{Error, Result};
use crate::events::{self, EventSource, InputEvent, Key};
use crate::render::frame::{self, FrameRenderer, FrameTarget, Viewport};
use crate::slideshow::SlideSet;

pub mod display;

const WINDOW_TITLE: &str = "plainshow";

/// Helper: init the SDL context.
pub fn get_sdl_context() -> Result<sdl2::Sdl> {
    sdl2::init().map_err(|e| Error::Platform(format!("unable to init sdl: {e}")))
}

/// Define the window options.
pub struct WindowOptions {
    pub h: u32,
    pub w: u32,
    pub resizable: bool,
    pub fullscreen: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        WindowOptions {
            h: 768,
            w: 1024,
            resizable: true,
            fullscreen: false,
        }
    }
}

impl From<&Options> for WindowOptions {
    fn from(options: &Options) -> Self {
        WindowOptions {
            h: options.height,
            w: options.width,
            fullscreen: options.fullscreen,
            ..Default::default()
        }
    }
}

fn build_window(
    video: &sdl2::VideoSubsystem,
    options: &WindowOptions,
) -> Result<Window> {
    let mut windowbuilder = video.window(WINDOW_TITLE, options.w, options.h);
    windowbuilder.position_centered();
    if options.resizable {
        windowbuilder.resizable();
    }
    if options.fullscreen {
        windowbuilder.fullscreen_desktop();
    }
    windowbuilder
        .build()
        .map_err(|e| Error::Platform(format!("unable to build the window: {e}")))
}

/// Get a canvas out of an sdl context.
/// If an accelerated canvas can't be built, fall back to a software one.
fn build_canvas(
    context: &sdl2::Sdl,
    options: &WindowOptions,
) -> Result<Canvas<Window>> {
    let video = context.video().map_err(Error::Platform)?;
    match build_window(&video, options)?
        .into_canvas()
        .accelerated()
        .present_vsync()
        .build()
    {
        Ok(canvas) => Ok(canvas),
        Err(e) => {
            warn!(
                "Unable to build an accelerated canvas ({}), trying the plain one.",
                e
            );
            build_window(&video, options)?
                .into_canvas()
                .software()
                .build()
                .map_err(|e| Error::Platform(e.to_string()))
        }
    }
}

/// The backend.
pub struct Backend {
    options: Options,
}

impl Backend {
    /// Create a new backend. Nothing is initialised before `present`.
    #[must_use]
    pub fn new(options: Options) -> Backend {
        Backend { options }
    }
}

impl SlidyBackend for Backend {
    fn present(&mut self, slides: SlideSet) -> Result<usize> {
        // Fail on the font before any window shows up.
        let font = frame::load_font(self.options.font.as_deref())?;

        let sdl_context = get_sdl_context()?;
        let canvas = build_canvas(&sdl_context, &(&self.options).into())?;
        let event_subsystem = sdl_context.event().map_err(Error::Platform)?;
        event_subsystem
            .register_custom_event::<FrameReady>()
            .map_err(Error::Platform)?;
        let event_pump = sdl_context.event_pump().map_err(Error::Platform)?;

        let viewport = Arc::new(Viewport::new(self.options.width, self.options.height));
        let display = Display::new(canvas, viewport.clone());
        let (requests_tx, requests) = channel();
        let sender = event_subsystem.event_sender();
        let link = DisplayLink::new(
            requests_tx,
            Box::new(move || sender.push_custom_event(FrameReady)),
        );

        let (queue, completion) = controller::spawn(
            slides,
            FrameTarget::new(viewport, link),
            FrameRenderer::new(font),
            self.options.fullscreen,
        )?;

        let mut source = SdlEvents {
            event_pump,
            display,
            requests,
        };
        let pumped = events::pump(&mut source, &queue);
        if let Err(e) = &pumped {
            error!("Input failed, stopping: {}", e);
            let _ = queue.submit(Command::Quit);
        }
        drop(queue);

        // From now on nobody shows frames: drop the receiving end so the
        // controller can't wait on us, then wait for it before letting the
        // window go.
        let SdlEvents {
            display, requests, ..
        } = source;
        drop(requests);
        let last = completion.wait()?;
        drop(display);
        info!("SDL presentation over");
        pumped.map(|()| last)
    }
}

/// The SDL event pump, serving the display in between input events.
struct SdlEvents {
    event_pump: sdl2::EventPump,
    display: Display,
    requests: Receiver<DisplayRequest>,
}

impl SdlEvents {
    fn repaint(&mut self) {
        if let Err(e) = self.display.repaint() {
            error!("Unable to repaint the window: {}", e);
        }
    }

    fn serve_display(&mut self) {
        while let Ok(request) = self.requests.try_recv() {
            self.display.handle(request);
        }
    }
}

impl EventSource for SdlEvents {
    fn next_event(&mut self) -> Result<Option<InputEvent>> {
        loop {
            let event = self.event_pump.wait_event();
            if event.as_user_event_type::<FrameReady>().is_some() {
                self.serve_display();
                continue;
            }
            trace!("{:?}", event);
            if let Event::Window { win_event, .. } = &event {
                match win_event {
                    WindowEvent::SizeChanged(..) => {
                        self.display.sync_viewport();
                        self.repaint();
                    }
                    WindowEvent::Exposed => self.repaint(),
                    _ => {}
                }
            }
            if let Some(input) = convert(&event) {
                return Ok(Some(input));
            }
        }
    }
}

/// Map an SDL event, `None` for the ones nobody cares about.
///
/// Closing the window produces both a window `Close` and a `Quit` event: only
/// the latter is reported, so quitting is requested once.
fn convert(event: &Event) -> Option<InputEvent> {
    match event {
        Event::Quit { .. } => Some(InputEvent::QuitRequested),
        Event::KeyDown {
            keycode: Some(keycode),
            ..
        } => Some(InputEvent::KeyDown(Key::from_name(&keycode.name()))),
        Event::KeyUp {
            keycode: Some(keycode),
            ..
        } => Some(InputEvent::KeyUp(Key::from_name(&keycode.name()))),
        Event::MouseMotion { x, y, .. } => {
            Some(InputEvent::MouseMotion { x: *x, y: *y })
        }
        Event::Window { win_event, .. } => match win_event {
            WindowEvent::FocusGained => Some(InputEvent::FocusChanged(true)),
            WindowEvent::FocusLost => Some(InputEvent::FocusChanged(false)),
            WindowEvent::SizeChanged(w, h) => Some(InputEvent::Resized {
                width: u32::try_from(*w).unwrap_or(0),
                height: u32::try_from(*h).unwrap_or(0),
            }),
            _ => None,
        },
        _ => None,
    }
}
