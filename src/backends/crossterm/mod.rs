//! The provided terminal backend.
use std::io::{self, Write};

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange,
    EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseEvent, MouseEventKind,
};
use crossterm::{execute, terminal};
use tracing::{error, info, trace};

use super::{Options, SlidyBackend};
use crate::command::Command;
use crate::controller;
use crate::error::{Error, Result};
use crate::events::{self, EventSource, InputEvent, Key};
use crate::render::terminal::{TerminalRenderer, TerminalTarget};
use crate::render::RenderTarget;
use crate::slideshow::SlideSet;

/// The backend.
pub struct Backend {
    options: Options,
}

impl Backend {
    /// Create a new backend.
    #[must_use]
    pub fn new(options: Options) -> Backend {
        Backend { options }
    }
}

/// Keeps the terminal in raw mode, reporting mouse moves and focus changes,
/// while alive.
struct RawMode;

impl RawMode {
    fn enable() -> Result<RawMode> {
        terminal::enable_raw_mode()
            .map_err(|e| Error::Platform(format!("no raw mode: {e}")))?;
        // From here on, dropping the guard restores the terminal.
        let raw = RawMode;
        report_input(&mut io::stdout(), true)?;
        Ok(raw)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = report_input(&mut io::stdout(), false) {
            error!("Unable to stop the mouse and focus reports: {:?}", e);
        }
        match terminal::disable_raw_mode() {
            Ok(()) => trace!("raw mode disabled."),
            Err(e) => error!("Unable to leave raw mode: {:?}", e),
        }
    }
}

/// Turn the mouse and focus reports on or off.
fn report_input<W: Write>(out: &mut W, on: bool) -> io::Result<()> {
    if on {
        execute!(out, EnableMouseCapture, EnableFocusChange)
    } else {
        execute!(out, DisableMouseCapture, DisableFocusChange)
    }
}

impl SlidyBackend for Backend {
    fn present(&mut self, slides: SlideSet) -> Result<usize> {
        let _raw = RawMode::enable()?;

        let mut target = TerminalTarget::new(io::stdout());
        if self.options.fullscreen {
            target
                .set_fullscreen(true)
                .map_err(|e| Error::Platform(e.to_string()))?;
        }
        let (queue, completion) = controller::spawn(
            slides,
            target,
            TerminalRenderer::new(),
            self.options.fullscreen,
        )?;

        let pumped = events::pump(&mut TerminalEvents, &queue);
        if let Err(e) = &pumped {
            error!("Input failed, stopping: {}", e);
            // Stopped already if this fails too.
            let _ = queue.submit(Command::Quit);
        }
        drop(queue);

        // The controller restores the screen when it drops its target: wait
        // for it before leaving raw mode.
        let last = completion.wait()?;
        info!("Terminal presentation over");
        pumped.map(|()| last)
    }
}

/// Blocking reads from the terminal.
struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn next_event(&mut self) -> Result<Option<InputEvent>> {
        loop {
            let evt = event::read()?;
            trace!("{:?}", evt);
            if let Some(input) = convert(&evt) {
                return Ok(Some(input));
            }
        }
    }
}

fn convert_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Char(c) => Key::from_name(&c.to_string()),
        other => Key::from_name(&format!("{other:?}")),
    }
}

/// Map a crossterm event, `None` for the ones nobody cares about.
fn convert(evt: &Event) -> Option<InputEvent> {
    match evt {
        // Raw mode swallows the signal: Ctrl+C is the terminal's close request.
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputEvent::QuitRequested)
        }
        Event::Key(KeyEvent { code, kind, .. }) => {
            let key = convert_key(*code);
            Some(match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    InputEvent::KeyDown(key)
                }
                KeyEventKind::Release => InputEvent::KeyUp(key),
            })
        }
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column,
            row,
            ..
        }) => Some(InputEvent::MouseMotion {
            x: i32::from(*column),
            y: i32::from(*row),
        }),
        Event::FocusGained => Some(InputEvent::FocusChanged(true)),
        Event::FocusLost => Some(InputEvent::FocusChanged(false)),
        Event::Resize(cols, rows) => Some(InputEvent::Resized {
            width: u32::from(*cols),
            height: u32::from(*rows),
        }),
        _ => None,
    }
}
