//! Translate input events into navigation commands.

use tracing::{debug, info, trace};

use crate::events::{InputEvent, Key};

/// What the presentation can be asked to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    FirstSlide,
    NextSlide,
    PrevSlide,
    LastSlide,
    ToggleFullscreen,
    Quit,
}

/// Map a single event to at most one command.
///
/// This is pure (apart from logging), so it can run inline in the event
/// source's thread.
#[must_use]
pub fn translate(event: &InputEvent) -> Option<Command> {
    match event {
        InputEvent::KeyDown(key) => translate_key(key),
        InputEvent::QuitRequested => Some(Command::Quit),
        InputEvent::Resized { width, height } => {
            info!("Target resized to {}x{}", width, height);
            None
        }
        InputEvent::KeyUp(_)
        | InputEvent::MouseMotion { .. }
        | InputEvent::FocusChanged(_) => {
            trace!("Ignoring {:?}", event);
            None
        }
    }
}

fn translate_key(key: &Key) -> Option<Command> {
    let command = match key {
        Key::Space => Some(Command::NextSlide),
        Key::Home => Some(Command::FirstSlide),
        Key::End => Some(Command::LastSlide),
        Key::Char(c) => match c.to_ascii_lowercase() {
            'b' => Some(Command::PrevSlide),
            'f' => Some(Command::ToggleFullscreen),
            'q' => Some(Command::Quit),
            _ => None,
        },
        Key::Other(_) => None,
    };
    if command.is_none() {
        debug!("Unrecognized key: {:?}", key);
    }
    command
}
