//! Platform independent input events, and the loop pumping them into the
//! presentation.

use tracing::{debug, info};

use crate::command::{self, Command};
use crate::controller::CommandQueue;
use crate::error::Result;

/// A key, named independently of any keyboard backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Space,
    Home,
    End,
    /// A printable key, stored lowercase.
    Char(char),
    /// Anything else, by its lowercase name.
    Other(String),
}

impl Key {
    /// Build a key out of its name, ignoring the case.
    /// Single letters become [`Key::Char`].
    #[must_use]
    pub fn from_name(name: &str) -> Key {
        let name = name.to_lowercase();
        match name.as_str() {
            "space" | " " => Key::Space,
            "home" => Key::Home,
            "end" => Key::End,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(name),
                }
            }
        }
    }
}

/// Everything a platform can tell us about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// The window (or terminal) was asked to close.
    QuitRequested,
    MouseMotion { x: i32, y: i32 },
    FocusChanged(bool),
    Resized { width: u32, height: u32 },
}

/// A blocking source of input events.
///
/// Implementations deliver events in the order they happened, and must
/// report [`InputEvent::QuitRequested`] once when the window or process is
/// asked to close. `Ok(None)` means the source is exhausted.
pub trait EventSource {
    fn next_event(&mut self) -> Result<Option<InputEvent>>;
}

/// Block on `source`, and forward every recognized command to `queue`.
///
/// Returns once `Quit` has been submitted. If the source dries up first, a
/// `Quit` is submitted anyway so the controller always gets to stop.
pub fn pump<S>(source: &mut S, queue: &CommandQueue) -> Result<()>
where
    S: EventSource + ?Sized,
{
    while let Some(event) = source.next_event()? {
        let Some(command) = command::translate(&event) else {
            continue;
        };
        debug!("Submitting {:?}", command);
        queue.submit(command)?;
        if command == Command::Quit {
            return Ok(());
        }
    }
    info!("Event source exhausted, quitting");
    queue.submit(Command::Quit)
}

#[cfg(test)]
mod test {
    use std::collections::VecDeque;

    use super::*;
    use crate::controller;

    struct Scripted(VecDeque<InputEvent>);

    impl EventSource for Scripted {
        fn next_event(&mut self) -> Result<Option<InputEvent>> {
            Ok(self.0.pop_front())
        }
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Space"), Key::Space);
        assert_eq!(Key::from_name(" "), Key::Space);
        assert_eq!(Key::from_name("End"), Key::End);
        assert_eq!(Key::from_name("B"), Key::Char('b'));
        assert_eq!(Key::from_name("Escape"), Key::Other("escape".into()));
    }

    #[test]
    fn test_pump_stops_at_quit() {
        let mut source = Scripted(VecDeque::from([
            InputEvent::KeyDown(Key::Space),
            InputEvent::MouseMotion { x: 1, y: 1 },
            InputEvent::KeyUp(Key::Space),
            InputEvent::KeyDown(Key::Char('b')),
            InputEvent::QuitRequested,
            InputEvent::KeyDown(Key::Space),
        ]));
        let (queue, rx) = controller::command_queue();
        pump(&mut source, &queue).expect("the receiver is alive");

        let received: Vec<Command> = rx.try_iter().collect();
        assert_eq!(
            received,
            [Command::NextSlide, Command::PrevSlide, Command::Quit]
        );
        // The event after the quit request is never read.
        assert_eq!(source.0.len(), 1);
    }

    #[test]
    fn test_pump_quits_on_exhausted_source() {
        let mut source =
            Scripted(VecDeque::from([InputEvent::KeyDown(Key::End)]));
        let (queue, rx) = controller::command_queue();
        pump(&mut source, &queue).expect("the receiver is alive");

        let received: Vec<Command> = rx.try_iter().collect();
        assert_eq!(received, [Command::LastSlide, Command::Quit]);
    }

    #[test]
    fn test_pump_fails_without_controller() {
        let mut source =
            Scripted(VecDeque::from([InputEvent::KeyDown(Key::Space)]));
        let (queue, rx) = controller::command_queue();
        drop(rx);
        assert!(pump(&mut source, &queue).is_err());
    }
}
