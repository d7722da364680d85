#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

/*!
# Plainshow: slides, one line each.

A slide file is a plain text file: every line is a slide. A line starting
with `@` shows a picture, a line starting with `#` is a comment, anything
else is shown as is, centred on the screen.

The viewer is split in two:

- the backend owns the platform (an SDL window, or the terminal), reads its
  events and turns them into [`command::Command`]s;
- the [`controller::PresentationController`] runs on its own thread, takes
  the commands one at a time, moves through the [`slideshow::SlideStore`] and
  redraws the current slide.

Quitting is a handshake: the controller stops taking commands, releases its
render target, and reports the last slide shown before the backend lets the
platform go.
*/

pub mod backends;
pub mod command;
pub mod controller;
pub mod error;
pub mod events;
pub mod parser;
pub mod render;
pub mod slideshow;

pub use error::{Error, Result};
