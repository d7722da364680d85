//! Error types.
//!
//! [`Error`] covers everything that stops the presentation from starting (or
//! the plumbing between threads failing). [`RenderError`] is what a single
//! redraw may fail with: it is logged by the controller and never ends the
//! presentation.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors, reported once to the user before exiting.
#[derive(Debug, Error)]
pub enum Error {
    /// The slide file could not be read.
    #[error("unable to read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An `@` line points to an image that can't be opened or decoded.
    #[error("unable to load image `{}`: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Nothing to show once every slide file has been read.
    #[error("no slides to present")]
    EmptySlideSet,

    /// The font at `path` is not a usable TrueType/OpenType font.
    #[error("unable to load font `{}`: {reason}", path.display())]
    Font { path: PathBuf, reason: String },

    /// No font was given and none of the usual system fonts exist.
    #[error("no usable font found, please provide one with --font")]
    FontUnavailable,

    /// The window system or the terminal refused to initialise.
    #[error("platform error: {0}")]
    Platform(String),

    #[error("{0} backend is not supported")]
    UnsupportedBackend(String),

    #[error("unable to start the presentation thread: {0}")]
    Spawn(std::io::Error),

    /// The controller has already processed `Quit` (or died).
    #[error("the presentation has already stopped")]
    ControllerStopped,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` for the startup path.
pub type Result<T> = std::result::Result<T, Error>;

/// A failed redraw. Recoverable: the previous frame stays on screen.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The text can't be drawn at a readable size on this target.
    #[error("`{text}` does not fit on a {width}x{height} target")]
    TextTooLarge {
        text: String,
        width: u32,
        height: u32,
    },

    /// The platform side stopped receiving frames.
    #[error("the display is closed")]
    DisplayClosed,

    #[error("display error: {0}")]
    Display(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
