#[cfg(feature = "cterm")]
pub mod crossterm;
#[cfg(feature = "sdl")]
pub mod sdl;

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::slideshow::SlideSet;

/// The definition of a backend.
///
/// A backend owns the platform (window or terminal): it starts the
/// presentation controller with a render target of its own, pumps the
/// platform's events into it, and only releases the platform once the
/// controller is done.
pub trait SlidyBackend {
    /// Run the whole presentation. Returns the index of the last slide shown.
    fn present(&mut self, slides: SlideSet) -> Result<usize>;
}

/// What the user can tune, whatever the backend.
#[derive(Debug, Clone)]
pub struct Options {
    /// Font used to draw text slides, when the backend draws pixels.
    pub font: Option<PathBuf>,
    pub fullscreen: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            font: None,
            fullscreen: false,
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backends {
    #[cfg(feature = "sdl")]
    Sdl,
    #[cfg(feature = "cterm")]
    Crossterm,
}

impl Backends {
    /// The backend used when none is asked for.
    #[must_use]
    pub fn preferred() -> Option<Backends> {
        #[cfg(feature = "sdl")]
        return Some(Backends::Sdl);
        #[cfg(all(not(feature = "sdl"), feature = "cterm"))]
        return Some(Backends::Crossterm);
        #[cfg(not(any(feature = "sdl", feature = "cterm")))]
        return None;
    }
}

fn match_try(value: &str) -> Result<Backends> {
    match value.to_lowercase().as_str() {
        #[cfg(feature = "sdl")]
        "sdl" => Ok(Backends::Sdl),
        #[cfg(feature = "cterm")]
        "crossterm" | "terminal" => Ok(Backends::Crossterm),
        _ => Err(Error::UnsupportedBackend(value.to_owned())),
    }
}

#[must_use]
pub fn get_backend(which: Backends, options: Options) -> Box<dyn SlidyBackend> {
    match which {
        #[cfg(feature = "sdl")]
        Backends::Sdl => Box::new(sdl::Backend::new(options)),
        #[cfg(feature = "cterm")]
        Backends::Crossterm => Box::new(crossterm::Backend::new(options)),
    }
}

impl TryFrom<String> for Backends {
    type Error = Error;
    fn try_from(value: String) -> Result<Self> {
        match_try(value.as_str())
    }
}

impl TryFrom<&str> for Backends {
    type Error = Error;
    fn try_from(value: &str) -> Result<Self> {
        match_try(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unknown_backend() {
        assert!(matches!(
            Backends::try_from("opengl"),
            Err(Error::UnsupportedBackend(name)) if name == "opengl"
        ));
    }

    #[cfg(feature = "sdl")]
    #[test]
    fn test_sdl_by_name() {
        assert_eq!(Backends::try_from("SDL").unwrap(), Backends::Sdl);
        assert_eq!(Backends::preferred(), Some(Backends::Sdl));
    }

    #[cfg(feature = "cterm")]
    #[test]
    fn test_crossterm_by_name() {
        assert_eq!(
            Backends::try_from(String::from("Crossterm")).unwrap(),
            Backends::Crossterm
        );
        assert_eq!(Backends::try_from("terminal").unwrap(), Backends::Crossterm);
    }
}
