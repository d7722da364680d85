//! Read the slide files.
//!
//! The format is line based, one slide per line:
//!
//! ```text
//! # A comment: not a slide.
//! @images/cat.png
//! Any other line is shown as is.
//! ```
//!
//! An empty line is a slide showing a single space. Picture paths are
//! relative to the file naming them. Any picture that can't be loaded makes
//! the whole file fail: there is no partial slide set.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::slideshow::{Slide, SlideImage, SlideSet};

/// Build the slides out of the content of a slide file.
/// `base_folder` is where relative picture paths start from.
pub fn parse_text(inp: &str, base_folder: &Path) -> Result<Vec<Slide>> {
    let mut slides = vec![];
    for line in inp.lines() {
        if let Some(comment) = line.strip_prefix('#') {
            debug!("comment: {}", comment);
            continue;
        }
        let slide = match line.strip_prefix('@') {
            Some(path) => Slide::Image(load_image(base_folder, path)?),
            None if line.is_empty() => Slide::Text(" ".to_owned()),
            None => Slide::Text(line.to_owned()),
        };
        slides.push(slide);
    }
    Ok(slides)
}

fn load_image(base_folder: &Path, path: &str) -> Result<SlideImage> {
    let path = base_folder.join(path);
    debug!("Loading picture {}", path.display());
    let pixels = image::open(&path)
        .map_err(|source| Error::Image {
            path: path.clone(),
            source,
        })?
        .into_rgba8();
    Ok(SlideImage::new(path, pixels))
}

/// Parse a single file.
pub fn parse_file(path: &Path) -> Result<Vec<Slide>> {
    let read_error = |source| Error::Read {
        path: PathBuf::from(path),
        source,
    };
    let content = std::fs::read_to_string(path).map_err(read_error)?;
    let base_folder = path.parent().unwrap_or_else(|| Path::new(""));
    parse_text(&content, base_folder)
}

/// Parse every file, in order, into a single slide set.
pub fn parse_files<P: AsRef<Path>>(paths: &[P]) -> Result<SlideSet> {
    let mut slides = vec![];
    for path in paths {
        let path = path.as_ref();
        let mut from_file = parse_file(path)?;
        info!("{} slides in {}", from_file.len(), path.display());
        slides.append(&mut from_file);
    }
    SlideSet::new(slides)
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::PathBuf;

    use image::{Rgba, RgbaImage};

    use super::*;

    /// Load and a file and check its existence.
    macro_rules! load_exists {
        ($f:expr) => {{
            let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            d.push($f);
            assert!(d.exists());
            d
        }};
    }

    fn texts(slides: &[Slide]) -> Vec<Option<&str>> {
        slides.iter().map(Slide::text).collect()
    }

    #[test]
    /// Verify the simple file in resources works fine.
    fn test_resource_simple_slides() {
        let d = load_exists!("resources/simple_slides.txt");

        let slides = parse_file(&d)
            .map_err(|e| panic!("Unable to read the slides: {}", e))
            .unwrap();

        assert_eq!(slides.len(), 4);
        assert_eq!(slides[0].text(), Some("plainshow"));
        let img = slides[1].image().expect("second slide is a picture");
        assert_eq!(img.pixels().dimensions(), (4, 2));
        assert!(img.path().ends_with("resources/nyan.png"));
        assert_eq!(slides[2].text(), Some(" "));
        assert_eq!(slides[3].text(), Some("the end"));
    }

    #[test]
    fn test_missing_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let res = parse_text("hello\n#ignored\n@missing.png\n", dir.path());
        assert!(matches!(res, Err(Error::Image { .. })));
    }

    #[test]
    fn test_empty_line_is_a_space() {
        let slides = parse_text("a\n\nb\n", Path::new("")).unwrap();
        assert_eq!(texts(&slides), [Some("a"), Some(" "), Some("b")]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let slides =
            parse_text("#one\n# two\nshown\n#three", Path::new("")).unwrap();
        assert_eq!(texts(&slides), [Some("shown")]);
    }

    #[test]
    fn test_whitespace_and_crlf() {
        let slides = parse_text("  indented \r\nnext\r\n", Path::new(""))
            .unwrap();
        assert_eq!(texts(&slides), [Some("  indented "), Some("next")]);
    }

    #[test]
    fn test_image_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("pics")).unwrap();
        RgbaImage::from_pixel(3, 3, Rgba([0, 255, 0, 255]))
            .save(dir.path().join("pics/green.png"))
            .unwrap();
        let slides_path = dir.path().join("talk.txt");
        fs::write(&slides_path, "title\n@pics/green.png\n").unwrap();

        let slides = parse_file(&slides_path).unwrap();
        assert_eq!(slides.len(), 2);
        let img = slides[1].image().expect("a picture");
        assert_eq!(*img.pixels().get_pixel(1, 1), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_undecodable_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        let res = parse_text("@broken.png", dir.path());
        assert!(matches!(res, Err(Error::Image { .. })));
    }

    #[test]
    fn test_files_are_concatenated() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&first, "one\ntwo\n").unwrap();
        fs::write(&second, "# only a comment\nthree\n").unwrap();

        let set = parse_files(&[first, second]).unwrap();
        let got: Vec<_> = set.iter().map(Slide::text).collect();
        assert_eq!(got, [Some("one"), Some("two"), Some("three")]);
    }

    #[test]
    fn test_no_slides_at_all() {
        let dir = tempfile::tempdir().unwrap();
        let only_comments = dir.path().join("empty.txt");
        fs::write(&only_comments, "# nothing\n# to see\n").unwrap();
        assert!(matches!(
            parse_files(&[only_comments]),
            Err(Error::EmptySlideSet)
        ));
    }

    #[test]
    fn test_missing_file() {
        let res = parse_files(&["/this/file/does/not/exist.txt"]);
        assert!(matches!(res, Err(Error::Read { .. })));
    }
}
