//! Prompter that answers prompts from values known in advance

use std::collections::VecDeque;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};
use crate::host::Prompter;
use crate::types::PixelCoord;

/// Wraps a prompter, answering the first file and pixel prompts from queues
///
/// Each queue is consumed in prompt order. Once a queue is empty, prompts of
/// that kind go to the inner prompter. Queued pixels are checked against the
/// prompt's maximum like typed ones.
pub struct PrefilledPrompter<P: Prompter> {
    inner: P,
    files: VecDeque<PathBuf>,
    pixels: VecDeque<PixelCoord>,
}

impl<P: Prompter> PrefilledPrompter<P> {
    pub fn new(inner: P, files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            inner,
            files: files.into_iter().collect(),
            pixels: VecDeque::new(),
        }
    }

    /// Queues answers for the pixel prompts
    pub fn with_pixels(mut self, pixels: impl IntoIterator<Item = PixelCoord>) -> Self {
        self.pixels = pixels.into_iter().collect();
        self
    }
}

impl<P: Prompter> Prompter for PrefilledPrompter<P> {
    fn open_file(&mut self, title: &str, extensions: &[&str]) -> Result<Option<PathBuf>> {
        match self.files.pop_front() {
            Some(path) => {
                debug!(title, path = %path.display(), "prompt answered from arguments");
                Ok(Some(path))
            }
            None => self.inner.open_file(title, extensions),
        }
    }

    fn pixel(&mut self, title: &str, default: PixelCoord, max: PixelCoord) -> Result<Option<PixelCoord>> {
        let Some(coord) = self.pixels.pop_front() else {
            return self.inner.pixel(title, default, max);
        };
        if coord.row > max.row || coord.col > max.col {
            return Err(Error::OutOfBounds(format!(
                "pixel {} exceeds maximum {}",
                coord, max
            )));
        }
        debug!(title, %coord, "prompt answered from arguments");
        Ok(Some(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use crate::host::ConsolePrompter;

    #[test]
    fn test_queue_then_inner() {
        let mut console = ConsolePrompter::new(Cursor::new(b"/b.tfw\n1,2\n".to_vec()), Vec::new());
        let mut prompter = PrefilledPrompter::new(&mut console, [PathBuf::from("/a.tif")]);

        assert_eq!(prompter.open_file("t", &[]).unwrap(), Some(PathBuf::from("/a.tif")));
        assert_eq!(prompter.open_file("w", &[]).unwrap(), Some(PathBuf::from("/b.tfw")));

        let max = PixelCoord::new(5, 5);
        assert_eq!(
            prompter.pixel("s", max, max).unwrap(),
            Some(PixelCoord::new(1, 2))
        );

        let shown = String::from_utf8(console.into_output()).unwrap();
        assert!(shown.starts_with("w []"));
    }

    #[test]
    fn test_prefilled_pixels() {
        let mut console = ConsolePrompter::new(Cursor::new(b"4,4\n".to_vec()), Vec::new());
        let mut prompter = PrefilledPrompter::new(&mut console, Vec::new())
            .with_pixels([PixelCoord::new(1, 1)]);

        let max = PixelCoord::new(5, 5);
        assert_eq!(prompter.pixel("Start", max, max).unwrap(), Some(PixelCoord::new(1, 1)));
        assert_eq!(prompter.pixel("End", max, max).unwrap(), Some(PixelCoord::new(4, 4)));

        let shown = String::from_utf8(console.into_output()).unwrap();
        assert!(shown.starts_with("End"));
    }

    #[test]
    fn test_prefilled_pixel_out_of_bounds() {
        let console = ConsolePrompter::new(Cursor::new(Vec::new()), Vec::new());
        let mut prompter = PrefilledPrompter::new(console, Vec::new())
            .with_pixels([PixelCoord::new(9, 0)]);

        let max = PixelCoord::new(5, 5);
        let err = prompter.pixel("Start", max, max).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds(_)));
    }
}
