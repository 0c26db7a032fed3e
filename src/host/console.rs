//! Line-based prompts on a text terminal

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::host::Prompter;
use crate::types::PixelCoord;

/// Answer that dismisses any prompt
const CANCEL: &str = "q";

/// Prompts over any reader/writer pair, usually stdin and stderr
///
/// - file prompts: an empty answer, `q` or end of input cancels
/// - pixel prompts: `row,col` or `row col`; an empty answer takes the
///   default, `q` or end of input cancels
///
/// Answers that cannot be parsed fail with a Range error.
pub struct ConsolePrompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Reads one trimmed answer; `None` at end of input or on the cancel answer
    fn answer(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim();
        if answer.eq_ignore_ascii_case(CANCEL) {
            return Ok(None);
        }
        Ok(Some(answer.to_string()))
    }
}

/// Parses `row,col` or `row col`
pub fn parse_pixel(text: &str) -> Result<PixelCoord> {
    let invalid = || Error::InvalidRange(format!("expected ROW,COL, got {:?}", text));

    let mut parts = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty());
    let row = parts.next().ok_or_else(invalid)?.parse::<u64>().map_err(|_| invalid())?;
    let col = parts.next().ok_or_else(invalid)?.parse::<u64>().map_err(|_| invalid())?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(PixelCoord::new(row, col))
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn open_file(&mut self, title: &str, extensions: &[&str]) -> Result<Option<PathBuf>> {
        let patterns: Vec<String> = extensions.iter().map(|ext| format!("*.{}", ext)).collect();
        write!(self.output, "{} [{}] (q to cancel): ", title, patterns.join(", "))?;
        self.output.flush()?;

        Ok(self
            .answer()?
            .filter(|answer| !answer.is_empty())
            .map(PathBuf::from))
    }

    fn pixel(&mut self, title: &str, default: PixelCoord, max: PixelCoord) -> Result<Option<PixelCoord>> {
        write!(
            self.output,
            "{} as ROW,COL, max {},{} [default {},{}]: ",
            title, max.row, max.col, default.row, default.col
        )?;
        self.output.flush()?;

        let Some(answer) = self.answer()? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(Some(default));
        }

        let coord = parse_pixel(&answer)?;
        if coord.row > max.row || coord.col > max.col {
            return Err(Error::OutOfBounds(format!(
                "pixel {} exceeds maximum {}",
                coord, max
            )));
        }
        Ok(Some(coord))
    }
}
