//! Numbered line reader with one line of lookahead.

use std::io::{BufRead, Lines};
use std::iter::{Enumerate, Peekable};

use crate::error::Result;

pub struct LineSource<R: BufRead> {
    lines: Peekable<Enumerate<Lines<R>>>,
    line_no: usize,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines().enumerate().peekable(),
            line_no: 0,
        }
    }

    /// 1-based number of the line most recently returned by [`LineSource::next_line`].
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    /// Next line without its terminator, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let Some((idx, line)) = self.lines.next() else {
            return Ok(None);
        };
        self.line_no = idx + 1;
        Ok(Some(line?))
    }

    /// Next line that is not blank.
    pub fn next_nonblank(&mut self) -> Result<Option<String>> {
        while let Some(line) = self.next_line()? {
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// Look at the next line without consuming it.
    pub fn peek(&mut self) -> Result<Option<&str>> {
        let failed = matches!(self.lines.peek(), Some((_, Err(_))));
        if failed {
            if let Some((_, Err(e))) = self.lines.next() {
                return Err(e.into());
            }
        }
        Ok(match self.lines.peek() {
            Some((_, Ok(line))) => Some(line.as_str()),
            _ => None,
        })
    }
}
