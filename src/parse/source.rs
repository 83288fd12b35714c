//! Character sources the scanner pulls from.

use std::collections::VecDeque;
use std::io::BufRead;
use std::time::Duration;

/// A pull-based supplier of characters.
///
/// `timeout` bounds how long an interactive source may wait for more input.
/// Sources backed by memory or files never block and ignore it.
pub trait CharSource {
    /// Yield the next character, or `None` once input is exhausted.
    fn next_char(&mut self, timeout: Duration) -> Option<char>;
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn next_char(&mut self, timeout: Duration) -> Option<char> {
        (**self).next_char(timeout)
    }
}

/// In-memory cursor over owned text. Used for lines, `-c` programs and
/// back-tick replay.
#[derive(Debug, Clone)]
pub struct StrSource {
    chars: VecDeque<char>,
}

impl StrSource {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }
}

impl CharSource for StrSource {
    fn next_char(&mut self, _timeout: Duration) -> Option<char> {
        self.chars.pop_front()
    }
}

/// Line-buffered source over any `BufRead` (a file or stdin).
///
/// Read errors and invalid UTF-8 end the stream; they are logged, not raised,
/// since the scanner can only report end of input.
pub struct ReaderSource<R> {
    reader: R,
    line: VecDeque<char>,
    done: bool,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: VecDeque::new(),
            done: false,
        }
    }

    fn refill(&mut self) {
        let mut buf = String::new();
        match self.reader.read_line(&mut buf) {
            Ok(0) => self.done = true,
            Ok(_) => self.line.extend(buf.chars()),
            Err(e) => {
                log::warn!("input read failed: {e}");
                self.done = true;
            }
        }
    }
}

impl<R: BufRead> CharSource for ReaderSource<R> {
    fn next_char(&mut self, _timeout: Duration) -> Option<char> {
        while self.line.is_empty() && !self.done {
            self.refill();
        }
        self.line.pop_front()
    }
}
