//! Capture buffer with terminal-escape stripping.
//!
//! Console output is scraped text: colour codes, cursor movement and
//! carriage returns are noise. Everything is run through a `vte` parser and
//! only printable text, newlines and tabs are kept.

use vte::{Parser, Perform};

/// Collects the printable text a terminal would show.
#[derive(Debug, Default)]
struct TextCollector {
    text: String,
}

impl Perform for TextCollector {
    fn print(&mut self, c: char) {
        self.text.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' | b'\t' => self.text.push(byte as char),
            // Backspace erases the previous character (echoed line editing)
            0x08 => {
                self.text.pop();
            }
            _ => {}
        }
    }
}

/// Buffer accumulating cleaned console text for one exchange.
pub struct CaptureBuffer {
    parser: Parser,
    collector: TextCollector,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            collector: TextCollector::default(),
        }
    }

    /// Feed raw console bytes.
    pub fn extend(&mut self, data: &[u8]) {
        self.parser.advance(&mut self.collector, data);
    }

    /// Cleaned text so far.
    pub fn as_str(&self) -> &str {
        &self.collector.text
    }

    /// Take the text and reset.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.collector.text)
    }

    pub fn len(&self) -> usize {
        self.collector.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collector.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.collector.text.clear();
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CaptureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureBuffer")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = CaptureBuffer::new();
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.as_str(), "Hello, world!");
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = CaptureBuffer::new();
        buffer.extend(b"\x1b[32mGreen text\x1b[0m");
        assert_eq!(buffer.as_str(), "Green text");
    }

    #[test]
    fn test_carriage_returns_dropped() {
        let mut buffer = CaptureBuffer::new();
        buffer.extend(b"line one\r\nline two\r\n");
        assert_eq!(buffer.as_str(), "line one\nline two\n");
    }

    #[test]
    fn test_backspace_erases() {
        let mut buffer = CaptureBuffer::new();
        buffer.extend(b"shx\x08ow");
        assert_eq!(buffer.as_str(), "show");
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = CaptureBuffer::new();
        buffer.extend(b"test data");
        assert_eq!(buffer.take(), "test data");
        assert!(buffer.is_empty());
    }
}
