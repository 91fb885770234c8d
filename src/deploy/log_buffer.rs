//! Bounded view over the deployment log blob
//!
//! The blob is a flat, append-only text: no line numbers, no structure.
//! Ordering is strictly append order, which for process output means the
//! interleaving of stdout and stderr as the OS delivered it. That
//! interleaving is not globally ordered between the two streams; this is a
//! known nondeterminism, not something the buffer tries to repair.

/// Default number of lines returned by the tail view
pub const DEFAULT_TAIL_LINES: usize = 5;

/// In-memory log blob with tail/truncate views
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    blob: String,
}

impl LogBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer from previously persisted contents
    pub fn from_contents(blob: String) -> Self {
        Self { blob }
    }

    /// Append raw text (may contain embedded newlines)
    pub fn append(&mut self, text: &str) {
        self.blob.push_str(text);
    }

    /// Full blob contents
    pub fn contents(&self) -> &str {
        &self.blob
    }

    /// True when the blob is empty
    pub fn is_empty(&self) -> bool {
        self.blob.is_empty()
    }

    /// Last `max_lines` lines of the blob
    ///
    /// Splits on newline boundaries; a single trailing empty line produced
    /// by a trailing newline is discarded.
    pub fn tail(&self, max_lines: usize) -> Vec<String> {
        let mut lines: Vec<&str> = self.blob.split('\n').collect();
        if lines.last() == Some(&"") {
            lines.pop();
        }
        let skip = lines.len().saturating_sub(max_lines);
        lines[skip..].iter().map(|s| s.to_string()).collect()
    }

    /// Tail view joined back into a flat text payload
    pub fn tail_text(&self, max_lines: usize) -> String {
        self.tail(max_lines).join("\n")
    }

    /// Reset to empty
    pub fn clear(&mut self) {
        self.blob.clear();
    }

    /// Keep only the last `max_lines` lines
    pub fn truncate_to_tail(&mut self, max_lines: usize) {
        let tail = self.tail(max_lines);
        self.blob = tail.join("\n");
        if !self.blob.is_empty() {
            self.blob.push('\n');
        }
    }

    /// Replace the blob wholesale with a single line
    pub fn replace_with_line(&mut self, line: &str) {
        self.blob = format!("{}\n", line);
    }
}
