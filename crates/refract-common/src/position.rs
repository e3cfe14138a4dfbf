//! Byte offset to line mapping.

use serde::Serialize;

/// Starting offsets of every line in a source text.
///
/// Lines are 1-based to match PHP's `__LINE__` and the native reflection
/// `getStartLine()` / `getEndLine()` accessors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LineMap {
    /// Starting offset of each line (line_starts[0] is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        let bytes = source.as_bytes();

        for (i, &b) in bytes.iter().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            } else if b == b'\r' && bytes.get(i + 1) != Some(&b'\n') {
                // Lone \r (old Mac); \r\n is handled by the \n
                line_starts.push((i + 1) as u32);
            }
        }

        LineMap { line_starts }
    }

    /// 1-based line containing the byte offset.
    pub fn line_of(&self, offset: u32) -> u32 {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        line as u32 + 1
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where the given 1-based line starts.
    pub fn line_start(&self, line: u32) -> Option<u32> {
        let idx = line.checked_sub(1)? as usize;
        self.line_starts.get(idx).copied()
    }
}
