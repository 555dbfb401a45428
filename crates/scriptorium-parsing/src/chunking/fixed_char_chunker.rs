//! Fixed-size character chunker backing the `ChunkFiles` handler (spec §4.6).

/// A fixed-size character chunk with its 1-based inclusive line range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharChunk {
    pub content: String,
    pub start_line: i32,
    pub end_line: i32,
}

/// Splits file content into fixed-size character chunks. A companion to
/// `LineWindowSlicer` for files without a structural slicer.
pub struct FixedCharChunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for FixedCharChunker {
    fn default() -> Self {
        Self::new(1000, 0)
    }
}

impl FixedCharChunker {
    /// `chunk_size` is floored at 1; `overlap` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    /// Binary content is detected by a null byte in the first 8 KiB, per §4.6.
    pub fn is_binary(bytes: &[u8]) -> bool {
        let probe_len = bytes.len().min(8192);
        bytes[..probe_len].contains(&0)
    }

    /// Chunk `content`, rejecting binary input by returning an empty vec.
    pub fn chunk(&self, content: &str) -> Vec<CharChunk> {
        if Self::is_binary(content.as_bytes()) {
            return Vec::new();
        }

        let chars: Vec<char> = content.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let line_of_char = line_index_for_each_char(content, chars.len());
        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let text: String = chars[start..end].iter().collect();
            chunks.push(CharChunk {
                content: text,
                start_line: line_of_char[start],
                end_line: line_of_char[end - 1],
            });
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

/// Maps each character index to its 1-based line number.
fn line_index_for_each_char(content: &str, char_count: usize) -> Vec<i32> {
    let mut lines = Vec::with_capacity(char_count);
    let mut line = 1i32;
    for ch in content.chars() {
        lines.push(line);
        if ch == '\n' {
            line += 1;
        }
    }
    debug_assert_eq!(lines.len(), char_count);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_200_char_file_into_two_with_size_100_overlap_0() {
        let content = "a".repeat(200);
        let chunker = FixedCharChunker::new(100, 0);
        let chunks = chunker.chunk(&content);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content.len(), 100);
        assert_eq!(chunks[1].content.len(), 100);
    }

    #[test]
    fn binary_content_produces_zero_chunks() {
        let mut bytes = vec![b'a'; 10];
        bytes.push(0);
        let content = String::from_utf8_lossy(&bytes).into_owned();
        let chunker = FixedCharChunker::default();
        assert!(chunker.chunk(&content).is_empty());
    }

    #[test]
    fn line_ranges_are_one_based_and_inclusive() {
        let content = "line1\nline2\nline3\n";
        let chunker = FixedCharChunker::new(6, 0);
        let chunks = chunker.chunk(content);
        assert_eq!(chunks[0].start_line, 1);
    }

    #[test]
    fn overlap_is_clamped_below_chunk_size() {
        let chunker = FixedCharChunker::new(10, 50);
        let content = "x".repeat(30);
        // Must still make forward progress instead of looping forever.
        let chunks = chunker.chunk(&content);
        assert!(!chunks.is_empty());
    }
}
