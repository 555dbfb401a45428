//! Language-agnostic line-window slicer backing the `ExtractSnippets` handler.

/// An overlapping line window with its 1-based inclusive line range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWindow {
    pub content: String,
    pub start_line: i32,
    pub end_line: i32,
}

/// Splits source into overlapping line windows. Coarser than AST-level
/// structure by design (spec §4.6: "finer structure is not required for
/// search quality at today's model sizes").
pub struct LineWindowSlicer {
    window_size: usize,
    overlap: usize,
}

impl Default for LineWindowSlicer {
    fn default() -> Self {
        Self::new(60, 10)
    }
}

impl LineWindowSlicer {
    /// `window_size` is floored at 1; `overlap` is clamped below `window_size`.
    pub fn new(window_size: usize, overlap: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            overlap: overlap.min(window_size - 1),
        }
    }

    /// Slice `content` into windows. An empty or all-blank-line input yields
    /// no windows.
    pub fn slice(&self, content: &str) -> Vec<LineWindow> {
        let lines: Vec<&str> = content.lines().collect();
        if lines.is_empty() {
            return Vec::new();
        }

        let step = self.window_size - self.overlap;
        let mut windows = Vec::new();
        let mut start = 0usize;

        while start < lines.len() {
            let end = (start + self.window_size).min(lines.len());
            let text = lines[start..end].join("\n");
            windows.push(LineWindow {
                content: text,
                start_line: i32::try_from(start + 1).unwrap_or(i32::MAX),
                end_line: i32::try_from(end).unwrap_or(i32::MAX),
            });
            if end == lines.len() {
                break;
            }
            start += step;
        }
        windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_60_lines_with_10_overlap() {
        let content = (1..=200)
            .map(|n| format!("line{n}"))
            .collect::<Vec<_>>()
            .join("\n");
        let slicer = LineWindowSlicer::default();
        let windows = slicer.slice(&content);
        assert_eq!(windows[0].start_line, 1);
        assert_eq!(windows[0].end_line, 60);
        assert_eq!(windows[1].start_line, 51);
    }

    #[test]
    fn short_file_produces_single_window() {
        let slicer = LineWindowSlicer::default();
        let windows = slicer.slice("a\nb\nc");
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_line, 1);
        assert_eq!(windows[0].end_line, 3);
    }

    #[test]
    fn empty_content_produces_no_windows() {
        let slicer = LineWindowSlicer::default();
        assert!(slicer.slice("").is_empty());
    }
}
