//! Source location tracking for diagnostics.
//!
//! Every AST node the external parser hands to the compiler carries a
//! [`Span`]; the compiler never re-derives locations itself. A [`SourceMap`]
//! turns spans back into file/line/column positions and snippets when
//! diagnostics are rendered.
//!
//! # Design
//!
//! - `Span` — compact byte-range reference with a cached start line
//! - `SourceMap` — all source files of one compile invocation
//! - `SourceFile` — single file with a line-start index

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Compact source location reference.
///
/// Points to a byte range in a source file registered in a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Index into `SourceMap` files.
    pub file_id: u16,
    /// Byte offset of the start position.
    pub start: u32,
    /// Byte offset of the end position (exclusive).
    pub end: u32,
    /// Cached 1-based line number of the start position.
    pub start_line: u16,
}

impl Span {
    /// Create a new span.
    pub fn new(file_id: u16, start: u32, end: u32, start_line: u16) -> Self {
        Self {
            file_id,
            start,
            end,
            start_line,
        }
    }

    /// Zero-length span at the start of a file.
    pub fn zero(file_id: u16) -> Self {
        Self::new(file_id, 0, 0, 1)
    }

    /// True if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Length of the span in bytes.
    ///
    /// # Panics
    /// Panics if `end < start` (malformed span).
    pub fn len(&self) -> u32 {
        assert!(
            self.end >= self.start,
            "malformed span: end ({}) < start ({})",
            self.end,
            self.start
        );
        self.end - self.start
    }
}

/// Collection of all source files seen by one compile invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Register a source file and return its ID.
    pub fn add_file(&mut self, path: PathBuf, source: String) -> u16 {
        let file_id = self.files.len();
        assert!(file_id < u16::MAX as usize, "too many source files");
        self.files.push(SourceFile::new(path, source));
        file_id as u16
    }

    /// Source file a span points into.
    pub fn file(&self, span: &Span) -> &SourceFile {
        &self.files[span.file_id as usize]
    }

    /// Path of the file a span points into.
    pub fn file_path(&self, span: &Span) -> &Path {
        &self.files[span.file_id as usize].path
    }

    /// Raw text the span covers.
    pub fn snippet(&self, span: &Span) -> &str {
        let file = &self.files[span.file_id as usize];
        &file.source[span.start as usize..span.end as usize]
    }

    /// 1-based (line, column) of a span's start.
    pub fn line_col(&self, span: &Span) -> (u32, u32) {
        self.files[span.file_id as usize].line_col(span.start)
    }

    /// Number of registered files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// A single source file with a precomputed line index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path as the caller supplied it.
    pub path: PathBuf,
    /// Full source text.
    pub source: String,
    /// Byte offsets of line starts; the last entry is an EOF sentinel.
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Create a source file, computing its line index.
    pub fn new(path: PathBuf, source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        Self {
            path,
            source,
            line_starts,
        }
    }

    /// 1-based (line, column) for a byte offset.
    ///
    /// # Panics
    /// Panics if `offset` is beyond EOF.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        assert!(
            offset <= self.source.len() as u32,
            "offset {} is beyond EOF (len = {})",
            offset,
            self.source.len()
        );
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.max(1) - 1,
        };
        let line = (line_idx + 1) as u32;
        let col = (offset - self.line_starts[line_idx]) + 1;
        (line, col)
    }

    /// Text of a 1-based line, or None past EOF.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 || line as usize >= self.line_starts.len() {
            return None;
        }
        let idx = (line - 1) as usize;
        let start = self.line_starts[idx] as usize;
        let end = self.line_starts[idx + 1] as usize;
        Some(&self.source[start..end])
    }

    /// Number of lines in the file.
    pub fn line_count(&self) -> usize {
        self.line_starts.len() - 1
    }
}

/// Byte offsets of line starts, terminated by an EOF sentinel.
fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }
    if line_starts.last() != Some(&(source.len() as u32)) {
        line_starts.push(source.len() as u32);
    }
    line_starts
}
