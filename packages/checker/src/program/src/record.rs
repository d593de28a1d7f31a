// File Record
//
// What the program state remembers about one source file between iterations.

use ts::Diagnostic;

use super::imports::ImportReference;

/// State for a single file of the program.
#[derive(Debug, Clone)]
pub struct FileRecord {
    path: String,
    fingerprint: String,
    /// Snapshot version in which the content was last read.
    version: u64,
    text: String,
    line_starts: Vec<usize>,
    pub(crate) imports: Vec<ImportReference>,
    pub(crate) resolved_imports: Vec<String>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Set when the diagnostics are stale, cleared once they are recomputed.
    pub(crate) needs_check: bool,
}

impl FileRecord {
    pub(crate) fn new(path: String, text: String, fingerprint: String, version: u64) -> Self {
        let line_starts = compute_line_starts(&text);
        Self {
            path,
            fingerprint,
            version,
            text,
            line_starts,
            imports: Vec::new(),
            resolved_imports: Vec::new(),
            diagnostics: Vec::new(),
            needs_check: true,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Files this file's imports and references resolved to.
    pub fn resolved_imports(&self) -> &[String] {
        &self.resolved_imports
    }

    pub fn imports(&self) -> &[ImportReference] {
        &self.imports
    }

    /// Last-known diagnostics of this file.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// 1-based line and column of a byte offset. Offsets past the end map to
    /// the end of the text; columns count characters.
    pub fn line_and_column(&self, offset: usize) -> (usize, usize) {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = self.text[self.line_starts[line]..offset].chars().count();
        (line + 1, column + 1)
    }

    /// Byte offset of a 1-based line and column, clamped to the line.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        let Some(&line_start) = self.line_starts.get(line.saturating_sub(1)) else {
            return self.text.len();
        };
        let line_text = self.text[line_start..].split('\n').next().unwrap_or_default();
        line_start
            + line_text
                .char_indices()
                .nth(column.saturating_sub(1))
                .map_or(line_text.len(), |(index, _)| index)
    }
}

fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(text.match_indices('\n').map(|(index, _)| index + 1));
    starts
}
