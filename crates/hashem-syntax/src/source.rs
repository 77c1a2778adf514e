//! Source artifacts and located text spans.
//!
//! A [`Source`] owns the program text together with its language id and
//! logical name. Every AST node points back into it through a
//! [`SourceSection`], a byte range plus a cheap handle to the source.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

struct SourceArtifact {
    language: SmolStr,
    name: SmolStr,
    text: String,
    line_starts: Vec<TextSize>,
}

/// Immutable, shareable program text.
#[derive(Clone)]
pub struct Source {
    inner: Arc<SourceArtifact>,
}

impl Source {
    /// Create a source artifact from a language id, the program text and a logical name.
    pub fn new(
        language: impl Into<SmolStr>,
        text: impl Into<String>,
        name: impl Into<SmolStr>,
    ) -> Self {
        let text = text.into();
        let line_starts = line_starts(&text);
        Self {
            inner: Arc::new(SourceArtifact {
                language: language.into(),
                name: name.into(),
                text,
                line_starts,
            }),
        }
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.inner.language
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.inner.text
    }

    /// Number of lines in the text (a trailing newline opens an empty last line).
    #[must_use]
    pub fn line_count(&self) -> u32 {
        u32::try_from(self.inner.line_starts.len()).unwrap_or(u32::MAX)
    }

    /// Convert a byte offset into a 1-based line/column pair.
    ///
    /// Columns are measured in bytes.
    #[must_use]
    pub fn line_col(&self, offset: TextSize) -> (u32, u32) {
        let starts = &self.inner.line_starts;
        let line_idx = match starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = starts.get(line_idx).copied().unwrap_or_default();
        let column = u32::from(offset).saturating_sub(u32::from(line_start));
        (
            u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1,
            column + 1,
        )
    }

    /// Byte range of a 1-based line, excluding its line terminator.
    #[must_use]
    pub fn line_range(&self, line: u32) -> Option<TextRange> {
        let starts = &self.inner.line_starts;
        let idx = usize::try_from(line.checked_sub(1)?).ok()?;
        let start = *starts.get(idx)?;
        let end = match starts.get(idx + 1) {
            Some(next) => next.checked_sub(TextSize::from(1)).unwrap_or(*next),
            None => TextSize::of(self.text()),
        };
        Some(TextRange::new(start, end))
    }

    /// Create a section covering `range` of this source.
    #[must_use]
    pub fn section(&self, range: TextRange) -> SourceSection {
        debug_assert!(range.end() <= TextSize::of(self.text()));
        SourceSection {
            source: self.clone(),
            range,
        }
    }

    /// Returns `true` when both handles point at the same artifact.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.inner.language == other.inner.language
                && self.inner.name == other.inner.name
                && self.inner.text == other.inner.text)
    }
}

impl Eq for Source {}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("language", &self.inner.language)
            .field("name", &self.inner.name)
            .field("len", &self.inner.text.len())
            .finish()
    }
}

/// An exact, located span of text within a [`Source`].
#[derive(Clone, PartialEq, Eq)]
pub struct SourceSection {
    source: Source,
    range: TextRange,
}

impl SourceSection {
    #[must_use]
    pub fn source(&self) -> &Source {
        &self.source
    }

    #[must_use]
    pub fn range(&self) -> TextRange {
        self.range
    }

    #[must_use]
    pub fn start_offset(&self) -> u32 {
        self.range.start().into()
    }

    #[must_use]
    pub fn end_offset(&self) -> u32 {
        self.range.end().into()
    }

    /// 1-based line of the first character.
    #[must_use]
    pub fn start_line(&self) -> u32 {
        self.source.line_col(self.range.start()).0
    }

    /// 1-based column of the first character.
    #[must_use]
    pub fn start_column(&self) -> u32 {
        self.source.line_col(self.range.start()).1
    }

    /// 1-based line of the last character.
    #[must_use]
    pub fn end_line(&self) -> u32 {
        let end = if self.range.is_empty() {
            self.range.end()
        } else {
            self.range.end() - TextSize::from(1)
        };
        self.source.line_col(end).0
    }

    /// The covered text.
    #[must_use]
    pub fn characters(&self) -> &str {
        &self.source.text()[self.range]
    }

    /// Smallest section covering both `self` and `other`.
    #[must_use]
    pub fn cover(&self, other: &SourceSection) -> SourceSection {
        debug_assert!(self.source.ptr_eq(&other.source));
        SourceSection {
            source: self.source.clone(),
            range: self.range.cover(other.range),
        }
    }
}

impl fmt::Debug for SourceSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} {:?}",
            self.source.name(),
            self.start_line(),
            self.start_column(),
            self.characters()
        )
    }
}

impl fmt::Display for SourceSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.source.name(),
            self.start_line(),
            self.start_column()
        )
    }
}

fn line_starts(text: &str) -> Vec<TextSize> {
    let mut starts = Vec::with_capacity(64);
    starts.push(TextSize::from(0));
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(TextSize::from(idx as u32 + 1));
        }
    }
    starts
}
