use std::fmt;
use std::ops::Range;

use crate::content::ContentBlock;

/// A titled unit of the document, defined by a Markdown heading.
///
/// Sections are built once by the parser and never mutated afterwards, so a
/// parsed tree can be shared read-only across threads without synchronization.
#[derive(Debug, Clone)]
pub struct Section {
    /// The heading text, whitespace-normalized.
    pub title: String,
    /// Heading level: 1 = top-level (#), 2-6 = subsections (##-######).
    pub level: u8,
    /// Derived identifier, unique within the owning document.
    pub anchor: String,
    /// Subsections defined lexically within this section's scope.
    pub children: Vec<Section>,
    /// Content blocks between this heading and the next one.
    pub content: Vec<ContentBlock>,
    /// Byte span in source for error reporting.
    pub span: Range<usize>,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.level {
            write!(f, "#")?;
        }
        if self.title.is_empty() {
            writeln!(f)?;
        } else {
            writeln!(f, " {}", self.title)?;
        }
        for block in &self.content {
            writeln!(f)?;
            write!(f, "{}", block)?;
        }
        for child in &self.children {
            writeln!(f)?;
            write!(f, "{}", child)?;
        }
        Ok(())
    }
}
