use std::fmt;

use crate::content::ContentBlock;
use crate::links::{self, BrokenAnchor, InternalLink};
use crate::section::Section;
use crate::toc::Toc;

/// A parsed, immutable document tree.
#[derive(Debug, Clone)]
pub struct Document {
    /// Content appearing before the first heading.
    pub preamble: Vec<ContentBlock>,
    /// Top-level sections in document order.
    pub sections: Vec<Section>,
    /// Every `#anchor` link destination found in content, with its byte span.
    /// Collected at parse time so link validation never re-walks inline trees.
    pub internal_links: Vec<InternalLink>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

impl Document {
    /// Walk every section in document order, lazily.
    ///
    /// The returned iterator is finite and restartable: clone it, or call this
    /// method again for a fresh walk.
    pub fn table_of_contents(&self) -> Toc<'_> {
        Toc::new(&self.sections)
    }

    /// Look up a section by its unique anchor. Absent anchors are a lookup
    /// miss, not an error.
    pub fn resolve_anchor(&self, anchor: &str) -> Option<&Section> {
        fn find<'a>(sections: &'a [Section], anchor: &str) -> Option<&'a Section> {
            for section in sections {
                if section.anchor == anchor {
                    return Some(section);
                }
                if let Some(found) = find(&section.children, anchor) {
                    return Some(found);
                }
            }
            None
        }
        find(&self.sections, anchor)
    }

    /// Cross-check every internal link against the document's anchor set.
    /// Returns one entry per link whose target does not exist.
    pub fn validate_links(&self) -> Vec<BrokenAnchor> {
        links::validate(self)
    }

    pub fn is_empty(&self) -> bool {
        self.preamble.is_empty() && self.sections.is_empty()
    }
}

impl fmt::Display for Document {
    /// Render the document back to a Markdown outline. Re-parsing the output
    /// yields an equivalent section hierarchy.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separate = false;
        for block in &self.preamble {
            if separate {
                writeln!(f)?;
            }
            write!(f, "{}", block)?;
            separate = true;
        }
        for section in &self.sections {
            if separate {
                writeln!(f)?;
            }
            write!(f, "{}", section)?;
            separate = true;
        }
        Ok(())
    }
}
