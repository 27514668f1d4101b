use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

use crate::document::Document;

/// An internal link destination (`#anchor`) found in document content.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalLink {
    /// The anchor the link points at, without the leading `#`.
    pub anchor: String,
    /// Byte span of the link in source.
    pub span: Range<usize>,
}

/// An internal link whose target anchor does not exist in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenAnchor {
    pub anchor: String,
    pub span: Range<usize>,
    pub file_id: usize,
}

impl BrokenAnchor {
    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(format!("link points at unknown anchor `#{}`", self.anchor))
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
    }
}

impl fmt::Display for BrokenAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link points at unknown anchor `#{}`", self.anchor)
    }
}

impl std::error::Error for BrokenAnchor {}

/// Check every collected internal link against the document's anchor set.
pub fn validate(document: &Document) -> Vec<BrokenAnchor> {
    let anchors: HashSet<&str> = document
        .table_of_contents()
        .map(|entry| entry.anchor)
        .collect();

    document
        .internal_links
        .iter()
        .filter(|link| !anchors.contains(link.anchor.as_str()))
        .map(|link| BrokenAnchor {
            anchor: link.anchor.clone(),
            span: link.span.clone(),
            file_id: document.source_id,
        })
        .collect()
}
