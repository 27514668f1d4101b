//! Anchor derivation.
//!
//! An anchor is the identifier a section can be linked to with `#anchor`. It
//! is derived from the heading text: lowercased, punctuation stripped, runs of
//! whitespace collapsed to a single hyphen.

use std::collections::{HashMap, HashSet};

/// Derive the base anchor text for a title.
///
/// `"Don't Repeat Yourself"` becomes `dont-repeat-yourself`. Hyphens and
/// underscores survive; all other punctuation is dropped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            pending_hyphen = !slug.is_empty();
        } else if ch.is_alphanumeric() || ch == '-' || ch == '_' {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        }
    }
    slug
}

/// Allocates document-unique anchors.
///
/// Repeated titles get an increasing `-1`, `-2`, ... suffix, so the anchor
/// uniqueness invariant holds for every input, including titles that collide
/// with an already-suffixed anchor (`A`, `A`, `A-1`).
#[derive(Debug, Default)]
pub struct AnchorSlugger {
    taken: HashSet<String>,
    counters: HashMap<String, u32>,
}

impl AnchorSlugger {
    pub fn new() -> Self {
        AnchorSlugger::default()
    }

    /// Derive the unique anchor for the next occurrence of `title`.
    pub fn anchor_for(&mut self, title: &str) -> String {
        let base = slugify(title);
        if self.taken.insert(base.clone()) {
            return base;
        }
        let counter = self.counters.entry(base.clone()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}-{}", base, counter);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
