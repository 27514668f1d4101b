use outline::anchor::slugify;
use outline::content::{ColumnAlignment, ContentBlock, Inline};
use outline::{Document, MalformedDocument, Parser, Section, render};

fn parse(source: &str) -> Document {
    Parser::new(source.to_string(), 0).parse().expect("parse failed")
}

fn parse_err(source: &str) -> Vec<MalformedDocument> {
    Parser::new(source.to_string(), 0)
        .parse()
        .expect_err("expected parse failure")
}

fn anchors(document: &Document) -> Vec<String> {
    document
        .table_of_contents()
        .map(|entry| entry.anchor.to_string())
        .collect()
}

fn assert_same_sections(a: &[Section], b: &[Section]) {
    assert_eq!(a.len(), b.len());
    for (left, right) in a.iter().zip(b) {
        assert_eq!(left.title, right.title);
        assert_eq!(left.level, right.level);
        assert_eq!(left.anchor, right.anchor);
        assert_same_sections(&left.children, &right.children);
    }
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[test]
fn nesting_by_level() {
    let document = parse("# A\n\n## B\n\n## C\n");
    assert_eq!(document.sections.len(), 1);
    let a = &document.sections[0];
    assert_eq!(a.title, "A");
    assert_eq!(a.level, 1);
    assert_eq!(a.children.len(), 2);
    assert_eq!(a.children[0].title, "B");
    assert_eq!(a.children[1].title, "C");
    assert!(a.children[0].children.is_empty());
}

#[test]
fn deeper_sections_close_on_shallower_heading() {
    let document = parse("# A\n\n## B\n\n### C\n\n## D\n\n# E\n");
    assert_eq!(document.sections.len(), 2);
    let a = &document.sections[0];
    assert_eq!(a.children.len(), 2);
    assert_eq!(a.children[0].title, "B");
    assert_eq!(a.children[0].children[0].title, "C");
    assert_eq!(a.children[1].title, "D");
    assert_eq!(document.sections[1].title, "E");
}

#[test]
fn top_level_sections_may_start_below_level_one() {
    let document = parse("## Overview\n\n# Title\n");
    assert_eq!(document.sections.len(), 2);
    assert_eq!(document.sections[0].title, "Overview");
    assert_eq!(document.sections[0].level, 2);
    assert_eq!(document.sections[1].level, 1);
}

#[test]
fn level_skip_is_malformed() {
    let errors = parse_err("# A\n\n### B\n");
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].message.contains("skips from 1 to 3"),
        "unexpected message: {}",
        errors[0].message
    );
    assert_eq!(errors[0].notes.len(), 1);
}

#[test]
fn every_level_skip_is_reported() {
    let errors = parse_err("# A\n\n### B\n\n# C\n\n#### D\n");
    assert_eq!(errors.len(), 2);
    assert!(errors[0].message.contains("\"B\""));
    assert!(errors[1].message.contains("\"D\""));
}

#[test]
fn one_step_deeper_is_fine() {
    let document = parse("# A\n\n## B\n\n### C\n\n#### D\n");
    let toc_levels: Vec<u8> = document.table_of_contents().map(|e| e.level).collect();
    assert_eq!(toc_levels, vec![1, 2, 3, 4]);
}

#[test]
fn section_spans_cover_their_content() {
    let source = "# A\n\ntext\n\n## B\nmore\n";
    let document = parse(source);
    let a = &document.sections[0];
    assert_eq!(a.span, 0..source.len());
    let b = &a.children[0];
    assert_eq!(&source[b.span.clone()], "## B\nmore\n");
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[test]
fn content_attaches_to_nearest_heading() {
    let document = parse("intro\n\n# A\n\nalpha\n\n## B\n\n```rust\nfn main() {}\n```\n");
    assert_eq!(
        document.preamble,
        vec![ContentBlock::Paragraph(vec![Inline::Text("intro".into())])]
    );
    let a = &document.sections[0];
    assert_eq!(
        a.content,
        vec![ContentBlock::Paragraph(vec![Inline::Text("alpha".into())])]
    );
    let b = &a.children[0];
    match &b.content[0] {
        ContentBlock::CodeBlock { language, content } => {
            assert_eq!(language.as_deref(), Some("rust"));
            assert_eq!(content, "fn main() {}\n");
        }
        other => panic!("expected code block, got {:?}", other),
    }
}

#[test]
fn untagged_code_block_has_no_language() {
    let document = parse("# A\n\n```\nplain\n```\n");
    match &document.sections[0].content[0] {
        ContentBlock::CodeBlock { language, .. } => assert_eq!(language.as_deref(), None),
        other => panic!("expected code block, got {:?}", other),
    }
}

#[test]
fn tables_keep_alignment_and_cells() {
    let document = parse("# Data\n\n| Name | Value |\n|:-----|------:|\n| a | 1 |\n");
    match &document.sections[0].content[0] {
        ContentBlock::Table(table) => {
            assert_eq!(
                table.alignments,
                vec![ColumnAlignment::Left, ColumnAlignment::Right]
            );
            assert_eq!(table.header.len(), 2);
            assert_eq!(table.header[0], vec![Inline::Text("Name".into())]);
            assert_eq!(table.rows.len(), 1);
            assert_eq!(table.rows[0][1], vec![Inline::Text("1".into())]);
        }
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn lists_and_quotes_are_content() {
    let document = parse("# L\n\n- one\n- two\n\n1. first\n2. second\n\n> Be careful.\n");
    let content = &document.sections[0].content;
    assert_eq!(
        content[0],
        ContentBlock::UnorderedList {
            items: vec![
                vec![ContentBlock::Paragraph(vec![Inline::Text("one".into())])],
                vec![ContentBlock::Paragraph(vec![Inline::Text("two".into())])],
            ],
        }
    );
    match &content[1] {
        ContentBlock::OrderedList { start, items } => {
            assert_eq!(*start, 1);
            assert_eq!(items.len(), 2);
        }
        other => panic!("expected ordered list, got {:?}", other),
    }
    assert_eq!(
        content[2],
        ContentBlock::Blockquote(vec![ContentBlock::Paragraph(vec![Inline::Text(
            "Be careful.".into()
        )])])
    );
}

#[test]
fn thematic_break_separates_content() {
    let document = parse("# A\n\nbefore\n\n---\n\nafter\n");
    let content = &document.sections[0].content;
    assert_eq!(content.len(), 3);
    assert_eq!(content[1], ContentBlock::ThematicBreak);
}

#[test]
fn inline_styling_survives() {
    let document = parse("# A\n\n~~old~~ **new** and `code`\n");
    assert_eq!(
        document.sections[0].content[0],
        ContentBlock::Paragraph(vec![
            Inline::Strikethrough(vec![Inline::Text("old".into())]),
            Inline::Text(" ".into()),
            Inline::Strong(vec![Inline::Text("new".into())]),
            Inline::Text(" and ".into()),
            Inline::Code("code".into()),
        ])
    );
}

// ---------------------------------------------------------------------------
// Anchors
// ---------------------------------------------------------------------------

#[test]
fn anchor_derivation() {
    assert_eq!(slugify("Don't Repeat Yourself"), "dont-repeat-yourself");
    assert_eq!(slugify("Error   Handling"), "error-handling");
    assert_eq!(slugify("C++ & Rust"), "c-rust");
    assert_eq!(slugify("snake_case name"), "snake_case-name");
    assert_eq!(slugify("  Trimmed  "), "trimmed");
}

#[test]
fn heading_code_spans_feed_the_anchor() {
    let document = parse("# Using `unwrap`\n");
    assert_eq!(document.sections[0].title, "Using unwrap");
    assert_eq!(document.sections[0].anchor, "using-unwrap");
}

#[test]
fn repeated_titles_get_unique_anchors() {
    let document = parse("# Notes\n\n## Notes\n\n## Notes\n");
    assert_eq!(anchors(&document), vec!["notes", "notes-1", "notes-2"]);
    let last = document.resolve_anchor("notes-2").expect("anchor missing");
    assert_eq!(last.title, "Notes");
}

#[test]
fn suffixed_anchors_never_collide_with_real_titles() {
    let document = parse("# A\n\n## A\n\n## A-1\n");
    assert_eq!(anchors(&document), vec!["a", "a-1", "a-1-1"]);
}

#[test]
fn resolve_anchor_hits_and_misses() {
    let document = parse("# A\n\n## B\n\n### C\n");
    assert_eq!(
        document.resolve_anchor("c").map(|s| s.title.as_str()),
        Some("C")
    );
    assert!(document.resolve_anchor("zzz").is_none());
    for entry in document.table_of_contents() {
        assert!(document.resolve_anchor(entry.anchor).is_some());
    }
}

// ---------------------------------------------------------------------------
// Table of contents
// ---------------------------------------------------------------------------

#[test]
fn toc_follows_heading_order() {
    let document = parse("# One\n\n## Two\n\ntext\n\n### Three\n\n## Four\n\n# Five\n");
    assert_eq!(
        anchors(&document),
        vec!["one", "two", "three", "four", "five"]
    );
    let levels: Vec<u8> = document.table_of_contents().map(|e| e.level).collect();
    assert_eq!(levels, vec![1, 2, 3, 2, 1]);
}

#[test]
fn toc_is_restartable() {
    let document = parse("# A\n\n## B\n\n## C\n");
    let mut walk = document.table_of_contents();
    walk.next();
    let forked: Vec<_> = walk.clone().map(|e| e.anchor.to_string()).collect();
    let rest: Vec<_> = walk.map(|e| e.anchor.to_string()).collect();
    assert_eq!(forked, rest);
    assert_eq!(anchors(&document), vec!["a", "b", "c"]);
}

// ---------------------------------------------------------------------------
// Link validation
// ---------------------------------------------------------------------------

#[test]
fn broken_internal_link_reported_once() {
    let source = "# Guide\n\nSee [naming](#naming) and [gone](#nonexistent-section).\n\n## Naming\n";
    let document = parse(source);
    let broken = document.validate_links();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].anchor, "nonexistent-section");
    assert!(broken[0].span.start > 0);
    assert!(broken[0].span.end <= source.len());
    assert_eq!(
        broken[0].to_string(),
        "link points at unknown anchor `#nonexistent-section`"
    );
}

#[test]
fn resolving_links_pass_validation() {
    let document = parse("# A\n\n[down](#b-section), [up](#a)\n\n## B Section\n");
    assert!(document.validate_links().is_empty());
}

#[test]
fn external_links_are_ignored() {
    let document = parse("# A\n\n[site](https://example.com) and [mail](mailto:x@y.z)\n");
    assert!(document.internal_links.is_empty());
    assert!(document.validate_links().is_empty());
}

#[test]
fn links_inside_lists_and_quotes_are_checked() {
    let document = parse("# A\n\n- item with [ref](#missing)\n\n> quoted [too](#also-missing)\n");
    let broken = document.validate_links();
    assert_eq!(broken.len(), 2);
    assert_eq!(broken[0].anchor, "missing");
    assert_eq!(broken[1].anchor, "also-missing");
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_outline() {
    let source = "intro paragraph\n\n# Clean Code\n\nSome *styled* text with [a link](#functions).\n\n## Naming\n\n- pick names\n- avoid noise\n\n```rust\nlet x = 1;\n```\n\n## Functions\n\n> Small functions.\n\n| A | B |\n| --- | --- |\n| 1 | 2 |\n\n### Arguments\n";
    let document = parse(source);
    let rendered = document.to_string();
    let reparsed = parse(&rendered);
    assert_same_sections(&document.sections, &reparsed.sections);
    assert_eq!(document.preamble, reparsed.preamble);
    // A second render is stable.
    assert_eq!(rendered, reparsed.to_string());
}

#[test]
fn malformed_error_converts_to_diagnostic() {
    let errors = parse_err("# A\n\n### B\n");
    let diagnostic = errors[0].to_diagnostic();
    assert!(diagnostic.message.contains("skips"));
    assert_eq!(diagnostic.labels.len(), 1);
    assert_eq!(diagnostic.notes.len(), 1);
}

#[test]
fn html_rendering() {
    let document = parse("# Fish & Chips\n\nA <b>tag</b> & more.\n\n```rust\nfn main() {}\n```\n\n## See Also\n\nGo to [the top](#fish-chips).\n");
    let html = render::to_html(&document);
    assert!(html.contains("<h1 id=\"fish-chips\">Fish &amp; Chips</h1>"));
    assert!(html.contains("<h2 id=\"see-also\">See Also</h2>"));
    assert!(html.contains("&lt;b&gt;tag&lt;/b&gt;"));
    assert!(html.contains("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"));
    assert!(html.contains("<a href=\"#fish-chips\">the top</a>"));
}

#[test]
fn empty_document() {
    let document = parse("");
    assert!(document.is_empty());
    assert_eq!(document.table_of_contents().count(), 0);
    assert!(document.validate_links().is_empty());
    assert_eq!(document.to_string(), "");
}
