use std::ops::Range;

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd,
};

use crate::anchor::AnchorSlugger;
use crate::content::{ColumnAlignment, ContentBlock, Inline, Table};
use crate::document::Document;
use crate::links::InternalLink;
use crate::parser::error::MalformedDocument;
use crate::section::Section;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse Markdown source text into an immutable document tree.
pub fn parse_document(source: &str, file_id: usize) -> Result<Document, Vec<MalformedDocument>> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = CmarkParser::new_ext(source, options);
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut state = ParseState::new(source, file_id);
    state.process_events(&events);
    state.finalize()
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState<'a> {
    source: &'a str,
    file_id: usize,
    anchors: AnchorSlugger,
    /// Stack of sections being built. Innermost = current scope.
    stack: Vec<SectionBuilder>,
    /// Completed top-level sections.
    top: Vec<Section>,
    /// Content seen before the first heading.
    preamble: Vec<ContentBlock>,
    /// Every `#anchor` link destination, in document order.
    links: Vec<InternalLink>,
    errors: Vec<MalformedDocument>,
}

struct SectionBuilder {
    title: String,
    level: u8,
    anchor: String,
    content: Vec<ContentBlock>,
    children: Vec<Section>,
    span_start: usize,
}

impl SectionBuilder {
    fn into_section(self, span_end: usize) -> Section {
        Section {
            title: self.title,
            level: self.level,
            anchor: self.anchor,
            children: self.children,
            content: self.content,
            span: self.span_start..span_end,
        }
    }
}

impl<'a> ParseState<'a> {
    fn new(source: &'a str, file_id: usize) -> Self {
        ParseState {
            source,
            file_id,
            anchors: AnchorSlugger::new(),
            stack: Vec::new(),
            top: Vec::new(),
            preamble: Vec::new(),
            links: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn process_events(&mut self, events: &[(Event<'_>, Range<usize>)]) {
        let mut i = 0;

        while i < events.len() {
            match &events[i].0 {
                Event::Start(Tag::Heading { level, .. }) => {
                    let depth = heading_depth(*level);
                    let span = events[i].1.clone();
                    i += 1;
                    let title = normalize_title(&collect_heading_text(events, &mut i));
                    self.open_section(depth, title, span);
                }
                _ => {
                    if let Some(block) = self.next_block(events, &mut i) {
                        self.push_block(block);
                    }
                }
            }
        }
    }

    /// Open a section for a heading, closing sections at the same or deeper
    /// level first. A heading more than one level deeper than its nearest
    /// open ancestor is malformed; the level is clamped so parsing can
    /// continue and report every nesting error in the source.
    fn open_section(&mut self, declared_level: u8, title: String, span: Range<usize>) {
        self.close_to_level(declared_level, span.start);

        let mut level = declared_level;
        if let Some(parent) = self.stack.last() {
            if level > parent.level + 1 {
                self.errors.push(
                    MalformedDocument::new(
                        format!(
                            "heading level skips from {} to {}: \"{}\"",
                            parent.level, level, title
                        ),
                        span.clone(),
                        self.file_id,
                    )
                    .with_note(format!(
                        "a level-{} section may only introduce level-{} subsections",
                        parent.level,
                        parent.level + 1
                    )),
                );
                level = parent.level + 1;
            }
        }

        let anchor = self.anchors.anchor_for(&title);
        self.stack.push(SectionBuilder {
            title,
            level,
            anchor,
            content: Vec::new(),
            children: Vec::new(),
            span_start: span.start,
        });
    }

    /// Close sections from the stack down to the given heading level.
    fn close_to_level(&mut self, new_level: u8, span_end: usize) {
        while self.stack.last().is_some_and(|top| top.level >= new_level) {
            let Some(builder) = self.stack.pop() else {
                break;
            };
            let section = builder.into_section(span_end);
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(section),
                None => self.top.push(section),
            }
        }
    }

    /// Attach a content block to the innermost open section, or to the
    /// preamble when no heading has been seen yet.
    fn push_block(&mut self, block: ContentBlock) {
        match self.stack.last_mut() {
            Some(builder) => builder.content.push(block),
            None => self.preamble.push(block),
        }
    }

    /// Consume one block-level element. Advances past unrecognized events.
    fn next_block(
        &mut self,
        events: &[(Event<'_>, Range<usize>)],
        i: &mut usize,
    ) -> Option<ContentBlock> {
        match &events[*i].0 {
            Event::Start(Tag::Paragraph) => {
                *i += 1;
                let inlines = self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Paragraph));
                Some(ContentBlock::Paragraph(inlines))
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(lang) => {
                        let lang = lang.to_string();
                        if lang.is_empty() { None } else { Some(lang) }
                    }
                    CodeBlockKind::Indented => None,
                };
                *i += 1;
                let content = collect_text_until(events, i, |e| matches!(e, TagEnd::CodeBlock));
                Some(ContentBlock::CodeBlock { language, content })
            }
            Event::Start(Tag::BlockQuote(_)) => {
                *i += 1;
                let inner = self.collect_blocks(events, i, &|e| matches!(e, TagEnd::BlockQuote(_)));
                Some(ContentBlock::Blockquote(inner))
            }
            Event::Start(Tag::List(start)) => {
                let start = *start;
                *i += 1;
                let items = self.collect_list_items(events, i);
                Some(match start {
                    Some(start) => ContentBlock::OrderedList { start, items },
                    None => ContentBlock::UnorderedList { items },
                })
            }
            Event::Start(Tag::Table(alignments)) => {
                let alignments = alignments
                    .iter()
                    .map(|alignment| match alignment {
                        Alignment::None => ColumnAlignment::None,
                        Alignment::Left => ColumnAlignment::Left,
                        Alignment::Center => ColumnAlignment::Center,
                        Alignment::Right => ColumnAlignment::Right,
                    })
                    .collect();
                *i += 1;
                let (header, rows) = self.collect_table(events, i);
                Some(ContentBlock::Table(Table {
                    alignments,
                    header,
                    rows,
                }))
            }
            Event::Rule => {
                *i += 1;
                Some(ContentBlock::ThematicBreak)
            }
            _ => {
                *i += 1;
                None
            }
        }
    }

    /// Collect block content until a matching End tag. Used for blockquotes
    /// and list items, where nested structure may appear.
    fn collect_blocks(
        &mut self,
        events: &[(Event<'_>, Range<usize>)],
        i: &mut usize,
        is_end: &dyn Fn(&TagEnd) -> bool,
    ) -> Vec<ContentBlock> {
        let mut blocks = Vec::new();
        // Tight list items carry bare inline events with no paragraph wrapper.
        let mut loose: Vec<Inline> = Vec::new();

        while *i < events.len() {
            match &events[*i].0 {
                Event::End(tag_end) if is_end(tag_end) => {
                    *i += 1;
                    break;
                }
                Event::Text(_)
                | Event::Code(_)
                | Event::InlineHtml(_)
                | Event::SoftBreak
                | Event::HardBreak
                | Event::Start(
                    Tag::Strong
                    | Tag::Emphasis
                    | Tag::Strikethrough
                    | Tag::Link { .. }
                    | Tag::Image { .. },
                ) => {
                    if let Some(inline) = self.next_inline(events, i) {
                        loose.push(inline);
                    }
                }
                // A heading nested inside a quote or list item is content
                // here, never document structure.
                Event::Start(Tag::Heading { .. }) => {
                    flush_loose(&mut loose, &mut blocks);
                    *i += 1;
                    let text = normalize_title(&collect_heading_text(events, i));
                    blocks.push(ContentBlock::Paragraph(vec![Inline::Text(text)]));
                }
                _ => {
                    flush_loose(&mut loose, &mut blocks);
                    if let Some(block) = self.next_block(events, i) {
                        blocks.push(block);
                    }
                }
            }
        }

        flush_loose(&mut loose, &mut blocks);
        blocks
    }

    fn collect_list_items(
        &mut self,
        events: &[(Event<'_>, Range<usize>)],
        i: &mut usize,
    ) -> Vec<Vec<ContentBlock>> {
        let mut items = Vec::new();

        while *i < events.len() {
            match &events[*i].0 {
                Event::End(TagEnd::List(_)) => {
                    *i += 1;
                    break;
                }
                Event::Start(Tag::Item) => {
                    *i += 1;
                    items.push(self.collect_blocks(events, i, &|e| matches!(e, TagEnd::Item)));
                }
                _ => {
                    *i += 1;
                }
            }
        }

        items
    }

    /// Collect table header cells and body rows.
    fn collect_table(
        &mut self,
        events: &[(Event<'_>, Range<usize>)],
        i: &mut usize,
    ) -> (Vec<Vec<Inline>>, Vec<Vec<Vec<Inline>>>) {
        let mut header: Vec<Vec<Inline>> = Vec::new();
        let mut rows: Vec<Vec<Vec<Inline>>> = Vec::new();
        let mut in_head = false;
        let mut current_row: Vec<Vec<Inline>> = Vec::new();

        while *i < events.len() {
            match &events[*i].0 {
                Event::End(TagEnd::Table) => {
                    *i += 1;
                    break;
                }
                Event::Start(Tag::TableHead) => {
                    in_head = true;
                    *i += 1;
                }
                Event::End(TagEnd::TableHead) => {
                    in_head = false;
                    header = std::mem::take(&mut current_row);
                    *i += 1;
                }
                Event::Start(Tag::TableRow) => {
                    current_row = Vec::new();
                    *i += 1;
                }
                Event::End(TagEnd::TableRow) => {
                    if !in_head {
                        rows.push(std::mem::take(&mut current_row));
                    }
                    *i += 1;
                }
                Event::Start(Tag::TableCell) => {
                    *i += 1;
                    let cell = self.collect_inlines(events, i, &|e| matches!(e, TagEnd::TableCell));
                    current_row.push(cell);
                }
                _ => {
                    *i += 1;
                }
            }
        }

        (header, rows)
    }

    /// Collect inline nodes until a matching End tag.
    fn collect_inlines(
        &mut self,
        events: &[(Event<'_>, Range<usize>)],
        i: &mut usize,
        is_end: &dyn Fn(&TagEnd) -> bool,
    ) -> Vec<Inline> {
        let mut inlines = Vec::new();

        while *i < events.len() {
            if let Event::End(tag_end) = &events[*i].0 {
                if is_end(tag_end) {
                    *i += 1;
                    break;
                }
            }
            if let Some(inline) = self.next_inline(events, i) {
                inlines.push(inline);
            }
        }

        inlines
    }

    /// Consume one inline element, recording `#anchor` link destinations as
    /// it goes. Advances past unrecognized events.
    fn next_inline(
        &mut self,
        events: &[(Event<'_>, Range<usize>)],
        i: &mut usize,
    ) -> Option<Inline> {
        let (event, range) = &events[*i];
        match event {
            Event::Text(text) => {
                *i += 1;
                Some(Inline::Text(text.to_string()))
            }
            // Raw HTML is not modelled; keep it as text so nothing is lost.
            Event::InlineHtml(html) => {
                *i += 1;
                Some(Inline::Text(html.to_string()))
            }
            Event::Code(code) => {
                *i += 1;
                Some(Inline::Code(code.to_string()))
            }
            Event::SoftBreak => {
                *i += 1;
                Some(Inline::SoftBreak)
            }
            Event::HardBreak => {
                *i += 1;
                Some(Inline::HardBreak)
            }
            Event::Start(Tag::Strong) => {
                *i += 1;
                Some(Inline::Strong(self.collect_inlines(events, i, &|e| {
                    matches!(e, TagEnd::Strong)
                })))
            }
            Event::Start(Tag::Emphasis) => {
                *i += 1;
                Some(Inline::Emphasis(self.collect_inlines(events, i, &|e| {
                    matches!(e, TagEnd::Emphasis)
                })))
            }
            Event::Start(Tag::Strikethrough) => {
                *i += 1;
                Some(Inline::Strikethrough(self.collect_inlines(
                    events,
                    i,
                    &|e| matches!(e, TagEnd::Strikethrough),
                )))
            }
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) => {
                let dest = dest_url.to_string();
                let title = title.to_string();
                if let Some(target) = dest.strip_prefix('#') {
                    self.links.push(InternalLink {
                        anchor: target.to_string(),
                        span: range.clone(),
                    });
                }
                *i += 1;
                let content = self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Link));
                Some(Inline::Link {
                    dest,
                    title,
                    content,
                })
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                let dest = dest_url.to_string();
                let title = title.to_string();
                *i += 1;
                let alt = self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Image));
                Some(Inline::Image { dest, title, alt })
            }
            _ => {
                *i += 1;
                None
            }
        }
    }

    fn finalize(mut self) -> Result<Document, Vec<MalformedDocument>> {
        let end = self.source.len();

        // Close all remaining sections
        while let Some(builder) = self.stack.pop() {
            let section = builder.into_section(end);
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(section),
                None => self.top.push(section),
            }
        }

        if self.errors.is_empty() {
            Ok(Document {
                preamble: self.preamble,
                sections: self.top,
                internal_links: self.links,
                source_id: self.file_id,
            })
        } else {
            Err(self.errors)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn flush_loose(loose: &mut Vec<Inline>, blocks: &mut Vec<ContentBlock>) {
    if !loose.is_empty() {
        blocks.push(ContentBlock::Paragraph(std::mem::take(loose)));
    }
}

/// Collect heading text (all Text and Code events until End(Heading)).
fn collect_heading_text(events: &[(Event<'_>, Range<usize>)], i: &mut usize) -> String {
    let mut title = String::new();
    while *i < events.len() {
        match &events[*i].0 {
            Event::End(TagEnd::Heading(_)) => {
                *i += 1;
                break;
            }
            Event::Text(text) => {
                title.push_str(text);
                *i += 1;
            }
            Event::Code(code) => {
                title.push_str(code);
                *i += 1;
            }
            _ => {
                *i += 1;
            }
        }
    }
    title
}

/// Normalize a title: strip leading/trailing whitespace, collapse interior
/// whitespace.
fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collect all text content until a matching End tag.
fn collect_text_until(
    events: &[(Event<'_>, Range<usize>)],
    i: &mut usize,
    is_end: impl Fn(&TagEnd) -> bool,
) -> String {
    let mut text = String::new();
    while *i < events.len() {
        match &events[*i].0 {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            Event::Text(chunk) => {
                text.push_str(chunk);
                *i += 1;
            }
            _ => {
                *i += 1;
            }
        }
    }
    text
}
