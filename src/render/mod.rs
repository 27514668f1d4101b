//! HTML rendering of a parsed document.
//!
//! Headings carry their anchor as an `id` attribute, so internal links of the
//! form `#anchor` keep working in the rendered output.

use crate::content::{ColumnAlignment, ContentBlock, Inline, Table};
use crate::document::Document;
use crate::section::Section;

/// Render the whole document to an HTML fragment.
pub fn to_html(document: &Document) -> String {
    let mut out = String::new();
    for block in &document.preamble {
        push_block(&mut out, block);
    }
    for section in &document.sections {
        push_section(&mut out, section);
    }
    out
}

fn push_section(out: &mut String, section: &Section) {
    let level = section.level.clamp(1, 6);
    out.push_str(&format!(
        "<h{} id=\"{}\">{}</h{}>\n",
        level,
        escape(&section.anchor),
        escape(&section.title),
        level
    ));
    for block in &section.content {
        push_block(out, block);
    }
    for child in &section.children {
        push_section(out, child);
    }
}

fn push_block(out: &mut String, block: &ContentBlock) {
    match block {
        ContentBlock::Paragraph(inlines) => {
            out.push_str("<p>");
            push_inlines(out, inlines);
            out.push_str("</p>\n");
        }
        ContentBlock::CodeBlock { language, content } => {
            match language {
                Some(language) => out.push_str(&format!(
                    "<pre><code class=\"language-{}\">",
                    escape(language)
                )),
                None => out.push_str("<pre><code>"),
            }
            out.push_str(&escape(content));
            out.push_str("</code></pre>\n");
        }
        ContentBlock::Blockquote(blocks) => {
            out.push_str("<blockquote>\n");
            for inner in blocks {
                push_block(out, inner);
            }
            out.push_str("</blockquote>\n");
        }
        ContentBlock::Table(table) => push_table(out, table),
        ContentBlock::OrderedList { start, items } => {
            if *start == 1 {
                out.push_str("<ol>\n");
            } else {
                out.push_str(&format!("<ol start=\"{}\">\n", start));
            }
            push_list_items(out, items);
            out.push_str("</ol>\n");
        }
        ContentBlock::UnorderedList { items } => {
            out.push_str("<ul>\n");
            push_list_items(out, items);
            out.push_str("</ul>\n");
        }
        ContentBlock::ThematicBreak => out.push_str("<hr />\n"),
    }
}

fn push_list_items(out: &mut String, items: &[Vec<ContentBlock>]) {
    for item in items {
        out.push_str("<li>");
        // A single-paragraph item renders inline, without the <p> wrapper.
        if let [ContentBlock::Paragraph(inlines)] = item.as_slice() {
            push_inlines(out, inlines);
        } else {
            for block in item {
                push_block(out, block);
            }
        }
        out.push_str("</li>\n");
    }
}

fn push_table(out: &mut String, table: &Table) {
    out.push_str("<table>\n<thead>\n<tr>");
    for (column, cell) in table.header.iter().enumerate() {
        push_cell(out, "th", table.alignments.get(column).copied(), cell);
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in &table.rows {
        out.push_str("<tr>");
        for (column, cell) in row.iter().enumerate() {
            push_cell(out, "td", table.alignments.get(column).copied(), cell);
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}

fn push_cell(out: &mut String, tag: &str, alignment: Option<ColumnAlignment>, cell: &[Inline]) {
    let style = match alignment {
        Some(ColumnAlignment::Left) => " style=\"text-align: left\"",
        Some(ColumnAlignment::Center) => " style=\"text-align: center\"",
        Some(ColumnAlignment::Right) => " style=\"text-align: right\"",
        Some(ColumnAlignment::None) | None => "",
    };
    out.push_str(&format!("<{}{}>", tag, style));
    push_inlines(out, cell);
    out.push_str(&format!("</{}>", tag));
}

fn push_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        push_inline(out, inline);
    }
}

fn push_inline(out: &mut String, inline: &Inline) {
    match inline {
        Inline::Text(text) => out.push_str(&escape(text)),
        Inline::Code(code) => {
            out.push_str("<code>");
            out.push_str(&escape(code));
            out.push_str("</code>");
        }
        Inline::Strong(children) => {
            out.push_str("<strong>");
            push_inlines(out, children);
            out.push_str("</strong>");
        }
        Inline::Emphasis(children) => {
            out.push_str("<em>");
            push_inlines(out, children);
            out.push_str("</em>");
        }
        Inline::Strikethrough(children) => {
            out.push_str("<del>");
            push_inlines(out, children);
            out.push_str("</del>");
        }
        Inline::Link {
            dest,
            title,
            content,
        } => {
            out.push_str(&format!("<a href=\"{}\"", escape(dest)));
            if !title.is_empty() {
                out.push_str(&format!(" title=\"{}\"", escape(title)));
            }
            out.push('>');
            push_inlines(out, content);
            out.push_str("</a>");
        }
        Inline::Image { dest, title, alt } => {
            let mut alt_text = String::new();
            push_inlines(&mut alt_text, alt);
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\"",
                escape(dest),
                alt_text
            ));
            if !title.is_empty() {
                out.push_str(&format!(" title=\"{}\"", escape(title)));
            }
            out.push_str(" />");
        }
        Inline::SoftBreak => out.push('\n'),
        Inline::HardBreak => out.push_str("<br />\n"),
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
