use std::fmt;

/// A block of content belonging to a section (or to the document preamble).
///
/// Headings never appear here: every heading in the source becomes a
/// `Section`, and everything between two headings becomes the content of the
/// nearest preceding one.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Paragraph(Vec<Inline>),
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    Blockquote(Vec<ContentBlock>),
    Table(Table),
    OrderedList {
        start: u64,
        items: Vec<Vec<ContentBlock>>,
    },
    UnorderedList {
        items: Vec<Vec<ContentBlock>>,
    },
    ThematicBreak,
}

/// A pipe table: one header row, zero or more body rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub alignments: Vec<ColumnAlignment>,
    pub header: Vec<Vec<Inline>>,
    pub rows: Vec<Vec<Vec<Inline>>>,
}

/// Inline elements that appear within a line of text.
/// Inline types nest freely within one another.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        dest: String,
        title: String,
        content: Vec<Inline>,
    },
    Image {
        dest: String,
        title: String,
        alt: Vec<Inline>,
    },
    SoftBreak,
    HardBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAlignment {
    None,
    Left,
    Center,
    Right,
}

// ---------------------------------------------------------------------------
// Markdown rendering
// ---------------------------------------------------------------------------
//
// Every block renders with a trailing newline and no leading one; callers
// insert the blank line between blocks. That separation is what keeps the
// output re-parseable (two adjacent paragraphs must not merge, and a thematic
// break must not turn the line above it into a setext heading).

impl fmt::Display for ContentBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentBlock::Paragraph(inlines) => {
                write_inlines(f, inlines)?;
                writeln!(f)
            }
            ContentBlock::CodeBlock { language, content } => {
                write!(f, "```")?;
                if let Some(language) = language {
                    write!(f, "{}", language)?;
                }
                writeln!(f)?;
                write!(f, "{}", content)?;
                if !content.ends_with('\n') {
                    writeln!(f)?;
                }
                writeln!(f, "```")
            }
            ContentBlock::Blockquote(blocks) => {
                let inner = join_blocks(blocks);
                for line in inner.lines() {
                    if line.is_empty() {
                        writeln!(f, ">")?;
                    } else {
                        writeln!(f, "> {}", line)?;
                    }
                }
                Ok(())
            }
            ContentBlock::Table(table) => write!(f, "{}", table),
            ContentBlock::OrderedList { start, items } => {
                for (offset, item) in items.iter().enumerate() {
                    let marker = format!("{}. ", start + offset as u64);
                    write_list_item(f, &marker, item)?;
                }
                Ok(())
            }
            ContentBlock::UnorderedList { items } => {
                for item in items {
                    write_list_item(f, "- ", item)?;
                }
                Ok(())
            }
            ContentBlock::ThematicBreak => writeln!(f, "---"),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|")?;
        for cell in &self.header {
            write!(f, " ")?;
            write_inlines(f, cell)?;
            write!(f, " |")?;
        }
        writeln!(f)?;
        write!(f, "|")?;
        for column in 0..self.header.len() {
            let alignment = self
                .alignments
                .get(column)
                .copied()
                .unwrap_or(ColumnAlignment::None);
            let rule = match alignment {
                ColumnAlignment::None => "---",
                ColumnAlignment::Left => ":---",
                ColumnAlignment::Center => ":---:",
                ColumnAlignment::Right => "---:",
            };
            write!(f, " {} |", rule)?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "|")?;
            for cell in row {
                write!(f, " ")?;
                write_inlines(f, cell)?;
                write!(f, " |")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Inline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inline::Text(text) => write!(f, "{}", text),
            Inline::Code(code) => write!(f, "`{}`", code),
            Inline::Strong(children) => {
                write!(f, "**")?;
                write_inlines(f, children)?;
                write!(f, "**")
            }
            Inline::Emphasis(children) => {
                write!(f, "*")?;
                write_inlines(f, children)?;
                write!(f, "*")
            }
            Inline::Strikethrough(children) => {
                write!(f, "~~")?;
                write_inlines(f, children)?;
                write!(f, "~~")
            }
            Inline::Link {
                dest,
                title,
                content,
            } => {
                write!(f, "[")?;
                write_inlines(f, content)?;
                if title.is_empty() {
                    write!(f, "]({})", dest)
                } else {
                    write!(f, "]({} \"{}\")", dest, title)
                }
            }
            Inline::Image { dest, title, alt } => {
                write!(f, "![")?;
                write_inlines(f, alt)?;
                if title.is_empty() {
                    write!(f, "]({})", dest)
                } else {
                    write!(f, "]({} \"{}\")", dest, title)
                }
            }
            Inline::SoftBreak => writeln!(f),
            Inline::HardBreak => writeln!(f, "\\"),
        }
    }
}

fn write_inlines(f: &mut fmt::Formatter<'_>, inlines: &[Inline]) -> fmt::Result {
    for inline in inlines {
        write!(f, "{}", inline)?;
    }
    Ok(())
}

/// Render blocks separated by blank lines.
fn join_blocks(blocks: &[ContentBlock]) -> String {
    let mut out = String::new();
    for (idx, block) in blocks.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&block.to_string());
    }
    out
}

/// Render one list item: the marker on the first line, continuation lines
/// indented to the marker's width.
fn write_list_item(f: &mut fmt::Formatter<'_>, marker: &str, item: &[ContentBlock]) -> fmt::Result {
    let body = join_blocks(item);
    if body.is_empty() {
        return writeln!(f, "{}", marker.trim_end());
    }
    for (idx, line) in body.lines().enumerate() {
        if idx == 0 {
            writeln!(f, "{}{}", marker, line)?;
        } else if line.is_empty() {
            writeln!(f)?;
        } else {
            writeln!(f, "{}{}", " ".repeat(marker.len()), line)?;
        }
    }
    Ok(())
}
