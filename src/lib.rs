pub mod anchor;
pub mod content;
pub mod document;
pub mod links;
pub mod parser;
pub mod render;
pub mod section;
pub mod toc;

pub use document::Document;
pub use links::{BrokenAnchor, InternalLink};
pub use parser::{MalformedDocument, Parser};
pub use section::Section;
pub use toc::{Toc, TocEntry};
