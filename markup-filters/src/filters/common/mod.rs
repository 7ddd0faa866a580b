//! Document model shared by the hand-parsed markup languages
//!
//! Textile and reStructuredText parsers produce [`Block`]s; [`html`] renders
//! them. The model only carries what those two languages need.

pub mod html;

/// Block-level element
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    /// A titled section wrapping its own blocks
    Section {
        id: String,
        level: u8,
        title: Vec<Inline>,
        children: Vec<Block>,
    },
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    CodeBlock {
        language: Option<String>,
        literal: String,
    },
    BlockQuote(Vec<Block>),
    ThematicBreak,
}

/// One list entry: its inline text plus any nested blocks
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    pub content: Vec<Inline>,
    pub children: Vec<Block>,
}

/// Inline element
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Code(String),
    Deleted(Vec<Inline>),
    Inserted(Vec<Inline>),
    Superscript(Vec<Inline>),
    Subscript(Vec<Inline>),
    Link {
        href: String,
        content: Vec<Inline>,
    },
    Image {
        src: String,
        alt: String,
    },
    LineBreak,
}

/// Build an id from a title the way section anchors usually look:
/// lowercase ASCII alphanumerics joined by single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

/// Plain text of a run of inlines (used for ids and alt text)
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Strong(children)
            | Inline::Emphasis(children)
            | Inline::Deleted(children)
            | Inline::Inserted(children)
            | Inline::Superscript(children)
            | Inline::Subscript(children)
            | Inline::Link {
                content: children, ..
            } => out.push_str(&plain_text(children)),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::LineBreak => out.push(' '),
        }
    }
    out
}

/// Positions in a run of text where a closing delimiter may sit.
///
/// Built once per inline parse so that looking for the end of a span is a
/// binary search instead of a scan to the end of the text.
#[derive(Debug, Default)]
pub struct CloserIndex {
    positions: Vec<usize>,
}

impl CloserIndex {
    /// Collect every position in `1..len` for which `is_closer` holds
    pub fn build(len: usize, is_closer: impl Fn(usize) -> bool) -> Self {
        Self {
            positions: (1..len).filter(|&j| is_closer(j)).collect(),
        }
    }

    /// First closer at or after `from`
    pub fn first_from(&self, from: usize) -> Option<usize> {
        let idx = self.positions.partition_point(|&pos| pos < from);
        self.positions.get(idx).copied()
    }
}
