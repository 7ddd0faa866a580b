//! HTML rendering for the shared document model
//!
//! Pipeline: Blocks → RcDom → HTML string. Building a DOM and letting
//! html5ever serialize it keeps escaping of text and attributes in one place.

use super::{Block, Inline, ListItem};
use crate::error::FilterError;
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

/// How [`Block::Section`] is wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionStyle {
    /// `<div class="section" id="...">`
    #[default]
    Div,
    /// `<section id="...">`
    Section,
}

/// Render blocks to an HTML fragment, one top-level element per line
pub fn render_blocks(
    filter: &str,
    blocks: &[Block],
    style: SectionStyle,
) -> Result<String, FilterError> {
    let container = create_element("div", vec![]);
    for block in blocks {
        add_block_to_node(&container, block, style);
    }
    serialize_children(filter, &container)
}

fn add_block_to_node(parent: &Handle, block: &Block, style: SectionStyle) {
    match block {
        Block::Paragraph(content) => {
            let p = create_element("p", vec![]);
            append(parent, &p);
            add_inlines(&p, content);
        }

        Block::Heading { level, content } => {
            let heading = create_element(&heading_tag(*level), vec![]);
            append(parent, &heading);
            add_inlines(&heading, content);
        }

        Block::Section {
            id,
            level,
            title,
            children,
        } => {
            let wrapper = match style {
                SectionStyle::Div => {
                    create_element("div", vec![("class", "section"), ("id", id.as_str())])
                }
                SectionStyle::Section => create_element("section", vec![("id", id.as_str())]),
            };
            append(parent, &wrapper);

            let heading = create_element(&heading_tag(*level), vec![]);
            append(&wrapper, &heading);
            add_inlines(&heading, title);

            for child in children {
                add_block_to_node(&wrapper, child, style);
            }
        }

        Block::List { ordered, items } => {
            let list = create_element(if *ordered { "ol" } else { "ul" }, vec![]);
            append(parent, &list);
            for item in items {
                add_list_item(&list, item, style);
            }
        }

        Block::CodeBlock { language, literal } => {
            let pre = create_element("pre", vec![]);
            append(parent, &pre);
            let class = language.as_ref().map(|lang| format!("language-{lang}"));
            let code = match &class {
                Some(class) => create_element("code", vec![("class", class.as_str())]),
                None => create_element("code", vec![]),
            };
            append(&pre, &code);
            append(&code, &create_text(literal));
        }

        Block::BlockQuote(children) => {
            let quote = create_element("blockquote", vec![]);
            append(parent, &quote);
            for child in children {
                add_block_to_node(&quote, child, style);
            }
        }

        Block::ThematicBreak => append(parent, &create_element("hr", vec![])),
    }
}

fn add_list_item(list: &Handle, item: &ListItem, style: SectionStyle) {
    let li = create_element("li", vec![]);
    append(list, &li);
    add_inlines(&li, &item.content);
    for child in &item.children {
        add_block_to_node(&li, child, style);
    }
}

fn add_inlines(parent: &Handle, inlines: &[Inline]) {
    for inline in inlines {
        add_inline_to_node(parent, inline);
    }
}

fn add_inline_to_node(parent: &Handle, inline: &Inline) {
    let wrap = |tag: &str, children: &[Inline]| {
        let element = create_element(tag, vec![]);
        append(parent, &element);
        add_inlines(&element, children);
    };

    match inline {
        Inline::Text(text) => append(parent, &create_text(text)),
        Inline::Strong(children) => wrap("strong", children),
        Inline::Emphasis(children) => wrap("em", children),
        Inline::Deleted(children) => wrap("del", children),
        Inline::Inserted(children) => wrap("ins", children),
        Inline::Superscript(children) => wrap("sup", children),
        Inline::Subscript(children) => wrap("sub", children),
        Inline::Code(code_text) => {
            let code = create_element("code", vec![]);
            append(&code, &create_text(code_text));
            append(parent, &code);
        }
        Inline::Link { href, content } => {
            let anchor = create_element("a", vec![("href", href.as_str())]);
            append(parent, &anchor);
            add_inlines(&anchor, content);
        }
        Inline::Image { src, alt } => {
            let img = create_element("img", vec![("src", src.as_str()), ("alt", alt.as_str())]);
            append(parent, &img);
        }
        Inline::LineBreak => append(parent, &create_element("br", vec![])),
    }
}

fn heading_tag(level: u8) -> String {
    format!("h{}", level.clamp(1, 6))
}

fn append(parent: &Handle, child: &Handle) {
    parent.children.borrow_mut().push(child.clone());
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Escape `text` for use as element content
pub fn escape_text(filter: &str, text: &str) -> Result<String, FilterError> {
    let holder = create_element("p", vec![]);
    append(&holder, &create_text(text));
    serialize_node(filter, &holder, TraversalScope::ChildrenOnly(None))
}

/// Serialize each child of `container`, one per line
fn serialize_children(filter: &str, container: &Handle) -> Result<String, FilterError> {
    let mut html = String::new();
    for child in container.children.borrow().iter() {
        html.push_str(&serialize_node(filter, child, TraversalScope::IncludeNode)?);
        html.push('\n');
    }
    Ok(html)
}

fn serialize_node(
    filter: &str,
    node: &Handle,
    traversal_scope: TraversalScope,
) -> Result<String, FilterError> {
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };

    let mut output = Vec::new();
    let serializable = SerializableHandle::from(node.clone());
    serialize(&mut output, &serializable, opts)
        .map_err(|e| FilterError::render(filter, format!("HTML serialization failed: {e}")))?;
    String::from_utf8(output)
        .map_err(|e| FilterError::render(filter, format!("UTF-8 conversion failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn renders_paragraph_with_escaping() {
        let blocks = vec![Block::Paragraph(vec![
            text("a < b & "),
            Inline::Strong(vec![text("c")]),
        ])];
        let html = render_blocks("test", &blocks, SectionStyle::Div).unwrap();
        assert_eq!(html, "<p>a &lt; b &amp; <strong>c</strong></p>\n");
    }

    #[test]
    fn escapes_bare_text() {
        assert_eq!(
            escape_text("test", "<b>x</b> & \"y\"").unwrap(),
            "&lt;b&gt;x&lt;/b&gt; &amp; \"y\""
        );
        assert_eq!(escape_text("test", "line\nbreak").unwrap(), "line\nbreak");
    }

    #[test]
    fn renders_sections_in_both_styles() {
        let blocks = vec![Block::Section {
            id: "intro".to_string(),
            level: 2,
            title: vec![text("Intro")],
            children: vec![Block::Paragraph(vec![text("Body")])],
        }];

        let div = render_blocks("test", &blocks, SectionStyle::Div).unwrap();
        assert_eq!(
            div,
            "<div class=\"section\" id=\"intro\"><h2>Intro</h2><p>Body</p></div>\n"
        );

        let section = render_blocks("test", &blocks, SectionStyle::Section).unwrap();
        assert_eq!(
            section,
            "<section id=\"intro\"><h2>Intro</h2><p>Body</p></section>\n"
        );
    }

    #[test]
    fn renders_nested_lists_and_code() {
        let blocks = vec![
            Block::List {
                ordered: false,
                items: vec![ListItem {
                    content: vec![text("one")],
                    children: vec![Block::List {
                        ordered: true,
                        items: vec![ListItem {
                            content: vec![text("inner")],
                            children: vec![],
                        }],
                    }],
                }],
            },
            Block::CodeBlock {
                language: Some("rust".to_string()),
                literal: "let x = 1 < 2;".to_string(),
            },
        ];
        let html = render_blocks("test", &blocks, SectionStyle::Div).unwrap();
        assert!(html.contains("<ul><li>one<ol><li>inner</li></ol></li></ul>"));
        assert!(html.contains("<pre><code class=\"language-rust\">let x = 1 &lt; 2;</code></pre>"));
    }

    #[test]
    fn renders_void_elements() {
        let blocks = vec![Block::Paragraph(vec![
            text("a"),
            Inline::LineBreak,
            Inline::Image {
                src: "x.png".to_string(),
                alt: "X".to_string(),
            },
        ])];
        let html = render_blocks("test", &blocks, SectionStyle::Div).unwrap();
        assert_eq!(html, "<p>a<br><img src=\"x.png\" alt=\"X\"></p>\n");
    }
}
