//! Textile parsing (Textile → document model)
//!
//! Blocks are separated by blank lines. A block may start with a signature
//! (`h1.`…`h6.`, `p.`, `bq.`, `bc.`); unsigned blocks whose lines all start
//! with `*` or `#` markers are lists, anything else is a paragraph.

use crate::filters::common::{Block, CloserIndex, Inline, ListItem};
use once_cell::sync::Lazy;
use regex::Regex;

static SIGNATURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(h[1-6]|p|bq|bc)\.\s?(.*)$").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([*#]+)\s+(.*)$").unwrap());

/// Parse Textile source into blocks
pub fn parse_textile(source: &str) -> Vec<Block> {
    let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
    split_blocks(&normalized)
        .into_iter()
        .flat_map(|lines| parse_block(&lines))
        .collect()
}

fn split_blocks(source: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in source.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_block(lines: &[&str]) -> Vec<Block> {
    let Some(first) = lines.first() else {
        return Vec::new();
    };

    if let Some(caps) = SIGNATURE.captures(first) {
        let signature = caps.get(1).map_or("", |m| m.as_str());
        let mut body_lines = vec![caps.get(2).map_or("", |m| m.as_str())];
        body_lines.extend_from_slice(&lines[1..]);
        let body = body_lines.join("\n");

        return vec![match signature {
            "p" => Block::Paragraph(parse_inlines(body.trim())),
            "bq" => Block::BlockQuote(vec![Block::Paragraph(parse_inlines(body.trim()))]),
            "bc" => Block::CodeBlock {
                language: None,
                literal: body,
            },
            heading => Block::Heading {
                level: heading[1..].parse().unwrap_or(1),
                content: parse_inlines(body.trim()),
            },
        }];
    }

    if LIST_ITEM.is_match(first) {
        return parse_list(lines);
    }

    vec![Block::Paragraph(parse_inlines(lines.join("\n").trim()))]
}

struct RawItem {
    depth: usize,
    ordered: bool,
    content: Vec<Inline>,
}

/// One block of list lines. Yields several lists when the marker type
/// changes between siblings.
fn parse_list(lines: &[&str]) -> Vec<Block> {
    let mut raw: Vec<(usize, bool, String)> = Vec::new();
    for line in lines {
        if let Some(caps) = LIST_ITEM.captures(line) {
            let markers = caps.get(1).map_or("", |m| m.as_str());
            let text = caps.get(2).map_or("", |m| m.as_str());
            let ordered = markers.ends_with('#');
            raw.push((markers.len(), ordered, text.to_string()));
        } else if let Some(last) = raw.last_mut() {
            // Continuation line of the previous item
            last.2.push('\n');
            last.2.push_str(line.trim());
        }
    }

    let items: Vec<RawItem> = raw
        .into_iter()
        .map(|(depth, ordered, text)| RawItem {
            depth,
            ordered,
            content: parse_inlines(&text),
        })
        .collect();

    // Nothing is shallower than the shallowest item, so this consumes everything
    let depth = items.iter().map(|item| item.depth).min().unwrap_or(1);
    let mut pos = 0;
    build_lists(&items, &mut pos, depth)
}

fn build_lists(items: &[RawItem], pos: &mut usize, depth: usize) -> Vec<Block> {
    let mut lists = Vec::new();
    let mut current: Option<(bool, Vec<ListItem>)> = None;

    while let Some(item) = items.get(*pos) {
        if item.depth < depth {
            break;
        }

        if item.depth == depth {
            if current.as_ref().is_some_and(|(ordered, _)| *ordered != item.ordered) {
                lists.extend(finish_list(current.take()));
            }
            let (_, list_items) = current.get_or_insert_with(|| (item.ordered, Vec::new()));
            list_items.push(ListItem {
                content: item.content.clone(),
                children: vec![],
            });
            *pos += 1;
        } else {
            let ordered = item.ordered;
            let nested = build_lists(items, pos, item.depth);
            let (_, list_items) = current.get_or_insert_with(|| (ordered, Vec::new()));
            if list_items.is_empty() {
                list_items.push(ListItem::default());
            }
            if let Some(parent) = list_items.last_mut() {
                parent.children.extend(nested);
            }
        }
    }

    lists.extend(finish_list(current));
    lists
}

fn finish_list(list: Option<(bool, Vec<ListItem>)>) -> Option<Block> {
    list.map(|(ordered, items)| Block::List { ordered, items })
}

#[derive(Clone, Copy)]
enum SpanKind {
    Strong,
    Emphasis,
    Code,
    Deleted,
    Inserted,
    Superscript,
    Subscript,
}

/// Inline delimiters, longest first so `**` wins over `*`
const SPANS: &[(&str, SpanKind, bool)] = &[
    ("**", SpanKind::Strong, true),
    ("__", SpanKind::Emphasis, true),
    ("*", SpanKind::Strong, true),
    ("_", SpanKind::Emphasis, true),
    ("@", SpanKind::Code, true),
    ("-", SpanKind::Deleted, true),
    ("+", SpanKind::Inserted, true),
    ("^", SpanKind::Superscript, false),
    ("~", SpanKind::Subscript, false),
];

/// Parse Textile inline markup
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    let closers: Vec<CloserIndex> = SPANS
        .iter()
        .map(|(delim, _, word_boundary)| closer_index(&chars, delim, *word_boundary))
        .collect();
    let mut out = Vec::new();
    let mut buffer = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            flush(&mut buffer, &mut out);
            out.push(Inline::LineBreak);
            i += 1;
            continue;
        }

        if c == '"' {
            if let Some((link, next)) = parse_link(&chars, i) {
                flush(&mut buffer, &mut out);
                out.push(link);
                i = next;
                continue;
            }
        }

        if c == '!' {
            if let Some((image, next)) = parse_image(&chars, i) {
                flush(&mut buffer, &mut out);
                out.push(image);
                i = next;
                continue;
            }
        }

        if let Some((span, next)) = parse_span(&chars, &closers, i) {
            flush(&mut buffer, &mut out);
            out.push(span);
            i = next;
            continue;
        }

        buffer.push(c);
        i += 1;
    }

    flush(&mut buffer, &mut out);
    out
}

fn flush(buffer: &mut String, out: &mut Vec<Inline>) {
    if !buffer.is_empty() {
        out.push(Inline::Text(std::mem::take(buffer)));
    }
}

fn starts_with_at(chars: &[char], at: usize, delim: &str) -> bool {
    let mut idx = at;
    for d in delim.chars() {
        if chars.get(idx) != Some(&d) {
            return false;
        }
        idx += 1;
    }
    true
}

fn parse_span(chars: &[char], closers: &[CloserIndex], at: usize) -> Option<(Inline, usize)> {
    for ((delim, kind, word_boundary), closer) in SPANS.iter().zip(closers) {
        if !starts_with_at(chars, at, delim) {
            continue;
        }
        let len = delim.chars().count();

        let prev_ok = !*word_boundary || at == 0 || !chars[at - 1].is_alphanumeric();
        let next_ok = chars.get(at + len).is_some_and(|c| !c.is_whitespace());
        if !prev_ok || !next_ok {
            return None;
        }

        // The span holds at least one character
        let close = closer.first_from(at + len + 1)?;
        let inner: String = chars[at + len..close].iter().collect();
        let inline = match kind {
            SpanKind::Code => Inline::Code(inner),
            SpanKind::Strong => Inline::Strong(parse_inlines(&inner)),
            SpanKind::Emphasis => Inline::Emphasis(parse_inlines(&inner)),
            SpanKind::Deleted => Inline::Deleted(parse_inlines(&inner)),
            SpanKind::Inserted => Inline::Inserted(parse_inlines(&inner)),
            SpanKind::Superscript => Inline::Superscript(parse_inlines(&inner)),
            SpanKind::Subscript => Inline::Subscript(parse_inlines(&inner)),
        };
        return Some((inline, close + len));
    }
    None
}

/// Where `delim` can close a span: after a non-space, and for word
/// delimiters not followed by a letter or digit
fn closer_index(chars: &[char], delim: &str, word_boundary: bool) -> CloserIndex {
    let len = delim.chars().count();
    CloserIndex::build(chars.len(), |j| {
        starts_with_at(chars, j, delim)
            && !chars[j - 1].is_whitespace()
            && (!word_boundary || chars.get(j + len).map_or(true, |c| !c.is_alphanumeric()))
    })
}

/// `"link text":url`
fn parse_link(chars: &[char], at: usize) -> Option<(Inline, usize)> {
    let close_quote = (at + 1..chars.len()).find(|&j| chars[j] == '"')?;
    if close_quote == at + 1 || chars.get(close_quote + 1) != Some(&':') {
        return None;
    }

    let url_start = close_quote + 2;
    let mut url_end = url_start;
    while url_end < chars.len() && !chars[url_end].is_whitespace() {
        url_end += 1;
    }
    // Trailing punctuation belongs to the sentence, not the URL
    while url_end > url_start && matches!(chars[url_end - 1], '.' | ',' | ';' | ':' | '!' | '?' | ')') {
        url_end -= 1;
    }
    if url_end == url_start {
        return None;
    }

    let text: String = chars[at + 1..close_quote].iter().collect();
    let href: String = chars[url_start..url_end].iter().collect();
    Some((
        Inline::Link {
            href,
            content: parse_inlines(&text),
        },
        url_end,
    ))
}

/// `!src!` or `!src(alt text)!`
fn parse_image(chars: &[char], at: usize) -> Option<(Inline, usize)> {
    let close = (at + 1..chars.len()).find(|&j| chars[j] == '!')?;
    let inner: String = chars[at + 1..close].iter().collect();
    if inner.is_empty() {
        return None;
    }

    let (src, alt) = match (inner.find('('), inner.ends_with(')')) {
        (Some(open), true) => (
            inner[..open].to_string(),
            inner[open + 1..inner.len() - 1].to_string(),
        ),
        _ => (inner.clone(), String::new()),
    };
    if src.is_empty() || src.chars().any(char::is_whitespace) {
        return None;
    }

    Some((Inline::Image { src, alt }, close + 1))
}
