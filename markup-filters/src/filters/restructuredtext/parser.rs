//! reStructuredText parser
//!
//! Line-oriented block parser producing the shared document model. Section
//! titles are collected flat first, then folded into nested
//! [`Block::Section`]s once every adornment style has been seen, since reST
//! levels are defined by the order in which styles first appear.

use crate::filters::common::{plain_text, slugify, Block, CloserIndex, Inline, ListItem};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use url::Url;

static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\.\.\s+([A-Za-z][\w-]*)::\s*(.*)$").unwrap());
static TARGET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.\.\s+_([^:]+):\s*(\S*)\s*$").unwrap());
static ENUMERATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\d+|#)[.)](\s+)\S").unwrap());

const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
const START_PRECEDING: &str = "'\"([{<-/:";
const END_FOLLOWING: &str = "'\")]}>-/:.,;!?\\";
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')', '\'', '"'];

/// Document-level switches that change how titles are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSettings {
    /// Drop a lone leading top-level title from the body
    pub doctitle_xform: bool,
    /// Heading level used for the outermost sections
    pub initial_header_level: u8,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self {
            doctitle_xform: true,
            initial_header_level: 1,
        }
    }
}

/// Parse reStructuredText source into blocks
pub fn parse_restructuredtext(source: &str, settings: &ParseSettings) -> Vec<Block> {
    let lines: Vec<String> = source
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(|line| line.replace('\t', "        ").trim_end().to_string())
        .collect();

    let parser = Parser::new(&lines);
    let items = parser.parse_lines(&lines, true);
    fold_sections(items, settings)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Style {
    ch: char,
    overline: bool,
}

#[derive(Debug)]
enum Item {
    Title { style: Style, title: Vec<Inline> },
    Block(Block),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet(char),
    Enumerated,
}

struct Parser {
    targets: HashMap<String, String>,
}

impl Parser {
    fn new(lines: &[String]) -> Self {
        let targets = lines
            .iter()
            .filter_map(|line| TARGET.captures(line.trim_start()))
            .filter(|caps| !caps[2].is_empty())
            .map(|caps| (normalize_name(&caps[1]), caps[2].to_string()))
            .collect();
        Self { targets }
    }

    fn parse_lines(&self, lines: &[String], allow_titles: bool) -> Vec<Item> {
        let mut items = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];
            if line.is_empty() {
                i += 1;
                continue;
            }

            if indent_of(line) > 0 {
                let end = indented_end(lines, i);
                let body = dedent(&lines[i..end]);
                let children = into_blocks(self.parse_lines(&body, false));
                items.push(Item::Block(Block::BlockQuote(children)));
                i = end;
                continue;
            }

            if allow_titles {
                if let Some((item, next)) = self.title_at(lines, i) {
                    items.push(item);
                    i = next;
                    continue;
                }
            }

            if is_transition(lines, i) {
                items.push(Item::Block(Block::ThematicBreak));
                i += 1;
                continue;
            }

            if line == ".." || line.starts_with(".. ") {
                let (block, next) = self.explicit_markup(lines, i);
                items.extend(block.map(Item::Block));
                i = next;
                continue;
            }

            if let Some((kind, _)) = list_marker(line) {
                let (block, next) = self.parse_list(lines, i, kind);
                items.push(Item::Block(block));
                i = next;
                continue;
            }

            i = self.parse_paragraph(lines, i, &mut items);
        }

        items
    }

    /// Paragraph starting at `start`, plus the literal block a trailing `::` introduces
    fn parse_paragraph(&self, lines: &[String], start: usize, items: &mut Vec<Item>) -> usize {
        let mut i = start;
        while i < lines.len() && !lines[i].is_empty() && indent_of(&lines[i]) == 0 {
            i += 1;
        }

        let mut text = lines[start..i].join("\n");
        let literal_follows = text.ends_with("::");
        if literal_follows {
            let head = &text[..text.len() - 2];
            text = if head.is_empty() || head.ends_with(char::is_whitespace) {
                head.trim_end().to_string()
            } else {
                format!("{head}:")
            };
        }

        if !text.is_empty() {
            items.push(Item::Block(Block::Paragraph(self.parse_inlines(&text))));
        }

        if literal_follows {
            let mut j = i;
            while j < lines.len() && lines[j].is_empty() {
                j += 1;
            }
            if j < lines.len() && indent_of(&lines[j]) > 0 {
                let end = indented_end(lines, j);
                items.push(Item::Block(Block::CodeBlock {
                    language: None,
                    literal: dedent(&lines[j..end]).join("\n"),
                }));
                return end;
            }
        }

        i
    }

    fn title_at(&self, lines: &[String], i: usize) -> Option<(Item, usize)> {
        let line = &lines[i];

        if let Some(ch) = adornment_char(line) {
            let text = lines.get(i + 1)?;
            let under = lines.get(i + 2)?;
            if text.trim().is_empty() || adornment_char(under) != Some(ch) {
                return None;
            }
            let title = self.parse_inlines(text.trim());
            let style = Style { ch, overline: true };
            return Some((Item::Title { style, title }, i + 3));
        }

        let under = lines.get(i + 1)?;
        let ch = adornment_char(under)?;
        if under.chars().count() < line.chars().count() {
            return None;
        }
        let title = self.parse_inlines(line.trim());
        let style = Style {
            ch,
            overline: false,
        };
        Some((Item::Title { style, title }, i + 2))
    }

    /// `..` blocks: directives, hyperlink targets and comments
    fn explicit_markup(&self, lines: &[String], i: usize) -> (Option<Block>, usize) {
        let end = indented_end(lines, i + 1).max(i + 1);

        let Some(caps) = DIRECTIVE.captures(&lines[i]) else {
            return (None, end);
        };

        match &caps[1] {
            "code-block" | "code" | "sourcecode" => {
                let mut body = dedent(&lines[i + 1..end]);
                let options = body
                    .iter()
                    .take_while(|line| line.starts_with(':'))
                    .count();
                body.drain(..options);
                while body.first().is_some_and(|line| line.is_empty()) {
                    body.remove(0);
                }

                let language = caps[2].trim();
                let block = Block::CodeBlock {
                    language: (!language.is_empty()).then(|| language.to_string()),
                    literal: body.join("\n"),
                };
                (Some(block), end)
            }
            other => {
                debug!(directive = other, "skipping unsupported reST directive");
                (None, end)
            }
        }
    }

    fn parse_list(&self, lines: &[String], start: usize, kind: ListKind) -> (Block, usize) {
        let mut items = Vec::new();
        let mut i = start;

        while i < lines.len() {
            let line = &lines[i];
            if line.is_empty() {
                i += 1;
                continue;
            }

            let content_col = match list_marker(line) {
                Some((found, col)) if found == kind && indent_of(line) == 0 => col,
                _ => break,
            };

            let end = indented_end(lines, i + 1).max(i + 1);
            let mut body = vec![line[content_col..].to_string()];
            body.extend(dedent(&lines[i + 1..end]));

            let mut blocks = into_blocks(self.parse_lines(&body, false)).into_iter();
            let item = match blocks.next() {
                Some(Block::Paragraph(content)) => ListItem {
                    content,
                    children: blocks.collect(),
                },
                Some(first) => ListItem {
                    content: Vec::new(),
                    children: std::iter::once(first).chain(blocks).collect(),
                },
                None => ListItem::default(),
            };
            items.push(item);
            i = end;
        }

        let block = Block::List {
            ordered: kind == ListKind::Enumerated,
            items,
        };
        (block, i)
    }

    fn parse_inlines(&self, text: &str) -> Vec<Inline> {
        let chars: Vec<char> = text.chars().collect();
        let closers = Closers::new(&chars);
        let mut inlines = Vec::new();
        let mut buffer = String::new();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];

            if ch == '\\' && i + 1 < chars.len() {
                if !chars[i + 1].is_whitespace() {
                    buffer.push(chars[i + 1]);
                }
                i += 2;
                continue;
            }

            if starts_markup(&chars, i) {
                if let Some((inline, next)) = self.inline_markup(&chars, &closers, i) {
                    flush(&mut buffer, &mut inlines);
                    inlines.push(inline);
                    i = next;
                    continue;
                }
            }

            if let Some((inline, next)) = standalone_url(&chars, i) {
                flush(&mut buffer, &mut inlines);
                inlines.push(inline);
                i = next;
                continue;
            }

            if ch.is_alphanumeric() && (i == 0 || !chars[i - 1].is_alphanumeric()) {
                let mut end = i;
                while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '-') {
                    end += 1;
                }
                let word: String = chars[i..end].iter().collect();
                if let Some(link) = self.simple_reference(&chars, end, &word) {
                    flush(&mut buffer, &mut inlines);
                    inlines.push(link);
                    i = end + 1;
                } else {
                    buffer.push_str(&word);
                    i = end;
                }
                continue;
            }

            buffer.push(ch);
            i += 1;
        }

        flush(&mut buffer, &mut inlines);
        inlines
    }

    fn inline_markup(
        &self,
        chars: &[char],
        closers: &Closers,
        i: usize,
    ) -> Option<(Inline, usize)> {
        if starts_with(chars, i, "``") {
            let end = closers.literal.first_from(i + 3)?;
            let literal: String = chars[i + 2..end].iter().collect();
            return Some((Inline::Code(literal), end + 2));
        }

        if starts_with(chars, i, "**") {
            let end = closers.strong.first_from(i + 3)?;
            let inner: String = chars[i + 2..end].iter().collect();
            return Some((Inline::Strong(vec![Inline::Text(inner)]), end + 2));
        }

        match chars[i] {
            '*' => {
                let end = closers.emphasis.first_from(i + 2)?;
                let inner: String = chars[i + 1..end].iter().collect();
                Some((Inline::Emphasis(vec![Inline::Text(inner)]), end + 1))
            }
            '`' => self.interpreted(chars, closers, i),
            ':' => role(chars, closers, i),
            _ => None,
        }
    }

    /// `` `text <url>`_ ``, `` `name`_ `` and plain `` `title` ``
    fn interpreted(
        &self,
        chars: &[char],
        closers: &Closers,
        i: usize,
    ) -> Option<(Inline, usize)> {
        let close = closers.backquote.first_from(i + 2)?;
        let inner: String = chars[i + 1..close].iter().collect();

        let underscores = chars[close + 1..]
            .iter()
            .take(2)
            .take_while(|ch| **ch == '_')
            .count();
        let end = close + 1 + underscores;
        if !ends_markup(chars, end) {
            return None;
        }

        if underscores == 0 {
            return Some((Inline::Emphasis(vec![Inline::Text(inner)]), end));
        }

        if let Some((text, url)) = embedded_uri(&inner) {
            let link = Inline::Link {
                href: url,
                content: vec![Inline::Text(text)],
            };
            return Some((link, end));
        }

        let inline = match self.targets.get(&normalize_name(&inner)) {
            Some(href) => Inline::Link {
                href: href.clone(),
                content: vec![Inline::Text(inner)],
            },
            None => Inline::Text(inner),
        };
        Some((inline, end))
    }

    /// `word_` pointing at a `.. _word: url` target
    fn simple_reference(&self, chars: &[char], end: usize, word: &str) -> Option<Inline> {
        if chars.get(end) != Some(&'_') || !ends_markup(chars, end + 1) {
            return None;
        }
        let href = self.targets.get(&normalize_name(word))?;
        Some(Inline::Link {
            href: href.clone(),
            content: vec![Inline::Text(word.to_string())],
        })
    }
}

/// `:role:`text`` for the handful of standard roles with an HTML counterpart
fn role(chars: &[char], closers: &Closers, i: usize) -> Option<(Inline, usize)> {
    let mut j = i + 1;
    while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '-') {
        j += 1;
    }
    if j == i + 1 || !starts_with(chars, j, ":`") {
        return None;
    }
    let name: String = chars[i + 1..j].iter().collect();
    let close = closers.backquote.first_from(j + 3)?;
    if !ends_markup(chars, close + 1) {
        return None;
    }
    let text: String = chars[j + 2..close].iter().collect();
    let content = vec![Inline::Text(text.clone())];

    let inline = match name.as_str() {
        "code" | "literal" => Inline::Code(text),
        "emphasis" | "title-reference" | "title" | "t" => Inline::Emphasis(content),
        "strong" => Inline::Strong(content),
        "sub" | "subscript" => Inline::Subscript(content),
        "sup" | "superscript" => Inline::Superscript(content),
        _ => Inline::Text(text),
    };
    Some((inline, close + 1))
}

fn standalone_url(chars: &[char], i: usize) -> Option<(Inline, usize)> {
    if !(starts_with(chars, i, "http://") || starts_with(chars, i, "https://")) {
        return None;
    }
    if i > 0 && !(chars[i - 1].is_whitespace() || "(<[".contains(chars[i - 1])) {
        return None;
    }

    let mut end = i;
    while end < chars.len() && !chars[end].is_whitespace() && !"<>".contains(chars[end]) {
        end += 1;
    }
    while end > i && URL_TRAILING.contains(&chars[end - 1]) {
        end -= 1;
    }

    let candidate: String = chars[i..end].iter().collect();
    let url = Url::parse(&candidate).ok()?;
    url.host_str()?;
    let link = Inline::Link {
        href: candidate.clone(),
        content: vec![Inline::Text(candidate)],
    };
    Some((link, end))
}

/// Split `text <url>` into its parts
fn embedded_uri(inner: &str) -> Option<(String, String)> {
    let body = inner.strip_suffix('>')?;
    let open = body.rfind('<')?;
    let url = body[open + 1..].trim();
    if url.is_empty() {
        return None;
    }
    let text = body[..open].trim();
    let text = if text.is_empty() { url } else { text };
    Some((text.to_string(), url.to_string()))
}

/// Inline markup may start at `i` when preceded by whitespace or opening punctuation
fn starts_markup(chars: &[char], i: usize) -> bool {
    if !"*`:".contains(chars[i]) {
        return false;
    }
    let preceded = i == 0 || chars[i - 1].is_whitespace() || START_PRECEDING.contains(chars[i - 1]);
    let followed = chars.get(i + 1).is_some_and(|ch| !ch.is_whitespace());
    preceded && followed
}

/// Inline markup may end before `i` when followed by whitespace, punctuation or the end
fn ends_markup(chars: &[char], i: usize) -> bool {
    match chars.get(i) {
        None => true,
        Some(ch) => ch.is_whitespace() || END_FOLLOWING.contains(*ch),
    }
}

/// End positions for each inline delimiter, indexed once per text run
struct Closers {
    literal: CloserIndex,
    strong: CloserIndex,
    emphasis: CloserIndex,
    backquote: CloserIndex,
}

impl Closers {
    fn new(chars: &[char]) -> Self {
        Self {
            literal: end_index(chars, "``"),
            strong: end_index(chars, "**"),
            emphasis: end_index(chars, "*"),
            backquote: CloserIndex::build(chars.len(), |j| {
                chars[j] == '`' && !chars[j - 1].is_whitespace()
            }),
        }
    }
}

/// Where `delim` may end inline markup: after a non-space that is not a
/// backslash, and followed by whitespace, punctuation or the end
fn end_index(chars: &[char], delim: &str) -> CloserIndex {
    let width = delim.chars().count();
    CloserIndex::build(chars.len(), |j| {
        starts_with(chars, j, delim)
            && !chars[j - 1].is_whitespace()
            && chars[j - 1] != '\\'
            && ends_markup(chars, j + width)
    })
}

fn starts_with(chars: &[char], i: usize, pattern: &str) -> bool {
    let mut idx = i;
    for expected in pattern.chars() {
        if chars.get(idx) != Some(&expected) {
            return false;
        }
        idx += 1;
    }
    true
}

fn flush(buffer: &mut String, inlines: &mut Vec<Inline>) {
    if !buffer.is_empty() {
        inlines.push(Inline::Text(std::mem::take(buffer)));
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// First line after `from` that is neither blank nor indented, with trailing blanks excluded
fn indented_end(lines: &[String], from: usize) -> usize {
    let mut end = from;
    while end < lines.len() && (lines[end].is_empty() || indent_of(&lines[end]) > 0) {
        end += 1;
    }
    while end > from && lines[end - 1].is_empty() {
        end -= 1;
    }
    end
}

fn dedent(lines: &[String]) -> Vec<String> {
    let indent = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or("").to_string())
        .collect()
}

fn adornment_char(line: &str) -> Option<char> {
    let mut chars = line.chars();
    let first = chars.next()?;
    if !ADORNMENT_CHARS.contains(first) || line.len() < 2 {
        return None;
    }
    chars.all(|ch| ch == first).then_some(first)
}

/// A lone adornment line of four or more characters between blank lines
fn is_transition(lines: &[String], i: usize) -> bool {
    let blank_around = (i == 0 || lines[i - 1].is_empty())
        && lines.get(i + 1).map_or(true, |next| next.is_empty());
    adornment_char(&lines[i]).is_some() && lines[i].len() >= 4 && blank_around
}

fn list_marker(line: &str) -> Option<(ListKind, usize)> {
    let mut chars = line.chars();
    let first = chars.next()?;
    if "-*+".contains(first) {
        let spaces = chars.take_while(|ch| *ch == ' ').count();
        return (spaces > 0 && line.len() > 1 + spaces).then_some((ListKind::Bullet(first), 1 + spaces));
    }
    ENUMERATOR
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|spaces| (ListKind::Enumerated, spaces.end()))
}

fn into_blocks(items: Vec<Item>) -> Vec<Block> {
    items
        .into_iter()
        .map(|item| match item {
            Item::Block(block) => block,
            Item::Title { title, .. } => Block::Paragraph(title),
        })
        .collect()
}

struct OpenSection {
    rank: usize,
    id: String,
    title: Vec<Inline>,
    children: Vec<Block>,
}

impl OpenSection {
    fn close(self, initial_header_level: u8) -> Block {
        let level = usize::from(initial_header_level) + self.rank - 1;
        Block::Section {
            id: self.id,
            level: u8::try_from(level).unwrap_or(u8::MAX),
            title: self.title,
            children: self.children,
        }
    }
}

/// Nest blocks under their titles
fn fold_sections(mut items: Vec<Item>, settings: &ParseSettings) -> Vec<Block> {
    if settings.doctitle_xform && is_document_title(&items) {
        items.remove(0);
    }

    let mut ranks: Vec<Style> = Vec::new();
    for item in &items {
        if let Item::Title { style, .. } = item {
            if !ranks.contains(style) {
                ranks.push(*style);
            }
        }
    }

    let mut used_ids = HashSet::new();
    let mut root = Vec::new();
    let mut stack: Vec<OpenSection> = Vec::new();
    let level = settings.initial_header_level;

    for item in items {
        match item {
            Item::Block(block) => match stack.last_mut() {
                Some(open) => open.children.push(block),
                None => root.push(block),
            },
            Item::Title { style, title } => {
                let rank = ranks.iter().position(|s| *s == style).unwrap_or(0) + 1;
                while stack.last().is_some_and(|open| open.rank >= rank) {
                    if let Some(done) = stack.pop() {
                        attach(&mut stack, &mut root, done.close(level));
                    }
                }
                let id = unique_id(&mut used_ids, slugify(&plain_text(&title)));
                stack.push(OpenSection {
                    rank,
                    id,
                    title,
                    children: Vec::new(),
                });
            }
        }
    }

    while let Some(done) = stack.pop() {
        attach(&mut stack, &mut root, done.close(level));
    }
    root
}

fn attach(stack: &mut [OpenSection], root: &mut Vec<Block>, block: Block) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(block),
        None => root.push(block),
    }
}

/// First item is a title whose style no other title shares
fn is_document_title(items: &[Item]) -> bool {
    let Some(Item::Title { style: first, .. }) = items.first() else {
        return false;
    };
    let same_style = items
        .iter()
        .filter(|item| matches!(item, Item::Title { style, .. } if style == first))
        .count();
    same_style == 1
}

fn unique_id(used: &mut HashSet<String>, base: String) -> String {
    let mut id = base.clone();
    let mut n = 1;
    while !used.insert(id.clone()) {
        id = format!("{base}-{n}");
        n += 1;
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<Block> {
        parse_restructuredtext(source, &ParseSettings::default())
    }

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn paragraphs_and_inline_markup() {
        let blocks = parse("Some **bold**, *em* and ``code``.\n\nSecond.");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![
                    text("Some "),
                    Inline::Strong(vec![text("bold")]),
                    text(", "),
                    Inline::Emphasis(vec![text("em")]),
                    text(" and "),
                    Inline::Code("code".to_string()),
                    text("."),
                ]),
                Block::Paragraph(vec![text("Second.")]),
            ]
        );
    }

    #[test]
    fn asterisk_inside_word_is_literal() {
        assert_eq!(parse("2*3*4"), vec![Block::Paragraph(vec![text("2*3*4")])]);
    }

    #[test]
    fn lone_title_is_dropped_as_document_title() {
        let blocks = parse("Title\n=====\n\nBody text.");
        assert_eq!(blocks, vec![Block::Paragraph(vec![text("Body text.")])]);
    }

    #[test]
    fn sections_nest_by_style_order() {
        let source = "One\n===\n\nA\n\nTwo\n===\n\nSub\n---\n\nB";
        let blocks = parse(source);
        assert_eq!(blocks.len(), 2);

        let Block::Section {
            id, level, children, ..
        } = &blocks[1]
        else {
            panic!("expected section, got {:?}", blocks[1]);
        };
        assert_eq!(id, "two");
        assert_eq!(*level, 1);
        assert!(matches!(
            &children[0],
            Block::Section { level: 2, id, .. } if id == "sub"
        ));
    }

    #[test]
    fn overline_style_differs_from_underline_only() {
        let source = "=====\nTop\n=====\n\nIntro\n\nPart\n=====\n\nText";
        let blocks = parse(source);
        // The overlined title is unique, so it becomes the document title
        assert_eq!(blocks[0], Block::Paragraph(vec![text("Intro")]));
        assert!(matches!(&blocks[1], Block::Section { level: 1, id, .. } if id == "part"));
    }

    #[test]
    fn duplicate_titles_get_distinct_ids() {
        let blocks = parse("Notes\n-----\n\nA\n\nNotes\n-----\n\nB");
        let ids: Vec<&str> = blocks
            .iter()
            .filter_map(|block| match block {
                Block::Section { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["notes", "notes-1"]);
    }

    #[test]
    fn bullet_and_enumerated_lists() {
        let blocks = parse("- one\n- two\n\n  - nested\n\n1. first\n#. second");
        assert_eq!(blocks.len(), 2);

        let Block::List { ordered, items } = &blocks[0] else {
            panic!("expected list");
        };
        assert!(!ordered);
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[1].children[0], Block::List { ordered: false, .. }));

        assert!(matches!(&blocks[1], Block::List { ordered: true, items } if items.len() == 2));
    }

    #[test]
    fn literal_block_after_double_colon() {
        let blocks = parse("Example::\n\n    let x = 1;\n      indented\n\nAfter.");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![text("Example:")]),
                Block::CodeBlock {
                    language: None,
                    literal: "let x = 1;\n  indented".to_string(),
                },
                Block::Paragraph(vec![text("After.")]),
            ]
        );
    }

    #[test]
    fn expanded_literal_marker_is_removed() {
        let blocks = parse("Paragraph ::\n\n    code");
        assert_eq!(blocks[0], Block::Paragraph(vec![text("Paragraph")]));

        let blocks = parse("::\n\n    code");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn code_block_directive_keeps_language() {
        let blocks = parse(".. code-block:: python\n   :linenos:\n\n   print('hi')\n");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                language: Some("python".to_string()),
                literal: "print('hi')".to_string(),
            }]
        );
    }

    #[test]
    fn comments_and_unknown_directives_are_skipped() {
        let blocks = parse(".. a comment\n   spanning lines\n\n.. note:: hidden\n\nVisible.");
        assert_eq!(blocks, vec![Block::Paragraph(vec![text("Visible.")])]);
    }

    #[test]
    fn indented_text_is_a_block_quote() {
        let blocks = parse("Intro.\n\n    Quoted text.");
        assert_eq!(
            blocks[1],
            Block::BlockQuote(vec![Block::Paragraph(vec![text("Quoted text.")])])
        );
    }

    #[test]
    fn hyperlinks() {
        let blocks = parse("See `the docs <https://example.com/docs>`_ or https://example.org.");
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![
                text("See "),
                Inline::Link {
                    href: "https://example.com/docs".to_string(),
                    content: vec![text("the docs")],
                },
                text(" or "),
                Inline::Link {
                    href: "https://example.org".to_string(),
                    content: vec![text("https://example.org")],
                },
                text("."),
            ])]
        );
    }

    #[test]
    fn named_targets_resolve_references() {
        let blocks = parse("Read Python_ and `Rust Lang`_.\n\n.. _python: https://python.org\n.. _rust lang: https://rust-lang.org\n");
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![
                text("Read "),
                Inline::Link {
                    href: "https://python.org".to_string(),
                    content: vec![text("Python")],
                },
                text(" and "),
                Inline::Link {
                    href: "https://rust-lang.org".to_string(),
                    content: vec![text("Rust Lang")],
                },
                text("."),
            ])]
        );
    }

    #[test]
    fn roles_and_escapes() {
        let blocks = parse(r"H\ :sub:`2`\ O and \*not em\*");
        let Block::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(inlines.contains(&Inline::Subscript(vec![text("2")])));
        assert_eq!(inlines[0], text("H"));
        assert_eq!(inlines.last(), Some(&text("O and *not em*")));
    }

    #[test]
    fn unclosed_markup_stays_text() {
        let source = "*a ``b `c :sup:`d ".repeat(50);
        assert_eq!(
            parse(&source),
            vec![Block::Paragraph(vec![text(source.trim_end())])]
        );
    }

    #[test]
    fn transition_becomes_rule() {
        let blocks = parse("Above.\n\n----------\n\nBelow.");
        assert_eq!(blocks[1], Block::ThematicBreak);
    }
}
