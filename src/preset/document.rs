//! Preset document model
//!
//! Preset files are a small block-style subset of YAML: nested mappings of
//! plain scalars, with the odd block sequence. The sampler's parser wants
//! scalars unquoted and keys in their original order, and template values
//! such as `+4.52` or `5.00` must come back out exactly as they went in, so
//! scalars are kept as raw text instead of being typed. A scalar that plain
//! style would misread (a ` #`, a leading indicator, edge whitespace) is
//! single-quoted on output.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::error::{MorphError, Result};

/// Spaces per nesting level on output
const INDENT: usize = 2;

/// A value in a preset document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Raw scalar text; empty for a key with no value
    Scalar(String),
    Map(Mapping),
    Seq(Vec<String>),
}

impl Node {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(s)
    }
}

/// An ordered mapping.
///
/// Lookups ignore whitespace around keys, since templates exist with both
/// `Channel 1` and `Channel 1 ` spellings. The stored key text is kept as
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn position(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        self.entries.iter().position(|(k, _)| k.trim() == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// The key text as stored, for a whitespace-insensitive match
    pub fn stored_key(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.entries[i].0.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self.position(key) {
            Some(i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    pub fn get_map(&self, key: &str) -> Option<&Mapping> {
        self.get(key).and_then(Node::as_map)
    }

    pub fn get_map_mut(&mut self, key: &str) -> Option<&mut Mapping> {
        self.get_mut(key).and_then(Node::as_map_mut)
    }

    pub fn get_scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_scalar)
    }

    /// Replace the value under an existing key, keeping its position and
    /// spelling, or append a new entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Rename a key in place. Returns false if `from` is absent.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> bool {
        match self.position(from) {
            Some(i) => {
                self.entries[i].0 = to.into();
                true
            }
            None => false,
        }
    }

    /// The first entry, if any
    pub fn first(&self) -> Option<(&str, &Node)> {
        self.entries.first().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Mapping> for Node {
    fn from(m: Mapping) -> Self {
        Node::Map(m)
    }
}

// ============================================================================
// Parsing
// ============================================================================

#[derive(Debug)]
struct Line<'a> {
    number: usize,
    indent: usize,
    content: &'a str,
}

/// Parse a preset document into its root mapping
pub fn parse(text: &str) -> Result<Mapping> {
    let lines = tokenize(text)?;
    let root_indent = match lines.first() {
        Some(line) => line.indent,
        None => return Ok(Mapping::new()),
    };

    let mut parser = Parser { lines, pos: 0 };
    let root = parser.parse_mapping(root_indent)?;

    if let Some(line) = parser.peek() {
        return Err(parse_error(line.number, "unexpected indentation"));
    }
    Ok(root)
}

fn tokenize(text: &str) -> Result<Vec<Line<'_>>> {
    let mut lines = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let number = i + 1;
        let code = strip_comment(raw);
        if code.trim().is_empty() {
            continue;
        }

        let body = code.trim_start_matches(' ');
        if body.starts_with('\t') {
            return Err(parse_error(number, "tab in indentation"));
        }
        let indent = code.len() - body.len();
        let content = body.trim_end();

        if indent == 0 && content == "---" {
            continue;
        }
        if indent == 0 && content == "..." {
            break;
        }
        lines.push(Line {
            number,
            indent,
            content,
        });
    }
    Ok(lines)
}

/// Drop a trailing `# comment`, leaving `#` inside quotes or words alone
fn strip_comment(raw: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut chars = raw.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match quote {
            // '' inside single quotes is an escaped quote
            Some('\'') if c == '\'' && chars.peek().map(|&(_, n)| n) == Some('\'') => {
                chars.next();
            }
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => {
                let at_boundary = prev.map_or(true, char::is_whitespace);
                if at_boundary && (c == '\'' || c == '"') {
                    quote = Some(c);
                } else if at_boundary && c == '#' {
                    return &raw[..i];
                }
            }
        }
        prev = Some(c);
    }
    raw
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Line<'a>> {
        self.lines.get(self.pos)
    }

    fn parse_mapping(&mut self, indent: usize) -> Result<Mapping> {
        let mut map = Mapping::new();

        while let Some(line) = self.peek() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(parse_error(line.number, "unexpected indentation"));
            }
            if is_seq_item(line.content) {
                return Err(parse_error(
                    line.number,
                    "sequence item where a mapping key was expected",
                ));
            }

            let number = line.number;
            let (key, rest) = split_entry(line)?;
            self.pos += 1;

            let value = if rest.is_empty() {
                self.parse_nested(indent)?
            } else {
                Node::Scalar(unquote(&rest))
            };

            if map.contains_key(&key) {
                return Err(parse_error(number, &format!("duplicate key '{}'", key.trim())));
            }
            map.entries.push((key, value));
        }

        Ok(map)
    }

    /// Value of a `key:` line with nothing after the colon
    fn parse_nested(&mut self, parent_indent: usize) -> Result<Node> {
        let (indent, seq) = match self.peek() {
            Some(next) if next.indent > parent_indent => (next.indent, is_seq_item(next.content)),
            Some(next) if next.indent == parent_indent && is_seq_item(next.content) => {
                (next.indent, true)
            }
            _ => return Ok(Node::Scalar(String::new())),
        };

        if seq {
            Ok(Node::Seq(self.parse_seq(indent)?))
        } else {
            Ok(Node::Map(self.parse_mapping(indent)?))
        }
    }

    fn parse_seq(&mut self, indent: usize) -> Result<Vec<String>> {
        let mut items = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent != indent || !is_seq_item(line.content) {
                break;
            }
            let item = line.content[1..].trim();
            if item.is_empty() {
                return Err(parse_error(line.number, "nested sequence items are not supported"));
            }
            items.push(unquote(item));
            self.pos += 1;
        }
        Ok(items)
    }
}

fn is_seq_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

/// Split `key: value` into the raw key and the trimmed value text
fn split_entry(line: &Line<'_>) -> Result<(String, String)> {
    let content = line.content;

    if let Some(q) = content.chars().next().filter(|c| *c == '\'' || *c == '"') {
        let close = content[1..]
            .find(q)
            .map(|i| i + 1)
            .ok_or_else(|| parse_error(line.number, "unterminated quoted key"))?;
        let after = content[close + 1..].trim_start();
        let rest = after
            .strip_prefix(':')
            .ok_or_else(|| parse_error(line.number, "expected ':' after key"))?;
        return Ok((unquote(&content[..=close]), rest.trim().to_string()));
    }

    let bytes = content.as_bytes();
    let colon = bytes
        .iter()
        .enumerate()
        .position(|(i, b)| *b == b':' && bytes.get(i + 1).map_or(true, |n| *n == b' '))
        .ok_or_else(|| parse_error(line.number, "expected 'key: value'"))?;

    let key = &content[..colon];
    if key.trim().is_empty() {
        return Err(parse_error(line.number, "empty key"));
    }
    Ok((key.to_string(), content[colon + 1..].trim().to_string()))
}

fn unquote(text: &str) -> String {
    let len = text.len();
    if len >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        return text[1..len - 1].replace("''", "'");
    }
    if len >= 2 && text.starts_with('"') && text.ends_with('"') {
        return text[1..len - 1].replace("\\\"", "\"").replace("\\\\", "\\");
    }
    text.to_string()
}

fn parse_error(line: usize, reason: &str) -> MorphError {
    MorphError::DocumentParse {
        line,
        reason: reason.to_string(),
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Render a mapping as a block-style document with plain scalars
pub fn emit(map: &Mapping) -> String {
    let mut out = String::new();
    emit_mapping(&mut out, map, 0);
    out
}

fn emit_mapping(out: &mut String, map: &Mapping, depth: usize) {
    let pad = " ".repeat(depth * INDENT);
    for (key, value) in map.iter() {
        match value {
            Node::Scalar(s) if s.is_empty() => {
                let _ = writeln!(out, "{pad}{key}:");
            }
            Node::Scalar(s) => {
                let _ = writeln!(out, "{pad}{key}: {}", scalar_text(s));
            }
            Node::Map(child) => {
                let _ = writeln!(out, "{pad}{key}:");
                emit_mapping(out, child, depth + 1);
            }
            Node::Seq(items) => {
                let _ = writeln!(out, "{pad}{key}:");
                for item in items {
                    let _ = writeln!(out, "{pad}- {}", scalar_text(item));
                }
            }
        }
    }
}

/// Scalar as written: plain when a reader gets it back unchanged,
/// otherwise single-quoted
fn scalar_text(s: &str) -> Cow<'_, str> {
    if is_plain_safe(s) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(format!("'{}'", s.replace('\'', "''")))
    }
}

fn is_plain_safe(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };
    if s != s.trim() || s.contains(['\n', '\r', '\t']) {
        return false;
    }
    if s.contains(" #") || s.contains(": ") || s.ends_with(':') {
        return false;
    }
    match first {
        '\'' | '"' | '#' | '&' | '*' | '!' | '|' | '>' | '%' | '@' | '`' | '[' | ']' | '{'
        | '}' | ',' => false,
        // indicators only when followed by a space
        '-' | '?' | ':' => !(s.len() == 1 || s[1..].starts_with(' ')),
        _ => true,
    }
}
