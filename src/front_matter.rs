use std::fmt::Write;

use chrono::{DateTime, FixedOffset};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ParseError;
use crate::text_utils::{format_date_time, parse_date_time};

pub const DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Date(DateTime<FixedOffset>),
}

impl Scalar {
    /// Text form of the scalar, used where a field accepts any scalar shape.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => format!("{}", n),
            Scalar::Date(d) => format_date_time(d),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<String>),
}

/// Flat, ordered key-value mapping decoded from a front matter block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Value)>,
}

impl Mapping {
    pub fn new() -> Mapping {
        Mapping { entries: vec![] }
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.entries.push((key.to_string(), value));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits a document into its front matter mapping and its body.
///
/// The block is delimited by a `---` line at the very start of the document
/// and a second `---` line closing it. A document that does not open with the
/// delimiter is all body. The body is returned byte-exact; a later `---`
/// inside it has no meaning.
pub fn parse(raw: &str) -> Result<(Mapping, String), ParseError> {
    let mut lines = raw.split_inclusive('\n');

    let first = match lines.next() {
        Some(line) => line,
        None => return Ok((Mapping::new(), String::new())),
    };
    if first.trim_end() != DELIMITER {
        return Ok((Mapping::new(), raw.to_string()));
    }

    let mut mapping = Mapping::new();
    let mut pending_list: Option<(String, Vec<String>)> = None;
    let mut line_no = 1usize;
    let mut offset = first.len();

    for line in lines {
        line_no += 1;
        offset += line.len();

        let text = line.trim_end_matches(['\n', '\r']);
        let trimmed = text.trim();

        if text.trim_end() == DELIMITER {
            flush_list(&mut mapping, pending_list.take());
            return Ok((mapping, raw[offset..].to_string()));
        }

        if trimmed.is_empty() {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix("- ") {
            match pending_list {
                Some((_, ref mut items)) => items.push(unquote(item.trim()).to_string()),
                None => return Err(ParseError::new(line_no, "list item without a key")),
            }
            continue;
        }

        // Anything indented that is not a list item would be a nested
        // structure, which the flat format does not allow
        if text.starts_with(' ') || text.starts_with('\t') {
            return Err(ParseError::new(line_no, "nested mappings are not supported"));
        }

        flush_list(&mut mapping, pending_list.take());

        let (key, value_str) = match extract_key_value(text) {
            Some((k, v)) => (k, v),
            None => return Err(ParseError::new(line_no, "expected `key: value`")),
        };

        if mapping.contains_key(key) {
            return Err(ParseError::new(line_no, format!("duplicate key `{}`", key)));
        }

        if value_str.is_empty() {
            // Either a block list follows, or the value is an empty scalar
            pending_list = Some((key.to_string(), vec![]));
        } else {
            mapping.insert(key, parse_value(value_str));
        }
    }

    Err(ParseError::new(line_no, "front matter block is never closed"))
}

/// Renders a mapping back into a front matter block. `parse` applied to the
/// result (plus any body) yields the original mapping.
pub fn encode(mapping: &Mapping) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "{}", DELIMITER);
    for (key, value) in mapping.iter() {
        match value {
            Value::Scalar(scalar) => {
                let _ = writeln!(&mut buf, "{}: {}", key, encode_scalar(scalar));
            }
            Value::List(items) if items.is_empty() => {
                let _ = writeln!(&mut buf, "{}: []", key);
            }
            Value::List(items) => {
                let _ = writeln!(&mut buf, "{}:", key);
                for item in items {
                    let _ = writeln!(&mut buf, "  - {}", encode_text(item));
                }
            }
        }
    }
    let _ = writeln!(&mut buf, "{}", DELIMITER);

    buf
}

fn flush_list(mapping: &mut Mapping, pending: Option<(String, Vec<String>)>) {
    if let Some((key, items)) = pending {
        // A bare `key:` with no items decodes as an empty text scalar
        if items.is_empty() {
            mapping.insert(&key, Value::Scalar(Scalar::Text(String::new())));
        } else {
            mapping.insert(&key, Value::List(items));
        }
    }
}

fn extract_key_value(line: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref KEY_VALUE_REGEX: Regex = Regex::new(
            r"^(?P<key>[A-Za-z0-9_-]+):\s*(?P<value>.*)$"
        ).unwrap();
    }

    KEY_VALUE_REGEX.captures(line).and_then(|cap| {
        let key = cap.name("key").map(|key| key.as_str());
        let val = cap.name("value").map(|val| val.as_str().trim_end());
        match (key, val) {
            (Some(key), Some(val)) => Some((key, val)),
            _ => None,
        }
    })
}

fn parse_value(value_str: &str) -> Value {
    if value_str.starts_with('[') && value_str.ends_with(']') {
        let inner = &value_str[1..value_str.len() - 1];
        let items = inner.split(',')
            .map(|x| unquote(x.trim()).to_string())
            .filter(|x| !x.is_empty())
            .collect();
        return Value::List(items);
    }

    Value::Scalar(parse_scalar(value_str))
}

fn parse_scalar(value_str: &str) -> Scalar {
    if is_quoted(value_str) {
        return Scalar::Text(unquote(value_str).to_string());
    }
    if let Ok(n) = value_str.parse::<f64>() {
        return Scalar::Number(n);
    }
    if let Ok(d) = parse_date_time(value_str) {
        return Scalar::Date(d);
    }
    Scalar::Text(value_str.to_string())
}

fn is_quoted(value_str: &str) -> bool {
    value_str.len() >= 2
        && ((value_str.starts_with('"') && value_str.ends_with('"'))
            || (value_str.starts_with('\'') && value_str.ends_with('\'')))
}

fn unquote(value_str: &str) -> &str {
    if is_quoted(value_str) {
        &value_str[1..value_str.len() - 1]
    } else {
        value_str
    }
}

fn encode_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Text(s) => encode_text(s),
        Scalar::Number(n) => format!("{}", n),
        Scalar::Date(d) => format_date_time(d),
    }
}

// Quotes text that would otherwise decode as a different shape
fn encode_text(text: &str) -> String {
    let needs_quotes = text.is_empty()
        || text != text.trim()
        || text.parse::<f64>().is_ok()
        || parse_date_time(text).is_ok()
        || is_quoted(text)
        || (text.starts_with('[') && text.ends_with(']'))
        || text.starts_with("- ");

    if needs_quotes {
        format!("\"{}\"", text)
    } else {
        text.to_string()
    }
}
