//! Message property paths.
//!
//! Paths follow the flow runtime's syntax: `payload.bucket`,
//! `items[0].key`, `headers["x-bucket"]`. A leading `msg.` is ignored.

use bf_types::Message;
use serde_json::Value;

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Parse a property path.
///
/// Returns a description of the problem for malformed paths.
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, String> {
    let path = path.strip_prefix("msg.").unwrap_or(path);
    if path.is_empty() {
        return Err("empty property path".to_string());
    }

    let chars: Vec<char> = path.chars().collect();
    let mut segments = Vec::new();
    let mut pos = 0;

    // The path must open with a plain field name
    let name = read_name(&chars, &mut pos);
    if name.is_empty() {
        return Err(format!("path must start with a property name: '{path}'"));
    }
    segments.push(PathSegment::Field(name));

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                pos += 1;
                let name = read_name(&chars, &mut pos);
                if name.is_empty() {
                    return Err(format!("empty path segment at offset {pos}"));
                }
                segments.push(PathSegment::Field(name));
            }
            '[' => {
                pos += 1;
                segments.push(read_bracket(&chars, &mut pos)?);
            }
            other => {
                return Err(format!("unexpected character '{other}' at offset {pos}"));
            }
        }
    }

    Ok(segments)
}

fn read_name(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && chars[*pos] != '.' && chars[*pos] != '[' && chars[*pos] != ']' {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn read_bracket(chars: &[char], pos: &mut usize) -> Result<PathSegment, String> {
    let Some(&first) = chars.get(*pos) else {
        return Err("unterminated '['".to_string());
    };

    let segment = if first == '"' || first == '\'' {
        *pos += 1;
        let start = *pos;
        while *pos < chars.len() && chars[*pos] != first {
            *pos += 1;
        }
        if *pos >= chars.len() {
            return Err("unterminated quoted segment".to_string());
        }
        let name: String = chars[start..*pos].iter().collect();
        *pos += 1;
        PathSegment::Field(name)
    } else {
        let start = *pos;
        while *pos < chars.len() && chars[*pos] != ']' {
            *pos += 1;
        }
        let raw: String = chars[start..*pos].iter().collect();
        let index = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid array index '{raw}'"))?;
        PathSegment::Index(index)
    };

    if chars.get(*pos) != Some(&']') {
        return Err("unterminated '['".to_string());
    }
    *pos += 1;
    Ok(segment)
}

/// Look up a parsed path in a message.
pub(crate) fn lookup(msg: &Message, segments: &[PathSegment]) -> Option<Value> {
    let (first, rest) = segments.split_first()?;
    let PathSegment::Field(name) = first else {
        return None;
    };

    let mut current = msg.property(name)?;
    for segment in rest {
        current = match (segment, current) {
            (PathSegment::Field(name), Value::Object(mut map)) => map.remove(name)?,
            (PathSegment::Index(i), Value::Array(mut items)) if *i < items.len() => {
                items.swap_remove(*i)
            }
            _ => return None,
        };
    }
    Some(current)
}
