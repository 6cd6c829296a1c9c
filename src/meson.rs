//! Minimal structural helpers for `meson.build` files.
//!
//! This is not a Meson parser. It knows just enough of the syntax (string
//! literals, `#` comments, balanced `()`/`[]`) to locate a function call or
//! an array literal reliably and to read and extend the items of a list
//! literal. Edits are textual, but only at positions found structurally, so
//! nested parentheses or reformatted arguments do not defeat them.

use regex::Regex;
use std::ops::Range;

/// An array literal located in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLiteral {
    /// Byte range of the text between `[` and `]`.
    pub inner: Range<usize>,
    /// Top-level items, trimmed, comments removed.
    pub items: Vec<String>,
}

impl ArrayLiteral {
    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }
}

/// Scan from the opening delimiter at `open` to its matching closer.
///
/// Returns the byte index just past the closer, or `None` if unbalanced.
fn matching_close(content: &str, open: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut idx = open;
    let mut in_string = false;

    while idx < bytes.len() {
        let b = bytes[idx];
        if in_string {
            match b {
                b'\\' => idx += 1,
                b'\'' => in_string = false,
                _ => {}
            }
        } else {
            match b {
                b'\'' => in_string = true,
                b'#' => {
                    while idx < bytes.len() && bytes[idx] != b'\n' {
                        idx += 1;
                    }
                    continue;
                }
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(idx + 1);
                    }
                }
                _ => {}
            }
        }
        idx += 1;
    }
    None
}

/// Split list text at top-level commas, dropping comments and blanks.
fn split_items(inner: &str) -> Vec<String> {
    let bytes = inner.as_bytes();
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        if in_string {
            if b == b'\\' && idx + 1 < bytes.len() {
                current.push_str(&inner[idx..idx + 2]);
                idx += 2;
                continue;
            }
            if b == b'\'' {
                in_string = false;
            }
        } else {
            match b {
                b'\'' => in_string = true,
                b'#' => {
                    while idx < bytes.len() && bytes[idx] != b'\n' {
                        idx += 1;
                    }
                    continue;
                }
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => {
                    items.push(std::mem::take(&mut current));
                    idx += 1;
                    continue;
                }
                _ => {}
            }
        }
        // Multi-byte characters are copied whole
        let ch_len = inner[idx..].chars().next().map(char::len_utf8).unwrap_or(1);
        current.push_str(&inner[idx..idx + ch_len]);
        idx += ch_len;
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Whether `pos` sits after a `#` comment marker on its line.
fn in_comment(content: &str, pos: usize) -> bool {
    let line_start = content[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let mut in_string = false;
    let mut escaped = false;
    for b in content[line_start..pos].bytes() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'\'' => in_string = false,
                _ => {}
            }
        } else {
            match b {
                b'\'' => in_string = true,
                b'#' => return true,
                _ => {}
            }
        }
    }
    false
}

fn first_uncommented<'a>(anchor: &Regex, content: &'a str) -> Option<regex::Match<'a>> {
    anchor
        .find_iter(content)
        .find(|m| !in_comment(content, m.start()))
}

/// Locate `<variable> = <function>(...)` and return its full byte span.
pub fn find_assignment_call(content: &str, variable: &str, function: &str) -> Option<Range<usize>> {
    let anchor = Regex::new(&format!(
        r"\b{}\s*=\s*{}\s*\(",
        regex::escape(variable),
        regex::escape(function)
    ))
    .ok()?;
    let found = first_uncommented(&anchor, content)?;
    let open = found.end() - 1;
    let end = matching_close(content, open)?;
    Some(found.start()..end)
}

/// Locate the first `<keyword>: [...]` argument and parse its items.
pub fn find_keyword_array(content: &str, keyword: &str) -> Option<ArrayLiteral> {
    let anchor = Regex::new(&format!(r"\b{}\s*:\s*\[", regex::escape(keyword))).ok()?;
    let found = first_uncommented(&anchor, content)?;
    let open = found.end() - 1;
    let end = matching_close(content, open)?;
    let inner = open + 1..end - 1;
    let items = split_items(&content[inner.clone()]);
    Some(ArrayLiteral { inner, items })
}

/// Append `item` as the last entry of `array`, keeping one item per line.
pub fn append_to_array(content: &str, array: &ArrayLiteral, item: &str) -> String {
    let inner = &content[array.inner.clone()];
    let kept = inner.trim_end();
    let mut new_inner = kept.to_string();
    if !array.items.is_empty() && !kept.ends_with(',') {
        new_inner.push(',');
    }
    new_inner.push_str(&format!("\n    {},\n  ", item));

    let mut out = String::with_capacity(content.len() + item.len() + 8);
    out.push_str(&content[..array.inner.start]);
    out.push_str(&new_inner);
    out.push_str(&content[array.inner.end..]);
    out
}

/// Remove `'...'` list entries whose text matches `entry`.
///
/// `entry` is a regex for the unquoted string. An entry alone on its line
/// takes the whole line with it; an inline entry takes its trailing comma.
pub fn remove_string_entries(content: &str, entry: &str) -> Result<String, regex::Error> {
    let whole_line = Regex::new(&format!(r"(?m)^[ \t]*'{}',?[ \t]*\r?\n", entry))?;
    let inline = Regex::new(&format!(r"'{}',?[ \t]*", entry))?;
    let stripped = whole_line.replace_all(content, "");
    Ok(inline.replace_all(&stripped, "").into_owned())
}

/// Render a list of single-quoted strings, one per line.
pub fn render_string_list(items: &[String], indent: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}'{}',\n", indent, item.replace('\'', "\\'")))
        .collect()
}
