//! INI serializer
//!
//! Raw values are written as stored. Output uses CRLF line endings; sections
//! and options appear in insertion order and an empty DEFAULT section is
//! left out.

use crate::config::{Config, DEFAULT_SECTION};
use crate::parser::is_comment_marker;

const CRLF: &str = "\r\n";

/// Render `config` as INI text with an optional header comment
pub(crate) fn render(config: &Config, header: Option<&str>) -> String {
    let options = config.formatting();
    let separator = options.separator_token();
    let mut out = String::new();

    if let Some(header) = header.filter(|h| !h.is_empty()) {
        for line in header.lines() {
            out.push_str(options.comment.as_str());
            out.push_str(line);
            out.push_str(CRLF);
        }
    }

    for (name, section) in config.iter() {
        if name == DEFAULT_SECTION && section.is_empty() {
            continue;
        }

        out.push_str(CRLF);
        out.push('[');
        out.push_str(name);
        out.push(']');
        out.push_str(CRLF);

        for (option, value) in section.iter() {
            if option.starts_with(|c| is_comment_marker(c) || c == '[') {
                out.push('\\');
            }
            out.push_str(option);
            out.push_str(&separator);
            push_value(&mut out, value, separator.chars().last());
            out.push_str(CRLF);
        }
    }

    out.push_str(CRLF);
    out
}

/// Append a value, turning embedded newlines into tab-indented
/// continuation lines
fn push_value(out: &mut String, value: &str, before: Option<char>) {
    for (i, line) in value.split('\n').enumerate() {
        let prev = if i == 0 {
            before
        } else {
            out.push_str(CRLF);
            out.push('\t');
            Some('\t')
        };
        push_escaped(out, line, prev);
    }
}

/// Escape comment markers the reader would otherwise treat as a comment
fn push_escaped(out: &mut String, line: &str, mut prev: Option<char>) {
    for c in line.chars() {
        if is_comment_marker(c) && prev.is_none_or(char::is_whitespace) {
            out.push('\\');
        }
        out.push(c);
        prev = Some(c);
    }
}
