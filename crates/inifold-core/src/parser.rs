//! Line-oriented INI reader
//!
//! Recognised lines, after inline comments are stripped and trailing
//! whitespace trimmed:
//! - blank, or starting with `#` / `;`: skipped
//! - `[name]`: starts a section (`[]` is DEFAULT)
//! - leading space or tab while an option is open: continuation, appended
//!   to the previous value after a newline
//! - `key = value` or `key: value`: split at the first `=` or `:`
//!
//! A `#` or `;` at the start of a line or after whitespace starts an inline
//! comment. Writing `\#` or `\;` there keeps the marker as text.
//!
//! A line starting with `\#`, `\;` or `\[` is always an entry whose key
//! begins with that character.

use std::io::BufRead;

use crate::config::{Config, DEFAULT_SECTION};
use crate::error::{Error, Result, SourceLocation};

const BOM: char = '\u{feff}';

/// Characters that start a comment
pub(crate) fn is_comment_marker(c: char) -> bool {
    c == '#' || c == ';'
}

/// A classified line
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Blank,
    Section(&'a str),
    Continuation(&'a str),
    Entry(&'a str, &'a str),
}

/// Read INI text into `config`
///
/// `file` labels parse errors; entries before the first header go to DEFAULT.
pub(crate) fn read_into<R: BufRead>(config: &mut Config, reader: R, file: &str) -> Result<()> {
    let mut section = DEFAULT_SECTION.to_string();
    let mut option: Option<String> = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(file, e))?;
        let line = if index == 0 {
            line.strip_prefix(BOM).unwrap_or(&line)
        } else {
            &line
        };

        let (stripped, key_escaped) = match escaped_key(line) {
            Some(text) => (text, true),
            None => (strip_comment(line), false),
        };
        let parsed = if key_escaped {
            entry(stripped.trim_end())
        } else {
            classify(&stripped, option.is_some())
        };
        let parsed = parsed.ok_or_else(|| {
            Error::parse(format!("could not parse line: {:?}", line)).with_source_location(
                SourceLocation {
                    file: file.to_string(),
                    line: Some(index + 1),
                },
            )
        })?;

        match parsed {
            Line::Blank => {}
            Line::Section(name) => {
                option = None;
                config.add_section(name);
                section = if name.is_empty() {
                    DEFAULT_SECTION.to_string()
                } else {
                    name.to_string()
                };
            }
            Line::Continuation(text) => {
                if let Some(option) = &option {
                    let previous = config
                        .section(&section)
                        .and_then(|s| s.get(option))
                        .unwrap_or_default();
                    let value = format!("{}\n{}", previous, text);
                    config.add_entry(&section, option.as_str(), value);
                }
            }
            Line::Entry(key, value) => {
                config.add_entry(&section, key, value);
                option = Some(key.to_string());
            }
        }
    }

    Ok(())
}

/// Classify a comment-stripped line; `None` means it is malformed
fn classify(line: &str, in_option: bool) -> Option<Line<'_>> {
    let line = line.trim_end();
    let indented = line.starts_with([' ', '\t']);

    if line.is_empty() || line.starts_with(is_comment_marker) {
        return Some(Line::Blank);
    }

    if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
        return Some(Line::Section(line[1..line.len() - 1].trim()));
    }

    if indented {
        return in_option.then(|| Line::Continuation(line.trim()));
    }

    entry(line)
}

/// Split `key = value` at the first separator
fn entry(line: &str) -> Option<Line<'_>> {
    match line.find(['=', ':']) {
        Some(i) if i > 0 => Some(Line::Entry(line[..i].trim(), line[i + 1..].trim())),
        _ => None,
    }
}

/// Comment-stripped text of a line whose key starts with an escaped
/// `#`, `;` or `[`
fn escaped_key(line: &str) -> Option<String> {
    let rest = line.strip_prefix('\\')?;
    let first = rest
        .chars()
        .next()
        .filter(|&c| is_comment_marker(c) || c == '[')?;

    let mut out = String::from(first);
    out.push_str(&strip_comment_after(&rest[first.len_utf8()..], Some(first)));
    Some(out)
}

/// Remove an inline comment, unescaping `\#` / `\;` that follow whitespace
fn strip_comment(line: &str) -> String {
    strip_comment_after(line, None)
}

/// [`strip_comment`] for text that follows the character `prev`
fn strip_comment_after(line: &str, mut prev: Option<char>) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        let after_space = prev.is_none_or(char::is_whitespace);

        if after_space && is_comment_marker(c) {
            break;
        }

        if after_space && c == '\\' {
            if let Some(marker) = chars.next_if(|&n| is_comment_marker(n)) {
                out.push(marker);
                prev = Some(marker);
                continue;
            }
        }

        out.push(c);
        prev = Some(c);
    }

    out
}
