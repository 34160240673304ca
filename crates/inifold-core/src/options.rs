//! Formatting options used when writing INI text
//!
//! Only two comment markers and two separators are supported. The enums make
//! any other token unrepresentable; raw tokens coming from users go through
//! [`Options::from_tokens`] or `FromStr`, which reject everything else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Marker written in front of every header comment line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CommentMarker {
    /// `"# "`
    #[default]
    Hash,
    /// `"; "`
    Semicolon,
}

impl CommentMarker {
    const TOKENS: [&'static str; 2] = ["# ", "; "];

    /// The literal token, including its trailing space
    pub fn as_str(self) -> &'static str {
        match self {
            CommentMarker::Hash => "# ",
            CommentMarker::Semicolon => "; ",
        }
    }
}

impl FromStr for CommentMarker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "# " => Ok(CommentMarker::Hash),
            "; " => Ok(CommentMarker::Semicolon),
            other => Err(Error::invalid_option("comment", other, &Self::TOKENS)),
        }
    }
}

impl TryFrom<String> for CommentMarker {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<CommentMarker> for String {
    fn from(marker: CommentMarker) -> Self {
        marker.as_str().to_string()
    }
}

impl fmt::Display for CommentMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token placed between an option name and its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Separator {
    /// `"="`
    #[default]
    Equals,
    /// `":"`
    Colon,
}

impl Separator {
    const TOKENS: [&'static str; 2] = ["=", ":"];

    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Equals => "=",
            Separator::Colon => ":",
        }
    }
}

impl FromStr for Separator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "=" => Ok(Separator::Equals),
            ":" => Ok(Separator::Colon),
            other => Err(Error::invalid_option("separator", other, &Self::TOKENS)),
        }
    }
}

impl TryFrom<String> for Separator {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Separator> for String {
    fn from(separator: Separator) -> Self {
        separator.as_str().to_string()
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formatting options for a [`Config`](crate::Config)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Marker used for header comment lines
    pub comment: CommentMarker,
    /// Separator between option and value
    pub separator: Separator,
    /// Insert a space before the separator
    pub pre_space: bool,
    /// Insert a space after the separator
    pub post_space: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            comment: CommentMarker::default(),
            separator: Separator::default(),
            pre_space: true,
            post_space: true,
        }
    }
}

impl Options {
    /// Build options from raw tokens
    ///
    /// An empty token selects the default. Any token other than `"# "`/`"; "`
    /// for the comment or `"="`/`":"` for the separator is rejected.
    pub fn from_tokens(
        comment: &str,
        separator: &str,
        pre_space: bool,
        post_space: bool,
    ) -> Result<Self> {
        Ok(Self {
            comment: comment.parse()?,
            separator: separator.parse()?,
            pre_space,
            post_space,
        })
    }

    /// The separator with its surrounding spacing, e.g. `" = "`
    pub fn separator_token(&self) -> String {
        let mut token = String::with_capacity(3);
        if self.pre_space {
            token.push(' ');
        }
        token.push_str(self.separator.as_str());
        if self.post_space {
            token.push(' ');
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.comment.as_str(), "# ");
        assert_eq!(options.separator_token(), " = ");
    }

    #[test]
    fn test_from_tokens_alternatives() {
        let options = Options::from_tokens("; ", ":", false, true).unwrap();
        assert_eq!(options.comment, CommentMarker::Semicolon);
        assert_eq!(options.separator, Separator::Colon);
        assert_eq!(options.separator_token(), ": ");
    }

    #[test]
    fn test_empty_tokens_select_defaults() {
        let options = Options::from_tokens("", "", false, false).unwrap();
        assert_eq!(options.comment, CommentMarker::Hash);
        assert_eq!(options.separator_token(), "=");
    }

    #[test]
    fn test_invalid_comment_rejected() {
        let err = Options::from_tokens("// ", "=", true, true).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::InvalidOption {
                name: "comment".into(),
                token: "// ".into()
            }
        );
    }

    #[test]
    fn test_invalid_separator_rejected() {
        let err = "=>".parse::<Separator>().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidOption { .. }));
    }

    #[test]
    fn test_serde_uses_tokens() {
        let options = Options::from_tokens("; ", ":", true, false).unwrap();
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(
            json,
            r#"{"comment":"; ","separator":":","pre_space":true,"post_space":false}"#
        );

        let back: Options = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }

    #[test]
    fn test_serde_rejects_bad_token() {
        let result: std::result::Result<Options, _> =
            serde_json::from_str(r#"{"separator":"->"}"#);
        assert!(result.is_err());
    }
}
