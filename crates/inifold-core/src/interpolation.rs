//! Variable unfolding
//!
//! Two reference forms are recognised inside raw values:
//! - `%(name)s` - another option, looked up in the owning section then DEFAULT
//! - `${NAME}` - an environment variable
//!
//! Names match `[A-Za-z0-9_.-]+`. Unfolding is a fixed-point loop: the first
//! reference is replaced, then the result is scanned again from the start, so
//! values pulled in by a substitution are themselves unfolded. The loop runs
//! at most [`MAX_DEPTH`] times. Mutually recursive options therefore fail
//! with a "possible cycle" error instead of looping forever; a legitimate
//! chain longer than the cap fails the same way.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Maximum number of substitutions performed per pass
///
/// A pass fails only when a reference is still left after `MAX_DEPTH`
/// substitutions. A chain that needs exactly `MAX_DEPTH` substitutions and
/// ends with no reference left unfolds successfully.
pub const MAX_DEPTH: usize = 64;

/// The kind of reference a pass looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// `%(name)s`
    Variable,
    /// `${NAME}`
    Environment,
}

impl Pattern {
    fn regex(self) -> &'static Regex {
        static VARIABLE: OnceLock<Regex> = OnceLock::new();
        static ENVIRONMENT: OnceLock<Regex> = OnceLock::new();

        match self {
            Pattern::Variable => VARIABLE.get_or_init(|| {
                Regex::new(r"%\(([a-zA-Z0-9_.\-]+)\)s").expect("variable pattern is valid")
            }),
            Pattern::Environment => ENVIRONMENT.get_or_init(|| {
                Regex::new(r"\$\{([a-zA-Z0-9_.\-]+)\}").expect("environment pattern is valid")
            }),
        }
    }

    /// Locate the first reference: the full span and the referenced name
    fn find(self, input: &str) -> Option<(Range<usize>, String)> {
        let caps = self.regex().captures(input)?;
        Some((caps.get_match().range(), caps[1].to_string()))
    }

    /// Check whether the input still holds a reference of this kind
    pub fn is_match(self, input: &str) -> bool {
        self.regex().is_match(input)
    }
}

/// Check if a raw value contains any `%(name)s` or `${NAME}` reference
pub fn contains_references(input: &str) -> bool {
    Pattern::Variable.is_match(input) || Pattern::Environment.is_match(input)
}

/// Run one substitution pass to a fixed point
///
/// `lookup` maps a referenced name to its replacement. For
/// [`Pattern::Variable`] a `None` or empty replacement stops the pass with a
/// variable-not-found error carrying the value unfolded so far. For
/// [`Pattern::Environment`] a `None` becomes the empty string.
pub fn unfold<F>(input: &str, pattern: Pattern, mut lookup: F) -> Result<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut value = input.to_string();

    for _ in 0..MAX_DEPTH {
        let Some((span, name)) = pattern.find(&value) else {
            return Ok(value);
        };

        let replacement = match (pattern, lookup(&name)) {
            (Pattern::Variable, Some(found)) if !found.is_empty() => found,
            (Pattern::Variable, _) => return Err(Error::variable_not_found(name, value)),
            (Pattern::Environment, found) => found.unwrap_or_default(),
        };

        log::trace!("unfolding {:?} into {:?}", &value[span.clone()], replacement);
        value.replace_range(span, &replacement);
    }

    if pattern.is_match(&value) {
        log::warn!(
            "gave up unfolding after {} substitutions, possible cycle",
            MAX_DEPTH
        );
        return Err(Error::possible_cycle(MAX_DEPTH, value));
    }

    Ok(value)
}
