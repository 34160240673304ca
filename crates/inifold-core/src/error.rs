//! Error types for inifold
//!
//! Errors are structured values: a kind, the `section.option` path that was
//! being read, an optional source location for parse failures, an actionable
//! help message and, for substitution failures, the partially unfolded value.

use std::fmt;

/// Result type alias for inifold operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for inifold operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Option path where the error occurred (e.g., "server.port")
    pub path: Option<String>,
    /// Source location (file, line) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
    /// The value as far as substitution got before failing
    pub partial: Option<String>,
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// The requested section does not exist
    #[error("Section not found: {section}")]
    SectionNotFound { section: String },
    /// The option exists neither in the section nor in DEFAULT
    #[error("Option not found: {option}")]
    OptionNotFound { section: String, option: String },
    /// A line of INI text could not be parsed
    #[error("Parse error")]
    Parse,
    /// A `%(name)s` reference points at a missing or empty option
    #[error("Variable not found: {name}")]
    VariableNotFound { name: String },
    /// Unfolding did not settle within the depth cap
    #[error("Possible cycle while unfolding variables: max depth of {max_depth} reached")]
    PossibleCycle { max_depth: usize },
    /// Value could not be converted to the requested type
    #[error("Type coercion failed: expected {expected}, got {got:?}")]
    TypeCoercion { expected: String, got: String },
    /// A formatting option was given an unsupported token
    #[error("Invalid {name}: {token:?}")]
    InvalidOption { name: String, token: String },
    /// I/O error (file not found, etc.)
    #[error("I/O error")]
    Io,
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source_location: None,
            help: None,
            cause: None,
            partial: None,
        }
    }

    /// Create a section not found error
    pub fn section_not_found(section: impl Into<String>) -> Self {
        let section = section.into();
        let help = format!("Add a [{}] section or check for typos", section);
        Self::new(ErrorKind::SectionNotFound { section }).with_help(help)
    }

    /// Create an option not found error
    pub fn option_not_found(section: impl Into<String>, option: impl Into<String>) -> Self {
        let section = section.into();
        let option = option.into();
        let path = option_path(&section, &option);
        let help = format!(
            "Define '{}' in [{}] or in [DEFAULT]",
            option, section
        );
        Self::new(ErrorKind::OptionNotFound { section, option })
            .with_path(path)
            .with_help(help)
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::Parse);
        err.cause = Some(message.into());
        err
    }

    /// Create a variable not found error
    pub fn variable_not_found(name: impl Into<String>, partial: impl Into<String>) -> Self {
        let name = name.into();
        let help = format!(
            "Define '{}' with a non-empty value in the same section or in [DEFAULT]",
            name
        );
        Self::new(ErrorKind::VariableNotFound { name })
            .with_help(help)
            .with_partial(partial)
    }

    /// Create a possible cycle error
    pub fn possible_cycle(max_depth: usize, partial: impl Into<String>) -> Self {
        Self::new(ErrorKind::PossibleCycle { max_depth })
            .with_help("Break the circular reference between the %(...)s variables")
            .with_partial(partial)
    }

    /// Create a type coercion error
    pub fn type_coercion(expected: impl Into<String>, got: impl Into<String>) -> Self {
        let expected = expected.into();
        let help = format!("Ensure the value can be converted to {}", expected);
        Self::new(ErrorKind::TypeCoercion {
            expected,
            got: got.into(),
        })
        .with_help(help)
    }

    /// Create an invalid formatting option error
    pub fn invalid_option(
        name: impl Into<String>,
        token: impl Into<String>,
        allowed: &[&str],
    ) -> Self {
        let allowed: Vec<String> = allowed.iter().map(|a| format!("{:?}", a)).collect();
        Self::new(ErrorKind::InvalidOption {
            name: name.into(),
            token: token.into(),
        })
        .with_help(format!("Use one of {}", allowed.join(", ")))
    }

    /// Create an I/O error
    pub fn io(file: impl Into<String>, err: std::io::Error) -> Self {
        let mut e = Self::new(ErrorKind::Io).with_source_location(SourceLocation {
            file: file.into(),
            line: None,
        });
        e.cause = Some(err.to_string());
        e
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach the partially substituted value
    pub fn with_partial(mut self, partial: impl Into<String>) -> Self {
        self.partial = Some(partial.into());
        self
    }

    /// Check whether the error means "the thing asked for is not there"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::SectionNotFound { .. } | ErrorKind::OptionNotFound { .. }
        )
    }
}

/// Render the dotted path used in error messages
pub(crate) fn option_path(section: &str, option: &str) -> String {
    format!("{}.{}", section, option)
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(partial) = &self.partial {
            write!(f, "\n  Unfolded so far: {:?}", partial)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
