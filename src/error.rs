//! Error types for rule registration and lexing

use thiserror::Error;

/// Errors that can occur when registering a rule
#[derive(Debug, Error)]
pub enum RuleError {
    /// Rule name was empty
    #[error("empty rule name")]
    EmptyName,

    /// The pattern source is not valid regex syntax
    #[error("invalid pattern for rule `{name}`: {source}")]
    Pattern {
        /// Name the rule was being registered under
        name: String,
        /// The underlying regex compile error
        #[source]
        source: Box<regex::Error>,
    },
}

/// Errors that can occur while pulling tokens
#[derive(Debug, Error)]
pub enum LexError {
    /// No registered rule matched at the cursor position
    #[error("{0}")]
    NoMatch(Diagnostic),

    /// A failure signalled by an installed error hook
    #[error("{0}")]
    Custom(String),
}

impl LexError {
    /// The diagnostic carried by a `NoMatch` failure, if any
    #[must_use]
    pub const fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::NoMatch(diag) => Some(diag),
            Self::Custom(_) => None,
        }
    }
}

/// A rendered lexing diagnostic pointing at the offending character
///
/// `Display` reproduces the caret-annotated message format exactly, so the
/// rendered text is stable enough for tooling to match against:
///
/// ```text
///
/// lexing error at line 1, column 12:
///
///      2.356 * (6 /^ 7)
///                  ^
///
/// invalid character in source
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Line of the failure (0-indexed)
    pub line: usize,
    /// Column of the failure (0-indexed)
    pub column: usize,
    /// Full text of the offending source line
    pub source_line: String,
}

impl Diagnostic {
    /// Create a new diagnostic
    #[must_use]
    pub const fn new(line: usize, column: usize, source_line: String) -> Self {
        Self {
            line,
            column,
            source_line,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\n\nlexing error at line {}, column {}:\n\n     {}\n     {}^\n\ninvalid character in source\n",
            self.line,
            self.column,
            self.source_line,
            " ".repeat(self.column)
        )
    }
}
