//! Token and position types produced by the lexer

use serde::{Deserialize, Serialize};

/// A line/column position in source text (both 0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number within the line (0-indexed byte offset)
    pub column: usize,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token produced by a matched rule
///
/// Tokens are built fresh per match; two tokens are equal when all three
/// fields are equal. `pos` is captured at the start of the match, before the
/// cursor advanced past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The exact substring the rule's pattern matched
    pub value: String,
    /// Name of the rule that matched
    pub kind: String,
    /// Position of the first character of the match
    pub pos: Position,
}

impl Token {
    /// Create a new token
    #[must_use]
    pub const fn new(value: String, kind: String, pos: Position) -> Self {
        Self { value, kind, pos }
    }

    /// Replace the token's value, keeping kind and position
    ///
    /// Convenience for actions that rewrite the matched text.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Replace the token's kind, keeping value and position
    ///
    /// Convenience for actions that reclassify a match.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Length of the matched text in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Check if the matched text is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?}) at {}", self.kind, self.value, self.pos)
    }
}
