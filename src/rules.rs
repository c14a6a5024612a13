//! Rule registration and the insertion-ordered rule registry
//!
//! A rule is a named (pattern, action) pair. The registry preserves
//! registration order because match order is significant: the engine tries
//! rules in the order they were first registered and takes the first match.

use regex::Regex;

use crate::error::RuleError;
use crate::lexer::Cursor;
use crate::token::Token;

/// Action invoked when a rule's pattern matches
///
/// Receives the engine's cursor state and the raw matched token, and returns
/// the token ultimately yielded (possibly rewritten). Runs before the cursor
/// advances past the match, so position queries made from inside an action
/// still refer to the start of the match.
pub type Action = Box<dyn Fn(&mut Cursor, Token) -> Token + Send + Sync>;

/// A named (pattern, action) pair
///
/// Immutable after registration and owned exclusively by its [`RuleSet`].
pub struct Rule {
    name: String,
    source: String,
    pattern: Regex,
    action: Action,
}

impl Rule {
    /// Compile a rule from a pattern source string
    ///
    /// The pattern is compiled for anchored matching: it must match starting
    /// exactly at the cursor position, never further ahead. Compilation
    /// failures surface immediately, not at match time.
    pub fn new(
        name: impl Into<String>,
        source: &str,
        action: Action,
    ) -> Result<Self, RuleError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RuleError::EmptyName);
        }

        // \A plus a non-capturing group keeps alternations like `a|b` anchored
        // as a whole.
        let pattern = Regex::new(&format!(r"\A(?:{source})")).map_err(|err| {
            RuleError::Pattern {
                name: name.clone(),
                source: Box::new(err),
            }
        })?;

        Ok(Self {
            name,
            source: source.to_string(),
            pattern,
            action,
        })
    }

    /// The rule's name (used as the token kind on a match)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The original pattern source string
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Attempt an anchored match against `buffer` at byte offset `pos`
    ///
    /// Returns the absolute end offset of the match, or `None` if the pattern
    /// does not match exactly at `pos`.
    #[must_use]
    pub fn match_at(&self, buffer: &str, pos: usize) -> Option<usize> {
        self.pattern.find(&buffer[pos..]).map(|m| pos + m.end())
    }

    /// Invoke the rule's action on a freshly built token
    pub(crate) fn apply(&self, cursor: &mut Cursor, token: Token) -> Token {
        (self.action)(cursor, token)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Insertion-ordered registry of rules
///
/// Registration order is match order. Re-registering a live name replaces the
/// prior rule in place, keeping its original position in the match order.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &format!("{} rule(s)", self.rules.len()))
            .finish()
    }
}

impl RuleSet {
    /// Create an empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule, replacing any existing rule with the same name
    ///
    /// Replacement keeps the original insertion slot, so the match order of
    /// the remaining rules is unchanged.
    pub fn register(&mut self, rule: Rule) {
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    /// Look up a rule by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Iterate rules in match order
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Number of registered rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
