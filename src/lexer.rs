//! The matching engine
//!
//! [`Lexer`] owns a [`Cursor`] over the source buffer and a [`RuleSet`], and
//! pulls tokens on demand: skip whitespace (optional), try rules in
//! registration order anchored at the cursor, take the first match, run its
//! action, advance. Rule order is significant — when two patterns can match
//! at the same offset, the rule registered first wins, regardless of match
//! length.
//!
//! # Examples
//!
//! ```
//! use relex::Lexer;
//!
//! let mut lexer = Lexer::new();
//! lexer.rule("DIGIT", r"\d+(\.\d+)?").unwrap();
//! lexer.rule("OP", r"\+|-|\*|/").unwrap();
//!
//! lexer.setup("1 + 2");
//! let kinds: Vec<String> = lexer
//!     .tokens()
//!     .map(|t| t.unwrap().kind)
//!     .collect();
//! assert_eq!(kinds, ["DIGIT", "OP", "DIGIT"]);
//! ```

use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;

use crate::error::{Diagnostic, LexError, RuleError};
use crate::rules::{Rule, RuleSet};
use crate::token::{Position, Token};

/// Shared whitespace pattern, anchored; compiled once per process
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\s+").expect("whitespace pattern compiles"));

/// Error-recovery hook invoked when no rule matches
///
/// Receives the cursor and the offending character. Returning an error
/// propagates it unchanged to the caller of [`Lexer::next_token`]. Returning
/// `Ok(())` after advancing the cursor resumes lexing; returning `Ok(())`
/// without advancing ends the current pull, and the next pull re-enters the
/// hook on the same character — advancing (or failing) is the hook's
/// responsibility.
pub type ErrorHook = Box<dyn FnMut(&mut Cursor, char) -> Result<(), LexError> + Send>;

/// Mutable cursor state over one source buffer
///
/// Holds the buffer, the current byte offset, and the offset of the most
/// recent line start (used to derive columns without rescanning the line).
/// Offsets are byte offsets and always lie on `char` boundaries.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    buffer: String,
    pos: usize,
    line_start: usize,
}

impl Cursor {
    fn reset(&mut self, buffer: String) {
        self.buffer = buffer;
        self.pos = 0;
        self.line_start = 0;
    }

    /// The full source buffer for this session
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current byte offset into the buffer
    #[must_use]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// The unconsumed remainder of the buffer
    #[must_use]
    pub fn rest(&self) -> &str {
        &self.buffer[self.pos..]
    }

    /// The character at the cursor, if any
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Check if the buffer is fully consumed
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.buffer.len()
    }

    /// Current (line, column), both 0-indexed
    ///
    /// The line is recomputed by counting newlines from the start of the
    /// buffer on every call; positions are queried once per token and on
    /// errors, so the linear cost is acceptable. Callers polling positions at
    /// high frequency should cache the result between cursor movements.
    #[must_use]
    pub fn position(&self) -> Position {
        let line = self.buffer.as_bytes()[..self.pos]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        Position::new(line, self.pos - self.line_start)
    }

    /// Full text of the line the cursor is on
    #[must_use]
    pub fn current_line(&self) -> &str {
        let Position { line, .. } = self.position();
        self.buffer.split('\n').nth(line).unwrap_or("")
    }

    /// Move the cursor to `offset`, clamped to the buffer length
    ///
    /// Consuming text that contains a newline marks `offset` as the new line
    /// start, so columns restart from the position immediately after the
    /// consumed text. Seeking backwards leaves the line-start bookkeeping
    /// untouched.
    pub fn seek(&mut self, offset: usize) {
        let offset = offset.min(self.buffer.len());
        if offset > self.pos && self.buffer[self.pos..offset].contains('\n') {
            self.line_start = offset;
        }
        self.pos = offset;
    }

    /// Advance the cursor by `bytes`
    pub fn advance(&mut self, bytes: usize) {
        self.seek(self.pos.saturating_add(bytes));
    }

    /// Skip past the character at the cursor, if any
    ///
    /// The usual recovery step for error hooks that want to drop an
    /// unrecognized character and keep lexing.
    pub fn skip_char(&mut self) {
        if let Some(ch) = self.peek() {
            self.advance(ch.len_utf8());
        }
    }
}

/// A rule-driven lexer
///
/// Rules and the error hook are configured once and persist across sessions;
/// [`setup`](Lexer::setup) resets only the cursor, so one rule set can
/// tokenize many buffers.
pub struct Lexer {
    cursor: Cursor,
    ignore_whitespace: bool,
    rules: RuleSet,
    error_hook: Option<ErrorHook>,
}

impl std::fmt::Debug for Lexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("cursor", &self.cursor)
            .field("ignore_whitespace", &self.ignore_whitespace)
            .field("rules", &self.rules)
            .field("error_hook", &self.error_hook.is_some())
            .finish()
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    /// Create a lexer with no rules and an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self {
            cursor: Cursor::default(),
            ignore_whitespace: true,
            rules: RuleSet::new(),
            error_hook: None,
        }
    }

    /// Register a rule that yields the matched text unchanged
    ///
    /// `name` becomes the kind of every token the rule produces. Patterns are
    /// compiled immediately and matched anchored at the cursor. Re-registering
    /// a name replaces the earlier rule but keeps its position in the match
    /// order.
    ///
    /// A pattern that can match the empty string never advances the cursor
    /// and will loop forever; keeping patterns non-empty-matching is the rule
    /// author's responsibility.
    pub fn rule(&mut self, name: &str, pattern: &str) -> Result<(), RuleError> {
        self.rule_with(name, pattern, |_, token| token)
    }

    /// Register a rule with an action run on every match
    ///
    /// The action receives the cursor and the raw token and returns the token
    /// to yield, possibly rewritten via [`Token::with_value`] /
    /// [`Token::with_kind`]. It runs before the cursor advances past the
    /// match.
    pub fn rule_with(
        &mut self,
        name: &str,
        pattern: &str,
        action: impl Fn(&mut Cursor, Token) -> Token + Send + Sync + 'static,
    ) -> Result<(), RuleError> {
        let rule = Rule::new(name, pattern, Box::new(action))?;
        debug!("registered rule `{name}` with pattern `{pattern}`");
        self.rules.register(rule);
        Ok(())
    }

    /// Install an error hook, replacing any previous one
    ///
    /// With a hook installed, an unmatched character no longer fails the
    /// session; the hook decides whether to skip it (see
    /// [`Cursor::skip_char`]) or fail with its own error. See [`ErrorHook`]
    /// for the contract.
    pub fn on_error(
        &mut self,
        hook: impl FnMut(&mut Cursor, char) -> Result<(), LexError> + Send + 'static,
    ) {
        self.error_hook = Some(Box::new(hook));
    }

    /// The registered rules, in match order
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Start a session over `buffer`, skipping whitespace between tokens
    pub fn setup(&mut self, buffer: impl Into<String>) {
        self.setup_with(buffer, true);
    }

    /// Start a session over `buffer` with explicit whitespace handling
    ///
    /// When `ignore_whitespace` is false, whitespace reaching the matcher must
    /// be covered by some rule or it fails the session like any other
    /// unmatched character. Resets the cursor; rules and the error hook are
    /// untouched.
    pub fn setup_with(&mut self, buffer: impl Into<String>, ignore_whitespace: bool) {
        let buffer = buffer.into();
        debug!(
            "session start: {} bytes, ignore_whitespace={ignore_whitespace}",
            buffer.len()
        );
        self.cursor.reset(buffer);
        self.ignore_whitespace = ignore_whitespace;
    }

    /// The source buffer of the current session
    #[must_use]
    pub fn buffer(&self) -> &str {
        self.cursor.buffer()
    }

    /// Current byte offset of the cursor
    #[must_use]
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Current (line, column) of the cursor, both 0-indexed
    ///
    /// Valid at any point: mid-session, after exhaustion, and after an error,
    /// always reflecting the last committed cursor position. Idempotent
    /// between cursor movements.
    #[must_use]
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// Pull the next token
    ///
    /// Returns `Ok(Some(token))` on a match, `Ok(None)` once the buffer is
    /// exhausted (after any trailing whitespace skip), and `Err` when no rule
    /// matches and no hook recovers. After a default-mode error the session
    /// is dead: further pulls keep failing on the same character until the
    /// next [`setup`](Lexer::setup).
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            if self.ignore_whitespace {
                self.skip_whitespace();
            }

            if self.cursor.is_exhausted() {
                return Ok(None);
            }

            let start = self.cursor.offset();
            let matched = self
                .rules
                .iter()
                .find_map(|rule| rule.match_at(self.cursor.buffer(), start).map(|end| (rule, end)));

            if let Some((rule, end)) = matched {
                trace!("rule `{}` matched {start}..{end}", rule.name());
                let token = Token::new(
                    self.cursor.buffer()[start..end].to_string(),
                    rule.name().to_string(),
                    self.cursor.position(),
                );
                // The action runs before the cursor moves, so it observes the
                // position of the match start; the commit below overrides any
                // cursor movement the action made.
                let token = rule.apply(&mut self.cursor, token);
                self.cursor.seek(end);
                return Ok(Some(token));
            }

            match self.fail_at(start)? {
                HookOutcome::Advanced => {}
                HookOutcome::Stalled => return Ok(None),
            }
        }
    }

    /// Iterate the remaining tokens of the current session
    ///
    /// The iterator is lazy, finite, and non-restartable: it ends after the
    /// end-of-input signal or after yielding one error. Restarting requires a
    /// fresh [`setup`](Lexer::setup).
    pub fn tokens(&mut self) -> Tokens<'_> {
        Tokens {
            lexer: self,
            done: false,
        }
    }

    fn skip_whitespace(&mut self) {
        if let Some(m) = WHITESPACE.find(self.cursor.rest()) {
            let end = self.cursor.offset() + m.end();
            self.cursor.seek(end);
        }
    }

    /// Dispatch an unmatched character at `start` to the hook or fail
    fn fail_at(&mut self, start: usize) -> Result<HookOutcome, LexError> {
        match self.error_hook.as_mut() {
            None => {
                let Position { line, column } = self.cursor.position();
                debug!("no rule matched at line {line}, column {column}");
                Err(LexError::NoMatch(Diagnostic::new(
                    line,
                    column,
                    self.cursor.current_line().to_string(),
                )))
            },
            Some(hook) => {
                let Some(offending) = self.cursor.peek() else {
                    return Ok(HookOutcome::Stalled);
                };
                hook(&mut self.cursor, offending)?;
                if self.cursor.offset() > start {
                    Ok(HookOutcome::Advanced)
                } else {
                    Ok(HookOutcome::Stalled)
                }
            },
        }
    }
}

/// What an error hook did with the cursor
enum HookOutcome {
    /// Hook moved the cursor forward; matching can resume
    Advanced,
    /// Hook left the cursor in place; the current pull ends
    Stalled,
}

/// Lazy iterator over one lexing session
///
/// Yields `Result<Token, LexError>`; fused after the session ends, whether by
/// exhaustion or by an unrecovered error.
pub struct Tokens<'a> {
    lexer: &'a mut Lexer,
    done: bool,
}

impl std::fmt::Debug for Tokens<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokens").field("done", &self.done).finish()
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.lexer.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(err) => {
                self.done = true;
                Some(Err(err))
            },
        }
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

impl<'a> IntoIterator for &'a mut Lexer {
    type Item = Result<Token, LexError>;
    type IntoIter = Tokens<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens()
    }
}
