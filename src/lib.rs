//! relex - a rule-driven regex lexer
//!
//! This library tokenizes text by trying user-registered (pattern, action)
//! rules at a cursor, in registration order, and yielding a token for the
//! first rule that matches. It tracks line/column positions, optionally skips
//! whitespace between tokens, and reports unmatched input either as a
//! caret-annotated error or through a caller-installed recovery hook.
//!
//! # Examples
//!
//! ```
//! use relex::Lexer;
//!
//! let mut lexer = Lexer::new();
//! lexer.rule("DIGIT", r"\d+(\.\d+)?").unwrap();
//! lexer.rule("ID", r"[a-zA-Z]+([0-9a-zA-Z_]+)?").unwrap();
//! lexer.rule("OP", r"\+|-|\*|/").unwrap();
//!
//! lexer.setup("4.6 * x1");
//! for token in lexer.tokens() {
//!     let token = token.unwrap();
//!     println!("{}: {:?} at {}", token.kind, token.value, token.pos);
//! }
//! ```
//!
//! Rule order is significant: the first registered rule whose pattern matches
//! at the cursor wins, with no longest-match tie-breaking. Register more
//! specific rules before more general ones.

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod lexer;
pub mod rules;
pub mod token;

pub use error::{Diagnostic, LexError, RuleError};
pub use lexer::{Cursor, ErrorHook, Lexer, Tokens};
pub use rules::{Action, Rule, RuleSet};
pub use token::{Position, Token};
