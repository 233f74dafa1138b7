//! `cpreproc-syntax` - Incremental, error-tolerant parsing of the C preprocessor sublanguage.
//!
//! This crate turns C source text into a concrete syntax tree of its
//! preprocessor structure: directives, conditional blocks, macro definitions
//! and the plain text between them.
//!
//! - **Lexer**: a static `logos` lexer plus a stateful external scanner for
//!   the context-sensitive tokens (directive starts, line ends, `#`/`##`)
//! - **Parser**: shift/reduce over LALR(1) tables built from the grammar at
//!   startup, with bounded lookahead for conflicts the tables leave open
//! - **Tree**: an immutable, shareable tree with byte ranges, fields and
//!   S-expression output, plus a lossless `rowan` view
//!
//! # Design Principles
//!
//! - **Error-tolerant**: every input produces a tree; problems show up as
//!   `ERROR` and missing nodes
//! - **Incremental**: [`Parser::reparse`] reuses the subtrees of the old tree
//!   an edit cannot have affected, and produces the same tree as a fresh parse
//! - **Deterministic**: the same input always gives the same tree
//!
//! # Example
//!
//! ```
//! use cpreproc_syntax::{InputEdit, Parser};
//!
//! let mut parser = Parser::new();
//! let old = parser.parse("#define MAX 10\n");
//! assert_eq!(
//!     old.root_node().to_sexp(),
//!     "(translation_unit (preproc_def name: (identifier) value: (preproc_tokens token: (number_literal))))"
//! );
//!
//! let new_source = "#define MAX 100\n";
//! let edit = InputEdit::diff(old.source(), new_source);
//! let new = parser.reparse(&old, &edit, new_source).unwrap();
//! assert_eq!(new, parser.parse(new_source));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod grammar;
pub mod language;
pub mod lexer;
pub mod parser;
pub mod scanner;
pub mod syntax;
pub mod tree;
mod token_kinds;

pub use config::ParserConfig;
pub use error::{ConfigError, EditError, ReparseError};
pub use language::{language, Language};
pub use parser::{parse, ParseError, Parser, ReuseStats};
pub use syntax::{PreprocLanguage, SyntaxKind, SyntaxNode, SyntaxToken};
pub use tree::{InputEdit, Node, Point, Tree};
