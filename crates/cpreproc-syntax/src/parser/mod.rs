//! Table-driven parser for the C preprocessor sublanguage.
//!
//! # Design
//!
//! - **Table-driven**: an LR automaton over the tables in
//!   [`Language::table`](crate::Language::table)
//! - **Error-tolerant**: malformed input becomes `ERROR` and missing nodes,
//!   the parse itself never fails
//! - **Incremental**: [`Parser::reparse`] reuses unchanged subtrees of the
//!   previous tree
//!
//! # Architecture
//!
//! 1. **Lexing**: the external scanner gets the first try at every position,
//!    then the static lexer (see `scanner` and `lexer`)
//! 2. **Parsing**: shift/reduce over the parse table, with bounded lookahead
//!    for any conflict the tables leave open
//! 3. **Recovery**: missing-token insertion and token skipping, see
//!    `recovery`

mod engine;
mod recovery;
mod reuse;

use std::sync::Arc;

use crate::config::ParserConfig;
use crate::error::ReparseError;
use crate::language::{language, Language};
use crate::tree::{InputEdit, Tree};
use engine::Engine;
use reuse::Reuse;

/// A parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The byte range where the error occurred.
    pub range: text_size::TextRange,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}

impl std::error::Error for ParseError {}

/// How much of the old tree the last reparse kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReuseStats {
    /// Subtrees taken over from the old tree.
    pub reused_nodes: usize,
    /// Bytes covered by those subtrees.
    pub reused_bytes: usize,
}

/// Parses source text into [`Tree`]s.
///
/// A parser holds no state between calls besides its configuration and the
/// statistics of the last run; one parser per thread is the intended use.
#[derive(Debug, Clone)]
pub struct Parser {
    language: &'static Language,
    config: ParserConfig,
    stats: ReuseStats,
}

impl Parser {
    /// Creates a parser with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Creates a parser with the given configuration.
    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            language: language(),
            config,
            stats: ReuseStats::default(),
        }
    }

    /// The parser's configuration.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The language this parser builds trees for.
    #[must_use]
    pub fn language(&self) -> &'static Language {
        self.language
    }

    /// Parses `source` from scratch.
    pub fn parse(&mut self, source: &str) -> Tree {
        let (root, stats) = Engine::new(self.language, &self.config, source, None).run();
        self.stats = stats;
        Tree::new(root, Arc::from(source), self.language)
    }

    /// Parses `new_source`, the result of applying `edit` to `old`'s source,
    /// reusing the parts of `old` the edit cannot have affected.
    ///
    /// The result is equal to `self.parse(new_source)`.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving `old` untouched, if the edit does not
    /// describe how `old.source()` became `new_source` or if `old` was
    /// built by a different grammar build.
    pub fn reparse(
        &mut self,
        old: &Tree,
        edit: &InputEdit,
        new_source: &str,
    ) -> Result<Tree, ReparseError> {
        let expected = self.language.fingerprint();
        let found = old.language().fingerprint();
        if found != expected {
            return Err(ReparseError::LanguageMismatch { expected, found });
        }
        edit.validate(old.source(), new_source)?;

        let reuse = self.config.reuse_subtrees.then(|| Reuse::new(old, *edit));
        let (root, stats) = Engine::new(self.language, &self.config, new_source, reuse).run();
        tracing::debug!(
            reused_nodes = stats.reused_nodes,
            reused_bytes = stats.reused_bytes,
            len = new_source.len(),
            "reparse finished"
        );
        self.stats = stats;
        Ok(Tree::new(root, Arc::from(new_source), self.language))
    }

    /// Statistics of the last [`Parser::parse`] or [`Parser::reparse`].
    #[must_use]
    pub fn last_reuse_stats(&self) -> ReuseStats {
        self.stats
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `source` with the default configuration.
#[must_use]
pub fn parse(source: &str) -> Tree {
    Parser::new().parse(source)
}
