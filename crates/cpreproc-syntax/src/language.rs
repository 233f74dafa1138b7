//! The language descriptor.
//!
//! A [`Language`] bundles everything a parse needs that does not change
//! between parses: the grammar, its LALR tables, symbol and field metadata,
//! the static lexer and a factory for the external scanner. The C
//! preprocessor language is built once, on first use.

use std::fmt;

use once_cell::sync::Lazy;

use crate::grammar::table::ParseTable;
use crate::grammar::{rules, FieldId, Grammar, Production, ProductionId};
use crate::lexer::{self, TokenKind};
use crate::scanner::{ExternalScanner, PreprocScanner, ValidSymbols};
use crate::syntax::{SyntaxKind, EXTERNAL_TOKENS};

/// Descriptor format version.
pub const LANGUAGE_VERSION: u32 = 1;

/// Static lexer entry point: kind and byte length of the token at the start
/// of the text.
pub type LexFn = fn(&str) -> Option<(TokenKind, usize)>;

/// Creates a fresh external scanner.
pub type ScannerFactory = fn() -> Box<dyn ExternalScanner>;

static C_PREPROC: Lazy<Language> =
    Lazy::new(|| Language::new("c_preproc", rules::grammar(), lexer::lex_one, preproc_scanner));

fn preproc_scanner() -> Box<dyn ExternalScanner> {
    Box::new(PreprocScanner::new())
}

/// Returns the C preprocessor language.
#[must_use]
pub fn language() -> &'static Language {
    &C_PREPROC
}

/// Immutable parse tables and metadata for one grammar.
pub struct Language {
    name: &'static str,
    grammar: Grammar,
    table: ParseTable,
    fingerprint: u64,
    structural: ValidSymbols,
    lex: LexFn,
    new_scanner: ScannerFactory,
}

impl Language {
    /// Builds a language, computing its parse tables.
    #[must_use]
    pub fn new(
        name: &'static str,
        grammar: Grammar,
        lex: LexFn,
        new_scanner: ScannerFactory,
    ) -> Self {
        let table = ParseTable::build(&grammar);
        let fingerprint = grammar.fingerprint();
        let structural = EXTERNAL_TOKENS
            .iter()
            .copied()
            .filter(|kind| kind.is_sync())
            .collect();
        tracing::debug!(
            name,
            states = table.state_count(),
            productions = grammar.productions().len(),
            fingerprint,
            "language ready"
        );
        Self {
            name,
            grammar,
            table,
            fingerprint,
            structural,
            lex,
            new_scanner,
        }
    }

    /// The grammar name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Descriptor format version.
    #[must_use]
    pub fn version(&self) -> u32 {
        LANGUAGE_VERSION
    }

    /// Hash of the grammar rules; trees from different builds never mix.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Number of symbols.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        SyntaxKind::COUNT
    }

    /// Name of the symbol with id `symbol`.
    #[must_use]
    pub fn symbol_name(&self, symbol: u16) -> Option<&'static str> {
        SyntaxKind::from_raw(symbol).map(SyntaxKind::name)
    }

    /// First symbol with the given name and namedness.
    #[must_use]
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<SyntaxKind> {
        SyntaxKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name && kind.is_named() == named)
    }

    /// Returns `true` if `kind` is a named symbol.
    #[must_use]
    pub fn is_named(&self, kind: SyntaxKind) -> bool {
        kind.is_named()
    }

    /// Returns `true` if `kind` is a terminal.
    #[must_use]
    pub fn is_terminal(&self, kind: SyntaxKind) -> bool {
        kind.is_token()
    }

    /// Number of field names.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.grammar.field_names().len()
    }

    /// Name of a field.
    #[must_use]
    pub fn field_name(&self, id: FieldId) -> Option<&str> {
        self.grammar.field_name(id)
    }

    /// Id of a field name.
    #[must_use]
    pub fn field_id_for_name(&self, name: &str) -> Option<FieldId> {
        self.grammar.field_id(name)
    }

    /// The grammar the tables were built from.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The parse tables.
    #[must_use]
    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    /// A production by id.
    #[must_use]
    pub fn production(&self, id: ProductionId) -> Option<&Production> {
        self.grammar.productions().get(id)
    }

    /// External tokens the scanner may always return, whatever the state.
    #[must_use]
    pub fn structural_tokens(&self) -> ValidSymbols {
        self.structural
    }

    /// External tokens valid in `state`, including the structural ones.
    #[must_use]
    pub fn valid_external(&self, state: u32) -> ValidSymbols {
        self.table.valid_external(state).union(self.structural)
    }

    /// Runs the static lexer at the start of `text`.
    #[must_use]
    pub fn lex(&self, text: &str) -> Option<(TokenKind, usize)> {
        (self.lex)(text)
    }

    /// Creates a scanner in its initial state.
    #[must_use]
    pub fn new_scanner(&self) -> Box<dyn ExternalScanner> {
        (self.new_scanner)()
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name)
            .field("states", &self.table.state_count())
            .field("fingerprint", &format_args!("{:#x}", self.fingerprint))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_language_is_shared() {
        assert_send_sync::<Language>();
        assert!(std::ptr::eq(language(), language()));
    }

    #[test]
    fn test_symbol_metadata() {
        let lang = language();
        assert_eq!(lang.symbol_count(), SyntaxKind::COUNT);
        assert_eq!(
            lang.symbol_name(SyntaxKind::PreprocDef.to_raw()),
            Some("preproc_def")
        );
        assert_eq!(
            lang.symbol_for_name("preproc_def", true),
            Some(SyntaxKind::PreprocDef)
        );
        assert_eq!(
            lang.symbol_for_name("#define", false),
            Some(SyntaxKind::DirDefine)
        );
        assert_eq!(lang.symbol_for_name("(", false), Some(SyntaxKind::LParen));
        assert!(lang.is_terminal(SyntaxKind::SystemLibString));
        assert!(!lang.is_terminal(SyntaxKind::CTokens));
        assert!(lang.is_named(SyntaxKind::SystemLibString));
    }

    #[test]
    fn test_field_metadata() {
        let lang = language();
        let name = lang.field_id_for_name("name").unwrap();
        assert_eq!(lang.field_name(name), Some("name"));
        assert!(lang.field_count() >= 10);
        assert_eq!(lang.field_id_for_name("nope"), None);
    }

    #[test]
    fn test_structural_tokens_always_valid() {
        let lang = language();
        for state in 0..lang.table().state_count() {
            let valid = lang.valid_external(u32::try_from(state).unwrap());
            assert!(valid.contains_kind(SyntaxKind::DirectiveEnd));
            assert!(valid.contains_kind(SyntaxKind::DirEndif));
        }
    }

    #[test]
    fn test_static_lexer_entry_point() {
        assert_eq!(language().lex("abc d"), Some((TokenKind::Identifier, 3)));
    }
}
