//! Grammar rules as data.
//!
//! A [`Grammar`] is a list of [`Production`]s over [`SyntaxKind`] symbols,
//! with optional field names on right-hand side symbols and a declared
//! precedence and associativity per production. Rules are added through a
//! [`GrammarBuilder`]; optional symbols are expanded into one production per
//! combination, in the order the symbols appear.

pub mod rules;
pub mod table;

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use smol_str::SmolStr;

use crate::syntax::SyntaxKind;

/// Index of a production in [`Grammar::productions`].
pub type ProductionId = usize;

/// Index of a field name in [`Grammar::field_names`].
pub type FieldId = u16;

/// Associativity of a production, used to settle shift/reduce conflicts of
/// equal precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Assoc {
    /// No associativity; equal precedence leaves the conflict in place.
    #[default]
    None,
    /// Prefer reducing.
    Left,
    /// Prefer shifting.
    Right,
}

/// A single production `lhs -> rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    /// Left-hand side nonterminal.
    pub lhs: SyntaxKind,
    /// Right-hand side symbols.
    pub rhs: Vec<SyntaxKind>,
    /// Field of each right-hand side symbol.
    pub fields: Vec<Option<FieldId>>,
    /// Declared precedence (0 when undeclared).
    pub prec: i32,
    /// Declared associativity.
    pub assoc: Assoc,
}

impl Production {
    /// Number of right-hand side symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    /// Returns `true` for an empty production.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

/// One right-hand side element accepted by [`GrammarBuilder::rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    kind: SyntaxKind,
    field: Option<&'static str>,
    optional: bool,
}

/// A plain symbol.
#[must_use]
pub fn sym(kind: SyntaxKind) -> Element {
    Element {
        kind,
        field: None,
        optional: false,
    }
}

/// A symbol labelled with a field name.
#[must_use]
pub fn field(name: &'static str, kind: SyntaxKind) -> Element {
    Element {
        kind,
        field: Some(name),
        optional: false,
    }
}

/// Makes an element optional.
#[must_use]
pub fn opt(element: Element) -> Element {
    Element {
        optional: true,
        ..element
    }
}

/// A complete grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    start: SyntaxKind,
    productions: Vec<Production>,
    field_names: Vec<SmolStr>,
}

impl Grammar {
    /// The start symbol.
    #[must_use]
    pub fn start(&self) -> SyntaxKind {
        self.start
    }

    /// All productions in declaration order.
    #[must_use]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Field names, indexed by [`FieldId`].
    #[must_use]
    pub fn field_names(&self) -> &[SmolStr] {
        &self.field_names
    }

    /// Looks up the id of a field name.
    #[must_use]
    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.field_names
            .iter()
            .position(|candidate| candidate == name)
            .and_then(|index| FieldId::try_from(index).ok())
    }

    /// The name of a field.
    #[must_use]
    pub fn field_name(&self, id: FieldId) -> Option<&str> {
        self.field_names.get(usize::from(id)).map(SmolStr::as_str)
    }

    /// A hash of the rules identifying this grammar build.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        SyntaxKind::COUNT.hash(&mut hasher);
        self.start.hash(&mut hasher);
        self.productions.hash(&mut hasher);
        self.field_names.hash(&mut hasher);
        hasher.finish()
    }
}

/// Collects productions into a [`Grammar`].
#[derive(Debug)]
pub struct GrammarBuilder {
    start: SyntaxKind,
    productions: Vec<Production>,
    field_names: Vec<SmolStr>,
    field_ids: FxHashMap<&'static str, FieldId>,
}

impl GrammarBuilder {
    /// Creates a builder for a grammar with the given start symbol.
    #[must_use]
    pub fn new(start: SyntaxKind) -> Self {
        Self {
            start,
            productions: Vec::new(),
            field_names: Vec::new(),
            field_ids: FxHashMap::default(),
        }
    }

    /// Adds `lhs -> elements`, one production per choice of optional elements.
    pub fn rule<I>(&mut self, lhs: SyntaxKind, elements: I) -> RuleOptions<'_>
    where
        I: IntoIterator<Item = Element>,
    {
        debug_assert!(lhs.is_node(), "{} is not a nonterminal", lhs.name());
        let elements: Vec<Element> = elements.into_iter().collect();
        let labelled: Vec<(SyntaxKind, Option<FieldId>, bool)> = elements
            .iter()
            .map(|element| {
                let field = element.field.map(|name| self.intern_field(name));
                (element.kind, field, element.optional)
            })
            .collect();

        let first = self.productions.len();
        let optional_count = labelled.iter().filter(|(_, _, optional)| *optional).count();
        // A set bit skips that optional element; mask 0 keeps all of them.
        for skip_mask in 0..(1_u32 << optional_count) {
            let mut rhs = Vec::with_capacity(labelled.len());
            let mut fields = Vec::with_capacity(labelled.len());
            let mut optional_index = 0;
            for (kind, field, optional) in &labelled {
                if *optional {
                    let skipped = skip_mask & (1 << optional_index) != 0;
                    optional_index += 1;
                    if skipped {
                        continue;
                    }
                }
                rhs.push(*kind);
                fields.push(*field);
            }
            self.productions.push(Production {
                lhs,
                rhs,
                fields,
                prec: 0,
                assoc: Assoc::None,
            });
        }
        RuleOptions {
            productions: &mut self.productions[first..],
        }
    }

    /// Finishes the grammar.
    #[must_use]
    pub fn build(self) -> Grammar {
        Grammar {
            start: self.start,
            productions: self.productions,
            field_names: self.field_names,
        }
    }

    fn intern_field(&mut self, name: &'static str) -> FieldId {
        if let Some(id) = self.field_ids.get(name) {
            return *id;
        }
        let id = FieldId::try_from(self.field_names.len()).unwrap_or(FieldId::MAX);
        self.field_names.push(SmolStr::new(name));
        self.field_ids.insert(name, id);
        id
    }
}

/// Precedence settings for the productions added by one rule.
#[derive(Debug)]
pub struct RuleOptions<'g> {
    productions: &'g mut [Production],
}

impl RuleOptions<'_> {
    /// Sets the precedence without associativity.
    pub fn prec(self, prec: i32) -> Self {
        self.set(prec, Assoc::None)
    }

    /// Sets the precedence, left associative.
    pub fn left(self, prec: i32) -> Self {
        self.set(prec, Assoc::Left)
    }

    /// Sets the precedence, right associative.
    pub fn right(self, prec: i32) -> Self {
        self.set(prec, Assoc::Right)
    }

    fn set(self, prec: i32, assoc: Assoc) -> Self {
        for production in self.productions.iter_mut() {
            production.prec = prec;
            production.assoc = assoc;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SyntaxKind as K;

    #[test]
    fn test_optional_elements_expand() {
        let mut builder = GrammarBuilder::new(K::TranslationUnit);
        builder
            .rule(
                K::PreprocDef,
                [
                    sym(K::DirDefine),
                    field("name", K::Identifier),
                    opt(field("value", K::PreprocTokens)),
                    sym(K::DirectiveEnd),
                ],
            )
            .right(2);
        let grammar = builder.build();

        let rhs: Vec<_> = grammar.productions().iter().map(|p| p.rhs.clone()).collect();
        assert_eq!(
            rhs,
            vec![
                vec![K::DirDefine, K::Identifier, K::PreprocTokens, K::DirectiveEnd],
                vec![K::DirDefine, K::Identifier, K::DirectiveEnd],
            ]
        );
        let name = grammar.field_id("name");
        let value = grammar.field_id("value");
        assert_eq!(grammar.productions()[0].fields, vec![None, name, value, None]);
        assert_eq!(grammar.productions()[1].fields, vec![None, name, None]);
        assert!(grammar
            .productions()
            .iter()
            .all(|p| p.prec == 2 && p.assoc == Assoc::Right));
    }

    #[test]
    fn test_field_names_are_interned() {
        let mut builder = GrammarBuilder::new(K::TranslationUnit);
        builder.rule(K::PreprocUndef, [field("name", K::Identifier)]);
        builder.rule(K::PreprocIfdef, [field("name", K::Identifier)]);
        let grammar = builder.build();
        assert_eq!(grammar.field_names().len(), 1);
        assert_eq!(grammar.field_name(0), Some("name"));
        assert_eq!(grammar.field_id("missing"), None);
    }

    #[test]
    fn test_fingerprint_changes_with_rules() {
        let build = |prec| {
            let mut builder = GrammarBuilder::new(K::TranslationUnit);
            builder.rule(K::TranslationUnit, [sym(K::Identifier)]).left(prec);
            builder.build().fingerprint()
        };
        assert_eq!(build(1), build(1));
        assert_ne!(build(1), build(2));
    }
}
