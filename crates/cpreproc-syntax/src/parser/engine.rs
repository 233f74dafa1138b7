//! The LR driver.
//!
//! The stack holds `(state, subtree)` entries. Extras (comments and `ERROR`
//! nodes) are pushed without changing the state and are skipped when a
//! reduction counts its children. Reductions flatten hidden nodes into the
//! node being built.

use crate::config::ParserConfig;
use crate::grammar::table::{Action, StateId};
use crate::grammar::{FieldId, Production, ProductionId};
use crate::language::Language;
use crate::parser::reuse::Reuse;
use crate::parser::ReuseStats;
use crate::scanner::{logical_line_end, Cursor, ExternalScanner, ExternalState};
use crate::syntax::{SyntaxKind, EXTERNAL_TOKENS};
use crate::tree::subtree::{Child, Subtree};

/// Bytes the static lexer may read past a token before giving up on a
/// longer match (`1e+`, `..`, `0x`).
const STATIC_LOOKAHEAD: usize = 4;

/// Bound on reductions between two shifts in a simulation.
const MAX_SIMULATED_REDUCTIONS: usize = 1024;

/// A lexed token with its padding.
#[derive(Debug, Clone, Copy)]
pub(super) struct Lookahead {
    pub(super) symbol: SyntaxKind,
    /// Offset where the padding starts.
    pub(super) start: usize,
    pub(super) padding: usize,
    pub(super) size: usize,
    /// Scanner state after the token.
    pub(super) end_state: ExternalState,
}

impl Lookahead {
    pub(super) fn end(&self) -> usize {
        self.start + self.padding + self.size
    }
}

pub(super) struct Entry {
    pub(super) state: StateId,
    pub(super) subtree: Subtree,
}

/// The state of one parse.
pub(super) struct Engine<'a> {
    pub(super) language: &'static Language,
    pub(super) config: &'a ParserConfig,
    source: &'a str,
    scanner: Box<dyn ExternalScanner>,
    pub(super) stack: Vec<Entry>,
    pub(super) lookahead: Lookahead,
    /// One past the furthest byte any lexing looked at.
    max_examined: usize,
    /// Cached end of the logical line a static token last ran into.
    line_end: usize,
    /// Start of the lookahead at the last runtime conflict.
    last_conflict: Option<usize>,
    /// Lookahead position and kind at the last missing-token insertion.
    pub(super) last_insertion: Option<(usize, SyntaxKind)>,
    /// Set while reductions run on a missing token instead of a real one.
    inserting: bool,
    reuse: Option<Reuse<'a>>,
    stats: ReuseStats,
}

impl<'a> Engine<'a> {
    pub(super) fn new(
        language: &'static Language,
        config: &'a ParserConfig,
        source: &'a str,
        reuse: Option<Reuse<'a>>,
    ) -> Self {
        let mut engine = Self {
            language,
            config,
            source,
            scanner: language.new_scanner(),
            stack: Vec::new(),
            lookahead: Lookahead {
                symbol: SyntaxKind::Eof,
                start: 0,
                padding: 0,
                size: 0,
                end_state: ExternalState::default(),
            },
            max_examined: 0,
            line_end: 0,
            last_conflict: None,
            last_insertion: None,
            inserting: false,
            reuse,
            stats: ReuseStats::default(),
        };
        engine.lookahead = engine.lex(0, 0);
        engine
    }

    /// Parses to the end of input and returns the root.
    pub(super) fn run(mut self) -> (Subtree, ReuseStats) {
        loop {
            let state = self.top_state();
            let token = self.lookahead;
            if token.symbol.is_extra() {
                self.shift_extra();
                continue;
            }
            let language = self.language;
            let actions = language.table().actions(state, token.symbol);
            let action = match actions {
                [] => {
                    if self.recover() {
                        continue;
                    }
                    break;
                }
                [action] => *action,
                _ => self.choose(state, actions),
            };
            match action {
                Action::Shift(next) => {
                    if !self.try_reuse(state) {
                        self.shift(state, next);
                    }
                }
                Action::Reduce(production) => self.reduce(production),
                Action::Accept => break,
            }
        }
        let stats = self.stats;
        let root = self.finish();
        (root, stats)
    }

    pub(super) fn top_state(&self) -> StateId {
        self.stack.last().map_or(0, |entry| entry.state)
    }

    /// States of the non-extra entries, bottom first.
    pub(super) fn state_stack(&self) -> Vec<StateId> {
        let mut states = vec![0];
        states.extend(
            self.stack
                .iter()
                .filter(|entry| !entry.subtree.is_extra())
                .map(|entry| entry.state),
        );
        states
    }

    // =========================================================================
    // LEXING
    // =========================================================================

    /// Lexes the token whose padding starts at `start`, for a parser in
    /// `state`.
    pub(super) fn lex(&mut self, start: usize, state: StateId) -> Lookahead {
        let valid = self.language.valid_external(state);
        let mut position = start;
        loop {
            let mut cursor = Cursor::new(self.source, position);
            let scanned = self.scanner.scan(&mut cursor, valid);
            self.examine(cursor.max_examined());
            if let Some(index) = scanned {
                debug_assert!(valid.contains(index), "scanner returned an invalid token");
                debug_assert!(cursor.token_end() >= position, "scanner moved backward");
                if let Some(&symbol) = EXTERNAL_TOKENS.get(index) {
                    let end = cursor.token_end().max(position);
                    return self.token(symbol, start, position, end);
                }
            }

            let rest = self.source.get(position..).unwrap_or_default();
            let Some((kind, len)) = self.language.lex(rest) else {
                self.examine(self.source.len() + 1);
                return self.token(SyntaxKind::Eof, start, position, position);
            };
            let end = position + len;
            let symbol = SyntaxKind::from(kind);
            self.examine_static(symbol, end);
            if symbol.is_padding() {
                position = end;
                continue;
            }
            return self.token(symbol, start, position, end);
        }
    }

    fn token(&self, symbol: SyntaxKind, start: usize, position: usize, end: usize) -> Lookahead {
        let mut end_state = ExternalState::default();
        self.scanner.serialize(&mut end_state);
        Lookahead {
            symbol,
            start,
            padding: position - start,
            size: end - position,
            end_state,
        }
    }

    fn examine(&mut self, end: usize) {
        self.max_examined = self.max_examined.max(end);
    }

    /// Records how far the static lexer may have read for a token ending at
    /// `end`. Unterminated literals are only rejected at the end of the line.
    fn examine_static(&mut self, symbol: SyntaxKind, end: usize) {
        let may_read_line = symbol == SyntaxKind::Unknown
            || (symbol == SyntaxKind::Identifier
                && matches!(self.source.as_bytes().get(end), Some(b'\'' | b'"')));
        if may_read_line {
            if end > self.line_end {
                self.line_end = logical_line_end(self.source, end);
            }
            self.examine(self.line_end + 1);
        } else {
            self.examine(end + STATIC_LOOKAHEAD);
        }
    }

    /// Moves to the token after the current lookahead.
    pub(super) fn advance(&mut self) {
        let end = self.lookahead.end();
        let state = self.top_state();
        self.lookahead = self.lex(end, state);
    }

    /// Puts the scanner back in the state it had after the lookahead.
    pub(super) fn restore_scanner(&mut self) {
        let state = self.lookahead.end_state;
        self.scanner.deserialize(&state);
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    fn shift(&mut self, state: StateId, next: StateId) {
        let token = self.lookahead;
        let leaf = Subtree::leaf(
            token.symbol,
            token.padding,
            token.size,
            state,
            token.end_state,
            self.language.valid_external(next),
        );
        self.stack.push(Entry {
            state: next,
            subtree: leaf,
        });
        self.advance();
    }

    fn shift_extra(&mut self) {
        let state = self.top_state();
        let token = self.lookahead;
        let leaf = Subtree::leaf(
            token.symbol,
            token.padding,
            token.size,
            state,
            token.end_state,
            self.language.valid_external(state),
        );
        self.stack.push(Entry {
            state,
            subtree: leaf,
        });
        self.advance();
    }

    /// Pushes a zero-width missing token in front of the lookahead,
    /// performing the reductions it triggers. Nodes reduced here are
    /// fragile: a fresh parse may recover along another path.
    pub(super) fn insert_missing(&mut self, symbol: SyntaxKind) {
        let language = self.language;
        self.inserting = true;
        for _ in 0..MAX_SIMULATED_REDUCTIONS {
            let state = self.top_state();
            match language.table().actions(state, symbol).first() {
                Some(Action::Shift(next)) => {
                    let subtree = Subtree::missing(symbol, state);
                    self.stack.push(Entry {
                        state: *next,
                        subtree,
                    });
                    break;
                }
                Some(Action::Reduce(production)) => self.reduce(*production),
                Some(Action::Accept) | None => break,
            }
        }
        self.inserting = false;
    }

    pub(super) fn reduce(&mut self, id: ProductionId) {
        let language = self.language;
        let Some(production) = language.production(id) else {
            return;
        };
        let mut trailing = Vec::new();
        if !production.is_empty() {
            while self
                .stack
                .last()
                .is_some_and(|entry| entry.subtree.is_extra())
            {
                trailing.extend(self.stack.pop());
            }
        }
        let mut popped = Vec::with_capacity(production.len());
        let mut count = 0;
        while count < production.len() {
            let Some(entry) = self.stack.pop() else {
                break;
            };
            if !entry.subtree.is_extra() {
                count += 1;
            }
            popped.push(entry.subtree);
        }

        let pre_state = self.top_state();
        let children = collect_children(production, popped);
        let trailing_len: usize = trailing.iter().map(|entry| entry.subtree.total_len()).sum();
        let node_end = self.lookahead.start.saturating_sub(trailing_len);
        let node_len: usize = children.iter().map(|child| child.subtree.total_len()).sum();
        let node_start = node_end.saturating_sub(node_len);
        let fragile = self.inserting || self.last_conflict.is_some_and(|at| at >= node_start);
        let node = Subtree::node(
            production.lhs,
            children,
            pre_state,
            self.max_examined.saturating_sub(node_end),
            fragile,
        );
        let state = language.table().goto(pre_state, production.lhs);
        debug_assert!(state.is_some(), "no goto for {}", production.lhs.name());
        let state = state.unwrap_or(pre_state);
        self.stack.push(Entry {
            state,
            subtree: node,
        });
        for entry in trailing.into_iter().rev() {
            self.stack.push(Entry {
                state,
                subtree: entry.subtree,
            });
        }
    }

    /// Builds the root from what is left on the stack after acceptance.
    fn finish(self) -> Subtree {
        let mut children = Vec::new();
        for entry in self.stack {
            let subtree = entry.subtree;
            if subtree.symbol() == SyntaxKind::TranslationUnit && !subtree.is_extra() {
                children.extend(subtree.into_children());
            } else {
                push_child(&mut children, subtree, None);
            }
        }
        Subtree::root(SyntaxKind::TranslationUnit, children, self.source.len())
    }

    // =========================================================================
    // REUSE
    // =========================================================================

    /// Pushes an old subtree in place of the lookahead and what follows it,
    /// if one fits.
    fn try_reuse(&mut self, state: StateId) -> bool {
        let language = self.language;
        let token = self.lookahead;
        let Some(reuse) = self.reuse.as_mut() else {
            return false;
        };
        let found = reuse.take(token.start, |node| {
            if node.pre_state() != state {
                return false;
            }
            let Some(next) = language.table().goto(state, node.symbol()) else {
                return false;
            };
            language.valid_external(next) == node.follow_valid()
                && node.first_leaf().is_some_and(|leaf| {
                    leaf.symbol() == token.symbol
                        && leaf.padding() == token.padding
                        && leaf.size() == token.size
                        && leaf.end_state() == token.end_state
                })
        });
        let Some(node) = found else {
            return false;
        };
        let Some(next) = language.table().goto(state, node.symbol()) else {
            return false;
        };
        let node = node.clone();
        let end = token.start + node.total_len();
        tracing::trace!(kind = node.symbol().name(), start = token.start, end, "reused subtree");
        self.stats.reused_nodes += 1;
        self.stats.reused_bytes += node.size();
        self.examine(end + node.lookahead_bytes());
        self.scanner.deserialize(&node.end_state());
        self.stack.push(Entry {
            state: next,
            subtree: node,
        });
        self.lookahead = self.lex(end, next);
        true
    }

    // =========================================================================
    // CONFLICTS
    // =========================================================================

    /// Picks one of several actions by simulating each over the next few
    /// tokens. The action that gets furthest wins; ties go to the first.
    fn choose(&mut self, state: StateId, actions: &[Action]) -> Action {
        self.last_conflict = Some(self.lookahead.start);
        let depth = self.config.lookahead_depth;
        let mut best = actions[0];
        let mut best_consumed = 0;
        if depth > 0 {
            let base = self.state_stack();
            for (index, action) in actions.iter().enumerate() {
                let consumed = self.simulate(base.clone(), *action, depth);
                if index == 0 || consumed > best_consumed {
                    best = *action;
                    best_consumed = consumed;
                }
            }
            self.restore_scanner();
        }
        tracing::trace!(state, ?best, consumed = best_consumed, "settled runtime conflict");
        best
    }

    /// Runs `first` and then the first action of every following cell,
    /// returning the number of tokens shifted before an error, at most
    /// `depth`. The scanner is left wherever lexing ended.
    fn simulate(&mut self, mut states: Vec<StateId>, first: Action, depth: usize) -> usize {
        let mut token = self.lookahead;
        let mut action = first;
        let mut consumed = 0;
        let mut reductions = 0;
        loop {
            match action {
                Action::Accept => return depth,
                Action::Shift(next) => {
                    states.push(next);
                    consumed += 1;
                    reductions = 0;
                    if consumed >= depth {
                        return consumed;
                    }
                    token = self.lex(token.end(), next);
                }
                Action::Reduce(id) => {
                    reductions += 1;
                    if reductions > MAX_SIMULATED_REDUCTIONS
                        || !self.simulate_reduce(&mut states, id)
                    {
                        return consumed;
                    }
                }
            }
            let top = states.last().copied().unwrap_or(0);
            while token.symbol.is_extra() {
                token = self.lex(token.end(), top);
            }
            let language = self.language;
            match language.table().actions(top, token.symbol).first() {
                Some(next) => action = *next,
                None => return consumed,
            }
        }
    }

    /// Applies a reduction to a state-only stack.
    pub(super) fn simulate_reduce(&self, states: &mut Vec<StateId>, id: ProductionId) -> bool {
        let Some(production) = self.language.production(id) else {
            return false;
        };
        if states.len() <= production.len() {
            return false;
        }
        states.truncate(states.len() - production.len());
        let top = states.last().copied().unwrap_or(0);
        match self.language.table().goto(top, production.lhs) {
            Some(next) => {
                states.push(next);
                true
            }
            None => false,
        }
    }
}

/// Labels popped subtrees with the production's fields and flattens hidden
/// nodes. `popped` is in stack order, last child first.
fn collect_children(production: &Production, popped: Vec<Subtree>) -> Vec<Child> {
    let mut children = Vec::with_capacity(popped.len());
    let mut fields = production.fields.iter();
    for subtree in popped.into_iter().rev() {
        let field = if subtree.is_extra() {
            None
        } else {
            fields.next().copied().flatten()
        };
        push_child(&mut children, subtree, field);
    }
    children
}

/// Appends `subtree`, splicing in its children if it is a hidden node. The
/// spliced children inherit `field` unless they fill one of their own.
pub(super) fn push_child(children: &mut Vec<Child>, subtree: Subtree, field: Option<FieldId>) {
    if !subtree.symbol().is_hidden() || subtree.is_leaf() {
        children.push(Child { field, subtree });
        return;
    }
    let mut inner = subtree.into_children();
    if let Some(field) = field {
        for child in &mut inner {
            child.field.get_or_insert(field);
        }
    }
    if children.is_empty() {
        *children = inner;
    } else {
        children.extend(inner);
    }
}
