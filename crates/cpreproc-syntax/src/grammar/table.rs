//! LALR(1) parse table construction.
//!
//! States are built from LR(1) item sets; item sets with equal cores share a
//! state and their lookaheads are merged, re-processing a state whenever its
//! lookaheads grow. Conflicts are settled with production precedence and
//! associativity; whatever remains is kept as a multi-action cell for the
//! engine to decide at runtime.

use std::collections::{BTreeMap, VecDeque};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::{Assoc, Grammar, ProductionId};
use crate::scanner::ValidSymbols;
use crate::syntax::SyntaxKind;

/// Index of a parser state.
pub type StateId = u32;

/// A parse action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Push the lookahead and go to the state.
    Shift(StateId),
    /// Reduce by the production.
    Reduce(ProductionId),
    /// The input is complete.
    Accept,
}

/// Compiled action and goto tables.
#[derive(Debug, Clone)]
pub struct ParseTable {
    state_count: usize,
    /// `state * TERMINAL_COUNT + terminal` -> index into `cells`.
    actions: Vec<u32>,
    cells: Vec<Box<[Action]>>,
    /// `state * nonterminal_count + (symbol - TERMINAL_COUNT)`.
    gotos: Vec<Option<StateId>>,
    valid_external: Vec<ValidSymbols>,
    conflicts: usize,
}

impl ParseTable {
    /// Builds the LALR(1) tables for `grammar`.
    #[must_use]
    pub fn build(grammar: &Grammar) -> Self {
        TableBuilder::new(grammar).build()
    }

    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// The actions for `terminal` in `state`, shift first then reductions in
    /// production order. Empty means a syntax error.
    #[must_use]
    pub fn actions(&self, state: StateId, terminal: SyntaxKind) -> &[Action] {
        if !terminal.is_token() {
            return &[];
        }
        let index = state as usize * SyntaxKind::TERMINAL_COUNT + terminal as usize;
        self.actions
            .get(index)
            .and_then(|cell| self.cells.get(*cell as usize))
            .map_or(&[], |cell| &**cell)
    }

    /// The state reached from `state` over `nonterminal`.
    #[must_use]
    pub fn goto(&self, state: StateId, nonterminal: SyntaxKind) -> Option<StateId> {
        let column = (nonterminal as usize).checked_sub(SyntaxKind::TERMINAL_COUNT)?;
        self.gotos
            .get(state as usize * nonterminal_count() + column)
            .copied()
            .flatten()
    }

    /// External tokens with an action in `state`.
    #[must_use]
    pub fn valid_external(&self, state: StateId) -> ValidSymbols {
        self.valid_external
            .get(state as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Terminals with an action in `state`, in symbol order.
    pub fn expected(&self, state: StateId) -> impl Iterator<Item = SyntaxKind> + '_ {
        SyntaxKind::ALL[..SyntaxKind::TERMINAL_COUNT]
            .iter()
            .copied()
            .filter(move |terminal| !self.actions(state, *terminal).is_empty())
    }

    /// Number of cells left with more than one action.
    #[must_use]
    pub fn conflict_count(&self) -> usize {
        self.conflicts
    }
}

fn nonterminal_count() -> usize {
    SyntaxKind::COUNT - SyntaxKind::TERMINAL_COUNT
}

/// Bitset over terminals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TokenSet(Vec<u64>);

impl TokenSet {
    fn new() -> Self {
        Self(vec![0; SyntaxKind::TERMINAL_COUNT.div_ceil(64)])
    }

    fn single(terminal: usize) -> Self {
        let mut set = Self::new();
        set.insert(terminal);
        set
    }

    fn insert(&mut self, terminal: usize) -> bool {
        let (word, bit) = (terminal / 64, 1_u64 << (terminal % 64));
        let before = self.0[word];
        self.0[word] |= bit;
        before != self.0[word]
    }

    fn contains(&self, terminal: usize) -> bool {
        self.0[terminal / 64] & (1_u64 << (terminal % 64)) != 0
    }

    fn union_with(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for (word, other) in self.0.iter_mut().zip(&other.0) {
            let merged = *word | *other;
            changed |= merged != *word;
            *word = merged;
        }
        changed
    }

    fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..SyntaxKind::TERMINAL_COUNT).filter(|terminal| self.contains(*terminal))
    }
}

/// An LR(0) core: production (0 is the augmented start) and dot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Item {
    production: usize,
    dot: usize,
}

/// Internal production; index 0 is `start' -> start`.
struct Prod {
    lhs: Option<SyntaxKind>,
    rhs: Vec<SyntaxKind>,
    prec: i32,
    assoc: Assoc,
}

struct TableBuilder {
    prods: Vec<Prod>,
    by_lhs: Vec<Vec<usize>>,
    first: Vec<TokenSet>,
    nullable: Vec<bool>,
}

impl TableBuilder {
    fn new(grammar: &Grammar) -> Self {
        let mut prods = vec![Prod {
            lhs: None,
            rhs: vec![grammar.start()],
            prec: 0,
            assoc: Assoc::None,
        }];
        prods.extend(grammar.productions().iter().map(|production| Prod {
            lhs: Some(production.lhs),
            rhs: production.rhs.clone(),
            prec: production.prec,
            assoc: production.assoc,
        }));

        let mut by_lhs = vec![Vec::new(); nonterminal_count()];
        for (index, prod) in prods.iter().enumerate().skip(1) {
            if let Some(column) = prod.lhs.and_then(nonterminal_index) {
                by_lhs[column].push(index);
            }
        }

        let mut builder = Self {
            prods,
            by_lhs,
            first: vec![TokenSet::new(); nonterminal_count()],
            nullable: vec![false; nonterminal_count()],
        };
        builder.compute_first();
        builder
    }

    fn compute_first(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for prod in self.prods.iter().skip(1) {
                let Some(lhs) = prod.lhs.and_then(nonterminal_index) else {
                    continue;
                };
                let mut first = TokenSet::new();
                let mut all_nullable = true;
                for symbol in &prod.rhs {
                    match nonterminal_index(*symbol) {
                        None => {
                            first.insert(*symbol as usize);
                            all_nullable = false;
                        }
                        Some(column) => {
                            first.union_with(&self.first[column]);
                            all_nullable = self.nullable[column];
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                changed |= self.first[lhs].union_with(&first);
                if all_nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
    }

    /// FIRST of `symbols` followed by any of `lookahead`.
    fn first_of(&self, symbols: &[SyntaxKind], lookahead: &TokenSet) -> TokenSet {
        let mut first = TokenSet::new();
        for symbol in symbols {
            match nonterminal_index(*symbol) {
                None => {
                    first.insert(*symbol as usize);
                    return first;
                }
                Some(column) => {
                    first.union_with(&self.first[column]);
                    if !self.nullable[column] {
                        return first;
                    }
                }
            }
        }
        first.union_with(lookahead);
        first
    }

    fn next_symbol(&self, item: Item) -> Option<SyntaxKind> {
        self.prods[item.production].rhs.get(item.dot).copied()
    }

    fn closure(&self, kernel: Vec<(Item, TokenSet)>) -> Vec<(Item, TokenSet)> {
        let mut items = kernel;
        let mut index: FxHashMap<Item, usize> = items
            .iter()
            .enumerate()
            .map(|(position, (item, _))| (*item, position))
            .collect();
        let mut work: VecDeque<usize> = (0..items.len()).collect();

        while let Some(position) = work.pop_front() {
            let (item, lookahead) = items[position].clone();
            let Some(column) = self.next_symbol(item).and_then(nonterminal_index) else {
                continue;
            };
            let rest = &self.prods[item.production].rhs[item.dot + 1..];
            let follow = self.first_of(rest, &lookahead);
            for production in &self.by_lhs[column] {
                let new_item = Item {
                    production: *production,
                    dot: 0,
                };
                match index.get(&new_item) {
                    Some(existing) => {
                        if items[*existing].1.union_with(&follow) {
                            work.push_back(*existing);
                        }
                    }
                    None => {
                        index.insert(new_item, items.len());
                        work.push_back(items.len());
                        items.push((new_item, follow.clone()));
                    }
                }
            }
        }
        items
    }

    fn build(self) -> ParseTable {
        let mut states: IndexMap<Vec<Item>, Vec<TokenSet>> = IndexMap::new();
        let mut transitions: Vec<Vec<(SyntaxKind, StateId)>> = vec![Vec::new()];
        let mut queued = vec![true];
        let mut queue = VecDeque::from([0_usize]);
        states.insert(
            vec![Item {
                production: 0,
                dot: 0,
            }],
            vec![TokenSet::single(SyntaxKind::Eof as usize)],
        );

        while let Some(state) = queue.pop_front() {
            queued[state] = false;
            let kernel = match states.get_index(state) {
                Some((core, lookaheads)) => core
                    .iter()
                    .copied()
                    .zip(lookaheads.iter().cloned())
                    .collect(),
                None => continue,
            };

            let mut groups: BTreeMap<SyntaxKind, BTreeMap<Item, TokenSet>> = BTreeMap::new();
            for (item, lookahead) in self.closure(kernel) {
                let Some(symbol) = self.next_symbol(item) else {
                    continue;
                };
                let advanced = Item {
                    production: item.production,
                    dot: item.dot + 1,
                };
                groups
                    .entry(symbol)
                    .or_default()
                    .entry(advanced)
                    .and_modify(|existing| {
                        existing.union_with(&lookahead);
                    })
                    .or_insert(lookahead);
            }

            let mut edges = Vec::with_capacity(groups.len());
            for (symbol, kernel) in groups {
                let core: Vec<Item> = kernel.keys().copied().collect();
                let lookaheads: Vec<TokenSet> = kernel.into_values().collect();
                let target = if let Some((target, _, existing)) = states.get_full_mut(&core) {
                    let mut grew = false;
                    for (old, new) in existing.iter_mut().zip(&lookaheads) {
                        grew |= old.union_with(new);
                    }
                    if grew && !queued[target] {
                        queued[target] = true;
                        queue.push_back(target);
                    }
                    target
                } else {
                    let (target, _) = states.insert_full(core, lookaheads);
                    transitions.push(Vec::new());
                    queued.push(true);
                    queue.push_back(target);
                    target
                };
                edges.push((symbol, state_id(target)));
            }
            transitions[state] = edges;
        }

        self.compile(&states, &transitions)
    }

    fn compile(
        &self,
        states: &IndexMap<Vec<Item>, Vec<TokenSet>>,
        transitions: &[Vec<(SyntaxKind, StateId)>],
    ) -> ParseTable {
        let state_count = states.len();
        let mut actions = vec![0_u32; state_count * SyntaxKind::TERMINAL_COUNT];
        let mut cells: Vec<Box<[Action]>> = vec![Box::new([])];
        let mut cell_ids: FxHashMap<Vec<Action>, u32> = FxHashMap::default();
        let mut gotos = vec![None; state_count * nonterminal_count()];
        let mut valid_external = vec![ValidSymbols::EMPTY; state_count];
        let mut conflicts = 0;

        for (state, (core, lookaheads)) in states.iter().enumerate() {
            let kernel = core.iter().copied().zip(lookaheads.iter().cloned()).collect();
            let closure = self.closure(kernel);

            let mut shift_prec: FxHashMap<SyntaxKind, i32> = FxHashMap::default();
            let mut reduces: BTreeMap<SyntaxKind, Vec<usize>> = BTreeMap::new();
            let mut accept = false;
            for (item, lookahead) in &closure {
                match self.next_symbol(*item) {
                    Some(symbol) if symbol.is_token() => {
                        let prec = self.prods[item.production].prec;
                        shift_prec
                            .entry(symbol)
                            .and_modify(|existing| *existing = (*existing).max(prec))
                            .or_insert(prec);
                    }
                    Some(_) => {}
                    None if item.production == 0 => {
                        accept |= lookahead.contains(SyntaxKind::Eof as usize);
                    }
                    None => {
                        for terminal in lookahead.iter() {
                            if let Some(kind) = SyntaxKind::ALL.get(terminal) {
                                reduces.entry(*kind).or_default().push(item.production);
                            }
                        }
                    }
                }
            }

            let mut cells_by_terminal: BTreeMap<SyntaxKind, Vec<Action>> = BTreeMap::new();
            for (symbol, target) in &transitions[state] {
                if symbol.is_token() {
                    cells_by_terminal
                        .entry(*symbol)
                        .or_default()
                        .push(Action::Shift(*target));
                } else if let Some(column) = nonterminal_index(*symbol) {
                    gotos[state * nonterminal_count() + column] = Some(*target);
                }
            }
            if accept {
                cells_by_terminal
                    .entry(SyntaxKind::Eof)
                    .or_default()
                    .push(Action::Accept);
            }
            for (terminal, productions) in reduces {
                let shift = shift_prec.get(&terminal).copied();
                let cell = cells_by_terminal.entry(terminal).or_default();
                self.resolve(cell, shift, productions);
            }

            for (terminal, mut cell) in cells_by_terminal {
                if cell.is_empty() {
                    continue;
                }
                cell.sort_by_key(|action| match action {
                    Action::Shift(_) => (0, 0),
                    Action::Accept => (1, 0),
                    Action::Reduce(production) => (2, *production),
                });
                if cell.len() > 1 {
                    conflicts += 1;
                    tracing::trace!(
                        state,
                        terminal = terminal.name(),
                        ?cell,
                        "unresolved conflict"
                    );
                }
                if terminal.is_external() {
                    valid_external[state].insert_kind(terminal);
                }
                let next_id = u32::try_from(cells.len()).unwrap_or(u32::MAX);
                let id = *cell_ids.entry(cell.clone()).or_insert_with(|| {
                    cells.push(cell.into_boxed_slice());
                    next_id
                });
                actions[state * SyntaxKind::TERMINAL_COUNT + terminal as usize] = id;
            }
        }

        tracing::debug!(
            states = state_count,
            cells = cells.len(),
            conflicts,
            "built LALR(1) parse table"
        );

        ParseTable {
            state_count,
            actions,
            cells,
            gotos,
            valid_external,
            conflicts,
        }
    }

    /// Adds the reductions (internal production indices) that survive
    /// precedence resolution to `cell`, dropping its shift if it loses.
    fn resolve(&self, cell: &mut Vec<Action>, shift_prec: Option<i32>, productions: Vec<usize>) {
        let best = productions
            .iter()
            .map(|production| self.prods[*production].prec)
            .max()
            .unwrap_or(0);
        let candidates = productions
            .into_iter()
            .filter(|production| self.prods[*production].prec == best);

        let has_shift = cell.iter().any(|action| matches!(action, Action::Shift(_)));
        let mut keep_shift = true;
        for production in candidates {
            let prod = &self.prods[production];
            let keep_reduce = match shift_prec {
                Some(shift) if has_shift => match prod.prec.cmp(&shift) {
                    std::cmp::Ordering::Greater => {
                        keep_shift = false;
                        true
                    }
                    std::cmp::Ordering::Less => false,
                    std::cmp::Ordering::Equal => match prod.assoc {
                        Assoc::Left => {
                            keep_shift = false;
                            true
                        }
                        Assoc::Right => false,
                        Assoc::None => true,
                    },
                },
                _ => true,
            };
            if keep_reduce {
                cell.push(Action::Reduce(production - 1));
            }
        }
        if !keep_shift {
            cell.retain(|action| !matches!(action, Action::Shift(_)));
        }
    }
}

fn nonterminal_index(kind: SyntaxKind) -> Option<usize> {
    (kind as usize).checked_sub(SyntaxKind::TERMINAL_COUNT)
}

fn state_id(index: usize) -> StateId {
    StateId::try_from(index).unwrap_or(StateId::MAX)
}
