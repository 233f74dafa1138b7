//! Local error recovery.
//!
//! Recovery never gives up on the input. In order of preference:
//!
//! - at a synchronization token (logical line end, directive start, end of
//!   input), insert a few zero-width missing tokens if that lets the parse go
//!   on;
//! - skip the shortest run of tokens after which the parse can go on,
//!   wrapping the run in an `ERROR` node (a discarded directive takes the
//!   rest of its line with it);
//! - at end of input, move stack entries into an `ERROR` node until end of
//!   input is acceptable.

use tracing::debug;

use super::engine::{push_child, Engine, Entry};
use crate::grammar::table::{Action, StateId};
use crate::tree::subtree::Subtree;
use crate::syntax::SyntaxKind;

/// Bound on partial insertions kept per search level.
const MAX_FRONTIER: usize = 256;

/// Bound on reductions while simulating one token.
const MAX_REDUCTIONS: usize = 1024;

impl Engine<'_> {
    /// Recovers from a lookahead with no action. Returns `false` when the
    /// parse cannot continue and the stack should be wrapped up as is.
    pub(super) fn recover(&mut self) -> bool {
        let token = self.lookahead;
        let attempt = (token.start, token.symbol);
        if token.symbol.is_sync() && self.last_insertion != Some(attempt) {
            if let Some(missing) = self.find_insertion() {
                debug!(
                    at = token.start,
                    before = token.symbol.name(),
                    missing = ?missing.iter().map(|kind| kind.name()).collect::<Vec<_>>(),
                    "inserting missing tokens"
                );
                self.last_insertion = Some(attempt);
                for kind in missing {
                    self.insert_missing(kind);
                }
                return true;
            }
        }
        if token.symbol == SyntaxKind::Eof {
            return self.pop_until_end_fits();
        }
        self.skip_tokens();
        true
    }

    /// Breadth-first search, in symbol order, for the shortest run of
    /// missing tokens after which the lookahead is acceptable.
    fn find_insertion(&self) -> Option<Vec<SyntaxKind>> {
        let lookahead = self.lookahead.symbol;
        let language = self.language;
        let table = language.table();
        let mut frontier = vec![(Vec::new(), self.state_stack())];
        for _ in 0..self.config.max_missing_tokens {
            let mut next_frontier = Vec::new();
            for (missing, states) in &frontier {
                let top = states.last().copied().unwrap_or(0);
                for kind in table.expected(top).filter(|kind| can_insert(*kind)) {
                    let mut after = states.clone();
                    if !self.simulate_token(&mut after, kind) {
                        continue;
                    }
                    let mut run = missing.clone();
                    run.push(kind);
                    if self.accepts(&after, lookahead) {
                        return Some(run);
                    }
                    if next_frontier.len() < MAX_FRONTIER {
                        next_frontier.push((run, after));
                    }
                }
            }
            frontier = next_frontier;
        }
        None
    }

    /// Feeds `symbol` to a state-only stack, returning `false` on error.
    fn simulate_token(&self, states: &mut Vec<StateId>, symbol: SyntaxKind) -> bool {
        let table = self.language.table();
        for _ in 0..MAX_REDUCTIONS {
            let top = states.last().copied().unwrap_or(0);
            match table.actions(top, symbol).first() {
                Some(Action::Shift(next)) => {
                    states.push(*next);
                    return true;
                }
                Some(Action::Reduce(id)) => {
                    if !self.simulate_reduce(states, *id) {
                        return false;
                    }
                }
                Some(Action::Accept) | None => return false,
            }
        }
        false
    }

    /// Returns `true` if `symbol` would be shifted or accepted from `states`
    /// after the reductions it triggers.
    fn accepts(&self, states: &[StateId], symbol: SyntaxKind) -> bool {
        let table = self.language.table();
        let mut states = states.to_vec();
        for _ in 0..MAX_REDUCTIONS {
            let top = states.last().copied().unwrap_or(0);
            match table.actions(top, symbol).first() {
                Some(Action::Shift(_) | Action::Accept) => return true,
                Some(Action::Reduce(id)) => {
                    if !self.simulate_reduce(&mut states, *id) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        false
    }

    /// Wraps the lookahead and the tokens after it in an `ERROR` node.
    fn skip_tokens(&mut self) {
        let state = self.top_state();
        let language = self.language;
        let table = language.table();
        let follow_valid = language.valid_external(state);
        let start = self.lookahead.start;
        let mut skipped = Vec::new();
        // Inside a discarded directive, everything up to its line end goes.
        let mut in_directive = false;
        loop {
            let token = self.lookahead;
            if token.symbol == SyntaxKind::DirectiveEnd {
                in_directive = false;
            } else if token.symbol.is_sync() {
                in_directive = true;
            }
            let leaf = Subtree::leaf(
                token.symbol,
                token.padding,
                token.size,
                state,
                token.end_state,
                follow_valid,
            );
            push_child(&mut skipped, leaf, None);
            self.advance();

            let next = self.lookahead.symbol;
            if next == SyntaxKind::Eof {
                break;
            }
            if in_directive {
                continue;
            }
            if next.is_sync() || next.is_extra() || !table.actions(state, next).is_empty() {
                break;
            }
        }
        debug!(
            start,
            end = self.lookahead.start,
            tokens = skipped.len(),
            "skipped unexpected tokens"
        );
        self.stack.push(Entry {
            state,
            subtree: Subtree::error(skipped, state),
        });
    }

    /// Moves stack entries into an `ERROR` node until end of input fits.
    fn pop_until_end_fits(&mut self) -> bool {
        let mut popped = Vec::new();
        let fits = loop {
            if self.accepts(&self.state_stack(), SyntaxKind::Eof) {
                break true;
            }
            match self.stack.pop() {
                Some(entry) => popped.push(entry.subtree),
                None => break false,
            }
        };
        if popped.is_empty() {
            return false;
        }
        let state = self.top_state();
        let mut children = Vec::new();
        for subtree in popped.into_iter().rev() {
            if subtree.is_error() {
                children.extend(subtree.into_children());
            } else {
                push_child(&mut children, subtree, None);
            }
        }
        debug!(entries = children.len(), "wrapped unfinished input at end of input");
        self.stack.push(Entry {
            state,
            subtree: Subtree::error(children, state),
        });
        fits
    }
}

/// Tokens recovery may invent.
fn can_insert(kind: SyntaxKind) -> bool {
    !matches!(kind, SyntaxKind::Eof | SyntaxKind::Unknown) && !kind.is_trivia()
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::parser::{parse, Parser};

    fn messages(source: &str) -> Vec<String> {
        parse(source).errors().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_unbalanced_endif() {
        assert_eq!(messages("#endif"), vec!["unexpected '#endif' at 0..6"]);
        let tree = parse("#endif\n#define A\n");
        assert_eq!(
            tree.root_node().to_sexp(),
            "(translation_unit (ERROR) (preproc_def name: (identifier)))"
        );
    }

    #[test]
    fn test_missing_name() {
        let tree = parse("#define\n");
        assert_eq!(
            tree.root_node().to_sexp(),
            "(translation_unit (preproc_def name: (MISSING identifier)))"
        );
    }

    #[test]
    fn test_missing_endif() {
        let tree = parse("#ifdef X\nfoo\n");
        assert_eq!(
            tree.root_node().to_sexp(),
            "(translation_unit (preproc_ifdef name: (identifier) body: (block_items (c_tokens token: (identifier))) (MISSING \"#endif\") (MISSING \"\\n\")))"
        );
        assert_eq!(
            messages("#ifdef X\nfoo\n"),
            vec!["missing '#endif' at 12..12", "missing '\\n' at 12..12"]
        );
    }

    #[test]
    fn test_unexpected_token_is_skipped() {
        let tree = parse("#undef 1 X\n");
        assert_eq!(
            tree.root_node().to_sexp(),
            "(translation_unit (preproc_undef (ERROR (number_literal)) name: (identifier)))"
        );
    }

    #[test]
    fn test_unknown_bytes_become_errors() {
        let tree = parse("a ` b\n");
        assert!(tree.has_error());
        assert_eq!(tree.errors()[0].message, "unexpected '`'");
        assert_eq!(tree.root_node().end_byte(), 6);
    }

    #[test]
    fn test_no_missing_tokens_when_disabled() {
        let config = ParserConfig {
            max_missing_tokens: 0,
            ..ParserConfig::default()
        };
        let tree = Parser::with_config(config).parse("#undef\n");
        assert_eq!(
            tree.root_node().to_sexp(),
            "(translation_unit (ERROR))"
        );
    }
}
