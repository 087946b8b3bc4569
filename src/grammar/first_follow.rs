//! FIRST and FOLLOW sets of a grammar snapshot.

use indexmap::IndexMap;
use std::collections::BTreeSet;

use super::{grammar::SymbolKind, Grammar, END_MARK_ID, EPSILON_ID};

/// FIRST sets for every symbol and FOLLOW sets for every nonterminal.
///
/// Sets are ordered by symbol id, so iteration follows the order in which
/// symbols were declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstFollow {
    first: IndexMap<usize, BTreeSet<usize>>,
    follow: IndexMap<usize, BTreeSet<usize>>,
}

impl FirstFollow {
    #[tracing::instrument(skip_all)]
    pub fn new(g: &Grammar) -> Self {
        let first = calculate_first(g);
        let follow = calculate_follow(g, &first);
        Self { first, follow }
    }

    /// `FIRST(symbol)`; `{t}` for a terminal `t`.
    pub fn first(&self, symbol: usize) -> Option<&BTreeSet<usize>> {
        self.first.get(&symbol)
    }

    /// `FOLLOW(non_terminal)`, `None` for anything else.
    pub fn follow(&self, non_terminal: usize) -> Option<&BTreeSet<usize>> {
        self.follow.get(&non_terminal)
    }

    pub fn nullable(&self, symbol: usize) -> bool {
        self.first
            .get(&symbol)
            .map_or(false, |f| f.contains(&EPSILON_ID))
    }

    /// FIRST of a symbol string; contains ε iff every symbol is nullable.
    pub fn first_of_sequence(&self, symbols: &[usize]) -> BTreeSet<usize> {
        first_of_sequence(&self.first, symbols)
    }
}

fn first_of_sequence(first: &IndexMap<usize, BTreeSet<usize>>, symbols: &[usize]) -> BTreeSet<usize> {
    let mut result = BTreeSet::new();
    for symbol in symbols {
        let Some(f) = first.get(symbol) else {
            return result;
        };
        result.extend(f.iter().copied().filter(|&s| s != EPSILON_ID));
        if !f.contains(&EPSILON_ID) {
            return result;
        }
    }
    result.insert(EPSILON_ID);
    result
}

fn calculate_first(g: &Grammar) -> IndexMap<usize, BTreeSet<usize>> {
    let mut first: IndexMap<usize, BTreeSet<usize>> = IndexMap::new();
    for (idx, symbol) in g.symbols.iter().enumerate() {
        let initial = match symbol.kind {
            SymbolKind::NonTerminal => BTreeSet::new(),
            SymbolKind::Terminal | SymbolKind::Epsilon | SymbolKind::EndOfInput => {
                BTreeSet::from([idx])
            }
        };
        first.insert(idx, initial);
    }

    // every pass either grows some set or ends the loop
    let mut passes = 0;
    let mut changed = true;
    while changed {
        changed = false;
        passes += 1;
        for production in g.production_iter() {
            let added = first_of_sequence(&first, &production.right);
            let set = first.entry(production.left).or_default();
            let before = set.len();
            set.extend(added);
            changed |= set.len() != before;
        }
    }
    tracing::trace!("FIRST converged after {} passes", passes);

    first
}

fn calculate_follow(
    g: &Grammar,
    first: &IndexMap<usize, BTreeSet<usize>>,
) -> IndexMap<usize, BTreeSet<usize>> {
    let mut follow: IndexMap<usize, BTreeSet<usize>> = g
        .non_terminal_iter()
        .map(|nt| (nt, BTreeSet::new()))
        .collect();
    follow
        .entry(g.start_symbol())
        .or_default()
        .insert(END_MARK_ID);

    let mut passes = 0;
    let mut changed = true;
    while changed {
        changed = false;
        passes += 1;
        for production in g.production_iter() {
            let body = production.body();
            for (i, &symbol) in body.iter().enumerate() {
                if !g.is_non_terminal(symbol) {
                    continue;
                }

                let mut trailer = first_of_sequence(first, &body[i + 1..]);
                if trailer.remove(&EPSILON_ID) {
                    if let Some(left_follow) = follow.get(&production.left) {
                        trailer.extend(left_follow.iter().copied());
                    }
                }

                let set = follow.entry(symbol).or_default();
                let before = set.len();
                set.extend(trailer);
                changed |= set.len() != before;
            }
        }
    }
    tracing::trace!("FOLLOW converged after {} passes", passes);

    follow
}
