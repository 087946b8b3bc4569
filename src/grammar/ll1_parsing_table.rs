use indexmap::IndexMap;

use crate::Grammar;

use super::{FirstFollow, Production, END_MARK_ID, EPSILON_ID};

/// A filled LL(1) cell. Empty cells are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LL1Entry {
    /// Expand the nonterminal with this alternative, predicted from FIRST.
    Production(usize),
    /// The nonterminal derives ε, predicted from FOLLOW through this
    /// nullable alternative.
    Epsilon(usize),
}

impl LL1Entry {
    pub fn alternative(&self) -> usize {
        match *self {
            LL1Entry::Production(i) | LL1Entry::Epsilon(i) => i,
        }
    }
}

/// Two alternatives of `non_terminal` predicted on the same `terminal`.
/// The table keeps `existing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LL1Conflict {
    pub non_terminal: usize,
    pub terminal: usize,
    pub existing: LL1Entry,
    pub rejected: LL1Entry,
}

#[derive(Debug)]
pub struct LL1ParsingTable<'g> {
    grammar: &'g Grammar,
    terminals: Vec<usize>,
    rows: IndexMap<usize, IndexMap<usize, LL1Entry>>,
    conflicts: Vec<LL1Conflict>,
}

impl<'g> LL1ParsingTable<'g> {
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Column order: terminals in order of appearance, then `$`.
    pub fn terminals(&self) -> &[usize] {
        &self.terminals
    }

    pub fn get(&self, non_terminal: usize, terminal: usize) -> Option<LL1Entry> {
        self.rows.get(&non_terminal)?.get(&terminal).copied()
    }

    pub fn get_by_name(&self, non_terminal: &str, terminal: &str) -> Option<LL1Entry> {
        self.get(
            self.grammar.get_symbol_index(non_terminal)?,
            self.grammar.get_symbol_index(terminal)?,
        )
    }

    pub fn production(&self, non_terminal: usize, entry: LL1Entry) -> &'g Production {
        self.grammar.production(non_terminal, entry.alternative())
    }

    pub fn conflicts(&self) -> &[LL1Conflict] {
        &self.conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }

    fn fill(&mut self, non_terminal: usize, terminal: usize, entry: LL1Entry) {
        let row = self.rows.entry(non_terminal).or_default();
        match row.get(&terminal).copied() {
            None => {
                row.insert(terminal, entry);
            }
            Some(existing) if existing.alternative() == entry.alternative() => {}
            Some(existing) => {
                tracing::debug!(
                    "LL(1) conflict at ({}, {})",
                    self.grammar.get_symbol_name(non_terminal),
                    self.grammar.get_symbol_name(terminal)
                );
                self.conflicts.push(LL1Conflict {
                    non_terminal,
                    terminal,
                    existing,
                    rejected: entry,
                });
            }
        }
    }
}

impl Grammar {
    /// Builds the predictive table from `sets`, which must have been computed
    /// for this grammar.
    #[tracing::instrument(skip_all)]
    pub fn generate_ll1_parsing_table(&self, sets: &FirstFollow) -> LL1ParsingTable<'_> {
        let mut terminals: Vec<usize> = self.terminal_iter().collect();
        terminals.push(END_MARK_ID);

        let mut table = LL1ParsingTable {
            grammar: self,
            terminals,
            rows: self
                .non_terminal_iter()
                .map(|nt| (nt, IndexMap::new()))
                .collect(),
            conflicts: Vec::new(),
        };

        for left in self.non_terminal_iter() {
            for (alternative, production) in self.productions(left).iter().enumerate() {
                let first = sets.first_of_sequence(&production.right);

                for &terminal in first.iter().filter(|&&t| t != EPSILON_ID) {
                    table.fill(left, terminal, LL1Entry::Production(alternative));
                }

                if first.contains(&EPSILON_ID) {
                    for &terminal in sets.follow(left).into_iter().flatten() {
                        table.fill(left, terminal, LL1Entry::Epsilon(alternative));
                    }
                }
            }
        }

        tracing::debug!("LL(1) table: {} conflicts", table.conflicts.len());

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_grammar_is_ll1() {
        let g = Grammar::parse(
            "E -> T E'\nE' -> + T E' | ε\nT -> F T'\nT' -> * F T' | ε\nF -> ( E ) | id",
        )
        .unwrap()
        .grammar;
        let sets = FirstFollow::new(&g);
        let table = g.generate_ll1_parsing_table(&sets);
        assert!(table.is_ll1());
        assert_eq!(table.get_by_name("E'", ")"), Some(LL1Entry::Epsilon(1)));
        assert_eq!(table.get_by_name("E'", "$"), Some(LL1Entry::Epsilon(1)));
        assert_eq!(table.get_by_name("E'", "+"), Some(LL1Entry::Production(0)));
        assert_eq!(table.get_by_name("F", "+"), None);
    }

    #[test]
    fn first_follow_clash() {
        // FIRST(a A) and FOLLOW(A) both contain `a`
        let g = Grammar::parse("S -> A a\nA -> a A |").unwrap().grammar;
        let sets = FirstFollow::new(&g);
        let table = g.generate_ll1_parsing_table(&sets);
        assert!(!table.is_ll1());
        let c = &table.conflicts()[0];
        assert_eq!(g.get_symbol_name(c.non_terminal), "A");
        assert_eq!(g.get_symbol_name(c.terminal), "a");
        assert_eq!(c.existing, LL1Entry::Production(0));
        assert_eq!(c.rejected, LL1Entry::Epsilon(1));
    }
}
