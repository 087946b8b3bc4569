use std::collections::BTreeMap;

use super::{lr_dfa::LR0Automaton, FirstFollow, Production, END_MARK_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Shift(usize),
    /// Reduce by the `alternative`-th production of `left`.
    Reduce { left: usize, alternative: usize },
    Accept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    ShiftReduce,
    /// Two different reductions, accepting included.
    ReduceReduce,
}

/// Two actions competing for one ACTION cell. The table keeps `existing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlrConflict {
    pub state: usize,
    pub terminal: usize,
    pub kind: ConflictKind,
    pub existing: Action,
    pub rejected: Action,
}

/// SLR(1) ACTION and GOTO tables built from an [`LR0Automaton`].
///
/// Conflicting cells keep the first action (shifts are entered before
/// reductions) and the conflict is recorded; a table with conflicts is still
/// complete otherwise.
#[derive(Debug)]
pub struct SLRParsingTable<'a> {
    automaton: &'a LR0Automaton,
    pub(crate) terminals: Vec<usize>,
    pub(crate) non_terminals: Vec<usize>,
    action: Vec<BTreeMap<usize, Action>>,
    goto: Vec<BTreeMap<usize, usize>>,
    conflicts: Vec<SlrConflict>,
}

impl<'a> SLRParsingTable<'a> {
    pub fn automaton(&self) -> &'a LR0Automaton {
        self.automaton
    }

    pub fn action(&self, state: usize, terminal: usize) -> Option<Action> {
        self.action.get(state)?.get(&terminal).copied()
    }

    pub fn goto(&self, state: usize, non_terminal: usize) -> Option<usize> {
        self.goto.get(state)?.get(&non_terminal).copied()
    }

    /// `action(state, terminal)` by terminal name.
    pub fn action_by_name(&self, state: usize, terminal: &str) -> Option<Action> {
        let terminal = self.automaton.grammar().get_symbol_index(terminal)?;
        self.action(state, terminal)
    }

    pub fn state_count(&self) -> usize {
        self.action.len()
    }

    pub fn conflicts(&self) -> &[SlrConflict] {
        &self.conflicts
    }

    pub fn is_slr1(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn reduce_production(&self, action: Action) -> Option<&'a Production> {
        match action {
            Action::Reduce { left, alternative } => {
                Some(self.automaton.grammar().production(left, alternative))
            }
            _ => None,
        }
    }

    fn set_action(&mut self, state: usize, terminal: usize, action: Action) {
        let existing = match self.action[state].get(&terminal).copied() {
            None => {
                self.action[state].insert(terminal, action);
                return;
            }
            Some(existing) if existing == action => return,
            Some(existing) => existing,
        };

        let kind = if matches!(existing, Action::Shift(_)) || matches!(action, Action::Shift(_)) {
            ConflictKind::ShiftReduce
        } else {
            ConflictKind::ReduceReduce
        };
        let g = self.automaton.grammar();
        tracing::debug!(
            "{:?} conflict in state {} on {}",
            kind,
            state,
            g.get_symbol_name(terminal)
        );
        self.conflicts.push(SlrConflict {
            state,
            terminal,
            kind,
            existing,
            rejected: action,
        });
    }
}

impl LR0Automaton {
    #[tracing::instrument(skip_all)]
    pub fn to_parsing_table(&self) -> SLRParsingTable<'_> {
        let g = self.grammar();
        let sets = FirstFollow::new(g);
        let accept_item = self.accept_item();

        let mut terminals: Vec<usize> = g.terminal_iter().collect();
        terminals.push(END_MARK_ID);
        let non_terminals: Vec<usize> = g
            .non_terminal_iter()
            .filter(|&nt| nt != g.start_symbol())
            .collect();

        let mut table = SLRParsingTable {
            automaton: self,
            terminals,
            non_terminals,
            action: vec![BTreeMap::new(); self.states().len()],
            goto: vec![BTreeMap::new(); self.states().len()],
            conflicts: Vec::new(),
        };

        for (i, state) in self.states().iter().enumerate() {
            for (&symbol, &target) in self.edges(i) {
                if g.is_terminal(symbol) {
                    table.set_action(i, symbol, Action::Shift(target));
                } else {
                    table.goto[i].insert(symbol, target);
                }
            }

            for item in state.iter().filter(|item| item.is_complete(g)) {
                if *item == accept_item {
                    table.set_action(i, END_MARK_ID, Action::Accept);
                    continue;
                }
                let reduce = Action::Reduce {
                    left: item.left,
                    alternative: item.alternative,
                };
                for &terminal in sets.follow(item.left).into_iter().flatten() {
                    table.set_action(i, terminal, reduce);
                }
            }
        }

        tracing::debug!(
            "SLR table: {} states, {} conflicts",
            table.state_count(),
            table.conflicts.len()
        );

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Grammar;

    #[test]
    fn reduce_reduce_conflict() {
        let a = Grammar::parse("S -> A | B\nA -> x\nB -> x")
            .unwrap()
            .grammar
            .to_lr0_automaton()
            .unwrap();
        let t = a.to_parsing_table();
        assert!(!t.is_slr1());
        assert_eq!(t.conflicts().len(), 1);
        let c = &t.conflicts()[0];
        assert_eq!(c.kind, ConflictKind::ReduceReduce);
        assert_eq!(c.terminal, END_MARK_ID);
        assert_eq!(t.action(c.state, END_MARK_ID), Some(c.existing));
    }

    #[test]
    fn shift_reduce_conflict() {
        // dangling else
        let a = Grammar::parse("S -> i S | i S e S | x")
            .unwrap()
            .grammar
            .to_lr0_automaton()
            .unwrap();
        let t = a.to_parsing_table();
        let e = a.grammar().get_symbol_index("e").unwrap();
        let conflict = t
            .conflicts()
            .iter()
            .find(|c| c.terminal == e)
            .unwrap();
        assert_eq!(conflict.kind, ConflictKind::ShiftReduce);
        assert!(matches!(conflict.existing, Action::Shift(_)));
    }

    #[test]
    fn left_recursion_is_fine() {
        let a = Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id")
            .unwrap()
            .grammar
            .to_lr0_automaton()
            .unwrap();
        let t = a.to_parsing_table();
        assert!(t.is_slr1());
        let g = a.grammar();
        let e = g.get_symbol_index("E").unwrap();
        let after_e = t.goto(0, e).unwrap();
        assert_eq!(t.action(after_e, END_MARK_ID), Some(Action::Accept));
        assert!(matches!(t.action_by_name(after_e, "+"), Some(Action::Shift(_))));
    }
}
