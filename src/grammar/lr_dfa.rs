use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::Grammar;

use super::{grammar::Production, GrammarError};

/// An LR(0) item: the alternative `alternative` of `left`, with the dot
/// before `position`-th symbol of its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub left: usize,
    pub alternative: usize,
    pub position: usize,
}

/// Items are kept sorted, so equal sets compare and hash equal however they
/// were produced.
pub type ItemSet = BTreeSet<Item>;

impl Item {
    pub fn new(left: usize, alternative: usize) -> Self {
        Self {
            left,
            alternative,
            position: 0,
        }
    }

    pub fn production<'g>(&self, g: &'g Grammar) -> &'g Production {
        g.production(self.left, self.alternative)
    }

    /// The symbol right after the dot.
    pub fn next_symbol(&self, g: &Grammar) -> Option<usize> {
        self.production(g).body().get(self.position).copied()
    }

    pub fn is_complete(&self, g: &Grammar) -> bool {
        self.position >= self.production(g).body().len()
    }

    fn generate_next(&self) -> Self {
        Self {
            position: self.position + 1,
            ..*self
        }
    }

    /// `"A -> a . B c"`
    pub fn to_plaintext(&self, g: &Grammar) -> String {
        let body = self.production(g).body();
        let mut right: Vec<&str> = body.iter().map(|&s| g.get_symbol_name(s)).collect();
        right.insert(self.position.min(body.len()), ".");
        format!("{} -> {}", g.get_symbol_name(self.left), right.join(" "))
    }
}

impl Grammar {
    /// This grammar with a fresh start symbol `S'` and the rule `S' -> S`
    /// listed first.
    pub fn augmented(&self) -> Grammar {
        let mut g = self.clone();
        let start = self.start_symbol();
        let dummy_start_name = g.get_symbol_prime_name(g.get_symbol_name(start).to_string());
        let dummy_start = g.add_non_terminal(&dummy_start_name);

        let mut rules = IndexMap::with_capacity(g.rules.len() + 1);
        rules.insert(dummy_start, vec![Production::new(dummy_start, vec![start])]);
        rules.extend(std::mem::take(&mut g.rules));
        g.rules = rules;
        g.start_symbol = dummy_start;
        g
    }

    pub fn closure<I>(&self, items: I) -> ItemSet
    where
        I: IntoIterator<Item = Item>,
    {
        let mut closure: ItemSet = items.into_iter().collect();
        let mut q: VecDeque<Item> = closure.iter().copied().collect();
        while let Some(item) = q.pop_front() {
            let Some(symbol) = item.next_symbol(self) else {
                continue;
            };
            if !self.is_non_terminal(symbol) {
                continue;
            }
            for alternative in 0..self.productions(symbol).len() {
                let new_item = Item::new(symbol, alternative);
                if closure.insert(new_item) {
                    q.push_back(new_item);
                }
            }
        }
        closure
    }

    /// The closure of every item of `items` with `symbol` after the dot,
    /// moved over it. Empty when no item can move.
    pub fn goto(&self, items: &ItemSet, symbol: usize) -> ItemSet {
        let kernel: Vec<Item> = items
            .iter()
            .filter(|item| item.next_symbol(self) == Some(symbol))
            .map(|item| item.generate_next())
            .collect();
        if kernel.is_empty() {
            return ItemSet::new();
        }
        self.closure(kernel)
    }

    /// The canonical collection of LR(0) item sets of the augmented grammar.
    ///
    /// States are numbered in breadth-first order from the closure of
    /// `S' -> . S`, trying symbols in id order, so the numbering only
    /// depends on the grammar.
    #[tracing::instrument(skip_all)]
    pub fn to_lr0_automaton(&self) -> Result<LR0Automaton, GrammarError> {
        if !self.rules.contains_key(&self.start_symbol) {
            return Err(GrammarError::NoStartSymbol(
                self.get_symbol_name(self.start_symbol).to_string(),
            ));
        }

        let g = self.augmented();
        let symbols: Vec<usize> = (0..g.symbol_count())
            .filter(|&s| g.is_terminal(s) || g.is_non_terminal(s))
            .collect();

        let start_state = g.closure([Item::new(g.start_symbol(), 0)]);
        let mut index: HashMap<ItemSet, usize> = HashMap::from([(start_state.clone(), 0)]);
        let mut states = vec![start_state];
        let mut edges: Vec<BTreeMap<usize, usize>> = vec![BTreeMap::new()];
        let mut q: VecDeque<usize> = VecDeque::from([0]);

        while let Some(u) = q.pop_front() {
            for &symbol in &symbols {
                let target = g.goto(&states[u], symbol);
                if target.is_empty() {
                    continue;
                }
                let v = match index.get(&target) {
                    Some(&v) => v,
                    None => {
                        let v = states.len();
                        tracing::trace!("I{} --{}--> I{} (new)", u, g.get_symbol_name(symbol), v);
                        index.insert(target.clone(), v);
                        states.push(target);
                        edges.push(BTreeMap::new());
                        q.push_back(v);
                        v
                    }
                };
                edges[u].insert(symbol, v);
            }
        }

        tracing::debug!("LR(0) automaton has {} states", states.len());

        Ok(LR0Automaton {
            grammar: g,
            states,
            edges,
        })
    }
}

/// The LR(0) automaton of a grammar. It owns the augmented grammar its items
/// refer to.
#[derive(Debug, Clone)]
pub struct LR0Automaton {
    grammar: Grammar,
    states: Vec<ItemSet>,
    edges: Vec<BTreeMap<usize, usize>>,
}

impl LR0Automaton {
    /// The augmented grammar.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn start(&self) -> usize {
        0
    }

    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    pub fn state(&self, id: usize) -> &ItemSet {
        &self.states[id]
    }

    /// Outgoing transitions of a state, keyed by symbol id.
    pub fn edges(&self, id: usize) -> &BTreeMap<usize, usize> {
        &self.edges[id]
    }

    pub fn transition(&self, id: usize, symbol: usize) -> Option<usize> {
        self.edges.get(id)?.get(&symbol).copied()
    }

    /// Follows transitions by symbol names from the start state.
    pub fn walk<'a, I>(&self, symbols: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        symbols.into_iter().try_fold(self.start(), |state, name| {
            let symbol = self.grammar.get_symbol_index(name)?;
            self.transition(state, symbol)
        })
    }

    /// The item `S' -> S .`
    pub fn accept_item(&self) -> Item {
        Item {
            left: self.grammar.start_symbol(),
            alternative: 0,
            position: 1,
        }
    }
}
