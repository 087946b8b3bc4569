use indexmap::IndexMap;
use std::collections::HashMap;

use super::{GrammarError, END_MARK, EPSILON, EPSILON_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
    Epsilon,
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(name: &str, kind: SymbolKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }

    pub fn is_non_terminal(&self) -> bool {
        self.kind == SymbolKind::NonTerminal
    }
}

/// A production `left -> right`.
///
/// The right-hand side of an ε-production is exactly `[EPSILON_ID]`; the
/// marker never appears next to other symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub left: usize,
    pub right: Vec<usize>,
}

impl Production {
    pub fn new(left: usize, mut right: Vec<usize>) -> Self {
        if right.len() > 1 {
            right.retain(|&s| s != EPSILON_ID);
        }
        if right.is_empty() {
            right.push(EPSILON_ID);
        }
        Self { left, right }
    }

    pub fn epsilon(left: usize) -> Self {
        Self {
            left,
            right: vec![EPSILON_ID],
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.right == [EPSILON_ID]
    }

    /// The symbols actually recognized by this production; empty for ε.
    pub fn body(&self) -> &[usize] {
        if self.is_epsilon() {
            &[]
        } else {
            &self.right
        }
    }

    pub fn first_symbol(&self) -> Option<usize> {
        self.body().first().copied()
    }
}

/// An immutable grammar snapshot.
///
/// Symbols are addressed by their index in `symbols`. Index `EPSILON_ID` is
/// always ε and `END_MARK_ID` is always `$`. Every transformation builds a new
/// `Grammar`; nothing outside this crate can mutate one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) symbol_table: HashMap<String, usize>,
    pub(crate) rules: IndexMap<usize, Vec<Production>>,
    pub(crate) start_symbol: usize,
}

impl Grammar {
    pub(crate) fn new() -> Self {
        let mut g = Self {
            symbols: Vec::new(),
            symbol_table: HashMap::new(),
            rules: IndexMap::new(),
            start_symbol: EPSILON_ID,
        };

        g.push_symbol(Symbol::new(EPSILON, SymbolKind::Epsilon));
        g.push_symbol(Symbol::new(END_MARK, SymbolKind::EndOfInput));
        for alias in super::EPSILON_ALIASES {
            g.symbol_table.insert(alias.to_string(), EPSILON_ID);
        }

        g
    }

    fn push_symbol(&mut self, symbol: Symbol) -> usize {
        let idx = self.symbols.len();
        self.symbol_table.insert(symbol.name.clone(), idx);
        self.symbols.push(symbol);
        idx
    }

    pub(crate) fn add_non_terminal(&mut self, name: &str) -> usize {
        self.push_symbol(Symbol::new(name, SymbolKind::NonTerminal))
    }

    pub(crate) fn add_terminal(&mut self, name: &str) -> usize {
        self.push_symbol(Symbol::new(name, SymbolKind::Terminal))
    }

    pub(crate) fn add_production(&mut self, left: usize, right: Vec<usize>) {
        self.rules
            .entry(left)
            .or_default()
            .push(Production::new(left, right));
    }

    pub fn start_symbol(&self) -> usize {
        self.start_symbol
    }

    /// A copy of this grammar whose start symbol is `name`.
    pub fn with_start_symbol(&self, name: &str) -> Result<Self, GrammarError> {
        match self.get_symbol_index(name) {
            Some(idx) if self.rules.contains_key(&idx) => {
                let mut g = self.clone();
                g.start_symbol = idx;
                Ok(g)
            }
            _ => Err(GrammarError::NoStartSymbol(name.to_string())),
        }
    }

    pub fn symbol(&self, index: usize) -> &Symbol {
        &self.symbols[index]
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        self.symbols[index].is_terminal()
    }

    pub fn is_non_terminal(&self, index: usize) -> bool {
        self.symbols[index].is_non_terminal()
    }

    /// Terminals in order of first appearance, `$` excluded.
    pub fn terminal_iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.symbols.len()).filter(move |&i| self.symbols[i].is_terminal())
    }

    /// Nonterminals in declaration order.
    pub fn non_terminal_iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rules.keys().copied()
    }

    pub fn productions(&self, left: usize) -> &[Production] {
        self.rules.get(&left).map(|p| p.as_slice()).unwrap_or(&[])
    }

    pub fn production(&self, left: usize, alternative: usize) -> &Production {
        &self.rules[&left][alternative]
    }

    pub fn production_iter(&self) -> impl Iterator<Item = &Production> {
        self.rules.values().flatten()
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        self.symbols[index].name.as_str()
    }

    /// `name` with enough `'` appended to be unused in this grammar.
    pub fn get_symbol_prime_name(&self, mut name: String) -> String {
        while self.symbol_table.contains_key(&name) {
            name.push('\'');
        }
        name
    }

    pub fn production_to_vec_str(&self, production: &Production) -> Vec<&str> {
        production
            .right
            .iter()
            .map(|idx| self.get_symbol_name(*idx))
            .collect()
    }

    /// `"A -> a B"`
    pub fn production_to_string(&self, production: &Production) -> String {
        format!(
            "{} -> {}",
            self.get_symbol_name(production.left),
            self.production_to_vec_str(production).join(" ")
        )
    }
}
