use serde::Serialize;
use std::collections::BTreeSet;

use super::{
    ll1_parsing_table::{LL1Entry, LL1ParsingTable},
    lr_dfa::{Item, LR0Automaton},
    slr_table::{Action, SLRParsingTable},
    FirstFollow, Grammar, EPSILON, EPSILON_ID,
};

const ERROR_CELL: &str = "-";

fn grid_to_plaintext(output: &[Vec<String>]) -> String {
    let columns = output.iter().map(|line| line.len()).max().unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            output
                .iter()
                .filter_map(|line| line.get(j))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        if self.rights.is_empty() {
            return format!("{:>width$} ->", self.left, width = left_width);
        }
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// One `"A -> alt1 | alt2"` string per nonterminal.
    pub fn to_lines(&self) -> Vec<String> {
        self.productions
            .iter()
            .map(|p| p.to_plaintext(0, false))
            .collect()
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|left| ProductionOutput {
                left: self.get_symbol_name(left),
                rights: self
                    .productions(left)
                    .iter()
                    .map(|p| self.production_to_vec_str(p))
                    .collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }
}

#[derive(Debug, Clone, Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// `(name, FIRST, FOLLOW)` per nonterminal, in declaration order.
    pub fn sets(&self) -> Vec<(&str, &[&str], &[&str])> {
        self.data
            .iter()
            .map(|d| (d.name, d.first.as_slice(), d.follow.as_slice()))
            .collect()
    }
}

impl Grammar {
    fn symbol_names(&self, set: Option<&BTreeSet<usize>>) -> Vec<&str> {
        set.into_iter()
            .flatten()
            .filter(|&&idx| idx != EPSILON_ID)
            .map(|&idx| self.get_symbol_name(idx))
            .collect()
    }

    /// FIRST lists ε last, after the terminals.
    pub fn to_non_terminal_output_vec(&self, sets: &FirstFollow) -> NonTerminalOutputVec {
        let data = self
            .non_terminal_iter()
            .map(|nt| {
                let nullable = sets.nullable(nt);
                let mut first = self.symbol_names(sets.first(nt));
                if nullable {
                    first.push(EPSILON);
                }
                NonTerminalOutput {
                    name: self.get_symbol_name(nt),
                    nullable,
                    first,
                    follow: self.symbol_names(sets.follow(nt)),
                }
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LL1RowOutput<'a> {
    pub non_terminal: &'a str,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LL1ParsingTableOutput<'a> {
    pub terminals: Vec<&'a str>,
    pub rows: Vec<LL1RowOutput<'a>>,
    pub conflicts: Vec<String>,
    pub is_ll1: bool,
}

impl LL1ParsingTable<'_> {
    fn entry_to_string(&self, non_terminal: usize, entry: Option<LL1Entry>) -> String {
        match entry {
            Some(e @ LL1Entry::Production(_)) => self
                .grammar()
                .production_to_string(self.production(non_terminal, e)),
            Some(LL1Entry::Epsilon(_)) => EPSILON.to_string(),
            None => ERROR_CELL.to_string(),
        }
    }

    pub fn to_output(&self) -> LL1ParsingTableOutput<'_> {
        let g = self.grammar();
        let rows = g
            .non_terminal_iter()
            .map(|nt| LL1RowOutput {
                non_terminal: g.get_symbol_name(nt),
                cells: self
                    .terminals()
                    .iter()
                    .map(|&t| self.entry_to_string(nt, self.get(nt, t)))
                    .collect(),
            })
            .collect();

        let conflicts = self
            .conflicts()
            .iter()
            .map(|c| {
                format!(
                    "({}, {}): {} / {}",
                    g.get_symbol_name(c.non_terminal),
                    g.get_symbol_name(c.terminal),
                    self.entry_to_string(c.non_terminal, Some(c.existing)),
                    self.entry_to_string(c.non_terminal, Some(c.rejected)),
                )
            })
            .collect();

        LL1ParsingTableOutput {
            terminals: self.terminals().iter().map(|&t| g.get_symbol_name(t)).collect(),
            rows,
            conflicts,
            is_ll1: self.is_ll1(),
        }
    }
}

impl LL1ParsingTableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for row in &self.rows {
            let mut line: Vec<String> = vec![row.non_terminal.to_string()];
            line.extend(row.cells.iter().cloned());
            output.push(line);
        }

        let mut text = grid_to_plaintext(&output);
        if !self.is_ll1 {
            text.push_str("\n\nnot LL(1), conflicts:\n");
            text.push_str(&self.conflicts.join("\n"));
        }
        text
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LRStateOutput {
    pub id: usize,
    pub kernel: Vec<String>,
    pub closure: Vec<String>,
    pub edges: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LR0AutomatonOutput {
    pub states: Vec<LRStateOutput>,
    pub start: usize,
}

impl LR0Automaton {
    pub fn to_output(&self) -> LR0AutomatonOutput {
        let g = self.grammar();
        let states = self
            .states()
            .iter()
            .enumerate()
            .map(|(id, state)| {
                let (kernel, closure): (Vec<&Item>, Vec<&Item>) = state
                    .iter()
                    .partition(|item| item.position > 0 || item.left == g.start_symbol());
                LRStateOutput {
                    id,
                    kernel: kernel.iter().map(|item| item.to_plaintext(g)).collect(),
                    closure: closure.iter().map(|item| item.to_plaintext(g)).collect(),
                    edges: self
                        .edges(id)
                        .iter()
                        .map(|(&symbol, &target)| (g.get_symbol_name(symbol).to_string(), target))
                        .collect(),
                }
            })
            .collect();
        LR0AutomatonOutput {
            states,
            start: self.start(),
        }
    }
}

impl LRStateOutput {
    pub fn to_plaintext(&self) -> String {
        let mut output = format!("I{}\n{}", self.id, self.kernel.join("\n"));
        if !self.closure.is_empty() {
            output.push_str("\n---\n");
            output.push_str(&self.closure.join("\n"));
        }
        if !self.edges.is_empty() {
            output.push_str("\n===\n");
            output.push_str(
                &self
                    .edges
                    .iter()
                    .map(|(symbol, target)| format!("- {} -> {}", symbol, target))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        output
    }
}

impl LR0AutomatonOutput {
    pub fn to_plaintext(&self) -> String {
        let states = self
            .states
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{}\n\nstart: {}", states, self.start)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SLRParsingTableOutput<'a> {
    pub terminals: Vec<&'a str>,
    pub non_terminals: Vec<&'a str>,
    pub action: Vec<Vec<String>>,
    pub goto: Vec<Vec<Option<usize>>>,
    pub conflicts: Vec<String>,
    pub is_slr1: bool,
}

impl<'a> SLRParsingTable<'a> {
    /// `shift(3)`, `reduce(C -> c C)` or `accept`.
    pub fn action_to_string(&self, action: Action) -> String {
        match action {
            Action::Shift(s) => format!("shift({})", s),
            Action::Reduce { .. } => match self.reduce_production(action) {
                Some(p) => format!("reduce({})", self.automaton().grammar().production_to_string(p)),
                None => ERROR_CELL.to_string(),
            },
            Action::Accept => "accept".to_string(),
        }
    }

    pub fn to_output(&self) -> SLRParsingTableOutput<'a> {
        let g = self.automaton().grammar();
        let states = 0..self.state_count();

        let action = states
            .clone()
            .map(|i| {
                self.terminals
                    .iter()
                    .map(|&t| match self.action(i, t) {
                        Some(a) => self.action_to_string(a),
                        None => ERROR_CELL.to_string(),
                    })
                    .collect()
            })
            .collect();
        let goto = states
            .map(|i| self.non_terminals.iter().map(|&nt| self.goto(i, nt)).collect())
            .collect();

        let conflicts = self
            .conflicts()
            .iter()
            .map(|c| {
                format!(
                    "{:?} in state {} on {}: {} / {}",
                    c.kind,
                    c.state,
                    g.get_symbol_name(c.terminal),
                    self.action_to_string(c.existing),
                    self.action_to_string(c.rejected),
                )
            })
            .collect();

        SLRParsingTableOutput {
            terminals: self.terminals.iter().map(|&t| g.get_symbol_name(t)).collect(),
            non_terminals: self.non_terminals.iter().map(|&nt| g.get_symbol_name(nt)).collect(),
            action,
            goto,
            conflicts,
            is_slr1: self.is_slr1(),
        }
    }
}

impl SLRParsingTableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = Vec::new();

        output.push(vec![String::new()]);
        for s in self.terminals.iter().chain(self.non_terminals.iter()) {
            output[0].push(s.to_string());
        }

        for (i, (r1, r2)) in self.action.iter().zip(self.goto.iter()).enumerate() {
            let row: Vec<String> = std::iter::once(i.to_string())
                .chain(r1.iter().cloned())
                .chain(r2.iter().map(|goto| match goto {
                    Some(goto) => goto.to_string(),
                    None => String::new(),
                }))
                .collect();
            output.push(row);
        }

        let mut text = grid_to_plaintext(&output);
        if !self.is_slr1 {
            text.push_str("\n\nnot SLR(1), conflicts:\n");
            text.push_str(&self.conflicts.join("\n"));
        }
        text
    }
}
