use indexmap::IndexMap;
use std::collections::{HashMap, HashSet, VecDeque};

use super::{FirstFollow, Grammar, GrammarError, Production};

/// A rewritten grammar and the conditions found while rewriting it.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub grammar: Grammar,
    pub diagnostics: Vec<GrammarError>,
}

impl Grammar {
    /// Removes immediate left recursion:
    ///
    /// ```text
    /// A -> A γ1 | A γ2 | β1 | β2
    /// ```
    ///
    /// becomes
    ///
    /// ```text
    /// A  -> β1 A' | β2 A'
    /// A' -> γ1 A' | γ2 A' | ε
    /// ```
    ///
    /// Left recursion this cannot remove (through other nonterminals or a
    /// nullable prefix) is reported in the diagnostics and left in place.
    /// Immediate recursion on the nonterminals involved is still rewritten.
    #[tracing::instrument(skip_all)]
    pub fn eliminate_left_recursion(&self) -> Transformed {
        let mut diagnostics: Vec<GrammarError> = self
            .find_indirect_left_recursion()
            .into_iter()
            .map(GrammarError::IndirectLeftRecursion)
            .collect();

        let mut g = self.clone();
        let old_rules = std::mem::take(&mut g.rules);
        let mut rules: IndexMap<usize, Vec<Production>> = IndexMap::with_capacity(old_rules.len());

        for (left, productions) in old_rules {
            let mut base_productions: Vec<Production> = Vec::new();
            let mut recursive_productions: Vec<Vec<usize>> = Vec::new();
            let mut dropped_cyclic = false;
            for production in productions {
                if production.first_symbol() != Some(left) {
                    base_productions.push(production);
                } else if production.body().len() == 1 {
                    tracing::trace!("dropping cyclic {}", self.production_to_string(&production));
                    dropped_cyclic = true;
                } else {
                    recursive_productions.push(production.body()[1..].to_vec());
                }
            }

            if base_productions.is_empty() && (dropped_cyclic || !recursive_productions.is_empty()) {
                let e = GrammarError::UnproductiveNonterminal(g.get_symbol_name(left).to_string());
                tracing::warn!("{}", e);
                diagnostics.push(e);
            }

            if recursive_productions.is_empty() {
                rules.insert(left, base_productions);
                continue;
            }

            let nt_prime_name = g.get_symbol_prime_name(g.get_symbol_name(left).to_string());
            let nt_prime = g.add_non_terminal(&nt_prime_name);
            tracing::debug!("{} is left recursive, introducing {}", g.get_symbol_name(left), nt_prime_name);

            let base_productions = base_productions
                .into_iter()
                .map(|p| {
                    let mut right = p.body().to_vec();
                    right.push(nt_prime);
                    Production::new(left, right)
                })
                .collect();

            let mut prime_productions: Vec<Production> = recursive_productions
                .into_iter()
                .map(|mut right| {
                    right.push(nt_prime);
                    Production::new(nt_prime, right)
                })
                .collect();
            prime_productions.push(Production::epsilon(nt_prime));

            rules.insert(left, base_productions);
            rules.insert(nt_prime, prime_productions);
        }

        g.rules = rules;
        Transformed {
            grammar: g,
            diagnostics,
        }
    }

    /// Cycles `A => B => ... => A` of leftmost derivations that immediate
    /// elimination misses: those through other nonterminals, and `A => A`
    /// hidden behind a nullable prefix. Each is reported once, in
    /// declaration order.
    pub fn find_indirect_left_recursion(&self) -> Vec<Vec<String>> {
        let sets = FirstFollow::new(self);

        // A -> B when some alternative of A can start with B
        let mut left_corners: IndexMap<usize, Vec<usize>> = IndexMap::new();
        for left in self.non_terminal_iter() {
            let corners = left_corners.entry(left).or_default();
            for production in self.productions(left) {
                for (i, &symbol) in production.body().iter().enumerate() {
                    // A -> A ... is immediate, A -> B A ... with B nullable is not
                    let hidden = i > 0 || symbol != left;
                    if self.is_non_terminal(symbol) && hidden && !corners.contains(&symbol) {
                        corners.push(symbol);
                    }
                    if !sets.nullable(symbol) {
                        break;
                    }
                }
            }
        }

        let mut reported: HashSet<usize> = HashSet::new();
        let mut cycles = Vec::new();
        for &start in left_corners.keys() {
            if reported.contains(&start) {
                continue;
            }

            let mut parent: HashMap<usize, usize> = HashMap::new();
            let mut q: VecDeque<usize> = VecDeque::new();
            q.push_back(start);
            while let Some(u) = q.pop_front() {
                if u == start && parent.contains_key(&start) {
                    break;
                }
                for &v in left_corners.get(&u).into_iter().flatten() {
                    if !parent.contains_key(&v) {
                        parent.insert(v, u);
                        q.push_back(v);
                    }
                }
            }

            if !parent.contains_key(&start) {
                continue;
            }

            let mut cycle = vec![start];
            let mut current = parent[&start];
            while current != start {
                cycle.push(current);
                current = parent[&current];
            }
            cycle.push(start);
            cycle.reverse();

            reported.extend(cycle.iter().copied());
            let cycle: Vec<String> = cycle
                .into_iter()
                .map(|idx| self.get_symbol_name(idx).to_string())
                .collect();
            tracing::warn!("indirect left recursion: {}", cycle.join(" => "));
            cycles.push(cycle);
        }

        cycles
    }
}
