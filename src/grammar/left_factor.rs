use indexmap::IndexMap;

use super::{Grammar, Production};

/// The leading symbol shared by every alternative, tried in the order the
/// alternatives are listed.
fn common_prefix(productions: &[Production]) -> Option<usize> {
    if productions.len() < 2 {
        return None;
    }
    productions.iter().find_map(|candidate| {
        let first = candidate.first_symbol()?;
        productions
            .iter()
            .all(|p| p.first_symbol() == Some(first))
            .then_some(first)
    })
}

impl Grammar {
    /// Pulls a leading symbol shared by all alternatives of a nonterminal
    /// into its own production:
    ///
    /// ```text
    /// A -> x y | x z    =>    A -> x A'
    ///                         A' -> y | z
    /// ```
    ///
    /// The new nonterminals are factored again, so the result has no
    /// factorable nonterminal left and applying this twice changes nothing.
    #[tracing::instrument(skip_all)]
    pub fn left_factor(&self) -> Grammar {
        let mut g = self.clone();
        let old_rules = std::mem::take(&mut g.rules);
        let mut rules: IndexMap<usize, Vec<Production>> = IndexMap::with_capacity(old_rules.len());
        for (left, productions) in old_rules {
            g.factor(left, productions, &mut rules);
        }
        g.rules = rules;
        g
    }

    fn factor(
        &mut self,
        left: usize,
        productions: Vec<Production>,
        rules: &mut IndexMap<usize, Vec<Production>>,
    ) {
        let Some(prefix) = common_prefix(&productions) else {
            rules.insert(left, productions);
            return;
        };

        let nt_prime_name = self.get_symbol_prime_name(self.get_symbol_name(left).to_string());
        let nt_prime = self.add_non_terminal(&nt_prime_name);
        tracing::debug!(
            "factoring {} out of {}, introducing {}",
            self.get_symbol_name(prefix),
            self.get_symbol_name(left),
            nt_prime_name
        );

        rules.insert(left, vec![Production::new(left, vec![prefix, nt_prime])]);
        let suffixes = productions
            .iter()
            .map(|p| Production::new(nt_prime, p.body()[1..].to_vec()))
            .collect();
        self.factor(nt_prime, suffixes, rules);
    }
}
