use crate::Grammar;

use super::{GrammarError, END_MARK, EPSILON_ALIASES};

/// A parsed grammar together with the lines that were skipped.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub grammar: Grammar,
    pub errors: Vec<GrammarError>,
}

fn is_reserved(symbol: &str) -> bool {
    symbol == END_MARK || EPSILON_ALIASES.contains(&symbol)
}

impl Grammar {
    pub fn parse(grammar: &str) -> Result<Parsed, GrammarError> {
        Self::parse_lines(grammar.lines())
    }

    /// Parses `LHS -> alt1 | alt2 | ...` lines. A line starting with `|`
    /// continues the previous left side.
    ///
    /// Bad lines are reported in [`Parsed::errors`] and skipped; only a
    /// grammar without any production is an error.
    pub fn parse_lines<'a, I>(lines: I) -> Result<Parsed, GrammarError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut g = Self::new();
        let mut errors: Vec<GrammarError> = Vec::new();

        let mut raw_productions: Vec<(usize, &str)> = Vec::new();

        let mut previous_left: Option<usize> = None;
        for (i, line) in lines.into_iter().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            match g.split_line(i + 1, line, previous_left) {
                Ok((left, rights)) => {
                    previous_left = Some(left);
                    raw_productions.push((left, rights));
                }
                Err(e) => {
                    tracing::warn!("skipping production: {}", e);
                    previous_left = None;
                    errors.push(e);
                }
            }
        }

        for (left, rights) in raw_productions {
            for right in rights.split('|') {
                let symbols = right
                    .split_whitespace()
                    .map(|s| {
                        if let Some(idx) = g.get_symbol_index(s) {
                            idx
                        } else {
                            g.add_terminal(s)
                        }
                    })
                    .collect();
                g.add_production(left, symbols);
            }
        }

        let start_symbol = g.non_terminal_iter().next().ok_or(GrammarError::EmptyGrammar)?;
        g.start_symbol = start_symbol;

        tracing::debug!(
            "parsed {} nonterminals, {} productions, {} errors",
            g.rules.len(),
            g.production_iter().count(),
            errors.len()
        );

        Ok(Parsed { grammar: g, errors })
    }

    /// Validates one line and declares its left side.
    fn split_line<'a>(
        &mut self,
        line_no: usize,
        line: &'a str,
        previous_left: Option<usize>,
    ) -> Result<(usize, &'a str), GrammarError> {
        let malformed = |reason: &str| GrammarError::MalformedProduction {
            line: line_no,
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = line.split("->").collect();
        if parts.len() > 2 {
            return Err(malformed("too many \"->\""));
        }

        let (left_str, rights) = if parts.len() == 2 {
            let left_str = parts[0].trim();
            if left_str.is_empty() {
                return Err(malformed("empty left side"));
            } else if left_str.split_whitespace().count() != 1 {
                return Err(malformed("left side contains whitespace"));
            }
            (Some(left_str), parts[1].trim())
        } else if let Some(rest) = parts[0].trim().strip_prefix('|') {
            if previous_left.is_none() {
                return Err(malformed("cannot find left side"));
            }
            (None, rest.trim())
        } else {
            return Err(malformed("missing \"->\""));
        };

        if let Some(name) = left_str.filter(|l| is_reserved(l)) {
            return Err(GrammarError::UndefinedSymbolReference {
                line: line_no,
                symbol: name.to_string(),
            });
        }
        if rights.split_whitespace().any(|s| s == END_MARK) {
            return Err(GrammarError::UndefinedSymbolReference {
                line: line_no,
                symbol: END_MARK.to_string(),
            });
        }

        let left = match (left_str, previous_left) {
            (Some(name), _) => match self.get_symbol_index(name) {
                Some(idx) => idx,
                None => self.add_non_terminal(name),
            },
            (None, Some(idx)) => idx,
            (None, None) => return Err(malformed("cannot find left side")),
        };

        Ok((left, rights))
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{GrammarError, SymbolKind, EPSILON_ID};
    use crate::Grammar;

    #[test]
    fn classifies_by_left_side() {
        let g = Grammar::parse("expr -> term PLUS expr | term\nterm -> num")
            .unwrap()
            .grammar;
        let kind = |name: &str| g.symbol(g.get_symbol_index(name).unwrap()).kind;
        assert_eq!(kind("expr"), SymbolKind::NonTerminal);
        assert_eq!(kind("term"), SymbolKind::NonTerminal);
        assert_eq!(kind("PLUS"), SymbolKind::Terminal);
        assert_eq!(kind("num"), SymbolKind::Terminal);
    }

    #[test]
    fn empty_alternative_is_epsilon() {
        let g = Grammar::parse("A -> a A |").unwrap().grammar;
        let a = g.get_symbol_index("A").unwrap();
        assert_eq!(g.productions(a)[1].right, vec![EPSILON_ID]);
    }

    #[test]
    fn bad_lines_are_skipped() {
        let parsed = Grammar::parse("S -> a B\nB b\nB -> b\nC -> $").unwrap();
        assert_eq!(
            parsed.errors,
            vec![
                GrammarError::MalformedProduction {
                    line: 2,
                    reason: "missing \"->\"".to_string()
                },
                GrammarError::UndefinedSymbolReference {
                    line: 4,
                    symbol: "$".to_string()
                },
            ]
        );
        let g = parsed.grammar;
        assert_eq!(g.non_terminal_iter().count(), 2);
        assert!(g.get_symbol_index("C").is_none());
    }

    #[test]
    fn epsilon_cannot_be_a_left_side() {
        let parsed = Grammar::parse("ε -> a\nS -> a").unwrap();
        assert!(matches!(
            parsed.errors[0],
            GrammarError::UndefinedSymbolReference { line: 1, .. }
        ));
    }

    #[test]
    fn continuation_after_bad_line_is_rejected() {
        let parsed = Grammar::parse("S -> a\nX Y -> b\n| c").unwrap();
        assert_eq!(parsed.errors.len(), 2);
        let g = parsed.grammar;
        assert_eq!(g.productions(g.start_symbol()).len(), 1);
    }

    #[test]
    fn no_productions_is_fatal() {
        assert_eq!(
            Grammar::parse("  \n  ").unwrap_err(),
            GrammarError::EmptyGrammar
        );
        assert_eq!(
            Grammar::parse("a b c").unwrap_err(),
            GrammarError::EmptyGrammar
        );
    }

    #[test]
    fn start_symbol_override() {
        let g = Grammar::parse("S -> A\nA -> a").unwrap().grammar;
        let a = g.with_start_symbol("A").unwrap();
        assert_eq!(a.get_symbol_name(a.start_symbol()), "A");
        assert_eq!(
            g.with_start_symbol("a").unwrap_err(),
            GrammarError::NoStartSymbol("a".to_string())
        );
    }
}
