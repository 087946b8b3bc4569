#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("Line {line}: {reason}")]
    MalformedProduction { line: usize, reason: String },

    #[error("Line {line}: reserved symbol \"{symbol}\" cannot be used here")]
    UndefinedSymbolReference { line: usize, symbol: String },

    #[error("nonterminal \"{0}\" has no non-recursive alternative")]
    UnproductiveNonterminal(String),

    /// Left recursion through more than one nonterminal; the cycle starts and
    /// ends with the same name.
    #[error("indirect left recursion is not eliminated: {}", .0.join(" => "))]
    IndirectLeftRecursion(Vec<String>),

    #[error("grammar has no productions")]
    EmptyGrammar,

    #[error("\"{0}\" is not a nonterminal and cannot be the start symbol")]
    NoStartSymbol(String),
}

impl GrammarError {
    /// Whether the grammar can still be used after this error was reported.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::EmptyGrammar | Self::NoStartSymbol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::GrammarError;

    #[test]
    fn display() {
        let e = GrammarError::IndirectLeftRecursion(vec!["S".into(), "A".into(), "S".into()]);
        assert_eq!(
            e.to_string(),
            "indirect left recursion is not eliminated: S => A => S"
        );
        assert!(e.is_recoverable());
        assert!(!GrammarError::EmptyGrammar.is_recoverable());
    }
}
