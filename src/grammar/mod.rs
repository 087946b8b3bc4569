pub mod eliminate_left_recursion;
pub mod error;
pub mod first_follow;
pub mod grammar;
pub mod left_factor;
pub mod ll1_parsing_table;
pub mod lr_dfa;
pub mod parse;
pub mod pretty_print;
pub mod slr_table;

pub use eliminate_left_recursion::Transformed;
pub use error::GrammarError;
pub use first_follow::FirstFollow;
pub use grammar::{Grammar, Production, Symbol, SymbolKind};
pub use ll1_parsing_table::{LL1Conflict, LL1Entry, LL1ParsingTable};
pub use lr_dfa::{Item, ItemSet, LR0Automaton};
pub use parse::Parsed;
pub use slr_table::{Action, ConflictKind, SLRParsingTable, SlrConflict};

pub const EPSILON: &str = "ε";
pub const EPSILON_ALIASES: [&str; 2] = ["ε", "ϵ"];
pub const END_MARK: &str = "$";

/// Symbol id of the epsilon marker in every grammar.
pub const EPSILON_ID: usize = 0;
/// Symbol id of the end-of-input marker in every grammar.
pub const END_MARK_ID: usize = 1;
