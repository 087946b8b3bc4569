extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{FirstFollow, Grammar, GrammarError};

fn error_to_json(e: &dyn std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

fn parse_for_export(grammar: &str) -> Result<Grammar, String> {
    let parsed = crate::Grammar::parse(grammar).map_err(|e| error_to_json(&e))?;
    match parsed.errors.first() {
        Some(e) => Err(error_to_json(e)),
        None => Ok(parsed.grammar),
    }
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    match parse_for_export(grammar) {
        Ok(g) => {
            let sets = FirstFollow::new(&g);
            serde_json::to_string(&g.to_non_terminal_output_vec(&sets))
                .unwrap_or_else(|e| error_to_json(&e))
        }
        Err(e) => e,
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    match parse_for_export(grammar) {
        Ok(g) => {
            let sets = FirstFollow::new(&g);
            let table = g.generate_ll1_parsing_table(&sets);
            serde_json::to_string(&table.to_output()).unwrap_or_else(|e| error_to_json(&e))
        }
        Err(e) => e,
    }
}

#[wasm_bindgen]
pub fn slr_table_to_json(grammar: &str) -> String {
    match parse_for_export(grammar).and_then(|g| g.to_lr0_automaton().map_err(|e| error_to_json(&e))) {
        Ok(automaton) => serde_json::to_string(&automaton.to_parsing_table().to_output())
            .unwrap_or_else(|e| error_to_json(&e)),
        Err(e) => e,
    }
}




#[cfg(test)]
mod ll1_tests {
    use crate::grammar::LL1Entry;
    use crate::{FirstFollow, Grammar};

    #[test]
    fn scenario_d_conflict() {
        let g = Grammar::parse("A -> a | a b").unwrap().grammar;
        let sets = FirstFollow::new(&g);
        let table = g.generate_ll1_parsing_table(&sets);
        assert!(!table.is_ll1());
        assert_eq!(table.conflicts().len(), 1);
        let c = &table.conflicts()[0];
        assert_eq!(g.get_symbol_name(c.non_terminal), "A");
        assert_eq!(g.get_symbol_name(c.terminal), "a");
        // the partial table keeps the first alternative
        assert_eq!(table.get_by_name("A", "a"), Some(LL1Entry::Production(0)));

        let out = table.to_output();
        assert_eq!(out.conflicts, ["(A, a): A -> a / A -> a b"]);
    }

    #[test]
    fn factoring_resolves_conflict() {
        let g = Grammar::parse("A -> a | a b").unwrap().grammar.left_factor();
        let sets = FirstFollow::new(&g);
        let table = g.generate_ll1_parsing_table(&sets);
        assert!(table.is_ll1());
        let out = table.to_output();
        assert_eq!(out.terminals, ["a", "b", "$"]);
        assert_eq!(out.rows[0].cells, ["A -> a A'", "-", "-"]);
        assert_eq!(out.rows[1].cells, ["-", "A' -> b", "ε"]);
    }

    #[test]
    fn ll1_tables_have_single_entries() {
        let g = Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id")
            .unwrap()
            .grammar
            .eliminate_left_recursion()
            .grammar;
        let sets = FirstFollow::new(&g);
        let table = g.generate_ll1_parsing_table(&sets);
        assert!(table.is_ll1());
        let out = table.to_output();
        assert_eq!(out.terminals, ["+", "*", "(", ")", "id", "$"]);
        let row = |name: &str| out.rows.iter().find(|r| r.non_terminal == name).unwrap();
        assert_eq!(row("E").cells, ["-", "-", "E -> T E'", "-", "E -> T E'", "-"]);
        assert_eq!(row("T'").cells, ["ε", "T' -> * F T'", "-", "ε", "-", "ε"]);
    }

    #[test]
    fn left_recursion_is_not_ll1() {
        let g = Grammar::parse("E -> E + id | id").unwrap().grammar;
        let sets = FirstFollow::new(&g);
        assert!(!g.generate_ll1_parsing_table(&sets).is_ll1());
    }

    #[test]
    fn json_export() {
        let v: serde_json::Value =
            serde_json::from_str(&crate::ll1_table_to_json("A -> a | a b")).unwrap();
        assert_eq!(v["is_ll1"], false);
        assert_eq!(v["rows"][0]["non_terminal"], "A");
    }
}

#[cfg(test)]
mod lr_tests {
    use crate::grammar::{lr_dfa::Item, slr_table::Action, ItemSet, END_MARK_ID};
    use crate::Grammar;

    const SCENARIO_A: &str = "S -> C C\nC -> c C | d";

    /// Runs the table over `tokens`; only used to check constructed tables.
    fn accepts(table: &crate::grammar::SLRParsingTable, tokens: &[&str]) -> bool {
        let g = table.automaton().grammar();
        let mut stack = vec![table.automaton().start()];
        let mut input = tokens
            .iter()
            .map(|t| g.get_symbol_index(t).unwrap())
            .chain(std::iter::once(END_MARK_ID))
            .peekable();
        loop {
            let state = *stack.last().unwrap();
            let lookahead = *input.peek().unwrap();
            match table.action(state, lookahead) {
                Some(Action::Shift(next)) => {
                    stack.push(next);
                    input.next();
                }
                Some(action @ Action::Reduce { .. }) => {
                    let p = table.reduce_production(action).unwrap();
                    stack.truncate(stack.len() - p.body().len());
                    let top = *stack.last().unwrap();
                    stack.push(table.goto(top, p.left).unwrap());
                }
                Some(Action::Accept) => return true,
                None => return false,
            }
        }
    }

    #[test]
    fn scenario_a_accept() {
        let g = Grammar::parse(SCENARIO_A).unwrap().grammar;
        let automaton = g.to_lr0_automaton().unwrap();
        assert_eq!(automaton.states().len(), 7);
        let table = automaton.to_parsing_table();
        assert!(table.is_slr1());

        let after_s = automaton.walk(["S"]).unwrap();
        assert_eq!(table.action(after_s, END_MARK_ID), Some(Action::Accept));
        assert_eq!(table.action_by_name(after_s, "c"), None);

        assert!(accepts(&table, &["c", "d", "d"]));
        assert!(accepts(&table, &["d", "d"]));
        assert!(!accepts(&table, &["c", "d"]));
    }

    #[test]
    fn scenario_a_output() {
        let g = Grammar::parse(SCENARIO_A).unwrap().grammar;
        let automaton = g.to_lr0_automaton().unwrap();
        let table = automaton.to_parsing_table();
        let out = table.to_output();
        assert_eq!(out.terminals, ["c", "d", "$"]);
        assert_eq!(out.non_terminals, ["S", "C"]);

        let d_state = automaton.walk(["d"]).unwrap();
        assert_eq!(out.action[d_state], ["reduce(C -> d)"; 3]);
        assert_eq!(out.action[0][0], format!("shift({})", automaton.walk(["c"]).unwrap()));
        assert_eq!(out.goto[0][0], automaton.walk(["S"]));
    }

    #[test]
    fn automaton_output() {
        let automaton = Grammar::parse(SCENARIO_A).unwrap().grammar.to_lr0_automaton().unwrap();
        let out = automaton.to_output();
        assert_eq!(out.states.len(), 7);
        assert_eq!(out.states[0].kernel, ["S' -> . S"]);
        assert_eq!(out.states[0].closure, ["S -> . C C", "C -> . c C", "C -> . d"]);
        assert!(out.to_plaintext().starts_with("I0\nS' -> . S\n---\nS -> . C C"));

        let d_state = automaton.walk(["d"]).unwrap();
        assert_eq!(out.states[d_state].kernel, ["C -> d ."]);
        assert!(out.states[d_state].edges.is_empty());
    }

    #[test]
    fn closure_is_a_fixed_point() {
        let g = Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id")
            .unwrap()
            .grammar
            .augmented();
        for left in g.non_terminal_iter() {
            for alternative in 0..g.productions(left).len() {
                let once = g.closure([Item::new(left, alternative)]);
                let twice = g.closure(once.iter().copied());
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn goto_is_pure() {
        let g = Grammar::parse(SCENARIO_A).unwrap().grammar.augmented();
        let start: ItemSet = g.closure([Item::new(g.start_symbol(), 0)]);
        let c = g.get_symbol_index("c").unwrap();
        let d = g.get_symbol_index("d").unwrap();

        let first = g.goto(&start, c);
        let _ = g.goto(&start, d);
        let _ = g.goto(&first, c);
        assert_eq!(g.goto(&start, c), first);
        // C -> c . C is reached again from its own state
        assert_eq!(g.goto(&first, c), first);
        assert!(g.goto(&start, g.get_symbol_index("$").unwrap()).is_empty());
    }

    #[test]
    fn slr_tables_have_single_actions() {
        let g = Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id")
            .unwrap()
            .grammar;
        let automaton = g.to_lr0_automaton().unwrap();
        let table = automaton.to_parsing_table();
        assert!(table.is_slr1());
        assert!(accepts(&table, &["id", "+", "id", "*", "(", "id", ")"]));
        assert!(!accepts(&table, &["id", "+"]));
    }

    #[test]
    fn not_slr() {
        // Dragon book example 4.48
        let g = Grammar::parse("S -> L = R | R\nL -> * R | id\nR -> L").unwrap().grammar;
        let table_automaton = g.to_lr0_automaton().unwrap();
        let table = table_automaton.to_parsing_table();
        assert!(!table.is_slr1());
        let out = table.to_output();
        assert_eq!(out.conflicts.len(), 1);
        assert!(out.conflicts[0].starts_with("ShiftReduce"));
    }

    #[test]
    fn json_export() {
        let v: serde_json::Value =
            serde_json::from_str(&crate::slr_table_to_json(SCENARIO_A)).unwrap();
        assert_eq!(v["is_slr1"], true);
        assert_eq!(v["action"].as_array().unwrap().len(), 7);
    }
}
