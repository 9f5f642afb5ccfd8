use matchc::core::automaton::EdgeLabel;
use matchc::core::nfa::{self, Program};
use matchc::core::parser::ParsedSpec;
use matchc::errors::BuildError;

fn program(input: &str) -> Program {
    let spec = ParsedSpec::build(input).unwrap();
    nfa::compile(&spec).unwrap()
}

fn lit_edge_count(program: &Program, text: &str) -> usize {
    program
        .arena
        .iter()
        .flat_map(|state| state.transitions.iter())
        .filter(|tr| matches!(&tr.label, EdgeLabel::Lit(l) if l == text))
        .count()
}

#[test]
fn test_pairing_is_mutual() {
    let program = program("(a|b)*abb & !c");
    for state in program.arena.iter() {
        if let Some(partner) = state.pair {
            assert_eq!(program.arena.partner(partner), Some(state.id));
        }
    }
}

#[test]
fn test_state_ids_dense() {
    let program = program("a(b|c)+");
    for (index, state) in program.arena.iter().enumerate() {
        assert_eq!(state.id as usize, index);
    }
}

#[test]
fn test_single_expression_registers_one_entry() {
    let program = program("a|b");
    assert_eq!(program.entries.len(), 1);
    assert!(!program.entries[0].invert);
    let start = program.entries[0].start;
    let end = program.arena.partner(start).unwrap();
    assert!(program.arena.state(end).is_accept);
    assert!(!program.arena.state(start).is_accept);
}

#[test]
fn test_conjunction_registers_both_sides() {
    let program = program("a & b");
    assert_eq!(program.entries.len(), 2);
    assert!(program.entries.iter().all(|e| !e.invert));
    for entry in &program.entries {
        let end = program.arena.partner(entry.start).unwrap();
        assert!(program.arena.state(end).is_accept);
    }
}

#[test]
fn test_negation_inverts_entry() {
    let program = program("!foo");
    assert_eq!(program.entries.len(), 1);
    assert!(program.entries[0].invert);
}

#[test]
fn test_mixed_polarity() {
    let program = program("[a-z]+ & !foo & ..");
    assert_eq!(program.entries.len(), 3);
    let flags: Vec<bool> = program.entries.iter().map(|e| e.invert).collect();
    assert_eq!(flags, vec![false, true, false]);
}

#[test]
fn test_alternation_wiring() {
    // a|b alone: leaf pair + leaf pair + alt pair + root pair.
    let program = program("a|b");
    assert_eq!(program.arena.len(), 8);
    let start = program.entries[0].start;
    // The root entry reaches the alternation fork through one epsilon.
    let fork = program.arena.state(start).transitions[0].to;
    let fork_targets: Vec<_> = program
        .arena
        .state(fork)
        .transitions
        .iter()
        .map(|tr| tr.label.clone())
        .collect();
    assert_eq!(fork_targets, vec![EdgeLabel::Eps, EdgeLabel::Eps]);
}

#[test]
fn test_unicode_scalar_edge() {
    let program = program("%x0041;");
    let scalars: Vec<u32> = program
        .arena
        .iter()
        .flat_map(|state| state.transitions.iter())
        .filter_map(|tr| match tr.label {
            EdgeLabel::Scalar(v) => Some(v),
            _ => None,
        })
        .collect();
    assert_eq!(scalars, vec![0x41]);
}

#[test]
fn test_wildcard_star_shortcut_edges() {
    // The literal is wired at the loop exit and the wildcard entry, in
    // addition to its own fragment: three "end" edges in total, and each
    // shortcut sits in front of its state's other transitions.
    let program = program(".*end");
    assert_eq!(lit_edge_count(&program, "end"), 3);
    let fronted = program
        .arena
        .iter()
        .filter(|state| {
            matches!(
                state.transitions.first(),
                Some(tr) if matches!(&tr.label, EdgeLabel::Lit(l) if l == "end")
            )
        })
        .count();
    assert_eq!(fronted, 3);
    let wild_start = program
        .arena
        .iter()
        .find(|state| state.transitions.iter().any(|tr| tr.label == EdgeLabel::Wild))
        .unwrap();
    assert!(matches!(
        &wild_start.transitions.first().unwrap().label,
        EdgeLabel::Lit(l) if l == "end"
    ));
}

#[test]
fn test_wildcard_plus_shortcut_edges() {
    let program = program(".+end");
    assert_eq!(lit_edge_count(&program, "end"), 2);
}

#[test]
fn test_shortcut_from_inner_sequence() {
    // The repetition sits inside the left subtree; the outermost
    // sequence still installs the shortcut toward the trailing literal.
    let program = program("a.*end");
    assert_eq!(lit_edge_count(&program, "end"), 3);
}

#[test]
fn test_no_shortcut_without_literal_follower() {
    let program = program(".*(a|b)");
    let shortcut_missing = program
        .arena
        .iter()
        .all(|state| !state.transitions.iter().any(|tr| {
            matches!(&tr.label, EdgeLabel::Lit(_)) && state.transitions.len() > 1
        }));
    assert!(shortcut_missing);
}

#[test]
fn test_unknown_rule_is_fatal() {
    let spec = ParsedSpec::build("${nope}").unwrap();
    assert!(matches!(
        nfa::compile(&spec),
        Err(BuildError::UnknownRule(name)) if name == "nope",
    ));
}

#[test]
fn test_bad_unicode_escape_is_fatal() {
    let spec = ParsedSpec::build("%xZZ;").unwrap();
    assert!(matches!(
        nfa::compile(&spec),
        Err(BuildError::BadUnicodeEscape(_)),
    ));
}

#[test]
fn test_capacity_limit() {
    let source = vec!["a"; nfa::MAX_AUTOMATA + 1].join(" & ");
    let spec = ParsedSpec::build(&source).unwrap();
    assert!(matches!(
        nfa::compile(&spec),
        Err(BuildError::CapacityExceeded(_)),
    ));
}

#[test]
fn test_rebuild_is_isomorphic() {
    let spec = ParsedSpec::build("(ab)+[0-9]&!x.*y").unwrap();
    let first = nfa::compile(&spec).unwrap();
    let second = nfa::compile(&spec).unwrap();
    assert_eq!(first.arena.len(), second.arena.len());
    assert_eq!(first.entries, second.entries);
    for (a, b) in first.arena.iter().zip(second.arena.iter()) {
        assert_eq!(a.transitions, b.transitions);
        assert_eq!(a.is_accept, b.is_accept);
    }
}
