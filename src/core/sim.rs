use tracing::trace;

use crate::core::automaton::{Arena, EdgeLabel, StateId};
use crate::core::nfa::Program;

/// Computes the epsilon-closure of a state: everything reachable through
/// epsilon edges alone, in depth-first preorder, duplicates suppressed.
/// The order is part of the matcher's semantics, since the step commits
/// to the first transition that can consume input.
#[must_use]
pub fn epsilon_closure(arena: &Arena, seed: StateId) -> Vec<StateId> {
    let mut closure = Vec::new();
    close_into(arena, seed, &mut closure);
    closure
}

fn close_into(arena: &Arena, state: StateId, out: &mut Vec<StateId>) {
    if out.contains(&state) {
        return;
    }
    out.push(state);
    for tr in &arena.state(state).transitions {
        if tr.label.is_epsilon() {
            close_into(arena, tr.to, out);
        }
    }
}

/// Runs one sub-automaton over the whole input in a single forward pass.
///
/// The frontier starts as the closure of the entry state. Each step scans
/// the frontier in order and commits to the first transition able to
/// consume at the current position; everything else is discarded. The
/// input matches when it is fully consumed and some frontier state
/// accepts.
#[must_use]
pub fn run(arena: &Arena, start: StateId, input: &[u8]) -> bool {
    let mut frontier = epsilon_closure(arena, start);
    let mut pos = 0;
    while pos < input.len() {
        match step(arena, &frontier, input, pos) {
            Some((target, consumed)) => {
                trace!(pos, consumed, target, "step");
                frontier = epsilon_closure(arena, target);
                pos += consumed;
            }
            None => return false,
        }
    }
    frontier.iter().any(|&s| arena.state(s).is_accept)
}

/// Finds the first transition out of the frontier that consumes input at
/// `pos`, returning its target and the number of bytes consumed.
fn step(arena: &Arena, frontier: &[StateId], input: &[u8], pos: usize) -> Option<(StateId, usize)> {
    for &state in frontier {
        for tr in &arena.state(state).transitions {
            match &tr.label {
                EdgeLabel::Eps => continue,
                EdgeLabel::Wild => {
                    if pos < input.len() {
                        return Some((tr.to, 1));
                    }
                }
                EdgeLabel::Scalar(value) => {
                    if input[pos] == (*value & 0xff) as u8 {
                        return Some((tr.to, 1));
                    }
                }
                EdgeLabel::Lit(text) => {
                    let bytes = text.as_bytes();
                    if !bytes.is_empty() && input[pos..].starts_with(bytes) {
                        return Some((tr.to, bytes.len()));
                    }
                }
            }
        }
    }
    None
}

/// Folds every registered sub-automaton's verdict, xored with its invert
/// flag, under logical and.
#[must_use]
pub fn accepts(program: &Program, input: &[u8]) -> bool {
    program
        .entries
        .iter()
        .all(|entry| run(&program.arena, entry.start, input) != entry.invert)
}
