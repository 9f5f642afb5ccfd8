use crate::core::automaton::EdgeLabel;
use crate::core::nfa::Program;

/// Renders a compiled [`Program`] as a self-contained Rust source file.
///
/// The generated program embeds the state tables and the same
/// single-pass runtime as [`sim`](super::sim). Run with one file-path
/// argument it prints `ACCEPTS` or `REJECTS`; without an argument it
/// writes a usage line to standard error and exits with status 1.
#[must_use]
pub fn emit(program: &Program) -> String {
    let mut out = String::new();
    out.push_str("//! Matcher generated by matchc; do not edit.\n\n");
    out.push_str("use std::env;\nuse std::fs;\nuse std::process::ExitCode;\n\n");

    out.push_str(
        "#[allow(dead_code)]\n\
         #[derive(Clone, Copy)]\n\
         enum Label {\n    Lit(&'static str),\n    Wild,\n    Scalar(u32),\n}\n\n\
         struct Edge {\n    label: Option<Label>,\n    to: u32,\n}\n\n",
    );

    let state_count = program.arena.len();
    out.push_str(&format!("static EDGES: [&[Edge]; {state_count}] = [\n"));
    for state in program.arena.iter() {
        if state.transitions.is_empty() {
            out.push_str("    &[],\n");
            continue;
        }
        out.push_str("    &[\n");
        for tr in &state.transitions {
            let label = match &tr.label {
                EdgeLabel::Eps => "None".to_string(),
                EdgeLabel::Wild => "Some(Label::Wild)".to_string(),
                EdgeLabel::Scalar(value) => format!("Some(Label::Scalar({value}))"),
                EdgeLabel::Lit(text) => {
                    format!("Some(Label::Lit(\"{}\"))", text.escape_default())
                }
            };
            out.push_str(&format!(
                "        Edge {{ label: {label}, to: {} }},\n",
                tr.to
            ));
        }
        out.push_str("    ],\n");
    }
    out.push_str("];\n\n");

    let flags: Vec<&str> = program
        .arena
        .iter()
        .map(|state| if state.is_accept { "true" } else { "false" })
        .collect();
    out.push_str(&format!("static ACCEPT: [bool; {state_count}] = [\n"));
    for chunk in flags.chunks(16) {
        out.push_str("    ");
        out.push_str(&chunk.join(", "));
        out.push_str(",\n");
    }
    out.push_str("];\n\n");

    out.push_str(&format!(
        "static ENTRIES: [(u32, bool); {}] = [\n",
        program.entries.len()
    ));
    for entry in &program.entries {
        out.push_str(&format!("    ({}, {}),\n", entry.start, entry.invert));
    }
    out.push_str("];\n\n");

    out.push_str(RUNTIME);
    out
}

/// The runtime half of the generated program, mirroring the in-memory
/// matcher semantics byte for byte.
const RUNTIME: &str = r#"fn closure(state: u32, out: &mut Vec<u32>) {
    if out.contains(&state) {
        return;
    }
    out.push(state);
    for edge in EDGES[state as usize] {
        if edge.label.is_none() {
            closure(edge.to, out);
        }
    }
}

fn step(frontier: &[u32], input: &[u8], pos: usize) -> Option<(u32, usize)> {
    for &state in frontier {
        for edge in EDGES[state as usize] {
            match edge.label {
                None => {}
                Some(Label::Wild) => {
                    if pos < input.len() {
                        return Some((edge.to, 1));
                    }
                }
                Some(Label::Scalar(value)) => {
                    if input[pos] == (value & 0xff) as u8 {
                        return Some((edge.to, 1));
                    }
                }
                Some(Label::Lit(text)) => {
                    let bytes = text.as_bytes();
                    if !bytes.is_empty() && input[pos..].starts_with(bytes) {
                        return Some((edge.to, bytes.len()));
                    }
                }
            }
        }
    }
    None
}

fn run(start: u32, input: &[u8]) -> bool {
    let mut frontier = Vec::new();
    closure(start, &mut frontier);
    let mut pos = 0;
    while pos < input.len() {
        match step(&frontier, input, pos) {
            Some((target, consumed)) => {
                frontier.clear();
                closure(target, &mut frontier);
                pos += consumed;
            }
            None => return false,
        }
    }
    frontier.iter().any(|&state| ACCEPT[state as usize])
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("Usage: matcher <input-file>");
        return ExitCode::from(1);
    };
    let input = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{path}: {err}");
            return ExitCode::from(1);
        }
    };
    let verdict = ENTRIES
        .iter()
        .all(|&(start, invert)| run(start, &input) != invert);
    println!("{}", if verdict { "ACCEPTS" } else { "REJECTS" });
    ExitCode::SUCCESS
}
"#;
