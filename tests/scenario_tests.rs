//! End-to-end verdicts for representative specifications.

fn verdict(spec: &str, input: &str) -> bool {
    matchc::build(spec).unwrap().program.accepts(input.as_bytes())
}

#[test]
fn test_alternation() {
    assert!(verdict("a|b", "a"));
    assert!(!verdict("a|b", "c"));
}

#[test]
fn test_grouped_repetition() {
    assert!(verdict("(ab)+", "ababab"));
    assert!(!verdict("(ab)+", "aba"));
}

#[test]
fn test_class_ranges() {
    assert!(verdict("[a-c0-2]", "b"));
    assert!(!verdict("[a-c0-2]", "3"));
    assert!(verdict("[a-c0-2]", "2"));
}

#[test]
fn test_negated_class() {
    assert!(verdict("[^xyz]", "a"));
    assert!(!verdict("[^xyz]", "y"));
}

#[test]
fn test_unicode_escape() {
    assert!(verdict("%x0041;", "A"));
    assert!(!verdict("%x0041;", "B"));
}

#[test]
fn test_rule_substitution() {
    let spec = "digit = [0-9]\n${digit}+";
    assert!(verdict(spec, "42"));
    assert!(!verdict(spec, "4a"));
}

#[test]
fn test_wildcard_repeat_before_literal() {
    assert!(verdict(".*end", "the end"));
    assert!(!verdict(".*end", "ending soon"));
}

#[test]
fn test_conjunction() {
    let spec = "[a-z]+ & ....";
    assert!(verdict(spec, "abcd"));
    assert!(!verdict(spec, "ab12"));
}

#[test]
fn test_negation() {
    assert!(verdict("!foo", "bar"));
    assert!(!verdict("!foo", "foo"));
}
