use matchc::core::automaton::EdgeLabel;

fn accepts(spec: &str, input: &str) -> bool {
    matchc::build(spec).unwrap().program.accepts(input.as_bytes())
}

fn labels(spec: &str) -> Vec<EdgeLabel> {
    let program = matchc::build(spec).unwrap().program;
    program
        .arena
        .iter()
        .flat_map(|state| state.transitions.iter())
        .filter(|tr| !tr.label.is_epsilon())
        .map(|tr| tr.label.clone())
        .collect()
}

#[test]
fn test_range_with_two_intervals() {
    for yes in ["a", "b", "c", "0", "1", "2"] {
        assert!(accepts("[a-c0-2]", yes), "{yes} should match");
    }
    for no in ["3", "d", "", "ab"] {
        assert!(!accepts("[a-c0-2]", no), "{no} should not match");
    }
}

#[test]
fn test_degenerate_range() {
    assert!(accepts("[a-a]", "a"));
    assert!(!accepts("[a-a]", "b"));
}

#[test]
fn test_empty_class_accepts_nothing() {
    assert!(!accepts("[]", ""));
    assert!(!accepts("[]", "a"));
}

#[test]
fn test_minus_only_class() {
    assert!(accepts("[-]", "-"));
    assert!(!accepts("[-]", "a"));
}

#[test]
fn test_trailing_minus_is_literal() {
    assert!(accepts("[a-]", "a"));
    assert!(accepts("[a-]", "-"));
    assert!(!accepts("[a-]", "b"));
}

#[test]
fn test_leading_minus_is_literal() {
    assert!(accepts("[-a]", "-"));
    assert!(accepts("[-a]", "a"));
}

#[test]
fn test_range_followed_by_listing() {
    for yes in ["a", "m", "z", "X", "Y", "Z"] {
        assert!(accepts("[a-zXYZ]", yes), "{yes} should match");
    }
    assert!(!accepts("[a-zXYZ]", "A"));
}

#[test]
fn test_plain_listing_emits_every_character() {
    let labels = labels("[abc]");
    assert_eq!(
        labels,
        vec![
            EdgeLabel::Lit("a".into()),
            EdgeLabel::Lit("b".into()),
            EdgeLabel::Lit("c".into()),
        ]
    );
}

#[test]
fn test_ascii_range_lists_every_code_point() {
    // The interval plus the committed high-end carry.
    let labels = labels("[a-c]");
    assert_eq!(
        labels,
        vec![
            EdgeLabel::Lit("a".into()),
            EdgeLabel::Lit("b".into()),
            EdgeLabel::Lit("c".into()),
            EdgeLabel::Lit("c".into()),
        ]
    );
}

#[test]
fn test_unicode_endpoints_range() {
    assert!(accepts("[%x30;-%x39;]", "5"));
    assert!(!accepts("[%x30;-%x39;]", "a"));
}

#[test]
fn test_single_unicode_element() {
    assert!(accepts("[%x41;]", "A"));
    assert!(!accepts("[%x41;]", "B"));
}

#[test]
fn test_unicode_listing_keeps_scalar_tag() {
    let labels = labels("[%x41;%x42;]");
    assert_eq!(labels, vec![EdgeLabel::Scalar(0x41), EdgeLabel::Scalar(0x42)]);
}

#[test]
fn test_mixed_interval_is_scalar_tagged() {
    // An interval with a unicode low end is expanded entirely with the
    // scalar tag, ascii high end notwithstanding.
    let labels = labels("[%x61;-c]");
    assert_eq!(
        labels,
        vec![
            EdgeLabel::Scalar(0x61),
            EdgeLabel::Scalar(0x62),
            EdgeLabel::Scalar(0x63),
        ]
    );
    assert!(accepts("[%x61;-c]", "b"));
}

#[test]
fn test_negated_class() {
    assert!(accepts("[^xyz]", "a"));
    assert!(!accepts("[^xyz]", "x"));
    assert!(!accepts("[^xyz]", "y"));
    assert!(!accepts("[^xyz]", "z"));
    assert!(!accepts("[^xyz]", ""));
}

#[test]
fn test_negated_range() {
    assert!(!accepts("[^a-c]", "b"));
    assert!(accepts("[^a-c]", "d"));
}

#[test]
fn test_negated_class_sink_precedes_wildcard() {
    let program = matchc::build("[^ab]").unwrap().program;
    let class_start = program
        .arena
        .iter()
        .find(|state| state.transitions.iter().any(|tr| tr.label == EdgeLabel::Wild))
        .unwrap();
    let wild_index = class_start
        .transitions
        .iter()
        .position(|tr| tr.label == EdgeLabel::Wild)
        .unwrap();
    assert_eq!(wild_index, class_start.transitions.len() - 1);
    assert!(wild_index >= 2, "sink edges come first");
}

#[test]
fn test_class_inside_repetition() {
    assert!(accepts("[0-9]+", "0123456789"));
    assert!(!accepts("[0-9]+", ""));
    assert!(!accepts("[0-9]+", "12a"));
}
