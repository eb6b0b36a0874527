//! Grammar behavior that only shows once nodes are composed: variables
//! bound from more than one place, transactional optional clauses, and the
//! trailing text rules.
//!
//! These tests verify:
//! 1. Repeated variables keep the first casing and reject real disagreement
//! 2. Keyword sets pick the longest candidate that matches
//! 3. A failed optional attempt advances nothing and binds nothing
//! 4. Comments ride along anywhere whitespace does, including before the
//!    first node and after the last
//! 5. Generation errors name the variable that caused them

use tsql_script_rs::{Bindings, Grammar, Node, ScriptError, Value, ValueKind};

/// A statement that names the same constraint twice, the way unchecked
/// foreign keys repeat their name in the trailing `NOCHECK CONSTRAINT`.
fn constraint_grammar() -> Grammar {
    let mut nodes = Node::from_text("ADD CONSTRAINT ");
    nodes.push(Node::identifier("Name"));
    nodes.extend(Node::from_text("\nNOCHECK CONSTRAINT "));
    nodes.push(Node::identifier("Name"));
    Grammar::new(nodes)
}

// =============================================================================
// Shared variables
// =============================================================================

#[test]
fn test_repeated_variable_keeps_the_first_casing() {
    let vars = constraint_grammar()
        .parse("ADD CONSTRAINT [fk_orders]\nNOCHECK CONSTRAINT [FK_ORDERS]")
        .unwrap();
    assert_eq!(vars.require_text("Name").unwrap(), "fk_orders");
}

#[test]
fn test_repeated_variable_disagreement_is_a_hard_error() {
    let err = constraint_grammar()
        .parse("ADD CONSTRAINT [fk_orders]\nNOCHECK CONSTRAINT [fk_customers]")
        .unwrap_err();
    assert_eq!(
        err,
        ScriptError::BindingConflict {
            name: String::from("Name"),
            existing: Value::from("fk_orders"),
            incoming: Value::from("fk_customers"),
        }
    );
}

// =============================================================================
// Keyword sets
// =============================================================================

#[test]
fn test_keyword_prefers_the_longest_matching_candidate() {
    let mut nodes = Node::from_text("CREATE ");
    nodes.push(Node::keyword("Kind", &["PROC", "PROCEDURE"]));
    let grammar = Grammar::new(nodes);

    // Both candidates match the front of "PROCEDURE"; the longer one wins.
    let vars = grammar.parse("CREATE PROCEDURE").unwrap();
    assert_eq!(vars.require_text("Kind").unwrap(), "PROCEDURE");
    let vars = grammar.parse("CREATE PROC").unwrap();
    assert_eq!(vars.require_text("Kind").unwrap(), "PROC");
}

#[test]
fn test_keyword_mismatch_names_the_variable() {
    let mut nodes = Node::from_text("WITH ");
    nodes.push(Node::keyword("Check", &["CHECK", "NOCHECK"]));
    match Grammar::new(nodes).parse("WITH MAYBE").unwrap_err() {
        ScriptError::GrammarMismatch {
            expected,
            remaining,
        } => {
            assert!(expected.contains("Check"), "expected: {expected}");
            assert_eq!(remaining, "MAYBE");
        }
        other => panic!("expected a grammar mismatch, got {other:?}"),
    }
}

// =============================================================================
// Optional clauses
// =============================================================================

#[test]
fn test_absent_optional_clause_advances_nothing() {
    let mut body = Node::from_text(" WITH ");
    body.push(Node::keyword("Option", &["ENCRYPTION", "SCHEMABINDING"]));
    let mut nodes = Node::from_text("CREATE VIEW");
    nodes.push(Node::optional("Option", &[""], body));
    let grammar = Grammar::new(nodes);

    // The body matches " WITH " before failing on the keyword; nothing of
    // that attempt may stick.
    let (vars, rest) = grammar.parse_prefix("CREATE VIEW WITH GARBAGE").unwrap();
    assert!(!vars.contains("Option"));
    assert_eq!(rest, " WITH GARBAGE");

    let vars = grammar.parse("CREATE VIEW WITH SCHEMABINDING").unwrap();
    assert_eq!(vars.require_text("Option").unwrap(), "SCHEMABINDING");
}

// =============================================================================
// Leading and trailing input
// =============================================================================

#[test]
fn test_leading_noise_is_stripped() {
    let vars = constraint_grammar()
        .parse("-- migration 7\n  ADD CONSTRAINT [fk_a]\nNOCHECK CONSTRAINT [fk_a]")
        .unwrap();
    assert_eq!(vars.require_text("Name").unwrap(), "fk_a");
}

#[test]
fn test_trailing_comments_pass_and_trailing_text_fails() {
    let grammar = constraint_grammar();
    assert!(
        grammar
            .parse("ADD CONSTRAINT [fk_a]\nNOCHECK CONSTRAINT [fk_a] -- re-run safe\n")
            .is_ok()
    );
    assert_eq!(
        grammar.parse("ADD CONSTRAINT [fk_a]\nNOCHECK CONSTRAINT [fk_a]\nGO"),
        Err(ScriptError::TrailingText(String::from("GO")))
    );
}

// =============================================================================
// Generation errors
// =============================================================================

#[test]
fn test_generate_reports_unbound_and_miskinded_variables() {
    let grammar = constraint_grammar();
    assert_eq!(
        grammar.generate(&Bindings::new()),
        Err(ScriptError::UnknownVariable(String::from("Name")))
    );

    let mut vars = Bindings::new();
    vars.set("Name", vec![String::from("fk_a")]).unwrap();
    assert_eq!(
        grammar.generate(&vars),
        Err(ScriptError::KindMismatch {
            name: String::from("Name"),
            expected: ValueKind::Text,
        })
    );
}
