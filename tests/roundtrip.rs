//! End-to-end round trips through the schema object grammars.
//!
//! These tests verify that:
//! 1. Generating a script and parsing it back recovers the same field values
//! 2. Re-scripting the parsed object reproduces the script byte for byte
//! 3. Formatting freedom on the way in (whitespace, comments, casing, clause
//!    order) never changes what gets bound
//!
//! The foreign key scenario doubles as the engine workout: its grammar uses
//! every node kind, from identifier lists to the any-order cascade group.

use rand::RngExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tsql_script_rs::{
    Database, DbProp, ForeignKey, Routine, RoutineKind, Synonym, Table, TriggerState,
};

// =============================================================================
// Foreign keys
// =============================================================================

fn sample_foreign_key() -> ForeignKey {
    let mut key = ForeignKey::new(
        Table::new("dbo", "main"),
        "testing123",
        "col1,col2",
        Table::new("dbo", "ref"),
        "refcol1,refcol2",
    );
    key.on_update = Some(String::from("SET NULL"));
    key.on_delete = Some(String::from("SET DEFAULT"));
    key
}

const CANONICAL_KEY_SCRIPT: &str = concat!(
    "ALTER TABLE [dbo].[main] WITH NOCHECK ADD CONSTRAINT [testing123]\n",
    "   FOREIGN KEY ([col1], [col2]) REFERENCES [dbo].[ref] ([refcol1], [refcol2])\n",
    "   ON UPDATE SET NULL\n",
    "   ON DELETE SET DEFAULT\n",
    "   ALTER TABLE [dbo].[main] NOCHECK CONSTRAINT [testing123]\n",
);

#[test]
fn test_foreign_key_generates_canonical_script() {
    assert_eq!(
        sample_foreign_key().script_create().unwrap(),
        CANONICAL_KEY_SCRIPT
    );
}

#[test]
fn test_foreign_key_round_trip() {
    let mut db = Database::new();
    db.tables.push(Table::new("dbo", "main"));
    db.tables.push(Table::new("dbo", "ref"));

    let key = ForeignKey::from_script(CANONICAL_KEY_SCRIPT, &mut db).unwrap();
    assert_eq!(key, sample_foreign_key());

    // Parsing registered the key, and re-scripting is byte-identical.
    assert_eq!(db.find_foreign_key("testing123"), Some(&key));
    assert_eq!(key.script_create().unwrap(), CANONICAL_KEY_SCRIPT);
}

#[test]
fn test_cascade_clauses_parse_in_either_order() {
    let permuted = concat!(
        "ALTER TABLE [dbo].[main] WITH NOCHECK ADD CONSTRAINT [testing123]\n",
        "   FOREIGN KEY ([col1], [col2]) REFERENCES [dbo].[ref] ([refcol1], [refcol2])\n",
        "   ON DELETE SET DEFAULT\n",
        "   ON UPDATE SET NULL\n",
        "   ALTER TABLE [dbo].[main] NOCHECK CONSTRAINT [testing123]\n",
    );
    let mut db = Database::new();
    let key = ForeignKey::from_script(permuted, &mut db).unwrap();
    assert_eq!(key, sample_foreign_key());
}

#[test]
fn test_omitted_cascade_clauses_stay_unset() {
    let script = concat!(
        "ALTER TABLE [dbo].[main] WITH CHECK ADD CONSTRAINT [fk_plain]\n",
        "   FOREIGN KEY ([col1]) REFERENCES [dbo].[ref] ([refcol1])\n",
    );
    let mut db = Database::new();
    let key = ForeignKey::from_script(script, &mut db).unwrap();
    assert_eq!(key.on_update, None);
    assert_eq!(key.on_delete, None);
    assert!(key.check);
    assert_eq!(key.script_create().unwrap(), script);
}

#[test]
fn test_hand_formatted_script_parses_identically() {
    let script = concat!(
        "alter /* lock */ table \"dbo\".\"main\"\n",
        "\twith nocheck add\n",
        "  constraint [testing123] foreign key ( col1 , [col2] )\n",
        "  references dbo.[ref] -- remote side\n",
        "  ([refcol1],[refcol2]) on delete set default on update set null\n",
        "  alter table [dbo].[main] nocheck constraint [testing123]\n",
    );
    let mut db = Database::new();
    let key = ForeignKey::from_script(script, &mut db).unwrap();
    assert_eq!(key.name, "testing123");
    assert_eq!(key.table, Table::new("dbo", "main"));
    assert_eq!(key.columns, ["col1", "col2"]);
    assert_eq!(key.ref_table, Table::new("dbo", "ref"));
    assert_eq!(key.ref_columns, ["refcol1", "refcol2"]);
    assert!(!key.check);
    assert!(key.on_update.unwrap().eq_ignore_ascii_case("SET NULL"));
    assert!(key.on_delete.unwrap().eq_ignore_ascii_case("SET DEFAULT"));
}

/// Gap fillers for the randomized formatting test. Each one is non-empty,
/// so gaps that structurally need whitespace always get some.
const FILLERS: [&str; 9] = [
    " ",
    "  ",
    "\t",
    "\n",
    "\n\t ",
    " /* x */ ",
    "/*multi\nline*/",
    " -- end of line\n",
    "\n   -- indented note\n   ",
];

#[test]
fn test_random_whitespace_and_comments_never_change_bindings() {
    let tokens = [
        "ALTER",
        "TABLE",
        "[dbo].[main]",
        "WITH",
        "NOCHECK",
        "ADD",
        "CONSTRAINT",
        "[testing123]",
        "FOREIGN",
        "KEY",
        "(",
        "[col1]",
        ",",
        "[col2]",
        ")",
        "REFERENCES",
        "[dbo].[ref]",
        "(",
        "[refcol1]",
        ",",
        "[refcol2]",
        ")",
        "ON",
        "UPDATE",
        "SET NULL",
        "ON",
        "DELETE",
        "SET DEFAULT",
        "ALTER",
        "TABLE",
        "[dbo].[main]",
        "NOCHECK",
        "CONSTRAINT",
        "[testing123]",
    ];
    let grammar = ForeignKey::grammar();
    let expected = grammar.parse(CANONICAL_KEY_SCRIPT).unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..64 {
        let mut script = String::new();
        for (position, token) in tokens.iter().enumerate() {
            if position > 0 {
                script.push_str(FILLERS[rng.random_range(0..FILLERS.len())]);
            }
            script.push_str(token);
        }
        script.push_str(FILLERS[rng.random_range(0..FILLERS.len())]);

        let bindings = grammar.parse(&script).unwrap();
        assert_eq!(bindings, expected, "script: {script:?}");
    }
}

// =============================================================================
// Routines
// =============================================================================

#[test]
fn test_routine_round_trip_with_set_option_batches() {
    let mut db = Database::new();
    db.props.push(DbProp::new("QUOTED_IDENTIFIER", "ON"));
    db.props.push(DbProp::new("ANSI_NULLS", "ON"));

    let mut view = Routine::new("dbo", "v_orders", RoutineKind::View, &db);
    view.quoted_id = false;
    view.text = String::from("CREATE VIEW [dbo].[v_orders]\nAS\nSELECT 1 AS [one]");

    let script = view.script_create(&db).unwrap();
    assert_eq!(
        script,
        concat!(
            "SET QUOTED_IDENTIFIER OFF\nGO\n",
            "CREATE VIEW [dbo].[v_orders]\nAS\nSELECT 1 AS [one]",
            "\nGO\nSET QUOTED_IDENTIFIER ON\nGO\n",
        )
    );

    let parsed = Routine::from_script(&script, &mut db).unwrap();
    assert_eq!(parsed, view);
    assert_eq!(parsed.script_create(&db).unwrap(), script);
}

#[test]
fn test_routine_shorthand_and_schema_defaults() {
    let mut db = Database::new();
    let routine = Routine::from_script("CREATE PROC sp_count AS\nSELECT 12\n", &mut db).unwrap();
    assert_eq!(routine.kind, RoutineKind::Procedure);
    assert_eq!(routine.owner, "dbo");
    assert_eq!(routine.name, "sp_count");
    assert_eq!(routine.script_drop(), "DROP PROCEDURE [dbo].[sp_count]");
}

#[test]
fn test_routine_alter_round_trip() {
    let mut db = Database::new();
    db.props.push(DbProp::new("QUOTED_IDENTIFIER", "OFF"));
    db.props.push(DbProp::new("ANSI_NULLS", "OFF"));
    let routine =
        Routine::from_script("CREATE VIEW [dbo].[v]\nAS\nSELECT 1 AS [one]\n", &mut db).unwrap();
    assert_eq!(
        routine.script_alter(&db).unwrap(),
        "ALTER VIEW [dbo].[v]\nAS\nSELECT 1 AS [one]"
    );
}

// =============================================================================
// Triggers
// =============================================================================

#[test]
fn test_trigger_round_trip_with_state_and_restore_batches() {
    let mut db = Database::new();
    db.props.push(DbProp::new("QUOTED_IDENTIFIER", "ON"));
    db.props.push(DbProp::new("ANSI_NULLS", "ON"));

    let mut trigger = Routine::new("dbo", "trg_orders", RoutineKind::Trigger, &db);
    trigger.quoted_id = false;
    trigger.text = String::from(
        "CREATE TRIGGER [dbo].[trg_orders] ON [dbo].[orders]\nAFTER INSERT\nAS\nSELECT 1",
    );
    trigger.trigger = Some(TriggerState {
        disabled: true,
        table_owner: String::from("dbo"),
        table_name: String::from("orders"),
    });

    let script = trigger.script_create(&db).unwrap();
    let parsed = Routine::trigger_from_script(&script, &mut db).unwrap();
    assert_eq!(parsed, trigger);
    assert_eq!(parsed.script_create(&db).unwrap(), script);
}

// =============================================================================
// Synonyms
// =============================================================================

#[test]
fn test_synonym_round_trip() {
    let synonym = Synonym::new("dbo", "syn_orders", "[sales].[orders]");
    let script = synonym.script_create().unwrap();
    assert_eq!(script, "CREATE SYNONYM [dbo].[syn_orders] FOR [sales].[orders]");

    let mut db = Database::new();
    let parsed = Synonym::from_script(&script, &mut db).unwrap();
    assert_eq!(parsed, synonym);
    assert_eq!(parsed.script_create().unwrap(), script);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_one_grammar_parses_from_several_threads() {
    let grammar = ForeignKey::grammar();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let vars = grammar.parse(CANONICAL_KEY_SCRIPT).unwrap();
                    assert_eq!(vars.require_text("Name").unwrap(), "testing123");
                }
            });
        }
    });
}
