//! Trigger enable state, scripted as its own batch after the definition.

use alloc::format;
use alloc::string::String;
use alloc::vec;

use crate::schema::{Database, Routine, RoutineKind, SchemaError};
use crate::script::{Grammar, Node};

/// Enable state of a trigger and the table it fires on.
///
/// `CREATE TRIGGER` cannot express a disabled trigger, so the state travels
/// as a separate `ENABLE TRIGGER` / `DISABLE TRIGGER` batch after the
/// definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerState {
    /// Whether the trigger is currently disabled.
    pub disabled: bool,
    /// Schema of the table the trigger fires on.
    pub table_owner: String,
    /// Name of the table the trigger fires on.
    pub table_name: String,
}

impl TriggerState {
    /// The grammar of the state batch.
    #[must_use]
    pub fn grammar() -> Grammar {
        let mut nodes = vec![Node::keyword("State", &["ENABLE", "DISABLE"])];
        nodes.extend(Node::from_text(" TRIGGER "));
        nodes.push(Node::identifier("Owner"));
        nodes.push(Node::literal("."));
        nodes.push(Node::identifier("Name"));
        nodes.extend(Node::from_text(" ON "));
        nodes.push(Node::identifier("Table.Owner"));
        nodes.push(Node::literal("."));
        nodes.push(Node::identifier("Table.Name"));
        nodes.push(Node::whitespace('\n', 1));
        nodes.push(Node::literal("GO"));
        nodes.push(Node::whitespace('\n', 1));
        Grammar::new(nodes)
    }
}

impl Routine {
    /// Rebuild a trigger from its creation script, picking up the
    /// `ENABLE` / `DISABLE` batch when one follows the definition, and
    /// register it with `db`.
    ///
    /// # Errors
    ///
    /// In addition to everything [`Routine::from_script`] rejects, returns
    /// [`SchemaError::NotATrigger`] when the script creates a routine of a
    /// different kind.
    pub fn trigger_from_script(script: &str, db: &mut Database) -> Result<Self, SchemaError> {
        let parsed = Self::extract(script, db)?;
        if db.find_routine(&parsed.owner, &parsed.name).is_some() {
            return Err(SchemaError::DuplicateObject {
                kind: "routine",
                owner: parsed.owner,
                name: parsed.name,
            });
        }
        if parsed.kind != RoutineKind::Trigger {
            return Err(SchemaError::NotATrigger {
                owner: parsed.owner,
                name: parsed.name,
                kind: parsed.kind,
            });
        }
        let state = match parsed.extra_batches.first() {
            Some(batch) => {
                let vars = TriggerState::grammar().parse(&format!("{batch}\nGO\n"))?;
                Some(TriggerState {
                    disabled: vars.require_text("State")?.eq_ignore_ascii_case("DISABLE"),
                    table_owner: String::from(vars.require_text("Table.Owner")?),
                    table_name: String::from(vars.require_text("Table.Name")?),
                })
            }
            None => None,
        };
        let trigger = Self {
            quoted_id: parsed.quoted_id == "ON",
            ansi_null: parsed.ansi_nulls == "ON",
            owner: parsed.owner,
            name: parsed.name,
            kind: RoutineKind::Trigger,
            text: String::from(parsed.text),
            trigger: state,
        };
        db.routines.push(trigger.clone());
        Ok(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Bindings;

    #[test]
    fn test_state_grammar_round_trip() {
        let mut vars = Bindings::new();
        vars.set("State", "DISABLE").unwrap();
        vars.set("Owner", "dbo").unwrap();
        vars.set("Name", "trg_audit").unwrap();
        vars.set("Table.Owner", "sales").unwrap();
        vars.set("Table.Name", "orders").unwrap();
        let script = TriggerState::grammar().generate(&vars).unwrap();
        assert_eq!(
            script,
            "DISABLE TRIGGER [dbo].[trg_audit] ON [sales].[orders]\nGO\n"
        );

        let parsed = TriggerState::grammar().parse(&script).unwrap();
        assert_eq!(parsed, vars);
    }

    #[test]
    fn test_trigger_round_trip() {
        let mut db = Database::new();
        let mut trigger = Routine::new("dbo", "trg_audit", RoutineKind::Trigger, &db);
        trigger.text = String::from(
            "CREATE TRIGGER [dbo].[trg_audit] ON [dbo].[orders]\nAFTER INSERT\nAS\nSELECT 1",
        );
        trigger.trigger = Some(TriggerState {
            disabled: true,
            table_owner: String::from("dbo"),
            table_name: String::from("orders"),
        });

        let script = trigger.script_create(&db).unwrap();
        assert!(script.contains("\nGO\nDISABLE TRIGGER [dbo].[trg_audit] ON [dbo].[orders]\n"));

        let parsed = Routine::trigger_from_script(&script, &mut db).unwrap();
        assert_eq!(parsed, trigger);
        assert_eq!(db.routines.len(), 1);
    }

    #[test]
    fn test_trigger_without_state_batch() {
        let mut db = Database::new();
        let script = "CREATE TRIGGER [dbo].[trg] ON [dbo].[t]\nAFTER DELETE\nAS\nSELECT 1\n";
        let parsed = Routine::trigger_from_script(script, &mut db).unwrap();
        assert_eq!(parsed.kind, RoutineKind::Trigger);
        assert_eq!(parsed.trigger, None);
    }

    #[test]
    fn test_rejects_non_trigger_scripts() {
        let mut db = Database::new();
        match Routine::trigger_from_script("CREATE VIEW [dbo].[v] AS SELECT 1\n", &mut db) {
            Err(SchemaError::NotATrigger { kind, .. }) => {
                assert_eq!(kind, RoutineKind::View);
            }
            other => panic!("expected a not-a-trigger error, got {other:?}"),
        }
        assert!(db.routines.is_empty());
    }
}
