//! Synonyms, aliases for objects that may live several name parts away.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::errors::ScriptError;
use crate::schema::{Database, Named, SchemaError};
use crate::script::{Bindings, Grammar, Node};

/// A synonym pointing at a possibly remote base object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synonym {
    /// Schema the synonym belongs to.
    pub owner: String,
    /// Synonym name.
    pub name: String,
    /// Bracket-quoted dotted name of the object the synonym points to,
    /// such as `[sales].[orders]` or a four-part linked-server name.
    pub base_object_name: String,
}

impl Synonym {
    /// A synonym `owner.name` for `base_object_name`.
    #[must_use]
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        base_object_name: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            base_object_name: base_object_name.into(),
        }
    }

    /// The grammar of a `CREATE SYNONYM` statement.
    #[must_use]
    pub fn grammar() -> Grammar {
        let mut nodes = Node::from_text("CREATE SYNONYM ");
        nodes.push(Node::identifier("Owner"));
        nodes.push(Node::literal("."));
        nodes.push(Node::identifier("Name"));
        nodes.extend(Node::from_text(" FOR "));
        nodes.push(Node::identifier_list("BaseObjectName", "."));
        Grammar::new(nodes)
    }

    /// Script the `CREATE SYNONYM` statement for this synonym.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::GrammarMismatch`] when `base_object_name`
    /// is not a dotted identifier chain.
    pub fn script_create(&self) -> Result<String, ScriptError> {
        let mut vars = Bindings::new();
        vars.set("Owner", self.owner.as_str())?;
        vars.set("Name", self.name.as_str())?;
        // The stored base object name is itself a scripted fragment; run it
        // back through a list node to recover the individual name parts.
        let base = Grammar::new(vec![Node::identifier_list("BaseObjectName", ".")])
            .parse(&self.base_object_name)?;
        vars.merge(base)?;
        Self::grammar().generate(&vars)
    }

    /// Rebuild a synonym from its creation script and register it with
    /// `db`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Script`] when the script does not match the
    /// grammar, and [`SchemaError::DuplicateObject`] when the synonym is
    /// already registered.
    pub fn from_script(script: &str, db: &mut Database) -> Result<Self, SchemaError> {
        let vars = Self::grammar().parse(script)?;
        let owner = String::from(vars.require_text("Owner")?);
        let name = String::from(vars.require_text("Name")?);
        if db.find_synonym(&owner, &name).is_some() {
            return Err(SchemaError::DuplicateObject {
                kind: "synonym",
                owner,
                name,
            });
        }
        let synonym = Self {
            base_object_name: bracket_join(vars.require_list("BaseObjectName")?),
            owner,
            name,
        };
        db.synonyms.push(synonym.clone());
        Ok(synonym)
    }

    /// Script the statement that drops this synonym.
    #[must_use]
    pub fn script_drop(&self) -> String {
        format!("DROP SYNONYM [{}].[{}]", self.owner, self.name)
    }
}

impl Named for Synonym {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn bracket_join(parts: &[String]) -> String {
    parts
        .iter()
        .map(|part| format!("[{part}]"))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_create() {
        let synonym = Synonym::new("dbo", "syn_orders", "[sales].[orders]");
        assert_eq!(
            synonym.script_create().unwrap(),
            "CREATE SYNONYM [dbo].[syn_orders] FOR [sales].[orders]"
        );
    }

    #[test]
    fn test_round_trip_through_four_part_name() {
        let mut db = Database::new();
        let script = "CREATE SYNONYM [dbo].[remote] FOR [srv].[db].[dbo].[orders]";
        let synonym = Synonym::from_script(script, &mut db).unwrap();
        assert_eq!(synonym.base_object_name, "[srv].[db].[dbo].[orders]");
        assert_eq!(synonym.script_create().unwrap(), script);
        assert_eq!(db.find_synonym("DBO", "Remote"), Some(&synonym));
    }

    #[test]
    fn test_plain_names_are_quoted_on_rescript() {
        let mut db = Database::new();
        let synonym = Synonym::from_script("CREATE SYNONYM dbo.syn FOR sales.orders", &mut db)
            .unwrap();
        assert_eq!(synonym.base_object_name, "[sales].[orders]");
        assert_eq!(
            synonym.script_create().unwrap(),
            "CREATE SYNONYM [dbo].[syn] FOR [sales].[orders]"
        );
    }

    #[test]
    fn test_duplicate_synonyms_rejected() {
        let mut db = Database::new();
        let script = "CREATE SYNONYM [dbo].[syn] FOR [sales].[orders]";
        Synonym::from_script(script, &mut db).unwrap();
        match Synonym::from_script(script, &mut db) {
            Err(SchemaError::DuplicateObject { kind, .. }) => assert_eq!(kind, "synonym"),
            other => panic!("expected a duplicate object error, got {other:?}"),
        }
    }

    #[test]
    fn test_script_drop() {
        let synonym = Synonym::new("dbo", "syn_orders", "[sales].[orders]");
        assert_eq!(synonym.script_drop(), "DROP SYNONYM [dbo].[syn_orders]");
    }
}
