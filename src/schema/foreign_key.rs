//! Foreign key constraints and their `ALTER TABLE` scripts.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::errors::ScriptError;
use crate::schema::{Database, SchemaError, Table};
use crate::script::{Bindings, Grammar, Node};

/// Referential actions SQL Server accepts in `ON UPDATE` / `ON DELETE`.
const CASCADE_RULES: [&str; 5] = ["NO ACTION", "RESTRICT", "CASCADE", "SET NULL", "SET DEFAULT"];

/// Rules equivalent to the engine default, so their clauses are omitted.
const DEFAULT_RULES: [&str; 3] = ["", "NO ACTION", "RESTRICT"];

/// A foreign key constraint between two tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Constraint name, unique within the database.
    pub name: String,
    /// The constrained table.
    pub table: Table,
    /// Constrained columns, in declaration order.
    pub columns: Vec<String>,
    /// The referenced table.
    pub ref_table: Table,
    /// Referenced columns, matching `columns` pairwise.
    pub ref_columns: Vec<String>,
    /// Whether existing rows are validated against the constraint.
    pub check: bool,
    /// Referential action on update, `None` for the engine default.
    pub on_update: Option<String>,
    /// Referential action on delete, `None` for the engine default.
    pub on_delete: Option<String>,
}

impl ForeignKey {
    /// A foreign key from `table` to `ref_table`, with the column lists
    /// given as comma-separated names.
    ///
    /// The key starts out unchecked with default referential actions.
    #[must_use]
    pub fn new(
        table: Table,
        name: impl Into<String>,
        columns: &str,
        ref_table: Table,
        ref_columns: &str,
    ) -> Self {
        Self {
            name: name.into(),
            table,
            columns: split_column_list(columns),
            ref_table,
            ref_columns: split_column_list(ref_columns),
            check: false,
            on_update: None,
            on_delete: None,
        }
    }

    /// The `WITH` option this key scripts with.
    #[must_use]
    pub fn check_text(&self) -> &'static str {
        if self.check { "CHECK" } else { "NOCHECK" }
    }

    /// The grammar a foreign key scripts through, in both directions.
    ///
    /// Unchecked keys carry a trailing `ALTER TABLE .. NOCHECK CONSTRAINT`
    /// statement, since `WITH NOCHECK` alone does not leave the constraint
    /// disabled for future rows.
    #[must_use]
    pub fn grammar() -> Grammar {
        let mut nodes = Node::from_text("ALTER TABLE ");
        nodes.push(Node::identifier("Table.Owner"));
        nodes.push(Node::literal("."));
        nodes.push(Node::identifier("Table.Name"));
        nodes.push(Node::whitespace(' ', 1));
        nodes.push(Node::literal("WITH"));
        nodes.push(Node::whitespace(' ', 1));
        nodes.push(Node::keyword("Check", &["CHECK", "NOCHECK"]));
        nodes.extend(Node::from_text(" ADD CONSTRAINT "));
        nodes.push(Node::identifier("Name"));
        nodes.push(Node::whitespace('\n', 1));
        nodes.push(Node::whitespace(' ', 3));
        nodes.extend(Node::from_text("FOREIGN KEY ("));
        nodes.push(Node::identifier_list("Columns", ","));
        nodes.extend(Node::from_text(") REFERENCES "));
        nodes.push(Node::identifier("RefTable.Owner"));
        nodes.push(Node::literal("."));
        nodes.push(Node::identifier("RefTable.Name"));
        nodes.extend(Node::from_text(" ("));
        nodes.push(Node::identifier_list("RefColumns", ","));
        nodes.push(Node::literal(")"));
        nodes.push(Node::whitespace('\n', 1));
        nodes.push(Node::any_order(vec![
            cascade_clause("OnUpdate", "UPDATE"),
            cascade_clause("OnDelete", "DELETE"),
        ]));
        nodes.push(unchecked_epilogue());
        Grammar::new(nodes)
    }

    /// Script the `ALTER TABLE .. ADD CONSTRAINT` statement for this key.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::InvalidValue`] when a referential action is
    /// not one SQL Server accepts.
    pub fn script_create(&self) -> Result<String, ScriptError> {
        let mut vars = Bindings::new();
        vars.set("Name", self.name.as_str())?;
        vars.set("Table.Owner", self.table.owner.as_str())?;
        vars.set("Table.Name", self.table.name.as_str())?;
        vars.set("Columns", self.columns.clone())?;
        vars.set("RefTable.Owner", self.ref_table.owner.as_str())?;
        vars.set("RefTable.Name", self.ref_table.name.as_str())?;
        vars.set("RefColumns", self.ref_columns.clone())?;
        vars.set("Check", self.check_text())?;
        vars.set("OnUpdate", self.on_update.as_deref().unwrap_or(""))?;
        vars.set("OnDelete", self.on_delete.as_deref().unwrap_or(""))?;
        Self::grammar().generate(&vars)
    }

    /// Rebuild a foreign key from its creation script and register it
    /// with `db`.
    ///
    /// Both tables are resolved through the model, and placeholders are
    /// registered for tables the model has not seen yet.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Script`] when the script does not match the
    /// grammar, and [`SchemaError::DuplicateObject`] when a key with the
    /// same name is already registered.
    pub fn from_script(script: &str, db: &mut Database) -> Result<Self, SchemaError> {
        let vars = Self::grammar().parse(script)?;
        let name = String::from(vars.require_text("Name")?);
        if db.find_foreign_key(&name).is_some() {
            return Err(SchemaError::DuplicateObject {
                kind: "foreign key",
                owner: String::from(vars.require_text("Table.Owner")?),
                name,
            });
        }
        let table = db.table_or_placeholder(
            vars.require_text("Table.Owner")?,
            vars.require_text("Table.Name")?,
        );
        let ref_table = db.table_or_placeholder(
            vars.require_text("RefTable.Owner")?,
            vars.require_text("RefTable.Name")?,
        );
        let key = Self {
            name,
            table,
            columns: vars.require_list("Columns")?.to_vec(),
            ref_table,
            ref_columns: vars.require_list("RefColumns")?.to_vec(),
            check: vars.require_text("Check")?.eq_ignore_ascii_case("CHECK"),
            on_update: bound_rule(&vars, "OnUpdate")?,
            on_delete: bound_rule(&vars, "OnDelete")?,
        };
        db.foreign_keys.push(key.clone());
        Ok(key)
    }

    /// Script the statement that drops this key.
    #[must_use]
    pub fn script_drop(&self) -> String {
        format!(
            "ALTER TABLE [{}].[{}] DROP CONSTRAINT [{}]\n",
            self.table.owner, self.table.name, self.name
        )
    }
}

fn split_column_list(columns: &str) -> Vec<String> {
    columns
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(String::from)
        .collect()
}

fn bound_rule(vars: &Bindings, name: &str) -> Result<Option<String>, ScriptError> {
    if vars.contains(name) {
        Ok(Some(String::from(vars.require_text(name)?)))
    } else {
        Ok(None)
    }
}

fn cascade_clause(variable: &str, event: &str) -> Node {
    let mut body = vec![Node::whitespace(' ', 3)];
    body.extend(Node::from_text("ON "));
    body.push(Node::literal(event));
    body.push(Node::whitespace(' ', 1));
    body.push(Node::keyword(variable, &CASCADE_RULES));
    body.push(Node::whitespace('\n', 1));
    Node::optional(variable, &DEFAULT_RULES, body)
}

fn unchecked_epilogue() -> Node {
    let mut body = vec![Node::whitespace(' ', 3)];
    body.extend(Node::from_text("ALTER TABLE "));
    body.push(Node::identifier("Table.Owner"));
    body.push(Node::literal("."));
    body.push(Node::identifier("Table.Name"));
    body.push(Node::whitespace(' ', 1));
    body.push(Node::keyword("Check", &["NOCHECK"]));
    body.extend(Node::from_text(" CONSTRAINT "));
    body.push(Node::identifier("Name"));
    body.push(Node::whitespace('\n', 1));
    Node::optional("Check", &["CHECK"], body)
}
