use crate::diff::{DiffOp, Target};
use crate::model::{FieldDefinition, ForeignKey, SchemaModel};
use crate::util::{Result, SchemaError};

/// Renders one column definition:
/// `<name> <TYPE> [AUTO_INCREMENT] [COMMENT '<c>'] [DEFAULT <v>] [NOT NULL] [UNIQUE]`.
pub fn field_clause(name: &str, field: &FieldDefinition) -> String {
    let mut parts = vec![name.to_string(), field.data_type.dialect_name()];

    if field.auto_increment {
        parts.push("AUTO_INCREMENT".to_string());
    }

    if let Some(ref comment) = field.comment {
        parts.push(format!("COMMENT '{}'", escape_string(comment)));
    }

    // The server rejects defaults on auto-increment columns; unique columns
    // are rendered without one as well.
    if let Some(default) = field.default.as_ref().filter(|_| field.renders_default()) {
        if field.data_type.is_string() {
            parts.push(format!("DEFAULT \"{}\"", default.to_string().replace('"', "\"\"")));
        } else {
            parts.push(format!("DEFAULT {default}"));
        }
    }

    if field.not_null {
        parts.push("NOT NULL".to_string());
    }

    if field.unique {
        parts.push("UNIQUE".to_string());
    }

    parts.join(" ")
}

/// Renders a foreign key clause, columns in mapping order.
pub fn foreign_key_clause(fk: &ForeignKey) -> String {
    let mut parts = Vec::new();

    if let Some(ref constraint) = fk.constraint {
        parts.push(format!("CONSTRAINT {constraint}"));
    }

    let (locals, referenced): (Vec<&str>, Vec<&str>) = fk
        .mappings
        .iter()
        .map(|(local, referenced)| (local.as_str(), referenced.as_str()))
        .unzip();

    parts.push(format!("FOREIGN KEY ({})", locals.join(", ")));
    parts.push(format!(
        "REFERENCES {} ({})",
        fk.referenced_table(),
        referenced.join(", ")
    ));

    if let Some(on_delete) = fk.on_delete {
        parts.push(format!("ON DELETE {on_delete}"));
    }

    if let Some(on_update) = fk.on_update {
        parts.push(format!("ON UPDATE {on_update}"));
    }

    parts.join(" ")
}

pub fn create_table(model: &SchemaModel) -> String {
    let mut elements: Vec<String> = model
        .fields()
        .iter()
        .map(|(name, field)| field_clause(name, field))
        .collect();

    if !model.primary_key().is_empty() {
        elements.push(format!("PRIMARY KEY ({})", model.primary_key().join(", ")));
    }

    elements.extend(model.foreign_keys().iter().map(foreign_key_clause));

    format!("CREATE TABLE {} ({})", model.table_name(), elements.join(", "))
}

/// Renders `ALTER TABLE` statements for planned operations on `table`.
///
/// When the primary key changes, the key change and every column operation
/// share one statement: MySQL only accepts an `AUTO_INCREMENT` column that is
/// part of a key once the whole statement has been applied. Foreign key
/// operations always get statements of their own.
pub fn generate_alter_statements(table: &str, ops: &[DiffOp]) -> Result<Vec<String>> {
    let key_changes = ops.iter().any(|op| op.target() == Target::PrimaryKey);

    let mut statements = Vec::with_capacity(ops.len());
    let mut shared: Option<usize> = None;

    for op in ops {
        let clauses = alter_clauses(op)?;

        if !key_changes || op.target() == Target::ForeignKey {
            statements.extend(
                clauses
                    .into_iter()
                    .map(|clause| format!("ALTER TABLE {table} {clause}")),
            );
            continue;
        }

        match shared {
            Some(index) => {
                for clause in clauses {
                    statements[index].push_str(", ");
                    statements[index].push_str(&clause);
                }
            }
            None => {
                shared = Some(statements.len());
                statements.push(format!("ALTER TABLE {table} {}", clauses.join(", ")));
            }
        }
    }

    Ok(statements)
}

/// The clauses following `ALTER TABLE <table>`, one per statement.
fn alter_clauses(op: &DiffOp) -> Result<Vec<String>> {
    let clauses = match op {
        DiffOp::AddField { name, definition } => {
            vec![format!("ADD COLUMN {}", field_clause(name, definition))]
        }

        DiffOp::UpdateField { name, definition } => {
            vec![format!("MODIFY COLUMN {}", field_clause(name, definition))]
        }

        DiffOp::DeleteField { name } => vec![format!("DROP COLUMN {name}")],

        DiffOp::AddPrimaryKey { columns } => {
            vec![format!("ADD PRIMARY KEY ({})", columns.join(", "))]
        }

        DiffOp::UpdatePrimaryKey { columns } => vec![format!(
            "DROP PRIMARY KEY, ADD PRIMARY KEY ({})",
            columns.join(", ")
        )],

        DiffOp::DeletePrimaryKey => vec!["DROP PRIMARY KEY".to_string()],

        DiffOp::AddForeignKey { foreign_key } => {
            vec![format!("ADD {}", foreign_key_clause(foreign_key))]
        }

        DiffOp::UpdateForeignKey {
            constraint_name,
            foreign_key,
        } => {
            let existing = require_name(constraint_name.as_deref(), &foreign_key.model)?;
            let mut replacement = foreign_key.clone();
            if replacement.constraint.is_none() {
                replacement.constraint = Some(existing.to_string());
            }
            vec![
                format!("DROP FOREIGN KEY {existing}"),
                format!("ADD {}", foreign_key_clause(&replacement)),
            ]
        }

        DiffOp::DeleteForeignKey {
            model,
            constraint_name,
        } => {
            let existing = require_name(constraint_name.as_deref(), model)?;
            vec![format!("DROP FOREIGN KEY {existing}")]
        }
    };

    Ok(clauses)
}

fn require_name<'a>(name: Option<&'a str>, model: &str) -> Result<&'a str> {
    name.ok_or_else(|| SchemaError::UnnamedConstraint {
        model: model.to_string(),
    })
}

fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}
