//! Rebuilds a [`SchemaModel`] from the rows MySQL reports for a live table.

use crate::model::{DefaultValue, FieldDefinition, ForeignKey, ReferenceOption, SchemaModel};
use crate::mysql::types::DataType;
use crate::util::{Result, SchemaError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const PRIMARY: &str = "PRIMARY";

/// One column of a table, as listed by `information_schema.COLUMNS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub name: String,
    pub column_type: String,
    /// `YES` or `NO`.
    pub nullable: String,
    pub extra: String,
    pub default_value: Option<String>,
    /// `PRI`, `UNI`, `MUL` or empty.
    pub key_flag: String,
    pub comment: String,
}

/// One column of one key constraint, from `information_schema.KEY_COLUMN_USAGE`
/// joined with `REFERENTIAL_CONSTRAINTS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRow {
    pub column_name: String,
    pub referenced_table: Option<String>,
    pub referenced_column: Option<String>,
    pub constraint_name: String,
    pub update_rule: Option<String>,
    pub delete_rule: Option<String>,
}

/// Accumulates column and key rows for one table.
///
/// Adding the same rows again leaves the snapshot unchanged: columns are keyed
/// by name, primary key columns are deduplicated and foreign keys are keyed by
/// referenced table.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    model_name: String,
    fields: IndexMap<String, FieldDefinition>,
    primary_key: Vec<String>,
    foreign_keys: IndexMap<String, ForeignKey>,
}

impl TableSnapshot {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            fields: IndexMap::new(),
            primary_key: Vec::new(),
            foreign_keys: IndexMap::new(),
        }
    }

    pub fn add_columns(&mut self, rows: &[ColumnRow]) -> Result<&mut Self> {
        for row in rows {
            let field = column_to_field(row)?;
            self.fields.insert(row.name.clone(), field);
        }
        Ok(self)
    }

    pub fn add_keys(&mut self, rows: &[KeyRow]) -> Result<&mut Self> {
        for row in rows {
            if row.constraint_name == PRIMARY {
                if !self.primary_key.contains(&row.column_name) {
                    self.primary_key.push(row.column_name.clone());
                }
                continue;
            }

            // Anything else without a reference is a unique index or similar.
            let Some(referenced_column) = row.referenced_column.as_deref().filter(|c| !c.is_empty())
            else {
                continue;
            };

            let table = row.referenced_table.clone().unwrap_or_default();
            let fk = self
                .foreign_keys
                .entry(table.clone())
                .or_insert_with(|| ForeignKey::new(table));

            fk.mappings
                .insert(row.column_name.clone(), referenced_column.to_string());
            fk.constraint_name = Some(row.constraint_name.clone());
            fk.on_update = parse_rule("update_rule", row.update_rule.as_deref())?;
            fk.on_delete = parse_rule("delete_rule", row.delete_rule.as_deref())?;
        }
        Ok(self)
    }

    /// Validates the accumulated state into a model.
    pub fn build(&self) -> Result<SchemaModel> {
        SchemaModel::new(
            self.model_name.clone(),
            self.fields.clone(),
            self.primary_key.clone(),
            self.foreign_keys.values().cloned().collect(),
        )
    }
}

/// Builds the actual-state model of a table from its column and key rows.
pub fn introspect_table(
    model_name: &str,
    columns: &[ColumnRow],
    keys: &[KeyRow],
) -> Result<SchemaModel> {
    TableSnapshot::new(model_name)
        .add_columns(columns)?
        .add_keys(keys)?
        .build()
}

fn column_to_field(row: &ColumnRow) -> Result<FieldDefinition> {
    let data_type = DataType::from_dialect(&row.column_type)?;
    let mut field = FieldDefinition::new(data_type);

    field.not_null = row.nullable.eq_ignore_ascii_case("NO");
    field.auto_increment = row.extra.to_lowercase().contains("auto_increment");
    field.unique = row.key_flag.eq_ignore_ascii_case("UNI");
    field.default = row
        .default_value
        .as_ref()
        .filter(|d| !d.is_empty())
        .map(|d| DefaultValue::Text(d.clone()).for_type(&data_type));
    field.comment = Some(row.comment.clone()).filter(|c| !c.is_empty());

    Ok(field)
}

fn parse_rule(clause: &str, rule: Option<&str>) -> Result<Option<ReferenceOption>> {
    rule.map(|r| {
        r.parse().map_err(|_| SchemaError::InvalidReferenceOption {
            clause: clause.to_string(),
            option: r.to_string(),
        })
    })
    .transpose()
}
