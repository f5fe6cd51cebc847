//! Comparison of a desired model against the actual state of its table.
//!
//! [`compute_diff`] is pure: the same pair of models always yields the same
//! operations in the same order. Field operations follow the desired model's
//! field order, with deletions last in the actual model's order.

pub mod planner;

use crate::model::{FieldDefinition, ForeignKey, ReferenceOption, SchemaModel};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Add,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Field,
    PrimaryKey,
    ForeignKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DiffOp {
    AddField {
        name: String,
        definition: FieldDefinition,
    },
    UpdateField {
        name: String,
        definition: FieldDefinition,
    },
    DeleteField {
        name: String,
    },
    AddPrimaryKey {
        columns: Vec<String>,
    },
    UpdatePrimaryKey {
        columns: Vec<String>,
    },
    DeletePrimaryKey,
    AddForeignKey {
        foreign_key: ForeignKey,
    },
    UpdateForeignKey {
        constraint_name: Option<String>,
        foreign_key: ForeignKey,
    },
    DeleteForeignKey {
        model: String,
        constraint_name: Option<String>,
    },
}

impl DiffOp {
    pub fn action(&self) -> Action {
        match self {
            DiffOp::AddField { .. } | DiffOp::AddPrimaryKey { .. } | DiffOp::AddForeignKey { .. } => {
                Action::Add
            }
            DiffOp::UpdateField { .. }
            | DiffOp::UpdatePrimaryKey { .. }
            | DiffOp::UpdateForeignKey { .. } => Action::Update,
            DiffOp::DeleteField { .. }
            | DiffOp::DeletePrimaryKey
            | DiffOp::DeleteForeignKey { .. } => Action::Delete,
        }
    }

    pub fn target(&self) -> Target {
        match self {
            DiffOp::AddField { .. } | DiffOp::UpdateField { .. } | DiffOp::DeleteField { .. } => {
                Target::Field
            }
            DiffOp::AddPrimaryKey { .. }
            | DiffOp::UpdatePrimaryKey { .. }
            | DiffOp::DeletePrimaryKey => Target::PrimaryKey,
            DiffOp::AddForeignKey { .. }
            | DiffOp::UpdateForeignKey { .. }
            | DiffOp::DeleteForeignKey { .. } => Target::ForeignKey,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.action() == Action::Delete
    }
}

/// Operations needed to converge a table on its model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    /// Field operations.
    pub fields: Vec<DiffOp>,
    /// Primary key operations, then foreign key operations.
    pub properties: Vec<DiffOp>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.properties.len()
    }

    pub fn operations(&self) -> impl Iterator<Item = &DiffOp> {
        self.fields.iter().chain(self.properties.iter())
    }

    pub fn has_destructive(&self) -> bool {
        self.operations().any(DiffOp::is_destructive)
    }
}

pub fn compute_diff(desired: &SchemaModel, actual: &SchemaModel) -> SchemaDiff {
    let mut properties = diff_primary_keys(desired.primary_key(), actual.primary_key());
    properties.extend(diff_foreign_keys(
        desired.foreign_keys(),
        actual.foreign_keys(),
    ));

    SchemaDiff {
        fields: diff_fields(desired.fields(), actual.fields()),
        properties,
    }
}

pub fn diff_fields(
    desired: &IndexMap<String, FieldDefinition>,
    actual: &IndexMap<String, FieldDefinition>,
) -> Vec<DiffOp> {
    let mut ops = Vec::new();

    for (name, definition) in desired {
        match actual.get(name) {
            None => ops.push(DiffOp::AddField {
                name: name.clone(),
                definition: definition.clone(),
            }),
            Some(existing) if existing != definition => ops.push(DiffOp::UpdateField {
                name: name.clone(),
                definition: definition.clone(),
            }),
            Some(_) => {}
        }
    }

    for name in actual.keys() {
        if !desired.contains_key(name) {
            ops.push(DiffOp::DeleteField { name: name.clone() });
        }
    }

    ops
}

/// Compares primary keys as sets: column order does not matter.
pub fn diff_primary_keys(desired: &[String], actual: &[String]) -> Vec<DiffOp> {
    match (desired.is_empty(), actual.is_empty()) {
        (true, true) => vec![],
        (false, true) => vec![DiffOp::AddPrimaryKey {
            columns: desired.to_vec(),
        }],
        (true, false) => vec![DiffOp::DeletePrimaryKey],
        (false, false) => {
            let wanted: HashSet<&String> = desired.iter().collect();
            let existing: HashSet<&String> = actual.iter().collect();
            if desired.len() != actual.len() || wanted != existing {
                vec![DiffOp::UpdatePrimaryKey {
                    columns: desired.to_vec(),
                }]
            } else {
                vec![]
            }
        }
    }
}

/// Matches keys one-to-one by target model, in desired order.
pub fn diff_foreign_keys(desired: &[ForeignKey], actual: &[ForeignKey]) -> Vec<DiffOp> {
    let mut ops = Vec::new();
    let mut matched = vec![false; actual.len()];

    for wanted in desired {
        let found = actual
            .iter()
            .enumerate()
            .find(|(i, existing)| !matched[*i] && wanted.targets_same_model(existing));

        match found {
            None => ops.push(DiffOp::AddForeignKey {
                foreign_key: wanted.clone(),
            }),
            Some((i, existing)) => {
                matched[i] = true;
                ops.extend(diff_foreign_key_pair(wanted, existing));
            }
        }
    }

    for (existing, _) in actual.iter().zip(&matched).filter(|(_, m)| !**m) {
        ops.push(DiffOp::DeleteForeignKey {
            model: existing.model.clone(),
            constraint_name: existing.effective_name().map(str::to_string),
        });
    }

    ops
}

fn diff_foreign_key_pair(wanted: &ForeignKey, existing: &ForeignKey) -> Vec<DiffOp> {
    let existing_name = existing.effective_name();

    // A constraint can only be renamed by dropping and re-adding it.
    if let Some(declared) = wanted.constraint.as_deref() {
        if existing_name.is_some_and(|name| !name.eq_ignore_ascii_case(declared)) {
            return vec![
                DiffOp::DeleteForeignKey {
                    model: existing.model.clone(),
                    constraint_name: existing_name.map(str::to_string),
                },
                DiffOp::AddForeignKey {
                    foreign_key: wanted.clone(),
                },
            ];
        }
    }

    if wanted.mappings != existing.mappings
        || rule_changed(wanted.on_delete, existing.on_delete)
        || rule_changed(wanted.on_update, existing.on_update)
    {
        return vec![DiffOp::UpdateForeignKey {
            constraint_name: existing_name.map(str::to_string),
            foreign_key: wanted.clone(),
        }];
    }

    vec![]
}

fn rule_changed(wanted: Option<ReferenceOption>, existing: Option<ReferenceOption>) -> bool {
    wanted.is_some() && wanted != existing
}
