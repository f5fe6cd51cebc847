use super::{DiffOp, SchemaDiff};

/// Orders operations for safe execution against a live table.
///
/// Foreign keys are dropped first so that the columns they cover can change,
/// and added last so that they see the final columns and primary key. Within
/// each phase the diff's own order is kept.
pub fn plan_operations(diff: &SchemaDiff) -> Vec<DiffOp> {
    let mut drop_foreign_keys = Vec::new();
    let mut add_fields = Vec::new();
    let mut update_fields = Vec::new();
    let mut primary_keys = Vec::new();
    let mut drop_fields = Vec::new();
    let mut foreign_keys = Vec::new();

    for op in diff.operations().cloned() {
        match op {
            DiffOp::DeleteForeignKey { .. } => drop_foreign_keys.push(op),
            DiffOp::AddField { .. } => add_fields.push(op),
            DiffOp::UpdateField { .. } => update_fields.push(op),
            DiffOp::AddPrimaryKey { .. }
            | DiffOp::UpdatePrimaryKey { .. }
            | DiffOp::DeletePrimaryKey => primary_keys.push(op),
            DiffOp::DeleteField { .. } => drop_fields.push(op),
            DiffOp::AddForeignKey { .. } | DiffOp::UpdateForeignKey { .. } => {
                foreign_keys.push(op)
            }
        }
    }

    let mut planned = Vec::with_capacity(diff.len());
    planned.extend(drop_foreign_keys);
    planned.extend(add_fields);
    planned.extend(update_fields);
    planned.extend(primary_keys);
    planned.extend(drop_fields);
    planned.extend(foreign_keys);
    planned
}
