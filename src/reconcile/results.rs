use crate::diff::DiffOp;
use serde::Serialize;

/// What it would take to bring a table in line with its model.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    /// Physical table name
    pub table: String,
    /// Whether the table currently exists
    pub exists: bool,
    /// Operations in execution order (empty when the table must be created)
    pub operations: Vec<DiffOp>,
    /// SQL statements to execute
    pub statements: Vec<String>,
}

impl PlanResult {
    /// Whether the table already matches its model.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn destructive_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_destructive()).count()
    }
}

/// Outcome of reconciling a table.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileResult {
    /// The plan that was (or would have been) executed
    pub plan: PlanResult,
    /// Number of statements executed
    pub statements_executed: usize,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl ReconcileResult {
    /// Whether the table was created by this run.
    pub fn created(&self) -> bool {
        !self.plan.exists && self.statements_executed > 0
    }
}
