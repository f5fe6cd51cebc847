//! Convenient re-exports for common tablekeeper usage.

// Models
pub use crate::model::{
    DefaultValue, FieldDefinition, ForeignKey, ModelSpec, ReferenceOption, SchemaModel,
};
pub use crate::mysql::DataType;

// Diffing
pub use crate::diff::planner::plan_operations;
pub use crate::diff::{compute_diff, DiffOp, SchemaDiff};

// DDL
pub use crate::mysql::sqlgen::{create_table, generate_alter_statements};

// Database access
pub use crate::mysql::MySqlConnection;
pub use crate::reconcile::{
    PlanResult, ReconcileOptions, ReconcileResult, TableCatalog, TableReconciler,
};

pub use crate::loader::load_models;

// Error types
pub use crate::util::SchemaError;
