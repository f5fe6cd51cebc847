//! Bringing a live table in line with its model.
//!
//! The reconciler never talks to a database directly. It goes through a
//! [`TableCatalog`], which can describe a table and execute DDL:
//!
//! ```no_run
//! use tablekeeper::prelude::*;
//!
//! # async fn run() -> tablekeeper::util::Result<()> {
//! let model = SchemaModel::from_json(r#"{
//!     "fields": { "id": { "type": "int-4", "auto_increment": true } },
//!     "properties": { "name": "UserAccount", "primary_key": ["id"] }
//! }"#)?;
//! let connection = MySqlConnection::new("mysql://root@localhost/app").await?;
//!
//! let result = TableReconciler::new(&model, &connection)
//!     .reconcile(&ReconcileOptions::new())
//!     .await?;
//! println!("executed {} statement(s)", result.statements_executed);
//! # Ok(())
//! # }
//! ```

mod options;
mod results;

pub use options::ReconcileOptions;
pub use results::{PlanResult, ReconcileResult};

use crate::diff::compute_diff;
use crate::diff::planner::plan_operations;
use crate::model::SchemaModel;
use crate::mysql::introspect::{introspect_table, ColumnRow, KeyRow};
use crate::mysql::sqlgen::{create_table, generate_alter_statements};
use crate::util::{Result, SchemaError};
use async_trait::async_trait;
use tracing::{debug, info};

/// Access to a live database, as needed by the reconciler.
#[async_trait]
pub trait TableCatalog: Send + Sync {
    /// Columns of `table`, in ordinal order. Fails with
    /// [`SchemaError::TableNotFound`] when the table does not exist.
    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnRow>>;

    /// Primary, unique and foreign key rows of `table`.
    async fn describe_keys(&self, table: &str) -> Result<Vec<KeyRow>>;

    async fn execute(&self, statement: &str) -> Result<()>;
}

pub struct TableReconciler<'a, C: TableCatalog + ?Sized> {
    model: &'a SchemaModel,
    catalog: &'a C,
}

impl<'a, C: TableCatalog + ?Sized> TableReconciler<'a, C> {
    pub fn new(model: &'a SchemaModel, catalog: &'a C) -> Self {
        Self { model, catalog }
    }

    pub fn table_name(&self) -> String {
        self.model.table_name()
    }

    pub fn create_table_statement(&self) -> String {
        create_table(self.model)
    }

    /// The current state of the table, or `None` if it does not exist.
    pub async fn introspect(&self) -> Result<Option<SchemaModel>> {
        let table = self.table_name();
        debug!(table = %table, "describing table");

        let columns = match self.catalog.describe_columns(&table).await {
            Ok(columns) => columns,
            Err(SchemaError::TableNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let keys = self.catalog.describe_keys(&table).await?;

        introspect_table(self.model.name(), &columns, &keys).map(Some)
    }

    pub async fn plan(&self) -> Result<PlanResult> {
        let table = self.table_name();

        let Some(actual) = self.introspect().await? else {
            return Ok(PlanResult {
                table,
                exists: false,
                operations: Vec::new(),
                statements: vec![self.create_table_statement()],
            });
        };

        let operations = plan_operations(&compute_diff(self.model, &actual));
        let statements = generate_alter_statements(&table, &operations)?;

        Ok(PlanResult {
            table,
            exists: true,
            operations,
            statements,
        })
    }

    /// Creates or alters the table so that it matches the model.
    pub async fn reconcile(&self, options: &ReconcileOptions) -> Result<ReconcileResult> {
        let plan = self.plan().await?;

        let destructive = plan.destructive_count();
        if destructive > 0 && !options.allow_destructive {
            return Err(SchemaError::DestructiveChange {
                table: plan.table,
                count: destructive,
            });
        }

        if options.dry_run || plan.is_empty() {
            info!(
                table = %plan.table,
                statements = plan.statements.len(),
                dry_run = options.dry_run,
                "nothing executed"
            );
            return Ok(ReconcileResult {
                plan,
                statements_executed: 0,
                dry_run: options.dry_run,
            });
        }

        for statement in &plan.statements {
            debug!(table = %plan.table, "{statement}");
            self.catalog.execute(statement).await?;
        }

        info!(
            table = %plan.table,
            created = !plan.exists,
            statements = plan.statements.len(),
            "table reconciled"
        );

        Ok(ReconcileResult {
            statements_executed: plan.statements.len(),
            plan,
            dry_run: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeCatalog {
        columns: Option<Vec<ColumnRow>>,
        keys: Vec<KeyRow>,
        executed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TableCatalog for FakeCatalog {
        async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnRow>> {
            self.columns.clone().ok_or_else(|| SchemaError::TableNotFound {
                table: table.to_string(),
            })
        }

        async fn describe_keys(&self, _table: &str) -> Result<Vec<KeyRow>> {
            Ok(self.keys.clone())
        }

        async fn execute(&self, statement: &str) -> Result<()> {
            self.executed.lock().unwrap().push(statement.to_string());
            Ok(())
        }
    }

    fn model() -> SchemaModel {
        SchemaModel::from_json(
            r#"{
                "fields": {
                    "id": { "type": "int-4", "auto_increment": true, "not_null": true },
                    "name": { "type": "varchar-20" }
                },
                "properties": { "name": "UserAccount", "primary_key": ["id"] }
            }"#,
        )
        .unwrap()
    }

    fn matching_columns() -> Vec<ColumnRow> {
        vec![
            ColumnRow {
                name: "id".into(),
                column_type: "int(11)".into(),
                nullable: "NO".into(),
                extra: "auto_increment".into(),
                key_flag: "PRI".into(),
                ..Default::default()
            },
            ColumnRow {
                name: "name".into(),
                column_type: "varchar(20)".into(),
                nullable: "YES".into(),
                ..Default::default()
            },
        ]
    }

    fn primary_key_rows() -> Vec<KeyRow> {
        vec![KeyRow {
            column_name: "id".into(),
            constraint_name: "PRIMARY".into(),
            ..Default::default()
        }]
    }

    #[tokio::test]
    async fn missing_table_is_created() {
        let model = model();
        let catalog = FakeCatalog::default();

        let result = TableReconciler::new(&model, &catalog)
            .reconcile(&ReconcileOptions::new())
            .await
            .unwrap();

        assert!(result.created());
        assert_eq!(
            *catalog.executed.lock().unwrap(),
            vec![
                "CREATE TABLE user_account (id INT AUTO_INCREMENT NOT NULL, name VARCHAR(20), PRIMARY KEY (id))"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn matching_table_needs_nothing() {
        let model = model();
        let catalog = FakeCatalog {
            columns: Some(matching_columns()),
            keys: primary_key_rows(),
            ..Default::default()
        };

        let plan = TableReconciler::new(&model, &catalog).plan().await.unwrap();
        assert!(plan.exists);
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn dry_run_executes_nothing() {
        let model = model();
        let catalog = FakeCatalog {
            columns: Some(matching_columns()[..1].to_vec()),
            keys: primary_key_rows(),
            ..Default::default()
        };

        let result = TableReconciler::new(&model, &catalog)
            .reconcile(&ReconcileOptions::new().with_dry_run(true))
            .await
            .unwrap();

        assert_eq!(result.statements_executed, 0);
        assert_eq!(
            result.plan.statements,
            vec!["ALTER TABLE user_account ADD COLUMN name VARCHAR(20)"]
        );
        assert!(catalog.executed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn destructive_changes_need_opt_in() {
        let model = model();
        let mut columns = matching_columns();
        columns.push(ColumnRow {
            name: "legacy".into(),
            column_type: "int(11)".into(),
            nullable: "YES".into(),
            ..Default::default()
        });
        let catalog = FakeCatalog {
            columns: Some(columns),
            keys: primary_key_rows(),
            ..Default::default()
        };
        let reconciler = TableReconciler::new(&model, &catalog);

        let refused = reconciler.reconcile(&ReconcileOptions::new()).await;
        assert_eq!(
            refused.unwrap_err(),
            SchemaError::DestructiveChange {
                table: "user_account".into(),
                count: 1
            }
        );

        let result = reconciler
            .reconcile(&ReconcileOptions::new().with_allow_destructive(true))
            .await
            .unwrap();
        assert_eq!(result.statements_executed, 1);
        assert_eq!(
            *catalog.executed.lock().unwrap(),
            vec!["ALTER TABLE user_account DROP COLUMN legacy".to_string()]
        );
    }

    #[tokio::test]
    async fn auto_increment_key_is_added_in_one_statement() {
        let model = model();
        let catalog = FakeCatalog {
            columns: Some(matching_columns()[1..].to_vec()),
            ..Default::default()
        };

        let result = TableReconciler::new(&model, &catalog)
            .reconcile(&ReconcileOptions::new())
            .await
            .unwrap();

        assert_eq!(result.statements_executed, 1);
        assert_eq!(
            *catalog.executed.lock().unwrap(),
            vec![
                "ALTER TABLE user_account ADD COLUMN id INT AUTO_INCREMENT NOT NULL, ADD PRIMARY KEY (id)"
                    .to_string()
            ]
        );
    }
}
