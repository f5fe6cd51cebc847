#![allow(dead_code, unused_imports)]

pub use tablekeeper::diff::{compute_diff, planner::plan_operations, DiffOp};
pub use tablekeeper::model::{ForeignKey, ReferenceOption, SchemaModel};
pub use tablekeeper::mysql::introspect::{introspect_table, ColumnRow, KeyRow};
pub use tablekeeper::reconcile::{ReconcileOptions, TableCatalog, TableReconciler};
pub use tablekeeper::util::{Result, SchemaError};
pub use testcontainers::runners::AsyncRunner;
pub use testcontainers::ContainerAsync;
pub use testcontainers_modules::mysql::Mysql;

use async_trait::async_trait;
use std::sync::Mutex;

pub const EXAMPLE_MODEL: &str = r#"{
    "fields": {
        "id": { "type": "int-4", "auto_increment": true, "not_null": true, "comment": "foobar" },
        "other_id": { "type": "int-4", "not_null": true },
        "other_id2": { "type": "int-4" },
        "foo": { "type": "varchar-40", "default": "foo", "not_null": true },
        "bar": { "type": "varchar-20", "unique": true }
    },
    "properties": {
        "name": "Example",
        "primary_key": ["id", "other_id"],
        "foreign_keys": [{
            "model": "other",
            "mappings": { "other_id": "id", "other_id2": "id2" },
            "on_delete": "NO ACTION",
            "on_update": "CASCADE"
        }]
    }
}"#;

pub fn example_model() -> SchemaModel {
    SchemaModel::from_json(EXAMPLE_MODEL).unwrap()
}

/// The `example` table as introspection rebuilds it from the rows below.
pub fn example_table() -> SchemaModel {
    introspect_table("Example", &example_columns(), &example_keys()).unwrap()
}

fn column(name: &str, column_type: &str, nullable: &str) -> ColumnRow {
    ColumnRow {
        name: name.into(),
        column_type: column_type.into(),
        nullable: nullable.into(),
        ..Default::default()
    }
}

/// Column rows MySQL reports for the `example` table.
pub fn example_columns() -> Vec<ColumnRow> {
    vec![
        ColumnRow {
            extra: "auto_increment".into(),
            key_flag: "PRI".into(),
            comment: "foobar".into(),
            ..column("id", "int(11)", "NO")
        },
        ColumnRow {
            key_flag: "PRI".into(),
            ..column("other_id", "int(11)", "NO")
        },
        column("other_id2", "int(11)", "YES"),
        ColumnRow {
            default_value: Some("foo".into()),
            ..column("foo", "varchar(40)", "NO")
        },
        ColumnRow {
            key_flag: "UNI".into(),
            ..column("bar", "varchar(20)", "YES")
        },
    ]
}

fn reference(column_name: &str, referenced_column: &str) -> KeyRow {
    KeyRow {
        column_name: column_name.into(),
        referenced_table: Some("other".into()),
        referenced_column: Some(referenced_column.into()),
        constraint_name: "example_ibfk_1".into(),
        update_rule: Some("CASCADE".into()),
        delete_rule: Some("NO ACTION".into()),
    }
}

fn plain_key(column_name: &str, constraint_name: &str) -> KeyRow {
    KeyRow {
        column_name: column_name.into(),
        constraint_name: constraint_name.into(),
        ..Default::default()
    }
}

/// Key rows MySQL reports for the `example` table.
pub fn example_keys() -> Vec<KeyRow> {
    vec![
        reference("other_id", "id"),
        reference("other_id2", "id2"),
        plain_key("id", "PRIMARY"),
        plain_key("other_id", "PRIMARY"),
        plain_key("bar", "bar"),
    ]
}

/// A catalog backed by fixed rows that records the statements it is asked
/// to execute.
#[derive(Default)]
pub struct MemoryCatalog {
    pub columns: Option<Vec<ColumnRow>>,
    pub keys: Vec<KeyRow>,
    pub executed: Mutex<Vec<String>>,
}

impl MemoryCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_table(columns: Vec<ColumnRow>, keys: Vec<KeyRow>) -> Self {
        Self {
            columns: Some(columns),
            keys,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TableCatalog for MemoryCatalog {
    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnRow>> {
        self.columns
            .clone()
            .ok_or_else(|| SchemaError::TableNotFound {
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

pub async fn setup_mysql() -> (ContainerAsync<Mysql>, String) {
    let container = Mysql::default().start().await.unwrap();
    let port = container.get_host_port_ipv4(3306).await.unwrap();
    let url = format!("mysql://root@127.0.0.1:{port}/test");
    (container, url)
}
