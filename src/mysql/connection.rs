use crate::mysql::introspect::{ColumnRow, KeyRow};
use crate::reconcile::TableCatalog;
use crate::util::{sanitize_connection_error, sanitize_url, Result, SchemaError};
use async_trait::async_trait;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{Executor, MySql, Pool, Row};
use tracing::debug;

const COLUMNS_QUERY: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR) AS name,
        CAST(COLUMN_TYPE AS CHAR) AS column_type,
        CAST(IS_NULLABLE AS CHAR) AS nullable,
        CAST(EXTRA AS CHAR) AS extra,
        CAST(COLUMN_DEFAULT AS CHAR) AS default_value,
        CAST(COLUMN_KEY AS CHAR) AS key_flag,
        CAST(COLUMN_COMMENT AS CHAR) AS comment
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

const KEYS_QUERY: &str = r#"
    SELECT
        CAST(k.COLUMN_NAME AS CHAR) AS column_name,
        CAST(k.REFERENCED_TABLE_NAME AS CHAR) AS referenced_table,
        CAST(k.REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column,
        CAST(k.CONSTRAINT_NAME AS CHAR) AS constraint_name,
        CAST(r.UPDATE_RULE AS CHAR) AS update_rule,
        CAST(r.DELETE_RULE AS CHAR) AS delete_rule
    FROM information_schema.KEY_COLUMN_USAGE k
    LEFT JOIN information_schema.REFERENTIAL_CONSTRAINTS r
        ON r.CONSTRAINT_SCHEMA = k.CONSTRAINT_SCHEMA
        AND r.CONSTRAINT_NAME = k.CONSTRAINT_NAME
        AND r.TABLE_NAME = k.TABLE_NAME
    WHERE k.TABLE_SCHEMA = DATABASE() AND k.TABLE_NAME = ?
    ORDER BY k.CONSTRAINT_NAME, k.ORDINAL_POSITION
"#;

/// A pooled connection to one MySQL database.
///
/// Tables are looked up in the database selected by the connection URL.
pub struct MySqlConnection {
    pool: Pool<MySql>,
}

impl MySqlConnection {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await
            .map_err(|e| {
                let sanitized_error = sanitize_connection_error(connection_string, &e.to_string());
                SchemaError::DatabaseError(format!(
                    "Failed to connect to {}: {sanitized_error}",
                    sanitize_url(connection_string)
                ))
            })?;

        Ok(MySqlConnection { pool })
    }

    pub fn pool(&self) -> &Pool<MySql> {
        &self.pool
    }
}

#[async_trait]
impl TableCatalog for MySqlConnection {
    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnRow>> {
        debug!(table, "fetching columns");
        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                SchemaError::DatabaseError(format!("Failed to fetch columns of {table}: {e}"))
            })?;

        if rows.is_empty() {
            return Err(SchemaError::TableNotFound {
                table: table.to_string(),
            });
        }

        Ok(rows
            .iter()
            .map(|row| ColumnRow {
                name: row.get("name"),
                column_type: row.get("column_type"),
                nullable: row.get("nullable"),
                extra: row.get::<Option<String>, _>("extra").unwrap_or_default(),
                default_value: row.get("default_value"),
                key_flag: row.get::<Option<String>, _>("key_flag").unwrap_or_default(),
                comment: row.get::<Option<String>, _>("comment").unwrap_or_default(),
            })
            .collect())
    }

    async fn describe_keys(&self, table: &str) -> Result<Vec<KeyRow>> {
        debug!(table, "fetching keys");
        let rows = sqlx::query(KEYS_QUERY)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                SchemaError::DatabaseError(format!("Failed to fetch keys of {table}: {e}"))
            })?;

        Ok(rows
            .iter()
            .map(|row| KeyRow {
                column_name: row.get("column_name"),
                referenced_table: row.get("referenced_table"),
                referenced_column: row.get("referenced_column"),
                constraint_name: row.get("constraint_name"),
                update_rule: row.get("update_rule"),
                delete_rule: row.get("delete_rule"),
            })
            .collect())
    }

    async fn execute(&self, statement: &str) -> Result<()> {
        debug!("{statement}");
        self.pool
            .execute(statement)
            .await
            .map_err(|e| SchemaError::DatabaseError(format!("Failed to execute {statement}: {e}")))?;
        Ok(())
    }
}
