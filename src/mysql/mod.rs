pub mod connection;
pub mod introspect;
pub mod sqlgen;
pub mod types;

pub use connection::MySqlConnection;
pub use introspect::{introspect_table, ColumnRow, KeyRow, TableSnapshot};
pub use types::DataType;
