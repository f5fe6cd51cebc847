use regex::Regex;
use thiserror::Error;

/// Converts a model name into the physical table identifier.
///
/// Every capital letter becomes `_` followed by its lowercase form, then any
/// leading underscores are stripped: `UserAccount` -> `user_account`.
pub fn table_name(model_name: &str) -> String {
    let mut out = String::with_capacity(model_name.len() + 4);
    for c in model_name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_start_matches('_').to_string()
}

/// Masks the password component of a connection URL.
pub fn sanitize_url(url: &str) -> String {
    let re = Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*://[^:/@]+):[^@]*@").unwrap();
    re.replace(url, "$1:****@").to_string()
}

/// Removes any occurrence of the raw URL (and so its password) from a driver error.
pub fn sanitize_connection_error(url: &str, message: &str) -> String {
    message.replace(url, &sanitize_url(url))
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Invalid type {tag}: {reason}")]
    InvalidType { tag: String, reason: String },

    #[error("Data type is invalid or not yet supported: {0}")]
    UnsupportedType(String),

    #[error("Field {field} must define a valid type")]
    MissingType { field: String },

    #[error("model property must be set for foreign key {foreign_key}")]
    MissingModel { foreign_key: String },

    #[error("mappings property must be set for foreign key to {model}")]
    MissingMappings { model: String },

    #[error("foreign key mapping {field} must be defined in fields")]
    UnknownField { field: String },

    #[error(
        "foreign key {clause} must be one of RESTRICT, CASCADE, SET NULL, NO ACTION. Actual: {option}"
    )]
    InvalidReferenceOption { clause: String, option: String },

    #[error("foreign key to {model} declares constraint {constraint} but constraint_name {constraint_name}")]
    ConflictingConstraintName {
        model: String,
        constraint: String,
        constraint_name: String,
    },

    #[error("name is a required model property")]
    MissingName,

    #[error("primary key {field} must be defined in fields")]
    UnknownPrimaryKeyField { field: String },

    #[error("Table {table} does not exist")]
    TableNotFound { table: String },

    #[error("Refusing {count} destructive operation(s) on {table}")]
    DestructiveChange { table: String, count: usize },

    #[error("Foreign key to {model} has no constraint name")]
    UnnamedConstraint { model: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
