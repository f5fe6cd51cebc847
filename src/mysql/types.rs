//! Mapping between portable type tags (`int-4`, `int-u1`, `varchar-40`) and
//! MySQL column types.

use crate::util::{Result, SchemaError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_VARCHAR: u32 = 65535;

const DEFAULT_INT_BYTES: u8 = 4;

/// Reverse lookup for integer column types as reported by the server.
///
/// The parenthesized number is a display width, not a storage size, so the
/// mapping is a table. Newer servers omit the width entirely.
const INTEGER_TYPES: &[(&str, &str)] = &[
    ("tinyint(4)", "int-1"),
    ("smallint(6)", "int-2"),
    ("mediumint(9)", "int-3"),
    ("int(11)", "int-4"),
    ("bigint(20)", "int-8"),
    ("tinyint(3) unsigned", "int-u1"),
    ("smallint(5) unsigned", "int-u2"),
    ("mediumint(8) unsigned", "int-u3"),
    ("int(10) unsigned", "int-u4"),
    ("bigint(20) unsigned", "int-u8"),
    ("tinyint", "int-1"),
    ("smallint", "int-2"),
    ("mediumint", "int-3"),
    ("int", "int-4"),
    ("bigint", "int-8"),
    ("tinyint unsigned", "int-u1"),
    ("smallint unsigned", "int-u2"),
    ("mediumint unsigned", "int-u3"),
    ("int unsigned", "int-u4"),
    ("bigint unsigned", "int-u8"),
];

/// A parsed type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    Int { bytes: u8, unsigned: bool },
    Varchar(u16),
}

impl DataType {
    /// Parses a tag of the form `kind[-size]`.
    pub fn parse(tag: &str) -> Result<Self> {
        let (kind, size) = match tag.split_once('-') {
            Some((kind, size)) => (kind, Some(size)),
            None => (tag, None),
        };

        match kind {
            "varchar" => parse_varchar(tag, size),
            "int" => parse_int(tag, size),
            _ => Err(SchemaError::UnsupportedType(tag.to_string())),
        }
    }

    /// Recovers a type from the column type text a MySQL server reports.
    pub fn from_dialect(dialect_type: &str) -> Result<Self> {
        let normalized = dialect_type.trim().to_lowercase();

        if let Some((_, tag)) = INTEGER_TYPES.iter().find(|(sql, _)| *sql == normalized) {
            return Self::parse(tag);
        }

        let re = Regex::new(r"^varchar\(([0-9]+)\)$").unwrap();
        if let Some(caps) = re.captures(&normalized) {
            return Self::parse(&format!("varchar-{}", &caps[1]))
                .map_err(|_| SchemaError::UnsupportedType(dialect_type.to_string()));
        }

        Err(SchemaError::UnsupportedType(dialect_type.to_string()))
    }

    /// The MySQL type name, e.g. `TINYINT UNSIGNED` or `VARCHAR(40)`.
    pub fn dialect_name(&self) -> String {
        match self {
            DataType::Int { bytes, unsigned } => {
                let name = match bytes {
                    1 => "TINYINT",
                    2 => "SMALLINT",
                    3 => "MEDIUMINT",
                    8 => "BIGINT",
                    _ => "INT",
                };
                if *unsigned {
                    format!("{name} UNSIGNED")
                } else {
                    name.to_string()
                }
            }
            DataType::Varchar(len) => format!("VARCHAR({len})"),
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, DataType::Varchar(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int { .. })
    }
}

fn parse_varchar(tag: &str, size: Option<&str>) -> Result<DataType> {
    let invalid = || SchemaError::InvalidType {
        tag: tag.to_string(),
        reason: format!("VARCHAR size must be between 1 and {MAX_VARCHAR}"),
    };

    let len: u32 = size.ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
    if !(1..=MAX_VARCHAR).contains(&len) {
        return Err(invalid());
    }

    u16::try_from(len).map(DataType::Varchar).map_err(|_| invalid())
}

fn parse_int(tag: &str, size: Option<&str>) -> Result<DataType> {
    let (unsigned, bytes) = match size {
        None => (false, None),
        Some(size) => match size.strip_prefix('u') {
            Some(rest) => (true, Some(rest)),
            None => (false, Some(size)),
        },
    };

    let bytes = match bytes {
        None => DEFAULT_INT_BYTES,
        Some("1") => 1,
        Some("2") => 2,
        Some("3") => 3,
        Some("4") => 4,
        Some("8") => 8,
        Some(_) => {
            return Err(SchemaError::InvalidType {
                tag: tag.to_string(),
                reason: "integer size in bytes must be 1, 2, 3, 4, or 8".to_string(),
            })
        }
    };

    Ok(DataType::Int { bytes, unsigned })
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int {
                bytes,
                unsigned: true,
            } => write!(f, "int-u{bytes}"),
            DataType::Int {
                bytes,
                unsigned: false,
            } => write!(f, "int-{bytes}"),
            DataType::Varchar(len) => write!(f, "varchar-{len}"),
        }
    }
}

impl FromStr for DataType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DataType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.to_string()
    }
}

/// Renders a type tag as a MySQL type.
pub fn to_dialect(tag: &str) -> Result<String> {
    DataType::parse(tag).map(|t| t.dialect_name())
}

/// Maps a MySQL column type back to a type tag.
pub fn from_dialect(dialect_type: &str) -> Result<String> {
    DataType::from_dialect(dialect_type).map(|t| t.to_string())
}

pub fn is_string_type(tag: &str) -> bool {
    matches!(tag.split_once('-').map_or(tag, |(kind, _)| kind), "varchar")
}
