pub mod foreign_keys;
pub mod spec;

pub use spec::{FieldSpec, ForeignKeySpec, ModelSpec, PropertiesSpec};

use crate::mysql::types::DataType;
use crate::util::{self, Result, SchemaError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A scalar column default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Boolean(bool),
    Integer(i64),
    /// Numbers that do not fit an `i64`: large unsigned values and decimals.
    Number(serde_json::Number),
    Text(String),
}

impl DefaultValue {
    /// Coerces the value to the representation the server reports for `data_type`,
    /// so that declared and introspected defaults compare equal.
    pub fn for_type(self, data_type: &DataType) -> Self {
        if data_type.is_string() {
            return match self {
                DefaultValue::Text(text) => DefaultValue::Text(text),
                other => DefaultValue::Text(other.to_string()),
            };
        }

        match self {
            DefaultValue::Boolean(flag) => DefaultValue::Integer(i64::from(flag)),
            DefaultValue::Number(n) => match n.as_i64() {
                Some(n) => DefaultValue::Integer(n),
                None => DefaultValue::Number(n),
            },
            DefaultValue::Text(text) => {
                let trimmed = text.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    DefaultValue::Integer(n)
                } else if let Ok(n) = trimmed.parse::<u64>() {
                    DefaultValue::Number(n.into())
                } else {
                    DefaultValue::Text(text)
                }
            }
            other => other,
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Boolean(flag) => write!(f, "{flag}"),
            DefaultValue::Integer(n) => write!(f, "{n}"),
            DefaultValue::Number(n) => write!(f, "{n}"),
            DefaultValue::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "is_false")]
    pub not_null: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub auto_increment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FieldDefinition {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            not_null: false,
            auto_increment: false,
            default: None,
            unique: false,
            comment: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value.for_type(&self.data_type));
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.comment = (!comment.is_empty()).then_some(comment);
        self
    }

    /// Whether DDL rendering will emit the declared default.
    pub fn renders_default(&self) -> bool {
        self.default.is_some() && !self.auto_increment && !self.unique
    }

    fn from_spec(name: &str, spec: &FieldSpec) -> Result<Self> {
        let tag = spec
            .data_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SchemaError::MissingType {
                field: name.to_string(),
            })?;
        let data_type = DataType::parse(tag)?;

        let mut field = FieldDefinition::new(data_type);
        field.not_null = spec.not_null.unwrap_or(false);
        field.auto_increment = spec.auto_increment.unwrap_or(false);
        field.unique = spec.unique.unwrap_or(false);
        field.default = spec.default.clone().map(|d| d.for_type(&data_type));
        field.comment = spec.comment.clone().filter(|c| !c.is_empty());

        if field.default.is_some() && field.unique && !field.auto_increment {
            tracing::warn!(
                field = name,
                "default value is not rendered for unique fields and will be ignored"
            );
        }

        Ok(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReferenceOption {
    Restrict,
    Cascade,
    SetNull,
    NoAction,
}

impl FromStr for ReferenceOption {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "RESTRICT" => Ok(ReferenceOption::Restrict),
            "CASCADE" => Ok(ReferenceOption::Cascade),
            "SET NULL" => Ok(ReferenceOption::SetNull),
            "NO ACTION" => Ok(ReferenceOption::NoAction),
            _ => Err(SchemaError::InvalidReferenceOption {
                clause: "reference option".to_string(),
                option: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReferenceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferenceOption::Restrict => "RESTRICT",
            ReferenceOption::Cascade => "CASCADE",
            ReferenceOption::SetNull => "SET NULL",
            ReferenceOption::NoAction => "NO ACTION",
        };
        f.write_str(s)
    }
}

impl TryFrom<String> for ReferenceOption {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ReferenceOption> for String {
    fn from(value: ReferenceOption) -> Self {
        value.to_string()
    }
}

/// A foreign key of a model.
///
/// `constraint` is the name the model declares; `constraint_name` is the name
/// the server reports, stamped by introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferenceOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferenceOption>,
    pub mappings: IndexMap<String, String>,
}

impl ForeignKey {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            constraint: None,
            constraint_name: None,
            on_delete: None,
            on_update: None,
            mappings: IndexMap::new(),
        }
    }

    pub fn map(mut self, local: impl Into<String>, referenced: impl Into<String>) -> Self {
        self.mappings.insert(local.into(), referenced.into());
        self
    }

    pub fn constraint(mut self, name: impl Into<String>) -> Self {
        self.constraint = Some(name.into());
        self
    }

    pub fn constraint_name(mut self, name: impl Into<String>) -> Self {
        self.constraint_name = Some(name.into());
        self
    }

    pub fn on_delete(mut self, option: ReferenceOption) -> Self {
        self.on_delete = Some(option);
        self
    }

    pub fn on_update(mut self, option: ReferenceOption) -> Self {
        self.on_update = Some(option);
        self
    }

    /// Physical table the key references.
    pub fn referenced_table(&self) -> String {
        util::table_name(&self.model)
    }

    /// The server-side name if known, otherwise the declared one.
    pub fn effective_name(&self) -> Option<&str> {
        self.constraint_name
            .as_deref()
            .or(self.constraint.as_deref())
    }

    /// Whether both keys point at the same target model.
    pub fn targets_same_model(&self, other: &ForeignKey) -> bool {
        self.model.eq_ignore_ascii_case(&other.model)
            || util::table_name(&self.model).eq_ignore_ascii_case(&util::table_name(&other.model))
    }
}

/// The validated description of one table.
///
/// Construction checks every invariant up front; once built the model cannot
/// be changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ModelSpec", into = "ModelSpec")]
pub struct SchemaModel {
    name: String,
    fields: IndexMap<String, FieldDefinition>,
    primary_key: Vec<String>,
    foreign_keys: Vec<ForeignKey>,
}

impl SchemaModel {
    /// Builds a model from already typed parts.
    pub fn new(
        name: impl Into<String>,
        fields: IndexMap<String, FieldDefinition>,
        primary_key: Vec<String>,
        foreign_keys: Vec<ForeignKey>,
    ) -> Result<Self> {
        let name = name.into();

        check_primary_key(&fields, &primary_key)?;
        for fk in &foreign_keys {
            foreign_keys::check_foreign_key(&fields, fk)?;
        }
        if name.is_empty() {
            return Err(SchemaError::MissingName);
        }

        Ok(Self {
            name,
            fields,
            primary_key,
            foreign_keys,
        })
    }

    /// Validates a raw declaration.
    ///
    /// Order: field types, primary key, foreign keys, name. The first failing
    /// check is reported.
    pub fn from_spec(spec: ModelSpec) -> Result<Self> {
        let mut fields = IndexMap::with_capacity(spec.fields.len());
        for (name, field) in &spec.fields {
            fields.insert(name.clone(), FieldDefinition::from_spec(name, field)?);
        }

        let primary_key = spec.properties.primary_key.unwrap_or_default();
        check_primary_key(&fields, &primary_key)?;

        let foreign_keys = spec
            .properties
            .foreign_keys
            .unwrap_or_default()
            .iter()
            .map(|fk| foreign_keys::validate_foreign_key(&fields, fk))
            .collect::<Result<Vec<_>>>()?;

        let name = spec
            .properties
            .name
            .filter(|n| !n.is_empty())
            .ok_or(SchemaError::MissingName)?;

        Ok(Self {
            name,
            fields,
            primary_key,
            foreign_keys,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let spec: ModelSpec =
            serde_json::from_str(json).map_err(|e| SchemaError::ParseError(e.to_string()))?;
        Self::from_spec(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> String {
        util::table_name(&self.name)
    }

    pub fn fields(&self) -> &IndexMap<String, FieldDefinition> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let json = serde_json::to_string(self).expect("SchemaModel must serialize");
        let hash = Sha256::digest(json.as_bytes());
        hex::encode(hash)
    }
}

impl TryFrom<ModelSpec> for SchemaModel {
    type Error = SchemaError;

    fn try_from(spec: ModelSpec) -> Result<Self> {
        Self::from_spec(spec)
    }
}

fn check_primary_key(fields: &IndexMap<String, FieldDefinition>, primary_key: &[String]) -> Result<()> {
    match primary_key.iter().find(|key| !fields.contains_key(*key)) {
        Some(field) => Err(SchemaError::UnknownPrimaryKeyField {
            field: field.clone(),
        }),
        None => Ok(()),
    }
}
