//! Raw, unvalidated model declarations as they appear in model files.
//!
//! ```json
//! {
//!   "fields": {
//!     "id": { "type": "int-4", "auto_increment": true },
//!     "other_id": { "type": "int-4", "not_null": true }
//!   },
//!   "properties": {
//!     "name": "Example",
//!     "primary_key": ["id"],
//!     "foreign_keys": [
//!       { "model": "Other", "on_delete": "cascade", "mappings": { "other_id": "id" } }
//!     ]
//!   }
//! }
//! ```

use super::{DefaultValue, FieldDefinition, ForeignKey, SchemaModel};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    #[serde(default)]
    pub fields: IndexMap<String, FieldSpec>,
    #[serde(default)]
    pub properties: PropertiesSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertiesSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_keys: Option<Vec<ForeignKeySpec>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_null: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl FieldSpec {
    pub fn of_type(tag: impl Into<String>) -> Self {
        Self {
            data_type: Some(tag.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignKeySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<IndexMap<String, String>>,
}

fn flag(value: bool) -> Option<bool> {
    value.then_some(true)
}

impl From<&FieldDefinition> for FieldSpec {
    fn from(field: &FieldDefinition) -> Self {
        Self {
            data_type: Some(field.data_type.to_string()),
            not_null: flag(field.not_null),
            auto_increment: flag(field.auto_increment),
            default: field.default.clone(),
            unique: flag(field.unique),
            comment: field.comment.clone(),
        }
    }
}

impl From<&ForeignKey> for ForeignKeySpec {
    fn from(fk: &ForeignKey) -> Self {
        Self {
            model: Some(fk.model.clone()),
            constraint: fk.constraint.clone(),
            constraint_name: fk.constraint_name.clone(),
            on_delete: fk.on_delete.map(|o| o.to_string()),
            on_update: fk.on_update.map(|o| o.to_string()),
            mappings: Some(fk.mappings.clone()),
        }
    }
}

impl From<SchemaModel> for ModelSpec {
    fn from(model: SchemaModel) -> Self {
        let fields = model
            .fields()
            .iter()
            .map(|(name, field)| (name.clone(), FieldSpec::from(field)))
            .collect();

        let primary_key = (!model.primary_key().is_empty()).then(|| model.primary_key().to_vec());
        let foreign_keys = (!model.foreign_keys().is_empty())
            .then(|| model.foreign_keys().iter().map(ForeignKeySpec::from).collect());

        Self {
            fields,
            properties: PropertiesSpec {
                name: Some(model.name().to_string()),
                primary_key,
                foreign_keys,
            },
        }
    }
}
