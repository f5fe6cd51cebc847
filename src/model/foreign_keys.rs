use super::{ForeignKey, ReferenceOption};
use crate::model::spec::ForeignKeySpec;
use crate::util::{Result, SchemaError};
use indexmap::IndexMap;

pub const REFERENCE_OPTIONS: [ReferenceOption; 4] = [
    ReferenceOption::Restrict,
    ReferenceOption::Cascade,
    ReferenceOption::SetNull,
    ReferenceOption::NoAction,
];

pub fn reference_option_is_valid(option: &str) -> bool {
    option.parse::<ReferenceOption>().is_ok()
}

/// Validates a declared foreign key against the fields of its model and
/// returns the typed key.
///
/// Checks run in order: target model, mappings present, mapping keys are
/// fields, `on_delete`, `on_update`, then agreement between `constraint` and
/// `constraint_name` when both are given.
pub fn validate_foreign_key<V>(
    fields: &IndexMap<String, V>,
    spec: &ForeignKeySpec,
) -> Result<ForeignKey> {
    let model = match spec.model.as_deref() {
        Some(model) if !model.is_empty() => model.to_string(),
        _ => {
            return Err(SchemaError::MissingModel {
                foreign_key: serde_json::to_string(spec).unwrap_or_default(),
            })
        }
    };

    let mappings = match &spec.mappings {
        Some(mappings) if !mappings.is_empty() => mappings.clone(),
        _ => return Err(SchemaError::MissingMappings { model }),
    };

    check_mapped_fields(fields, &mappings)?;

    let on_delete = parse_option("on_delete", spec.on_delete.as_deref())?;
    let on_update = parse_option("on_update", spec.on_update.as_deref())?;

    let fk = ForeignKey {
        model,
        constraint: spec.constraint.clone().filter(|c| !c.is_empty()),
        constraint_name: spec.constraint_name.clone().filter(|c| !c.is_empty()),
        on_delete,
        on_update,
        mappings,
    };
    check_constraint_names(&fk)?;
    Ok(fk)
}

/// Structural checks for an already typed foreign key.
pub(crate) fn check_foreign_key<V>(fields: &IndexMap<String, V>, fk: &ForeignKey) -> Result<()> {
    if fk.model.is_empty() {
        return Err(SchemaError::MissingModel {
            foreign_key: format!("{:?}", fk.mappings),
        });
    }
    if fk.mappings.is_empty() {
        return Err(SchemaError::MissingMappings {
            model: fk.model.clone(),
        });
    }
    check_mapped_fields(fields, &fk.mappings)?;
    check_constraint_names(fk)
}

/// A key naming itself twice must use the same name both times.
fn check_constraint_names(fk: &ForeignKey) -> Result<()> {
    match (fk.constraint.as_deref(), fk.constraint_name.as_deref()) {
        (Some(constraint), Some(constraint_name))
            if !constraint.eq_ignore_ascii_case(constraint_name) =>
        {
            Err(SchemaError::ConflictingConstraintName {
                model: fk.model.clone(),
                constraint: constraint.to_string(),
                constraint_name: constraint_name.to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn check_mapped_fields<V>(
    fields: &IndexMap<String, V>,
    mappings: &IndexMap<String, String>,
) -> Result<()> {
    match mappings.keys().find(|local| !fields.contains_key(*local)) {
        Some(field) => Err(SchemaError::UnknownField {
            field: field.clone(),
        }),
        None => Ok(()),
    }
}

fn parse_option(clause: &str, value: Option<&str>) -> Result<Option<ReferenceOption>> {
    value
        .map(|option| {
            option
                .parse::<ReferenceOption>()
                .map_err(|_| SchemaError::InvalidReferenceOption {
                    clause: clause.to_string(),
                    option: option.to_string(),
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> IndexMap<String, ()> {
        [("id".to_string(), ()), ("other_id".to_string(), ())]
            .into_iter()
            .collect()
    }

    fn spec() -> ForeignKeySpec {
        ForeignKeySpec {
            model: Some("Other".into()),
            mappings: Some([("other_id".to_string(), "id".to_string())].into_iter().collect()),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_minimal_foreign_key() {
        let fk = validate_foreign_key(&fields(), &spec()).unwrap();
        assert_eq!(fk.model, "Other");
        assert_eq!(fk.mappings.get("other_id").map(String::as_str), Some("id"));
        assert_eq!(fk.on_delete, None);
    }

    #[test]
    fn missing_model_fails() {
        let mut spec = spec();
        spec.model = None;
        assert!(matches!(
            validate_foreign_key(&fields(), &spec),
            Err(SchemaError::MissingModel { .. })
        ));
    }

    #[test]
    fn missing_or_empty_mappings_fail() {
        let mut spec = spec();
        spec.mappings = Some(IndexMap::new());
        assert!(matches!(
            validate_foreign_key(&fields(), &spec),
            Err(SchemaError::MissingMappings { .. })
        ));

        spec.mappings = None;
        assert!(matches!(
            validate_foreign_key(&fields(), &spec),
            Err(SchemaError::MissingMappings { .. })
        ));
    }

    #[test]
    fn unknown_local_field_fails() {
        let mut spec = spec();
        spec.mappings = Some([("ghost".to_string(), "id".to_string())].into_iter().collect());
        assert_eq!(
            validate_foreign_key(&fields(), &spec),
            Err(SchemaError::UnknownField {
                field: "ghost".into()
            })
        );
    }

    #[test]
    fn reference_options_are_case_insensitive() {
        let mut spec = spec();
        spec.on_delete = Some("cascade".into());
        spec.on_update = Some("Set Null".into());
        let fk = validate_foreign_key(&fields(), &spec).unwrap();
        assert_eq!(fk.on_delete, Some(ReferenceOption::Cascade));
        assert_eq!(fk.on_update, Some(ReferenceOption::SetNull));
    }

    #[test]
    fn invalid_reference_option_fails() {
        let mut spec = spec();
        spec.on_update = Some("explode".into());
        assert_eq!(
            validate_foreign_key(&fields(), &spec),
            Err(SchemaError::InvalidReferenceOption {
                clause: "on_update".into(),
                option: "explode".into()
            })
        );
    }

    #[test]
    fn differing_constraint_names_fail() {
        let mut spec = spec();
        spec.constraint = Some("fk_new".into());
        spec.constraint_name = Some("fk_old".into());
        assert_eq!(
            validate_foreign_key(&fields(), &spec),
            Err(SchemaError::ConflictingConstraintName {
                model: "Other".into(),
                constraint: "fk_new".into(),
                constraint_name: "fk_old".into()
            })
        );
    }

    #[test]
    fn matching_constraint_names_are_accepted() {
        let mut spec = spec();
        spec.constraint = Some("FK_Other".into());
        spec.constraint_name = Some("fk_other".into());
        assert!(validate_foreign_key(&fields(), &spec).is_ok());
    }

    #[test]
    fn typed_key_with_conflicting_names_fails() {
        let fk = ForeignKey::new("Other")
            .map("other_id", "id")
            .constraint("fk_new")
            .constraint_name("fk_old");
        assert!(matches!(
            check_foreign_key(&fields(), &fk),
            Err(SchemaError::ConflictingConstraintName { .. })
        ));
    }

    #[test]
    fn reference_option_validity() {
        assert!(reference_option_is_valid("no action"));
        assert!(reference_option_is_valid("RESTRICT"));
        assert!(!reference_option_is_valid("SET DEFAULT"));
        assert!(!reference_option_is_valid(" cascade "));
        assert_eq!(REFERENCE_OPTIONS.len(), 4);
    }
}
