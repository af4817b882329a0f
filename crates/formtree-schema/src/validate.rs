//! Validation primitives and the structural oracle.
//!
//! Validation errors are ordinary values, never `Err` or panics: a
//! [`Validation`] carries the error list alongside the (possibly partial)
//! value, and an empty error list signals success. The [`Oracle`] trait is
//! the whole-value validation contract; [`StructuralOracle`] is the default
//! implementation, checking a value against its declared [`FieldType`]
//! including refinement predicates.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Type mismatch | Error appended at the offending path |
//! | Refinement predicate false | Error appended only if the base type checks clean |
//! | Null under `Maybe` | Accepted, no inner check runs |
//! | Non-record list element | Error at the element's path |

use core::fmt;

use serde_json::Value;

use crate::ty::{FieldType, ScalarKind};
use crate::value::{Path, PathSeg, display_path, is_nully};

/// A single validation error, attributed to a path.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationError {
    /// Human-readable description.
    pub message: String,
    /// Where in the form tree the error occurred.
    pub path: Path,
    /// The offending value.
    pub actual: Value,
}

impl ValidationError {
    /// Create an error.
    pub fn new(message: impl Into<String>, path: Path, actual: Value) -> Self {
        Self {
            message: message.into(),
            path,
            actual,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", display_path(&self.path), self.message)
        }
    }
}

/// The outcome of validating a value: aggregated errors plus the value.
#[derive(Clone, Debug, PartialEq)]
pub struct Validation {
    /// Accumulated errors; empty means success.
    pub errors: Vec<ValidationError>,
    /// The validated (possibly canonicalized) value.
    pub value: Value,
}

impl Validation {
    /// A successful result carrying `value`.
    #[must_use]
    pub fn ok(value: Value) -> Self {
        Self {
            errors: Vec::new(),
            value,
        }
    }

    /// Whether validation succeeded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Options threaded through whole-value validation.
#[derive(Clone, Debug, Default)]
pub struct ValidationOptions {
    /// Path prefix for error attribution.
    pub path: Path,
    /// Opaque application context, passed through untouched.
    pub context: Value,
}

/// Whole-value validation contract.
///
/// Implementations check a value against its declared type and report all
/// violations. The component takes the oracle as a trait object so callers
/// can wrap it (e.g. to count invocations in tests).
pub trait Oracle {
    /// Validate `value` against `ty`, attributing errors under `options.path`.
    fn validate(&self, value: &Value, ty: &FieldType, options: &ValidationOptions) -> Validation;
}

/// Default oracle: structural checks plus refinement predicates.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralOracle;

impl Oracle for StructuralOracle {
    fn validate(&self, value: &Value, ty: &FieldType, options: &ValidationOptions) -> Validation {
        let mut errors = Vec::new();
        check(value, ty, &options.path, &mut errors);
        Validation {
            errors,
            value: value.clone(),
        }
    }
}

fn check(value: &Value, ty: &FieldType, path: &Path, errors: &mut Vec<ValidationError>) {
    match ty {
        FieldType::Maybe(inner) => {
            if !is_nully(value) {
                check(value, inner, path, errors);
            }
        }
        FieldType::Refined { inner, refinement } => {
            let before = errors.len();
            check(value, inner, path, errors);
            // The predicate only runs on structurally sound values.
            if errors.len() == before && !refinement.check(value) {
                errors.push(ValidationError::new(
                    format!("does not satisfy {}", refinement.name()),
                    path.clone(),
                    value.clone(),
                ));
            }
        }
        FieldType::Scalar(kind) => check_scalar(value, *kind, path, errors),
        FieldType::List(items) => match value {
            Value::Array(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    let mut element_path = path.clone();
                    element_path.push(PathSeg::Index(index));
                    match element {
                        Value::Object(record) => {
                            for (name, field_ty) in items.fields() {
                                let mut field_path = element_path.clone();
                                field_path.push(PathSeg::Key(name.to_owned()));
                                let field_value = record.get(name).unwrap_or(&Value::Null);
                                check(field_value, field_ty, &field_path, errors);
                            }
                        }
                        other => errors.push(ValidationError::new(
                            "expected a record",
                            element_path,
                            other.clone(),
                        )),
                    }
                }
            }
            other => errors.push(ValidationError::new(
                "expected a list",
                path.clone(),
                other.clone(),
            )),
        },
    }
}

fn check_scalar(value: &Value, kind: ScalarKind, path: &Path, errors: &mut Vec<ValidationError>) {
    let ok = match kind {
        ScalarKind::Str => value.is_string(),
        ScalarKind::Num => value.is_number(),
        ScalarKind::Bool => value.is_boolean(),
        ScalarKind::Any => true,
    };
    if !ok {
        errors.push(ValidationError::new(
            format!("expected {kind}"),
            path.clone(),
            value.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{ItemSchema, Refinement};
    use serde_json::json;

    fn opts() -> ValidationOptions {
        ValidationOptions::default()
    }

    fn people() -> FieldType {
        FieldType::list(
            ItemSchema::new()
                .field("name", FieldType::text())
                .field("age", FieldType::number()),
        )
    }

    #[test]
    fn scalar_match_is_valid() {
        let v = StructuralOracle.validate(&json!("hi"), &FieldType::text(), &opts());
        assert!(v.is_valid());
        assert_eq!(v.value, json!("hi"));
    }

    #[test]
    fn scalar_mismatch_reports_error() {
        let v = StructuralOracle.validate(&json!(5), &FieldType::text(), &opts());
        assert_eq!(v.errors.len(), 1);
        assert_eq!(v.errors[0].message, "expected string");
        assert_eq!(v.errors[0].actual, json!(5));
    }

    #[test]
    fn maybe_accepts_null_without_inner_check() {
        let v = StructuralOracle.validate(
            &Value::Null,
            &FieldType::maybe(FieldType::text()),
            &opts(),
        );
        assert!(v.is_valid());
    }

    #[test]
    fn maybe_checks_present_value() {
        let v = StructuralOracle.validate(&json!(5), &FieldType::maybe(FieldType::text()), &opts());
        assert!(!v.is_valid());
    }

    #[test]
    fn list_checks_each_field_with_attributed_path() {
        let v = StructuralOracle.validate(
            &json!([{"name": "ada", "age": 36}, {"name": 9, "age": "old"}]),
            &people(),
            &opts(),
        );
        assert_eq!(v.errors.len(), 2);
        assert_eq!(display_path(&v.errors[0].path), "1.name");
        assert_eq!(display_path(&v.errors[1].path), "1.age");
    }

    #[test]
    fn list_rejects_non_array() {
        let v = StructuralOracle.validate(&json!("nope"), &people(), &opts());
        assert_eq!(v.errors.len(), 1);
        assert_eq!(v.errors[0].message, "expected a list");
    }

    #[test]
    fn list_rejects_non_record_element() {
        let v = StructuralOracle.validate(&json!([42]), &people(), &opts());
        assert_eq!(v.errors.len(), 1);
        assert_eq!(v.errors[0].message, "expected a record");
        assert_eq!(display_path(&v.errors[0].path), "0");
    }

    #[test]
    fn missing_record_field_checked_as_null() {
        let v = StructuralOracle.validate(&json!([{}]), &people(), &opts());
        assert_eq!(v.errors.len(), 2, "both fields fail against null");
    }

    #[test]
    fn refinement_runs_on_sound_value() {
        let ty = FieldType::refined(
            people(),
            Refinement::new("length <= 1", |v| v.as_array().is_some_and(|a| a.len() <= 1)),
        );
        let v = StructuralOracle.validate(
            &json!([{"name": "a", "age": 1}, {"name": "b", "age": 2}]),
            &ty,
            &opts(),
        );
        assert_eq!(v.errors.len(), 1);
        assert_eq!(v.errors[0].message, "does not satisfy length <= 1");
    }

    #[test]
    fn refinement_suppressed_by_structural_errors() {
        let ty = FieldType::refined(
            people(),
            Refinement::new("never", |_| false),
        );
        let v = StructuralOracle.validate(&json!([{"name": 1, "age": 1}]), &ty, &opts());
        assert_eq!(v.errors.len(), 1, "only the structural error is reported");
        assert_eq!(v.errors[0].message, "expected string");
    }

    #[test]
    fn error_attribution_uses_options_path() {
        let options = ValidationOptions {
            path: vec!["members".into()],
            context: Value::Null,
        };
        let v = StructuralOracle.validate(&json!([{"name": 1, "age": 1}]), &people(), &options);
        assert_eq!(display_path(&v.errors[0].path), "members.0.name");
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError::new("expected string", vec![0.into(), "name".into()], json!(1));
        assert_eq!(err.to_string(), "0.name: expected string");
    }
}
