//! Validation aggregation across child handles.
//!
//! Per-item errors and whole-list refinement errors are orthogonal failure
//! classes. Item-level errors always suppress the refinement check (there is
//! no point evaluating list-level constraints on an internally invalid
//! list), while the maybe/nully short-circuit bypasses both entirely.

use formtree_schema::{ListShape, Oracle, Record, Validation, ValidationOptions, Value};
use tracing::debug;

use crate::registry::ChildRegistry;

/// Whether every registered child reports a nully value.
///
/// Vacuously true for an empty registry.
#[must_use]
pub fn all_nully(registry: &ChildRegistry) -> bool {
    let mut nully = true;
    registry.for_each(|_, handle| {
        if !handle.borrow().is_value_nully() {
            nully = false;
        }
    });
    nully
}

/// Run the full validation pipeline over the registry.
///
/// 1. Maybe short-circuit: if the shape is optional and every child is
///    nully, clear child error states and succeed with a null value. No
///    per-child validation runs.
/// 2. Otherwise validate every child in canonical order, concatenating
///    errors and assembling each child's transformed value into its row.
/// 3. With zero per-child errors, canonicalize the assembled value and, if
///    the shape is refined, gate it through the whole-value oracle.
///
/// The caller records the error-display flag from the returned result.
pub fn validate_list(
    registry: &ChildRegistry,
    shape: &ListShape,
    oracle: &dyn Oracle,
    options: &ValidationOptions,
) -> Validation {
    if shape.is_maybe() && all_nully(registry) {
        registry.for_each(|_, handle| handle.borrow_mut().remove_errors());
        return Validation::ok(Value::Null);
    }

    let mut errors = Vec::new();
    let mut rows: Vec<Value> = Vec::new();
    registry.for_each(|position, handle| {
        let result = handle.borrow_mut().validate();
        errors.extend(result.errors);
        while rows.len() <= position.index {
            rows.push(Value::Object(Record::new()));
        }
        if let Value::Object(record) = &mut rows[position.index] {
            record.insert(position.field.clone(), result.value);
        }
    });

    let value = if errors.is_empty() {
        let canonical = shape.canonicalize(rows);
        if shape.is_refined() {
            let refined = oracle.validate(&canonical, shape.declared(), options);
            if !refined.is_valid() {
                debug!(count = refined.errors.len(), "whole-list refinement failed");
                errors.extend(refined.errors);
            }
        }
        canonical
    } else {
        Value::Array(rows)
    };

    Validation { errors, value }
}
