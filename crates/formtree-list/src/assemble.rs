//! Value assembly: registry contents back into an ordered list of records.
//!
//! Walks the registry in canonical order and writes each handle's current
//! value into `rows[index][field]`. Index gaps are padded with empty records
//! so assembly never fails on a partial registry; the result length is
//! always the maximum index seen plus one.

use formtree_schema::{Record, Value};

use crate::registry::ChildRegistry;

/// Assemble the raw list value from registered child handles.
///
/// The result is uncanonicalized; callers apply the declared type's
/// canonical construction afterwards.
#[must_use]
pub fn assemble(registry: &ChildRegistry) -> Vec<Value> {
    let mut rows: Vec<Value> = Vec::new();
    registry.for_each(|position, handle| {
        while rows.len() <= position.index {
            rows.push(Value::Object(Record::new()));
        }
        if let Value::Object(record) = &mut rows[position.index] {
            record.insert(position.field.clone(), handle.borrow().get_value());
        }
    });
    rows
}
