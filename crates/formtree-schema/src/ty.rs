//! Runtime type descriptors for form fields.
//!
//! A [`FieldType`] is a tagged variant: scalar leaves, a `Maybe` wrapper for
//! optionality, a `Refined` wrapper adding a named predicate on top of its
//! inner type, and `List` for a homogeneous sequence of records described by
//! an [`ItemSchema`].
//!
//! [`ListShape::resolve`] unwraps `Maybe`/`Refined` layers down to the list
//! core, however deep the wrapping, and records which wrappers were present.
//! A well-formed list-of-records type always resolves; anything else is a
//! caller bug surfaced as [`SchemaError::NotAList`].
//!
//! # Invariants
//!
//! 1. Item schema field order is insertion order and is the canonical field
//!    enumeration order for everything downstream (assembly, rendering).
//! 2. `canonicalize` never fails: non-record elements pass through unchanged
//!    and missing fields are filled with null.

use core::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::value::Record;

/// Scalar leaf kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    /// A string.
    Str,
    /// A JSON number.
    Num,
    /// A boolean.
    Bool,
    /// Any value, including null.
    Any,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Str => "string",
            Self::Num => "number",
            Self::Bool => "boolean",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// A named predicate refining an inner type.
#[derive(Clone)]
pub struct Refinement {
    name: String,
    predicate: Rc<dyn Fn(&Value) -> bool>,
}

impl Refinement {
    /// Create a refinement. The name appears in validation error messages.
    pub fn new(name: impl Into<String>, predicate: impl Fn(&Value) -> bool + 'static) -> Self {
        Self {
            name: name.into(),
            predicate: Rc::new(predicate),
        }
    }

    /// The refinement's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the predicate to a value.
    #[must_use]
    pub fn check(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement").field("name", &self.name).finish()
    }
}

/// A runtime type descriptor.
#[derive(Clone, Debug)]
pub enum FieldType {
    /// A scalar leaf.
    Scalar(ScalarKind),
    /// An optional inner type (value may be absent).
    Maybe(Box<FieldType>),
    /// An inner type plus a refinement predicate.
    Refined {
        /// The base type being refined.
        inner: Box<FieldType>,
        /// The predicate applied on top of the base type.
        refinement: Refinement,
    },
    /// A sequence of records, each matching the item schema.
    List(ItemSchema),
}

impl FieldType {
    /// A string scalar.
    #[must_use]
    pub fn text() -> Self {
        Self::Scalar(ScalarKind::Str)
    }

    /// A number scalar.
    #[must_use]
    pub fn number() -> Self {
        Self::Scalar(ScalarKind::Num)
    }

    /// A boolean scalar.
    #[must_use]
    pub fn boolean() -> Self {
        Self::Scalar(ScalarKind::Bool)
    }

    /// An unconstrained scalar.
    #[must_use]
    pub fn any() -> Self {
        Self::Scalar(ScalarKind::Any)
    }

    /// Wrap a type as optional.
    #[must_use]
    pub fn maybe(inner: FieldType) -> Self {
        Self::Maybe(Box::new(inner))
    }

    /// Wrap a type with a refinement predicate.
    #[must_use]
    pub fn refined(inner: FieldType, refinement: Refinement) -> Self {
        Self::Refined {
            inner: Box::new(inner),
            refinement,
        }
    }

    /// A list of records.
    #[must_use]
    pub fn list(items: ItemSchema) -> Self {
        Self::List(items)
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Maybe(_) => "maybe",
            Self::Refined { .. } => "refined",
            Self::List(_) => "list",
        }
    }
}

/// Ordered field definitions for one list element.
#[derive(Clone, Debug, Default)]
pub struct ItemSchema {
    fields: Vec<(String, FieldType)>,
}

impl ItemSchema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field definition, preserving insertion order.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = ty;
        } else {
            self.fields.push((name, ty));
        }
        self
    }

    /// Iterate fields in canonical (insertion) order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldType)> {
        self.fields.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Look up a field's type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldType> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Error resolving a declared type into a list shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// The declared type does not unwrap to a list of records.
    NotAList {
        /// The variant found at the core after unwrapping.
        found: &'static str,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAList { found } => {
                write!(f, "declared type does not unwrap to a list (found {found})")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// The resolved shape of a declared list type.
///
/// Captures whether any `Maybe` or `Refined` wrapper was present at any
/// depth, plus the item schema at the core.
#[derive(Clone, Debug)]
pub struct ListShape {
    declared: FieldType,
    is_maybe: bool,
    is_refined: bool,
    items: ItemSchema,
}

impl ListShape {
    /// Unwrap `Maybe`/`Refined` layers down to the list core.
    ///
    /// Traversal depth is data-driven; wrappers may nest in any order.
    pub fn resolve(ty: &FieldType) -> Result<Self, SchemaError> {
        let mut is_maybe = false;
        let mut is_refined = false;
        let mut cursor = ty;
        loop {
            match cursor {
                FieldType::Maybe(inner) => {
                    is_maybe = true;
                    cursor = inner;
                }
                FieldType::Refined { inner, .. } => {
                    is_refined = true;
                    cursor = inner;
                }
                FieldType::List(items) => {
                    return Ok(Self {
                        declared: ty.clone(),
                        is_maybe,
                        is_refined,
                        items: items.clone(),
                    });
                }
                other => {
                    return Err(SchemaError::NotAList {
                        found: other.variant_name(),
                    });
                }
            }
        }
    }

    /// The full declared type, wrappers included.
    #[must_use]
    pub fn declared(&self) -> &FieldType {
        &self.declared
    }

    /// Whether the whole list is optional.
    #[must_use]
    pub fn is_maybe(&self) -> bool {
        self.is_maybe
    }

    /// Whether the declared type carries a refinement predicate.
    #[must_use]
    pub fn is_refined(&self) -> bool {
        self.is_refined
    }

    /// The element record's field definitions.
    #[must_use]
    pub fn items(&self) -> &ItemSchema {
        &self.items
    }

    /// Construct the canonical sequence value from a raw assembled one.
    ///
    /// Each record is rebuilt with fields in item-schema order; missing
    /// fields become null, fields not in the schema are dropped. Non-record
    /// elements pass through unchanged.
    #[must_use]
    pub fn canonicalize(&self, raw: Vec<Value>) -> Value {
        let rows = raw
            .into_iter()
            .map(|element| match element {
                Value::Object(record) => {
                    let mut canonical = Record::new();
                    for (name, _) in self.items.fields() {
                        let value = record.get(name).cloned().unwrap_or(Value::Null);
                        canonical.insert(name.to_owned(), value);
                    }
                    Value::Object(canonical)
                }
                other => other,
            })
            .collect();
        Value::Array(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> ItemSchema {
        ItemSchema::new()
            .field("name", FieldType::text())
            .field("age", FieldType::number())
    }

    fn non_empty() -> Refinement {
        Refinement::new("non-empty", |v| v.as_array().is_some_and(|a| !a.is_empty()))
    }

    #[test]
    fn resolve_bare_list() {
        let shape = ListShape::resolve(&FieldType::list(person())).unwrap();
        assert!(!shape.is_maybe());
        assert!(!shape.is_refined());
        assert_eq!(shape.items().len(), 2);
    }

    #[test]
    fn resolve_maybe_of_refined_list() {
        let ty = FieldType::maybe(FieldType::refined(FieldType::list(person()), non_empty()));
        let shape = ListShape::resolve(&ty).unwrap();
        assert!(shape.is_maybe());
        assert!(shape.is_refined());
    }

    #[test]
    fn resolve_refined_of_maybe_list() {
        // Wrapper order is data-driven, not fixed.
        let ty = FieldType::refined(FieldType::maybe(FieldType::list(person())), non_empty());
        let shape = ListShape::resolve(&ty).unwrap();
        assert!(shape.is_maybe());
        assert!(shape.is_refined());
    }

    #[test]
    fn resolve_deeply_nested_wrappers() {
        let ty = FieldType::maybe(FieldType::maybe(FieldType::refined(
            FieldType::list(person()),
            non_empty(),
        )));
        let shape = ListShape::resolve(&ty).unwrap();
        assert!(shape.is_maybe());
        assert!(shape.is_refined());
    }

    #[test]
    fn resolve_rejects_scalar_core() {
        let err = ListShape::resolve(&FieldType::maybe(FieldType::text())).unwrap_err();
        assert_eq!(err, SchemaError::NotAList { found: "scalar" });
        assert!(err.to_string().contains("scalar"));
    }

    #[test]
    fn item_schema_preserves_insertion_order() {
        let schema = person();
        let names: Vec<&str> = schema.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "age"]);
    }

    #[test]
    fn item_schema_duplicate_field_replaces_in_place() {
        let schema = person().field("name", FieldType::any());
        assert_eq!(schema.len(), 2);
        let names: Vec<&str> = schema.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "age"], "order must not change");
        assert!(matches!(
            schema.get("name"),
            Some(FieldType::Scalar(ScalarKind::Any))
        ));
    }

    #[test]
    fn canonicalize_orders_and_fills_fields() {
        let shape = ListShape::resolve(&FieldType::list(person())).unwrap();
        let raw = vec![json!({"age": 30}), json!({"name": "ada", "extra": 1})];
        let canonical = shape.canonicalize(raw);
        assert_eq!(
            canonical,
            json!([
                {"name": null, "age": 30},
                {"name": "ada", "age": null},
            ])
        );
    }

    #[test]
    fn canonicalize_passes_non_records_through() {
        let shape = ListShape::resolve(&FieldType::list(person())).unwrap();
        let canonical = shape.canonicalize(vec![json!(7)]);
        assert_eq!(canonical, json!([7]));
    }

    #[test]
    fn refinement_debug_shows_name_only() {
        let r = non_empty();
        assert_eq!(format!("{r:?}"), "Refinement { name: \"non-empty\" }");
    }
}
