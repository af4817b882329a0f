#![forbid(unsafe_code)]

//! Runtime type descriptors and validation primitives for formtree.
//!
//! Form values are dynamic ([`serde_json::Value`]); this crate supplies the
//! type layer that describes them at runtime: a tagged [`FieldType`] with
//! optionality ([`FieldType::Maybe`]) and refinement ([`FieldType::Refined`])
//! wrappers, the [`ListShape`] resolver that unwraps those layers down to a
//! list-of-records core, and the [`Oracle`] contract used to validate a whole
//! value against its declared type.

pub mod ty;
pub mod validate;
pub mod value;

pub use serde_json::Value;
pub use ty::{FieldType, ItemSchema, ListShape, Refinement, ScalarKind, SchemaError};
pub use validate::{Oracle, StructuralOracle, Validation, ValidationError, ValidationOptions};
pub use value::{Path, PathSeg, Record, display_path, is_nully};
