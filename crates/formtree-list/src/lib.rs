#![forbid(unsafe_code)]

//! Array-of-records form field core.
//!
//! A [`ListField`] binds a dynamically-sized, homogeneous list of sub-forms
//! into a larger declarative form tree: it materializes one child input
//! descriptor per element and field, collects per-element values and
//! validation errors back into a single list value, and mediates structural
//! edits (append / remove) through a two-phase interceptor protocol that
//! supports synchronous and deferred confirmation hooks.
//!
//! The concrete rendering of rows and buttons, and the per-field editor
//! implementations, live outside this crate: editors plug in through the
//! [`ChildHandle`] contract, and renderers consume [`ListLocals`].
//!
//! Everything here is single-threaded and event-driven; shared state uses
//! `Rc<RefCell<_>>` and nothing blocks.

pub mod aggregate;
pub mod assemble;
pub mod component;
pub mod defer;
pub mod mutate;
pub mod options;
pub mod registry;

use std::cell::RefCell;
use std::rc::Rc;

use formtree_schema::{Validation, Value};

pub use component::{ChildInput, FieldContext, ItemButton, ListField, ListLocals};
pub use defer::Deferred;
pub use mutate::{AddDecision, AddOutcome, OnChange, RemoveDecision};
pub use options::{AddControl, Auto, I18n, ListOptions, RemoveControl, humanize, merge};
pub use registry::{ChildRegistry, Position};

/// A live, addressable sub-form instance.
///
/// The list core never inspects an editor's internals; it only pulls value
/// and validation state through this contract. Children read their slice of
/// the list and report edits back through callbacks; they never write the
/// list directly.
pub trait ChildHandle {
    /// The child's current value, without validating.
    fn get_value(&self) -> Value;

    /// Validate the child, returning its errors and transformed value.
    fn validate(&mut self) -> Validation;

    /// Whether the child's value counts as absent.
    fn is_value_nully(&self) -> bool;

    /// Clear the child's error-display state, recursively.
    fn remove_errors(&mut self);
}

/// Shared handle to a child sub-form.
pub type ChildRef = Rc<RefCell<dyn ChildHandle>>;

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use formtree_schema::{Validation, ValidationError, Value, is_nully};

    use crate::ChildHandle;

    /// Scriptable child for unit tests: fixed value, fixed errors, call counts.
    pub struct MockChild {
        pub value: Value,
        pub errors: Vec<ValidationError>,
        pub nully: bool,
        pub validate_calls: usize,
        pub errors_cleared: usize,
    }

    impl MockChild {
        pub fn of(value: Value) -> Rc<RefCell<MockChild>> {
            let nully = is_nully(&value);
            Rc::new(RefCell::new(Self {
                value,
                errors: Vec::new(),
                nully,
                validate_calls: 0,
                errors_cleared: 0,
            }))
        }

        pub fn failing(value: Value, message: &str) -> Rc<RefCell<MockChild>> {
            let child = Self {
                errors: vec![ValidationError::new(message, Vec::new(), value.clone())],
                nully: false,
                value,
                validate_calls: 0,
                errors_cleared: 0,
            };
            Rc::new(RefCell::new(child))
        }
    }

    impl ChildHandle for MockChild {
        fn get_value(&self) -> Value {
            self.value.clone()
        }

        fn validate(&mut self) -> Validation {
            self.validate_calls += 1;
            Validation {
                errors: self.errors.clone(),
                value: self.value.clone(),
            }
        }

        fn is_value_nully(&self) -> bool {
            self.nully
        }

        fn remove_errors(&mut self) {
            self.errors_cleared += 1;
        }
    }
}
