//! List-of-records component orchestration.
//!
//! [`ListField`] wires the registry, assembler, validation aggregator, and
//! mutation protocols against the owning form tree's lifecycle: the parent
//! supplies the declared type, options, current value, inherited context,
//! and a change callback; the component hands back child input descriptors
//! for rendering and collects values and errors from the registered child
//! handles.
//!
//! # Lifecycle
//!
//! The working value is owned exclusively by the component and rewritten
//! wholesale, never mutated in place. The registry is rebuilt every render
//! cycle: call [`ListField::begin_render`], derive rows from
//! [`ListField::inputs`] (or [`ListField::locals`]), and register one handle
//! per rendered child. Children read their slice through the inputs and
//! report edits back through the bound change callback; they never write
//! the list directly.

use std::cell::RefCell;
use std::rc::Rc;

use formtree_schema::{
    FieldType, ListShape, Oracle, Path, PathSeg, Record, SchemaError, StructuralOracle,
    Validation, ValidationOptions, Value,
};

use crate::aggregate::{all_nully, validate_list};
use crate::assemble::assemble;
use crate::mutate::{self, MutationHost, OnChange};
use crate::options::{Auto, I18n, ListOptions, humanize, merge};
use crate::registry::{ChildRegistry, Position};
use crate::ChildRef;

/// Context inherited from the owning form tree.
#[derive(Clone, Debug)]
pub struct FieldContext {
    /// Opaque application context, passed through untouched.
    pub context: Value,
    /// Label-generation mode.
    pub auto: Auto,
    /// Opaque renderer configuration.
    pub config: Value,
    /// Label for this field.
    pub label: Option<String>,
    /// Localized decorations.
    pub i18n: I18n,
    /// Opaque stylesheet.
    pub stylesheet: Value,
    /// Opaque template table.
    pub templates: Value,
    /// Path from the form-tree root to this field.
    pub path: Path,
}

impl Default for FieldContext {
    fn default() -> Self {
        Self {
            context: Value::Null,
            auto: Auto::Labels,
            config: Value::Null,
            label: None,
            i18n: I18n::default(),
            stylesheet: Value::Null,
            templates: Value::Null,
            path: Path::new(),
        }
    }
}

/// The component's owned state: working value plus error-display flag.
pub(crate) struct ListState {
    pub value: Value,
    pub has_error: bool,
}

/// One child component descriptor, parametrized for rendering.
pub struct ChildInput {
    /// The child's structured registry key.
    pub position: Position,
    /// The item field's declared type.
    pub field_type: FieldType,
    /// Per-field sub-options (opaque).
    pub options: Value,
    /// The element's current field value.
    pub value: Value,
    /// Change callback bound to this position: `(new field value, origin path)`.
    pub on_change: Rc<dyn Fn(Value, Path)>,
    /// Derived context for the child.
    pub ctx: FieldContext,
}

impl std::fmt::Debug for ChildInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildInput")
            .field("position", &self.position)
            .field("value", &self.value)
            .finish()
    }
}

/// A resolved add/remove button descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemButton {
    /// Display label.
    pub label: String,
    /// Opaque placement token.
    pub position: Option<Value>,
    /// Opaque style for the button.
    pub stylesheet: Value,
}

/// Renderer-facing bundle: everything a list template needs.
pub struct ListLocals {
    /// One row of child inputs per current element.
    pub inputs: Vec<Vec<ChildInput>>,
    /// Add-element button descriptor; presses go to [`ListField::request_add`].
    pub add_item: ItemButton,
    /// Remove-element button descriptor; presses go to
    /// [`ListField::request_remove`].
    pub remove_item: ItemButton,
    /// Current error-display flag.
    pub has_error: bool,
    /// Resolved component label.
    pub label: Option<String>,
    /// Opaque template override, if any.
    pub template: Option<Value>,
    /// Resolved stylesheet.
    pub stylesheet: Value,
}

/// The array-of-records form field component.
pub struct ListField {
    shape: ListShape,
    options: ListOptions,
    ctx: FieldContext,
    state: Rc<RefCell<ListState>>,
    registry: ChildRegistry,
    oracle: Rc<dyn Oracle>,
    on_change: OnChange,
}

impl ListField {
    /// Build a list field from its declared type and props.
    ///
    /// Fails if the declared type does not unwrap to a list of records —
    /// that is a configuration bug in the caller, not a runtime condition.
    pub fn new(
        ty: &FieldType,
        options: ListOptions,
        value: Value,
        ctx: FieldContext,
        on_change: OnChange,
    ) -> Result<Self, SchemaError> {
        let shape = ListShape::resolve(ty)?;
        Ok(Self {
            shape,
            options,
            ctx,
            state: Rc::new(RefCell::new(ListState {
                value,
                has_error: false,
            })),
            registry: ChildRegistry::new(),
            oracle: Rc::new(StructuralOracle),
            on_change,
        })
    }

    /// Replace the whole-value validation oracle.
    #[must_use]
    pub fn with_oracle(mut self, oracle: Rc<dyn Oracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// The resolved shape of the declared type.
    #[must_use]
    pub fn shape(&self) -> &ListShape {
        &self.shape
    }

    /// The current working value.
    #[must_use]
    pub fn value(&self) -> Value {
        self.state.borrow().value.clone()
    }

    /// Replace the working value (parent re-render with new props).
    pub fn set_value(&self, value: Value) {
        self.state.borrow_mut().value = value;
    }

    /// Current error-display flag.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.state.borrow().has_error
    }

    // ── render-cycle registry management ────────────────────────────

    /// Start a render cycle: drop every registered handle.
    pub fn begin_render(&mut self) {
        self.registry.clear();
    }

    /// Register a rendered child handle at its position.
    pub fn register_child(&mut self, position: Position, handle: ChildRef) {
        self.registry.register(position, handle);
    }

    /// Register a child handle under a composite `"<index>:<field>"` key.
    /// Malformed keys are skipped.
    pub fn register_child_keyed(&mut self, key: &str, handle: ChildRef) {
        self.registry.register_keyed(key, handle);
    }

    // ── public value/validation contract ────────────────────────────

    /// Whether every registered child reports a nully value.
    ///
    /// Parent maybe-wrappers use this to decide whether to display the list
    /// at all.
    #[must_use]
    pub fn is_value_nully(&self) -> bool {
        all_nully(&self.registry)
    }

    /// Clear this component's error-display flag and every child's error
    /// state.
    pub fn remove_errors(&self) {
        self.state.borrow_mut().has_error = false;
        self.registry
            .for_each(|_, handle| handle.borrow_mut().remove_errors());
    }

    /// Assemble and canonicalize the current value from child handles.
    ///
    /// Runs no validation and mutates no error state.
    #[must_use]
    pub fn get_value(&self) -> Value {
        self.shape.canonicalize(assemble(&self.registry))
    }

    /// Validate all children plus the whole-list refinement.
    ///
    /// Side effect: updates the error-display flag from the aggregate
    /// result.
    pub fn validate(&self) -> Validation {
        let options = ValidationOptions {
            path: self.ctx.path.clone(),
            context: self.ctx.context.clone(),
        };
        let result = validate_list(&self.registry, &self.shape, self.oracle.as_ref(), &options);
        self.state.borrow_mut().has_error = !result.errors.is_empty();
        result
    }

    // ── change propagation ──────────────────────────────────────────

    /// Merge a child's field edit into the working value and forward it to
    /// the parent with the child's origin path.
    pub fn on_child_change(&self, position: &Position, field_value: Value, origin_path: &Path) {
        let committed = merge_field(&self.state, position, field_value);
        (self.on_change)(&committed, origin_path);
    }

    // ── structural mutation entry points ────────────────────────────

    /// Request an element append. Phase 1 consults the configured add
    /// interceptor; phase 2 commits, runs the after-hook, and notifies the
    /// parent with the new last index's path.
    pub fn request_add(&self, event: &Value) {
        mutate::run_add(self.mutation_host(), &self.options.add_item, event);
    }

    /// Request removal of the element at `index`. Phase 1 consults the
    /// configured remove interceptor with the element's current value;
    /// phase 2 splices, runs the after-hook, and notifies the parent with
    /// the removed index's path.
    pub fn request_remove(&self, event: &Value, index: usize) {
        mutate::run_remove(self.mutation_host(), &self.options.remove_item, event, index);
    }

    fn mutation_host(&self) -> MutationHost {
        MutationHost {
            state: Rc::clone(&self.state),
            path: self.ctx.path.clone(),
            on_change: Rc::clone(&self.on_change),
        }
    }

    // ── option/context resolution ───────────────────────────────────

    fn auto(&self) -> Auto {
        self.options.auto.unwrap_or(self.ctx.auto)
    }

    fn label(&self) -> Option<String> {
        self.options.label.clone().or_else(|| self.ctx.label.clone())
    }

    fn stylesheet(&self) -> Value {
        self.options
            .stylesheet
            .clone()
            .unwrap_or_else(|| self.ctx.stylesheet.clone())
    }

    fn templates(&self) -> Value {
        match &self.options.templates {
            Some(overrides) => merge(&self.ctx.templates, overrides),
            None => self.ctx.templates.clone(),
        }
    }

    fn config(&self) -> Value {
        match &self.options.config {
            Some(overrides) => merge(&self.ctx.config, overrides),
            None => self.ctx.config.clone(),
        }
    }

    // ── rendering inputs ────────────────────────────────────────────

    /// Derive one row of child input descriptors per current element.
    ///
    /// Fields appear in item-schema order; each input carries a composite
    /// position, the field's type and sub-options, the element's current
    /// field value, a change callback bound to the position, and a derived
    /// child context with an extended path.
    #[must_use]
    pub fn inputs(&self) -> Vec<Vec<ChildInput>> {
        let rows = mutate::as_rows(&self.state.borrow().value);
        let auto = self.auto();
        let stylesheet = self.stylesheet();
        let templates = self.templates();
        let config = self.config();

        rows.iter()
            .enumerate()
            .map(|(index, element)| {
                self.shape
                    .items()
                    .fields()
                    .map(|(name, field_type)| {
                        let position = Position::new(index, name);
                        let value = element.get(name).cloned().unwrap_or(Value::Null);
                        let mut path = self.ctx.path.clone();
                        path.push(PathSeg::Index(index));
                        path.push(PathSeg::Key(name.to_owned()));

                        ChildInput {
                            on_change: self.bind_child_change(position.clone()),
                            position,
                            field_type: field_type.clone(),
                            options: self.options.field_options(name),
                            value,
                            ctx: FieldContext {
                                context: self.ctx.context.clone(),
                                auto,
                                config: config.clone(),
                                label: Some(humanize(name)),
                                i18n: self.ctx.i18n.clone(),
                                stylesheet: stylesheet.clone(),
                                templates: templates.clone(),
                                path,
                            },
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Build the renderer-facing locals bundle.
    #[must_use]
    pub fn locals(&self) -> ListLocals {
        let stylesheet = self.stylesheet();
        ListLocals {
            inputs: self.inputs(),
            add_item: resolve_button(&self.options.add_item.label, "addItem",
                &self.options.add_item.position, &self.options.add_item.stylesheet, &stylesheet),
            remove_item: resolve_button(&self.options.remove_item.label, "removeItem",
                &self.options.remove_item.position, &self.options.remove_item.stylesheet, &stylesheet),
            has_error: self.has_error(),
            label: self.label(),
            template: self.options.template.clone(),
            stylesheet,
        }
    }

    fn bind_child_change(&self, position: Position) -> Rc<dyn Fn(Value, Path)> {
        let state = Rc::clone(&self.state);
        let parent = Rc::clone(&self.on_change);
        Rc::new(move |field_value, origin_path| {
            let committed = merge_field(&state, &position, field_value);
            parent(&committed, &origin_path);
        })
    }
}

impl std::fmt::Debug for ListField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListField")
            .field("shape", &self.shape)
            .field("registry", &self.registry)
            .field("has_error", &self.has_error())
            .finish()
    }
}

/// Commit a single-field edit into the working value, growing the row list
/// with empty records if the index is past the end. Returns the committed
/// value; the state is updated before the caller notifies anyone.
fn merge_field(state: &Rc<RefCell<ListState>>, position: &Position, field_value: Value) -> Value {
    let committed = {
        let current = &state.borrow().value;
        let mut rows = mutate::as_rows(current);
        while rows.len() <= position.index {
            rows.push(Value::Object(Record::new()));
        }
        if let Value::Object(record) = &mut rows[position.index] {
            record.insert(position.field.clone(), field_value);
        }
        Value::Array(rows)
    };
    state.borrow_mut().value = committed.clone();
    committed
}

fn resolve_button(
    label: &Option<String>,
    default_name: &str,
    position: &Option<Value>,
    style_override: &Option<Value>,
    stylesheet: &Value,
) -> ItemButton {
    ItemButton {
        label: label.clone().unwrap_or_else(|| humanize(default_name)),
        position: position.clone(),
        stylesheet: style_override.clone().unwrap_or_else(|| {
            stylesheet.get(default_name).cloned().unwrap_or(Value::Null)
        }),
    }
}
