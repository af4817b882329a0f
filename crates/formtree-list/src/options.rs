//! Component options, mutation hook controls, and presentation pass-throughs.
//!
//! Stylesheets, templates, config, and per-field sub-options are opaque
//! values owned by the rendering layer; this module only implements the
//! resolution rules: option-level values override inherited context values,
//! templates merge shallowly, per-field options default to an empty object.

use ahash::AHashMap;
use formtree_schema::{Record, Value};

use crate::mutate::{AfterAdd, AfterRemove, BeforeAdd, BeforeRemove};

/// Label-generation mode inherited by child contexts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Auto {
    /// Generate labels from field names.
    #[default]
    Labels,
    /// Generate placeholders instead of labels.
    Placeholders,
    /// Generate nothing.
    None,
}

/// Localized decorations passed through to child contexts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct I18n {
    /// Suffix appended to optional field labels.
    pub optional: String,
    /// Suffix appended to required field labels.
    pub required: String,
}

impl Default for I18n {
    fn default() -> Self {
        Self {
            optional: " (optional)".to_owned(),
            required: String::new(),
        }
    }
}

/// Configuration for the add-element control.
#[derive(Clone, Default)]
pub struct AddControl {
    /// Pre-mutation interceptor.
    pub on_before: Option<BeforeAdd>,
    /// Post-mutation hook.
    pub on_after: Option<AfterAdd>,
    /// Button label; defaults to a humanized `"addItem"`.
    pub label: Option<String>,
    /// Opaque placement token for the renderer.
    pub position: Option<Value>,
    /// Opaque style override; defaults to the stylesheet's `addItem` entry.
    pub stylesheet: Option<Value>,
}

impl AddControl {
    /// Set the pre-mutation interceptor.
    #[must_use]
    pub fn on_before(
        mut self,
        hook: impl Fn(&Value) -> crate::mutate::AddDecision + 'static,
    ) -> Self {
        self.on_before = Some(std::rc::Rc::new(hook));
        self
    }

    /// Set the post-mutation hook.
    #[must_use]
    pub fn on_after(mut self, hook: impl Fn(&crate::mutate::AddOutcome) + 'static) -> Self {
        self.on_after = Some(std::rc::Rc::new(hook));
        self
    }

    /// Set the button label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the style override.
    #[must_use]
    pub fn stylesheet(mut self, stylesheet: Value) -> Self {
        self.stylesheet = Some(stylesheet);
        self
    }
}

impl std::fmt::Debug for AddControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddControl")
            .field("on_before", &self.on_before.is_some())
            .field("on_after", &self.on_after.is_some())
            .field("label", &self.label)
            .finish()
    }
}

/// Configuration for the remove-element control.
#[derive(Clone, Default)]
pub struct RemoveControl {
    /// Pre-mutation interceptor.
    pub on_before: Option<BeforeRemove>,
    /// Post-mutation hook.
    pub on_after: Option<AfterRemove>,
    /// Button label; defaults to a humanized `"removeItem"`.
    pub label: Option<String>,
    /// Opaque placement token for the renderer.
    pub position: Option<Value>,
    /// Opaque style override; defaults to the stylesheet's `removeItem` entry.
    pub stylesheet: Option<Value>,
}

impl RemoveControl {
    /// Set the pre-mutation interceptor.
    #[must_use]
    pub fn on_before(
        mut self,
        hook: impl Fn(&Value, usize, &Value) -> crate::mutate::RemoveDecision + 'static,
    ) -> Self {
        self.on_before = Some(std::rc::Rc::new(hook));
        self
    }

    /// Set the post-mutation hook.
    #[must_use]
    pub fn on_after(mut self, hook: impl Fn(usize, &Value) + 'static) -> Self {
        self.on_after = Some(std::rc::Rc::new(hook));
        self
    }

    /// Set the button label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the style override.
    #[must_use]
    pub fn stylesheet(mut self, stylesheet: Value) -> Self {
        self.stylesheet = Some(stylesheet);
        self
    }
}

impl std::fmt::Debug for RemoveControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoveControl")
            .field("on_before", &self.on_before.is_some())
            .field("on_after", &self.on_after.is_some())
            .field("label", &self.label)
            .finish()
    }
}

/// Options for a list field, supplied by the embedding application.
#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    /// Label-generation override; falls back to the inherited context.
    pub auto: Option<Auto>,
    /// Component label override.
    pub label: Option<String>,
    /// Opaque template override for the renderer.
    pub template: Option<Value>,
    /// Opaque stylesheet override; falls back to the inherited context.
    pub stylesheet: Option<Value>,
    /// Opaque template overrides, merged over the inherited templates.
    pub templates: Option<Value>,
    /// Opaque config overrides, merged over the inherited config.
    pub config: Option<Value>,
    /// Per-field sub-options, keyed by field name.
    pub fields: AHashMap<String, Value>,
    /// Add-element control configuration.
    pub add_item: AddControl,
    /// Remove-element control configuration.
    pub remove_item: RemoveControl,
}

impl ListOptions {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label-generation mode.
    #[must_use]
    pub fn auto(mut self, auto: Auto) -> Self {
        self.auto = Some(auto);
        self
    }

    /// Set the component label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the stylesheet override.
    #[must_use]
    pub fn stylesheet(mut self, stylesheet: Value) -> Self {
        self.stylesheet = Some(stylesheet);
        self
    }

    /// Add per-field sub-options.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, options: Value) -> Self {
        self.fields.insert(name.into(), options);
        self
    }

    /// Set the add-element control.
    #[must_use]
    pub fn add_item(mut self, control: AddControl) -> Self {
        self.add_item = control;
        self
    }

    /// Set the remove-element control.
    #[must_use]
    pub fn remove_item(mut self, control: RemoveControl) -> Self {
        self.remove_item = control;
        self
    }

    /// Sub-options for a field, defaulting to an empty options object.
    #[must_use]
    pub fn field_options(&self, name: &str) -> Value {
        self.fields
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::Object(Record::new()))
    }
}

/// Shallow merge of two opaque option objects.
///
/// Object keys in `overlay` win; a null overlay leaves `base` untouched; any
/// other overlay replaces `base` wholesale.
#[must_use]
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(a), Value::Object(b)) => {
            let mut merged = a.clone();
            for (key, value) in b {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        (_, Value::Null) => base.clone(),
        _ => overlay.clone(),
    }
}

/// Turn a field identifier into a display label: `"addItem"` and
/// `"add_item"` both become `"Add item"`.
#[must_use]
pub fn humanize(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in name.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.extend(c.to_lowercase());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut out = words.join(" ");
    if let Some(first) = out.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn humanize_camel_case() {
        assert_eq!(humanize("addItem"), "Add item");
        assert_eq!(humanize("removeItem"), "Remove item");
        assert_eq!(humanize("firstName"), "First name");
    }

    #[test]
    fn humanize_snake_and_kebab_case() {
        assert_eq!(humanize("add_item"), "Add item");
        assert_eq!(humanize("add-item"), "Add item");
    }

    #[test]
    fn humanize_single_word_and_empty() {
        assert_eq!(humanize("name"), "Name");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn merge_overlay_keys_win() {
        let base = json!({"a": 1, "b": 2});
        let overlay = json!({"b": 3, "c": 4});
        assert_eq!(merge(&base, &overlay), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn merge_null_overlay_keeps_base() {
        let base = json!({"a": 1});
        assert_eq!(merge(&base, &Value::Null), base);
    }

    #[test]
    fn merge_non_object_overlay_replaces() {
        assert_eq!(merge(&json!({"a": 1}), &json!("style")), json!("style"));
    }

    #[test]
    fn field_options_default_to_empty_object() {
        let options = ListOptions::new().field("name", json!({"editable": false}));
        assert_eq!(options.field_options("name"), json!({"editable": false}));
        assert_eq!(options.field_options("age"), json!({}));
    }

    #[test]
    fn control_debug_reports_hook_presence() {
        let control = AddControl::default().on_before(|_| crate::mutate::AddDecision::Veto);
        let debug = format!("{control:?}");
        assert!(debug.contains("on_before: true"));
        assert!(debug.contains("on_after: false"));
    }
}
