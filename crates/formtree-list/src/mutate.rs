//! Two-phase structural mutation: append and remove.
//!
//! Both protocols run the same way: phase 1 asks the configured interceptor
//! for a decision (proceed, veto, or deferred); phase 2 applies the edit.
//! Apply is a single sequential pipeline — compute the new value, commit it
//! to the owned state, invoke the after-hook, then notify the parent — so
//! the hook and the notification always observe the post-mutation value.
//!
//! A vetoed or rejected decision cancels the mutation with no partial
//! effects. Interceptor panics propagate: a hook that panics is a
//! configuration error, not a runtime condition to recover from.
//!
//! Between phase 1 and a deferred phase 2 the working value is not locked:
//! overlapping mutations interleave with last-applied-wins on the shared
//! value. Each apply reads the state fresh, so a stale pending mutation
//! edits the list as it is then, not as it was at request time.
//!
//! Remove notifies the parent with the path of the *removed* index even
//! though, after the splice, that index holds what was previously the next
//! element. Downstream consumers treat the path as "this position changed".

use std::cell::RefCell;
use std::rc::Rc;

use formtree_schema::{Path, PathSeg, Record, Value};
use tracing::{debug, trace};

use crate::component::ListState;
use crate::defer::Deferred;
use crate::options::{AddControl, RemoveControl};

/// Decision returned by an add interceptor.
pub enum AddDecision {
    /// Cancel the append.
    Veto,
    /// Append an empty record.
    UseDefault,
    /// Append this record verbatim.
    Item(Record),
    /// Decide later; rejection counts as a veto.
    Deferred(Deferred<AddOutcome>),
}

/// The settled outcome of an add decision.
#[derive(Clone, Debug, PartialEq)]
pub enum AddOutcome {
    /// Append an empty record.
    UseDefault,
    /// Append this record.
    Item(Record),
}

/// Decision returned by a remove interceptor.
pub enum RemoveDecision {
    /// Cancel the removal.
    Veto,
    /// Remove the element.
    Proceed,
    /// Decide later; `false` or rejection counts as a veto.
    Deferred(Deferred<bool>),
}

/// Add interceptor: receives the triggering event payload.
pub type BeforeAdd = Rc<dyn Fn(&Value) -> AddDecision>;
/// Post-add hook: receives the applied outcome.
pub type AfterAdd = Rc<dyn Fn(&AddOutcome)>;
/// Remove interceptor: receives the event payload, target index, and the
/// element's value at request time.
pub type BeforeRemove = Rc<dyn Fn(&Value, usize, &Value) -> RemoveDecision>;
/// Post-remove hook: receives the index and the removed element's value.
pub type AfterRemove = Rc<dyn Fn(usize, &Value)>;
/// Parent notification: the full new list plus the affected position's path.
pub type OnChange = Rc<dyn Fn(&Value, &Path)>;

/// Everything an apply needs from the owning component.
pub(crate) struct MutationHost {
    pub state: Rc<RefCell<ListState>>,
    pub path: Path,
    pub on_change: OnChange,
}

/// The working value as rows; null (or anything non-array) reads as empty.
pub(crate) fn as_rows(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows.clone(),
        _ => Vec::new(),
    }
}

pub(crate) fn run_add(host: MutationHost, control: &AddControl, event: &Value) {
    let decision = match &control.on_before {
        Some(hook) => hook(event),
        None => AddDecision::UseDefault,
    };
    let after = control.on_after.clone();
    match decision {
        AddDecision::Veto => trace!("add vetoed by interceptor"),
        AddDecision::UseDefault => apply_add(&host, after, AddOutcome::UseDefault),
        AddDecision::Item(record) => apply_add(&host, after, AddOutcome::Item(record)),
        AddDecision::Deferred(deferred) => {
            trace!("add deferred, awaiting interceptor settle");
            deferred.on_settle(move |outcome| apply_add(&host, after, outcome));
        }
    }
}

fn apply_add(host: &MutationHost, after: Option<AfterAdd>, outcome: AddOutcome) {
    let record = match &outcome {
        AddOutcome::Item(record) => record.clone(),
        AddOutcome::UseDefault => Record::new(),
    };
    let mut rows = as_rows(&host.state.borrow().value);
    rows.push(Value::Object(record));
    let last = rows.len() - 1;
    let committed = Value::Array(rows);

    host.state.borrow_mut().value = committed.clone();
    debug!(index = last, "appended list element");
    if let Some(after) = after {
        after(&outcome);
    }
    let mut path = host.path.clone();
    path.push(PathSeg::Index(last));
    (host.on_change)(&committed, &path);
}

pub(crate) fn run_remove(host: MutationHost, control: &RemoveControl, event: &Value, index: usize) {
    // The element's value at request time; hooks see this snapshot even if a
    // deferred decision lands after other mutations.
    let current = host
        .state
        .borrow()
        .value
        .get(index)
        .cloned()
        .unwrap_or(Value::Null);

    let decision = match &control.on_before {
        Some(hook) => hook(event, index, &current),
        None => RemoveDecision::Proceed,
    };
    let after = control.on_after.clone();
    match decision {
        RemoveDecision::Veto => trace!(index, "remove vetoed by interceptor"),
        RemoveDecision::Proceed => apply_remove(&host, after, index, current),
        RemoveDecision::Deferred(deferred) => {
            trace!(index, "remove deferred, awaiting interceptor settle");
            deferred.on_settle(move |proceed| {
                if proceed {
                    apply_remove(&host, after, index, current);
                } else {
                    trace!(index, "deferred remove declined");
                }
            });
        }
    }
}

fn apply_remove(host: &MutationHost, after: Option<AfterRemove>, index: usize, old_value: Value) {
    let mut rows = as_rows(&host.state.borrow().value);
    if index >= rows.len() {
        trace!(index, len = rows.len(), "remove index out of range, ignoring");
        return;
    }
    rows.remove(index);
    let committed = Value::Array(rows);

    host.state.borrow_mut().value = committed.clone();
    debug!(index, "removed list element");
    if let Some(after) = after {
        after(index, &old_value);
    }
    let mut path = host.path.clone();
    path.push(PathSeg::Index(index));
    (host.on_change)(&committed, &path);
}
