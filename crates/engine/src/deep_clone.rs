//! The clone engine: recursive deep copy of object graphs.
//!
//! Every value is classified at clone time, from its runtime type, into the
//! first matching category:
//!
//! 1. primitive/immutable scalar: returned unchanged
//! 2. callable: shared, never copied
//! 3. opaque handle: shared, never copied
//! 4. object whose type is tagged non-prototypable: returned as-is
//! 5. array: new array, same keys and order, each element deep-cloned
//! 6. foreign object (own duplication operator, not participating): the
//!    type's operator is called and its result returned as-is
//! 7. plain object: a new instance of the same runtime type is materialized
//!    without running the constructor, every field slot (inherited and
//!    private ones included) deep-cloned
//!
//! Shared substructure is not preserved: two fields pointing at one object
//! end up pointing at two distinct clones.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use prototyper_core::{
    Array, Capabilities, ObjectId, ObjectRef, PrototypeError, PrototypeResult, TypeDescriptor,
    Value,
};

use crate::config::{CyclePolicy, PrototyperConfig};

/// Category a value falls into for cloning purposes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    Primitive,
    Callable,
    Handle,
    Excluded,
    Container,
    Foreign,
    Plain,
}

/// Classifies `value` by its runtime type.
pub fn classify(value: &Value) -> Classification {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Text(_) => {
            Classification::Primitive
        }
        Value::Callable(_) => Classification::Callable,
        Value::Handle(_) => Classification::Handle,
        Value::Array(_) => Classification::Container,
        Value::Object(obj) => classify_type(&obj.type_ref()),
    }
}

/// Classification of instances of `ty`.
pub fn classify_type(ty: &TypeDescriptor) -> Classification {
    if ty.is_non_prototypable() {
        Classification::Excluded
    } else if ty.is_foreign() {
        Classification::Foreign
    } else {
        Classification::Plain
    }
}

/// Deep-clone engine. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct CloneEngine {
    config: PrototyperConfig,
}

impl CloneEngine {
    pub fn new(config: PrototyperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrototyperConfig {
        &self.config
    }

    /// Returns a copy of `value` in which every compound sub-value is
    /// independently owned.
    pub fn deep_clone(&self, value: &Value) -> PrototypeResult<Value> {
        self.clone_value(value, &mut ClonePath::new(self.config.cycle_policy))
    }

    /// Returns a new array with the same keys and order, each element deep-cloned.
    pub fn deep_clone_array(&self, array: &Array) -> PrototypeResult<Array> {
        self.clone_array(array, &mut ClonePath::new(self.config.cycle_policy))
    }

    /// Deep-clones one object. Excluded objects come back as the same instance;
    /// foreign objects come back as whatever their own operator produced.
    pub fn deep_clone_object(&self, object: &ObjectRef) -> PrototypeResult<ObjectRef> {
        self.clone_object(object, &mut ClonePath::new(self.config.cycle_policy))
    }

    fn clone_value(&self, value: &Value, path: &mut ClonePath) -> PrototypeResult<Value> {
        match value {
            Value::Array(array) => self.clone_array(array, path).map(Value::Array),
            Value::Object(obj) => self.clone_object(obj, path).map(Value::Object),
            // Scalars are already values; callables and handles are shared atoms.
            Value::Null
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Text(_)
            | Value::Callable(_)
            | Value::Handle(_) => Ok(value.clone()),
        }
    }

    fn clone_array(&self, array: &Array, path: &mut ClonePath) -> PrototypeResult<Array> {
        array.try_map_values(|v| self.clone_value(v, path))
    }

    fn clone_object(&self, obj: &ObjectRef, path: &mut ClonePath) -> PrototypeResult<ObjectRef> {
        let ty = obj.type_ref();

        if ty.is_non_prototypable() {
            trace!(type_name = ty.name(), "kept non-prototypable object");
            return Ok(obj.clone());
        }

        if let Some(native) = ty.native_duplicate().filter(|_| !ty.participates()) {
            trace!(type_name = ty.name(), "delegating to native duplication");
            return native(obj).map_err(|source| PrototypeError::NativeDuplicate {
                type_name: ty.name().to_string(),
                source,
            });
        }

        let snap = obj.snapshot();
        path.enter(snap.id, ty.name())?;
        let slots = snap
            .slots
            .iter()
            .map(|v| self.clone_value(v, path))
            .collect::<PrototypeResult<Vec<_>>>();
        path.leave(snap.id);

        let clone = ObjectRef::materialize(&snap.ty, slots?, HashMap::new());
        // Behaviors bound to the source follow the clone; the rest are shared.
        for (name, callable) in snap.behaviors {
            let callable = if callable.is_bound_to(obj) {
                callable.bind_to(&clone)
            } else {
                callable
            };
            clone.attach_behavior(name, callable);
        }
        trace!(
            type_name = ty.name(),
            source = %snap.id,
            clone = %clone.id(),
            "cloned object"
        );
        Ok(clone)
    }
}

/// Objects currently being cloned on the recursion path.
struct ClonePath {
    policy: CyclePolicy,
    active: HashSet<ObjectId>,
}

impl ClonePath {
    fn new(policy: CyclePolicy) -> Self {
        Self {
            policy,
            active: HashSet::new(),
        }
    }

    fn enter(&mut self, id: ObjectId, type_name: &str) -> PrototypeResult<()> {
        if self.policy == CyclePolicy::Unchecked {
            return Ok(());
        }
        if !self.active.insert(id) {
            tracing::debug!(type_name, object = %id, "reference cycle detected");
            return Err(PrototypeError::cycle(type_name));
        }
        Ok(())
    }

    fn leave(&mut self, id: ObjectId) {
        self.active.remove(&id);
    }
}
