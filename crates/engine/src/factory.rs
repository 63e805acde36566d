//! The prototype factory: a deep clone with field and behavior overrides
//! layered on top.

use std::collections::HashMap;

use tracing::debug;

use prototyper_core::{
    Callable, Capabilities, InvalidOverride, ObjectRef, PrototypeResult, TypeDescriptor, Value,
    is_valid_member_name,
};

use crate::deep_clone::CloneEngine;

/// Field and behavior overrides applied to the top-level clone only.
///
/// Both maps are unordered; callers must not rely on the order in which
/// overlapping overrides are applied.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    fields: HashMap<String, Value>,
    behaviors: HashMap<String, Value>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the field `name` on the clone with `value`.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Attach `value` (which must be a callable) to the clone as behavior `name`.
    pub fn with_behavior(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.behaviors.insert(name.into(), value.into());
        self
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    pub fn behaviors(&self) -> &HashMap<String, Value> {
        &self.behaviors
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.behaviors.is_empty()
    }
}

/// Clones `base` and applies `overrides` to the clone.
///
/// Without overrides this is exactly [`CloneEngine::deep_clone_object`].
/// Every override is validated against the clone's runtime type before any
/// of them is applied; on rejection the clone is dropped.
pub fn create_prototype(
    engine: &CloneEngine,
    base: &ObjectRef,
    overrides: &Overrides,
) -> PrototypeResult<ObjectRef> {
    if overrides.is_empty() {
        return engine.deep_clone_object(base);
    }

    let base_ty = base.type_ref();
    if base_ty.is_non_prototypable() {
        return Err(InvalidOverride::excluded(base_ty.name()).into());
    }

    let clone = engine.deep_clone_object(base)?;
    let ty = clone.type_ref();

    validate_fields(&ty, overrides.fields())?;
    let behaviors = validate_behaviors(overrides.behaviors())?;

    for (name, value) in overrides.fields() {
        clone.set(name, value.clone())?;
    }
    for (name, callable) in behaviors {
        clone.attach_behavior(name, callable.bind_to(&clone));
    }

    debug!(
        type_name = ty.name(),
        source = %base.id(),
        prototype = %clone.id(),
        fields = overrides.fields().len(),
        behaviors = overrides.behaviors().len(),
        "applied prototype overrides"
    );
    Ok(clone)
}

fn validate_fields(
    ty: &TypeDescriptor,
    fields: &HashMap<String, Value>,
) -> Result<(), InvalidOverride> {
    match fields.keys().find(|name| !ty.has_field(name)) {
        Some(name) => Err(InvalidOverride::unknown_field(name.as_str(), ty.name())),
        None => Ok(()),
    }
}

fn validate_behaviors(
    behaviors: &HashMap<String, Value>,
) -> Result<Vec<(&str, &Callable)>, InvalidOverride> {
    behaviors
        .iter()
        .map(|(name, value)| {
            if !is_valid_member_name(name) {
                return Err(InvalidOverride::member_name(name.as_str()));
            }
            let callable = value.as_callable().ok_or_else(|| {
                InvalidOverride::not_callable(name.as_str(), value.kind().as_str())
            })?;
            Ok((name.as_str(), callable))
        })
        .collect()
}
