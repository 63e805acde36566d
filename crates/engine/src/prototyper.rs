//! The prototyper interface and its descriptor-driven implementation.

use std::sync::OnceLock;

use prototyper_core::{Array, ObjectRef, PrototypeResult, Value};

use crate::config::PrototyperConfig;
use crate::deep_clone::CloneEngine;
use crate::factory::{self, Overrides};

/// Deep cloning plus prototype construction.
///
/// Implementations must be pure structural transforms: no I/O, no state
/// retained between calls, no reference kept to the returned graph.
pub trait Prototyper {
    /// Deep-clones any value.
    fn deep_clone(&self, value: &Value) -> PrototypeResult<Value>;

    /// Deep-clones an array, preserving keys and order.
    fn deep_clone_array(&self, array: &Array) -> PrototypeResult<Array>;

    /// Deep-clones one object.
    fn deep_clone_object(&self, object: &ObjectRef) -> PrototypeResult<ObjectRef>;

    /// Deep-clones `object` and applies `overrides` to the clone.
    fn create_prototype(
        &self,
        object: &ObjectRef,
        overrides: &Overrides,
    ) -> PrototypeResult<ObjectRef>;
}

/// Prototyper driven by the structural type descriptors in `prototyper-core`.
#[derive(Debug, Clone, Default)]
pub struct StructuralPrototyper {
    engine: CloneEngine,
}

impl StructuralPrototyper {
    pub fn new(config: PrototyperConfig) -> Self {
        Self {
            engine: CloneEngine::new(config),
        }
    }

    pub fn from_env() -> Self {
        Self::new(PrototyperConfig::from_env())
    }

    pub fn config(&self) -> &PrototyperConfig {
        self.engine.config()
    }

    pub fn engine(&self) -> &CloneEngine {
        &self.engine
    }
}

impl Prototyper for StructuralPrototyper {
    fn deep_clone(&self, value: &Value) -> PrototypeResult<Value> {
        self.engine.deep_clone(value)
    }

    fn deep_clone_array(&self, array: &Array) -> PrototypeResult<Array> {
        self.engine.deep_clone_array(array)
    }

    fn deep_clone_object(&self, object: &ObjectRef) -> PrototypeResult<ObjectRef> {
        self.engine.deep_clone_object(object)
    }

    fn create_prototype(
        &self,
        object: &ObjectRef,
        overrides: &Overrides,
    ) -> PrototypeResult<ObjectRef> {
        factory::create_prototype(&self.engine, object, overrides)
    }
}

impl<P: Prototyper + ?Sized> Prototyper for &P {
    fn deep_clone(&self, value: &Value) -> PrototypeResult<Value> {
        (**self).deep_clone(value)
    }

    fn deep_clone_array(&self, array: &Array) -> PrototypeResult<Array> {
        (**self).deep_clone_array(array)
    }

    fn deep_clone_object(&self, object: &ObjectRef) -> PrototypeResult<ObjectRef> {
        (**self).deep_clone_object(object)
    }

    fn create_prototype(
        &self,
        object: &ObjectRef,
        overrides: &Overrides,
    ) -> PrototypeResult<ObjectRef> {
        (**self).create_prototype(object, overrides)
    }
}

/// Process-wide prototyper, configured from the environment on first use.
pub fn global() -> &'static StructuralPrototyper {
    static GLOBAL: OnceLock<StructuralPrototyper> = OnceLock::new();
    GLOBAL.get_or_init(|| {
        let prototyper = StructuralPrototyper::from_env();
        tracing::debug!(
            cycle_policy = %prototyper.config().cycle_policy,
            "initialized global prototyper"
        );
        prototyper
    })
}
