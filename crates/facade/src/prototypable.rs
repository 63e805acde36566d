//! The `prototype` entry point.

use prototyper_core::{ObjectRef, PrototypeResult};
use prototyper_engine::{Overrides, Prototyper, global};

use crate::duplicate::duplicate_with_engine;

/// Prototype operations available on every instance.
///
/// The provided implementation for [`ObjectRef`] uses the process-wide
/// prototyper from [`prototyper_engine::global`]; use
/// [`prototype_with_engine`] and [`duplicate_with_engine`] to supply another.
pub trait Prototypable {
    /// A deep clone of `self`.
    fn prototype(&self) -> PrototypeResult<ObjectRef> {
        self.prototype_with(None, &Overrides::new())
    }

    /// A deep clone of `base` (or of `self` when `None`) with `overrides`
    /// applied. No reset hook runs on this path.
    fn prototype_with(
        &self,
        base: Option<&ObjectRef>,
        overrides: &Overrides,
    ) -> PrototypeResult<ObjectRef>;

    /// The duplication operator (see [`duplicate_with_engine`]).
    fn duplicate(&self) -> PrototypeResult<ObjectRef>;
}

impl Prototypable for ObjectRef {
    fn prototype_with(
        &self,
        base: Option<&ObjectRef>,
        overrides: &Overrides,
    ) -> PrototypeResult<ObjectRef> {
        prototype_with_engine(global(), base.unwrap_or(self), overrides)
    }

    fn duplicate(&self) -> PrototypeResult<ObjectRef> {
        duplicate_with_engine(global(), self)
    }
}

/// Builds a prototype of `object` with `prototyper`.
pub fn prototype_with_engine<P: Prototyper>(
    prototyper: P,
    object: &ObjectRef,
    overrides: &Overrides,
) -> PrototypeResult<ObjectRef> {
    prototyper.create_prototype(object, overrides)
}
