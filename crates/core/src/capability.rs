//! Capability queries: per-type tags the clone engine consults.

use crate::descriptor::TypeDescriptor;
use crate::object::ObjectRef;
use crate::value::Value;

/// The two independent capability tags a type may carry.
///
/// - *non-prototypable*: instances are returned as-is instead of cloned
///   (singletons, registries).
/// - *resettable*: a duplicated instance has its reset hook run before it is
///   handed to the caller.
///
/// Tags are fixed when the descriptor is built and never change afterwards.
pub trait Capabilities {
    fn is_non_prototypable(&self) -> bool;

    fn is_resettable(&self) -> bool;
}

impl Capabilities for TypeDescriptor {
    fn is_non_prototypable(&self) -> bool {
        self.non_prototypable()
    }

    fn is_resettable(&self) -> bool {
        self.reset_hook().is_some()
    }
}

impl Capabilities for ObjectRef {
    fn is_non_prototypable(&self) -> bool {
        self.type_ref().is_non_prototypable()
    }

    fn is_resettable(&self) -> bool {
        self.type_ref().is_resettable()
    }
}

/// Non-object values carry no tags.
impl Capabilities for Value {
    fn is_non_prototypable(&self) -> bool {
        self.as_object().is_some_and(Capabilities::is_non_prototypable)
    }

    fn is_resettable(&self) -> bool {
        self.as_object().is_some_and(Capabilities::is_resettable)
    }
}
