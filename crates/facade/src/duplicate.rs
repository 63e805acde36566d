//! The duplication operator and the post-clone reset hook.

use tracing::debug;

use prototyper_core::{ObjectRef, PrototypeError, PrototypeResult};
use prototyper_engine::Prototyper;

/// Duplicates `object` the way its type asks for:
///
/// - participating types are deep-cloned by `prototyper`, then reset if the
///   type is resettable;
/// - foreign types call their own duplication operator;
/// - everything else gets the default shallow copy.
pub fn duplicate_with_engine<P: Prototyper>(
    prototyper: P,
    object: &ObjectRef,
) -> PrototypeResult<ObjectRef> {
    let ty = object.type_ref();

    if ty.participates() {
        let copy = prototyper.deep_clone_object(object)?;
        reset_clone(object, &copy)?;
        return Ok(copy);
    }

    if let Some(native) = ty.native_duplicate() {
        return native(object).map_err(|source| PrototypeError::NativeDuplicate {
            type_name: ty.name().to_string(),
            source,
        });
    }

    Ok(object.shallow_copy())
}

/// Runs the reset hook of `clone`'s type, if it has one.
///
/// Skipped when `clone` is `source` itself (non-prototypable instances come
/// back unchanged), so the hook never runs on an original.
pub fn reset_clone(source: &ObjectRef, clone: &ObjectRef) -> PrototypeResult<()> {
    if ObjectRef::ptr_eq(source, clone) {
        return Ok(());
    }

    let ty = clone.type_ref();
    let Some(hook) = ty.reset_hook() else {
        return Ok(());
    };

    debug!(type_name = ty.name(), clone = %clone.id(), "resetting clone");
    hook(clone).map_err(|source| PrototypeError::ResetFailed {
        type_name: ty.name().to_string(),
        source,
    })
}
