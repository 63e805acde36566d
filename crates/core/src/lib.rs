//! `prototyper-core`: the object model the prototyper clones.
//!
//! Values, containers, callables, opaque handles, structural type descriptors
//! and object instances, plus the capability tags and error model shared by
//! the engine and façade crates. No cloning logic lives here.

pub mod array;
pub mod callable;
pub mod capability;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod id;
pub mod ident;
pub mod object;
pub mod value;

pub use array::{Array, ArrayKey};
pub use callable::{BehaviorFn, Callable};
pub use capability::Capabilities;
pub use descriptor::{
    ConstructorFn, FieldDescriptor, NativeDuplicateFn, ResetFn, TypeBuilder, TypeDescriptor,
    TypeRef, Visibility,
};
pub use error::{InvalidOverride, PrototypeError, PrototypeResult};
pub use handle::Handle;
pub use id::{HandleId, ObjectId};
pub use ident::is_valid_member_name;
pub use object::{Object, ObjectRef, ObjectSnapshot, WeakObjectRef};
pub use value::{Value, ValueKind};
