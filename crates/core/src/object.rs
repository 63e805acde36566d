//! Object instances.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::callable::Callable;
use crate::descriptor::{FieldDescriptor, TypeRef};
use crate::error::{PrototypeError, PrototypeResult};
use crate::id::ObjectId;
use crate::value::Value;

/// State of one instance: its runtime type, one value per layout slot, and
/// the behaviors attached to this instance only.
#[derive(Debug)]
pub struct Object {
    id: ObjectId,
    ty: TypeRef,
    slots: Vec<Value>,
    behaviors: HashMap<String, Callable>,
}

/// Detached copy of an object's state, taken under a single read lock.
///
/// Slot values are shallow copies; nested objects are still shared with the
/// source.
#[derive(Debug, Clone)]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub ty: TypeRef,
    pub slots: Vec<Value>,
    pub behaviors: HashMap<String, Callable>,
}

/// Shared reference to an [`Object`]. Cloning the reference aliases the same
/// instance.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<Object>>);

/// Non-owning reference to an [`Object`].
#[derive(Clone, Debug)]
pub struct WeakObjectRef(Weak<RwLock<Object>>);

impl WeakObjectRef {
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }

    /// `true` if this points at the same instance as `object`.
    pub fn refers_to(&self, object: &ObjectRef) -> bool {
        core::ptr::eq(self.0.as_ptr(), Arc::as_ptr(&object.0))
    }
}

impl ObjectRef {
    /// Allocates an instance and runs the type's constructor (if any).
    pub fn construct(ty: &TypeRef, args: &[Value]) -> PrototypeResult<Self> {
        let obj = Self::allocate(ty);
        if let Some(ctor) = ty.constructor() {
            ctor(&obj, args).map_err(|source| PrototypeError::Constructor {
                type_name: ty.name().to_string(),
                source,
            })?;
        }
        Ok(obj)
    }

    /// Allocates an instance with every field null, without running the
    /// constructor.
    pub fn allocate(ty: &TypeRef) -> Self {
        let slots = vec![Value::Null; ty.fields().len()];
        Self::materialize(ty, slots, HashMap::new())
    }

    /// Allocates an instance directly from field values, without running the
    /// constructor.
    ///
    /// `slots` follows the type's layout; missing trailing slots are null and
    /// surplus ones are dropped.
    pub fn materialize(
        ty: &TypeRef,
        mut slots: Vec<Value>,
        behaviors: HashMap<String, Callable>,
    ) -> Self {
        slots.resize(ty.fields().len(), Value::Null);
        Self(Arc::new(RwLock::new(Object {
            id: ObjectId::new(),
            ty: Arc::clone(ty),
            slots,
            behaviors,
        })))
    }

    pub fn id(&self) -> ObjectId {
        self.read().id
    }

    pub fn type_ref(&self) -> TypeRef {
        Arc::clone(&self.read().ty)
    }

    pub fn type_name(&self) -> String {
        self.read().ty.name().to_string()
    }

    /// Reads the most-derived field called `name`, regardless of visibility.
    pub fn get(&self, name: &str) -> PrototypeResult<Value> {
        let obj = self.read();
        let slot = obj
            .ty
            .slot_of(name)
            .ok_or_else(|| PrototypeError::unknown_field(name, obj.ty.name()))?;
        Ok(obj.slots[slot].clone())
    }

    /// Reads the field `name` declared by the ancestor `declared_in`.
    pub fn get_declared(&self, declared_in: &str, name: &str) -> PrototypeResult<Value> {
        let obj = self.read();
        let slot = obj
            .ty
            .slot_of_declared(declared_in, name)
            .ok_or_else(|| PrototypeError::unknown_field(name, declared_in))?;
        Ok(obj.slots[slot].clone())
    }

    /// Writes the most-derived field called `name`, regardless of visibility.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> PrototypeResult<()> {
        let mut obj = self.write();
        let slot = obj
            .ty
            .slot_of(name)
            .ok_or_else(|| PrototypeError::unknown_field(name, obj.ty.name()))?;
        obj.slots[slot] = value.into();
        Ok(())
    }

    /// Runs `f` against the field `name` in place.
    pub fn update<R>(&self, name: &str, f: impl FnOnce(&mut Value) -> R) -> PrototypeResult<R> {
        let mut obj = self.write();
        let slot = obj
            .ty
            .slot_of(name)
            .ok_or_else(|| PrototypeError::unknown_field(name, obj.ty.name()))?;
        Ok(f(&mut obj.slots[slot]))
    }

    /// Every field with its current value, in layout order.
    pub fn fields(&self) -> Vec<(FieldDescriptor, Value)> {
        let obj = self.read();
        obj.ty
            .fields()
            .iter()
            .cloned()
            .zip(obj.slots.iter().cloned())
            .collect()
    }

    pub fn snapshot(&self) -> ObjectSnapshot {
        let obj = self.read();
        ObjectSnapshot {
            id: obj.id,
            ty: Arc::clone(&obj.ty),
            slots: obj.slots.clone(),
            behaviors: obj.behaviors.clone(),
        }
    }

    /// Attaches `callable` to this instance only, shadowing any type behavior
    /// of the same name.
    pub fn attach_behavior(&self, name: impl Into<String>, callable: Callable) {
        self.write().behaviors.insert(name.into(), callable);
    }

    /// Names of the behaviors attached to this instance, sorted.
    pub fn instance_behavior_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.read().behaviors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolves `name` against the instance behaviors, then the type's.
    pub fn behavior(&self, name: &str) -> Option<Callable> {
        let obj = self.read();
        obj.behaviors
            .get(name)
            .or_else(|| obj.ty.behavior(name))
            .cloned()
    }

    /// Member-call dispatch: runs the behavior `name` with this instance as
    /// receiver (or the receiver it was bound to).
    pub fn invoke(&self, name: &str, args: &[Value]) -> PrototypeResult<Value> {
        // Resolve first so the lock is released before user code runs.
        let callable = self
            .behavior(name)
            .ok_or_else(|| PrototypeError::unknown_behavior(name, self.type_name()))?;
        callable.call(self, args)
    }

    /// The language-default duplication: a new instance holding the same
    /// field values, with nested objects shared.
    pub fn shallow_copy(&self) -> Self {
        let snap = self.snapshot();
        Self::materialize(&snap.ty, snap.slots, snap.behaviors)
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Arc::downgrade(&self.0))
    }

    // A panic in user code while holding the lock leaves slot values intact,
    // so poisoned locks are recovered rather than propagated.
    fn read(&self) -> RwLockReadGuard<'_, Object> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Object> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Fields are not printed: graphs may be cyclic.
        match self.0.try_read() {
            Ok(obj) => f
                .debug_struct("ObjectRef")
                .field("id", &obj.id)
                .field("type", &obj.ty.name())
                .finish_non_exhaustive(),
            Err(_) => f.write_str("ObjectRef(<locked>)"),
        }
    }
}
