//! Structural descriptors: what a runtime type declares.
//!
//! A [`TypeDescriptor`] stands in for runtime reflection. It lists every field
//! an instance carries (inherited and private ones included), the behaviors
//! fixed at the type, and the hooks and capability tags the clone engine
//! consults. Descriptors are immutable once built and shared as [`TypeRef`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::callable::Callable;
use crate::object::ObjectRef;
use crate::value::Value;

/// Shared handle to a type descriptor.
pub type TypeRef = Arc<TypeDescriptor>;

/// Normal construction logic. Never run by the clone engine.
pub type ConstructorFn = dyn Fn(&ObjectRef, &[Value]) -> anyhow::Result<()> + Send + Sync;

/// A type's own duplication operator (used for foreign types).
pub type NativeDuplicateFn = dyn Fn(&ObjectRef) -> anyhow::Result<ObjectRef> + Send + Sync;

/// Reinitializes transient state on a freshly duplicated instance.
pub type ResetFn = dyn Fn(&ObjectRef) -> anyhow::Result<()> + Send + Sync;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// One field slot in a type's layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    visibility: Visibility,
    declared_in: String,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Name of the type that declared this field.
    pub fn declared_in(&self) -> &str {
        &self.declared_in
    }
}

pub struct TypeDescriptor {
    name: String,
    parent: Option<TypeRef>,
    layout: Vec<FieldDescriptor>,
    behaviors: HashMap<String, Callable>,
    constructor: Option<Arc<ConstructorFn>>,
    native_duplicate: Option<Arc<NativeDuplicateFn>>,
    reset: Option<Arc<ResetFn>>,
    non_prototypable: bool,
    participates: bool,
}

impl TypeDescriptor {
    pub fn builder(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&TypeRef> {
        self.parent.as_ref()
    }

    /// Every field slot of an instance, ancestors first.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.layout
    }

    /// Slot of the most-derived field called `name`.
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.layout.iter().rposition(|f| f.name == name)
    }

    /// Slot of the field `name` as declared by the type `declared_in`.
    ///
    /// Reaches private ancestor fields that a descendant's field of the same
    /// name hides from [`TypeDescriptor::slot_of`].
    pub fn slot_of_declared(&self, declared_in: &str, name: &str) -> Option<usize> {
        self.layout
            .iter()
            .rposition(|f| f.name == name && f.declared_in == declared_in)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.slot_of(name).is_some()
    }

    pub fn behavior(&self, name: &str) -> Option<&Callable> {
        self.behaviors.get(name)
    }

    pub fn constructor(&self) -> Option<&Arc<ConstructorFn>> {
        self.constructor.as_ref()
    }

    pub fn native_duplicate(&self) -> Option<&Arc<NativeDuplicateFn>> {
        self.native_duplicate.as_ref()
    }

    pub fn reset_hook(&self) -> Option<&Arc<ResetFn>> {
        self.reset.as_ref()
    }

    /// Whether the type opted in to the prototyper (its duplication is routed
    /// through the clone engine).
    pub fn participates(&self) -> bool {
        self.participates
    }

    pub(crate) fn non_prototypable(&self) -> bool {
        self.non_prototypable
    }

    /// Defines its own duplication without participating in the prototyper.
    pub fn is_foreign(&self) -> bool {
        self.native_duplicate.is_some() && !self.participates
    }

    /// `true` if this type is `name` or descends from it.
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.parent.as_ref().is_some_and(|p| p.is_a(name))
    }
}

impl core::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("fields", &self.layout)
            .field("participates", &self.participates)
            .field("non_prototypable", &self.non_prototypable)
            .field("resettable", &self.reset.is_some())
            .field("foreign", &self.is_foreign())
            .finish_non_exhaustive()
    }
}

/// Builder for [`TypeDescriptor`].
///
/// Hooks, capability tags and participation are inherited from the parent
/// unless set here; type behaviors are merged with this type's taking priority.
pub struct TypeBuilder {
    name: String,
    parent: Option<TypeRef>,
    fields: Vec<(String, Visibility)>,
    behaviors: HashMap<String, Callable>,
    constructor: Option<Arc<ConstructorFn>>,
    native_duplicate: Option<Arc<NativeDuplicateFn>>,
    reset: Option<Arc<ResetFn>>,
    non_prototypable: bool,
    participates: bool,
}

impl TypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            behaviors: HashMap::new(),
            constructor: None,
            native_duplicate: None,
            reset: None,
            non_prototypable: false,
            participates: false,
        }
    }

    pub fn extends(mut self, parent: &TypeRef) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    pub fn field(self, name: impl Into<String>) -> Self {
        self.field_with(name, Visibility::Public)
    }

    pub fn protected_field(self, name: impl Into<String>) -> Self {
        self.field_with(name, Visibility::Protected)
    }

    pub fn private_field(self, name: impl Into<String>) -> Self {
        self.field_with(name, Visibility::Private)
    }

    pub fn field_with(mut self, name: impl Into<String>, visibility: Visibility) -> Self {
        self.fields.push((name.into(), visibility));
        self
    }

    pub fn behavior<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let callable = Callable::new(name.clone(), func);
        self.behaviors.insert(name, callable);
        self
    }

    pub fn constructor<F>(mut self, func: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(func));
        self
    }

    pub fn native_duplicate<F>(mut self, func: F) -> Self
    where
        F: Fn(&ObjectRef) -> anyhow::Result<ObjectRef> + Send + Sync + 'static,
    {
        self.native_duplicate = Some(Arc::new(func));
        self
    }

    /// Tags the type as resettable after cloning, with `hook` as the reset logic.
    pub fn resettable<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ObjectRef) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.reset = Some(Arc::new(hook));
        self
    }

    /// Tags the type as excluded from deep cloning (singletons, registries).
    pub fn non_prototypable(mut self) -> Self {
        self.non_prototypable = true;
        self
    }

    /// Opts the type in to the prototyper.
    pub fn prototypable(mut self) -> Self {
        self.participates = true;
        self
    }

    pub fn build(self) -> TypeRef {
        let parent = self.parent;
        let mut layout = parent
            .as_ref()
            .map(|p| p.layout.clone())
            .unwrap_or_default();

        for (name, visibility) in self.fields {
            // Redeclaring a visible inherited field (or repeating our own)
            // reuses the slot; an ancestor's private field keeps its own.
            let existing = layout.iter().rposition(|f| {
                f.name == name && (f.visibility != Visibility::Private || f.declared_in == self.name)
            });
            let descriptor = FieldDescriptor {
                name,
                visibility,
                declared_in: self.name.clone(),
            };
            match existing {
                Some(slot) => layout[slot] = descriptor,
                None => layout.push(descriptor),
            }
        }

        let mut behaviors = parent
            .as_ref()
            .map(|p| p.behaviors.clone())
            .unwrap_or_default();
        behaviors.extend(self.behaviors);

        let inherited = parent.as_deref();
        let constructor = self
            .constructor
            .or_else(|| inherited.and_then(|p| p.constructor.clone()));
        let native_duplicate = self
            .native_duplicate
            .or_else(|| inherited.and_then(|p| p.native_duplicate.clone()));
        let reset = self.reset.or_else(|| inherited.and_then(|p| p.reset.clone()));
        let non_prototypable =
            self.non_prototypable || inherited.is_some_and(|p| p.non_prototypable);
        let participates = self.participates || inherited.is_some_and(|p| p.participates);

        Arc::new(TypeDescriptor {
            name: self.name,
            parent,
            layout,
            behaviors,
            constructor,
            native_duplicate,
            reset,
            non_prototypable,
            participates,
        })
    }
}
