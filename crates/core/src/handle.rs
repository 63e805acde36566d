//! Opaque handles to external resources.

use std::any::Any;
use std::sync::Arc;

use crate::id::HandleId;

/// A reference to something outside the object graph (file, socket, pool...).
///
/// Handles have no duplication semantics of their own, so every copy of a
/// `Handle` refers to the same resource.
#[derive(Clone)]
pub struct Handle(Arc<HandleInner>);

struct HandleInner {
    id: HandleId,
    label: String,
    resource: Box<dyn Any + Send + Sync>,
}

impl Handle {
    pub fn new<R>(label: impl Into<String>, resource: R) -> Self
    where
        R: Any + Send + Sync,
    {
        Self(Arc::new(HandleInner {
            id: HandleId::new(),
            label: label.into(),
            resource: Box::new(resource),
        }))
    }

    pub fn id(&self) -> HandleId {
        self.0.id
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }

    pub fn downcast_ref<R: Any>(&self) -> Option<&R> {
        self.0.resource.downcast_ref::<R>()
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl core::fmt::Debug for Handle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.0.id)
            .field("label", &self.0.label)
            .finish_non_exhaustive()
    }
}
