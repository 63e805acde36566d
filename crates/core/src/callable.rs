//! First-class behaviors (callable values).

use std::sync::Arc;

use crate::error::{PrototypeError, PrototypeResult};
use crate::object::{ObjectRef, WeakObjectRef};
use crate::value::Value;

/// Signature shared by every behavior: the receiver plus positional arguments.
pub type BehaviorFn = dyn Fn(&ObjectRef, &[Value]) -> anyhow::Result<Value> + Send + Sync;

/// A shared function value.
///
/// Cloning a `Callable` never copies the function; both handles point at the
/// same allocation, which is how the clone engine treats callables as atomic.
///
/// A callable may be *bound* to a receiver with [`Callable::bind_to`]. The
/// bound receiver is held weakly so that an instance storing a behavior bound
/// to itself does not keep itself alive.
#[derive(Clone)]
pub struct Callable(Arc<CallableInner>);

struct CallableInner {
    name: String,
    func: Arc<BehaviorFn>,
    receiver: Option<WeakObjectRef>,
}

impl Callable {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(CallableInner {
            name: name.into(),
            func: Arc::new(func),
            receiver: None,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_bound(&self) -> bool {
        self.0.receiver.is_some()
    }

    /// `true` if bound to exactly `receiver`.
    pub fn is_bound_to(&self, receiver: &ObjectRef) -> bool {
        self.0
            .receiver
            .as_ref()
            .is_some_and(|weak| weak.refers_to(receiver))
    }

    /// The bound receiver, if bound and still alive.
    pub fn receiver(&self) -> Option<ObjectRef> {
        self.0.receiver.as_ref().and_then(WeakObjectRef::upgrade)
    }

    /// Returns a new callable running the same function with `receiver` fixed
    /// as its implicit receiver. `self` is left untouched.
    pub fn bind_to(&self, receiver: &ObjectRef) -> Self {
        Self(Arc::new(CallableInner {
            name: self.0.name.clone(),
            func: Arc::clone(&self.0.func),
            receiver: Some(receiver.downgrade()),
        }))
    }

    /// Calls the function. A bound callable ignores `receiver` and uses the
    /// instance it was bound to.
    pub fn call(&self, receiver: &ObjectRef, args: &[Value]) -> PrototypeResult<Value> {
        match &self.0.receiver {
            Some(weak) => {
                let bound = weak.upgrade().ok_or_else(|| self.unbound())?;
                self.run(&bound, args)
            }
            None => self.run(receiver, args),
        }
    }

    /// Calls a bound callable without supplying a receiver.
    pub fn invoke(&self, args: &[Value]) -> PrototypeResult<Value> {
        let bound = self.receiver().ok_or_else(|| self.unbound())?;
        self.run(&bound, args)
    }

    /// `true` if both handles are the same callable value.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// `true` if both callables run the same underlying function, regardless of binding.
    pub fn shares_function(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0.func, &other.0.func)
    }

    fn run(&self, receiver: &ObjectRef, args: &[Value]) -> PrototypeResult<Value> {
        (self.0.func)(receiver, args).map_err(|source| PrototypeError::Behavior {
            name: self.0.name.clone(),
            source,
        })
    }

    fn unbound(&self) -> PrototypeError {
        PrototypeError::UnboundReceiver {
            name: self.0.name.clone(),
        }
    }
}

impl core::fmt::Debug for Callable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.0.name)
            .field("bound", &self.is_bound())
            .finish()
    }
}
