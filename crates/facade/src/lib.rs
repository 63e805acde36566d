//! `prototyper-facade`: how an object type opts in to the prototyper.
//!
//! Types built with [`TypeBuilder::prototypable`](prototyper_core::TypeBuilder::prototypable)
//! route their duplication through the clone engine, and every instance
//! exposes [`Prototypable::prototype`] / [`Prototypable::prototype_with`].

pub mod duplicate;
pub mod prototypable;

pub use duplicate::{duplicate_with_engine, reset_clone};
pub use prototypable::{Prototypable, prototype_with_engine};
pub use prototyper_engine::Overrides;
