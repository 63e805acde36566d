//! `prototyper-engine`: deep cloning and prototype construction.
//!
//! - [`deep_clone`]: the clone engine (classification + recursive copy)
//! - [`factory`]: prototypes, i.e. clones with field/behavior overrides
//! - [`prototyper`]: the [`Prototyper`] trait and its default implementation
//!
//! Everything here is synchronous and side-effect free apart from whatever
//! user hooks (native duplication operators) do.

pub mod config;
pub mod deep_clone;
pub mod factory;
pub mod prototyper;

pub use config::{ConfigError, CyclePolicy, PrototyperConfig};
pub use deep_clone::{Classification, CloneEngine, classify, classify_type};
pub use factory::{Overrides, create_prototype};
pub use prototyper::{Prototyper, StructuralPrototyper, global};
