//! Error model for cloning and prototyping.

use thiserror::Error;

/// Result type used across the prototyper crates.
pub type PrototypeResult<T> = Result<T, PrototypeError>;

/// Why a prototype override was refused.
///
/// These are programming errors on the caller's side; they are surfaced
/// immediately and the clone that was being prepared is discarded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidOverride {
    /// A field override named a field the clone's type does not declare.
    #[error("property '{field}' does not exist in type '{type_name}'")]
    UnknownField { field: String, type_name: String },

    /// A behavior override used a name that is not a valid member identifier.
    #[error("invalid method name '{name}'")]
    InvalidMemberName { name: String },

    /// A behavior override supplied something other than a callable.
    #[error("method '{name}' must be a callable (got {found})")]
    NotCallable { name: String, found: &'static str },

    /// Overrides were requested against an instance that is never cloned.
    #[error("type '{type_name}' is excluded from cloning and cannot take overrides")]
    ExcludedTarget { type_name: String },
}

/// Error raised by the object model, the clone engine or the prototype factory.
#[derive(Debug, Error)]
pub enum PrototypeError {
    #[error("invalid override: {0}")]
    InvalidOverride(#[from] InvalidOverride),

    /// The reset hook of a resettable clone failed.
    #[error("reset hook of type '{type_name}' failed")]
    ResetFailed {
        type_name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A foreign type's own duplication operator failed.
    #[error("native duplication of type '{type_name}' failed")]
    NativeDuplicate {
        type_name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The object graph reaches an object that is already being cloned.
    #[error("reference cycle detected while cloning type '{type_name}'")]
    CycleDetected { type_name: String },

    /// A type's constructor failed during `ObjectRef::construct`.
    #[error("constructor of type '{type_name}' failed")]
    Constructor {
        type_name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Plain (non-override) field access with a name the type does not declare.
    #[error("type '{type_name}' has no field '{field}'")]
    UnknownField { field: String, type_name: String },

    /// Member-call dispatch found neither an instance nor a type behavior.
    #[error("type '{type_name}' has no behavior '{name}'")]
    UnknownBehavior { name: String, type_name: String },

    /// A behavior ran and returned an error.
    #[error("behavior '{name}' failed")]
    Behavior {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A bound callable was invoked after its receiver was dropped,
    /// or an unbound callable was invoked without a receiver.
    #[error("callable '{name}' has no live receiver")]
    UnboundReceiver { name: String },

    /// `Array::push` found no free integer index after the highest one.
    #[error("cannot append to array: the next index is already occupied")]
    IndexExhausted,

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl PrototypeError {
    pub fn unknown_field(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    pub fn unknown_behavior(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnknownBehavior {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn cycle(type_name: impl Into<String>) -> Self {
        Self::CycleDetected {
            type_name: type_name.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Returns the override rejection, if this is one.
    pub fn as_invalid_override(&self) -> Option<&InvalidOverride> {
        match self {
            Self::InvalidOverride(inner) => Some(inner),
            _ => None,
        }
    }
}

impl InvalidOverride {
    pub fn unknown_field(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    pub fn member_name(name: impl Into<String>) -> Self {
        Self::InvalidMemberName { name: name.into() }
    }

    pub fn not_callable(name: impl Into<String>, found: &'static str) -> Self {
        Self::NotCallable {
            name: name.into(),
            found,
        }
    }

    pub fn excluded(type_name: impl Into<String>) -> Self {
        Self::ExcludedTarget {
            type_name: type_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_messages_name_the_offender() {
        let err = PrototypeError::from(InvalidOverride::unknown_field("colour", "Widget"));
        assert_eq!(
            err.to_string(),
            "invalid override: property 'colour' does not exist in type 'Widget'"
        );

        let err = InvalidOverride::member_name("123bad");
        assert_eq!(err.to_string(), "invalid method name '123bad'");

        let err = InvalidOverride::not_callable("greet", "text");
        assert_eq!(err.to_string(), "method 'greet' must be a callable (got text)");
    }

    #[test]
    fn hook_failures_keep_their_source() {
        use std::error::Error as _;

        let err = PrototypeError::ResetFailed {
            type_name: "Session".to_string(),
            source: anyhow::anyhow!("socket already closed"),
        };
        let source = err.source().expect("source is attached");
        assert_eq!(source.to_string(), "socket already closed");
        assert!(err.as_invalid_override().is_none());
    }
}
