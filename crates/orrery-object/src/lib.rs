//! Orrery Object Model
//!
//! This crate provides the reflective core the Orrery evaluator builds on:
//! - Property tables with visibility tiers and copy-on-inherit snapshots
//! - The root class `Class`, whose own class is itself (metaclass bootstrap)
//! - User classes created through `Class.create`
//! - `Method` / `UnboundMethod` wrappers around native callables
//! - Super-chain walking and member lookup
//!
//! Everything is single-threaded. Shared tables are `Rc<RefCell<_>>` and all
//! mutation is synchronous.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class;
pub mod hierarchy;
pub mod instance;
pub mod method;
pub mod options;
pub mod properties;
pub mod runtime;
pub mod value;

pub use class::{ClassData, ClassId, ClassKind, ClassRegistry};
pub use instance::{Instance, PlainInstance};
pub use method::{Function, MethodInstance, UnboundFunction, UnboundMethodInstance};
pub use options::RuntimeOptions;
pub use properties::{Properties, PropertiesRef, PUBLIC};
pub use runtime::{Builtins, Runtime};
pub use value::{Primitive, Value};

/// Object model errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ObjectError {
    /// Property or member absent
    #[error("No such member: {name}")]
    NotFound {
        /// Name that was looked up
        name: String,
    },

    /// `Class` used before its bootstrap completed (initialization ordering bug)
    #[error("Invalid bootstrap state: {0}")]
    InvalidBootstrapState(String),

    /// Class id not present in the registry
    #[error("Unknown class {0}")]
    UnknownClass(ClassId),

    /// Invalid argument passed to a builtin callable
    #[error("Argument error: {0}")]
    ArgumentError(String),

    /// A builtin callable received the wrong kind of value
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected kind
        expected: String,
        /// Actual kind
        got: String,
    },

    /// The super chain loops back on itself
    #[error("Cyclic class hierarchy at {class}")]
    CyclicHierarchy {
        /// Class at which the cycle was detected
        class: ClassId,
    },

    /// The super chain is deeper than the configured limit
    #[error("Class hierarchy of {class} exceeds {limit} levels")]
    HierarchyTooDeep {
        /// Class whose chain was walked
        class: ClassId,
        /// Configured limit
        limit: usize,
    },

    /// Error raised by a wrapped native callable
    #[error("{0}")]
    Native(String),
}

impl From<String> for ObjectError {
    fn from(s: String) -> Self {
        ObjectError::Native(s)
    }
}

impl From<&str> for ObjectError {
    fn from(s: &str) -> Self {
        ObjectError::Native(s.to_string())
    }
}

/// Object model result
pub type ObjectResult<T> = Result<T, ObjectError>;
