//! Runtime values
//!
//! Every value the evaluator handles is one of a closed set of kinds. All of
//! them answer "what is your class" and "what are your properties" through the
//! [`Instance`](crate::instance::Instance) capability.
//!
//! Equality is identity: two class values are equal when they name the same
//! class id, every other kind compares by pointer.

use std::fmt;
use std::rc::Rc;

use crate::class::ClassId;
use crate::instance::PlainInstance;
use crate::method::{MethodInstance, UnboundMethodInstance};

/// Opaque payload carried by instances of the builtin `String`/`Integer` classes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    /// UTF-8 string
    Str(String),
    /// Signed integer
    Int(i64),
}

/// A runtime value
#[derive(Clone)]
pub enum Value {
    /// A class used as a value (its class is normally `Class`)
    Class(ClassId),
    /// A plain instance of some class
    Instance(Rc<PlainInstance>),
    /// A receiver-less method
    Method(Rc<MethodInstance>),
    /// A method taking an explicit receiver
    UnboundMethod(Rc<UnboundMethodInstance>),
}

impl Value {
    /// Class id if this value is a class
    pub fn as_class(&self) -> Option<ClassId> {
        match self {
            Value::Class(id) => Some(*id),
            _ => None,
        }
    }

    /// Plain instance if this value is one
    pub fn as_instance(&self) -> Option<&Rc<PlainInstance>> {
        match self {
            Value::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    /// Method if this value is one
    pub fn as_method(&self) -> Option<&Rc<MethodInstance>> {
        match self {
            Value::Method(m) => Some(m),
            _ => None,
        }
    }

    /// Unbound method if this value is one
    pub fn as_unbound_method(&self) -> Option<&Rc<UnboundMethodInstance>> {
        match self {
            Value::UnboundMethod(m) => Some(m),
            _ => None,
        }
    }

    /// String payload of a `String` instance
    pub fn as_str(&self) -> Option<&str> {
        match self.as_instance()?.payload() {
            Some(Primitive::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer payload of an `Integer` instance
    pub fn as_int(&self) -> Option<i64> {
        match self.as_instance()?.payload() {
            Some(Primitive::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Kind name for diagnostics
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::Method(_) => "method",
            Value::UnboundMethod(_) => "unbound method",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Method(a), Value::Method(b)) => Rc::ptr_eq(a, b),
            (Value::UnboundMethod(a), Value::UnboundMethod(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Class(id) => write!(f, "class({})", id),
            Value::Instance(inst) => match inst.payload() {
                Some(Primitive::Str(s)) => write!(f, "str({:?})", s),
                Some(Primitive::Int(i)) => write!(f, "int({})", i),
                None => write!(f, "instance(of {})", inst.class()),
            },
            Value::Method(_) => write!(f, "method"),
            Value::UnboundMethod(_) => write!(f, "unbound method"),
        }
    }
}

impl From<ClassId> for Value {
    fn from(id: ClassId) -> Self {
        Value::Class(id)
    }
}
