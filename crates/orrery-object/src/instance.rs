//! Plain instances and the instance capability
//!
//! Every runtime value can report its class and its property table. For
//! classes the answer comes from the registry; every other kind carries both
//! directly.

use crate::class::{ClassId, ClassRegistry};
use crate::method::{MethodInstance, UnboundMethodInstance};
use crate::properties::{Properties, PropertiesRef};
use crate::value::{Primitive, Value};
use crate::ObjectResult;

/// Capability shared by all runtime values
pub trait Instance {
    /// Class of this value
    fn class_of(&self, registry: &ClassRegistry) -> ObjectResult<ClassId>;

    /// Property table of this value
    fn properties_of(&self, registry: &ClassRegistry) -> ObjectResult<PropertiesRef>;
}

/// An ordinary object: its class plus its own property table
#[derive(Debug)]
pub struct PlainInstance {
    class: ClassId,
    props: PropertiesRef,
    payload: Option<Primitive>,
}

impl PlainInstance {
    /// Create an instance owning `props`
    pub fn new(class: ClassId, props: Properties) -> Self {
        Self {
            class,
            props: props.into_shared(),
            payload: None,
        }
    }

    /// Create an instance carrying a primitive payload
    pub fn with_payload(class: ClassId, props: Properties, payload: Primitive) -> Self {
        Self {
            class,
            props: props.into_shared(),
            payload: Some(payload),
        }
    }

    /// Class of this instance
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Own property table
    pub fn props(&self) -> PropertiesRef {
        self.props.clone()
    }

    /// Primitive payload, if any
    pub fn payload(&self) -> Option<&Primitive> {
        self.payload.as_ref()
    }
}

impl Instance for ClassId {
    fn class_of(&self, registry: &ClassRegistry) -> ObjectResult<ClassId> {
        registry.class_of(*self)
    }

    fn properties_of(&self, registry: &ClassRegistry) -> ObjectResult<PropertiesRef> {
        registry.props(*self)
    }
}

impl Instance for PlainInstance {
    fn class_of(&self, _registry: &ClassRegistry) -> ObjectResult<ClassId> {
        Ok(self.class)
    }

    fn properties_of(&self, _registry: &ClassRegistry) -> ObjectResult<PropertiesRef> {
        Ok(self.props())
    }
}

impl Instance for MethodInstance {
    fn class_of(&self, _registry: &ClassRegistry) -> ObjectResult<ClassId> {
        Ok(self.class())
    }

    fn properties_of(&self, _registry: &ClassRegistry) -> ObjectResult<PropertiesRef> {
        Ok(self.props())
    }
}

impl Instance for UnboundMethodInstance {
    fn class_of(&self, _registry: &ClassRegistry) -> ObjectResult<ClassId> {
        Ok(self.class())
    }

    fn properties_of(&self, _registry: &ClassRegistry) -> ObjectResult<PropertiesRef> {
        Ok(self.props())
    }
}

impl Instance for Value {
    fn class_of(&self, registry: &ClassRegistry) -> ObjectResult<ClassId> {
        match self {
            Value::Class(id) => id.class_of(registry),
            Value::Instance(inst) => inst.class_of(registry),
            Value::Method(m) => m.class_of(registry),
            Value::UnboundMethod(m) => m.class_of(registry),
        }
    }

    fn properties_of(&self, registry: &ClassRegistry) -> ObjectResult<PropertiesRef> {
        match self {
            Value::Class(id) => id.properties_of(registry),
            Value::Instance(inst) => inst.properties_of(registry),
            Value::Method(m) => m.properties_of(registry),
            Value::UnboundMethod(m) => m.properties_of(registry),
        }
    }
}
