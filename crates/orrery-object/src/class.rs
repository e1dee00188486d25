//! Class records and the class registry
//!
//! Classes live in an arena owned by the [`ClassRegistry`] and refer to each
//! other by [`ClassId`]. That is what lets the root class `Class` name itself
//! as its own class without an owning cycle.
//!
//! The root (the metaclass), the runtime's builtin classes and user classes
//! share one record type, [`ClassData`], so anything that works on classes
//! works on all of them alike. [`ClassKind`] tells them apart.

use std::fmt;

use log::debug;
use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;

use crate::properties::{Properties, PropertiesRef};
use crate::{ObjectError, ObjectResult};

/// Index of a class in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    /// Build an id from a raw registry index
    pub const fn from_raw(raw: usize) -> Self {
        ClassId(raw)
    }

    /// Raw registry index
    pub const fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What role a class plays in the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// The root class whose instances are classes
    Metaclass,
    /// Classes installed by the runtime at bootstrap (`Method`, `String`, ...)
    Builtin,
    /// Classes produced by `create`
    User,
}

/// A class: name, class-of link, super link and its two property tables
#[derive(Debug)]
pub struct ClassData {
    name: String,
    kind: ClassKind,
    /// Set exactly once; left empty while the root is being bootstrapped
    class: OnceCell<ClassId>,
    super_class: Option<ClassId>,
    /// Class-level members (`create`, ...)
    props: PropertiesRef,
    /// Template copied into each new plain instance
    instance_props: PropertiesRef,
}

impl ClassData {
    /// Allocate a class whose class link is not known yet
    ///
    /// Used for the first phase of the metaclass bootstrap; the link is
    /// patched with [`ClassData::bind_class`].
    pub fn pending(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            class: OnceCell::new(),
            super_class: None,
            props: Properties::new().into_shared(),
            instance_props: Properties::new().into_shared(),
        }
    }

    /// Create a fully linked class
    pub fn new(
        name: impl Into<String>,
        kind: ClassKind,
        class: ClassId,
        super_class: Option<ClassId>,
        props: Properties,
        instance_props: Properties,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            class: OnceCell::with_value(class),
            super_class,
            props: props.into_shared(),
            instance_props: instance_props.into_shared(),
        }
    }

    /// Patch the class link of a pending class
    ///
    /// Fails if the link was already established.
    pub fn bind_class(&self, class: ClassId) -> ObjectResult<()> {
        self.class.set(class).map_err(|_| {
            ObjectError::InvalidBootstrapState(format!(
                "class link of '{}' is already bound",
                self.name
            ))
        })
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role of this class
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Check if this is the root metaclass
    pub fn is_metaclass(&self) -> bool {
        self.kind == ClassKind::Metaclass
    }

    /// Check if the class link has been established
    pub fn is_bound(&self) -> bool {
        self.class.get().is_some()
    }

    /// The class of this class
    pub fn class_of(&self) -> ObjectResult<ClassId> {
        self.class.get().copied().ok_or_else(|| {
            ObjectError::InvalidBootstrapState(format!(
                "class '{}' used before its bootstrap completed",
                self.name
            ))
        })
    }

    /// Immediate super class (`None` for roots)
    pub fn super_of(&self) -> Option<ClassId> {
        self.super_class
    }

    /// Class-level property table
    pub fn props(&self) -> PropertiesRef {
        self.props.clone()
    }

    /// Instance property template
    pub fn instance_props(&self) -> PropertiesRef {
        self.instance_props.clone()
    }
}

/// Arena of all classes known to a runtime
#[derive(Debug, Default)]
pub struct ClassRegistry {
    /// Classes indexed by ID
    classes: Vec<ClassData>,
    /// Class name to IDs, in registration order (duplicate names are allowed)
    name_to_ids: FxHashMap<String, Vec<ClassId>>,
}

impl ClassRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class and return its id
    pub fn register(&mut self, class: ClassData) -> ClassId {
        let id = ClassId(self.classes.len());
        debug!("registered class '{}' as {} ({:?})", class.name, id, class.kind);
        self.name_to_ids
            .entry(class.name.clone())
            .or_default()
            .push(id);
        self.classes.push(class);
        id
    }

    /// Get class by ID
    pub fn get(&self, id: ClassId) -> ObjectResult<&ClassData> {
        self.classes.get(id.0).ok_or(ObjectError::UnknownClass(id))
    }

    /// Most recently registered class with this name
    pub fn find_by_name(&self, name: &str) -> Option<ClassId> {
        self.name_to_ids
            .get(name)
            .and_then(|ids| ids.last())
            .copied()
    }

    /// Every class registered under this name
    pub fn ids_named(&self, name: &str) -> &[ClassId] {
        self.name_to_ids
            .get(name)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Class name
    pub fn name(&self, id: ClassId) -> ObjectResult<&str> {
        Ok(self.get(id)?.name())
    }

    /// Class of a class
    pub fn class_of(&self, id: ClassId) -> ObjectResult<ClassId> {
        self.get(id)?.class_of()
    }

    /// Class of a class, panicking on an unknown or unbootstrapped class
    ///
    /// For callers that treat a missing link as an initialization bug.
    pub fn class_of_or_panic(&self, id: ClassId) -> ClassId {
        self.class_of(id)
            .unwrap_or_else(|e| panic!("class_of({}) failed: {}", id, e))
    }

    /// Immediate super class
    pub fn super_of(&self, id: ClassId) -> ObjectResult<Option<ClassId>> {
        Ok(self.get(id)?.super_of())
    }

    /// Class-level property table
    pub fn props(&self, id: ClassId) -> ObjectResult<PropertiesRef> {
        Ok(self.get(id)?.props())
    }

    /// Instance property template
    pub fn instance_props(&self, id: ClassId) -> ObjectResult<PropertiesRef> {
        Ok(self.get(id)?.instance_props())
    }

    /// Next id `register` will hand out
    pub fn next_class_id(&self) -> ClassId {
        ClassId(self.classes.len())
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate over all classes with their IDs
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ClassData)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(idx, class)| (ClassId(idx), class))
    }
}
