//! Super-chain walking and member lookup
//!
//! The super chain and the class-of chain are different things. The root
//! class is its own class, so walking class-of links from it never ends.
//! These helpers only follow super links. A walk stops at the first class
//! without a super. It fails if it meets a class twice or goes past the
//! depth limit.

use log::trace;
use rustc_hash::FxHashSet;

use crate::class::{ClassId, ClassRegistry};
use crate::instance::Instance;
use crate::value::Value;
use crate::{ObjectError, ObjectResult};

/// The class followed by each of its supers, nearest first
pub fn ancestors(
    registry: &ClassRegistry,
    class_id: ClassId,
    limit: usize,
) -> ObjectResult<Vec<ClassId>> {
    let mut hierarchy = Vec::new();
    let mut seen = FxHashSet::default();
    let mut current = Some(class_id);

    while let Some(id) = current {
        if !seen.insert(id) {
            return Err(ObjectError::CyclicHierarchy { class: id });
        }
        if hierarchy.len() == limit {
            return Err(ObjectError::HierarchyTooDeep {
                class: class_id,
                limit,
            });
        }
        hierarchy.push(id);
        current = registry.super_of(id)?;
    }

    Ok(hierarchy)
}

/// Check if `sub` is `sup` or inherits from it
pub fn is_subclass_of(
    registry: &ClassRegistry,
    sub: ClassId,
    sup: ClassId,
    limit: usize,
) -> ObjectResult<bool> {
    Ok(ancestors(registry, sub, limit)?.contains(&sup))
}

/// Resolve `name` on a value
///
/// Looks at the value's own properties first. A class value stops there:
/// its table is the snapshot taken when it was created, and falling back to
/// its class (the root) would make later additions to the root visible.
/// Any other value continues with the class-level properties of its class
/// and each of that class's supers.
pub fn lookup_member(
    registry: &ClassRegistry,
    value: &Value,
    name: &str,
    limit: usize,
) -> ObjectResult<Value> {
    if let Some(found) = value.properties_of(registry)?.borrow().find(name) {
        return Ok(found.clone());
    }

    if value.as_class().is_some() {
        return Err(ObjectError::NotFound {
            name: name.to_string(),
        });
    }

    let class = value.class_of(registry)?;
    for id in ancestors(registry, class, limit)? {
        if let Some(found) = registry.props(id)?.borrow().find(name) {
            trace!("resolved '{}' on {}", name, id);
            return Ok(found.clone());
        }
    }

    Err(ObjectError::NotFound {
        name: name.to_string(),
    })
}
