//! Property tables
//!
//! A `Properties` table maps names to values. Each entry belongs to one
//! visibility tier ("public", ...). Tiers are plain strings created on first
//! use; visibility is recorded but not enforced by lookups.
//!
//! Names are unique across the whole table and enumeration follows insertion
//! order. `inheritable()` copies the public entries into a brand-new table, so
//! later changes to either side are never visible to the other.

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;
use rustc_hash::FxHashMap;

use crate::value::Value;
use crate::{ObjectError, ObjectResult};

/// The public visibility tier
pub const PUBLIC: &str = "public";

/// Shared handle to a property table
pub type PropertiesRef = Rc<RefCell<Properties>>;

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    tier: String,
    value: Value,
}

/// Ordered name -> value mapping partitioned into visibility tiers
#[derive(Debug, Clone, Default)]
pub struct Properties {
    /// Entries in insertion order
    entries: Vec<Entry>,
    /// Name to entry index
    index: FxHashMap<String, usize>,
}

impl Properties {
    /// Create an empty table with no tiers populated
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap this table in a shared handle
    pub fn into_shared(self) -> PropertiesRef {
        Rc::new(RefCell::new(self))
    }

    /// Insert or overwrite a single entry under `tier`
    ///
    /// Overwriting an existing name keeps its position and moves it to `tier`.
    pub fn set(&mut self, tier: &str, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                entry.tier = tier.to_string();
                entry.value = value;
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(Entry {
                    name,
                    tier: tier.to_string(),
                    value,
                });
            }
        }
    }

    /// Bulk insert or overwrite entries under `tier`
    pub fn set_all<I, K>(&mut self, tier: &str, entries: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (name, value) in entries {
            self.set(tier, name, value);
        }
    }

    /// Look up a value by name, regardless of tier
    pub fn get(&self, name: &str) -> ObjectResult<Value> {
        self.find(name).cloned().ok_or_else(|| ObjectError::NotFound {
            name: name.to_string(),
        })
    }

    /// Look up a value by name without producing an error
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&idx| &self.entries[idx].value)
    }

    /// Check if a name is present
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tier a name is stored under
    pub fn tier_of(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&idx| self.entries[idx].tier.as_str())
    }

    /// Remove an entry, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.index.remove(name)?;
        let entry = self.entries.remove(idx);
        for later in self.entries[idx..].iter() {
            if let Some(slot) = self.index.get_mut(&later.name) {
                *slot -= 1;
            }
        }
        Some(entry.value)
    }

    /// Names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Entries of one tier in insertion order
    pub fn entries<'a>(&'a self, tier: &'a str) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.entries
            .iter()
            .filter(move |e| e.tier == tier)
            .map(|e| (e.name.as_str(), &e.value))
    }

    /// Distinct tiers in order of first use
    pub fn tiers(&self) -> Vec<&str> {
        let mut tiers: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !tiers.contains(&entry.tier.as_str()) {
                tiers.push(&entry.tier);
            }
        }
        tiers
    }

    /// Number of entries across all tiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Independent snapshot of the public entries
    ///
    /// Values are cloned handles; the table storage itself is never shared.
    pub fn inheritable(&self) -> Properties {
        let mut snapshot = Properties::new();
        snapshot.set_all(
            PUBLIC,
            self.entries(PUBLIC).map(|(name, value)| (name, value.clone())),
        );
        trace!(
            "inheritable snapshot: {} of {} entries",
            snapshot.len(),
            self.len()
        );
        snapshot
    }
}
