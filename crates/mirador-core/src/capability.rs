//! Marker capabilities and the open predicate registry
//!
//! Capabilities are nominal conformances used purely as discovery tags. They
//! are declared by an external code-generation layer, so they cannot be a
//! closed enum here: each is just an interned identifier, and custom
//! predicates can be attached to identifiers at runtime.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::class_list::ClassEntry;

/// Identifier of a marker capability (e.g. "performs-once-on-launch").
///
/// Cheap to clone and usable as a map key; two ids with the same text are
/// equal regardless of where they were constructed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CapabilityId(Arc<str>);

impl CapabilityId {
    /// Intern a capability identifier.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CapabilityId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Name of a registered custom predicate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PredicateName(Arc<str>);

impl PredicateName {
    /// Intern a predicate name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The name text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PredicateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered custom predicate function.
///
/// Must be pure: no state mutation, no dependence on evaluation order.
/// Anything else would make the index's memoized query results unsound.
pub type PredicateFn = Arc<dyn Fn(&ClassEntry) -> bool + Send + Sync>;

/// Open, name-keyed registry of custom predicate functions.
#[derive(Default)]
pub struct PredicateRegistry {
    predicates: DashMap<PredicateName, PredicateFn>,
}

impl PredicateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate under `name`, replacing any previous one.
    pub fn register<F>(&self, name: PredicateName, predicate: F)
    where
        F: Fn(&ClassEntry) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name, Arc::new(predicate));
    }

    /// Evaluate the named predicate against an entry.
    ///
    /// An unregistered name matches nothing.
    pub fn evaluate(&self, name: &PredicateName, entry: &ClassEntry) -> bool {
        match self.predicates.get(name) {
            Some(predicate) => predicate(entry),
            None => {
                log::warn!("query names unregistered predicate `{name}`; matching nothing");
                false
            }
        }
    }

    /// Whether a predicate is registered under `name`.
    pub fn contains(&self, name: &PredicateName) -> bool {
        self.predicates.contains_key(name)
    }
}
