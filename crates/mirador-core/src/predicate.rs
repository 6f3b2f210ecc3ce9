//! Discovery predicates
//!
//! Pure, composable boolean tests over class entries. A query is a set of
//! predicates combined by logical AND; no predicate may mutate state or
//! depend on evaluation order, which is what makes the index's memoization
//! sound.

use crate::capability::{CapabilityId, PredicateName, PredicateRegistry};
use crate::class_list::{ClassEntry, ImplementationKind, ModuleOrigin, ObjectSystem};

/// One discovery predicate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryPredicate {
    /// The type conforms to the given marker capability, as answered by the
    /// object system's own capability check.
    ConformsTo(CapabilityId),
    /// The type's code resides in a module of the given origin.
    Origin(ModuleOrigin),
    /// The type carries the given implementation classification.
    Implementation(ImplementationKind),
    /// A custom predicate registered by name in the predicate registry.
    Named(PredicateName),
}

impl QueryPredicate {
    /// Conformance predicate from anything capability-id-like.
    pub fn conforms_to(capability: impl Into<CapabilityId>) -> Self {
        QueryPredicate::ConformsTo(capability.into())
    }

    /// Evaluate against a single entry.
    pub fn matches(
        &self,
        entry: &ClassEntry,
        system: &dyn ObjectSystem,
        registry: &PredicateRegistry,
    ) -> bool {
        match self {
            QueryPredicate::ConformsTo(capability) => system.conforms_to(entry, capability),
            QueryPredicate::Origin(origin) => entry.origin() == *origin,
            QueryPredicate::Implementation(implementation) => {
                entry.implementation() == *implementation
            }
            QueryPredicate::Named(name) => registry.evaluate(name, entry),
        }
    }
}

/// Canonicalized predicate set used as the memoization key.
///
/// Sorting and deduplicating makes the key order-insensitive, so
/// `fetch(A, B)` and `fetch(B, A)` share one cache entry and return equal
/// results by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<QueryPredicate>);

impl QueryKey {
    /// Canonicalize a predicate list.
    pub fn new(predicates: &[QueryPredicate]) -> Self {
        let mut predicates = predicates.to_vec();
        predicates.sort();
        predicates.dedup();
        Self(predicates)
    }

    /// The canonicalized predicates.
    pub fn predicates(&self) -> &[QueryPredicate] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_list::ClassEntryBuilder;

    struct NoSystem;

    impl ObjectSystem for NoSystem {
        fn class_count(&self) -> usize {
            0
        }

        fn copy_class_list(&self, _buf: &mut Vec<ClassEntry>, _max: usize) {}

        fn conforms_to(&self, _entry: &ClassEntry, _capability: &CapabilityId) -> bool {
            false
        }
    }

    #[test]
    fn test_origin_predicate() {
        let platform = ClassEntryBuilder::new("NSView")
            .origin(ModuleOrigin::HostPlatform)
            .build();
        let app = ClassEntryBuilder::new("MyView").build();

        let predicate = QueryPredicate::Origin(ModuleOrigin::HostPlatform);
        let registry = PredicateRegistry::new();

        assert!(predicate.matches(&platform, &NoSystem, &registry));
        assert!(!predicate.matches(&app, &NoSystem, &registry));
    }

    #[test]
    fn test_implementation_predicate() {
        let foreign = ClassEntryBuilder::new("Bridge")
            .implementation(ImplementationKind::Foreign)
            .build();

        let native_only = QueryPredicate::Implementation(ImplementationKind::Native);
        let registry = PredicateRegistry::new();

        assert!(!native_only.matches(&foreign, &NoSystem, &registry));
    }

    #[test]
    fn test_query_key_is_order_insensitive() {
        let a = QueryPredicate::Origin(ModuleOrigin::Application);
        let b = QueryPredicate::Implementation(ImplementationKind::Native);

        assert_eq!(QueryKey::new(&[a.clone(), b.clone()]), QueryKey::new(&[b, a]));
    }

    #[test]
    fn test_query_key_deduplicates() {
        let a = QueryPredicate::conforms_to("launch-init");

        assert_eq!(
            QueryKey::new(&[a.clone(), a.clone()]),
            QueryKey::new(&[a])
        );
    }
}
