//! The process-wide type metadata index
//!
//! Combines the class enumerator and the predicate engine into a lazily
//! populated, memoizing catalog: Empty until first use, Populated once the
//! snapshot is taken, then read-mostly with per-query memoized results.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::capability::{PredicateName, PredicateRegistry};
use crate::class_list::{snapshot_classes, ClassEntry, ObjectSystem};
use crate::predicate::{QueryKey, QueryPredicate};

/// Process-wide cache over the object system's class list.
///
/// The snapshot is taken once, on first query, serialized under a write
/// lock. It is never invalidated automatically: classes the runtime loads
/// after population will not appear until [`refresh`](Self::refresh) is
/// called. That staleness window is part of the contract, not a bug.
pub struct TypeIndex {
    system: Arc<dyn ObjectSystem>,
    predicates: PredicateRegistry,
    snapshot: RwLock<Option<Arc<Vec<ClassEntry>>>>,
    results: DashMap<QueryKey, Arc<Vec<ClassEntry>>>,
}

impl TypeIndex {
    /// Create an empty index over the given object system.
    pub fn new(system: Arc<dyn ObjectSystem>) -> Self {
        Self {
            system,
            predicates: PredicateRegistry::new(),
            snapshot: RwLock::new(None),
            results: DashMap::new(),
        }
    }

    /// The custom predicate registry backing [`QueryPredicate::Named`].
    pub fn predicate_registry(&self) -> &PredicateRegistry {
        &self.predicates
    }

    /// Register a custom predicate usable in queries by name.
    pub fn register_predicate<F>(&self, name: PredicateName, predicate: F)
    where
        F: Fn(&ClassEntry) -> bool + Send + Sync + 'static,
    {
        self.predicates.register(name, predicate);
    }

    /// Fetch all class entries satisfying every given predicate.
    ///
    /// Lazy on first call per canonical predicate set, cached thereafter;
    /// idempotent. Result order follows enumerator order, which is not
    /// stable across processes.
    pub fn fetch(&self, predicates: &[QueryPredicate]) -> Vec<ClassEntry> {
        let key = QueryKey::new(predicates);

        if let Some(cached) = self.results.get(&key) {
            return cached.as_ref().clone();
        }

        let snapshot = self.snapshot();
        let matched: Vec<ClassEntry> = snapshot
            .iter()
            .filter(|entry| {
                key.predicates()
                    .iter()
                    .all(|predicate| predicate.matches(entry, self.system.as_ref(), &self.predicates))
            })
            .cloned()
            .collect();

        log::trace!(
            "query {key:?} matched {} of {} classes",
            matched.len(),
            snapshot.len()
        );

        // Two threads may race to compute the same key; both results are
        // equal because predicates are pure, so either insert is fine.
        let matched = Arc::new(matched);
        self.results.insert(key, matched.clone());
        matched.as_ref().clone()
    }

    /// Discard the snapshot and all memoized results, then re-populate on
    /// the next query.
    pub fn refresh(&self) {
        let mut snapshot = self.snapshot.write();
        *snapshot = None;
        self.results.clear();
        log::debug!("type index refreshed; snapshot and memoized queries dropped");
    }

    /// Number of classes in the current snapshot, populating if needed.
    pub fn class_count(&self) -> usize {
        self.snapshot().len()
    }

    fn snapshot(&self) -> Arc<Vec<ClassEntry>> {
        if let Some(snapshot) = self.snapshot.read().as_ref() {
            return snapshot.clone();
        }

        // First use: serialize population. Double-check under the write
        // lock so concurrent first queries take exactly one snapshot.
        let mut slot = self.snapshot.write();
        if let Some(snapshot) = slot.as_ref() {
            return snapshot.clone();
        }

        let snapshot = Arc::new(snapshot_classes(self.system.as_ref()));
        *slot = Some(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityId;
    use crate::class_list::{ClassEntryBuilder, ImplementationKind, ModuleOrigin};
    use rustc_hash::FxHashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSystem {
        classes: Vec<ClassEntry>,
        conforming: FxHashSet<String>,
        snapshots_taken: AtomicUsize,
    }

    impl CountingSystem {
        fn new(classes: Vec<ClassEntry>, conforming: &[&str]) -> Self {
            Self {
                classes,
                conforming: conforming.iter().map(|name| name.to_string()).collect(),
                snapshots_taken: AtomicUsize::new(0),
            }
        }
    }

    impl ObjectSystem for CountingSystem {
        fn class_count(&self) -> usize {
            self.snapshots_taken.fetch_add(1, Ordering::SeqCst);
            self.classes.len()
        }

        fn copy_class_list(&self, buf: &mut Vec<ClassEntry>, _max: usize) {
            buf.extend(self.classes.iter().cloned());
        }

        fn conforms_to(&self, entry: &ClassEntry, _capability: &CapabilityId) -> bool {
            self.conforming.contains(entry.name())
        }
    }

    fn sample_index() -> (Arc<CountingSystem>, TypeIndex) {
        let classes = vec![
            ClassEntryBuilder::new("AppWidget").build(),
            ClassEntryBuilder::new("NSButton")
                .origin(ModuleOrigin::HostPlatform)
                .implementation(ImplementationKind::Foreign)
                .build(),
            ClassEntryBuilder::new("AppModel").build(),
        ];
        let system = Arc::new(CountingSystem::new(classes, &["AppWidget", "AppModel"]));
        let index = TypeIndex::new(system.clone());
        (system, index)
    }

    #[test]
    fn test_snapshot_taken_once() {
        let (system, index) = sample_index();

        index.fetch(&[QueryPredicate::Origin(ModuleOrigin::Application)]);
        index.fetch(&[QueryPredicate::Implementation(ImplementationKind::Native)]);
        index.fetch(&[]);

        assert_eq!(system.snapshots_taken.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fetch_is_idempotent() {
        let (_, index) = sample_index();
        let query = [QueryPredicate::conforms_to("launch-init")];

        let first: FxHashSet<_> = index.fetch(&query).into_iter().collect();
        let second: FxHashSet<_> = index.fetch(&query).into_iter().collect();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_predicate_and_is_commutative() {
        let (_, index) = sample_index();
        let conforms = QueryPredicate::conforms_to("launch-init");
        let native = QueryPredicate::Implementation(ImplementationKind::Native);

        let forward: FxHashSet<_> = index
            .fetch(&[conforms.clone(), native.clone()])
            .into_iter()
            .collect();
        let backward: FxHashSet<_> = index.fetch(&[native, conforms]).into_iter().collect();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_empty_query_returns_whole_snapshot() {
        let (_, index) = sample_index();
        assert_eq!(index.fetch(&[]).len(), 3);
    }

    #[test]
    fn test_refresh_takes_new_snapshot() {
        let (system, index) = sample_index();

        index.fetch(&[]);
        index.refresh();
        index.fetch(&[]);

        assert_eq!(system.snapshots_taken.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_named_predicate_via_registry() {
        let (_, index) = sample_index();
        let name = PredicateName::new("app-prefixed");
        index.register_predicate(name.clone(), |entry| entry.name().starts_with("App"));

        let matched = index.fetch(&[QueryPredicate::Named(name)]);
        assert_eq!(matched.len(), 2);
    }
}
