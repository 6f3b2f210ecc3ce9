//! The process-scoped discovery context
//!
//! The index and the launch driver are bundled into one explicitly
//! constructed context that callers pass around (tests build an isolated
//! context each). A process that wants a shared instance installs it once;
//! installing twice is a lifecycle bug and fails loudly.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::capability::CapabilityId;
use crate::class_list::ObjectSystem;
use crate::index::TypeIndex;
use crate::launch::{LaunchDriver, SweepResult};

static INSTALLED: OnceCell<DiscoveryContext> = OnceCell::new();

/// Type metadata index plus one-time initialization driver, scoped to one
/// object system.
pub struct DiscoveryContext {
    index: TypeIndex,
    driver: LaunchDriver,
}

impl DiscoveryContext {
    /// Build a context over the given object system.
    pub fn new(system: Arc<dyn ObjectSystem>) -> Self {
        Self {
            index: TypeIndex::new(system),
            driver: LaunchDriver::new(),
        }
    }

    /// The type metadata index.
    pub fn index(&self) -> &TypeIndex {
        &self.index
    }

    /// The launch driver.
    pub fn driver(&self) -> &LaunchDriver {
        &self.driver
    }

    /// Run the one-time initialization sweep for `capability`.
    pub fn run_once(&self, capability: &CapabilityId) -> SweepResult {
        self.driver.run_once(&self.index, capability)
    }

    /// Install this context as the process-wide instance.
    ///
    /// # Panics
    ///
    /// Panics if a context was already installed. A second install almost
    /// always means the subsystem's startup path ran twice, which is a
    /// lifecycle bug worth surfacing immediately rather than ignoring.
    pub fn install(self) -> &'static DiscoveryContext {
        if INSTALLED.set(self).is_err() {
            panic!("discovery context installed twice");
        }
        INSTALLED.get().expect("context was just installed")
    }

    /// The installed process-wide context, if any.
    pub fn installed() -> Option<&'static DiscoveryContext> {
        INSTALLED.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityId;
    use crate::class_list::{ClassEntry, ClassEntryBuilder};
    use crate::predicate::QueryPredicate;

    struct TinySystem;

    impl ObjectSystem for TinySystem {
        fn class_count(&self) -> usize {
            1
        }

        fn copy_class_list(&self, buf: &mut Vec<ClassEntry>, _max: usize) {
            buf.push(ClassEntryBuilder::new("Lone").build());
        }

        fn conforms_to(&self, _entry: &ClassEntry, _capability: &CapabilityId) -> bool {
            false
        }
    }

    #[test]
    fn test_isolated_contexts_do_not_share_state() {
        let first = DiscoveryContext::new(Arc::new(TinySystem));
        let second = DiscoveryContext::new(Arc::new(TinySystem));

        let capability = CapabilityId::new("launch-init");
        first.run_once(&capability).unwrap();

        assert!(first.driver().has_run(&capability));
        assert!(!second.driver().has_run(&capability));
    }

    #[test]
    fn test_context_queries_through_its_own_index() {
        let context = DiscoveryContext::new(Arc::new(TinySystem));
        let all = context.index().fetch(&[]);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name(), "Lone");

        let conforming = context
            .index()
            .fetch(&[QueryPredicate::conforms_to("anything")]);
        assert!(conforming.is_empty());
    }
}
