//! Class entries and the object-system snapshot
//!
//! The host object system is an external collaborator reached only through
//! the [`ObjectSystem`] trait: it lists live classes and answers marker
//! capability conformance. Everything above it works on [`ClassEntry`]
//! snapshots.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use mirador_metadata::MetadataPtr;

use crate::capability::CapabilityId;
use crate::launch::LaunchInitializer;

/// Which module a class's code resides in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleOrigin {
    /// Shipped with the host platform.
    HostPlatform,
    /// Application or library code.
    Application,
}

/// How a class is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImplementationKind {
    /// Entirely in the host language.
    Native,
    /// Carries foreign (non-host-language) implementation markers.
    Foreign,
}

/// One element of a class-list snapshot.
///
/// Identity (equality, hashing) is the class name: the object system
/// guarantees unique class names within a process.
#[derive(Clone)]
pub struct ClassEntry {
    name: Arc<str>,
    superclass: Option<Arc<str>>,
    origin: ModuleOrigin,
    implementation: ImplementationKind,
    metadata: Option<MetadataPtr>,
    initializer: Option<LaunchInitializer>,
}

impl ClassEntry {
    /// The class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The superclass name; `None` for a root class.
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Which module the class's code resides in.
    pub fn origin(&self) -> ModuleOrigin {
        self.origin
    }

    /// How the class is implemented.
    pub fn implementation(&self) -> ImplementationKind {
        self.implementation
    }

    /// The class's metadata record, when the object system exposes one.
    /// Claimable through the layout readers.
    pub fn metadata(&self) -> Option<MetadataPtr> {
        self.metadata
    }

    /// The one-time initializer hook attached by the discovery marker.
    pub fn initializer(&self) -> Option<&LaunchInitializer> {
        self.initializer.as_ref()
    }
}

impl PartialEq for ClassEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ClassEntry {}

impl Hash for ClassEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassEntry")
            .field("name", &self.name)
            .field("superclass", &self.superclass)
            .field("origin", &self.origin)
            .field("implementation", &self.implementation)
            .field("has_metadata", &self.metadata.is_some())
            .field("has_initializer", &self.initializer.is_some())
            .finish()
    }
}

/// Builder for [`ClassEntry`].
pub struct ClassEntryBuilder {
    entry: ClassEntry,
}

impl ClassEntryBuilder {
    /// Start an entry for the named class. Defaults: root class,
    /// application origin, native implementation, no metadata, no
    /// initializer.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            entry: ClassEntry {
                name: Arc::from(name.as_ref()),
                superclass: None,
                origin: ModuleOrigin::Application,
                implementation: ImplementationKind::Native,
                metadata: None,
                initializer: None,
            },
        }
    }

    /// Set the superclass name.
    pub fn superclass(mut self, name: impl AsRef<str>) -> Self {
        self.entry.superclass = Some(Arc::from(name.as_ref()));
        self
    }

    /// Set the module origin.
    pub fn origin(mut self, origin: ModuleOrigin) -> Self {
        self.entry.origin = origin;
        self
    }

    /// Set the implementation classification.
    pub fn implementation(mut self, implementation: ImplementationKind) -> Self {
        self.entry.implementation = implementation;
        self
    }

    /// Attach the class's metadata record.
    pub fn metadata(mut self, metadata: MetadataPtr) -> Self {
        self.entry.metadata = Some(metadata);
        self
    }

    /// Attach a one-time initializer hook.
    pub fn initializer(mut self, initializer: LaunchInitializer) -> Self {
        self.entry.initializer = Some(initializer);
        self
    }

    /// Finish the entry.
    pub fn build(self) -> ClassEntry {
        self.entry
    }
}

/// The host object system, specified at its interface boundary.
///
/// Implementations must answer [`conforms_to`](Self::conforms_to) with their
/// own capability check; by the time discovery runs, every annotated type
/// already conforms at the object-system level (no lazy conformance).
pub trait ObjectSystem: Send + Sync {
    /// Number of currently-loaded classes (first enumeration pass).
    fn class_count(&self) -> usize;

    /// Append up to `max` entries describing the currently-loaded classes
    /// (second enumeration pass).
    fn copy_class_list(&self, buf: &mut Vec<ClassEntry>, max: usize);

    /// Whether the class conforms to the given marker capability.
    fn conforms_to(&self, entry: &ClassEntry, capability: &CapabilityId) -> bool;
}

/// Take a snapshot of all currently-loaded classes.
///
/// Two passes: count, then fill a pre-sized buffer. The count can change
/// between passes under concurrent class loading; a shrink is treated as
/// truncation and growth is silently dropped beyond the first-pass count.
/// This race is accepted, not corrected — the enumerator runs at startup,
/// before significant dynamic loading occurs in practice. Known limitation.
pub fn snapshot_classes(system: &dyn ObjectSystem) -> Vec<ClassEntry> {
    let expected = system.class_count();
    let mut entries = Vec::with_capacity(expected);

    system.copy_class_list(&mut entries, expected);
    entries.truncate(expected);

    log::debug!(
        "class snapshot: {} entries (first-pass count {expected})",
        entries.len()
    );
    entries
}
