//! Runtime type discovery
//!
//! This crate finds types satisfying structural predicates by snapshotting
//! the host object system's live class list, and invokes a one-time
//! initializer on each discovered type exactly once per process:
//! - Class-list snapshots over an [`ObjectSystem`] boundary trait
//! - Composable discovery predicates (capability conformance, module
//!   origin, implementation classification, named custom predicates)
//! - A lazily populated, memoizing type metadata index
//! - A one-time initialization driver safe under concurrent and reentrant
//!   startup
//!
//! The binary metadata layout readers live in the companion
//! `mirador-metadata` crate; a [`ClassEntry`] can carry a metadata pointer
//! claimable through those readers.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod capability;
pub mod class_list;
pub mod context;
pub mod index;
pub mod launch;
pub mod predicate;

pub use capability::{CapabilityId, PredicateFn, PredicateName, PredicateRegistry};
pub use class_list::{
    snapshot_classes, ClassEntry, ClassEntryBuilder, ImplementationKind, ModuleOrigin,
    ObjectSystem,
};
pub use context::DiscoveryContext;
pub use index::TypeIndex;
pub use launch::{InitError, LaunchDriver, LaunchInitializer, SweepError, SweepResult};
pub use predicate::{QueryKey, QueryPredicate};
