//! Binary-layout readers for a managed runtime's in-memory type metadata
//!
//! This crate interprets the raw type-descriptor records the host runtime
//! keeps for every loaded type:
//! - Relative pointer resolution (offsets resolved against their own address)
//! - The value-witness table shared by every metadata kind
//! - Fixed-shape layout views for class, enum, existential, function and
//!   tuple metadata
//! - Context descriptors (type name + enclosing-scope chain)
//!
//! Everything here is a read-only view over memory owned by the runtime.
//! Metadata pointers are never freed and stay valid for the process lifetime
//! of the code that produced them. Correctness of the bytes is the caller's
//! responsibility: the records are not self-describing, so applying the wrong
//! layout to a pointer yields garbage, not an error. All unchecked pointer
//! arithmetic is confined to [`relative`] and the [`MetadataReader`]
//! constructors.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod descriptor;
pub mod layouts;
pub mod ptr;
pub mod relative;
pub mod witness;

pub use descriptor::{ContextDescriptor, ContextDescriptorFlags, ContextKind};
pub use layouts::{
    ClassMetadataLayout, EnumMetadataLayout, ExistentialMetadataLayout, FunctionMetadataLayout,
    MetadataLayout, MetadataReader, TupleElement, TupleMetadataLayout,
};
pub use ptr::{MetadataKind, MetadataPtr};
pub use relative::{RelativeDirectPointer, RelativeVectorPointer};
pub use witness::ValueWitnessTable;

/// Errors produced by fallible metadata reads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// A typed view was requested for a pointer whose kind discriminant
    /// names a different layout.
    #[error("metadata kind mismatch: expected {expected:?}, found {found:?}")]
    KindMismatch {
        /// Kind the caller claimed.
        expected: MetadataKind,
        /// Kind the discriminant actually holds.
        found: MetadataKind,
    },
}

/// Result alias for metadata reads.
pub type MetadataResult<T> = Result<T, MetadataError>;
