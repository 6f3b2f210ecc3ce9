//! Typed layout views over raw metadata pointers
//!
//! Each reader is a pure, stateless mapping from a [`MetadataPtr`] to a
//! fixed-shape view of the bytes around it. The view begins one pointer
//! width *before* the metadata address: that slot holds the value-witness
//! table pointer, followed by the kind discriminant the metadata address
//! points at, followed by kind-specific fields.
//!
//! Field offsets and widths are invariant per kind and pointer width.
//! Applying the wrong layout to a pointer produces meaningless values, not
//! a detectable error; [`MetadataReader::try_claim`] guards only the leading
//! kind discriminant.

mod class;
mod enumeration;
mod existential;
mod function;
mod tuple;

pub use class::ClassMetadataLayout;
pub use enumeration::EnumMetadataLayout;
pub use existential::{ExistentialMetadataLayout, ProtocolDescriptorRef};
pub use function::FunctionMetadataLayout;
pub use tuple::{TupleElement, TupleMetadataLayout};

use std::ptr::NonNull;

use crate::ptr::{MetadataKind, MetadataPtr};
use crate::witness::ValueWitnessTable;
use crate::{MetadataError, MetadataResult};

mod private {
    pub trait Sealed {}

    impl Sealed for super::ClassMetadataLayout {}
    impl Sealed for super::EnumMetadataLayout {}
    impl Sealed for super::ExistentialMetadataLayout {}
    impl Sealed for super::FunctionMetadataLayout {}
    impl Sealed for super::TupleMetadataLayout {}
}

/// A fixed-shape metadata layout. Sealed; the five kinds this crate decodes
/// are the only implementors.
pub trait MetadataLayout: private::Sealed {
    /// The kind a well-formed record of this layout announces.
    const CLAIMED_KIND: MetadataKind;

    /// Whether a decoded discriminant is acceptable for this layout.
    fn matches(kind: MetadataKind) -> bool {
        kind == Self::CLAIMED_KIND
    }

    /// The value-witness table slot.
    fn value_witness_table(&self) -> *const ValueWitnessTable;

    /// The raw kind discriminant word.
    fn kind_word(&self) -> usize;
}

/// A typed view over a metadata record.
///
/// This is the single place a raw address is paired with an explicit claim
/// of its expected kind, so every unchecked cast in the crate is textually
/// auditable here and in the constructors below.
pub struct MetadataReader<L: MetadataLayout> {
    layout: NonNull<L>,
    base: MetadataPtr,
}

impl<L: MetadataLayout> MetadataReader<L> {
    /// Claim a metadata pointer as layout `L`, verifying the leading kind
    /// discriminant first.
    ///
    /// The discriminant is the only structural check possible; a record
    /// whose discriminant lies is out of contract and undetectable.
    pub fn try_claim(base: MetadataPtr) -> MetadataResult<Self> {
        let found = base.kind();
        if !L::matches(found) {
            return Err(MetadataError::KindMismatch {
                expected: L::CLAIMED_KIND,
                found,
            });
        }

        // Kind verified; the layout claim is as sound as the input pointer.
        Ok(unsafe { Self::claim_unchecked(base) })
    }

    /// Claim a metadata pointer as layout `L` without reading the kind
    /// discriminant.
    ///
    /// # Safety
    ///
    /// The caller asserts the record really has layout `L`. Supplying the
    /// wrong kind yields meaningless field values on every subsequent read.
    pub unsafe fn claim_unchecked(base: MetadataPtr) -> Self {
        let address = (base.as_raw() as *const u8).sub(std::mem::size_of::<usize>());
        Self {
            // The metadata address is non-null, so the one-word rewind is too.
            layout: NonNull::new_unchecked(address as *mut L),
            base,
        }
    }

    /// The metadata pointer this view was claimed from.
    #[inline]
    pub fn base(&self) -> MetadataPtr {
        self.base
    }

    /// The typed layout record.
    #[inline]
    pub fn layout(&self) -> &L {
        // Live per the MetadataPtr::from_raw contract.
        unsafe { self.layout.as_ref() }
    }

    /// The value-witness table, the shared prefix of every kind.
    ///
    /// `None` only for a record whose witness slot is null, which no
    /// runtime-produced record has.
    #[inline]
    pub fn value_witness_table(&self) -> Option<&ValueWitnessTable> {
        unsafe { self.layout().value_witness_table().as_ref() }
    }

    /// The raw kind discriminant word.
    #[inline]
    pub fn kind_word(&self) -> usize {
        self.layout().kind_word()
    }
}
