//! Enum metadata layout

use crate::descriptor::ContextDescriptor;
use crate::ptr::MetadataKind;
use crate::witness::ValueWitnessTable;

use super::{MetadataLayout, MetadataReader};

/// Fixed-shape view of enum metadata. Optionals share this layout.
#[repr(C)]
pub struct EnumMetadataLayout {
    /// Shared value-witness table slot.
    pub value_witness_table: *const ValueWitnessTable,
    /// Kind discriminant.
    pub kind: usize,
    /// Out-of-line description of the type.
    pub context_descriptor: *const ContextDescriptor,
    /// Offset to the enclosing parent record.
    pub parent_offset: usize,
}

impl MetadataLayout for EnumMetadataLayout {
    const CLAIMED_KIND: MetadataKind = MetadataKind::Enum;

    fn matches(kind: MetadataKind) -> bool {
        matches!(kind, MetadataKind::Enum | MetadataKind::Optional)
    }

    fn value_witness_table(&self) -> *const ValueWitnessTable {
        self.value_witness_table
    }

    fn kind_word(&self) -> usize {
        self.kind
    }
}

impl MetadataReader<EnumMetadataLayout> {
    /// The out-of-line context descriptor, if any.
    pub fn descriptor(&self) -> Option<&ContextDescriptor> {
        unsafe { self.layout().context_descriptor.as_ref() }
    }

    /// Offset to the enclosing parent record.
    pub fn parent_offset(&self) -> usize {
        self.layout().parent_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ptr::MetadataPtr;
    use std::ptr::NonNull;

    #[test]
    fn test_optional_claims_as_enum_layout() {
        let record = EnumMetadataLayout {
            value_witness_table: std::ptr::null(),
            kind: 0x202,
            context_descriptor: std::ptr::null(),
            parent_offset: 2,
        };

        let base = unsafe {
            MetadataPtr::from_raw(NonNull::new(&record.kind as *const usize as *mut ()).unwrap())
        };
        let view = MetadataReader::<EnumMetadataLayout>::try_claim(base).unwrap();

        assert_eq!(view.parent_offset(), 2);
        assert!(view.descriptor().is_none());
    }
}
