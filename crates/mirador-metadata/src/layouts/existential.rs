//! Protocol-existential metadata layout

use crate::descriptor::ContextDescriptor;
use crate::ptr::MetadataKind;
use crate::witness::ValueWitnessTable;

use super::{MetadataLayout, MetadataReader};

/// Pointer to one constituent protocol's descriptor.
pub type ProtocolDescriptorRef = *const ContextDescriptor;

/// Fixed-shape view of protocol-existential metadata.
///
/// The per-protocol descriptor vector trails the fixed fields inline; its
/// length comes from [`protocol_count`](Self::protocol_count) and is trusted
/// to match the runtime's allocation, as the ABI offers no way to check.
#[repr(C)]
pub struct ExistentialMetadataLayout {
    /// Shared value-witness table slot.
    pub value_witness_table: *const ValueWitnessTable,
    /// Kind discriminant.
    pub kind: usize,
    /// Existential layout flags (witness-table count, class constraint).
    pub layout_flags: u32,
    /// Number of constituent protocols.
    pub protocol_count: u32,
    /// Trailing vector of per-protocol descriptor pointers.
    pub protocols: [ProtocolDescriptorRef; 0],
}

impl MetadataLayout for ExistentialMetadataLayout {
    const CLAIMED_KIND: MetadataKind = MetadataKind::Existential;

    fn value_witness_table(&self) -> *const ValueWitnessTable {
        self.value_witness_table
    }

    fn kind_word(&self) -> usize {
        self.kind
    }
}

impl MetadataReader<ExistentialMetadataLayout> {
    /// Existential layout flags.
    pub fn layout_flags(&self) -> u32 {
        self.layout().layout_flags
    }

    /// Number of constituent protocols.
    pub fn protocol_count(&self) -> usize {
        self.layout().protocol_count as usize
    }

    /// The per-protocol descriptor pointers.
    pub fn protocols(&self) -> &[ProtocolDescriptorRef] {
        let layout = self.layout();
        // Length trusted per the layout contract.
        unsafe {
            std::slice::from_raw_parts(layout.protocols.as_ptr(), layout.protocol_count as usize)
        }
    }
}
