//! Function metadata layout

use crate::ptr::{MetadataKind, MetadataPtr};
use crate::relative::RelativeVectorPointer;
use crate::witness::ValueWitnessTable;

use super::{MetadataLayout, MetadataReader};

const PARAMETER_COUNT_MASK: usize = 0xFFFF;
const THROWS_BIT: usize = 1 << 24;

/// Fixed-shape view of function metadata.
///
/// Parameter types sit behind a self-relative vector; the count lives in the
/// flags word and is trusted.
#[repr(C)]
pub struct FunctionMetadataLayout {
    /// Shared value-witness table slot.
    pub value_witness_table: *const ValueWitnessTable,
    /// Kind discriminant.
    pub kind: usize,
    /// Parameter count in the low 16 bits, throws bit at 24.
    pub flags: usize,
    /// Self-relative vector of parameter metadata pointers.
    pub parameters: RelativeVectorPointer<MetadataPtr>,
}

impl MetadataLayout for FunctionMetadataLayout {
    const CLAIMED_KIND: MetadataKind = MetadataKind::Function;

    fn value_witness_table(&self) -> *const ValueWitnessTable {
        self.value_witness_table
    }

    fn kind_word(&self) -> usize {
        self.kind
    }
}

impl MetadataReader<FunctionMetadataLayout> {
    /// Number of parameters.
    pub fn parameter_count(&self) -> usize {
        self.layout().flags & PARAMETER_COUNT_MASK
    }

    /// Whether the function can throw.
    pub fn throws(&self) -> bool {
        self.layout().flags & THROWS_BIT != 0
    }

    /// The parameter metadata pointers, in declaration order.
    ///
    /// `None` when the vector link is the null sentinel (and the count is
    /// nonzero); a zero-parameter function yields an empty slice.
    pub fn parameters(&self) -> Option<&[MetadataPtr]> {
        // Count trusted per the layout contract.
        unsafe { self.layout().parameters.slice(self.parameter_count()) }
    }
}
