//! Tuple metadata layout

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::ptr::{MetadataKind, MetadataPtr};
use crate::relative::RelativeVectorPointer;
use crate::witness::ValueWitnessTable;

use super::{MetadataLayout, MetadataReader};

/// One tuple element: its type and its byte offset within the tuple value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleElement {
    /// Element type metadata.
    pub ty: MetadataPtr,
    /// Byte offset of the element within a tuple value.
    pub offset: usize,
}

/// Fixed-shape view of tuple metadata.
#[repr(C)]
pub struct TupleMetadataLayout {
    /// Shared value-witness table slot.
    pub value_witness_table: *const ValueWitnessTable,
    /// Kind discriminant.
    pub kind: usize,
    /// Number of elements.
    pub element_count: usize,
    /// Space-separated label string with a trailing space; null when no
    /// element is labeled.
    pub labels: *const c_char,
    /// Self-relative vector of element records.
    pub elements: RelativeVectorPointer<TupleElement>,
}

impl MetadataLayout for TupleMetadataLayout {
    const CLAIMED_KIND: MetadataKind = MetadataKind::Tuple;

    fn value_witness_table(&self) -> *const ValueWitnessTable {
        self.value_witness_table
    }

    fn kind_word(&self) -> usize {
        self.kind
    }
}

impl MetadataReader<TupleMetadataLayout> {
    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.layout().element_count
    }

    /// The `(type, byte-offset)` element records, in declaration order.
    ///
    /// Length comes from the adjacent count field and is trusted.
    pub fn elements(&self) -> Option<&[TupleElement]> {
        unsafe { self.layout().elements.slice(self.element_count()) }
    }

    /// Per-element labels, decoded from the space-separated label string.
    ///
    /// Unlabeled tuples (null label pointer) yield one empty label per
    /// element; a partially-labeled tuple yields empty strings for the
    /// unlabeled positions.
    pub fn labels(&self) -> Vec<String> {
        let count = self.element_count();
        let pointer = self.layout().labels;

        if pointer.is_null() {
            return vec![String::new(); count];
        }

        // Null-terminated per the record contract.
        let raw = unsafe { CStr::from_ptr(pointer) };
        let text = raw.to_string_lossy();

        let mut labels: Vec<String> = text.split(' ').map(str::to_owned).collect();
        // The label string carries a trailing separator.
        if labels.last().is_some_and(|label| label.is_empty()) {
            labels.pop();
        }
        labels.resize(count, String::new());
        labels
    }
}
