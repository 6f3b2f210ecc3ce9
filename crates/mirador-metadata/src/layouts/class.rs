//! Class metadata layout

use std::ptr::NonNull;

use crate::descriptor::ContextDescriptor;
use crate::ptr::{MetadataKind, MetadataPtr};
use crate::witness::ValueWitnessTable;

use super::{MetadataLayout, MetadataReader};

/// Destroys instance variables after an early constructor return.
pub type IvarDestroyer = unsafe extern "C" fn(object: *mut u8);

// The rodata word carries "implemented in the host language" in its low
// bits: older runtimes set 0x1, newer ones 0x2. Foreign classes leave both
// clear.
const NATIVE_IMPLEMENTATION_MASK: usize = 0x3;

/// Fixed-shape view of class metadata.
///
/// The two reserve slots belong to the object-system runtime and are passed
/// through unexamined.
#[repr(C)]
pub struct ClassMetadataLayout {
    /// Shared value-witness table slot.
    pub value_witness_table: *const ValueWitnessTable,
    /// The isa slot; doubles as the kind discriminant for class records.
    pub isa: usize,
    /// Superclass metadata, null for a root class.
    pub superclass: *const (),
    /// Reserved for the object-system runtime.
    pub runtime_reserve1: usize,
    /// Reserved for the object-system runtime.
    pub runtime_reserve2: usize,
    /// Read-only class data; low bits flag the implementation language.
    pub rodata: usize,
    /// Class flags.
    pub class_flags: u32,
    /// The address point of instances of this type.
    pub instance_address_point: u32,
    /// The required size of instances of this type.
    pub instance_size: u32,
    /// The alignment mask of the address point of instances.
    pub instance_alignment_mask: u16,
    /// Reserved for runtime use.
    pub runtime_reserved: u16,
    /// Total size of the class object, prefix and suffix included.
    pub class_object_size: u32,
    /// Offset of the address point within the class object.
    pub class_object_address_point: u32,
    /// Out-of-line description of the type; null for artificial subclasses.
    pub context_descriptor: *const ContextDescriptor,
    /// Destroys instance variables on early constructor return; nullable.
    pub ivar_destroyer: Option<IvarDestroyer>,
}

impl MetadataLayout for ClassMetadataLayout {
    const CLAIMED_KIND: MetadataKind = MetadataKind::Class;

    fn matches(kind: MetadataKind) -> bool {
        kind.is_class_like()
    }

    fn value_witness_table(&self) -> *const ValueWitnessTable {
        self.value_witness_table
    }

    fn kind_word(&self) -> usize {
        self.isa
    }
}

impl MetadataReader<ClassMetadataLayout> {
    /// The superclass metadata pointer; `None` for a root class.
    pub fn superclass(&self) -> Option<MetadataPtr> {
        NonNull::new(self.layout().superclass as *mut ())
            .map(|address| unsafe { MetadataPtr::from_raw(address) })
    }

    /// The out-of-line context descriptor, if any.
    pub fn descriptor(&self) -> Option<&ContextDescriptor> {
        unsafe { self.layout().context_descriptor.as_ref() }
    }

    /// Required instance size in bytes.
    pub fn instance_size(&self) -> u32 {
        self.layout().instance_size
    }

    /// Alignment mask of the instance address point.
    pub fn instance_alignment_mask(&self) -> u16 {
        self.layout().instance_alignment_mask
    }

    /// The address point of instances.
    pub fn instance_address_point(&self) -> u32 {
        self.layout().instance_address_point
    }

    /// Whether the class is implemented entirely in the host language, as
    /// flagged in the rodata low bits.
    pub fn is_native(&self) -> bool {
        self.layout().rodata & NATIVE_IMPLEMENTATION_MASK != 0
    }

    /// The instance-variable destroyer, if the class has one.
    pub fn ivar_destroyer(&self) -> Option<IvarDestroyer> {
        self.layout().ivar_destroyer
    }
}
