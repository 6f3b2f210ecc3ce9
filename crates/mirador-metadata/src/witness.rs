//! Value-witness table view
//!
//! Every metadata record, regardless of kind, carries a pointer to a
//! value-witness table: the fixed-shape header describing the type's size,
//! stride, alignment and value-lifecycle entry points. It is the only
//! structural guarantee shared by all kinds, which is why the typed layout
//! readers expose it before anything kind-specific.

/// Copies or moves a value between addresses, returning the destination.
pub type TransferWitness =
    unsafe extern "C" fn(dest: *mut u8, src: *mut u8, metadata: *const ()) -> *mut u8;

/// Destroys a value in place.
pub type DestroyWitness = unsafe extern "C" fn(object: *mut u8, metadata: *const ());

/// Reads the enum tag of a single-payload enum value.
pub type GetEnumTagWitness =
    unsafe extern "C" fn(value: *const u8, empty_cases: u32, metadata: *const ()) -> u32;

/// Stores the enum tag of a single-payload enum value.
pub type StoreEnumTagWitness =
    unsafe extern "C" fn(value: *mut u8, which_case: u32, empty_cases: u32, metadata: *const ());

// Flag bits packed next to the alignment mask.
const FLAG_IS_NON_POD: u32 = 0x0001_0000;
const FLAG_IS_NON_INLINE: u32 = 0x0002_0000;
const FLAG_HAS_ENUM_WITNESSES: u32 = 0x0020_0000;
const ALIGNMENT_MASK: u32 = 0x0000_00FF;

/// The fixed-layout header present at the start of every metadata record.
///
/// Read-only view with no ownership transfer and no validation that the
/// backing pointer is genuine; the caller obtained it from the runtime and
/// carries that responsibility.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ValueWitnessTable {
    /// Initializes a buffer with a copy of the value in another buffer.
    pub initialize_buffer_with_copy_of_buffer: Option<TransferWitness>,
    /// Destroys a value in place.
    pub destroy: Option<DestroyWitness>,
    /// Initializes a value with a copy of another.
    pub initialize_with_copy: Option<TransferWitness>,
    /// Assigns over an initialized value with a copy of another.
    pub assign_with_copy: Option<TransferWitness>,
    /// Initializes a value by consuming another.
    pub initialize_with_take: Option<TransferWitness>,
    /// Assigns over an initialized value by consuming another.
    pub assign_with_take: Option<TransferWitness>,
    /// Reads the tag of a single-payload enum.
    pub get_enum_tag_single_payload: Option<GetEnumTagWitness>,
    /// Stores the tag of a single-payload enum.
    pub store_enum_tag_single_payload: Option<StoreEnumTagWitness>,
    /// Value size in bytes.
    pub size: usize,
    /// Distance between consecutive elements in an array of this type.
    pub stride: usize,
    /// Alignment mask plus layout flag bits.
    pub flags: u32,
    /// Number of extra inhabitants in the value representation.
    pub extra_inhabitant_count: u32,
}

impl ValueWitnessTable {
    /// The alignment mask (`alignment - 1`).
    #[inline]
    pub fn alignment_mask(&self) -> usize {
        (self.flags & ALIGNMENT_MASK) as usize
    }

    /// The alignment in bytes.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment_mask() + 1
    }

    /// Whether values fit inline in an existential buffer.
    #[inline]
    pub fn is_inline_storage(&self) -> bool {
        self.flags & FLAG_IS_NON_INLINE == 0
    }

    /// Whether values are plain old data (no lifecycle work needed).
    #[inline]
    pub fn is_pod(&self) -> bool {
        self.flags & FLAG_IS_NON_POD == 0
    }

    /// Whether the table carries the enum-tag witnesses.
    #[inline]
    pub fn has_enum_witnesses(&self) -> bool {
        self.flags & FLAG_HAS_ENUM_WITNESSES != 0
    }
}
