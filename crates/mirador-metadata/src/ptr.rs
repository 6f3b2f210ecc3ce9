//! Opaque metadata pointers and kind classification

use std::ptr::NonNull;

/// Discriminant values above this threshold are not kind codes at all but
/// isa pointers, which marks the record as class metadata.
const LAST_ENUMERATED_KIND: usize = 0x7FF;

/// The kind discriminant that leads every metadata record.
///
/// Decoded from the versioned ABI mapping: legacy runtimes used small
/// sequential values, newer ones compose a low ordinal with the non-heap /
/// runtime-private / non-type flag bits, and any value large enough to be a
/// pointer is an isa slot identifying class metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    /// Class metadata (the discriminant slot holds an isa pointer).
    Class,
    /// Struct metadata.
    Struct,
    /// Enum metadata.
    Enum,
    /// Optional (a runtime-privileged enum).
    Optional,
    /// Foreign class metadata.
    ForeignClass,
    /// Opaque metadata.
    Opaque,
    /// Tuple metadata.
    Tuple,
    /// Function metadata.
    Function,
    /// Protocol-existential metadata.
    Existential,
    /// Metatype metadata.
    Metatype,
    /// A wrapped foreign-object-system class.
    ForeignClassWrapper,
    /// Existential metatype metadata.
    ExistentialMetatype,
    /// Heap-allocated local variable (non-type record).
    HeapLocalVariable,
    /// Generic heap-allocated local variable (non-type record).
    HeapGenericLocalVariable,
    /// Runtime error object (non-type record).
    ErrorObject,
    /// A discriminant this reader does not know; the raw value is preserved
    /// so callers can still classify or log it.
    Unknown(usize),
}

impl MetadataKind {
    /// Decode a raw discriminant word.
    ///
    /// Each kind is listed with both its legacy sequential value and its
    /// flag-composed value (low ordinal | 0x200 non-heap | 0x100
    /// runtime-private | 0x400 non-type).
    pub fn from_raw(raw: usize) -> Self {
        match raw {
            0 => MetadataKind::Class,
            v if v > LAST_ENUMERATED_KIND => MetadataKind::Class,
            1 | 0x200 => MetadataKind::Struct,
            2 | 0x201 => MetadataKind::Enum,
            3 | 0x202 => MetadataKind::Optional,
            16 | 0x203 => MetadataKind::ForeignClass,
            8 | 0x300 => MetadataKind::Opaque,
            9 | 0x301 => MetadataKind::Tuple,
            10 | 0x302 => MetadataKind::Function,
            12 | 0x303 => MetadataKind::Existential,
            13 | 0x304 => MetadataKind::Metatype,
            14 | 0x305 => MetadataKind::ForeignClassWrapper,
            15 | 0x306 => MetadataKind::ExistentialMetatype,
            64 | 0x400 => MetadataKind::HeapLocalVariable,
            65 | 0x500 => MetadataKind::HeapGenericLocalVariable,
            128 | 0x501 => MetadataKind::ErrorObject,
            other => MetadataKind::Unknown(other),
        }
    }

    /// Whether the record describes a class-like type.
    pub fn is_class_like(self) -> bool {
        matches!(
            self,
            MetadataKind::Class | MetadataKind::ForeignClass | MetadataKind::ForeignClassWrapper
        )
    }
}

/// An opaque, non-owning address identifying a live type-metadata record.
///
/// The pointer addresses the kind discriminant word; the value-witness table
/// slot sits one pointer-width before it. Pointers are handed in by a
/// reflection facility outside this crate and stay valid for the process
/// lifetime of the code that produced them; this subsystem never frees one.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetadataPtr(NonNull<()>);

impl MetadataPtr {
    /// Wrap a raw metadata address.
    ///
    /// # Safety
    ///
    /// `address` must point at a genuine, live metadata record as laid out
    /// by the runtime. That claim is made once here; every read the typed
    /// views perform afterwards relies on it.
    #[inline]
    pub const unsafe fn from_raw(address: NonNull<()>) -> Self {
        Self(address)
    }

    /// The raw address.
    #[inline]
    pub fn as_raw(self) -> *const () {
        self.0.as_ptr()
    }

    /// Read and decode the leading kind discriminant.
    #[inline]
    pub fn kind(self) -> MetadataKind {
        // Valid per the from_raw contract: every record leads with the
        // discriminant word.
        let raw = unsafe { *(self.0.as_ptr() as *const usize) };
        MetadataKind::from_raw(raw)
    }
}

// Metadata records are immutable and process-lived.
unsafe impl Send for MetadataPtr {}
unsafe impl Sync for MetadataPtr {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_kind_values() {
        assert_eq!(MetadataKind::from_raw(1), MetadataKind::Struct);
        assert_eq!(MetadataKind::from_raw(2), MetadataKind::Enum);
        assert_eq!(MetadataKind::from_raw(3), MetadataKind::Optional);
        assert_eq!(MetadataKind::from_raw(9), MetadataKind::Tuple);
        assert_eq!(MetadataKind::from_raw(10), MetadataKind::Function);
        assert_eq!(MetadataKind::from_raw(12), MetadataKind::Existential);
        assert_eq!(MetadataKind::from_raw(13), MetadataKind::Metatype);
        assert_eq!(MetadataKind::from_raw(16), MetadataKind::ForeignClass);
        assert_eq!(MetadataKind::from_raw(64), MetadataKind::HeapLocalVariable);
        assert_eq!(MetadataKind::from_raw(128), MetadataKind::ErrorObject);
    }

    #[test]
    fn test_flag_composed_kind_values() {
        assert_eq!(MetadataKind::from_raw(0x200), MetadataKind::Struct);
        assert_eq!(MetadataKind::from_raw(0x201), MetadataKind::Enum);
        assert_eq!(MetadataKind::from_raw(0x202), MetadataKind::Optional);
        assert_eq!(MetadataKind::from_raw(0x203), MetadataKind::ForeignClass);
        assert_eq!(MetadataKind::from_raw(0x300), MetadataKind::Opaque);
        assert_eq!(MetadataKind::from_raw(0x301), MetadataKind::Tuple);
        assert_eq!(MetadataKind::from_raw(0x302), MetadataKind::Function);
        assert_eq!(MetadataKind::from_raw(0x303), MetadataKind::Existential);
        assert_eq!(MetadataKind::from_raw(0x304), MetadataKind::Metatype);
        assert_eq!(
            MetadataKind::from_raw(0x305),
            MetadataKind::ForeignClassWrapper
        );
        assert_eq!(
            MetadataKind::from_raw(0x306),
            MetadataKind::ExistentialMetatype
        );
        assert_eq!(MetadataKind::from_raw(0x400), MetadataKind::HeapLocalVariable);
        assert_eq!(
            MetadataKind::from_raw(0x500),
            MetadataKind::HeapGenericLocalVariable
        );
        assert_eq!(MetadataKind::from_raw(0x501), MetadataKind::ErrorObject);
    }

    #[test]
    fn test_isa_pointer_classifies_as_class() {
        assert_eq!(MetadataKind::from_raw(0), MetadataKind::Class);
        assert_eq!(MetadataKind::from_raw(0x8000), MetadataKind::Class);
        assert_eq!(
            MetadataKind::from_raw(0x7F12_3456_7890),
            MetadataKind::Class
        );
        assert!(MetadataKind::from_raw(0x8000).is_class_like());
    }

    #[test]
    fn test_unknown_kind_preserves_raw_value() {
        assert_eq!(MetadataKind::from_raw(77), MetadataKind::Unknown(77));
    }
}
