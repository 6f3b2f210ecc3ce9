//! Self-relative pointer resolution
//!
//! The metadata ABI stores most cross-record references as a signed 32-bit
//! offset whose referent lives at `address_of(offset_field) + offset`. This
//! module is the one place that arithmetic happens; every higher-level reader
//! goes through it.

use std::marker::PhantomData;
use std::ptr::NonNull;

/// A signed 32-bit offset resolved relative to its own storage address.
///
/// A stored offset of zero is the conventional null sentinel and resolves to
/// `None`. No bounds checking is performed or possible: the resolver trusts
/// that it sits inside a genuine ABI record.
#[repr(transparent)]
pub struct RelativeDirectPointer<T> {
    offset: i32,
    _referent: PhantomData<T>,
}

impl<T> RelativeDirectPointer<T> {
    /// Build a pointer from a raw stored offset.
    ///
    /// Useful when constructing metadata records by hand (fixtures, record
    /// builders); real records arrive with the offset already in place.
    #[inline]
    pub const fn from_offset(offset: i32) -> Self {
        Self {
            offset,
            _referent: PhantomData,
        }
    }

    /// The raw stored offset.
    #[inline]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Resolve the referent address.
    ///
    /// Returns `None` for the zero-offset sentinel and for an offset whose
    /// computed address is zero; callers must treat that as a valid absence,
    /// not a fault.
    #[inline]
    pub fn resolve(&self) -> Option<NonNull<T>> {
        if self.offset == 0 {
            return None;
        }

        let base = self as *const Self as isize;
        let address = base.wrapping_add(self.offset as isize);

        NonNull::new(address as *mut T)
    }

    /// Resolve and dereference the referent.
    ///
    /// # Safety
    ///
    /// The caller must guarantee the stored offset was written by the
    /// runtime (or an equivalent record builder) so that the resolved
    /// address is a live `T` for the returned lifetime.
    #[inline]
    pub unsafe fn get<'a>(&self) -> Option<&'a T> {
        self.resolve().map(|ptr| ptr.as_ref())
    }
}

/// A self-relative reference to the first element of a trailing vector.
///
/// The element count is stored in an adjacent field of the enclosing record
/// and passed in by the caller; it is trusted without validation, mirroring
/// the ABI's own lack of self-description.
#[repr(transparent)]
pub struct RelativeVectorPointer<T> {
    base: RelativeDirectPointer<T>,
}

impl<T> RelativeVectorPointer<T> {
    /// Build a vector pointer from a raw stored offset.
    #[inline]
    pub const fn from_offset(offset: i32) -> Self {
        Self {
            base: RelativeDirectPointer::from_offset(offset),
        }
    }

    /// The raw stored offset.
    #[inline]
    pub fn offset(&self) -> i32 {
        self.base.offset()
    }

    /// Resolve the vector as a slice of `count` elements.
    ///
    /// Returns `None` when the stored offset is the null sentinel. A zero
    /// `count` yields an empty slice without touching the referent.
    ///
    /// # Safety
    ///
    /// `count` must not exceed the length of the vector the runtime actually
    /// allocated; the elements must be live `T`s for the returned lifetime.
    #[inline]
    pub unsafe fn slice<'a>(&self, count: usize) -> Option<&'a [T]> {
        if count == 0 {
            return Some(&[]);
        }

        self.base
            .resolve()
            .map(|ptr| std::slice::from_raw_parts(ptr.as_ptr(), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A record with the shape the ABI uses: the offset field followed by
    // the bytes it points at, all in one allocation so relative offsets
    // stay meaningful.
    #[repr(C)]
    struct Record {
        reference: RelativeDirectPointer<u64>,
        _pad: i32,
        target: u64,
    }

    fn make_record(value: u64) -> Box<Record> {
        let mut record = Box::new(Record {
            reference: RelativeDirectPointer {
                offset: 0,
                _referent: PhantomData,
            },
            _pad: 0,
            target: value,
        });

        let base = &record.reference as *const _ as isize;
        let target = &record.target as *const _ as isize;
        record.reference.offset = (target - base) as i32;

        record
    }

    #[test]
    fn test_zero_offset_resolves_to_null() {
        let pointer: RelativeDirectPointer<u64> = RelativeDirectPointer {
            offset: 0,
            _referent: PhantomData,
        };

        assert!(pointer.resolve().is_none());
    }

    #[test]
    fn test_nonzero_offset_resolves_to_base_plus_offset() {
        let record = make_record(0xDEAD_BEEF);

        let resolved = record.reference.resolve().unwrap();
        let expected = &record.target as *const u64 as usize;

        assert_eq!(resolved.as_ptr() as usize, expected);
        assert_eq!(
            resolved.as_ptr() as usize,
            (&record.reference as *const _ as usize)
                .wrapping_add(record.reference.offset() as usize)
        );
    }

    #[test]
    fn test_resolved_referent_reads_back() {
        let record = make_record(42);

        let value = unsafe { record.reference.get() }.unwrap();
        assert_eq!(*value, 42);
    }

    #[test]
    fn test_negative_offset() {
        #[repr(C)]
        struct Reversed {
            target: u64,
            reference: RelativeDirectPointer<u64>,
        }

        let mut record = Box::new(Reversed {
            target: 7,
            reference: RelativeDirectPointer {
                offset: 0,
                _referent: PhantomData,
            },
        });

        let base = &record.reference as *const _ as isize;
        let target = &record.target as *const _ as isize;
        record.reference.offset = (target - base) as i32;
        assert!(record.reference.offset() < 0);

        let value = unsafe { record.reference.get() }.unwrap();
        assert_eq!(*value, 7);
    }

    #[test]
    fn test_vector_slice() {
        #[repr(C)]
        struct VectorRecord {
            vector: RelativeVectorPointer<u32>,
            _pad: i32,
            elements: [u32; 3],
        }

        let mut record = Box::new(VectorRecord {
            vector: RelativeVectorPointer {
                base: RelativeDirectPointer {
                    offset: 0,
                    _referent: PhantomData,
                },
            },
            _pad: 0,
            elements: [10, 20, 30],
        });

        let base = &record.vector as *const _ as isize;
        let target = record.elements.as_ptr() as isize;
        record.vector.base.offset = (target - base) as i32;

        let slice = unsafe { record.vector.slice(3) }.unwrap();
        assert_eq!(slice, &[10, 20, 30]);
    }

    #[test]
    fn test_vector_zero_count_is_empty() {
        let vector: RelativeVectorPointer<u32> = RelativeVectorPointer {
            base: RelativeDirectPointer {
                offset: 0,
                _referent: PhantomData,
            },
        };

        let slice = unsafe { vector.slice(0) }.unwrap();
        assert!(slice.is_empty());
    }
}
