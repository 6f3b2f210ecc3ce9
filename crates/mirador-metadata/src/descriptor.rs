//! Context descriptor reader
//!
//! A context descriptor is the out-of-line record a metadata layout points
//! at. It carries the type's short declared name and a link to its enclosing
//! context, forming a parent chain that terminates at a module-level context.

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::relative::RelativeDirectPointer;

/// The context kind stored in the low five bits of the descriptor flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// A module-level context; the root of every parent chain.
    Module,
    /// An extension context.
    Extension,
    /// An anonymous context.
    Anonymous,
    /// A protocol context.
    Protocol,
    /// An opaque-type context.
    OpaqueType,
    /// A class declaration.
    Class,
    /// A struct declaration.
    Struct,
    /// An enum declaration.
    Enum,
    /// A kind code this reader does not know.
    Unknown(u8),
}

impl ContextKind {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => ContextKind::Module,
            1 => ContextKind::Extension,
            2 => ContextKind::Anonymous,
            3 => ContextKind::Protocol,
            4 => ContextKind::OpaqueType,
            16 => ContextKind::Class,
            17 => ContextKind::Struct,
            18 => ContextKind::Enum,
            other => ContextKind::Unknown(other),
        }
    }

    /// Whether this context declares a nominal type.
    pub fn is_nominal_type(self) -> bool {
        matches!(
            self,
            ContextKind::Class | ContextKind::Struct | ContextKind::Enum
        )
    }
}

const KIND_MASK: u32 = 0x1F;
const FLAG_UNIQUE: u32 = 1 << 6;
const FLAG_GENERIC: u32 = 1 << 7;

/// The packed flag word leading every context descriptor.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextDescriptorFlags(pub u32);

impl ContextDescriptorFlags {
    /// The context kind in the low five bits.
    #[inline]
    pub fn kind(self) -> ContextKind {
        ContextKind::from_raw((self.0 & KIND_MASK) as u8)
    }

    /// Whether the descriptor is unique in its image.
    #[inline]
    pub fn is_unique(self) -> bool {
        self.0 & FLAG_UNIQUE != 0
    }

    /// Whether the declared type is generic.
    #[inline]
    pub fn is_generic(self) -> bool {
        self.0 & FLAG_GENERIC != 0
    }

    /// The descriptor format version byte.
    #[inline]
    pub fn version(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// The kind-specific flag half-word.
    #[inline]
    pub fn kind_specific_flags(self) -> u16 {
        ((self.0 >> 16) & 0xFFFF) as u16
    }
}

/// The shared prefix of every context descriptor record.
///
/// Both links are self-relative; a null parent marks a chain root. Reads
/// trust the backing bytes per the crate-level contract.
#[repr(C)]
pub struct ContextDescriptor {
    /// Packed kind and flag bits.
    pub flags: ContextDescriptorFlags,
    /// Link to the enclosing context; null at a module context.
    pub parent: RelativeDirectPointer<ContextDescriptor>,
    /// The declared short name, null-terminated.
    pub name: RelativeDirectPointer<c_char>,
}

impl ContextDescriptor {
    /// The context kind.
    #[inline]
    pub fn kind(&self) -> ContextKind {
        self.flags.kind()
    }

    /// The declared short name.
    ///
    /// `None` when the name link is null or the bytes are not UTF-8.
    pub fn name(&self) -> Option<&str> {
        let pointer = self.name.resolve()?;
        // Null-terminated per the record contract.
        let bytes = unsafe { CStr::from_ptr(pointer.as_ptr()) };
        bytes.to_str().ok()
    }

    /// The enclosing context, or `None` at a chain root.
    pub fn parent(&self) -> Option<&ContextDescriptor> {
        unsafe { self.parent.get() }
    }

    /// Walk the parent chain to the module-level context.
    ///
    /// Stops at the first context marked as a module, or at the last
    /// context with no further parent.
    pub fn module(&self) -> &ContextDescriptor {
        let mut current = self;
        while current.kind() != ContextKind::Module {
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// The full dot-joined qualified path, outermost context first.
    ///
    /// Contexts without a readable name (anonymous contexts, corrupt name
    /// bytes) are skipped rather than rendered as placeholders.
    pub fn qualified_name(&self) -> String {
        let mut components = Vec::new();
        let mut current = Some(self);

        while let Some(descriptor) = current {
            if let Some(name) = descriptor.name() {
                components.push(name);
            }
            current = descriptor.parent();
        }

        components.reverse();
        components.join(".")
    }
}
