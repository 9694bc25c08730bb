//! Mach-O definitions.
//!
//! The subset of the format needed to emit (and decode back) relocatable
//! `MH_OBJECT` files for the x86 CPU families: the file header, the segment
//! and symbol-table load commands, section headers, relocation entries and
//! `nlist` symbol entries. All fields are little-endian on x86.

#![allow(missing_docs)]

use crate::endian::{Endian, U16, U32, U64};
use crate::pod::Pod;

/// The 32-bit mach magic number.
pub const MH_MAGIC: u32 = 0xfeed_face;
/// The 64-bit mach magic number.
pub const MH_MAGIC_64: u32 = 0xfeed_facf;

/// Relocatable object file.
pub const MH_OBJECT: u32 = 0x1;

pub const CPU_TYPE_X86: u32 = 7;
pub const CPU_TYPE_X86_64: u32 = 0x0100_0007;
/// All x86 processors.
pub const CPU_SUBTYPE_I386_ALL: u32 = 3;

/// 32-bit segment load command.
pub const LC_SEGMENT: u32 = 0x1;
/// 64-bit segment load command.
pub const LC_SEGMENT_64: u32 = 0x19;
/// Symbol table load command.
pub const LC_SYMTAB: u32 = 0x2;

pub const VM_PROT_READ: u32 = 0x01;
pub const VM_PROT_WRITE: u32 = 0x02;
pub const VM_PROT_EXECUTE: u32 = 0x04;
/// Read, write and execute; what an `MH_OBJECT` segment asks for.
pub const VM_PROT_DEFAULT: u32 = VM_PROT_READ | VM_PROT_WRITE | VM_PROT_EXECUTE;

/// Mask for the section type in `Section*::flags`.
pub const SECTION_TYPE: u32 = 0x0000_00ff;
/// Regular section.
pub const S_REGULAR: u32 = 0x0;
/// Zero-filled on demand, occupies no file space.
pub const S_ZEROFILL: u32 = 0x1;

/// Section contains only true machine instructions.
pub const S_ATTR_PURE_INSTRUCTIONS: u32 = 0x8000_0000;
/// Section contains some machine instructions.
pub const S_ATTR_SOME_INSTRUCTIONS: u32 = 0x0000_0400;
/// Section has external relocation entries.
pub const S_ATTR_EXT_RELOC: u32 = 0x0000_0200;
/// Section has local relocation entries.
pub const S_ATTR_LOC_RELOC: u32 = 0x0000_0100;

/// Symbol is external.
pub const N_EXT: u8 = 0x01;
/// Undefined symbol; `n_sect` is `NO_SECT`.
pub const N_UNDF: u8 = 0x0;
/// Absolute symbol; `n_sect` is `NO_SECT`.
pub const N_ABS: u8 = 0x2;
/// Defined symbol; `n_sect` holds the section number.
pub const N_SECT: u8 = 0xe;
/// Mask for the type bits of `n_type`.
pub const N_TYPE: u8 = 0x0e;

/// Symbol is not in any section.
pub const NO_SECT: u8 = 0;
/// Sections 1 through 255 can be referenced from symbols.
pub const MAX_SECT: u8 = 255;

/// Absolute relocation; the default symbol number.
pub const R_ABS: u32 = 0;
/// A relocation entry with this bit set in its address is scattered.
pub const R_SCATTERED: u32 = 0x8000_0000;

/// Generic x86 relocation.
pub const GENERIC_RELOC_VANILLA: u8 = 0;

pub const X86_64_RELOC_UNSIGNED: u8 = 0;
pub const X86_64_RELOC_SIGNED: u8 = 1;
pub const X86_64_RELOC_BRANCH: u8 = 2;
pub const X86_64_RELOC_GOT_LOAD: u8 = 3;
pub const X86_64_RELOC_GOT: u8 = 4;
pub const X86_64_RELOC_SUBTRACTOR: u8 = 5;

/// The 32-bit mach header.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct MachHeader32<E: Endian> {
    pub magic: U32<E>,
    pub cputype: U32<E>,
    pub cpusubtype: U32<E>,
    pub filetype: U32<E>,
    pub ncmds: U32<E>,
    pub sizeofcmds: U32<E>,
    pub flags: U32<E>,
}

/// The 64-bit mach header.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct MachHeader64<E: Endian> {
    pub magic: U32<E>,
    pub cputype: U32<E>,
    pub cpusubtype: U32<E>,
    pub filetype: U32<E>,
    pub ncmds: U32<E>,
    pub sizeofcmds: U32<E>,
    pub flags: U32<E>,
    pub reserved: U32<E>,
}

/// 32-bit segment load command (`LC_SEGMENT`).
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct SegmentCommand32<E: Endian> {
    pub cmd: U32<E>,
    pub cmdsize: U32<E>,
    pub segname: [u8; 16],
    pub vmaddr: U32<E>,
    pub vmsize: U32<E>,
    pub fileoff: U32<E>,
    pub filesize: U32<E>,
    pub maxprot: U32<E>,
    pub initprot: U32<E>,
    pub nsects: U32<E>,
    pub flags: U32<E>,
}

/// 64-bit segment load command (`LC_SEGMENT_64`).
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct SegmentCommand64<E: Endian> {
    pub cmd: U32<E>,
    pub cmdsize: U32<E>,
    pub segname: [u8; 16],
    pub vmaddr: U64<E>,
    pub vmsize: U64<E>,
    pub fileoff: U64<E>,
    pub filesize: U64<E>,
    pub maxprot: U32<E>,
    pub initprot: U32<E>,
    pub nsects: U32<E>,
    pub flags: U32<E>,
}

/// 32-bit section header, nested after its segment command.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Section32<E: Endian> {
    pub sectname: [u8; 16],
    pub segname: [u8; 16],
    pub addr: U32<E>,
    pub size: U32<E>,
    pub offset: U32<E>,
    pub align: U32<E>,
    pub reloff: U32<E>,
    pub nreloc: U32<E>,
    pub flags: U32<E>,
    pub reserved1: U32<E>,
    pub reserved2: U32<E>,
}

/// 64-bit section header, nested after its segment command.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Section64<E: Endian> {
    pub sectname: [u8; 16],
    pub segname: [u8; 16],
    pub addr: U64<E>,
    pub size: U64<E>,
    pub offset: U32<E>,
    pub align: U32<E>,
    pub reloff: U32<E>,
    pub nreloc: U32<E>,
    pub flags: U32<E>,
    pub reserved1: U32<E>,
    pub reserved2: U32<E>,
    pub reserved3: U32<E>,
}

/// Symbol table load command (`LC_SYMTAB`).
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct SymtabCommand<E: Endian> {
    pub cmd: U32<E>,
    pub cmdsize: U32<E>,
    pub symoff: U32<E>,
    pub nsyms: U32<E>,
    pub stroff: U32<E>,
    pub strsize: U32<E>,
}

/// 32-bit symbol table entry.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Nlist32<E: Endian> {
    pub n_strx: U32<E>,
    pub n_type: u8,
    pub n_sect: u8,
    pub n_desc: U16<E>,
    pub n_value: U32<E>,
}

/// 64-bit symbol table entry.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Nlist64<E: Endian> {
    pub n_strx: U32<E>,
    pub n_type: u8,
    pub n_sect: u8,
    pub n_desc: U16<E>,
    pub n_value: U64<E>,
}

/// A relocation entry.
///
/// `r_address` is the offset of the item to relocate within its section;
/// `r_info` packs symbol number, pc-relative flag, length code, external
/// flag and relocation type. Use [`RelocationInfo`] to build or split the
/// packed word.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Relocation<E: Endian> {
    pub r_address: U32<E>,
    pub r_info: U32<E>,
}

impl<E: Endian> Relocation<E> {
    /// Split the packed info word into its fields.
    pub fn info(self, endian: E) -> RelocationInfo {
        let info = self.r_info.get(endian);
        RelocationInfo {
            r_symbolnum: info & 0x00ff_ffff,
            r_pcrel: (info >> 24) & 1 != 0,
            r_length: ((info >> 25) & 3) as u8,
            r_extern: (info >> 27) & 1 != 0,
            r_type: (info >> 28) as u8,
        }
    }
}

/// The unpacked fields of [`Relocation::r_info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelocationInfo {
    /// Symbol number if `r_extern`, section ordinal otherwise.
    pub r_symbolnum: u32,
    /// The fixed-up field is pc-relative.
    pub r_pcrel: bool,
    /// log2 of the byte count of the fixed-up field.
    pub r_length: u8,
    /// `r_symbolnum` is a symbol number.
    pub r_extern: bool,
    /// Architecture-specific relocation type.
    pub r_type: u8,
}

impl RelocationInfo {
    /// Pack into a relocation entry at the given section offset.
    pub fn relocation<E: Endian>(self, endian: E, r_address: i32) -> Relocation<E> {
        let mut info = self.r_symbolnum & 0x00ff_ffff;
        if self.r_pcrel {
            info |= 1 << 24;
        }
        info |= u32::from(self.r_length & 3) << 25;
        if self.r_extern {
            info |= 1 << 27;
        }
        info |= u32::from(self.r_type) << 28;
        Relocation {
            r_address: U32::new(endian, r_address as u32),
            r_info: U32::new(endian, info),
        }
    }
}

macro_rules! unsafe_impl_endian_pod {
    ($($struct_name:ident),+ $(,)?) => {
        $(
            unsafe impl<E: Endian> Pod for $struct_name<E> { }
        )+
    }
}

unsafe_impl_endian_pod!(
    MachHeader32,
    MachHeader64,
    SegmentCommand32,
    SegmentCommand64,
    Section32,
    Section64,
    SymtabCommand,
    Nlist32,
    Nlist64,
    Relocation,
);
