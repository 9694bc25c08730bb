use crate::endian::Endian;
use crate::macho;

use super::{Error, Object, Result, SegmentId, Symbol};

/// Classified relocation kind, derived from the emission event and its
/// operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RelocKind {
    /// Absolute relocation.
    Abs,
    /// Relative relocation (X86_64_RELOC_SIGNED).
    Rel,
    /// X86_64_RELOC_SUBTRACTOR.
    #[allow(dead_code)]
    Sub,
    /// X86_64_RELOC_GOT.
    Got,
    /// X86_64_RELOC_GOT_LOAD.
    GotLoad,
}

/// A symbol number as stored in a relocation.
///
/// Relocations are created while the final symbol order is still unknown, so
/// they initially carry the registration-order number; the fix-up pass after
/// layout replaces it with the final one. The two number spaces must never
/// be mixed, hence the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SymNum {
    Initial(u32),
    Final(u32),
}

/// What the 24-bit symbolnum field of a relocation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RelocTarget {
    /// An entry in the symbol table (`r_extern` set).
    Symbol(SymNum),
    /// A section file index (`r_extern` clear).
    #[allow(dead_code)]
    Section(u8),
}

/// A relocation recorded against a section.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reloc {
    /// Offset of the fixed-up field within the section.
    pub(crate) addr: i32,
    pub(crate) target: RelocTarget,
    pub(crate) pcrel: bool,
    /// log2 of the byte count.
    pub(crate) length: u8,
    pub(crate) rtype: u8,
}

impl Reloc {
    /// The on-disk form of this relocation.
    pub(crate) fn entry<E: Endian>(&self, endian: E) -> macho::Relocation<E> {
        let (r_symbolnum, r_extern) = match self.target {
            RelocTarget::Symbol(SymNum::Initial(n)) | RelocTarget::Symbol(SymNum::Final(n)) => {
                (n, true)
            }
            RelocTarget::Section(fi) => (u32::from(fi), false),
        };
        macho::RelocationInfo {
            r_symbolnum,
            r_pcrel: self.pcrel,
            r_length: self.length,
            r_extern,
            r_type: self.rtype,
        }
        .relocation(endian, self.addr)
    }
}

impl Object {
    /// Record a relocation at the current end of the section at `pos`,
    /// against the operand section `section`.
    ///
    /// Returns the adjustment the caller must subtract from the data word it
    /// is about to write: for targets bound to a local symbol this rebases
    /// the word from "absolute target" to "offset within the nearest
    /// symbol", which is what the linker expects.
    pub(crate) fn add_reloc(
        &mut self,
        pos: usize,
        section: SegmentId,
        kind: RelocKind,
        bytes: u32,
        reloff: i64,
    ) -> Result<i64> {
        let mut adjustment = 0i64;
        let mut pcrel = false;
        let mut rtype = macho::GENERIC_RELOC_VANILLA;
        let mut snum = SymNum::Initial(macho::R_ABS);
        let mut extreloc = false;

        match kind {
            RelocKind::Abs | RelocKind::Rel => {
                if kind == RelocKind::Rel {
                    pcrel = true;
                    rtype = macho::X86_64_RELOC_SIGNED;
                }
                let fi = self.section_file_index(section);
                if fi == macho::NO_SECT {
                    // The operand names an external symbol's segment; use
                    // the symbol number recorded at definition time.
                    if kind == RelocKind::Rel {
                        extreloc = true;
                    }
                    snum = SymNum::Initial(self.extsyms.get(&section).copied().unwrap_or(0));
                } else {
                    // A section of this object. Bind to the nearest
                    // preceding symbol and rebase the data word onto it.
                    let sym = self.closest_section_symbol(fi, reloff)?;
                    snum = SymNum::Initial(sym.initial_snum.unwrap_or(0));
                    adjustment = sym.value as i64;
                }
            }
            RelocKind::Sub => {
                rtype = macho::X86_64_RELOC_SUBTRACTOR;
            }
            RelocKind::Got => {
                pcrel = true;
                rtype = macho::X86_64_RELOC_GOT;
                snum = SymNum::Initial(self.gotpcrel_symbolnum());
            }
            RelocKind::GotLoad => {
                pcrel = true;
                rtype = macho::X86_64_RELOC_GOT_LOAD;
                snum = SymNum::Initial(self.gotpcrel_symbolnum());
            }
        }

        let sect = &mut self.sections[pos];
        // The fixed-up word starts at the current end of the section. Mask
        // the top bit so the entry can never read as scattered.
        let addr = (sect.size as u32 & !macho::R_SCATTERED) as i32;
        // Relocation entries go out in reverse order of creation, matching
        // the native assembler; `relocs` is reversed when written.
        sect.relocs.push(Reloc {
            addr,
            target: RelocTarget::Symbol(snum),
            pcrel,
            length: log2(bytes),
            rtype,
        });
        if extreloc {
            sect.extreloc = true;
        }

        Ok(adjustment)
    }

    /// The last symbol in definition order that lives in the section with
    /// file index `fileindex` at an offset no greater than `offset`.
    ///
    /// Symbols within one section are registered in increasing-offset order,
    /// so the scan can stop at the first symbol past `offset`.
    fn closest_section_symbol(&self, fileindex: u8, offset: i64) -> Result<&Symbol> {
        let mut nearest = None;
        for sym in &self.symbols {
            if sym.sect != macho::NO_SECT && sym.sect == fileindex {
                if sym.value as i64 > offset {
                    break;
                }
                nearest = Some(sym);
            }
        }
        nearest.ok_or_else(|| {
            Error(format!(
                "no section for index {:x} offset {:x} found",
                fileindex, offset
            ))
        })
    }

    fn gotpcrel_symbolnum(&self) -> u32 {
        self.gotpcrel_sect.map_or(macho::R_ABS, |seg| seg.0 as u32)
    }
}

/// log2 of a relocation byte count (1, 2, 4 or 8).
fn log2(bytes: u32) -> u8 {
    debug_assert!(bytes != 0);
    (31 - bytes.leading_zeros()) as u8
}
