use core::mem;
use std::vec::Vec;

use crate::endian::LE;
use crate::macho;

use super::reloc::{RelocTarget, SymNum};
use super::util::align_u64;
use super::Object;

/// Byte (i.e. no) alignment.
const DEFAULT_SECTION_ALIGNMENT: u32 = 0;

impl Object {
    /// Order the symbol table and string table the way the dynamic linker
    /// expects.
    ///
    /// The symbol table becomes: local symbols in definition order, then
    /// defined external symbols sorted by name, then undefined external
    /// symbols sorted by name. The string table holds the external names
    /// first and the local names after them, which is why the names are
    /// appended in two passes.
    pub(crate) fn layout_symbols(&mut self) {
        let mut numsyms = 0;
        let mut nlocalsym = 0;
        let mut nextdefsym = 0;
        let mut nundefsym = 0;

        for sym in &mut self.symbols {
            // Undefined symbols are external by definition.
            if sym.ntype == macho::N_UNDF {
                sym.ntype |= macho::N_EXT;
            }

            if !sym.is_external() {
                sym.snum = numsyms;
                numsyms += 1;
                nlocalsym += 1;
            } else {
                if sym.ntype & macho::N_TYPE != macho::N_UNDF {
                    nextdefsym += 1;
                } else {
                    nundefsym += 1;
                }
                sym.strx = self.strs.add(&sym.name);
            }
        }

        self.ilocalsym = 0;
        self.iextdefsym = nlocalsym;
        self.iundefsym = nlocalsym + nextdefsym;

        let mut extdefsyms = Vec::with_capacity(nextdefsym as usize);
        let mut undefsyms = Vec::with_capacity(nundefsym as usize);
        for (i, sym) in self.symbols.iter_mut().enumerate() {
            if !sym.is_external() {
                sym.strx = self.strs.add(&sym.name);
            } else if sym.ntype & macho::N_TYPE != macho::N_UNDF {
                extdefsyms.push(i);
            } else {
                undefsyms.push(i);
            }
        }

        extdefsyms.sort_by(|&a, &b| self.symbols[a].name.cmp(&self.symbols[b].name));
        undefsyms.sort_by(|&a, &b| self.symbols[a].name.cmp(&self.symbols[b].name));

        for &i in &extdefsyms {
            self.symbols[i].snum = numsyms;
            numsyms += 1;
        }
        for &i in &undefsyms {
            self.symbols[i].snum = numsyms;
            numsyms += 1;
        }

        self.nsyms = numsyms;
        self.nlocalsym = nlocalsym;
        self.nextdefsym = nextdefsym;
        self.nundefsym = nundefsym;
        self.extdefsyms = extdefsyms;
        self.undefsyms = undefsyms;
    }

    /// Rewrite relocation symbol numbers from registration order to the
    /// final order assigned by [`Self::layout_symbols`].
    ///
    /// Section-index relocations need no rewriting. An initial number that
    /// matches no symbol (the `..gotpcrel` pseudo-segment id) is left alone.
    pub(crate) fn fixup_relocs(&mut self) {
        let symbols = &self.symbols;
        for sect in &mut self.sections {
            for reloc in &mut sect.relocs {
                if let RelocTarget::Symbol(SymNum::Initial(initial)) = reloc.target {
                    if let Some(sym) = symbols
                        .iter()
                        .find(|sym| sym.initial_snum == Some(initial))
                    {
                        reloc.target = RelocTarget::Symbol(SymNum::Final(sym.snum));
                    }
                }
            }
        }
    }

    /// Assign in-memory addresses and file offsets to all sections and
    /// compute the load command totals.
    pub(crate) fn calculate_sizes(&mut self) {
        for s in &mut self.sections {
            let align = *s.align.get_or_insert(DEFAULT_SECTION_ALIGNMENT);
            s.addr = align_u64(self.seg_vmsize, 1 << align);
            self.seg_vmsize = s.addr + s.size;

            // Zerofill sections take no file space. Everything else starts
            // on a 4-byte boundary; LLVM's assembler does the same.
            if !s.is_zerofill() {
                let pad = (align_u64(self.seg_filesize, 4) - self.seg_filesize) as u32;
                s.pad = Some(pad);
                s.offset = self.seg_filesize + u64::from(pad);
                self.seg_filesize += s.size + u64::from(pad);
            }

            self.seg_nsects += 1;
        }

        if self.seg_nsects > 0 {
            self.head_ncmds += 1;
            self.head_sizeofcmds += self.fmt.segcmd_size + self.seg_nsects * self.fmt.sectcmd_size;
        }

        if self.nsyms > 0 {
            self.head_ncmds += 1;
            self.head_sizeofcmds += mem::size_of::<macho::SymtabCommand<LE>>() as u32;
        }
    }
}
