use core::mem;
use std::vec::Vec;

use crate::endian::{LittleEndian as LE, U16, U32, U64};
use crate::macho;
use crate::pod::bytes_of;

use super::reloc::RelocTarget;
use super::util::{align_u64, write_zeroes, WritableBuffer};
use super::{Error, Object, Result, Symbol};

impl Object {
    /// Finalize the object and return the serialized file.
    pub fn write(mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.emit(&mut buffer)?;
        Ok(buffer)
    }

    /// Finalize the object and serialize it into `buffer`.
    ///
    /// This lays out symbols and sections, rewrites relocations and section
    /// payloads, and writes the complete file. It must be called at most
    /// once; use [`Object::diagnostics`] afterwards to inspect what was
    /// reported along the way.
    pub fn emit(&mut self, buffer: &mut dyn WritableBuffer) -> Result<()> {
        self.layout_symbols();
        self.fixup_relocs();
        self.calculate_sizes();

        let total = self.total_file_size();
        buffer
            .reserve(total as usize)
            .map_err(|_| Error("cannot allocate buffer".into()))?;

        self.write_header(buffer);

        let mut offset = u64::from(self.fmt.header_size) + u64::from(self.head_sizeofcmds);
        if self.seg_nsects > 0 {
            offset = self.write_segment_command(buffer, offset);
        } else {
            self.warn("no sections?");
        }

        if self.nsyms > 0 {
            buffer.write_bytes(bytes_of(&macho::SymtabCommand::<LE> {
                cmd: U32::new(LE, macho::LC_SYMTAB),
                cmdsize: U32::new(LE, mem::size_of::<macho::SymtabCommand<LE>>() as u32),
                symoff: U32::new(LE, offset as u32),
                nsyms: U32::new(LE, self.nsyms),
                stroff: U32::new(
                    LE,
                    (offset + u64::from(self.nsyms) * u64::from(self.fmt.nlist_size)) as u32,
                ),
                strsize: U32::new(LE, self.strs.len()),
            }));
        }

        if self.seg_nsects > 0 {
            self.write_section_data(buffer);
        }

        if self.nsyms > 0 {
            self.write_symtab(buffer);
        }

        // No padding needed; relocation entries and nlists keep the file
        // aligned. The string table is written even when it is empty so the
        // reserved NUL is accounted for.
        buffer.write_bytes(self.strs.data());

        debug_assert_eq!(buffer.len() as u64, total);
        Ok(())
    }

    /// The exact size of the serialized file:
    /// header + load commands + padded section data + relocation entries +
    /// symbol table + string table.
    fn total_file_size(&self) -> u64 {
        let mut total = u64::from(self.fmt.header_size) + u64::from(self.head_sizeofcmds);
        if self.seg_nsects > 0 {
            total = align_u64(total + self.seg_filesize, u64::from(self.fmt.ptrsize));
            let nreloc: u64 = self.sections.iter().map(|s| s.relocs.len() as u64).sum();
            total += nreloc * mem::size_of::<macho::Relocation<LE>>() as u64;
        }
        total += u64::from(self.nsyms) * u64::from(self.fmt.nlist_size);
        total += u64::from(self.strs.len());
        total
    }

    fn write_header(&self, buffer: &mut dyn WritableBuffer) {
        if self.fmt.ptrsize == 8 {
            buffer.write_bytes(bytes_of(&macho::MachHeader64::<LE> {
                magic: U32::new(LE, self.fmt.magic),
                cputype: U32::new(LE, self.fmt.cpu_type),
                cpusubtype: U32::new(LE, macho::CPU_SUBTYPE_I386_ALL),
                filetype: U32::new(LE, macho::MH_OBJECT),
                ncmds: U32::new(LE, self.head_ncmds),
                sizeofcmds: U32::new(LE, self.head_sizeofcmds),
                flags: U32::new(LE, 0),
                reserved: U32::new(LE, 0),
            }));
        } else {
            buffer.write_bytes(bytes_of(&macho::MachHeader32::<LE> {
                magic: U32::new(LE, self.fmt.magic),
                cputype: U32::new(LE, self.fmt.cpu_type),
                cpusubtype: U32::new(LE, macho::CPU_SUBTYPE_I386_ALL),
                filetype: U32::new(LE, macho::MH_OBJECT),
                ncmds: U32::new(LE, self.head_ncmds),
                sizeofcmds: U32::new(LE, self.head_sizeofcmds),
                flags: U32::new(LE, 0),
            }));
        }
    }

    /// Write the segment load command and its section commands.
    ///
    /// `offset` is the file offset of the data area; the return value is
    /// where the symbol table will start (after the relocation entries).
    fn write_segment_command(&mut self, buffer: &mut dyn WritableBuffer, mut offset: u64) -> u64 {
        let data_base = offset;
        let rel_base = align_u64(offset + self.seg_filesize, u64::from(self.fmt.ptrsize));
        let mut s_reloff: u64 = 0;
        let cmdsize = self.fmt.segcmd_size + self.seg_nsects * self.fmt.sectcmd_size;

        // An MH_OBJECT file carries all sections in one unnamed segment.
        if self.fmt.ptrsize == 8 {
            buffer.write_bytes(bytes_of(&macho::SegmentCommand64::<LE> {
                cmd: U32::new(LE, self.fmt.lc_segment),
                cmdsize: U32::new(LE, cmdsize),
                segname: [0; 16],
                vmaddr: U64::new(LE, 0),
                vmsize: U64::new(LE, self.seg_vmsize),
                fileoff: U64::new(LE, offset),
                filesize: U64::new(LE, self.seg_filesize),
                maxprot: U32::new(LE, macho::VM_PROT_DEFAULT),
                initprot: U32::new(LE, macho::VM_PROT_DEFAULT),
                nsects: U32::new(LE, self.seg_nsects),
                flags: U32::new(LE, 0),
            }));
        } else {
            buffer.write_bytes(bytes_of(&macho::SegmentCommand32::<LE> {
                cmd: U32::new(LE, self.fmt.lc_segment),
                cmdsize: U32::new(LE, cmdsize),
                segname: [0; 16],
                vmaddr: U32::new(LE, 0),
                vmsize: U32::new(LE, self.seg_vmsize as u32),
                fileoff: U32::new(LE, offset as u32),
                filesize: U32::new(LE, self.seg_filesize as u32),
                maxprot: U32::new(LE, macho::VM_PROT_DEFAULT),
                initprot: U32::new(LE, macho::VM_PROT_DEFAULT),
                nsects: U32::new(LE, self.seg_nsects),
                flags: U32::new(LE, 0),
            }));
        }

        for s in &mut self.sections {
            let nreloc = s.relocs.len() as u32;
            if nreloc > 0 {
                s.flags |= macho::S_ATTR_LOC_RELOC;
                if s.extreloc {
                    s.flags |= macho::S_ATTR_EXT_RELOC;
                }
            }

            let mut fileoff = 0;
            let mut reloff = 0;
            let mut nreloc_field = 0;
            if !s.is_zerofill() {
                debug_assert!(s.pad.is_some());
                offset += u64::from(s.pad.unwrap_or(0));
                fileoff = offset;
                debug_assert_eq!(fileoff, data_base + s.offset);
                offset += s.size;
                // cctools emits a zero reloff when there are no relocations.
                if nreloc > 0 {
                    reloff = rel_base + s_reloff;
                }
                nreloc_field = nreloc;
                s_reloff += u64::from(nreloc) * mem::size_of::<macho::Relocation<LE>>() as u64;
            }

            let align = s.align.unwrap_or(0);
            if self.fmt.ptrsize == 8 {
                buffer.write_bytes(bytes_of(&macho::Section64::<LE> {
                    sectname: s.sectname,
                    segname: s.segname,
                    addr: U64::new(LE, s.addr),
                    size: U64::new(LE, s.size),
                    offset: U32::new(LE, fileoff as u32),
                    align: U32::new(LE, align),
                    reloff: U32::new(LE, reloff as u32),
                    nreloc: U32::new(LE, nreloc_field),
                    flags: U32::new(LE, s.flags),
                    reserved1: U32::new(LE, 0),
                    reserved2: U32::new(LE, 0),
                    reserved3: U32::new(LE, 0),
                }));
            } else {
                buffer.write_bytes(bytes_of(&macho::Section32::<LE> {
                    sectname: s.sectname,
                    segname: s.segname,
                    addr: U32::new(LE, s.addr as u32),
                    size: U32::new(LE, s.size as u32),
                    offset: U32::new(LE, fileoff as u32),
                    align: U32::new(LE, align),
                    reloff: U32::new(LE, reloff as u32),
                    nreloc: U32::new(LE, nreloc_field),
                    flags: U32::new(LE, s.flags),
                    reserved1: U32::new(LE, 0),
                    reserved2: U32::new(LE, 0),
                }));
            }
        }

        self.rel_padcnt = rel_base - offset;
        rel_base + s_reloff
    }

    /// Write the padded section payloads followed by the relocation entries.
    fn write_section_data(&mut self, buffer: &mut dyn WritableBuffer) {
        let addrs: Vec<u64> = self.sections.iter().map(|s| s.addr).collect();

        for s in &mut self.sections {
            if s.is_zerofill() {
                continue;
            }

            // Section-index relocations hold an offset in the data word;
            // absorb the target section's base address now that it is known.
            // The linker only sees the remaining fix-up.
            for reloc in s.relocs.iter().rev() {
                let RelocTarget::Section(fi) = reloc.target else {
                    continue;
                };
                let mut len = 1usize << reloc.length;
                if len > 4 {
                    len = 8;
                }
                let start = reloc.addr as usize;
                let mut word = [0u8; 8];
                word[..len].copy_from_slice(&s.data[start..start + len]);
                let mut value = i64::from_le_bytes(word);
                if let Some(addr) = usize::from(fi).checked_sub(1).and_then(|i| addrs.get(i)) {
                    value = value.wrapping_add(*addr as i64);
                }
                s.data[start..start + len].copy_from_slice(&value.to_le_bytes()[..len]);
            }

            debug_assert_eq!(s.size, s.data.len() as u64);
            write_zeroes(buffer, s.pad.unwrap_or(0) as usize);
            buffer.write_bytes(&s.data);
        }

        // Pad the last section up to the relocation entries on a pointer
        // boundary.
        write_zeroes(buffer, self.rel_padcnt as usize);

        for s in &self.sections {
            for reloc in s.relocs.iter().rev() {
                buffer.write_bytes(bytes_of(&reloc.entry(LE)));
            }
        }
    }

    /// Write the symbol table in its three groups: locals in definition
    /// order, then the sorted defined and undefined externals.
    fn write_symtab(&self, buffer: &mut dyn WritableBuffer) {
        debug_assert_eq!(self.ilocalsym, 0);
        debug_assert_eq!(self.iextdefsym, self.nlocalsym);
        debug_assert_eq!(self.iundefsym, self.nlocalsym + self.nextdefsym);
        debug_assert_eq!(self.iundefsym + self.nundefsym, self.nsyms);
        let mut index = 0;
        for sym in self.symbols.iter().filter(|sym| !sym.is_external()) {
            self.write_nlist(sym, buffer);
            index += 1;
        }
        debug_assert_eq!(index, self.iextdefsym);
        for &i in &self.extdefsyms {
            self.write_nlist(&self.symbols[i], buffer);
            index += 1;
        }
        debug_assert_eq!(index, self.iundefsym);
        for &i in &self.undefsyms {
            self.write_nlist(&self.symbols[i], buffer);
            index += 1;
        }
        debug_assert_eq!(index, self.nsyms);
    }

    fn write_nlist(&self, sym: &Symbol, buffer: &mut dyn WritableBuffer) {
        // Rebase section symbols now that section addresses are final.
        let mut value = sym.value;
        if sym.ntype & macho::N_TYPE == macho::N_SECT && sym.sect != macho::NO_SECT {
            debug_assert!(u32::from(sym.sect) <= self.seg_nsects);
            if let Some(s) = self.sections.get(usize::from(sym.sect) - 1) {
                value += s.addr;
            }
        }

        if self.fmt.ptrsize == 8 {
            buffer.write_bytes(bytes_of(&macho::Nlist64::<LE> {
                n_strx: U32::new(LE, sym.strx),
                n_type: sym.ntype,
                n_sect: sym.sect,
                n_desc: U16::new(LE, sym.desc),
                n_value: U64::new(LE, value),
            }));
        } else {
            buffer.write_bytes(bytes_of(&macho::Nlist32::<LE> {
                n_strx: U32::new(LE, sym.strx),
                n_type: sym.ntype,
                n_sect: sym.sect,
                n_desc: U16::new(LE, sym.desc),
                n_value: U32::new(LE, value as u32),
            }));
        }
    }
}
