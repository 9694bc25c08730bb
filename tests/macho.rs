use core::mem;

use machobj::write::{
    Format, Object, OutputEvent, SegmentId, Severity, StreamingBuffer, SymbolScope,
};
use machobj::{from_bytes, macho, LittleEndian as LE, Pod};

fn parse<T: Pod>(data: &[u8], offset: usize) -> &T {
    from_bytes::<T>(&data[offset..]).unwrap().0
}

fn has_warning(obj: &Object, needle: &str) -> bool {
    obj.diagnostics()
        .iter()
        .any(|d| d.severity == Severity::Warning && d.message.contains(needle))
}

fn has_error(obj: &Object, needle: &str) -> bool {
    obj.diagnostics()
        .iter()
        .any(|d| d.severity == Severity::Error && d.message.contains(needle))
}

#[test]
fn empty_file() {
    let mut obj = Object::new(Format::MachO64);
    let mut buffer = Vec::new();
    obj.emit(&mut buffer).unwrap();

    // Just the header and the string table's reserved NUL.
    assert_eq!(buffer.len(), 33);
    assert_eq!(&buffer[..4], &[0xcf, 0xfa, 0xed, 0xfe]);
    let header = parse::<macho::MachHeader64<LE>>(&buffer, 0);
    assert_eq!(header.magic.get(LE), macho::MH_MAGIC_64);
    assert_eq!(header.cputype.get(LE), macho::CPU_TYPE_X86_64);
    assert_eq!(header.cpusubtype.get(LE), macho::CPU_SUBTYPE_I386_ALL);
    assert_eq!(header.filetype.get(LE), macho::MH_OBJECT);
    assert_eq!(header.ncmds.get(LE), 0);
    assert_eq!(header.sizeofcmds.get(LE), 0);
    assert_eq!(header.flags.get(LE), 0);
    assert!(has_warning(&obj, "no sections?"));
}

#[test]
fn empty_file_32() {
    let mut obj = Object::new(Format::MachO32);
    let mut buffer = Vec::new();
    obj.emit(&mut buffer).unwrap();

    assert_eq!(buffer.len(), 29);
    assert_eq!(&buffer[..4], &[0xce, 0xfa, 0xed, 0xfe]);
    let header = parse::<macho::MachHeader32<LE>>(&buffer, 0);
    assert_eq!(header.cputype.get(LE), macho::CPU_TYPE_X86);
}

#[test]
fn single_text_byte() {
    let mut obj = Object::new(Format::MachO64);
    let text = obj.section(".text").unwrap();
    obj.output(Some(text), OutputEvent::RawData(&[0x90]), None, None)
        .unwrap();
    obj.symdef("f", Some(text), 0, SymbolScope::Global, None)
        .unwrap();
    let mut buffer = Vec::new();
    obj.emit(&mut buffer).unwrap();
    assert!(obj.diagnostics().is_empty());

    let header = parse::<macho::MachHeader64<LE>>(&buffer, 0);
    assert_eq!(header.ncmds.get(LE), 2);
    assert_eq!(header.sizeofcmds.get(LE), 72 + 80 + 24);

    let seg = parse::<macho::SegmentCommand64<LE>>(&buffer, 32);
    assert_eq!(seg.cmd.get(LE), macho::LC_SEGMENT_64);
    assert_eq!(seg.cmdsize.get(LE), 72 + 80);
    assert_eq!(seg.segname, [0; 16]);
    assert_eq!(seg.vmaddr.get(LE), 0);
    assert_eq!(seg.vmsize.get(LE), 1);
    assert_eq!(seg.fileoff.get(LE), 208);
    assert_eq!(seg.filesize.get(LE), 1);
    assert_eq!(seg.maxprot.get(LE), macho::VM_PROT_DEFAULT);
    assert_eq!(seg.initprot.get(LE), macho::VM_PROT_DEFAULT);
    assert_eq!(seg.nsects.get(LE), 1);

    let sect = parse::<macho::Section64<LE>>(&buffer, 32 + 72);
    assert_eq!(&sect.sectname[..7], b"__text\0");
    assert_eq!(&sect.segname[..7], b"__TEXT\0");
    assert_eq!(sect.addr.get(LE), 0);
    assert_eq!(sect.size.get(LE), 1);
    // The payload starts on a 4-byte boundary.
    assert_eq!(sect.offset.get(LE), 208);
    assert_eq!(sect.offset.get(LE) % 4, 0);
    assert_eq!(sect.reloff.get(LE), 0);
    assert_eq!(sect.nreloc.get(LE), 0);
    assert_eq!(
        sect.flags.get(LE),
        macho::S_REGULAR | macho::S_ATTR_SOME_INSTRUCTIONS | macho::S_ATTR_PURE_INSTRUCTIONS
    );
    assert_eq!(buffer[208], 0x90);

    let symtab = parse::<macho::SymtabCommand<LE>>(&buffer, 32 + 72 + 80);
    assert_eq!(symtab.cmd.get(LE), macho::LC_SYMTAB);
    assert_eq!(symtab.cmdsize.get(LE), 24);
    assert_eq!(symtab.nsyms.get(LE), 1);
    assert_eq!(symtab.strsize.get(LE), 3);

    let nlist = parse::<macho::Nlist64<LE>>(&buffer, symtab.symoff.get(LE) as usize);
    assert_eq!(nlist.n_strx.get(LE), 1);
    assert_eq!(nlist.n_type, macho::N_SECT | macho::N_EXT);
    assert_eq!(nlist.n_sect, 1);
    assert_eq!(nlist.n_desc.get(LE), 0);
    assert_eq!(nlist.n_value.get(LE), 0);

    let stroff = symtab.stroff.get(LE) as usize;
    assert_eq!(&buffer[stroff..stroff + 3], b"\0f\0");
    assert_eq!(buffer.len(), stroff + 3);
}

#[test]
fn cross_section_absolute_reference() {
    let mut obj = Object::new(Format::MachO64);
    let text = obj.section(".text").unwrap();
    let data = obj.section(".data").unwrap();

    obj.output(Some(data), OutputEvent::RawData(&[0; 8]), None, None)
        .unwrap();
    obj.symdef("d0", Some(data), 0, SymbolScope::Local, None)
        .unwrap();
    obj.symdef("d4", Some(data), 4, SymbolScope::Local, None)
        .unwrap();

    // mov qword [abs d4+2], i.e. an 8-byte absolute reference to offset 6
    // of `.data`.
    obj.output(
        Some(text),
        OutputEvent::RawData(&[0x48, 0xc7, 0x04, 0x25]),
        None,
        None,
    )
    .unwrap();
    obj.output(
        Some(text),
        OutputEvent::Address { value: 6, size: 8 },
        Some(data),
        None,
    )
    .unwrap();

    let mut buffer = Vec::new();
    obj.emit(&mut buffer).unwrap();
    assert!(obj.diagnostics().is_empty());

    let sect = parse::<macho::Section64<LE>>(&buffer, 32 + 72);
    assert_eq!(&sect.sectname[..7], b"__text\0");
    assert_eq!(sect.nreloc.get(LE), 1);
    assert_eq!(
        sect.flags.get(LE) & (macho::S_ATTR_LOC_RELOC | macho::S_ATTR_EXT_RELOC),
        macho::S_ATTR_LOC_RELOC
    );

    // The stored word was rebased onto the nearest symbol (d4 at offset 4).
    let payload = sect.offset.get(LE) as usize;
    let word = i64::from_le_bytes(buffer[payload + 4..payload + 12].try_into().unwrap());
    assert_eq!(word, 2);

    let reloc = parse::<macho::Relocation<LE>>(&buffer, sect.reloff.get(LE) as usize);
    assert_eq!(reloc.r_address.get(LE), 4);
    let info = reloc.info(LE);
    assert!(!info.r_pcrel);
    assert_eq!(info.r_length, 3);
    assert!(info.r_extern);
    assert_eq!(info.r_type, macho::X86_64_RELOC_UNSIGNED);
    // d0 and d4 are both local, so they keep definition order.
    assert_eq!(info.r_symbolnum, 1);

    // The symbol values were rebased to final addresses: `.data` is placed
    // right after the 12 bytes of `.text`.
    let symtab = parse::<macho::SymtabCommand<LE>>(&buffer, 32 + 72 + 2 * 80);
    let symoff = symtab.symoff.get(LE) as usize;
    let d0 = parse::<macho::Nlist64<LE>>(&buffer, symoff);
    let d4 = parse::<macho::Nlist64<LE>>(&buffer, symoff + 16);
    assert_eq!(d0.n_sect, 2);
    assert_eq!(d0.n_value.get(LE), 12);
    assert_eq!(d4.n_value.get(LE), 16);
}

#[test]
fn got_versus_got_load() {
    let mut obj = Object::new(Format::MachO64);
    let text = obj.section(".text").unwrap();
    let foo = obj.seg_alloc();
    obj.symdef("foo", Some(foo), 0, SymbolScope::Global, None)
        .unwrap();

    // mov rax, [rel foo wrt ..gotpcrel]: the byte before the displacement
    // is the 0x8b opcode, so the load can be relaxed.
    obj.output(
        Some(text),
        OutputEvent::RawData(&[0x48, 0x8b, 0x05]),
        None,
        None,
    )
    .unwrap();
    obj.output(
        Some(text),
        OutputEvent::Rel4Adr { value: 0, insn_size: 4 },
        Some(foo),
        obj.gotpcrel_segment(),
    )
    .unwrap();

    // call [rel foo wrt ..gotpcrel]: not a MOV, plain GOT.
    obj.output(Some(text), OutputEvent::RawData(&[0xff, 0x15]), None, None)
        .unwrap();
    obj.output(
        Some(text),
        OutputEvent::Rel4Adr { value: 0, insn_size: 4 },
        Some(foo),
        obj.gotpcrel_segment(),
    )
    .unwrap();

    let mut buffer = Vec::new();
    obj.emit(&mut buffer).unwrap();
    assert!(obj.diagnostics().is_empty());

    let sect = parse::<macho::Section64<LE>>(&buffer, 32 + 72);
    assert_eq!(sect.nreloc.get(LE), 2);

    // Entries are written in reverse order of creation.
    let reloff = sect.reloff.get(LE) as usize;
    let got = parse::<macho::Relocation<LE>>(&buffer, reloff).info(LE);
    let got_load = parse::<macho::Relocation<LE>>(&buffer, reloff + 8).info(LE);
    assert_eq!(got.r_type, macho::X86_64_RELOC_GOT);
    assert!(got.r_pcrel);
    assert_eq!(got.r_length, 2);
    assert_eq!(got_load.r_type, macho::X86_64_RELOC_GOT_LOAD);
    assert!(got_load.r_pcrel);

    // `..gotpcrel` itself never reaches the symbol table.
    let symtab = parse::<macho::SymtabCommand<LE>>(&buffer, 32 + 72 + 80);
    assert_eq!(symtab.nsyms.get(LE), 1);
}

#[test]
fn bss_zerofill() {
    let mut obj = Object::new(Format::MachO64);
    let bss = obj.section(".bss").unwrap();
    obj.output(Some(bss), OutputEvent::Reserve { size: 16 }, None, None)
        .unwrap();
    let mut buffer = Vec::new();
    obj.emit(&mut buffer).unwrap();
    assert!(obj.diagnostics().is_empty());

    let seg = parse::<macho::SegmentCommand64<LE>>(&buffer, 32);
    assert_eq!(seg.vmsize.get(LE), 16);
    assert_eq!(seg.filesize.get(LE), 0);

    let sect = parse::<macho::Section64<LE>>(&buffer, 32 + 72);
    assert_eq!(&sect.sectname[..6], b"__bss\0");
    assert_eq!(sect.flags.get(LE), macho::S_ZEROFILL);
    assert_eq!(sect.size.get(LE), 16);
    assert_eq!(sect.offset.get(LE), 0);
    assert_eq!(sect.reloff.get(LE), 0);

    // No file bytes beyond header, load command and the string table NUL.
    assert_eq!(buffer.len(), 32 + 72 + 80 + 1);
}

#[test]
fn symbol_table_ordering() {
    let mut obj = Object::new(Format::MachO64);
    let text = obj.section(".text").unwrap();
    obj.output(Some(text), OutputEvent::RawData(&[0x90; 4]), None, None)
        .unwrap();
    obj.symdef("a", Some(text), 0, SymbolScope::Local, None)
        .unwrap();
    obj.symdef("z", Some(text), 1, SymbolScope::Global, None)
        .unwrap();
    obj.symdef("m", Some(text), 2, SymbolScope::Global, None)
        .unwrap();
    let x = obj.seg_alloc();
    obj.symdef("x", Some(x), 0, SymbolScope::Global, None).unwrap();
    let b = obj.seg_alloc();
    obj.symdef("b", Some(b), 0, SymbolScope::Global, None).unwrap();

    let mut buffer = Vec::new();
    obj.emit(&mut buffer).unwrap();

    let symtab = parse::<macho::SymtabCommand<LE>>(&buffer, 32 + 72 + 80);
    assert_eq!(symtab.nsyms.get(LE), 5);
    let symoff = symtab.symoff.get(LE) as usize;
    let stroff = symtab.stroff.get(LE) as usize;
    let strsize = symtab.strsize.get(LE) as usize;

    let name_of = |index: usize| {
        let nlist = parse::<macho::Nlist64<LE>>(&buffer, symoff + index * 16);
        let strx = nlist.n_strx.get(LE) as usize;
        let rest = &buffer[stroff + strx..];
        let end = rest.iter().position(|&byte| byte == 0).unwrap();
        core::str::from_utf8(&rest[..end]).unwrap()
    };

    // Locals in definition order, then defined externals sorted by name,
    // then undefined externals sorted by name.
    let names: Vec<&str> = (0..5).map(name_of).collect();
    assert_eq!(names, ["a", "m", "z", "b", "x"]);

    // External names precede local names in the string table.
    assert_eq!(&buffer[stroff..stroff + strsize], b"\0z\0m\0x\0b\0a\0");

    // Undefined externals are undefined, defined ones are not.
    let kinds: Vec<u8> = (0..5)
        .map(|i| parse::<macho::Nlist64<LE>>(&buffer, symoff + i * 16).n_type)
        .collect();
    assert_eq!(
        kinds,
        [
            macho::N_SECT,
            macho::N_SECT | macho::N_EXT,
            macho::N_SECT | macho::N_EXT,
            macho::N_EXT,
            macho::N_EXT,
        ]
    );
}

#[test]
fn section_alignment_and_padding() {
    let mut obj = Object::new(Format::MachO64);
    let text = obj.section(".text").unwrap();
    let data = obj.section(".data align=16").unwrap();
    let rodata = obj.section(".rodata").unwrap();
    obj.output(Some(text), OutputEvent::RawData(&[0x90; 5]), None, None)
        .unwrap();
    obj.output(Some(data), OutputEvent::RawData(&[1; 3]), None, None)
        .unwrap();
    obj.output(Some(rodata), OutputEvent::RawData(&[2; 2]), None, None)
        .unwrap();

    let mut buffer = Vec::new();
    obj.emit(&mut buffer).unwrap();

    let mut prev_end = None;
    for i in 0..3 {
        let sect = parse::<macho::Section64<LE>>(&buffer, 32 + 72 + i * 80);
        let align = 1u64 << sect.align.get(LE);
        assert_eq!(sect.addr.get(LE) % align, 0);
        let offset = sect.offset.get(LE) as u64;
        assert_eq!(offset % 4, 0);
        if let Some(prev_end) = prev_end {
            assert!(offset >= prev_end);
            assert!(offset - prev_end < 4);
        }
        prev_end = Some(offset + sect.size.get(LE));
    }

    let data = parse::<macho::Section64<LE>>(&buffer, 32 + 72 + 80);
    assert_eq!(data.align.get(LE), 4);
    assert_eq!(data.addr.get(LE), 16);
}

#[test]
fn sixteen_bit_relative_on_32_bit() {
    let mut obj = Object::new(Format::MachO32);
    let text = obj.section(".text").unwrap();
    let ext = obj.seg_alloc();
    obj.symdef("far", Some(ext), 0, SymbolScope::Global, None)
        .unwrap();

    obj.output(Some(text), OutputEvent::RawData(&[0x66, 0xe8]), None, None)
        .unwrap();
    obj.output(
        Some(text),
        OutputEvent::Rel2Adr { value: 0x20, insn_size: 2 },
        Some(ext),
        None,
    )
    .unwrap();

    let mut buffer = Vec::new();
    obj.emit(&mut buffer).unwrap();
    assert!(obj.diagnostics().is_empty());

    let sect = parse::<macho::Section32<LE>>(&buffer, 28 + 56);
    assert_eq!(sect.nreloc.get(LE), 1);
    // An external pc-relative reference marks the section.
    assert!(sect.flags.get(LE) & macho::S_ATTR_EXT_RELOC != 0);

    let info = parse::<macho::Relocation<LE>>(&buffer, sect.reloff.get(LE) as usize).info(LE);
    assert!(info.r_pcrel);
    assert_eq!(info.r_length, 1);
    assert!(info.r_extern);
    assert_eq!(info.r_symbolnum, 0);

    // value + 2 - insn_size, unadjusted for external targets.
    let payload = sect.offset.get(LE) as usize;
    let word = u16::from_le_bytes(buffer[payload + 2..payload + 4].try_into().unwrap());
    assert_eq!(word, 0x20);

    // 32-bit nlist entries are 12 bytes with a 4-byte value.
    let symtab = parse::<macho::SymtabCommand<LE>>(&buffer, 28 + 56 + 68);
    assert_eq!(
        symtab.stroff.get(LE) - symtab.symoff.get(LE),
        mem::size_of::<macho::Nlist32<LE>>() as u32
    );
}

#[test]
fn degraded_emissions_accumulate_diagnostics() {
    let mut obj = Object::new(Format::MachO64);
    let text = obj.section(".text").unwrap();
    let data = obj.section(".data").unwrap();
    obj.output(Some(data), OutputEvent::RawData(&[0; 4]), None, None)
        .unwrap();
    obj.symdef("d", Some(data), 0, SymbolScope::Local, None)
        .unwrap();

    // Assembly outside any section.
    obj.output(None, OutputEvent::RawData(&[1]), None, None)
        .unwrap();
    assert!(has_error(&obj, "[ABSOLUTE]"));
    // Reserving outside any section is quietly dropped.
    obj.output(None, OutputEvent::Reserve { size: 4 }, None, None)
        .unwrap();

    // 32-bit absolute on the 64-bit profile: written unrelocated.
    obj.output(
        Some(text),
        OutputEvent::Address { value: 0x1234, size: 4 },
        Some(data),
        None,
    )
    .unwrap();
    assert!(has_error(&obj, "32-bit absolute"));

    // Section-base reference.
    obj.output(
        Some(text),
        OutputEvent::Address { value: 0, size: 8 },
        Some(SegmentId(data.0 + 1)),
        None,
    )
    .unwrap();
    assert!(has_error(&obj, "section base references"));

    // WRT on an absolute address.
    obj.output(
        Some(text),
        OutputEvent::Address { value: 0, size: 8 },
        Some(data),
        Some(SegmentId(100)),
    )
    .unwrap();
    // 16-bit relative on the 64-bit profile.
    obj.output(
        Some(text),
        OutputEvent::Rel2Adr { value: 0, insn_size: 2 },
        Some(data),
        None,
    )
    .unwrap();
    assert!(has_error(&obj, "16-bit relative"));

    let mut buffer = Vec::new();
    obj.emit(&mut buffer).unwrap();

    // Every degraded value was still emitted, with no relocation recorded.
    let sect = parse::<macho::Section64<LE>>(&buffer, 32 + 72);
    assert_eq!(sect.size.get(LE), 4 + 8 + 8 + 2);
    assert_eq!(sect.nreloc.get(LE), 0);

    let payload = sect.offset.get(LE) as usize;
    let word = u32::from_le_bytes(buffer[payload..payload + 4].try_into().unwrap());
    assert_eq!(word, 0x1234);
}

#[test]
fn wrt_gotpcrel_rejected_on_32_bit() {
    let mut obj = Object::new(Format::MachO32);
    assert_eq!(obj.gotpcrel_segment(), None);
    let text = obj.section(".text").unwrap();
    let ext = obj.seg_alloc();
    obj.symdef("foo", Some(ext), 0, SymbolScope::Global, None)
        .unwrap();

    obj.output(
        Some(text),
        OutputEvent::Rel4Adr { value: 0, insn_size: 4 },
        Some(ext),
        Some(SegmentId(9)),
    )
    .unwrap();
    assert!(has_error(&obj, "WRT"));

    let buffer = obj.write().unwrap();
    let sect = parse::<macho::Section32<LE>>(&buffer, 28 + 56);
    assert_eq!(sect.nreloc.get(LE), 0);
}

#[test]
fn reserve_outside_bss_zeroes() {
    let mut obj = Object::new(Format::MachO64);
    let data = obj.section(".data").unwrap();
    obj.output(Some(data), OutputEvent::RawData(&[0xaa]), None, None)
        .unwrap();
    obj.output(Some(data), OutputEvent::Reserve { size: 3 }, None, None)
        .unwrap();
    assert!(has_warning(&obj, "uninitialized space declared in __data section"));

    let buffer = obj.write().unwrap();
    let sect = parse::<macho::Section64<LE>>(&buffer, 32 + 72);
    assert_eq!(sect.size.get(LE), 4);
    let payload = sect.offset.get(LE) as usize;
    assert_eq!(&buffer[payload..payload + 4], &[0xaa, 0, 0, 0]);
}

#[test]
fn bss_initialization_is_ignored() {
    let mut obj = Object::new(Format::MachO64);
    let bss = obj.section(".bss").unwrap();
    obj.output(Some(bss), OutputEvent::RawData(&[1, 2, 3]), None, None)
        .unwrap();
    assert!(has_warning(&obj, "BSS section: ignored"));
    obj.output(Some(bss), OutputEvent::Reserve { size: 5 }, None, None)
        .unwrap();

    let buffer = obj.write().unwrap();
    let seg = parse::<macho::SegmentCommand64<LE>>(&buffer, 32);
    // The ignored initialization still grows the section.
    assert_eq!(seg.vmsize.get(LE), 8);
    assert_eq!(seg.filesize.get(LE), 0);
}

#[test]
fn unknown_section_falls_back_to_text() {
    let mut obj = Object::new(Format::MachO64);
    let text = obj.section(".text").unwrap();
    let stray = obj.seg_alloc();
    obj.output(Some(stray), OutputEvent::RawData(&[0xcc]), None, None)
        .unwrap();
    assert!(has_warning(&obj, "defaulting to `.text'"));
    assert_ne!(stray, text);

    let buffer = obj.write().unwrap();
    let sect = parse::<macho::Section64<LE>>(&buffer, 32 + 72);
    assert_eq!(sect.size.get(LE), 1);
    assert_eq!(buffer[sect.offset.get(LE) as usize], 0xcc);
}

#[test]
fn streaming_buffer_matches_vec() {
    let build = || {
        let mut obj = Object::new(Format::MachO64);
        let text = obj.section(".text").unwrap();
        let data = obj.section(".data align=8").unwrap();
        obj.output(Some(data), OutputEvent::RawData(&[7; 9]), None, None)
            .unwrap();
        obj.symdef("d", Some(data), 0, SymbolScope::Global, None)
            .unwrap();
        obj.output(Some(text), OutputEvent::RawData(&[0x48, 0x8b, 0x05]), None, None)
            .unwrap();
        obj.output(
            Some(text),
            OutputEvent::Rel4Adr { value: 0, insn_size: 4 },
            Some(data),
            None,
        )
        .unwrap();
        obj
    };

    let bytes = build().write().unwrap();

    let mut streamed = StreamingBuffer::new(Vec::new());
    build().emit(&mut streamed).unwrap();
    streamed.result().unwrap();
    assert_eq!(bytes, streamed.into_inner());
}

#[test]
fn total_file_size_accounting() {
    // header + sizeofcmds + padded section data + relocation entries
    // + nlist entries + string table, for a file that has all of them.
    let mut obj = Object::new(Format::MachO64);
    let text = obj.section(".text").unwrap();
    let data = obj.section(".data").unwrap();
    obj.output(Some(data), OutputEvent::RawData(&[0; 8]), None, None)
        .unwrap();
    obj.symdef("d", Some(data), 0, SymbolScope::Local, None)
        .unwrap();
    obj.output(Some(text), OutputEvent::RawData(&[0x90; 3]), None, None)
        .unwrap();
    obj.output(
        Some(text),
        OutputEvent::Address { value: 0, size: 8 },
        Some(data),
        None,
    )
    .unwrap();
    obj.symdef("f", Some(text), 0, SymbolScope::Global, None)
        .unwrap();

    let buffer = obj.write().unwrap();

    let header_and_cmds = 32 + 72 + 2 * 80 + 24;
    let section_data = (3 + 8) + 1 + 8; // text+word, pad to 4, data
    let rel_pad = 4; // up to the next 8-byte boundary
    let relocs = 8;
    let nlists = 2 * 16;
    let strings = 1 + 2 + 2; // NUL, "f", "d"
    assert_eq!(
        buffer.len(),
        header_and_cmds + section_data + rel_pad + relocs + nlists + strings
    );
}
