//! Writing Mach-O relocatable object files.
//!
//! All back-end state lives in an [`Object`]. The front-end registers
//! sections and symbols, feeds emission events through [`Object::output`],
//! and finally serializes with [`Object::write`] or [`Object::emit`].
//!
//! Fatal conditions (violated invariants, unknown section names) are
//! returned as [`Error`]. Recoverable conditions — unsupported relocation
//! shapes, attempts to initialize BSS memory — are recorded as
//! [`Diagnostic`]s, mirrored to the `log` crate, and emission continues with
//! a degraded (typically unrelocated) value so that further diagnostics can
//! accumulate.

use core::mem;
use std::fmt;
use std::path::Path;
use std::string::String;
use std::vec::Vec;

use indexmap::IndexMap;

use crate::endian::LittleEndian as LE;
use crate::macho;

mod layout;
mod reloc;
mod string;
mod util;
mod writer;

use reloc::{Reloc, RelocKind};
pub use string::StringTable;
pub use util::{StreamingBuffer, WritableBuffer};

/// The error type used within the write module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error(pub(crate) String);

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Error {}

/// The result type used within the write module.
pub type Result<T> = std::result::Result<T, Error>;

/// How serious a recorded [`Diagnostic`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Suspicious input; the output is still well-formed.
    Warning,
    /// An unsupported construct; the affected value is emitted unrelocated.
    Error,
}

/// A diagnostic recorded while building the object.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// How serious the condition is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

/// A front-end segment index.
///
/// Every section and every external symbol is identified by a unique id
/// allocated through [`Object::seg_alloc`]. Ids step by two; the odd id
/// following a section's id denotes a reference to that section's base,
/// which Mach-O cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub i32);

impl SegmentId {
    /// Whether this id denotes a segment-base reference.
    #[inline]
    pub fn is_base(self) -> bool {
        self.0 & 1 == 1
    }
}

/// Which of the two Mach-O profiles to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// 32-bit i386 objects.
    MachO32,
    /// 64-bit x86-64 objects.
    MachO64,
}

impl Format {
    /// The bit-width profile for this format.
    pub fn descriptor(self) -> &'static MachoFormat {
        match self {
            Format::MachO32 => &MACHO32,
            Format::MachO64 => &MACHO64,
        }
    }

    /// Default operand size in bits.
    pub fn bits(self) -> u8 {
        match self {
            Format::MachO32 => 32,
            Format::MachO64 => 64,
        }
    }

    /// Short name used to select the format.
    pub fn token(self) -> &'static str {
        match self {
            Format::MachO32 => "macho32",
            Format::MachO64 => "macho64",
        }
    }

    /// Human-readable format description.
    pub fn description(self) -> &'static str {
        match self {
            Format::MachO32 => "NeXTstep/OpenStep/Rhapsody/Darwin/MacOS X (i386) object files",
            Format::MachO64 => "NeXTstep/OpenStep/Rhapsody/Darwin/MacOS X (x86_64) object files",
        }
    }

    /// Macro preamble lines for the front-end's preprocessor.
    pub fn preamble(self) -> &'static [&'static str] {
        &["%define __SECT__ [section .text]"]
    }
}

/// Immutable bit-width profile: sizes and codes that differ between the
/// 32-bit and 64-bit encodings.
#[derive(Debug, Clone, Copy)]
pub struct MachoFormat {
    /// Pointer size in bytes.
    pub ptrsize: u32,
    /// Which magic number to use.
    pub magic: u32,
    /// Which CPU type.
    pub cpu_type: u32,
    /// Which segment load command.
    pub lc_segment: u32,
    /// Mach header size.
    pub header_size: u32,
    /// Segment command size.
    pub segcmd_size: u32,
    /// Section command size.
    pub sectcmd_size: u32,
    /// Nlist (symbol) size.
    pub nlist_size: u32,
}

/// The 32-bit profile.
pub const MACHO32: MachoFormat = MachoFormat {
    ptrsize: 4,
    magic: macho::MH_MAGIC,
    cpu_type: macho::CPU_TYPE_X86,
    lc_segment: macho::LC_SEGMENT,
    header_size: mem::size_of::<macho::MachHeader32<LE>>() as u32,
    segcmd_size: mem::size_of::<macho::SegmentCommand32<LE>>() as u32,
    sectcmd_size: mem::size_of::<macho::Section32<LE>>() as u32,
    nlist_size: mem::size_of::<macho::Nlist32<LE>>() as u32,
};

/// The 64-bit profile.
pub const MACHO64: MachoFormat = MachoFormat {
    ptrsize: 8,
    magic: macho::MH_MAGIC_64,
    cpu_type: macho::CPU_TYPE_X86_64,
    lc_segment: macho::LC_SEGMENT_64,
    header_size: mem::size_of::<macho::MachHeader64<LE>>() as u32,
    segcmd_size: mem::size_of::<macho::SegmentCommand64<LE>>() as u32,
    sectcmd_size: mem::size_of::<macho::Section64<LE>>() as u32,
    nlist_size: mem::size_of::<macho::Nlist64<LE>>() as u32,
};

/// How a symbol was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    /// Not visible outside the object.
    Local,
    /// Declared global.
    Global,
    /// A common symbol; its value is its size.
    Common,
    /// A forward-reference fixup request from the front-end. Unsupported.
    ForwardReference,
}

/// One emission event from the front-end.
///
/// Operand section and `WRT` modifiers are passed separately to
/// [`Object::output`] since they apply to the event as a whole.
#[derive(Debug, Clone, Copy)]
pub enum OutputEvent<'a> {
    /// Uninitialized space; only meaningful in `.bss`.
    Reserve {
        /// Number of bytes to reserve.
        size: u64,
    },
    /// Literal bytes with no relocation.
    RawData(&'a [u8]),
    /// An absolute address of `|size|` bytes.
    Address {
        /// The address value.
        value: i64,
        /// Signed byte count; the magnitude selects the width.
        size: i32,
    },
    /// A 2-byte pc-relative reference.
    Rel2Adr {
        /// The target offset.
        value: i64,
        /// Length of the whole instruction containing the reference.
        insn_size: u64,
    },
    /// A 4-byte pc-relative reference.
    Rel4Adr {
        /// The target offset.
        value: i64,
        /// Length of the whole instruction containing the reference.
        insn_size: u64,
    },
}

/// Mapping from front-end section names to Mach-O placement.
const SECTION_MAP: &[(&str, &str, &str, u32)] = &[
    (
        ".text",
        "__TEXT",
        "__text",
        macho::S_REGULAR | macho::S_ATTR_SOME_INSTRUCTIONS | macho::S_ATTR_PURE_INSTRUCTIONS,
    ),
    (".data", "__DATA", "__data", macho::S_REGULAR),
    (".rodata", "__DATA", "__const", macho::S_REGULAR),
    (".bss", "__DATA", "__bss", macho::S_ZEROFILL),
];

pub(crate) struct Section {
    pub(crate) segname: [u8; 16],
    pub(crate) sectname: [u8; 16],
    pub(crate) index: SegmentId,
    pub(crate) data: Vec<u8>,
    /// log2 of the section alignment; unset until specified or laid out.
    pub(crate) align: Option<u32>,
    /// In-memory and in-file size, including zerofill.
    pub(crate) size: u64,
    /// In-memory address, assigned by layout.
    pub(crate) addr: u64,
    /// Offset within the file's data area, assigned by layout.
    pub(crate) offset: u64,
    /// Zero padding preceding the section in the file, assigned by layout.
    pub(crate) pad: Option<u32>,
    pub(crate) relocs: Vec<Reloc>,
    /// Section has at least one external pc-relative relocation.
    pub(crate) extreloc: bool,
    pub(crate) flags: u32,
}

impl Section {
    fn is_zerofill(&self) -> bool {
        self.flags & macho::SECTION_TYPE == macho::S_ZEROFILL
    }

    fn write(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
        self.size += data.len() as u64;
    }

    fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.sectname)
            .trim_end_matches('\0')
            .to_string()
    }
}

pub(crate) struct Symbol {
    pub(crate) name: String,
    /// String table byte offset; finalized by the layout pass.
    pub(crate) strx: u32,
    /// `N_*` type bits.
    pub(crate) ntype: u8,
    /// Section file index, or `NO_SECT`.
    pub(crate) sect: u8,
    /// Stab description; always zero here.
    pub(crate) desc: u16,
    /// Offset within the section; rebased to the final address when written.
    pub(crate) value: u64,
    /// The symbol count at registration time, recorded for symbols that name
    /// a section; relocations refer to symbols by this number until layout.
    pub(crate) initial_snum: Option<u32>,
    /// Final symbol table position, assigned by the layout pass.
    pub(crate) snum: u32,
}

impl Symbol {
    pub(crate) fn is_external(&self) -> bool {
        self.ntype & macho::N_EXT != 0
    }
}

/// A Mach-O relocatable object under construction.
pub struct Object {
    format: Format,
    pub(crate) fmt: &'static MachoFormat,
    pub(crate) sections: Vec<Section>,
    pub(crate) symbols: Vec<Symbol>,
    /// Front-end segment id of each external symbol, mapped to the symbol
    /// number it had at registration time.
    pub(crate) extsyms: IndexMap<SegmentId, u32>,
    pub(crate) strs: StringTable,
    diagnostics: Vec<Diagnostic>,
    next_segment: i32,
    pub(crate) gotpcrel_sect: Option<SegmentId>,

    // Filled in by the layout pass.
    pub(crate) nsyms: u32,
    pub(crate) ilocalsym: u32,
    pub(crate) iextdefsym: u32,
    pub(crate) iundefsym: u32,
    pub(crate) nlocalsym: u32,
    pub(crate) nextdefsym: u32,
    pub(crate) nundefsym: u32,
    pub(crate) extdefsyms: Vec<usize>,
    pub(crate) undefsyms: Vec<usize>,
    pub(crate) head_ncmds: u32,
    pub(crate) head_sizeofcmds: u32,
    pub(crate) seg_filesize: u64,
    pub(crate) seg_vmsize: u64,
    pub(crate) seg_nsects: u32,
    pub(crate) rel_padcnt: u64,
}

impl Object {
    /// Create an empty object for the given format.
    pub fn new(format: Format) -> Object {
        let mut obj = Object {
            format,
            fmt: format.descriptor(),
            sections: Vec::new(),
            symbols: Vec::new(),
            extsyms: IndexMap::new(),
            strs: StringTable::new(),
            diagnostics: Vec::new(),
            next_segment: 0,
            gotpcrel_sect: None,
            nsyms: 0,
            ilocalsym: 0,
            iextdefsym: 0,
            iundefsym: 0,
            nlocalsym: 0,
            nextdefsym: 0,
            nundefsym: 0,
            extdefsyms: Vec::new(),
            undefsyms: Vec::new(),
            head_ncmds: 0,
            head_sizeofcmds: 0,
            seg_filesize: 0,
            seg_vmsize: 0,
            seg_nsects: 0,
            rel_padcnt: 0,
        };
        if format == Format::MachO64 {
            // The `..gotpcrel` pseudo-segment. WRT references to it become
            // GOT relocations. The id is odd, so it can never collide with a
            // section or external symbol id.
            let seg = obj.seg_alloc();
            obj.gotpcrel_sect = Some(SegmentId(seg.0 + 1));
        }
        obj
    }

    /// The format this object is being built for.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Allocate a fresh front-end segment id.
    ///
    /// Ids step by two; the skipped odd id denotes the segment's base.
    pub fn seg_alloc(&mut self) -> SegmentId {
        let seg = SegmentId(self.next_segment);
        self.next_segment += 2;
        seg
    }

    /// The synthetic segment id of `..gotpcrel`, if the format has one.
    pub fn gotpcrel_segment(&self) -> Option<SegmentId> {
        self.gotpcrel_sect
    }

    /// The diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The symbol string table built so far.
    pub fn strings(&self) -> &StringTable {
        &self.strs
    }

    /// Identity hook for segment-base resolution.
    pub fn segbase(&self, section: SegmentId) -> SegmentId {
        section
    }

    fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    fn nonfatal(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message,
        });
    }

    /// Look up or create the section named by a `section` directive.
    ///
    /// The first whitespace-separated token is the front-end section name;
    /// the remaining tokens are attributes (`align=N`, `data`).
    pub fn section(&mut self, directive: &str) -> Result<SegmentId> {
        let mut tokens = directive.split_ascii_whitespace();
        let name = tokens.next().unwrap_or("");

        let &(_, segname, sectname, flags) = SECTION_MAP
            .iter()
            .find(|&&(front_name, ..)| front_name == name)
            .ok_or_else(|| Error(format!("invalid section name {}", name)))?;
        let segname = pad_name(segname);
        let sectname = pad_name(sectname);

        let existing = self
            .sections
            .iter()
            .position(|s| s.segname == segname && s.sectname == sectname);
        let pos = match existing {
            Some(pos) => pos,
            None => {
                let index = self.seg_alloc();
                self.sections.push(Section {
                    segname,
                    sectname,
                    index,
                    data: Vec::new(),
                    align: None,
                    size: 0,
                    addr: 0,
                    offset: 0,
                    pad: None,
                    relocs: Vec::new(),
                    extreloc: false,
                    flags,
                });
                self.sections.len() - 1
            }
        };

        for attr in tokens {
            let is_align = attr
                .get(..6)
                .map_or(false, |prefix| prefix.eq_ignore_ascii_case("align="));
            if is_align {
                let value = &attr[6..];
                let value = parse_number(value).ok_or_else(|| {
                    Error(format!(
                        "unknown or missing alignment value \"{}\" specified for section \"{}\"",
                        value, name
                    ))
                })?;
                if !value.is_power_of_two() {
                    return Err(Error(format!(
                        "alignment of {} (for section \"{}\") is not a power of two",
                        value, name
                    )));
                }
                let new_align = value.trailing_zeros();
                let s = &mut self.sections[pos];
                if existing.is_some() {
                    if let Some(align) = s.align {
                        if align != new_align {
                            return Err(Error(format!(
                                "section \"{}\" has already been specified with alignment {}, \
                                 conflicts with new alignment of {}",
                                name,
                                1u64 << align,
                                value
                            )));
                        }
                    }
                }
                s.align = Some(new_align);
            } else if attr.eq_ignore_ascii_case("data") {
                // Implicit; accepted for compatibility.
            } else {
                return Err(Error(format!(
                    "unknown section attribute {} for section {}",
                    attr, name
                )));
            }
        }

        Ok(self.sections[pos].index)
    }

    /// Raise a section's alignment to `value` bytes if that is larger.
    ///
    /// Unknown segment ids and non-power-of-two values are ignored.
    pub fn sectalign(&mut self, seg: SegmentId, value: u32) {
        let Some(s) = self.sections.iter_mut().find(|s| s.index == seg) else {
            return;
        };
        if !value.is_power_of_two() {
            return;
        }
        let value = value.trailing_zeros();
        if s.align.map_or(true, |align| align < value) {
            s.align = Some(value);
        }
    }

    /// Register a symbol definition.
    ///
    /// `section` is `None` for absolute symbols. External and common symbols
    /// pass the front-end segment id that was allocated for them. Names
    /// beginning with two dots are assembler-private and never enter the
    /// symbol table.
    pub fn symdef(
        &mut self,
        name: &str,
        section: Option<SegmentId>,
        offset: u64,
        scope: SymbolScope,
        special: Option<&str>,
    ) -> Result<()> {
        if special.is_some() {
            self.nonfatal("the Mach-O output format does not support any special symbol types");
            return Ok(());
        }

        if scope == SymbolScope::ForwardReference {
            self.nonfatal("the Mach-O format does not support forward reference fixups");
            return Ok(());
        }

        let bytes = name.as_bytes();
        if bytes.starts_with(b"..") && bytes.get(2) != Some(&b'@') {
            // An assembler-private symbol. Valid ones are silently kept out
            // of the symbol table; invalid ones are reported.
            if name != "..gotpcrel" {
                self.nonfatal(format!("unrecognized special symbol `{}'", name));
            }
            return Ok(());
        }

        let mut sym = Symbol {
            name: name.to_string(),
            strx: self.strs.len(),
            ntype: 0,
            sect: macho::NO_SECT,
            desc: 0,
            value: offset,
            initial_snum: None,
            snum: 0,
        };

        // External and common symbols get N_EXT.
        if scope != SymbolScope::Local {
            sym.ntype |= macho::N_EXT;
        }

        match section {
            None => {
                // Symbols in no section are absolute.
                sym.ntype |= macho::N_ABS;
                sym.sect = macho::NO_SECT;
            }
            Some(section) => {
                sym.ntype |= macho::N_SECT;
                sym.sect = self.section_file_index(section);
                sym.initial_snum = Some(self.symbols.len() as u32);

                if sym.sect == macho::NO_SECT {
                    // The id names an external section. Remember which symbol
                    // number it maps to; the front-end allocates a unique id
                    // per extern, so the id works as a key.
                    self.extsyms.insert(section, self.symbols.len() as u32);

                    match scope {
                        SymbolScope::Global | SymbolScope::Common => {
                            // There is no difference between global and
                            // common symbols here; both carry their size in
                            // the value field.
                            sym.ntype = macho::N_EXT;
                        }
                        _ => {
                            return Err(Error(format!(
                                "in-file index for section {} not found",
                                section.0
                            )));
                        }
                    }
                }
            }
        }

        self.symbols.push(sym);
        Ok(())
    }

    /// Handle one emission event into section `secto`.
    ///
    /// `target` is the operand's section id (`None` when the value needs no
    /// relocation) and `wrt` its `WRT` modifier.
    pub fn output(
        &mut self,
        secto: Option<SegmentId>,
        event: OutputEvent<'_>,
        target: Option<SegmentId>,
        wrt: Option<SegmentId>,
    ) -> Result<()> {
        let Some(secto) = secto else {
            if !matches!(event, OutputEvent::Reserve { .. }) {
                self.nonfatal("attempt to assemble code in [ABSOLUTE] space");
            }
            return Ok(());
        };

        let mut pos = self.sections.iter().position(|s| s.index == secto);
        if pos.is_none() {
            self.warn(format!(
                "attempt to assemble code in section {}: defaulting to `.text'",
                secto.0
            ));
            pos = self.section_position(b"__TEXT", b"__text");
            if pos.is_none() {
                return Err(Error("text section not found".into()));
            }
        }
        let pos = pos.unwrap();

        let bss = self.section_position(b"__DATA", b"__bss");

        if Some(pos) == bss && !matches!(event, OutputEvent::Reserve { .. }) {
            self.warn("attempt to initialize memory in the BSS section: ignored");
            self.sections[pos].size += realsize(&event);
            return Ok(());
        }

        match event {
            OutputEvent::Reserve { size } => {
                if Some(pos) != bss {
                    let name = self.sections[pos].display_name();
                    self.warn(format!(
                        "uninitialized space declared in {} section: zeroing",
                        name
                    ));
                    let s = &mut self.sections[pos];
                    s.data.resize(s.data.len() + size as usize, 0);
                    s.size += size;
                } else {
                    self.sections[pos].size += size;
                }
            }

            OutputEvent::RawData(data) => {
                if target.is_some() {
                    return Err(Error("raw data output with a section operand".into()));
                }
                self.sections[pos].write(data);
            }

            OutputEvent::Address { value, size } => {
                let asize = size.unsigned_abs() as usize;
                if asize == 0 || asize > 8 {
                    self.nonfatal("unrepresentable relocation in Mach-O");
                    return Ok(());
                }

                let mut addr = value;
                if let Some(target) = target {
                    if target.is_base() {
                        self.nonfatal("Mach-O format does not support section base references");
                    } else if wrt.is_none() {
                        if self.fmt.ptrsize == 8 && asize != 8 {
                            self.nonfatal(
                                "Mach-O 64-bit format does not support 32-bit absolute addresses",
                            );
                        } else {
                            addr -= self.add_reloc(pos, target, RelocKind::Abs, asize as u32, value)?;
                        }
                    } else {
                        self.nonfatal("Mach-O format does not support this use of WRT");
                    }
                }

                let bytes = (addr as u64).to_le_bytes();
                self.sections[pos].write(&bytes[..asize]);
            }

            OutputEvent::Rel2Adr { value, insn_size } => {
                if target == Some(secto) {
                    return Err(Error("pc-relative reference into its own section".into()));
                }

                let mut addr = value + 2 - insn_size as i64;
                if target.map_or(false, SegmentId::is_base) {
                    self.nonfatal("Mach-O format does not support section base references");
                } else if self.fmt.ptrsize == 8 {
                    self.nonfatal("Mach-O 64-bit format does not support 16-bit relative references");
                } else if wrt.is_some() {
                    self.nonfatal("Mach-O format does not support this use of WRT");
                } else if let Some(target) = target {
                    addr -= self.add_reloc(pos, target, RelocKind::Rel, 2, addr)?;
                }

                let bytes = (addr as u64).to_le_bytes();
                self.sections[pos].write(&bytes[..2]);
            }

            OutputEvent::Rel4Adr { value, insn_size } => {
                if target == Some(secto) {
                    return Err(Error("pc-relative reference into its own section".into()));
                }

                let mut addr = value + 4 - insn_size as i64;
                if target.map_or(false, SegmentId::is_base) {
                    self.nonfatal("Mach-O format does not support section base references");
                } else if wrt.is_none() {
                    // Plain relative relocation.
                    if let Some(target) = target {
                        addr -= self.add_reloc(pos, target, RelocKind::Rel, 4, addr)?;
                    }
                } else if wrt == self.gotpcrel_sect {
                    // Discriminate on the opcode byte already emitted: a MOV
                    // load (0x8B) can be relaxed by the linker and gets
                    // GOT_LOAD, anything else a plain GOT reference.
                    let data = &self.sections[pos].data;
                    let opcode = if data.len() > 1 { data[data.len() - 2] } else { 0 };
                    let kind = if opcode == 0x8b {
                        RelocKind::GotLoad
                    } else {
                        RelocKind::Got
                    };
                    if let Some(target) = target {
                        addr -= self.add_reloc(pos, target, kind, 4, addr)?;
                    }
                } else {
                    self.nonfatal("Mach-O format does not support this use of WRT");
                }

                let bytes = (addr as u64).to_le_bytes();
                self.sections[pos].write(&bytes[..4]);
            }
        }

        Ok(())
    }

    fn section_position(&self, segname: &[u8], sectname: &[u8]) -> Option<usize> {
        let segname = pad_name_bytes(segname);
        let sectname = pad_name_bytes(sectname);
        self.sections
            .iter()
            .position(|s| s.segname == segname && s.sectname == sectname)
    }

    /// The 1-based file index of the section with the given front-end id, or
    /// `NO_SECT` if there is no such section among the first 254.
    pub(crate) fn section_file_index(&mut self, index: SegmentId) -> u8 {
        let mut fi: u32 = 1;
        for s in &self.sections {
            if fi >= u32::from(macho::MAX_SECT) {
                break;
            }
            if s.index == index {
                return fi as u8;
            }
            fi += 1;
        }
        if fi == u32::from(macho::MAX_SECT) {
            self.warn("too many sections (>255) - clipped by fileindex");
        }
        macho::NO_SECT
    }
}

/// The number of bytes an event occupies in its section.
fn realsize(event: &OutputEvent<'_>) -> u64 {
    match *event {
        OutputEvent::Reserve { size } => size,
        OutputEvent::RawData(data) => data.len() as u64,
        OutputEvent::Address { size, .. } => u64::from(size.unsigned_abs()),
        OutputEvent::Rel2Adr { .. } => 2,
        OutputEvent::Rel4Adr { .. } => 4,
    }
}

/// Parse an integer with C `strtoul` base-0 syntax.
fn parse_number(s: &str) -> Option<u64> {
    if s.is_empty() {
        return Some(0);
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if s.len() > 1 && s.starts_with('0') {
        u64::from_str_radix(&s[1..], 8).ok()
    } else {
        s.parse().ok()
    }
}

fn pad_name(name: &str) -> [u8; 16] {
    pad_name_bytes(name.as_bytes())
}

fn pad_name_bytes(name: &[u8]) -> [u8; 16] {
    let mut padded = [0; 16];
    let len = name.len().min(15);
    padded[..len].copy_from_slice(&name[..len]);
    padded
}

/// Derive the conventional output file name: the input with a `.o` extension.
pub fn object_filename(input: &str) -> String {
    Path::new(input).with_extension("o").display().to_string()
}
