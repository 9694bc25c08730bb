//! Mach-O relocatable object file emission.
//!
//! This crate is the object-file back-end of an x86 assembler: it consumes a
//! stream of abstract emission events (raw data, absolute addresses,
//! pc-relative references, uninitialized space) and produces a byte-exact
//! Mach-O `MH_OBJECT` file for the i386 or x86-64 CPU variants.
//!
//! The entry point is [`write::Object`]. A front-end drives it through the
//! same operations the assembler's output interface exposes:
//!
//! ```no_run
//! use machobj::write::{Format, Object, OutputEvent, SymbolScope};
//!
//! let mut obj = Object::new(Format::MachO64);
//! let text = obj.section(".text").unwrap();
//! obj.output(Some(text), OutputEvent::RawData(&[0xc3]), None, None).unwrap();
//! obj.symdef("start", Some(text), 0, SymbolScope::Global, None).unwrap();
//! let bytes = obj.write().unwrap();
//! # let _ = bytes;
//! ```
//!
//! Finalization orders the symbol table the way the dynamic linker expects
//! (locals, then defined externals sorted by name, then undefined externals
//! sorted by name), lays out sections with their alignment padding, rewrites
//! relocation symbol numbers from registration order to final order, and
//! serializes the header, load commands, payloads, relocation records,
//! symbol table and string table.
//!
//! [`macho`] holds the raw on-disk definitions and can be used on its own to
//! decode what the writer produced.

#![warn(missing_docs)]

mod endian;
pub use endian::*;

mod pod;
pub use pod::*;

pub mod macho;
pub mod write;
