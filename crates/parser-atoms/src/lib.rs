//! parser-atoms - Parser-Time String Interning
//!
//! ============================================================================
//! MODULE OVERVIEW
//! ============================================================================
//!
//! This crate maps every distinct identifier and string literal seen while
//! parsing a script to a single canonical, immutable handle, a
//! [`ParserAtom`]. Later compiler phases compare names by handle instead of
//! by content, and only the atoms that survive into compiled output are
//! converted into the runtime's own strings.
//!
//! COMPONENTS:
//! -----------
//! 1. ENTRIES ([`ParserAtomEntry`])
//!    Immutable text records: Latin-1 or UTF-16 width, inline storage for
//!    short texts, a precomputed hash and a one-shot canonical handle cache.
//!
//! 2. WELL-KNOWN TABLE ([`WellKnownParserAtoms`])
//!    Keywords, common property names and prototype names, interned once
//!    per runtime and shared read-only by every parse.
//!
//! 3. PER-PARSE TABLE ([`ParserAtomsTable`])
//!    Hash-consed set of the atoms of one parse, consulted after the
//!    well-known table. Entries are released together with the table.
//!
//! 4. RUNTIME BRIDGE ([`CanonicalStrings`])
//!    The narrow interface through which atoms become runtime strings.
//
// ============================================================================
// CHARACTER WIDTHS
// ============================================================================
//
// Source text arrives as Latin-1 bytes, UTF-8 or UTF-16. Every atom is stored
// at the narrowest width able to hold it:
//
// ```
// "length"  → Latin-1, 6 bytes
// "naïve"   → Latin-1, 5 bytes      (ï = U+00EF fits in 8 bits)
// "λx"      → UTF-16,  2 units      (λ = U+03BB does not)
// ```
//
// Hashes and equality are computed over the characters inflated to 16 bits,
// so the input encoding never affects which handle a text receives.
//
// ============================================================================
// INLINE STORAGE
// ============================================================================
//
// Most identifiers are short. Texts of up to 24 Latin-1 characters or 12
// UTF-16 units live inside the entry; longer ones get a heap buffer owned by
// the entry:
//
// ```
// Entry:
// ┌────────┬──────┬──────────────────────────┬───────────┐
// │ length │ hash │ storage (24B inline/ptr) │ canonical │
// └────────┴──────┴──────────────────────────┴───────────┘
// ```
//
// ============================================================================
// USAGE
// ============================================================================
//
//! # Examples
//!
//! ```
//! use parser_atoms::{names, ParserAtomsTable, WellKnownParserAtoms};
//!
//! // Once per runtime
//! let well_known = WellKnownParserAtoms::<u32>::new().unwrap();
//!
//! // Once per parse
//! let mut table = ParserAtomsTable::new(&well_known);
//!
//! let x1 = table.intern_utf8("x").unwrap();
//! let x2 = table.intern_char16(&[u16::from(b'x')]).unwrap();
//! assert_eq!(x1, x2);
//!
//! assert_eq!(table.intern_utf8("return").unwrap(), names::KW_RETURN);
//! assert_eq!(table.len(), 1);
//! ```

pub mod atom;
pub mod config;
pub mod error;
pub mod memory;
pub mod runtime;
pub mod stats;
pub mod table;
pub mod well_known;

pub use atom::{
    chars_to_number, check_string_is_index, hash_chars, AtomChars, AtomText, CharWidth,
    HashNumber, HeapChars, ParserAtom, ParserAtomEntry, MAX_ARRAY_INDEX, MAX_INDEX_DIGITS,
    MAX_INLINE_LATIN1, MAX_INLINE_TWO_BYTE, MAX_LATIN1_CHAR, MAX_LENGTH, RESERVED_ATOMS_END,
};
pub use config::AtomsConfig;
pub use error::{AtomsError, AtomsResult, NumberError, NumberResult};
pub use memory::MemoryBudget;
pub use runtime::CanonicalStrings;
pub use stats::AtomsTableStats;
pub use table::{AddPtr, ParserAtomsTable};
pub use well_known::{names, WellKnownParserAtoms};
