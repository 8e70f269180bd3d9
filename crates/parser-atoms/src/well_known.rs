//! Well-known atoms - Pre-interned names shared by every parse.
//!
//! Reserved words, common property names and built-in prototype names are
//! interned once per runtime into a [`WellKnownParserAtoms`] table. Every
//! per-parse [`ParserAtomsTable`](crate::ParserAtomsTable) consults it before
//! its own entries, so these names never allocate during parsing and their
//! handles are the same constants (see [`names`]) in every table.
//!
//! # Handle Ranges
//!
//! | Range | Contents |
//! |-------|----------|
//! | `KW_*` | Reserved and contextual keywords |
//! | `ID_*` | Common property and identifier names |
//! | `PROTO_*` | Built-in constructor and prototype names |
//!
//! All well-known handles are below
//! [`RESERVED_ATOMS_END`](crate::RESERVED_ATOMS_END).

use std::mem;
use std::ops::Index;

use hashbrown::HashTable;

use crate::atom::{
    hash_and_length, table_hash, CharWidth, HashNumber, ParserAtom, ParserAtomEntry,
    RESERVED_ATOMS_END,
};
use crate::error::{AtomsError, AtomsResult};

macro_rules! well_known_atoms {
    ($($name:ident => $text:literal,)*) => {
        #[allow(non_camel_case_types)]
        #[repr(u32)]
        enum WellKnownIndex {
            $($name,)*
            Count,
        }

        /// Handles of the well-known atoms, valid in every table
        pub mod names {
            use crate::atom::ParserAtom;

            $(
                #[doc = concat!("Well-known atom `\"", $text, "\"`")]
                pub const $name: ParserAtom =
                    ParserAtom::well_known(super::WellKnownIndex::$name as u32);
            )*
        }

        /// Texts of the well-known atoms, by handle index
        const WELL_KNOWN_TEXTS: &[&str] = &[$($text,)*];
    };
}

well_known_atoms! {
    EMPTY => "",

    // Keywords
    KW_AWAIT => "await",
    KW_BREAK => "break",
    KW_CASE => "case",
    KW_CATCH => "catch",
    KW_CLASS => "class",
    KW_CONST => "const",
    KW_CONTINUE => "continue",
    KW_DEBUGGER => "debugger",
    KW_DEFAULT => "default",
    KW_DELETE => "delete",
    KW_DO => "do",
    KW_ELSE => "else",
    KW_ENUM => "enum",
    KW_EXPORT => "export",
    KW_EXTENDS => "extends",
    KW_FALSE => "false",
    KW_FINALLY => "finally",
    KW_FOR => "for",
    KW_FUNCTION => "function",
    KW_IF => "if",
    KW_IMPLEMENTS => "implements",
    KW_IMPORT => "import",
    KW_IN => "in",
    KW_INSTANCEOF => "instanceof",
    KW_INTERFACE => "interface",
    KW_LET => "let",
    KW_NEW => "new",
    KW_NULL => "null",
    KW_PACKAGE => "package",
    KW_PRIVATE => "private",
    KW_PROTECTED => "protected",
    KW_PUBLIC => "public",
    KW_RETURN => "return",
    KW_STATIC => "static",
    KW_SUPER => "super",
    KW_SWITCH => "switch",
    KW_THIS => "this",
    KW_THROW => "throw",
    KW_TRUE => "true",
    KW_TRY => "try",
    KW_TYPEOF => "typeof",
    KW_VAR => "var",
    KW_VOID => "void",
    KW_WHILE => "while",
    KW_WITH => "with",
    KW_YIELD => "yield",

    // Contextual names and common properties
    ID_ARGUMENTS => "arguments",
    ID_AS => "as",
    ID_ASYNC => "async",
    ID_CALLEE => "callee",
    ID_CALLER => "caller",
    ID_CONSTRUCTOR => "constructor",
    ID_DEFINE_PROPERTY => "defineProperty",
    ID_DONE => "done",
    ID_EVAL => "eval",
    ID_FROM => "from",
    ID_GET => "get",
    ID_GET_OWN_PROPERTY_DESCRIPTOR => "getOwnPropertyDescriptor",
    ID_GET_OWN_PROPERTY_DESCRIPTORS => "getOwnPropertyDescriptors",
    ID_GET_PROTOTYPE_OF => "getPrototypeOf",
    ID_HAS_OWN_PROPERTY => "hasOwnProperty",
    ID_INFINITY => "Infinity",
    ID_LENGTH => "length",
    ID_META => "meta",
    ID_NAME => "name",
    ID_NAN => "NaN",
    ID_NEXT => "next",
    ID_OF => "of",
    ID_PROTO => "__proto__",
    ID_PROTOTYPE => "prototype",
    ID_RAW => "raw",
    ID_SET => "set",
    ID_TARGET => "target",
    ID_THEN => "then",
    ID_TO_STRING => "toString",
    ID_UNDEFINED => "undefined",
    ID_USE_ASM => "use asm",
    ID_USE_STRICT => "use strict",
    ID_VALUE => "value",
    ID_VALUE_OF => "valueOf",

    // Prototype names
    PROTO_AGGREGATE_ERROR => "AggregateError",
    PROTO_ARRAY => "Array",
    PROTO_ARRAY_BUFFER => "ArrayBuffer",
    PROTO_BIG_INT => "BigInt",
    PROTO_BOOLEAN => "Boolean",
    PROTO_DATA_VIEW => "DataView",
    PROTO_DATE => "Date",
    PROTO_ERROR => "Error",
    PROTO_EVAL_ERROR => "EvalError",
    PROTO_FLOAT32_ARRAY => "Float32Array",
    PROTO_FLOAT64_ARRAY => "Float64Array",
    PROTO_FUNCTION => "Function",
    PROTO_INT8_ARRAY => "Int8Array",
    PROTO_INT16_ARRAY => "Int16Array",
    PROTO_INT32_ARRAY => "Int32Array",
    PROTO_JSON => "JSON",
    PROTO_MAP => "Map",
    PROTO_MATH => "Math",
    PROTO_NUMBER => "Number",
    PROTO_OBJECT => "Object",
    PROTO_PROMISE => "Promise",
    PROTO_PROXY => "Proxy",
    PROTO_RANGE_ERROR => "RangeError",
    PROTO_REFERENCE_ERROR => "ReferenceError",
    PROTO_REFLECT => "Reflect",
    PROTO_REG_EXP => "RegExp",
    PROTO_SET => "Set",
    PROTO_SHARED_ARRAY_BUFFER => "SharedArrayBuffer",
    PROTO_STRING => "String",
    PROTO_SYMBOL => "Symbol",
    PROTO_SYNTAX_ERROR => "SyntaxError",
    PROTO_TYPE_ERROR => "TypeError",
    PROTO_UINT8_ARRAY => "Uint8Array",
    PROTO_UINT8_CLAMPED_ARRAY => "Uint8ClampedArray",
    PROTO_UINT16_ARRAY => "Uint16Array",
    PROTO_UINT32_ARRAY => "Uint32Array",
    PROTO_URI_ERROR => "URIError",
    PROTO_WEAK_MAP => "WeakMap",
    PROTO_WEAK_REF => "WeakRef",
    PROTO_WEAK_SET => "WeakSet",
}

static_assertions::const_assert!((WellKnownIndex::Count as u32) <= RESERVED_ATOMS_END);

/// Text of a well-known handle, without needing a table
pub(crate) fn text_of(atom: ParserAtom) -> Option<&'static str> {
    atom.well_known_position()
        .and_then(|position| WELL_KNOWN_TEXTS.get(position))
        .copied()
}

/// WellKnownParserAtoms - Read-only table of pre-interned atoms
///
/// Built once per runtime and shared by reference with every per-parse
/// table. Lookups take `&self` and never write, so one table can serve
/// parses on many threads at once. The only mutable state is each entry's
/// one-shot canonical handle cache.
///
/// # Examples
///
/// ```
/// use parser_atoms::{names, WellKnownParserAtoms};
///
/// let well_known = WellKnownParserAtoms::<u32>::new().unwrap();
/// assert_eq!(well_known.lookup("prototype".encode_utf16()), Some(names::ID_PROTOTYPE));
/// assert_eq!(well_known.lookup("myVariable".encode_utf16()), None);
/// assert_eq!(well_known[names::PROTO_ARRAY].to_string(), "Array");
/// ```
pub struct WellKnownParserAtoms<H> {
    entries: Vec<ParserAtomEntry<H>>,
    set: HashTable<u32>,
}

impl<H> WellKnownParserAtoms<H> {
    /// Build the table of well-known atoms
    ///
    /// Fails only when memory is exhausted; callers treat that as fatal.
    ///
    /// # Panics
    ///
    /// Panics if the built-in list contains the same text twice.
    pub fn new() -> AtomsResult<Self> {
        let count = WELL_KNOWN_TEXTS.len();

        let mut entries: Vec<ParserAtomEntry<H>> = Vec::new();
        entries.try_reserve_exact(count).map_err(|_| {
            AtomsError::out_of_memory(count * mem::size_of::<ParserAtomEntry<H>>())
        })?;
        let mut set: HashTable<u32> = HashTable::new();
        set.try_reserve(count, |_| 0)
            .map_err(|_| AtomsError::out_of_memory(count * mem::size_of::<u32>()))?;

        for text in WELL_KNOWN_TEXTS {
            debug_assert!(text.is_ascii(), "well-known atom {:?} is not ASCII", text);
            let units = text.bytes().map(u16::from);
            let (hash, length) = hash_and_length(units.clone());

            let duplicate = set
                .find(table_hash(hash), |&position| {
                    entries[position as usize].matches(hash, length, units.clone())
                })
                .is_some();
            assert!(!duplicate, "duplicate well-known atom {:?}", text);

            let position = entries.len() as u32;
            entries.push(ParserAtomEntry::create(
                CharWidth::Latin1,
                units,
                length,
                hash,
            )?);
            set.insert_unique(table_hash(hash), position, |&position| {
                table_hash(entries[position as usize].hash())
            });
        }

        log::debug!("initialized {} well-known parser atoms", entries.len());
        Ok(Self { entries, set })
    }

    /// Find the well-known atom for a character sequence
    ///
    /// Never inserts.
    pub fn lookup<S>(&self, seq: S) -> Option<ParserAtom>
    where
        S: Iterator<Item = u16> + Clone,
    {
        let (hash, length) = hash_and_length(seq.clone());
        self.lookup_hashed(hash, length, seq)
    }

    /// Find the well-known atom for a sequence whose hash and length are known
    pub(crate) fn lookup_hashed<S>(&self, hash: HashNumber, length: u32, seq: S) -> Option<ParserAtom>
    where
        S: Iterator<Item = u16> + Clone,
    {
        self.set
            .find(table_hash(hash), |&position| {
                self.entries[position as usize].matches(hash, length, seq.clone())
            })
            .map(|&position| ParserAtom::well_known(position))
    }

    /// Entry behind a well-known handle
    ///
    /// Returns `None` for handles issued by a per-parse table.
    #[inline]
    pub fn get(&self, atom: ParserAtom) -> Option<&ParserAtomEntry<H>> {
        atom.well_known_position()
            .and_then(|position| self.entries.get(position))
    }

    /// Returns true if `atom` is one of this table's atoms
    #[inline]
    pub fn contains(&self, atom: ParserAtom) -> bool {
        self.get(atom).is_some()
    }

    /// Number of well-known atoms
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no atoms
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all well-known atoms and their entries
    pub fn iter(&self) -> impl Iterator<Item = (ParserAtom, &ParserAtomEntry<H>)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (ParserAtom::well_known(position as u32), entry))
    }
}

impl<H> Index<ParserAtom> for WellKnownParserAtoms<H> {
    type Output = ParserAtomEntry<H>;

    fn index(&self, atom: ParserAtom) -> &Self::Output {
        match self.get(atom) {
            Some(entry) => entry,
            None => panic!("{:?} is not a well-known atom", atom),
        }
    }
}

impl<H> std::fmt::Debug for WellKnownParserAtoms<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WellKnownParserAtoms")
            .field("len", &self.entries.len())
            .finish()
    }
}

// One table serves concurrent parses
static_assertions::assert_impl_all!(WellKnownParserAtoms<u32>: Send, Sync);
