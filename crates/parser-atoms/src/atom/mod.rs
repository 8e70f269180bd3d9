//! Atom module - Handles, text views and hashing for parser atoms.
//!
//! This module provides the [`ParserAtom`] handle, a compact (4-byte)
//! reference to an interned string, together with the types used to look at
//! an atom's characters:
//!
//! - [`CharWidth`]: narrow (Latin-1, 8-bit) or wide (UTF-16, 16-bit) storage
//! - [`AtomText`]: a borrowed view over the characters at either width
//! - [`AtomChars`]: the characters of a text inflated to 16-bit units
//!
//! # Handle Layout
//!
//! ```text
//! ParserAtom (4 bytes):
//! ┌──────────────────────────────┐
//! │ index < RESERVED_ATOMS_END   │ → well-known atom, same in every table
//! ├──────────────────────────────┤
//! │ index >= RESERVED_ATOMS_END  │ → entry owned by one per-parse table
//! └──────────────────────────────┘
//! ```
//!
//! # Hashing
//!
//! Hashes are computed over the characters inflated to 16-bit units, so the
//! same text hashes identically whether it is stored narrow or wide. The
//! runtime's canonical string system must use [`hash_chars`] as well for the
//! hash pre-check in [`ParserAtomEntry::equals_canonical`] to be meaningful.

mod entry;
pub(crate) mod number;

pub use entry::{HeapChars, ParserAtomEntry, MAX_INLINE_LATIN1, MAX_INLINE_TWO_BYTE};
pub use number::{chars_to_number, check_string_is_index, MAX_ARRAY_INDEX, MAX_INDEX_DIGITS};

use rustc_hash::FxHasher;
use std::fmt;
use std::hash::Hasher;

/// 32-bit hash of an atom's characters
pub type HashNumber = u32;

/// Maximum length of an atom, in characters
pub const MAX_LENGTH: u32 = (1 << 30) - 2;

/// Number of handle indices reserved for well-known atoms
///
/// All handles with index < this value refer to the well-known table and are
/// valid in every per-parse table built on top of it.
pub const RESERVED_ATOMS_END: u32 = 512;

/// Largest code unit representable at Latin-1 width
pub const MAX_LATIN1_CHAR: u16 = 0xff;

/// Golden ratio constant used to spread 32-bit hashes over 64 bits
const GOLDEN_RATIO_64: u64 = 0x9e37_79b9_7f4a_7c15;

/// Compute the atom hash of a character sequence
///
/// # Examples
///
/// ```
/// use parser_atoms::hash_chars;
///
/// let narrow = hash_chars(b"key".iter().map(|&b| u16::from(b)));
/// let wide = hash_chars("key".encode_utf16());
/// assert_eq!(narrow, wide);
/// ```
pub fn hash_chars<I: IntoIterator<Item = u16>>(chars: I) -> HashNumber {
    let mut hasher = FxHasher::default();
    for unit in chars {
        hasher.write_u16(unit);
    }
    hasher.finish() as HashNumber
}

/// Hash and count a character sequence in one pass
///
/// # Panics
///
/// Panics if the sequence is longer than [`MAX_LENGTH`].
pub(crate) fn hash_and_length<I: IntoIterator<Item = u16>>(chars: I) -> (HashNumber, u32) {
    let mut hasher = FxHasher::default();
    let mut length: u32 = 0;
    for unit in chars {
        hasher.write_u16(unit);
        length += 1;
        assert!(length <= MAX_LENGTH, "atom length exceeds maximum");
    }
    (hasher.finish() as HashNumber, length)
}

/// Spread an atom hash over 64 bits for the hash-consing sets
///
/// The sets use the top bits of the 64-bit hash as control bytes, which a
/// zero-extended 32-bit hash would leave empty.
#[inline]
pub(crate) fn table_hash(hash: HashNumber) -> u64 {
    u64::from(hash).wrapping_mul(GOLDEN_RATIO_64)
}

// ============================================================================
// CHARACTER WIDTH
// ============================================================================

/// Per-character storage width of an atom
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharWidth {
    /// Narrow, 8-bit Latin-1 characters
    Latin1,
    /// Wide, 16-bit UTF-16 code units
    TwoByte,
}

impl CharWidth {
    /// Narrowest width able to hold `unit`
    #[inline]
    pub const fn of_unit(unit: u16) -> Self {
        if unit > MAX_LATIN1_CHAR {
            CharWidth::TwoByte
        } else {
            CharWidth::Latin1
        }
    }

    /// The wider of two widths
    #[inline]
    pub const fn max(self, other: Self) -> Self {
        match (self, other) {
            (CharWidth::Latin1, CharWidth::Latin1) => CharWidth::Latin1,
            _ => CharWidth::TwoByte,
        }
    }

    /// Size of one character in bytes
    #[inline]
    pub const fn unit_size(self) -> usize {
        match self {
            CharWidth::Latin1 => 1,
            CharWidth::TwoByte => 2,
        }
    }

    /// Longest text stored inline at this width
    #[inline]
    pub const fn max_inline(self) -> usize {
        match self {
            CharWidth::Latin1 => MAX_INLINE_LATIN1,
            CharWidth::TwoByte => MAX_INLINE_TWO_BYTE,
        }
    }

    /// Whether a text of `length` characters at this width is stored inline
    #[inline]
    pub const fn is_inline_length(self, length: usize) -> bool {
        length <= self.max_inline()
    }
}

// ============================================================================
// ATOM HANDLE
// ============================================================================

/// ParserAtom - A canonical handle to an interned string
///
/// Handles are cheap to copy and compare. Two handles issued by the same
/// [`ParserAtomsTable`](crate::ParserAtomsTable) are equal iff their texts are
/// equal, so later compiler phases compare identifiers by handle instead of by
/// content.
///
/// A handle only carries an index. Instance handles must be resolved through
/// the table that issued them; well-known handles (see
/// [`names`](crate::names)) resolve through any table sharing the same
/// [`WellKnownParserAtoms`](crate::WellKnownParserAtoms).
///
/// # Examples
///
/// ```
/// use parser_atoms::{names, ParserAtomsTable, WellKnownParserAtoms};
///
/// let well_known = WellKnownParserAtoms::<u32>::new().unwrap();
/// let mut table = ParserAtomsTable::new(&well_known);
///
/// let length = table.intern_utf8("length").unwrap();
/// assert_eq!(length, names::ID_LENGTH);
/// assert!(length.is_well_known());
///
/// let local = table.intern_utf8("myLocal").unwrap();
/// assert!(!local.is_well_known());
/// assert_eq!(table[local].to_string(), "myLocal");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParserAtom {
    pub(crate) index: u32,
}

impl ParserAtom {
    /// Handle for the well-known atom at `index`
    pub(crate) const fn well_known(index: u32) -> Self {
        assert!(index < RESERVED_ATOMS_END);
        Self { index }
    }

    /// Handle for the instance entry stored at `position`
    pub(crate) fn instance(position: usize) -> Self {
        let index = u32::try_from(position)
            .ok()
            .and_then(|position| position.checked_add(RESERVED_ATOMS_END))
            .expect("parser atom index space exhausted");
        Self { index }
    }

    /// Returns true if this handle refers to a well-known atom
    ///
    /// # Examples
    ///
    /// ```
    /// use parser_atoms::names;
    ///
    /// assert!(names::KW_FUNCTION.is_well_known());
    /// ```
    #[inline]
    pub const fn is_well_known(&self) -> bool {
        self.index < RESERVED_ATOMS_END
    }

    /// Get the raw index value
    ///
    /// Useful for serialization or debugging.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.index
    }

    /// Position of the entry inside the well-known table
    #[inline]
    pub(crate) fn well_known_position(self) -> Option<usize> {
        self.is_well_known().then_some(self.index as usize)
    }

    /// Position of the entry inside the issuing per-parse table
    #[inline]
    pub(crate) fn instance_position(self) -> Option<usize> {
        (!self.is_well_known()).then(|| (self.index - RESERVED_ATOMS_END) as usize)
    }
}

impl fmt::Debug for ParserAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match crate::well_known::text_of(*self) {
            Some(text) => write!(f, "ParserAtom({:?})", text),
            None => write!(f, "ParserAtom(#{})", self.index),
        }
    }
}

// ============================================================================
// TEXT VIEWS
// ============================================================================

/// Borrowed view over an atom's characters
///
/// Equality compares content, regardless of width: a Latin-1 view and a
/// two-byte view holding the same characters are equal.
#[derive(Clone, Copy)]
pub enum AtomText<'a> {
    /// Latin-1 characters, one byte each
    Latin1(&'a [u8]),
    /// UTF-16 code units
    TwoByte(&'a [u16]),
}

impl<'a> AtomText<'a> {
    /// Number of characters
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            AtomText::Latin1(chars) => chars.len(),
            AtomText::TwoByte(chars) => chars.len(),
        }
    }

    /// Returns true if the text has no characters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage width of the view
    #[inline]
    pub fn width(&self) -> CharWidth {
        match self {
            AtomText::Latin1(_) => CharWidth::Latin1,
            AtomText::TwoByte(_) => CharWidth::TwoByte,
        }
    }

    /// Iterate over the characters as 16-bit units
    #[inline]
    pub fn chars(&self) -> AtomChars<'a> {
        let inner = match *self {
            AtomText::Latin1(chars) => CharsInner::Latin1(chars.iter()),
            AtomText::TwoByte(chars) => CharsInner::TwoByte(chars.iter()),
        };
        AtomChars { inner }
    }

    /// Character at `index`, inflated to 16 bits
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn char_at(&self, index: usize) -> u16 {
        match self {
            AtomText::Latin1(chars) => u16::from(chars[index]),
            AtomText::TwoByte(chars) => chars[index],
        }
    }

    /// Narrowest width able to hold every character of the view
    pub fn smallest_width(&self) -> CharWidth {
        match self {
            AtomText::Latin1(_) => CharWidth::Latin1,
            AtomText::TwoByte(chars) => {
                if chars.iter().any(|&unit| unit > MAX_LATIN1_CHAR) {
                    CharWidth::TwoByte
                } else {
                    CharWidth::Latin1
                }
            }
        }
    }

    /// Compute the atom hash of the view
    #[inline]
    pub fn hash_number(&self) -> HashNumber {
        hash_chars(self.chars())
    }
}

impl PartialEq for AtomText<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AtomText::Latin1(a), AtomText::Latin1(b)) => a == b,
            (AtomText::TwoByte(a), AtomText::TwoByte(b)) => a == b,
            _ => self.len() == other.len() && self.chars().eq(other.chars()),
        }
    }
}

impl Eq for AtomText<'_> {}

impl fmt::Display for AtomText<'_> {
    /// Lone surrogates are shown as U+FFFD
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;

        match self {
            AtomText::Latin1(chars) => {
                for &byte in chars.iter() {
                    f.write_char(char::from(byte))?;
                }
            }
            AtomText::TwoByte(chars) => {
                for ch in char::decode_utf16(chars.iter().copied()) {
                    f.write_char(ch.unwrap_or(char::REPLACEMENT_CHARACTER))?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for AtomText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

/// Iterator over an atom's characters inflated to 16-bit units
///
/// Cloning the iterator restarts it from the current position, which is
/// what the two-pass interning paths rely on.
#[derive(Clone, Debug)]
pub struct AtomChars<'a> {
    inner: CharsInner<'a>,
}

#[derive(Clone, Debug)]
enum CharsInner<'a> {
    Latin1(std::slice::Iter<'a, u8>),
    TwoByte(std::slice::Iter<'a, u16>),
}

impl Iterator for AtomChars<'_> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match &mut self.inner {
            CharsInner::Latin1(iter) => iter.next().map(|&byte| u16::from(byte)),
            CharsInner::TwoByte(iter) => iter.next().copied(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            CharsInner::Latin1(iter) => iter.size_hint(),
            CharsInner::TwoByte(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for AtomChars<'_> {}

// Handles cross thread boundaries together with the well-known table
static_assertions::assert_impl_all!(ParserAtom: Copy, Send, Sync);
