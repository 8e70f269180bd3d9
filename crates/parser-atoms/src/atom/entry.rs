//! Atom entries: immutable text records owned by an atom table.
//!
//! An entry's characters live either inline, inside the entry itself, or in
//! a heap buffer the entry exclusively owns. The choice is a static function
//! of width and length:
//!
//! ```text
//! Latin-1:  length <= 24 → inline [u8; 24]    otherwise Box<[u8]>
//! Two-byte: length <= 12 → inline [u16; 12]   otherwise Box<[u16]>
//! ```
//!
//! Both inline buffers are 24 bytes, so the storage enum has the same size for
//! either width.

use std::mem;
use std::sync::OnceLock;

use super::number::{chars_to_number, check_string_is_index};
use super::{AtomChars, AtomText, CharWidth, HashNumber, MAX_LATIN1_CHAR, MAX_LENGTH};
use crate::error::{AtomsError, AtomsResult, NumberResult};
use crate::runtime::CanonicalStrings;

/// Longest Latin-1 text stored inline
pub const MAX_INLINE_LATIN1: usize = 24;

/// Longest two-byte text stored inline
pub const MAX_INLINE_TWO_BYTE: usize = 12;

/// Character storage of an entry
#[derive(Clone)]
enum Storage {
    InlineLatin1([u8; MAX_INLINE_LATIN1]),
    InlineTwoByte([u16; MAX_INLINE_TWO_BYTE]),
    HeapLatin1(Box<[u8]>),
    HeapTwoByte(Box<[u16]>),
}

/// Heap buffer of characters handed over to a new entry
///
/// Built when a text is too long for inline storage, for example by atom
/// concatenation, which assembles the buffer before knowing whether an equal
/// atom already exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeapChars {
    /// Latin-1 characters
    Latin1(Box<[u8]>),
    /// UTF-16 code units
    TwoByte(Box<[u16]>),
}

impl HeapChars {
    /// Copy `length` units of `seq` into a new buffer of the given width
    ///
    /// Every unit must fit `width`.
    pub fn try_collect<S>(width: CharWidth, seq: S, length: usize) -> AtomsResult<Self>
    where
        S: Iterator<Item = u16>,
    {
        match width {
            CharWidth::Latin1 => {
                let mut buf = try_buffer::<u8>(length)?;
                buf.extend(seq.take(length).map(narrow_unit));
                debug_assert_eq!(buf.len(), length, "sequence shorter than its length");
                Ok(HeapChars::Latin1(buf.into_boxed_slice()))
            }
            CharWidth::TwoByte => {
                let mut buf = try_buffer::<u16>(length)?;
                buf.extend(seq.take(length));
                debug_assert_eq!(buf.len(), length, "sequence shorter than its length");
                Ok(HeapChars::TwoByte(buf.into_boxed_slice()))
            }
        }
    }

    /// Concatenate two texts into a buffer of the wider of their widths
    pub fn try_concat(prefix: AtomText<'_>, suffix: AtomText<'_>) -> AtomsResult<Self> {
        let width = prefix.width().max(suffix.width());
        let length = prefix.len() + suffix.len();
        match (width, prefix, suffix) {
            (CharWidth::Latin1, AtomText::Latin1(head), AtomText::Latin1(tail)) => {
                let mut buf = try_buffer::<u8>(length)?;
                buf.extend_from_slice(head);
                buf.extend_from_slice(tail);
                Ok(HeapChars::Latin1(buf.into_boxed_slice()))
            }
            _ => {
                let mut buf = try_buffer::<u16>(length)?;
                buf.extend(prefix.chars());
                buf.extend(suffix.chars());
                Ok(HeapChars::TwoByte(buf.into_boxed_slice()))
            }
        }
    }

    /// Number of characters in the buffer
    pub fn len(&self) -> usize {
        self.text().len()
    }

    /// Returns true if the buffer holds no characters
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of the buffer
    pub fn width(&self) -> CharWidth {
        self.text().width()
    }

    /// View over the buffered characters
    pub fn text(&self) -> AtomText<'_> {
        match self {
            HeapChars::Latin1(chars) => AtomText::Latin1(chars),
            HeapChars::TwoByte(chars) => AtomText::TwoByte(chars),
        }
    }
}

/// Allocate an empty vector able to hold `length` elements, fallibly
fn try_buffer<T>(length: usize) -> AtomsResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(length)
        .map_err(|_| AtomsError::out_of_memory(length.saturating_mul(mem::size_of::<T>())))?;
    Ok(buf)
}

#[inline]
fn narrow_unit(unit: u16) -> u8 {
    debug_assert!(unit <= MAX_LATIN1_CHAR, "wide unit in Latin-1 content");
    unit as u8
}

/// ParserAtomEntry - The immutable record behind a [`ParserAtom`](super::ParserAtom)
///
/// Entries are created only by the atom tables and never copied or mutated
/// afterwards, with one exception: the canonical handle cache, a one-shot
/// cell filled the first time the entry is bridged to the runtime's string
/// system.
///
/// `H` is the runtime's canonical string handle type (see
/// [`CanonicalStrings`]).
pub struct ParserAtomEntry<H> {
    length: u32,
    hash: HashNumber,
    storage: Storage,
    canonical: OnceLock<H>,
}

impl<H> ParserAtomEntry<H> {
    /// Create an entry for `length` units of `seq`, all fitting `width`
    ///
    /// Short texts are copied into inline storage; longer ones into a newly
    /// allocated heap buffer owned by the entry.
    ///
    /// # Panics
    ///
    /// Panics if `length` exceeds [`MAX_LENGTH`].
    pub fn create<S>(width: CharWidth, seq: S, length: u32, hash: HashNumber) -> AtomsResult<Self>
    where
        S: Iterator<Item = u16>,
    {
        assert!(length <= MAX_LENGTH, "atom length {} exceeds maximum", length);
        if width.is_inline_length(length as usize) {
            return Ok(Self::new_inline(width, seq, length, hash));
        }
        let chars = HeapChars::try_collect(width, seq, length as usize)?;
        Ok(Self::from_heap(chars, hash))
    }

    /// Create an inline entry
    fn new_inline<S>(width: CharWidth, seq: S, length: u32, hash: HashNumber) -> Self
    where
        S: Iterator<Item = u16>,
    {
        let length_usize = length as usize;
        debug_assert!(width.is_inline_length(length_usize));

        let storage = match width {
            CharWidth::Latin1 => {
                let mut buf = [0u8; MAX_INLINE_LATIN1];
                for (slot, unit) in buf[..length_usize].iter_mut().zip(seq) {
                    *slot = narrow_unit(unit);
                }
                Storage::InlineLatin1(buf)
            }
            CharWidth::TwoByte => {
                let mut buf = [0u16; MAX_INLINE_TWO_BYTE];
                for (slot, unit) in buf[..length_usize].iter_mut().zip(seq) {
                    *slot = unit;
                }
                Storage::InlineTwoByte(buf)
            }
        };

        Self {
            length,
            hash,
            storage,
            canonical: OnceLock::new(),
        }
    }

    /// Create an entry taking ownership of a heap buffer
    ///
    /// # Panics
    ///
    /// Panics if the buffer is short enough to be stored inline, or longer
    /// than [`MAX_LENGTH`].
    pub fn from_heap(chars: HeapChars, hash: HashNumber) -> Self {
        let width = chars.width();
        let length = u32::try_from(chars.len())
            .ok()
            .filter(|&length| length <= MAX_LENGTH)
            .expect("atom length exceeds maximum");
        assert!(
            !width.is_inline_length(length as usize),
            "heap storage used for an inline-sized atom"
        );

        let storage = match chars {
            HeapChars::Latin1(chars) => Storage::HeapLatin1(chars),
            HeapChars::TwoByte(chars) => Storage::HeapTwoByte(chars),
        };

        Self {
            length,
            hash,
            storage,
            canonical: OnceLock::new(),
        }
    }

    /// Bytes accounted for an entry of `length` characters at `width`
    ///
    /// The entry itself plus its heap buffer, if the text does not fit
    /// inline.
    pub fn footprint(width: CharWidth, length: usize) -> usize {
        let header = mem::size_of::<Self>();
        if width.is_inline_length(length) {
            header
        } else {
            header + length * width.unit_size()
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Number of characters
    #[inline]
    pub fn len(&self) -> u32 {
        self.length
    }

    /// Returns true if the text is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Precomputed hash of the characters
    #[inline]
    pub fn hash(&self) -> HashNumber {
        self.hash
    }

    /// Storage width
    #[inline]
    pub fn width(&self) -> CharWidth {
        match self.storage {
            Storage::InlineLatin1(_) | Storage::HeapLatin1(_) => CharWidth::Latin1,
            Storage::InlineTwoByte(_) | Storage::HeapTwoByte(_) => CharWidth::TwoByte,
        }
    }

    /// Returns true if the characters are stored inside the entry
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(
            self.storage,
            Storage::InlineLatin1(_) | Storage::InlineTwoByte(_)
        )
    }

    /// Returns true if the characters are stored at Latin-1 width
    #[inline]
    pub fn has_latin1_chars(&self) -> bool {
        self.width() == CharWidth::Latin1
    }

    /// Returns true if the characters are stored at two-byte width
    #[inline]
    pub fn has_two_byte_chars(&self) -> bool {
        self.width() == CharWidth::TwoByte
    }

    /// Latin-1 characters, if stored narrow
    pub fn latin1_chars(&self) -> Option<&[u8]> {
        match self.text() {
            AtomText::Latin1(chars) => Some(chars),
            AtomText::TwoByte(_) => None,
        }
    }

    /// Two-byte characters, if stored wide
    pub fn two_byte_chars(&self) -> Option<&[u16]> {
        match self.text() {
            AtomText::TwoByte(chars) => Some(chars),
            AtomText::Latin1(_) => None,
        }
    }

    /// View over the characters
    #[inline]
    pub fn text(&self) -> AtomText<'_> {
        let length = self.length as usize;
        match &self.storage {
            Storage::InlineLatin1(buf) => AtomText::Latin1(&buf[..length]),
            Storage::InlineTwoByte(buf) => AtomText::TwoByte(&buf[..length]),
            Storage::HeapLatin1(buf) => AtomText::Latin1(buf),
            Storage::HeapTwoByte(buf) => AtomText::TwoByte(buf),
        }
    }

    /// Iterate over the characters as 16-bit units
    #[inline]
    pub fn chars(&self) -> AtomChars<'_> {
        self.text().chars()
    }

    /// Character at `index`, inflated to 16 bits
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn char_at(&self, index: usize) -> u16 {
        self.text().char_at(index)
    }

    /// Heap bytes owned by the entry
    pub fn heap_bytes(&self) -> usize {
        match &self.storage {
            Storage::InlineLatin1(_) | Storage::InlineTwoByte(_) => 0,
            Storage::HeapLatin1(buf) => buf.len(),
            Storage::HeapTwoByte(buf) => buf.len() * 2,
        }
    }

    // ------------------------------------------------------------------------
    // Comparison
    // ------------------------------------------------------------------------

    /// Returns true if this entry holds exactly `length` units of `seq`
    ///
    /// The hash and length are compared before any character.
    pub(crate) fn matches<S>(&self, hash: HashNumber, length: u32, seq: S) -> bool
    where
        S: Iterator<Item = u16>,
    {
        self.hash == hash && self.length == length && self.chars().eq(seq)
    }

    /// Returns true if both entries hold the same characters
    ///
    /// Widths may differ; content is compared unit by unit.
    pub fn content_equals<H2>(&self, other: &ParserAtomEntry<H2>) -> bool {
        self.hash == other.hash && self.length == other.length && self.text() == other.text()
    }

    /// Returns true if this entry's text equals the runtime string `handle`
    ///
    /// Once the entry has been bridged, only the handles are compared.
    /// Otherwise the hash and length are checked before the characters.
    pub fn equals_canonical<R>(&self, runtime: &R, handle: &H) -> bool
    where
        R: CanonicalStrings<Handle = H>,
        H: PartialEq,
    {
        if let Some(cached) = self.canonical.get() {
            return cached == handle;
        }
        if self.hash != runtime.hash(handle) {
            return false;
        }
        let other = runtime.text(handle);
        other.len() == self.length as usize && self.text() == other
    }

    // ------------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------------

    /// Returns true if the text is an array index
    ///
    /// See [`ParserAtomEntry::to_index`].
    #[inline]
    pub fn is_index(&self) -> bool {
        self.to_index().is_some()
    }

    /// Value of the text as an array index
    ///
    /// The text must be the decimal digits of an integer no larger than
    /// [`MAX_ARRAY_INDEX`](super::MAX_ARRAY_INDEX), without leading zeros
    /// except for `"0"` itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use parser_atoms::{ParserAtomsTable, WellKnownParserAtoms};
    ///
    /// let well_known = WellKnownParserAtoms::<u32>::new().unwrap();
    /// let mut table = ParserAtomsTable::new(&well_known);
    ///
    /// let index = table.intern_utf8("42").unwrap();
    /// assert_eq!(table[index].to_index(), Some(42));
    ///
    /// let padded = table.intern_utf8("042").unwrap();
    /// assert_eq!(table[padded].to_index(), None);
    /// ```
    pub fn to_index(&self) -> Option<u32> {
        check_string_is_index(self.chars())
    }

    /// Parse the text as a number
    ///
    /// Uses the numeric string grammar: surrounding white space is ignored,
    /// an empty text is zero, and `0x`/`0o`/`0b` prefixed integers,
    /// `Infinity` and signed decimal literals are accepted.
    pub fn to_number(&self) -> NumberResult<f64> {
        chars_to_number(self.text())
    }

    // ------------------------------------------------------------------------
    // Canonical strings
    // ------------------------------------------------------------------------

    /// Cached canonical handle, if the entry has been bridged
    #[inline]
    pub fn canonical(&self) -> Option<&H> {
        self.canonical.get()
    }

    /// Record `handle` as this entry's canonical string
    ///
    /// A handle that is already cached is kept.
    pub(crate) fn set_canonical(&self, handle: H)
    where
        H: PartialEq,
    {
        if let Err(handle) = self.canonical.set(handle) {
            debug_assert!(
                self.canonical.get() == Some(&handle),
                "atom bridged to two different canonical strings"
            );
        }
    }

    /// Canonical runtime string for this entry
    ///
    /// Returns the cached handle if present; otherwise asks the runtime to
    /// atomize the characters and caches the result. Only the first call
    /// reaches the runtime.
    pub fn to_canonical<R>(&self, runtime: &mut R) -> AtomsResult<H>
    where
        R: CanonicalStrings<Handle = H>,
        H: Clone,
    {
        if let Some(handle) = self.canonical.get() {
            return Ok(handle.clone());
        }
        let handle = runtime.atomize(self.text())?;
        Ok(self.canonical.get_or_init(|| handle).clone())
    }
}

impl<H> std::fmt::Debug for ParserAtomEntry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserAtomEntry")
            .field("text", &self.text())
            .field("width", &self.width())
            .field("inline", &self.is_inline())
            .field("hash", &self.hash)
            .field("bridged", &self.canonical.get().is_some())
            .finish()
    }
}

impl<H> std::fmt::Display for ParserAtomEntry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.text(), f)
    }
}
