//! Per-parse atom tables.
//!
//! A [`ParserAtomsTable`] hash-conses every identifier and string literal
//! seen during one parse. Interning follows the same path for every input
//! encoding:
//!
//! ```text
//! chars ──► hash + length ──► well-known? ──► instance set? ──► new entry
//!                                 │               │                 │
//!                                 └──── hit ──────┴──── hit         └─► handle
//! ```
//!
//! Entries are owned by the table and released together when it is dropped.
//!
//! # Examples
//!
//! ```
//! use parser_atoms::{ParserAtomsTable, WellKnownParserAtoms};
//!
//! let well_known = WellKnownParserAtoms::<u32>::new().unwrap();
//! let mut table = ParserAtomsTable::new(&well_known);
//!
//! let foo = table.intern_utf8("foo").unwrap();
//! let bar = table.intern_latin1(b"bar").unwrap();
//! let foobar = table.concat_atoms(foo, bar).unwrap();
//!
//! assert_eq!(foobar, table.intern_utf8("foobar").unwrap());
//! assert_eq!(table.len(), 3);
//! ```

mod lookup;

pub use lookup::AddPtr;

use std::hash::Hash;
use std::mem;
use std::ops::Index;

use hashbrown::HashTable;
use rustc_hash::FxHashMap;

use crate::atom::{
    hash_and_length, CharWidth, HashNumber, HeapChars, ParserAtom, ParserAtomEntry,
    MAX_INLINE_LATIN1, MAX_LENGTH,
};
use crate::config::AtomsConfig;
use crate::error::{AtomsError, AtomsResult, NumberResult};
use crate::memory::MemoryBudget;
use crate::runtime::CanonicalStrings;
use crate::stats::AtomsTableStats;
use crate::well_known::WellKnownParserAtoms;

/// ParserAtomsTable - Hash-consed atoms of one parse
///
/// Two handles issued by the same table are equal iff their texts are
/// equal. Texts present in the well-known table always resolve to the
/// well-known handle and never create an entry here.
///
/// `H` is the runtime's canonical string handle type.
pub struct ParserAtomsTable<'wk, H> {
    well_known: &'wk WellKnownParserAtoms<H>,
    entries: Vec<ParserAtomEntry<H>>,
    set: HashTable<u32>,
    /// Runtime strings already bridged through `intern_canonical`
    canonical_map: FxHashMap<H, ParserAtom>,
    budget: MemoryBudget,
    well_known_hits: usize,
    hits: usize,
    misses: usize,
}

impl<'wk, H> ParserAtomsTable<'wk, H> {
    /// Create a table with the default configuration
    pub fn new(well_known: &'wk WellKnownParserAtoms<H>) -> Self {
        Self::with_config(well_known, &AtomsConfig::default())
    }

    /// Create a table with the given configuration
    pub fn with_config(well_known: &'wk WellKnownParserAtoms<H>, config: &AtomsConfig) -> Self {
        log::debug!(
            "creating parser atoms table (capacity {}, memory limit {:?})",
            config.initial_capacity,
            config.memory_limit
        );
        Self {
            well_known,
            entries: Vec::with_capacity(config.initial_capacity),
            set: HashTable::with_capacity(config.initial_capacity),
            canonical_map: FxHashMap::default(),
            budget: MemoryBudget::new(config.memory_limit),
            well_known_hits: 0,
            hits: 0,
            misses: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Interning
    // ------------------------------------------------------------------------

    /// Intern Latin-1 characters
    pub fn intern_latin1(&mut self, chars: &[u8]) -> AtomsResult<ParserAtom> {
        self.intern_with_width(chars.iter().map(|&byte| u16::from(byte)), Some(CharWidth::Latin1))
    }

    /// Intern ASCII characters
    ///
    /// ASCII is a subset of Latin-1; non-ASCII input is rejected in debug
    /// builds only.
    pub fn intern_ascii(&mut self, chars: &[u8]) -> AtomsResult<ParserAtom> {
        debug_assert!(chars.is_ascii(), "intern_ascii called with non-ASCII input");
        self.intern_latin1(chars)
    }

    /// Intern UTF-16 code units
    ///
    /// The new atom is stored at Latin-1 width if every unit fits.
    pub fn intern_char16(&mut self, chars: &[u16]) -> AtomsResult<ParserAtom> {
        self.intern_seq(chars.iter().copied())
    }

    /// Intern a UTF-8 string
    ///
    /// # Examples
    ///
    /// ```
    /// use parser_atoms::{ParserAtomsTable, WellKnownParserAtoms};
    ///
    /// let well_known = WellKnownParserAtoms::<u32>::new().unwrap();
    /// let mut table = ParserAtomsTable::new(&well_known);
    ///
    /// let ascii = table.intern_utf8("plain").unwrap();
    /// let latin1 = table.intern_utf8("naïve").unwrap();
    /// let wide = table.intern_utf8("λx").unwrap();
    ///
    /// assert!(table[ascii].has_latin1_chars());
    /// assert!(table[latin1].has_latin1_chars());
    /// assert!(table[wide].has_two_byte_chars());
    /// ```
    pub fn intern_utf8(&mut self, text: &str) -> AtomsResult<ParserAtom> {
        if text.is_ascii() {
            self.intern_latin1(text.as_bytes())
        } else {
            self.intern_seq(text.encode_utf16())
        }
    }

    /// Intern a sequence of UTF-16 code units
    ///
    /// Cloning `seq` must restart it from the beginning: the sequence is
    /// walked once to hash it and again to copy it on a miss.
    pub fn intern_seq<S>(&mut self, seq: S) -> AtomsResult<ParserAtom>
    where
        S: Iterator<Item = u16> + Clone,
    {
        self.intern_with_width(seq, None)
    }

    /// Intern a sequence, classifying its width on a miss unless known
    fn intern_with_width<S>(&mut self, seq: S, width: Option<CharWidth>) -> AtomsResult<ParserAtom>
    where
        S: Iterator<Item = u16> + Clone,
    {
        match self.lookup_for_add(seq.clone()) {
            AddPtr::Found(atom) => Ok(self.record_hit(atom)),
            AddPtr::Vacant { hash, length } => self.insert_seq(hash, length, seq, width),
        }
    }

    fn insert_seq<S>(
        &mut self,
        hash: HashNumber,
        length: u32,
        seq: S,
        width: Option<CharWidth>,
    ) -> AtomsResult<ParserAtom>
    where
        S: Iterator<Item = u16> + Clone,
    {
        let width = width.unwrap_or_else(|| {
            seq.clone()
                .fold(CharWidth::Latin1, |width, unit| width.max(CharWidth::of_unit(unit)))
        });
        self.add_entry(hash, width, length, move || {
            ParserAtomEntry::create(width, seq, length, hash)
        })
    }

    /// Intern the concatenation of two atoms
    ///
    /// The result is Latin-1 iff both inputs are. Results short enough for
    /// inline storage are assembled on the stack; longer ones in a heap
    /// buffer that a new entry adopts without another copy.
    ///
    /// # Panics
    ///
    /// Panics if either handle was not issued by this table or its
    /// well-known table, or if the result would exceed [`MAX_LENGTH`].
    pub fn concat_atoms(&mut self, prefix: ParserAtom, suffix: ParserAtom) -> AtomsResult<ParserAtom> {
        let (width, length) = {
            let (head, tail) = (&self[prefix], &self[suffix]);
            let length = head.len() as usize + tail.len() as usize;
            (head.width().max(tail.width()), length)
        };
        assert!(length <= MAX_LENGTH as usize, "concatenated atom exceeds maximum length");

        if width.is_inline_length(length) {
            let mut buf = [0u16; MAX_INLINE_LATIN1];
            let units = self[prefix].chars().chain(self[suffix].chars());
            for (slot, unit) in buf.iter_mut().zip(units) {
                *slot = unit;
            }
            return self.intern_with_width(buf[..length].iter().copied(), Some(width));
        }

        let chars = HeapChars::try_concat(self[prefix].text(), self[suffix].text())?;
        let ptr = self.lookup_for_add(chars.text().chars());
        match ptr {
            AddPtr::Found(atom) => Ok(self.record_hit(atom)),
            AddPtr::Vacant { hash, length } => self.add_entry(hash, width, length, move || {
                Ok(ParserAtomEntry::from_heap(chars, hash))
            }),
        }
    }

    /// Intern the text of a runtime string and bridge the atom to it
    ///
    /// The resulting atom's canonical cache is set to `handle`, and the
    /// handle is remembered so interning it again is a single map lookup.
    /// The runtime is never asked to atomize anything.
    ///
    /// # Panics
    ///
    /// Panics if the runtime string is longer than [`MAX_LENGTH`].
    pub fn intern_canonical<R>(&mut self, runtime: &R, handle: &H) -> AtomsResult<ParserAtom>
    where
        R: CanonicalStrings<Handle = H>,
        H: Clone + Eq + Hash,
    {
        if let Some(&atom) = self.canonical_map.get(handle) {
            return Ok(self.record_hit(atom));
        }

        self.canonical_map
            .try_reserve(1)
            .map_err(|_| AtomsError::out_of_memory(mem::size_of::<(H, ParserAtom)>()))?;

        // The runtime's own hash only serves its deduplication; atoms are
        // always keyed by `hash_chars`.
        let text = runtime.text(handle);
        let (hash, length) = hash_and_length(text.chars());

        let atom = match self.lookup_for_add_hashed(hash, length, text.chars()) {
            AddPtr::Found(atom) => self.record_hit(atom),
            AddPtr::Vacant { hash, length } => {
                let width = text.smallest_width();
                self.insert_seq(hash, length, text.chars(), Some(width))?
            }
        };

        self[atom].set_canonical(handle.clone());
        self.canonical_map.insert(handle.clone(), atom);
        Ok(atom)
    }

    fn record_hit(&mut self, atom: ParserAtom) -> ParserAtom {
        if atom.is_well_known() {
            self.well_known_hits += 1;
        } else {
            self.hits += 1;
        }
        atom
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Entry behind a handle
    ///
    /// Well-known handles resolve through the shared well-known table.
    /// Returns `None` for an instance handle beyond this table's entries;
    /// handles issued by another table are not detected otherwise.
    #[inline]
    pub fn get(&self, atom: ParserAtom) -> Option<&ParserAtomEntry<H>> {
        match atom.instance_position() {
            Some(position) => self.entries.get(position),
            None => self.well_known.get(atom),
        }
    }

    /// Returns true if `atom` resolves in this table
    #[inline]
    pub fn contains(&self, atom: ParserAtom) -> bool {
        self.get(atom).is_some()
    }

    /// Number of entries owned by this table
    ///
    /// Well-known atoms are not counted.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if this table owns no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries owned by this table, in creation order
    pub fn iter(&self) -> impl Iterator<Item = (ParserAtom, &ParserAtomEntry<H>)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (ParserAtom::instance(position), entry))
    }

    /// The well-known table consulted before this one
    #[inline]
    pub fn well_known(&self) -> &'wk WellKnownParserAtoms<H> {
        self.well_known
    }

    /// Bytes currently charged for this table's entries
    #[inline]
    pub fn memory_used(&self) -> usize {
        self.budget.used()
    }

    /// The table's memory budget
    #[inline]
    pub fn budget(&self) -> &MemoryBudget {
        &self.budget
    }

    /// Get statistics about the table
    pub fn stats(&self) -> AtomsTableStats {
        let inline_entries = self.entries.iter().filter(|entry| entry.is_inline()).count();
        AtomsTableStats {
            count: self.entries.len(),
            capacity: self.set.capacity(),
            well_known_hits: self.well_known_hits,
            hits: self.hits,
            misses: self.misses,
            inline_entries,
            heap_entries: self.entries.len() - inline_entries,
            bytes_used: self.budget.used(),
        }
    }

    /// Canonical runtime string for an atom, bridging it on first use
    pub fn to_canonical<R>(&self, atom: ParserAtom, runtime: &mut R) -> AtomsResult<H>
    where
        R: CanonicalStrings<Handle = H>,
        H: Clone,
    {
        self[atom].to_canonical(runtime)
    }

    /// Returns true if the atom's text is an array index
    #[inline]
    pub fn is_index(&self, atom: ParserAtom) -> bool {
        self[atom].is_index()
    }

    /// Parse the atom's text as a number
    #[inline]
    pub fn to_number(&self, atom: ParserAtom) -> NumberResult<f64> {
        self[atom].to_number()
    }
}

impl<H> Index<ParserAtom> for ParserAtomsTable<'_, H> {
    type Output = ParserAtomEntry<H>;

    fn index(&self, atom: ParserAtom) -> &Self::Output {
        match self.get(atom) {
            Some(entry) => entry,
            None => panic!("{:?} was not issued by this table", atom),
        }
    }
}

impl<H> std::fmt::Debug for ParserAtomsTable<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserAtomsTable")
            .field("len", &self.entries.len())
            .field("well_known", &self.well_known.len())
            .field("memory_used", &self.budget.used())
            .finish()
    }
}

impl<H> Drop for ParserAtomsTable<'_, H> {
    fn drop(&mut self) {
        log::debug!("dropping parser atoms table: {:?}", self.stats());
    }
}

static_assertions::assert_impl_all!(ParserAtomsTable<'static, u32>: Send);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{AtomText, MAX_INLINE_TWO_BYTE};
    use crate::names;

    fn well_known() -> WellKnownParserAtoms<u32> {
        WellKnownParserAtoms::new().unwrap()
    }

    // ========================================================================
    // Hash-Consing Tests
    // ========================================================================

    #[test]
    fn test_same_text_same_handle() {
        let wk = well_known();
        let mut table = ParserAtomsTable::new(&wk);

        let a = table.intern_utf8("foo").unwrap();
        let b = table.intern_latin1(b"foo").unwrap();
        let c = table.intern_char16(&[0x66, 0x6f, 0x6f]).unwrap();

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(table.len(), 1);
        assert_ne!(a, table.intern_utf8("fop").unwrap());
    }

    #[test]
    fn test_well_known_never_allocates() {
        let wk = well_known();
        let mut table = ParserAtomsTable::new(&wk);

        assert_eq!(table.intern_utf8("function").unwrap(), names::KW_FUNCTION);
        assert_eq!(table.intern_utf8("").unwrap(), names::EMPTY);
        assert!(table.is_empty());
        assert_eq!(table.memory_used(), 0);
        assert_eq!(table.stats().well_known_hits, 2);
    }

    #[test]
    fn test_char16_is_reclassified() {
        let wk = well_known();
        let mut table = ParserAtomsTable::new(&wk);

        let units: Vec<u16> = "ñandú".encode_utf16().collect();
        let atom = table.intern_char16(&units).unwrap();
        assert!(table[atom].has_latin1_chars());
        assert_eq!(table.intern_latin1(b"\xf1and\xfa").unwrap(), atom);
    }

    // ========================================================================
    // Concatenation Tests
    // ========================================================================

    #[test]
    fn test_concat_width() {
        let wk = well_known();
        let mut table = ParserAtomsTable::new(&wk);

        let narrow = table.intern_utf8("ab").unwrap();
        let wide = table.intern_utf8("λ").unwrap();

        let both_narrow = table.concat_atoms(narrow, narrow).unwrap();
        let mixed = table.concat_atoms(narrow, wide).unwrap();

        assert!(table[both_narrow].has_latin1_chars());
        assert!(table[mixed].has_two_byte_chars());
        assert_eq!(table[mixed].to_string(), "abλ");
    }

    #[test]
    fn test_concat_crosses_inline_threshold() {
        let wk = well_known();
        let mut table = ParserAtomsTable::new(&wk);

        let half = table.intern_utf8(&"x".repeat(12)).unwrap();
        let at_limit = table.concat_atoms(half, half).unwrap();
        assert!(table[at_limit].is_inline());

        let one = table.intern_utf8("y").unwrap();
        let over = table.concat_atoms(at_limit, one).unwrap();
        assert!(!table[over].is_inline());
        assert_eq!(table[over].len() as usize, MAX_INLINE_LATIN1 + 1);

        let direct = table.intern_utf8(&format!("{}y", "x".repeat(24))).unwrap();
        assert_eq!(direct, over);
    }

    #[test]
    fn test_concat_two_byte_heap() {
        let wk = well_known();
        let mut table = ParserAtomsTable::new(&wk);

        let wide = table.intern_utf8(&"λ".repeat(MAX_INLINE_TWO_BYTE)).unwrap();
        let narrow = table.intern_utf8("z").unwrap();
        let joined = table.concat_atoms(wide, narrow).unwrap();

        assert!(!table[joined].is_inline());
        assert!(table[joined].has_two_byte_chars());

        let direct = table.intern_utf8(&format!("{}z", "λ".repeat(12))).unwrap();
        assert_eq!(direct, joined);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_concat_hits_well_known() {
        let wk = well_known();
        let mut table = ParserAtomsTable::new(&wk);

        let proto = table.intern_utf8("proto").unwrap();
        let typ = table.intern_utf8("type").unwrap();
        assert_eq!(table.concat_atoms(proto, typ).unwrap(), names::ID_PROTOTYPE);
    }

    // ========================================================================
    // Memory Budget Tests
    // ========================================================================

    #[test]
    fn test_out_of_memory_leaves_table_unchanged() {
        let wk = well_known();
        let header = mem::size_of::<ParserAtomEntry<u32>>();
        let config = AtomsConfig::default().with_memory_limit(header);
        let mut table = ParserAtomsTable::with_config(&wk, &config);

        let long = "a".repeat(40);
        assert!(matches!(
            table.intern_utf8(&long),
            Err(AtomsError::OutOfMemory { .. })
        ));
        assert!(table.is_empty());
        assert_eq!(table.memory_used(), 0);
        assert!(!table.lookup_for_add(long.encode_utf16()).is_found());

        let short = table.intern_utf8("short").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.memory_used(), header);
        assert_eq!(table.intern_utf8("short").unwrap(), short);
    }

    #[test]
    fn test_stats_track_storage() {
        let wk = well_known();
        let mut table = ParserAtomsTable::new(&wk);

        table.intern_utf8("tiny").unwrap();
        table.intern_utf8(&"long".repeat(10)).unwrap();
        table.intern_utf8("tiny").unwrap();

        let stats = table.stats();
        assert_eq!(stats.count, 2);
        assert_eq!((stats.inline_entries, stats.heap_entries), (1, 1));
        assert_eq!((stats.hits, stats.misses), (1, 2));
        assert!(stats.capacity >= 2);
        assert_eq!(stats.bytes_used, table.memory_used());
    }

    // ========================================================================
    // Query Tests
    // ========================================================================

    #[test]
    fn test_iter_in_creation_order() {
        let wk = well_known();
        let mut table = ParserAtomsTable::new(&wk);

        let first = table.intern_utf8("first").unwrap();
        let second = table.intern_utf8("second").unwrap();
        table.intern_utf8("length").unwrap();

        let atoms: Vec<ParserAtom> = table.iter().map(|(atom, _)| atom).collect();
        assert_eq!(atoms, vec![first, second]);
    }

    #[test]
    fn test_get_rejects_unknown_instance() {
        let wk = well_known();
        let table = ParserAtomsTable::new(&wk);
        assert!(table.get(ParserAtom::instance(0)).is_none());
        assert!(table.contains(names::PROTO_OBJECT));
    }

    #[test]
    #[should_panic(expected = "was not issued by this table")]
    fn test_index_panics_on_foreign_handle() {
        let wk = well_known();
        let table = ParserAtomsTable::new(&wk);
        let _ = &table[ParserAtom::instance(3)];
    }

    #[test]
    fn test_index_and_number_helpers() {
        let wk = well_known();
        let mut table = ParserAtomsTable::new(&wk);

        let index = table.intern_utf8("17").unwrap();
        let float = table.intern_utf8("2.5").unwrap();
        assert!(table.is_index(index));
        assert!(!table.is_index(float));
        assert_eq!(table.to_number(float), Ok(2.5));
        assert_eq!(table[index].text(), AtomText::Latin1(b"17"));
    }
}
