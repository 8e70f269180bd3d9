//! Hash-consing probe and insertion for per-parse tables.

use std::mem;

use super::ParserAtomsTable;
use crate::atom::{
    hash_and_length, table_hash, CharWidth, HashNumber, ParserAtom, ParserAtomEntry,
};
use crate::error::{AtomsError, AtomsResult};

/// Outcome of one hash-consing probe
///
/// A vacant cursor carries the hash and length computed during the probe, so
/// inserting after a miss neither rehashes the text nor repeats the equality
/// search. It holds no slot position: the set may grow between the probe and
/// the insertion, so `insert_unique` finds a free slot again from the hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddPtr {
    /// The text is already interned, in the well-known table or in this one
    Found(ParserAtom),
    /// The text is not interned yet
    Vacant {
        /// Hash of the probed text
        hash: HashNumber,
        /// Length of the probed text
        length: u32,
    },
}

impl AddPtr {
    /// The atom found by the probe, if any
    #[inline]
    pub fn found(&self) -> Option<ParserAtom> {
        match *self {
            AddPtr::Found(atom) => Some(atom),
            AddPtr::Vacant { .. } => None,
        }
    }

    /// Returns true if the probe found an existing atom
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, AddPtr::Found(_))
    }
}

impl<'wk, H> ParserAtomsTable<'wk, H> {
    /// Probe for a character sequence without inserting
    ///
    /// The well-known table is consulted first, then this table's entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use parser_atoms::{names, AddPtr, ParserAtomsTable, WellKnownParserAtoms};
    ///
    /// let well_known = WellKnownParserAtoms::<u32>::new().unwrap();
    /// let table = ParserAtomsTable::new(&well_known);
    ///
    /// assert_eq!(table.lookup_for_add("this".encode_utf16()), AddPtr::Found(names::KW_THIS));
    /// assert!(!table.lookup_for_add("that".encode_utf16()).is_found());
    /// ```
    pub fn lookup_for_add<S>(&self, seq: S) -> AddPtr
    where
        S: Iterator<Item = u16> + Clone,
    {
        let (hash, length) = hash_and_length(seq.clone());
        self.lookup_for_add_hashed(hash, length, seq)
    }

    /// Probe with a hash and length computed by the caller
    pub(crate) fn lookup_for_add_hashed<S>(&self, hash: HashNumber, length: u32, seq: S) -> AddPtr
    where
        S: Iterator<Item = u16> + Clone,
    {
        if let Some(atom) = self.well_known.lookup_hashed(hash, length, seq.clone()) {
            return AddPtr::Found(atom);
        }

        let entries = &self.entries;
        match self.set.find(table_hash(hash), |&position| {
            entries[position as usize].matches(hash, length, seq.clone())
        }) {
            Some(&position) => AddPtr::Found(ParserAtom::instance(position as usize)),
            None => AddPtr::Vacant { hash, length },
        }
    }

    /// Insert a new entry at a vacant cursor
    ///
    /// The entry's footprint is charged before `make` allocates anything.
    /// On failure the charge is released and the table is left unchanged.
    pub(super) fn add_entry<F>(
        &mut self,
        hash: HashNumber,
        width: CharWidth,
        length: u32,
        make: F,
    ) -> AtomsResult<ParserAtom>
    where
        F: FnOnce() -> AtomsResult<ParserAtomEntry<H>>,
    {
        let footprint = ParserAtomEntry::<H>::footprint(width, length as usize);
        self.budget.charge(footprint)?;

        match self.insert_entry(hash, make) {
            Ok(atom) => {
                self.misses += 1;
                log::trace!(
                    "interned parser atom #{} ({} chars, {:?})",
                    atom.as_u32(),
                    length,
                    width
                );
                Ok(atom)
            }
            Err(err) => {
                self.budget.release(footprint);
                Err(err)
            }
        }
    }

    fn insert_entry<F>(&mut self, hash: HashNumber, make: F) -> AtomsResult<ParserAtom>
    where
        F: FnOnce() -> AtomsResult<ParserAtomEntry<H>>,
    {
        let entries = &self.entries;
        self.set
            .try_reserve(1, |&position| table_hash(entries[position as usize].hash()))
            .map_err(|_| AtomsError::out_of_memory(mem::size_of::<u32>()))?;
        self.entries
            .try_reserve(1)
            .map_err(|_| AtomsError::out_of_memory(mem::size_of::<ParserAtomEntry<H>>()))?;

        let entry = make()?;
        debug_assert_eq!(entry.hash(), hash);

        let position = self.entries.len();
        let atom = ParserAtom::instance(position);
        self.entries.push(entry);

        let entries = &self.entries;
        self.set.insert_unique(table_hash(hash), position as u32, |&position| {
            table_hash(entries[position as usize].hash())
        });
        Ok(atom)
    }
}
