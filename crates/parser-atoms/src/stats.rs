//! Statistics about a per-parse atom table for profiling.

/// Statistics about a [`ParserAtomsTable`](crate::ParserAtomsTable)
///
/// # Fields
///
/// * `count` - Number of entries owned by the table
/// * `capacity` - Entries the hash-consing set holds before resizing
/// * `well_known_hits` - Interns answered by the well-known table
/// * `hits` - Interns answered by an existing table entry
/// * `misses` - Interns that created a new entry
/// * `inline_entries` - Entries storing their characters inline
/// * `heap_entries` - Entries owning a heap buffer
/// * `bytes_used` - Bytes charged against the memory budget
///
/// # Examples
///
/// ```
/// use parser_atoms::{ParserAtomsTable, WellKnownParserAtoms};
///
/// let well_known = WellKnownParserAtoms::<u32>::new().unwrap();
/// let mut table = ParserAtomsTable::new(&well_known);
/// table.intern_utf8("x").unwrap();
/// table.intern_utf8("x").unwrap();
/// table.intern_utf8("length").unwrap();
///
/// let stats = table.stats();
/// assert_eq!((stats.misses, stats.hits, stats.well_known_hits), (1, 1, 1));
/// println!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AtomsTableStats {
    /// Number of entries owned by the table
    pub count: usize,
    /// Hash-consing set capacity
    pub capacity: usize,
    /// Interns resolved to a well-known atom
    pub well_known_hits: usize,
    /// Interns resolved to an existing entry
    pub hits: usize,
    /// Interns that created an entry
    pub misses: usize,
    /// Entries with inline storage
    pub inline_entries: usize,
    /// Entries with heap storage
    pub heap_entries: usize,
    /// Bytes charged for entries
    pub bytes_used: usize,
}

impl AtomsTableStats {
    /// Calculate the load factor (count / capacity)
    ///
    /// Returns 0.0 if capacity is 0.
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.count as f64 / self.capacity as f64
        }
    }

    /// Fraction of interns that did not allocate
    ///
    /// Both well-known and table hits count. Returns 0.0 if nothing has
    /// been interned.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_operations();
        if total == 0 {
            0.0
        } else {
            (self.hits + self.well_known_hits) as f64 / total as f64
        }
    }

    /// Get total number of interning operations
    pub fn total_operations(&self) -> usize {
        self.well_known_hits + self.hits + self.misses
    }

    /// Fraction of entries stored inline
    ///
    /// Returns 0.0 for an empty table.
    pub fn inline_ratio(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.inline_entries as f64 / self.count as f64
        }
    }
}
