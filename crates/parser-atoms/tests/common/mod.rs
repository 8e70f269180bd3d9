//! Shared helpers for the parser-atoms integration tests
//!
//! Provides a small canonical string system standing in for the runtime,
//! and fixtures for building tables.

#![allow(dead_code)]

use parser_atoms::{
    hash_chars, AtomText, AtomsConfig, AtomsResult, CanonicalStrings, HashNumber,
    ParserAtomsTable, WellKnownParserAtoms,
};
use std::collections::HashMap;

/// ============================================================================
/// MOCK RUNTIME
/// ============================================================================

/// Handle to a string owned by [`MockRuntime`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JsAtomId(pub u32);

/// Deduplicating string store with call counters
///
/// Strings are kept as UTF-16 units, so texts bridged from Latin-1 atoms
/// come back wide. Equality across widths must still hold.
#[derive(Default)]
pub struct MockRuntime {
    strings: Vec<Vec<u16>>,
    by_text: HashMap<Vec<u16>, JsAtomId>,
    /// Number of `atomize` calls received
    pub atomize_calls: usize,
    /// Hash strings by length instead of by content
    foreign_hash: bool,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runtime whose own string hash differs from the atom hash
    pub fn with_foreign_hash() -> Self {
        Self {
            foreign_hash: true,
            ..Self::default()
        }
    }

    /// Add a string without counting it as an atomize call
    pub fn preload(&mut self, text: &str) -> JsAtomId {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.store(units)
    }

    /// Text of a handle as a Rust string
    pub fn string(&self, handle: JsAtomId) -> String {
        String::from_utf16_lossy(&self.strings[handle.0 as usize])
    }

    /// Number of distinct strings held
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    fn store(&mut self, units: Vec<u16>) -> JsAtomId {
        if let Some(&handle) = self.by_text.get(&units) {
            return handle;
        }
        let handle = JsAtomId(self.strings.len() as u32);
        self.strings.push(units.clone());
        self.by_text.insert(units, handle);
        handle
    }
}

impl CanonicalStrings for MockRuntime {
    type Handle = JsAtomId;

    fn atomize(&mut self, text: AtomText<'_>) -> AtomsResult<JsAtomId> {
        self.atomize_calls += 1;
        Ok(self.store(text.chars().collect()))
    }

    fn text(&self, handle: &JsAtomId) -> AtomText<'_> {
        AtomText::TwoByte(&self.strings[handle.0 as usize])
    }

    fn hash(&self, handle: &JsAtomId) -> HashNumber {
        let units = &self.strings[handle.0 as usize];
        if self.foreign_hash {
            (units.len() as HashNumber).wrapping_mul(31)
        } else {
            hash_chars(units.iter().copied())
        }
    }
}

/// ============================================================================
/// FIXTURES
/// ============================================================================

/// Build the well-known table for the mock runtime
pub fn well_known() -> WellKnownParserAtoms<JsAtomId> {
    WellKnownParserAtoms::new().expect("well-known atoms should build")
}

/// Build a table limited to `limit` bytes of entries
pub fn limited_table(
    well_known: &WellKnownParserAtoms<JsAtomId>,
    limit: usize,
) -> ParserAtomsTable<'_, JsAtomId> {
    let config = AtomsConfig::default().with_memory_limit(limit);
    ParserAtomsTable::with_config(well_known, &config)
}

/// UTF-16 units of a string
pub fn utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}
