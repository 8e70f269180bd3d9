//! Bridge to the runtime's canonical string system.
//!
//! Parser atoms live only as long as a parse. Atoms that survive into
//! compiled output are converted, once each, into the runtime's own
//! deduplicated strings through [`CanonicalStrings`].

use std::hash::Hash;

use crate::atom::{AtomText, HashNumber};
use crate::error::AtomsResult;

/// Provider of canonical runtime strings
///
/// The runtime owns the strings; atoms only hold handles to them.
///
/// # Contract
///
/// - `atomize` returns equal handles for equal text.
/// - `hash` should agree with [`hash_chars`](crate::hash_chars) for the
///   handle's text. It is only used by
///   [`ParserAtomEntry::equals_canonical`](crate::ParserAtomEntry::equals_canonical)
///   to reject a mismatch early; atom tables always hash the characters
///   themselves.
pub trait CanonicalStrings {
    /// Handle to a canonical runtime string
    type Handle: Clone + Eq + Hash;

    /// Find or create the canonical string for `text`
    fn atomize(&mut self, text: AtomText<'_>) -> AtomsResult<Self::Handle>;

    /// Characters of the string behind `handle`
    fn text(&self, handle: &Self::Handle) -> AtomText<'_>;

    /// Atom hash of the string behind `handle`
    fn hash(&self, handle: &Self::Handle) -> HashNumber;
}
