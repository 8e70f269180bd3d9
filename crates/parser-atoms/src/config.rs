//! Configuration Module - Atom Table Tuning Parameters
//!
//! Parameters for a per-parse [`ParserAtomsTable`](crate::ParserAtomsTable).

/// Configuration for a per-parse atom table
///
/// # Examples
///
/// ```rust
/// use parser_atoms::AtomsConfig;
///
/// // Use default configuration
/// let config = AtomsConfig::default();
/// assert_eq!(config.memory_limit, None);
///
/// // Cap the bytes a single parse may spend on atoms
/// let config = AtomsConfig {
///     memory_limit: Some(64 * 1024),
///     ..Default::default()
/// };
/// assert_eq!(config.initial_capacity, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomsConfig {
    /// Number of entries the table can hold before its first resize
    ///
    /// Default: 256
    pub initial_capacity: usize,

    /// Maximum number of bytes the table may charge for entries
    ///
    /// Covers entry headers, inline characters and heap character buffers.
    /// Interning fails with `AtomsError::OutOfMemory` once exceeded.
    ///
    /// Default: `None` (unlimited)
    pub memory_limit: Option<usize>,
}

impl AtomsConfig {
    /// Default initial capacity of the instance set
    pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

    /// Set the initial capacity
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the memory limit in bytes
    pub fn with_memory_limit(mut self, limit: usize) -> Self {
        self.memory_limit = Some(limit);
        self
    }
}

impl Default for AtomsConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            memory_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AtomsConfig::default();
        assert_eq!(config.initial_capacity, 256);
        assert_eq!(config.memory_limit, None);
    }

    #[test]
    fn test_builder_helpers() {
        let config = AtomsConfig::default()
            .with_initial_capacity(16)
            .with_memory_limit(4096);
        assert_eq!(config.initial_capacity, 16);
        assert_eq!(config.memory_limit, Some(4096));
    }
}
