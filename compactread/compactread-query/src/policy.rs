/// How an array index at or beyond the array length is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutOfRangePolicy {
    /// Fail with [`DecodeError::IndexOutOfBounds`](compactread_core::DecodeError::IndexOutOfBounds).
    #[default]
    Error,
    /// Resolve to absent, the same as an absent element.
    Absent,
}

/// Settings for a [`GenericRecordQueryReader`](crate::GenericRecordQueryReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Maximum number of parsed paths kept per reader. Paths seen after the
    /// cache is full are parsed on every call.
    pub path_cache_capacity: usize,
    pub out_of_range: OutOfRangePolicy,
}

impl ReaderConfig {
    pub const DEFAULT_PATH_CACHE_CAPACITY: usize = 64;
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            path_cache_capacity: Self::DEFAULT_PATH_CACHE_CAPACITY,
            out_of_range: OutOfRangePolicy::default(),
        }
    }
}
