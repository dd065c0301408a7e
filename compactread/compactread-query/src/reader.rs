use std::collections::HashMap;

use compactread_core::{GenericRecord, Value};

use crate::{
    error::QueryError,
    path::FieldPath,
    policy::ReaderConfig,
    resolver::resolve_with_policy,
};

/// Reads field paths from one bound [`GenericRecord`].
///
/// Parsed paths are cached up to
/// [`ReaderConfig::path_cache_capacity`] entries, so a query engine issuing
/// the same expressions against many records parses each one once. The cache
/// survives [`rebind`](Self::rebind).
///
/// A reader is cheap to build and is meant to be owned by one thread; the
/// record it wraps can be cloned and shared freely.
#[derive(Debug)]
pub struct GenericRecordQueryReader {
    record: GenericRecord,
    config: ReaderConfig,
    paths: HashMap<String, FieldPath>,
    saturated: bool,
}

impl GenericRecordQueryReader {
    pub fn new(record: GenericRecord) -> Self {
        Self::with_config(record, ReaderConfig::default())
    }

    pub fn with_config(record: GenericRecord, config: ReaderConfig) -> Self {
        Self {
            record,
            config,
            paths: HashMap::new(),
            saturated: false,
        }
    }

    /// Resolve `path` against the bound record.
    ///
    /// Returns `Ok(None)` when the addressed value, or any record above it,
    /// is absent.
    pub fn read(&mut self, path: &str) -> Result<Option<Value>, QueryError> {
        let out_of_range = self.config.out_of_range;
        let record = &self.record;

        let result = match self.paths.get(path) {
            Some(parsed) => resolve_with_policy(record, parsed, out_of_range),
            None => {
                log::trace!("parsing field path '{path}'");
                let parsed = FieldPath::parse(path).map_err(|source| QueryError::InvalidPath {
                    path: path.to_string(),
                    source,
                })?;
                let result = resolve_with_policy(record, &parsed, out_of_range);
                if self.paths.len() < self.config.path_cache_capacity {
                    self.paths.insert(path.to_string(), parsed);
                } else if !self.saturated {
                    log::debug!(
                        "path cache full at {} entries, further paths are parsed per read",
                        self.config.path_cache_capacity
                    );
                    self.saturated = true;
                }
                result
            }
        };

        result.map_err(|source| QueryError::Read {
            path: path.to_string(),
            source,
        })
    }

    pub fn record(&self) -> &GenericRecord {
        &self.record
    }

    /// Swap in another record, keeping parsed paths. Returns the previous one.
    pub fn rebind(&mut self, record: GenericRecord) -> GenericRecord {
        log::trace!("rebinding reader to a '{}' record", record.type_name());
        std::mem::replace(&mut self.record, record)
    }

    pub fn cached_paths(&self) -> usize {
        self.paths.len()
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}
