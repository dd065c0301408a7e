//! Path reads over encoded records, with schema lookup by id.

use compactread_codec::SerializationService;
use compactread_core::{EncodedRecord, Value};
use compactread_query::{GenericRecordQueryReader, OutOfRangePolicy, ReaderConfig};

use crate::error::QueryEngineError;

/// Decodes encoded records through a [`SerializationService`] and reads
/// field paths from them.
#[derive(Debug, Default)]
pub struct QueryEngine {
    service: SerializationService,
    config: ReaderConfig,
}

/// Builder for configuring [`QueryEngine`].
#[derive(Debug, Default)]
pub struct QueryEngineBuilder {
    service: SerializationService,
    config: ReaderConfig,
}

impl QueryEngine {
    pub fn builder() -> QueryEngineBuilder {
        QueryEngineBuilder::default()
    }

    pub fn new(service: SerializationService) -> Self {
        Self {
            service,
            config: ReaderConfig::default(),
        }
    }

    pub fn service(&self) -> &SerializationService {
        &self.service
    }

    /// Register further types after construction.
    pub fn service_mut(&mut self) -> &mut SerializationService {
        &mut self.service
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Decode `encoded` and bind a reader to it.
    pub fn reader(
        &self,
        encoded: &EncodedRecord,
    ) -> Result<GenericRecordQueryReader, QueryEngineError> {
        let record = self.service.decode_to_generic_record(encoded)?;
        Ok(GenericRecordQueryReader::with_config(record, self.config))
    }

    /// One-shot read of `path` from `encoded`.
    pub fn read(
        &self,
        encoded: &EncodedRecord,
        path: &str,
    ) -> Result<Option<Value>, QueryEngineError> {
        Ok(self.reader(encoded)?.read(path)?)
    }

    /// Read `path` from every record in turn and pass each result to
    /// `callback`.
    ///
    /// One reader is rebound across records, so the path is parsed once.
    /// Stops at the first error.
    pub fn for_each_value<'a>(
        &self,
        records: impl IntoIterator<Item = &'a EncodedRecord>,
        path: &str,
        mut callback: impl FnMut(Option<Value>) -> Result<(), Box<dyn std::error::Error + Send + Sync>>,
    ) -> Result<usize, QueryEngineError> {
        let mut reader: Option<GenericRecordQueryReader> = None;
        let mut count = 0;

        for encoded in records {
            let record = self.service.decode_to_generic_record(encoded)?;
            let value = match reader.as_mut() {
                Some(reader) => {
                    reader.rebind(record);
                    reader.read(path)
                }
                None => reader
                    .insert(GenericRecordQueryReader::with_config(record, self.config))
                    .read(path),
            };
            callback(value?).map_err(QueryEngineError::Callback)?;
            count += 1;
        }

        log::debug!("read '{path}' from {count} records");
        Ok(count)
    }
}

impl QueryEngineBuilder {
    pub fn with_service(mut self, service: SerializationService) -> Self {
        self.service = service;
        self
    }

    pub fn with_out_of_range(mut self, policy: OutOfRangePolicy) -> Self {
        self.config.out_of_range = policy;
        self
    }

    pub fn with_path_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.path_cache_capacity = capacity;
        self
    }

    pub fn build(self) -> QueryEngine {
        QueryEngine {
            service: self.service,
            config: self.config,
        }
    }
}
