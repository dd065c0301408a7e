//! CRC-64 digest used to derive [`SchemaId`](super::SchemaId)s.
//!
//! Identical schema definitions produce the same identifier in every process.

use crc::{CRC_64_ECMA_182, Crc, Digest};

static CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_ECMA_182);

pub(crate) struct Fingerprint(Digest<'static, u64>);

impl Fingerprint {
    pub(crate) fn new() -> Self {
        Self(CRC64.digest())
    }

    pub(crate) fn write_u8(&mut self, byte: u8) {
        self.0.update(&[byte]);
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.0.update(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.0.update(&v.to_le_bytes());
    }

    /// Length-prefixed so that adjacent strings cannot alias.
    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.0.update(s.as_bytes());
    }

    pub(crate) fn finish(self) -> u64 {
        self.0.finalize()
    }
}
