//! Stable 64-bit hashes for the build cache.
//!
//! Everything here is CRC-64/NVME over explicitly laid out bytes, so values do not
//! depend on the Rust version, the platform or `std::hash` internals.

use crc64fast_nvme as crc64;

/// Mixed into every program hash; bump when the generated text changes shape.
const PROGRAM_HASH_VERSION: &[u8] = b"shader-variants program v1\n";

/// Incremental hasher whose fields are length-prefixed, so `("ab", "c")` and
/// `("a", "bc")` differ.
pub(crate) struct ProgramHasher {
    digest: crc64::Digest,
}

impl ProgramHasher {
    pub fn new() -> Self {
        let mut digest = crc64::Digest::new();
        digest.write(PROGRAM_HASH_VERSION);
        ProgramHasher { digest }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.digest.write(&(bytes.len() as u64).to_le_bytes());
        self.digest.write(bytes);
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.digest.write(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.digest.write(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.digest.write(&[value as u8]);
    }

    pub fn finish(&self) -> u64 {
        self.digest.sum64()
    }
}

/// Hash of raw bytes
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut digest = crc64::Digest::new();
    digest.write(bytes);
    digest.sum64()
}

/// Hash identifying one mutation; combine with the program hash, technique and stage
/// to key a compiled variant.
pub fn mutation_hash(mutation: &[i32]) -> u64 {
    let mut digest = crc64::Digest::new();
    for value in mutation {
        digest.write(&value.to_le_bytes());
    }
    digest.sum64()
}

/// Suffix of the `#ifndef` guard emitted for `#pragma once`
pub(crate) fn include_guard_hash(resolved_path: &str) -> u64 {
    hash_bytes(resolved_path.as_bytes())
}
