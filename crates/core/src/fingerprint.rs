//! Change fingerprints for directory listings
//!
//! A fingerprint covers the entry count plus each entry's name and size, in
//! listing order, digested with BLAKE3. Equal fingerprints are read as "no
//! change". Content edits that keep both name and size are invisible to it.

use crate::entry::Entry;
use serde::{Deserialize, Serialize};

/// Order-sensitive digest of a listing's names and sizes
#[derive(Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint of a sequence of entries
    ///
    /// Fields are length-delimited so `("a1", 23)` and `("a12", 3)` never
    /// collide. Reordering the same entries produces a different value.
    pub fn of(entries: &[Entry]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(entries.len() as u64).to_le_bytes());
        for entry in entries {
            let name = entry.name.as_bytes();
            hasher.update(&(name.len() as u64).to_le_bytes());
            hasher.update(name);
            hasher.update(&entry.size.to_le_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Fingerprint of an empty listing
    pub fn empty() -> Self {
        Self::of(&[])
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        const HEX_CHARS: &[u8] = b"0123456789abcdef";
        let mut hex = String::with_capacity(64);
        for &byte in &self.0 {
            hex.push(HEX_CHARS[(byte >> 4) as usize] as char);
            hex.push(HEX_CHARS[(byte & 0xf) as usize] as char);
        }
        hex
    }

    /// First 12 hex characters, for log lines
    pub fn short(&self) -> String {
        self.to_hex()[..12].to_string()
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
