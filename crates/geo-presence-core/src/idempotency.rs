//! Idempotency-key derivation for check-in deduplication.
//!
//! A retried request carries the same `(user, place, timestamp)` triple, so
//! a deterministic digest of the triple lets the storage layer treat both
//! deliveries as one logical check-in attempt. The key is a pure correlation
//! token; it carries no scoring semantics.
//!
//! The hash algorithm is selected at construction. There is no runtime
//! capability probe: a given build derives keys in exactly one format, which
//! keeps the stored natural keys stable and the derivation testable.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::types::{PlaceId, UserId};

/// Field separator in the pre-hash material.
///
/// `|` cannot appear in a millisecond timestamp, so distinct triples can
/// never concatenate to the same material.
const SEPARATOR: char = '|';

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash algorithm used for key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyAlgorithm {
    /// SHA-256, truncated to a 32-hex-char prefix. The default.
    #[default]
    Sha256,
    /// FNV-1a 64-bit, rendered as 16 hex chars. Non-cryptographic fallback
    /// for targets without a SHA implementation.
    Fnv1a,
}

/// A derived idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derives idempotency keys for check-in attempts.
#[derive(Debug, Clone, Copy)]
pub struct IdempotencyKeyDeriver {
    algorithm: KeyAlgorithm,
}

impl IdempotencyKeyDeriver {
    /// Create a deriver using the given algorithm.
    #[must_use]
    pub fn new(algorithm: KeyAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Create a deriver using the default algorithm (SHA-256).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(KeyAlgorithm::default())
    }

    /// The algorithm this deriver was constructed with.
    #[must_use]
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Derive the key for a `(user, place, timestamp)` triple.
    ///
    /// Identical triples always yield identical keys; distinct triples yield
    /// distinct keys with overwhelming probability. The timestamp enters at
    /// millisecond precision, matching the wire format's resolution.
    #[must_use]
    pub fn derive(
        &self,
        user: &UserId,
        place: &PlaceId,
        timestamp: DateTime<Utc>,
    ) -> IdempotencyKey {
        let material = format!(
            "{}{sep}{}{sep}{}",
            user.as_str(),
            place.as_str(),
            timestamp.timestamp_millis(),
            sep = SEPARATOR,
        );

        let key = match self.algorithm {
            KeyAlgorithm::Sha256 => {
                let digest = Sha256::digest(material.as_bytes());
                hex_encode(&digest[..16])
            }
            KeyAlgorithm::Fnv1a => format!("{:016x}", fnv1a_64(material.as_bytes())),
        };

        IdempotencyKey(key)
    }
}

impl Default for IdempotencyKeyDeriver {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// FNV-1a 64-bit over a byte slice.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Lowercase hex rendering of a byte slice.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, byte| {
            out.push_str(&format!("{:02x}", byte));
            out
        },
    )
}
