//! Trace and entity identifier generation.
//!
//! # Responsibilities
//! - Produce trace IDs in the daemon wire format (`1-<epoch hex>-<24 hex>`)
//! - Produce 16-hex-digit entity IDs for segments and subsegments
//! - Support a random strategy (default) and a deterministic strategy
//!   for reproducible test runs
//!
//! # Design Decisions
//! - Callers never depend on which strategy is active; both produce
//!   format-identical IDs
//! - The deterministic strategy folds time, pid, and a process-wide
//!   atomic counter into hex digits; the counter guarantees uniqueness
//!   within a process even at microsecond-identical call times

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Version prefix required by the collector wire format.
pub const TRACE_ID_VERSION: &str = "1";

const TRACE_SUFFIX_LEN: usize = 24;
const ENTITY_ID_LEN: usize = 16;
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// A trace identifier: `1-<8 hex epoch seconds>-<24 hex suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    /// Parse a raw string, accepting only the exact three-part shape.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, '-');
        let version = parts.next()?;
        let epoch = parts.next()?;
        let suffix = parts.next()?;
        if version != TRACE_ID_VERSION {
            return None;
        }
        if epoch.len() != 8 || !is_hex(epoch) {
            return None;
        }
        if suffix.len() != TRACE_SUFFIX_LEN || !is_hex(suffix) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A segment/subsegment identifier: 16 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != ENTITY_ID_LEN || !is_hex(raw) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_hex(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Identifier generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// General-purpose PRNG hex sampling.
    #[default]
    Random,
    /// Time + pid + monotonic counter, for reproducible test runs.
    Deterministic,
}

/// Generator for trace and entity identifiers.
///
/// The counter is the only process-wide mutable state in the tracing
/// subsystem; it is only consulted by the deterministic strategy.
#[derive(Debug)]
pub struct IdGenerator {
    strategy: IdStrategy,
    counter: AtomicU64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            counter: AtomicU64::new(0),
        }
    }

    pub fn random() -> Self {
        Self::new(IdStrategy::Random)
    }

    pub fn deterministic() -> Self {
        Self::new(IdStrategy::Deterministic)
    }

    /// Allocate a new trace ID in the collector wire format.
    pub fn new_trace_id(&self) -> TraceId {
        let epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        TraceId(format!(
            "{}-{:08x}-{}",
            TRACE_ID_VERSION,
            epoch,
            self.suffix(TRACE_SUFFIX_LEN)
        ))
    }

    /// Allocate a new 16-hex-digit entity ID.
    pub fn new_entity_id(&self) -> EntityId {
        EntityId(self.suffix(ENTITY_ID_LEN))
    }

    fn suffix(&self, len: usize) -> String {
        match self.strategy {
            IdStrategy::Random => {
                let mut rng = rand::thread_rng();
                (0..len)
                    .map(|_| HEX_DIGITS[rng.gen_range(0..16)] as char)
                    .collect()
            }
            IdStrategy::Deterministic => {
                let micros = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_micros() as u64;
                let seq = self.counter.fetch_add(1, Ordering::Relaxed);
                fold_digits(micros, std::process::id(), seq, len)
            }
        }
    }
}

/// Fold the concatenated decimal digits of (time, pid, counter) into hex
/// characters by modulo-16 reduction, keeping the rightmost `len` characters
/// (left-padded with zeros) so the counter always influences the result.
fn fold_digits(micros: u64, pid: u32, seq: u64, len: usize) -> String {
    let combined = format!("{micros}{pid}{seq}");
    let mut folded: String = combined
        .bytes()
        .map(|b| HEX_DIGITS[((b - b'0') as usize) % 16] as char)
        .collect();
    while folded.len() < len {
        folded.insert(0, '0');
    }
    folded.split_off(folded.len() - len)
}
