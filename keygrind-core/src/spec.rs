//! Immutable description of one search request.

use crate::address::is_base58_character;
use crate::config::{MAX_ITERATION_BITS, MIN_ITERATION_BITS};
use crate::error::{KeygrindError, Result};

/// Validated, immutable parameters of a single search request.
///
/// A spec is fixed for the lifetime of the request: the orchestrator,
/// every worker, and the ledger all share one instance and none of them
/// mutate it.
#[derive(Debug, Clone)]
pub struct SearchSpec {
    prefix: String,
    suffix: String,
    case_sensitive: bool,
    quota: usize,
    iteration_bits: u8,
}

impl SearchSpec {
    /// Validate and build a spec.
    ///
    /// Rejects patterns with characters outside the base58 alphabet,
    /// an empty pattern on both sides, a zero quota, and iteration bits
    /// outside the supported dispatch range.
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        case_sensitive: bool,
        quota: usize,
        iteration_bits: u8,
    ) -> Result<Self> {
        let prefix = prefix.into();
        let suffix = suffix.into();

        if prefix.is_empty() && suffix.is_empty() {
            return Err(KeygrindError::EmptyPattern);
        }
        check_pattern("starts_with", &prefix)?;
        check_pattern("ends_with", &suffix)?;

        if quota == 0 {
            return Err(KeygrindError::InvalidCount);
        }
        if !(MIN_ITERATION_BITS..=MAX_ITERATION_BITS).contains(&iteration_bits) {
            return Err(KeygrindError::InvalidIterationBits {
                min: MIN_ITERATION_BITS,
                max: MAX_ITERATION_BITS,
                got: iteration_bits,
            });
        }

        Ok(Self {
            prefix,
            suffix,
            case_sensitive,
            quota,
            iteration_bits,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Number of accepted results the request asks for.
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Log2 of the candidate count swept by one kernel dispatch.
    pub fn iteration_bits(&self) -> u8 {
        self.iteration_bits
    }

    /// Whether `address` satisfies the requested pattern.
    pub fn matches(&self, address: &str) -> bool {
        if self.case_sensitive {
            address.starts_with(&self.prefix) && address.ends_with(&self.suffix)
        } else {
            let address = address.to_lowercase();
            address.starts_with(&self.prefix.to_lowercase())
                && address.ends_with(&self.suffix.to_lowercase())
        }
    }
}

fn check_pattern(field: &'static str, pattern: &str) -> Result<()> {
    for character in pattern.chars() {
        if !is_base58_character(character) {
            return Err(KeygrindError::InvalidPattern { field, character });
        }
    }
    Ok(())
}
