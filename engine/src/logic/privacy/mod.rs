//! Privacy Guard Module
//!
//! Two gates applied to every count-bearing result before it leaves the
//! engine: a k-anonymity minimum (suppression) and a max-result-size
//! maximum (blocking). Both replace the result with a zero count and a
//! cause-specific message; neither is an error. Every disclosed result is
//! tagged `anonymized = true` so callers know the numbers are never
//! individual-level.

use serde::{Deserialize, Serialize};

use crate::constants;

// ============================================================================
// BOUNDS
// ============================================================================

/// Privacy bounds applied uniformly across every read path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyBounds {
    /// Minimum individuals behind any disclosed aggregate
    pub k_anonymity: usize,
    /// Maximum disclosed result-set size
    pub max_results: usize,
}

impl Default for PrivacyBounds {
    fn default() -> Self {
        Self {
            k_anonymity: constants::DEFAULT_K_ANONYMITY,
            max_results: constants::DEFAULT_MAX_RESULTS,
        }
    }
}

impl PrivacyBounds {
    /// Bounds with environment overrides applied
    pub fn from_env() -> Self {
        Self {
            k_anonymity: constants::get_k_anonymity(),
            max_results: constants::get_max_results(),
        }
    }
}

// ============================================================================
// GUARDED COUNTS
// ============================================================================

/// A count after passing the privacy gates.
///
/// Invariant: `count` is either the true count (within the allowed band)
/// or exactly 0 with a privacy message; `anonymized` is always true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardedCount {
    pub count: usize,
    pub anonymized: bool,
    pub message: String,
}

/// Suppression gate: results smaller than the k-anonymity bound are
/// replaced by a zero count. Returns `None` when the gate passes.
pub fn enforce_min(count: usize, k_anonymity: usize) -> Option<GuardedCount> {
    if count < k_anonymity {
        Some(GuardedCount {
            count: 0,
            anonymized: true,
            message: format!(
                "Result suppressed: fewer than {} matching individuals (k-anonymity).",
                k_anonymity
            ),
        })
    } else {
        None
    }
}

/// Blocking gate: results larger than the max-result bound are replaced by
/// a zero count with a distinct message. Returns `None` when the gate
/// passes.
pub fn enforce_max(count: usize, max_results: usize) -> Option<GuardedCount> {
    if count > max_results {
        Some(GuardedCount {
            count: 0,
            anonymized: true,
            message: format!(
                "Result blocked: more than {} matching records.",
                max_results
            ),
        })
    } else {
        None
    }
}

/// Apply both gates; `passed_message` is used when the true count is
/// disclosed.
pub fn enforce(count: usize, bounds: &PrivacyBounds, passed_message: String) -> GuardedCount {
    if let Some(suppressed) = enforce_min(count, bounds.k_anonymity) {
        log::debug!("count {} suppressed (k={})", count, bounds.k_anonymity);
        return suppressed;
    }
    if let Some(blocked) = enforce_max(count, bounds.max_results) {
        log::debug!("count {} blocked (max={})", count, bounds.max_results);
        return blocked;
    }
    GuardedCount {
        count,
        anonymized: true,
        message: passed_message,
    }
}

// ============================================================================
// TESTS
// ============================================================================
