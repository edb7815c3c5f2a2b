//! Perception settings carried by every [`Mol`](crate::Mol).
//!
//! The configuration is plain data and round-trips through any `serde`
//! format, so callers can load it alongside their own settings:
//!
//! ```
//! use ringcrab::PerceptionConfig;
//!
//! let config: PerceptionConfig = serde_json::from_str(
//!     r#"{ "strict_error_checking": true,
//!          "complete_ring_set": { "enabled": true, "max_rings": 500 } }"#,
//! ).unwrap();
//! assert!(config.strict_error_checking);
//! assert!(config.perceive_aromaticity);
//! assert_eq!(config.complete_ring_set.max_rings, Some(500));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aromaticity::AromaticityOptions;
use crate::ring_search::RingSearchLimits;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Fail on malformed ring candidates and mistyped explicit properties
    /// instead of skipping them with a warning.
    pub strict_error_checking: bool,
    /// When disabled, aromaticity queries only consult explicit values and
    /// otherwise report nothing aromatic.
    pub perceive_aromaticity: bool,
    pub complete_ring_set: CompleteRingSetConfig,
    pub aromaticity: AromaticityOptions,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            strict_error_checking: false,
            perceive_aromaticity: true,
            complete_ring_set: CompleteRingSetConfig::default(),
            aromaticity: AromaticityOptions::default(),
        }
    }
}

/// Controls enumeration of every elementary cycle.
///
/// The complete ring set grows exponentially for highly fused graphs, so it
/// is off by default. `max_rings` and `timeout_ms` abort the search with
/// [`MolError::ComputationAborted`](crate::MolError::ComputationAborted);
/// `max_ring_size` restricts the question to rings of at most that size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompleteRingSetConfig {
    pub enabled: bool,
    pub max_ring_size: Option<usize>,
    pub max_rings: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl CompleteRingSetConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn limits(&self) -> RingSearchLimits {
        RingSearchLimits {
            max_ring_size: self.max_ring_size,
            max_rings: self.max_rings,
            timeout: self.timeout(),
            cancel: None,
        }
    }
}
