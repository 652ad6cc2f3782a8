//! Fallback adapter - arbitration between extraction paths.
//!
//! When the enhanced record scores below threshold, the legacy extractor
//! re-runs on the unmerged occurrence and the higher-scoring candidate is
//! emitted. The adapter keeps comparative counters so operators can see how
//! often the fallback actually wins.

use tracing::debug;

use crate::types::PublicationRecord;

/// Comparative metrics across fallback arbitrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallbackStats {
    /// Times the legacy extractor was consulted
    pub fallbacks_tried: u64,

    /// Times the enhanced record still won
    pub enhanced_wins: u64,

    /// Times the legacy record scored strictly higher
    pub legacy_wins: u64,
}

impl FallbackStats {
    /// Fraction of arbitrations the legacy path won; 0.0 before any.
    pub fn legacy_win_rate(&self) -> f32 {
        if self.fallbacks_tried == 0 {
            return 0.0;
        }
        self.legacy_wins as f32 / self.fallbacks_tried as f32
    }
}

/// Picks between enhanced and legacy candidates for one occurrence.
#[derive(Debug, Default)]
pub struct FallbackAdapter {
    stats: FallbackStats,
}

impl FallbackAdapter {
    /// Create an adapter with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Comparative counters so far.
    pub fn stats(&self) -> FallbackStats {
        self.stats
    }

    /// Emit whichever candidate scores higher; ties keep the enhanced
    /// record. Provenance stays on the winning record's `extraction_path`.
    pub fn arbitrate(
        &mut self,
        enhanced: PublicationRecord,
        legacy: PublicationRecord,
    ) -> PublicationRecord {
        self.stats.fallbacks_tried += 1;
        if legacy.quality_score > enhanced.quality_score {
            debug!(
                enhanced_score = enhanced.quality_score,
                legacy_score = legacy.quality_score,
                "legacy extractor won arbitration"
            );
            self.stats.legacy_wins += 1;
            legacy
        } else {
            self.stats.enhanced_wins += 1;
            enhanced
        }
    }
}
