use serde::{Deserialize, Serialize};

use crate::models::plan::{HoursRange, IntensityTier};

/// Per-tier pacing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierPacing {
    pub weekly_hours: HoursRange,
    pub videos_per_week: usize,
    /// Extra milestone appended to the final week of each skill block.
    /// `{skill}` is substituted.
    pub closing_milestone: String,
}

/// Pacing thresholds and per-tier parameters. Injected into the synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Durations at or below this many weeks are intensive.
    pub intensive_max_weeks: u32,
    /// Durations at or above this many weeks are comprehensive.
    pub comprehensive_min_weeks: u32,
    pub intensive: TierPacing,
    pub moderate: TierPacing,
    pub comprehensive: TierPacing,
}

impl PacingConfig {
    pub fn tier_for(&self, duration_weeks: u32) -> IntensityTier {
        if duration_weeks <= self.intensive_max_weeks {
            IntensityTier::Intensive
        } else if duration_weeks >= self.comprehensive_min_weeks {
            IntensityTier::Comprehensive
        } else {
            IntensityTier::Moderate
        }
    }

    pub fn pacing(&self, tier: IntensityTier) -> &TierPacing {
        match tier {
            IntensityTier::Intensive => &self.intensive,
            IntensityTier::Moderate => &self.moderate,
            IntensityTier::Comprehensive => &self.comprehensive,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            intensive_max_weeks: 4,
            comprehensive_min_weeks: 12,
            intensive: TierPacing {
                weekly_hours: HoursRange { min: 15.0, max: 20.0 },
                videos_per_week: 2,
                closing_milestone: "Pass the {skill} crash-course checkpoint".to_string(),
            },
            moderate: TierPacing {
                weekly_hours: HoursRange { min: 10.0, max: 15.0 },
                videos_per_week: 3,
                closing_milestone: "Finish the guided {skill} exercises".to_string(),
            },
            comprehensive: TierPacing {
                weekly_hours: HoursRange { min: 8.0, max: 12.0 },
                videos_per_week: 4,
                closing_milestone: "Add a {skill} project to your portfolio".to_string(),
            },
        }
    }
}
