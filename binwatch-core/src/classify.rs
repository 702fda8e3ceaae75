//! Pure derivation of dashboard judgments from a snapshot.

use serde::Serialize;

use crate::model::{Snapshot, TrashKind};

/// Capacity the weight reading is compared against.
///
/// The reading is in grams while this constant was meant as kilograms; the comparison is kept
/// literal, so 100 g already counts as a full container.
pub const MAX_CAPACITY: f64 = 100.0;

/// Fill percentage at and above which the container is critical.
pub const CRITICAL_THRESHOLD: f64 = 80.0;

/// Fill percentage at and above which the container needs attention.
pub const WARNING_THRESHOLD: f64 = 50.0;

/// Operational tier of the container fill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FillTier {
    /// Below the warning threshold.
    Normal,
    /// At or above the warning threshold.
    Warning,
    /// At or above the critical threshold.
    Critical,
}

impl FillTier {
    /// Classify a fill percentage. Boundaries belong to the higher tier.
    #[must_use]
    pub fn from_percentage(fill_percentage: f64) -> Self {
        if fill_percentage >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if fill_percentage >= WARNING_THRESHOLD {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    /// Container status label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Half Full",
            Self::Critical => "Almost Full",
        }
    }
}

/// Collection recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Schedule {
    /// Collect now.
    Immediate,
    /// Collect within the next day.
    Within24h,
    /// Regular collection round is enough.
    Regular,
}

impl Schedule {
    /// Human-friendly label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Immediate => "Immediate",
            Self::Within24h => "Within 24 hours",
            Self::Regular => "Regular Schedule",
        }
    }
}

impl From<FillTier> for Schedule {
    fn from(tier: FillTier) -> Self {
        match tier {
            FillTier::Critical => Self::Immediate,
            FillTier::Warning => Self::Within24h,
            FillTier::Normal => Self::Regular,
        }
    }
}

/// Presentation-ready view of a [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedState {
    /// Fill level in `[0, 100]`.
    pub fill_percentage: f64,
    /// Tier of the fill level.
    pub fill_tier: FillTier,
    /// Collection recommendation matching the tier.
    pub schedule: Schedule,
    /// `MAX_CAPACITY - |weight|`; negative once the reading exceeds the capacity.
    pub remaining_capacity: f64,
    /// Absolute price.
    pub display_price: f64,
    /// Absolute weight in grams.
    pub display_weight: f64,
    /// Waste fraction, carried through for the renderer.
    pub trash_kind: TrashKind,
}

impl DerivedState {
    /// Waste type label for the renderer.
    #[must_use]
    pub fn waste_label(&self) -> &'static str {
        self.trash_kind.label()
    }
}

/// Derive the dashboard judgments for a snapshot. Total over every snapshot value.
#[must_use]
pub fn derive(snapshot: &Snapshot) -> DerivedState {
    let weight = snapshot.weight.abs();
    let fill_percentage = (weight / MAX_CAPACITY * 100.0).min(100.0);
    let fill_tier = FillTier::from_percentage(fill_percentage);

    DerivedState {
        fill_percentage,
        fill_tier,
        schedule: Schedule::from(fill_tier),
        remaining_capacity: MAX_CAPACITY - weight,
        display_price: snapshot.price.abs(),
        display_weight: weight,
        trash_kind: snapshot.trash_kind,
    }
}
