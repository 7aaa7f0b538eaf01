//! Input batches and engineered features.

mod engineer;
mod frame;
mod reader;
mod stats;

pub use engineer::{DayLevel, EngagementLevel, EngineeredBatch, FeatureEngineer, SegmentThresholds};
pub use frame::Frame;
pub use reader::{read_batch, RawBatch};
pub use stats::{fill_with_median, median};

/// Column names shared by the engineer and the inference pipeline.
pub mod columns {
    pub const SESSIONS: &str = "sessions";
    pub const DRIVES: &str = "drives";
    pub const TOTAL_SESSIONS: &str = "total_sessions";
    pub const N_DAYS_AFTER_ONBOARDING: &str = "n_days_after_onboarding";
    pub const TOTAL_NAVIGATIONS_FAV1: &str = "total_navigations_fav1";
    pub const TOTAL_NAVIGATIONS_FAV2: &str = "total_navigations_fav2";
    pub const DRIVEN_KM_DRIVES: &str = "driven_km_drives";
    pub const DURATION_MINUTES_DRIVES: &str = "duration_minutes_drives";
    pub const ACTIVITY_DAYS: &str = "activity_days";
    pub const DRIVING_DAYS: &str = "driving_days";

    pub const ENGAGEMENT_LEVEL: &str = "engagement_level";
    pub const DAY_LEVEL: &str = "day_level";
    pub const ACTIVITY_RATIO: &str = "activity_ratio";
    pub const AVG_DISTANCE_PER_DRIVE: &str = "avg_distance_per_drive";
    pub const ENGAGEMENT_RATIO: &str = "engagement_ratio";
    pub const AVG_NAVIGATIONS_FAV: &str = "avg_navigations_fav";

    /// Raw columns every batch must carry.
    pub const REQUIRED: [&str; 10] = [
        SESSIONS,
        DRIVES,
        TOTAL_SESSIONS,
        N_DAYS_AFTER_ONBOARDING,
        TOTAL_NAVIGATIONS_FAV1,
        TOTAL_NAVIGATIONS_FAV2,
        DRIVEN_KM_DRIVES,
        DURATION_MINUTES_DRIVES,
        ACTIVITY_DAYS,
        DRIVING_DAYS,
    ];

    /// Appended by the engineer, in this order.
    pub const DERIVED: [&str; 6] = [
        ENGAGEMENT_LEVEL,
        DAY_LEVEL,
        ACTIVITY_RATIO,
        AVG_DISTANCE_PER_DRIVE,
        ENGAGEMENT_RATIO,
        AVG_NAVIGATIONS_FAV,
    ];

    /// Magnitude columns passed through the fitted scaler.
    pub const SCALED: [&str; 4] = [
        TOTAL_NAVIGATIONS_FAV1,
        TOTAL_NAVIGATIONS_FAV2,
        TOTAL_SESSIONS,
        DRIVEN_KM_DRIVES,
    ];
}
