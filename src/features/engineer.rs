//! Feature engineering: raw batch → segmentation levels + ratio columns.
//!
//! Segmentation thresholds are medians of the current batch, so a row's
//! levels depend on what else was uploaded with it.

use super::columns::*;
use super::stats::{fill_with_median, median};
use super::Frame;
use crate::config::FeaturesConfig;
use crate::error::{ChurnError, Result};
use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayLevel {
    Low,
    High,
}

impl EngagementLevel {
    pub fn as_feature(self) -> f64 {
        match self {
            EngagementLevel::Low => 0.0,
            EngagementLevel::High => 1.0,
        }
    }
}

impl DayLevel {
    pub fn as_feature(self) -> f64 {
        match self {
            DayLevel::Low => 0.0,
            DayLevel::High => 1.0,
        }
    }
}

/// Batch medians the two segmentations compare against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentThresholds {
    pub sessions: f64,
    pub total_navigations_fav1: f64,
    pub n_days_after_onboarding: f64,
    pub drives: f64,
    pub activity_days: f64,
    pub driving_days: f64,
}

impl SegmentThresholds {
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let m = |name: &str| -> Result<f64> { Ok(median(frame.column(name)?.iter().copied())) };
        Ok(Self {
            sessions: m(SESSIONS)?,
            total_navigations_fav1: m(TOTAL_NAVIGATIONS_FAV1)?,
            n_days_after_onboarding: m(N_DAYS_AFTER_ONBOARDING)?,
            drives: m(DRIVES)?,
            activity_days: m(ACTIVITY_DAYS)?,
            driving_days: m(DRIVING_DAYS)?,
        })
    }

    /// High only for strictly more sessions than the median, at least median
    /// favourite-1 navigations and tenure, and at most median drives.
    pub fn engagement_level(
        &self,
        sessions: f64,
        total_navigations_fav1: f64,
        n_days_after_onboarding: f64,
        drives: f64,
    ) -> EngagementLevel {
        if sessions > self.sessions
            && total_navigations_fav1 >= self.total_navigations_fav1
            && n_days_after_onboarding >= self.n_days_after_onboarding
            && drives <= self.drives
        {
            EngagementLevel::High
        } else {
            EngagementLevel::Low
        }
    }

    pub fn day_level(&self, activity_days: f64, driving_days: f64) -> DayLevel {
        if activity_days <= self.activity_days && driving_days <= self.driving_days {
            DayLevel::High
        } else {
            DayLevel::Low
        }
    }
}

/// Engineered batch plus the thresholds used to build it.
#[derive(Debug, Clone)]
pub struct EngineeredBatch {
    pub frame: Frame,
    pub thresholds: SegmentThresholds,
}

pub struct FeatureEngineer {
    config: FeaturesConfig,
}

impl FeatureEngineer {
    pub fn new(config: FeaturesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeaturesConfig {
        &self.config
    }

    /// Drop identifiers and label, segment every row against batch medians,
    /// then add the four median-filled ratio columns.
    pub fn engineer(&self, raw: &Frame) -> Result<EngineeredBatch> {
        if raw.is_empty() {
            return Err(ChurnError::Input("input batch is empty".to_string()));
        }
        let mut frame = raw.without(&self.config.identifier_columns);
        frame = frame.without(&[self.config.label_column.as_str()]);

        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|c| !frame.has_column(c))
            .collect();
        if !missing.is_empty() {
            return Err(ChurnError::Input(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let thresholds = SegmentThresholds::from_frame(&frame)?;

        let engagement = Zip::from(&frame.column(SESSIONS)?)
            .and(&frame.column(TOTAL_NAVIGATIONS_FAV1)?)
            .and(&frame.column(N_DAYS_AFTER_ONBOARDING)?)
            .and(&frame.column(DRIVES)?)
            .map_collect(|&s, &fav1, &days, &drives| {
                thresholds
                    .engagement_level(s, fav1, days, drives)
                    .as_feature()
            });
        let day = Zip::from(&frame.column(ACTIVITY_DAYS)?)
            .and(&frame.column(DRIVING_DAYS)?)
            .map_collect(|&activity, &driving| thresholds.day_level(activity, driving).as_feature());

        let mut activity_ratio = ratio(frame.column(DRIVING_DAYS)?, frame.column(ACTIVITY_DAYS)?);
        let mut avg_distance = ratio(frame.column(DRIVEN_KM_DRIVES)?, frame.column(DRIVES)?);
        let mut engagement_ratio = ratio(frame.column(TOTAL_SESSIONS)?, frame.column(DRIVING_DAYS)?);
        let mut avg_navigations = Zip::from(&frame.column(TOTAL_NAVIGATIONS_FAV1)?)
            .and(&frame.column(TOTAL_NAVIGATIONS_FAV2)?)
            .map_collect(|&a, &b| (a + b) / 2.0);
        for col in [
            &mut activity_ratio,
            &mut avg_distance,
            &mut engagement_ratio,
            &mut avg_navigations,
        ] {
            fill_with_median(col);
        }

        frame.push_column(ENGAGEMENT_LEVEL, engagement)?;
        frame.push_column(DAY_LEVEL, day)?;
        frame.push_column(ACTIVITY_RATIO, activity_ratio)?;
        frame.push_column(AVG_DISTANCE_PER_DRIVE, avg_distance)?;
        frame.push_column(ENGAGEMENT_RATIO, engagement_ratio)?;
        frame.push_column(AVG_NAVIGATIONS_FAV, avg_navigations)?;

        tracing::debug!(
            rows = frame.n_rows(),
            median_sessions = thresholds.sessions,
            median_drives = thresholds.drives,
            "engineered batch"
        );
        Ok(EngineeredBatch { frame, thresholds })
    }
}

/// Elementwise `num / den`; a zero or missing denominator yields NaN.
fn ratio(num: ArrayView1<f64>, den: ArrayView1<f64>) -> Array1<f64> {
    Zip::from(&num)
        .and(&den)
        .map_collect(|&n, &d| if d == 0.0 || d.is_nan() { f64::NAN } else { n / d })
}
