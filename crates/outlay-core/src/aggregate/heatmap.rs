//! Spending-intensity heatmap: 35 day buckets ending at a reference date

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{dated_amount_for, Transaction};

/// Number of day buckets (5 weeks)
pub const HEATMAP_DAYS: usize = 35;

pub const DAYS_PER_WEEK: usize = 7;

/// Spend covered by one severity level
pub const LEVEL_STEP: f64 = 10.0;

pub const MAX_LEVEL: u8 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    /// Display label, e.g. "Jan 5"
    pub label: String,
    pub total: f64,
    /// 0..=4
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyHeatmap {
    /// Oldest first; the last entry is the reference date unless the window
    /// was clamped at the start of the calendar
    pub days: Vec<HeatmapDay>,
}

impl DailyHeatmap {
    /// The days grouped into weeks of seven, oldest week first
    pub fn weeks(&self) -> Vec<&[HeatmapDay]> {
        self.days.chunks(DAYS_PER_WEEK).collect()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&HeatmapDay> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn total(&self) -> f64 {
        self.days.iter().map(|d| d.total).sum()
    }
}

/// Severity level for a day's spend: $10 per level, capped at 4
pub fn severity_level(total: f64) -> u8 {
    let level = (total / LEVEL_STEP).floor();
    if level <= 0.0 {
        0
    } else if level >= MAX_LEVEL as f64 {
        MAX_LEVEL
    } else {
        level as u8
    }
}

/// Bucket spend into the 35 days ending at `reference`, inclusive.
///
/// Near the start of the calendar the window is clamped to begin at
/// [`NaiveDate::MIN`], so it still holds 35 days.
pub fn compute_daily_heatmap(transactions: &[Transaction], reference: NaiveDate) -> DailyHeatmap {
    let start = reference
        .checked_sub_signed(Duration::days(HEATMAP_DAYS as i64 - 1))
        .unwrap_or(NaiveDate::MIN);
    let mut totals = [0.0_f64; HEATMAP_DAYS];

    for tx in transactions {
        let Some((date, amount)) = dated_amount_for(tx, "heatmap") else {
            continue;
        };
        let offset = (date - start).num_days();
        if (0..HEATMAP_DAYS as i64).contains(&offset) {
            totals[offset as usize] += amount;
        }
    }

    let days: Vec<HeatmapDay> = totals
        .iter()
        .enumerate()
        .map(|(i, &total)| {
            let date = start
                .checked_add_signed(Duration::days(i as i64))
                .unwrap_or(NaiveDate::MAX);
            HeatmapDay {
                date,
                label: date.format("%b %-d").to_string(),
                total,
                level: severity_level(total),
            }
        })
        .collect();

    debug!(
        from = %start,
        to = %reference,
        active_days = days.iter().filter(|d| d.total > 0.0).count(),
        "Computed daily heatmap"
    );

    DailyHeatmap { days }
}
