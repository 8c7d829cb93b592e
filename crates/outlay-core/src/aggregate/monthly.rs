//! Monthly inflow/outflow series
//!
//! Two windows are supported. `FixedFirstHalf` always reports `Jan..Jun` and
//! matches on the month alone, so spend from any year lands in the same slot.
//! `Rolling` reports the last N calendar months ending at a reference date and
//! matches on year and month.
//!
//! There is no income data behind the inflow line; it is produced by an
//! [`InflowEstimator`] so a real income source can replace the fixed
//! multiplier without touching the outflow side.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{dated_amount_for, Transaction};

/// Labels of the fixed compatibility window
pub const FIRST_HALF_LABELS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

/// English short month names, January first
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const DEFAULT_INFLOW_MULTIPLIER: f64 = 1.6;

/// Source of the inflow figure for a month
pub trait InflowEstimator {
    fn estimate_inflow(&self, outflow: f64) -> f64;
}

/// Inflow as a fixed multiple of outflow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMultiplier(pub f64);

impl Default for FixedMultiplier {
    fn default() -> Self {
        Self(DEFAULT_INFLOW_MULTIPLIER)
    }
}

impl InflowEstimator for FixedMultiplier {
    fn estimate_inflow(&self, outflow: f64) -> f64 {
        outflow * self.0
    }
}

/// Placeholder inflow: `outflow × 1.6`
pub fn estimate_inflow(outflow: f64) -> f64 {
    FixedMultiplier::default().estimate_inflow(outflow)
}

/// Which months the series covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthWindow {
    FixedFirstHalf,
    Rolling { months: u32, ending: NaiveDate },
}

/// Per-month outflow (whole currency units) and estimated inflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    pub labels: Vec<String>,
    pub outflow: Vec<f64>,
    pub inflow: Vec<f64>,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total_outflow(&self) -> f64 {
        self.outflow.iter().sum()
    }
}

/// A month slot; `year` is `None` when any year matches
#[derive(Debug, Clone, Copy)]
struct MonthSlot {
    year: Option<i32>,
    month: u32,
}

impl MonthSlot {
    fn matches(&self, date: NaiveDate) -> bool {
        date.month() == self.month && self.year.map_or(true, |y| y == date.year())
    }

    fn label(&self) -> String {
        MONTH_ABBREVIATIONS[(self.month - 1) as usize].to_string()
    }
}

fn first_half_slots() -> Vec<MonthSlot> {
    (1..=6).map(|month| MonthSlot { year: None, month }).collect()
}

fn rolling_slots(months: u32, ending: NaiveDate) -> Result<Vec<MonthSlot>> {
    if months == 0 {
        return Err(Error::Configuration(
            "trend window must cover at least one month".into(),
        ));
    }
    let last = ending.with_day(1).unwrap_or(ending);

    (0..months)
        .rev()
        .map(|back| {
            last.checked_sub_months(Months::new(back))
                .map(|d| MonthSlot {
                    year: Some(d.year()),
                    month: d.month(),
                })
                .ok_or_else(|| {
                    Error::Configuration(format!(
                        "{} months before {} is out of range",
                        back, ending
                    ))
                })
        })
        .collect()
}

/// Outflow for `Jan..Jun` with the placeholder inflow estimate
pub fn compute_monthly_series(transactions: &[Transaction]) -> MonthlySeries {
    accumulate(
        transactions,
        &first_half_slots(),
        &FixedMultiplier::default(),
    )
}

/// Outflow for an arbitrary window with a caller-supplied inflow estimator
pub fn compute_monthly_series_with(
    transactions: &[Transaction],
    window: MonthWindow,
    estimator: &dyn InflowEstimator,
) -> Result<MonthlySeries> {
    let slots = match window {
        MonthWindow::FixedFirstHalf => first_half_slots(),
        MonthWindow::Rolling { months, ending } => rolling_slots(months, ending)?,
    };
    Ok(accumulate(transactions, &slots, estimator))
}

fn accumulate(
    transactions: &[Transaction],
    slots: &[MonthSlot],
    estimator: &dyn InflowEstimator,
) -> MonthlySeries {
    let mut sums = vec![0.0_f64; slots.len()];
    let mut excluded = 0usize;

    for tx in transactions {
        let Some((date, amount)) = dated_amount_for(tx, "monthly") else {
            continue;
        };
        match slots.iter().position(|slot| slot.matches(date)) {
            Some(i) => sums[i] += amount,
            None => excluded += 1,
        }
    }

    let outflow: Vec<f64> = sums.iter().map(|s| s.round()).collect();
    let inflow = outflow.iter().map(|&o| estimator.estimate_inflow(o)).collect();
    debug!(
        months = slots.len(),
        excluded, "Computed monthly series"
    );

    MonthlySeries {
        labels: slots.iter().map(MonthSlot::label).collect(),
        outflow,
        inflow,
    }
}
