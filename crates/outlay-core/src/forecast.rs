//! Liquidity forecast
//!
//! Fits a least-squares line through the monthly outflow series and extends
//! it `horizon` months. Each point carries an uncertainty band that widens
//! linearly with distance from the first month; the risk factor narrows it
//! (100 = aggressive, tight band) or widens it (0 = conservative).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::monthly::{MonthlySeries, MONTH_ABBREVIATIONS};
use crate::error::{Error, Result};

/// Longest projection, in months
pub const MAX_HORIZON: usize = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub label: String,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    /// False for observed months, true for extrapolated ones
    pub projected: bool,
}

/// Chart axis ticks sized to the largest point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub max: f64,
    pub step_high: f64,
    pub step_low: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub slope: f64,
    pub intercept: f64,
    /// Band growth per point, before halving
    pub spread: f64,
    pub axis: AxisScale,
}

impl Forecast {
    pub fn projected(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| p.projected)
    }
}

/// Least-squares `(slope, intercept)` over `values` indexed from 0
pub fn linear_fit(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some((0.0, values[0]));
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;
    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, &y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });

    let slope = num / den;
    Some((slope, y_mean - slope * x_mean))
}

/// Band spread for a risk factor in `0..=100`
pub fn band_spread(risk_factor: u8) -> f64 {
    20.0 + (100.0 - risk_factor.min(100) as f64) * 1.5
}

/// Round the axis up to the next thousand above 120% of `peak`
pub fn axis_scale(peak: f64) -> AxisScale {
    let max = ((peak.max(0.0) * 1.2) / 1000.0).ceil().max(1.0) * 1000.0;
    AxisScale {
        max,
        step_high: (max * 2.0 / 3.0).floor(),
        step_low: (max / 2.0).floor(),
    }
}

fn projected_label(last: Option<&str>, ahead: usize) -> String {
    match last.and_then(|l| MONTH_ABBREVIATIONS.iter().position(|m| *m == l)) {
        Some(idx) => MONTH_ABBREVIATIONS[(idx + ahead) % 12].to_string(),
        None => format!("+{}", ahead),
    }
}

/// Forecast `horizon` months beyond `series`
pub fn forecast(series: &MonthlySeries, horizon: usize, risk_factor: u8) -> Result<Forecast> {
    if risk_factor > 100 {
        return Err(Error::Configuration(format!(
            "risk factor must be between 0 and 100, got {}",
            risk_factor
        )));
    }
    if horizon > MAX_HORIZON {
        return Err(Error::Configuration(format!(
            "forecast horizon must be at most {} months, got {}",
            MAX_HORIZON, horizon
        )));
    }
    let (slope, intercept) = linear_fit(&series.outflow)
        .ok_or_else(|| Error::InvalidData("cannot forecast an empty series".into()))?;

    let spread = band_spread(risk_factor);
    let point = |index: usize, label: String, value: f64, projected: bool| {
        let half = index as f64 * spread * 0.5;
        ForecastPoint {
            label,
            value,
            lower: (value - half).max(0.0),
            upper: value + half,
            projected,
        }
    };

    let observed = series.outflow.len();
    let mut points: Vec<ForecastPoint> = series
        .labels
        .iter()
        .zip(&series.outflow)
        .enumerate()
        .map(|(i, (label, &value))| point(i, label.clone(), value, false))
        .collect();

    let last_label = series.labels.last().map(String::as_str);
    for ahead in 1..=horizon {
        let index = observed - 1 + ahead;
        let value = (intercept + slope * index as f64).max(0.0);
        points.push(point(index, projected_label(last_label, ahead), value, true));
    }

    let peak = points.iter().map(|p| p.value).fold(0.0, f64::max);
    debug!(slope, intercept, horizon, "Computed forecast");

    Ok(Forecast {
        points,
        slope,
        intercept,
        spread,
        axis: axis_scale(peak),
    })
}
