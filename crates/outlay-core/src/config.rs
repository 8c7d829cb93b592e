//! Engine configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the user override (~/.config/outlay/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Every key is optional; missing keys keep the value from
//! [`EngineConfig::default`]. The merged result is validated before it is
//! returned, so a bad budget limit fails at load time instead of on first use.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::aggregate::budget::BudgetPeriod;
use crate::aggregate::flow::DEFAULT_NEEDS;
use crate::aggregate::monthly::{MonthWindow, DEFAULT_INFLOW_MULTIPLIER};
use crate::error::{Error, Result};
use crate::forecast::MAX_HORIZON;
use crate::models::DEFAULT_CATEGORY;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/outlay.toml");

/// How the inflow/outflow trend picks its months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TrendWindow {
    /// Always `Jan..Jun`, whatever the year or reference date
    FixedFirstHalf,
    /// The last `months` calendar months ending at the reference date
    Rolling { months: u32 },
}

impl TrendWindow {
    /// Resolve against a reference date
    pub fn at(&self, reference: NaiveDate) -> MonthWindow {
        match *self {
            TrendWindow::FixedFirstHalf => MonthWindow::FixedFirstHalf,
            TrendWindow::Rolling { months } => MonthWindow::Rolling {
                months,
                ending: reference,
            },
        }
    }
}

/// A statement classifier rule: descriptions matching `pattern` get `category`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierRule {
    pub pattern: String,
    pub category: String,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    pub budget_limit: f64,
    pub budget_period: BudgetPeriod,
    pub trend_window: TrendWindow,
    pub inflow_multiplier: f64,
    pub default_category: String,
    pub needs_categories: Vec<String>,
    /// Income for the money-flow split; `None` uses the budget limit
    pub income: Option<f64>,
    pub forecast_horizon: usize,
    pub risk_factor: u8,
    pub rules: Vec<ClassifierRule>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget_limit: 5000.0,
            budget_period: BudgetPeriod::Lifetime,
            trend_window: TrendWindow::Rolling { months: 6 },
            inflow_multiplier: DEFAULT_INFLOW_MULTIPLIER,
            default_category: DEFAULT_CATEGORY.to_string(),
            needs_categories: DEFAULT_NEEDS.iter().map(|s| s.to_string()).collect(),
            income: None,
            forecast_horizon: 3,
            risk_factor: 50,
            rules: Vec::new(),
        }
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path passed explicitly by the caller
    Explicit(PathBuf),
    /// User override in the platform config directory
    User(PathBuf),
    /// Compiled-in defaults
    Embedded,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(p) => write!(f, "{}", p.display()),
            ConfigSource::User(p) => write!(f, "{} (user)", p.display()),
            ConfigSource::Embedded => write!(f, "built-in defaults"),
        }
    }
}

impl EngineConfig {
    /// Load configuration (explicit path, then user override, then embedded)
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let (content, source) = match explicit {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::InvalidData(format!(
                        "Failed to read config {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                (content, ConfigSource::Explicit(path.to_path_buf()))
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    let content = fs::read_to_string(&path).map_err(|e| {
                        Error::InvalidData(format!("Failed to read config: {}", e))
                    })?;
                    (content, ConfigSource::User(path))
                }
                None => (DEFAULT_CONFIG.to_string(), ConfigSource::Embedded),
            },
        };

        tracing::debug!("Loading engine config from {}", source);
        Ok((parse_config(&content)?, source))
    }

    /// The embedded defaults, parsed
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// Income used for the money-flow split
    pub fn effective_income(&self) -> f64 {
        self.income.unwrap_or(self.budget_limit)
    }

    /// Reject values the engine would have to fail on later
    pub fn validate(&self) -> Result<()> {
        if !self.budget_limit.is_finite() || self.budget_limit <= 0.0 {
            return Err(Error::Configuration(format!(
                "budget limit must be positive, got {}",
                self.budget_limit
            )));
        }
        if let TrendWindow::Rolling { months } = self.trend_window {
            if months == 0 {
                return Err(Error::Configuration(
                    "trend window must cover at least one month".into(),
                ));
            }
        }
        if !self.inflow_multiplier.is_finite() || self.inflow_multiplier < 0.0 {
            return Err(Error::Configuration(format!(
                "inflow multiplier must be non-negative, got {}",
                self.inflow_multiplier
            )));
        }
        if let Some(income) = self.income {
            if !income.is_finite() || income <= 0.0 {
                return Err(Error::Configuration(format!(
                    "income must be positive, got {}",
                    income
                )));
            }
        }
        if self.forecast_horizon > MAX_HORIZON {
            return Err(Error::Configuration(format!(
                "forecast horizon must be at most {} months, got {}",
                MAX_HORIZON, self.forecast_horizon
            )));
        }
        if self.risk_factor > 100 {
            return Err(Error::Configuration(format!(
                "risk factor must be between 0 and 100, got {}",
                self.risk_factor
            )));
        }
        if self.default_category.trim().is_empty() {
            return Err(Error::Configuration(
                "default category must not be blank".into(),
            ));
        }
        for rule in &self.rules {
            Regex::new(&rule.pattern)?;
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("outlay").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    budget: Option<RawBudget>,
    trend: Option<RawTrend>,
    categories: Option<RawCategories>,
    flow: Option<RawFlow>,
    forecast: Option<RawForecast>,
    rules: Option<Vec<ClassifierRule>>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    limit: Option<f64>,
    period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTrend {
    window: Option<String>,
    months: Option<u32>,
    inflow_multiplier: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCategories {
    default: Option<String>,
    needs: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawFlow {
    income: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    horizon: Option<usize>,
    risk_factor: Option<u8>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut config = EngineConfig::default();

    if let Some(budget) = raw.budget {
        if let Some(limit) = budget.limit {
            config.budget_limit = limit;
        }
        if let Some(period) = budget.period {
            config.budget_period = period.parse().map_err(Error::Configuration)?;
        }
    }

    if let Some(trend) = raw.trend {
        let months = match (trend.months, config.trend_window) {
            (Some(m), _) => m,
            (None, TrendWindow::Rolling { months }) => months,
            (None, TrendWindow::FixedFirstHalf) => 6,
        };
        match trend.window.as_deref() {
            Some("fixed") => config.trend_window = TrendWindow::FixedFirstHalf,
            Some("rolling") | None => config.trend_window = TrendWindow::Rolling { months },
            Some(other) => {
                return Err(Error::Configuration(format!(
                    "Unknown trend window: {} (valid: fixed, rolling)",
                    other
                )))
            }
        }
        if let Some(multiplier) = trend.inflow_multiplier {
            config.inflow_multiplier = multiplier;
        }
    }

    if let Some(categories) = raw.categories {
        if let Some(default) = categories.default {
            config.default_category = default;
        }
        if let Some(needs) = categories.needs {
            config.needs_categories = needs;
        }
    }

    if let Some(flow) = raw.flow {
        config.income = flow.income;
    }

    if let Some(forecast) = raw.forecast {
        if let Some(horizon) = forecast.horizon {
            config.forecast_horizon = horizon;
        }
        if let Some(risk) = forecast.risk_factor {
            config.risk_factor = risk;
        }
    }

    if let Some(rules) = raw.rules {
        config.rules = rules;
    }

    config.validate()?;
    Ok(config)
}
