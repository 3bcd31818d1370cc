use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

use super::customer::CustomerType;

/// Slope magnitude above which a series counts as trending.
pub const TREND_SLOPE_THRESHOLD: f64 = 0.1;

/// Direction of demand over the recent history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DemandTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl DemandTrend {
    pub fn from_slope(slope: f64) -> Self {
        if slope > TREND_SLOPE_THRESHOLD {
            DemandTrend::Increasing
        } else if slope < -TREND_SLOPE_THRESHOLD {
            DemandTrend::Decreasing
        } else {
            DemandTrend::Stable
        }
    }
}

/// One day of a single-crop forecast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub date: NaiveDate,
    pub predicted_demand: f64,
    /// In [0, 1]
    pub confidence: f64,
    pub price_estimate: f64,
}

/// Relative weight of each signal family reported with a forecast.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub seasonal: f64,
    pub trend: f64,
    pub market: f64,
    pub weather: f64,
}

impl FactorWeights {
    pub const STANDARD: FactorWeights = FactorWeights {
        seasonal: 0.35,
        trend: 0.25,
        market: 0.25,
        weather: 0.15,
    };

    pub fn total(&self) -> f64 {
        self.seasonal + self.trend + self.market + self.weather
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Output of the single-crop pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub crop: String,
    pub predictions: Vec<Prediction>,
    pub accuracy: f64,
    pub model_type: String,
    pub factors: FactorWeights,
}

/// Projected demand for one variety over the forecast horizon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    pub variety: String,
    pub predicted_demand: f64,
    pub confidence: f64,
    pub trend: DemandTrend,
    pub seasonal_factor: f64,
    pub recommendations: Vec<String>,
}

/// Ordering behaviour of one customer type. Descriptive only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerSegment {
    pub customer_type: CustomerType,
    pub average_order_size: Decimal,
    pub order_frequency: u32,
    pub variety_preferences: BTreeMap<String, u64>,
    /// Orders placed per calendar month, January first.
    pub seasonal_patterns: [f64; 12],
}

/// Months (1-based) bracketing the strongest part of a crop's season.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestWindow {
    pub start_month: u32,
    pub peak_month: u32,
    pub end_month: u32,
}

/// Canned advisory text for a crop. Not produced by the numeric engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketInsights {
    pub crop: String,
    pub insights: Vec<String>,
    pub harvest_window: HarvestWindow,
    pub recommendations: Vec<String>,
}

/// Ranked variety forecasts together with the customer segments they were
/// computed alongside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandForecastReport {
    pub forecasts: Vec<DemandForecast>,
    pub segments: Vec<CustomerSegment>,
    /// True when the forecasts are the fixed fallback list.
    pub degraded: bool,
    pub generated_at: DateTime<Utc>,
}
