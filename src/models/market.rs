use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::forecast::DemandTrend;

/// Weather index assumed when the caller supplies none.
pub const DEFAULT_WEATHER_INDEX: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompetitorActivity {
    Low,
    Moderate,
    High,
}

/// Partial market snapshot supplied by the caller.
///
/// Only `weather_index`, `demand_trend` and `competitor_activity` influence the
/// forecast; the remaining fields are accepted so callers can pass whatever
/// market record they already hold.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub crop: Option<String>,
    #[serde(default)]
    pub demand: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub seasonality: Option<f64>,
    #[serde(default)]
    pub weather_index: Option<f64>,
    #[serde(default)]
    pub demand_trend: Option<DemandTrend>,
    #[serde(default)]
    pub competitor_activity: Option<CompetitorActivity>,
}

impl MarketData {
    /// Weather index, or the default when missing or not a usable number.
    pub fn weather_factor(&self) -> f64 {
        self.weather_index
            .filter(|w| w.is_finite() && *w >= 0.0)
            .unwrap_or(DEFAULT_WEATHER_INDEX)
    }

    pub fn conditions(&self) -> MarketConditions {
        MarketConditions {
            demand_trend: self.demand_trend,
            competitor_activity: self.competitor_activity,
        }
    }
}

/// External market signals applied after the ensemble has been smoothed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConditions {
    pub demand_trend: Option<DemandTrend>,
    pub competitor_activity: Option<CompetitorActivity>,
}
