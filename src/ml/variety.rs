use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::errors::ServiceError;
use crate::ml::numerics;
use crate::ml::tables::ForecastTables;
use crate::models::{DemandForecast, DemandTrend};

pub const LOW_CONFIDENCE_ADVICE: &str = "Low confidence — collect more historical data";
pub const STRONG_GROWTH_ADVICE: &str = "Strong upward trend — consider increasing production";
pub const DECLINE_ADVICE: &str = "Declining demand — review market position";
pub const SATURATION_ADVICE: &str = "Market approaching saturation — focus on differentiation";
pub const HIGH_DEMAND_ADVICE: &str = "High demand expected — ensure adequate production capacity";
pub const LOW_DEMAND_ADVICE: &str = "Low demand predicted — consider promotional activities";

const LOW_CONFIDENCE: f64 = 0.6;
const STRONG_SLOPE: f64 = 0.2;
const SATURATION_LIMIT: f64 = 0.8;
const HIGH_DEMAND: f64 = 100.0;
const LOW_DEMAND: f64 = 20.0;

/// Tunables of the per-variety projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarietyForecastSettings {
    /// Exponential smoothing factor, in (0, 1].
    pub alpha: f64,
    /// Number of trailing smoothed points the trend is fitted on.
    pub trend_window: usize,
    /// Varieties with fewer weekly points are not forecast.
    pub min_history_points: usize,
}

impl Default for VarietyForecastSettings {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            trend_window: 4,
            min_history_points: 3,
        }
    }
}

/// Projects one variety's demand from its weekly history.
#[derive(Debug, Clone)]
pub struct VarietyForecaster {
    tables: Arc<ForecastTables>,
    settings: VarietyForecastSettings,
}

impl VarietyForecaster {
    pub fn new(tables: Arc<ForecastTables>) -> Self {
        Self::with_settings(tables, VarietyForecastSettings::default())
    }

    pub fn with_settings(tables: Arc<ForecastTables>, settings: VarietyForecastSettings) -> Self {
        Self { tables, settings }
    }

    pub fn settings(&self) -> &VarietyForecastSettings {
        &self.settings
    }

    /// Forecast for `variety` over `horizon_days`, seasonally adjusted for the
    /// month of `as_of`.
    ///
    /// Callers are expected to pass at least `min_history_points` values; shorter
    /// series still produce a forecast, with the unmeasured confidence.
    pub fn forecast(
        &self,
        variety: &str,
        series: &[f64],
        horizon_days: u32,
        as_of: NaiveDate,
    ) -> DemandForecast {
        let smoothed = numerics::exponential_smoothing(series, self.settings.alpha);
        let slope = numerics::trailing_slope(&smoothed, self.settings.trend_window);

        let seasonal_factor = self
            .tables
            .known_seasonal_factor(variety, as_of.month0() as usize)
            .unwrap_or(1.0);
        let market_trend = self.tables.market_trend(variety);
        let growth_factor = market_trend.map_or(1.0, |t| t.monthly_growth_factor());

        let base = smoothed.last().copied().unwrap_or(0.0);
        let horizon_weeks = f64::from(horizon_days) / 7.0;
        let predicted_demand = (base * seasonal_factor * growth_factor + slope * horizon_weeks).max(0.0);

        let confidence = numerics::dispersion_confidence(series);
        let saturated = market_trend.is_some_and(|t| t.market_saturation > SATURATION_LIMIT);

        DemandForecast {
            variety: variety.to_string(),
            predicted_demand,
            confidence,
            trend: DemandTrend::from_slope(slope),
            seasonal_factor,
            recommendations: recommendations(confidence, slope, saturated, predicted_demand),
        }
    }

    /// Forecasts every variety with enough history, highest demand first.
    pub fn forecast_all(
        &self,
        history: &BTreeMap<String, Vec<f64>>,
        horizon_days: u32,
        as_of: NaiveDate,
    ) -> Result<Vec<DemandForecast>, ServiceError> {
        let mut forecasts = Vec::with_capacity(history.len());
        for (variety, series) in history {
            if series.len() < self.settings.min_history_points {
                debug!(
                    variety = %variety,
                    points = series.len(),
                    "Skipping variety with insufficient history"
                );
                continue;
            }
            if series.iter().any(|v| !v.is_finite()) {
                return Err(ServiceError::InvalidInput(format!(
                    "Demand history for {} contains non-finite values",
                    variety
                )));
            }
            forecasts.push(self.forecast(variety, series, horizon_days, as_of));
        }

        forecasts.sort_by(|a, b| {
            b.predicted_demand
                .partial_cmp(&a.predicted_demand)
                .unwrap_or(Ordering::Equal)
        });
        Ok(forecasts)
    }
}

fn recommendations(confidence: f64, slope: f64, saturated: bool, predicted_demand: f64) -> Vec<String> {
    let rules = [
        (confidence < LOW_CONFIDENCE, LOW_CONFIDENCE_ADVICE),
        (slope > STRONG_SLOPE, STRONG_GROWTH_ADVICE),
        (slope < -STRONG_SLOPE, DECLINE_ADVICE),
        (saturated, SATURATION_ADVICE),
        (predicted_demand > HIGH_DEMAND, HIGH_DEMAND_ADVICE),
        (predicted_demand < LOW_DEMAND, LOW_DEMAND_ADVICE),
    ];
    rules
        .into_iter()
        .filter(|(fires, _)| *fires)
        .map(|(_, advice)| advice.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::tables::MarketTrend;
    use assert_matches::assert_matches;

    fn forecaster() -> VarietyForecaster {
        VarietyForecaster::new(ForecastTables::shared())
    }

    fn march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    #[test]
    fn arugula_history_trends_upward() {
        let series = [45.0, 52.0, 48.0, 55.0, 60.0, 58.0, 62.0];
        let forecast = forecaster().forecast("Arugula", &series, 3, march());

        assert_ne!(forecast.trend, DemandTrend::Decreasing);
        assert_eq!(forecast.trend, DemandTrend::Increasing);
        assert_eq!(forecast.seasonal_factor, 1.2);
        assert!(forecast.predicted_demand > 0.0);
        assert!((0.1..=0.95).contains(&forecast.confidence));
        assert!(forecast
            .recommendations
            .contains(&STRONG_GROWTH_ADVICE.to_string()));
    }

    #[test]
    fn projection_matches_formula() {
        let series = [45.0, 52.0, 48.0, 55.0, 60.0, 58.0, 62.0];
        let forecast = forecaster().forecast("Arugula", &series, 14, march());

        let smoothed = numerics::exponential_smoothing(&series, 0.3);
        let slope = numerics::trailing_slope(&smoothed, 4);
        let expected = smoothed[6] * 1.2 * (1.0 + 0.15 / 12.0) + slope * 2.0;
        assert!((forecast.predicted_demand - expected).abs() < 1e-9);
    }

    #[test]
    fn unknown_variety_is_seasonally_neutral() {
        let forecast = forecaster().forecast("Purslane", &[30.0, 30.0, 30.0, 30.0], 7, march());
        assert_eq!(forecast.seasonal_factor, 1.0);
        assert_eq!(forecast.trend, DemandTrend::Stable);
        assert!((forecast.predicted_demand - 30.0).abs() < 1e-9);
        assert_eq!(forecast.confidence, 0.95);
        assert!(forecast.recommendations.is_empty());
    }

    #[test]
    fn declining_series_is_flagged() {
        let series = [90.0, 80.0, 70.0, 60.0, 50.0, 40.0];
        let forecast = forecaster().forecast("Purslane", &series, 7, march());
        assert_eq!(forecast.trend, DemandTrend::Decreasing);
        assert!(forecast.recommendations.contains(&DECLINE_ADVICE.to_string()));
    }

    #[test]
    fn demand_never_negative() {
        let series = [40.0, 20.0, 5.0, 1.0, 0.0];
        let forecast = forecaster().forecast("Purslane", &series, 365, march());
        assert_eq!(forecast.predicted_demand, 0.0);
        assert!(forecast.recommendations.contains(&LOW_DEMAND_ADVICE.to_string()));
    }

    #[test]
    fn saturated_market_recommendation_in_rule_order() {
        let tables = ForecastTables::builtin().with_market_trend(MarketTrend {
            variety: "Purslane".to_string(),
            growth_rate: 0.0,
            seasonality: [1.0; 12],
            market_saturation: 0.95,
        });
        let forecaster = VarietyForecaster::new(Arc::new(tables));
        let forecast = forecaster.forecast("Purslane", &[150.0, 150.0, 150.0], 7, march());
        assert_eq!(
            forecast.recommendations,
            vec![SATURATION_ADVICE.to_string(), HIGH_DEMAND_ADVICE.to_string()]
        );
    }

    #[test]
    fn volatile_history_gets_low_confidence_advice() {
        let series = [100.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 100.0];
        let forecast = forecaster().forecast("Purslane", &series, 7, march());
        assert_eq!(forecast.recommendations.first().map(String::as_str), Some(LOW_CONFIDENCE_ADVICE));
    }

    #[test]
    fn forecast_all_skips_short_series_and_ranks() {
        let mut history = BTreeMap::new();
        history.insert("Arugula".to_string(), vec![45.0, 52.0, 48.0, 55.0]);
        history.insert("Basil".to_string(), vec![10.0, 12.0]);
        history.insert("Lettuce".to_string(), vec![120.0, 118.0, 121.0, 125.0]);
        history.insert("Kale".to_string(), vec![5.0, 6.0, 5.0]);

        let forecasts = forecaster().forecast_all(&history, 7, march()).unwrap();
        let varieties: Vec<_> = forecasts.iter().map(|f| f.variety.as_str()).collect();
        assert_eq!(varieties, vec!["Lettuce", "Arugula", "Kale"]);
        assert!(forecasts
            .windows(2)
            .all(|w| w[0].predicted_demand >= w[1].predicted_demand));
    }

    #[test]
    fn forecast_all_rejects_non_finite_history() {
        let mut history = BTreeMap::new();
        history.insert("Purslane".to_string(), vec![1.0, f64::INFINITY, 1.0]);
        let result = forecaster().forecast_all(&history, 7, march());
        assert_matches!(result, Err(ServiceError::InvalidInput(_)));
    }
}
