use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ml::noise::NoiseSource;
use crate::ml::tables::{season_month, ForecastTables};
use crate::models::Prediction;

/// Per-index growth applied by the trend-weighted estimate.
const TREND_STEP: f64 = 0.005;
/// Market momentum is drawn from `[MOMENTUM_LOW, MOMENTUM_LOW + MOMENTUM_SPREAD)`.
const MOMENTUM_LOW: f64 = 0.95;
const MOMENTUM_SPREAD: f64 = 0.1;
const CONFIDENCE_BOOST: f64 = 0.1;

/// Weights of the four partial estimates blended by the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights {
    pub trend: f64,
    pub seasonal: f64,
    pub market: f64,
    pub historical: f64,
}

impl EnsembleWeights {
    pub const STANDARD: EnsembleWeights = EnsembleWeights {
        trend: 0.4,
        seasonal: 0.3,
        market: 0.2,
        historical: 0.1,
    };

    pub fn total(&self) -> f64 {
        self.trend + self.seasonal + self.market + self.historical
    }
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Blends trend, seasonal, market and historical estimates of each day.
#[derive(Debug, Clone)]
pub struct EnsembleCombiner {
    tables: Arc<ForecastTables>,
    weights: EnsembleWeights,
}

impl EnsembleCombiner {
    pub fn new(tables: Arc<ForecastTables>) -> Self {
        Self {
            tables,
            weights: EnsembleWeights::STANDARD,
        }
    }

    pub fn weights(&self) -> &EnsembleWeights {
        &self.weights
    }

    /// Index-preserving: the output has one prediction per input, same dates.
    pub fn combine(
        &self,
        predictions: &[Prediction],
        crop: &str,
        noise: &mut dyn NoiseSource,
    ) -> Vec<Prediction> {
        let historical = self.tables.historical_average(crop);

        predictions
            .iter()
            .enumerate()
            .map(|(index, base)| {
                let demand = base.predicted_demand;
                let trend_estimate = demand * (1.0 + index as f64 * TREND_STEP);
                let seasonal_estimate =
                    demand * self.tables.seasonal_factor(crop, season_month(base.date));
                let momentum = MOMENTUM_LOW + noise.sample(0.0, MOMENTUM_SPREAD);
                let market_estimate = demand * momentum;

                let blended = trend_estimate * self.weights.trend
                    + seasonal_estimate * self.weights.seasonal
                    + market_estimate * self.weights.market
                    + historical * self.weights.historical;

                Prediction {
                    date: base.date,
                    predicted_demand: blended.max(0.0),
                    confidence: (base.confidence + CONFIDENCE_BOOST).min(1.0),
                    price_estimate: base.price_estimate,
                }
            })
            .collect()
    }
}
