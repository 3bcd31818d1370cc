use crate::models::{CompetitorActivity, DemandTrend, MarketConditions, Prediction};

const RISING_DEMAND: f64 = 1.15;
const FALLING_DEMAND: f64 = 0.85;
const WEAK_COMPETITION: f64 = 1.1;
const STRONG_COMPETITION: f64 = 0.9;
const PRICE_NUDGE_UP: f64 = 1.1;
const PRICE_NUDGE_DOWN: f64 = 0.9;

/// Applies external market conditions to an already-smoothed forecast.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketAdjuster;

impl MarketAdjuster {
    /// Scalar demand multiplier implied by `conditions`.
    pub fn multiplier(conditions: &MarketConditions) -> f64 {
        let mut multiplier = 1.0;
        match conditions.demand_trend {
            Some(DemandTrend::Increasing) => multiplier *= RISING_DEMAND,
            Some(DemandTrend::Decreasing) => multiplier *= FALLING_DEMAND,
            Some(DemandTrend::Stable) | None => {}
        }
        match conditions.competitor_activity {
            Some(CompetitorActivity::Low) => multiplier *= WEAK_COMPETITION,
            Some(CompetitorActivity::High) => multiplier *= STRONG_COMPETITION,
            Some(CompetitorActivity::Moderate) | None => {}
        }
        multiplier
    }

    /// Scales demand by the condition multiplier. Prices move up 10% when the
    /// multiplier exceeds 1 and down 10% otherwise, including the neutral case.
    pub fn adjust(&self, predictions: &[Prediction], conditions: &MarketConditions) -> Vec<Prediction> {
        let multiplier = Self::multiplier(conditions);
        let price_nudge = if multiplier > 1.0 {
            PRICE_NUDGE_UP
        } else {
            PRICE_NUDGE_DOWN
        };

        predictions
            .iter()
            .map(|p| Prediction {
                predicted_demand: p.predicted_demand * multiplier,
                price_estimate: p.price_estimate * price_nudge,
                ..p.clone()
            })
            .collect()
    }
}
