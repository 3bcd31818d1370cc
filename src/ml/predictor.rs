use chrono::NaiveDate;
use std::sync::Arc;

use crate::ml::noise::NoiseSource;
use crate::ml::numerics::round_to;
use crate::ml::tables::{season_month, ForecastTables};
use crate::models::{MarketData, Prediction};

const BASE_DEMAND: f64 = 50.0;
const SEASONAL_WEIGHT: f64 = 30.0;
const TREND_WEIGHT: f64 = 20.0;
const WEATHER_WEIGHT: f64 = 10.0;
const WEATHER_NEUTRAL: f64 = 0.5;
const DAILY_NOISE: f64 = 7.5;
const MIN_DAILY_DEMAND: f64 = 10.0;

/// Compounding annual growth applied from the start of `TREND_BASE_YEAR`.
const ANNUAL_GROWTH: f64 = 1.05;
const TREND_BASE_YEAR: i32 = 2020;

const BASE_CONFIDENCE: f64 = 0.75;
const CONFIDENCE_JITTER: f64 = 0.2;
const MAX_DAILY_CONFIDENCE: f64 = 0.95;

/// Reference demand at which the base price applies unchanged.
const PRICE_REFERENCE_DEMAND: f64 = 80.0;
const PRICE_ELASTICITY_FLOOR: f64 = 0.7;
const PRICE_ELASTICITY_CEILING: f64 = 1.3;

/// Long-run growth multiplier for `date`: 5% a year compounded from 2020.
pub fn trend_multiplier(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(TREND_BASE_YEAR, 1, 1).unwrap_or(NaiveDate::MIN);
    let years = (date - epoch).num_days() as f64 / 365.25;
    ANNUAL_GROWTH.powf(years)
}

/// Produces one day's raw demand, confidence and price for a crop.
#[derive(Debug, Clone)]
pub struct SingleDayPredictor {
    tables: Arc<ForecastTables>,
}

impl SingleDayPredictor {
    pub fn new(tables: Arc<ForecastTables>) -> Self {
        Self { tables }
    }

    pub fn predict(
        &self,
        crop: &str,
        date: NaiveDate,
        market: &MarketData,
        noise: &mut dyn NoiseSource,
    ) -> Prediction {
        let seasonality = self.tables.seasonal_factor(crop, season_month(date));
        let trend = trend_multiplier(date);
        let weather = market.weather_factor();

        let raw_demand = BASE_DEMAND
            + seasonality * SEASONAL_WEIGHT
            + (trend - 1.0) * TREND_WEIGHT
            + (weather - WEATHER_NEUTRAL) * WEATHER_WEIGHT
            + noise.sample(-DAILY_NOISE, DAILY_NOISE);
        let predicted_demand = raw_demand.max(MIN_DAILY_DEMAND).round();

        let confidence =
            (BASE_CONFIDENCE + noise.sample(0.0, CONFIDENCE_JITTER)).min(MAX_DAILY_CONFIDENCE);

        let elasticity = (PRICE_REFERENCE_DEMAND / predicted_demand)
            .clamp(PRICE_ELASTICITY_FLOOR, PRICE_ELASTICITY_CEILING);
        let price_estimate =
            round_to(self.tables.base_price(crop) * elasticity * seasonality, 2).max(0.0);

        Prediction {
            date,
            predicted_demand,
            confidence,
            price_estimate,
        }
    }
}
