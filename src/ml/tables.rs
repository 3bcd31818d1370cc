//! Static lookup tables consumed by the forecasting pipelines.
//!
//! The tables are built once (from the built-in defaults, optionally overlaid
//! with configured overrides) and shared read-only behind an `Arc`.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ForecastConfig;
use crate::ml::numerics;

pub const MONTHS: usize = 12;

/// One multiplier per calendar month, January first.
pub type MonthlyFactors = [f64; MONTHS];

/// Average month length used to map a day of the year onto a month index.
const DAYS_PER_MONTH: f64 = 30.44;

pub const DEFAULT_BASE_PRICE: f64 = 12.00;

const DEFAULT_SEASONAL_PROFILE: MonthlyFactors =
    [0.9, 0.9, 1.0, 1.1, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 0.9, 0.9];

const DEFAULT_HISTORICAL_DEMAND: [f64; 7] = [50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0];

const SEASONAL_PROFILES: [(&str, MonthlyFactors); 7] = [
    ("Arugula", [0.8, 0.9, 1.2, 1.3, 1.4, 1.1, 0.9, 0.8, 1.0, 1.2, 1.1, 0.9]),
    ("Basil", [0.6, 0.7, 0.9, 1.1, 1.4, 1.6, 1.7, 1.6, 1.3, 1.0, 0.7, 0.6]),
    ("Kale", [1.2, 1.1, 1.0, 0.9, 0.8, 0.7, 0.7, 0.8, 1.0, 1.2, 1.3, 1.3]),
    ("Lettuce", [0.9, 1.0, 1.2, 1.3, 1.3, 1.2, 1.0, 0.9, 1.0, 1.1, 1.0, 0.9]),
    ("Spinach", [1.1, 1.1, 1.2, 1.2, 1.0, 0.8, 0.7, 0.7, 0.9, 1.1, 1.2, 1.1]),
    ("Tomatoes", [0.5, 0.5, 0.6, 0.8, 1.0, 1.4, 1.7, 1.7, 1.4, 1.0, 0.6, 0.5]),
    ("Microgreens", [1.0, 1.0, 1.1, 1.1, 1.1, 1.0, 0.9, 0.9, 1.0, 1.1, 1.2, 1.3]),
];

const BASE_PRICES: [(&str, f64); 7] = [
    ("Arugula", 14.00),
    ("Basil", 16.00),
    ("Kale", 10.00),
    ("Lettuce", 8.50),
    ("Spinach", 11.00),
    ("Tomatoes", 6.50),
    ("Microgreens", 24.00),
];

const HISTORICAL_DEMAND: [(&str, [f64; 7]); 7] = [
    ("Arugula", [45.0, 52.0, 48.0, 55.0, 60.0, 58.0, 62.0]),
    ("Basil", [30.0, 35.0, 42.0, 50.0, 58.0, 61.0, 57.0]),
    ("Kale", [40.0, 38.0, 36.0, 35.0, 33.0, 34.0, 32.0]),
    ("Lettuce", [70.0, 72.0, 75.0, 74.0, 78.0, 80.0, 79.0]),
    ("Spinach", [38.0, 40.0, 41.0, 39.0, 42.0, 43.0, 41.0]),
    ("Tomatoes", [20.0, 25.0, 35.0, 50.0, 65.0, 70.0, 68.0]),
    ("Microgreens", [55.0, 57.0, 60.0, 62.0, 65.0, 66.0, 70.0]),
];

/// (variety, annual growth rate, market saturation)
const MARKET_TRENDS: [(&str, f64, f64); 7] = [
    ("Arugula", 0.15, 0.60),
    ("Basil", 0.12, 0.70),
    ("Kale", 0.05, 0.85),
    ("Lettuce", 0.03, 0.90),
    ("Spinach", 0.06, 0.75),
    ("Tomatoes", 0.08, 0.80),
    ("Microgreens", 0.25, 0.40),
];

/// Growth and saturation constants for one variety's market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTrend {
    pub variety: String,
    /// Annualised growth, e.g. 0.15 for 15% a year.
    pub growth_rate: f64,
    pub seasonality: MonthlyFactors,
    /// How close the market is to capacity, in [0, 1].
    pub market_saturation: f64,
}

impl MarketTrend {
    /// Month-over-month growth multiplier.
    pub fn monthly_growth_factor(&self) -> f64 {
        1.0 + self.growth_rate / 12.0
    }
}

static BUILTIN: Lazy<Arc<ForecastTables>> = Lazy::new(|| Arc::new(ForecastTables::builtin()));

/// Read-only configuration tables shared by every forecast run.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTables {
    seasonal_factors: HashMap<String, MonthlyFactors>,
    default_seasonal: MonthlyFactors,
    market_trends: HashMap<String, MarketTrend>,
    base_prices: HashMap<String, f64>,
    default_base_price: f64,
    historical_demand: HashMap<String, Vec<f64>>,
    default_historical: Vec<f64>,
}

impl ForecastTables {
    /// Tables populated with the built-in crop profiles.
    pub fn builtin() -> Self {
        let seasonal_factors: HashMap<String, MonthlyFactors> = SEASONAL_PROFILES
            .iter()
            .map(|(crop, factors)| (crop.to_string(), *factors))
            .collect();

        let market_trends = MARKET_TRENDS
            .iter()
            .map(|&(variety, growth_rate, market_saturation)| {
                let seasonality = seasonal_factors
                    .get(variety)
                    .copied()
                    .unwrap_or(DEFAULT_SEASONAL_PROFILE);
                (
                    variety.to_string(),
                    MarketTrend {
                        variety: variety.to_string(),
                        growth_rate,
                        seasonality,
                        market_saturation,
                    },
                )
            })
            .collect();

        Self {
            seasonal_factors,
            default_seasonal: DEFAULT_SEASONAL_PROFILE,
            market_trends,
            base_prices: BASE_PRICES
                .iter()
                .map(|(crop, price)| (crop.to_string(), *price))
                .collect(),
            default_base_price: DEFAULT_BASE_PRICE,
            historical_demand: HISTORICAL_DEMAND
                .iter()
                .map(|(crop, series)| (crop.to_string(), series.to_vec()))
                .collect(),
            default_historical: DEFAULT_HISTORICAL_DEMAND.to_vec(),
        }
    }

    /// Built-in tables overlaid with the overrides in `config`. Seasonal rows
    /// are applied first so overridden trends pick up overridden seasonality.
    pub fn from_config(config: &ForecastConfig) -> Self {
        let mut tables = Self::builtin().with_default_base_price(config.default_base_price);

        for profile in &config.seasonal_factors {
            let mut factors = DEFAULT_SEASONAL_PROFILE;
            for (slot, value) in factors.iter_mut().zip(&profile.factors) {
                *slot = *value;
            }
            tables = tables.with_seasonal_profile(profile.variety.clone(), factors);
        }
        for price in &config.base_prices {
            tables = tables.with_base_price(price.variety.clone(), price.price);
        }
        for history in &config.historical_demand {
            tables = tables.with_historical_demand(history.variety.clone(), history.series.clone());
        }
        for trend in &config.market_trends {
            let seasonality = *tables.seasonal_profile(&trend.variety);
            tables = tables.with_market_trend(MarketTrend {
                variety: trend.variety.clone(),
                growth_rate: trend.growth_rate,
                seasonality,
                market_saturation: trend.market_saturation,
            });
        }
        tables
    }

    /// Process-wide instance of the built-in tables.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    pub fn with_seasonal_profile(mut self, crop: impl Into<String>, factors: MonthlyFactors) -> Self {
        self.seasonal_factors.insert(crop.into(), factors);
        self
    }

    pub fn with_market_trend(mut self, trend: MarketTrend) -> Self {
        self.market_trends.insert(trend.variety.clone(), trend);
        self
    }

    pub fn with_base_price(mut self, crop: impl Into<String>, price: f64) -> Self {
        self.base_prices.insert(crop.into(), price);
        self
    }

    pub fn with_default_base_price(mut self, price: f64) -> Self {
        self.default_base_price = price;
        self
    }

    pub fn with_historical_demand(mut self, crop: impl Into<String>, series: Vec<f64>) -> Self {
        self.historical_demand.insert(crop.into(), series);
        self
    }

    /// Seasonal row for `crop`, or the default profile for unknown crops.
    pub fn seasonal_profile(&self, crop: &str) -> &MonthlyFactors {
        self.seasonal_factors
            .get(crop)
            .unwrap_or(&self.default_seasonal)
    }

    /// Seasonal multiplier with the default-profile fallback.
    pub fn seasonal_factor(&self, crop: &str, month: usize) -> f64 {
        self.seasonal_profile(crop)[month.min(MONTHS - 1)]
    }

    /// Seasonal multiplier only when `crop` has its own row.
    pub fn known_seasonal_factor(&self, crop: &str, month: usize) -> Option<f64> {
        self.seasonal_factors
            .get(crop)
            .map(|row| row[month.min(MONTHS - 1)])
    }

    pub fn market_trend(&self, variety: &str) -> Option<&MarketTrend> {
        self.market_trends.get(variety)
    }

    pub fn base_price(&self, crop: &str) -> f64 {
        self.base_prices
            .get(crop)
            .copied()
            .unwrap_or(self.default_base_price)
    }

    /// Mean of the crop's historical-demand series, or of the default series.
    pub fn historical_average(&self, crop: &str) -> f64 {
        let series = self
            .historical_demand
            .get(crop)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_historical);
        numerics::mean(series).unwrap_or(0.0)
    }

    pub fn knows_crop(&self, crop: &str) -> bool {
        self.seasonal_factors.contains_key(crop)
    }
}

impl Default for ForecastTables {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Month index (0 = January) of a date, derived from its day of the year.
pub fn season_month(date: NaiveDate) -> usize {
    let day_of_year = date.ordinal() as f64;
    let month = ((day_of_year - 1.0) / DAYS_PER_MONTH).floor();
    (month.max(0.0) as usize).min(MONTHS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2024, 1, 1, 0)]
    #[case(2024, 1, 31, 0)]
    #[case(2024, 3, 15, 2)]
    #[case(2024, 7, 4, 6)]
    #[case(2023, 12, 31, 11)]
    #[case(2024, 12, 31, 11)]
    fn season_month_from_day_of_year(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] expected: usize,
    ) {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        assert_eq!(season_month(date), expected);
    }

    #[test]
    fn unknown_crop_uses_default_profile() {
        let tables = ForecastTables::builtin();
        assert_eq!(tables.seasonal_factor("Dragonfruit", 4), 1.2);
        assert_eq!(tables.known_seasonal_factor("Dragonfruit", 4), None);
        assert_eq!(tables.base_price("Dragonfruit"), DEFAULT_BASE_PRICE);
        assert_eq!(tables.historical_average("Dragonfruit"), 50.0);
    }

    #[test]
    fn arugula_march_factor() {
        let tables = ForecastTables::builtin();
        assert_eq!(tables.seasonal_factor("Arugula", 2), 1.2);
        assert_eq!(tables.known_seasonal_factor("Arugula", 2), Some(1.2));
    }

    #[test]
    fn historical_average_of_known_crop() {
        let tables = ForecastTables::builtin();
        assert!((tables.historical_average("Arugula") - 380.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn overrides_replace_builtin_rows() {
        let tables = ForecastTables::builtin()
            .with_base_price("Arugula", 18.0)
            .with_default_base_price(9.0)
            .with_seasonal_profile("Chard", [1.5; MONTHS])
            .with_historical_demand("Chard", vec![10.0, 20.0]);
        assert_eq!(tables.base_price("Arugula"), 18.0);
        assert_eq!(tables.base_price("Chard"), 9.0);
        assert_eq!(tables.seasonal_factor("Chard", 11), 1.5);
        assert_eq!(tables.historical_average("Chard"), 15.0);
    }

    #[test]
    fn config_overrides_are_overlaid() {
        use crate::config::{BasePriceConfig, MarketTrendConfig, SeasonalProfileConfig};

        let config = ForecastConfig {
            default_base_price: 9.5,
            seasonal_factors: vec![SeasonalProfileConfig {
                variety: "Chard".into(),
                factors: vec![1.3; MONTHS],
            }],
            base_prices: vec![BasePriceConfig {
                variety: "Basil".into(),
                price: 20.0,
            }],
            market_trends: vec![MarketTrendConfig {
                variety: "Chard".into(),
                growth_rate: 0.2,
                market_saturation: 0.3,
            }],
            ..ForecastConfig::default()
        };
        let tables = ForecastTables::from_config(&config);
        assert_eq!(tables.base_price("Basil"), 20.0);
        assert_eq!(tables.base_price("Dragonfruit"), 9.5);
        assert_eq!(tables.known_seasonal_factor("Chard", 6), Some(1.3));
        assert_eq!(tables.market_trend("Chard").unwrap().seasonality, [1.3; MONTHS]);
        assert_eq!(tables.seasonal_factor("Arugula", 2), 1.2);
    }

    #[test]
    fn default_config_matches_builtin() {
        assert_eq!(
            ForecastTables::from_config(&ForecastConfig::default()),
            ForecastTables::builtin()
        );
    }

    #[test]
    fn market_trend_growth_is_monthly() {
        let tables = ForecastTables::builtin();
        let trend = tables.market_trend("Arugula").unwrap();
        assert!((trend.monthly_growth_factor() - 1.0125).abs() < 1e-12);
        assert!(tables.market_trend("Dragonfruit").is_none());
    }

    #[test]
    fn shared_tables_are_builtin() {
        assert_eq!(*ForecastTables::shared(), ForecastTables::builtin());
    }

    #[test]
    fn builtin_rows_are_positive() {
        for (_, row) in SEASONAL_PROFILES {
            assert!(row.iter().all(|f| *f > 0.0));
        }
    }
}
