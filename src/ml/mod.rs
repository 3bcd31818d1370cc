/*!
 * # Forecasting Engine
 *
 * Classical time-series statistics behind the demand forecasts: seasonal
 * lookups, exponential smoothing, least-squares trends and a weighted ensemble.
 *
 * Two pipelines share the primitives in [`numerics`]:
 *
 * - the single-crop daily pipeline ([`SingleDayPredictor`], [`EnsembleCombiner`],
 *   [`Smoother`], [`MarketAdjuster`]);
 * - the multi-variety pipeline over order history ([`HistoricalDemandExtractor`],
 *   [`VarietyForecaster`]), reported alongside [`CustomerSegmentAnalyzer`] output.
 *
 * Every random perturbation is drawn from an injected [`NoiseSource`].
 */

/// Weighted blend of the daily predictions
pub mod ensemble;
/// Weekly demand series extracted from order history
pub mod history;
/// Rule-based market advisory text
pub mod insights;
/// Market-condition demand and price adjustment
pub mod market;
/// Injectable randomness for the forecast pipelines
pub mod noise;
/// Statistical primitives shared by both pipelines
pub mod numerics;
/// Single-day seasonal demand prediction
pub mod predictor;
/// Customer segment analysis
pub mod segments;
/// Centred moving-average smoothing
pub mod smoothing;
/// Seasonal, market-trend and price lookup tables
pub mod tables;
/// Per-variety forecasts and recommendations
pub mod variety;

pub use ensemble::{EnsembleCombiner, EnsembleWeights};
pub use history::{HistoricalDemandExtractor, OrderLineAggregate};
pub use insights::get_market_insights;
pub use market::MarketAdjuster;
pub use noise::{Midpoint, NoiseSource, SeededNoise};
pub use predictor::SingleDayPredictor;
pub use segments::CustomerSegmentAnalyzer;
pub use smoothing::Smoother;
pub use tables::{ForecastTables, MarketTrend, MonthlyFactors};
pub use variety::{VarietyForecastSettings, VarietyForecaster};
