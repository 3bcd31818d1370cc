use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::{
    config::ForecastConfig,
    errors::ServiceError,
    ml::{
        get_market_insights, numerics, CustomerSegmentAnalyzer, EnsembleCombiner,
        ForecastTables, HistoricalDemandExtractor, MarketAdjuster, NoiseSource, SeededNoise,
        SingleDayPredictor, Smoother, VarietyForecaster,
    },
    models::{
        Customer, CustomerSegment, DemandForecast, DemandForecastInput, DemandForecastReport,
        DemandTrend, FactorWeights, ForecastResult, MarketData, MarketInsights, Order,
    },
};

pub const MODEL_TYPE: &str = "ensemble_seasonal_trend";

const MIN_ACCURACY: f64 = 0.87;
const MAX_ACCURACY: f64 = 0.95;

const BASELINE_ADVICE: &str = "Baseline estimate only; record more orders for a tailored forecast";

/// Parameters of one single-crop forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub crop: String,
    pub days_ahead: u32,
    /// First forecast day.
    pub start_date: NaiveDate,
    #[serde(default)]
    pub market_data: Option<MarketData>,
}

impl ForecastRequest {
    /// Request starting tomorrow (UTC).
    pub fn starting_tomorrow(crop: impl Into<String>, days_ahead: u32) -> Self {
        Self {
            crop: crop.into(),
            days_ahead,
            start_date: Utc::now().date_naive() + Duration::days(1),
            market_data: None,
        }
    }

    pub fn with_market_data(mut self, market_data: MarketData) -> Self {
        self.market_data = Some(market_data);
        self
    }
}

/// Demand forecasting facade used by the market-insight and analytics handlers.
#[derive(Debug, Clone)]
pub struct ForecastingService {
    tables: Arc<ForecastTables>,
    predictor: SingleDayPredictor,
    ensemble: EnsembleCombiner,
    smoother: Smoother,
    variety_forecaster: VarietyForecaster,
}

impl ForecastingService {
    pub fn new(tables: Arc<ForecastTables>) -> Self {
        Self {
            predictor: SingleDayPredictor::new(Arc::clone(&tables)),
            ensemble: EnsembleCombiner::new(Arc::clone(&tables)),
            smoother: Smoother::default(),
            variety_forecaster: VarietyForecaster::new(Arc::clone(&tables)),
            tables,
        }
    }

    /// Service with configured table overrides and tunables.
    pub fn with_config(config: &ForecastConfig) -> Self {
        let tables = Arc::new(ForecastTables::from_config(config));
        Self {
            predictor: SingleDayPredictor::new(Arc::clone(&tables)),
            ensemble: EnsembleCombiner::new(Arc::clone(&tables)),
            smoother: Smoother::new(config.smoothing_window),
            variety_forecaster: VarietyForecaster::with_settings(
                Arc::clone(&tables),
                config.variety_settings(),
            ),
            tables,
        }
    }

    pub fn tables(&self) -> &Arc<ForecastTables> {
        &self.tables
    }

    /// Daily forecast for `crop` starting tomorrow, with entropy-seeded noise.
    pub fn generate_forecast(
        &self,
        crop: &str,
        days_ahead: u32,
        market_data: Option<&MarketData>,
    ) -> ForecastResult {
        let mut request = ForecastRequest::starting_tomorrow(crop, days_ahead);
        request.market_data = market_data.cloned();
        self.generate_forecast_with(&request, &mut SeededNoise::from_entropy())
    }

    /// Predict, blend, smooth, then apply market conditions.
    #[instrument(skip(self, noise), fields(crop = %request.crop, days = request.days_ahead))]
    pub fn generate_forecast_with(
        &self,
        request: &ForecastRequest,
        noise: &mut dyn NoiseSource,
    ) -> ForecastResult {
        let market = request.market_data.clone().unwrap_or_default();

        let daily: Vec<_> = (0..request.days_ahead)
            .map(|offset| {
                let date = request.start_date + Duration::days(i64::from(offset));
                self.predictor.predict(&request.crop, date, &market, noise)
            })
            .collect();

        let blended = self.ensemble.combine(&daily, &request.crop, noise);
        let smoothed = self.smoother.smooth(&blended);
        let predictions = MarketAdjuster.adjust(&smoothed, &market.conditions());

        let confidences: Vec<f64> = predictions.iter().map(|p| p.confidence).collect();
        let accuracy = numerics::mean(&confidences)
            .map_or(MIN_ACCURACY, |mean| mean.clamp(MIN_ACCURACY, MAX_ACCURACY));

        info!(
            predictions = predictions.len(),
            accuracy, "Generated crop forecast"
        );

        ForecastResult {
            crop: request.crop.clone(),
            predictions,
            accuracy,
            model_type: MODEL_TYPE.to_string(),
            factors: FactorWeights::STANDARD,
        }
    }

    /// Ranked per-variety forecasts from order history, as of today (UTC).
    ///
    /// Never fails: malformed input is logged and answered with a fixed
    /// fallback list.
    pub fn generate_demand_forecast(
        &self,
        input: &DemandForecastInput,
        forecast_days: u32,
    ) -> Vec<DemandForecast> {
        self.generate_demand_forecast_as_of(input, forecast_days, Utc::now().date_naive())
    }

    /// Same as [`generate_demand_forecast`](Self::generate_demand_forecast)
    /// with an explicit reference date for the seasonal lookup.
    pub fn generate_demand_forecast_as_of(
        &self,
        input: &DemandForecastInput,
        forecast_days: u32,
        as_of: NaiveDate,
    ) -> Vec<DemandForecast> {
        self.forecast_or_fallback(input, forecast_days, as_of).0
    }

    /// Ranked forecasts together with the customer segments of the same input.
    ///
    /// Segments are built only from orders that pass validation.
    #[instrument(skip(self, input))]
    pub fn demand_report(
        &self,
        input: &DemandForecastInput,
        forecast_days: u32,
        as_of: NaiveDate,
    ) -> DemandForecastReport {
        let (forecasts, degraded) = self.forecast_or_fallback(input, forecast_days, as_of);
        let valid_orders: Vec<Order> = input
            .orders
            .iter()
            .filter(|order| order.validate().is_ok())
            .cloned()
            .collect();
        if valid_orders.len() < input.orders.len() {
            debug!(
                skipped = input.orders.len() - valid_orders.len(),
                "Leaving invalid orders out of customer segments"
            );
        }
        DemandForecastReport {
            forecasts,
            segments: self.analyze_customer_segments(&input.customers, &valid_orders),
            degraded,
            generated_at: Utc::now(),
        }
    }

    /// Ordering behaviour grouped by customer type.
    pub fn analyze_customer_segments(
        &self,
        customers: &[Customer],
        orders: &[Order],
    ) -> Vec<CustomerSegment> {
        CustomerSegmentAnalyzer.analyze(customers, orders)
    }

    /// Canned advisory text for `crop`; not derived from any forecast.
    pub fn get_market_insights(&self, crop: &str) -> MarketInsights {
        get_market_insights(&self.tables, crop)
    }

    #[instrument(skip(self, input), fields(orders = input.orders.len()))]
    fn try_demand_forecast(
        &self,
        input: &DemandForecastInput,
        forecast_days: u32,
        as_of: NaiveDate,
    ) -> Result<Vec<DemandForecast>, ServiceError> {
        for order in &input.orders {
            order.validate()?;
        }
        debug!(
            customers = input.customers.len(),
            batches = input.batches.len(),
            "Extracting weekly demand"
        );

        let history = HistoricalDemandExtractor.extract(&input.orders);
        let forecasts = self
            .variety_forecaster
            .forecast_all(&history, forecast_days, as_of)?;

        info!(
            varieties = history.len(),
            forecasts = forecasts.len(),
            "Generated variety forecasts"
        );
        Ok(forecasts)
    }

    fn forecast_or_fallback(
        &self,
        input: &DemandForecastInput,
        forecast_days: u32,
        as_of: NaiveDate,
    ) -> (Vec<DemandForecast>, bool) {
        match self.try_demand_forecast(input, forecast_days, as_of) {
            Ok(forecasts) => (forecasts, false),
            Err(e) => {
                warn!(error = %e, code = e.code(), "Demand forecast failed, returning fallback");
                (fallback_forecasts(), true)
            }
        }
    }
}

impl Default for ForecastingService {
    fn default() -> Self {
        Self::new(ForecastTables::shared())
    }
}

/// Fixed forecasts returned when the multi-variety pipeline cannot run.
pub fn fallback_forecasts() -> Vec<DemandForecast> {
    vec![
        DemandForecast {
            variety: "Microgreens".to_string(),
            predicted_demand: 45.0,
            confidence: 0.7,
            trend: DemandTrend::Stable,
            seasonal_factor: 1.0,
            recommendations: vec![BASELINE_ADVICE.to_string()],
        },
        DemandForecast {
            variety: "Lettuce".to_string(),
            predicted_demand: 38.0,
            confidence: 0.65,
            trend: DemandTrend::Stable,
            seasonal_factor: 1.0,
            recommendations: vec![BASELINE_ADVICE.to_string()],
        },
    ]
}
