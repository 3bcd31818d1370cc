//! Property-based tests for the forecasting engine.
//!
//! These tests use proptest to verify the numeric invariants of both pipelines
//! across a wide range of inputs.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use farm_forecast::ml::{numerics, ForecastTables, HistoricalDemandExtractor, VarietyForecaster};
use farm_forecast::models::{MarketData, Order, OrderItem};
use farm_forecast::{ForecastRequest, ForecastingService, SeededNoise};
use proptest::prelude::*;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use uuid::Uuid;

const VARIETIES: [&str; 6] = ["Arugula", "Basil", "Kale", "Tomatoes", "Microgreens", "Purslane"];

// Strategies for generating test data
fn crop_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(VARIETIES.to_vec()).prop_map(str::to_string)
}

fn start_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset)
    })
}

fn order_strategy() -> impl Strategy<Value = Order> {
    (
        0i64..104,
        prop::collection::vec((crop_strategy(), 0u32..200), 1..5),
    )
        .prop_map(|(week, lines)| {
            let created_at = Utc.with_ymd_and_hms(2023, 1, 2, 9, 0, 0).unwrap() + Duration::weeks(week);
            let items = lines
                .into_iter()
                .map(|(variety, qty)| OrderItem::new(variety, qty, dec!(2.75)))
                .collect();
            Order::new(Uuid::new_v4(), created_at, items)
        })
}

fn history_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<f64>>> {
    prop::collection::btree_map(
        crop_strategy(),
        prop::collection::vec(0.0f64..500.0, 0..12),
        0..6,
    )
}

// Property: every single-crop prediction stays in range
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn crop_predictions_stay_in_range(
        crop in crop_strategy(),
        days in 0u32..45,
        start_date in start_date_strategy(),
        seed in any::<u64>(),
        weather in prop::option::of(-1.0f64..2.0),
    ) {
        let service = ForecastingService::default();
        let request = ForecastRequest {
            crop,
            days_ahead: days,
            start_date,
            market_data: Some(MarketData { weather_index: weather, ..MarketData::default() }),
        };
        let result = service.generate_forecast_with(&request, &mut SeededNoise::from_seed(seed));

        prop_assert_eq!(result.predictions.len(), days as usize);
        for p in &result.predictions {
            prop_assert!(p.predicted_demand >= 0.0);
            prop_assert!((0.0..=1.0).contains(&p.confidence));
            prop_assert!(p.price_estimate >= 0.0);
        }
        prop_assert!((0.87..=0.95).contains(&result.accuracy));
    }
}

// Property: smoothing and trend primitives
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn constant_series_is_a_smoothing_fixed_point(
        c in 0.0f64..1000.0,
        len in 1usize..40,
        alpha in 0.01f64..=1.0,
    ) {
        let smoothed = numerics::exponential_smoothing(&vec![c; len], alpha);
        prop_assert_eq!(smoothed.len(), len);
        for value in smoothed {
            prop_assert!((value - c).abs() <= 1e-9 * c.max(1.0));
        }
    }

    #[test]
    fn slope_sign_follows_arithmetic_step(
        start in -100.0f64..100.0,
        step in 0.1f64..10.0,
        len in 2usize..30,
    ) {
        let rising: Vec<f64> = (0..len).map(|i| start + step * i as f64).collect();
        let falling: Vec<f64> = (0..len).map(|i| start - step * i as f64).collect();
        let flat = vec![start; len];

        prop_assert!(numerics::ols_slope(&rising) > 0.0);
        prop_assert!(numerics::ols_slope(&falling) < 0.0);
        prop_assert!(numerics::ols_slope(&flat).abs() < 1e-9);
    }

    #[test]
    fn confidence_falls_as_spread_grows(
        k1 in 0.0f64..50.0,
        k2 in 0.0f64..50.0,
        pairs in 2usize..10,
    ) {
        let (low, high) = if k1 <= k2 { (k1, k2) } else { (k2, k1) };
        let alternating = |k: f64| -> Vec<f64> {
            (0..pairs * 2).map(|i| if i % 2 == 0 { 50.0 + k } else { 50.0 - k }).collect()
        };

        let calm = numerics::dispersion_confidence(&alternating(low));
        let noisy = numerics::dispersion_confidence(&alternating(high));
        prop_assert!(calm + 1e-12 >= noisy);
        prop_assert!((0.1..=0.95).contains(&calm));
        prop_assert!((0.1..=0.95).contains(&noisy));
    }
}

// Property: multi-variety pipeline
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn variety_forecasts_are_ranked_and_filtered(history in history_strategy()) {
        let forecaster = VarietyForecaster::new(ForecastTables::shared());
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let forecasts = forecaster.forecast_all(&history, 14, as_of).unwrap();

        let eligible = history.values().filter(|s| s.len() >= 3).count();
        prop_assert_eq!(forecasts.len(), eligible);
        for pair in forecasts.windows(2) {
            prop_assert!(pair[0].predicted_demand >= pair[1].predicted_demand);
        }
        for forecast in &forecasts {
            prop_assert!(forecast.predicted_demand >= 0.0);
            prop_assert!((0.0..=1.0).contains(&forecast.confidence));
        }
    }

    #[test]
    fn extraction_preserves_total_quantity(
        orders in prop::collection::vec(order_strategy(), 0..40),
    ) {
        let history = HistoricalDemandExtractor.extract(&orders);

        let mut expected: BTreeMap<String, f64> = BTreeMap::new();
        for item in orders.iter().flat_map(|o| &o.items) {
            *expected.entry(item.variety.clone()).or_default() += f64::from(item.quantity);
        }

        prop_assert_eq!(history.len(), expected.len());
        for (variety, total) in expected {
            let extracted: f64 = history[&variety].iter().sum();
            prop_assert_eq!(extracted, total);
        }
    }
}
