use chrono::{Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use farm_forecast::ml::{numerics, HistoricalDemandExtractor, SeededNoise};
use farm_forecast::models::{Customer, CustomerType, DemandForecastInput, Order, OrderItem};
use farm_forecast::{ForecastRequest, ForecastingService};
use rust_decimal_macros::dec;
use std::time::Duration;

const VARIETIES: [&str; 5] = ["Arugula", "Basil", "Kale", "Lettuce", "Microgreens"];

fn sample_input(weeks: i64) -> DemandForecastInput {
    let customer = Customer::new("Green Bistro", CustomerType::Restaurant);
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 9, 0, 0).unwrap();
    let orders = (0..weeks)
        .map(|week| {
            let items = VARIETIES
                .iter()
                .enumerate()
                .map(|(i, variety)| {
                    OrderItem::new(*variety, (10 + week as u32 + i as u32 * 3) % 40 + 1, dec!(4.50))
                })
                .collect();
            Order::new(customer.id, start + ChronoDuration::weeks(week), items)
        })
        .collect();

    DemandForecastInput {
        customers: vec![customer],
        orders,
        batches: Vec::new(),
    }
}

// Single-crop pipeline across horizons
fn crop_forecast_benchmark(c: &mut Criterion) {
    let service = ForecastingService::default();
    let mut group = c.benchmark_group("crop_forecast");

    for days in [7u32, 30, 90].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(days), days, |b, &days| {
            let request = ForecastRequest {
                crop: "Arugula".to_string(),
                days_ahead: days,
                start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                market_data: None,
            };
            let mut noise = SeededNoise::from_seed(7);
            b.iter(|| black_box(service.generate_forecast_with(&request, &mut noise)));
        });
    }

    group.finish();
}

// Multi-variety pipeline from order history
fn demand_forecast_benchmark(c: &mut Criterion) {
    let service = ForecastingService::default();
    let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut group = c.benchmark_group("demand_forecast");

    for weeks in [12i64, 52, 104].iter() {
        let input = sample_input(*weeks);
        group.bench_with_input(BenchmarkId::from_parameter(weeks), &input, |b, input| {
            b.iter(|| black_box(service.generate_demand_forecast_as_of(input, 14, as_of)));
        });
    }

    group.finish();
}

fn history_extraction_benchmark(c: &mut Criterion) {
    let input = sample_input(104);
    c.bench_function("history_extraction", |b| {
        b.iter(|| black_box(HistoricalDemandExtractor.extract(&input.orders)));
    });
}

fn confidence_benchmark(c: &mut Criterion) {
    let series: Vec<f64> = (0..520).map(|i| 50.0 + (i % 7) as f64 * 3.0).collect();
    c.bench_function("dispersion_confidence", |b| {
        b.iter(|| black_box(numerics::dispersion_confidence(black_box(&series))));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(100);
    targets =
        crop_forecast_benchmark,
        demand_forecast_benchmark,
        history_extraction_benchmark,
        confidence_benchmark
}

criterion_main!(benches);
