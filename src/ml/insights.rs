//! Rule-based market advisory text.
//!
//! Nothing here runs the forecasting pipelines. The insight and recommendation
//! strings are canned; only the harvest window is read off the crop's static
//! seasonality.

use tracing::debug;

use crate::ml::tables::{ForecastTables, MonthlyFactors, MONTHS};
use crate::models::{HarvestWindow, MarketInsights};

/// Months at or above this seasonal factor count as in season.
const IN_SEASON: f64 = 1.0;
/// A window never extends further than this either side of the peak.
const MAX_SPREAD: usize = MONTHS / 2 - 1;
const FAST_GROWTH: f64 = 0.10;
const CROWDED_MARKET: f64 = 0.80;

/// Advisory summary for `crop`. Crops without a seasonal row get generic text
/// and a window taken from the default profile.
pub fn get_market_insights(tables: &ForecastTables, crop: &str) -> MarketInsights {
    let profile = tables
        .market_trend(crop)
        .map_or_else(|| tables.seasonal_profile(crop), |trend| &trend.seasonality);
    let harvest_window = harvest_window(profile);

    if !tables.knows_crop(crop) {
        debug!(crop = %crop, "No seasonal profile, returning generic insights");
        return MarketInsights {
            crop: crop.to_string(),
            insights: vec![
                format!("No market profile is configured for {}", crop),
                "Demand for specialty produce generally peaks in late spring and summer"
                    .to_string(),
            ],
            harvest_window,
            recommendations: vec![
                "Record weekly sales to build a demand history".to_string(),
                "Start with small trial plantings before scaling".to_string(),
            ],
        };
    }

    let mut insights = vec![format!(
        "{} demand peaks in {}",
        crop,
        month_name(harvest_window.peak_month)
    )];
    let mut recommendations = vec![format!(
        "Plan harvests between {} and {}",
        month_name(harvest_window.start_month),
        month_name(harvest_window.end_month)
    )];

    if let Some(trend) = tables.market_trend(crop) {
        insights.push(format!(
            "Market growing about {:.0}% a year",
            trend.growth_rate * 100.0
        ));
        if trend.growth_rate >= FAST_GROWTH {
            recommendations.push(format!("Expand {} production ahead of peak season", crop));
        }
        if trend.market_saturation > CROWDED_MARKET {
            insights.push("Market is close to saturation".to_string());
            recommendations.push("Compete on freshness and local sourcing".to_string());
        }
    }

    MarketInsights {
        crop: crop.to_string(),
        insights,
        harvest_window,
        recommendations,
    }
}

/// Contiguous in-season run around the first highest month, wrapping across
/// the year end.
fn harvest_window(profile: &MonthlyFactors) -> HarvestWindow {
    let peak = profile
        .iter()
        .enumerate()
        .fold(0, |best, (i, f)| if *f > profile[best] { i } else { best });

    let behind = (1..=MAX_SPREAD)
        .take_while(|step| profile[(peak + MONTHS - step) % MONTHS] >= IN_SEASON)
        .count();
    let ahead = (1..=MAX_SPREAD)
        .take_while(|step| profile[(peak + step) % MONTHS] >= IN_SEASON)
        .count();

    let to_month = |index: usize| (index % MONTHS) as u32 + 1;
    HarvestWindow {
        start_month: to_month(peak + MONTHS - behind),
        peak_month: to_month(peak),
        end_month: to_month(peak + ahead),
    }
}

fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; MONTHS] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES[(month.saturating_sub(1) as usize).min(MONTHS - 1)]
}
