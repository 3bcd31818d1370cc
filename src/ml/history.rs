use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Order;

/// Quantity of one variety ordered during one ISO week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineAggregate {
    pub variety: String,
    /// `YYYY-Www`, zero padded so lexicographic order is chronological.
    pub week_key: String,
    pub quantity: f64,
}

/// Groups raw order lines into per-variety weekly demand.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricalDemandExtractor;

impl HistoricalDemandExtractor {
    fn weekly_totals(orders: &[Order]) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut weekly: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for order in orders {
            let week_key = order.week_key();
            for item in &order.items {
                *weekly
                    .entry(item.variety.clone())
                    .or_default()
                    .entry(week_key.clone())
                    .or_insert(0.0) += f64::from(item.quantity);
            }
        }
        weekly
    }

    /// Flat list of aggregates, ordered by variety and then by week.
    pub fn aggregates(&self, orders: &[Order]) -> Vec<OrderLineAggregate> {
        Self::weekly_totals(orders)
            .into_iter()
            .flat_map(|(variety, weeks)| {
                weeks.into_iter().map(move |(week_key, quantity)| OrderLineAggregate {
                    variety: variety.clone(),
                    week_key,
                    quantity,
                })
            })
            .collect()
    }

    /// Weekly demand series per variety, oldest week first.
    ///
    /// Weeks in which a variety was not ordered are left out rather than
    /// zero-filled, so consecutive entries are consecutive active weeks.
    pub fn extract(&self, orders: &[Order]) -> BTreeMap<String, Vec<f64>> {
        Self::weekly_totals(orders)
            .into_iter()
            .map(|(variety, weeks)| (variety, weeks.into_values().collect()))
            .collect()
    }
}
