use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use uuid::Uuid;

use crate::ml::tables::MONTHS;
use crate::models::{Customer, CustomerSegment, CustomerType, Order};

#[derive(Default)]
struct SegmentTotals {
    total_value: Decimal,
    total_orders: u32,
    variety_preferences: BTreeMap<String, u64>,
    seasonal_patterns: [f64; MONTHS],
}

/// Summarises ordering behaviour per customer type.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerSegmentAnalyzer;

impl CustomerSegmentAnalyzer {
    /// One segment per customer type present in `customers`, in type order.
    ///
    /// Orders whose customer is not in `customers` are ignored. Average order
    /// size is rounded to cents; a segment value past `Decimal::MAX` saturates.
    pub fn analyze(&self, customers: &[Customer], orders: &[Order]) -> Vec<CustomerSegment> {
        let customer_types: HashMap<Uuid, CustomerType> = customers
            .iter()
            .map(|c| (c.id, c.customer_type))
            .collect();

        let mut segments: BTreeMap<CustomerType, SegmentTotals> = customers
            .iter()
            .map(|c| (c.customer_type, SegmentTotals::default()))
            .collect();

        for order in orders {
            let Some(customer_type) = customer_types.get(&order.customer_id) else {
                continue;
            };
            let totals = segments.entry(*customer_type).or_default();
            totals.total_value = totals
                .total_value
                .checked_add(order.total_amount)
                .unwrap_or_else(|| {
                    warn!(
                        order_id = %order.id,
                        customer_type = %customer_type,
                        "Segment total overflowed, saturating at Decimal::MAX"
                    );
                    Decimal::MAX
                });
            totals.total_orders += 1;
            totals.seasonal_patterns[order.month_index()] += 1.0;
            for item in &order.items {
                *totals
                    .variety_preferences
                    .entry(item.variety.clone())
                    .or_insert(0) += u64::from(item.quantity);
            }
        }

        segments
            .into_iter()
            .map(|(customer_type, totals)| {
                let average_order_size = if totals.total_orders > 0 {
                    (totals.total_value / Decimal::from(totals.total_orders)).round_dp(2)
                } else {
                    Decimal::ZERO
                };
                CustomerSegment {
                    customer_type,
                    average_order_size,
                    order_frequency: totals.total_orders,
                    variety_preferences: totals.variety_preferences,
                    seasonal_patterns: totals.seasonal_patterns,
                }
            })
            .collect()
    }
}
