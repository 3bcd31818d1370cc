use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A customer order as loaded by the persistence layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[validate(custom = "validate_non_negative_amount")]
    pub total_amount: Decimal,
    #[validate]
    pub items: Vec<OrderItem>,
}

/// One line of an order: a quantity of a single product variety.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct OrderItem {
    #[validate(custom = "validate_variety_name")]
    pub variety: String,
    pub quantity: u32,
    #[validate(custom = "validate_non_negative_amount")]
    pub unit_price: Decimal,
}

impl OrderItem {
    pub fn new(variety: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            variety: variety.into(),
            quantity,
            unit_price,
        }
    }

    /// `unit_price × quantity`, or `None` when the product overflows `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

impl Order {
    /// Builds an order whose total is the sum of its line totals.
    ///
    /// A total that overflows `Decimal` saturates at `Decimal::MAX`.
    pub fn new(customer_id: Uuid, created_at: DateTime<Utc>, items: Vec<OrderItem>) -> Self {
        let total_amount = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| {
                item.line_total().and_then(|line| sum.checked_add(line))
            })
            .unwrap_or_else(|| {
                warn!(
                    customer_id = %customer_id,
                    "Order total overflowed, saturating at Decimal::MAX"
                );
                Decimal::MAX
            });
        Self {
            id: Uuid::new_v4(),
            customer_id,
            created_at,
            total_amount,
            items,
        }
    }

    /// ISO week bucket of the order, e.g. `2024-W07`.
    ///
    /// The ISO week-numbering year is used so late-December orders that fall in
    /// week 1 sort after the rest of that December.
    pub fn week_key(&self) -> String {
        let week = self.created_at.date_naive().iso_week();
        format!("{}-W{:02}", week.year(), week.week())
    }

    /// Zero-based calendar month the order was placed in.
    pub fn month_index(&self) -> usize {
        self.created_at.month0() as usize
    }
}

fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        let mut err = ValidationError::new("negative_amount");
        err.message = Some("Amounts must not be negative".into());
        return Err(err);
    }
    Ok(())
}

fn validate_variety_name(variety: &str) -> Result<(), ValidationError> {
    if variety.trim().is_empty() {
        let mut err = ValidationError::new("variety_required");
        err.message = Some("Order items must name a product variety".into());
        return Err(err);
    }
    Ok(())
}
