use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Buyer category used to group customers into segments.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CustomerType {
    Restaurant,
    Retail,
    Wholesale,
    FarmersMarket,
    Individual,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub customer_type: CustomerType,
}

impl Customer {
    pub fn new(name: impl Into<String>, customer_type: CustomerType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            customer_type,
        }
    }
}
