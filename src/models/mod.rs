//! Records exchanged with the engine's collaborators: the order, customer and
//! batch data loaded by the persistence layer, and the forecast structures
//! handed back to API handlers.

pub mod batch;
pub mod customer;
pub mod forecast;
pub mod market;
pub mod order;

use serde::{Deserialize, Serialize};

pub use batch::Batch;
pub use customer::{Customer, CustomerType};
pub use forecast::{
    CustomerSegment, DemandForecast, DemandForecastReport, DemandTrend, FactorWeights,
    ForecastResult, HarvestWindow, MarketInsights, Prediction,
};
pub use market::{CompetitorActivity, MarketConditions, MarketData};
pub use order::{Order, OrderItem};

/// Farm-scoped data bundle consumed by the multi-variety pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandForecastInput {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub batches: Vec<Batch>,
}
