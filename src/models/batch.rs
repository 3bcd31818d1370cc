use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A growing batch. Carried in the demand input for parity with the production
/// planner; the forecast itself does not read batch data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub variety: String,
    pub planted_on: NaiveDate,
    pub expected_harvest: Option<NaiveDate>,
    pub tray_count: u32,
}
