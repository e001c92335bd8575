use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Location;

/// A restaurant record as consumed from the storage collaborator. Menu CRUD
/// lives outside this engine; the dispatch core reads the name and location
/// for fanout payloads and route start points, and writes the running rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub restaurant_id: Uuid,
    /// The owning user account (role `restaurant`).
    pub user_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub location: Option<Location>,
    /// Arithmetic mean of restaurant ratings across delivered+rated orders,
    /// rounded to one decimal place. Recomputed after each rating write.
    pub rating: Option<f64>,
}
