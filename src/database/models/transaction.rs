use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Owned;

pub const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub owner: Uuid,
    pub total: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Owned for Transaction {
    const RESOURCE: &'static str = "transaction";

    fn owner_id(&self) -> Uuid {
        self.owner
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub cart_id: Uuid,
    pub owner: Uuid,
    pub total: Decimal,
}
