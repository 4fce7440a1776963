use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Owned;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub owner: Uuid,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Product {
    const RESOURCE: &'static str = "product";

    fn owner_id(&self) -> Uuid {
        self.owner
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update; `description: Some(None)` clears the stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

/// Distinguish an explicit `null` from an absent key
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProductChanges {
    pub fn apply(&self, product: &mut Product) {
        if let Some(title) = &self.title {
            product.title = title.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
    }
}
