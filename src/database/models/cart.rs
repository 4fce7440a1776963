use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Owned;

/// Upper bound on the quantity of a single cart line
pub const MAX_CART_ITEM_QUANTITY: i32 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    /// A transaction references this cart
    pub checked_out: bool,
}

impl Owned for Cart {
    const RESOURCE: &'static str = "cart";

    fn owner_id(&self) -> Uuid {
        self.owner
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Cart item joined with the product it refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl CartLine {
    /// `None` when the product does not fit a `Decimal`
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDetail {
    #[serde(flatten)]
    pub cart: Cart,
    pub items: Vec<CartLine>,
    pub total: Decimal,
}

/// Sum of line subtotals; `None` on overflow
pub fn cart_total(lines: &[CartLine]) -> Option<Decimal> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.subtotal()?))
}

impl CartDetail {
    /// `None` when the cart total overflows
    pub fn new(cart: Cart, items: Vec<CartLine>) -> Option<Self> {
        let total = cart_total(&items)?;
        Some(Self { cart, items, total })
    }
}
