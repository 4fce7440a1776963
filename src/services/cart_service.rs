use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::auth::{authorize, BearerToken, Credential, TokenManager};
use crate::database::models::{Cart, CartDetail, CartItem};
use crate::database::{CartRepository, ProductRepository};
use crate::validator::schemas::CART_ITEM_PAYLOAD;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItem {
    product_id: Uuid,
    #[serde(default = "default_quantity")]
    quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartRepository>,
    products: Arc<dyn ProductRepository>,
    tokens: TokenManager,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartRepository>, products: Arc<dyn ProductRepository>, tokens: TokenManager) -> Self {
        Self {
            carts,
            products,
            tokens,
        }
    }

    /// Return the caller's open cart, creating one when none exists
    pub async fn open(&self, bearer: &BearerToken) -> ServiceResult<Cart> {
        let credential = self.tokens.authenticate(bearer)?;

        if let Some(cart) = self.carts.find_open_cart(credential.id).await? {
            return Ok(cart);
        }
        let cart = self.carts.insert_cart(credential.id).await?;
        tracing::debug!(cart_id = %cart.id, owner = %credential.id, "cart created");
        Ok(cart)
    }

    pub async fn get(&self, bearer: &BearerToken, cart_id: Uuid) -> ServiceResult<CartDetail> {
        let credential = self.tokens.authenticate(bearer)?;
        let cart = self.owned_cart(cart_id, &credential).await?;

        let items = self.carts.list_cart_items(cart.id).await?;
        CartDetail::new(cart, items).ok_or_else(total_out_of_range)
    }

    pub async fn add_item(&self, bearer: &BearerToken, cart_id: Uuid, payload: &Value) -> ServiceResult<CartItem> {
        let item: AddItem = CART_ITEM_PAYLOAD.validate_into(payload)?;
        let credential = self.tokens.authenticate(bearer)?;

        let cart = self.owned_cart(cart_id, &credential).await?;
        ensure_open(&cart)?;
        self.products.find_product(item.product_id).await?;

        Ok(self
            .carts
            .upsert_cart_item(cart.id, item.product_id, item.quantity)
            .await?)
    }

    pub async fn remove_item(&self, bearer: &BearerToken, cart_id: Uuid, product_id: Uuid) -> ServiceResult<()> {
        let credential = self.tokens.authenticate(bearer)?;

        let cart = self.owned_cart(cart_id, &credential).await?;
        ensure_open(&cart)?;

        Ok(self.carts.delete_cart_item(cart.id, product_id).await?)
    }

    async fn owned_cart(&self, cart_id: Uuid, credential: &Credential) -> ServiceResult<Cart> {
        let cart = self.carts.find_cart(cart_id).await?;
        authorize(&cart, credential)?;
        Ok(cart)
    }
}

pub(crate) fn total_out_of_range() -> ServiceError {
    ServiceError::Conflict("Cart total is out of range".to_string())
}

pub(crate) fn ensure_open(cart: &Cart) -> ServiceResult<()> {
    if cart.checked_out {
        return Err(ServiceError::Conflict("Cart has already been checked out".to_string()));
    }
    Ok(())
}
