use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::cart_service::{ensure_open, total_out_of_range};
use super::error::{ServiceError, ServiceResult};
use crate::auth::{authorize, BearerToken, TokenManager};
use crate::database::models::{cart_total, NewTransaction, Transaction};
use crate::database::{CartRepository, TransactionRepository};
use crate::validator::schemas::CHECKOUT_PAYLOAD;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Checkout {
    cart_id: Uuid,
}

#[derive(Clone)]
pub struct TransactionService {
    carts: Arc<dyn CartRepository>,
    transactions: Arc<dyn TransactionRepository>,
    tokens: TokenManager,
}

impl TransactionService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        transactions: Arc<dyn TransactionRepository>,
        tokens: TokenManager,
    ) -> Self {
        Self {
            carts,
            transactions,
            tokens,
        }
    }

    /// Record a completed transaction for the caller's cart
    pub async fn checkout(&self, bearer: &BearerToken, payload: &Value) -> ServiceResult<Transaction> {
        let checkout: Checkout = CHECKOUT_PAYLOAD.validate_into(payload)?;
        let credential = self.tokens.authenticate(bearer)?;

        let cart = self.carts.find_cart(checkout.cart_id).await?;
        authorize(&cart, &credential)?;
        ensure_open(&cart)?;

        let items = self.carts.list_cart_items(cart.id).await?;
        if items.is_empty() {
            return Err(ServiceError::validation("cartId", "Cart is empty"));
        }
        let total = cart_total(&items).ok_or_else(total_out_of_range)?;

        let transaction = self
            .transactions
            .insert_transaction(NewTransaction {
                cart_id: cart.id,
                owner: credential.id,
                total,
            })
            .await?;

        tracing::info!(transaction_id = %transaction.id, cart_id = %cart.id, %total, "checkout completed");
        Ok(transaction)
    }

    pub async fn list(&self, bearer: &BearerToken) -> ServiceResult<Vec<Transaction>> {
        let credential = self.tokens.authenticate(bearer)?;
        Ok(self.transactions.list_transactions(credential.id).await?)
    }

    pub async fn get(&self, bearer: &BearerToken, id: Uuid) -> ServiceResult<Transaction> {
        let credential = self.tokens.authenticate(bearer)?;

        let transaction = self.transactions.find_transaction(id).await?;
        authorize(&transaction, &credential)?;
        Ok(transaction)
    }
}
