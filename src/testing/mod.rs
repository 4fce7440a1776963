use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{BearerToken, TokenManager};
use crate::config::AppConfig;
use crate::database::MemoryStore;
use crate::services::{CartService, ProductService, StorageService, TransactionService};

/// Services wired to a fresh in-memory store
pub struct TestContext {
    pub config: AppConfig,
    pub tokens: TokenManager,
    pub storage: StorageService,
    pub products: ProductService,
    pub carts: CartService,
    pub transactions: TransactionService,
}

/// A caller identity with a signed bearer token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub bearer: BearerToken,
}

impl TestContext {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.storage.upload_dir = std::env::temp_dir()
            .join(format!("eshop-api-unit-{}", Uuid::new_v4().simple()))
            .to_string_lossy()
            .into_owned();
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenManager::new(&config.security).expect("development token key");
        let storage = StorageService::new(&config.storage);

        Self {
            products: ProductService::new(store.clone(), tokens.clone(), storage.clone()),
            carts: CartService::new(store.clone(), store.clone(), tokens.clone()),
            transactions: TransactionService::new(store.clone(), store, tokens.clone()),
            config,
            tokens,
            storage,
        }
    }

    /// Mint a token for a fresh user id; the store does not need the user row
    pub fn user_token(&self) -> TestUser {
        let id = Uuid::new_v4();
        let token = self.tokens.issue(id).expect("token");
        TestUser {
            id,
            bearer: BearerToken::Present(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_tokens_are_distinct() {
        let ctx = TestContext::new();
        let a = ctx.user_token();
        let b = ctx.user_token();
        assert_ne!(a.id, b.id);
        assert_ne!(a.bearer, b.bearer);
    }
}
