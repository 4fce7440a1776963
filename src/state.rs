//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{JwtError, TokenManager};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::{
    AuthenticationService, CartService, ProductService, StorageService, TransactionService, UserService,
};

/// Cheaply cloneable handle to the configured services.
///
/// Every service receives its collaborators here, at construction time.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    store: Arc<dyn Store>,
    storage: StorageService,
    users: UserService,
    authentications: AuthenticationService,
    products: ProductService,
    carts: CartService,
    transactions: TransactionService,
}

impl AppState {
    /// Wire every service to `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token signing key is not configured.
    pub fn new<S>(config: AppConfig, store: Arc<S>) -> Result<Self, JwtError>
    where
        S: Store + 'static,
    {
        let tokens = TokenManager::new(&config.security)?;
        let storage = StorageService::new(&config.storage);

        let users = UserService::new(store.clone());
        let authentications = AuthenticationService::new(store.clone(), tokens.clone());
        let products = ProductService::new(store.clone(), tokens.clone(), storage.clone());
        let carts = CartService::new(store.clone(), store.clone(), tokens.clone());
        let transactions = TransactionService::new(store.clone(), store.clone(), tokens);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                storage,
                users,
                authentications,
                products,
                carts,
                transactions,
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    pub fn storage(&self) -> &StorageService {
        &self.inner.storage
    }

    pub fn users(&self) -> &UserService {
        &self.inner.users
    }

    pub fn authentications(&self) -> &AuthenticationService {
        &self.inner.authentications
    }

    pub fn products(&self) -> &ProductService {
        &self.inner.products
    }

    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    pub fn transactions(&self) -> &TransactionService {
        &self.inner.transactions
    }
}
