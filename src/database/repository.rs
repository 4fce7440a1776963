//! Persistence gateway traits.
//!
//! One operation per entity per verb. Lookups by id return
//! `DatabaseError::NotFound` when no row matches; mutating operations expect
//! the caller to have run the ownership check already.

use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Cart, CartItem, CartLine, NewProduct, NewTransaction, NewUser, Product, ProductChanges, Transaction, User,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username is taken
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<User, DatabaseError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert_product(&self, owner: Uuid, product: NewProduct) -> Result<Product, DatabaseError>;

    async fn list_products(&self) -> Result<Vec<Product>, DatabaseError>;

    async fn find_product(&self, id: Uuid) -> Result<Product, DatabaseError>;

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Product, DatabaseError>;

    /// Fails with `Conflict` while a cart still holds the product
    async fn delete_product(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn set_product_image(&self, id: Uuid, image_url: &str) -> Result<Product, DatabaseError>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Most recent cart of `owner` that has not been checked out
    async fn find_open_cart(&self, owner: Uuid) -> Result<Option<Cart>, DatabaseError>;

    async fn insert_cart(&self, owner: Uuid) -> Result<Cart, DatabaseError>;

    async fn find_cart(&self, id: Uuid) -> Result<Cart, DatabaseError>;

    /// Items in insertion order, joined with product title and price
    async fn list_cart_items(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DatabaseError>;

    /// Adds `quantity` to an existing line or creates it
    async fn upsert_cart_item(&self, cart_id: Uuid, product_id: Uuid, quantity: i32)
        -> Result<CartItem, DatabaseError>;

    async fn delete_cart_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Fails with `Conflict` when the cart already has a transaction
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, DatabaseError>;

    async fn find_transaction(&self, id: Uuid) -> Result<Transaction, DatabaseError>;

    async fn list_transactions(&self, owner: Uuid) -> Result<Vec<Transaction>, DatabaseError>;
}

/// Every repository behind a single handle
#[async_trait]
pub trait Store: UserRepository + ProductRepository + CartRepository + TransactionRepository {
    /// Round-trip to the backing store
    async fn ping(&self) -> Result<(), DatabaseError>;
}
