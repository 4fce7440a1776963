//! In-process store for local runs and tests.
//!
//! Mirrors the constraints enforced by the PostgreSQL schema: unique
//! usernames, one transaction per cart and no deletion of products that a
//! cart still references.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Cart, CartItem, CartLine, NewProduct, NewTransaction, NewUser, Product, ProductChanges, Transaction, User,
    MAX_CART_ITEM_QUANTITY, STATUS_COMPLETED,
};
use super::repository::{CartRepository, ProductRepository, Store, TransactionRepository, UserRepository};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    products: Vec<Product>,
    carts: Vec<Cart>,
    cart_items: Vec<CartItem>,
    transactions: Vec<Transaction>,
}

impl Tables {
    fn checked_out(&self, cart_id: Uuid) -> bool {
        self.transactions.iter().any(|t| t.cart_id == cart_id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(entity: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found", entity))
}

fn quantity_limit() -> DatabaseError {
    DatabaseError::Conflict(format!(
        "Cart item quantity cannot exceed {}",
        MAX_CART_ITEM_QUANTITY
    ))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::Conflict("Username is already taken".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            fullname: user.fullname,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| not_found("User"))
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert_product(&self, owner: Uuid, product: NewProduct) -> Result<Product, DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            title: product.title,
            price: product.price,
            description: product.description,
            owner,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn list_products(&self) -> Result<Vec<Product>, DatabaseError> {
        Ok(self.tables.read().await.products.clone())
    }

    async fn find_product(&self, id: Uuid) -> Result<Product, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found("Product"))
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Product, DatabaseError> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("Product"))?;
        changes.apply(product);
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.cart_items.iter().any(|item| item.product_id == id) {
            return Err(DatabaseError::Conflict(
                "Product is still referenced by a cart".to_string(),
            ));
        }

        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before {
            return Err(not_found("Product"));
        }
        Ok(())
    }

    async fn set_product_image(&self, id: Uuid, image_url: &str) -> Result<Product, DatabaseError> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("Product"))?;
        product.image_url = Some(image_url.to_string());
        product.updated_at = Utc::now();
        Ok(product.clone())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn find_open_cart(&self, owner: Uuid) -> Result<Option<Cart>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .carts
            .iter()
            .rev()
            .find(|c| c.owner == owner && !tables.checked_out(c.id))
            .cloned())
    }

    async fn insert_cart(&self, owner: Uuid) -> Result<Cart, DatabaseError> {
        let mut tables = self.tables.write().await;
        let cart = Cart {
            id: Uuid::new_v4(),
            owner,
            created_at: Utc::now(),
            checked_out: false,
        };
        tables.carts.push(cart.clone());
        Ok(cart)
    }

    async fn find_cart(&self, id: Uuid) -> Result<Cart, DatabaseError> {
        let tables = self.tables.read().await;
        let mut cart = tables
            .carts
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found("Cart"))?;
        cart.checked_out = tables.checked_out(id);
        Ok(cart)
    }

    async fn list_cart_items(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DatabaseError> {
        let tables = self.tables.read().await;
        let lines = tables
            .cart_items
            .iter()
            .filter(|item| item.cart_id == cart_id)
            .filter_map(|item| {
                let product = tables.products.iter().find(|p| p.id == item.product_id)?;
                Some(CartLine {
                    product_id: item.product_id,
                    title: product.title.clone(),
                    price: product.price,
                    quantity: item.quantity,
                })
            })
            .collect();
        Ok(lines)
    }

    async fn upsert_cart_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, DatabaseError> {
        let mut tables = self.tables.write().await;
        let references_exist =
            tables.carts.iter().any(|c| c.id == cart_id) && tables.products.iter().any(|p| p.id == product_id);
        if !references_exist {
            return Err(DatabaseError::Conflict("Cart or product no longer exists".to_string()));
        }

        if let Some(item) = tables
            .cart_items
            .iter_mut()
            .find(|item| item.cart_id == cart_id && item.product_id == product_id)
        {
            item.quantity = item
                .quantity
                .checked_add(quantity)
                .filter(|total| *total <= MAX_CART_ITEM_QUANTITY)
                .ok_or_else(quantity_limit)?;
            return Ok(item.clone());
        }
        if quantity > MAX_CART_ITEM_QUANTITY {
            return Err(quantity_limit());
        }

        let item = CartItem {
            cart_id,
            product_id,
            quantity,
        };
        tables.cart_items.push(item.clone());
        Ok(item)
    }

    async fn delete_cart_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.cart_items.len();
        tables
            .cart_items
            .retain(|item| !(item.cart_id == cart_id && item.product_id == product_id));
        if tables.cart_items.len() == before {
            return Err(not_found("Cart item"));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.checked_out(transaction.cart_id) {
            return Err(DatabaseError::Conflict("Cart has already been checked out".to_string()));
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            cart_id: transaction.cart_id,
            owner: transaction.owner,
            total: transaction.total,
            status: STATUS_COMPLETED.to_string(),
            created_at: Utc::now(),
        };
        tables.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn find_transaction(&self, id: Uuid) -> Result<Transaction, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found("Transaction"))
    }

    async fn list_transactions(&self, owner: Uuid) -> Result<Vec<Transaction>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .transactions
            .iter()
            .rev()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn shirt() -> NewProduct {
        NewProduct {
            title: "Shirt".to_string(),
            price: Decimal::from(100000),
            description: Some(String::new()),
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let user = NewUser {
            username: "alice".to_string(),
            password_hash: "x$y".to_string(),
            fullname: "Alice".to_string(),
        };
        store.insert_user(user.clone()).await.unwrap();
        assert!(matches!(store.insert_user(user).await, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn upsert_accumulates_quantity() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let product = store.insert_product(owner, shirt()).await.unwrap();
        let cart = store.insert_cart(owner).await.unwrap();

        store.upsert_cart_item(cart.id, product.id, 2).await.unwrap();
        let item = store.upsert_cart_item(cart.id, product.id, 3).await.unwrap();
        assert_eq!(item.quantity, 5);

        let lines = store.list_cart_items(cart.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].subtotal(), Some(Decimal::from(500000)));
    }

    #[tokio::test]
    async fn accumulated_quantity_is_capped() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let product = store.insert_product(owner, shirt()).await.unwrap();
        let cart = store.insert_cart(owner).await.unwrap();

        store
            .upsert_cart_item(cart.id, product.id, MAX_CART_ITEM_QUANTITY)
            .await
            .unwrap();
        assert!(matches!(
            store.upsert_cart_item(cart.id, product.id, 1).await,
            Err(DatabaseError::Conflict(_))
        ));
        assert!(matches!(
            store.upsert_cart_item(cart.id, product.id, i32::MAX).await,
            Err(DatabaseError::Conflict(_))
        ));

        let lines = store.list_cart_items(cart.id).await.unwrap();
        assert_eq!(lines[0].quantity, MAX_CART_ITEM_QUANTITY);
    }

    #[tokio::test]
    async fn referenced_product_cannot_be_deleted() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let product = store.insert_product(owner, shirt()).await.unwrap();
        let cart = store.insert_cart(owner).await.unwrap();
        store.upsert_cart_item(cart.id, product.id, 1).await.unwrap();

        assert!(matches!(
            store.delete_product(product.id).await,
            Err(DatabaseError::Conflict(_))
        ));
        store.delete_cart_item(cart.id, product.id).await.unwrap();
        store.delete_product(product.id).await.unwrap();
        assert!(matches!(
            store.find_product(product.id).await,
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn checked_out_cart_is_no_longer_open() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let cart = store.insert_cart(owner).await.unwrap();
        assert_eq!(store.find_open_cart(owner).await.unwrap(), Some(cart.clone()));

        let checkout = NewTransaction {
            cart_id: cart.id,
            owner,
            total: Decimal::ZERO,
        };
        store.insert_transaction(checkout.clone()).await.unwrap();

        assert_eq!(store.find_open_cart(owner).await.unwrap(), None);
        assert!(store.find_cart(cart.id).await.unwrap().checked_out);
        assert!(matches!(
            store.insert_transaction(checkout).await,
            Err(DatabaseError::Conflict(_))
        ));
    }
}
