use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Cart, CartItem, CartLine, NewProduct, NewTransaction, NewUser, Product, ProductChanges, Transaction, User,
    MAX_CART_ITEM_QUANTITY, STATUS_COMPLETED,
};
use super::repository::{CartRepository, ProductRepository, Store, TransactionRepository, UserRepository};

/// PostgreSQL-backed store; each operation is a single statement
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(entity: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found", entity))
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, fullname)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, fullname, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.fullname)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::classify(e, "Username is already taken"))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, fullname, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("User"))
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn insert_product(&self, owner: Uuid, product: NewProduct) -> Result<Product, DatabaseError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, title, price, description, owner)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, price, description, owner, image_url, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&product.title)
        .bind(product.price)
        .bind(&product.description)
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::classify(e, "Product owner does not exist"))
    }

    async fn list_products(&self) -> Result<Vec<Product>, DatabaseError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, title, price, description, owner, image_url, created_at, updated_at
            FROM products
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn find_product(&self, id: Uuid) -> Result<Product, DatabaseError> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, title, price, description, owner, image_url, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Product"))
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Product, DatabaseError> {
        let set_description = changes.description.is_some();
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                title = COALESCE($2, title),
                price = COALESCE($3, price),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                updated_at = now()
            WHERE id = $1
            RETURNING id, title, price, description, owner, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.price)
        .bind(set_description)
        .bind(changes.description.flatten())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Product"))
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::classify(e, "Product is still referenced by a cart"))?;

        if result.rows_affected() == 0 {
            return Err(not_found("Product"));
        }
        Ok(())
    }

    async fn set_product_image(&self, id: Uuid, image_url: &str) -> Result<Product, DatabaseError> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET image_url = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, title, price, description, owner, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(image_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Product"))
    }
}

#[async_trait]
impl CartRepository for PgStore {
    async fn find_open_cart(&self, owner: Uuid) -> Result<Option<Cart>, DatabaseError> {
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            SELECT c.id, c.owner, c.created_at, FALSE AS checked_out
            FROM carts c
            WHERE c.owner = $1
              AND NOT EXISTS (SELECT 1 FROM transactions t WHERE t.cart_id = c.id)
            ORDER BY c.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cart)
    }

    async fn insert_cart(&self, owner: Uuid) -> Result<Cart, DatabaseError> {
        sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (id, owner)
            VALUES ($1, $2)
            RETURNING id, owner, created_at, FALSE AS checked_out
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::classify(e, "Cart owner does not exist"))
    }

    async fn find_cart(&self, id: Uuid) -> Result<Cart, DatabaseError> {
        sqlx::query_as::<_, Cart>(
            r#"
            SELECT c.id, c.owner, c.created_at,
                   EXISTS (SELECT 1 FROM transactions t WHERE t.cart_id = c.id) AS checked_out
            FROM carts c
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Cart"))
    }

    async fn list_cart_items(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DatabaseError> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT i.product_id, p.title, p.price, i.quantity
            FROM cart_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.cart_id = $1
            ORDER BY i.added_at, i.product_id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    async fn upsert_cart_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, DatabaseError> {
        sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            RETURNING cart_id, product_id, quantity
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_check_violation() => DatabaseError::Conflict(format!(
                "Cart item quantity cannot exceed {}",
                MAX_CART_ITEM_QUANTITY
            )),
            other => DatabaseError::classify(other, "Cart or product no longer exists"),
        })
    }

    async fn delete_cart_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found("Cart item"));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for PgStore {
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, DatabaseError> {
        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (id, cart_id, owner, total, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, cart_id, owner, total, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(transaction.cart_id)
        .bind(transaction.owner)
        .bind(transaction.total)
        .bind(STATUS_COMPLETED)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::classify(e, "Cart has already been checked out"))
    }

    async fn find_transaction(&self, id: Uuid) -> Result<Transaction, DatabaseError> {
        sqlx::query_as::<_, Transaction>(
            "SELECT id, cart_id, owner, total, status, created_at FROM transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Transaction"))
    }

    async fn list_transactions(&self, owner: Uuid) -> Result<Vec<Transaction>, DatabaseError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, cart_id, owner, total, status, created_at
            FROM transactions
            WHERE owner = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
