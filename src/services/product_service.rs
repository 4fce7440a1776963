use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use super::storage_service::StorageService;
use crate::auth::{authorize, BearerToken, TokenManager};
use crate::database::models::{NewProduct, Product, ProductChanges};
use crate::database::ProductRepository;
use crate::validator::schemas::{PRODUCT_IMAGE_HEADERS, PRODUCT_PAYLOAD, PRODUCT_UPDATE_PAYLOAD};

/// Image part of a multipart upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Part headers as a JSON object of name to value
    pub headers: Value,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    tokens: TokenManager,
    storage: StorageService,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, tokens: TokenManager, storage: StorageService) -> Self {
        Self {
            products,
            tokens,
            storage,
        }
    }

    pub async fn create(&self, bearer: &BearerToken, payload: &Value) -> ServiceResult<Product> {
        let product: NewProduct = PRODUCT_PAYLOAD.validate_into(payload)?;
        let credential = self.tokens.authenticate(bearer)?;

        let product = self.products.insert_product(credential.id, product).await?;
        tracing::info!(product_id = %product.id, owner = %credential.id, "product created");
        Ok(product)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.products.list_products().await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Product> {
        Ok(self.products.find_product(id).await?)
    }

    pub async fn update(&self, bearer: &BearerToken, id: Uuid, payload: &Value) -> ServiceResult<Product> {
        let changes: ProductChanges = PRODUCT_UPDATE_PAYLOAD.validate_into(payload)?;
        let credential = self.tokens.authenticate(bearer)?;

        let existing = self.products.find_product(id).await?;
        authorize(&existing, &credential)?;

        Ok(self.products.update_product(id, changes).await?)
    }

    pub async fn delete(&self, bearer: &BearerToken, id: Uuid) -> ServiceResult<()> {
        let credential = self.tokens.authenticate(bearer)?;

        let existing = self.products.find_product(id).await?;
        authorize(&existing, &credential)?;

        self.products.delete_product(id).await?;
        if let Some(image_url) = &existing.image_url {
            self.storage.remove_image(image_url).await;
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    pub async fn upload_image(&self, bearer: &BearerToken, id: Uuid, upload: ImageUpload) -> ServiceResult<Product> {
        let headers = PRODUCT_IMAGE_HEADERS.validate(&upload.headers)?;
        let content_type = headers
            .get("content-type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if upload.bytes.len() > self.storage.max_bytes() {
            return Err(ServiceError::PayloadTooLarge(format!(
                "Image must not exceed {} bytes",
                self.storage.max_bytes()
            )));
        }

        let credential = self.tokens.authenticate(bearer)?;

        let existing = self.products.find_product(id).await?;
        authorize(&existing, &credential)?;

        let image_url = self
            .storage
            .write_image(&upload.bytes, &content_type)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let product = match self.products.set_product_image(id, &image_url).await {
            Ok(product) => product,
            Err(e) => {
                self.storage.remove_image(&image_url).await;
                return Err(e.into());
            }
        };
        if let Some(previous) = &existing.image_url {
            self.storage.remove_image(previous).await;
        }
        Ok(product)
    }
}
