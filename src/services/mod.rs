pub mod authentication_service;
pub mod cart_service;
pub mod error;
pub mod product_service;
pub mod storage_service;
pub mod transaction_service;
pub mod user_service;

pub use authentication_service::AuthenticationService;
pub use cart_service::CartService;
pub use error::{ServiceError, ServiceResult};
pub use product_service::{ImageUpload, ProductService};
pub use storage_service::{StorageError, StorageService, IMAGE_URL_PREFIX};
pub use transaction_service::TransactionService;
pub use user_service::UserService;
