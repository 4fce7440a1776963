pub mod cart;
pub mod product;
pub mod transaction;
pub mod user;

pub use cart::{cart_total, Cart, CartDetail, CartItem, CartLine, MAX_CART_ITEM_QUANTITY};
pub use product::{NewProduct, Product, ProductChanges};
pub use transaction::{NewTransaction, Transaction, STATUS_COMPLETED};
pub use user::{NewUser, User};
