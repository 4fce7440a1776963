use super::{Constraint, FieldKind, FieldRule, Schema, UnknownFields};
use crate::database::models::MAX_CART_ITEM_QUANTITY;

/// MIME types accepted for product images
pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/apng",
    "image/avif",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/jpg",
    "image/webp",
];

/// Largest value a `NUMERIC(14, 2)` price column holds
pub const MAX_PRICE: f64 = 999_999_999_999.99;

const PRICE: &[Constraint] = &[Constraint::Min(0.0), Constraint::Max(MAX_PRICE), Constraint::Scale(2)];
const QUANTITY: &[Constraint] = &[Constraint::Min(1.0), Constraint::Max(MAX_CART_ITEM_QUANTITY as f64)];

const PRODUCT_FIELDS: &[FieldRule] = &[
    FieldRule::required("title", FieldKind::String),
    FieldRule::required("price", FieldKind::Number).with(PRICE),
    FieldRule::optional("description", FieldKind::String)
        .nullable()
        .allow_empty(),
];

const PRODUCT_UPDATE_FIELDS: &[FieldRule] = &[
    FieldRule::optional("title", FieldKind::String),
    FieldRule::optional("price", FieldKind::Number).with(PRICE),
    FieldRule::optional("description", FieldKind::String)
        .nullable()
        .allow_empty(),
];

const IMAGE_HEADER_FIELDS: &[FieldRule] = &[FieldRule::required("content-type", FieldKind::String)
    .with(&[Constraint::OneOf(IMAGE_CONTENT_TYPES)])];

const CART_ITEM_FIELDS: &[FieldRule] = &[
    FieldRule::required("productId", FieldKind::Uuid),
    FieldRule::optional("quantity", FieldKind::Integer).with(QUANTITY),
];

const CHECKOUT_FIELDS: &[FieldRule] = &[FieldRule::required("cartId", FieldKind::Uuid)];

const USER_FIELDS: &[FieldRule] = &[
    FieldRule::required("username", FieldKind::String),
    FieldRule::required("password", FieldKind::String),
    FieldRule::required("fullname", FieldKind::String),
];

const AUTHENTICATION_FIELDS: &[FieldRule] = &[
    FieldRule::required("username", FieldKind::String),
    FieldRule::required("password", FieldKind::String),
];

pub const PRODUCT_PAYLOAD: Schema = Schema::closed("product", PRODUCT_FIELDS);

pub const PRODUCT_UPDATE_PAYLOAD: Schema = Schema {
    require_any: true,
    ..Schema::closed("product_update", PRODUCT_UPDATE_FIELDS)
};

/// Multipart part headers; any header besides content-type is ignored
pub const PRODUCT_IMAGE_HEADERS: Schema = Schema {
    unknown: UnknownFields::Allow,
    case_insensitive: true,
    ..Schema::closed("product_image_headers", IMAGE_HEADER_FIELDS)
};

pub const CART_ITEM_PAYLOAD: Schema = Schema::closed("cart_item", CART_ITEM_FIELDS);

pub const CHECKOUT_PAYLOAD: Schema = Schema::closed("checkout", CHECKOUT_FIELDS);

pub const USER_PAYLOAD: Schema = Schema::closed("user", USER_FIELDS);

pub const AUTHENTICATION_PAYLOAD: Schema = Schema::closed("authentication", AUTHENTICATION_FIELDS);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn product_requires_title_and_price() {
        let err = PRODUCT_PAYLOAD.validate(&json!({ "price": 10 })).unwrap_err();
        assert_eq!(err.field, "title");

        let err = PRODUCT_PAYLOAD.validate(&json!({ "title": "Shirt" })).unwrap_err();
        assert_eq!(err.field, "price");
        assert_eq!(err.message, "\"price\" is required");
    }

    #[test]
    fn product_rejects_negative_price() {
        for price in [json!(-1), json!(-0.01), json!(-100000)] {
            let err = PRODUCT_PAYLOAD
                .validate(&json!({ "title": "Shirt", "price": price }))
                .unwrap_err();
            assert_eq!(err.field, "price");
        }
    }

    #[test]
    fn product_description_may_be_empty_or_null() {
        for description in [json!(""), json!(null), json!("Cotton")] {
            assert!(PRODUCT_PAYLOAD
                .validate(&json!({ "title": "Shirt", "price": 100000, "description": description }))
                .is_ok());
        }
    }

    #[test]
    fn product_update_needs_one_field() {
        let err = PRODUCT_UPDATE_PAYLOAD.validate(&json!({})).unwrap_err();
        assert_eq!(err.field, "value");
        assert!(PRODUCT_UPDATE_PAYLOAD.validate(&json!({ "price": 90000 })).is_ok());
    }

    #[test]
    fn image_headers_enforce_allow_set() {
        let err = PRODUCT_IMAGE_HEADERS
            .validate(&json!({ "content-type": "image/bmp" }))
            .unwrap_err();
        assert_eq!(err.field, "content-type");
        assert!(err.message.contains("image/webp"));
    }

    #[test]
    fn image_headers_ignore_unknown_and_case() {
        let headers = json!({
            "Content-Type": "image/png",
            "content-disposition": "form-data; name=\"data\"; filename=\"shirt.png\""
        });
        assert!(PRODUCT_IMAGE_HEADERS.validate(&headers).is_ok());
    }

    #[test]
    fn cart_item_requires_guid_product() {
        let err = CART_ITEM_PAYLOAD
            .validate(&json!({ "productId": "product-123" }))
            .unwrap_err();
        assert_eq!(err.message, "\"productId\" must be a valid GUID");
    }

    #[test]
    fn price_must_fit_the_stored_precision() {
        let err = PRODUCT_PAYLOAD
            .validate(&json!({ "title": "Shirt", "price": 10.005 }))
            .unwrap_err();
        assert_eq!(err.field, "price");
        assert_eq!(err.message, "\"price\" must have no more than 2 decimal places");

        let err = PRODUCT_UPDATE_PAYLOAD
            .validate(&json!({ "price": 1e12 }))
            .unwrap_err();
        assert_eq!(err.message, "\"price\" must be less than or equal to 999999999999.99");

        let err = PRODUCT_PAYLOAD
            .validate(&json!({ "title": "Gold", "price": 1e28 }))
            .unwrap_err();
        assert_eq!(err.field, "price");

        assert!(PRODUCT_PAYLOAD
            .validate(&json!({ "title": "Shirt", "price": 999999999999.99 }))
            .is_ok());
    }

    #[test]
    fn cart_item_quantity_is_bounded() {
        let id = uuid::Uuid::new_v4();
        let err = CART_ITEM_PAYLOAD
            .validate(&json!({ "productId": id, "quantity": 2147483647 }))
            .unwrap_err();
        assert_eq!(err.message, "\"quantity\" must be less than or equal to 10000");

        assert!(CART_ITEM_PAYLOAD
            .validate(&json!({ "productId": id, "quantity": 10000 }))
            .is_ok());
    }
}
