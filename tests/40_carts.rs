mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn cart_accumulates_items_and_totals() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let alice = server.session("alice").await?;
    let shirt = server.create_product(&alice, "Shirt", 100000).await?;
    let hat = server.create_product(&alice, "Hat", 25000).await?;
    let cart = server.open_cart(&alice).await?;
    let items_url = server.url(&format!("/carts/{}/items", cart));

    for payload in [
        json!({ "productId": shirt }),
        json!({ "productId": shirt, "quantity": 1 }),
        json!({ "productId": hat, "quantity": 2 }),
    ] {
        let resp = server
            .client
            .post(&items_url)
            .bearer_auth(&alice.token)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let body: Value = server
        .client
        .get(server.url(&format!("/carts/{}", cart)))
        .bearer_auth(&alice.token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"]["total"].as_f64(), Some(250000.0));
    assert_eq!(body["data"]["checkedOut"], false);
    Ok(())
}

#[tokio::test]
async fn opening_twice_returns_the_same_cart() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let alice = server.session("alice").await?;

    let first = server.open_cart(&alice).await?;
    let second = server.open_cart(&alice).await?;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn other_users_cannot_touch_a_cart() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let alice = server.session("alice").await?;
    let bob = server.session("bob").await?;
    let shirt = server.create_product(&alice, "Shirt", 100000).await?;
    let cart = server.open_cart(&alice).await?;

    let resp = server
        .client
        .get(server.url(&format!("/carts/{}", cart)))
        .bearer_auth(&bob.token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server
        .client
        .post(server.url(&format!("/carts/{}/items", cart)))
        .bearer_auth(&bob.token)
        .json(&json!({ "productId": shirt }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn removing_items_and_referenced_products() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let alice = server.session("alice").await?;
    let shirt = server.create_product(&alice, "Shirt", 100000).await?;
    let cart = server.open_cart(&alice).await?;

    server
        .client
        .post(server.url(&format!("/carts/{}/items", cart)))
        .bearer_auth(&alice.token)
        .json(&json!({ "productId": shirt }))
        .send()
        .await?;

    let resp = server
        .client
        .delete(server.url(&format!("/products/{}", shirt)))
        .bearer_auth(&alice.token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let item_url = server.url(&format!("/carts/{}/items/{}", cart, shirt));
    let resp = server.client.delete(&item_url).bearer_auth(&alice.token).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = server.client.delete(&item_url).bearer_auth(&alice.token).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn unknown_product_cannot_be_added() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let alice = server.session("alice").await?;
    let cart = server.open_cart(&alice).await?;

    let resp = server
        .client
        .post(server.url(&format!("/carts/{}/items", cart)))
        .bearer_auth(&alice.token)
        .json(&json!({ "productId": uuid::Uuid::new_v4() }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Product not found");
    Ok(())
}
