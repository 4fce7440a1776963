//! Same scenarios as the in-memory suites, against a real PostgreSQL store.
//! Each test is a no-op unless DATABASE_URL is set.

mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{Session, TestServer};

fn unique(name: &str) -> String {
    format!("{}-{}", name, uuid::Uuid::new_v4().simple())
}

async fn product_url(server: &TestServer, session: &Session, payload: Value) -> Result<String> {
    let resp = server
        .client
        .post(server.url("/products"))
        .bearer_auth(&session.token)
        .json(&payload)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await?;
    let id = body["data"]["productId"].as_str().context("missing productId")?;
    Ok(server.url(&format!("/products/{}", id)))
}

#[tokio::test]
async fn product_round_trip_and_partial_update() -> Result<()> {
    let Some(server) = TestServer::spawn_postgres().await? else {
        return Ok(());
    };
    let alice = server.session(&unique("alice")).await?;
    let bob = server.session(&unique("bob")).await?;

    let url = product_url(
        &server,
        &alice,
        json!({ "title": "Shirt", "price": 100000.25, "description": "Cotton" }),
    )
    .await?;

    let body: Value = server.client.get(&url).send().await?.json().await?;
    assert_eq!(body["data"]["title"], "Shirt");
    assert_eq!(body["data"]["price"].as_f64(), Some(100000.25));
    assert_eq!(body["data"]["description"], "Cotton");
    assert_eq!(body["data"]["owner"], alice.user_id.as_str());

    let resp = server
        .client
        .put(&url)
        .bearer_auth(&bob.token)
        .json(&json!({ "price": 1 }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server
        .client
        .put(&url)
        .bearer_auth(&alice.token)
        .json(&json!({ "price": 90000, "description": null }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = server.client.get(&url).send().await?.json().await?;
    assert_eq!(body["data"]["price"].as_f64(), Some(90000.0));
    assert_eq!(body["data"]["title"], "Shirt");
    assert!(body["data"]["description"].is_null());
    Ok(())
}

#[tokio::test]
async fn out_of_range_price_is_a_validation_failure() -> Result<()> {
    let Some(server) = TestServer::spawn_postgres().await? else {
        return Ok(());
    };
    let alice = server.session(&unique("alice")).await?;

    for price in [json!(10.005), json!(1e12)] {
        let resp = server
            .client
            .post(server.url("/products"))
            .bearer_auth(&alice.token)
            .json(&json!({ "title": "Shirt", "price": price }))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await?;
        assert!(body["message"].as_str().unwrap_or_default().starts_with("\"price\""));
    }
    Ok(())
}

#[tokio::test]
async fn referenced_product_and_double_checkout_conflict() -> Result<()> {
    let Some(server) = TestServer::spawn_postgres().await? else {
        return Ok(());
    };
    let alice = server.session(&unique("alice")).await?;
    let url = product_url(&server, &alice, json!({ "title": "Shirt", "price": 100 })).await?;
    let product_id = url.rsplit('/').next().context("missing id")?.to_string();
    let cart = server.open_cart(&alice).await?;
    let items_url = server.url(&format!("/carts/{}/items", cart));

    for quantity in [2, 3] {
        let resp = server
            .client
            .post(&items_url)
            .bearer_auth(&alice.token)
            .json(&json!({ "productId": product_id, "quantity": quantity }))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = server
        .client
        .post(&items_url)
        .bearer_auth(&alice.token)
        .json(&json!({ "productId": product_id, "quantity": 10000 }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = server
        .client
        .get(server.url(&format!("/carts/{}", cart)))
        .bearer_auth(&alice.token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"]["items"][0]["quantity"], 5);
    assert_eq!(body["data"]["total"].as_f64(), Some(500.0));

    let resp = server.client.delete(&url).bearer_auth(&alice.token).send().await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let checkout = json!({ "cartId": cart });
    let resp = server
        .client
        .post(server.url("/transactions"))
        .bearer_auth(&alice.token)
        .json(&checkout)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = server
        .client
        .post(server.url("/transactions"))
        .bearer_auth(&alice.token)
        .json(&checkout)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let next = server.open_cart(&alice).await?;
    assert_ne!(next, cart);
    Ok(())
}
