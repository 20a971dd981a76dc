//! Integration tests for the cart flow against a mocked backend.
//!
//! Covers:
//! - Fetch and mirror of the server-side cart
//! - Add / update / remove / clear with server-authoritative replacement
//! - The cartCount invariant (sum of line quantities)
//! - Quantity zero behaving as removal
//! - Authentication gating and no-optimistic-mutation on failure

mod common;

use assert_matches::assert_matches;
use common::{cart_envelope, line_json, TestStore};
use rust_decimal_macros::dec;
use storefront_client::errors::StorefrontError;
use storefront_client::events::Event;
use storefront_client::models::NewCartItem;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn face_wash(quantity: u32) -> NewCartItem {
    NewCartItem {
        product_id: "prod-1".into(),
        name: "Face Wash".into(),
        subtitle: "Oil control".into(),
        price: dec!(500.00),
        quantity,
        image: "https://cdn.example.test/prod-1.jpg".into(),
    }
}

#[tokio::test]
async fn fetch_mirrors_server_cart() {
    let store = TestStore::new().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer test-session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_envelope(
            vec![line_json("prod-1", "Face Wash", "500.00", 2)],
            "1000.00",
        )))
        .expect(1)
        .mount(&store.server)
        .await;

    let cart = store.storefront.services.cart.fetch().await.expect("fetch ok");
    assert_eq!(cart.item_count, 2);
    assert_eq!(store.storefront.cart_count(), 2);
    assert_eq!(store.storefront.session.subtotal(), dec!(1000.00));
}

#[tokio::test]
async fn add_item_replaces_local_state_with_server_cart() {
    let mut store = TestStore::new().await;

    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_envelope(
            vec![line_json("prod-1", "Face Wash", "500.00", 1)],
            "500.00",
        )))
        .expect(1)
        .mount(&store.server)
        .await;

    let cart = store
        .storefront
        .services
        .cart
        .add_item(face_wash(1))
        .await
        .expect("add ok");

    assert_eq!(cart.computed_count(), 1);
    assert_eq!(store.storefront.cart_count(), 1);

    let events = store.drain_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::CartItemAdded { product_id, quantity: 1 } if product_id == "prod-1")));
}

#[tokio::test]
async fn repeated_adds_keep_count_consistent_with_server_merge() {
    let store = TestStore::new().await;

    // First add: one unit. Second add: the server merges into a single
    // line of three. cartCount must equal the quantity sum either way.
    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_envelope(
            vec![line_json("prod-1", "Face Wash", "500.00", 1)],
            "500.00",
        )))
        .up_to_n_times(1)
        .mount(&store.server)
        .await;

    store
        .storefront
        .services
        .cart
        .add_item(face_wash(1))
        .await
        .expect("first add ok");
    assert_eq!(store.storefront.cart_count(), 1);

    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_envelope(
            vec![line_json("prod-1", "Face Wash", "500.00", 3)],
            "1500.00",
        )))
        .mount(&store.server)
        .await;

    store
        .storefront
        .services
        .cart
        .add_item(face_wash(2))
        .await
        .expect("second add ok");
    assert_eq!(store.storefront.cart_count(), 3);
}

#[tokio::test]
async fn quantity_zero_is_equivalent_to_removal() {
    let store = TestStore::new().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_envelope(
            vec![
                line_json("prod-1", "Face Wash", "500.00", 2),
                line_json("prod-2", "Toner", "300.00", 1),
            ],
            "1300.00",
        )))
        .mount(&store.server)
        .await;
    store.storefront.services.cart.fetch().await.expect("fetch ok");
    assert_eq!(store.storefront.cart_count(), 3);

    // Only a DELETE route is mounted: updating to zero must go through
    // removal, not a PUT with quantity 0.
    Mock::given(method("DELETE"))
        .and(path("/api/cart/items/prod-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_envelope(
            vec![line_json("prod-2", "Toner", "300.00", 1)],
            "300.00",
        )))
        .expect(1)
        .mount(&store.server)
        .await;

    let cart = store
        .storefront
        .services
        .cart
        .update_quantity("prod-1", 0)
        .await
        .expect("update-to-zero ok");

    assert!(cart.items.iter().all(|item| item.product_id != "prod-1"));
    // The count dropped by the removed line's prior quantity.
    assert_eq!(store.storefront.cart_count(), 1);
}

#[tokio::test]
async fn update_quantity_sends_new_quantity() {
    let store = TestStore::new().await;

    Mock::given(method("PUT"))
        .and(path("/api/cart/items/prod-1"))
        .and(wiremock::matchers::body_partial_json(
            serde_json::json!({"quantity": 5}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_envelope(
            vec![line_json("prod-1", "Face Wash", "500.00", 5)],
            "2500.00",
        )))
        .expect(1)
        .mount(&store.server)
        .await;

    let cart = store
        .storefront
        .services
        .cart
        .update_quantity("prod-1", 5)
        .await
        .expect("update ok");
    assert_eq!(cart.computed_count(), 5);
}

#[tokio::test]
async fn failed_mutation_leaves_local_cart_unchanged() {
    let store = TestStore::new().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_envelope(
            vec![line_json("prod-1", "Face Wash", "500.00", 2)],
            "1000.00",
        )))
        .mount(&store.server)
        .await;
    store.storefront.services.cart.fetch().await.expect("fetch ok");

    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "success": false,
            "message": "Something broke"
        })))
        .mount(&store.server)
        .await;

    let err = store
        .storefront
        .services
        .cart
        .add_item(face_wash(1))
        .await
        .unwrap_err();
    assert_matches!(err, StorefrontError::ServerRejected(_));

    // No optimistic mutation: the mirrored cart still shows the last
    // settled state.
    assert_eq!(store.storefront.cart_count(), 2);
}

#[tokio::test]
async fn anonymous_mutation_requires_authentication() {
    let store = TestStore::anonymous().await;

    let err = store
        .storefront
        .services
        .cart
        .add_item(face_wash(1))
        .await
        .unwrap_err();
    assert_matches!(err, StorefrontError::AuthenticationRequired(_));
    assert_eq!(store.server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn anonymous_fetch_degrades_to_empty_cart() {
    let store = TestStore::anonymous().await;

    let cart = store.storefront.services.cart.fetch().await.expect("fetch ok");
    assert!(cart.is_empty());
    assert_eq!(store.storefront.cart_count(), 0);
    assert_eq!(store.server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn expired_token_fetch_degrades_to_empty_cart() {
    let store = TestStore::new().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "success": false,
            "message": "Not authorized"
        })))
        .mount(&store.server)
        .await;

    let cart = store.storefront.services.cart.fetch().await.expect("fetch ok");
    assert!(cart.is_empty());
}

#[tokio::test]
async fn clear_empties_cart_and_discards_coupon_state() {
    let mut store = TestStore::new().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_envelope(
            vec![line_json("prod-1", "Face Wash", "500.00", 2)],
            "1000.00",
        )))
        .mount(&store.server)
        .await;
    store.storefront.services.cart.fetch().await.expect("fetch ok");

    // A coupon is applied, then the cart is cleared: the discount state
    // must go with it.
    store.storefront.session.apply_coupon(
        storefront_client::models::Coupon {
            code: "SAVE10".into(),
            discount_percentage: dec!(10),
            description: "10% off".into(),
            expiry_date: chrono::Utc::now() + chrono::Duration::days(30),
            minimum_purchase: dec!(500),
            is_active: true,
        },
        dec!(100),
    );

    Mock::given(method("DELETE"))
        .and(path("/api/cart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
        )
        .expect(1)
        .mount(&store.server)
        .await;

    store.storefront.services.cart.clear().await.expect("clear ok");

    assert_eq!(store.storefront.cart_count(), 0);
    assert!(store.storefront.session.applied_coupon().is_none());
    assert_eq!(store.storefront.session.discount_amount(), dec!(0));

    let events = store.drain_events();
    assert!(events.iter().any(|event| matches!(event, Event::CartCleared)));
}
