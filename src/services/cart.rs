use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};
use validator::Validate;

use crate::client::ApiClient;
use crate::errors::StorefrontError;
use crate::events::{Event, EventSender};
use crate::models::{Cart, CartLineItem, NewCartItem};
use crate::session::Session;

/// Cart service: single source of truth for the active cart, synchronized
/// with the remote API.
///
/// Every mutating operation sends the change to the server and replaces the
/// local session state with the returned authoritative cart — there is no
/// optimistic mutation, so a failed request leaves the local cart exactly
/// as it was. Mutations require a signed-in session and fail with
/// [`StorefrontError::AuthenticationRequired`] otherwise.
///
/// Concurrent mutations of the same line item are rejected while one is in
/// flight; [`CartService::is_item_processing`] backs the corresponding
/// control-disabling in the UI.
///
/// # Examples
///
/// ```ignore
/// let cart = storefront.services.cart.add_item(NewCartItem {
///     product_id: "prod-1".into(),
///     name: "Face Wash".into(),
///     subtitle: "Oil control".into(),
///     price: dec!(499.00),
///     quantity: 1,
///     image: "https://cdn.example.com/face-wash.jpg".into(),
/// }).await?;
/// assert_eq!(cart.item_count, storefront.services.cart.cart_count());
/// ```
#[derive(Clone)]
pub struct CartService {
    client: Arc<ApiClient>,
    session: Arc<Session>,
    events: EventSender,
}

#[derive(Debug, Serialize)]
struct UpdateQuantityRequest {
    quantity: u32,
}

impl CartService {
    pub fn new(client: Arc<ApiClient>, session: Arc<Session>, events: EventSender) -> Self {
        Self {
            client,
            session,
            events,
        }
    }

    /// Loads the server-side cart into the session.
    ///
    /// Anonymous sessions and expired tokens degrade to an empty cart
    /// rather than an error: there is nothing to mirror yet.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Cart, StorefrontError> {
        if !self.client.is_authenticated() {
            self.session.replace_cart(Vec::new());
            return Ok(Cart::default());
        }

        match self.client.get::<Cart>("/cart").await {
            Ok(envelope) => {
                let cart = envelope.into_data("fetch the cart")?;
                self.session.replace_cart(cart.items.clone());
                self.events
                    .send_or_log(Event::CartFetched {
                        item_count: cart.computed_count(),
                    })
                    .await;
                Ok(cart)
            }
            Err(err) if err.is_authentication() => {
                self.session.replace_cart(Vec::new());
                Ok(Cart::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Adds a line item (or more quantity of an existing one).
    ///
    /// The server decides whether to merge into an existing line; either
    /// way the local state becomes whatever the server returned, so the
    /// item-count invariant holds regardless of merge behavior.
    ///
    /// # Errors
    ///
    /// * [`StorefrontError::Validation`] - payload failed minimum constraints
    /// * [`StorefrontError::AuthenticationRequired`] - no signed-in session
    /// * [`StorefrontError::InvalidState`] - a mutation of this line is already in flight
    /// * [`StorefrontError::Network`] / [`StorefrontError::ServerRejected`] - the request failed; local cart unchanged
    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub async fn add_item(&self, item: NewCartItem) -> Result<Cart, StorefrontError> {
        item.validate()?;
        self.require_session("add items to your cart")?;
        let _guard = self.session.begin_item_operation(&item.product_id)?;

        let cart = self
            .client
            .post::<Cart, _>("/cart/items", &item)
            .await?
            .into_data("add the item to your cart")?;

        self.session.replace_cart(cart.items.clone());
        self.events
            .send_or_log(Event::CartItemAdded {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            })
            .await;

        info!(
            "Added item to cart: {} x{}, cart now holds {} units",
            item.product_id,
            item.quantity,
            cart.computed_count()
        );
        Ok(cart)
    }

    /// Sets a line item's quantity.
    ///
    /// A quantity of zero or less is equivalent to [`CartService::remove_item`]:
    /// the line disappears and the count drops by its prior quantity.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        product_id: &str,
        quantity: i32,
    ) -> Result<Cart, StorefrontError> {
        if quantity <= 0 {
            return self.remove_item(product_id).await;
        }

        self.require_session("update your cart")?;
        let _guard = self.session.begin_item_operation(product_id)?;

        let request = UpdateQuantityRequest {
            quantity: quantity as u32,
        };
        let cart = self
            .client
            .put::<Cart, _>(&format!("/cart/items/{}", product_id), &request)
            .await?
            .into_data("update the item quantity")?;

        self.session.replace_cart(cart.items.clone());
        self.events
            .send_or_log(Event::CartItemUpdated {
                product_id: product_id.to_string(),
                quantity: quantity as u32,
            })
            .await;

        Ok(cart)
    }

    /// Removes a line item.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, product_id: &str) -> Result<Cart, StorefrontError> {
        self.require_session("update your cart")?;
        let _guard = self.session.begin_item_operation(product_id)?;

        let cart = self
            .client
            .delete::<Cart>(&format!("/cart/items/{}", product_id))
            .await?
            .into_data("remove the item from your cart")?;

        self.session.replace_cart(cart.items.clone());
        self.events
            .send_or_log(Event::CartItemRemoved {
                product_id: product_id.to_string(),
            })
            .await;

        Ok(cart)
    }

    /// Empties the cart server-side and locally, discarding any applied
    /// coupon state with it.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), StorefrontError> {
        self.require_session("clear your cart")?;

        let envelope = self.client.delete::<serde_json::Value>("/cart").await?;
        if !envelope.success {
            return Err(StorefrontError::ServerRejected(
                envelope
                    .message
                    .unwrap_or_else(|| "The store could not clear your cart.".to_string()),
            ));
        }

        self.session.clear_cart();
        self.events.send_or_log(Event::CartCleared).await;
        info!("Cleared cart");
        Ok(())
    }

    /// Sum of all line-item quantities in the mirrored cart (badge count).
    pub fn cart_count(&self) -> u32 {
        self.session.cart_count()
    }

    /// Current line items (cloned snapshot).
    pub fn items(&self) -> Vec<CartLineItem> {
        self.session.items()
    }

    /// Whether a mutation of the given line is in flight.
    pub fn is_item_processing(&self, product_id: &str) -> bool {
        self.session.is_item_processing(product_id)
    }

    fn require_session(&self, action: &str) -> Result<(), StorefrontError> {
        if self.client.is_authenticated() {
            Ok(())
        } else {
            Err(StorefrontError::AuthenticationRequired(format!(
                "Please sign in to {}.",
                action
            )))
        }
    }
}
